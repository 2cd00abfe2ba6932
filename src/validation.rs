// Row and header validation. The checks here only decide whether a row may
// proceed; they never talk to the API except through the existence caches.

use crate::api::ApiClient;
use crate::cache::{ExistenceCaches, LookupKind};
use crate::csv_loader::Row;
use crate::error::{ImportError, Result};
use crate::importer::StorageRefIndex;

pub const COL_TYPE: &str = "Type";
pub const COL_REF: &str = "Ref";
pub const COL_LINK_TO: &str = "Link to";
pub const COL_PROTOCOL: &str = "Protocol";
pub const COL_BUCKET: &str = "Bucket";
pub const COL_HOSTNAME: &str = "Hostname";
pub const COL_PATH: &str = "Path";
pub const COL_KEY: &str = "Key";
pub const COL_SECRET: &str = "Secret";
pub const COL_SHARD: &str = "Shard";
pub const COL_DESCRIPTION: &str = "Description";
pub const COL_POLLING_INTERVAL: &str = "PollingInterval";
pub const COL_HOUSEKEEPING_PERIOD: &str = "HousekeepingPeriod";
pub const COL_WORKFLOW_ID: &str = "WorkflowID";
pub const COL_WORKFLOW_OWNER: &str = "WorkflowOwner";
pub const COL_INBOX_METADATA: &str = "InboxMetadata";
pub const COL_TAGS: &str = "Tags";

const REQUIRED_HEADERS: [&str; 2] = [COL_TYPE, COL_REF];

/// Kind of resource a row describes. Passes run in `ALL` order because
/// folders and inboxes mount storage created earlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Storage,
    Folder,
    Inbox,
}

impl ResourceType {
    pub const ALL: [ResourceType; 3] =
        [ResourceType::Storage, ResourceType::Folder, ResourceType::Inbox];

    /// Parse a `Type` cell, ignoring case and surrounding whitespace.
    pub fn parse(cell: &str) -> Option<Self> {
        match cell.trim().to_ascii_lowercase().as_str() {
            "storage" => Some(ResourceType::Storage),
            "folder" => Some(ResourceType::Folder),
            "inbox" => Some(ResourceType::Inbox),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceType::Storage => "storage",
            ResourceType::Folder => "folder",
            ResourceType::Inbox => "inbox",
        }
    }

    /// Folders and inboxes must name the storage they mount.
    pub fn requires_link(self) -> bool {
        !matches!(self, ResourceType::Storage)
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Why a row was not processed. Warnings are expected skips; errors are
/// rows the user asked for that could not be honoured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Warning(String),
    Error(String),
}

impl Rejection {
    pub fn message(&self) -> &str {
        match self {
            Rejection::Warning(m) | Rejection::Error(m) => m,
        }
    }
}

pub fn validate_headers(headers: &[String]) -> Result<()> {
    let missing: Vec<String> = REQUIRED_HEADERS
        .iter()
        .copied()
        .filter(|required| !headers.iter().any(|h| h == required))
        .map(|required| required.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ImportError::Schema(missing))
    }
}

/// Ref of `row` when it belongs to the `target` pass.
///
/// `Ok(None)` means the row is for another pass and must be left alone.
pub fn check_type_and_ref(
    row: &Row,
    target: ResourceType,
) -> std::result::Result<Option<String>, Rejection> {
    if ResourceType::parse(row.value(COL_TYPE)) != Some(target) {
        return Ok(None);
    }
    match row.get(COL_REF) {
        Some(r) => Ok(Some(r.to_string())),
        None => Err(Rejection::Warning(format!(
            "{} row has an empty Ref, skipping",
            target
        ))),
    }
}

/// Skip resources that already exist remotely, unless forced.
pub fn check_not_existing(
    reference: &str,
    api: &ApiClient,
    caches: &mut ExistenceCaches,
) -> std::result::Result<(), Rejection> {
    if caches.lookup(api, LookupKind::ResourceName, reference) {
        return Err(Rejection::Warning(format!(
            "Resource '{}' already exists, skipping (use --force to create anyway)",
            reference
        )));
    }
    Ok(())
}

/// Resolve the `Link to` column of a folder/inbox row to the remote id of
/// its storage. Storage rows resolve to `None`.
pub fn resolve_link(
    row: &Row,
    resource_type: ResourceType,
    storage_refs: &StorageRefIndex,
) -> std::result::Result<Option<String>, Rejection> {
    if !resource_type.requires_link() {
        return Ok(None);
    }
    let reference = row.value(COL_REF);
    let link = row.get(COL_LINK_TO).ok_or_else(|| {
        Rejection::Error(format!(
            "{} '{}' requires a '{}' value",
            resource_type, reference, COL_LINK_TO
        ))
    })?;
    storage_refs
        .get(link)
        .map(|id| Some(id.clone()))
        .ok_or_else(|| {
            Rejection::Error(format!(
                "{} '{}' links to storage '{}' which was not created in this run",
                resource_type, reference, link
            ))
        })
}

/// Optional inbox references that must exist when present.
pub fn check_inbox_dependencies(
    row: &Row,
    api: &ApiClient,
    caches: &mut ExistenceCaches,
) -> std::result::Result<(), Rejection> {
    let deps = [
        (COL_WORKFLOW_ID, LookupKind::Workflow),
        (COL_WORKFLOW_OWNER, LookupKind::User),
        (COL_INBOX_METADATA, LookupKind::MetadataDefinition),
    ];
    for (column, kind) in deps {
        if let Some(id) = row.get(column) {
            if !caches.lookup(api, kind, id) {
                return Err(Rejection::Error(format!(
                    "{} '{}' not found",
                    kind.label(),
                    id
                )));
            }
        }
    }
    Ok(())
}

/// Split a `Tags` cell into clean tag names.
///
/// Entries are comma separated; whitespace around each entry, embedded
/// CR/LF and quote characters are removed and empty entries dropped.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|tag| {
            tag.chars()
                .filter(|c| !matches!(c, '\r' | '\n' | '"' | '\''))
                .collect::<String>()
                .trim()
                .to_string()
        })
        .filter(|tag| !tag.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn row(pairs: &[(&str, &str)]) -> Row {
        let headers: Vec<String> = pairs.iter().map(|(h, _)| h.to_string()).collect();
        let values: Vec<String> = pairs.iter().map(|(_, v)| v.to_string()).collect();
        Row::new(2, &headers, &values)
    }

    #[test]
    fn headers_need_type_and_ref() {
        let ok = vec!["Ref".to_string(), "Type".to_string(), "Tags".to_string()];
        assert!(validate_headers(&ok).is_ok());

        let err = validate_headers(&["Type".to_string()]).unwrap_err();
        match err {
            ImportError::Schema(missing) => assert_eq!(missing, vec!["Ref"]),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn resource_type_parse_ignores_case() {
        assert_eq!(ResourceType::parse(" Storage "), Some(ResourceType::Storage));
        assert_eq!(ResourceType::parse("INBOX"), Some(ResourceType::Inbox));
        assert_eq!(ResourceType::parse("bucket"), None);
    }

    #[test]
    fn rows_for_other_passes_are_ignored() {
        let r = row(&[("Type", "folder"), ("Ref", "F1")]);
        assert_eq!(check_type_and_ref(&r, ResourceType::Storage), Ok(None));
        assert_eq!(
            check_type_and_ref(&r, ResourceType::Folder),
            Ok(Some("F1".to_string()))
        );
    }

    #[test]
    fn empty_ref_is_a_warning() {
        let r = row(&[("Type", "storage"), ("Ref", "")]);
        assert!(matches!(
            check_type_and_ref(&r, ResourceType::Storage),
            Err(Rejection::Warning(_))
        ));
    }

    #[test]
    fn link_must_be_present_and_known() {
        let mut refs: StorageRefIndex = HashMap::new();
        refs.insert("S1".to_string(), "101".to_string());

        let linked = row(&[("Type", "inbox"), ("Ref", "I1"), ("Link to", "S1")]);
        assert_eq!(
            resolve_link(&linked, ResourceType::Inbox, &refs),
            Ok(Some("101".to_string()))
        );

        let missing = row(&[("Type", "folder"), ("Ref", "F1"), ("Link to", "")]);
        assert!(matches!(
            resolve_link(&missing, ResourceType::Folder, &refs),
            Err(Rejection::Error(_))
        ));

        let unknown = row(&[("Type", "folder"), ("Ref", "F1"), ("Link to", "S9")]);
        let err = resolve_link(&unknown, ResourceType::Folder, &refs).unwrap_err();
        assert!(err.message().contains("S9"));

        let storage = row(&[("Type", "storage"), ("Ref", "S2")]);
        assert_eq!(resolve_link(&storage, ResourceType::Storage, &refs), Ok(None));
    }

    #[test]
    fn tags_are_cleaned_and_empties_dropped() {
        assert_eq!(parse_tags("a, b,,c\r\n"), vec!["a", "b", "c"]);
        assert_eq!(parse_tags("\"news\", 'sport' ,  "), vec!["news", "sport"]);
        assert!(parse_tags(" , ,").is_empty());
    }
}
