// Request bodies sent to the resource API. Each resource type gets its own
// configuration struct; the JSON shape the API expects is produced by serde
// at the boundary.

use crate::csv_loader::Row;
use crate::error::{ImportError, Result};
use crate::validation::{
    ResourceType, COL_BUCKET, COL_DESCRIPTION, COL_HOSTNAME, COL_HOUSEKEEPING_PERIOD,
    COL_INBOX_METADATA, COL_KEY, COL_PATH, COL_POLLING_INTERVAL, COL_PROTOCOL, COL_REF,
    COL_SECRET, COL_SHARD, COL_WORKFLOW_ID, COL_WORKFLOW_OWNER,
};
use serde::Serialize;
use serde_json::Value;

pub const STORAGE_PLUGIN_CLASS: &str = "tv.nativ.mio.plugins.resources.vfs.storage.VFSStoragePlugin";
pub const FOLDER_PLUGIN_CLASS: &str = "tv.nativ.mio.plugins.resources.vfs.folder.VFSFolderPlugin";
pub const INBOX_PLUGIN_CLASS: &str = "tv.nativ.mio.plugins.resources.vfs.inbox.VFSInboxPlugin";
pub const METADATA_FORM_PLUGIN_CLASS: &str =
    "tv.nativ.mio.plugins.resources.inbox.metadataform.DefaultMetadataFormPlugin";

pub const DEFAULT_DESCRIPTION: &str = "Created by mio-resource-importer";
pub const DEFAULT_POLLING_INTERVAL: i64 = 30;
pub const DEFAULT_HOUSEKEEPING_PERIOD: i64 = 86_400_000_000;

pub fn plugin_class(resource_type: ResourceType) -> &'static str {
    match resource_type {
        ResourceType::Storage => STORAGE_PLUGIN_CLASS,
        ResourceType::Folder => FOLDER_PLUGIN_CLASS,
        ResourceType::Inbox => INBOX_PLUGIN_CLASS,
    }
}

/// Body of `POST /api/resources`, common to all resource types.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResource {
    pub name: String,
    pub description: String,
    pub plugin_class: &'static str,
    pub polling_interval: i64,
    pub use_latest_available_version: bool,
    pub visibility_ids: Vec<Value>,
}

impl CreateResource {
    pub fn from_row(resource_type: ResourceType, row: &Row, account_id: &Value) -> Self {
        CreateResource {
            name: row.value(COL_REF).to_string(),
            description: row
                .get(COL_DESCRIPTION)
                .unwrap_or(DEFAULT_DESCRIPTION)
                .to_string(),
            plugin_class: plugin_class(resource_type),
            polling_interval: int_or_default(row, COL_POLLING_INTERVAL, DEFAULT_POLLING_INTERVAL),
            use_latest_available_version: true,
            visibility_ids: vec![account_id.clone()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VfsLocation {
    pub protocol: String,
    pub bucket: String,
    pub hostname: String,
    pub path: String,
    pub key: String,
    pub secret: String,
    pub sharded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageConfig {
    #[serde(rename = "vfs-location")]
    pub location: VfsLocation,
}

/// Reference to another resource by its remote id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceRef {
    pub id: Value,
}

impl ResourceRef {
    /// Numeric ids go out as JSON numbers, anything else as a string.
    pub fn new(id: &str) -> Self {
        let id = id
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::from(id));
        ResourceRef { id }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FolderConfig {
    #[serde(rename = "storage-resource")]
    pub storage: ResourceRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IdRef {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginRef {
    #[serde(rename = "pluginClass")]
    pub plugin_class: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VariantAndMetadata {
    #[serde(rename = "metadataDefinition")]
    pub metadata_definition: IdRef,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InboxConfig {
    #[serde(rename = "housekeeping-period")]
    pub housekeeping_period: i64,
    #[serde(rename = "storage-resources")]
    pub storage: Vec<ResourceRef>,
    #[serde(rename = "metadata-form-plugins")]
    pub metadata_form: Vec<PluginRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow: Option<IdRef>,
    #[serde(rename = "workflowOwner", skip_serializing_if = "Option::is_none")]
    pub workflow_owner: Option<IdRef>,
    #[serde(
        rename = "variant-and-metadata-definition",
        skip_serializing_if = "Option::is_none"
    )]
    pub metadata: Option<VariantAndMetadata>,
}

/// Body of `PUT /api/resources/{id}/configuration`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResourceConfig {
    Storage(StorageConfig),
    Folder(FolderConfig),
    Inbox(InboxConfig),
}

impl ResourceConfig {
    /// Build the configuration for `row`. Folders and inboxes need the
    /// remote id of the storage they mount.
    pub fn build(
        resource_type: ResourceType,
        row: &Row,
        storage_id: Option<&str>,
    ) -> Result<Self> {
        match resource_type {
            ResourceType::Storage => Ok(ResourceConfig::Storage(StorageConfig {
                location: VfsLocation {
                    protocol: row.value(COL_PROTOCOL).to_string(),
                    bucket: row.value(COL_BUCKET).to_string(),
                    hostname: row.value(COL_HOSTNAME).to_string(),
                    path: row.value(COL_PATH).to_string(),
                    key: row.value(COL_KEY).to_string(),
                    secret: row.value(COL_SECRET).to_string(),
                    sharded: is_truthy(row.value(COL_SHARD)),
                },
            })),
            ResourceType::Folder => Ok(ResourceConfig::Folder(FolderConfig {
                storage: ResourceRef::new(linked_storage(storage_id)?),
            })),
            ResourceType::Inbox => Ok(ResourceConfig::Inbox(InboxConfig {
                housekeeping_period: int_or_default(
                    row,
                    COL_HOUSEKEEPING_PERIOD,
                    DEFAULT_HOUSEKEEPING_PERIOD,
                ),
                storage: vec![ResourceRef::new(linked_storage(storage_id)?)],
                metadata_form: vec![PluginRef {
                    plugin_class: METADATA_FORM_PLUGIN_CLASS,
                }],
                workflow: optional_id(row, COL_WORKFLOW_ID)?,
                workflow_owner: optional_id(row, COL_WORKFLOW_OWNER)?,
                metadata: optional_id(row, COL_INBOX_METADATA)?
                    .map(|metadata_definition| VariantAndMetadata { metadata_definition }),
            })),
        }
    }

    pub fn to_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// `yes`, `true` and `1` in any case are true; everything else is false.
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "yes" | "true" | "1"
    )
}

fn linked_storage(storage_id: Option<&str>) -> Result<&str> {
    storage_id.ok_or(ImportError::Payload {
        field: "Link to",
        value: String::new(),
    })
}

fn int_or_default(row: &Row, column: &'static str, default: i64) -> i64 {
    match row.get(column) {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(line = row.line(), column, value = raw, default, "not an integer, using default");
            default
        }),
    }
}

fn optional_id(row: &Row, column: &'static str) -> Result<Option<IdRef>> {
    row.get(column)
        .map(|raw| {
            raw.parse::<i64>()
                .map(|id| IdRef { id })
                .map_err(|_| ImportError::Payload {
                    field: column,
                    value: raw.to_string(),
                })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(pairs: &[(&str, &str)]) -> Row {
        let headers: Vec<String> = pairs.iter().map(|(h, _)| h.to_string()).collect();
        let values: Vec<String> = pairs.iter().map(|(_, v)| v.to_string()).collect();
        Row::new(2, &headers, &values)
    }

    #[test]
    fn shard_flag_accepts_yes_true_one() {
        for v in ["yes", "YES", "True", "1", " true "] {
            assert!(is_truthy(v), "{v}");
        }
        for v in ["no", "false", "0", "", "y", "on"] {
            assert!(!is_truthy(v), "{v}");
        }
    }

    #[test]
    fn storage_configuration_copies_location_fields() {
        let r = row(&[
            ("Type", "storage"),
            ("Ref", "S1"),
            ("Protocol", "s3"),
            ("Bucket", "media"),
            ("Hostname", "s3.example.com"),
            ("Path", "/in"),
            ("Key", "AK"),
            ("Secret", "SK"),
            ("Shard", "Yes"),
        ]);
        let cfg = ResourceConfig::build(ResourceType::Storage, &r, None).unwrap();
        assert_eq!(
            cfg.to_json().unwrap(),
            json!({
                "vfs-location": {
                    "protocol": "s3",
                    "bucket": "media",
                    "hostname": "s3.example.com",
                    "path": "/in",
                    "key": "AK",
                    "secret": "SK",
                    "sharded": true
                }
            })
        );
    }

    #[test]
    fn folder_configuration_references_storage_id() {
        let r = row(&[("Type", "folder"), ("Ref", "F1"), ("Link to", "S1")]);
        let cfg = ResourceConfig::build(ResourceType::Folder, &r, Some("501")).unwrap();
        assert_eq!(
            cfg.to_json().unwrap(),
            json!({ "storage-resource": { "id": 501 } })
        );
    }

    #[test]
    fn inbox_configuration_minimal() {
        let r = row(&[("Type", "inbox"), ("Ref", "I1"), ("Link to", "S1")]);
        let cfg = ResourceConfig::build(ResourceType::Inbox, &r, Some("dry-run-S1")).unwrap();
        assert_eq!(
            cfg.to_json().unwrap(),
            json!({
                "housekeeping-period": 86_400_000_000i64,
                "storage-resources": [{ "id": "dry-run-S1" }],
                "metadata-form-plugins": [{ "pluginClass": METADATA_FORM_PLUGIN_CLASS }]
            })
        );
    }

    #[test]
    fn inbox_configuration_with_optional_blocks() {
        let r = row(&[
            ("Type", "inbox"),
            ("Ref", "I1"),
            ("HousekeepingPeriod", "3600"),
            ("WorkflowID", "11"),
            ("WorkflowOwner", "22"),
            ("InboxMetadata", "33"),
        ]);
        let value = ResourceConfig::build(ResourceType::Inbox, &r, Some("7"))
            .unwrap()
            .to_json()
            .unwrap();
        assert_eq!(value["housekeeping-period"], 3600);
        assert_eq!(value["workflow"], json!({ "id": 11 }));
        assert_eq!(value["workflowOwner"], json!({ "id": 22 }));
        assert_eq!(
            value["variant-and-metadata-definition"],
            json!({ "metadataDefinition": { "id": 33 } })
        );
    }

    #[test]
    fn non_numeric_workflow_id_is_rejected() {
        let r = row(&[("Type", "inbox"), ("Ref", "I1"), ("WorkflowID", "abc")]);
        let err = ResourceConfig::build(ResourceType::Inbox, &r, Some("7")).unwrap_err();
        assert!(matches!(err, ImportError::Payload { field: "WorkflowID", .. }));
    }

    #[test]
    fn creation_payload_defaults() {
        let r = row(&[("Type", "folder"), ("Ref", "F1"), ("PollingInterval", "soon")]);
        let body = serde_json::to_value(CreateResource::from_row(
            ResourceType::Folder,
            &r,
            &json!(4),
        ))
        .unwrap();
        assert_eq!(
            body,
            json!({
                "name": "F1",
                "description": DEFAULT_DESCRIPTION,
                "pluginClass": FOLDER_PLUGIN_CLASS,
                "pollingInterval": 30,
                "useLatestAvailableVersion": true,
                "visibilityIds": [4]
            })
        );
    }

    #[test]
    fn creation_payload_uses_row_values() {
        let r = row(&[
            ("Ref", "S1"),
            ("Description", "Primary bucket"),
            ("PollingInterval", "120"),
        ]);
        let body = CreateResource::from_row(ResourceType::Storage, &r, &json!("acc"));
        assert_eq!(body.description, "Primary bucket");
        assert_eq!(body.polling_interval, 120);
        assert_eq!(body.plugin_class, STORAGE_PLUGIN_CLASS);
    }
}
