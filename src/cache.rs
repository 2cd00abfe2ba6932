// Existence lookups with a per-run memo. Each kind of lookup keeps its own
// map so a workflow id and a user id with the same value never collide.

use crate::api::ApiClient;
use std::collections::HashMap;

/// The four things the importer may need to confirm exist remotely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKind {
    ResourceName,
    Workflow,
    User,
    MetadataDefinition,
}

impl LookupKind {
    pub const ALL: [LookupKind; 4] = [
        LookupKind::ResourceName,
        LookupKind::Workflow,
        LookupKind::User,
        LookupKind::MetadataDefinition,
    ];

    pub fn label(self) -> &'static str {
        match self {
            LookupKind::ResourceName => "Resource",
            LookupKind::Workflow => "Workflow ID",
            LookupKind::User => "Workflow owner ID",
            LookupKind::MetadataDefinition => "Metadata definition ID",
        }
    }
}

/// Key -> last observed existence for one lookup kind. Entries are never
/// invalidated during a run.
#[derive(Debug, Default)]
pub struct ExistenceCache {
    entries: HashMap<String, bool>,
}

impl ExistenceCache {
    pub fn get(&self, key: &str) -> Option<bool> {
        self.entries.get(key).copied()
    }

    pub fn insert(&mut self, key: &str, exists: bool) {
        self.entries.insert(key.to_string(), exists);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct ExistenceCaches {
    resources: ExistenceCache,
    workflows: ExistenceCache,
    users: ExistenceCache,
    metadata: ExistenceCache,
}

impl ExistenceCaches {
    pub fn cache(&self, kind: LookupKind) -> &ExistenceCache {
        match kind {
            LookupKind::ResourceName => &self.resources,
            LookupKind::Workflow => &self.workflows,
            LookupKind::User => &self.users,
            LookupKind::MetadataDefinition => &self.metadata,
        }
    }

    fn cache_mut(&mut self, kind: LookupKind) -> &mut ExistenceCache {
        match kind {
            LookupKind::ResourceName => &mut self.resources,
            LookupKind::Workflow => &mut self.workflows,
            LookupKind::User => &mut self.users,
            LookupKind::MetadataDefinition => &mut self.metadata,
        }
    }

    /// Whether `key` exists remotely as a `kind`.
    ///
    /// Never fails: a transport error counts as "does not exist" and is
    /// only reported at debug level. The answer, including that fallback,
    /// is cached, so each key costs at most one request per run.
    pub fn lookup(&mut self, api: &ApiClient, kind: LookupKind, key: &str) -> bool {
        if let Some(hit) = self.cache(kind).get(key) {
            return hit;
        }
        let result = match kind {
            LookupKind::ResourceName => api.resource_exists(key),
            LookupKind::Workflow => api.workflow_exists(key),
            LookupKind::User => api.user_exists(key),
            LookupKind::MetadataDefinition => api.metadata_definition_exists(key),
        };
        let exists = result.unwrap_or_else(|e| {
            tracing::debug!(kind = kind.label(), key, error = %e, "lookup failed, treating as not found");
            false
        });
        self.cache_mut(kind).insert(key, exists);
        exists
    }
}
