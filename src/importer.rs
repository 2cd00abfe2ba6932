// Import orchestration: account discovery, then one pass over the rows per
// resource type (storage, folder, inbox). A row that fails is reported and
// skipped; only setup problems abort the run.

use crate::api::{ApiClient, ApiResponse};
use crate::cache::{ExistenceCaches, LookupKind};
use crate::config::RunConfig;
use crate::csv_loader::{CsvTable, Row};
use crate::error::{ImportError, Result};
use crate::payload::{CreateResource, ResourceConfig};
use crate::ui;
use crate::validation::{
    check_inbox_dependencies, check_not_existing, check_type_and_ref, parse_tags, resolve_link,
    validate_headers, Rejection, ResourceType, COL_REF, COL_TAGS, COL_TYPE,
};
use serde_json::Value;
use std::collections::HashMap;

/// Storage `Ref` -> remote id of the storage created for it.
pub type StorageRefIndex = HashMap<String, String>;

/// Account used for `visibilityIds` when nothing is sent to the server.
pub const DRY_RUN_ACCOUNT_ID: &str = "dry-run-account";

/// Per-type counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PassSummary {
    pub created: usize,
    /// Rows that would have been created (dry-run).
    pub planned: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Configure/tag/enable calls that failed on a created resource.
    pub step_failures: usize,
}

#[derive(Debug, Default, Clone)]
pub struct ImportSummary {
    passes: HashMap<ResourceType, PassSummary>,
}

impl ImportSummary {
    pub fn pass(&self, resource_type: ResourceType) -> PassSummary {
        self.passes.get(&resource_type).copied().unwrap_or_default()
    }

    fn pass_mut(&mut self, resource_type: ResourceType) -> &mut PassSummary {
        self.passes.entry(resource_type).or_default()
    }

    pub fn total_failed(&self) -> usize {
        self.passes.values().map(|p| p.failed + p.step_failures).sum()
    }
}

/// What happened to one row during one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// The row belongs to another pass.
    Ignored,
    Created { id: String },
    Planned,
    Skipped(String),
    Failed(String),
}

impl From<Rejection> for RowOutcome {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::Warning(m) => RowOutcome::Skipped(m),
            Rejection::Error(m) => RowOutcome::Failed(m),
        }
    }
}

/// Mutable state of one run. Owned by the caller of `Importer::run` and
/// handed back once all passes are done.
#[derive(Debug)]
pub struct RunContext {
    pub account_id: Value,
    pub storage_refs: StorageRefIndex,
    pub caches: ExistenceCaches,
    pub summary: ImportSummary,
}

impl RunContext {
    pub fn new(account_id: Value) -> Self {
        RunContext {
            account_id,
            storage_refs: StorageRefIndex::new(),
            caches: ExistenceCaches::default(),
            summary: ImportSummary::default(),
        }
    }
}

pub struct Importer<'a> {
    config: &'a RunConfig,
    api: &'a ApiClient,
}

impl<'a> Importer<'a> {
    pub fn new(config: &'a RunConfig, api: &'a ApiClient) -> Self {
        Importer { config, api }
    }

    /// Validate headers, discover the account and run all three passes.
    pub fn run(&self, table: &CsvTable) -> Result<RunContext> {
        validate_headers(&table.headers)?;
        let rows = table.rows();
        warn_unknown_types(&rows);

        let account_id = self.discover_account()?;
        let mut ctx = RunContext::new(account_id);
        for resource_type in ResourceType::ALL {
            self.run_pass(resource_type, &rows, &mut ctx);
        }
        for kind in LookupKind::ALL {
            let cache = ctx.caches.cache(kind);
            if !cache.is_empty() {
                tracing::debug!(kind = kind.label(), entries = cache.len(), "existence lookups");
            }
        }
        Ok(ctx)
    }

    /// Id of the first account visible to the configured user.
    pub fn discover_account(&self) -> Result<Value> {
        if self.config.flags().dry_run {
            return Ok(Value::from(DRY_RUN_ACCOUNT_ID));
        }
        let spinner = ui::spinner("Discovering account...");
        let res = self.api.list_accounts();
        spinner.finish_and_clear();

        let res = res.map_err(|e| ImportError::Setup(e.to_string()))?;
        if !res.is_success() {
            return Err(ImportError::Setup(format!(
                "GET /api/accounts returned {}: {}",
                res.status, res.body
            )));
        }
        let body = res.json().unwrap_or(Value::Null);
        let accounts = match &body {
            Value::Array(items) => Some(items),
            other => other.get("objects").and_then(Value::as_array),
        };
        let id = accounts
            .and_then(|items| items.first())
            .and_then(|first| first.get("id"))
            .filter(|id| !id.is_null())
            .cloned()
            .ok_or_else(|| ImportError::Setup("no accounts returned by /api/accounts".into()))?;
        tracing::debug!(
            account = %id,
            user = self.config.credentials().username(),
            "using account"
        );
        Ok(id)
    }

    /// One pass over every row, acting only on rows of `resource_type`.
    pub fn run_pass(&self, resource_type: ResourceType, rows: &[Row], ctx: &mut RunContext) {
        ui::heading(&format!("Processing {} resources", resource_type));
        for row in rows {
            let outcome = self.process_row(resource_type, row, ctx);
            let pass = ctx.summary.pass_mut(resource_type);
            match outcome {
                RowOutcome::Ignored => {}
                RowOutcome::Created { .. } => pass.created += 1,
                RowOutcome::Planned => pass.planned += 1,
                RowOutcome::Skipped(msg) => {
                    pass.skipped += 1;
                    ui::warning(&format!("Line {}: {}", row.line(), msg));
                }
                RowOutcome::Failed(msg) => {
                    pass.failed += 1;
                    ui::failure(&format!("Line {}: {}", row.line(), msg));
                }
            }
        }
    }

    /// Take one row through validation, creation and the follow-up calls.
    pub fn process_row(
        &self,
        resource_type: ResourceType,
        row: &Row,
        ctx: &mut RunContext,
    ) -> RowOutcome {
        let reference = match check_type_and_ref(row, resource_type) {
            Ok(Some(r)) => r,
            Ok(None) => return RowOutcome::Ignored,
            Err(rejection) => return rejection.into(),
        };
        let flags = self.config.flags();

        if self.config.remote_checks() && !flags.force {
            if let Err(rejection) = check_not_existing(&reference, self.api, &mut ctx.caches) {
                return rejection.into();
            }
        }

        let storage_id = match resolve_link(row, resource_type, &ctx.storage_refs) {
            Ok(id) => id,
            Err(rejection) => return rejection.into(),
        };

        if resource_type == ResourceType::Inbox && self.config.remote_checks() {
            if let Err(rejection) = check_inbox_dependencies(row, self.api, &mut ctx.caches) {
                return rejection.into();
            }
        }

        // Built before anything is created so a bad value leaves nothing behind.
        let configuration = match ResourceConfig::build(resource_type, row, storage_id.as_deref())
            .and_then(|c| c.to_json())
        {
            Ok(c) => c,
            Err(e) => {
                return RowOutcome::Failed(format!("{} '{}': {}", resource_type, reference, e))
            }
        };
        let creation = CreateResource::from_row(resource_type, row, &ctx.account_id);

        if flags.dry_run {
            tracing::debug!(
                resource = %reference,
                create = %serde_json::to_value(&creation).unwrap_or_default(),
                configuration = %configuration,
                "dry-run payloads"
            );
            ui::success(&format!("[dry-run] Would create {} '{}'", resource_type, reference));
            if resource_type == ResourceType::Storage {
                ctx.storage_refs
                    .insert(reference.clone(), format!("dry-run-{}", reference));
            }
            return RowOutcome::Planned;
        }

        let id = match self.create(&creation) {
            Ok(id) => id,
            Err(msg) => {
                return RowOutcome::Failed(format!(
                    "Failed to create {} '{}': {}",
                    resource_type, reference, msg
                ))
            }
        };
        ui::success(&format!("Created {} '{}' (id {})", resource_type, reference, id));

        let mut step_failures = 0;
        let mut step = |name: &str, res: Result<ApiResponse>| match check_step(res) {
            Ok(()) => ui::success(&format!("{} {} '{}'", name, resource_type, reference)),
            Err(msg) => {
                step_failures += 1;
                ui::failure(&format!(
                    "Failed to {} {} '{}': {}",
                    name.to_lowercase(),
                    resource_type,
                    reference,
                    msg
                ));
            }
        };

        step("Configured", self.api.configure_resource(&id, &configuration));

        let tags = parse_tags(row.value(COL_TAGS));
        if !tags.is_empty() {
            step("Tagged", self.api.tag_resource(&id, &tags));
        }

        step("Enabled", self.api.enable_resource(&id));

        ctx.summary.pass_mut(resource_type).step_failures += step_failures;
        if resource_type == ResourceType::Storage {
            ctx.storage_refs.insert(reference, id.clone());
        }
        RowOutcome::Created { id }
    }

    /// `POST /api/resources` and pull the new id out of the response.
    fn create(&self, creation: &CreateResource) -> std::result::Result<String, String> {
        let body = serde_json::to_value(creation).map_err(|e| e.to_string())?;
        let res = self.api.create_resource(&body).map_err(|e| e.to_string())?;
        if !res.is_success() {
            return Err(format!("HTTP {}: {}", res.status, res.body));
        }
        match res.json().as_ref().and_then(|v| v.get("id")) {
            Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            _ => Err("response did not contain a resource id".into()),
        }
    }
}

fn check_step(res: Result<ApiResponse>) -> std::result::Result<(), String> {
    match res {
        Ok(r) if r.is_success() => Ok(()),
        Ok(r) => Err(format!("HTTP {}: {}", r.status, r.body)),
        Err(e) => Err(e.to_string()),
    }
}

/// Rows whose Type matches no pass would otherwise vanish silently.
fn warn_unknown_types(rows: &[Row]) {
    for row in rows {
        let cell = row.value(COL_TYPE);
        if ResourceType::parse(cell).is_none() {
            ui::warning(&format!(
                "Line {}: unknown Type '{}' for '{}', ignoring",
                row.line(),
                cell,
                row.value(COL_REF)
            ));
        }
    }
}
