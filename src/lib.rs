// Library root
// -----------
// Batch import of MIO storage resources (storages, folders, inboxes) from a
// CSV file. The binary (`main.rs`) parses flags, builds a `RunConfig` and
// hands the loaded CSV to the importer.
//
// Module responsibilities:
// - `config`: run flags, target URL and Basic-auth credentials.
// - `csv_loader`: reads the CSV into trimmed headers and rows.
// - `api`: blocking HTTP calls against the resource API.
// - `cache`: memoised existence lookups (resources, workflows, users,
//   metadata definitions).
// - `validation`: header and per-row checks, tag parsing.
// - `payload`: creation and configuration bodies per resource type.
// - `importer`: the storage -> folder -> inbox passes.
// - `logging`: log filter combining `RUST_LOG` and `--verbose`.
// - `ui`: status output, spinner and credential prompts.
pub mod api;
pub mod cache;
pub mod config;
pub mod csv_loader;
pub mod error;
pub mod importer;
pub mod logging;
pub mod payload;
pub mod ui;
pub mod validation;

pub use error::{ImportError, Result};
