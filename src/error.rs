// Error types shared by the library. Only the fatal kinds live here; a
// failing row is reported as a `RowOutcome` by the importer and never
// travels up as an error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    /// Bad arguments, missing or unreadable CSV input.
    #[error("{0}")]
    Input(String),

    /// The CSV header row lacks columns the import cannot run without.
    #[error("CSV is missing required column(s): {}", .0.join(", "))]
    Schema(Vec<String>),

    /// Account discovery failed before any row was processed.
    #[error("setup failed: {0}")]
    Setup(String),

    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// A row value that must be an integer identifier is not one.
    #[error("{field} value '{value}' is not a valid integer")]
    Payload { field: &'static str, value: String },

    #[error("cannot encode payload: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ImportError>;
