use std::io;

use thiserror::Error;

/// Failures at the command-line boundary. Decoding itself never fails.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("cannot read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("JSON export failed: {0}")]
    Json(#[from] serde_json::Error),
}
