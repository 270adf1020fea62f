use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the command-line front end before the modem runs
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Character {0:?} does not fit in a single byte")]
    CharOutOfRange(char),
}
