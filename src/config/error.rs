//! Errors raised while loading or validating `postforge.toml`

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// Explicit `--config` path that does not exist
    #[error("Config file not found: {0} (run `postforge config init` to create one)")]
    NotFound(PathBuf),

    #[error("Cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid value for '{field}': {message}")]
    Validation { field: String, message: String },

    /// Two routing candidates share a model name
    #[error("Model '{0}' is listed more than once in routing.candidates")]
    DuplicateCandidate(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_file() {
        let err = ConfigError::Parse {
            path: PathBuf::from("postforge.toml"),
            message: "expected `=`".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid TOML in postforge.toml: expected `=`"
        );

        let err = ConfigError::NotFound(PathBuf::from("missing.toml"));
        assert!(err.to_string().contains("postforge config init"));
    }
}
