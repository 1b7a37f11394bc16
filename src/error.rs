//! Custom error types for emuctl.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmuctlError {
    #[error("This script must be run as root")]
    NotRoot,

    #[error("systemd is not present on this system")]
    NoServiceManager,

    #[error("{}", linter_not_found(candidates))]
    LinterNotFound { candidates: Vec<String> },

    #[error("{step} failed: {reason}")]
    StepFailed { step: String, reason: String },

    #[error("Installation incomplete, {} step(s) failed:\n  {}", failures.len(), failures.join("\n  "))]
    InstallIncomplete { failures: Vec<String> },

    #[error("Failed to load config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EmuctlError {
    /// Whether this error is reported verbatim on stderr without an `error:` prefix.
    ///
    /// Precondition failures keep the exact wording callers grep for.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            EmuctlError::NotRoot
                | EmuctlError::NoServiceManager
                | EmuctlError::LinterNotFound { .. }
        )
    }
}

fn linter_not_found(candidates: &[String]) -> String {
    match candidates {
        [] => "No style checker configured".to_string(),
        [only] => format!("{only} is required"),
        _ => format!("Either {} is required", candidates.join(" or ")),
    }
}
