use serde::{Deserialize, Serialize};
use std::fmt;

/// Single structured error shape used across the client layers and shown to the user.
///
/// `code` is stable and machine-matchable (`INCIDENT_NOT_FOUND`, `API_UNREACHABLE`, ...);
/// `message` is the human-facing notification text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppError {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
    pub retryable: bool,
}

impl AppError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            retryable: false,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    pub fn incident_not_found(id: i64) -> Self {
        Self::new(
            "INCIDENT_NOT_FOUND",
            format!("Incidente con ID {id} no encontrado"),
        )
    }

    pub fn is_not_found(&self) -> bool {
        self.code == "INCIDENT_NOT_FOUND"
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}
