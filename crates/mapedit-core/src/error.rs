//! Error kinds surfaced by the editor and the persistence facade.

use thiserror::Error;

use crate::model::{FeatureId, FeatureKind};

/// Input problems caught before any network call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing name")]
    MissingName,

    #[error("missing geometry")]
    MissingGeometry,
}

/// Failures reported by the fetch/mutate facade.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Storage unreachable (transport failure or 5xx gateway/availability status).
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The target id does not exist server-side.
    #[error("{kind} {id} not found")]
    NotFound { kind: FeatureKind, id: FeatureId },

    /// The service refused the payload.
    #[error("rejected by server: {0}")]
    Rejected(String),

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl StoreError {
    /// Classifies an HTTP error response.
    pub fn from_status(status: u16, kind: FeatureKind, id: Option<&FeatureId>, message: String) -> Self {
        match status {
            404 => Self::NotFound {
                kind,
                id: id.cloned().unwrap_or_else(|| FeatureId::new("?")),
            },
            400 | 422 => Self::Rejected(message),
            502..=504 => Self::ServiceUnavailable(message),
            _ => Self::Unexpected(format!("HTTP {status}: {message}")),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Errors returned by editor operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("no {0} is being edited")]
    NoActiveSession(FeatureKind),

    #[error("a save is already in progress")]
    SaveInFlight,
}

/// Severity of a user-visible notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A message shown to the user. Errors never escape the editor; they end up here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        let id = FeatureId::new("abc");
        assert_eq!(
            StoreError::from_status(404, FeatureKind::Area, Some(&id), String::new()),
            StoreError::NotFound {
                kind: FeatureKind::Area,
                id: id.clone()
            }
        );
        assert!(matches!(
            StoreError::from_status(400, FeatureKind::Area, None, "Validation failed".into()),
            StoreError::Rejected(m) if m == "Validation failed"
        ));
        assert!(matches!(
            StoreError::from_status(503, FeatureKind::Point, None, "down".into()),
            StoreError::ServiceUnavailable(_)
        ));
        assert!(matches!(
            StoreError::from_status(500, FeatureKind::Point, None, "boom".into()),
            StoreError::Unexpected(m) if m.contains("500")
        ));
    }

    #[test]
    fn test_messages() {
        assert_eq!(ValidationError::MissingName.to_string(), "missing name");
        assert_eq!(
            EditorError::from(ValidationError::MissingGeometry).to_string(),
            "missing geometry"
        );
        assert_eq!(
            EditorError::NoActiveSession(FeatureKind::Point).to_string(),
            "no object is being edited"
        );
    }
}
