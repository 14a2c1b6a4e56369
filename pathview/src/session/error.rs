//! Session error types.

use std::fmt;

use crate::position::PositionError;

/// Errors that can occur while starting a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The user refused location access.
    PermissionDenied,

    /// The position subscription could not be started.
    Position(PositionError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::PermissionDenied => {
                write!(f, "Permission to access location was denied")
            }
            SessionError::Position(e) => {
                write!(f, "Failed to start position tracking: {}", e)
            }
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::PermissionDenied => None,
            SessionError::Position(e) => Some(e),
        }
    }
}

impl From<PositionError> for SessionError {
    fn from(e: PositionError) -> Self {
        SessionError::Position(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_error_display() {
        let err = SessionError::PermissionDenied;
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_session_error_from_position_error() {
        let err: SessionError = PositionError::Timeout.into();
        assert!(matches!(err, SessionError::Position(PositionError::Timeout)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
