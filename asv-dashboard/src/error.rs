//! Error taxonomy surfaced by the dashboard

use thiserror::Error;

/// Failures of dashboard operations. None of them is fatal: every failure
/// leaves the dashboard in its last known good state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DashboardError {
    /// Transport failure, the request never got an answer
    #[error("cannot reach the server: {0}")]
    Unreachable(String),

    /// The server rejected the bearer credential
    #[error("authorization rejected by the server")]
    Unauthorized,

    /// Login refused; carries the server's reason
    #[error("{0}")]
    InvalidCredentials(String),

    /// Input rejected before any request was made
    #[error("{0}")]
    Validation(String),

    /// A mutation or read rejected by the server; carries its reason verbatim
    #[error("{0}")]
    ServerRejected(String),
}

impl DashboardError {
    /// Message for a failure notification: the server's own reason when it
    /// gave one, otherwise `fallback`
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::ServerRejected(reason)
            | Self::InvalidCredentials(reason)
            | Self::Validation(reason)
                if !reason.is_empty() =>
            {
                reason.clone()
            }
            _ => fallback.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_server_reason() {
        let err = DashboardError::ServerRejected("theme must be light or dark".into());
        assert_eq!(err.user_message("Failed"), "theme must be light or dark");
    }

    #[test]
    fn test_user_message_falls_back() {
        assert_eq!(
            DashboardError::Unreachable("connection refused".into()).user_message("Failed"),
            "Failed"
        );
        assert_eq!(
            DashboardError::ServerRejected(String::new()).user_message("Failed"),
            "Failed"
        );
    }
}
