//! Transport error types.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("not connected")]
    NotConnected,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("timeout after {0:?}")]
    Timeout(Duration),

    #[error("remote returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl Error {
    /// Map a `reqwest` failure onto the transport taxonomy.
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout)
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Connect(err.to_string())
        }
    }

    /// Whether the underlying handle can no longer be trusted.
    ///
    /// Slow commands and non-2xx replies leave the connection usable; only
    /// failures to reach the remote side at all require a reconnect.
    pub fn is_broken_transport(&self) -> bool {
        matches!(self, Self::NotConnected | Self::Connect(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_connection_failures_break_transport() {
        assert!(Error::NotConnected.is_broken_transport());
        assert!(Error::Connect("refused".into()).is_broken_transport());
        assert!(!Error::Timeout(Duration::from_secs(30)).is_broken_transport());
        assert!(
            !Error::Status {
                status: 500,
                body: "boom".into()
            }
            .is_broken_transport()
        );
    }

    #[test]
    fn status_message_carries_code_and_body() {
        let err = Error::Status {
            status: 404,
            body: "no such command".into(),
        };
        assert_eq!(err.to_string(), "remote returned 404: no such command");
    }
}
