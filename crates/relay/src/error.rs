use catalog::ServiceKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error categories carried in a failed [`Envelope`](crate::Envelope).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Remote service unreachable after the retry budget.
    ConnectionUnavailable,
    /// Tool name not in the catalog.
    UnknownTool,
    /// Required arguments absent.
    MissingParameters,
    /// Remote service answered with a non-2xx status or an error payload.
    RemoteExecutionError,
    /// Anything else that went wrong while dispatching.
    ExecutionFailure,
    /// Tool needs the extended add-on, which the connected service lacks.
    UnsupportedCapability,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{service} service is unavailable: {reason}")]
    ConnectionUnavailable { service: ServiceKind, reason: String },

    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("missing required parameters for {tool}: {}", missing.join(", "))]
    MissingParameters { tool: String, missing: Vec<String> },

    #[error("{0}")]
    RemoteExecution(String),

    #[error("execution failed: {0}")]
    ExecutionFailure(String),

    #[error("{tool} requires the extended add-on, which the connected {service} service does not provide")]
    UnsupportedCapability { tool: String, service: ServiceKind },

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Catalog(#[from] catalog::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConnectionUnavailable { .. } => ErrorKind::ConnectionUnavailable,
            Self::UnknownTool(_) | Self::Catalog(catalog::Error::UnknownTool(_)) => {
                ErrorKind::UnknownTool
            }
            Self::MissingParameters { .. } => ErrorKind::MissingParameters,
            Self::RemoteExecution(_) => ErrorKind::RemoteExecutionError,
            Self::UnsupportedCapability { .. } => ErrorKind::UnsupportedCapability,
            Self::ExecutionFailure(_) | Self::Config(_) | Self::Catalog(_) => {
                ErrorKind::ExecutionFailure
            }
        }
    }

    /// Translate a transport failure for `service`.
    pub(crate) fn from_transport(service: ServiceKind, err: bridge::Error) -> Self {
        match err {
            bridge::Error::NotConnected | bridge::Error::Connect(_) => Self::ConnectionUnavailable {
                service,
                reason: err.to_string(),
            },
            bridge::Error::Status { status, body } => {
                Self::RemoteExecution(format!("{service} service returned {status}: {body}"))
            }
            bridge::Error::Timeout(_) | bridge::Error::InvalidResponse(_) => {
                Self::RemoteExecution(format!("{service} service: {err}"))
            }
            bridge::Error::InvalidEndpoint(_) | bridge::Error::Client(_) => {
                Self::ExecutionFailure(err.to_string())
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
