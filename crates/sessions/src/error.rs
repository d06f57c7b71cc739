use thiserror::Error;

use crate::SessionId;

#[derive(Debug, Error)]
pub enum Error {
    #[error("session not found: {0}")]
    NotFound(SessionId),

    #[error("session {0} already has a consumer")]
    ReceiverTaken(SessionId),

    #[error("invalid session id: {0}")]
    InvalidId(String),
}

pub type Result<T> = std::result::Result<T, Error>;
