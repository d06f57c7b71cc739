//! Catalog error types.

use thiserror::Error;

/// Catalog errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Two definitions share a name.
    #[error("duplicate tool definition: {0}")]
    DuplicateTool(String),

    /// No definition with this name.
    #[error("unknown tool: {0}")]
    UnknownTool(String),
}

pub type Result<T> = std::result::Result<T, Error>;
