//! Static catalog of the tools an agent may invoke.
//!
//! Each [`ToolDefinition`] names the remote service it targets and the
//! parameters it accepts. The catalog performs no I/O: it answers lookups and
//! reports which required parameters a call is missing.

mod builtin;
mod catalog;
mod error;
mod tool;

pub use catalog::Catalog;
pub use error::{Error, Result};
pub use tool::{Parameter, ServiceKind, ToolDefinition};
