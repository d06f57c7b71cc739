//! Relay core: connection management and tool dispatch.
//!
//! An agent names a cataloged tool and passes arguments; the relay validates
//! them, routes the call to the connection manager for the modeling tool or
//! the engine editor, translates it into that service's command protocol and
//! returns a normalized [`Envelope`].
//!
//! # Overview
//!
//! - **ConnectionManager**: owns one self-healing connection per remote
//!   service. Retries the initial connect, probes the add-on's capability,
//!   reconnects lazily after a broken transport and falls back to a stub for
//!   read-only queries when the service cannot be reached.
//! - **Dispatcher**: validates against the [`catalog::Catalog`], shapes
//!   arguments, runs composed calls in order and never lets an error escape
//!   as anything but an envelope.
//! - **Relay**: the dispatcher plus a [`sessions::SessionRegistry`], exposing
//!   `handle_tool_call`, session-aware dispatch and a status snapshot.
//!
//! # Example
//!
//! ```no_run
//! use relay::{Relay, RelayConfig};
//! use serde_json::{Map, json};
//!
//! # async fn example() -> relay::Result<()> {
//! let relay = Relay::from_config(&RelayConfig::default())?;
//!
//! let mut arguments = Map::new();
//! arguments.insert("type".into(), json!("CUBE"));
//! arguments.insert("color".into(), json!([1.0, 0.0, 0.0]));
//!
//! let envelope = relay
//!     .handle_tool_call("mcp_blender_create_primitive", &arguments)
//!     .await;
//! println!("{}", envelope.to_value());
//! # Ok(())
//! # }
//! ```

mod config;
mod connection;
mod dispatch;
mod envelope;
mod error;
mod plan;
mod relay;
mod stub;
#[cfg(test)]
mod testing;

pub use config::{
    ConnectionConfig, DEFAULT_ENGINE_PORT, DEFAULT_EXTENDED_MODELING_PORT, DEFAULT_MODELING_PORT,
    EngineConfig, ModelingConfig, RelayConfig,
};
pub use connection::{
    ConnectionManager, ConnectionState, ConnectionStatus, ManagerConfig, RetryPolicy,
};
pub use dispatch::Dispatcher;
pub use envelope::{Envelope, Status};
pub use error::{Error, ErrorKind, Result};
pub use relay::{ENGINE_LIVENESS_PATH, MODELING_LIVENESS_PATH, Relay, StatusReport};
pub use stub::{STUB_MARKER, StubResponder};
