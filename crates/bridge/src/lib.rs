//! Client side of the remote command executors.
//!
//! Both creative applications run a thin plugin that accepts
//! `POST /execute` with either a typed command (`{"type", "params"}`) or raw
//! script text (`{"code"}`) and answers with JSON. This crate owns that wire
//! shape, the HTTP transport, and the probe that tells a baseline plugin from
//! the extended one.
//!
//! # Example
//!
//! ```no_run
//! use bridge::{CapabilityProbe, CommandRequest, Endpoint, HttpTransport, Transport, TransportConfig};
//!
//! # async fn example() -> bridge::Result<()> {
//! let endpoint = Endpoint::parse("localhost:8400")?;
//! let mut transport = HttpTransport::new(TransportConfig::new(endpoint, "/ping"));
//!
//! if transport.connect().await {
//!     let capability = CapabilityProbe::default().probe(&mut transport).await;
//!     println!("capability: {capability:?}");
//!
//!     let scene = transport
//!         .execute(&CommandRequest::command("get_scene_info", Default::default()))
//!         .await?;
//!     println!("{scene}");
//! }
//!
//! transport.close();
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod probe;
mod protocol;
mod transport;

pub use client::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_EXECUTE_TIMEOUT, HttpTransport, TransportConfig};
pub use error::{Error, Result};
pub use probe::{Capability, CapabilityProbe, EXTENDED_MARKER, PROBE_COMMAND};
pub use protocol::{CommandRequest, Endpoint};
pub use transport::Transport;
