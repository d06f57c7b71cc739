//! In-memory registry of long-lived client notification channels.
//!
//! A client that keeps a channel open (for example a streaming connection)
//! gets a [`SessionId`]. Tool results dispatched on its behalf are pushed into
//! that session's queue as [`Event`]s, and the transport layer drains the queue
//! through the [`SessionReceiver`] and forwards events to the client. The
//! registry knows nothing about network framing.
//!
//! # Example
//!
//! ```
//! use sessions::{EventKind, SessionRegistry};
//!
//! # async fn example() -> sessions::Result<()> {
//! let registry = SessionRegistry::new();
//! let id = registry.open();
//! let mut events = registry.take_receiver(id)?;
//!
//! registry.push(id, EventKind::Notice { message: "connected".into() });
//! if let Some(event) = events.recv().await {
//!     println!("{}: {:?}", event.timestamp, event.kind);
//! }
//!
//! registry.close(id);
//! # Ok(())
//! # }
//! ```

mod error;
mod event;
mod registry;

pub use error::{Error, Result};
pub use event::{Event, EventKind, SessionId};
pub use registry::{SessionInfo, SessionReceiver, SessionRegistry};
