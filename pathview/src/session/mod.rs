//! Session bootstrap and lifecycle.
//!
//! A [`Session`] wires the pieces together for one run of the map screen:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                           Session                             │
//! │                                                               │
//! │  1. PermissionGate ──► Denied ──► MapSurface::location_unavailable
//! │         │                                                     │
//! │         ▼ Granted                                             │
//! │  2. PositionSource::subscribe ──► PositionStream              │
//! │                                                               │
//! │  3. OrchestratorDaemon (owns stream, orchestrator, route)     │
//! │         ▲                                                     │
//! │  4. OrchestratorHandle::refresh (initial fix)                 │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use pathview::permission::{PermissionGate, StaticPrompt};
//! use pathview::session::{Session, SessionConfig};
//!
//! let gate = PermissionGate::new(StaticPrompt::granted());
//! let session = Session::start(SessionConfig::default(), &gate, source, surface).await?;
//!
//! session.handle().set_focus(FocusTarget::Destination).await?;
//!
//! session.shutdown().await;
//! ```

mod bootstrap;
mod config;
mod error;

pub use bootstrap::Session;
pub use config::{SessionConfig, DEFAULT_DESTINATION};
pub use error::SessionError;
