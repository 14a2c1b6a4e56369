//! Camera orchestration.
//!
//! This module decides where the map camera points. It combines the live
//! device position, the fixed destination, and the user's focus and pitch
//! choices into [`CameraIntent`]s for the [`MapSurface`](crate::surface::MapSurface).
//!
//! # Components
//!
//! - [`CameraOrchestrator`] - synchronous state machine, one event in, at most
//!   one intent out
//! - [`OrchestratorDaemon`] - async task that owns the orchestrator and
//!   serializes position samples and user commands
//! - [`OrchestratorHandle`] - cloneable command sender for UI code
//!
//! # Data Flow
//!
//! ```text
//! PositionSource ──► PositionStream ──┐
//!                                     ├──► OrchestratorDaemon ──► MapSurface
//! UI ──► OrchestratorHandle ──────────┘          │
//!                                          CameraOrchestrator
//! ```

mod daemon;
mod error;
mod intent;
mod orchestrator;

pub use daemon::{
    OrchestratorCommand, OrchestratorDaemon, OrchestratorHandle, DEFAULT_COMMAND_CHANNEL_CAPACITY,
};
pub use error::OrchestratorError;
pub use intent::{CameraIntent, ZoomLevels, DEFAULT_DESTINATION_ZOOM, DEFAULT_DEVICE_ZOOM};
pub use orchestrator::{CameraEvent, CameraOrchestrator, CameraSnapshot};
