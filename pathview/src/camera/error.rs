//! Camera orchestration errors.

use thiserror::Error;

use crate::focus::PitchError;
use crate::position::PositionError;

/// Errors returned by camera operations.
///
/// None of these are fatal; the session keeps running and the previous
/// camera state is preserved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrchestratorError {
    /// The operation needs a device position and none has arrived yet.
    #[error("No device position received yet")]
    NoDevicePosition,

    /// A pitch change was rejected.
    #[error(transparent)]
    Pitch(#[from] PitchError),

    /// A position fetch failed.
    #[error(transparent)]
    Position(#[from] PositionError),

    /// The orchestrator task is no longer running.
    #[error("Camera orchestrator has stopped")]
    Stopped,
}
