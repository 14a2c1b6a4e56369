//! Camera orchestration state machine.
//!
//! [`CameraOrchestrator`] is the single authority on where the camera points.
//! It is a plain synchronous state machine: feed it one [`CameraEvent`] at a
//! time and it answers with at most one [`CameraIntent`]. The async plumbing
//! lives in [`OrchestratorDaemon`](super::OrchestratorDaemon).
//!
//! # Policy
//!
//! ```text
//! Event                      Device focus                Destination focus
//! ─────────────────────────  ──────────────────────────  ─────────────────────────
//! position sample            intent @ sample, zoom 15    store only, no intent
//! set_focus(Destination)     intent @ destination, 16    intent @ destination, 16
//! set_focus(Device)          intent @ last sample, 15    intent @ last sample, 15
//! pitch accepted             intent @ last sample        intent @ destination
//! pitch rejected             none                        none
//! refresh ok                 intent @ fix                store only, no intent
//! refresh / sample failed    none, state kept            none, state kept
//! ```
//!
//! Until the first position arrives the map is hidden: focus changes are
//! rejected with [`OrchestratorError::NoDevicePosition`] and accepted pitch
//! changes are stored without an intent.

use serde::Serialize;
use tracing::{debug, warn};

use super::error::OrchestratorError;
use super::intent::{CameraIntent, ZoomLevels};
use crate::coord::Coordinate;
use crate::focus::{FocusController, FocusTarget, PitchAngle};
use crate::position::{Position, PositionError};
use crate::surface::Marker;

/// One input to the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum CameraEvent {
    /// A sample from the continuous position stream.
    PositionSample(Position),
    /// The continuous stream reported a failure.
    PositionFailed(PositionError),
    /// The user asked to follow a target.
    FocusRequested(FocusTarget),
    /// The user asked to change pitch by this many degrees.
    PitchRequested(i32),
    /// A manual refresh finished.
    Refreshed(Result<Position, PositionError>),
}

/// Point-in-time view of orchestrator state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CameraSnapshot {
    /// Active focus target.
    pub focus: FocusTarget,
    /// Current pitch.
    pub pitch: PitchAngle,
    /// Fixed destination.
    pub destination: Coordinate,
    /// Most recent device position, if any.
    pub last_device_position: Option<Position>,
    /// Whether the map has been revealed.
    pub map_ready: bool,
}

/// Reconciles position samples and user camera requests into camera intents.
#[derive(Debug, Clone)]
pub struct CameraOrchestrator {
    focus: FocusController,
    destination: Coordinate,
    zoom: ZoomLevels,
    last_device: Option<Position>,
}

impl CameraOrchestrator {
    /// Create an orchestrator for a fixed destination.
    pub fn new(destination: Coordinate, zoom: ZoomLevels, focus: FocusController) -> Self {
        Self {
            focus,
            destination,
            zoom,
            last_device: None,
        }
    }

    /// Active focus target.
    pub fn focus_target(&self) -> FocusTarget {
        self.focus.target()
    }

    /// Current pitch.
    pub fn pitch(&self) -> PitchAngle {
        self.focus.pitch()
    }

    /// Degrees per raise/lower step.
    pub fn pitch_step(&self) -> i32 {
        self.focus.pitch_step()
    }

    /// The fixed destination.
    pub fn destination(&self) -> Coordinate {
        self.destination
    }

    /// Zoom policy in use.
    pub fn zoom_levels(&self) -> ZoomLevels {
        self.zoom
    }

    /// The last known device position.
    pub fn last_device_position(&self) -> Option<&Position> {
        self.last_device.as_ref()
    }

    /// Whether a device position has arrived, so the map may render.
    pub fn is_map_ready(&self) -> bool {
        self.last_device.is_some()
    }

    /// Capture current state.
    pub fn snapshot(&self) -> CameraSnapshot {
        CameraSnapshot {
            focus: self.focus.target(),
            pitch: self.focus.pitch(),
            destination: self.destination,
            last_device_position: self.last_device,
            map_ready: self.is_map_ready(),
        }
    }

    /// Markers to show: the device (once known) and the destination.
    pub fn markers(&self) -> Vec<Marker> {
        let mut markers = Vec::with_capacity(2);
        if let Some(device) = &self.last_device {
            markers.push(Marker::device(device.coordinate));
        }
        markers.push(Marker::destination(self.destination));
        markers
    }

    /// Intent for the active target, or `None` while no device position is known.
    pub fn current_intent(&self) -> Option<CameraIntent> {
        let device = self.last_device.as_ref()?;
        let target = self.focus.target();
        let center = match target {
            FocusTarget::Device => device.coordinate,
            FocusTarget::Destination => self.destination,
        };
        Some(CameraIntent::new(
            center,
            self.zoom.for_target(target),
            self.focus.pitch(),
        ))
    }

    /// Process one event.
    ///
    /// `Ok(Some(_))` means the camera should move, `Ok(None)` means the event
    /// was absorbed without a move.
    pub fn handle(&mut self, event: CameraEvent) -> Result<Option<CameraIntent>, OrchestratorError> {
        match event {
            CameraEvent::PositionSample(position) => Ok(self.on_position(position)),
            CameraEvent::PositionFailed(error) => {
                warn!(error = %error, "Position stream error, keeping previous camera state");
                Ok(None)
            }
            CameraEvent::FocusRequested(target) => self.set_focus(target).map(Some),
            CameraEvent::PitchRequested(delta) => self.adjust_pitch(delta),
            CameraEvent::Refreshed(result) => Ok(self.on_refresh(result?)),
        }
    }

    /// Record a new device position.
    ///
    /// Always updates the last known position; returns an intent only while
    /// following the device.
    pub fn on_position(&mut self, position: Position) -> Option<CameraIntent> {
        self.last_device = Some(position);
        match self.focus.target() {
            FocusTarget::Device => self.current_intent(),
            FocusTarget::Destination => {
                debug!(
                    coordinate = %position.coordinate,
                    "Device moved while holding on destination"
                );
                None
            }
        }
    }

    /// Switch focus and recentre on the new target.
    ///
    /// Re-selecting the active target still recentres. Rejected without any
    /// state change while no device position is known.
    pub fn set_focus(&mut self, target: FocusTarget) -> Result<CameraIntent, OrchestratorError> {
        if !self.is_map_ready() {
            debug!(target = %target, "Focus change rejected: no device position yet");
            return Err(OrchestratorError::NoDevicePosition);
        }

        self.focus.set_focus(target);
        self.current_intent()
            .ok_or(OrchestratorError::NoDevicePosition)
    }

    /// Change pitch and recentre on the active target.
    pub fn adjust_pitch(&mut self, delta: i32) -> Result<Option<CameraIntent>, OrchestratorError> {
        self.focus.adjust_pitch(delta)?;
        Ok(self.current_intent())
    }

    /// Apply a successful manual refresh.
    ///
    /// Same as a stream sample: stored, intent only under device focus. A fix
    /// older than the last known position is ignored.
    pub fn on_refresh(&mut self, position: Position) -> Option<CameraIntent> {
        if let Some(last) = &self.last_device {
            if position.timestamp < last.timestamp {
                debug!(
                    coordinate = %position.coordinate,
                    last = %last.coordinate,
                    "Refreshed fix is older than last known position, ignored"
                );
                return None;
            }
        }
        self.on_position(position)
    }
}
