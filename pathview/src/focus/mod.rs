//! Camera focus and pitch control.
//!
//! The [`FocusController`] owns the two pieces of user-chosen camera state:
//! which target the camera follows and the viewing pitch.
//!
//! # State Machine
//!
//! ```text
//!            set_focus(Destination)
//!   Device ------------------------> Destination
//!     ^                                   |
//!     +-----------------------------------+
//!            set_focus(Device)
//! ```
//!
//! There are no timed or automatic transitions. Pitch changes are validated
//! against [`PitchAngle::MIN`]..=[`PitchAngle::MAX`] and rejected, never
//! clamped, when they would leave that range.

mod pitch;

pub use pitch::{PitchAngle, PitchError, DEFAULT_PITCH, DEFAULT_PITCH_STEP};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// What the camera is following.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FocusTarget {
    /// Follow the live device position.
    #[default]
    Device,
    /// Hold on the fixed destination.
    Destination,
}

impl FocusTarget {
    /// Get a human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            FocusTarget::Device => "current location",
            FocusTarget::Destination => "destination",
        }
    }
}

impl std::fmt::Display for FocusTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FocusTarget::Device => write!(f, "device"),
            FocusTarget::Destination => write!(f, "destination"),
        }
    }
}

/// Holds the active focus target and pitch angle.
#[derive(Debug, Clone)]
pub struct FocusController {
    target: FocusTarget,
    pitch: PitchAngle,
    pitch_step: i32,
}

impl Default for FocusController {
    fn default() -> Self {
        Self::new(PitchAngle::default(), DEFAULT_PITCH_STEP)
    }
}

impl FocusController {
    /// Create a controller focused on the device.
    ///
    /// A `pitch_step` outside `1..=PitchAngle::MAX` could never be applied,
    /// so it is replaced by [`DEFAULT_PITCH_STEP`].
    pub fn new(initial_pitch: PitchAngle, pitch_step: i32) -> Self {
        let pitch_step = if (1..=PitchAngle::MAX as i32).contains(&pitch_step) {
            pitch_step
        } else {
            warn!(
                pitch_step,
                default = DEFAULT_PITCH_STEP,
                "Pitch step out of range, using default"
            );
            DEFAULT_PITCH_STEP
        };
        Self {
            target: FocusTarget::Device,
            pitch: initial_pitch,
            pitch_step,
        }
    }

    /// The active focus target.
    pub fn target(&self) -> FocusTarget {
        self.target
    }

    /// The current pitch angle.
    pub fn pitch(&self) -> PitchAngle {
        self.pitch
    }

    /// The increment used by [`raise_pitch`](Self::raise_pitch) and
    /// [`lower_pitch`](Self::lower_pitch).
    pub fn pitch_step(&self) -> i32 {
        self.pitch_step
    }

    /// Switch the focus target.
    ///
    /// Returns `true` if the target changed. Setting the current target again
    /// is a no-op here.
    pub fn set_focus(&mut self, target: FocusTarget) -> bool {
        if self.target == target {
            debug!(target = %target, "Focus unchanged");
            return false;
        }

        info!(from = %self.target, to = %target, "Focus target changed");
        self.target = target;
        true
    }

    /// Apply a pitch delta.
    ///
    /// Commits and returns the new pitch when it stays within range; otherwise
    /// leaves the pitch untouched and returns the rejection.
    pub fn adjust_pitch(&mut self, delta: i32) -> Result<PitchAngle, PitchError> {
        let next = self.pitch.offset(delta)?;
        debug!(from = %self.pitch, to = %next, delta, "Pitch adjusted");
        self.pitch = next;
        Ok(next)
    }

    /// Increase pitch by one step.
    pub fn raise_pitch(&mut self) -> Result<PitchAngle, PitchError> {
        self.adjust_pitch(self.pitch_step)
    }

    /// Decrease pitch by one step.
    pub fn lower_pitch(&mut self) -> Result<PitchAngle, PitchError> {
        self.adjust_pitch(-self.pitch_step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let controller = FocusController::default();
        assert_eq!(controller.target(), FocusTarget::Device);
        assert_eq!(controller.pitch().degrees(), 40);
        assert_eq!(controller.pitch_step(), 5);
    }

    #[test]
    fn test_set_focus_is_idempotent() {
        let mut controller = FocusController::default();
        assert!(controller.set_focus(FocusTarget::Destination));
        assert!(!controller.set_focus(FocusTarget::Destination));
        assert_eq!(controller.target(), FocusTarget::Destination);

        assert!(controller.set_focus(FocusTarget::Device));
        assert_eq!(controller.target(), FocusTarget::Device);
    }

    #[test]
    fn test_pitch_boundary_sequence() {
        let mut controller = FocusController::default();

        // 40 + 35 = 75: rejected, unchanged
        let err = controller.adjust_pitch(35).unwrap_err();
        assert_eq!(err.requested(), 75);
        assert_eq!(controller.pitch().degrees(), 40);

        // 40 + 30 = 70: accepted
        assert_eq!(controller.adjust_pitch(30).unwrap().degrees(), 70);

        // 70 + 5: rejected
        assert!(controller.adjust_pitch(5).is_err());
        assert_eq!(controller.pitch().degrees(), 70);
    }

    #[test]
    fn test_lower_pitch_to_zero_and_below() {
        let mut controller = FocusController::new(PitchAngle::new(5).unwrap(), 5);
        assert_eq!(controller.lower_pitch().unwrap().degrees(), 0);
        assert!(controller.lower_pitch().is_err());
        assert_eq!(controller.pitch().degrees(), 0);
    }

    #[test]
    fn test_out_of_range_step_uses_default() {
        for step in [i32::MIN, -5, 0, 71, i32::MAX] {
            let mut controller = FocusController::new(PitchAngle::default(), step);
            assert_eq!(controller.pitch_step(), DEFAULT_PITCH_STEP);
            assert_eq!(controller.lower_pitch().unwrap().degrees(), 35);
        }
        assert_eq!(FocusController::new(PitchAngle::default(), 70).pitch_step(), 70);
    }

    #[test]
    fn test_raise_pitch_steps() {
        let mut controller = FocusController::default();
        assert_eq!(controller.raise_pitch().unwrap().degrees(), 45);
        assert_eq!(controller.raise_pitch().unwrap().degrees(), 50);
    }

    #[test]
    fn test_pitch_change_keeps_focus() {
        let mut controller = FocusController::default();
        controller.set_focus(FocusTarget::Destination);
        controller.raise_pitch().unwrap();
        assert_eq!(controller.target(), FocusTarget::Destination);
    }

    #[test]
    fn test_focus_target_display() {
        assert_eq!(format!("{}", FocusTarget::Device), "device");
        assert_eq!(format!("{}", FocusTarget::Destination), "destination");
        assert_eq!(FocusTarget::Destination.description(), "destination");
    }
}
