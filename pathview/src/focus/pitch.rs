//! Camera pitch angle.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pitch the camera starts with.
pub const DEFAULT_PITCH: u8 = 40;

/// Degrees added or removed per user pitch action.
pub const DEFAULT_PITCH_STEP: i32 = 5;

/// A requested pitch fell outside the allowed range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PitchError {
    #[error("Pitch can only be between {min} and {max} (requested {requested})")]
    OutOfRange { requested: i32, min: u8, max: u8 },
}

impl PitchError {
    /// The pitch that was asked for.
    pub fn requested(&self) -> i32 {
        match self {
            PitchError::OutOfRange { requested, .. } => *requested,
        }
    }
}

/// Camera tilt from straight down, in whole degrees within [0, 70].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct PitchAngle(u8);

impl PitchAngle {
    /// Straight down.
    pub const MIN: u8 = 0;
    /// Steepest allowed tilt.
    pub const MAX: u8 = 70;

    /// Create a pitch, rejecting values outside [0, 70].
    pub fn new(degrees: i32) -> Result<Self, PitchError> {
        if degrees < Self::MIN as i32 || degrees > Self::MAX as i32 {
            return Err(PitchError::OutOfRange {
                requested: degrees,
                min: Self::MIN,
                max: Self::MAX,
            });
        }
        Ok(Self(degrees as u8))
    }

    /// The angle in degrees.
    pub fn degrees(&self) -> u8 {
        self.0
    }

    /// The pitch `delta` degrees away, if still in range.
    pub fn offset(&self, delta: i32) -> Result<Self, PitchError> {
        Self::new((self.0 as i32).saturating_add(delta))
    }
}

impl Default for PitchAngle {
    fn default() -> Self {
        Self(DEFAULT_PITCH)
    }
}

impl TryFrom<i32> for PitchAngle {
    type Error = PitchError;

    fn try_from(degrees: i32) -> Result<Self, Self::Error> {
        Self::new(degrees)
    }
}

impl From<PitchAngle> for i32 {
    fn from(pitch: PitchAngle) -> Self {
        pitch.0 as i32
    }
}

impl std::fmt::Display for PitchAngle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}°", self.0)
    }
}
