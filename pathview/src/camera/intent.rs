//! Camera intents and zoom policy.

use serde::Serialize;

use crate::coord::Coordinate;
use crate::focus::{FocusTarget, PitchAngle};

/// Zoom used while tracking the device.
pub const DEFAULT_DEVICE_ZOOM: f64 = 15.0;

/// Zoom used for the destination "arrival" view.
pub const DEFAULT_DESTINATION_ZOOM: f64 = 16.0;

/// A single desired camera placement.
///
/// Derived on demand and handed straight to the surface; each intent
/// supersedes the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraIntent {
    /// Where the camera looks.
    pub center: Coordinate,
    /// Map zoom level.
    pub zoom: f64,
    /// Camera tilt.
    pub pitch: PitchAngle,
}

impl CameraIntent {
    /// Create an intent.
    pub fn new(center: Coordinate, zoom: f64, pitch: PitchAngle) -> Self {
        Self {
            center,
            zoom,
            pitch,
        }
    }
}

impl std::fmt::Display for CameraIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "center={} zoom={} pitch={}",
            self.center, self.zoom, self.pitch
        )
    }
}

/// Zoom level per focus target.
///
/// The destination view is always closer than the tracking view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomLevels {
    device: f64,
    destination: f64,
}

impl Default for ZoomLevels {
    fn default() -> Self {
        Self {
            device: DEFAULT_DEVICE_ZOOM,
            destination: DEFAULT_DESTINATION_ZOOM,
        }
    }
}

impl ZoomLevels {
    /// Create zoom levels.
    ///
    /// Returns `None` unless both are finite and the destination zoom is
    /// greater than the device zoom.
    pub fn new(device: f64, destination: f64) -> Option<Self> {
        if !device.is_finite() || !destination.is_finite() || destination <= device {
            return None;
        }
        Some(Self {
            device,
            destination,
        })
    }

    /// Zoom while tracking the device.
    pub fn device(&self) -> f64 {
        self.device
    }

    /// Zoom for the destination view.
    pub fn destination(&self) -> f64 {
        self.destination
    }

    /// Zoom for the given target.
    pub fn for_target(&self, target: FocusTarget) -> f64 {
        match target {
            FocusTarget::Device => self.device,
            FocusTarget::Destination => self.destination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_zoom_levels() {
        let zoom = ZoomLevels::default();
        assert_eq!(zoom.for_target(FocusTarget::Device), 15.0);
        assert_eq!(zoom.for_target(FocusTarget::Destination), 16.0);
    }

    #[test]
    fn test_destination_must_be_closer() {
        assert!(ZoomLevels::new(15.0, 16.0).is_some());
        assert!(ZoomLevels::new(16.0, 16.0).is_none());
        assert!(ZoomLevels::new(17.0, 16.0).is_none());
        assert!(ZoomLevels::new(f64::NAN, 16.0).is_none());
    }

    #[test]
    fn test_intent_serializes_flat() {
        let intent = CameraIntent::new(
            Coordinate::new(-29.34, -49.72),
            15.0,
            PitchAngle::default(),
        );
        let json = serde_json::to_string(&intent).unwrap();
        assert_eq!(
            json,
            r#"{"center":{"latitude":-29.34,"longitude":-49.72},"zoom":15.0,"pitch":40}"#
        );
    }
}
