//! Session configuration.
//!
//! `SessionConfig` gathers everything needed to start a [`Session`](super::Session):
//! the fixed destination, camera policy, position watch options and route
//! overlay settings.

use crate::camera::ZoomLevels;
use crate::coord::Coordinate;
use crate::focus::{PitchAngle, DEFAULT_PITCH_STEP};
use crate::position::WatchOptions;
use crate::route::{RouteStyle, RoutingCredential, DEFAULT_ROUTE_REFRESH_DISTANCE_M};

/// Destination used when none is configured.
pub const DEFAULT_DESTINATION: Coordinate = Coordinate::new(-29.3409, -49.7267);

/// Configuration for one tracking session.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Fixed destination for the whole session.
    pub destination: Coordinate,

    /// Zoom per focus target.
    pub zoom: ZoomLevels,

    /// Pitch the camera starts at.
    pub initial_pitch: PitchAngle,

    /// Degrees per raise/lower step.
    pub pitch_step: i32,

    /// Options for the continuous position subscription.
    pub watch: WatchOptions,

    /// Route line styling.
    pub route_style: RouteStyle,

    /// Routing provider credential; the route overlay is skipped without one.
    pub routing_credential: Option<RoutingCredential>,

    /// Device movement in metres before the route is requested again.
    pub route_refresh_distance_m: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            destination: DEFAULT_DESTINATION,
            zoom: ZoomLevels::default(),
            initial_pitch: PitchAngle::default(),
            pitch_step: DEFAULT_PITCH_STEP,
            watch: WatchOptions::default(),
            route_style: RouteStyle::default(),
            routing_credential: None,
            route_refresh_distance_m: DEFAULT_ROUTE_REFRESH_DISTANCE_M,
        }
    }
}

impl SessionConfig {
    /// Create a config for the given destination with defaults elsewhere.
    pub fn new(destination: Coordinate) -> Self {
        Self {
            destination,
            ..Self::default()
        }
    }

    /// Set the routing credential.
    pub fn with_routing_credential(mut self, credential: Option<RoutingCredential>) -> Self {
        self.routing_credential = credential;
        self
    }

    /// Set the zoom levels.
    pub fn with_zoom(mut self, zoom: ZoomLevels) -> Self {
        self.zoom = zoom;
        self
    }

    /// Set the initial pitch and the step used by raise/lower.
    pub fn with_pitch(mut self, initial: PitchAngle, step: i32) -> Self {
        self.initial_pitch = initial;
        self.pitch_step = step;
        self
    }

    /// Set the position watch options.
    pub fn with_watch_options(mut self, watch: WatchOptions) -> Self {
        self.watch = watch;
        self
    }

    /// Set the route line styling.
    pub fn with_route_style(mut self, style: RouteStyle) -> Self {
        self.route_style = style;
        self
    }

    /// Set the route refresh distance.
    pub fn with_route_refresh_distance_m(mut self, metres: f64) -> Self {
        self.route_refresh_distance_m = metres;
        self
    }
}
