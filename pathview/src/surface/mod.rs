//! Map rendering surface boundary.
//!
//! The [`MapSurface`] trait is how the core talks to whatever actually draws
//! the map. Every call is fire-and-forget: the core never waits for an
//! animation to finish, and each camera intent supersedes the previous one.
//! Calls are made from a single task, so a surface sees them in order.
//!
//! [`ChannelSurface`] turns the calls into [`SurfaceCommand`]s on an
//! unbounded channel, letting a renderer on another task (or a test) consume
//! them in emission order.

use serde::Serialize;
use tokio::sync::mpsc;

use crate::camera::CameraIntent;
use crate::coord::Coordinate;
use crate::route::{RouteOverlay, RoutingError};

/// Span of the region shown when the map is first revealed, in degrees.
pub const INITIAL_REGION_DELTA: f64 = 0.005;

/// A labelled pin on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    /// Where the pin sits.
    pub coordinate: Coordinate,
    /// Short label.
    pub title: String,
    /// Longer description shown on tap.
    pub description: String,
}

impl Marker {
    /// Marker for the device position.
    pub fn device(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            title: "You".to_string(),
            description: "Your location".to_string(),
        }
    }

    /// Marker for the destination.
    pub fn destination(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            title: "Destination".to_string(),
            description: "Your destination".to_string(),
        }
    }
}

/// A visible map region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapRegion {
    /// Region centre.
    pub center: Coordinate,
    /// Latitude span in degrees.
    pub latitude_delta: f64,
    /// Longitude span in degrees.
    pub longitude_delta: f64,
}

impl MapRegion {
    /// The region shown when the map first appears.
    pub fn initial(center: Coordinate) -> Self {
        Self {
            center,
            latitude_delta: INITIAL_REGION_DELTA,
            longitude_delta: INITIAL_REGION_DELTA,
        }
    }
}

/// Something that renders the map.
pub trait MapSurface: Send + Sync + 'static {
    /// Show the map for the first time.
    ///
    /// Called once, when the first device position arrives. Until then the
    /// map must stay hidden.
    fn reveal(&self, region: MapRegion);

    /// Move the camera, superseding any animation in flight.
    fn animate_camera(&self, intent: CameraIntent);

    /// Replace the markers on the map.
    fn show_markers(&self, markers: &[Marker]);

    /// Draw or redraw the route overlay.
    ///
    /// Returns an error if the renderer or routing provider failed; the core
    /// logs it and carries on without a route.
    fn show_route(&self, overlay: &RouteOverlay) -> Result<(), RoutingError>;

    /// Show a transient warning to the user.
    fn show_warning(&self, message: &str);

    /// Switch to the permanent no-location state.
    fn location_unavailable(&self);
}

/// One call made on a [`ChannelSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCommand {
    Reveal(MapRegion),
    AnimateCamera(CameraIntent),
    ShowMarkers(Vec<Marker>),
    ShowRoute(RouteOverlay),
    Warning(String),
    LocationUnavailable,
}

impl SurfaceCommand {
    /// The camera intent, if this is a camera move.
    pub fn as_camera_intent(&self) -> Option<&CameraIntent> {
        match self {
            SurfaceCommand::AnimateCamera(intent) => Some(intent),
            _ => None,
        }
    }
}

/// Surface that forwards every call as a [`SurfaceCommand`].
#[derive(Debug, Clone)]
pub struct ChannelSurface {
    tx: mpsc::UnboundedSender<SurfaceCommand>,
}

impl ChannelSurface {
    /// Create a surface and the receiver its commands arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SurfaceCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn forward(&self, command: SurfaceCommand) {
        // Renderer gone: nothing left to draw on
        let _ = self.tx.send(command);
    }
}

impl MapSurface for ChannelSurface {
    fn reveal(&self, region: MapRegion) {
        self.forward(SurfaceCommand::Reveal(region));
    }

    fn animate_camera(&self, intent: CameraIntent) {
        self.forward(SurfaceCommand::AnimateCamera(intent));
    }

    fn show_markers(&self, markers: &[Marker]) {
        self.forward(SurfaceCommand::ShowMarkers(markers.to_vec()));
    }

    fn show_route(&self, overlay: &RouteOverlay) -> Result<(), RoutingError> {
        self.tx
            .send(SurfaceCommand::ShowRoute(overlay.clone()))
            .map_err(|_| RoutingError::Provider("renderer closed".to_string()))
    }

    fn show_warning(&self, message: &str) {
        self.forward(SurfaceCommand::Warning(message.to_string()));
    }

    fn location_unavailable(&self) {
        self.forward(SurfaceCommand::LocationUnavailable);
    }
}
