//! Route overlay requests.
//!
//! The route line between the device and the destination is drawn by an
//! external directions renderer. This module only builds the request handed
//! to it: endpoints, styling, and the routing-provider credential. The
//! provider's response is never parsed here.
//!
//! A missing credential is not fatal. [`RouteOverlay::new`] refuses to build
//! a request without one, and callers simply skip the overlay.
//!
//! [`RoutePlanner`] decides when the overlay needs redrawing: on the first
//! device fix, then whenever the device has moved far enough from the origin
//! of the last request.

use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use url::form_urlencoded;

use crate::coord::{self, Coordinate};

/// Directions endpoint used by [`RouteOverlay::directions_url`].
pub const DIRECTIONS_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/directions/json";

/// Default route line width in points.
pub const DEFAULT_STROKE_WIDTH: f32 = 3.0;

/// Default route line colour.
pub const DEFAULT_STROKE_COLOR: &str = "hotpink";

/// Minimum device movement, in metres, before the route is requested again.
pub const DEFAULT_ROUTE_REFRESH_DISTANCE_M: f64 = 25.0;

/// Why a route overlay could not be shown.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// No routing-provider credential was configured.
    #[error("Routing unavailable: no routing provider credential configured")]
    MissingCredential,

    /// The provider or renderer failed.
    #[error("Routing unavailable: {0}")]
    Provider(String),
}

/// Opaque credential for the routing provider.
///
/// Never printed in full; `Debug` and `Display` show a masked form.
#[derive(Clone, PartialEq, Eq)]
pub struct RoutingCredential(String);

impl RoutingCredential {
    /// Wrap a credential, treating blank strings as absent.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// The raw credential, for handing to the renderer.
    pub fn expose(&self) -> &str {
        &self.0
    }

    fn masked(&self) -> String {
        let tail: String = self
            .0
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        format!("****{}", tail)
    }
}

impl std::fmt::Debug for RoutingCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RoutingCredential({})", self.masked())
    }
}

impl std::fmt::Display for RoutingCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.masked())
    }
}

/// Styling for the route line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteStyle {
    /// Line width in points.
    pub stroke_width: f32,
    /// Line colour (CSS colour name or hex).
    pub stroke_color: String,
}

impl Default for RouteStyle {
    fn default() -> Self {
        Self {
            stroke_width: DEFAULT_STROKE_WIDTH,
            stroke_color: DEFAULT_STROKE_COLOR.to_string(),
        }
    }
}

/// A request to draw the routed path from the device to the destination.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteOverlay {
    /// Route start (the device).
    pub origin: Coordinate,
    /// Route end (the destination).
    pub destination: Coordinate,
    /// Line styling.
    pub style: RouteStyle,
    credential: RoutingCredential,
}

impl RouteOverlay {
    /// Build an overlay request.
    ///
    /// Fails with [`RoutingError::MissingCredential`] when no credential is
    /// available.
    pub fn new(
        origin: Coordinate,
        destination: Coordinate,
        style: RouteStyle,
        credential: Option<&RoutingCredential>,
    ) -> Result<Self, RoutingError> {
        let credential = credential.ok_or(RoutingError::MissingCredential)?;
        Ok(Self {
            origin,
            destination,
            style,
            credential: credential.clone(),
        })
    }

    /// The credential the renderer should authenticate with.
    pub fn credential(&self) -> &RoutingCredential {
        &self.credential
    }

    /// URL of the directions request for renderers that fetch it themselves.
    ///
    /// Query values are form-encoded, so any credential is safe to embed.
    pub fn directions_url(&self) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair(
                "origin",
                &format!("{},{}", self.origin.latitude, self.origin.longitude),
            )
            .append_pair(
                "destination",
                &format!("{},{}", self.destination.latitude, self.destination.longitude),
            )
            .append_pair("key", self.credential.expose())
            .finish();
        format!("{}?{}", DIRECTIONS_ENDPOINT, query)
    }
}

/// Throttles route requests as the device moves.
#[derive(Debug, Clone)]
pub struct RoutePlanner {
    destination: Coordinate,
    style: RouteStyle,
    credential: Option<RoutingCredential>,
    refresh_distance_m: f64,
    last_origin: Option<Coordinate>,
    missing_reported: bool,
}

impl RoutePlanner {
    /// Create a planner for a fixed destination.
    ///
    /// A negative or non-finite `refresh_distance_m` is treated as zero, so
    /// every position produces a request.
    pub fn new(
        destination: Coordinate,
        style: RouteStyle,
        credential: Option<RoutingCredential>,
        refresh_distance_m: f64,
    ) -> Self {
        let refresh_distance_m = if refresh_distance_m.is_finite() {
            refresh_distance_m.max(0.0)
        } else {
            0.0
        };
        Self {
            destination,
            style,
            credential,
            refresh_distance_m,
            last_origin: None,
            missing_reported: false,
        }
    }

    /// Whether a credential is configured.
    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    /// Origin of the last request, if any.
    pub fn last_origin(&self) -> Option<Coordinate> {
        self.last_origin
    }

    /// Forget the last request after the surface failed to draw it, so the
    /// next device position asks again.
    pub fn route_failed(&mut self) {
        if let Some(origin) = self.last_origin.take() {
            debug!(origin = %origin, "Route draw failed, will request again");
        }
    }

    /// Route request for a new device position.
    ///
    /// Returns `None` when nothing needs to be drawn: the device is still
    /// within the refresh distance of the last request, or the missing
    /// credential has already been reported once.
    pub fn next_request(
        &mut self,
        origin: Coordinate,
    ) -> Option<Result<RouteOverlay, RoutingError>> {
        if let Some(last) = self.last_origin {
            let moved = coord::distance_m(&last, &origin);
            if moved < self.refresh_distance_m {
                return None;
            }
            debug!(moved_m = moved, "Device moved, requesting route again");
        }
        self.last_origin = Some(origin);

        match RouteOverlay::new(
            origin,
            self.destination,
            self.style.clone(),
            self.credential.as_ref(),
        ) {
            Ok(overlay) => Some(Ok(overlay)),
            Err(error) if self.missing_reported => {
                debug!(error = %error, "Route overlay still unavailable");
                None
            }
            Err(error) => {
                self.missing_reported = true;
                Some(Err(error))
            }
        }
    }
}
