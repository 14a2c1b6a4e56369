//! PathView - live position tracking and map camera orchestration
//!
//! This library keeps a map camera pointed at the right place while a user
//! walks toward a fixed destination. It consumes a stream of device
//! positions and user camera requests (follow me, show destination, tilt)
//! and produces an ordered stream of camera moves, markers and route
//! overlay requests for whatever renders the map.
//!
//! # Modules
//!
//! - [`session`] - startup sequence and lifecycle
//! - [`camera`] - the orchestrator state machine and its daemon
//! - [`position`] - position sources, sample filtering and subscriptions
//! - [`focus`] - focus target and pitch
//! - [`surface`] - the map rendering boundary
//! - [`route`] - route overlay requests
//! - [`permission`] - location permission gate
//! - [`config`] and [`logging`] - configuration file and log setup

pub mod camera;
pub mod config;
pub mod coord;
pub mod focus;
pub mod logging;
pub mod permission;
pub mod position;
pub mod route;
pub mod session;
pub mod surface;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
