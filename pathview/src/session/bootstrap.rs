//! Session bootstrap implementation.
//!
//! `Session::start` runs the startup sequence in order:
//!
//! 1. Acquire location permission (once)
//! 2. Subscribe to the position source
//! 3. Spawn the orchestrator daemon
//! 4. Queue an initial fix so the map can appear without waiting for the
//!    first stream sample
//!
//! `start` returns once the fix is queued; a slow platform fetch never delays
//! it.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{info, warn};

use super::config::SessionConfig;
use super::error::SessionError;
use crate::camera::{CameraOrchestrator, OrchestratorDaemon, OrchestratorHandle};
use crate::focus::FocusController;
use crate::permission::{PermissionGate, PermissionPrompt, PermissionState};
use crate::position::PositionSource;
use crate::route::RoutePlanner;
use crate::surface::MapSurface;

/// A running tracking session.
///
/// Dropping the session cancels the daemon; [`shutdown`](Self::shutdown)
/// additionally waits for it to finish.
pub struct Session {
    handle: OrchestratorHandle,
    shutdown: CancellationToken,
    task: JoinHandle<()>,
    _guard: DropGuard,
}

impl Session {
    /// Start a session.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::PermissionDenied`] after switching the surface
    /// to its no-location state when access is refused, or
    /// [`SessionError::Position`] if the subscription cannot be started.
    /// The initial fix is not awaited, and a failed one is not an error; the
    /// stream will supply one.
    pub async fn start<P, S, M>(
        config: SessionConfig,
        gate: &PermissionGate<P>,
        source: Arc<S>,
        surface: Arc<M>,
    ) -> Result<Self, SessionError>
    where
        P: PermissionPrompt,
        S: PositionSource,
        M: MapSurface,
    {
        if gate.acquire().await == PermissionState::Denied {
            surface.location_unavailable();
            return Err(SessionError::PermissionDenied);
        }

        let stream = source.subscribe(config.watch)?;

        let orchestrator = CameraOrchestrator::new(
            config.destination,
            config.zoom,
            FocusController::new(config.initial_pitch, config.pitch_step),
        );
        let route = RoutePlanner::new(
            config.destination,
            config.route_style.clone(),
            config.routing_credential.clone(),
            config.route_refresh_distance_m,
        );
        if !route.has_credential() {
            warn!("No routing credential configured, route overlay disabled");
        }

        let (daemon, handle) = OrchestratorDaemon::new(orchestrator, source, surface, route);
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(daemon.run(stream, shutdown.clone()));

        info!(
            destination = %config.destination,
            accuracy = %config.watch.accuracy,
            interval_ms = config.watch.min_interval.as_millis() as u64,
            "Session started"
        );

        if let Err(e) = handle.request_refresh().await {
            warn!(error = %e, "Initial position fix not requested, waiting for stream");
        }

        Ok(Self {
            handle,
            _guard: shutdown.clone().drop_guard(),
            shutdown,
            task,
        })
    }

    /// Handle for sending camera commands.
    pub fn handle(&self) -> OrchestratorHandle {
        self.handle.clone()
    }

    /// Whether the daemon is still running.
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop the daemon, release the position subscription and wait.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        if let Err(e) = self.task.await {
            warn!(error = %e, "Orchestrator task ended abnormally");
        }
        info!("Session stopped");
    }
}
