//! Camera orchestrator daemon.
//!
//! The [`OrchestratorDaemon`] is the one task that owns the
//! [`CameraOrchestrator`]. Two producers feed it:
//!
//! - The continuous [`PositionStream`] from the position source
//! - User commands sent through an [`OrchestratorHandle`]
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                       OrchestratorDaemon                          │
//! │                                                                   │
//! │  PositionStream ──┐                                               │
//! │                   ├──► biased select ──► CameraOrchestrator       │
//! │  Handle commands ─┘          │                 │                  │
//! │                              │                 ▼                  │
//! │                              │          Option<CameraIntent>      │
//! │                              ▼                 │                  │
//! │                    markers / route ──► MapSurface ◄───────────────┘
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Events are processed strictly one at a time. The select is biased toward
//! the position stream, so a sample pushed before a command is always
//! applied before that command. A manual refresh starts a one-shot fetch
//! that the loop polls alongside the stream; refreshes requested while it is
//! pending share its result, so at most one fetch is ever in flight. Shutdown
//! is never held up by a pending fetch.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::error::OrchestratorError;
use super::intent::CameraIntent;
use super::orchestrator::{CameraEvent, CameraOrchestrator, CameraSnapshot};
use crate::coord::Coordinate;
use crate::focus::FocusTarget;
use crate::position::{Position, PositionSource, PositionStream, PositionUpdate};
use crate::route::RoutePlanner;
use crate::surface::{MapRegion, MapSurface};

/// Default channel capacity for user commands.
pub const DEFAULT_COMMAND_CHANNEL_CAPACITY: usize = 64;

type Reply<T> = oneshot::Sender<Result<T, OrchestratorError>>;

type RefreshFetch = Pin<Box<dyn Future<Output = PositionUpdate> + Send>>;

/// A user request for the daemon.
#[derive(Debug)]
pub enum OrchestratorCommand {
    /// Follow a target.
    SetFocus {
        target: FocusTarget,
        reply: Reply<CameraIntent>,
    },
    /// Change pitch by a delta.
    AdjustPitch {
        delta: i32,
        reply: Reply<Option<CameraIntent>>,
    },
    /// Change pitch by one configured step, up or down.
    StepPitch {
        raise: bool,
        reply: Reply<Option<CameraIntent>>,
    },
    /// Fetch the current position once.
    Refresh { reply: Reply<Option<CameraIntent>> },
    /// Read current state.
    Snapshot { reply: Reply<CameraSnapshot> },
}

/// Cloneable handle for sending commands to a running daemon.
#[derive(Debug, Clone)]
pub struct OrchestratorHandle {
    tx: mpsc::Sender<OrchestratorCommand>,
}

impl OrchestratorHandle {
    /// Follow a target ("go to destination" / "return to current location").
    pub async fn set_focus(&self, target: FocusTarget) -> Result<CameraIntent, OrchestratorError> {
        self.request(|reply| OrchestratorCommand::SetFocus { target, reply })
            .await
    }

    /// Change pitch by `delta` degrees.
    pub async fn adjust_pitch(&self, delta: i32) -> Result<Option<CameraIntent>, OrchestratorError> {
        self.request(|reply| OrchestratorCommand::AdjustPitch { delta, reply })
            .await
    }

    /// Increase pitch by one step.
    pub async fn raise_pitch(&self) -> Result<Option<CameraIntent>, OrchestratorError> {
        self.request(|reply| OrchestratorCommand::StepPitch { raise: true, reply })
            .await
    }

    /// Decrease pitch by one step.
    pub async fn lower_pitch(&self) -> Result<Option<CameraIntent>, OrchestratorError> {
        self.request(|reply| OrchestratorCommand::StepPitch {
            raise: false,
            reply,
        })
        .await
    }

    /// Fetch the current position once and recentre if following the device.
    ///
    /// Resolves when the fetch completes, or with
    /// [`OrchestratorError::Stopped`] if the daemon stops first.
    pub async fn refresh(&self) -> Result<Option<CameraIntent>, OrchestratorError> {
        self.request(|reply| OrchestratorCommand::Refresh { reply })
            .await
    }

    /// Queue a refresh without waiting for the fetch.
    ///
    /// The outcome is applied and logged by the daemon.
    pub async fn request_refresh(&self) -> Result<(), OrchestratorError> {
        let (reply, _) = oneshot::channel();
        self.tx
            .send(OrchestratorCommand::Refresh { reply })
            .await
            .map_err(|_| OrchestratorError::Stopped)
    }

    /// Read current state.
    pub async fn snapshot(&self) -> Result<CameraSnapshot, OrchestratorError> {
        self.request(|reply| OrchestratorCommand::Snapshot { reply })
            .await
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(Reply<T>) -> OrchestratorCommand,
    ) -> Result<T, OrchestratorError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(build(reply_tx))
            .await
            .map_err(|_| OrchestratorError::Stopped)?;
        reply_rx.await.map_err(|_| OrchestratorError::Stopped)?
    }
}

/// Long-running task that owns the camera state.
pub struct OrchestratorDaemon<S, M>
where
    S: PositionSource,
    M: MapSurface,
{
    orchestrator: CameraOrchestrator,
    source: Arc<S>,
    surface: Arc<M>,
    route: RoutePlanner,
    command_rx: mpsc::Receiver<OrchestratorCommand>,
    fetch: Option<RefreshFetch>,
    refresh_waiters: Vec<Reply<Option<CameraIntent>>>,
}

impl<S, M> OrchestratorDaemon<S, M>
where
    S: PositionSource,
    M: MapSurface,
{
    /// Create a daemon and the handle used to command it.
    pub fn new(
        orchestrator: CameraOrchestrator,
        source: Arc<S>,
        surface: Arc<M>,
        route: RoutePlanner,
    ) -> (Self, OrchestratorHandle) {
        let (tx, command_rx) = mpsc::channel(DEFAULT_COMMAND_CHANNEL_CAPACITY);
        let daemon = Self {
            orchestrator,
            source,
            surface,
            route,
            command_rx,
            fetch: None,
            refresh_waiters: Vec::new(),
        };
        (daemon, OrchestratorHandle { tx })
    }

    /// Run until shutdown is signalled or every handle is dropped.
    ///
    /// Owns `stream` and releases it on exit.
    pub async fn run(mut self, mut stream: PositionStream, shutdown: CancellationToken) {
        info!(
            destination = %self.orchestrator.destination(),
            focus = %self.orchestrator.focus_target(),
            pitch = %self.orchestrator.pitch(),
            "Camera orchestrator starting"
        );

        let mut stream_open = true;

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Camera orchestrator shutting down");
                    break;
                }

                update = stream.recv(), if stream_open => {
                    match update {
                        Some(Ok(position)) => self.apply_position(position),
                        Some(Err(error)) => {
                            let _ = self.orchestrator.handle(CameraEvent::PositionFailed(error));
                        }
                        None => {
                            info!("Position stream ended");
                            stream_open = false;
                        }
                    }
                }

                fetched = poll_fetch(&mut self.fetch), if self.fetch.is_some() => {
                    self.fetch = None;
                    self.finish_refresh(fetched);
                }

                command = self.command_rx.recv() => {
                    match command {
                        Some(command) => self.handle_command(command),
                        None => {
                            info!("All orchestrator handles dropped");
                            break;
                        }
                    }
                }
            }
        }

        if self.fetch.take().is_some() {
            debug!(
                waiters = self.refresh_waiters.len(),
                "Abandoning pending position refresh"
            );
        }
        // Dropped replies resolve as Stopped
        self.refresh_waiters.clear();
        stream.unsubscribe();
        info!("Camera orchestrator stopped");
    }

    fn handle_command(&mut self, command: OrchestratorCommand) {
        match command {
            OrchestratorCommand::SetFocus { target, reply } => {
                let result = self
                    .orchestrator
                    .handle(CameraEvent::FocusRequested(target))
                    .and_then(|intent| intent.ok_or(OrchestratorError::NoDevicePosition));
                if let Ok(intent) = &result {
                    self.surface.animate_camera(*intent);
                }
                let _ = reply.send(result);
            }
            OrchestratorCommand::AdjustPitch { delta, reply } => {
                let result = self.apply_pitch(delta);
                let _ = reply.send(result);
            }
            OrchestratorCommand::StepPitch { raise, reply } => {
                let step = self.orchestrator.pitch_step();
                let result = self.apply_pitch(if raise { step } else { -step });
                let _ = reply.send(result);
            }
            OrchestratorCommand::Refresh { reply } => {
                self.refresh_waiters.push(reply);
                self.start_refresh();
            }
            OrchestratorCommand::Snapshot { reply } => {
                let _ = reply.send(Ok(self.orchestrator.snapshot()));
            }
        }
    }

    fn apply_pitch(&mut self, delta: i32) -> Result<Option<CameraIntent>, OrchestratorError> {
        match self.orchestrator.handle(CameraEvent::PitchRequested(delta)) {
            Ok(intent) => {
                if let Some(intent) = intent {
                    self.surface.animate_camera(intent);
                }
                Ok(intent)
            }
            Err(OrchestratorError::Pitch(error)) => {
                warn!(delta, pitch = %self.orchestrator.pitch(), "Pitch change rejected");
                self.surface.show_warning(&error.to_string());
                Err(OrchestratorError::Pitch(error))
            }
            Err(error) => Err(error),
        }
    }

    fn start_refresh(&mut self) {
        if self.fetch.is_some() {
            debug!(
                waiters = self.refresh_waiters.len(),
                "Position refresh already in flight"
            );
            return;
        }

        debug!("Manual position refresh");
        let source = Arc::clone(&self.source);
        let fetch: RefreshFetch = Box::pin(async move { source.current().await });
        self.fetch = Some(fetch);
    }

    fn finish_refresh(&mut self, fetched: PositionUpdate) {
        let result = self.apply_refresh(fetched);
        for reply in self.refresh_waiters.drain(..) {
            let _ = reply.send(result.clone());
        }
    }

    fn apply_refresh(
        &mut self,
        fetched: PositionUpdate,
    ) -> Result<Option<CameraIntent>, OrchestratorError> {
        if let Err(error) = &fetched {
            warn!(error = %error, "Position refresh failed, keeping previous camera state");
        }

        let first_fix = !self.orchestrator.is_map_ready();
        let intent = self.orchestrator.handle(CameraEvent::Refreshed(fetched))?;
        self.after_position(first_fix, intent);
        Ok(intent)
    }

    fn apply_position(&mut self, position: Position) {
        let first_fix = !self.orchestrator.is_map_ready();
        let intent = self.orchestrator.on_position(position);
        self.after_position(first_fix, intent);
    }

    /// Surface updates that follow any accepted device position.
    fn after_position(&mut self, first_fix: bool, intent: Option<CameraIntent>) {
        let Some(device) = self.orchestrator.last_device_position().copied() else {
            return;
        };

        if first_fix {
            info!(coordinate = %device.coordinate, "First position fix, revealing map");
            self.surface.reveal(MapRegion::initial(device.coordinate));
        }

        self.surface.show_markers(&self.orchestrator.markers());
        self.update_route(device.coordinate);

        if let Some(intent) = intent {
            debug!(intent = %intent, "Camera follows device");
            self.surface.animate_camera(intent);
        }
    }

    fn update_route(&mut self, origin: Coordinate) {
        match self.route.next_request(origin) {
            None => {}
            Some(Ok(overlay)) => {
                if let Err(error) = self.surface.show_route(&overlay) {
                    warn!(error = %error, "Route overlay omitted");
                    self.route.route_failed();
                }
            }
            Some(Err(error)) => {
                warn!(error = %error, "Route overlay omitted");
            }
        }
    }
}

/// Await the pending fetch, if any.
async fn poll_fetch(fetch: &mut Option<RefreshFetch>) -> PositionUpdate {
    match fetch {
        Some(fetch) => fetch.await,
        None => std::future::pending().await,
    }
}
