//! Run command - simulated walk toward the destination with live camera control.
//!
//! Starts a session backed by a simulated position source and a console map
//! surface, then reads single-key commands from stdin until `q`, Ctrl+C, or
//! end of input.

use std::sync::Arc;
use std::time::Duration;

use console::style;
use pathview::camera::{OrchestratorError, OrchestratorHandle};
use pathview::focus::FocusTarget;
use pathview::logging::init_logging;
use pathview::permission::{PermissionGate, PermissionState};
use pathview::position::{SimulatedPositionSource, SimulationConfig};
use pathview::session::{Session, SessionConfig};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::common::{resolve_config, Overrides};
use crate::error::CliError;
use crate::ui::{ConsoleSurface, OutputMode, TerminalPrompt};

/// Arguments for the run command.
pub struct RunArgs {
    pub overrides: Overrides,
    pub json: bool,
    pub grant_location: bool,
    pub deny_location: bool,
    pub verbose: bool,
}

/// One user action read from the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    RaisePitch,
    LowerPitch,
    GoToDestination,
    ReturnToDevice,
    Refresh,
    Status,
    Help,
    Quit,
}

impl KeyCommand {
    /// Parse the first non-blank character of an input line.
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().chars().next()? {
            '+' | '=' => Some(KeyCommand::RaisePitch),
            '-' | '_' => Some(KeyCommand::LowerPitch),
            'd' | 'D' => Some(KeyCommand::GoToDestination),
            'c' | 'C' => Some(KeyCommand::ReturnToDevice),
            'r' | 'R' => Some(KeyCommand::Refresh),
            's' | 'S' => Some(KeyCommand::Status),
            'h' | 'H' | '?' => Some(KeyCommand::Help),
            'q' | 'Q' => Some(KeyCommand::Quit),
            _ => None,
        }
    }
}

const HELP: &str = "Keys (then Enter): + raise pitch, - lower pitch, d go to destination, \
                    c return to current location, r refresh, s status, q quit";

/// Run the run command.
pub fn run(args: RunArgs) -> Result<(), CliError> {
    let config = resolve_config(&args.overrides)?;

    // Before the runtime starts, so the local time offset can be read
    let _log_guard = init_logging(&config.log_config().with_stderr(args.verbose))?;

    let session_config = config.to_session_config()?;
    let simulation = config.simulation_config()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Runtime(e.to_string()))?;

    let shutdown = CancellationToken::new();
    let ctrlc_token = shutdown.clone();
    ctrlc::set_handler(move || ctrlc_token.cancel())
        .map_err(|e| CliError::Runtime(format!("Failed to set Ctrl+C handler: {}", e)))?;

    let prompt = if args.deny_location {
        TerminalPrompt::preset(PermissionState::Denied)
    } else if args.grant_location {
        TerminalPrompt::preset(PermissionState::Granted)
    } else {
        TerminalPrompt::interactive()
    };
    let mode = if args.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    if mode == OutputMode::Human {
        println!("PathView v{}", pathview::VERSION);
        println!("==============");
        println!();
        println!("Destination: {}", session_config.destination);
        println!("Start:       {}", simulation.start);
        println!("Speed:       {} m/s", simulation.speed_mps);
        match &session_config.routing_credential {
            Some(credential) => println!("Routing:     enabled ({})", credential),
            None => println!("Routing:     disabled (no API key)"),
        }
        println!();
    }

    let result = runtime.block_on(run_session(
        session_config,
        simulation,
        prompt,
        mode,
        shutdown,
    ));

    // Stdin reads sit on a blocking thread that never returns on its own
    runtime.shutdown_timeout(Duration::from_millis(200));
    result
}

async fn run_session(
    session_config: SessionConfig,
    simulation: SimulationConfig,
    prompt: TerminalPrompt,
    mode: OutputMode,
    shutdown: CancellationToken,
) -> Result<(), CliError> {
    let gate = PermissionGate::new(prompt);
    let source = Arc::new(SimulatedPositionSource::new(simulation));
    let surface = Arc::new(ConsoleSurface::stdout(mode));

    let session = Session::start(session_config, &gate, Arc::clone(&source), surface).await?;
    info!("Session running");

    if mode == OutputMode::Human {
        println!("{}", style(HELP).dim());
    }

    let outcome = input_loop(session.handle(), &source, mode, shutdown).await;
    session.shutdown().await;
    outcome
}

async fn input_loop(
    handle: OrchestratorHandle,
    source: &SimulatedPositionSource,
    mode: OutputMode,
    shutdown: CancellationToken,
) -> Result<(), CliError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            _ = shutdown.cancelled() => break,
            line = lines.next_line() => line?,
        };

        // End of input
        let Some(line) = line else { break };

        let Some(command) = KeyCommand::parse(&line) else {
            if !line.trim().is_empty() {
                println!("{}", style(HELP).dim());
            }
            continue;
        };

        let result = match command {
            KeyCommand::Quit => break,
            KeyCommand::Help => {
                println!("{}", HELP);
                Ok(())
            }
            KeyCommand::RaisePitch => handle.raise_pitch().await.map(|_| ()),
            KeyCommand::LowerPitch => handle.lower_pitch().await.map(|_| ()),
            KeyCommand::GoToDestination => handle
                .set_focus(FocusTarget::Destination)
                .await
                .map(|_| ()),
            KeyCommand::ReturnToDevice => handle.set_focus(FocusTarget::Device).await.map(|_| ()),
            KeyCommand::Refresh => handle.refresh().await.map(|_| ()),
            KeyCommand::Status => print_status(&handle, source, mode).await,
        };

        match result {
            // Already shown by the surface
            Ok(()) | Err(OrchestratorError::Pitch(_)) => {}
            Err(OrchestratorError::Stopped) => break,
            Err(e) => println!("{} {}", style("Error:").red(), e),
        }
    }

    Ok(())
}

async fn print_status(
    handle: &OrchestratorHandle,
    source: &SimulatedPositionSource,
    mode: OutputMode,
) -> Result<(), OrchestratorError> {
    let snapshot = handle.snapshot().await?;

    match mode {
        OutputMode::Json => {
            let line = serde_json::json!({
                "event": "status",
                "snapshot": snapshot,
                "arrived": source.arrived(),
            });
            println!("{}", line);
        }
        OutputMode::Human => {
            println!("Focus:       {}", snapshot.focus.description());
            println!("Pitch:       {}", snapshot.pitch);
            match snapshot.last_device_position {
                Some(position) => println!("Device:      {}", position.coordinate),
                None => println!("Device:      (no fix yet)"),
            }
            println!("Destination: {}", snapshot.destination);
            if source.arrived() {
                println!("{}", style("Arrived at destination").green());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keys() {
        assert_eq!(KeyCommand::parse("+"), Some(KeyCommand::RaisePitch));
        assert_eq!(KeyCommand::parse(" -\n"), Some(KeyCommand::LowerPitch));
        assert_eq!(KeyCommand::parse("d"), Some(KeyCommand::GoToDestination));
        assert_eq!(KeyCommand::parse("C"), Some(KeyCommand::ReturnToDevice));
        assert_eq!(KeyCommand::parse("r"), Some(KeyCommand::Refresh));
        assert_eq!(KeyCommand::parse("status"), Some(KeyCommand::Status));
        assert_eq!(KeyCommand::parse("?"), Some(KeyCommand::Help));
        assert_eq!(KeyCommand::parse("q"), Some(KeyCommand::Quit));
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(KeyCommand::parse(""), None);
        assert_eq!(KeyCommand::parse("   "), None);
        assert_eq!(KeyCommand::parse("x"), None);
    }
}
