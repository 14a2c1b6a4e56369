//! Map surface that prints to the terminal.

use std::io::Write;
use std::sync::Mutex;

use console::style;
use pathview::camera::CameraIntent;
use pathview::route::{RouteOverlay, RoutingError};
use pathview::surface::{MapRegion, MapSurface, Marker};
use serde_json::json;

/// How surface events are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Coloured, human-readable lines.
    Human,
    /// One JSON object per line.
    Json,
}

/// Prints every surface call as a line of output.
pub struct ConsoleSurface {
    mode: OutputMode,
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleSurface {
    /// Print to stdout.
    pub fn stdout(mode: OutputMode) -> Self {
        Self::with_writer(mode, Box::new(std::io::stdout()))
    }

    /// Print to any writer.
    pub fn with_writer(mode: OutputMode, out: Box<dyn Write + Send>) -> Self {
        Self {
            mode,
            out: Mutex::new(out),
        }
    }

    fn emit(&self, human: impl FnOnce() -> String, machine: impl FnOnce() -> serde_json::Value) {
        let line = match self.mode {
            OutputMode::Human => human(),
            OutputMode::Json => machine().to_string(),
        };
        if let Ok(mut out) = self.out.lock() {
            // Closed stdout: nothing useful left to do
            let _ = writeln!(out, "{}", line);
            let _ = out.flush();
        }
    }
}

impl MapSurface for ConsoleSurface {
    fn reveal(&self, region: MapRegion) {
        self.emit(
            || format!("{} Map ready at {}", style("●").green(), region.center),
            || json!({ "event": "reveal", "region": region }),
        );
    }

    fn animate_camera(&self, intent: CameraIntent) {
        self.emit(
            || format!("{} Camera {}", style("→").cyan(), intent),
            || json!({ "event": "camera", "intent": intent }),
        );
    }

    fn show_markers(&self, markers: &[Marker]) {
        self.emit(
            || {
                let pins: Vec<String> = markers
                    .iter()
                    .map(|m| format!("{} {}", m.title, m.coordinate))
                    .collect();
                format!("  Markers: {}", pins.join(", "))
            },
            || json!({ "event": "markers", "markers": markers }),
        );
    }

    fn show_route(&self, overlay: &RouteOverlay) -> Result<(), RoutingError> {
        self.emit(
            || {
                format!(
                    "  Route {} → {} [{}pt {}]",
                    overlay.origin,
                    overlay.destination,
                    overlay.style.stroke_width,
                    overlay.style.stroke_color
                )
            },
            || {
                json!({
                    "event": "route",
                    "origin": overlay.origin,
                    "destination": overlay.destination,
                    "style": overlay.style,
                })
            },
        );
        Ok(())
    }

    fn show_warning(&self, message: &str) {
        self.emit(
            || format!("{} {}", style("Warning:").yellow().bold(), message),
            || json!({ "event": "warning", "message": message }),
        );
    }

    fn location_unavailable(&self) {
        self.emit(
            || {
                format!(
                    "{} Location unavailable. Allow location access to use the map.",
                    style("✗").red()
                )
            },
            || json!({ "event": "location_unavailable" }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use pathview::coord::Coordinate;
    use pathview::focus::PitchAngle;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Buffer {
        fn lines(&self) -> Vec<String> {
            String::from_utf8(self.0.lock().unwrap().clone())
                .unwrap()
                .lines()
                .map(str::to_string)
                .collect()
        }
    }

    #[test]
    fn test_json_camera_line() {
        let buffer = Buffer::default();
        let surface = ConsoleSurface::with_writer(OutputMode::Json, Box::new(buffer.clone()));
        let intent = CameraIntent::new(Coordinate::new(-29.34, -49.72), 15.0, PitchAngle::default());

        surface.animate_camera(intent);

        let lines = buffer.lines();
        assert_eq!(lines.len(), 1);
        let value: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(value["event"], "camera");
        assert_eq!(value["intent"]["zoom"], 15.0);
        assert_eq!(value["intent"]["pitch"], 40);
    }

    #[test]
    fn test_human_warning_and_unavailable() {
        let buffer = Buffer::default();
        let surface = ConsoleSurface::with_writer(OutputMode::Human, Box::new(buffer.clone()));

        surface.show_warning("Pitch can only be between 0 and 70");
        surface.location_unavailable();

        let lines = buffer.lines();
        assert!(lines[0].contains("Pitch can only be between 0 and 70"));
        assert!(lines[1].contains("Location unavailable"));
    }

    #[test]
    fn test_markers_listed_by_title() {
        let buffer = Buffer::default();
        let surface = ConsoleSurface::with_writer(OutputMode::Human, Box::new(buffer.clone()));

        surface.show_markers(&[
            Marker::device(Coordinate::new(-29.34, -49.72)),
            Marker::destination(Coordinate::new(-29.3409, -49.7267)),
        ]);

        let line = &buffer.lines()[0];
        assert!(line.contains("You"));
        assert!(line.contains("Destination"));
    }
}
