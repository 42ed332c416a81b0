// src/constants.rs

//! Fixed names and default values.

/// The command name intercepted by the dispatcher before registry lookup.
pub const HELP_COMMAND: &str = "help";

/// Default number of lines kept by the console log buffer.
pub const MAX_LOG_LINES: usize = 50;

/// Default telemetry refresh interval, in seconds.
pub const DEFAULT_SAMPLE_INTERVAL_SECS: f32 = 0.5;

/// Default key that toggles the overlay.
pub const DEFAULT_TOGGLE_KEY: &str = "F5";

/// Default FPS graph width, in pixels.
pub const DEFAULT_GRAPH_WIDTH: usize = 1000;
/// Default FPS graph height, in pixels.
pub const DEFAULT_GRAPH_HEIGHT: usize = 500;
/// Largest accepted FPS graph width or height, in pixels.
pub const MAX_GRAPH_DIMENSION: usize = 4096;

/// Scale used by the FPS graph before any sample has been recorded.
pub const GRAPH_FALLBACK_MAX_FPS: f32 = 120.0;

/// The name of the directory holding devconsole settings (inside the system config dir).
pub const CONFIG_DIR_NAME: &str = "devconsole";

/// The name of the configuration file (inside the config dir).
pub const CONFIG_FILENAME: &str = "devconsole.toml";
