// src/models.rs

//! Data types shared across the crate.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{
    DEFAULT_GRAPH_HEIGHT, DEFAULT_GRAPH_WIDTH, DEFAULT_SAMPLE_INTERVAL_SECS, DEFAULT_TOGGLE_KEY,
    MAX_LOG_LINES,
};

// --- COMMAND PARAMETER MODELS ---

/// The primitive type a command parameter expects.
///
/// Only primitives are supported: arguments arrive as whitespace-delimited
/// text and each one is coerced independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// A signed 64-bit integer.
    Integer,
    /// A 64-bit float, including `NaN` and infinities.
    Float,
    /// `true` or `false`, case-insensitive.
    Boolean,
    /// The raw token, verbatim.
    Text,
}

impl ParamType {
    /// The canonical tag shown in help output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "int",
            Self::Float => "float",
            Self::Boolean => "bool",
            Self::Text => "string",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A coerced argument value, ready to be handed to a command handler.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// See [`ParamType::Integer`].
    Integer(i64),
    /// See [`ParamType::Float`].
    Float(f64),
    /// See [`ParamType::Boolean`].
    Boolean(bool),
    /// See [`ParamType::Text`].
    Text(String),
}

impl ParamValue {
    /// The type tag this value was coerced to.
    pub fn param_type(&self) -> ParamType {
        match self {
            Self::Integer(_) => ParamType::Integer,
            Self::Float(_) => ParamType::Float,
            Self::Boolean(_) => ParamType::Boolean,
            Self::Text(_) => ParamType::Text,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Boolean(v) => write!(f, "{}", v),
            Self::Text(v) => f.write_str(v),
        }
    }
}

/// One positional parameter of a registered command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSpec {
    /// Name shown in help output.
    pub name: String,
    /// Type every argument in this position is coerced to.
    pub ty: ParamType,
}

// --- LOG MODELS ---

/// Severity of a line in the console log stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Normal command output and help text.
    Info,
    /// Unknown command, arity mismatch, bad argument, registration skips.
    Warning,
    /// A command failed while executing.
    Error,
}

/// A single line held by the console log buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// How the line is tagged when rendered.
    pub severity: Severity,
    /// The text, which may span several lines.
    pub message: String,
}

// --- CONFIGURATION MODELS (devconsole.toml) ---

/// User-tunable settings of the console overlay.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConsoleConfig {
    /// How many log lines the overlay keeps before evicting the oldest.
    pub max_log_lines: usize,
    /// Seconds between two telemetry refreshes.
    pub sample_interval_secs: f32,
    /// Name of the key that shows or hides the overlay.
    pub toggle_key: String,
    /// Width of the FPS graph in pixels, which is also its sample capacity.
    pub graph_width: usize,
    /// Height of the FPS graph in pixels.
    pub graph_height: usize,
    /// Whether the overlay is visible right after startup.
    pub start_visible: bool,
    /// Whether rendered log lines use ANSI colors.
    pub colors: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            max_log_lines: MAX_LOG_LINES,
            sample_interval_secs: DEFAULT_SAMPLE_INTERVAL_SECS,
            toggle_key: DEFAULT_TOGGLE_KEY.to_string(),
            graph_width: DEFAULT_GRAPH_WIDTH,
            graph_height: DEFAULT_GRAPH_HEIGHT,
            start_visible: false,
            colors: true,
        }
    }
}
