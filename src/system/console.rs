// src/system/console.rs

//! The developer console overlay.

use crate::{
    core::{
        dispatcher::{DispatchError, DispatchOutcome, Dispatcher},
        fps_graph::FpsGraph,
        log_buffer::{LogSink, SharedLogBuffer},
        registry::{CommandRegistry, RegistryBuilder},
        telemetry::{TelemetrySampler, TelemetrySource},
    },
    models::{ConsoleConfig, LogEntry, Severity},
};

/// The in-process developer console overlay.
///
/// Owns the command dispatcher, the bounded log buffer, the telemetry sampler
/// and the FPS graph. While hidden, [`DebugConsole::update`] does nothing, but
/// commands can still be submitted and log lines still accumulate.
#[derive(Debug)]
pub struct DebugConsole {
    dispatcher: Dispatcher,
    buffer: SharedLogBuffer,
    telemetry: TelemetrySampler,
    graph: FpsGraph,
    visible: bool,
    toggle_key: String,
    use_colors: bool,
}

impl DebugConsole {
    /// Builds the registry from `commands` and creates a console with a fresh
    /// log buffer sized from the config.
    pub fn new(config: &ConsoleConfig, commands: RegistryBuilder) -> Self {
        Self::with_buffer(
            config,
            commands,
            SharedLogBuffer::with_capacity(config.max_log_lines),
        )
    }

    /// Like [`DebugConsole::new`], but writes into an existing buffer (typically
    /// the one a [`crate::system::logger::ConsoleLogger`] captures into).
    /// Registration diagnostics land in that buffer.
    pub fn with_buffer(
        config: &ConsoleConfig,
        commands: RegistryBuilder,
        buffer: SharedLogBuffer,
    ) -> Self {
        let registry: CommandRegistry = commands.build(&buffer);
        log::debug!(
            "Debug console ready with {} command(s)",
            registry.len()
        );

        Self {
            dispatcher: Dispatcher::new(registry),
            buffer,
            telemetry: TelemetrySampler::new(config.sample_interval_secs),
            graph: FpsGraph::new(config.graph_width, config.graph_height),
            visible: config.start_visible,
            toggle_key: config.toggle_key.clone(),
            use_colors: config.colors,
        }
    }

    // --- Input ---

    /// Executes one submitted line. Failures are already in the log buffer.
    pub fn submit(&self, line: &str) -> Result<DispatchOutcome, DispatchError> {
        self.dispatcher.execute(line, &self.buffer)
    }

    /// Toggles the overlay if `key` is the configured activation key
    /// (case-insensitive). Returns whether it did.
    pub fn handle_key(&mut self, key: &str) -> bool {
        if key.trim().eq_ignore_ascii_case(&self.toggle_key) {
            self.toggle();
            true
        } else {
            false
        }
    }

    /// Shows or hides the overlay and returns the new visibility.
    pub fn toggle(&mut self) -> bool {
        self.visible = !self.visible;
        log::debug!("Debug console visible: {}", self.visible);
        self.visible
    }

    /// Check if the overlay is shown.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Shows or hides the overlay.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    // --- Frame Loop ---

    /// Advances telemetry and the FPS graph by one frame. Skipped while hidden.
    pub fn update(&mut self, unscaled_dt: f32, source: &dyn TelemetrySource) {
        if !self.visible {
            return;
        }
        self.telemetry.tick(unscaled_dt, source);
        self.graph.push_frame_time(unscaled_dt);
        self.graph.redraw();
    }

    // --- Output ---

    /// Appends one line to the log buffer.
    pub fn log(&self, severity: Severity, message: impl Into<String>) {
        self.buffer.append(severity, message.into());
    }

    /// Check if rendered output is colored.
    pub fn use_colors(&self) -> bool {
        self.use_colors
    }

    /// The log buffer rendered as text.
    pub fn render(&self) -> String {
        self.buffer.render(self.use_colors)
    }

    /// Snapshot of the log lines, oldest first.
    pub fn log_lines(&self) -> Vec<LogEntry> {
        self.buffer.snapshot()
    }

    /// The latest telemetry text, once a sample has been taken.
    pub fn telemetry_text(&self) -> Option<String> {
        self.telemetry.latest().map(|report| report.to_string())
    }

    /// The FPS graph.
    pub fn graph(&self) -> &FpsGraph {
        &self.graph
    }

    /// The shared log buffer.
    pub fn buffer(&self) -> &SharedLogBuffer {
        &self.buffer
    }

    /// The dispatcher, e.g. to inspect the registry.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Mutable dispatcher access, for registering commands at runtime.
    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }
}
