// src/cli/repl.rs

//! Line-oriented terminal session driving a console.

use crate::{
    core::{log_buffer::render_entry, telemetry::TelemetrySource},
    system::console::DebugConsole,
};
use anyhow::Result;
use std::io::{BufRead, Write};
use std::time::Instant;

const TOGGLE_WORD: &str = "toggle";
const QUIT_WORDS: &[&str] = &["quit", "exit"];
const GRAPH_COLUMNS: usize = 60;
const GRAPH_ROWS: usize = 6;

/// What the session should do after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Keep reading lines.
    Continue,
    /// Leave the session.
    Quit,
}

/// A terminal session around a [`DebugConsole`].
///
/// Every handled line counts as one frame: the console is updated with the
/// real time elapsed since the previous line, then every log line produced
/// meanwhile is printed. While the overlay is visible, the telemetry text and
/// a text rendering of the FPS graph follow.
pub struct Session<'a, W: Write> {
    console: &'a mut DebugConsole,
    host: &'a dyn TelemetrySource,
    out: W,
    printed: u64,
    last_frame: Instant,
}

impl<W: Write> std::fmt::Debug for Session<'_, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("console", &self.console)
            .field("printed", &self.printed)
            .finish_non_exhaustive()
    }
}

impl<'a, W: Write> Session<'a, W> {
    /// Starts a session. Lines already in the console log are printed by the first
    /// call to [`Session::flush`].
    pub fn new(console: &'a mut DebugConsole, host: &'a dyn TelemetrySource, out: W) -> Self {
        Self {
            console,
            host,
            out,
            printed: 0,
            last_frame: Instant::now(),
        }
    }

    /// Handles one line of input.
    pub fn handle_line(&mut self, line: &str) -> Result<Control> {
        let word = line.trim();
        let registered = self.console.dispatcher().registry().contains(word);

        if !registered && QUIT_WORDS.iter().any(|q| word.eq_ignore_ascii_case(q)) {
            log::debug!("Leaving console session");
            return Ok(Control::Quit);
        }

        let toggled = !registered
            && if word.eq_ignore_ascii_case(TOGGLE_WORD) {
                self.console.toggle();
                true
            } else {
                self.console.handle_key(word)
            };
        if toggled {
            let state = if self.console.is_visible() { "shown" } else { "hidden" };
            writeln!(self.out, "Console {}.", state)?;
        } else {
            // Failures are already in the log.
            let _ = self.console.submit(line);
        }

        self.frame();
        self.flush()?;
        Ok(Control::Continue)
    }

    /// Runs each line in order, stopping early on `quit`.
    pub fn run_lines<S: AsRef<str>>(&mut self, lines: &[S]) -> Result<()> {
        self.flush()?;
        for line in lines {
            if self.handle_line(line.as_ref())? == Control::Quit {
                break;
            }
        }
        Ok(())
    }

    /// Reads lines until end of input or `quit`.
    pub fn run(&mut self, input: impl BufRead) -> Result<()> {
        self.flush()?;
        self.prompt()?;
        for line in input.lines() {
            if self.handle_line(&line?)? == Control::Quit {
                break;
            }
            self.prompt()?;
        }
        Ok(())
    }

    fn frame(&mut self) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.console.update(dt, self.host);
    }

    /// Prints every log line not printed yet, then the overlay if it is visible.
    pub fn flush(&mut self) -> Result<()> {
        let (entries, next) = self.console.buffer().tail(self.printed);
        self.printed = next;
        let use_colors = self.console.use_colors();
        for entry in &entries {
            writeln!(self.out, "{}", render_entry(entry, use_colors))?;
        }

        if self.console.is_visible() {
            if let Some(telemetry) = self.console.telemetry_text() {
                writeln!(self.out, "{}", telemetry)?;
            }
            let graph = self.console.graph().render_ascii(GRAPH_COLUMNS, GRAPH_ROWS);
            if !graph.trim().is_empty() {
                writeln!(self.out, "{}", graph)?;
            }
        }
        self.out.flush()?;
        Ok(())
    }

    fn prompt(&mut self) -> Result<()> {
        write!(self.out, "> ")?;
        self.out.flush()?;
        Ok(())
    }
}
