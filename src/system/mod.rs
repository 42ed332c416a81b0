//! # Host Integration Layer
//!
//! Glue between the command engine and a running application.
//!
//! ## Modules
//!
//! - **`logger`**: a `log` backend that copies records into the console's log
//!   buffer while still printing through `env_logger`.
//! - **`console`**: the [`console::DebugConsole`] overlay, which owns the
//!   dispatcher, log buffer, telemetry sampler and FPS graph and is driven by
//!   the host's frame loop.

pub mod console;
pub mod logger;
