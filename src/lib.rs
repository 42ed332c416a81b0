//! # devconsole
//!
//! An in-process developer console: a registry of host operations invoked by
//! name from a line of text, with typed argument coercion, failure isolation,
//! a bounded log buffer, telemetry sampling and a frame-rate graph.
//!
//! ```no_run
//! use devconsole::{CommandDeclaration, CommandRegistry, ConsoleConfig, DebugConsole};
//!
//! let commands = CommandRegistry::builder().command(CommandDeclaration::unbound(
//!     "greet",
//!     "Says hello.",
//!     &["who:string"],
//!     |args| {
//!         log::info!("Hello, {}!", args.text(0)?);
//!         Ok(())
//!     },
//! ));
//! let console = DebugConsole::new(&ConsoleConfig::default(), commands);
//! let _ = console.submit("greet world");
//! ```

pub mod cli;
pub mod constants;
pub mod core;
pub mod dev_utils;
pub mod models;
pub mod system;

pub use crate::core::{
    dispatcher::{DispatchError, DispatchOutcome, Dispatcher},
    log_buffer::{LogSink, SharedLogBuffer},
    parameters::CommandArgs,
    registry::{CommandDeclaration, CommandRegistry, ReceiverRegistry, RegistryError},
};
pub use crate::models::{ConsoleConfig, Severity};
pub use crate::system::console::DebugConsole;
