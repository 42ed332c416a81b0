//! # Command Dispatcher
//!
//! Turns one line of operator input into either a successful invocation or a
//! single diagnostic on the log sink. Each call is an independent transaction:
//! tokenize, then either the `help` shortcut or lookup, arity check, coercion of
//! every argument, and an isolated invocation. Nothing raised by a command
//! escapes this boundary.
use crate::{
    constants::HELP_COMMAND,
    core::{
        arg_parser::ParsedInvocation,
        log_buffer::LogSink,
        parameters::{CommandArgs, coerce_all},
        registry::{CommandDescriptor, CommandRegistry},
    },
    models::{ParamType, Severity},
};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;

/// Why a console line did not run a command.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// No command is registered under the name.
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
    /// The argument count differs from the parameter count.
    #[error("Expected {expected} args, got {received}")]
    ArityMismatch {
        /// The command name, lowercased.
        command: String,
        /// Declared parameter count.
        expected: usize,
        /// Arguments on the line.
        received: usize,
    },
    /// An argument could not be converted to its parameter type.
    #[error("Invalid argument #{position}: '{text}' (expected {expected})")]
    ArgumentCoercionFailure {
        /// The command name, lowercased.
        command: String,
        /// 1-based.
        position: usize,
        /// The argument as typed.
        text: String,
        /// The declared parameter type.
        expected: ParamType,
    },
    /// The handler returned an error or panicked.
    #[error("Command execution error: {message}")]
    InvocationFailure {
        /// The command name, lowercased.
        command: String,
        /// The error chain or panic message.
        message: String,
    },
}

impl DispatchError {
    /// The severity this failure is reported with.
    pub fn severity(&self) -> Severity {
        match self {
            Self::InvocationFailure { .. } => Severity::Error,
            _ => Severity::Warning,
        }
    }
}

/// What a successful `execute` call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Blank input; nothing happened.
    Empty,
    /// Help text was written to the sink.
    Help,
    /// The named command ran to completion.
    Invoked(String),
}

/// Executes console lines against a [`CommandRegistry`].
#[derive(Debug, Default)]
pub struct Dispatcher {
    registry: CommandRegistry,
}

impl Dispatcher {
    /// Wraps a built registry.
    pub fn new(registry: CommandRegistry) -> Self {
        Self { registry }
    }

    /// The registry commands are looked up in.
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Mutable access, for registering commands after startup.
    pub fn registry_mut(&mut self) -> &mut CommandRegistry {
        &mut self.registry
    }

    /// Executes one line of input.
    ///
    /// Every failure is reported on `sink` before it is returned; callers may
    /// ignore the result entirely.
    pub fn execute(&self, line: &str, sink: &dyn LogSink) -> Result<DispatchOutcome, DispatchError> {
        let result = self.dispatch(line, sink);
        if let Err(e) = &result {
            log::debug!("Console line '{}' failed: {:?}", line.trim(), e);
            sink.append(e.severity(), e.to_string());
        }
        result
    }

    fn dispatch(&self, line: &str, sink: &dyn LogSink) -> Result<DispatchOutcome, DispatchError> {
        let Some(invocation) = ParsedInvocation::parse(line) else {
            return Ok(DispatchOutcome::Empty);
        };
        log::debug!("Dispatching console command: {:?}", invocation);

        if invocation.command == HELP_COMMAND {
            // Arguments after the first are ignored.
            let text = match invocation.args.as_slice() {
                [] => help_listing(&self.registry),
                [name, ..] => command_help(&self.registry, name),
            };
            sink.append(Severity::Info, text);
            return Ok(DispatchOutcome::Help);
        }

        let descriptor = self
            .registry
            .lookup(&invocation.command)
            .ok_or_else(|| DispatchError::UnknownCommand(invocation.command.clone()))?;

        let expected = descriptor.parameters().len();
        let received = invocation.arg_count();
        if received != expected {
            return Err(DispatchError::ArityMismatch {
                command: invocation.command,
                expected,
                received,
            });
        }

        let values = coerce_all(invocation.args.as_slice(), descriptor.parameters()).map_err(
            |failure| DispatchError::ArgumentCoercionFailure {
                command: invocation.command.clone(),
                position: failure.position,
                text: failure.text,
                expected: failure.expected,
            },
        )?;

        invoke_isolated(descriptor, &CommandArgs::new(values))?;
        Ok(DispatchOutcome::Invoked(invocation.command))
    }
}

/// Runs a command, converting both returned errors and panics into
/// [`DispatchError::InvocationFailure`].
fn invoke_isolated(descriptor: &CommandDescriptor, args: &CommandArgs) -> Result<(), DispatchError> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| descriptor.invoke(args)));

    let message = match outcome {
        Ok(Ok(())) => return Ok(()),
        Ok(Err(e)) => format!("{:#}", e),
        Err(payload) => panic_message(payload.as_ref()),
    };

    Err(DispatchError::InvocationFailure {
        command: descriptor.name().to_string(),
        message,
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "command panicked".to_string()
    }
}

// --- HELP ---

/// One line per command: name, `<parameter>` placeholders and description.
pub fn help_listing(registry: &CommandRegistry) -> String {
    if registry.is_empty() {
        return "No commands registered.".to_string();
    }

    registry
        .list_all()
        .iter()
        .map(|command| {
            let mut line = command.name().to_string();
            for param in command.parameters() {
                line.push_str(&format!(" <{}>", param.name));
            }
            if !command.description().is_empty() {
                line.push_str(" - ");
                line.push_str(command.description());
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Detailed help for one command, or a not-found message.
pub fn command_help(registry: &CommandRegistry, name: &str) -> String {
    let Some(command) = registry.lookup(name) else {
        return format!("Command '{}' not found.", name);
    };

    let arguments = if command.parameters().is_empty() {
        "Arguments: none".to_string()
    } else {
        let lines = command
            .parameters()
            .iter()
            .map(|p| format!("- {}: {}", p.name, p.ty))
            .collect::<Vec<_>>()
            .join("\n");
        format!("Arguments:\n{}", lines)
    };

    format!(
        "{}\n{}\n\n{}",
        command.name(),
        command.description(),
        arguments
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::log_buffer::SharedLogBuffer;
    use crate::core::registry::{CommandDeclaration, ReceiverRegistry};
    use crate::models::LogEntry;
    use anyhow::bail;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct GameClock {
        time_scale: Mutex<f64>,
        calls: Mutex<usize>,
    }

    fn setup() -> (Dispatcher, Arc<GameClock>, SharedLogBuffer) {
        let clock = Arc::new(GameClock {
            time_scale: Mutex::new(1.0),
            calls: Mutex::new(0),
        });
        let sink = SharedLogBuffer::default();

        let registry = CommandRegistry::builder()
            .receiver(Arc::clone(&clock))
            .command(CommandDeclaration::bound::<GameClock, _>(
                "set_timescale",
                "Set global timescale to value.",
                &["value:float"],
                |clock, args| {
                    *clock.time_scale.lock().unwrap() = args.float(0)?;
                    *clock.calls.lock().unwrap() += 1;
                    Ok(())
                },
            ))
            .command(CommandDeclaration::unbound(
                "reload_scene",
                "Reloads current scene.",
                &[],
                |_| Ok(()),
            ))
            .command(CommandDeclaration::unbound("explode", "", &[], |_| {
                bail!("scene 'Arena' is not in the build")
            }))
            .command(CommandDeclaration::unbound("crash", "", &["code:int"], |args| {
                panic!("fatal code {}", args.integer(0)?)
            }))
            .build(&sink);

        (Dispatcher::new(registry), clock, sink)
    }

    fn entries(sink: &SharedLogBuffer) -> Vec<LogEntry> {
        sink.snapshot()
    }

    // --- Blank Input ---

    #[test]
    fn test_blank_input_is_a_silent_no_op() {
        let (dispatcher, clock, sink) = setup();

        assert_eq!(dispatcher.execute("", &sink), Ok(DispatchOutcome::Empty));
        assert_eq!(dispatcher.execute("   ", &sink), Ok(DispatchOutcome::Empty));

        assert!(entries(&sink).is_empty());
        assert_eq!(*clock.calls.lock().unwrap(), 0);
    }

    // --- Invocation ---

    #[test]
    fn test_valid_command_invokes_with_coerced_argument() {
        let (dispatcher, clock, sink) = setup();

        let outcome = dispatcher.execute("SET_TIMESCALE 2.0", &sink);

        assert_eq!(outcome, Ok(DispatchOutcome::Invoked("set_timescale".to_string())));
        assert_eq!(*clock.time_scale.lock().unwrap(), 2.0);
        assert!(entries(&sink).is_empty());
    }

    #[test]
    fn test_unknown_command_warns_without_invoking() {
        let (dispatcher, clock, sink) = setup();

        let outcome = dispatcher.execute("fly 10", &sink);

        assert_eq!(outcome, Err(DispatchError::UnknownCommand("fly".to_string())));
        let logged = entries(&sink);
        assert_eq!(logged.len(), 1);
        assert_eq!(logged[0].severity, Severity::Warning);
        assert_eq!(logged[0].message, "Unknown command: fly");
        assert_eq!(*clock.calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_arity_mismatch_warns_without_invoking() {
        let (dispatcher, clock, sink) = setup();

        let outcome = dispatcher.execute("set_timescale", &sink);
        assert!(matches!(
            outcome,
            Err(DispatchError::ArityMismatch { expected: 1, received: 0, .. })
        ));

        let outcome = dispatcher.execute("set_timescale 1 2", &sink);
        assert!(matches!(
            outcome,
            Err(DispatchError::ArityMismatch { expected: 1, received: 2, .. })
        ));

        let logged = entries(&sink);
        assert_eq!(logged[0].message, "Expected 1 args, got 0");
        assert_eq!(logged[1].message, "Expected 1 args, got 2");
        assert!(logged.iter().all(|e| e.severity == Severity::Warning));
        assert_eq!(*clock.calls.lock().unwrap(), 0);
        assert_eq!(*clock.time_scale.lock().unwrap(), 1.0);
    }

    #[test]
    fn test_bad_argument_reports_position_and_text() {
        let (dispatcher, clock, sink) = setup();

        let outcome = dispatcher.execute("set_timescale abc", &sink);

        assert_eq!(
            outcome,
            Err(DispatchError::ArgumentCoercionFailure {
                command: "set_timescale".to_string(),
                position: 1,
                text: "abc".to_string(),
                expected: ParamType::Float,
            })
        );
        let logged = entries(&sink);
        assert_eq!(logged[0].severity, Severity::Warning);
        assert!(logged[0].message.starts_with("Invalid argument #1: 'abc'"));
        assert_eq!(*clock.calls.lock().unwrap(), 0);
    }

    // --- Failure Isolation ---

    #[test]
    fn test_failing_command_is_reported_and_console_survives() {
        let (dispatcher, clock, sink) = setup();

        let outcome = dispatcher.execute("explode", &sink);
        assert!(matches!(outcome, Err(DispatchError::InvocationFailure { .. })));

        let logged = entries(&sink);
        assert_eq!(logged[0].severity, Severity::Error);
        assert_eq!(
            logged[0].message,
            "Command execution error: scene 'Arena' is not in the build"
        );

        assert!(dispatcher.execute("set_timescale 0.5", &sink).is_ok());
        assert_eq!(*clock.time_scale.lock().unwrap(), 0.5);
    }

    #[test]
    fn test_panicking_command_is_caught() {
        let (dispatcher, clock, sink) = setup();

        let outcome = dispatcher.execute("crash 7", &sink);

        assert_eq!(
            outcome,
            Err(DispatchError::InvocationFailure {
                command: "crash".to_string(),
                message: "fatal code 7".to_string(),
            })
        );
        assert_eq!(entries(&sink)[0].severity, Severity::Error);

        assert!(dispatcher.execute("set_timescale 3", &sink).is_ok());
        assert_eq!(*clock.time_scale.lock().unwrap(), 3.0);
    }

    // --- Help ---

    #[test]
    fn test_help_lists_every_command_with_parameters() {
        let (dispatcher, _clock, sink) = setup();

        assert_eq!(dispatcher.execute("help", &sink), Ok(DispatchOutcome::Help));

        let logged = entries(&sink);
        assert_eq!(logged.len(), 1);
        assert_eq!(logged[0].severity, Severity::Info);
        assert_eq!(
            logged[0].message,
            "set_timescale <value> - Set global timescale to value.\n\
             reload_scene - Reloads current scene.\n\
             explode\n\
             crash <code>"
        );
    }

    #[test]
    fn test_help_for_one_command_shows_typed_parameters() {
        let (dispatcher, _clock, sink) = setup();

        dispatcher.execute("HELP Set_Timescale", &sink).unwrap();
        dispatcher.execute("help reload_scene", &sink).unwrap();

        let logged = entries(&sink);
        assert_eq!(
            logged[0].message,
            "set_timescale\nSet global timescale to value.\n\nArguments:\n- value: float"
        );
        assert_eq!(
            logged[1].message,
            "reload_scene\nReloads current scene.\n\nArguments: none"
        );
    }

    #[test]
    fn test_help_for_unknown_command_reports_not_found() {
        let (dispatcher, _clock, sink) = setup();

        dispatcher.execute("help teleport", &sink).unwrap();

        let logged = entries(&sink);
        assert_eq!(logged[0].severity, Severity::Info);
        assert_eq!(logged[0].message, "Command 'teleport' not found.");
    }

    #[test]
    fn test_help_ignores_arguments_after_the_command_name() {
        // --- Setup ---
        let (dispatcher, _clock, sink) = setup();

        // --- Execute ---
        let outcome = dispatcher.execute("help set_timescale extra words", &sink);
        dispatcher.execute("help set_timescale", &sink).unwrap();

        // --- Assert ---
        assert_eq!(outcome, Ok(DispatchOutcome::Help));
        let logged = entries(&sink);
        assert_eq!(logged.len(), 2);
        assert_eq!(logged[0].severity, Severity::Info);
        assert_eq!(logged[0], logged[1]);
    }

    #[test]
    fn test_second_argument_failure_never_invokes() {
        // --- Setup ---
        let sink = SharedLogBuffer::default();
        let calls = Arc::new(Mutex::new(0_usize));
        let counter = Arc::clone(&calls);
        let dispatcher = Dispatcher::new(
            CommandRegistry::builder()
                .command(CommandDeclaration::unbound(
                    "spawn",
                    "Spawns count units at scale.",
                    &["count:int", "scale:float"],
                    move |_| {
                        *counter.lock().unwrap() += 1;
                        Ok(())
                    },
                ))
                .build(&sink),
        );

        // --- Execute ---
        let outcome = dispatcher.execute("spawn 3 fast", &sink);

        // --- Assert ---
        assert_eq!(
            outcome,
            Err(DispatchError::ArgumentCoercionFailure {
                command: "spawn".to_string(),
                position: 2,
                text: "fast".to_string(),
                expected: ParamType::Float,
            })
        );
        let logged = entries(&sink);
        assert_eq!(logged.len(), 1);
        assert_eq!(logged[0].severity, Severity::Warning);
        assert_eq!(logged[0].message, "Invalid argument #2: 'fast' (expected float)");
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_help_on_empty_registry() {
        let dispatcher = Dispatcher::new(CommandRegistry::build(
            Vec::new(),
            &ReceiverRegistry::new(),
            &SharedLogBuffer::default(),
        ));
        let sink = SharedLogBuffer::default();

        dispatcher.execute("help", &sink).unwrap();

        assert_eq!(entries(&sink)[0].message, "No commands registered.");
    }
}
