//! # Command Registry
//!
//! Host code declares every operation it wants to expose on the console with a
//! [`CommandDeclaration`], registers the live instances those operations run
//! against in a [`ReceiverRegistry`], and builds a [`CommandRegistry`] once at
//! startup. The build is best-effort: a declaration that cannot be satisfied is
//! reported on the log sink and skipped, and every other command still registers.
use crate::{
    constants::HELP_COMMAND,
    core::{
        log_buffer::LogSink,
        parameters::{CommandArgs, ParameterError, parse_parameter_declaration},
    },
    dev_utils,
    models::{ParameterSpec, Severity},
};
use anyhow::{Result, anyhow};
use std::{
    any::{Any, TypeId, type_name},
    collections::HashMap,
    fmt,
    sync::Arc,
};
use thiserror::Error;

/// A receiver instance, type-erased.
pub type Receiver = Arc<dyn Any + Send + Sync>;

/// Handler of a command that needs no receiver.
pub type CommandHandler = Box<dyn Fn(&CommandArgs) -> Result<()> + Send + Sync>;

/// Handler of a command bound to a receiver, with the receiver type erased.
pub type BoundHandler = Box<dyn Fn(&(dyn Any + Send + Sync), &CommandArgs) -> Result<()> + Send + Sync>;

/// Why a command declaration was not registered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A command with the same lowercased name is already registered.
    #[error("Command {0} already registered.")]
    DuplicateCommandName(String),
    /// No instance of the receiver type was registered.
    #[error("Instance of {receiver_type} not found for command '{command}'.")]
    ReceiverNotFound {
        /// The command name, lowercased.
        command: String,
        /// Short name of the missing receiver type.
        receiver_type: &'static str,
    },
    /// The name is handled by the dispatcher itself.
    #[error("'{0}' is a reserved command name.")]
    ReservedCommandName(String),
    /// The name is empty or contains whitespace.
    #[error("Invalid command name '{0}': names must be non-empty and contain no whitespace.")]
    InvalidCommandName(String),
    /// A parameter declares a type tag outside the parser table.
    #[error("Command '{command}' declares an unsupported parameter type '{tag}'.")]
    UnsupportedParameterType {
        /// The command name, lowercased.
        command: String,
        /// The tag as declared.
        tag: String,
    },
    /// A parameter declaration is not `name` or `name:type`.
    #[error("Command '{command}' has an invalid parameter declaration '{declaration}'.")]
    InvalidParameter {
        /// The command name, lowercased.
        command: String,
        /// The declaration as written.
        declaration: String,
    },
}

// --- DECLARATIONS ---

enum DeclaredTarget {
    Unbound(CommandHandler),
    Bound {
        type_id: TypeId,
        type_name: &'static str,
        handler: BoundHandler,
    },
}

/// The host-side description of one command, before registration.
pub struct CommandDeclaration {
    name: String,
    description: String,
    parameters: Vec<String>,
    target: DeclaredTarget,
}

impl CommandDeclaration {
    /// Declares a command that runs without a receiver.
    ///
    /// `parameters` are `name:type` declarations, e.g. `["value:float"]`.
    pub fn unbound<F>(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: &[&str],
        handler: F,
    ) -> Self
    where
        F: Fn(&CommandArgs) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: parameters.iter().map(|p| p.to_string()).collect(),
            target: DeclaredTarget::Unbound(Box::new(handler)),
        }
    }

    /// Declares a command that runs against the live instance of `T` found in
    /// the [`ReceiverRegistry`] at registration time.
    pub fn bound<T, F>(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: &[&str],
        handler: F,
    ) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&T, &CommandArgs) -> Result<()> + Send + Sync + 'static,
    {
        let erased: BoundHandler = Box::new(move |receiver, args| {
            let receiver = receiver
                .downcast_ref::<T>()
                .ok_or_else(|| anyhow!("Receiver is not an instance of {}", type_name::<T>()))?;
            handler(receiver, args)
        });

        Self {
            name: name.into(),
            description: description.into(),
            parameters: parameters.iter().map(|p| p.to_string()).collect(),
            target: DeclaredTarget::Bound {
                type_id: TypeId::of::<T>(),
                type_name: short_type_name(type_name::<T>()),
                handler: erased,
            },
        }
    }

    /// The declared name, as written by the host.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for CommandDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDeclaration")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("bound", &matches!(self.target, DeclaredTarget::Bound { .. }))
            .finish()
    }
}

/// `my_game::world::GameClock` -> `GameClock`. Generic arguments are kept.
fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    match base.rfind("::") {
        Some(pos) => full.get(pos + 2..).unwrap_or(full),
        None => full,
    }
}

// --- RECEIVERS ---

/// Live instances that bound commands execute against, at most one per type.
#[derive(Default)]
pub struct ReceiverRegistry {
    receivers: HashMap<TypeId, Receiver>,
}

impl ReceiverRegistry {
    /// Creates an empty receiver registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the instance of `T`. A previous instance of the same type is replaced.
    pub fn insert<T: Any + Send + Sync>(&mut self, receiver: Arc<T>) {
        if self.receivers.insert(TypeId::of::<T>(), receiver).is_some() {
            log::debug!("Replaced receiver instance of {}", type_name::<T>());
        }
    }

    /// The instance of `T`, if one was registered.
    pub fn get<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.receivers
            .get(&TypeId::of::<T>())
            .cloned()
            .and_then(|r| r.downcast::<T>().ok())
    }

    fn find(&self, type_id: TypeId) -> Option<Receiver> {
        self.receivers.get(&type_id).cloned()
    }

    /// Number of registered instances.
    pub fn len(&self) -> usize {
        self.receivers.len()
    }

    /// Check if no instance was registered.
    pub fn is_empty(&self) -> bool {
        self.receivers.is_empty()
    }
}

impl fmt::Debug for ReceiverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReceiverRegistry")
            .field("len", &self.receivers.len())
            .finish()
    }
}

// --- DESCRIPTORS ---

/// The callable side of a registered command.
pub enum CommandTarget {
    /// Runs without a receiver.
    Unbound(CommandHandler),
    /// Runs against a receiver resolved once at registration time.
    Bound {
        /// The live instance.
        receiver: Receiver,
        /// Short type name of the instance, for diagnostics.
        receiver_type: &'static str,
        /// The type-erased handler.
        handler: BoundHandler,
    },
}

impl CommandTarget {
    /// Calls the handler with its receiver, if any.
    pub fn invoke(&self, args: &CommandArgs) -> Result<()> {
        match self {
            Self::Unbound(handler) => handler(args),
            Self::Bound {
                receiver, handler, ..
            } => handler(receiver.as_ref(), args),
        }
    }
}

impl fmt::Debug for CommandTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbound(_) => f.write_str("Unbound"),
            Self::Bound { receiver_type, .. } => write!(f, "Bound({})", receiver_type),
        }
    }
}

/// A registered command. Immutable once created.
#[derive(Debug)]
pub struct CommandDescriptor {
    name: String,
    description: String,
    parameters: Vec<ParameterSpec>,
    target: CommandTarget,
}

impl CommandDescriptor {
    /// Canonical lowercase name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Help text; may be empty.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Positional parameters, in binding order.
    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    /// The callable handle.
    pub fn target(&self) -> &CommandTarget {
        &self.target
    }

    /// Calls the command with already coerced arguments.
    pub fn invoke(&self, args: &CommandArgs) -> Result<()> {
        self.target.invoke(args)
    }
}

/// Validates a declaration and resolves its receiver.
fn resolve_declaration(
    declaration: CommandDeclaration,
    receivers: &ReceiverRegistry,
) -> Result<CommandDescriptor, RegistryError> {
    let name = declaration.name.trim().to_lowercase();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(RegistryError::InvalidCommandName(declaration.name));
    }
    if name == HELP_COMMAND {
        return Err(RegistryError::ReservedCommandName(name));
    }

    let parameters = declaration
        .parameters
        .iter()
        .map(|p| {
            parse_parameter_declaration(p).map_err(|e| match e {
                ParameterError::UnsupportedType(tag) => RegistryError::UnsupportedParameterType {
                    command: name.clone(),
                    tag,
                },
                _ => RegistryError::InvalidParameter {
                    command: name.clone(),
                    declaration: p.clone(),
                },
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let target = match declaration.target {
        DeclaredTarget::Unbound(handler) => CommandTarget::Unbound(handler),
        DeclaredTarget::Bound {
            type_id,
            type_name,
            handler,
        } => {
            let receiver = receivers
                .find(type_id)
                .ok_or(RegistryError::ReceiverNotFound {
                    command: name.clone(),
                    receiver_type: type_name,
                })?;
            CommandTarget::Bound {
                receiver,
                receiver_type: type_name,
                handler,
            }
        }
    };

    Ok(CommandDescriptor {
        name,
        description: declaration.description,
        parameters,
        target,
    })
}

// --- REGISTRY ---

/// Case-insensitive index of every registered command, in registration order.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: Vec<CommandDescriptor>,
    index: HashMap<String, usize>,
}

impl CommandRegistry {
    /// Starts collecting declarations and receivers.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Builds a registry from declarations, skipping (and reporting) every
    /// declaration that cannot be registered. Never fails as a whole.
    pub fn build(
        declarations: impl IntoIterator<Item = CommandDeclaration>,
        receivers: &ReceiverRegistry,
        sink: &dyn LogSink,
    ) -> Self {
        let _timer = dev_utils::BlockTimer::new("CommandRegistry::build");
        let mut registry = Self::default();

        for declaration in declarations {
            if let Err(e) = registry.register(declaration, receivers) {
                log::debug!("Skipping command registration: {:?}", e);
                sink.append(Severity::Warning, e.to_string());
            }
        }

        log::debug!("Registered {} console command(s)", registry.len());
        registry
    }

    /// Registers one more command. First registration of a name wins.
    pub fn register(
        &mut self,
        declaration: CommandDeclaration,
        receivers: &ReceiverRegistry,
    ) -> Result<(), RegistryError> {
        let key = declaration.name.trim().to_lowercase();
        if self.index.contains_key(&key) {
            return Err(RegistryError::DuplicateCommandName(key));
        }

        let descriptor = resolve_declaration(declaration, receivers)?;
        log::trace!(
            "Registering '{}' ({:?}, {} parameter(s))",
            descriptor.name,
            descriptor.target,
            descriptor.parameters.len()
        );
        self.index
            .insert(descriptor.name.clone(), self.commands.len());
        self.commands.push(descriptor);
        Ok(())
    }

    /// Finds a command by name, ignoring case.
    pub fn lookup(&self, name: &str) -> Option<&CommandDescriptor> {
        self.index
            .get(&name.trim().to_lowercase())
            .and_then(|&i| self.commands.get(i))
    }

    /// Every registered command, in registration order.
    pub fn list_all(&self) -> &[CommandDescriptor] {
        &self.commands
    }

    /// Check if a command is registered under `name`, ignoring case.
    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if no command is registered.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Collects declarations and receivers, then builds a [`CommandRegistry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    declarations: Vec<CommandDeclaration>,
    receivers: ReceiverRegistry,
}

impl RegistryBuilder {
    /// Adds a live receiver instance.
    pub fn receiver<T: Any + Send + Sync>(mut self, receiver: Arc<T>) -> Self {
        self.receivers.insert(receiver);
        self
    }

    /// Adds a command declaration.
    pub fn command(mut self, declaration: CommandDeclaration) -> Self {
        self.declarations.push(declaration);
        self
    }

    /// Adds several command declarations.
    pub fn commands(mut self, declarations: impl IntoIterator<Item = CommandDeclaration>) -> Self {
        self.declarations.extend(declarations);
        self
    }

    /// See [`CommandRegistry::build`].
    pub fn build(self, sink: &dyn LogSink) -> CommandRegistry {
        CommandRegistry::build(self.declarations, &self.receivers, sink)
    }
}
