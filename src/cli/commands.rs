//! # Demo Host
//!
//! A small stand-in for a real application: a game clock with a time scale and
//! a scene director with a fixed scene list. Both are registered as receivers
//! and driven by the stock commands below. Command output goes through the
//! `log` macros so that it lands in the console once the
//! [`crate::system::logger::ConsoleLogger`] is installed.

use crate::core::{
    registry::{CommandDeclaration, CommandRegistry, RegistryBuilder},
    telemetry::{HostCounters, SystemInfo, TelemetrySource},
};
use anyhow::{Result, bail};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

/// Highest accepted time scale.
pub const MAX_TIME_SCALE: f64 = 100.0;

/// Scenes the demo host knows about.
pub const DEMO_SCENES: &[&str] = &["MainMenu", "Sandbox", "Arena"];

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// --- Receivers ---

/// Global simulation speed.
#[derive(Debug)]
pub struct GameClock {
    time_scale: Mutex<f64>,
}

impl GameClock {
    /// A clock running at normal speed.
    pub fn new() -> Self {
        Self {
            time_scale: Mutex::new(1.0),
        }
    }

    /// The current time scale.
    pub fn time_scale(&self) -> f64 {
        *lock(&self.time_scale)
    }

    /// Sets the time scale. Must lie within `0..=MAX_TIME_SCALE`.
    pub fn set_time_scale(&self, value: f64) -> Result<()> {
        if !(0.0..=MAX_TIME_SCALE).contains(&value) {
            bail!(
                "Time scale must be between 0 and {}, got {}",
                MAX_TIME_SCALE,
                value
            );
        }
        *lock(&self.time_scale) = value;
        Ok(())
    }
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
struct ActiveScene {
    index: usize,
    loaded_at: Instant,
}

/// Loads scenes from a fixed list.
#[derive(Debug)]
pub struct SceneDirector {
    scenes: Vec<String>,
    active: Mutex<ActiveScene>,
}

impl SceneDirector {
    /// A director whose first scene is active.
    pub fn new(scenes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            scenes: scenes.into_iter().map(Into::into).collect(),
            active: Mutex::new(ActiveScene {
                index: 0,
                loaded_at: Instant::now(),
            }),
        }
    }

    /// Every known scene, in build order.
    pub fn scenes(&self) -> &[String] {
        &self.scenes
    }

    /// Name of the active scene, or an empty string if there are no scenes.
    pub fn active_scene(&self) -> String {
        let index = lock(&self.active).index;
        self.scenes.get(index).cloned().unwrap_or_default()
    }

    /// Real seconds since the active scene was (re)loaded.
    pub fn scene_age_secs(&self) -> f64 {
        lock(&self.active).loaded_at.elapsed().as_secs_f64()
    }

    /// Activates the scene named `name` (exact match). Returns false if it is unknown.
    pub fn load(&self, name: &str) -> bool {
        let Some(index) = self.scenes.iter().position(|scene| scene == name) else {
            return false;
        };
        *lock(&self.active) = ActiveScene {
            index,
            loaded_at: Instant::now(),
        };
        true
    }

    /// Restarts the active scene.
    pub fn reload(&self) {
        lock(&self.active).loaded_at = Instant::now();
    }
}

impl Default for SceneDirector {
    fn default() -> Self {
        Self::new(DEMO_SCENES.iter().copied())
    }
}

// --- Host ---

/// The demo application: its receivers plus a telemetry view over them.
#[derive(Debug, Clone)]
pub struct DemoHost {
    /// The game clock receiver.
    pub clock: Arc<GameClock>,
    /// The scene director receiver.
    pub director: Arc<SceneDirector>,
    started: Instant,
    system: SystemInfo,
}

impl DemoHost {
    /// A host with the stock demo scenes.
    pub fn new() -> Self {
        Self {
            clock: Arc::new(GameClock::new()),
            director: Arc::new(SceneDirector::default()),
            started: Instant::now(),
            system: SystemInfo::detect(),
        }
    }

    /// The stock commands, bound to this host's receivers.
    pub fn commands(&self) -> RegistryBuilder {
        CommandRegistry::builder()
            .receiver(Arc::clone(&self.clock))
            .receiver(Arc::clone(&self.director))
            .commands(declarations())
    }
}

impl Default for DemoHost {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetrySource for DemoHost {
    fn counters(&self) -> HostCounters {
        let time_scale = self.clock.time_scale();
        HostCounters {
            object_count: self.director.scenes().len(),
            scene_name: self.director.active_scene(),
            scene_time_secs: self.director.scene_age_secs() * time_scale,
            realtime_secs: self.started.elapsed().as_secs_f64(),
            time_scale,
            system: self.system.clone(),
            ..HostCounters::default()
        }
    }
}

// --- Commands ---

/// Declarations of the stock demo commands.
pub fn declarations() -> Vec<CommandDeclaration> {
    vec![
        CommandDeclaration::bound::<GameClock, _>(
            "set_timescale",
            "Set global timescale to value.",
            &["value:float"],
            |clock, args| {
                let value = args.float(0)?;
                clock.set_time_scale(value)?;
                log::info!("Time scale set to {}.", value);
                Ok(())
            },
        ),
        CommandDeclaration::bound::<GameClock, _>(
            "reset_timescale",
            "Resets global timescale to default value.",
            &[],
            |clock, _| {
                clock.set_time_scale(1.0)?;
                log::info!("Time scale has been reset.");
                Ok(())
            },
        ),
        CommandDeclaration::bound::<SceneDirector, _>(
            "reload_scene",
            "Reloads current scene.",
            &[],
            |director, _| {
                director.reload();
                log::info!("Scene {} has been reloaded.", director.active_scene());
                Ok(())
            },
        ),
        CommandDeclaration::bound::<SceneDirector, _>(
            "list_scenes",
            "Lists all available scenes.",
            &[],
            |director, _| {
                let scenes = director.scenes();
                log::info!("Scenes in build settings ({}):", scenes.len());
                for (i, scene) in scenes.iter().enumerate() {
                    log::info!("{}: {}", i, scene);
                }
                Ok(())
            },
        ),
        CommandDeclaration::bound::<SceneDirector, _>(
            "set_scene",
            "Loads scene by name.",
            &["scene_name:string"],
            |director, args| {
                let name = args.text(0)?;
                if director.load(name) {
                    log::info!("Scene '{}' has been loaded.", name);
                } else {
                    log::warn!(
                        "Scene '{}' cannot be loaded. Check scene name or build settings.",
                        name
                    );
                }
                Ok(())
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        dispatcher::{DispatchError, Dispatcher},
        log_buffer::SharedLogBuffer,
    };

    fn dispatcher(host: &DemoHost) -> (Dispatcher, SharedLogBuffer) {
        let sink = SharedLogBuffer::with_capacity(50);
        let registry = host.commands().build(&sink);
        (Dispatcher::new(registry), sink)
    }

    #[test]
    fn test_every_stock_command_registers() {
        let host = DemoHost::new();
        let (dispatcher, sink) = dispatcher(&host);

        let names: Vec<_> = dispatcher
            .registry()
            .list_all()
            .iter()
            .map(|c| c.name())
            .collect();
        assert_eq!(
            names,
            vec![
                "set_timescale",
                "reset_timescale",
                "reload_scene",
                "list_scenes",
                "set_scene"
            ]
        );
        assert!(sink.snapshot().is_empty());
    }

    #[test]
    fn test_timescale_commands_drive_the_clock() {
        // --- Setup ---
        let host = DemoHost::new();
        let (dispatcher, sink) = dispatcher(&host);

        // --- Execute & Assert ---
        assert!(dispatcher.execute("SET_TIMESCALE 2.5", &sink).is_ok());
        assert_eq!(host.clock.time_scale(), 2.5);

        assert!(dispatcher.execute("set_timescale -1", &sink).is_err());
        assert_eq!(host.clock.time_scale(), 2.5);
        assert_eq!(
            sink.snapshot().last().unwrap().message,
            "Command execution error: Time scale must be between 0 and 100, got -1"
        );

        // Non-finite floats reach the handler, which rejects them.
        let outcome = dispatcher.execute("set_timescale NaN", &sink);
        assert!(matches!(outcome, Err(DispatchError::InvocationFailure { .. })));
        assert!(dispatcher.execute("set_timescale Infinity", &sink).is_err());
        assert_eq!(host.clock.time_scale(), 2.5);

        assert!(dispatcher.execute("reset_timescale", &sink).is_ok());
        assert_eq!(host.clock.time_scale(), 1.0);
    }

    #[test]
    fn test_set_scene_only_loads_known_scenes() {
        let host = DemoHost::new();
        let (dispatcher, sink) = dispatcher(&host);
        assert_eq!(host.director.active_scene(), "MainMenu");

        assert!(dispatcher.execute("set_scene Arena", &sink).is_ok());
        assert_eq!(host.director.active_scene(), "Arena");

        // An unknown scene is a warning from the command, not a failure.
        assert!(dispatcher.execute("set_scene arena", &sink).is_ok());
        assert_eq!(host.director.active_scene(), "Arena");
    }

    #[test]
    fn test_counters_reflect_receivers() {
        let host = DemoHost::new();
        host.clock.set_time_scale(0.5).unwrap();
        host.director.load("Sandbox");

        let counters = host.counters();

        assert_eq!(counters.scene_name, "Sandbox");
        assert_eq!(counters.time_scale, 0.5);
        assert_eq!(counters.object_count, 3);
        assert!(counters.triangles.is_none());
    }

    #[test]
    fn test_empty_director_has_no_active_scene() {
        let director = SceneDirector::new(Vec::<String>::new());
        assert_eq!(director.active_scene(), "");
        assert!(!director.load("Anything"));
    }
}
