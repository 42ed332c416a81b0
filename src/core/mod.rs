// src/core/mod.rs

//! Command engine, log, telemetry and configuration.

pub mod arg_parser;
pub mod config_loader;
pub mod dispatcher;
pub mod fps_graph;
pub mod log_buffer;
pub mod parameters;
pub mod paths;
pub mod registry;
pub mod telemetry;
