// src/bin/devconsole.rs

//! Terminal host for the developer console.

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use devconsole::{
    cli::{Cli, commands::DemoHost, repl::Session},
    core::{config_loader, log_buffer::SharedLogBuffer},
    system::{console::DebugConsole, logger},
};
use log::LevelFilter;
use std::io;

/// The main entry point of the `devconsole` application.
/// It parses arguments, runs the session and performs centralized error handling.
fn main() {
    if let Err(e) = run_cli(Cli::parse()) {
        eprintln!("\n{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Loads the configuration, wires the logger into the console and runs either
/// the scripted lines or the interactive REPL.
fn run_cli(cli: Cli) -> Result<()> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    let mut config = config_loader::load_config(cli.config.as_deref())?;
    if cli.visible {
        config.start_visible = true;
    }
    if cli.no_color {
        config.colors = false;
    }

    let buffer = SharedLogBuffer::with_capacity(config.max_log_lines);
    logger::install(buffer.clone(), LevelFilter::Info)
        .context("Failed to install the console logger")?;
    log::debug!("CLI args parsed: {:?}", cli);
    log::debug!("Effective config: {:?}", config);

    let host = DemoHost::new();
    let mut console = DebugConsole::with_buffer(&config, host.commands(), buffer);
    let stdout = io::stdout();
    let mut session = Session::new(&mut console, &host, stdout.lock());

    if cli.commands.is_empty() {
        session.run(io::stdin().lock())
    } else {
        session.run_lines(&cli.commands)
    }
}
