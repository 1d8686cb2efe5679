// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! capqrs - command-line front end for the capq capture queue.
//!
//! This crate provides the `capq` binary: it loads user configuration,
//! opens the queue in the local state directory, probes the remote API and
//! delivers captures over HTTP.
//!
//! # Main Components
//!
//! - [`Cli`] / [`Command`] - argument parsing
//! - [`Config`] - `config.toml` with remote, sync and storage sections
//! - [`http::HttpDelivery`] - the HTTP implementation of [`capq_core::Delivery`]
//! - [`Error`] - error type for all commands

mod cli;
pub mod colors;
mod commands;
pub mod config;
mod display;
pub mod env;
pub mod error;
pub mod http;
pub mod logging;
pub mod probe;

use std::path::Path;
use std::time::Duration;

use capq_core::{CaptureService, Delivery};
use reqwest::Url;

pub use cli::{Cli, Command, OutputFormat};
pub use config::Config;
pub use error::{Error, Result};

use commands::add::TextInput;
use commands::voice::VoiceInput;
use logging::LogTarget;

/// Execute a parsed command line. This is the main entry point for library
/// users and provides a testable way to run commands without process
/// execution.
pub fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    let long_running = cli.command.is_long_running();
    let target = match config.state_dir() {
        Ok(dir) if long_running => LogTarget::in_state_dir(&dir),
        _ => LogTarget::Stderr,
    };
    logging::init(logging::default_level(cli.verbose, long_running), &target);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(execute(cli.command, &config, cli.config.as_deref()))
}

async fn execute(command: Command, config: &Config, config_path: Option<&Path>) -> Result<()> {
    if let Command::Config = command {
        let path = config_path
            .map(Path::to_path_buf)
            .or_else(config::default_config_path);
        return commands::config::run(config, path.as_deref());
    }

    let remote = config.remote_url()?;
    let online = if command.needs_probe() {
        probe::is_reachable(&remote, probe::PROBE_TIMEOUT).await
    } else {
        false
    };

    let service = commands::open_service(config, online).await?;
    let result = dispatch(&service, command, config, &remote).await;
    service.shutdown();
    result
}

async fn dispatch<D: Delivery>(
    service: &CaptureService<D>,
    command: Command,
    config: &Config,
    remote: &Url,
) -> Result<()> {
    match command {
        Command::Add {
            content,
            title,
            tags,
            category,
            now,
            output,
        } => {
            let input = TextInput {
                content,
                title,
                tags,
                category,
            };
            commands::add::run(service, input, now, output).await
        }
        Command::Voice {
            file,
            mime,
            duration,
            transcription,
            now,
            output,
        } => {
            let input = VoiceInput {
                file,
                mime,
                duration,
                transcription,
            };
            commands::voice::run(service, input, now, output).await
        }
        Command::List { status, output } => commands::list::run(service, status, output).await,
        Command::Show { id, output } => commands::show::run(service, &id, output).await,
        Command::Status { output } => {
            commands::status::run(service, remote.as_str(), config.state_dir()?, output).await
        }
        Command::Sync { output } => commands::sync::run(service, output).await,
        Command::Remove { ids } => commands::remove::run(service, &ids).await,
        Command::Clear { failed } => commands::clear::run(service, failed).await,
        Command::Retry { id } => commands::retry::run(service, &id).await,
        Command::Watch { interval } => {
            let interval = interval
                .map(Duration::from_secs)
                .unwrap_or_else(|| config.probe_interval());
            commands::watch::run(service, remote, interval, &config.state_dir()?).await
        }
        Command::Config => commands::config::run(config, None),
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
