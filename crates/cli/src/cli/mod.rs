// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use capq_core::{CaptureStatus, TextCategory};
use clap::{Parser, Subcommand, ValueEnum};

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

fn parse_category(s: &str) -> Result<TextCategory, String> {
    s.parse().map_err(|e: capq_core::Error| e.to_string())
}

fn parse_status(s: &str) -> Result<CaptureStatus, String> {
    s.parse().map_err(|e: capq_core::Error| e.to_string())
}

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "capq")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Offline-first capture queue that syncs notes and voice memos")]
#[command(
    long_about = "Offline-first capture queue.\n\n\
    Captures are stored locally first and delivered to the remote API when it is reachable. \
    Failed deliveries are retried on later sync runs up to a bounded number of attempts."
)]
pub struct Cli {
    /// Config file (default: $CAPQ_CONFIG or the platform config dir)
    #[arg(long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    /// Log debug output
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Queue a text capture
    #[command(after_help = "\
Examples:
  capq add \"Call the plumber\"                   Queue a note
  capq add \"Ship v2\" -c task --tag work        Queue a task with a tag
  capq add \"Idea\" -t \"Caching\" --now           Queue and sync immediately")]
    Add {
        /// Capture body
        #[arg(value_parser = non_empty_string)]
        content: String,

        /// Optional title
        #[arg(long, short, value_parser = non_empty_string)]
        title: Option<String>,

        /// Tag(s) for the capture (comma-separated or repeated)
        #[arg(long = "tag", value_delimiter = ',')]
        tags: Vec<String>,

        /// Target collection (note, idea, task)
        #[arg(long, short, default_value = "note", value_parser = parse_category)]
        category: TextCategory,

        /// Sync right away if the remote is reachable
        #[arg(long)]
        now: bool,

        #[arg(long, short, value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Queue an audio file as a voice capture
    Voice {
        /// Audio file to upload
        file: PathBuf,

        /// MIME type (guessed from the extension when omitted)
        #[arg(long)]
        mime: Option<String>,

        /// Recording length in seconds
        #[arg(long)]
        duration: Option<f64>,

        /// Transcription text sent alongside the audio
        #[arg(long)]
        transcription: Option<String>,

        /// Sync right away if the remote is reachable
        #[arg(long)]
        now: bool,

        #[arg(long, short, value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// List queued captures, oldest first
    List {
        /// Only show captures with this status (pending, syncing, failed)
        #[arg(long, short, value_parser = parse_status)]
        status: Option<CaptureStatus>,

        #[arg(long, short, value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Show one queued capture
    Show {
        id: String,

        #[arg(long, short, value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Show connectivity and queue counts
    Status {
        #[arg(long, short, value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Deliver eligible captures now
    Sync {
        #[arg(long, short, value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Drop captures from the queue without delivering them
    Remove {
        /// Capture IDs
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Drop every capture, or only failed ones
    Clear {
        /// Only drop failed captures
        #[arg(long)]
        failed: bool,
    },

    /// Re-queue a capture as a fresh pending record
    Retry {
        id: String,
    },

    /// Probe the remote and sync in the background until interrupted
    Watch {
        /// Seconds between connectivity probes (overrides the config)
        #[arg(long, value_name = "secs", value_parser = clap::value_parser!(u64).range(1..))]
        interval: Option<u64>,
    },

    /// Print the effective configuration
    Config,
}

impl Command {
    /// Whether the command needs a connectivity probe before it runs.
    /// `watch` probes on its own schedule.
    pub fn needs_probe(&self) -> bool {
        match self {
            Command::Add { now, .. } | Command::Voice { now, .. } => *now,
            Command::Status { .. } | Command::Sync { .. } => true,
            _ => false,
        }
    }

    pub fn is_long_running(&self) -> bool {
        matches!(self, Command::Watch { .. })
    }
}

#[cfg(test)]
#[path = "../cli_tests/mod.rs"]
mod tests;
