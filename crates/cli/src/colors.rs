// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal color utilities for record listings.
//!
//! Respects environment variables:
//! - `NO_COLOR=1`: Disables colors
//! - `COLOR=1`: Forces colors even without TTY

use std::io::IsTerminal;

use capq_core::CaptureStatus;

use crate::env;

/// ANSI 256-color codes
pub mod codes {
    /// Waiting for delivery: pastel cyan/steel blue
    pub const PENDING: u8 = 74;
    /// In flight: soft yellow
    pub const SYNCING: u8 = 179;
    /// Failed, will retry: salmon
    pub const FAILED: u8 = 174;
    /// Failed, out of retries: red
    pub const EXHAUSTED: u8 = 160;
    /// Secondary details (ids, timestamps): medium grey
    pub const CONTEXT: u8 = 245;
}

/// ANSI reset sequence.
const RESET: &str = "\x1b[0m";

/// Check if colors should be enabled based on TTY and environment variables.
pub fn should_colorize() -> bool {
    if env::no_color() {
        return false;
    }
    if env::force_color() {
        return true;
    }
    std::io::stdout().is_terminal()
}

/// Format a 256-color ANSI escape sequence for foreground color.
fn fg256(code: u8) -> String {
    format!("\x1b[38;5;{code}m")
}

fn paint(code: u8, text: &str, enabled: bool) -> String {
    if enabled {
        format!("{}{}{}", fg256(code), text, RESET)
    } else {
        text.to_string()
    }
}

/// Color code for a record's state.
pub fn status_code(status: CaptureStatus, exhausted: bool) -> u8 {
    match status {
        CaptureStatus::Pending => codes::PENDING,
        CaptureStatus::Syncing => codes::SYNCING,
        CaptureStatus::Failed if exhausted => codes::EXHAUSTED,
        CaptureStatus::Failed => codes::FAILED,
    }
}

/// Apply the status color to `text`.
pub fn status(text: &str, status: CaptureStatus, exhausted: bool, enabled: bool) -> String {
    paint(status_code(status, exhausted), text, enabled)
}

/// Apply context color (ids, timestamps, hints) to `text`.
pub fn context(text: &str, enabled: bool) -> String {
    paint(codes::CONTEXT, text, enabled)
}

#[cfg(test)]
#[path = "colors_tests.rs"]
mod tests;
