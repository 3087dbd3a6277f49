// SPDX-License-Identifier: MIT OR Apache-2.0

//! Walkthroughs of the propagation rules, used by the `flowlocal-demo` binary.
//!
//! Each demo writes its narration to the global loggers and its correlated
//! lines through [`CorrelationService::global`](crate::correlation::CorrelationService::global).
//! Run a demo as its own branch (see [`Demo::run`]) so that one demo's writes
//! never leak into the next.

pub mod basic;
pub mod comparison;
pub mod logging;

use crate::branch;
use std::fmt::Display;

/// The demos offered by the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Demo {
    Basic,
    Comparison,
    Logging,
}

impl Demo {
    pub const ALL: [Demo; 3] = [Demo::Basic, Demo::Comparison, Demo::Logging];

    /// Maps a menu number (1-based) to a demo.
    pub fn from_choice(choice: &str) -> Option<Demo> {
        match choice.trim() {
            "1" => Some(Demo::Basic),
            "2" => Some(Demo::Comparison),
            "3" => Some(Demo::Logging),
            _ => None,
        }
    }

    /// Runs the demo as a forked branch.
    pub async fn run(self) -> anyhow::Result<()> {
        match self {
            Demo::Basic => branch::fork(basic::run()).await,
            Demo::Comparison => branch::fork(comparison::run()).await,
            Demo::Logging => branch::fork(logging::run()).await,
        }
    }
}

impl Display for Demo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Demo::Basic => "Basic context flow",
            Demo::Comparison => "thread_local! vs ContextCell comparison",
            Demo::Logging => "Correlated logging",
        })
    }
}

pub(crate) fn say(line: impl AsRef<str>) {
    crate::dispatch::info(line.as_ref());
}
