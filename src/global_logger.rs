// SPDX-License-Identifier: MIT OR Apache-2.0

//! Global logger management.
//!
//! Every record produced by flowlocal (correlated log lines, warnings about
//! misused scope guards, demo output) is delivered to each logger in a
//! process-wide list. By default the list holds a single [`ConsoleLogger`]
//! writing to stdout.
//!
//! ```
//! use flowlocal::global_logger::{global_loggers, set_global_loggers};
//! use flowlocal::InMemoryLogger;
//! use std::sync::Arc;
//!
//! let original = global_loggers();
//! let logger = Arc::new(InMemoryLogger::new());
//! set_global_loggers(vec![logger.clone()]);
//! // ... records now only go to memory ...
//! set_global_loggers(original);
//! ```
//!
//! Loggers are reference counted. A logger removed from the list stays alive
//! until in-flight records finish with it.

use crate::console_logger::ConsoleLogger;
use crate::logger::Logger;
use parking_lot::RwLock;
use std::sync::{Arc, OnceLock};

static GLOBAL_LOGGERS: OnceLock<RwLock<Vec<Arc<dyn Logger>>>> = OnceLock::new();

fn default_loggers() -> Vec<Arc<dyn Logger>> {
    vec![Arc::new(ConsoleLogger::stdout())]
}

fn loggers() -> &'static RwLock<Vec<Arc<dyn Logger>>> {
    GLOBAL_LOGGERS.get_or_init(|| RwLock::new(default_loggers()))
}

/// A snapshot of the current loggers.
pub fn global_loggers() -> Vec<Arc<dyn Logger>> {
    loggers().read().clone()
}

/// Adds a logger alongside the existing ones.
pub fn add_global_logger(logger: Arc<dyn Logger>) {
    loggers().write().push(logger);
}

/// Replaces every logger.
pub fn set_global_loggers(new_loggers: Vec<Arc<dyn Logger>>) {
    *loggers().write() = new_loggers;
}

/// Asks every logger to flush.
pub fn prepare_to_die() {
    for logger in global_loggers() {
        logger.prepare_to_die();
    }
}
