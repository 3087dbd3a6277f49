// SPDX-License-Identifier: MIT OR Apache-2.0

//! # In-Memory Logger
//!
//! An in-memory sink for tests and for programmatically examining output.
//! Records are rendered to strings as they arrive and kept until drained.
//!
//! ```rust
//! use flowlocal::correlation::CorrelationService;
//! use flowlocal::InMemoryLogger;
//! use std::sync::Arc;
//!
//! let logger = Arc::new(InMemoryLogger::new());
//! let service = CorrelationService::default().with_loggers(vec![logger.clone()]);
//!
//! let _scope = service.new_scope_with("req-1").unwrap();
//! service.log("hello");
//! assert!(logger.drain_logs().ends_with("[req-1] hello"));
//! ```

use crate::log_record::LogRecord;
use crate::logger::Logger;
use parking_lot::Mutex;

/// Stores every record it receives as a rendered line.
#[derive(Debug, Default)]
pub struct InMemoryLogger {
    logs: Mutex<Vec<String>>,
}

// ============================================================================
// BOILERPLATE TRAIT IMPLEMENTATIONS
// ============================================================================
//
// - Debug: required by Logger
// - Default: empty buffer
// - Clone: NOT implemented - share through Arc instead
// - PartialEq/Eq/Hash: NOT implemented - equality semantics unclear for loggers

impl InMemoryLogger {
    pub fn new() -> Self {
        Self {
            logs: Mutex::new(Vec::new()),
        }
    }

    /// Removes and returns every line, joined with `\n`.
    pub fn drain_logs(&self) -> String {
        let mut logs = self.logs.lock();
        let result = logs.join("\n");
        logs.clear();
        result
    }

    /// Removes and returns every line.
    pub fn drain_lines(&self) -> Vec<String> {
        std::mem::take(&mut *self.logs.lock())
    }

    /// A copy of the lines collected so far.
    pub fn lines(&self) -> Vec<String> {
        self.logs.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.logs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.lock().is_empty()
    }

    /// Writes the collected lines to stderr and clears them.
    pub fn drain_to_console(&self) {
        for log in self.drain_lines() {
            eprintln!("{}", log);
        }
    }
}

impl Logger for InMemoryLogger {
    fn finish_log_record(&self, record: LogRecord) {
        let log_string = record.to_string();
        self.logs.lock().push(log_string);
    }

    fn prepare_to_die(&self) {
        // nothing buffered outside memory
    }
}
