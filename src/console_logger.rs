// SPDX-License-Identifier: MIT OR Apache-2.0
use crate::log_record::LogRecord;
use crate::logger::Logger;
use std::io::Write;

/// Which standard stream a [`ConsoleLogger`] writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Stream {
    #[default]
    Stdout,
    Stderr,
}

/**
A reference logger that writes one line per record to a standard stream.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ConsoleLogger {
    stream: Stream,
}

// ============================================================================
// BOILERPLATE TRAIT IMPLEMENTATIONS
// ============================================================================
//
// - Copy/Eq/Hash: the logger is just a stream selector
// - Default: stdout, where the correlated lines are expected
// - Display: NOT implemented - no meaningful string representation

impl ConsoleLogger {
    pub const fn new(stream: Stream) -> Self {
        Self { stream }
    }

    pub const fn stdout() -> Self {
        Self::new(Stream::Stdout)
    }

    pub const fn stderr() -> Self {
        Self::new(Stream::Stderr)
    }

    pub fn stream(&self) -> Stream {
        self.stream
    }

    fn write_parts(lock: &mut impl Write, record: LogRecord) -> std::io::Result<()> {
        for part in record.parts {
            lock.write_all(part.as_bytes())?;
        }
        lock.write_all(b"\n")
    }
}

impl Logger for ConsoleLogger {
    fn finish_log_record(&self, record: LogRecord) {
        // a closed stream has nowhere to report to
        let _ = match self.stream {
            Stream::Stdout => Self::write_parts(&mut std::io::stdout().lock(), record),
            Stream::Stderr => Self::write_parts(&mut std::io::stderr().lock(), record),
        };
    }

    fn prepare_to_die(&self) {
        let _ = match self.stream {
            Stream::Stdout => std::io::stdout().flush(),
            Stream::Stderr => std::io::stderr().flush(),
        };
    }
}
