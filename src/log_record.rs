// SPDX-License-Identifier: MIT OR Apache-2.0

//! Log record type.
//!
//! A [`LogRecord`] accumulates the parts of one log line and is then handed,
//! by value, to every [`Logger`](crate::Logger). Parts are stored separately and
//! only joined when a logger writes them out.
//!
//! ```rust
//! use flowlocal::{Level, LogRecord};
//!
//! let mut record = LogRecord::new(Level::Info);
//! record.log("[2024-01-02 03:04:05.678] ");
//! record.log_owned(format!("[{}] ", "r1"));
//! record.log("started");
//! assert_eq!(record.to_string(), "[2024-01-02 03:04:05.678] [r1] started");
//! ```

use crate::Level;
use crate::config::TimeZone;
use chrono::{DateTime, Local, Utc};
use std::fmt::{Debug, Display};

/// `yyyy-MM-dd HH:mm:ss.fff`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Formats a wall-clock time with millisecond precision.
pub fn format_timestamp<Tz>(time: &DateTime<Tz>) -> String
where
    Tz: chrono::TimeZone,
    Tz::Offset: Display,
{
    time.format(TIMESTAMP_FORMAT).to_string()
}

/// The current wall-clock time in `zone`, formatted with [`format_timestamp`].
pub fn timestamp_now(zone: TimeZone) -> String {
    match zone {
        TimeZone::Utc => format_timestamp(&Utc::now()),
        TimeZone::Local => format_timestamp(&Local::now()),
    }
}

/**
A log record.

1.  Create a new [LogRecord].
2.  Progressively write to the [LogRecord].
3.  Submit it to each [crate::Logger].
*/
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LogRecord {
    pub(crate) parts: Vec<String>,
    level: Level,
}

impl LogRecord {
    pub fn new(level: Level) -> Self {
        Self {
            parts: Vec::new(),
            level,
        }
    }

    /**
    Append the message to the record.
    */
    pub fn log(&mut self, message: &str) {
        self.parts.push(message.to_string());
    }

    /**
    Append the message to the record, taking ownership of the message.
    */
    pub fn log_owned(&mut self, message: String) {
        self.parts.push(message);
    }

    /**
    Log the current wall-clock time in brackets, followed by a space.
    */
    pub fn log_timestamp(&mut self, zone: TimeZone) {
        self.log_owned(format!("[{}] ", timestamp_now(zone)));
    }

    pub fn level(&self) -> Level {
        self.level
    }
}

impl Default for LogRecord {
    fn default() -> Self {
        Self::new(Level::Info)
    }
}

impl Display for LogRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for part in &self.parts {
            write!(f, "{}", part)?;
        }
        Ok(())
    }
}
