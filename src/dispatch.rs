// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record dispatch to loggers.
//!
//! Builds flowlocal's own diagnostic records and hands records to the
//! global loggers (or to an explicit list of sinks).

use crate::Level;
use crate::config::TimeZone;
use crate::global_logger::global_loggers;
use crate::log_record::LogRecord;
use crate::logger::Logger;
use std::sync::Arc;

/// Delivers a record to each logger.
pub fn dispatch_to(loggers: &[Arc<dyn Logger>], record: LogRecord) {
    if let Some((last, rest)) = loggers.split_last() {
        for logger in rest {
            logger.finish_log_record(record.clone());
        }
        last.finish_log_record(record);
    }
}

/// Delivers a record to each logger, through the async entry point.
pub async fn dispatch_to_async(loggers: &[Arc<dyn Logger>], record: LogRecord) {
    for logger in loggers {
        logger.finish_log_record_async(record.clone()).await;
    }
}

/// Delivers a record to the global loggers.
pub fn dispatch(record: LogRecord) {
    dispatch_to(&global_loggers(), record);
}

fn diagnostic(level: Level, tag: &str, message: &str) -> LogRecord {
    let mut record = LogRecord::new(level);
    record.log_timestamp(TimeZone::Utc);
    record.log(tag);
    record.log(message);
    record
}

/// Logs a suspicious condition to the global loggers.
pub fn warn(message: &str) {
    dispatch(diagnostic(Level::Warning, "WARN: ", message));
}

/// Logs a failure to the global loggers.
pub fn error(message: &str) {
    dispatch(diagnostic(Level::Error, "ERROR: ", message));
}

/// Logs a plain line to the global loggers, without timestamp.
pub fn info(message: &str) {
    let mut record = LogRecord::new(Level::Info);
    record.log(message);
    dispatch(record);
}
