// SPDX-License-Identifier: MIT OR Apache-2.0

//! Correlation ids for grouping log lines of one logical operation.
//!
//! A [`CorrelationService`] keeps the current correlation id in a
//! [`ContextCell<String>`], so the id flows into every task and thread spawned
//! through [`crate::branch`] while the scope is open. Every line written with
//! [`CorrelationService::log`] has the form
//!
//! ```text
//! [yyyy-MM-dd HH:mm:ss.fff] [<correlation id, possibly empty>] <message>
//! ```
//!
//! The free functions in this module use the process-wide service:
//!
//! ```rust
//! use flowlocal::correlation;
//!
//! assert_eq!(correlation::current(), "");
//! {
//!     let _scope = correlation::new_scope_with("order-17").unwrap();
//!     assert_eq!(correlation::current(), "order-17");
//!     correlation::log("charging card");
//! }
//! assert_eq!(correlation::current(), "");
//! ```

mod id_generator;


pub use id_generator::{IdGenerator, SequentialGenerator, UuidGenerator};

use crate::Level;
use crate::config::CorrelationConfig;
use crate::context::{ApplyContext, ContextCell, ScopeGuard};
use crate::dispatch::{dispatch_to, dispatch_to_async};
use crate::error::{ContextError, Result};
use crate::global_logger::global_loggers;
use crate::log_record::{LogRecord, timestamp_now};
use crate::logger::Logger;
use std::fmt::Debug;
use std::future::Future;
use std::sync::{Arc, OnceLock};

static GLOBAL: OnceLock<CorrelationService> = OnceLock::new();

/// Request-scoped correlation ids and the log lines tagged with them.
///
/// Each service owns its own cell, so two services never see each other's
/// ids. Most programs use the process-wide [`CorrelationService::global`].
pub struct CorrelationService {
    cell: ContextCell<String>,
    generator: Arc<dyn IdGenerator>,
    config: CorrelationConfig,
    /// `None` writes to the global loggers.
    loggers: Option<Vec<Arc<dyn Logger>>>,
}

impl Debug for CorrelationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CorrelationService")
            .field("cell", &self.cell)
            .field("generator", &self.generator)
            .field("config", &self.config)
            .field("dedicated_loggers", &self.loggers.as_ref().map(Vec::len))
            .finish()
    }
}

impl Default for CorrelationService {
    fn default() -> Self {
        Self::new(CorrelationConfig::default())
    }
}

impl CorrelationService {
    pub fn new(config: CorrelationConfig) -> Self {
        Self {
            cell: ContextCell::new(),
            generator: config.id_generator(),
            config,
            loggers: None,
        }
    }

    /// Writes to `loggers` instead of the global loggers.
    pub fn with_loggers(mut self, loggers: Vec<Arc<dyn Logger>>) -> Self {
        self.loggers = Some(loggers);
        self
    }

    pub fn with_id_generator(mut self, generator: Arc<dyn IdGenerator>) -> Self {
        self.generator = generator;
        self
    }

    /// The process-wide service. Built from the default configuration unless
    /// [`CorrelationService::init_global`] ran first.
    pub fn global() -> &'static CorrelationService {
        GLOBAL.get_or_init(CorrelationService::default)
    }

    /// Installs `service` as the process-wide service.
    ///
    /// Fails, handing the service back, once the global has been used or set.
    pub fn init_global(service: CorrelationService) -> std::result::Result<(), CorrelationService> {
        GLOBAL.set(service)
    }

    pub fn config(&self) -> &CorrelationConfig {
        &self.config
    }

    /// The cell holding the current id.
    pub fn cell(&self) -> &ContextCell<String> {
        &self.cell
    }

    /// The ambient correlation id, or `""` when none is set.
    pub fn current(&self) -> String {
        self.cell.get()
    }

    /// Opens a scope with a freshly generated id.
    pub fn new_scope(&self) -> ScopeGuard<'_, String> {
        self.cell.create_scope(self.generator.generate())
    }

    /// Opens a scope with `id`.
    ///
    /// An empty `id` is rejected before anything is written.
    pub fn new_scope_with(&self, id: impl Into<String>) -> Result<ScopeGuard<'_, String>> {
        let id = Self::validate(id.into())?;
        Ok(self.cell.create_scope(id))
    }

    /// Runs `future` as a new branch with a freshly generated id.
    pub fn scoped<F: Future>(&self, future: F) -> ApplyContext<F> {
        self.cell.scope(self.generator.generate(), future)
    }

    /// Runs `future` as a new branch with `id`.
    pub fn scoped_with<F: Future>(&self, id: impl Into<String>, future: F) -> Result<ApplyContext<F>> {
        let id = Self::validate(id.into())?;
        Ok(self.cell.scope(id, future))
    }

    fn validate(id: String) -> Result<String> {
        if id.is_empty() {
            Err(ContextError::EmptyCorrelationId)
        } else {
            Ok(id)
        }
    }

    /// Builds the record for `message` without writing it.
    ///
    /// The record holds exactly one [`format_line`] line.
    pub fn record(&self, message: &str) -> LogRecord {
        let timestamp = timestamp_now(self.config.time_zone);
        let mut record = LogRecord::new(Level::Info);
        self.cell.with(|id| {
            record.log_owned(format_line(
                &timestamp,
                id.map(String::as_str).unwrap_or_default(),
                message,
            ));
        });
        record
    }

    /// Writes `message`, tagged with the current id, to the sinks.
    pub fn log(&self, message: &str) {
        let record = self.record(message);
        match &self.loggers {
            Some(loggers) => dispatch_to(loggers, record),
            None => dispatch_to(&global_loggers(), record),
        }
    }

    /// Like [`log`](Self::log), through each logger's async entry point.
    pub async fn log_async(&self, message: &str) {
        let record = self.record(message);
        match &self.loggers {
            Some(loggers) => dispatch_to_async(loggers, record).await,
            None => dispatch_to_async(&global_loggers(), record).await,
        }
    }
}

/// Formats one correlated line from its three columns.
pub fn format_line(timestamp: &str, correlation_id: &str, message: &str) -> String {
    format!("[{timestamp}] [{correlation_id}] {message}")
}

/// The process-wide correlation id, or `""`.
pub fn current() -> String {
    CorrelationService::global().current()
}

/// Opens a process-wide correlation scope with a generated id.
pub fn new_scope() -> ScopeGuard<'static, String> {
    CorrelationService::global().new_scope()
}

/// Opens a process-wide correlation scope with `id`.
pub fn new_scope_with(id: impl Into<String>) -> Result<ScopeGuard<'static, String>> {
    CorrelationService::global().new_scope_with(id)
}

/// Writes `message` tagged with the process-wide correlation id.
pub fn log(message: &str) {
    CorrelationService::global().log(message);
}
