// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for [`CorrelationService`](crate::correlation::CorrelationService).

use crate::correlation::{IdGenerator, UuidGenerator};
use std::sync::Arc;

/// Textual shape of generated correlation ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IdFormat {
    /// 32 lowercase hex digits, no separators.
    #[default]
    Simple,
    /// `8-4-4-4-12` lowercase hex groups.
    Hyphenated,
}

/// Clock used for the timestamp column of log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimeZone {
    #[default]
    Utc,
    Local,
}

/// Settings for a correlation service.
///
/// ```rust
/// use flowlocal::config::{CorrelationConfig, IdFormat, TimeZone};
///
/// let config = CorrelationConfig::default()
///     .with_id_format(IdFormat::Hyphenated)
///     .with_time_zone(TimeZone::Local);
/// assert_eq!(config.id_format, IdFormat::Hyphenated);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CorrelationConfig {
    pub id_format: IdFormat,
    pub time_zone: TimeZone,
}

impl CorrelationConfig {
    pub fn with_id_format(mut self, id_format: IdFormat) -> Self {
        self.id_format = id_format;
        self
    }

    pub fn with_time_zone(mut self, time_zone: TimeZone) -> Self {
        self.time_zone = time_zone;
        self
    }

    /// The default generator for this configuration.
    pub fn id_generator(&self) -> Arc<dyn IdGenerator> {
        Arc::new(UuidGenerator::new(self.id_format))
    }
}
