// SPDX-License-Identifier: MIT OR Apache-2.0

//! Correlation id generation.

use crate::config::IdFormat;
use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Supplies a fresh opaque token for each new correlation scope.
pub trait IdGenerator: Debug + Send + Sync {
    /// Returns a token that is never empty.
    fn generate(&self) -> String;
}

/// Random (v4) UUIDs. Collisions are negligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct UuidGenerator {
    format: IdFormat,
}

impl UuidGenerator {
    pub const fn new(format: IdFormat) -> Self {
        Self { format }
    }
}

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        let id = Uuid::new_v4();
        match self.format {
            IdFormat::Simple => id.simple().to_string(),
            IdFormat::Hyphenated => id.hyphenated().to_string(),
        }
    }
}

/// `<prefix>-1`, `<prefix>-2`, ... Unique within one generator.
#[derive(Debug)]
pub struct SequentialGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequentialGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl IdGenerator for SequentialGenerator {
    fn generate(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", self.prefix, n)
    }
}
