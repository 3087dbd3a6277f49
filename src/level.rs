// SPDX-License-Identifier: MIT OR Apache-2.0
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Ordinary output, including correlated log lines
    Info,
    /// Suspicious condition, e.g. a scope released out of order
    Warning,
    /// Something the caller asked for failed
    Error,
}
