// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors reported by flowlocal.

use crate::context::{CellId, ScopeId};
use thiserror::Error;

/// Contract violations. None of these are transient; retrying will not help.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    /// A correlation scope was requested with an explicitly empty id.
    #[error("correlation id must not be empty")]
    EmptyCorrelationId,

    /// A scope guard was released while a younger scope on the same cell was still open.
    #[error("{scope} on {cell} released while a younger scope on the same cell is still open")]
    OutOfOrderRelease { cell: CellId, scope: ScopeId },
}

pub type Result<T, E = ContextError> = std::result::Result<T, E>;
