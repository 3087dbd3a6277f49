// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lexically scoped overrides with guaranteed restoration.

use std::fmt::Debug;

use super::cell::ContextCell;
use super::logical_context::{CellId, ScopeId};
use crate::error::ContextError;

/// Restores a cell's previous value when the scope ends.
///
/// Created by [`ContextCell::create_scope`]. On construction the guard reads
/// the cell's current value, remembers it, then writes the scoped value. When
/// the guard is dropped (normal exit, early return, `?`, or a panic unwinding
/// through the block) or explicitly [`close`](ScopeGuard::close)d, it rebinds
/// the cell to the remembered value in the *then-current* ambient context.
/// Writes to other cells made inside the scope survive it.
///
/// Nested guards restore in reverse order of construction.
///
/// ```rust
/// use flowlocal::context::ContextCell;
///
/// static LEVEL: ContextCell<u32> = ContextCell::new();
///
/// let outer = LEVEL.create_scope(1);
/// let inner = LEVEL.create_scope(2);
/// assert_eq!(LEVEL.get(), 2);
/// inner.close().unwrap();
/// assert_eq!(LEVEL.get(), 1);
/// outer.close().unwrap();
/// assert!(!LEVEL.is_set());
/// ```
///
/// # Release order
///
/// A guard can only be released once: `close` consumes it and `Drop` does
/// nothing for a closed guard. Releasing a guard while a younger guard on the
/// same cell is still open in the same branch is a contract violation,
/// whatever was written to the cell in between. The restoration still
/// happens, but `close` reports [`ContextError::OutOfOrderRelease`] and an
/// implicit drop logs a warning. The younger guard inherits the value to put
/// back, so once every guard is released the cell holds its value from
/// before the oldest scope.
#[must_use = "dropping the guard immediately ends the scope"]
pub struct ScopeGuard<'a, T>
where
    T: Clone + Send + Sync + 'static,
{
    cell: &'a ContextCell<T>,
    previous: Option<T>,
    scope_id: ScopeId,
    released: bool,
}

impl<T> Debug for ScopeGuard<'_, T>
where
    T: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeGuard")
            .field("cell", &self.cell.id())
            .field("scope", &self.scope_id)
            .field("had_previous", &self.previous.is_some())
            .finish()
    }
}

impl<'a, T> ScopeGuard<'a, T>
where
    T: Clone + Send + Sync + 'static,
{
    pub(crate) fn enter(cell: &'a ContextCell<T>, value: T) -> Self {
        let previous = cell.value();
        let scope_id = cell.open_scope(value);
        ScopeGuard {
            cell,
            previous,
            scope_id,
            released: false,
        }
    }

    /// The value the cell held when the scope was entered.
    pub fn previous(&self) -> Option<&T> {
        self.previous.as_ref()
    }

    pub fn id(&self) -> ScopeId {
        self.scope_id
    }

    pub fn cell_id(&self) -> CellId {
        self.cell.id()
    }

    /// Ends the scope now.
    pub fn close(mut self) -> Result<(), ContextError> {
        self.release()
    }

    fn release(&mut self) -> Result<(), ContextError> {
        self.released = true;
        self.cell.close_scope(self.scope_id, self.previous.take())
    }
}

impl<T> Drop for ScopeGuard<'_, T>
where
    T: Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.release() {
            crate::dispatch::warn(&format!("{e}; restored anyway"));
        }
    }
}
