// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed handles into the ambient context.

use std::fmt::Debug;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock};

use super::apply_context::ApplyContext;
use super::logical_context::{Binding, CellId, LogicalContext, OpenScope, ScopeId, ScopeStack, Value};
use crate::error::{ContextError, Result};
use super::scope::ScopeGuard;

/// A typed key into whichever [`LogicalContext`] is ambient for the caller.
///
/// A cell owns no data. Reads and writes go to the calling branch's ambient
/// root, so two threads (or two tasks) reading the same cell may see different
/// values. Cells are usually declared once as a `static`:
///
/// ```rust
/// use flowlocal::context::ContextCell;
///
/// static USER: ContextCell<String> = ContextCell::new();
///
/// assert_eq!(USER.get(), "");
/// USER.set("alice".to_string());
/// assert_eq!(USER.get(), "alice");
///
/// let handle = flowlocal::branch::spawn_thread(|| {
///     // the thread starts from the spawner's snapshot
///     assert_eq!(USER.get(), "alice");
///     USER.set("bob".to_string());
/// });
/// handle.join().unwrap();
/// assert_eq!(USER.get(), "alice");
/// ```
pub struct ContextCell<T> {
    id: OnceLock<CellId>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Debug for ContextCell<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextCell")
            .field("id", &self.id.get())
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T> Default for ContextCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ContextCell<T> {
    pub const fn new() -> Self {
        ContextCell {
            id: OnceLock::new(),
            _marker: PhantomData,
        }
    }

    /// The identity of this cell; assigned on first use.
    pub fn id(&self) -> CellId {
        *self.id.get_or_init(CellId::next)
    }
}

impl<T> ContextCell<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Returns the ambient value, or `T::default()` when the cell is unbound.
    pub fn get(&self) -> T
    where
        T: Default,
    {
        self.value().unwrap_or_default()
    }

    /// Returns the ambient value, or `None` when the cell is unbound.
    pub fn value(&self) -> Option<T> {
        self.with(|v| v.cloned())
    }

    /// Borrows the ambient value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(Option<&T>) -> R) -> R {
        let ctx = LogicalContext::current();
        f(self.value_in(&ctx))
    }

    /// Reads this cell from an arbitrary snapshot instead of the ambient one.
    pub fn value_in<'c>(&self, context: &'c LogicalContext) -> Option<&'c T> {
        context
            .lookup(self.id())
            .and_then(|v| (**v).downcast_ref::<T>())
    }

    pub fn is_set(&self) -> bool {
        self.with(|v| v.is_some())
    }

    /// Rebinds the cell in a new snapshot and installs it for the calling branch.
    pub fn set(&self, value: T) {
        self.write(Some(value));
    }

    /// Unbinds the cell for the calling branch.
    pub fn clear(&self) {
        self.write(None);
    }

    /// Sets `value` and returns a guard that puts the current value back on exit.
    ///
    /// ```rust
    /// use flowlocal::context::ContextCell;
    ///
    /// static STAGE: ContextCell<&'static str> = ContextCell::new();
    ///
    /// STAGE.set("outer");
    /// {
    ///     let _scope = STAGE.create_scope("inner");
    ///     assert_eq!(STAGE.get(), "inner");
    /// }
    /// assert_eq!(STAGE.get(), "outer");
    /// ```
    pub fn create_scope(&self, value: T) -> ScopeGuard<'_, T> {
        ScopeGuard::enter(self, value)
    }

    /// Runs `f` in a forked branch where this cell is bound to `value`.
    pub fn sync_scope<R>(&self, value: T, f: impl FnOnce() -> R) -> R {
        self.forked_with(value).run(f)
    }

    /// Runs `future` in a forked branch where this cell is bound to `value`.
    ///
    /// The fork is taken now, not at first poll.
    pub fn scope<F: Future>(&self, value: T, future: F) -> ApplyContext<F> {
        ApplyContext::new(self.forked_with(value), future)
    }

    fn forked_with(&self, value: T) -> LogicalContext {
        let context = LogicalContext::current();
        let scopes = self.scopes_in(&context);
        context.with_binding(
            self.id(),
            Binding {
                value: Some(Arc::new(value) as Value),
                scopes,
            },
        )
    }

    fn scopes_in(&self, context: &LogicalContext) -> ScopeStack {
        context
            .binding(self.id())
            .map(|b| b.scopes.clone())
            .unwrap_or_default()
    }

    /// Rebinds the value and keeps the cell's open scopes.
    fn write(&self, value: Option<T>) {
        let context = LogicalContext::current();
        let scopes = self.scopes_in(&context);
        let value = value.map(|v| Arc::new(v) as Value);
        context
            .with_binding(self.id(), Binding { value, scopes })
            .set_current();
    }

    /// Binds `value` and records a new open scope that will put back the current value.
    pub(crate) fn open_scope(&self, value: T) -> ScopeId {
        let id = ScopeId::next();
        let context = LogicalContext::current();
        let current = context.binding(self.id());
        let frame = OpenScope {
            id,
            previous: current.and_then(|b| b.value.clone()),
        };
        let scopes = current.map(|b| b.scopes.clone()).unwrap_or_default().pushed(frame);
        let binding = Binding {
            value: Some(Arc::new(value) as Value),
            scopes,
        };
        context.with_binding(self.id(), binding).set_current();
        id
    }

    /// Ends scope `id` in the ambient root.
    ///
    /// The value is always restored. When `id` is not open in this root,
    /// `fallback` is restored instead. Fails when a younger scope on this
    /// cell is still open.
    pub(crate) fn close_scope(&self, id: ScopeId, fallback: Option<T>) -> Result<()> {
        let context = LogicalContext::current();
        let scopes = self.scopes_in(&context);
        let (binding, in_order) = match scopes.released(id) {
            Some(released) => (
                Binding {
                    value: released.restore,
                    scopes: released.stack,
                },
                released.in_order,
            ),
            None => (
                Binding {
                    value: fallback.map(|v| Arc::new(v) as Value),
                    scopes,
                },
                true,
            ),
        };
        context.with_binding(self.id(), binding).set_current();
        if in_order {
            Ok(())
        } else {
            Err(ContextError::OutOfOrderRelease {
                cell: self.id(),
                scope: id,
            })
        }
    }

    /// The youngest scope open on this cell in the ambient root.
    #[cfg(test)]
    pub(crate) fn innermost_scope(&self) -> Option<ScopeId> {
        self.scopes_in(&LogicalContext::current()).top()
    }
}
