// SPDX-License-Identifier: MIT OR Apache-2.0

//! Immutable binding snapshots and the per-thread ambient root.

use std::any::Any;
use std::cell::Cell;
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Chains longer than this are flattened on the next write.
pub(crate) const MAX_CHAIN_DEPTH: usize = 32;

pub(crate) static CELL_ID: AtomicU64 = AtomicU64::new(0);
pub(crate) static SCOPE_ID: AtomicU64 = AtomicU64::new(0);

/// Stable identity of a [`ContextCell`](super::ContextCell).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(pub(crate) u64);

impl CellId {
    pub(crate) fn next() -> CellId {
        CellId(CELL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Display for CellId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cell#{}", self.0)
    }
}

/// Identity of one [`ScopeGuard`](super::ScopeGuard).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub(crate) u64);

impl ScopeId {
    pub(crate) fn next() -> ScopeId {
        ScopeId(SCOPE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Display for ScopeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "scope#{}", self.0)
    }
}

pub(crate) type Value = Arc<dyn Any + Send + Sync>;

/// A scope that is still open on one cell, with the value it will put back.
#[derive(Clone)]
pub(crate) struct OpenScope {
    pub(crate) id: ScopeId,
    pub(crate) previous: Option<Value>,
}

/// The scopes open on one cell in one snapshot, oldest first.
///
/// Immutable. Pushing or releasing builds a new stack.
#[derive(Clone, Default)]
pub(crate) struct ScopeStack(Option<Arc<[OpenScope]>>);

/// Result of taking one scope off a [`ScopeStack`].
pub(crate) struct Released {
    /// The stack without the released scope.
    pub(crate) stack: ScopeStack,
    /// The value the cell goes back to.
    pub(crate) restore: Option<Value>,
    /// Whether the released scope was the youngest one open.
    pub(crate) in_order: bool,
}

impl ScopeStack {
    fn frames(&self) -> &[OpenScope] {
        self.0.as_deref().unwrap_or(&[])
    }

    pub(crate) fn len(&self) -> usize {
        self.frames().len()
    }

    #[cfg(test)]
    pub(crate) fn top(&self) -> Option<ScopeId> {
        self.frames().last().map(|f| f.id)
    }

    pub(crate) fn pushed(&self, frame: OpenScope) -> ScopeStack {
        let mut frames = self.frames().to_vec();
        frames.push(frame);
        ScopeStack(Some(frames.into()))
    }

    /// Takes `id` off the stack. `None` when `id` is not open here.
    ///
    /// A scope released before a younger one hands its `previous` to the
    /// next younger scope, so unwinding the rest still ends at the value
    /// from before the oldest of them.
    pub(crate) fn released(&self, id: ScopeId) -> Option<Released> {
        let frames = self.frames();
        let pos = frames.iter().position(|f| f.id == id)?;
        let restore = frames[pos].previous.clone();
        let mut rest: Vec<OpenScope> = frames[..pos].to_vec();
        let younger = &frames[pos + 1..];
        if let Some((next, others)) = younger.split_first() {
            rest.push(OpenScope {
                id: next.id,
                previous: restore.clone(),
            });
            rest.extend_from_slice(others);
        }
        let stack = if rest.is_empty() {
            ScopeStack(None)
        } else {
            ScopeStack(Some(rest.into()))
        };
        Some(Released {
            stack,
            restore,
            in_order: younger.is_empty(),
        })
    }
}

#[derive(Clone)]
pub(crate) struct Binding {
    pub(crate) value: Option<Value>,
    pub(crate) scopes: ScopeStack,
}

impl Binding {
    /// A binding with no open scopes.
    #[cfg(test)]
    pub(crate) fn plain(value: Option<Value>) -> Binding {
        Binding {
            value,
            scopes: ScopeStack::default(),
        }
    }
}

impl Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("bound", &self.value.is_some())
            .field("open_scopes", &self.scopes.len())
            .finish()
    }
}

#[derive(Debug)]
enum NodeKind {
    /// One binding layered over `parent`.
    Overlay {
        parent: Option<Arc<Node>>,
        cell: CellId,
        binding: Binding,
    },
    /// Every binding visible at the time of flattening. Has no parent.
    Flattened(HashMap<CellId, Binding>),
}

#[derive(Debug)]
struct Node {
    kind: NodeKind,
    /// Overlay nodes between this one and the nearest flattened node (or the root).
    depth: usize,
}

impl Node {
    fn lookup(&self, cell: CellId) -> Option<&Binding> {
        let mut current = self;
        loop {
            match &current.kind {
                NodeKind::Overlay {
                    parent,
                    cell: bound,
                    binding,
                } => {
                    if *bound == cell {
                        return Some(binding);
                    }
                    match parent {
                        Some(p) => current = &**p,
                        None => return None,
                    }
                }
                NodeKind::Flattened(map) => return map.get(&cell),
            }
        }
    }

    /// Collects the visible bindings, newest wins.
    fn flatten(&self) -> HashMap<CellId, Binding> {
        let mut overlays = Vec::with_capacity(self.depth + 1);
        let mut map = HashMap::new();
        let mut current = Some(self);
        while let Some(node) = current {
            match &node.kind {
                NodeKind::Overlay {
                    parent,
                    cell,
                    binding,
                } => {
                    overlays.push((*cell, binding));
                    current = parent.as_deref();
                }
                NodeKind::Flattened(base) => {
                    map = base.clone();
                    current = None;
                }
            }
        }
        for (cell, binding) in overlays.into_iter().rev() {
            map.insert(cell, binding.clone());
        }
        map
    }
}

/// An immutable snapshot of every cell binding visible to a branch.
///
/// A `LogicalContext` is never mutated. Writing through a
/// [`ContextCell`](super::ContextCell) produces a new snapshot that shares all
/// unchanged bindings with its parent and installs it as the calling branch's
/// ambient root. Snapshots are cheap to clone (one `Arc`) and can be moved
/// and shared between threads freely.
///
/// Two contexts compare equal only when they are the same snapshot.
///
/// ```rust
/// use flowlocal::context::{ContextCell, LogicalContext};
///
/// static REQUEST: ContextCell<String> = ContextCell::new();
///
/// let before = LogicalContext::current();
/// REQUEST.set("r1".to_string());
/// let after = LogicalContext::current();
/// assert_ne!(before, after);
///
/// // the earlier snapshot still sees the earlier state
/// before.run(|| assert_eq!(REQUEST.value(), None));
/// ```
#[derive(Clone, Default)]
pub struct LogicalContext {
    head: Option<Arc<Node>>,
}

impl PartialEq for LogicalContext {
    fn eq(&self, other: &Self) -> bool {
        match (&self.head, &other.head) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for LogicalContext {}

impl Hash for LogicalContext {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match &self.head {
            Some(node) => Arc::as_ptr(node).hash(state),
            None => std::ptr::null::<Node>().hash(state),
        }
    }
}

impl Debug for LogicalContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogicalContext")
            .field("bindings", &self.len())
            .field("depth", &self.depth())
            .finish()
    }
}

thread_local! {
    static AMBIENT: Cell<LogicalContext> = const { Cell::new(LogicalContext { head: None }) };
}

impl LogicalContext {
    /// The context with no bindings.
    pub const fn empty() -> LogicalContext {
        LogicalContext { head: None }
    }

    /// Returns the calling branch's ambient root.
    ///
    /// On a thread that has not installed anything this is the empty context.
    #[inline]
    pub fn current() -> LogicalContext {
        AMBIENT
            .try_with(|slot| {
                let ctx = slot.take();
                let copy = ctx.clone();
                slot.set(ctx);
                copy
            })
            .unwrap_or_default()
    }

    /// Installs this snapshot as the calling thread's ambient root.
    #[inline]
    pub fn set_current(self) {
        _ = Self::swap_current(self);
    }

    /// Installs `context` and returns the root it replaced.
    #[inline]
    pub fn swap_current(context: LogicalContext) -> LogicalContext {
        AMBIENT
            .try_with(|slot| slot.replace(context))
            .unwrap_or_default()
    }

    /// Discards every binding on the calling thread.
    pub fn reset() {
        LogicalContext::empty().set_current();
    }

    /// Runs `f` with this snapshot as the ambient root.
    ///
    /// The previous root is reinstalled afterwards, also when `f` panics.
    /// Writes made inside `f` are not visible to the caller.
    pub fn run<R>(self, f: impl FnOnce() -> R) -> R {
        let _restore = Reinstall(Some(LogicalContext::swap_current(self)));
        f()
    }

    /// Number of cells bound to a value in this snapshot.
    pub fn len(&self) -> usize {
        match &self.head {
            None => 0,
            Some(node) => node
                .flatten()
                .values()
                .filter(|b| b.value.is_some())
                .count(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Overlay nodes that a lookup may have to walk.
    pub fn depth(&self) -> usize {
        self.head.as_ref().map_or(0, |n| n.depth)
    }

    pub(crate) fn binding(&self, cell: CellId) -> Option<&Binding> {
        self.head.as_ref().and_then(|n| n.lookup(cell))
    }

    pub(crate) fn lookup(&self, cell: CellId) -> Option<&Value> {
        self.binding(cell).and_then(|b| b.value.as_ref())
    }

    /// A child snapshot with `cell` rebound. `self` is left untouched.
    pub(crate) fn with_binding(&self, cell: CellId, binding: Binding) -> LogicalContext {
        let node = match &self.head {
            Some(parent) if parent.depth >= MAX_CHAIN_DEPTH => {
                let mut map = parent.flatten();
                map.insert(cell, binding);
                Node {
                    kind: NodeKind::Flattened(map),
                    depth: 0,
                }
            }
            parent => Node {
                depth: parent.as_ref().map_or(0, |p| p.depth) + 1,
                kind: NodeKind::Overlay {
                    parent: parent.clone(),
                    cell,
                    binding,
                },
            },
        };
        LogicalContext {
            head: Some(Arc::new(node)),
        }
    }
}

/// Reinstalls a root on drop.
pub(crate) struct Reinstall(pub(crate) Option<LogicalContext>);

impl Drop for Reinstall {
    fn drop(&mut self) {
        if let Some(ctx) = self.0.take() {
            ctx.set_current();
        }
    }
}
