// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ambient values that flow with the logical flow of execution.
//!
//! This module provides the context propagation primitive the rest of
//! flowlocal is built on. It consists of:
//!
//! - [`LogicalContext`]: an immutable, structurally shared snapshot of cell bindings
//! - [`ContextCell`]: a typed key into the ambient snapshot, with `get`/`set`/`create_scope`
//! - [`ScopeGuard`]: restores a cell's previous value when a lexical scope ends
//! - [`ApplyContext`]: a [`Future`](std::future::Future) wrapper that carries a
//!   root of its own across suspension points
//!
//! # The ambient root
//!
//! Every branch of execution (an OS thread, or a future wrapped in
//! [`ApplyContext`]) has an *ambient root*: the snapshot that cell reads
//! consult. A write never mutates a snapshot. It builds a child snapshot and
//! replaces the caller's root with it, so any other branch holding the older
//! snapshot is unaffected.
//!
//! ```rust
//! use flowlocal::context::{ContextCell, LogicalContext};
//!
//! static TENANT: ContextCell<String> = ContextCell::new();
//!
//! TENANT.set("acme".to_string());
//! let snapshot = LogicalContext::current();
//!
//! TENANT.set("globex".to_string());
//! snapshot.run(|| assert_eq!(TENANT.get(), "acme"));
//! assert_eq!(TENANT.get(), "globex");
//! ```
//!
//! # Branches
//!
//! A new branch starts from the spawner's root *at the instant of spawn*. The
//! helpers in [`crate::branch`] do this for tokio tasks, blocking tasks and
//! native threads. For plain futures, [`crate::branch::fork`] captures the
//! current root and returns an [`ApplyContext`].
//!
//! ```rust
//! use flowlocal::branch;
//! use flowlocal::context::ContextCell;
//!
//! static STAGE: ContextCell<&'static str> = ContextCell::new();
//!
//! # async fn example() {
//! STAGE.set("parent");
//! let child = branch::fork(async {
//!     assert_eq!(STAGE.get(), "parent");
//!     STAGE.set("child");
//! });
//! child.await;
//! assert_eq!(STAGE.get(), "parent");
//! # }
//! ```

mod apply_context;
mod cell;
mod logical_context;
mod scope;

#[cfg(test)]
mod tests;

pub use apply_context::ApplyContext;
pub use cell::ContextCell;
pub use logical_context::{CellId, LogicalContext, ScopeId};
pub use scope::ScopeGuard;

pub(crate) use logical_context::Reinstall;
