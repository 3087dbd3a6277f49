// SPDX-License-Identifier: MIT OR Apache-2.0

//! Spawning branches that start from the spawner's context.
//!
//! Each helper captures [`LogicalContext::current`] at the moment it is
//! called and installs that exact snapshot as the new branch's ambient root.
//! From then on the two roots are independent: writes in the child are never
//! seen by the parent, and writes the parent makes after the spawn are never
//! seen by the child.
//!
//! ```rust
//! use flowlocal::branch;
//! use flowlocal::context::ContextCell;
//!
//! static JOB: ContextCell<u32> = ContextCell::new();
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! JOB.set(1);
//! let child = branch::spawn(async {
//!     let seen = JOB.get();
//!     JOB.set(2);
//!     seen
//! });
//! JOB.set(3);
//! assert_eq!(child.await.unwrap(), 1);
//! assert_eq!(JOB.get(), 3);
//! # }
//! ```
//!
//! Futures handed to `tokio::spawn` directly, and threads started with
//! `std::thread::spawn` directly, begin with whatever root their worker
//! thread happens to hold. Go through this module instead.

use crate::context::{ApplyContext, LogicalContext, Reinstall};
use std::future::Future;
use std::thread;

/// Captures the current root for `future`.
///
/// Awaiting the result runs `future` as its own branch: it sees the values
/// ambient now, and its writes stay inside it. Joining several forks gives
/// sibling isolation without a runtime.
pub fn fork<F: Future>(future: F) -> ApplyContext<F> {
    ApplyContext::new(LogicalContext::current(), future)
}

/// Spawns `future` on the tokio runtime as a new branch.
///
/// # Panics
///
/// Panics when called outside a tokio runtime, like `tokio::spawn`.
pub fn spawn<F>(future: F) -> tokio::task::JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::spawn(fork(future))
}

/// Runs `f` on tokio's blocking pool as a new branch.
pub fn spawn_blocking<F, R>(f: F) -> tokio::task::JoinHandle<R>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(bind(f))
}

/// Starts a native thread as a new branch.
pub fn spawn_thread<F, T>(f: F) -> thread::JoinHandle<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let context = LogicalContext::current();
    thread::spawn(move || {
        context.set_current();
        f()
    })
}

/// Starts a named native thread as a new branch.
pub fn spawn_named_thread<F, T>(name: impl Into<String>, f: F) -> std::io::Result<thread::JoinHandle<T>>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let context = LogicalContext::current();
    thread::Builder::new().name(name.into()).spawn(move || {
        context.set_current();
        f()
    })
}

/// Captures the current root now and returns a closure that runs `f` under it.
///
/// Useful for handing work to thread pools this crate does not know about.
/// The calling thread's own root is reinstalled once `f` returns.
pub fn bind<F, R>(f: F) -> impl FnOnce() -> R + Send + 'static
where
    F: FnOnce() -> R + Send + 'static,
    R: 'static,
{
    let context = LogicalContext::current();
    move || {
        let _restore = Reinstall(Some(LogicalContext::swap_current(context)));
        f()
    }
}

/// Extension methods for running futures as branches.
pub trait FlowExt: Future + Sized {
    /// Runs this future under `context`.
    fn in_context(self, context: LogicalContext) -> ApplyContext<Self> {
        ApplyContext::new(context, self)
    }

    /// Runs this future under a snapshot of the current root.
    fn forked(self) -> ApplyContext<Self> {
        fork(self)
    }
}

impl<F: Future> FlowExt for F {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextCell;

    #[test]
    fn thread_starts_from_spawn_snapshot() {
        LogicalContext::reset();
        let cell: &'static ContextCell<&'static str> = Box::leak(Box::new(ContextCell::new()));
        cell.set("P1");
        let handle = spawn_thread(move || {
            let initial = cell.get();
            cell.set("T1");
            (initial, cell.get())
        });
        let (initial, after) = handle.join().unwrap();
        assert_eq!(initial, "P1");
        assert_eq!(after, "T1");
        assert_eq!(cell.get(), "P1");
    }

    #[test]
    fn named_thread_carries_name_and_context() {
        LogicalContext::reset();
        let cell: &'static ContextCell<u32> = Box::leak(Box::new(ContextCell::new()));
        cell.set(11);
        let handle = spawn_named_thread("flowlocal-test", move || {
            (thread::current().name().map(str::to_string), cell.get())
        })
        .unwrap();
        let (name, value) = handle.join().unwrap();
        assert_eq!(name.as_deref(), Some("flowlocal-test"));
        assert_eq!(value, 11);
    }

    #[test]
    fn bind_captures_at_bind_time() {
        LogicalContext::reset();
        let cell: &'static ContextCell<u32> = Box::leak(Box::new(ContextCell::new()));
        cell.set(1);
        let bound = bind(move || {
            let seen = cell.get();
            cell.set(99);
            seen
        });
        cell.set(2);
        // runs on this thread, but under the captured snapshot
        assert_eq!(bound(), 1);
        assert_eq!(cell.get(), 2);
    }

    #[test_executors::async_test]
    async fn fork_isolates_child_writes() {
        let cell: &'static ContextCell<u32> = Box::leak(Box::new(ContextCell::new()));
        cell.set(1);
        let seen = fork(async move {
            let seen = cell.get();
            cell.set(5);
            seen
        })
        .await;
        assert_eq!(seen, 1);
        assert_eq!(cell.get(), 1);
    }

    #[test_executors::async_test]
    async fn in_context_uses_given_snapshot() {
        let cell: &'static ContextCell<u32> = Box::leak(Box::new(ContextCell::new()));
        cell.set(7);
        let snapshot = LogicalContext::current();
        cell.set(8);
        let seen = async move { cell.get() }.in_context(snapshot).await;
        assert_eq!(seen, 7);
        assert_eq!(cell.get(), 8);
    }
}
