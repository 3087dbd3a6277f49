//SPDX-License-Identifier: MIT OR Apache-2.0
/*!
# flowlocal

flowlocal provides ambient values that follow the *logical* flow of execution:
into spawned tasks, into new threads, and across `.await` points, while each
branch stays isolated from its siblings.

# The problem

A thread-local is the wrong tool for request-scoped data in async code. A task
may suspend on one worker thread and resume on another, and one worker thread
runs many unrelated tasks. Passing a context object through every call instead
works, but it clutters every signature between where the value is set and where
it is read (usually a log line).

# The model

* A [`LogicalContext`](context::LogicalContext) is an immutable snapshot of bindings.
* A [`ContextCell`](context::ContextCell) is a typed key into the snapshot that is
  *ambient* for the caller. Writing a cell builds a new snapshot that shares
  everything else with the old one.
* Spawning a branch through [`branch`] hands the child the parent's snapshot as
  of the spawn. After that, neither sees the other's writes.
* A [`ScopeGuard`](context::ScopeGuard) puts a cell's previous value back when
  a lexical scope ends, however it ends.

```rust
use flowlocal::context::ContextCell;

static REQUEST: ContextCell<String> = ContextCell::new();

# #[tokio::main(flavor = "current_thread")]
# async fn main() {
let _scope = REQUEST.create_scope("r-42".to_string());
let child = flowlocal::branch::spawn(async {
    tokio::task::yield_now().await;
    REQUEST.get()
});
assert_eq!(child.await.unwrap(), "r-42");
# }
```

# Correlated logging

[`correlation`] builds on this to tag log lines from fanned-out work with
one id per logical operation:

```text
[2024-05-01 12:00:00.123] [5f0c9a0e6a2b4c1e9d7f3b8a2c4e6d10] Starting request: Get User Profile
```

Lines go to every logger registered with [`global_logger`]. By default that
is a [`ConsoleLogger`] on stdout; tests swap in an [`InMemoryLogger`].
*/

pub mod branch;
pub mod config;
pub mod console_logger;
pub mod context;
pub mod correlation;
pub mod demo;
pub mod dispatch;
pub mod error;
pub mod global_logger;
mod inmemory_logger;
mod level;
mod log_record;
mod logger;
mod macros;

pub use console_logger::ConsoleLogger;
pub use error::{ContextError, Result};
pub use global_logger::{add_global_logger, global_loggers, set_global_loggers};
pub use inmemory_logger::InMemoryLogger;
pub use level::Level;
pub use log_record::{LogRecord, TIMESTAMP_FORMAT, format_timestamp, timestamp_now};
pub use logger::Logger;

/// Serializes tests that swap the global loggers.
#[cfg(test)]
pub(crate) static TEST_LOGGER_GUARD: std::sync::Mutex<()> = std::sync::Mutex::new(());
