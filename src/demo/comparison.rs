// SPDX-License-Identifier: MIT OR Apache-2.0

//! `thread_local!` next to a [`ContextCell`], side by side.

use super::say;
use crate::branch;
use crate::context::ContextCell;
use std::cell::RefCell;
use std::time::Duration;

thread_local! {
    static THREAD_VALUE: RefCell<String> = RefCell::new("Default thread_local Value".to_string());
}

pub(crate) static FLOW_VALUE: ContextCell<String> = ContextCell::new();

fn thread_value() -> String {
    THREAD_VALUE.with(|v| v.borrow().clone())
}

fn set_both(value: &str) {
    THREAD_VALUE.with(|v| *v.borrow_mut() = value.to_string());
    FLOW_VALUE.set(value.to_string());
}

fn report(heading: &str) {
    say(heading);
    say(format!("thread_local: {}", thread_value()));
    say(format!("ContextCell: {}\n", FLOW_VALUE.get()));
}

pub async fn run() -> anyhow::Result<()> {
    say("\n=== thread_local! vs ContextCell Comparison ===\n");

    set_both("Main Thread Value");
    report("Initial Values:");

    say("=== Spawned Task Comparison ===");
    branch::spawn(async {
        // the worker thread has its own thread_local, the cell flowed in
        report("\nInside spawned task:");
        set_both("Modified in Task");
        report("After modification in spawned task:");

        // may resume on a different worker
        tokio::time::sleep(Duration::from_millis(100)).await;
        report("After await in spawned task:");
    })
    .await?;
    report("Back in main task:");

    say("=== New Thread Comparison ===");
    let thread = branch::spawn_named_thread("flowlocal-demo-thread", || {
        report("\nInside new thread:");
    })?;
    tokio::task::spawn_blocking(move || thread.join())
        .await?
        .map_err(|_| anyhow::anyhow!("demo thread panicked"))?;

    say("\nKey Differences:");
    say("1. thread_local! values are specific to each OS thread");
    say("2. ContextCell values flow with the logical flow of execution");
    say("3. a new thread starts from the thread_local! initializer");
    say("4. ContextCell values survive awaits, whichever worker resumes the task\n");
    Ok(())
}
