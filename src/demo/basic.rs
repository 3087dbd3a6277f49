// SPDX-License-Identifier: MIT OR Apache-2.0

//! Values flowing into spawned tasks, across awaits, and through scopes.

use super::say;
use crate::branch;
use crate::context::ContextCell;
use std::time::Duration;

pub(crate) static VALUE: ContextCell<String> = ContextCell::new();

pub async fn run() -> anyhow::Result<()> {
    say("\n=== Basic Context Example ===\n");

    VALUE.set("Main Thread Value".to_string());
    say(format!("Initial Value: {}", VALUE.get()));

    branch::spawn(async {
        say(format!("Value in spawned task: {}", VALUE.get()));
        VALUE.set("Changed in spawned task".to_string());
        say(format!("Changed value: {}", VALUE.get()));

        tokio::time::sleep(Duration::from_millis(100)).await;
        say(format!("Value after await: {}", VALUE.get()));
    })
    .await?;

    say(format!("Value back in main task: {}\n", VALUE.get()));

    say("=== Scoped Usage Example ===\n");
    VALUE.set("Original Value".to_string());
    say(format!("Starting value: {}", VALUE.get()));
    {
        let _scope = VALUE.create_scope("Scoped Value".to_string());
        say(format!("Inside scope: {}", VALUE.get()));
        branch::spawn(async {
            say(format!("Inside scope and spawned task: {}", VALUE.get()));
        })
        .await?;
    }
    say(format!("After scope ended: {}\n", VALUE.get()));
    Ok(())
}
