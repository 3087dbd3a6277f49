// SPDX-License-Identifier: MIT OR Apache-2.0

/**
Writes a formatted line tagged with the process-wide correlation id.

Takes the same arguments as [`format!`]. The message is only built once.

```rust
let _scope = flowlocal::correlation::new_scope_with("job-3").unwrap();
let rows = 12;
flowlocal::correlated!("imported {rows} rows");
flowlocal::correlated!("took {}ms", 40);
```
*/
#[macro_export]
macro_rules! correlated {
    ($($arg:tt)+) => {
        $crate::correlation::log(&::std::format!($($arg)+))
    };
}

#[cfg(test)]
mod tests {
    use crate::InMemoryLogger;
    use crate::context::LogicalContext;
    use std::sync::Arc;

    #[test]
    fn correlated_formats_and_tags() {
        let _guard = crate::TEST_LOGGER_GUARD.lock().unwrap_or_else(|e| e.into_inner());
        LogicalContext::reset();
        let logger = Arc::new(InMemoryLogger::new());
        let original = crate::global_loggers();
        crate::set_global_loggers(vec![logger.clone()]);

        {
            let _scope = crate::correlation::new_scope_with("macro-id").unwrap();
            let count = 3;
            crate::correlated!("{count} items in {}", "cart");
        }

        crate::set_global_loggers(original);
        let logs = logger.drain_logs();
        assert!(logs.ends_with("] [macro-id] 3 items in cart"), "{logs}");
    }
}
