// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tests for the context module.

use super::logical_context::{Binding, CellId, MAX_CHAIN_DEPTH};
use super::{ContextCell, LogicalContext};
use crate::error::ContextError;
use std::sync::Arc;

#[test]
fn test_set_then_get() {
    LogicalContext::reset();
    let cell: ContextCell<String> = ContextCell::new();
    assert_eq!(cell.get(), "");
    assert_eq!(cell.value(), None);

    cell.set("a".to_string());
    assert_eq!(cell.get(), "a");
    cell.set("b".to_string());
    assert_eq!(cell.get(), "b");
}

#[test]
fn test_cells_are_independent() {
    LogicalContext::reset();
    let first: ContextCell<u32> = ContextCell::new();
    let second: ContextCell<u32> = ContextCell::new();
    assert_ne!(first.id(), second.id());

    first.set(1);
    second.set(2);
    assert_eq!(first.get(), 1);
    assert_eq!(second.get(), 2);
}

#[test]
fn test_write_forks_snapshot() {
    LogicalContext::reset();
    let cell: ContextCell<u32> = ContextCell::new();
    cell.set(1);
    let before = LogicalContext::current();
    cell.set(2);
    let after = LogicalContext::current();

    assert_ne!(before, after);
    assert_eq!(cell.value_in(&before), Some(&1));
    assert_eq!(cell.value_in(&after), Some(&2));
}

#[test]
fn test_context_equality_is_identity() {
    LogicalContext::reset();
    let cell: ContextCell<u32> = ContextCell::new();
    cell.set(7);
    let a = LogicalContext::current();
    let b = a.clone();
    assert_eq!(a, b);

    // same bindings, different snapshot
    let c = LogicalContext::empty().with_binding(cell.id(), Binding::plain(Some(Arc::new(7u32))));
    assert_ne!(a, c);
    assert_eq!(LogicalContext::empty(), LogicalContext::default());
}

#[test]
#[allow(clippy::mutable_key_type)]
fn test_context_hash() {
    use std::collections::HashMap;

    LogicalContext::reset();
    let cell: ContextCell<u32> = ContextCell::new();
    cell.set(1);
    let one = LogicalContext::current();
    cell.set(2);
    let two = LogicalContext::current();

    let mut map = HashMap::new();
    map.insert(one.clone(), "one");
    map.insert(two.clone(), "two");
    map.insert(one.clone(), "one again");
    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&one), Some(&"one again"));
}

#[test]
fn test_clear_leaves_tombstone() {
    LogicalContext::reset();
    let cell: ContextCell<String> = ContextCell::new();
    cell.set("x".to_string());
    assert!(cell.is_set());
    cell.clear();
    assert!(!cell.is_set());
    assert_eq!(cell.get(), "");
    assert!(LogicalContext::current().is_empty());
}

#[test]
fn test_wrong_type_reads_as_unbound() {
    LogicalContext::reset();
    let cell: ContextCell<u32> = ContextCell::new();
    cell.set(3);
    // a binding written under this id with a different type is never returned
    let ctx = LogicalContext::current().with_binding(cell.id(), Binding::plain(Some(Arc::new("three"))));
    assert_eq!(cell.value_in(&ctx), None);
}

#[test]
fn test_long_chains_are_flattened() {
    LogicalContext::reset();
    let cells: Vec<ContextCell<usize>> = (0..MAX_CHAIN_DEPTH * 3).map(|_| ContextCell::new()).collect();
    let mut snapshots = Vec::new();
    for (i, cell) in cells.iter().enumerate() {
        cell.set(i);
        snapshots.push(LogicalContext::current());
        assert!(LogicalContext::current().depth() <= MAX_CHAIN_DEPTH);
    }

    for (i, cell) in cells.iter().enumerate() {
        assert_eq!(cell.get(), i);
    }
    assert_eq!(LogicalContext::current().len(), cells.len());

    // older snapshots are untouched by later flattening
    for (i, snapshot) in snapshots.iter().enumerate() {
        assert_eq!(snapshot.len(), i + 1);
        assert_eq!(cells[i].value_in(snapshot), Some(&i));
        if i + 1 < cells.len() {
            assert_eq!(cells[i + 1].value_in(snapshot), None);
        }
    }
}

#[test]
fn test_rewriting_one_cell_keeps_latest_after_flatten() {
    LogicalContext::reset();
    let cell: ContextCell<usize> = ContextCell::new();
    for i in 0..(MAX_CHAIN_DEPTH * 2 + 5) {
        cell.set(i);
        assert_eq!(cell.get(), i);
    }
    assert_eq!(LogicalContext::current().len(), 1);
}

#[test]
fn test_run_restores_root() {
    LogicalContext::reset();
    let cell: ContextCell<&'static str> = ContextCell::new();
    cell.set("outside");
    let snapshot = LogicalContext::current();

    let seen = snapshot.run(|| {
        cell.set("inside");
        cell.get()
    });
    assert_eq!(seen, "inside");
    assert_eq!(cell.get(), "outside");
}

#[test]
fn test_run_restores_root_on_panic() {
    LogicalContext::reset();
    let cell: ContextCell<&'static str> = ContextCell::new();
    cell.set("outside");

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        LogicalContext::current().run(|| {
            cell.set("inside");
            panic!("boom");
        })
    }));
    assert!(result.is_err());
    assert_eq!(cell.get(), "outside");
}

#[test]
fn test_sync_scope() {
    LogicalContext::reset();
    let cell: ContextCell<u32> = ContextCell::new();
    cell.set(1);
    let inner = cell.sync_scope(5, || cell.get());
    assert_eq!(inner, 5);
    assert_eq!(cell.get(), 1);
}

#[test]
fn test_scope_restores_previous() {
    LogicalContext::reset();
    let cell: ContextCell<String> = ContextCell::new();
    cell.set("original".to_string());
    {
        let guard = cell.create_scope("scoped".to_string());
        assert_eq!(guard.previous().map(String::as_str), Some("original"));
        assert_eq!(cell.get(), "scoped");
    }
    assert_eq!(cell.get(), "original");
}

#[test]
fn test_scope_over_unbound_cell_restores_unbound() {
    LogicalContext::reset();
    let cell: ContextCell<String> = ContextCell::new();
    {
        let _guard = cell.create_scope("scoped".to_string());
        assert!(cell.is_set());
    }
    assert!(!cell.is_set());
}

#[test]
fn test_nested_scopes_restore_lifo() {
    LogicalContext::reset();
    let cell: ContextCell<usize> = ContextCell::new();
    let other: ContextCell<usize> = ContextCell::new();
    for depth in 0..10 {
        cell.set(100);
        let mut guards = Vec::new();
        for level in 1..=depth {
            guards.push(cell.create_scope(level));
            other.set(level * 10);
            assert_eq!(cell.get(), level);
        }
        while let Some(guard) = guards.pop() {
            guard.close().unwrap();
            // the innermost still-open value, or the pre-scope value
            assert_eq!(cell.get(), if guards.is_empty() { 100 } else { guards.len() });
        }
        assert_eq!(cell.get(), 100);
    }
}

#[test]
fn test_scope_exit_keeps_other_cell_writes() {
    LogicalContext::reset();
    let scoped: ContextCell<&'static str> = ContextCell::new();
    let other: ContextCell<&'static str> = ContextCell::new();
    scoped.set("before");
    {
        let _guard = scoped.create_scope("during");
        other.set("written inside");
        scoped.set("overwritten inside");
    }
    assert_eq!(scoped.get(), "before");
    assert_eq!(other.get(), "written inside");
}

#[test]
fn test_scope_restores_on_panic() {
    LogicalContext::reset();
    let cell: ContextCell<u32> = ContextCell::new();
    cell.set(1);
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _guard = cell.create_scope(2);
        panic!("unwinding through the scope");
    }));
    assert!(result.is_err());
    assert_eq!(cell.get(), 1);
}

#[test]
fn test_scope_restores_on_early_return() {
    fn fails(cell: &ContextCell<u32>) -> Result<(), &'static str> {
        let _guard = cell.create_scope(9);
        Err("early")?;
        Ok(())
    }
    LogicalContext::reset();
    let cell: ContextCell<u32> = ContextCell::new();
    cell.set(1);
    assert!(fails(&cell).is_err());
    assert_eq!(cell.get(), 1);
}

#[test]
fn test_out_of_order_close_is_reported() {
    LogicalContext::reset();
    let cell: ContextCell<u32> = ContextCell::new();
    cell.set(0);
    let outer = cell.create_scope(1);
    let inner = cell.create_scope(2);
    let outer_id = outer.id();

    match outer.close() {
        Err(ContextError::OutOfOrderRelease { cell: c, scope }) => {
            assert_eq!(c, cell.id());
            assert_eq!(scope, outer_id);
        }
        other => panic!("expected out-of-order error, got {other:?}"),
    }
    // restoration still happened exactly once
    assert_eq!(cell.get(), 0);
    assert_eq!(cell.innermost_scope(), Some(inner.id()));

    // the younger guard is now the innermost and puts back the pre-scope value
    inner.close().unwrap();
    assert_eq!(cell.get(), 0);
    assert_eq!(cell.innermost_scope(), None);
}

#[test]
fn test_out_of_order_close_is_reported_after_plain_set() {
    LogicalContext::reset();
    let cell: ContextCell<u32> = ContextCell::new();
    cell.set(0);
    let outer = cell.create_scope(1);
    let inner = cell.create_scope(2);
    cell.set(3);
    assert_eq!(cell.innermost_scope(), Some(inner.id()));

    assert!(matches!(
        outer.close(),
        Err(ContextError::OutOfOrderRelease { .. })
    ));
    assert_eq!(cell.get(), 0);
    inner.close().unwrap();
    assert_eq!(cell.get(), 0);
}

#[test]
fn test_clear_inside_scope_keeps_scope_open() {
    LogicalContext::reset();
    let cell: ContextCell<u32> = ContextCell::new();
    cell.set(5);
    let outer = cell.create_scope(6);
    let inner = cell.create_scope(7);
    cell.clear();
    assert!(!cell.is_set());

    inner.close().unwrap();
    assert_eq!(cell.get(), 6);
    outer.close().unwrap();
    assert_eq!(cell.get(), 5);
}

#[test]
fn test_out_of_order_middle_scope_hands_previous_on() {
    LogicalContext::reset();
    let cell: ContextCell<u32> = ContextCell::new();
    cell.set(0);
    let first = cell.create_scope(1);
    let second = cell.create_scope(2);
    let third = cell.create_scope(3);

    assert!(second.close().is_err());
    assert_eq!(cell.get(), 1);
    third.close().unwrap();
    assert_eq!(cell.get(), 1);
    first.close().unwrap();
    assert_eq!(cell.get(), 0);
}

#[test]
fn test_scope_released_in_other_root_restores_own_previous() {
    LogicalContext::reset();
    let cell: ContextCell<u32> = ContextCell::new();
    cell.set(1);
    let guard = cell.create_scope(2);
    // a root that never saw the scope
    LogicalContext::empty().set_current();
    guard.close().unwrap();
    assert_eq!(cell.get(), 1);
}

#[test]
fn test_scopes_on_different_cells_do_not_conflict() {
    LogicalContext::reset();
    let a: ContextCell<u32> = ContextCell::new();
    let b: ContextCell<u32> = ContextCell::new();
    let ga = a.create_scope(1);
    let gb = b.create_scope(2);
    ga.close().unwrap();
    gb.close().unwrap();
    assert!(!a.is_set());
    assert!(!b.is_set());
}

#[test]
fn test_cell_ids_are_unique() {
    let ids: Vec<CellId> = (0..16).map(|_| ContextCell::<u8>::new().id()).collect();
    let mut sorted = ids.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted.len(), ids.len());
}

#[test]
fn test_out_of_order_drop_warns() {
    use crate::InMemoryLogger;

    let _guard = crate::TEST_LOGGER_GUARD.lock().unwrap_or_else(|e| e.into_inner());
    LogicalContext::reset();
    let logger = Arc::new(InMemoryLogger::new());
    let original = crate::global_loggers();
    crate::set_global_loggers(vec![logger.clone()]);

    let cell: ContextCell<u32> = ContextCell::new();
    let outer = cell.create_scope(1);
    let inner = cell.create_scope(2);
    cell.set(3);
    drop(outer);
    drop(inner);
    assert!(!cell.is_set());

    crate::set_global_loggers(original);
    let logs = logger.drain_lines();
    assert_eq!(logs.len(), 1, "{logs:?}");
    assert!(logs[0].contains("WARN: "));
    assert!(logs[0].contains("restored anyway"));
}

#[test]
fn test_in_order_drop_is_silent() {
    use crate::InMemoryLogger;

    let _guard = crate::TEST_LOGGER_GUARD.lock().unwrap_or_else(|e| e.into_inner());
    LogicalContext::reset();
    let logger = Arc::new(InMemoryLogger::new());
    let original = crate::global_loggers();
    crate::set_global_loggers(vec![logger.clone()]);

    let cell: ContextCell<u32> = ContextCell::new();
    {
        let _outer = cell.create_scope(1);
        let _inner = cell.create_scope(2);
    }

    crate::set_global_loggers(original);
    assert!(logger.is_empty());
    assert!(!cell.is_set());
}
