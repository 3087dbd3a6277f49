// SPDX-License-Identifier: MIT OR Apache-2.0

//! Context preservation across suspension points.

use std::future::Future;
use std::mem::ManuallyDrop;
use std::pin::Pin;
use std::task::Poll;

use super::logical_context::LogicalContext;

/// A [`Future`] that carries its own ambient root.
///
/// Executors poll futures on whatever worker thread is free, and a thread's
/// ambient root belongs to whoever ran there last. `ApplyContext` gives the
/// wrapped future a root of its own:
///
/// 1. swap the future's root in as the thread's ambient root
/// 2. poll the inner future
/// 3. keep whatever root the poll left behind (writes made before the
///    suspension must still be visible after it)
/// 4. swap the thread's previous root back
///
/// Step 4 also runs when the inner poll panics. Dropping an unfinished
/// `ApplyContext` (a cancelled task) drops the inner future under the
/// wrapper's own root, so scope guards held by the future restore into that
/// root and never into the dropping thread's.
///
/// ```rust
/// use flowlocal::context::{ApplyContext, ContextCell, LogicalContext};
///
/// static STEP: ContextCell<u32> = ContextCell::new();
///
/// # async fn example() {
/// let task = ApplyContext::new(LogicalContext::current(), async {
///     STEP.set(1);
///     async {}.await;
///     STEP.get()
/// });
/// assert_eq!(task.await, 1);
/// // the caller never saw the write
/// assert_eq!(STEP.get(), 0);
/// # }
/// ```
#[must_use = "futures do nothing unless polled"]
pub struct ApplyContext<F> {
    context: LogicalContext,
    future: ManuallyDrop<F>,
}

impl<F> ApplyContext<F> {
    /// Wraps `future` so that it runs under `context`.
    pub fn new(context: LogicalContext, future: F) -> Self {
        Self {
            context,
            future: ManuallyDrop::new(future),
        }
    }

    /// The root the future will see on its next poll.
    pub fn context(&self) -> &LogicalContext {
        &self.context
    }
}

struct SwapBack<'a> {
    prior: Option<LogicalContext>,
    slot: &'a mut LogicalContext,
}

impl Drop for SwapBack<'_> {
    fn drop(&mut self) {
        if let Some(prior) = self.prior.take() {
            *self.slot = LogicalContext::swap_current(prior);
        }
    }
}

impl<F> Future for ApplyContext<F>
where
    F: Future,
{
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut std::task::Context<'_>) -> Poll<Self::Output> {
        //safety: `future` is structurally pinned and never moved out; `context` is not pinned
        let (context, fut) = unsafe {
            let d = self.get_unchecked_mut();
            (&mut d.context, Pin::new_unchecked(&mut *d.future))
        };
        let prior = LogicalContext::swap_current(context.clone());
        let _swap_back = SwapBack {
            prior: Some(prior),
            slot: context,
        };
        fut.poll(cx)
    }
}

impl<F> Drop for ApplyContext<F> {
    fn drop(&mut self) {
        let prior = LogicalContext::swap_current(self.context.clone());
        let _swap_back = SwapBack {
            prior: Some(prior),
            slot: &mut self.context,
        };
        //safety: dropped exactly once, in place, and never touched again
        unsafe { ManuallyDrop::drop(&mut self.future) };
    }
}
