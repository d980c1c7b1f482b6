//! Eager single-result computations.
//!
//! A `Task<T>` starts its body the moment it is constructed and runs it,
//! uninterrupted, to its terminal suspension — unless the body itself elects
//! to pause (a timed pause, or awaiting a nested task), in which case the
//! pause resolves synchronously before control returns. After construction
//! the task is parked and its result can be read or consumed.

use std::cell::Ref;
use std::future::Future;
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use crate::error::{Fault, SpindleError};
use crate::handle::{Computation, OwnerHandle};
use crate::storage::ResultStorage;
use crate::suspension::{Pause, Suspend, SuspensionPoint, run};

/// A single-shot computation producing one `T`.
///
/// State machine: `Created -> Running (eager, internal) ->
/// {CompletedValue | CompletedError}`. Only the parked states are externally
/// observable. Move-only; Rust move semantics make every operation on a
/// moved-from task a compile error, and the owner handle guarantees
/// exactly-once destruction.
pub struct Task<T> {
    handle: OwnerHandle,
    storage: ResultStorage<T>,
}

impl<T: 'static> Task<T> {
    /// Invokes `body` and immediately runs it. A body with no suspension
    /// points completes before `new` returns.
    ///
    /// The body reports its outcome as a `Result`; an `Err` is stored and
    /// re-surfaced at every observation point. A panicking body is caught
    /// here and stored as a fault the same way.
    pub fn new<F, Fut>(body: F) -> Self
    where
        F: FnOnce(TaskScope) -> Fut,
        Fut: Future<Output = Result<T, Fault>> + 'static,
    {
        let storage = ResultStorage::new();
        let writer = storage.writer();
        let fut = body(TaskScope::new());
        let computation: Computation = Box::pin(async move {
            match fut.await {
                Ok(value) => writer.set_value(value),
                Err(fault) => writer.set_error(fault),
            }
        });
        let mut task = Self {
            handle: OwnerHandle::acquire(computation),
            storage,
        };
        task.run();
        tracing::trace!(settled = task.is_settled(), "task constructed");
        task
    }

    /// Resumes the computation once, capturing a panicking body into the
    /// result slot and poisoning the handle so it is never resumed again.
    fn run(&mut self) {
        if self.handle.is_parked_at_end() {
            return;
        }
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| self.handle.resume())) {
            let fault = Fault::from_panic(payload);
            tracing::debug!(%fault, "captured panic from task body");
            self.handle.poison();
            self.storage.set_error(fault);
        }
    }

    /// Has the body produced its terminal outcome?
    pub fn is_settled(&self) -> bool {
        self.storage.is_settled()
    }

    /// Read-only access to the terminal result. Repeated reads observe the
    /// same value; a stored fault is re-raised on every read.
    pub fn get_result(&self) -> Result<Ref<'_, T>, SpindleError> {
        self.storage.get()
    }

    /// Consumes the terminal result, moving the value out. A second call
    /// observes `ResultTaken`, never a stale copy.
    pub fn take_result(&mut self) -> Result<T, SpindleError> {
        run(Terminal { task: self })
    }
}

/// Capability handle passed to a task body.
///
/// The scope is the only way to construct the task family's suspension
/// points. Generator bodies receive a `Yielder` instead, so the pause/join
/// points stay task-only by construction. Not `Clone`, not `Send`.
pub struct TaskScope {
    _not_send: PhantomData<*const ()>,
}

impl TaskScope {
    pub(crate) fn new() -> Self {
        Self {
            _not_send: PhantomData,
        }
    }

    /// Thread-blocking timed pause. Ready immediately for a zero duration.
    pub fn pause(&self, duration: Duration) -> Suspend<Pause> {
        Suspend::new(Pause::new(duration))
    }

    /// Awaits another task from inside this body, driving it to its terminal
    /// suspension if needed. Yields the nested task's value (or `()` for a
    /// unit task); a fault in the nested task surfaces as
    /// `SpindleError::Propagated` and can be forwarded with `?`.
    pub fn join<U: 'static>(&self, task: Task<U>) -> Suspend<Join<U>> {
        Suspend::new(Join { task: Some(task) })
    }
}

/// Own-terminal-result read: the suspension a completed task is parked at.
///
/// ready: the result slot is settled. suspend: resume the computation toward
/// its terminal suspension. resume: move the outcome out; once the value has
/// left, the computation frame is released early.
struct Terminal<'a, T> {
    task: &'a mut Task<T>,
}

impl<T: 'static> SuspensionPoint for Terminal<'_, T> {
    type Output = Result<T, SpindleError>;

    fn ready(&self) -> bool {
        self.task.is_settled()
    }

    fn suspend(&mut self) {
        self.task.run();
    }

    fn resume(&mut self) -> Self::Output {
        let result = self.task.storage.take();
        if result.is_ok() {
            drop(self.task.handle.release());
        }
        result
    }
}

/// Cross-task await. Composes by nesting the protocol: resuming a join is a
/// terminal read of the awaited task.
pub struct Join<T> {
    task: Option<Task<T>>,
}

impl<T: 'static> SuspensionPoint for Join<T> {
    type Output = Result<T, SpindleError>;

    fn ready(&self) -> bool {
        self.task.as_ref().is_some_and(Task::is_settled)
    }

    fn suspend(&mut self) {
        if let Some(task) = self.task.as_mut() {
            task.run();
        }
    }

    fn resume(&mut self) -> Self::Output {
        self.task
            .take()
            .expect("join point resumed twice")
            .take_result()
    }
}
