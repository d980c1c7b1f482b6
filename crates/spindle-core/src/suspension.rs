//! Three-phase suspension protocol: ready / suspend / resume.
//!
//! Every pause in the model goes through the same contract: check whether the
//! pause can be skipped, perform the pause action, then produce the value the
//! resumed computation observes. Reading a task's own terminal result,
//! awaiting a nested task, and the timed pause are each an implementation of
//! this one trait; composition nests the protocol instead of special-casing.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

/// A single suspension of a computation.
///
/// Instances are transient: built at the pause, consumed by the resume
/// machinery, never persisted.
pub trait SuspensionPoint {
    /// Value observed by the resumed computation.
    type Output;

    /// Phase 1: can the pause be skipped entirely?
    fn ready(&self) -> bool;

    /// Phase 2: the pause action. Called only when not ready; must leave the
    /// point ready. The model is synchronous, so "suspending" here drives
    /// whatever the point waits on to completion before returning.
    fn suspend(&mut self);

    /// Phase 3: produce the resume value.
    fn resume(&mut self) -> Self::Output;
}

/// Runs a suspension point through the protocol from outside a body.
pub(crate) fn run<P: SuspensionPoint>(mut point: P) -> P::Output {
    if !point.ready() {
        point.suspend();
    }
    point.resume()
}

/// Awaitable wrapper over a suspension point, for use inside a body.
///
/// Polling resolves the point synchronously: the future is always ready after
/// the protocol has run, so the enclosing computation never parks on it.
pub struct Suspend<P: SuspensionPoint> {
    point: P,
}

impl<P: SuspensionPoint> Suspend<P> {
    /// Wraps a suspension point for awaiting. Custom points resolve
    /// synchronously like the built-in ones.
    pub fn new(point: P) -> Self {
        Self { point }
    }
}

impl<P: SuspensionPoint + Unpin> Future for Suspend<P> {
    type Output = P::Output;

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Self::Output> {
        let point = &mut self.get_mut().point;
        if !point.ready() {
            point.suspend();
        }
        Poll::Ready(point.resume())
    }
}

/// Timed pause: blocks the current thread for the remaining duration.
///
/// This is a thread-blocking stand-in, not a scheduler timer; no other work
/// proceeds while it sleeps. Only task bodies can construct one (through
/// `TaskScope::pause`), so the generator family rejects it at compile time.
pub struct Pause {
    remaining: Duration,
}

impl Pause {
    pub(crate) fn new(duration: Duration) -> Self {
        Self {
            remaining: duration,
        }
    }
}

impl SuspensionPoint for Pause {
    type Output = ();

    fn ready(&self) -> bool {
        self.remaining.is_zero()
    }

    fn suspend(&mut self) {
        std::thread::sleep(std::mem::take(&mut self.remaining));
    }

    fn resume(&mut self) -> Self::Output {}
}
