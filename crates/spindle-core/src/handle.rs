//! Exclusive ownership of a parked computation.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll, Waker};

/// A suspended unit of work. The state machine is compiled by the language
/// from an `async` body; the crate only ever polls it on the current thread.
pub(crate) type Computation = Pin<Box<dyn Future<Output = ()>>>;

/// The single live owner of a computation.
///
/// Move-only by construction (no `Clone`); dropping the handle destroys the
/// computation at whatever suspension position it is parked at, and dropping
/// a released handle is a no-op. A computation that has reached its terminal
/// suspension is never polled again.
pub(crate) struct OwnerHandle {
    computation: Option<Computation>,
    parked_at_end: bool,
}

impl OwnerHandle {
    /// Takes ownership of a freshly created computation.
    pub(crate) fn acquire(computation: Computation) -> Self {
        Self {
            computation: Some(computation),
            parked_at_end: false,
        }
    }

    /// Transfers the computation out, leaving the handle empty. The caller
    /// becomes responsible for destroying it.
    pub(crate) fn release(&mut self) -> Option<Computation> {
        self.computation.take()
    }

    /// Has the computation parked at its terminal suspension?
    pub(crate) fn is_parked_at_end(&self) -> bool {
        self.parked_at_end
    }

    /// Resumes the computation until its next suspension. Returns
    /// `Poll::Ready` once it has parked at its terminal suspension; a no-op
    /// for released or already-terminal handles.
    pub(crate) fn resume(&mut self) -> Poll<()> {
        if self.parked_at_end {
            return Poll::Ready(());
        }
        let Some(computation) = self.computation.as_mut() else {
            return Poll::Ready(());
        };
        let mut cx = Context::from_waker(Waker::noop());
        match computation.as_mut().poll(&mut cx) {
            Poll::Ready(()) => {
                self.parked_at_end = true;
                Poll::Ready(())
            }
            Poll::Pending => Poll::Pending,
        }
    }

    /// Marks the computation unusable after a caught panic so it cannot be
    /// resumed again.
    pub(crate) fn poison(&mut self) {
        self.parked_at_end = true;
    }
}
