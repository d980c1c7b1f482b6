//! Pull-driven sequence computations.
//!
//! A `Generator<T>` is created parked and not started; every `advance()`
//! resumes the body to its next yield point or to completion. The only legal
//! suspension inside a generator body is the yield point built by its
//! `Yielder` — the task family's pause/join points cannot be constructed
//! without a `TaskScope`, so the family restriction holds at compile time.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use crate::error::{Fault, SpindleError};
use crate::handle::{Computation, OwnerHandle};
use crate::storage::ResultStorage;

/// A computation producing a sequence of `T`, one value per resume.
///
/// State machine: `Created(parked, not started) -> Yielded… ->
/// Completed(terminal)`. Once completed, `advance()` keeps returning false
/// and only destruction remains.
pub struct Generator<T> {
    handle: OwnerHandle,
    slot: Rc<RefCell<Option<T>>>,
    /// Terminal outcome of the body: completion marker or fault.
    outcome: ResultStorage<()>,
    current: Option<T>,
    fault_reported: bool,
}

impl<T: 'static> Generator<T> {
    /// Invokes `body` but runs none of it; the generator parks in its
    /// not-yet-started state until the first `advance()`.
    pub fn new<F, Fut>(body: F) -> Self
    where
        F: FnOnce(Yielder<T>) -> Fut,
        Fut: Future<Output = Result<(), Fault>> + 'static,
    {
        let slot = Rc::new(RefCell::new(None));
        let outcome = ResultStorage::new();
        let writer = outcome.writer();
        let fut = body(Yielder {
            slot: Rc::clone(&slot),
        });
        let computation: Computation = Box::pin(async move {
            match fut.await {
                Ok(()) => writer.set_value(()),
                Err(fault) => writer.set_error(fault),
            }
        });
        Self {
            handle: OwnerHandle::acquire(computation),
            slot,
            outcome,
            current: None,
            fault_reported: false,
        }
    }

    /// Resumes the body to its next yield point. `Ok(true)` when a value was
    /// yielded (readable through `current()`), `Ok(false)` once the body has
    /// run to completion — idempotently so on every later call. A body fault
    /// surfaces as `Err` from the advance that hits it, exactly once.
    ///
    /// Panics if the body suspends anywhere other than a yield point.
    pub fn advance(&mut self) -> Result<bool, SpindleError> {
        self.current = None;
        if self.handle.is_parked_at_end() {
            return self.exhausted();
        }
        match self.handle.resume() {
            Poll::Pending => match self.slot.borrow_mut().take() {
                Some(value) => {
                    tracing::trace!("generator yielded");
                    self.current = Some(value);
                    Ok(true)
                }
                None => panic!("generator body suspended outside a yield point"),
            },
            Poll::Ready(()) => {
                tracing::trace!("generator exhausted");
                self.exhausted()
            }
        }
    }

    /// Terminal report: exhaustion, or the stored fault the first time.
    fn exhausted(&mut self) -> Result<bool, SpindleError> {
        if self.fault_reported {
            return Ok(false);
        }
        match self.outcome.get() {
            Err(err @ SpindleError::Propagated(_)) => {
                self.fault_reported = true;
                tracing::debug!(fault = %err, "generator body faulted");
                Err(err)
            }
            _ => Ok(false),
        }
    }

    /// The most recently yielded value. Valid only directly after an
    /// `advance()` that returned true.
    pub fn current(&self) -> Result<&T, SpindleError> {
        self.current.as_ref().ok_or(SpindleError::NoCurrentValue)
    }

    /// Moves the most recently yielded value out; same precondition as
    /// `current()`.
    pub fn take_current(&mut self) -> Result<T, SpindleError> {
        self.current.take().ok_or(SpindleError::NoCurrentValue)
    }
}

impl<T: 'static> Iterator for Generator<T> {
    type Item = Result<T, SpindleError>;

    /// Fused on exhaustion; a body fault is the last item.
    fn next(&mut self) -> Option<Self::Item> {
        match self.advance() {
            Ok(true) => Some(self.take_current()),
            Ok(false) => None,
            Err(err) => Some(Err(err)),
        }
    }
}

/// The write side of a generator's yield slot; the only capability a
/// generator body receives.
pub struct Yielder<T> {
    slot: Rc<RefCell<Option<T>>>,
}

impl<T> Yielder<T> {
    /// Parks the generator at a yield point carrying `value`. The value
    /// becomes observable through `Generator::current()` once the enclosing
    /// `advance()` returns.
    pub fn emit(&self, value: T) -> YieldPoint<T> {
        YieldPoint {
            slot: Rc::clone(&self.slot),
            value: Some(value),
        }
    }
}

/// A pending-once future: the first poll stores the value and parks the
/// body, the second poll resumes it.
pub struct YieldPoint<T> {
    slot: Rc<RefCell<Option<T>>>,
    value: Option<T>,
}

// The value is moved through the slot, never pinned in place.
impl<T> Unpin for YieldPoint<T> {}

impl<T> Future for YieldPoint<T> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<()> {
        let this = self.get_mut();
        match this.value.take() {
            Some(value) => {
                let previous = this.slot.borrow_mut().replace(value);
                debug_assert!(previous.is_none(), "yield slot still occupied");
                Poll::Pending
            }
            None => Poll::Ready(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn construction_runs_no_body_code() {
        let started = Rc::new(Cell::new(false));
        let flag = Rc::clone(&started);
        let _gen = Generator::new(move |yielder| async move {
            flag.set(true);
            yielder.emit(1).await;
            Ok(())
        });
        assert!(!started.get());
    }

    #[test]
    fn yields_values_in_order_then_exhausts_idempotently() {
        let mut g = Generator::new(|yielder| async move {
            yielder.emit(1).await;
            yielder.emit(2).await;
            Ok(())
        });

        assert_eq!(g.advance().unwrap(), true);
        assert_eq!(*g.current().unwrap(), 1);
        assert_eq!(g.advance().unwrap(), true);
        assert_eq!(*g.current().unwrap(), 2);
        assert_eq!(g.advance().unwrap(), false);
        assert_eq!(g.advance().unwrap(), false);
        assert!(matches!(g.current(), Err(SpindleError::NoCurrentValue)));
    }

    #[test]
    fn current_before_first_advance_is_a_contract_violation() {
        let g = Generator::new(|yielder| async move {
            yielder.emit(5).await;
            Ok(())
        });
        assert!(matches!(g.current(), Err(SpindleError::NoCurrentValue)));
    }

    #[test]
    fn current_survives_repeated_reads_until_next_advance() {
        let mut g = Generator::new(|yielder| async move {
            yielder.emit("a").await;
            Ok(())
        });
        assert!(g.advance().unwrap());
        assert_eq!(*g.current().unwrap(), "a");
        assert_eq!(*g.current().unwrap(), "a");
    }

    #[test]
    fn take_current_moves_the_value_out() {
        let mut g = Generator::new(|yielder| async move {
            yielder.emit(String::from("owned")).await;
            Ok(())
        });
        assert!(g.advance().unwrap());
        assert_eq!(g.take_current().unwrap(), "owned");
        assert!(matches!(
            g.take_current(),
            Err(SpindleError::NoCurrentValue)
        ));
    }

    #[test]
    fn empty_body_exhausts_on_first_advance() {
        let mut g: Generator<i32> = Generator::new(|_yielder| async move { Ok(()) });
        assert_eq!(g.advance().unwrap(), false);
    }

    #[test]
    fn fault_surfaces_once_from_the_triggering_advance() {
        let mut g = Generator::new(|yielder| async move {
            yielder.emit(1).await;
            Err(Fault::msg("mid-stream failure"))
        });
        assert!(g.advance().unwrap());
        match g.advance() {
            Err(SpindleError::Propagated(fault)) => {
                assert_eq!(fault.to_string(), "mid-stream failure");
            }
            other => panic!("expected propagated fault, got {other:?}"),
        }
        // No partial value is exposed for the failing call.
        assert!(matches!(g.current(), Err(SpindleError::NoCurrentValue)));
        // Exhaustion stays idempotent afterwards.
        assert_eq!(g.advance().unwrap(), false);
    }

    #[test]
    #[should_panic(expected = "outside a yield point")]
    fn foreign_suspension_is_rejected() {
        let mut g: Generator<i32> = Generator::new(|_yielder| async move {
            std::future::pending::<()>().await;
            Ok(())
        });
        let _ = g.advance();
    }

    #[test]
    fn iterator_adapter_collects_the_sequence() {
        let g = Generator::new(|yielder| async move {
            for n in 1..=3 {
                yielder.emit(n * n).await;
            }
            Ok(())
        });
        let values: Result<Vec<_>, _> = g.collect();
        assert_eq!(values.unwrap(), vec![1, 4, 9]);
    }

    #[test]
    fn iterator_reports_a_fault_as_the_last_item() {
        let mut g = Generator::new(|yielder| async move {
            yielder.emit(1).await;
            Err(Fault::msg("broke"))
        });
        assert_eq!(g.next().unwrap().unwrap(), 1);
        assert!(matches!(
            g.next(),
            Some(Err(SpindleError::Propagated(_)))
        ));
        assert!(g.next().is_none());
    }

    #[test]
    fn dropping_mid_yield_runs_local_destructors() {
        struct Guard(Rc<Cell<bool>>);
        impl Drop for Guard {
            fn drop(&mut self) {
                self.0.set(true);
            }
        }

        let dropped = Rc::new(Cell::new(false));
        let guard = Guard(Rc::clone(&dropped));
        let mut g = Generator::new(move |yielder| async move {
            let _guard = guard;
            yielder.emit(1).await;
            yielder.emit(2).await;
            Ok(())
        });
        assert!(g.advance().unwrap());
        assert!(!dropped.get());
        drop(g);
        assert!(dropped.get());
    }
}
