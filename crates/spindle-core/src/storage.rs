//! Single-assignment result slot shared between a computation and its owner.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use crate::error::{Fault, SpindleError};

/// Slot state.
///
/// Transitions:
/// - Empty -> Value (set_value, exactly once)
/// - Empty -> Error (set_error, exactly once)
/// - Value -> Taken (take)
///
/// Error is retained across takes so every later observation re-raises the
/// same fault.
#[derive(Debug)]
enum Slot<T> {
    Empty,
    Value(T),
    Error(Fault),
    Taken,
}

/// Owner-side view of the slot. The body holds a writer clone; sharing is
/// single-threaded (`Rc<RefCell<…>>`) because nothing in the model crosses a
/// thread boundary.
///
/// The void variant of the original design is the `T = ()` instantiation:
/// presence of `Value(())` means success, no payload.
#[derive(Debug)]
pub struct ResultStorage<T> {
    slot: Rc<RefCell<Slot<T>>>,
}

impl<T> ResultStorage<T> {
    pub(crate) fn new() -> Self {
        Self {
            slot: Rc::new(RefCell::new(Slot::Empty)),
        }
    }

    /// Clone of the shared slot, handed to the computation body.
    pub(crate) fn writer(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }

    /// Writes `Empty -> Value`. A body produces at most one result, so a
    /// settled slot here is a logic error.
    pub(crate) fn set_value(&self, value: T) {
        let mut slot = self.slot.borrow_mut();
        assert!(
            matches!(*slot, Slot::Empty),
            "result slot already settled"
        );
        *slot = Slot::Value(value);
    }

    /// Writes `Empty -> Error`.
    pub(crate) fn set_error(&self, fault: Fault) {
        let mut slot = self.slot.borrow_mut();
        assert!(
            matches!(*slot, Slot::Empty),
            "result slot already settled"
        );
        *slot = Slot::Error(fault);
    }

    /// Has the computation produced its terminal outcome?
    pub fn is_settled(&self) -> bool {
        !matches!(*self.slot.borrow(), Slot::Empty)
    }

    /// Read-only access to the stored value.
    pub fn get(&self) -> Result<Ref<'_, T>, SpindleError> {
        {
            let slot = self.slot.borrow();
            match &*slot {
                Slot::Empty => return Err(SpindleError::ResultNotReady),
                Slot::Taken => return Err(SpindleError::ResultTaken),
                Slot::Error(fault) => return Err(SpindleError::Propagated(fault.clone())),
                Slot::Value(_) => {}
            }
        }
        Ok(Ref::map(self.slot.borrow(), |slot| match slot {
            Slot::Value(value) => value,
            _ => unreachable!("slot state checked above"),
        }))
    }

    /// Consuming access: moves the value out, leaving the slot taken.
    pub fn take(&self) -> Result<T, SpindleError> {
        let mut slot = self.slot.borrow_mut();
        match std::mem::replace(&mut *slot, Slot::Taken) {
            Slot::Value(value) => Ok(value),
            Slot::Empty => {
                *slot = Slot::Empty;
                Err(SpindleError::ResultNotReady)
            }
            Slot::Taken => Err(SpindleError::ResultTaken),
            Slot::Error(fault) => {
                *slot = Slot::Error(fault.clone());
                Err(SpindleError::Propagated(fault))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_slot_is_not_ready() {
        let storage: ResultStorage<i32> = ResultStorage::new();
        assert!(!storage.is_settled());
        assert!(matches!(storage.get(), Err(SpindleError::ResultNotReady)));
        assert!(matches!(storage.take(), Err(SpindleError::ResultNotReady)));
        // Failed take must not poison the slot.
        assert!(!storage.is_settled());
    }

    #[test]
    fn set_value_then_repeated_reads() {
        let storage = ResultStorage::new();
        storage.writer().set_value(42);
        assert!(storage.is_settled());
        assert_eq!(*storage.get().unwrap(), 42);
        assert_eq!(*storage.get().unwrap(), 42);
    }

    #[test]
    fn take_moves_value_out_exactly_once() {
        let storage = ResultStorage::new();
        storage.writer().set_value(String::from("once"));
        assert_eq!(storage.take().unwrap(), "once");
        assert!(matches!(storage.take(), Err(SpindleError::ResultTaken)));
        assert!(matches!(storage.get(), Err(SpindleError::ResultTaken)));
    }

    #[test]
    fn stored_error_is_reraised_on_every_observation() {
        let storage: ResultStorage<i32> = ResultStorage::new();
        storage.writer().set_error(Fault::msg("bad"));
        for _ in 0..2 {
            match storage.take() {
                Err(SpindleError::Propagated(fault)) => assert_eq!(fault.to_string(), "bad"),
                other => panic!("expected propagated fault, got {other:?}"),
            }
        }
        assert!(matches!(storage.get(), Err(SpindleError::Propagated(_))));
    }

    #[test]
    #[should_panic(expected = "result slot already settled")]
    fn double_assignment_is_a_logic_error() {
        let storage = ResultStorage::new();
        storage.set_value(1);
        storage.set_value(2);
    }

    #[test]
    fn unit_storage_carries_presence_only() {
        let storage: ResultStorage<()> = ResultStorage::new();
        assert!(matches!(storage.get(), Err(SpindleError::ResultNotReady)));
        storage.writer().set_value(());
        assert!(storage.get().is_ok());
        assert!(storage.take().is_ok());
    }
}
