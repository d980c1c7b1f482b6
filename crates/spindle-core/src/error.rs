//! Error types for the spindle primitives.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// An error raised inside a computation body.
///
/// Faults are stored in the result slot and re-surfaced at every later
/// observation, so they must be cloneable; the payload is shared behind an
/// `Arc`.
#[derive(Debug, Clone)]
pub struct Fault(Arc<dyn std::error::Error + Send + Sync>);

impl Fault {
    /// Wraps any error value.
    pub fn new(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Arc::new(source))
    }

    /// Builds a fault from a plain message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self(Arc::new(Message(message.into())))
    }

    /// Converts a caught panic payload into a fault, keeping the panic
    /// message when there is one.
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "computation body panicked".to_string()
        };
        Self::msg(message)
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for Fault {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

/// Message-only fault payload.
#[derive(Debug)]
struct Message(String);

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for Message {}

/// SpindleError は結果アクセスの失敗と body 由来のエラーの分類。
///
/// - `ResultNotReady` / `ResultTaken` / `NoCurrentValue`: caller broke an
///   access precondition; the computation itself is fine.
/// - `Propagated`: the computation body raised; the fault is re-surfaced at
///   every observation point.
#[derive(Debug, Clone, Error)]
pub enum SpindleError {
    #[error("result is not ready")]
    ResultNotReady,

    #[error("result has already been taken")]
    ResultTaken,

    #[error("no current value; advance() must return true first")]
    NoCurrentValue,

    #[error("computation failed: {0}")]
    Propagated(Fault),
}

impl From<SpindleError> for Fault {
    /// Lets a body forward a nested task's outcome with `?`. An already
    /// propagated fault crosses the await unchanged instead of being
    /// re-wrapped.
    fn from(err: SpindleError) -> Self {
        match err {
            SpindleError::Propagated(fault) => fault,
            other => Fault::new(other),
        }
    }
}
