//! spindle-core
//!
//! Core building blocks for the Spindle suspendable-computation primitives:
//! single-shot tasks, pull-driven generators, and the three-phase suspension
//! protocol they share. Strictly single-threaded and cooperative — there is
//! no executor, no scheduler, and no cancellation; bodies are resumed
//! synchronously on the caller's thread.
//!
//! # モジュール構成
//! - **task**: 一つの値を生む eager な computation（Task, TaskScope, Join）
//! - **generator**: pull 駆動で値列を生む computation（Generator, Yielder）
//! - **suspension**: 3 フェーズ（ready / suspend / resume）の suspension protocol
//! - **storage**: single-assignment の結果スロット（ResultStorage）
//! - **error**: エラー型（SpindleError, Fault）
//!
//! 内部モジュール:
//! - **handle**: computation の排他所有ハンドル（OwnerHandle）

pub mod error;
pub mod generator;
pub mod storage;
pub mod suspension;
pub mod task;

mod handle;

pub use error::{Fault, SpindleError};
pub use generator::{Generator, Yielder};
pub use suspension::{Suspend, SuspensionPoint};
pub use task::{Task, TaskScope};
