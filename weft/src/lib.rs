//! Lazy sequences, blocking queues and sets for Rust.
//!
//! Weft is a small toolkit with three layers:
//!
//! - [`seq`]: pull-based lazy sequences ([`Next`]) and their combinators.
//! - [`queue`] and [`bridge`]: closable MPMC queues, plus producer threads
//!   and fan-in/fan-out helpers that connect queues with sequences.
//! - [`set`]: a set trait with a single-threaded and a concurrent variant.
//!
//! Producer threads are configured once per process through [`config`].

pub mod bridge;
pub mod config;
pub mod error;
pub mod queue;
pub mod seq;
pub mod set;

pub use config::BridgeConfig;
pub use error::{
  CloseError, ConfigError, RecvError, RecvErrorTimeout, SendError, TryRecvError, TrySendError,
};
pub use queue::{bounded, unbounded, CancelToken, Receiver, Sender};
pub use seq::Next;
pub use set::{SafeSet, Set, UnsafeSet, Variant};
