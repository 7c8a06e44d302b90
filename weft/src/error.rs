// src/error.rs

use core::fmt;
use thiserror::Error;

/// Error returned by `try_send` when the item could not be enqueued
/// immediately. The item is handed back to the caller.
#[derive(Error, PartialEq, Eq, Clone)]
pub enum TrySendError<T> {
  /// The queue is full (or, for a rendezvous queue, no receiver is waiting).
  #[error("queue full")]
  Full(T),
  /// Every receiver is gone or the consumer side was cancelled.
  #[error("queue closed")]
  Closed(T),
}

impl<T> TrySendError<T> {
  /// Consumes the error, returning the item that could not be sent.
  #[inline]
  pub fn into_inner(self) -> T {
    match self {
      TrySendError::Full(v) | TrySendError::Closed(v) => v,
    }
  }

  /// Returns `true` if the send failed because the queue was full.
  #[inline]
  pub fn is_full(&self) -> bool {
    matches!(self, TrySendError::Full(_))
  }
}

// Items do not need to be `Debug` for the error to be printable.
impl<T> fmt::Debug for TrySendError<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TrySendError::Full(_) => write!(f, "TrySendError::Full(..)"),
      TrySendError::Closed(_) => write!(f, "TrySendError::Closed(..)"),
    }
  }
}

/// Error returned by blocking `send` operations.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum SendError {
  /// Every receiver is gone or the consumer side was cancelled.
  #[error("queue closed")]
  Closed,
}

/// Error returned by `try_recv` when no item could be taken immediately.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum TryRecvError {
  /// Nothing buffered right now, but producers are still attached.
  #[error("queue empty")]
  Empty,
  /// The queue is empty and has been closed by its producers.
  #[error("queue disconnected (empty and all senders dropped)")]
  Disconnected,
}

/// Error returned by blocking `recv` operations.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum RecvError {
  /// The queue is empty and has been closed by its producers.
  #[error("queue disconnected (empty and all senders dropped)")]
  Disconnected,
}

/// Error returned by `recv_timeout` operations.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum RecvErrorTimeout {
  /// The queue is empty and has been closed by its producers.
  #[error("queue disconnected")]
  Disconnected,
  /// The timeout elapsed before an item could be received.
  #[error("receive operation timed out")]
  Timeout,
}

/// Error returned when closing a handle that was already closed.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
#[error("queue handle is already closed")]
pub struct CloseError;

/// Errors raised while installing or reading a [`BridgeConfig`](crate::config::BridgeConfig).
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum ConfigError {
  /// `config::init` was called after a configuration was already installed.
  #[error("bridge configuration is already initialized")]
  AlreadyInitialized,
  /// An environment variable held a value that could not be parsed.
  #[error("invalid value {value:?} for {key}")]
  InvalidValue { key: &'static str, value: String },
}
