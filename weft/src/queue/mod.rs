// src/queue/mod.rs

//! A bounded, closeable multi-producer/multi-consumer queue.
//!
//! This is the transport under [`bridge`](crate::bridge). It uses a
//! `parking_lot::Mutex` around a `VecDeque` and waiter lists, and blocks with
//! an adaptive spin/yield/park strategy.
//!
//! ### Lifecycle
//!
//! A queue is `Open` until the last [`Sender`] is closed or dropped. It is
//! then `Closed` for good: receivers drain what is buffered and then get
//! [`RecvError::Disconnected`]. Nothing reopens a queue.
//!
//! The consumer side can also go away: once the last [`Receiver`] is dropped,
//! or a [`CancelToken`] for the queue fires, every pending and future send
//! fails with [`SendError::Closed`]. Producers use this to stop instead of
//! blocking forever on a queue nobody reads.
//!
//! ### Capacity
//!
//! A capacity of `0` makes a rendezvous queue: a send completes only once a
//! receiver is waiting for it. [`unbounded`] is limited by memory only.

use crate::error::{CloseError, RecvError, RecvErrorTimeout, SendError, TryRecvError, TrySendError};
use crate::seq::Next;

pub use stream::RecvStream;

mod backoff;
mod core;
mod stream;
mod sync_impl;

pub(crate) use sync_impl::{send_either, Side};

use self::core::QueueShared;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// The producing half of a queue. Cloning adds a producer.
pub struct Sender<T: Send> {
  shared: Arc<QueueShared<T>>,
  closed: AtomicBool,
}

/// The consuming half of a queue. Cloning adds a consumer; each item goes to
/// exactly one of them.
pub struct Receiver<T: Send> {
  shared: Arc<QueueShared<T>>,
  closed: AtomicBool,
}

/// Disconnects the consumer side of a queue from anywhere.
///
/// Obtained from [`Sender::cancel_token`] or [`Receiver::cancel_token`].
/// After [`cancel`](CancelToken::cancel), sends on the queue fail, which ends
/// any producer feeding it.
#[derive(Clone)]
pub struct CancelToken {
  target: Arc<dyn Cancel>,
}

trait Cancel: Send + Sync {
  fn cancel(&self);
  fn is_cancelled(&self) -> bool;
}

impl<T: Send> Cancel for QueueShared<T> {
  fn cancel(&self) {
    QueueShared::cancel(self);
  }

  fn is_cancelled(&self) -> bool {
    QueueShared::is_cancelled(self)
  }
}

impl CancelToken {
  /// Disconnects the consumer side. Idempotent.
  pub fn cancel(&self) {
    self.target.cancel();
  }

  /// Returns `true` once [`cancel`](Self::cancel) has been called.
  pub fn is_cancelled(&self) -> bool {
    self.target.is_cancelled()
  }
}

impl fmt::Debug for CancelToken {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CancelToken")
      .field("cancelled", &self.is_cancelled())
      .finish()
  }
}

// --- Constructors ---

/// Creates a queue holding at most `capacity` items. `0` is a rendezvous queue.
pub fn bounded<T: Send>(capacity: usize) -> (Sender<T>, Receiver<T>) {
  let shared = Arc::new(QueueShared::new(capacity));
  (
    Sender {
      shared: Arc::clone(&shared),
      closed: AtomicBool::new(false),
    },
    Receiver {
      shared,
      closed: AtomicBool::new(false),
    },
  )
}

/// Creates a queue bounded only by available memory.
pub fn unbounded<T: Send>() -> (Sender<T>, Receiver<T>) {
  bounded(usize::MAX)
}

fn public_capacity(capacity: usize) -> Option<usize> {
  if capacity == usize::MAX {
    None
  } else {
    Some(capacity)
  }
}

// --- Sender ---

/// A clone of a closed handle starts out closed and does not count toward the
/// live handles, so a closed queue stays closed.
impl<T: Send> Clone for Sender<T> {
  fn clone(&self) -> Self {
    let mut guard = self.shared.state.lock();
    let closed = self.closed.load(Ordering::Acquire);
    if !closed {
      guard.sender_count += 1;
    }
    drop(guard);
    Sender {
      shared: Arc::clone(&self.shared),
      closed: AtomicBool::new(closed),
    }
  }
}

impl<T: Send> Sender<T> {
  /// Sends an item, blocking while the queue is full (or, for a rendezvous
  /// queue, until a receiver is waiting).
  ///
  /// # Errors
  ///
  /// `SendError::Closed` if this handle was closed, every receiver is gone,
  /// or the queue was cancelled.
  pub fn send(&self, item: T) -> Result<(), SendError> {
    if self.closed.load(Ordering::Relaxed) {
      return Err(SendError::Closed);
    }
    sync_impl::send_sync(&self.shared, item)
  }

  /// Attempts to send without blocking.
  pub fn try_send(&self, item: T) -> Result<(), TrySendError<T>> {
    if self.closed.load(Ordering::Relaxed) {
      return Err(TrySendError::Closed(item));
    }
    self.shared.try_send_core(item)
  }

  /// Closes this handle. Closing the last producer closes the queue.
  ///
  /// # Errors
  ///
  /// Returns `Err(CloseError)` if this handle was already closed.
  pub fn close(&self) -> Result<(), CloseError> {
    if self
      .closed
      .compare_exchange(false, true, Ordering::AcqRel, Ordering::Relaxed)
      .is_ok()
    {
      self.shared.release_sender();
      Ok(())
    } else {
      Err(CloseError)
    }
  }

  /// Returns `true` if no consumer will take further items.
  pub fn is_closed(&self) -> bool {
    self.shared.state.lock().consumers_gone()
  }

  /// A token that disconnects the consumer side of this queue.
  pub fn cancel_token(&self) -> CancelToken
  where
    T: 'static,
  {
    CancelToken {
      target: self.shared.clone(),
    }
  }

  /// Returns the capacity. `None` for unbounded queues.
  pub fn capacity(&self) -> Option<usize> {
    public_capacity(self.shared.capacity)
  }

  pub(crate) fn shared(&self) -> &QueueShared<T> {
    &self.shared
  }

  /// Number of buffered items.
  #[inline]
  pub fn len(&self) -> usize {
    self.shared.len()
  }

  /// Returns `true` if nothing is buffered.
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Returns `true` if the buffer is full. Always `false` when unbounded.
  #[inline]
  pub fn is_full(&self) -> bool {
    self.shared.capacity != usize::MAX && self.len() >= self.shared.capacity
  }
}

impl<T: Send> Drop for Sender<T> {
  fn drop(&mut self) {
    let _ = self.close();
  }
}

impl<T: Send> fmt::Debug for Sender<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Sender")
      .field("shared", &self.shared)
      .field("closed", &self.closed.load(Ordering::Relaxed))
      .finish()
  }
}

// --- Receiver ---

/// A clone of a closed handle starts out closed and does not count toward the
/// live handles, so a closed queue stays closed.
impl<T: Send> Clone for Receiver<T> {
  fn clone(&self) -> Self {
    let mut guard = self.shared.state.lock();
    let closed = self.closed.load(Ordering::Acquire);
    if !closed {
      guard.receiver_count += 1;
    }
    drop(guard);
    Receiver {
      shared: Arc::clone(&self.shared),
      closed: AtomicBool::new(closed),
    }
  }
}

impl<T: Send> Receiver<T> {
  /// Receives an item, blocking until one arrives or the queue is closed and
  /// drained.
  pub fn recv(&self) -> Result<T, RecvError> {
    if self.closed.load(Ordering::Relaxed) {
      return Err(RecvError::Disconnected);
    }
    sync_impl::recv_sync(&self.shared)
  }

  /// Attempts to receive without blocking.
  pub fn try_recv(&self) -> Result<T, TryRecvError> {
    if self.closed.load(Ordering::Relaxed) {
      return Err(TryRecvError::Disconnected);
    }
    self.shared.try_recv_core()
  }

  /// Receives an item, blocking for at most `timeout`.
  ///
  /// # Errors
  ///
  /// - `Err(RecvErrorTimeout::Timeout)` if the timeout is reached.
  /// - `Err(RecvErrorTimeout::Disconnected)` if the queue is closed and drained.
  pub fn recv_timeout(&self, timeout: Duration) -> Result<T, RecvErrorTimeout> {
    if self.closed.load(Ordering::Relaxed) {
      return Err(RecvErrorTimeout::Disconnected);
    }
    sync_impl::recv_timeout_sync(&self.shared, timeout)
  }

  /// Closes this handle. Closing the last consumer makes every send fail.
  ///
  /// # Errors
  ///
  /// Returns `Err(CloseError)` if this handle was already closed.
  pub fn close(&self) -> Result<(), CloseError> {
    if self
      .closed
      .compare_exchange(false, true, Ordering::AcqRel, Ordering::Relaxed)
      .is_ok()
    {
      self.shared.release_receiver();
      Ok(())
    } else {
      Err(CloseError)
    }
  }

  /// Returns `true` if the queue is closed and nothing is left to receive.
  pub fn is_closed(&self) -> bool {
    let guard = self.shared.state.lock();
    guard.sender_count == 0 && guard.buffer.is_empty()
  }

  /// A token that disconnects the consumer side of this queue.
  pub fn cancel_token(&self) -> CancelToken
  where
    T: 'static,
  {
    CancelToken {
      target: self.shared.clone(),
    }
  }

  /// Returns the capacity. `None` for unbounded queues.
  pub fn capacity(&self) -> Option<usize> {
    public_capacity(self.shared.capacity)
  }

  pub(crate) fn raw_capacity(&self) -> usize {
    self.shared.capacity
  }

  /// Number of buffered items.
  #[inline]
  pub fn len(&self) -> usize {
    self.shared.len()
  }

  /// Returns `true` if nothing is buffered.
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Returns `true` if the buffer is full. Always `false` when unbounded.
  #[inline]
  pub fn is_full(&self) -> bool {
    self.shared.capacity != usize::MAX && self.len() >= self.shared.capacity
  }

  /// A blocking iterator that ends when the queue is closed and drained.
  pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
    std::iter::from_fn(move || self.recv().ok())
  }

  /// Turns the receiver into a sequence cursor. Dropping the cursor drops the
  /// receiver.
  pub fn into_next(self) -> Next<T>
  where
    T: 'static,
  {
    Next::new(move || self.recv().ok())
  }

  /// Turns the receiver into an async [`Stream`](futures_core::Stream).
  pub fn into_stream(self) -> RecvStream<T> {
    RecvStream::new(self)
  }
}

impl<T: Send> Drop for Receiver<T> {
  fn drop(&mut self) {
    let _ = self.close();
  }
}

impl<T: Send> fmt::Debug for Receiver<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Receiver")
      .field("shared", &self.shared)
      .field("closed", &self.closed.load(Ordering::Relaxed))
      .finish()
  }
}
