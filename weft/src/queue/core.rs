//! Shared state of a bounded queue.
//!
//! A single `parking_lot::Mutex` guards the buffer, the handle counts and the
//! waiter lists. Waiters are woken outside the lock. A waiter's `Signal` is
//! fired (its `done` flag set) while the lock is held, so the thread that
//! pops a waiter and the waiter itself always agree on who retired it.

use crate::error::{TryRecvError, TrySendError};

use parking_lot::{Mutex, MutexGuard};
use std::collections::VecDeque;
use std::fmt;
use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::Waker;
use std::thread::{self, Thread};

const INITIAL_BUFFER: usize = 32;

/// Wake-up flag for one parked thread.
///
/// A sender blocked in `send_either` registers the same signal with two
/// queues; whichever fires first wins and the other entry goes stale.
#[derive(Debug)]
pub(crate) struct Signal {
  thread: Thread,
  done: AtomicBool,
}

impl Signal {
  pub(crate) fn new() -> Arc<Self> {
    Arc::new(Self {
      thread: thread::current(),
      done: AtomicBool::new(false),
    })
  }

  #[inline]
  pub(crate) fn is_done(&self) -> bool {
    self.done.load(Ordering::Acquire)
  }

  /// Retires the signal. Returns `true` if this call retired it.
  #[inline]
  pub(crate) fn fire(&self) -> bool {
    !self.done.swap(true, Ordering::AcqRel)
  }

  #[inline]
  pub(crate) fn unpark(&self) {
    self.thread.unpark();
  }
}

/// Pops waiters until one that was still live is found and fires it.
pub(crate) fn pop_live(list: &mut VecDeque<Arc<Signal>>) -> Option<Arc<Signal>> {
  while let Some(signal) = list.pop_front() {
    if signal.fire() {
      return Some(signal);
    }
  }
  None
}

fn fire_all(list: &mut VecDeque<Arc<Signal>>) -> Vec<Arc<Signal>> {
  mem::take(list).into_iter().filter(|s| s.fire()).collect()
}

/// Receivers to wake after an item became available.
pub(crate) enum Wakeup {
  Thread(Arc<Signal>),
  Tasks(Vec<Waker>),
}

impl Wakeup {
  pub(crate) fn wake(self) {
    match self {
      Wakeup::Thread(signal) => signal.unpark(),
      Wakeup::Tasks(wakers) => wakers.into_iter().for_each(Waker::wake),
    }
  }
}

pub(crate) struct QueueState<T> {
  pub(crate) buffer: VecDeque<T>,
  pub(crate) waiting_senders: VecDeque<Arc<Signal>>,
  pub(crate) waiting_receivers: VecDeque<Arc<Signal>>,
  /// Wakers of pending `RecvStream` polls. Drained all at once.
  pub(crate) waiting_async_receivers: Vec<Waker>,
  pub(crate) sender_count: usize,
  pub(crate) receiver_count: usize,
  pub(crate) cancelled: bool,
}

impl<T> QueueState<T> {
  /// No consumer will ever take another item.
  #[inline]
  pub(crate) fn consumers_gone(&self) -> bool {
    self.receiver_count == 0 || self.cancelled
  }

  fn has_live_receiver(&mut self) -> bool {
    self.waiting_receivers.retain(|s| !s.is_done());
    !self.waiting_receivers.is_empty() || !self.waiting_async_receivers.is_empty()
  }

  fn claim_receiver(&mut self) -> Option<Wakeup> {
    if let Some(signal) = pop_live(&mut self.waiting_receivers) {
      return Some(Wakeup::Thread(signal));
    }
    if self.waiting_async_receivers.is_empty() {
      None
    } else {
      Some(Wakeup::Tasks(mem::take(&mut self.waiting_async_receivers)))
    }
  }
}

pub(crate) struct QueueShared<T> {
  pub(crate) state: Mutex<QueueState<T>>,
  /// `0` is a rendezvous queue, `usize::MAX` is unbounded.
  pub(crate) capacity: usize,
}

impl<T> fmt::Debug for QueueShared<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let guard = self.state.lock();
    f.debug_struct("QueueShared")
      .field("capacity", &self.capacity)
      .field("len", &guard.buffer.len())
      .field("senders", &guard.sender_count)
      .field("receivers", &guard.receiver_count)
      .field("cancelled", &guard.cancelled)
      .finish_non_exhaustive()
  }
}

impl<T: Send> QueueShared<T> {
  pub(crate) fn new(capacity: usize) -> Self {
    QueueShared {
      state: Mutex::new(QueueState {
        buffer: VecDeque::with_capacity(capacity.min(INITIAL_BUFFER)),
        waiting_senders: VecDeque::new(),
        waiting_receivers: VecDeque::new(),
        waiting_async_receivers: Vec::new(),
        sender_count: 1,
        receiver_count: 1,
        cancelled: false,
      }),
      capacity,
    }
  }

  /// Whether a sender could enqueue right now. Called under the lock before
  /// parking so a wake-up that already happened is not missed.
  pub(crate) fn can_accept(&self, guard: &mut MutexGuard<'_, QueueState<T>>) -> bool {
    if self.capacity == 0 {
      guard.has_live_receiver()
    } else {
      guard.buffer.len() < self.capacity
    }
  }

  /// Enqueues without blocking.
  ///
  /// A rendezvous queue only accepts an item when a receiver is waiting; that
  /// receiver is claimed so the next sender has to find another one.
  pub(crate) fn try_send_core(&self, item: T) -> Result<(), TrySendError<T>> {
    let mut guard = self.state.lock();

    if guard.consumers_gone() {
      return Err(TrySendError::Closed(item));
    }

    if self.capacity == 0 {
      let Some(wakeup) = guard.claim_receiver() else {
        return Err(TrySendError::Full(item));
      };
      guard.buffer.push_back(item);
      drop(guard);
      wakeup.wake();
      return Ok(());
    }

    if guard.buffer.len() >= self.capacity {
      return Err(TrySendError::Full(item));
    }
    guard.buffer.push_back(item);
    let wakeup = guard.claim_receiver();
    drop(guard);
    if let Some(wakeup) = wakeup {
      wakeup.wake();
    }
    Ok(())
  }

  /// Dequeues without blocking. Freeing a slot in a buffered queue wakes one
  /// parked sender.
  pub(crate) fn try_recv_core(&self) -> Result<T, TryRecvError> {
    let mut guard = self.state.lock();

    if let Some(item) = guard.buffer.pop_front() {
      let sender = if self.capacity > 0 {
        pop_live(&mut guard.waiting_senders)
      } else {
        None
      };
      drop(guard);
      if let Some(sender) = sender {
        sender.unpark();
      }
      return Ok(item);
    }

    if guard.sender_count == 0 {
      return Err(TryRecvError::Disconnected);
    }
    Err(TryRecvError::Empty)
  }

  /// Drops one producer handle. The last one closes the queue and wakes
  /// every parked receiver so it can observe the disconnect.
  pub(crate) fn release_sender(&self) {
    let (threads, tasks) = {
      let mut guard = self.state.lock();
      guard.sender_count -= 1;
      if guard.sender_count > 0 {
        return;
      }
      (
        fire_all(&mut guard.waiting_receivers),
        mem::take(&mut guard.waiting_async_receivers),
      )
    };
    threads.iter().for_each(|s| s.unpark());
    tasks.into_iter().for_each(Waker::wake);
  }

  /// Drops one consumer handle. The last one wakes every parked sender so
  /// their sends fail; otherwise another receiver is nudged in case this one
  /// had been claimed for an item it will never take.
  pub(crate) fn release_receiver(&self) {
    let (senders, wakeup) = {
      let mut guard = self.state.lock();
      guard.receiver_count -= 1;
      if guard.consumers_gone() {
        (fire_all(&mut guard.waiting_senders), None)
      } else {
        let sender: Vec<_> = pop_live(&mut guard.waiting_senders).into_iter().collect();
        let wakeup = if guard.buffer.is_empty() {
          None
        } else {
          guard.claim_receiver()
        };
        (sender, wakeup)
      }
    };
    senders.iter().for_each(|s| s.unpark());
    if let Some(wakeup) = wakeup {
      wakeup.wake();
    }
  }

  /// Disconnects the consumer side. Pending and future sends fail; buffered
  /// items stay available to receivers.
  pub(crate) fn cancel(&self) {
    let senders = {
      let mut guard = self.state.lock();
      if guard.cancelled {
        return;
      }
      guard.cancelled = true;
      fire_all(&mut guard.waiting_senders)
    };
    senders.iter().for_each(|s| s.unpark());
  }

  pub(crate) fn is_cancelled(&self) -> bool {
    self.state.lock().cancelled
  }

  #[inline]
  pub(crate) fn len(&self) -> usize {
    self.state.lock().buffer.len()
  }
}
