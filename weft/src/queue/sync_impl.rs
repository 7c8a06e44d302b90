//! Blocking send and receive.

use super::backoff;
use super::core::{pop_live, QueueShared, Signal};
use crate::error::{RecvError, RecvErrorTimeout, SendError, TryRecvError, TrySendError};

use std::thread;
use std::time::{Duration, Instant};

/// Which of the two queues passed to [`send_either`] took the item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
  First,
  Second,
}

impl Side {
  pub(crate) fn other(self) -> Side {
    match self {
      Side::First => Side::Second,
      Side::Second => Side::First,
    }
  }
}

pub(crate) fn send_sync<T: Send>(shared: &QueueShared<T>, item: T) -> Result<(), SendError> {
  let mut item = item;

  loop {
    match shared.try_send_core(item) {
      Ok(()) => return Ok(()),
      Err(TrySendError::Closed(_)) => return Err(SendError::Closed),
      Err(TrySendError::Full(back)) => item = back,
    }

    let signal = Signal::new();
    {
      let mut guard = shared.state.lock();
      if guard.consumers_gone() {
        return Err(SendError::Closed);
      }
      // Space or a receiver appeared between the attempt and taking the lock.
      if shared.can_accept(&mut guard) {
        continue;
      }
      guard.waiting_senders.push_back(signal.clone());
    }

    backoff::adaptive_wait(|| signal.is_done());
  }
}

/// Sends `item` to whichever of `a` and `b` can take it first, trying
/// `first_choice` before the other when both are ready.
///
/// Fails only when neither queue has consumers left. An abandoned queue is
/// skipped, so the other one receives everything from then on.
pub(crate) fn send_either<T: Send>(
  a: &QueueShared<T>,
  b: &QueueShared<T>,
  item: T,
  first_choice: Side,
) -> Result<Side, SendError> {
  let order = [first_choice, first_choice.other()];
  let pick = |side: Side| match side {
    Side::First => a,
    Side::Second => b,
  };
  let mut item = item;

  loop {
    let mut open = 0;
    for side in order {
      match pick(side).try_send_core(item) {
        Ok(()) => return Ok(side),
        Err(TrySendError::Full(back)) => {
          open += 1;
          item = back;
        }
        Err(TrySendError::Closed(back)) => item = back,
      }
    }
    if open == 0 {
      return Err(SendError::Closed);
    }

    let signal = Signal::new();
    let mut registered = 0;
    let mut ready = false;
    for side in order {
      let shared = pick(side);
      let mut guard = shared.state.lock();
      if guard.consumers_gone() {
        continue;
      }
      if shared.can_accept(&mut guard) {
        ready = true;
        break;
      }
      guard.waiting_senders.push_back(signal.clone());
      registered += 1;
    }

    if ready || registered == 0 {
      // Leave any registration behind as a stale entry and retry at once.
      signal.fire();
      continue;
    }

    backoff::adaptive_wait(|| signal.is_done());
  }
}

/// Parks a receiver on the queue. Returns `false` if the caller should retry
/// immediately instead of waiting.
fn register_receiver<T: Send>(
  shared: &QueueShared<T>,
  signal: &std::sync::Arc<Signal>,
) -> Result<bool, RecvError> {
  let sender = {
    let mut guard = shared.state.lock();
    if !guard.buffer.is_empty() {
      return Ok(false);
    }
    if guard.sender_count == 0 {
      return Err(RecvError::Disconnected);
    }
    guard.waiting_receivers.push_back(signal.clone());
    // A rendezvous sender may be parked waiting for exactly this.
    if shared.capacity == 0 {
      pop_live(&mut guard.waiting_senders)
    } else {
      None
    }
  };
  if let Some(sender) = sender {
    sender.unpark();
  }
  Ok(true)
}

pub(crate) fn recv_sync<T: Send>(shared: &QueueShared<T>) -> Result<T, RecvError> {
  loop {
    match shared.try_recv_core() {
      Ok(item) => return Ok(item),
      Err(TryRecvError::Disconnected) => return Err(RecvError::Disconnected),
      Err(TryRecvError::Empty) => {}
    }

    let signal = Signal::new();
    if !register_receiver(shared, &signal)? {
      continue;
    }

    backoff::adaptive_wait(|| signal.is_done());
  }
}

pub(crate) fn recv_timeout_sync<T: Send>(
  shared: &QueueShared<T>,
  timeout: Duration,
) -> Result<T, RecvErrorTimeout> {
  let deadline = Instant::now() + timeout;

  loop {
    match shared.try_recv_core() {
      Ok(item) => return Ok(item),
      Err(TryRecvError::Disconnected) => return Err(RecvErrorTimeout::Disconnected),
      Err(TryRecvError::Empty) => {}
    }
    if Instant::now() >= deadline {
      return Err(RecvErrorTimeout::Timeout);
    }

    let signal = Signal::new();
    match register_receiver(shared, &signal) {
      Ok(true) => {}
      Ok(false) => continue,
      Err(RecvError::Disconnected) => return Err(RecvErrorTimeout::Disconnected),
    }

    while !signal.is_done() {
      let now = Instant::now();
      if now >= deadline {
        break;
      }
      thread::park_timeout(deadline - now);
    }

    // Retiring the signal ourselves means nobody handed us anything.
    if signal.fire() {
      return match shared.try_recv_core() {
        Ok(item) => Ok(item),
        Err(TryRecvError::Disconnected) => Err(RecvErrorTimeout::Disconnected),
        Err(TryRecvError::Empty) => Err(RecvErrorTimeout::Timeout),
      };
    }
  }
}
