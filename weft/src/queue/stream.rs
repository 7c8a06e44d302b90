use super::core::pop_live;
use super::Receiver;
use crate::error::TryRecvError;

use futures_core::Stream;
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

/// A [`Stream`] over the items of a queue, ending when the queue closes.
///
/// Created by [`Receiver::into_stream`]. Producers stay synchronous; only
/// the consuming side is awaited.
pub struct RecvStream<T: Send> {
  receiver: Receiver<T>,
}

impl<T: Send> RecvStream<T> {
  pub(crate) fn new(receiver: Receiver<T>) -> Self {
    Self { receiver }
  }

  /// Gives back the underlying receiver.
  pub fn into_inner(self) -> Receiver<T> {
    self.receiver
  }
}

impl<T: Send> fmt::Debug for RecvStream<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("RecvStream").field("receiver", &self.receiver).finish()
  }
}

impl<T: Send> Stream for RecvStream<T> {
  type Item = T;

  fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
    let shared = &self.receiver.shared;

    loop {
      match shared.try_recv_core() {
        Ok(item) => return Poll::Ready(Some(item)),
        Err(TryRecvError::Disconnected) => return Poll::Ready(None),
        Err(TryRecvError::Empty) => {}
      }

      let sender = {
        let mut guard = shared.state.lock();
        if !guard.buffer.is_empty() {
          continue;
        }
        if guard.sender_count == 0 {
          return Poll::Ready(None);
        }
        if !guard
          .waiting_async_receivers
          .iter()
          .any(|w| w.will_wake(cx.waker()))
        {
          guard.waiting_async_receivers.push(cx.waker().clone());
        }
        if shared.capacity == 0 {
          pop_live(&mut guard.waiting_senders)
        } else {
          None
        }
      };
      if let Some(sender) = sender {
        sender.unpark();
      }
      return Poll::Pending;
    }
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    (self.receiver.len(), None)
  }
}
