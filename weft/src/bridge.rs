//! Bridges between sequences and queues, with fan-in and fan-out.
//!
//! Every function here that moves items runs on its own OS thread, named
//! from [`config::current`](crate::config::current). Each task closes the
//! queue it feeds once it is done, so consumers always see the end.
//!
//! Tasks also stop early when their output has no consumer left: dropping
//! every [`Receiver`] of an output, or firing its [`CancelToken`], makes the
//! task's next send fail and the task exit. Stopping a relay drops its input
//! receiver in turn, so cancellation travels upstream through a pipeline.

use crate::config;
use crate::queue::{self, send_either, Receiver, Sender, Side};
use crate::seq::Next;

pub use crate::queue::CancelToken;

use std::fmt;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, trace, warn};

/// Handle to a spawned producer thread.
///
/// Dropping the handle detaches the thread; it still closes its queue when
/// the generator returns.
pub struct Producer {
  name: String,
  handle: Option<JoinHandle<()>>,
  token: CancelToken,
}

impl Producer {
  /// Disconnects the producer's queue from its consumers, so the
  /// generator's next send fails.
  pub fn cancel(&self) {
    self.token.cancel();
  }

  /// The cancellation token of the producer's queue.
  pub fn cancel_token(&self) -> CancelToken {
    self.token.clone()
  }

  /// Returns `true` once the thread has exited, or if it never started.
  pub fn is_finished(&self) -> bool {
    self.handle.as_ref().map_or(true, JoinHandle::is_finished)
  }

  /// The thread name.
  pub fn name(&self) -> &str {
    &self.name
  }

  /// Waits for the thread to exit.
  ///
  /// # Errors
  ///
  /// Returns the panic payload if the generator panicked.
  pub fn join(mut self) -> thread::Result<()> {
    match self.handle.take() {
      Some(handle) => handle.join(),
      None => Ok(()),
    }
  }
}

impl fmt::Debug for Producer {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Producer")
      .field("name", &self.name)
      .field("finished", &self.is_finished())
      .field("token", &self.token)
      .finish()
  }
}

/// Spawns a named task thread. If the OS refuses, the closure is dropped
/// (closing any queue it owned) and `None` is returned.
fn spawn_task<F>(role: &str, f: F) -> (String, Option<JoinHandle<()>>)
where
  F: FnOnce() + Send + 'static,
{
  let builder = config::current().thread_builder(role);
  let name = builder_name(role);
  match builder.spawn(f) {
    Ok(handle) => (name, Some(handle)),
    Err(err) => {
      error!(task = %name, error = %err, "failed to spawn task thread");
      (name, None)
    }
  }
}

fn builder_name(role: &str) -> String {
  format!("{}-{}", config::current().thread_name, role)
}

/// Runs `generator` against `tx` on a new thread and closes the queue once the
/// generator returns. A panicking generator closes it too, since the sender is
/// dropped while unwinding.
pub fn spawn<T, F>(tx: Sender<T>, generator: F) -> Producer
where
  T: Send + 'static,
  F: FnOnce(&Sender<T>) + Send + 'static,
{
  let token = tx.cancel_token();
  let task_name = builder_name("producer");
  let (name, handle) = spawn_task("producer", move || {
    debug!(task = %task_name, "producer started");
    generator(&tx);
    let _ = tx.close();
    debug!(task = %task_name, "producer finished");
  });
  Producer { name, handle, token }
}

/// Allocates a queue of `capacity` and feeds it from `generator`.
pub fn lazy<T, F>(capacity: usize, generator: F) -> (Receiver<T>, Producer)
where
  T: Send + 'static,
  F: FnOnce(&Sender<T>) + Send + 'static,
{
  let (tx, rx) = queue::bounded(capacity);
  let producer = spawn(tx, generator);
  (rx, producer)
}

/// A closed queue already holding `items`, with capacity `items.len()`.
pub fn of<T: Send>(items: Vec<T>) -> Receiver<T> {
  let (tx, rx) = queue::bounded(items.len());
  for item in items {
    // Cannot fail: the queue has room for every item and `rx` is alive.
    let _ = tx.try_send(item);
  }
  rx
}

/// Drains `next` into a new queue of `capacity` on a producer thread.
///
/// If the returned receiver is dropped before the sequence ends, the producer
/// stops at its next send instead of blocking forever.
pub fn to_queue<T>(next: Next<T>, capacity: usize) -> Receiver<T>
where
  T: Send + 'static,
{
  let task = builder_name("producer");
  let (rx, _producer) = lazy(capacity, move |tx| {
    let mut sent = 0usize;
    for item in next {
      if tx.send(item).is_err() {
        debug!(task = %task, sent, "consumer went away, stopping producer early");
        return;
      }
      sent += 1;
    }
    trace!(task = %task, sent, "sequence drained into queue");
  });
  rx
}

/// A sequence view of a queue: pulls block until an item arrives and end when
/// the queue is closed and drained.
pub fn iter<T: Send + 'static>(rx: Receiver<T>) -> Next<T> {
  rx.into_next()
}

fn relay<T: Send>(input: &Receiver<T>, output: &Sender<T>) -> usize {
  let mut moved = 0;
  for item in input.iter() {
    if output.send(item).is_err() {
      break;
    }
    moved += 1;
  }
  moved
}

/// Fan-in: merges every input into one queue.
///
/// The output's capacity is the sum of the inputs' capacities. One relay
/// thread per input copies items across, and a coordinator closes the output
/// after all relays finish. Items from one input keep their order; how
/// inputs interleave is up to the scheduler.
pub fn merge<T: Send + 'static>(inputs: Vec<Receiver<T>>) -> Receiver<T> {
  let capacity = inputs
    .iter()
    .map(Receiver::raw_capacity)
    .fold(0usize, usize::saturating_add);
  let (tx, rx) = queue::bounded(capacity);

  let task = builder_name("merge");
  spawn_task("merge", move || {
    let count = inputs.len();
    let relay_task = builder_name("relay");
    let relays: Vec<_> = inputs
      .into_iter()
      .enumerate()
      .filter_map(|(index, input)| {
        let tx = tx.clone();
        let relay_task = relay_task.clone();
        spawn_task("relay", move || {
          let moved = relay(&input, &tx);
          trace!(task = %relay_task, input = index, moved, "relay finished");
        })
        .1
      })
      .collect();

    for handle in relays {
      if handle.join().is_err() {
        warn!(task = %task, "merge relay panicked");
      }
    }
    let _ = tx.close();
    debug!(task = %task, inputs = count, "merge finished");
  });
  rx
}

/// Fan-out: splits one queue into two.
///
/// A single relay hands each item to whichever output is ready first, so
/// every item reaches exactly one output. When both are ready the relay
/// alternates between them. Both outputs close when the input closes. An
/// abandoned output is skipped; the relay stops once both are abandoned.
///
/// Each output has the capacity set by `BridgeConfig::split_capacity`
/// (rendezvous by default).
pub fn split<T: Send + 'static>(input: Receiver<T>) -> (Receiver<T>, Receiver<T>) {
  let capacity = config::current().split_capacity;
  let (first_tx, first_rx) = queue::bounded(capacity);
  let (second_tx, second_rx) = queue::bounded(capacity);

  let task = builder_name("split");
  spawn_task("split", move || {
    let mut prefer = Side::First;
    let (mut to_first, mut to_second) = (0usize, 0usize);
    for item in input.iter() {
      match send_either(first_tx.shared(), second_tx.shared(), item, prefer) {
        Ok(Side::First) => to_first += 1,
        Ok(Side::Second) => to_second += 1,
        Err(_) => {
          debug!(task = %task, "both split outputs abandoned");
          break;
        }
      }
      prefer = prefer.other();
    }
    let _ = first_tx.close();
    let _ = second_tx.close();
    debug!(task = %task, to_first, to_second, "split finished");
  });
  (first_rx, second_rx)
}

/// Relays `input` into a new queue with `max(capacity, 0)` capacity.
pub fn rebuffer<T: Send + 'static>(input: Receiver<T>, capacity: isize) -> Receiver<T> {
  let capacity = usize::try_from(capacity).unwrap_or(0);
  let task = builder_name("producer");
  let (rx, _producer) = lazy(capacity, move |tx| {
    let moved = relay(&input, tx);
    trace!(task = %task, moved, "rebuffer finished");
  });
  rx
}

/// Like [`rebuffer`], but a negative capacity is a programming error.
///
/// # Panics
///
/// Panics if `capacity` is negative.
pub fn buffer<T: Send + 'static>(input: Receiver<T>, capacity: isize) -> Receiver<T> {
  assert!(capacity >= 0, "buffer capacity must not be negative, got {capacity}");
  rebuffer(input, capacity)
}

/// Capacities of `queues`; `None` marks an unbounded queue.
pub fn caps<T: Send>(queues: &[Receiver<T>]) -> Vec<Option<usize>> {
  queues.iter().map(Receiver::capacity).collect()
}

/// Number of items buffered in each of `queues`.
pub fn lens<T: Send>(queues: &[Receiver<T>]) -> Vec<usize> {
  queues.iter().map(Receiver::len).collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::RecvError;
  use crate::seq;
  use std::time::Duration;

  #[test]
  fn of_is_prefilled_and_closed() {
    let rx = of(vec![1, 2, 3]);
    assert_eq!(rx.capacity(), Some(3));
    assert_eq!(rx.len(), 3);
    assert_eq!(rx.iter().collect::<Vec<_>>(), vec![1, 2, 3]);
    assert_eq!(rx.recv(), Err(RecvError::Disconnected));
  }

  #[test]
  fn spawn_closes_after_generator_returns() {
    let (tx, rx) = queue::bounded(0);
    let producer = spawn(tx, |tx| {
      tx.send("hello").unwrap();
    });
    assert_eq!(rx.recv(), Ok("hello"));
    assert_eq!(rx.recv(), Err(RecvError::Disconnected));
    producer.join().unwrap();
  }

  #[test]
  fn spawn_closes_even_if_generator_panics() {
    let (rx, producer) = lazy::<u8, _>(1, |_tx| panic!("generator failed"));
    assert_eq!(rx.recv(), Err(RecvError::Disconnected));
    assert!(producer.join().is_err());
  }

  #[test]
  fn producer_threads_are_named() {
    let (rx, producer) = lazy(1, |tx| {
      let name = thread::current().name().map(str::to_string);
      tx.send(name).unwrap();
    });
    assert_eq!(producer.name(), builder_name("producer"));
    assert_eq!(rx.recv().unwrap().as_deref(), Some(producer.name()));
  }

  #[test]
  fn to_queue_preserves_order() {
    let rx = to_queue(seq::range(&[0, 50]), 4);
    assert_eq!(seq::slice(iter(rx)), (0..50).collect::<Vec<_>>());
  }

  #[test]
  fn to_queue_producer_stops_when_abandoned() {
    // An infinite source would block its producer forever without disconnect.
    let (tx, rx) = queue::bounded(0);
    let producer = spawn(tx, |tx| {
      for v in seq::iota::<u64>(&[]) {
        if tx.send(v).is_err() {
          return;
        }
      }
    });
    assert_eq!(rx.recv(), Ok(0));
    drop(rx);
    producer.join().unwrap();
  }

  #[test]
  fn producer_cancel_stops_generator() {
    let (rx, producer) = lazy(1, |tx| for v in seq::iota::<u32>(&[]) {
      if tx.send(v).is_err() {
        return;
      }
    });
    assert_eq!(rx.recv(), Ok(0));
    producer.cancel();
    assert!(producer.cancel_token().is_cancelled());
    producer.join().unwrap();
  }

  #[test]
  fn rebuffer_clamps_negative_capacity() {
    let rx = rebuffer(of(vec!['x', 'y']), -5);
    assert_eq!(rx.capacity(), Some(0));
    assert_eq!(rx.iter().collect::<String>(), "xy");
  }

  #[test]
  fn rebuffer_uses_new_capacity() {
    let rx = rebuffer(of(vec![1u8]), 16);
    assert_eq!(rx.capacity(), Some(16));
    assert_eq!(rx.recv_timeout(Duration::from_secs(1)), Ok(1));
  }

  #[test]
  #[should_panic(expected = "must not be negative")]
  fn buffer_rejects_negative_capacity() {
    let _ = buffer(of(vec![1]), -1);
  }

  #[test]
  fn caps_and_lens() {
    let (_tx, unbounded_rx) = queue::unbounded::<i32>();
    let queues = vec![of(vec![1, 2]), of(Vec::new()), unbounded_rx];
    assert_eq!(caps(&queues), vec![Some(2), Some(0), None]);
    assert_eq!(lens(&queues), vec![2, 0, 0]);
  }

  #[test]
  fn merge_of_nothing_closes() {
    let merged = merge::<i32>(Vec::new());
    assert_eq!(merged.recv(), Err(RecvError::Disconnected));
  }
}
