//! A pull-based lazy sequence protocol.
//!
//! A [`Next<T>`] is an owned, stateful cursor: each call to [`Next::pull`]
//! either produces the next element or returns `None` to signal exhaustion.
//! Combinators in this module wrap one cursor in another and compute nothing
//! until pulled, except the eager drivers ([`reduce`], [`all`], [`for_each`],
//! [`slice`], [`kv`]) which consume their input.
//!
//! Cursors are `Send` so they can be handed to a producer thread (see
//! [`bridge::to_queue`](crate::bridge::to_queue)), but a cursor must only be
//! pulled from one place at a time. Use [`lock`] to share one between threads.

mod numeric;
mod ops;

pub use numeric::{iota, range};
pub use ops::{all, filter, fold, for_each, kv, map, merge, reduce, slice, stop, take, zip};

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

type Pull<T> = Box<dyn FnMut() -> Option<T> + Send>;

/// A lazy cursor over elements of type `T`.
///
/// `Next` also implements [`Iterator`], so the standard adapters and
/// `collect` work on it directly.
pub struct Next<T> {
  pull: Pull<T>,
}

impl<T: 'static> Next<T> {
  /// Wraps a closure that yields `Some` until the sequence is exhausted.
  ///
  /// A well-behaved closure keeps returning `None` once it has returned it.
  pub fn new<F>(f: F) -> Self
  where
    F: FnMut() -> Option<T> + Send + 'static,
  {
    Self { pull: Box::new(f) }
  }

  /// Builds a cursor over anything iterable. The result is fused.
  pub fn from_iter<I>(iter: I) -> Self
  where
    I: IntoIterator<Item = T>,
    I::IntoIter: Send + 'static,
  {
    let mut iter = iter.into_iter().fuse();
    Self::new(move || iter.next())
  }

  /// A cursor that is exhausted from the start.
  pub fn empty() -> Self {
    Self::new(|| None)
  }

  /// A cursor that yields `value` once.
  pub fn once(value: T) -> Self
  where
    T: Send,
  {
    let mut slot = Some(value);
    Self::new(move || slot.take())
  }
}

impl<T> Next<T> {
  /// Pulls the next element, or `None` once the sequence is exhausted.
  #[inline]
  pub fn pull(&mut self) -> Option<T> {
    (self.pull)()
  }
}

impl<T> Iterator for Next<T> {
  type Item = T;

  #[inline]
  fn next(&mut self) -> Option<T> {
    self.pull()
  }
}

impl<T> fmt::Debug for Next<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "<Next<{}> {:p}>", std::any::type_name::<T>(), &*self.pull)
  }
}

/// A cursor that may be pulled from several threads at once.
///
/// Every pull takes a mutex, so values and their order are exactly those of
/// the wrapped cursor; each value goes to exactly one caller.
pub struct Locked<T> {
  inner: Arc<Mutex<Next<T>>>,
}

impl<T> Clone for Locked<T> {
  fn clone(&self) -> Self {
    Self {
      inner: Arc::clone(&self.inner),
    }
  }
}

impl<T> fmt::Debug for Locked<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Locked")
      .field("handles", &Arc::strong_count(&self.inner))
      .finish_non_exhaustive()
  }
}

impl<T: 'static> Locked<T> {
  /// Pulls the next element while holding the lock.
  pub fn pull(&self) -> Option<T> {
    self.inner.lock().pull()
  }

  /// Returns a plain cursor that pulls through this shared handle.
  pub fn to_next(&self) -> Next<T> {
    let shared = self.clone();
    Next::new(move || shared.pull())
  }
}

/// Serializes concurrent pulls of `next`.
pub fn lock<T: 'static>(next: Next<T>) -> Locked<T> {
  Locked {
    inner: Arc::new(Mutex::new(next)),
  }
}
