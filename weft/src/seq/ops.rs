//! Sequence combinators and eager drivers.

use super::Next;

use std::collections::HashMap;
use std::hash::Hash;

/// Keeps only the elements for which `pred` returns `true`.
pub fn filter<T, P>(mut next: Next<T>, mut pred: P) -> Next<T>
where
  T: 'static,
  P: FnMut(&T) -> bool + Send + 'static,
{
  Next::new(move || loop {
    let item = next.pull()?;
    if pred(&item) {
      return Some(item);
    }
  })
}

/// Transforms every element with `f`.
pub fn map<T, R, F>(mut next: Next<T>, mut f: F) -> Next<R>
where
  T: 'static,
  R: 'static,
  F: FnMut(T) -> R + Send + 'static,
{
  Next::new(move || next.pull().map(&mut f))
}

/// Left fold seeded with `R::default()`: `1, 2, 3` becomes `((0 + 1) + 2) + 3`.
///
/// Consumes the whole sequence. An empty sequence yields `R::default()`,
/// which cannot be told apart from a fold that happened to produce it.
pub fn reduce<T, R, F>(mut next: Next<T>, mut combine: F) -> R
where
  R: Default,
  F: FnMut(R, T) -> R,
{
  let mut acc = R::default();
  while let Some(item) = next.pull() {
    acc = combine(acc, item);
  }
  acc
}

/// Running fold: emits the accumulator after each element, so `1, 2, 3`
/// becomes `1, 1 + 2, (1 + 2) + 3` with a zero seed.
pub fn fold<T, R, F>(mut next: Next<T>, mut combine: F) -> Next<R>
where
  T: 'static,
  R: Default + Clone + Send + 'static,
  F: FnMut(R, T) -> R + Send + 'static,
{
  let mut acc = Some(R::default());
  Next::new(move || {
    let item = next.pull()?;
    let current = acc.take().unwrap_or_default();
    let updated = combine(current, item);
    acc = Some(updated.clone());
    Some(updated)
  })
}

/// Pulls one element from every input per step and yields them together.
///
/// Stops the moment any input is exhausted; elements already pulled from the
/// other inputs during that step are discarded. With no inputs the result is
/// exhausted immediately.
pub fn zip<T: 'static>(mut nexts: Vec<Next<T>>) -> Next<Vec<T>> {
  let mut done = nexts.is_empty();
  Next::new(move || {
    if done {
      return None;
    }
    let mut row = Vec::with_capacity(nexts.len());
    for next in nexts.iter_mut() {
      match next.pull() {
        Some(item) => row.push(item),
        None => {
          done = true;
          return None;
        }
      }
    }
    Some(row)
  })
}

/// Limits the sequence to its first `n` elements. Upstream is never pulled
/// more than `n` times.
pub fn take<T: 'static>(n: usize, mut next: Next<T>) -> Next<T> {
  let mut remaining = n;
  Next::new(move || {
    if remaining == 0 {
      return None;
    }
    remaining -= 1;
    let item = next.pull();
    if item.is_none() {
      remaining = 0;
    }
    item
  })
}

/// Ends the sequence at the first element satisfying `pred`. That element is
/// not emitted. Often used to bound an infinite [`iota`](super::iota).
pub fn stop<T, P>(mut next: Next<T>, mut pred: P) -> Next<T>
where
  T: 'static,
  P: FnMut(&T) -> bool + Send + 'static,
{
  let mut stopped = false;
  Next::new(move || {
    if stopped {
      return None;
    }
    match next.pull() {
      Some(item) if !pred(&item) => Some(item),
      _ => {
        stopped = true;
        None
      }
    }
  })
}

/// Concatenates the inputs left to right: input 0 is drained completely
/// before input 1 is pulled, and so on.
pub fn merge<T: 'static>(nexts: Vec<Next<T>>) -> Next<T> {
  let mut queue = nexts.into_iter();
  let mut current = queue.next();
  Next::new(move || loop {
    let next = current.as_mut()?;
    match next.pull() {
      Some(item) => return Some(item),
      None => current = queue.next(),
    }
  })
}

/// Returns `false` as soon as a `false` is pulled, otherwise drains the input
/// and returns `true`.
///
/// An empty input returns `false`.
pub fn all(mut next: Next<bool>) -> bool {
  let mut last = false;
  while let Some(b) = next.pull() {
    last = b;
    if !b {
      break;
    }
  }
  last
}

/// Drives the sequence, stopping early when `visitor` returns `false`.
pub fn for_each<T, F>(mut next: Next<T>, mut visitor: F)
where
  F: FnMut(T) -> bool,
{
  while let Some(item) = next.pull() {
    if !visitor(item) {
      return;
    }
  }
}

/// Collects the sequence into a `Vec`.
pub fn slice<T>(next: Next<T>) -> Vec<T> {
  let mut out = Vec::new();
  for_each(next, |item| {
    out.push(item);
    true
  });
  out
}

/// Collects a sequence of pairs into a map. Later keys overwrite earlier ones.
pub fn kv<K, V>(next: Next<(K, V)>) -> HashMap<K, V>
where
  K: Eq + Hash,
{
  let mut out = HashMap::new();
  for_each(next, |(k, v)| {
    out.insert(k, v);
    true
  });
  out
}
