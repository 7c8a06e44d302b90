use super::{render, Key, Set, Variant};
use crate::bridge;
use crate::seq::Next;

use papaya::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicIsize, Ordering};
use std::sync::Arc;

struct Shared<K> {
  map: HashMap<K, ()>,
  // Adjusted only on real insertions and removals, so it can trail the map
  // while writers race but matches it once they stop.
  count: AtomicIsize,
}

/// A set safe for concurrent use from any number of threads.
///
/// Backed by a lock-free `papaya` map. Element operations never block each
/// other; [`len`](Set::len) is an atomic counter kept alongside the map.
/// Share it across threads by reference or inside an `Arc`.
pub struct SafeSet<K> {
  shared: Arc<Shared<K>>,
}

impl<K: Key> SafeSet<K> {
  pub fn new() -> Self {
    Self::with_capacity(0)
  }

  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      shared: Arc::new(Shared {
        map: HashMap::with_capacity(capacity),
        count: AtomicIsize::new(0),
      }),
    }
  }

  /// A set holding `items`. The count reflects distinct items only.
  pub fn of(items: impl IntoIterator<Item = K>) -> Self {
    let items = items.into_iter();
    let set = Self::with_capacity(items.size_hint().0);
    for item in items {
      set.insert(item);
    }
    set
  }

  /// Inserts `key`, returning `true` if it was not already present.
  pub fn insert(&self, key: K) -> bool {
    let fresh = self.shared.map.pin().insert(key, ()).is_none();
    if fresh {
      self.shared.count.fetch_add(1, Ordering::AcqRel);
    }
    fresh
  }

  /// Removes `key`, returning `true` if it was present.
  pub fn remove(&self, key: &K) -> bool {
    let removed = self.shared.map.pin().remove(key).is_some();
    if removed {
      self.shared.count.fetch_sub(1, Ordering::AcqRel);
    }
    removed
  }
}

impl<K: Key> Set<K> for SafeSet<K> {
  fn add(&self, key: K) {
    self.insert(key);
  }

  fn del(&self, key: &K) {
    self.remove(key);
  }

  fn pop(&self) -> Option<K> {
    let map = self.shared.map.pin();
    for (key, _) in map.iter() {
      // Another thread may take this key first; move on to the next.
      if map.remove(key).is_some() {
        self.shared.count.fetch_sub(1, Ordering::AcqRel);
        return Some(key.clone());
      }
    }
    None
  }

  fn clear(&self) {
    let map = self.shared.map.pin();
    for (key, _) in map.iter() {
      if map.remove(key).is_some() {
        self.shared.count.fetch_sub(1, Ordering::AcqRel);
      }
    }
  }

  fn has(&self, key: &K) -> bool {
    self.shared.map.pin().contains_key(key)
  }

  fn len(&self) -> usize {
    // A removal can land before the matching insertion's increment.
    self.shared.count.load(Ordering::Acquire).max(0) as usize
  }

  fn variant(&self) -> Variant {
    Variant::Safe
  }

  fn for_each(&self, visitor: &mut dyn FnMut(&K) -> bool) {
    let map = self.shared.map.pin();
    for (key, _) in map.iter() {
      if !visitor(key) {
        break;
      }
    }
  }

  /// Walks the live map on a producer thread, yielding elements as the
  /// consumer pulls. Concurrent changes may or may not be observed.
  /// Dropping the sequence early stops the producer.
  fn iter(&self) -> Next<K> {
    let shared = Arc::clone(&self.shared);
    let (rx, _producer) = bridge::lazy(0, move |tx| {
      let map = shared.map.pin();
      for (key, _) in map.iter() {
        if tx.send(key.clone()).is_err() {
          return;
        }
      }
    });
    rx.into_next()
  }
}

impl<K: Key> Default for SafeSet<K> {
  fn default() -> Self {
    Self::new()
  }
}

impl<K: Key> FromIterator<K> for SafeSet<K> {
  fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
    Self::of(iter)
  }
}

impl<K: Key + fmt::Debug> fmt::Debug for SafeSet<K> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let map = self.shared.map.pin();
    f.debug_set().entries(map.iter().map(|(k, _)| k)).finish()
  }
}

impl<K: Key + fmt::Display> fmt::Display for SafeSet<K> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    render(self, f)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::seq;
  use std::thread;

  #[test]
  fn duplicate_adds_do_not_inflate_len() {
    let s = SafeSet::of(vec![1, 1, 1, 2]);
    assert_eq!(s.len(), 2);
    assert!(!s.insert(2));
    assert!(s.insert(3));
    assert_eq!(s.len(), 3);
    assert!(!s.remove(&9));
    assert_eq!(s.len(), 3);
  }

  #[test]
  fn concurrent_adds_of_distinct_keys() {
    const THREADS: usize = 16;
    let set = SafeSet::new();
    thread::scope(|scope| {
      for id in 0..THREADS {
        let set = &set;
        scope.spawn(move || set.add(id));
      }
    });
    assert_eq!(set.len(), THREADS);
  }

  #[test]
  fn concurrent_adds_of_the_same_key() {
    let set = SafeSet::new();
    thread::scope(|scope| {
      for _ in 0..8 {
        scope.spawn(|| {
          for k in 0..100u32 {
            set.add(k);
          }
        });
      }
    });
    assert_eq!(set.len(), 100);
  }

  #[test]
  fn concurrent_pops_hand_out_each_key_once() {
    let set = SafeSet::of(0..1_000u32);
    let popped: Vec<Vec<u32>> = thread::scope(|scope| {
      let handles: Vec<_> = (0..4)
        .map(|_| {
          scope.spawn(|| {
            let mut mine = Vec::new();
            while let Some(k) = set.pop() {
              mine.push(k);
            }
            mine
          })
        })
        .collect();
      handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    let mut all: Vec<u32> = popped.into_iter().flatten().collect();
    all.sort_unstable();
    assert_eq!(all, (0..1_000).collect::<Vec<_>>());
    assert!(set.is_empty());
  }

  #[test]
  fn iter_yields_every_element() {
    let s = SafeSet::of(0..50);
    let mut seen = seq::slice(s.iter());
    seen.sort();
    assert_eq!(seen, (0..50).collect::<Vec<_>>());
  }

  #[test]
  fn abandoned_iter_does_not_hang() {
    let s = SafeSet::of(0..1_000);
    let first_three = seq::slice(seq::take(3, s.iter()));
    assert_eq!(first_three.len(), 3);
    // The producer notices the dropped receiver; the set stays usable.
    s.add(5_000);
    assert!(s.has(&5_000));
  }

  #[test]
  fn slice_round_trip_is_equal() {
    let s = SafeSet::of(["x", "y", "z"]);
    let back = SafeSet::of(s.slice());
    assert!(s.equal(&back));
  }

  #[test]
  fn clear_resets_len() {
    let s = SafeSet::of(0..10);
    s.clear();
    assert_eq!(s.len(), 0);
    assert!(!s.has(&3));
  }

  #[test]
  fn display_single_element() {
    assert_eq!(SafeSet::of([7]).to_string(), "{7}");
    assert_eq!(format!("{:?}", SafeSet::of(["q"])), "{\"q\"}");
  }
}
