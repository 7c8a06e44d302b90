use super::{render, Key, Set, Variant};
use crate::seq::Next;

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;

/// A set confined to one thread.
///
/// It may be moved between threads but not shared: the `RefCell` makes it
/// `!Sync`. Mutating the set from inside its own [`for_each`](Set::for_each)
/// visitor panics on the borrow.
pub struct UnsafeSet<K> {
  items: RefCell<HashSet<K>>,
}

impl<K: Key> UnsafeSet<K> {
  pub fn new() -> Self {
    Self::with_capacity(0)
  }

  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      items: RefCell::new(HashSet::with_capacity(capacity)),
    }
  }

  /// A set holding `items`, duplicates collapsed.
  pub fn of(items: impl IntoIterator<Item = K>) -> Self {
    Self {
      items: RefCell::new(items.into_iter().collect()),
    }
  }

  /// Unwraps the backing `HashSet`.
  pub fn into_inner(self) -> HashSet<K> {
    self.items.into_inner()
  }
}

impl<K: Key> Set<K> for UnsafeSet<K> {
  fn add(&self, key: K) {
    self.items.borrow_mut().insert(key);
  }

  /// Copies `other` out first, so `other` may be this set itself.
  fn adds(&self, other: &dyn Set<K>) {
    let incoming = other.slice();
    self.items.borrow_mut().extend(incoming);
  }

  fn del(&self, key: &K) {
    self.items.borrow_mut().remove(key);
  }

  fn pop(&self) -> Option<K> {
    let mut items = self.items.borrow_mut();
    let key = items.iter().next().cloned()?;
    items.remove(&key);
    Some(key)
  }

  fn clear(&self) {
    self.items.borrow_mut().clear();
  }

  fn has(&self, key: &K) -> bool {
    self.items.borrow().contains(key)
  }

  fn len(&self) -> usize {
    self.items.borrow().len()
  }

  fn variant(&self) -> Variant {
    Variant::Unsafe
  }

  fn for_each(&self, visitor: &mut dyn FnMut(&K) -> bool) {
    for key in self.items.borrow().iter() {
      if !visitor(key) {
        break;
      }
    }
  }

  /// A snapshot of the current elements; later mutation is not observed.
  fn iter(&self) -> Next<K> {
    Next::from_iter(self.slice())
  }
}

impl<K: Key> Default for UnsafeSet<K> {
  fn default() -> Self {
    Self::new()
  }
}

impl<K: Key> FromIterator<K> for UnsafeSet<K> {
  fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
    Self::of(iter)
  }
}

impl<K: Key> From<HashSet<K>> for UnsafeSet<K> {
  fn from(items: HashSet<K>) -> Self {
    Self {
      items: RefCell::new(items),
    }
  }
}

impl<K: Key + fmt::Debug> fmt::Debug for UnsafeSet<K> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_set().entries(self.items.borrow().iter()).finish()
  }
}

impl<K: Key + fmt::Display> fmt::Display for UnsafeSet<K> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    render(self, f)
  }
}
