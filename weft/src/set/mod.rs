//! A set abstraction with a single-threaded and a thread-safe variant.
//!
//! Both [`UnsafeSet`] and [`SafeSet`] implement the object-safe [`Set`]
//! trait, and the set algebra in [`algebra`] is written once against that
//! trait. The variant is picked explicitly at the call site, either with a
//! [`Variant`] passed to the factory functions here or by naming the concrete
//! type.
//!
//! | Variant  | Storage                          | Sharing                |
//! |----------|----------------------------------|------------------------|
//! | `Unsafe` | `RefCell<HashSet<K>>`            | one thread (`!Sync`)   |
//! | `Safe`   | `papaya::HashMap<K, ()>` + count | any number of threads  |
//!
//! Operations producing a new set (`union`, `intersect`, `difference`,
//! `clone_set`) return a set of the same variant as `self`.

pub mod algebra;
mod safe;
mod unsafe_set;

pub use safe::SafeSet;
pub use unsafe_set::UnsafeSet;

use crate::seq::{self, Next};

use std::fmt;
use std::hash::Hash;

/// Bounds every set key satisfies.
pub trait Key: Eq + Hash + Clone + Send + Sync + 'static {}

impl<K> Key for K where K: Eq + Hash + Clone + Send + Sync + 'static {}

/// Selects the backing representation of a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
  /// Concurrent map plus an atomic element counter.
  Safe,
  /// Plain hash set, confined to one thread.
  Unsafe,
}

/// The set capability shared by both variants.
///
/// All methods take `&self`; [`UnsafeSet`] uses interior mutability and is
/// therefore not `Sync`, which keeps it on one thread.
pub trait Set<K: Key>: Send {
  /// Inserts `key`. Adding a present key does nothing.
  fn add(&self, key: K);

  /// Inserts every element of `other`.
  fn adds(&self, other: &dyn Set<K>) {
    other.for_each(&mut |k| {
      self.add(k.clone());
      true
    });
  }

  /// Removes `key` if present.
  fn del(&self, key: &K);

  /// Removes and returns an arbitrary element, or `None` when empty.
  fn pop(&self) -> Option<K>;

  /// Like [`pop`](Set::pop), but an empty set yields `K::default()`, which is
  /// indistinguishable from popping a real default-valued key.
  fn pop_or_default(&self) -> K
  where
    K: Default,
  {
    self.pop().unwrap_or_default()
  }

  /// Removes every element.
  fn clear(&self);

  /// Returns `true` if `key` is present.
  fn has(&self, key: &K) -> bool;

  /// Number of elements.
  fn len(&self) -> usize;

  fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// The backing representation.
  fn variant(&self) -> Variant;

  /// Returns `true` for the thread-safe variant.
  fn is_safe(&self) -> bool {
    self.variant() == Variant::Safe
  }

  /// Visits elements in unspecified order until `visitor` returns `false`.
  fn for_each(&self, visitor: &mut dyn FnMut(&K) -> bool);

  /// A lazy sequence over the elements.
  fn iter(&self) -> Next<K>;

  /// Copies the elements into a `Vec`, in unspecified order.
  fn slice(&self) -> Vec<K> {
    let mut out = Vec::with_capacity(self.len());
    self.for_each(&mut |k| {
      out.push(k.clone());
      true
    });
    out
  }

  /// An independent copy of the same variant.
  fn clone_set(&self) -> Box<dyn Set<K>> {
    let out = with_capacity(self.variant(), self.len());
    self.for_each(&mut |k| {
      out.add(k.clone());
      true
    });
    out
  }

  /// Same elements as `other`.
  fn equal(&self, other: &dyn Set<K>) -> bool {
    algebra::equal(self, other)
  }

  /// Elements of either set.
  fn union(&self, other: &dyn Set<K>) -> Box<dyn Set<K>> {
    algebra::union(self, other)
  }

  /// Elements of both sets.
  fn intersect(&self, other: &dyn Set<K>) -> Box<dyn Set<K>> {
    algebra::intersect(self, other)
  }

  /// Elements of `self` missing from `other`.
  fn difference(&self, other: &dyn Set<K>) -> Box<dyn Set<K>> {
    algebra::difference(self, other)
  }

  fn is_subset(&self, other: &dyn Set<K>) -> bool {
    algebra::is_subset(self, other)
  }

  fn is_superset(&self, other: &dyn Set<K>) -> bool {
    algebra::is_subset(other, self)
  }

  fn is_proper_subset(&self, other: &dyn Set<K>) -> bool {
    self.is_subset(other) && self.len() != other.len()
  }

  fn is_proper_superset(&self, other: &dyn Set<K>) -> bool {
    self.is_superset(other) && self.len() != other.len()
  }
}

/// An empty set of the given variant.
pub fn empty<K: Key>(variant: Variant) -> Box<dyn Set<K>> {
  with_capacity(variant, 0)
}

/// An empty set of the given variant, sized for `capacity` elements.
pub fn with_capacity<K: Key>(variant: Variant, capacity: usize) -> Box<dyn Set<K>> {
  match variant {
    Variant::Safe => Box::new(SafeSet::with_capacity(capacity)),
    Variant::Unsafe => Box::new(UnsafeSet::with_capacity(capacity)),
  }
}

/// A set of the given variant holding `items`.
pub fn of<K: Key>(variant: Variant, items: impl IntoIterator<Item = K>) -> Box<dyn Set<K>> {
  match variant {
    Variant::Safe => Box::new(SafeSet::of(items)),
    Variant::Unsafe => Box::new(UnsafeSet::of(items)),
  }
}

/// A set of the given variant holding everything `next` yields.
pub fn from_next<K: Key>(variant: Variant, next: Next<K>) -> Box<dyn Set<K>> {
  let out = empty(variant);
  seq::for_each(next, |k| {
    out.add(k);
    true
  });
  out
}

/// Writes `{a, b, c}` in iteration order.
pub(crate) fn render<K, S>(set: &S, f: &mut fmt::Formatter<'_>) -> fmt::Result
where
  K: Key + fmt::Display,
  S: Set<K> + ?Sized,
{
  let items = seq::slice(seq::map(set.iter(), |k| k.to_string()));
  write!(f, "{{{}}}", items.join(", "))
}
