//! Set algebra over any two [`Set`]s, regardless of variant.
//!
//! Results are materialized as a new set with the variant of the first
//! operand.

use super::{with_capacity, Key, Set};

fn copy_into<K, S>(src: &S, dst: &dyn Set<K>)
where
  K: Key,
  S: Set<K> + ?Sized,
{
  src.for_each(&mut |k| {
    dst.add(k.clone());
    true
  });
}

/// `true` if every element of `a` is in `b`.
fn contained<K, A, B>(a: &A, b: &B) -> bool
where
  K: Key,
  A: Set<K> + ?Sized,
  B: Set<K> + ?Sized,
{
  let mut all_present = true;
  a.for_each(&mut |k| {
    all_present = b.has(k);
    all_present
  });
  all_present
}

/// Adds to `out` every element of `small` also present in `large`.
fn keep_common<K, S, L>(small: &S, large: &L, out: &dyn Set<K>)
where
  K: Key,
  S: Set<K> + ?Sized,
  L: Set<K> + ?Sized,
{
  small.for_each(&mut |k| {
    if large.has(k) {
      out.add(k.clone());
    }
    true
  });
}

/// Every element of `a` followed by every element of `b`.
pub fn union<K, A, B>(a: &A, b: &B) -> Box<dyn Set<K>>
where
  K: Key,
  A: Set<K> + ?Sized,
  B: Set<K> + ?Sized,
{
  let out = with_capacity(a.variant(), a.len().max(b.len()));
  copy_into(a, &*out);
  copy_into(b, &*out);
  out
}

/// Elements present in both. Walks the smaller operand and probes the larger,
/// so the cost is `O(min(|a|, |b|))` lookups.
pub fn intersect<K, A, B>(a: &A, b: &B) -> Box<dyn Set<K>>
where
  K: Key,
  A: Set<K> + ?Sized,
  B: Set<K> + ?Sized,
{
  let out = with_capacity(a.variant(), a.len().min(b.len()));
  if a.len() < b.len() {
    keep_common(a, b, &*out);
  } else {
    keep_common(b, a, &*out);
  }
  out
}

/// Elements of `a` with no match in `b`.
pub fn difference<K, A, B>(a: &A, b: &B) -> Box<dyn Set<K>>
where
  K: Key,
  A: Set<K> + ?Sized,
  B: Set<K> + ?Sized,
{
  let out = with_capacity(a.variant(), 0);
  a.for_each(&mut |k| {
    if !b.has(k) {
      out.add(k.clone());
    }
    true
  });
  out
}

/// `true` if every element of `a` is in `b`. A larger `a` fails without
/// probing.
pub fn is_subset<K, A, B>(a: &A, b: &B) -> bool
where
  K: Key,
  A: Set<K> + ?Sized,
  B: Set<K> + ?Sized,
{
  a.len() <= b.len() && contained(a, b)
}

/// `true` if both hold the same elements. With equal lengths, `a` being
/// contained in `b` rules out extra elements in `b`.
pub fn equal<K, A, B>(a: &A, b: &B) -> bool
where
  K: Key,
  A: Set<K> + ?Sized,
  B: Set<K> + ?Sized,
{
  a.len() == b.len() && contained(a, b)
}
