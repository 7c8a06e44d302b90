//! Arithmetic progressions.

use super::Next;

use num_traits::{Num, PrimInt};

/// A finite progression of integers, following Python's `range`:
///
/// - `range(&[stop])` yields `0..stop`
/// - `range(&[start, stop])` yields `start..stop`
/// - `range(&[start, stop, step])` yields `start, start + step, ...` while
///   below `stop` (or above it, for a negative step)
///
/// Arguments past the third are ignored.
///
/// # Panics
///
/// Panics if `bounds` is empty or the step is zero.
pub fn range<N>(bounds: &[N]) -> Next<N>
where
  N: PrimInt + Send + 'static,
{
  let (start, stop, step) = match *bounds {
    [] => panic!("range requires at least one argument"),
    [stop] => (N::zero(), stop, N::one()),
    [start, stop] => (start, stop, N::one()),
    [start, stop, step, ..] => (start, stop, step),
  };
  assert!(step != N::zero(), "range step must not be zero");

  let descending = step < N::zero();
  let mut current = Some(start);
  Next::new(move || {
    let value = current?;
    let in_bounds = if descending { value > stop } else { value < stop };
    if !in_bounds {
      current = None;
      return None;
    }
    // Stepping past the numeric limits ends the range.
    current = value.checked_add(&step);
    Some(value)
  })
}

/// An infinite arithmetic progression:
///
/// - `iota(&[])` yields `0, 1, 2, ...`
/// - `iota(&[start])` yields `start, start + 1, ...`
/// - `iota(&[start, step])` yields `start, start + step, ...`
///
/// The cursor never reports exhaustion; bound it with
/// [`take`](super::take) or [`stop`](super::stop).
pub fn iota<N>(args: &[N]) -> Next<N>
where
  N: Num + Copy + Send + 'static,
{
  let (start, step) = match *args {
    [] => (N::zero(), N::one()),
    [start] => (start, N::one()),
    [start, step, ..] => (start, step),
  };

  let mut current = start;
  Next::new(move || {
    let value = current;
    current = current + step;
    Some(value)
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::seq::{slice, take};

  #[test]
  fn range_one_two_three_args() {
    assert_eq!(slice(range(&[5])), vec![0, 1, 2, 3, 4]);
    assert_eq!(slice(range(&[2, 8])), vec![2, 3, 4, 5, 6, 7]);
    assert_eq!(slice(range(&[0, 10, 3])), vec![0, 3, 6, 9]);
  }

  #[test]
  fn range_empty_when_start_reaches_stop() {
    assert!(slice(range(&[0i32])).is_empty());
    assert!(slice(range(&[7, 3])).is_empty());
  }

  #[test]
  fn range_counts_down_with_negative_step() {
    assert_eq!(slice(range(&[10, 0, -3])), vec![10, 7, 4, 1]);
  }

  #[test]
  fn range_stops_at_type_limit() {
    assert_eq!(slice(range(&[250u8, 255, 4])), vec![250, 254]);
    assert_eq!(slice(range(&[u8::MAX - 1, u8::MAX])), vec![254]);
  }

  #[test]
  fn range_stays_exhausted() {
    let mut r = range(&[1u16]);
    assert_eq!(r.pull(), Some(0));
    assert_eq!(r.pull(), None);
    assert_eq!(r.pull(), None);
  }

  #[test]
  #[should_panic(expected = "at least one argument")]
  fn range_without_arguments_panics() {
    let _ = range::<i32>(&[]);
  }

  #[test]
  #[should_panic(expected = "step must not be zero")]
  fn range_zero_step_panics() {
    let _ = range(&[0, 10, 0]);
  }

  #[test]
  fn iota_defaults_and_never_ends() {
    let mut it = iota::<u64>(&[]);
    assert_eq!(it.pull(), Some(0));
    assert_eq!(it.pull(), Some(1));
    assert_eq!(it.pull(), Some(2));
    for _ in 0..10_000 {
      assert!(it.pull().is_some());
    }
  }

  #[test]
  fn iota_start_and_step() {
    assert_eq!(slice(take(3, iota(&[10]))), vec![10, 11, 12]);
    assert_eq!(slice(take(3, iota(&[5, 3]))), vec![5, 8, 11]);
    assert_eq!(slice(take(3, iota(&[0.5f64, 0.25]))), vec![0.5, 0.75, 1.0]);
  }
}
