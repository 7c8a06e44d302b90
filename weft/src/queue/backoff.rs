use std::thread;

const SPIN_ROUNDS: usize = 10;
const YIELD_ROUNDS: usize = 20;

/// Waits until `cond` holds: spins briefly, then yields, then parks.
///
/// The parking phase relies on whoever makes `cond` true calling `unpark`
/// on this thread afterwards.
pub(crate) fn adaptive_wait<F>(cond: F)
where
  F: Fn() -> bool,
{
  for _ in 0..SPIN_ROUNDS {
    if cond() {
      return;
    }
    std::hint::spin_loop();
  }

  for _ in 0..YIELD_ROUNDS {
    if cond() {
      return;
    }
    thread::yield_now();
  }

  while !cond() {
    thread::park();
  }
}
