use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::thread;
use weft::seq::{self, Next};

#[test]
fn range_forms_agree_with_std() {
  assert_eq!(seq::slice(seq::range(&[10])), (0..10).collect::<Vec<_>>());
  assert_eq!(seq::slice(seq::range(&[3, 10])), (3..10).collect::<Vec<_>>());
  assert_eq!(seq::slice(seq::range(&[0, 10, 3])), vec![0, 3, 6, 9]);
  assert_eq!(seq::slice(seq::range(&[10, 0, -4])), vec![10, 6, 2]);
  assert!(seq::slice(seq::range(&[5, 5])).is_empty());
}

#[test]
fn range_stops_at_type_limit() {
  let tail = seq::slice(seq::range(&[250u8, 255, 10]));
  assert_eq!(tail, vec![250]);
  let near_max = seq::slice(seq::range(&[i64::MAX - 2, i64::MAX]));
  assert_eq!(near_max, vec![i64::MAX - 2, i64::MAX - 1]);
}

#[test]
fn iota_bounded_by_take_and_stop() {
  assert_eq!(seq::slice(seq::take(4, seq::iota(&[1.5f64, 0.5]))), vec![1.5, 2.0, 2.5, 3.0]);
  let below_ten = seq::stop(seq::iota(&[0u32]), |n| *n >= 10);
  assert_eq!(seq::slice(below_ten), (0..10).collect::<Vec<_>>());
}

#[test]
fn map_filter_reduce_chain() {
  let squares_of_evens = seq::map(seq::filter(seq::range(&[10]), |n| n % 2 == 0), |n| n * n);
  assert_eq!(seq::reduce(squares_of_evens, |acc: i32, n| acc + n), 4 + 16 + 36 + 64);
}

#[test]
fn fold_emits_running_totals() {
  let totals = seq::fold(seq::range(&[1, 5]), |acc: i32, n| acc + n);
  assert_eq!(seq::slice(totals), vec![1, 3, 6, 10]);
}

#[test]
fn zip_is_as_long_as_its_shortest_input() {
  let rows = seq::zip(vec![seq::range(&[3]), seq::iota(&[10]), seq::range(&[100, 105])]);
  assert_eq!(seq::slice(rows), vec![vec![0, 10, 100], vec![1, 11, 101], vec![2, 12, 102]]);
  assert!(seq::slice(seq::zip::<u8>(Vec::new())).is_empty());
}

#[test]
fn merge_concatenates() {
  let joined = seq::merge(vec![seq::range(&[2]), Next::empty(), seq::range(&[7, 9])]);
  assert_eq!(seq::slice(joined), vec![0, 1, 7, 8]);
}

#[test]
fn all_and_kv_drivers() {
  assert!(seq::all(seq::map(seq::range(&[5]), |n| n < 5)));
  assert!(!seq::all(seq::map(seq::range(&[5]), |n| n != 3)));
  assert!(!seq::all(Next::empty()));

  let squares = seq::kv(seq::map(seq::range(&[4]), |n| (n, n * n)));
  assert_eq!(squares.len(), 4);
  assert_eq!(squares[&3], 9);
}

#[test]
fn exhausted_sequence_stays_exhausted() {
  let mut next = seq::range(&[1]);
  assert_eq!(next.pull(), Some(0));
  for _ in 0..3 {
    assert_eq!(next.pull(), None);
  }
}

#[test]
fn locked_sequence_shares_one_cursor_between_threads() {
  let shared = Arc::new(seq::lock(seq::range(&[1_000u32])));
  let workers: Vec<_> = (0..4)
    .map(|_| {
      let shared = Arc::clone(&shared);
      thread::spawn(move || {
        let mut mine = Vec::new();
        while let Some(n) = shared.pull() {
          mine.push(n);
        }
        mine
      })
    })
    .collect();
  let mut all: Vec<u32> = workers.into_iter().flat_map(|w| w.join().unwrap()).collect();
  all.sort_unstable();
  assert_eq!(all, (0..1_000).collect::<Vec<_>>());
}

#[test]
fn next_is_a_std_iterator() {
  let collected: String = seq::map(seq::range(&[3u8]), |n| (b'a' + n) as char).collect();
  assert_eq!(collected, "abc");
}
