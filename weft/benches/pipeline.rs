use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::thread;

use weft::set::{SafeSet, Set, UnsafeSet};
use weft::{bridge, queue, seq};

const ITEMS: usize = 10_000;

// --- Queues ---

fn bench_queue_throughput(c: &mut Criterion) {
  let mut group = c.benchmark_group("queue_spsc");
  group.throughput(Throughput::Elements(ITEMS as u64));
  for capacity in [0usize, 1, 64, 1024] {
    group.bench_with_input(BenchmarkId::from_parameter(capacity), &capacity, |b, &cap| {
      b.iter(|| {
        let (tx, rx) = queue::bounded::<usize>(cap);
        let producer = thread::spawn(move || {
          for i in 0..ITEMS {
            tx.send(i).unwrap();
          }
        });
        let received = rx.iter().count();
        producer.join().unwrap();
        assert_eq!(received, ITEMS);
      });
    });
  }
  group.finish();
}

// --- Pipelines ---

fn bench_merge_split(c: &mut Criterion) {
  let mut group = c.benchmark_group("pipeline");
  group.throughput(Throughput::Elements(ITEMS as u64));
  group.sample_size(20);
  group.bench_function("merge4_split2", |b| {
    b.iter(|| {
      let inputs: Vec<_> = (0..4)
        .map(|_| bridge::to_queue(seq::range(&[ITEMS / 4]), 64))
        .collect();
      let (left, right) = bridge::split(bridge::merge(inputs));
      let other = thread::spawn(move || right.iter().count());
      let total = left.iter().count() + other.join().unwrap();
      assert_eq!(total, ITEMS);
    });
  });
  group.finish();
}

// --- Sets ---

fn bench_set_insert(c: &mut Criterion) {
  let mut group = c.benchmark_group("set_insert");
  group.throughput(Throughput::Elements(ITEMS as u64));
  group.bench_function("unsafe", |b| {
    b.iter(|| {
      let set = UnsafeSet::new();
      for i in 0..ITEMS {
        set.add(i);
      }
      set.len()
    });
  });
  group.bench_function("safe", |b| {
    b.iter(|| {
      let set = SafeSet::new();
      for i in 0..ITEMS {
        set.add(i);
      }
      set.len()
    });
  });
  group.finish();
}

criterion_group!(benches, bench_queue_throughput, bench_merge_split, bench_set_insert);
criterion_main!(benches);
