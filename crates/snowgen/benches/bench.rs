use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use snowgen::{
    CUSTOM_EPOCH, Configuration, Decoder, Generator, IdGenStatus, MonotonicClock, TimeSource,
};
use std::{
    sync::{Arc, Barrier},
    thread::scope,
    time::{Duration, Instant},
};

#[derive(Debug)]
struct FixedMockTime {
    millis: u64,
}

impl TimeSource for FixedMockTime {
    fn current_millis(&self) -> u64 {
        self.millis
    }
}

// Number of IDs generated per benchmark iteration (per-thread for
// multi-threaded).
const TOTAL_IDS: usize = 4096;

fn config() -> Configuration {
    Configuration::default().with_epoch(CUSTOM_EPOCH)
}

/// Hot path: a fixed clock and a full 12-bit sequence, so every poll is
/// `Ready` and nothing ever waits.
fn bench_poll_fixed_clock(c: &mut Criterion) {
    let mut group = c.benchmark_group("poll/fixed_clock");
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    let now = CUSTOM_EPOCH.as_millis() as u64 + 1;
    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();
            for _ in 0..iters {
                let generator =
                    Generator::with_clock(&config(), FixedMockTime { millis: now }).unwrap();
                for _ in 0..TOTAL_IDS {
                    match generator.try_poll_id().unwrap() {
                        IdGenStatus::Ready { id } => {
                            black_box(id);
                        }
                        IdGenStatus::Pending { .. } => unreachable!(),
                    }
                }
            }
            start.elapsed()
        });
    });

    group.finish();
}

/// Realistic single-threaded generation that may wait on the clock.
fn bench_next_id(c: &mut Criterion, group_name: &str, generator: &Generator<impl TimeSource>) {
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        b.iter(|| {
            for _ in 0..TOTAL_IDS {
                black_box(generator.next_id().unwrap());
            }
        });
    });

    group.finish();
}

/// All threads share one generator, so every call contends for its lock.
fn bench_next_id_contended(c: &mut Criterion) {
    let threads = num_cpus::get().max(2);
    let mut group = c.benchmark_group("next_id/contended");
    group.throughput(Throughput::Elements((TOTAL_IDS * threads) as u64));

    group.bench_function(format!("threads/{threads}/elems/{TOTAL_IDS}"), |b| {
        b.iter_custom(|iters| {
            let mut total = Duration::ZERO;
            for _ in 0..iters {
                let generator = Generator::new(&config()).unwrap();
                let barrier = Arc::new(Barrier::new(threads + 1));

                let start = scope(|s| {
                    for _ in 0..threads {
                        let barrier = Arc::clone(&barrier);
                        let generator = &generator;
                        s.spawn(move || {
                            barrier.wait();
                            for _ in 0..TOTAL_IDS {
                                black_box(generator.next_id().unwrap());
                            }
                        });
                    }
                    barrier.wait();
                    Instant::now()
                });
                total += start.elapsed();
            }
            total
        });
    });

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let decoder = Decoder::new(&config()).unwrap();
    let generator = Generator::new(&config()).unwrap();
    let ids: Vec<i64> = (0..TOTAL_IDS).map(|_| generator.next_id().unwrap()).collect();

    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));
    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        b.iter(|| {
            for &id in &ids {
                black_box(decoder.decode(black_box(id)));
            }
        });
    });
    group.finish();
}

fn benches(c: &mut Criterion) {
    bench_poll_fixed_clock(c);

    let system = Generator::new(&config()).unwrap();
    bench_next_id(c, "next_id/system_clock", &system);

    let monotonic = Generator::with_clock(&config(), MonotonicClock::new()).unwrap();
    bench_next_id(c, "next_id/monotonic_clock", &monotonic);

    bench_next_id_contended(c);
    bench_decode(c);
}

criterion_group!(all, benches);
criterion_main!(all);
