//! Benchmarks for the observe hot path

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use settle_core::{DebounceHolder, Delay, ManualClock};
use std::time::Duration;

fn bench_observe(c: &mut Criterion) {
    let delay = Delay::default();

    c.bench_function("observe_unchanged", |b| {
        let clock = ManualClock::new();
        let mut holder = DebounceHolder::new(clock, "steady".to_string(), delay);
        let value = "steady".to_string();
        b.iter(|| black_box(holder.observe(black_box(value.clone()), delay)));
    });

    c.bench_function("observe_rearm", |b| {
        let clock = ManualClock::new();
        let mut holder = DebounceHolder::new(clock, 0u64, delay);
        let mut next = 0u64;
        b.iter(|| {
            next += 1;
            black_box(holder.observe(black_box(next), delay))
        });
    });

    c.bench_function("burst_then_settle", |b| {
        b.iter(|| {
            let clock = ManualClock::new();
            let mut holder = DebounceHolder::new(clock.clone(), 0u64, delay);
            for value in 1..=100u64 {
                holder.observe(value, delay);
                clock.advance(Duration::from_millis(10));
            }
            clock.advance(delay.as_duration());
            black_box(holder.settled())
        });
    });
}

criterion_group!(benches, bench_observe);
criterion_main!(benches);
