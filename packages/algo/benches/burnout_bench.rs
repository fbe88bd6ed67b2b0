//! Benchmark suite for utbk-burnout
//!
//! Run with: cargo bench

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use utbk_burnout::{AnswerEvent, BurnoutCalculator, SessionContext};

fn tryout_session(n: usize) -> Vec<AnswerEvent> {
    let start = Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap();
    (0..n)
        .map(|i| {
            let time_spent = 20.0 + (i % 7) as f64 * 3.5 + i as f64 * 0.2;
            AnswerEvent::new(time_spent, i % 3 != 0, start + Duration::seconds(30 * i as i64))
        })
        .collect()
}

fn bench_score(c: &mut Criterion) {
    let calculator = BurnoutCalculator::default();
    let context = SessionContext::with_skipped(4);

    let short = tryout_session(20);
    c.bench_function("score 20 answers", |b| {
        b.iter(|| calculator.score(black_box(&short), black_box(&context)))
    });

    // Full-length tryout block
    let full = tryout_session(160);
    c.bench_function("score 160 answers", |b| {
        b.iter(|| calculator.score(black_box(&full), black_box(&context)))
    });
}

criterion_group!(benches, bench_score);
criterion_main!(benches);
