// Criterion benchmarks for Smart Match

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use smart_match::core::{enrich, SwipeSession};
use smart_match::models::Candidate;

const TAGS: [&str; 8] = ["hiking", "music", "research", "cooking", "chess", "film", "art history", "dance"];

fn create_candidate(id: usize) -> Candidate {
    Candidate::new(
        format!("user-{:08}", id),
        (id % 100) as f64 / 100.0,
        (0..id % 5).map(|i| TAGS[(id + i) % TAGS.len()].to_string()).collect(),
    )
    .with_explanation("Similar schedules and shared clubs")
}

fn bench_enrich(c: &mut Criterion) {
    let candidate = create_candidate(42);

    c.bench_function("enrich_single", |b| {
        b.iter(|| enrich(black_box(candidate.clone())));
    });
}

fn bench_session_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("session_batch");

    for size in [20, 100, 500].iter() {
        let candidates: Vec<Candidate> = (0..*size).map(create_candidate).collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), &candidates, |b, candidates| {
            b.iter(|| {
                let queue = candidates.iter().cloned().map(enrich).collect();
                let mut session = SwipeSession::new("bench-user", queue);
                while session.current().is_some() {
                    let _ = session.advance();
                }
                black_box(session.position())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_enrich, bench_session_batch);
criterion_main!(benches);
