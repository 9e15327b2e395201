use criterion::{criterion_group, criterion_main, Criterion};

use fathom_engine::Session;

fn bench_full_drain(c: &mut Criterion) {
    c.bench_function("drain_96x72_zoom200", |b| {
        b.iter(|| {
            let mut session = Session::new(96, 72).unwrap();
            session.settle();
            session.frame().colors.len()
        })
    });
}

fn bench_deep_zoom_drain(c: &mut Criterion) {
    c.bench_function("drain_64x48_8_clicks", |b| {
        b.iter(|| {
            let mut session = Session::new(64, 48).unwrap();
            for _ in 0..8 {
                session.pan_click(32.0, 24.0).unwrap();
            }
            session.settle();
            session.frame().colors.len()
        })
    });
}

criterion_group!(benches, bench_full_drain, bench_deep_zoom_drain);
criterion_main!(benches);
