use criterion::{criterion_group, criterion_main, Criterion};
use sim_core::{RegistrationData, TierId};
use sim_runtime::SavingsEngine;

fn bench_advance_week(c: &mut Criterion) {
    let mut engine = SavingsEngine::new();
    for i in 0..12 {
        let tier = TierId::ALL[i % 3];
        engine
            .register(&RegistrationData {
                name: format!("Member {}", i + 1),
                tier,
                amount: tier.contribution_amount(),
            })
            .unwrap();
    }
    c.bench_function("advance_week_full_roster", |b| {
        b.iter(|| {
            let _ = engine.advance_week();
        })
    });
}

criterion_group!(benches, bench_advance_week);
criterion_main!(benches);
