use criterion::{criterion_group, criterion_main, Criterion};
use lendhub_core::compute_loan;
use lendhub_model::{Amount, Rate, TermMonths};
use rust_decimal::Decimal;
use std::hint::black_box;

fn bench_compute_loan(c: &mut Criterion) {
    let amount = Amount::parse(Decimal::new(10_000_00, 2)).expect("amount");
    let term = TermMonths::parse(12).expect("term");
    let rate = Rate::parse(Decimal::new(290, 4)).expect("rate");
    c.bench_function("compute_loan_flat_rate", |b| {
        b.iter(|| compute_loan(black_box(amount), black_box(term), black_box(rate)))
    });
}

criterion_group!(benches, bench_compute_loan);
criterion_main!(benches);
