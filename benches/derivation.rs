use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fairplay::fairness::{
    commitment_hash, crash_point, derive_uniform, mine_layout, shuffled_deck, slot_symbols, verify, Seed,
};

fn bench_derivation(c: &mut Criterion) {
    let seed = Seed::from_parts("a".repeat(64), "b".repeat(32), 1_700_000_000_000);

    c.bench_function("commitment_hash", |b| {
        b.iter(|| commitment_hash(black_box(seed.server_seed()), seed.client_seed(), 1_700_000_000_000))
    });
    c.bench_function("derive_uniform", |b| {
        let mut index = 0u64;
        b.iter(|| {
            index = index.wrapping_add(1);
            derive_uniform(&seed, black_box(index), 0, 51)
        })
    });
    c.bench_function("verify", |b| {
        b.iter(|| {
            verify(
                seed.server_seed(),
                seed.client_seed(),
                black_box("1700000000000"),
                seed.commitment_hash(),
            )
        })
    });
}

fn bench_generators(c: &mut Criterion) {
    let seed = Seed::from_parts("c".repeat(64), "d".repeat(32), 42);

    c.bench_function("crash_point", |b| b.iter(|| crash_point(black_box(&seed), 0.01)));
    c.bench_function("slot_symbols", |b| b.iter(|| slot_symbols(black_box(&seed))));
    c.bench_function("mine_layout_24", |b| b.iter(|| mine_layout(black_box(&seed), 24, 25)));
    c.bench_function("shuffled_deck", |b| b.iter(|| shuffled_deck(black_box(&seed))));
}

criterion_group!(benches, bench_derivation, bench_generators);
criterion_main!(benches);
