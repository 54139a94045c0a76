use blumen::flower::Flower;
use blumen::select::next_card;
use criterion::{Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::hint::black_box;

fn bench_next_card(c: &mut Criterion) {
    let deck: Vec<Flower> = (0..10_000)
        .map(|i| {
            let mut flower = Flower::new(
                format!("flower-{i}"),
                format!("Flora {i}"),
                "Asteraceae",
                format!("images/{i}.jpg"),
            );
            flower.correct_count = (i % 4) as u32;
            flower
        })
        .collect();
    let mut rng = StdRng::seed_from_u64(0);

    c.bench_function("next_card", |b| {
        b.iter(|| {
            let drawn = next_card(black_box(&deck), &mut rng);
            black_box(drawn);
        });
    });
}

criterion_group!(benches, bench_next_card);
criterion_main!(benches);
