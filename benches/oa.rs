use criterion::{criterion_group, criterion_main, Criterion};
use oalhs::oa::{AddelmanKempthorne, Bose, BoseBush, Bush, Construction};
use oalhs::{create_oalhs, GaloisField, RandomStream};

fn criterion_gf(c: &mut Criterion) {
    let mut group = c.benchmark_group("gf");
    for q in [16, 81, 997] {
        group.bench_function(format!("gf-{q}"), |b| {
            b.iter(|| std::hint::black_box(GaloisField::new(q)))
        });
    }
    group.finish();
}

fn criterion_oa(c: &mut Criterion) {
    let mut group = c.benchmark_group("oa");
    group.sample_size(10);
    let constructions: Vec<Box<dyn Construction>> = vec![
        Box::new(Bose::try_new(13).unwrap()),
        Box::new(Bush::try_new(7, 3).unwrap()),
        Box::new(BoseBush::try_new(8).unwrap()),
        Box::new(AddelmanKempthorne::try_new(9).unwrap()),
    ];
    for construction in &constructions {
        let factors = construction.max_factors();
        group.bench_function(
            format!("{}-{}-runs", construction.name(), construction.runs()),
            |b| b.iter(|| std::hint::black_box(construction.construct(factors))),
        );
    }
    group.bench_function("oalhs-50-points-6-dim", |b| {
        b.iter(|| {
            let mut rng = RandomStream::from_seed(42);
            std::hint::black_box(create_oalhs(50, 6, true, false, &mut rng))
        })
    });
    group.finish();
}

criterion_group!(benches, criterion_gf, criterion_oa);
criterion_main!(benches);
