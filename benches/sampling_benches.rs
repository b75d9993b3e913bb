use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use RustedCalculus::calculus::{assemble, differentiate, parse, to_evaluator};
use RustedCalculus::numerical::plot_data::PlotOptions;
use RustedCalculus::numerical::sampler::sample;

fn bench_sample_rational(c: &mut Criterion) {
    let f = parse("x/(x**2-1)").unwrap();
    let evaluator = to_evaluator(&f);
    c.bench_function("sample x/(x**2-1), 1000 points", |b| {
        b.iter(|| sample(black_box(&evaluator), -10.0, 10.0, 1000))
    });
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse, differentiate, assemble");
    for text in ["x**2 - 4*x + 4", "sin(x) + cos(x)", "log(x)", "1/x"] {
        group.bench_function(text, |b| {
            b.iter(|| {
                let f = parse(black_box(text)).unwrap();
                let _ = differentiate(&f, 2);
                assemble(&f, -10.0, 10.0, &PlotOptions::default())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_sample_rational, bench_pipeline);
criterion_main!(benches);
