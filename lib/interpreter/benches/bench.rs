use criterion::{black_box, criterion_group, criterion_main, Criterion};
use interpreter::{DefaultResolver, Expression, Variables};
use parser::ParseFlags;

const SOURCE: &str = r#"
    ex :gain ? db(:gain) * max(:left, :right, 0.5) : (:level[2] idiv 3) . ' dB' x 2
"#;

pub fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("parse", |b| {
        b.iter(|| Expression::parse(black_box(SOURCE), ParseFlags::NONE).unwrap())
    });

    let expression = Expression::parse(SOURCE, ParseFlags::NONE).unwrap();
    let mut vars = Variables::with_resolver(&DefaultResolver);
    vars.set_float("gain", -6.0);
    vars.set_float("left", 0.25);
    vars.set_int("right", 1);
    vars.set_int("level_2", 12);

    c.bench_function("evaluate", |b| b.iter(|| expression.evaluate(black_box(&vars)).unwrap()));

    vars.unset("gain");
    c.bench_function("evaluate other branch", |b| {
        b.iter(|| expression.evaluate(black_box(&vars)).unwrap())
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
