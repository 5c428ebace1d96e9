use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use docsql::{Dialect, Field, builder};

fn bench_select_by_field(c: &mut Criterion) {
    let mut group = c.benchmark_group("builder/select_by_field");

    let field = Field::between("NumValue", 10, 20).unwrap();
    for dialect in [Dialect::Postgres, Dialect::Sqlite] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{dialect}")),
            &dialect,
            |b, &dialect| {
                b.iter(|| black_box(builder::select_by_field(dialect, "people", &field).unwrap()));
            },
        );
    }

    group.finish();
}

fn bench_in_list_expansion(c: &mut Criterion) {
    let mut group = c.benchmark_group("builder/in_list");

    for n in [1, 10, 100] {
        let values: Vec<i64> = (0..n).collect();
        let field = Field::in_list("NumValue", values).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(n), &field, |b, field| {
            b.iter(|| black_box(builder::where_by_field(Dialect::Postgres, field, 0).unwrap()));
        });
    }

    group.finish();
}

fn bench_save(c: &mut Criterion) {
    let mut group = c.benchmark_group("builder/save");

    for dialect in [Dialect::Postgres, Dialect::Sqlite] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{dialect}")),
            &dialect,
            |b, &dialect| {
                b.iter(|| black_box(builder::save(dialect, "people", "Id").unwrap()));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_select_by_field, bench_in_list_expansion, bench_save);
criterion_main!(benches);
