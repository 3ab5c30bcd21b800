//! Compare compiling through the per-template cache against rendering every time.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sqlbond::exql::{
    Columns, Layouts, OrderBy, SortColumn, Statement, StatementKind, Table, Template,
    TemplateOptions, Where,
};

fn layouts() -> Layouts {
    Layouts::new().identifier_quote("\"").layout(
        StatementKind::Select,
        "SELECT {^columns}*{/columns}{columns} FROM {table}{#where} WHERE {where}{/where}\
         {#order_by} ORDER BY {order_by}{/order_by}{#limit} LIMIT {limit}{/limit}",
    )
}

/// SELECT with `n` columns and `n` bound conditions.
fn build_select(n: usize) -> Statement {
    let names: Vec<String> = (0..n).map(|i| format!("col{i}")).collect();
    Statement::select()
        .columns(Columns::new(names.clone()))
        .table(Table::new("t"))
        .where_clause(Where::bind_eq(names))
        .order_by(OrderBy::new([SortColumn::asc("col0")]))
        .limit(100)
}

fn bench_compile(c: &mut Criterion) {
    let cached = Template::new(layouts()).expect("valid layouts");
    let uncached = Template::with_options(layouts(), TemplateOptions::new().disable_cache())
        .expect("valid layouts");

    let mut group = c.benchmark_group("compile");
    for n in [1, 8, 32] {
        let stmt = build_select(n);
        group.bench_with_input(BenchmarkId::new("cached", n), &stmt, |b, stmt| {
            b.iter(|| black_box(stmt.compile(&cached)))
        });
        group.bench_with_input(BenchmarkId::new("uncached", n), &stmt, |b, stmt| {
            b.iter(|| black_box(stmt.compile(&uncached)))
        });
    }
    group.finish();
}

fn bench_hash(c: &mut Criterion) {
    let mut group = c.benchmark_group("hash");
    for n in [1, 8, 32] {
        group.bench_with_input(BenchmarkId::new("fresh_statement", n), &n, |b, &n| {
            b.iter(|| black_box(build_select(n).hash()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_compile, bench_hash);
criterion_main!(benches);
