//! FILENAME: band-engine/benches/band_processing.rs
//! Throughput of a full run over grouped record streams.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use band_engine::report_model::{
    AggregationKind, Band, ExpressionRef, Record, ReportDefinition, VariableDefinition,
    VariableScope,
};
use band_engine::{run, AlwaysFits, FieldEvaluator, NoChildRows};

fn grouped_report(levels: usize) -> ReportDefinition {
    let mut definition = ReportDefinition::new("bench");
    for level in 0..levels {
        let name = format!("k{}", level);
        definition = definition
            .with_group(&name, ExpressionRef::new(&name))
            .with_band(Band::group_header(level))
            .with_band(Band::group_footer(level))
            .with_variable(
                VariableDefinition::new(&format!("sum{}", level), VariableScope::Group(level), AggregationKind::Sum)
                    .with_expression(ExpressionRef::new("amt")),
            );
    }
    definition
        .with_band(Band::detail(0))
        .with_variable(
            VariableDefinition::new("avg", VariableScope::Report, AggregationKind::Avg)
                .with_expression(ExpressionRef::new("amt")),
        )
}

fn records(count: usize, levels: usize) -> Vec<Record> {
    (0..count)
        .map(|i| {
            let mut record = Record::new().with("amt", (i % 100) as f64);
            // Each deeper level changes ten times as often
            for level in 0..levels {
                let span = 10usize.pow((levels - level) as u32);
                record.set(&format!("k{}", level), (i / span) as f64);
            }
            record
        })
        .collect()
}

fn bench_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("run");
    for levels in [0usize, 2, 4] {
        let definition = grouped_report(levels);
        let data = records(10_000, levels);
        group.throughput(Throughput::Elements(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("levels", levels), &data, |b, data| {
            b.iter(|| {
                let mut oracle = AlwaysFits;
                let processor = run(&definition, data.clone(), &NoChildRows, &FieldEvaluator, &mut oracle)
                    .expect("valid definition");
                let mut events = 0u64;
                for event in processor {
                    black_box(event.expect("run succeeds"));
                    events += 1;
                }
                events
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_run);
criterion_main!(benches);
