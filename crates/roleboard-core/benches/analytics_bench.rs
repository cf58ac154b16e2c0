//! Benchmarks for ingestion and the aggregation engine
//!
//! Targets:
//! - parse(10k rows) → <20ms
//! - compute_monthly_trends(10k records) → <5ms
//! - paginate_logs(10k records) → <10ms

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use roleboard_core::analytics::{
    compute_aggregates, compute_monthly_trends, compute_rankings, paginate_logs, MIN_TREND_MONTHS,
};
use roleboard_core::models::GroupBy;
use roleboard_core::parsers::TrainingCsvParser;

/// Generate a training CSV with `rows` data rows over 12 months
fn generate_csv(rows: usize) -> String {
    let mut text =
        String::from("date,org,account,group,player,category,level,lesson,score,speechTime,playTime\n");
    for i in 0..rows {
        text.push_str(&format!(
            "2024-{:02}-{:02} 10:{:02}:00,Org{},Acc{},G{},player-{},Cat{},{},Lesson{},{},{}.5,{}\n",
            (i % 12) + 1,
            (i % 28) + 1,
            i % 60,
            i % 3,
            i % 5,
            i % 7,
            i % 50,
            i % 4,
            (i % 3) + 1,
            i % 20,
            40 + i % 60,
            30 + i % 90,
            3 + i % 10
        ));
    }
    text
}

fn parse_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("csv_parse");

    for count in [100, 1_000, 10_000] {
        let text = generate_csv(count);
        group.bench_with_input(BenchmarkId::new("rows", count), &text, |b, text| {
            let parser = TrainingCsvParser::new();
            b.iter(|| black_box(parser.parse(text)))
        });
    }

    group.finish();
}

fn aggregation_benchmark(c: &mut Criterion) {
    let records = match TrainingCsvParser::new().parse(&generate_csv(10_000)) {
        Ok(parsed) => parsed.records,
        Err(e) => panic!("bench input failed to parse: {e}"),
    };

    c.bench_function("compute_rankings_10k", |b| {
        b.iter(|| black_box(compute_rankings(&records)))
    });
    c.bench_function("compute_monthly_trends_10k", |b| {
        b.iter(|| black_box(compute_monthly_trends(&records, MIN_TREND_MONTHS)))
    });
    c.bench_function("compute_aggregates_level_10k", |b| {
        b.iter(|| black_box(compute_aggregates(&records, GroupBy::Level)))
    });
    c.bench_function("paginate_logs_10k", |b| {
        b.iter(|| black_box(paginate_logs(&records, 50, 100)))
    });
}

criterion_group!(benches, parse_benchmark, aggregation_benchmark);
criterion_main!(benches);
