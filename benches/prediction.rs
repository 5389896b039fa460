use std::hint::black_box;

use churnlens::dataset::{Department, RawRecord, SalaryBand, parse_corpus};
use churnlens::ml::{ModelBundle, TrainingConfig, train};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

const CORPUS_ROWS: usize = 2_000;
const BATCH: usize = 1_000;

fn corpus_csv(rows: usize) -> String {
    let mut csv = String::from(
        "satisfaction_level,last_evaluation,number_project,average_montly_hours,time_spend_company,Work_accident,left,promotion_last_5years,Department,salary\n",
    );
    for i in 0..rows {
        let left = i % 4 == 0;
        let satisfaction = if left { 0.2 } else { 0.7 } + (i % 5) as f64 * 0.02;
        let hours = if left { 260 } else { 170 } + i % 30;
        csv.push_str(&format!(
            "{satisfaction:.2},0.7,{},{hours},{},0,{},0,{},{}\n",
            2 + i % 5,
            2 + i % 6,
            u8::from(left),
            Department::ALL[i % Department::ALL.len()],
            SalaryBand::ALL[i % SalaryBand::ALL.len()],
        ));
    }
    csv
}

fn setup_bundle() -> ModelBundle {
    let corpus = parse_corpus(corpus_csv(CORPUS_ROWS).as_bytes()).expect("corpus");
    let config = TrainingConfig {
        logreg: churnlens::ml::TrainOptions {
            epochs: 10,
            ..Default::default()
        },
        ..Default::default()
    };
    train(&corpus, &config).expect("train").0
}

fn records() -> Vec<RawRecord> {
    (0..BATCH)
        .map(|i| {
            RawRecord::new()
                .with("satisfaction_level", (i % 100) as f64 / 100.0)
                .with("last_evaluation", 0.6)
                .with("number_project", 2 + i % 5)
                .with("average_montly_hours", 150 + i % 120)
                .with("time_spend_company", 3)
                .with("Work_accident", i % 2)
                .with("promotion_last_5years", 0)
                .with("Department", Department::ALL[i % Department::ALL.len()])
                .with("salary", SalaryBand::ALL[i % SalaryBand::ALL.len()])
        })
        .collect()
}

fn bench_predict_batch(c: &mut Criterion) {
    let bundle = setup_bundle();
    let records = records();
    c.bench_with_input(
        BenchmarkId::new("predict_batch", BATCH),
        &records,
        |b, records| {
            b.iter(|| {
                for record in records {
                    black_box(bundle.predict(black_box(record)).expect("predict"));
                }
            });
        },
    );
}

fn bench_train(c: &mut Criterion) {
    let corpus = parse_corpus(corpus_csv(CORPUS_ROWS).as_bytes()).expect("corpus");
    let mut group = c.benchmark_group("train");
    group.sample_size(10);
    group.bench_function(BenchmarkId::new("rows", CORPUS_ROWS), |b| {
        b.iter(|| train(black_box(&corpus), &TrainingConfig::default()).expect("train"));
    });
    group.finish();
}

criterion_group!(benches, bench_predict_batch, bench_train);
criterion_main!(benches);
