//! Fits the churn model on the HR corpus and writes the artifact bundle.

use std::path::PathBuf;

use churnlens::config::{self, AppSettings};
use churnlens::dataset::load_corpus;
use churnlens::logging;
use churnlens::ml::{EvaluationReport, TrainingConfig, train};

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    if let Err(err) = logging::init() {
        eprintln!("Logging disabled: {err}");
    }
    let settings = match &options.config {
        Some(path) => config::load_from(path),
        None => config::load_or_default(),
    }
    .map_err(|err| err.to_string())?;
    let settings = options.apply(settings);

    let corpus = load_corpus(&settings.data_file).map_err(|err| err.to_string())?;
    let training = TrainingConfig::from(&settings.training);
    let (bundle, report) = train(&corpus, &training).map_err(|err| err.to_string())?;

    let out_dir = config::resolve_artifacts_dir(&settings).map_err(|err| err.to_string())?;
    let manifest = bundle.save(&out_dir).map_err(|err| err.to_string())?;

    println!("corpus: {} ({} rows)", settings.data_file.display(), corpus.len());
    println!("fingerprint: {}", report.corpus_fingerprint);
    println!(
        "train rows: {}  test rows: {}",
        report.train_rows, report.test_rows
    );
    match &report.evaluation {
        Some(evaluation) => print_evaluation(evaluation),
        None => println!("no held-out rows; evaluation skipped"),
    }
    println!(
        "artifacts: {} (format v{})",
        out_dir.display(),
        manifest.format_version
    );
    Ok(())
}

fn print_evaluation(evaluation: &EvaluationReport) {
    println!("test accuracy: {:.4}", evaluation.accuracy);
    println!("test log loss: {:.4}", evaluation.log_loss);
    for stats in &evaluation.per_class {
        println!(
            "class {:<6}  precision={:.3}  recall={:.3}  f1={:.3}  support={}",
            stats.class_id, stats.precision, stats.recall, stats.f1, stats.support
        );
    }
    println!("confusion matrix (rows=true, cols=pred):");
    for row in &evaluation.confusion {
        let line: String = row.iter().map(|count| format!("{count:6}")).collect();
        println!("{line}");
    }
}

#[derive(Debug, Clone, Default)]
struct CliOptions {
    config: Option<PathBuf>,
    data_file: Option<PathBuf>,
    out_dir: Option<PathBuf>,
    test_fraction: Option<f64>,
    epochs: Option<usize>,
    learning_rate: Option<f64>,
    l2: Option<f64>,
    batch_size: Option<usize>,
    seed: Option<u64>,
    balance_classes: Option<bool>,
}

impl CliOptions {
    fn apply(&self, mut settings: AppSettings) -> AppSettings {
        if let Some(path) = &self.data_file {
            settings.data_file = path.clone();
        }
        if let Some(dir) = &self.out_dir {
            settings.artifacts_dir = Some(dir.clone());
        }
        let training = &mut settings.training;
        if let Some(value) = self.test_fraction {
            training.test_fraction = value;
        }
        if let Some(value) = self.epochs {
            training.epochs = value;
        }
        if let Some(value) = self.learning_rate {
            training.learning_rate = value;
        }
        if let Some(value) = self.l2 {
            training.l2 = value;
        }
        if let Some(value) = self.batch_size {
            training.batch_size = value;
        }
        if let Some(value) = self.seed {
            training.seed = value;
        }
        if let Some(value) = self.balance_classes {
            training.balance_classes = value;
        }
        settings.normalized()
    }
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();
    let mut idx = 0usize;
    while idx < args.len() {
        let flag = args[idx].as_str();
        match flag {
            "-h" | "--help" => return Err(help_text()),
            "--balance" => options.balance_classes = Some(true),
            "--no-balance" => options.balance_classes = Some(false),
            "--config" | "--data" | "--out" | "--test-fraction" | "--epochs"
            | "--learning-rate" | "--l2" | "--batch-size" | "--seed" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| format!("{flag} requires a value"))?;
                match flag {
                    "--config" => options.config = Some(PathBuf::from(value)),
                    "--data" => options.data_file = Some(PathBuf::from(value)),
                    "--out" => options.out_dir = Some(PathBuf::from(value)),
                    "--test-fraction" => options.test_fraction = Some(parse_value(flag, value)?),
                    "--epochs" => options.epochs = Some(parse_value(flag, value)?),
                    "--learning-rate" => options.learning_rate = Some(parse_value(flag, value)?),
                    "--l2" => options.l2 = Some(parse_value(flag, value)?),
                    "--batch-size" => options.batch_size = Some(parse_value(flag, value)?),
                    _ => options.seed = Some(parse_value(flag, value)?),
                }
            }
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }
    Ok(options)
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: &str) -> Result<T, String> {
    value
        .parse::<T>()
        .map_err(|_| format!("Invalid {flag} value: {value}"))
}

fn help_text() -> String {
    [
        "churnlens-train",
        "",
        "Fits the encoders, scaler and churn classifier on the HR corpus and saves them.",
        "",
        "Usage:",
        "  churnlens-train [--data HR_comma_sep.csv] [--out <dir>] [options]",
        "",
        "Options:",
        "  --config <file>         Config file (default: <app root>/config.toml).",
        "  --data <file>           CSV corpus (default: data_file from config).",
        "  --out <dir>             Artifact directory (default: <app root>/model).",
        "  --test-fraction <f64>   Held-out share of rows (default: 0.2).",
        "  --epochs <n>            Epoch count (default: 100).",
        "  --learning-rate <f64>   Learning rate (default: 0.1).",
        "  --l2 <f64>              L2 regularization (default: 1e-4).",
        "  --batch-size <n>        Batch size (default: 64).",
        "  --seed <u64>            Split and training seed (default: 42).",
        "  --balance               Weight classes inversely to their frequency.",
        "  --no-balance            Use unweighted loss (default).",
    ]
    .join("\n")
}
