//! Scores one employee (or a stream of JSON lines) with the saved churn model.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use churnlens::config;
use churnlens::dataset::{Feature, RawRecord};
use churnlens::insights::{PredictionThresholds, RiskTier};
use churnlens::logging;
use churnlens::ml::{ModelBundle, PredictionResult};
use serde::Serialize;

/// Short flags accepted in addition to `--<field name>`.
const FIELD_ALIASES: [(&str, Feature); 9] = [
    ("--satisfaction", Feature::SatisfactionLevel),
    ("--evaluation", Feature::LastEvaluation),
    ("--projects", Feature::NumberProject),
    ("--hours", Feature::AverageMonthlyHours),
    ("--tenure", Feature::TimeSpendCompany),
    ("--accident", Feature::WorkAccident),
    ("--promotion", Feature::PromotionLast5Years),
    ("--department", Feature::Department),
    ("--salary", Feature::Salary),
];

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
    let artifacts_dir = match &options.artifacts_dir {
        Some(dir) => dir.clone(),
        None => config::resolve_artifacts_dir(&settings).map_err(|err| err.to_string())?,
    };
    let bundle = ModelBundle::load(&artifacts_dir)
        .map_err(|err| format!("Cannot start without a valid model: {err}"))?;

    if options.stdin {
        return predict_stream(&bundle, &settings.thresholds);
    }
    let prediction = bundle
        .predict(&options.record)
        .map_err(|err| err.to_string())?;
    let tier = RiskTier::classify(&prediction, &settings.thresholds);
    if options.json {
        let line = serde_json::to_string(&ScoredLine::from((prediction, tier)))
            .map_err(|err| err.to_string())?;
        println!("{line}");
    } else {
        println!("Probability of staying: {:.2}%", prediction.p_stay * 100.0);
        println!("Probability of leaving: {:.2}%", prediction.p_leave * 100.0);
        println!("{}: {}", tier.label(), tier.advice());
    }
    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ScoredLine {
    Scored {
        p_stay: f64,
        p_leave: f64,
        tier: RiskTier,
    },
    Failed {
        error: String,
    },
}

impl From<(PredictionResult, RiskTier)> for ScoredLine {
    fn from((prediction, tier): (PredictionResult, RiskTier)) -> Self {
        ScoredLine::Scored {
            p_stay: prediction.p_stay,
            p_leave: prediction.p_leave,
            tier,
        }
    }
}

/// One JSON object per input line in, one JSON object per line out.
fn predict_stream(bundle: &ModelBundle, thresholds: &PredictionThresholds) -> Result<(), String> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut failures = 0usize;
    for line in stdin.lock().lines() {
        let line = line.map_err(|err| format!("Failed to read stdin: {err}"))?;
        if line.trim().is_empty() {
            continue;
        }
        let scored = match record_from_json(&line)
            .and_then(|record| bundle.predict(&record).map_err(|err| err.to_string()))
        {
            Ok(prediction) => {
                ScoredLine::from((prediction, RiskTier::classify(&prediction, thresholds)))
            }
            Err(error) => {
                failures += 1;
                ScoredLine::Failed { error }
            }
        };
        let text = serde_json::to_string(&scored).map_err(|err| err.to_string())?;
        writeln!(out, "{text}").map_err(|err| format!("Failed to write stdout: {err}"))?;
    }
    if failures > 0 {
        return Err(format!("{failures} record(s) could not be scored"));
    }
    Ok(())
}

fn record_from_json(line: &str) -> Result<RawRecord, String> {
    let value: serde_json::Value =
        serde_json::from_str(line).map_err(|err| format!("Invalid JSON record: {err}"))?;
    let object = value
        .as_object()
        .ok_or_else(|| "JSON record must be an object".to_string())?;
    let mut record = RawRecord::new();
    for (field, value) in object {
        let text = match value {
            serde_json::Value::String(text) => text.clone(),
            serde_json::Value::Number(number) => number.to_string(),
            serde_json::Value::Bool(flag) => u8::from(*flag).to_string(),
            other => return Err(format!("Unsupported value {other} for field `{field}`")),
        };
        record.insert(field.clone(), text);
    }
    Ok(record)
}

#[derive(Debug, Clone, Default)]
struct CliOptions {
    config: Option<PathBuf>,
    artifacts_dir: Option<PathBuf>,
    record: RawRecord,
    json: bool,
    stdin: bool,
}

fn field_for_flag(flag: &str) -> Option<Feature> {
    FIELD_ALIASES
        .iter()
        .find(|(alias, _)| *alias == flag)
        .map(|(_, feature)| *feature)
        .or_else(|| flag.strip_prefix("--").and_then(Feature::from_column))
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();
    let mut idx = 0usize;
    while idx < args.len() {
        let flag = args[idx].as_str();
        match flag {
            "-h" | "--help" => return Err(help_text()),
            "--json" => options.json = true,
            "--stdin" => options.stdin = true,
            "--config" | "--artifacts" | "--field" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| format!("{flag} requires a value"))?;
                match flag {
                    "--config" => options.config = Some(PathBuf::from(value)),
                    "--artifacts" => options.artifacts_dir = Some(PathBuf::from(value)),
                    _ => {
                        let (name, text) = value
                            .split_once('=')
                            .ok_or_else(|| format!("--field expects name=value, got {value}"))?;
                        options.record.insert(name.trim(), text);
                    }
                }
            }
            other => {
                let feature = field_for_flag(other)
                    .ok_or_else(|| format!("Unknown argument: {other}\n\n{}", help_text()))?;
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| format!("{other} requires a value"))?;
                options.record.insert(feature.column(), value);
            }
        }
        idx += 1;
    }
    if options.stdin && !options.record.is_empty() {
        return Err("--stdin cannot be combined with field flags".to_string());
    }
    Ok(options)
}

fn help_text() -> String {
    [
        "churnlens-predict",
        "",
        "Predicts the probability that an employee stays or leaves.",
        "",
        "Usage:",
        "  churnlens-predict --satisfaction 0.5 --evaluation 0.6 --projects 5 --hours 200 \\",
        "                    --tenure 3 --accident 0 --promotion 0 --department sales --salary medium",
        "  churnlens-predict --stdin < records.jsonl",
        "",
        "Options:",
        "  --artifacts <dir>       Model artifact directory (default: from config).",
        "  --config <file>         Config file (default: <app root>/config.toml).",
        "  --<field> <value>       Any schema field by corpus column name, e.g. --Work_accident 0.",
        "  --field <name=value>    Same, as a single argument.",
        "  --json                  Print the result as JSON.",
        "  --stdin                 Score JSON objects read one per line from stdin.",
        "",
        "Field aliases:",
        "  --satisfaction  satisfaction_level     --evaluation  last_evaluation",
        "  --projects      number_project         --hours       average_montly_hours",
        "  --tenure        time_spend_company     --accident    Work_accident",
        "  --promotion     promotion_last_5years  --department  Department",
        "  --salary        salary",
    ]
    .join("\n")
}
