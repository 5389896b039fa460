//! Prints descriptive churn statistics for the HR corpus.

use std::path::PathBuf;

use churnlens::config;
use churnlens::dataset::load_corpus;
use churnlens::insights::{
    CorpusSummary, CorrelationMatrix, GroupChurn, churn_by_department, churn_by_salary,
    correlation_matrix,
};
use churnlens::logging;
use serde::Serialize;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

#[derive(Serialize)]
struct SummaryOutput {
    summary: CorpusSummary,
    departments: Vec<GroupChurn>,
    salaries: Vec<GroupChurn>,
    correlation: CorrelationMatrix,
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    if let Err(err) = logging::init() {
        eprintln!("Logging disabled: {err}");
    }
    let data_file = match options.data_file {
        Some(path) => path,
        None => {
            let settings = match &options.config {
                Some(path) => config::load_from(path),
                None => config::load_or_default(),
            }
            .map_err(|err| err.to_string())?;
            settings.data_file
        }
    };
    let corpus = load_corpus(&data_file).map_err(|err| err.to_string())?;
    let output = SummaryOutput {
        summary: CorpusSummary::from_records(&corpus.records),
        departments: churn_by_department(&corpus.records),
        salaries: churn_by_salary(&corpus.records),
        correlation: correlation_matrix(&corpus.records),
    };

    if options.json {
        let text = serde_json::to_string_pretty(&output).map_err(|err| err.to_string())?;
        println!("{text}");
        return Ok(());
    }

    let summary = &output.summary;
    println!("corpus: {}", data_file.display());
    println!("employees: {}", summary.employees);
    println!("churned: {}", summary.churned);
    println!("churn rate: {:.2}%", summary.churn_rate);
    println!("mean satisfaction: {:.3}", summary.mean_satisfaction);
    println!("mean evaluation: {:.3}", summary.mean_evaluation);
    print_groups("department", &output.departments);
    print_groups("salary", &output.salaries);

    println!();
    println!("correlation matrix:");
    let correlation = &output.correlation;
    let mut header = format!("{:<24}", "");
    for idx in 0..correlation.columns.len() {
        header.push_str(&format!("{:>8}", format!("[{idx}]")));
    }
    println!("{header}");
    for (idx, (column, row)) in correlation
        .columns
        .iter()
        .zip(&correlation.values)
        .enumerate()
    {
        let mut line = format!("{:<24}", format!("[{idx}] {column}"));
        for value in row {
            line.push_str(&format!("{value:>8.3}"));
        }
        println!("{line}");
    }
    Ok(())
}

fn print_groups(title: &str, groups: &[GroupChurn]) {
    println!();
    println!("churn by {title}:");
    for group in groups {
        println!(
            "  {:<12} total={:>6}  churned={:>6}  rate={:>6.2}%",
            group.label, group.total, group.churned, group.churn_rate
        );
    }
}

#[derive(Debug, Clone, Default)]
struct CliOptions {
    config: Option<PathBuf>,
    data_file: Option<PathBuf>,
    json: bool,
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Err(help_text()),
            "--json" => options.json = true,
            "--config" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--config requires a value".to_string())?;
                options.config = Some(PathBuf::from(value));
            }
            "--data" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--data requires a value".to_string())?;
                options.data_file = Some(PathBuf::from(value));
            }
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }
    Ok(options)
}

fn help_text() -> String {
    [
        "churnlens-summary",
        "",
        "Prints head-count, churn rates by group and the correlation matrix of the corpus.",
        "",
        "Usage:",
        "  churnlens-summary [--data HR_comma_sep.csv] [--json]",
        "",
        "Options:",
        "  --config <file>  Config file (default: <app root>/config.toml).",
        "  --data <file>    CSV corpus (default: data_file from config).",
        "  --json           Print everything as one JSON document.",
    ]
    .join("\n")
}
