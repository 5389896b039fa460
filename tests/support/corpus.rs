use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use churnlens::dataset::{Department, RawRecord, SalaryBand};

pub const HEADER: &str = "satisfaction_level,last_evaluation,number_project,average_montly_hours,time_spend_company,Work_accident,left,promotion_last_5years,Department,salary";

/// Deterministic HR-shaped corpus: low satisfaction and long hours drive churn, every
/// department and salary band appears.
pub fn synthetic_csv(rows: usize) -> String {
    let mut csv = String::from(HEADER);
    csv.push('\n');
    for i in 0..rows {
        let left = i % 4 == 0;
        let satisfaction = if left {
            0.09 + (i % 7) as f64 * 0.03
        } else {
            0.5 + (i % 9) as f64 * 0.05
        };
        let evaluation = 0.45 + (i % 11) as f64 * 0.05;
        let projects = 2 + i % 6;
        let hours = if left { 250 + i % 40 } else { 140 + i % 60 };
        let tenure = 2 + i % 7;
        let accident = u8::from(i % 13 == 0 && !left);
        let promotion = u8::from(i % 29 == 0);
        let department = Department::ALL[i % Department::ALL.len()];
        let salary = SalaryBand::ALL[(i / 3) % SalaryBand::ALL.len()];
        let _ = writeln!(
            csv,
            "{satisfaction:.2},{evaluation:.2},{projects},{hours},{tenure},{accident},{},{promotion},{department},{salary}",
            u8::from(left)
        );
    }
    csv
}

pub fn write_corpus(dir: &Path, rows: usize) -> PathBuf {
    let path = dir.join("HR_comma_sep.csv");
    std::fs::write(&path, synthetic_csv(rows)).unwrap();
    path
}

/// The worked example employee.
pub fn scenario_record() -> RawRecord {
    RawRecord::new()
        .with("satisfaction_level", 0.5)
        .with("last_evaluation", 0.6)
        .with("number_project", 5)
        .with("average_montly_hours", 200)
        .with("time_spend_company", 3)
        .with("Work_accident", 0)
        .with("promotion_last_5years", 0)
        .with("Department", "sales")
        .with("salary", "medium")
}
