//! Human-readable rendering of run results for terminal output.
use colored::*;

use crate::bench::BenchReport;
use crate::engine::{CrackHit, CrackReport, Outcome};

/// Render one success line, as printed live when a target falls.
pub fn render_hit(hit: &CrackHit) -> String {
    format!(
        "found password for {}: {}",
        hit.label.bold(),
        hit.password.green().bold()
    )
}

/// Render the end-of-run summary.
pub fn render_summary(report: &CrackReport) -> String {
    let mut out = String::new();
    let total = report.hits.len() + report.unresolved.len();
    match report.outcome {
        Outcome::AllCracked => {
            out.push_str(&format!(
                "{}\n",
                format!("Successfully cracked all {total} targets").green().bold()
            ));
        }
        Outcome::Exhausted => {
            out.push_str(&format!(
                "{}\n",
                format!(
                    "Cracked {}/{} targets, wordlist exhausted",
                    report.hits.len(),
                    total
                )
                .yellow()
            ));
            for label in &report.unresolved {
                out.push_str(&format!("  uncracked: {label}\n"));
            }
        }
    }
    out.push_str(&format!(
        "Tried {} candidates in {:.2?}\n",
        report.attempts, report.elapsed
    ));
    out
}

/// Render benchmark results, one line per worker/target sample plus the
/// aggregate rate.
pub fn render_bench(report: &BenchReport) -> String {
    let mut out = String::new();
    for s in &report.samples {
        out.push_str(&format!(
            "Core {} : {} : {} keys/s\n",
            s.worker, s.label, s.keys_per_sec
        ));
    }
    out.push_str(&format!(
        "Total: {} keys/s\n",
        report.aggregate_keys_per_sec.to_string().bold()
    ));
    out
}
