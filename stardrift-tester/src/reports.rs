use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::io::Write;
use std::time::Duration;

use crate::scenarios::ScenarioResult;
use crate::sweep::SweepRow;

#[derive(Serialize)]
struct JsonReport<'a> {
    scenarios: &'a [ScenarioResult],
    #[serde(skip_serializing_if = "Option::is_none")]
    sweep: Option<&'a [SweepRow]>,
}

pub fn generate_json_report(
    out: &mut dyn Write,
    results: &[ScenarioResult],
    sweep: Option<&[SweepRow]>,
) -> Result<()> {
    let report = JsonReport {
        scenarios: results,
        sweep,
    };
    let json_output = serde_json::to_string_pretty(&report)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

pub fn generate_console_report(
    out: &mut dyn Write,
    results: &[ScenarioResult],
    sweep: Option<&[SweepRow]>,
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Logic Test Results Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "==============================".cyan())?;

    let total_tests = results.len();
    let passed_tests = results.iter().filter(|r| r.passed).count();
    let failed_tests = total_tests - passed_tests;

    writeln!(out, "Total scenarios: {total_tests}")?;
    writeln!(out, "Passed: {}", passed_tests.to_string().green())?;
    writeln!(out, "Failed: {}", failed_tests.to_string().red())?;
    if total_tests > 0 {
        #[allow(clippy::cast_precision_loss)]
        let success_rate = (passed_tests as f64 / total_tests as f64) * 100.0;
        writeln!(out, "Success rate: {success_rate:.1}%")?;
    }
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for result in results {
        let status = if result.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(
            out,
            "{} {} (seed {}, {}µs)",
            status,
            result.scenario_name.bold(),
            result.seed,
            result.elapsed_micros
        )?;
        for failure in &result.failures {
            writeln!(out, "     • {}", failure.red())?;
        }
    }

    if let Some(rows) = sweep {
        writeln!(out)?;
        writeln!(out, "{}", "⛏️  Yield Sweep".bright_yellow().bold())?;
        writeln!(out, "{}", "==============".yellow())?;
        writeln!(
            out,
            "{:<18} {:<9} {:>8} {:>10} {:>10} {:>10} {:>10}",
            "location", "mode", "sessions", "gold", "exp", "materials", "equipment"
        )?;
        for row in rows {
            writeln!(
                out,
                "{:<18} {:<9} {:>8} {:>10.1} {:>10.1} {:>10.2} {:>10.2}",
                row.location_id,
                row.mode.as_str(),
                row.sessions,
                row.avg_gold,
                row.avg_exp,
                row.avg_materials,
                row.avg_equipment
            )?;
        }
    }
    Ok(())
}
