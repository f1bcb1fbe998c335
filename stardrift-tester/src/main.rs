mod reports;
mod scenarios;
mod sweep;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use scenarios::{ScenarioCtx, ScenarioResult, expand_scenarios, get_scenario, list_scenarios};
use stardrift_game::constants::MS_PER_HOUR;
use stardrift_game::numbers::{floor_f64_to_u64, u64_to_f64};
use sweep::{SweepPlan, run_sweep};

#[derive(Debug, Parser)]
#[command(name = "stardrift-tester", version = "0.1.0")]
#[command(about = "Automated QA testing for Stardrift auto-collection logic")]
struct Args {
    /// Scenarios to run (comma-separated, or "all")
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Seeds to run (comma-separated)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Run a yield sweep across unlocked locations and modes
    #[arg(long)]
    sweep: bool,

    /// Offline window per sweep session, in hours
    #[arg(long, default_value_t = 8.0)]
    hours: f64,

    /// Sessions per location and mode in the sweep
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Player level used to filter sweep locations
    #[arg(long, default_value_t = 99)]
    player_level: u32,

    /// Session start time in ms since the epoch (defaults to now)
    #[arg(long)]
    epoch_ms: Option<u64>,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "console"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    if args.report == "console" {
        announce_banner();
    }

    let start_time = Instant::now();
    let seeds = parse_seeds(&args.seeds)?;
    let epoch_ms = resolve_epoch(args.epoch_ms)?;
    if args.verbose {
        println!("🕒 Sessions start at {}", format_epoch(epoch_ms));
    }

    let results = run_scenarios(&args, &seeds, epoch_ms);
    let sweep_rows = if args.sweep {
        let plan = SweepPlan {
            player_level: args.player_level,
            window_ms: hours_to_ms(args.hours)?,
            iterations: args.iterations,
            epoch_ms,
        };
        Some(run_sweep(&plan, &seeds))
    } else {
        None
    };

    let mut output_target = OutputTarget::new(args.output.clone())?;
    match args.report.as_str() {
        "json" => reports::generate_json_report(
            output_target.writer(),
            &results,
            sweep_rows.as_deref(),
        )?,
        _ => reports::generate_console_report(
            output_target.writer(),
            &results,
            sweep_rows.as_deref(),
            start_time.elapsed(),
        )?,
    }
    output_target.flush_inner()?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for (key, description) in list_scenarios() {
        writeln!(output_target.writer(), "  {key:25} - {description}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🚀 Stardrift Automated Tester".bright_cyan().bold());
    println!("{}", "=================================".cyan());
}

fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

fn parse_seeds(raw: &str) -> Result<Vec<u64>> {
    let seeds = split_csv(raw)
        .iter()
        .map(|token| {
            token
                .parse::<u64>()
                .with_context(|| format!("invalid seed: {token}"))
        })
        .collect::<Result<Vec<_>>>()?;
    if seeds.is_empty() {
        bail!("at least one seed is required");
    }
    Ok(seeds)
}

fn resolve_epoch(epoch_ms: Option<u64>) -> Result<u64> {
    if let Some(ms) = epoch_ms {
        return Ok(ms);
    }
    u64::try_from(Utc::now().timestamp_millis()).context("system clock is before the epoch")
}

fn format_epoch(epoch_ms: u64) -> String {
    i64::try_from(epoch_ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map_or_else(|| format!("{epoch_ms}ms"), |dt| dt.to_rfc3339())
}

fn hours_to_ms(hours: f64) -> Result<u64> {
    if !hours.is_finite() || hours < 0.0 {
        bail!("--hours must be a non-negative number (got {hours})");
    }
    Ok(floor_f64_to_u64((hours * u64_to_f64(MS_PER_HOUR)).round()))
}

fn run_scenarios(args: &Args, seeds: &[u64], epoch_ms: u64) -> Vec<ScenarioResult> {
    let mut results = Vec::new();
    for scenario_name in expand_scenarios(&split_csv(&args.scenarios)) {
        let Some(scenario) = get_scenario(&scenario_name) else {
            eprintln!("⚠️  Unknown scenario: {}", scenario_name.yellow());
            continue;
        };
        for &seed in seeds {
            if args.verbose {
                println!(
                    "🧪 Testing scenario: {} (seed: {seed})",
                    scenario.key.bright_white()
                );
            }
            results.push(scenario.run(&ScenarioCtx { seed, epoch_ms }));
        }
    }
    results
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}
