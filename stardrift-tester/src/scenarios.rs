use serde::{Deserialize, Serialize};
use std::time::Instant;

use stardrift_game::constants::MS_PER_HOUR;
use stardrift_game::numbers::floor_f64_to_u64;
use stardrift_game::{
    AutoCollectEngine, AutoCollectSave, CollectCatalog, CollectError, CollectMode, RewardBundle,
    StaticCatalog, elapsed_hours,
};

/// Inputs shared by every scenario run.
#[derive(Debug, Clone, Copy)]
pub struct ScenarioCtx {
    pub seed: u64,
    pub epoch_ms: u64,
}

type ScenarioFn = fn(&ScenarioCtx) -> Result<(), String>;

pub struct Scenario {
    pub key: &'static str,
    pub description: &'static str,
    run: ScenarioFn,
}

impl Scenario {
    pub fn run(&self, ctx: &ScenarioCtx) -> ScenarioResult {
        let started = Instant::now();
        let outcome = (self.run)(ctx);
        let elapsed_micros = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        ScenarioResult {
            scenario_name: self.key.to_string(),
            seed: ctx.seed,
            passed: outcome.is_ok(),
            failures: outcome.err().into_iter().collect(),
            elapsed_micros,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub seed: u64,
    pub passed: bool,
    pub failures: Vec<String>,
    pub elapsed_micros: u64,
}

static SCENARIOS: [Scenario; 8] = [
    Scenario {
        key: "smoke",
        description: "Start, accrue one hour, stop",
        run: smoke,
    },
    Scenario {
        key: "hour-cap",
        description: "Accrual past 24 hours pays the same as 24 hours",
        run: hour_cap,
    },
    Scenario {
        key: "double-claim",
        description: "Back-to-back claims never double credit",
        run: double_claim,
    },
    Scenario {
        key: "stop-inactive",
        description: "Stopping an idle engine fails without side effects",
        run: stop_inactive,
    },
    Scenario {
        key: "save-roundtrip",
        description: "A restored save settles identically to the original",
        run: save_roundtrip,
    },
    Scenario {
        key: "instant-stop",
        description: "Stopping at the start instant yields nothing",
        run: instant_stop,
    },
    Scenario {
        key: "preview-stable",
        description: "Hourly preview is stable and read-only",
        run: preview_stable,
    },
    Scenario {
        key: "clock-skew",
        description: "A claim with a backwards clock never pays a window twice",
        run: clock_skew,
    },
];

pub fn list_scenarios() -> impl Iterator<Item = (&'static str, &'static str)> {
    SCENARIOS.iter().map(|s| (s.key, s.description))
}

pub fn get_scenario(key: &str) -> Option<&'static Scenario> {
    SCENARIOS.iter().find(|s| s.key == key)
}

/// Replace `all` with every registered scenario key.
pub fn expand_scenarios(requested: &[String]) -> Vec<String> {
    let mut scenarios: Vec<String> = requested.iter().filter(|s| *s != "all").cloned().collect();
    if requested.iter().any(|s| s == "all") {
        for (key, _) in list_scenarios() {
            if !scenarios.iter().any(|s| s == key) {
                scenarios.push(key.to_string());
            }
        }
    }
    scenarios
}

fn ensure(condition: bool, message: impl FnOnce() -> String) -> Result<(), String> {
    if condition { Ok(()) } else { Err(message()) }
}

/// Session clock `offset_ms` after the scenario epoch.
const fn at(ctx: &ScenarioCtx, offset_ms: u64) -> u64 {
    ctx.epoch_ms.saturating_add(offset_ms)
}

fn started(
    ctx: &ScenarioCtx,
    location_id: &str,
    mode: CollectMode,
) -> Result<AutoCollectEngine, String> {
    let mut engine = AutoCollectEngine::new(ctx.seed, ctx.epoch_ms);
    engine
        .start(location_id, mode, ctx.epoch_ms)
        .map_err(|err| format!("start {location_id}: {err}"))?;
    Ok(engine)
}

fn gold_bounds(location_id: &str, mode: CollectMode, hours: f64) -> Result<(u64, u64), String> {
    let location = StaticCatalog::default_config()
        .resolve_location(location_id)
        .ok_or_else(|| format!("missing location {location_id}"))?;
    let scaled = location.base_rewards.gold_per_hour() * hours * mode.multipliers().gold;
    Ok((floor_f64_to_u64(scaled * 0.9), floor_f64_to_u64(scaled * 1.1)))
}

fn smoke(ctx: &ScenarioCtx) -> Result<(), String> {
    let mut engine = started(ctx, "orbit_debris", CollectMode::Balanced)?;
    let rewards = engine
        .stop(at(ctx, MS_PER_HOUR))
        .map_err(|err| err.to_string())?;
    let (lo, hi) = gold_bounds("orbit_debris", CollectMode::Balanced, 1.0)?;
    ensure((lo..=hi).contains(&rewards.gold), || {
        format!("gold {} outside {lo}..={hi}", rewards.gold)
    })?;
    ensure(!engine.is_collecting(), || "session still active after stop".into())
}

fn hour_cap(ctx: &ScenarioCtx) -> Result<(), String> {
    let (lo, hi) = gold_bounds("asteroid_belt", CollectMode::Gather, 24.0)?;
    for hours in [24, 100] {
        let mut engine = started(ctx, "asteroid_belt", CollectMode::Gather)?;
        let now = at(ctx, hours * MS_PER_HOUR);
        let credited = elapsed_hours(ctx.epoch_ms, now);
        ensure((credited - 24.0).abs() < f64::EPSILON, || {
            format!("{hours}h window credited {credited}h")
        })?;
        let rewards = engine.stop(now).map_err(|err| err.to_string())?;
        ensure((lo..=hi).contains(&rewards.gold), || {
            format!("{hours}h gold {} outside {lo}..={hi}", rewards.gold)
        })?;
    }
    Ok(())
}

fn double_claim(ctx: &ScenarioCtx) -> Result<(), String> {
    let mut engine = started(ctx, "nebula_cloud", CollectMode::Combat)?;
    let now = at(ctx, 2 * MS_PER_HOUR);
    let first = engine.claim(now).map_err(|err| err.to_string())?;
    ensure(!first.is_empty(), || "first claim was empty".into())?;
    match engine.claim(now) {
        Err(CollectError::NothingToClaim) => Ok(()),
        other => Err(format!("second claim returned {other:?}")),
    }
}

fn stop_inactive(ctx: &ScenarioCtx) -> Result<(), String> {
    let mut engine = AutoCollectEngine::new(ctx.seed, ctx.epoch_ms);
    let before = engine.state().clone();
    ensure(
        engine.stop(ctx.epoch_ms) == Err(CollectError::NotCollecting),
        || "stop on idle engine did not report NotCollecting".into(),
    )?;
    ensure(engine.state() == &before, || "idle stop mutated state".into())
}

fn save_roundtrip(ctx: &ScenarioCtx) -> Result<(), String> {
    let mut original = started(ctx, "derelict_station", CollectMode::Gather)?;
    original.settle(at(ctx, 3 * MS_PER_HOUR));
    let json = original
        .snapshot(at(ctx, 3 * MS_PER_HOUR))
        .to_json()
        .map_err(|err| err.to_string())?;
    let save = AutoCollectSave::from_json(&json).map_err(|err| err.to_string())?;
    let mut restored = AutoCollectEngine::restore(save, StaticCatalog::default_config());

    let later = at(ctx, 11 * MS_PER_HOUR + 321);
    let expected = original.stop(later).map_err(|err| err.to_string())?;
    let actual = restored.stop(later).map_err(|err| err.to_string())?;
    ensure(expected == actual, || {
        format!("restored engine diverged: {actual:?} vs {expected:?}")
    })
}

fn instant_stop(ctx: &ScenarioCtx) -> Result<(), String> {
    let mut engine = started(ctx, "void_rift", CollectMode::Balanced)?;
    let rewards = engine.stop(ctx.epoch_ms).map_err(|err| err.to_string())?;
    ensure(rewards == RewardBundle::default(), || {
        format!("instant stop paid out {rewards:?}")
    })
}

fn preview_stable(ctx: &ScenarioCtx) -> Result<(), String> {
    let engine = started(ctx, "asteroid_belt", CollectMode::Balanced)?;
    let first = engine.query();
    let second = engine.query();
    ensure(first == second, || "hourly preview changed between calls".into())?;
    ensure(engine.state().last_collect_time == ctx.epoch_ms, || {
        "preview advanced the settlement clock".into()
    })
}

fn clock_skew(ctx: &ScenarioCtx) -> Result<(), String> {
    let mut engine = started(ctx, "asteroid_belt", CollectMode::Balanced)?;
    let settled_at = at(ctx, 5 * MS_PER_HOUR);
    ensure(engine.settle(settled_at), || "five hour settle committed nothing".into())?;
    let first = engine
        .claim(at(ctx, MS_PER_HOUR))
        .map_err(|err| format!("skewed claim: {err}"))?;
    ensure(!first.is_empty(), || "skewed claim paid nothing".into())?;
    ensure(engine.state().last_collect_time == settled_at, || {
        format!(
            "settlement clock moved back to {}",
            engine.state().last_collect_time
        )
    })?;
    match engine.claim(settled_at) {
        Err(CollectError::NothingToClaim) => Ok(()),
        other => Err(format!("settled window paid again: {other:?}")),
    }
}
