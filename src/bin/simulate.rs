use chrono::{SecondsFormat, Utc};
use clap::Parser;
use glam::Vec3;
use maze_chase_engine::config::EngineConfig;
use maze_chase_engine::constants::{TICK_MS, TICK_RATE};
use maze_chase_engine::engine::GameEngine;
use maze_chase_engine::error::{ConfigError, EngineError};
use maze_chase_engine::rng::Rng;
use maze_chase_engine::types::{
    GameOverReason, GhostState, InputSnapshot, MatchState, RuntimeEvent, Snapshot,
};
use maze_chase_engine::walls::WallRegistry;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

const STUCK_GHOST_TICKS: u32 = 5 * TICK_RATE;
const PINNED_GHOST_TICKS: u32 = 10 * TICK_RATE;
const PINNED_GHOST_RADIUS: f32 = 1.0;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    single: bool,
    #[arg(long)]
    pilot: Option<String>,
    #[arg(long)]
    minutes: Option<u32>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    match_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum Pilot {
    Idle,
    Wander,
    Seek,
}

impl Pilot {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "idle" => Some(Self::Idle),
            "wander" => Some(Self::Wander),
            "seek" => Some(Self::Seek),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
struct Scenario {
    name: String,
    pilot: Pilot,
    minutes: u32,
    seed: u32,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScenarioResultLine {
    scenario: String,
    seed: u32,
    pilot: Pilot,
    minutes: u32,
    reason: Option<GameOverReason>,
    level: u32,
    score: u32,
    lives: u32,
    duration_ms: u64,
    pellets: u32,
    power_ups: u32,
    captures: u32,
    deaths: u32,
    teleports: u32,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioRunResult {
    #[serde(flatten)]
    result: ScenarioResultLine,
    #[serde(rename = "anomalyRecords")]
    anomaly_records: Vec<AnomalyRecord>,
    finished_tick: u64,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunSummary {
    match_id: String,
    started_at: String,
    finished_at: String,
    scenario_count: usize,
    anomaly_count: usize,
    average_duration_ms: u64,
    average_score: u32,
    reason_counts: BTreeMap<String, usize>,
    scenarios: Vec<ScenarioResultLine>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StructuredLogLine {
    timestamp: String,
    level: String,
    event: String,
    match_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    scenario: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tick: Option<u64>,
    details: Value,
}

fn main() {
    let cli = Cli::parse();
    let scenarios = resolve_scenarios(&cli);
    let run_started_at = now_rfc3339();
    let seed_hint = scenarios.first().map(|scenario| scenario.seed).unwrap_or(0);
    let match_id = cli
        .match_id
        .clone()
        .unwrap_or_else(|| default_match_id(seed_hint, Utc::now().timestamp_millis()));

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(error) => {
            emit_log(
                "error",
                "config_load_failed",
                &match_id,
                None,
                None,
                None,
                json!({ "error": error.to_string() }),
            );
            std::process::exit(2);
        }
    };

    let mut has_anomaly = false;
    let mut scenario_results = Vec::new();
    let mut reason_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_anomalies = 0usize;

    for scenario in scenarios {
        emit_log(
            "info",
            "scenario_started",
            &match_id,
            Some(&scenario.name),
            Some(scenario.seed),
            None,
            json!({
                "pilot": scenario.pilot,
                "minutes": scenario.minutes,
            }),
        );
        let scenario_run = match run_scenario(&scenario, &config) {
            Ok(run) => run,
            Err(error) => {
                emit_log(
                    "error",
                    "scenario_failed",
                    &match_id,
                    Some(&scenario.name),
                    Some(scenario.seed),
                    None,
                    json!({ "error": error.to_string() }),
                );
                std::process::exit(2);
            }
        };

        for anomaly in &scenario_run.anomaly_records {
            emit_log(
                "warn",
                "anomaly_detected",
                &match_id,
                Some(&scenario.name),
                Some(scenario.seed),
                Some(anomaly.tick),
                json!({ "message": anomaly.message }),
            );
        }

        if !scenario_run.result.anomalies.is_empty() {
            has_anomaly = true;
        }
        total_anomalies += scenario_run.anomaly_records.len();
        *reason_counts
            .entry(reason_key(scenario_run.result.reason))
            .or_insert(0) += 1;

        emit_log(
            "info",
            "scenario_finished",
            &match_id,
            Some(&scenario.name),
            Some(scenario.seed),
            Some(scenario_run.finished_tick),
            json!({
                "reason": reason_key(scenario_run.result.reason),
                "level": scenario_run.result.level,
                "score": scenario_run.result.score,
                "durationMs": scenario_run.result.duration_ms,
                "anomalyCount": scenario_run.anomaly_records.len(),
            }),
        );

        match serde_json::to_string(&scenario_run.result) {
            Ok(line) => println!("{line}"),
            Err(error) => emit_log(
                "error",
                "result_serialize_failed",
                &match_id,
                Some(&scenario.name),
                Some(scenario.seed),
                None,
                json!({ "error": error.to_string() }),
            ),
        }
        scenario_results.push(scenario_run.result);
    }

    let summary = build_run_summary(
        match_id.clone(),
        run_started_at,
        now_rfc3339(),
        scenario_results,
        reason_counts,
        total_anomalies,
    );

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &match_id,
                None,
                None,
                None,
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(
        "info",
        "run_finished",
        &match_id,
        None,
        None,
        None,
        json!({
            "scenarioCount": summary.scenario_count,
            "anomalyCount": summary.anomaly_count,
            "averageDurationMs": summary.average_duration_ms,
            "averageScore": summary.average_score,
            "reasonCounts": summary.reason_counts,
            "summaryOut": summary_out_written,
        }),
    );

    if has_anomaly {
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig, ConfigError> {
    match path {
        Some(path) => EngineConfig::load(path),
        None => Ok(EngineConfig::default()),
    }
}

fn run_scenario(
    scenario: &Scenario,
    config: &EngineConfig,
) -> Result<ScenarioRunResult, EngineError> {
    let mut engine = GameEngine::new(config.clone(), scenario.seed)?;
    engine.start_game();
    let mut pilot = Autopilot::new(scenario.pilot, scenario.seed ^ 0x5eed);
    let mut stuck = StuckTracker::default();
    let mut previous: Option<Snapshot> = None;

    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    let mut last_tick = 0u64;
    let tick_limit = scenario.minutes as u64 * 60 * TICK_RATE as u64;

    let mut snapshot = engine.build_snapshot(true);
    while !engine.is_over() && last_tick < tick_limit {
        let input = pilot.next_input(snapshot.player.position, engine.pellets(), engine.power_ups());
        engine.set_input(input);
        engine.step(TICK_MS);
        snapshot = engine.build_snapshot(true);
        last_tick = snapshot.tick;

        let mut messages = collect_snapshot_anomalies(
            &snapshot,
            previous.as_ref(),
            engine.walls(),
            config.ghost_radius,
        );
        messages.extend(stuck.observe(&snapshot));
        for message in messages {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.tick,
                message,
            );
        }
        pilot.record(snapshot.player.position);
        previous = Some(snapshot.clone());
    }

    let summary = engine.build_summary();
    Ok(ScenarioRunResult {
        result: ScenarioResultLine {
            scenario: scenario.name.clone(),
            seed: scenario.seed,
            pilot: scenario.pilot,
            minutes: scenario.minutes,
            reason: summary.reason,
            level: summary.level,
            score: summary.score,
            lives: summary.lives,
            duration_ms: summary.duration_ms,
            pellets: summary.stats.pellets,
            power_ups: summary.stats.power_ups,
            captures: summary.stats.captures,
            deaths: summary.stats.deaths,
            teleports: summary.stats.teleports,
            anomalies,
        },
        anomaly_records,
        finished_tick: last_tick,
    })
}

fn collect_snapshot_anomalies(
    snapshot: &Snapshot,
    previous: Option<&Snapshot>,
    walls: &WallRegistry,
    ghost_radius: f32,
) -> Vec<String> {
    let mut anomalies = Vec::new();
    if !snapshot.player.position.is_finite() {
        anomalies.push(format!(
            "non-finite player position: {:?}",
            snapshot.player.position
        ));
    }
    for ghost in &snapshot.ghosts {
        if !ghost.position.is_finite() {
            anomalies.push(format!("non-finite ghost position: {}", ghost.id));
        } else if walls.intersects_agent(ghost.position, ghost_radius) {
            anomalies.push(format!("ghost inside wall: {}", ghost.id));
        }
    }

    if let Some(previous) = previous {
        if snapshot.score < previous.score {
            anomalies.push(format!(
                "score decreased: {} -> {}",
                previous.score, snapshot.score
            ));
        }
        if snapshot.lives > previous.lives {
            anomalies.push(format!(
                "lives increased: {} -> {}",
                previous.lives, snapshot.lives
            ));
        }
        let advanced = snapshot
            .events
            .iter()
            .any(|event| matches!(event, RuntimeEvent::LevelAdvanced { .. }));
        if snapshot.level != previous.level && !advanced {
            anomalies.push(format!(
                "level changed without advance event: {} -> {}",
                previous.level, snapshot.level
            ));
        }
    }
    anomalies
}

/// Flags ghosts that stop dead for `STUCK_GHOST_TICKS`, and chasing ghosts
/// that stay within `PINNED_GHOST_RADIUS` of one spot for `PINNED_GHOST_TICKS`
/// while still moving.
#[derive(Debug, Default)]
struct StuckTracker {
    last_positions: Vec<Vec3>,
    still_ticks: Vec<u32>,
    anchors: Vec<Vec3>,
    pinned_ticks: Vec<u32>,
}

impl StuckTracker {
    fn observe(&mut self, snapshot: &Snapshot) -> Vec<String> {
        let running = snapshot.state == MatchState::Running;
        if self.last_positions.len() != snapshot.ghosts.len() {
            self.last_positions = snapshot.ghosts.iter().map(|ghost| ghost.position).collect();
            self.anchors = self.last_positions.clone();
            self.still_ticks = vec![0; snapshot.ghosts.len()];
            self.pinned_ticks = vec![0; snapshot.ghosts.len()];
            return Vec::new();
        }

        let mut anomalies = Vec::new();
        for (idx, ghost) in snapshot.ghosts.iter().enumerate() {
            let moved = ghost.position != self.last_positions[idx];
            self.last_positions[idx] = ghost.position;

            let left_anchor = ghost.position.distance(self.anchors[idx]) > PINNED_GHOST_RADIUS;
            if left_anchor || !running || ghost.state != GhostState::Chasing {
                self.anchors[idx] = ghost.position;
                self.pinned_ticks[idx] = 0;
            } else {
                self.pinned_ticks[idx] += 1;
                if self.pinned_ticks[idx] == PINNED_GHOST_TICKS {
                    anomalies.push(format!(
                        "ghost {} pinned near {:?}",
                        ghost.id, self.anchors[idx]
                    ));
                }
            }

            if moved || !running || ghost.state == GhostState::Respawning {
                self.still_ticks[idx] = 0;
                continue;
            }
            self.still_ticks[idx] += 1;
            if self.still_ticks[idx] == STUCK_GHOST_TICKS {
                anomalies.push(format!("ghost {} stuck at {:?}", ghost.id, ghost.position));
            }
        }
        anomalies
    }
}

/// Scripted stand-in for a human player.
struct Autopilot {
    pilot: Pilot,
    rng: Rng,
    held: InputSnapshot,
    hold_ticks: u32,
    last_position: Option<Vec3>,
    blocked: bool,
}

impl Autopilot {
    fn new(pilot: Pilot, seed: u32) -> Self {
        Self {
            pilot,
            rng: Rng::new(seed),
            held: InputSnapshot::default(),
            hold_ticks: 0,
            last_position: None,
            blocked: false,
        }
    }

    fn record(&mut self, position: Vec3) {
        self.blocked = self.last_position == Some(position);
        self.last_position = Some(position);
    }

    fn next_input(&mut self, player: Vec3, pellets: &[Vec3], power_ups: &[Vec3]) -> InputSnapshot {
        match self.pilot {
            Pilot::Idle => InputSnapshot::default(),
            Pilot::Wander => self.wander(),
            Pilot::Seek => {
                if self.hold_ticks > 0 || self.blocked {
                    return self.wander();
                }
                let targets: Vec<Vec3> = pellets.iter().chain(power_ups).copied().collect();
                seek_input(player, &targets)
            }
        }
    }

    fn wander(&mut self) -> InputSnapshot {
        if self.hold_ticks == 0 {
            self.hold_ticks = self.rng.int(10, 30) as u32;
            self.held = match self.rng.int(0, 3) {
                0 => InputSnapshot { up: true, ..InputSnapshot::default() },
                1 => InputSnapshot { down: true, ..InputSnapshot::default() },
                2 => InputSnapshot { left: true, ..InputSnapshot::default() },
                _ => InputSnapshot { right: true, ..InputSnapshot::default() },
            };
        }
        self.hold_ticks -= 1;
        self.held
    }
}

fn seek_input(player: Vec3, targets: &[Vec3]) -> InputSnapshot {
    let distance = |target: &Vec3| (target.x - player.x).abs() + (target.z - player.z).abs();
    let Some(target) = targets
        .iter()
        .min_by(|a, b| distance(a).total_cmp(&distance(b)))
    else {
        return InputSnapshot::default();
    };
    let dx = target.x - player.x;
    let dz = target.z - player.z;
    if dx.abs() >= dz.abs() {
        InputSnapshot {
            left: dx < 0.0,
            right: dx > 0.0,
            ..InputSnapshot::default()
        }
    } else {
        InputSnapshot {
            up: dz < 0.0,
            down: dz > 0.0,
            ..InputSnapshot::default()
        }
    }
}

fn resolve_scenarios(cli: &Cli) -> Vec<Scenario> {
    let seed = normalize_seed(cli.seed.unwrap_or_else(|| rand::random::<u32>() as u64));
    let pilot = cli
        .pilot
        .as_deref()
        .and_then(Pilot::parse)
        .unwrap_or(Pilot::Seek);

    if cli.single || cli.pilot.is_some() || cli.minutes.is_some() {
        let minutes = cli.minutes.unwrap_or(3).clamp(1, 30);
        return vec![Scenario {
            name: format!("custom-{}", pilot_key(pilot)),
            pilot,
            minutes,
            seed,
        }];
    }

    vec![
        Scenario {
            name: "idle-check".to_string(),
            pilot: Pilot::Idle,
            minutes: 1,
            seed,
        },
        Scenario {
            name: "wander-check".to_string(),
            pilot: Pilot::Wander,
            minutes: 3,
            seed: normalize_seed(seed as u64 + 1),
        },
        Scenario {
            name: "seek-check".to_string(),
            pilot: Pilot::Seek,
            minutes: 5,
            seed: normalize_seed(seed as u64 + 2),
        },
    ]
}

fn normalize_seed(seed: u64) -> u32 {
    seed as u32
}

fn pilot_key(pilot: Pilot) -> &'static str {
    match pilot {
        Pilot::Idle => "idle",
        Pilot::Wander => "wander",
        Pilot::Seek => "seek",
    }
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    tick: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        tick,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn default_match_id(seed: u32, timestamp_ms: i64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn build_run_summary(
    match_id: String,
    started_at: String,
    finished_at: String,
    scenarios: Vec<ScenarioResultLine>,
    reason_counts: BTreeMap<String, usize>,
    anomaly_count: usize,
) -> RunSummary {
    let scenario_count = scenarios.len();
    let (average_duration_ms, average_score) = if scenario_count == 0 {
        (0, 0)
    } else {
        let total_duration: u64 = scenarios.iter().map(|s| s.duration_ms).sum();
        let total_score: u64 = scenarios.iter().map(|s| s.score as u64).sum();
        (
            total_duration / scenario_count as u64,
            (total_score / scenario_count as u64) as u32,
        )
    };
    RunSummary {
        match_id,
        started_at,
        finished_at,
        scenario_count,
        anomaly_count,
        average_duration_ms,
        average_score,
        reason_counts,
        scenarios,
    }
}

fn emit_log(
    level: &str,
    event: &str,
    match_id: &str,
    scenario: Option<&str>,
    seed: Option<u32>,
    tick: Option<u64>,
    details: Value,
) {
    let log_line = StructuredLogLine {
        timestamp: now_rfc3339(),
        level: level.to_string(),
        event: event.to_string(),
        match_id: match_id.to_string(),
        scenario: scenario.map(|value| value.to_string()),
        seed,
        tick,
        details,
    };
    if let Ok(line) = serde_json::to_string(&log_line) {
        eprintln!("{line}");
    }
}

fn reason_key(reason: Option<GameOverReason>) -> String {
    match reason {
        Some(GameOverReason::Victory) => "victory",
        Some(GameOverReason::OutOfLives) => "out_of_lives",
        None => "time_limit",
    }
    .to_string()
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
    std::fs::write(path, summary_text)
}
