use glam::Vec3;

use crate::config::EngineConfig;
use crate::constants::{
    ghost_level_speed, speed_ramp, CAPTURE_BASE_POINTS, GHOST_CONTACT_DISTANCE, GHOST_ROSTER,
    MAX_LEVEL, PELLET_PICKUP_DISTANCE, PELLET_POINTS, POWER_UP_PICKUP_DISTANCE, POWER_UP_POINTS,
    TELEPORT_FLASH_MS, WAYPOINT_EPSILON,
};
use crate::error::{EngineError, EngineResult};
use crate::rng::Rng;
use crate::types::{
    CameraMode, GameOverReason, GameSummary, GhostState, InputSnapshot, MatchState, MatchStats,
    PlayerView, RuntimeEvent, Snapshot, TeleportZoneView,
};
use crate::walls::WallRegistry;
use crate::world::{build_world, GeneratedWorld};

mod ghost;
mod movement;
pub mod pathfinding;
mod spawn_system;
pub mod targeting;
mod utils;

use self::ghost::GhostInternal;
use self::targeting::PlayerHeading;
use self::utils::{clamp_to_maze, planar_distance, yaw_of};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    NotStarted,
    Playing,
    Over,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Interlude {
    None,
    Death { remaining_ms: u64 },
    LevelIntro { remaining_ms: u64 },
}

#[derive(Clone, Debug)]
struct PlayerInternal {
    position: Vec3,
    orientation: f32,
}

#[derive(Clone, Debug)]
pub struct GameEngine {
    config: EngineConfig,
    levels: Vec<GeneratedWorld>,
    world: GeneratedWorld,

    rng: Rng,
    player: PlayerInternal,
    heading: PlayerHeading,
    input: InputSnapshot,
    ghosts: Vec<GhostInternal>,
    events: Vec<RuntimeEvent>,
    stats: MatchStats,

    phase: Phase,
    interlude: Interlude,
    user_paused: bool,
    end_reason: Option<GameOverReason>,

    level: u32,
    score: u32,
    lives: u32,
    power_up_remaining_ms: u64,
    capture_multiplier: u32,
    speed_ramp: f32,
    elapsed_ms: u64,
    tick_counter: u64,
    teleport_ready_at_ms: u64,
    teleport_armed: bool,
}

impl GameEngine {
    pub fn new(config: EngineConfig, seed: u32) -> EngineResult<Self> {
        config.validate()?;
        let levels = (1..=MAX_LEVEL)
            .map(|level| build_world(level, config.player_radius, config.ghost_spawn_radius))
            .collect::<EngineResult<Vec<_>>>()?;
        Self::from_worlds(config, seed, levels)
    }

    pub fn from_worlds(
        config: EngineConfig,
        seed: u32,
        levels: Vec<GeneratedWorld>,
    ) -> EngineResult<Self> {
        let world = levels.first().cloned().ok_or(EngineError::UnknownLevel(1))?;
        let lives = config.starting_lives;
        let mut engine = Self {
            config,
            levels,
            player: PlayerInternal {
                position: world.player_spawn,
                orientation: 0.0,
            },
            world,
            rng: Rng::new(seed),
            heading: PlayerHeading::default(),
            input: InputSnapshot::default(),
            ghosts: Vec::new(),
            events: Vec::new(),
            stats: MatchStats::default(),
            phase: Phase::NotStarted,
            interlude: Interlude::None,
            user_paused: false,
            end_reason: None,
            level: 1,
            score: 0,
            lives,
            power_up_remaining_ms: 0,
            capture_multiplier: 1,
            speed_ramp: 1.0,
            elapsed_ms: 0,
            tick_counter: 0,
            teleport_ready_at_ms: 0,
            teleport_armed: true,
        };
        engine.spawn_ghosts();
        engine.reset_player();
        Ok(engine)
    }

    pub fn start_game(&mut self) {
        self.power_up_remaining_ms = 0;
        self.capture_multiplier = 1;
        self.score = 0;
        self.lives = self.config.starting_lives;
        self.elapsed_ms = 0;
        self.tick_counter = 0;
        self.speed_ramp = 1.0;
        self.stats = MatchStats::default();
        self.end_reason = None;
        self.user_paused = false;
        self.interlude = Interlude::None;
        self.input = InputSnapshot::default();
        self.events.clear();
        self.load_level(1);
        self.phase = Phase::Playing;
        self.events.push(RuntimeEvent::GameStarted);
    }

    pub fn toggle_pause(&mut self) -> bool {
        if self.phase == Phase::Playing {
            self.user_paused = !self.user_paused;
        }
        self.user_paused
    }

    pub fn set_input(&mut self, input: InputSnapshot) {
        self.input = input;
    }

    pub fn match_state(&self) -> MatchState {
        match self.phase {
            Phase::NotStarted => MatchState::NotStarted,
            Phase::Over => MatchState::Over,
            Phase::Playing if self.user_paused || self.interlude != Interlude::None => {
                MatchState::Paused
            }
            Phase::Playing => MatchState::Running,
        }
    }

    pub fn is_over(&self) -> bool {
        self.phase == Phase::Over
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn walls(&self) -> &WallRegistry {
        &self.world.walls
    }

    pub fn pellets(&self) -> &[Vec3] {
        &self.world.pellets
    }

    pub fn power_ups(&self) -> &[Vec3] {
        &self.world.power_ups
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn step(&mut self, dt_ms: u64) {
        if self.phase != Phase::Playing {
            return;
        }
        self.tick_counter += 1;
        if self.user_paused || self.advance_interlude(dt_ms) {
            return;
        }

        self.elapsed_ms = self.elapsed_ms.saturating_add(dt_ms);
        self.speed_ramp = speed_ramp(
            self.elapsed_ms,
            self.config.speed_ramp_interval_ms,
            self.config.speed_ramp_factor,
            self.config.speed_ramp_cap,
        );

        if self.world.pickups_remaining() == 0 {
            self.complete_level();
            return;
        }

        self.update_power_up(dt_ms);
        self.update_player(dt_ms);
        self.update_teleports();
        self.collect_pickups();
        self.resolve_ghost_contacts();
        if self.interlude == Interlude::None {
            self.update_ghosts(dt_ms);
        }
        self.update_effects(dt_ms);
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        let player = self.player.position;
        let state = self.match_state();
        Snapshot {
            tick: self.tick_counter,
            elapsed_ms: self.elapsed_ms,
            state,
            level: self.level,
            score: self.score,
            lives: self.lives,
            paused: state == MatchState::Paused,
            game_over: self.phase == Phase::Over,
            victory: self.end_reason == Some(GameOverReason::Victory),
            pellets_remaining: self.world.pellets.len(),
            power_ups_remaining: self.world.power_ups.len(),
            power_up_remaining_ms: self.power_up_remaining_ms,
            capture_multiplier: self.capture_multiplier,
            player: PlayerView {
                position: player,
                orientation: self.player.orientation,
                lives: self.lives,
                score: self.score,
            },
            ghosts: self.ghosts.iter().map(|ghost| ghost.view(player)).collect(),
            teleport_zones: self
                .world
                .teleport_zones
                .iter()
                .map(|zone| TeleportZoneView {
                    position: zone.position,
                    exit: zone.exit,
                    flashing: zone.flash_ms > 0,
                })
                .collect(),
            events: if include_events {
                std::mem::take(&mut self.events)
            } else {
                Vec::new()
            },
        }
    }

    pub fn build_summary(&self) -> GameSummary {
        GameSummary {
            reason: self.end_reason,
            level: self.level,
            score: self.score,
            lives: self.lives,
            duration_ms: self.elapsed_ms,
            stats: self.stats.clone(),
        }
    }

    // Returns true while a freeze swallows the tick, including the tick that ends it.
    fn advance_interlude(&mut self, dt_ms: u64) -> bool {
        match self.interlude {
            Interlude::None => false,
            Interlude::Death { remaining_ms } => {
                let remaining_ms = remaining_ms.saturating_sub(dt_ms);
                if remaining_ms > 0 {
                    self.interlude = Interlude::Death { remaining_ms };
                } else {
                    self.interlude = Interlude::None;
                    self.finish_death();
                }
                true
            }
            Interlude::LevelIntro { remaining_ms } => {
                let remaining_ms = remaining_ms.saturating_sub(dt_ms);
                self.interlude = if remaining_ms > 0 {
                    Interlude::LevelIntro { remaining_ms }
                } else {
                    Interlude::None
                };
                true
            }
        }
    }

    fn complete_level(&mut self) {
        let next_level = self.level + 1;
        if !self.load_level(next_level) {
            self.finish(GameOverReason::Victory);
            return;
        }
        self.interlude = Interlude::LevelIntro {
            remaining_ms: self.config.level_intro_ms,
        };
        self.events.push(RuntimeEvent::LevelAdvanced { level: next_level });
    }

    fn finish(&mut self, reason: GameOverReason) {
        self.phase = Phase::Over;
        self.end_reason = Some(reason);
        self.interlude = Interlude::None;
        self.user_paused = false;
        self.events.push(RuntimeEvent::GameOver { reason });
    }

    fn begin_death(&mut self, ghost_id: usize) {
        if self.interlude != Interlude::None {
            return;
        }
        self.interlude = Interlude::Death {
            remaining_ms: self.config.death_sequence_ms,
        };
        self.stats.deaths += 1;
        self.events.push(RuntimeEvent::PlayerDied { ghost_id });
    }

    fn finish_death(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            self.finish(GameOverReason::OutOfLives);
            return;
        }
        self.clear_power_up();
        self.reset_agents();
    }

    fn power_up_active(&self) -> bool {
        self.power_up_remaining_ms > 0
    }

    fn start_power_up(&mut self) {
        self.power_up_remaining_ms = self.config.power_up_duration_ms;
        self.capture_multiplier = 1;
        for ghost in &mut self.ghosts {
            ghost.on_power_up_started();
        }
        self.events.push(RuntimeEvent::PowerUpStarted {
            duration_ms: self.config.power_up_duration_ms,
        });
    }

    fn clear_power_up(&mut self) {
        let was_active = self.power_up_active();
        self.power_up_remaining_ms = 0;
        self.capture_multiplier = 1;
        for ghost in &mut self.ghosts {
            ghost.on_power_up_expired();
        }
        if was_active {
            self.events.push(RuntimeEvent::PowerUpExpired);
        }
    }

    fn update_power_up(&mut self, dt_ms: u64) {
        if !self.power_up_active() {
            return;
        }
        self.power_up_remaining_ms = self.power_up_remaining_ms.saturating_sub(dt_ms);
        if self.power_up_remaining_ms == 0 {
            self.clear_power_up();
        }
    }

    fn update_player(&mut self, dt_ms: u64) {
        let direction = movement_direction(&self.input);
        if direction != Vec3::ZERO {
            let travel = self.config.player_speed * dt_ms as f32 / 1000.0;
            let candidate = clamp_to_maze(self.player.position + direction * travel);
            if !self
                .world
                .walls
                .intersects_agent(candidate, self.config.player_radius)
            {
                self.player.position = candidate;
                self.player.orientation = yaw_of(direction);
            }
        }
        self.heading.observe(self.player.position);
    }

    // A zone only fires again once the player has stepped out of every zone
    // and the cooldown has run out.
    fn update_teleports(&mut self) {
        let position = self.player.position;
        let inside = self
            .world
            .teleport_zones
            .iter()
            .position(|zone| planar_distance(position, zone.position) < zone.radius);
        let Some(zone_idx) = inside else {
            self.teleport_armed = true;
            return;
        };
        if !self.teleport_armed || self.elapsed_ms < self.teleport_ready_at_ms {
            return;
        }

        let zone = &mut self.world.teleport_zones[zone_idx];
        zone.flash_ms = TELEPORT_FLASH_MS;
        let exit = zone.exit;
        self.player.position = exit;
        self.heading.reanchor(exit);
        self.teleport_armed = false;
        self.teleport_ready_at_ms = self.elapsed_ms + self.config.teleport_cooldown_ms;
        self.stats.teleports += 1;
        self.events.push(RuntimeEvent::Teleported {
            from: position,
            to: exit,
        });
    }

    fn collect_pickups(&mut self) {
        let position = self.player.position;

        let mut eaten = Vec::new();
        self.world.pellets.retain(|pellet| {
            let hit = planar_distance(*pellet, position) < PELLET_PICKUP_DISTANCE;
            if hit {
                eaten.push(*pellet);
            }
            !hit
        });
        for pellet in eaten {
            self.score += PELLET_POINTS;
            self.stats.pellets += 1;
            self.events.push(RuntimeEvent::PelletCollected { position: pellet });
        }

        let before = self.world.power_ups.len();
        self.world
            .power_ups
            .retain(|power_up| planar_distance(*power_up, position) >= POWER_UP_PICKUP_DISTANCE);
        let collected = (before - self.world.power_ups.len()) as u32;
        if collected > 0 {
            self.score += POWER_UP_POINTS * collected;
            self.stats.power_ups += collected;
            self.start_power_up();
        }
    }

    fn resolve_ghost_contacts(&mut self) {
        let player = self.player.position;
        for idx in 0..self.ghosts.len() {
            if planar_distance(self.ghosts[idx].position, player) >= GHOST_CONTACT_DISTANCE {
                continue;
            }
            match self.ghosts[idx].state {
                GhostState::Fleeing => {
                    if self.ghosts[idx].capture(self.config.respawn_duration_ms) {
                        let points = CAPTURE_BASE_POINTS * self.capture_multiplier;
                        self.score += points;
                        self.capture_multiplier = self.capture_multiplier.saturating_mul(2);
                        self.stats.captures += 1;
                        self.events.push(RuntimeEvent::GhostCaptured {
                            ghost_id: self.ghosts[idx].id,
                            points,
                        });
                    }
                }
                GhostState::Chasing => self.begin_death(self.ghosts[idx].id),
                GhostState::Respawning => {}
            }
        }
    }

    fn update_effects(&mut self, dt_ms: u64) {
        for zone in &mut self.world.teleport_zones {
            zone.flash_ms = zone.flash_ms.saturating_sub(dt_ms);
        }
    }
}

// Overhead and chase cameras map up to -z; first person turns the keys by yaw.
fn movement_direction(input: &InputSnapshot) -> Vec3 {
    let mut forward = 0.0;
    let mut strafe = 0.0;
    if input.up {
        forward += 1.0;
    }
    if input.down {
        forward -= 1.0;
    }
    if input.right {
        strafe += 1.0;
    }
    if input.left {
        strafe -= 1.0;
    }
    let direction = match input.camera_mode {
        CameraMode::FirstPerson => {
            let (sin, cos) = input.camera_yaw.sin_cos();
            let ahead = Vec3::new(-sin, 0.0, -cos);
            let right = Vec3::new(cos, 0.0, -sin);
            ahead * forward + right * strafe
        }
        CameraMode::Overhead | CameraMode::Chase => Vec3::new(strafe, 0.0, -forward),
    };
    direction.normalize_or_zero()
}
