use glam::Vec3;

use crate::types::Personality;

pub const TICK_RATE: u32 = 20;
pub const TICK_MS: u64 = 1000 / TICK_RATE as u64;

pub const MAX_LEVEL: u32 = 3;
pub const STARTING_LIVES: u32 = 3;

pub const GROUND_Y: f32 = 0.5;
pub const WALL_HEIGHT: f32 = 2.0;
pub const MAZE_HALF_EXTENT: f32 = 13.0;
pub const GRID_BOUND: i32 = 13;

pub const PLAYER_SPAWN: Vec3 = Vec3::new(0.0, GROUND_Y, 0.0);
pub const PLAYER_SPEED: f32 = 5.0;
pub const PLAYER_RADIUS: f32 = 0.5;

pub const GHOST_BASE_SPEED: f32 = 2.0;
pub const GHOST_LEVEL_SPEED_STEP: f32 = 0.5;
pub const GHOST_RADIUS: f32 = 0.4;
pub const GHOST_SPAWN_RADIUS: f32 = 0.5;
pub const FLEE_SPEED_MULTIPLIER: f32 = 0.5;

pub const SPEED_RAMP_INTERVAL_MS: u64 = 30_000;
pub const SPEED_RAMP_FACTOR: f32 = 1.05;
pub const SPEED_RAMP_CAP: f32 = 2.0;

pub const CHASE_REPLAN_INTERVAL_MS: u64 = 500;
pub const FLEE_REPLAN_INTERVAL_MS: u64 = 250;
// One expansion per lattice cell, so a search over the full 27x27 grid completes.
pub const PATH_EXPANSION_CAP: usize = 729;
pub const WAYPOINT_EPSILON: f32 = 0.1;
pub const GOAL_SNAP_RING: i32 = 2;

pub const STALL_RADIUS: f32 = 1.0;
pub const STALL_TIMEOUT_MS: u64 = 2_000;
pub const NUDGE_DURATION_MS: u64 = 500;

pub const HEADING_EPSILON: f32 = 0.01;
pub const NEAR_LEAD_DISTANCE: f32 = 2.0;
pub const FAR_LEAD_DISTANCE: f32 = 4.0;

pub const POWER_UP_DURATION_MS: u64 = 10_000;
pub const RESPAWN_DURATION_MS: u64 = 1_000;
pub const DEATH_SEQUENCE_MS: u64 = 2_000;
pub const LEVEL_INTRO_MS: u64 = 3_000;

pub const TELEPORT_COOLDOWN_MS: u64 = 500;
pub const TELEPORT_RADIUS: f32 = 1.5;
pub const TELEPORT_FLASH_MS: u64 = 200;

pub const PELLET_PICKUP_DISTANCE: f32 = 0.6;
pub const POWER_UP_PICKUP_DISTANCE: f32 = 0.8;
pub const GHOST_CONTACT_DISTANCE: f32 = 1.0;

pub const PELLET_POINTS: u32 = 10;
pub const POWER_UP_POINTS: u32 = 50;
pub const CAPTURE_BASE_POINTS: u32 = 200;

pub const GHOST_VISIBILITY_RANGE: f32 = 10.0;

pub const GHOST_ROSTER: [(u32, Personality); 4] = [
    (0xff0000, Personality::Direct),
    (0x00ffff, Personality::AmbusherNear),
    (0xff69b4, Personality::AmbusherFar),
    (0xffa500, Personality::Direct),
];

pub const FLEE_CORNERS: [(f32, f32); 4] = [(-12.0, -12.0), (12.0, -12.0), (-12.0, 12.0), (12.0, 12.0)];

pub const SPAWN_ALTERNATIVES: [(f32, f32); 8] = [
    (-11.0, -11.0),
    (11.0, -11.0),
    (-11.0, 11.0),
    (11.0, 11.0),
    (-10.0, -10.0),
    (10.0, -10.0),
    (-10.0, 10.0),
    (10.0, 10.0),
];

pub fn ghost_level_speed(level: u32, base: f32, step: f32) -> f32 {
    base + level.saturating_sub(1) as f32 * step
}

pub fn speed_ramp(elapsed_ms: u64, interval_ms: u64, factor: f32, cap: f32) -> f32 {
    if interval_ms == 0 {
        return 1.0;
    }
    let steps = (elapsed_ms / interval_ms).min(i32::MAX as u64) as i32;
    factor.powi(steps).min(cap)
}
