use glam::Vec3;

use crate::config::EngineConfig;
use crate::constants::GHOST_VISIBILITY_RANGE;
use crate::types::{GhostState, GhostView, Personality};

use super::utils::{planar_distance, Cell};

/// A forced move in one cardinal direction, taken after a ghost stalls.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct Nudge {
    pub(super) direction: Cell,
    pub(super) remaining_ms: u64,
}

#[derive(Clone, Debug)]
pub(super) struct GhostInternal {
    pub(super) id: usize,
    pub(super) color: u32,
    pub(super) personality: Personality,
    pub(super) state: GhostState,
    pub(super) position: Vec3,
    pub(super) orientation: f32,
    pub(super) respawn_countdown_ms: u64,
    pub(super) immune_to_power_up: bool,
    pub(super) next_waypoint: Option<Vec3>,
    pub(super) planning_cooldown_ms: u64,
    pub(super) spawn: Vec3,
    pub(super) stall_anchor: Vec3,
    pub(super) stall_ms: u64,
    pub(super) nudge: Option<Nudge>,
}

impl GhostInternal {
    pub(super) fn new(id: usize, color: u32, personality: Personality, spawn: Vec3) -> Self {
        Self {
            id,
            color,
            personality,
            state: GhostState::Chasing,
            position: spawn,
            orientation: 0.0,
            respawn_countdown_ms: 0,
            immune_to_power_up: false,
            next_waypoint: None,
            planning_cooldown_ms: 0,
            spawn,
            stall_anchor: spawn,
            stall_ms: 0,
            nudge: None,
        }
    }

    pub(super) fn is_respawning(&self) -> bool {
        self.state == GhostState::Respawning
    }

    /// Moves between Chasing and Fleeing to match the power-up flag.
    /// Respawning ghosts are left alone.
    pub(super) fn sync_power(&mut self, power_active: bool) {
        self.state = match self.state {
            GhostState::Chasing if power_active && !self.immune_to_power_up => GhostState::Fleeing,
            GhostState::Fleeing if !power_active || self.immune_to_power_up => GhostState::Chasing,
            state => state,
        };
    }

    pub(super) fn on_power_up_started(&mut self) {
        self.immune_to_power_up = false;
        self.sync_power(true);
    }

    pub(super) fn on_power_up_expired(&mut self) {
        self.immune_to_power_up = false;
        self.sync_power(false);
    }

    /// Sends a fleeing ghost home. Any other state is left untouched and
    /// reported as `false`.
    pub(super) fn capture(&mut self, respawn_ms: u64) -> bool {
        if self.state != GhostState::Fleeing {
            return false;
        }
        self.state = GhostState::Respawning;
        self.position = self.spawn;
        self.respawn_countdown_ms = respawn_ms;
        self.immune_to_power_up = true;
        self.next_waypoint = None;
        self.planning_cooldown_ms = 0;
        self.clear_stall();
        true
    }

    pub(super) fn clear_stall(&mut self) {
        self.stall_anchor = self.position;
        self.stall_ms = 0;
        self.nudge = None;
    }

    /// Accumulates time spent within `radius` of the last anchor point and
    /// returns true once that reaches `timeout_ms`. Leaving the radius, or
    /// standing within it of `goal`, starts a new window.
    pub(super) fn record_progress(&mut self, goal: Vec3, radius: f32, dt_ms: u64, timeout_ms: u64) -> bool {
        if planar_distance(self.position, self.stall_anchor) > radius
            || planar_distance(self.position, goal) <= radius
        {
            self.stall_anchor = self.position;
            self.stall_ms = 0;
            return false;
        }
        self.stall_ms = self.stall_ms.saturating_add(dt_ms);
        if self.stall_ms < timeout_ms {
            return false;
        }
        self.stall_anchor = self.position;
        self.stall_ms = 0;
        true
    }

    pub(super) fn tick_respawn(&mut self, dt_ms: u64, power_active: bool) {
        if self.state != GhostState::Respawning {
            return;
        }
        self.respawn_countdown_ms = self.respawn_countdown_ms.saturating_sub(dt_ms);
        if self.respawn_countdown_ms == 0 {
            self.state = GhostState::Chasing;
            self.sync_power(power_active);
        }
    }

    pub(super) fn reset_to_spawn(&mut self, spawn: Vec3) {
        *self = Self::new(self.id, self.color, self.personality, spawn);
    }

    pub(super) fn replan_interval_ms(&self, config: &EngineConfig) -> u64 {
        match self.state {
            GhostState::Fleeing => config.flee_replan_interval_ms,
            _ => config.chase_replan_interval_ms,
        }
    }

    pub(super) fn state_speed_multiplier(&self, config: &EngineConfig) -> f32 {
        match self.state {
            GhostState::Fleeing => config.flee_speed_multiplier,
            GhostState::Chasing => 1.0,
            GhostState::Respawning => 0.0,
        }
    }

    pub(super) fn view(&self, player: Vec3) -> GhostView {
        let distance = planar_distance(self.position, player);
        let visibility = if distance <= GHOST_VISIBILITY_RANGE {
            1.0 - distance / GHOST_VISIBILITY_RANGE * 0.5
        } else {
            0.0
        };
        GhostView {
            id: self.id,
            color: self.color,
            personality: self.personality,
            state: self.state,
            position: self.position,
            orientation: self.orientation,
            flashing: self.is_respawning(),
            visibility,
        }
    }
}
