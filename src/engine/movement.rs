use crate::constants::{GOAL_SNAP_RING, NUDGE_DURATION_MS, STALL_RADIUS, STALL_TIMEOUT_MS};

use super::ghost::Nudge;
use super::pathfinding::{find_next_waypoint, nearest_walkable};
use super::targeting::{chase_target, flee_target};
use super::utils::{Cell, CARDINALS};
use super::*;

impl GameEngine {
    pub(super) fn update_ghosts(&mut self, dt_ms: u64) {
        let power_active = self.power_up_active();
        for idx in 0..self.ghosts.len() {
            if self.ghosts[idx].is_respawning() {
                self.ghosts[idx].tick_respawn(dt_ms, power_active);
                continue;
            }
            self.update_ghost(idx, dt_ms);
        }
    }

    pub(super) fn ghost_speed(&self, idx: usize) -> f32 {
        let level_speed = ghost_level_speed(
            self.level,
            self.config.ghost_base_speed,
            self.config.ghost_level_speed_step,
        );
        level_speed * self.speed_ramp * self.ghosts[idx].state_speed_multiplier(&self.config)
    }

    fn ghost_goal(&self, idx: usize) -> Vec3 {
        let ghost = &self.ghosts[idx];
        let player = self.player.position;
        match ghost.state {
            GhostState::Fleeing => flee_target(player),
            _ => chase_target(
                ghost.personality,
                player,
                self.heading.heading(),
                self.config.near_lead_distance,
                self.config.far_lead_distance,
            ),
        }
    }

    fn update_ghost(&mut self, idx: usize, dt_ms: u64) {
        let Some(ghost) = self.ghosts.get(idx) else {
            return;
        };
        if ghost.is_respawning() {
            return;
        }
        let position = ghost.position;
        let cooldown = ghost.planning_cooldown_ms.saturating_add(dt_ms);
        let needs_plan =
            cooldown >= ghost.replan_interval_ms(&self.config) || ghost.next_waypoint.is_none();
        let goal = self.ghost_goal(idx);
        let travel = self.ghost_speed(idx) * dt_ms as f32 / 1000.0;

        if let Some(next) = self.nudge_step(idx, travel, dt_ms) {
            self.place_ghost(idx, next);
            return;
        }

        let plan_goal = nearest_walkable(
            &self.world.walls,
            goal,
            self.config.ghost_radius,
            GOAL_SNAP_RING,
        )
        .unwrap_or(goal);
        if needs_plan {
            let waypoint = find_next_waypoint(
                &self.world.walls,
                position,
                plan_goal,
                self.config.ghost_radius,
                self.config.path_expansion_cap,
            );
            let ghost = &mut self.ghosts[idx];
            ghost.next_waypoint = waypoint;
            ghost.planning_cooldown_ms = 0;
        } else {
            self.ghosts[idx].planning_cooldown_ms = cooldown;
        }

        let next = self
            .follow_waypoint(idx, travel)
            .or_else(|| self.greedy_step(idx, goal, travel));
        if let Some(next) = next {
            self.place_ghost(idx, next);
        }

        if self.ghosts[idx].record_progress(plan_goal, STALL_RADIUS, dt_ms, STALL_TIMEOUT_MS) {
            self.start_nudge(idx, travel);
        }
    }

    fn place_ghost(&mut self, idx: usize, next: Vec3) {
        let ghost = &mut self.ghosts[idx];
        ghost.orientation = yaw_of(next - ghost.position);
        ghost.position = next;
    }

    fn cardinal_candidate(&self, idx: usize, direction: Cell, travel: f32) -> Option<Vec3> {
        let origin = self.ghosts[idx].position;
        let (dx, dz) = direction;
        let candidate = clamp_to_maze(origin + Vec3::new(dx as f32, 0.0, dz as f32) * travel);
        let blocked = candidate == origin
            || self
                .world
                .walls
                .intersects_agent(candidate, self.config.ghost_radius);
        (!blocked).then_some(candidate)
    }

    // A stalled ghost commits to a random open cardinal for a short hold.
    fn start_nudge(&mut self, idx: usize, travel: f32) {
        let mut directions = CARDINALS;
        self.rng.shuffle(&mut directions);
        let direction = directions
            .into_iter()
            .find(|&direction| self.cardinal_candidate(idx, direction, travel).is_some());
        self.ghosts[idx].nudge = direction.map(|direction| Nudge {
            direction,
            remaining_ms: NUDGE_DURATION_MS,
        });
    }

    fn nudge_step(&mut self, idx: usize, travel: f32, dt_ms: u64) -> Option<Vec3> {
        let nudge = self.ghosts[idx].nudge?;
        let candidate = self.cardinal_candidate(idx, nudge.direction, travel);
        let remaining_ms = nudge.remaining_ms.saturating_sub(dt_ms);
        let ghost = &mut self.ghosts[idx];
        ghost.nudge = match candidate {
            Some(_) if remaining_ms > 0 => Some(Nudge {
                remaining_ms,
                ..nudge
            }),
            _ => None,
        };
        if ghost.nudge.is_none() {
            ghost.next_waypoint = None;
        }
        candidate
    }

    fn follow_waypoint(&mut self, idx: usize, travel: f32) -> Option<Vec3> {
        let ghost = &self.ghosts[idx];
        let waypoint = ghost.next_waypoint?;
        let origin = ghost.position;
        let offset = Vec3::new(waypoint.x - origin.x, 0.0, waypoint.z - origin.z);
        let distance = offset.length();
        if distance <= WAYPOINT_EPSILON {
            self.ghosts[idx].next_waypoint = None;
            return None;
        }

        let candidate = clamp_to_maze(origin + offset / distance * travel.min(distance));
        if candidate == origin
            || self
                .world
                .walls
                .intersects_agent(candidate, self.config.ghost_radius)
        {
            return None;
        }
        if planar_distance(candidate, waypoint) <= WAYPOINT_EPSILON {
            self.ghosts[idx].next_waypoint = None;
        }
        Some(candidate)
    }

    // Cardinal candidates in shuffled order; the first strictly closest candidate wins.
    fn greedy_step(&mut self, idx: usize, goal: Vec3, travel: f32) -> Option<Vec3> {
        let mut directions = CARDINALS;
        self.rng.shuffle(&mut directions);

        let mut best: Option<(Vec3, f32)> = None;
        for direction in directions {
            let Some(candidate) = self.cardinal_candidate(idx, direction, travel) else {
                continue;
            };
            let distance = planar_distance(candidate, goal);
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((candidate, distance)),
            }
        }
        best.map(|(candidate, _)| candidate)
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use crate::config::EngineConfig;
    use crate::constants::{GHOST_RADIUS, MAX_LEVEL, PLAYER_RADIUS, TICK_MS};
    use crate::engine::GameEngine;
    use crate::types::{GhostState, InputSnapshot};
    use crate::walls::{Wall, WallRegistry};
    use crate::constants::GHOST_SPAWN_RADIUS;
    use crate::world::{build_world, ground, GeneratedWorld};

    fn world_with(walls: WallRegistry, ghost: Vec3, player: Vec3) -> GeneratedWorld {
        GeneratedWorld {
            level: 1,
            walls,
            pellets: vec![ground(-12.0, 12.0)],
            power_ups: Vec::new(),
            teleport_zones: Vec::new(),
            ghost_spawns: vec![ghost],
            player_spawn: player,
        }
    }

    fn engine_for(world: GeneratedWorld) -> GameEngine {
        let mut engine = GameEngine::from_worlds(EngineConfig::default(), 5, vec![world])
            .expect("engine builds");
        engine.start_game();
        engine
    }

    #[test]
    fn open_maze_ghost_steps_toward_player_without_overshoot() {
        let mut engine = engine_for(world_with(
            WallRegistry::new(),
            ground(0.0, 0.0),
            ground(5.0, 0.0),
        ));
        engine.step(TICK_MS);
        assert_eq!(engine.ghosts[0].next_waypoint, Some(ground(1.0, 0.0)));
        assert!((engine.ghosts[0].position.x - 0.1).abs() < 1e-6);

        let mut last_x = engine.ghosts[0].position.x;
        while engine.ghosts[0].next_waypoint == Some(ground(1.0, 0.0)) {
            engine.step(TICK_MS);
            let x = engine.ghosts[0].position.x;
            assert!(x > last_x);
            assert!(x <= 1.0);
            assert_eq!(engine.ghosts[0].position.z, 0.0);
            last_x = x;
        }
        assert!(last_x > 0.85);
    }

    #[test]
    fn boxed_in_ghost_stays_put() {
        let walls: WallRegistry = [
            Wall::new(1.0, 0.0, 1.0, 1.0),
            Wall::new(-1.0, 0.0, 1.0, 1.0),
            Wall::new(0.0, 1.0, 1.0, 1.0),
            Wall::new(0.0, -1.0, 1.0, 1.0),
        ]
        .into_iter()
        .collect();
        let mut engine = engine_for(world_with(walls, ground(0.0, 0.0), ground(6.0, 6.0)));
        for _ in 0..20 {
            engine.step(TICK_MS);
            assert_eq!(engine.ghosts[0].position, ground(0.0, 0.0));
        }
    }

    #[test]
    fn blocked_waypoint_falls_back_to_a_moving_direction() {
        let walls: WallRegistry = [Wall::new(1.0, 0.0, 1.0, 1.0)].into_iter().collect();
        let mut engine = engine_for(world_with(walls, ground(0.0, 0.0), ground(6.0, 6.0)));
        engine.ghosts[0].next_waypoint = Some(ground(1.0, 0.0));
        engine.ghosts[0].planning_cooldown_ms = 0;

        let before = engine.ghosts[0].position;
        engine.step(TICK_MS);
        let after = engine.ghosts[0].position;
        assert_ne!(after, before);
        assert!(!engine.walls().intersects_agent(after, GHOST_RADIUS));
    }

    #[test]
    fn ghosts_never_enter_walls_on_any_level() {
        for level in 1..=MAX_LEVEL {
            let mut engine =
                GameEngine::new(EngineConfig::default(), 900 + level).expect("engine builds");
            engine.start_game();
            assert!(engine.load_level(level));
            let mut pilot = crate::rng::Rng::new(level);
            for tick in 0..2_000 {
                if tick % 15 == 0 {
                    engine.set_input(InputSnapshot {
                        up: pilot.bool(0.5),
                        down: pilot.bool(0.5),
                        left: pilot.bool(0.5),
                        right: pilot.bool(0.5),
                        ..InputSnapshot::default()
                    });
                }
                engine.step(TICK_MS);
                for ghost in &engine.ghosts {
                    assert!(
                        !engine.walls().intersects_agent(ghost.position, GHOST_RADIUS),
                        "ghost {} inside a wall at {:?} on level {}",
                        ghost.id,
                        ghost.position,
                        level
                    );
                }
                assert!(!engine
                    .walls()
                    .intersects_agent(engine.player.position, PLAYER_RADIUS));
                if engine.is_over() {
                    break;
                }
            }
        }
    }

    #[test]
    fn ghosts_reach_a_stationary_player_from_far_cells_on_every_level() {
        let starts = [(-13.0, -13.0), (-12.0, 0.0), (0.0, -12.0), (-13.0, 13.0), (0.0, 0.0)];
        for level in 1..=MAX_LEVEL {
            for (x, z) in starts {
                let mut world =
                    build_world(level, PLAYER_RADIUS, GHOST_SPAWN_RADIUS).expect("level builds");
                world.power_ups.clear();
                world.ghost_spawns = vec![ground(x, z)];
                world.player_spawn = ground(12.0, 12.0);
                assert!(!world.walls.intersects_agent(ground(x, z), GHOST_RADIUS));

                let mut engine = engine_for(world);
                let mut caught_at = None;
                for tick in 0..1_200 {
                    engine.step(TICK_MS);
                    if engine.stats.deaths > 0 {
                        caught_at = Some(tick);
                        break;
                    }
                }
                assert!(
                    caught_at.is_some(),
                    "ghost from ({x}, {z}) on level {level} stuck at {:?}",
                    engine.ghosts[0].position
                );
            }
        }
    }

    #[test]
    fn stalled_ghost_takes_a_nudge_and_keeps_moving() {
        // One-cell pocket open only to the south; the goal lies beyond its back wall.
        let walls: WallRegistry = [
            Wall::new(0.0, -2.0, 3.0, 1.0),
            Wall::new(-1.0, 0.0, 1.0, 3.0),
            Wall::new(1.0, 0.0, 1.0, 3.0),
        ]
        .into_iter()
        .collect();
        let mut engine = engine_for(world_with(walls, ground(0.0, 0.0), ground(0.0, -6.0)));
        engine.config.path_expansion_cap = 1;

        let mut nudge_ticks = 0;
        for _ in 0..120 {
            let before = engine.ghosts[0].position;
            let nudging = engine.ghosts[0].nudge.is_some();
            engine.step(TICK_MS);
            let after = engine.ghosts[0].position;
            assert!(!engine.walls().intersects_agent(after, GHOST_RADIUS));
            assert_eq!(after.x, 0.0);
            if nudging {
                assert_ne!(after, before);
                nudge_ticks += 1;
            }
        }
        assert!(nudge_ticks > 0);
    }

    #[test]
    fn fleeing_ghost_moves_at_half_speed_away_from_player() {
        let mut engine = engine_for(world_with(
            WallRegistry::new(),
            ground(2.0, 2.0),
            ground(6.0, 6.0),
        ));
        engine.world.power_ups.push(engine.player.position);
        engine.step(TICK_MS);
        assert_eq!(engine.ghosts[0].state, GhostState::Fleeing);
        let travelled = (engine.ghosts[0].position - ground(2.0, 2.0)).length();
        assert!((travelled - 0.05).abs() < 1e-5);

        let start_gap = (ground(2.0, 2.0) - engine.player.position).length();
        for _ in 0..40 {
            engine.step(TICK_MS);
        }
        let gap = (engine.ghosts[0].position - engine.player.position).length();
        assert!(gap > start_gap);
    }

    #[test]
    fn respawning_ghost_holds_still_until_countdown_ends() {
        let mut engine = engine_for(world_with(
            WallRegistry::new(),
            ground(-6.0, -6.0),
            ground(6.0, 6.0),
        ));
        engine.world.power_ups.push(engine.player.position);
        engine.step(TICK_MS);
        engine.ghosts[0].position = engine.player.position;
        engine.step(TICK_MS);
        assert_eq!(engine.ghosts[0].state, GhostState::Respawning);

        for _ in 0..18 {
            engine.step(TICK_MS);
            assert_eq!(engine.ghosts[0].state, GhostState::Respawning);
            assert_eq!(engine.ghosts[0].position, ground(-6.0, -6.0));
        }
        engine.step(TICK_MS);
        engine.step(TICK_MS);
        assert_eq!(engine.ghosts[0].state, GhostState::Chasing);
        assert_ne!(engine.ghosts[0].position, ground(-6.0, -6.0));
    }

    #[test]
    fn ghost_speed_scales_with_level_ramp_and_state() {
        let mut engine = GameEngine::new(EngineConfig::default(), 8).expect("engine builds");
        engine.start_game();
        assert_eq!(engine.ghost_speed(0), 2.0);

        assert!(engine.load_level(2));
        assert_eq!(engine.ghost_speed(0), 2.5);

        engine.speed_ramp = 1.05;
        assert!((engine.ghost_speed(0) - 2.625).abs() < 1e-5);

        engine.ghosts[0].state = GhostState::Fleeing;
        assert!((engine.ghost_speed(0) - 1.3125).abs() < 1e-5);
    }
}
