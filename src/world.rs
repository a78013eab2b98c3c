use glam::Vec3;

use crate::constants::{GRID_BOUND, GROUND_Y, PLAYER_SPAWN, SPAWN_ALTERNATIVES, TELEPORT_RADIUS};
use crate::error::{EngineError, EngineResult};
use crate::levels::{ghost_spawns, maze_layout, teleport_zones};
use crate::walls::{Wall, WallRegistry};

const PELLET_MIN: i32 = -12;
const PELLET_MAX: i32 = 12;
const PELLET_STEP: usize = 2;
const POWER_UP_CORNERS: [(f32, f32); 4] = [(-12.0, -12.0), (12.0, -12.0), (-12.0, 12.0), (12.0, 12.0)];

#[derive(Clone, Debug, PartialEq)]
pub struct TeleportZone {
    pub position: Vec3,
    pub exit: Vec3,
    pub radius: f32,
    pub flash_ms: u64,
}

#[derive(Clone, Debug)]
pub struct GeneratedWorld {
    pub level: u32,
    pub walls: WallRegistry,
    pub pellets: Vec<Vec3>,
    pub power_ups: Vec<Vec3>,
    pub teleport_zones: Vec<TeleportZone>,
    pub ghost_spawns: Vec<Vec3>,
    pub player_spawn: Vec3,
}

impl GeneratedWorld {
    pub fn pickups_remaining(&self) -> usize {
        self.pellets.len() + self.power_ups.len()
    }
}

pub fn ground(x: f32, z: f32) -> Vec3 {
    Vec3::new(x, GROUND_Y, z)
}

pub fn build_world(level: u32, player_radius: f32, ghost_spawn_radius: f32) -> EngineResult<GeneratedWorld> {
    let layout = maze_layout(level).ok_or(EngineError::UnknownLevel(level))?;
    let walls: WallRegistry = layout
        .iter()
        .map(|&(x, z, width, depth)| Wall::new(x, z, width, depth))
        .collect();

    if walls.intersects_agent(PLAYER_SPAWN, player_radius) {
        return Err(EngineError::BlockedPlayerSpawn(level));
    }

    let mut spawns = Vec::new();
    for (ghost, &(x, z)) in ghost_spawns(level)
        .ok_or(EngineError::UnknownLevel(level))?
        .iter()
        .enumerate()
    {
        let spawn = resolve_spawn(&walls, ground(x, z), ghost_spawn_radius)
            .ok_or(EngineError::NoSafeSpawn { level, ghost })?;
        spawns.push(spawn);
    }

    let teleports = teleport_zones(level)
        .iter()
        .map(|&(x, z, exit_x, exit_z)| TeleportZone {
            position: ground(x, z),
            exit: ground(exit_x, exit_z),
            radius: TELEPORT_RADIUS,
            flash_ms: 0,
        })
        .collect();

    Ok(GeneratedWorld {
        level,
        pellets: place_pellets(&walls),
        power_ups: place_power_ups(&walls),
        walls,
        teleport_zones: teleports,
        ghost_spawns: spawns,
        player_spawn: PLAYER_SPAWN,
    })
}

fn place_pellets(walls: &WallRegistry) -> Vec<Vec3> {
    let mut pellets = Vec::new();
    for x in (PELLET_MIN..=PELLET_MAX).step_by(PELLET_STEP) {
        for z in (PELLET_MIN..=PELLET_MAX).step_by(PELLET_STEP) {
            if x.abs() < 2 && z.abs() < 2 {
                continue;
            }
            let pos = ground(x as f32, z as f32);
            if !walls.contains_point(pos) {
                pellets.push(pos);
            }
        }
    }
    pellets
}

fn place_power_ups(walls: &WallRegistry) -> Vec<Vec3> {
    POWER_UP_CORNERS
        .iter()
        .map(|&(x, z)| ground(x, z))
        .filter(|pos| !walls.contains_point(*pos))
        .collect()
}

// Configured point, fixed alternatives, maze centre, then rings outward from the centre.
pub fn resolve_spawn(walls: &WallRegistry, preferred: Vec3, radius: f32) -> Option<Vec3> {
    let is_free = |pos: Vec3| !walls.intersects_agent(pos, radius);
    if is_free(preferred) {
        return Some(preferred);
    }
    if let Some(pos) = SPAWN_ALTERNATIVES
        .iter()
        .map(|&(x, z)| ground(x, z))
        .find(|pos| is_free(*pos))
    {
        return Some(pos);
    }
    ring_cells(GRID_BOUND)
        .map(|(x, z)| ground(x as f32, z as f32))
        .find(|pos| is_free(*pos))
}

// Yields (0, 0) followed by each square ring of cells at Chebyshev distance
// 1..=bound, every ring walked in a fixed order.
fn ring_cells(bound: i32) -> impl Iterator<Item = (i32, i32)> {
    std::iter::once((0, 0)).chain((1..=bound).flat_map(|r| {
        let top = (-r..=r).map(move |x| (x, -r));
        let right = (-r + 1..=r).map(move |z| (r, z));
        let bottom = (-r..r).rev().map(move |x| (x, r));
        let left = (-r + 1..r).rev().map(move |z| (-r, z));
        top.chain(right).chain(bottom).chain(left)
    }))
}

#[cfg(test)]
mod tests {
    use std::collections::{HashSet, VecDeque};

    use super::*;
    use crate::constants::{
        GHOST_RADIUS, GHOST_SPAWN_RADIUS, MAX_LEVEL, PELLET_PICKUP_DISTANCE, PLAYER_RADIUS,
        POWER_UP_PICKUP_DISTANCE,
    };

    fn build(level: u32) -> GeneratedWorld {
        build_world(level, PLAYER_RADIUS, GHOST_SPAWN_RADIUS).expect("level builds")
    }

    #[test]
    fn every_level_builds_with_valid_placements() {
        for level in 1..=MAX_LEVEL {
            let world = build(level);
            assert_eq!(world.level, level);
            assert!(!world.walls.is_empty());
            assert!(!world.pellets.is_empty());
            assert_eq!(world.ghost_spawns.len(), 4);
            for pellet in &world.pellets {
                assert!(!world.walls.contains_point(*pellet));
            }
            for spawn in &world.ghost_spawns {
                assert!(!world.walls.intersects_agent(*spawn, GHOST_SPAWN_RADIUS));
            }
        }
    }

    #[test]
    fn pellets_skip_the_player_start_area() {
        let world = build(1);
        assert!(world
            .pellets
            .iter()
            .all(|p| !(p.x.abs() < 2.0 && p.z.abs() < 2.0)));
        assert_eq!(world.power_ups.len(), 4);
    }

    #[test]
    fn blocked_level_spawn_moves_to_first_free_alternative() {
        let world = build(2);
        // (-11, -11) touches the wall at (-8, -10); (11, -11) is the first free alternative.
        assert_eq!(world.ghost_spawns[0], ground(11.0, -11.0));
        assert_eq!(world.ghost_spawns[1], ground(11.0, -11.0));
    }

    #[test]
    fn teleports_only_exist_from_level_two() {
        assert!(build(1).teleport_zones.is_empty());
        let zones = build(2).teleport_zones;
        assert_eq!(zones.len(), 2);
        assert_eq!(zones[0].position, ground(-13.0, 0.0));
        assert_eq!(zones[0].exit, ground(12.0, 0.0));
    }

    #[test]
    fn unknown_level_is_an_error() {
        let err = build_world(4, PLAYER_RADIUS, GHOST_SPAWN_RADIUS).expect_err("no level 4");
        assert!(matches!(err, EngineError::UnknownLevel(4)));
    }

    #[test]
    fn resolve_spawn_falls_back_to_centre_then_rings() {
        let mut walls = WallRegistry::new();
        for &(x, z) in &SPAWN_ALTERNATIVES {
            walls.add_wall(Wall::new(x, z, 1.0, 1.0));
        }
        walls.add_wall(Wall::new(5.0, 5.0, 1.0, 1.0));
        assert_eq!(resolve_spawn(&walls, ground(5.0, 5.0), 0.4), Some(ground(0.0, 0.0)));

        walls.add_wall(Wall::new(0.0, 0.0, 1.0, 1.0));
        let pos = resolve_spawn(&walls, ground(5.0, 5.0), 0.4).expect("ring cell");
        assert!(!walls.intersects_agent(pos, 0.4));
        assert_eq!(pos, ground(-1.0, -1.0));
    }

    #[test]
    fn resolve_spawn_gives_up_when_everything_is_solid() {
        let walls: WallRegistry = [Wall::new(0.0, 0.0, 40.0, 40.0)].into_iter().collect();
        assert_eq!(resolve_spawn(&walls, ground(3.0, 3.0), 0.4), None);
    }

    #[test]
    fn ring_scan_visits_each_cell_once() {
        let cells: Vec<_> = ring_cells(2).collect();
        assert_eq!(cells.len(), 25);
        assert_eq!(cells[0], (0, 0));
        assert_eq!(cells[1], (-1, -1));
        let unique: std::collections::HashSet<_> = cells.iter().collect();
        assert_eq!(unique.len(), 25);
    }

    // Lattice points (at `step` spacing) connected to `starts` through positions
    // where an agent of `radius` is clear of every wall.
    fn flood(walls: &WallRegistry, starts: &[Vec3], radius: f32, step: f32) -> HashSet<(i32, i32)> {
        let bound = (GRID_BOUND as f32 / step).round() as i32;
        let at = |(i, j): (i32, i32)| ground(i as f32 * step, j as f32 * step);
        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();
        for start in starts {
            let point = ((start.x / step).round() as i32, (start.z / step).round() as i32);
            if !walls.intersects_agent(at(point), radius) && seen.insert(point) {
                queue.push_back(point);
            }
        }
        while let Some((i, j)) = queue.pop_front() {
            for next in [(i + 1, j), (i - 1, j), (i, j + 1), (i, j - 1)] {
                if next.0.abs() > bound || next.1.abs() > bound || seen.contains(&next) {
                    continue;
                }
                if walls.intersects_agent(at(next), radius) {
                    continue;
                }
                seen.insert(next);
                queue.push_back(next);
            }
        }
        seen
    }

    #[test]
    fn every_pickup_is_reachable_by_the_player() {
        let step = 0.1;
        for level in 1..=MAX_LEVEL {
            let world = build(level);
            let mut starts = vec![world.player_spawn];
            starts.extend(world.teleport_zones.iter().map(|zone| zone.exit));
            let reachable = flood(&world.walls, &starts, PLAYER_RADIUS, step);

            let pickups = world
                .pellets
                .iter()
                .map(|p| (*p, PELLET_PICKUP_DISTANCE))
                .chain(world.power_ups.iter().map(|p| (*p, POWER_UP_PICKUP_DISTANCE)));
            let unreachable: Vec<Vec3> = pickups
                .filter(|&(pickup, reach)| {
                    !reachable.iter().any(|&(i, j)| {
                        let dx = i as f32 * step - pickup.x;
                        let dz = j as f32 * step - pickup.z;
                        (dx * dx + dz * dz).sqrt() < reach
                    })
                })
                .map(|(pickup, _)| pickup)
                .collect();
            assert!(unreachable.is_empty(), "level {level}: unreachable pickups {unreachable:?}");
        }
    }

    #[test]
    fn ghost_lattice_is_one_connected_region() {
        for level in 1..=MAX_LEVEL {
            let world = build(level);
            let open: Vec<(i32, i32)> = (-GRID_BOUND..=GRID_BOUND)
                .flat_map(|x| (-GRID_BOUND..=GRID_BOUND).map(move |z| (x, z)))
                .filter(|&(x, z)| !world.walls.intersects_agent(ground(x as f32, z as f32), GHOST_RADIUS))
                .collect();
            let reached = flood(&world.walls, &[world.ghost_spawns[0]], GHOST_RADIUS, 1.0);
            assert_eq!(reached.len(), open.len(), "level {level} has sealed ghost pockets");
            for exit in world.teleport_zones.iter().map(|zone| zone.exit) {
                assert!(reached.contains(&(exit.x as i32, exit.z as i32)));
            }
        }
    }
}
