//! Bounded A* over the integer lattice of the maze.
//!
//! Ghost positions are quantised to cells by rounding; a cell is walkable if
//! it lies inside the lattice and a ghost standing on its centre would not
//! touch a wall. Only the first step of the best path is returned, so callers
//! replan from wherever they end up.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use glam::Vec3;

use crate::constants::GRID_BOUND;
use crate::walls::WallRegistry;

use super::utils::{cell_center, manhattan, planar_distance, to_cell, Cell, CARDINALS};

// (f, h, deviation from the start->goal line, insertion order, cell)
type OpenEntry = Reverse<(i32, i32, i32, u64, Cell)>;

/// Returns the world position of the first step toward `goal`, or `None`
/// when already in the goal cell, when no path exists, or when the search
/// used up `max_expansions` node expansions.
pub fn find_next_waypoint(
    walls: &WallRegistry,
    start: Vec3,
    goal: Vec3,
    radius: f32,
    max_expansions: usize,
) -> Option<Vec3> {
    let start_cell = to_cell(start);
    let goal_cell = to_cell(goal);
    if start_cell == goal_cell {
        return None;
    }

    let mut open: BinaryHeap<OpenEntry> = BinaryHeap::new();
    let mut g_score: HashMap<Cell, i32> = HashMap::new();
    let mut parent: HashMap<Cell, Cell> = HashMap::new();
    let mut closed: HashSet<Cell> = HashSet::new();
    let mut sequence = 0u64;
    let mut expansions = 0usize;

    let start_h = manhattan(start_cell, goal_cell);
    g_score.insert(start_cell, 0);
    open.push(Reverse((start_h, start_h, 0, sequence, start_cell)));

    while let Some(Reverse((_, _, _, _, cell))) = open.pop() {
        if !closed.insert(cell) {
            continue;
        }
        if cell == goal_cell {
            return first_step(&parent, start_cell, goal_cell).map(cell_center);
        }
        if expansions >= max_expansions {
            return None;
        }
        expansions += 1;

        let Some(&g) = g_score.get(&cell) else {
            continue;
        };
        for (dx, dz) in CARDINALS {
            let next = (cell.0 + dx, cell.1 + dz);
            if closed.contains(&next) || !is_walkable(walls, next, radius) {
                continue;
            }
            let tentative = g + 1;
            if g_score.get(&next).is_some_and(|&known| known <= tentative) {
                continue;
            }
            g_score.insert(next, tentative);
            parent.insert(next, cell);
            let h = manhattan(next, goal_cell);
            sequence += 1;
            open.push(Reverse((
                tentative + h,
                h,
                line_deviation(start_cell, next, goal_cell),
                sequence,
                next,
            )));
        }
    }
    None
}

/// Centre of the walkable cell nearest to `goal`, scanning square rings of
/// cells around it out to `max_ring`.
pub fn nearest_walkable(walls: &WallRegistry, goal: Vec3, radius: f32, max_ring: i32) -> Option<Vec3> {
    let center = to_cell(goal);
    for ring in 0..=max_ring {
        let mut best: Option<(f32, Cell)> = None;
        for dx in -ring..=ring {
            for dz in -ring..=ring {
                if dx.abs().max(dz.abs()) != ring {
                    continue;
                }
                let cell = (center.0 + dx, center.1 + dz);
                if !is_walkable(walls, cell, radius) {
                    continue;
                }
                let distance = planar_distance(cell_center(cell), goal);
                if best.map_or(true, |(known, _)| distance < known) {
                    best = Some((distance, cell));
                }
            }
        }
        if let Some((_, cell)) = best {
            return Some(cell_center(cell));
        }
    }
    None
}

fn is_walkable(walls: &WallRegistry, cell: Cell, radius: f32) -> bool {
    cell.0.abs() <= GRID_BOUND
        && cell.1.abs() <= GRID_BOUND
        && !walls.intersects_agent(cell_center(cell), radius)
}

fn line_deviation(start: Cell, current: Cell, goal: Cell) -> i32 {
    let (dx1, dz1) = (current.0 - goal.0, current.1 - goal.1);
    let (dx2, dz2) = (start.0 - goal.0, start.1 - goal.1);
    (dx1 * dz2 - dx2 * dz1).abs()
}

fn first_step(parent: &HashMap<Cell, Cell>, start: Cell, goal: Cell) -> Option<Cell> {
    let mut cell = goal;
    loop {
        let previous = *parent.get(&cell)?;
        if previous == start {
            return Some(cell);
        }
        cell = previous;
    }
}
