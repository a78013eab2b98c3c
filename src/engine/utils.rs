use glam::{Vec2, Vec3};

use crate::constants::{GROUND_Y, MAZE_HALF_EXTENT};

pub(super) type Cell = (i32, i32);

pub(super) const CARDINALS: [Cell; 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

pub(super) fn to_cell(position: Vec3) -> Cell {
    (position.x.round() as i32, position.z.round() as i32)
}

pub(super) fn cell_center(cell: Cell) -> Vec3 {
    Vec3::new(cell.0 as f32, GROUND_Y, cell.1 as f32)
}

pub(super) fn manhattan(a: Cell, b: Cell) -> i32 {
    (a.0 - b.0).abs() + (a.1 - b.1).abs()
}

/// Distance in the ground plane, ignoring height.
pub(super) fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    Vec2::new(a.x - b.x, a.z - b.z).length()
}

pub(super) fn clamp_to_maze(position: Vec3) -> Vec3 {
    Vec3::new(
        position.x.clamp(-MAZE_HALF_EXTENT, MAZE_HALF_EXTENT),
        position.y,
        position.z.clamp(-MAZE_HALF_EXTENT, MAZE_HALF_EXTENT),
    )
}

/// Yaw about the vertical axis for a facing direction; zero faces +z.
pub(super) fn yaw_of(direction: Vec3) -> f32 {
    direction.x.atan2(direction.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_round_to_nearest_lattice_point() {
        assert_eq!(to_cell(Vec3::new(0.4, 0.5, -0.6)), (0, -1));
        assert_eq!(to_cell(Vec3::new(12.7, 0.5, 3.2)), (13, 3));
        assert_eq!(cell_center((2, -3)), Vec3::new(2.0, GROUND_Y, -3.0));
    }

    #[test]
    fn planar_distance_ignores_height() {
        let a = Vec3::new(0.0, 0.5, 0.0);
        let b = Vec3::new(3.0, 7.0, 4.0);
        assert!((planar_distance(a, b) - 5.0).abs() < 1e-6);
        assert_eq!(manhattan((0, 0), (3, -4)), 7);
    }

    #[test]
    fn clamp_keeps_height_and_bounds_plane() {
        let clamped = clamp_to_maze(Vec3::new(20.0, 0.5, -14.0));
        assert_eq!(clamped, Vec3::new(13.0, 0.5, -13.0));
    }
}
