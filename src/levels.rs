//! Hand-authored maze layouts, ghost spawn tables and teleport zones per level.

/// Wall footprint as `(center_x, center_z, width, depth)`.
pub type WallSpec = (f32, f32, f32, f32);

/// Teleport zone as `(entry_x, entry_z, exit_x, exit_z)`.
pub type TeleportSpec = (f32, f32, f32, f32);

const LEVEL_1_WALLS: [WallSpec; 25] = [
    (0.0, -14.0, 30.0, 1.0),
    (0.0, 14.0, 30.0, 1.0),
    (-14.0, 0.0, 1.0, 30.0),
    (14.0, 0.0, 1.0, 30.0),
    (-10.0, -8.0, 1.0, 8.0),
    (-6.0, 2.0, 1.0, 8.0),
    (-2.0, -6.0, 1.0, 8.0),
    (-2.0, 6.0, 1.0, 4.0),
    (2.0, -10.0, 1.0, 6.0),
    (2.0, 2.0, 1.0, 12.0),
    (6.0, 6.0, 1.0, 6.0),
    (10.0, -4.0, 1.0, 12.0),
    (10.0, 10.0, 1.0, 6.0),
    (-8.0, -10.0, 6.0, 1.0),
    (0.0, -10.0, 6.0, 1.0),
    (8.0, -10.0, 6.0, 1.0),
    (-4.0, -6.0, 6.0, 1.0),
    (8.0, -6.0, 8.0, 1.0),
    (-8.0, -2.0, 6.0, 1.0),
    (4.0, -2.0, 6.0, 1.0),
    (-12.0, 2.0, 4.0, 1.0),
    (0.0, 2.0, 4.0, 1.0),
    (-8.0, 6.0, 6.0, 1.0),
    (-4.0, 10.0, 8.0, 1.0),
    (8.0, 10.0, 8.0, 1.0),
];

// Outer walls leave gaps at z = 0 on both sides for the teleport pair.
const LEVEL_2_WALLS: [WallSpec; 26] = [
    (0.0, -14.0, 30.0, 1.0),
    (0.0, 14.0, 30.0, 1.0),
    (-14.0, -8.0, 1.0, 12.0),
    (-14.0, 8.0, 1.0, 12.0),
    (14.0, -8.0, 1.0, 12.0),
    (14.0, 8.0, 1.0, 12.0),
    (-8.0, -10.0, 5.0, 1.0),
    (2.0, -6.0, 4.0, 1.0),
    (-12.0, -2.0, 5.0, 1.0),
    (4.0, -2.0, 8.0, 1.0),
    (-6.0, 2.0, 6.0, 1.0),
    (4.0, 2.0, 6.0, 1.0),
    (-10.0, 6.0, 4.0, 1.0),
    (8.0, 6.0, 5.0, 1.0),
    (-8.0, 10.0, 9.0, 1.0),
    (4.0, 10.0, 5.0, 1.0),
    (-10.0, -4.0, 1.0, 8.0),
    (-6.0, -8.0, 1.0, 10.0),
    (-2.0, -12.0, 1.0, 4.0),
    (-2.0, 4.0, 1.0, 8.0),
    (2.0, -8.0, 1.0, 6.0),
    (2.0, 4.0, 1.0, 12.0),
    (6.0, -11.0, 1.0, 4.0),
    (6.0, 8.0, 1.0, 4.0),
    (10.0, -4.0, 1.0, 8.0),
    (10.0, 8.0, 1.0, 4.0),
];

// Winding S-shaped corridors, same teleport gaps as level 2. The west pockets
// open at (-10, -5), (-10, 9) and (-7, 10).
const LEVEL_3_WALLS: [WallSpec; 28] = [
    (0.0, -14.0, 30.0, 1.0),
    (0.0, 14.0, 30.0, 1.0),
    (-14.0, -8.0, 1.0, 12.0),
    (-14.0, 8.0, 1.0, 12.0),
    (14.0, -8.0, 1.0, 12.0),
    (14.0, 8.0, 1.0, 12.0),
    (-10.0, -10.0, 8.0, 1.0),
    (6.0, -10.0, 12.0, 1.0),
    (-8.0, -8.0, 1.0, 4.0),
    (4.0, -8.0, 1.0, 4.0),
    (10.0, -6.0, 1.0, 8.0),
    (-12.0, -6.0, 4.0, 1.0),
    (-4.0, -6.0, 1.0, 6.0),
    (2.0, -6.0, 10.0, 1.0),
    (-10.0, -1.0, 1.0, 6.0),
    (6.0, -4.0, 1.0, 4.0),
    (-12.0, 2.0, 6.0, 1.0),
    (0.0, 2.0, 8.0, 1.0),
    (-8.0, 4.0, 1.0, 4.0),
    (2.0, 4.0, 1.0, 8.0),
    (10.0, 2.0, 1.0, 4.0),
    (-10.0, 5.0, 1.0, 6.0),
    (-4.0, 6.0, 8.0, 1.0),
    (8.0, 6.0, 8.0, 1.0),
    (-6.0, 8.0, 1.0, 4.0),
    (4.0, 8.0, 1.0, 4.0),
    (-11.0, 10.0, 6.0, 1.0),
    (6.0, 10.0, 12.0, 1.0),
];

const LEVEL_1_GHOST_SPAWNS: [(f32, f32); 4] = [(-12.0, -8.0), (12.0, -8.0), (-8.0, 12.0), (8.0, 12.0)];
const LEVEL_2_GHOST_SPAWNS: [(f32, f32); 4] =
    [(-11.0, -11.0), (11.0, -11.0), (-11.0, 11.0), (11.0, 11.0)];
const LEVEL_3_GHOST_SPAWNS: [(f32, f32); 4] =
    [(-11.0, -12.0), (11.0, -12.0), (-11.0, 12.0), (11.0, 12.0)];

const SIDE_TELEPORTS: [TeleportSpec; 2] = [(-13.0, 0.0, 12.0, 0.0), (13.0, 0.0, -12.0, 0.0)];

pub fn maze_layout(level: u32) -> Option<&'static [WallSpec]> {
    match level {
        1 => Some(&LEVEL_1_WALLS),
        2 => Some(&LEVEL_2_WALLS),
        3 => Some(&LEVEL_3_WALLS),
        _ => None,
    }
}

pub fn ghost_spawns(level: u32) -> Option<&'static [(f32, f32)]> {
    match level {
        1 => Some(&LEVEL_1_GHOST_SPAWNS),
        2 => Some(&LEVEL_2_GHOST_SPAWNS),
        3 => Some(&LEVEL_3_GHOST_SPAWNS),
        _ => None,
    }
}

pub fn teleport_zones(level: u32) -> &'static [TeleportSpec] {
    match level {
        2 | 3 => &SIDE_TELEPORTS,
        _ => &[],
    }
}
