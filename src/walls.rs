use glam::Vec3;

use crate::constants::WALL_HEIGHT;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Wall {
    pub min: Vec3,
    pub max: Vec3,
}

impl Wall {
    pub fn new(center_x: f32, center_z: f32, width: f32, depth: f32) -> Self {
        let half = Vec3::new(width / 2.0, WALL_HEIGHT / 2.0, depth / 2.0);
        let center = Vec3::new(center_x, WALL_HEIGHT / 2.0, center_z);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    fn overlaps_box(&self, min: Vec3, max: Vec3) -> bool {
        !(max.x < self.min.x
            || min.x > self.max.x
            || max.y < self.min.y
            || min.y > self.max.y
            || max.z < self.min.z
            || min.z > self.max.z)
    }

    fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

#[derive(Clone, Debug, Default)]
pub struct WallRegistry {
    walls: Vec<Wall>,
}

impl WallRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_wall(&mut self, wall: Wall) {
        self.walls.push(wall);
    }

    pub fn clear(&mut self) {
        self.walls.clear();
    }

    pub fn len(&self) -> usize {
        self.walls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.walls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Wall> {
        self.walls.iter()
    }

    /// True if a cube of side `2 * radius` centred at `position` touches any wall.
    pub fn intersects_agent(&self, position: Vec3, radius: f32) -> bool {
        let extent = Vec3::splat(radius);
        let min = position - extent;
        let max = position + extent;
        self.walls.iter().any(|wall| wall.overlaps_box(min, max))
    }

    pub fn contains_point(&self, position: Vec3) -> bool {
        self.walls.iter().any(|wall| wall.contains(position))
    }
}

impl FromIterator<Wall> for WallRegistry {
    fn from_iter<I: IntoIterator<Item = Wall>>(iter: I) -> Self {
        Self {
            walls: iter.into_iter().collect(),
        }
    }
}
