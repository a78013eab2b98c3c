use glam::Vec3;

use crate::constants::{FLEE_CORNERS, GRID_BOUND, HEADING_EPSILON};
use crate::types::Personality;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlayerHeading {
    last_position: Option<Vec3>,
    heading: Vec3,
}

impl PlayerHeading {
    pub fn observe(&mut self, position: Vec3) {
        if let Some(last) = self.last_position {
            let step = Vec3::new(position.x - last.x, 0.0, position.z - last.z);
            if step.length() > HEADING_EPSILON {
                self.heading = step.normalize();
            }
        }
        self.last_position = Some(position);
    }

    /// Moves the reference point without treating the jump as movement.
    pub fn reanchor(&mut self, position: Vec3) {
        self.last_position = Some(position);
    }

    pub fn heading(&self) -> Vec3 {
        self.heading
    }
}

pub fn chase_target(
    personality: Personality,
    player: Vec3,
    heading: Vec3,
    near_lead: f32,
    far_lead: f32,
) -> Vec3 {
    let lead = match personality {
        Personality::Direct => return player,
        Personality::AmbusherNear => near_lead,
        Personality::AmbusherFar => far_lead,
    };
    let bound = GRID_BOUND as f32;
    let target = player + heading * lead;
    Vec3::new(
        target.x.clamp(-bound, bound),
        player.y,
        target.z.clamp(-bound, bound),
    )
}

pub fn flee_target(player: Vec3) -> Vec3 {
    let mut best = FLEE_CORNERS[0];
    let mut best_distance = f32::MIN;
    for (x, z) in FLEE_CORNERS {
        let distance = (player.x - x).abs() + (player.z - z).abs();
        if distance > best_distance {
            best = (x, z);
            best_distance = distance;
        }
    }
    Vec3::new(best.0, player.y, best.1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f32, z: f32) -> Vec3 {
        Vec3::new(x, 0.5, z)
    }

    #[test]
    fn heading_keeps_last_direction_through_small_steps() {
        let mut heading = PlayerHeading::default();
        heading.observe(at(0.0, 0.0));
        assert_eq!(heading.heading(), Vec3::ZERO);

        heading.observe(at(0.25, 0.0));
        assert_eq!(heading.heading(), Vec3::X);

        heading.observe(at(0.255, 0.0));
        assert_eq!(heading.heading(), Vec3::X);

        heading.observe(at(0.255, -0.25));
        assert_eq!(heading.heading(), Vec3::NEG_Z);
    }

    #[test]
    fn reanchor_does_not_change_heading() {
        let mut heading = PlayerHeading::default();
        heading.observe(at(-11.0, 0.0));
        heading.observe(at(-11.25, 0.0));
        heading.reanchor(at(12.0, 0.0));
        heading.observe(at(12.0, 0.0));
        assert_eq!(heading.heading(), Vec3::NEG_X);
    }

    #[test]
    fn ambushers_lead_the_player() {
        let player = at(1.0, 2.0);
        assert_eq!(chase_target(Personality::Direct, player, Vec3::X, 2.0, 4.0), player);
        assert_eq!(chase_target(Personality::AmbusherNear, player, Vec3::X, 2.0, 4.0), at(3.0, 2.0));
        assert_eq!(chase_target(Personality::AmbusherFar, player, Vec3::Z, 2.0, 4.0), at(1.0, 6.0));
    }

    #[test]
    fn stationary_player_degrades_leads_to_direct() {
        let player = at(-3.0, 4.0);
        assert_eq!(chase_target(Personality::AmbusherFar, player, Vec3::ZERO, 2.0, 4.0), player);
    }

    #[test]
    fn lead_target_stays_inside_the_lattice() {
        let target = chase_target(Personality::AmbusherFar, at(11.0, 0.0), Vec3::X, 2.0, 4.0);
        assert_eq!(target, at(13.0, 0.0));
    }

    #[test]
    fn flee_target_is_farthest_corner() {
        assert_eq!(flee_target(at(-10.0, -9.0)), at(12.0, 12.0));
        assert_eq!(flee_target(at(5.0, -5.0)), at(-12.0, 12.0));
        // Centre ties resolve to the first corner.
        assert_eq!(flee_target(at(0.0, 0.0)), at(-12.0, -12.0));
    }
}
