use super::*;

impl GameEngine {
    /// Swaps in a fresh copy of `level`'s world and puts every agent at its
    /// spawn. Returns false when no such level exists.
    pub(super) fn load_level(&mut self, level: u32) -> bool {
        let Some(template) = level
            .checked_sub(1)
            .and_then(|index| self.levels.get(index as usize))
        else {
            return false;
        };
        self.world = template.clone();
        self.level = level;
        self.clear_power_up();
        self.spawn_ghosts();
        self.reset_player();
        true
    }

    pub(super) fn spawn_ghosts(&mut self) {
        self.ghosts = self
            .world
            .ghost_spawns
            .iter()
            .zip(GHOST_ROSTER)
            .enumerate()
            .map(|(id, (&spawn, (color, personality)))| {
                GhostInternal::new(id, color, personality, spawn)
            })
            .collect();
    }

    pub(super) fn reset_player(&mut self) {
        let spawn = self.world.player_spawn;
        self.player = PlayerInternal {
            position: spawn,
            orientation: 0.0,
        };
        self.heading = PlayerHeading::default();
        self.heading.reanchor(spawn);
        self.teleport_armed = true;
        self.teleport_ready_at_ms = 0;
    }

    /// Death reset: agents go home, pickups and score stay as they are.
    pub(super) fn reset_agents(&mut self) {
        self.reset_player();
        for ghost in &mut self.ghosts {
            let spawn = ghost.spawn;
            ghost.reset_to_spawn(spawn);
        }
    }
}
