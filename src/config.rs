//! Engine tunables.
//!
//! Every field has a default from `constants`; a TOML file only needs to name
//! the values it overrides.

use std::path::Path;

use serde::Deserialize;

use crate::constants::{
    CHASE_REPLAN_INTERVAL_MS, DEATH_SEQUENCE_MS, FAR_LEAD_DISTANCE, FLEE_REPLAN_INTERVAL_MS,
    FLEE_SPEED_MULTIPLIER, GHOST_BASE_SPEED, GHOST_LEVEL_SPEED_STEP, GHOST_RADIUS,
    GHOST_SPAWN_RADIUS, LEVEL_INTRO_MS, NEAR_LEAD_DISTANCE, PATH_EXPANSION_CAP, PLAYER_RADIUS,
    PLAYER_SPEED, POWER_UP_DURATION_MS, RESPAWN_DURATION_MS, SPEED_RAMP_CAP, SPEED_RAMP_FACTOR,
    SPEED_RAMP_INTERVAL_MS, STARTING_LIVES, TELEPORT_COOLDOWN_MS,
};
use crate::error::ConfigError;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub starting_lives: u32,
    pub player_speed: f32,
    pub player_radius: f32,
    pub ghost_base_speed: f32,
    pub ghost_level_speed_step: f32,
    pub ghost_radius: f32,
    pub ghost_spawn_radius: f32,
    pub flee_speed_multiplier: f32,
    pub speed_ramp_interval_ms: u64,
    pub speed_ramp_factor: f32,
    pub speed_ramp_cap: f32,
    pub chase_replan_interval_ms: u64,
    pub flee_replan_interval_ms: u64,
    pub path_expansion_cap: usize,
    pub near_lead_distance: f32,
    pub far_lead_distance: f32,
    pub power_up_duration_ms: u64,
    pub respawn_duration_ms: u64,
    pub death_sequence_ms: u64,
    pub level_intro_ms: u64,
    pub teleport_cooldown_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            starting_lives: STARTING_LIVES,
            player_speed: PLAYER_SPEED,
            player_radius: PLAYER_RADIUS,
            ghost_base_speed: GHOST_BASE_SPEED,
            ghost_level_speed_step: GHOST_LEVEL_SPEED_STEP,
            ghost_radius: GHOST_RADIUS,
            ghost_spawn_radius: GHOST_SPAWN_RADIUS,
            flee_speed_multiplier: FLEE_SPEED_MULTIPLIER,
            speed_ramp_interval_ms: SPEED_RAMP_INTERVAL_MS,
            speed_ramp_factor: SPEED_RAMP_FACTOR,
            speed_ramp_cap: SPEED_RAMP_CAP,
            chase_replan_interval_ms: CHASE_REPLAN_INTERVAL_MS,
            flee_replan_interval_ms: FLEE_REPLAN_INTERVAL_MS,
            path_expansion_cap: PATH_EXPANSION_CAP,
            near_lead_distance: NEAR_LEAD_DISTANCE,
            far_lead_distance: FAR_LEAD_DISTANCE,
            power_up_duration_ms: POWER_UP_DURATION_MS,
            respawn_duration_ms: RESPAWN_DURATION_MS,
            death_sequence_ms: DEATH_SEQUENCE_MS,
            level_intro_ms: LEVEL_INTRO_MS,
            teleport_cooldown_ms: TELEPORT_COOLDOWN_MS,
        }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("player_speed", self.player_speed),
            ("player_radius", self.player_radius),
            ("ghost_base_speed", self.ghost_base_speed),
            ("ghost_radius", self.ghost_radius),
            ("ghost_spawn_radius", self.ghost_spawn_radius),
            ("flee_speed_multiplier", self.flee_speed_multiplier),
            ("speed_ramp_factor", self.speed_ramp_factor),
            ("speed_ramp_cap", self.speed_ramp_cap),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be a positive number, got {value}"),
                });
            }
        }
        for (field, value) in [
            ("ghost_level_speed_step", self.ghost_level_speed_step),
            ("near_lead_distance", self.near_lead_distance),
            ("far_lead_distance", self.far_lead_distance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be zero or positive, got {value}"),
                });
            }
        }
        if self.ghost_radius >= 0.5 {
            return Err(ConfigError::Invalid {
                field: "ghost_radius",
                reason: "ghosts must fit a one-unit corridor (radius < 0.5)".to_string(),
            });
        }
        if self.starting_lives == 0 {
            return Err(ConfigError::Invalid {
                field: "starting_lives",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.path_expansion_cap == 0 {
            return Err(ConfigError::Invalid {
                field: "path_expansion_cap",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.chase_replan_interval_ms == 0 || self.flee_replan_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "replan_interval_ms",
                reason: "replan intervals must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = EngineConfig::from_toml_str("").expect("empty config parses");
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn partial_document_overrides_only_named_fields() {
        let config = EngineConfig::from_toml_str(
            "starting_lives = 5\nflee_replan_interval_ms = 100\nghost_radius = 0.35\n",
        )
        .expect("partial config parses");
        assert_eq!(config.starting_lives, 5);
        assert_eq!(config.flee_replan_interval_ms, 100);
        assert_eq!(config.ghost_radius, 0.35);
        assert_eq!(config.chase_replan_interval_ms, CHASE_REPLAN_INTERVAL_MS);
        assert_eq!(config.path_expansion_cap, PATH_EXPANSION_CAP);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let err = EngineConfig::from_toml_str("ghost_radius = 0.5").expect_err("radius too big");
        assert!(matches!(err, ConfigError::Invalid { field: "ghost_radius", .. }));

        let err = EngineConfig::from_toml_str("player_speed = -1.0").expect_err("negative speed");
        assert!(matches!(err, ConfigError::Invalid { field: "player_speed", .. }));

        let err = EngineConfig::from_toml_str("path_expansion_cap = 0").expect_err("zero cap");
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "path_expansion_cap",
                ..
            }
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = EngineConfig::from_toml_str("starting_lives = \"three\"").expect_err("bad type");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = EngineConfig::load(Path::new("/definitely/not/here/engine.toml"))
            .expect_err("missing file");
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
