use glam::Vec3;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Personality {
    Direct,
    AmbusherNear,
    AmbusherFar,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostState {
    Chasing,
    Fleeing,
    Respawning,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchState {
    NotStarted,
    Running,
    Paused,
    Over,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraMode {
    #[default]
    Overhead,
    Chase,
    FirstPerson,
}

impl CameraMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "overhead" => Some(Self::Overhead),
            "chase" => Some(Self::Chase),
            "first_person" => Some(Self::FirstPerson),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputSnapshot {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub camera_mode: CameraMode,
    pub camera_yaw: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOverReason {
    Victory,
    OutOfLives,
}

#[derive(Clone, Debug, Serialize)]
pub struct PlayerView {
    pub position: Vec3,
    pub orientation: f32,
    pub lives: u32,
    pub score: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct GhostView {
    pub id: usize,
    pub color: u32,
    pub personality: Personality,
    pub state: GhostState,
    pub position: Vec3,
    pub orientation: f32,
    pub flashing: bool,
    pub visibility: f32,
}

#[derive(Clone, Debug, Serialize)]
pub struct TeleportZoneView {
    pub position: Vec3,
    pub exit: Vec3,
    pub flashing: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    GameStarted,
    PelletCollected {
        position: Vec3,
    },
    PowerUpStarted {
        duration_ms: u64,
    },
    PowerUpExpired,
    GhostCaptured {
        ghost_id: usize,
        points: u32,
    },
    PlayerDied {
        ghost_id: usize,
    },
    Teleported {
        from: Vec3,
        to: Vec3,
    },
    LevelAdvanced {
        level: u32,
    },
    GameOver {
        reason: GameOverReason,
    },
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub elapsed_ms: u64,
    pub state: MatchState,
    pub level: u32,
    pub score: u32,
    pub lives: u32,
    pub paused: bool,
    pub game_over: bool,
    pub victory: bool,
    pub pellets_remaining: usize,
    pub power_ups_remaining: usize,
    pub power_up_remaining_ms: u64,
    pub capture_multiplier: u32,
    pub player: PlayerView,
    pub ghosts: Vec<GhostView>,
    pub teleport_zones: Vec<TeleportZoneView>,
    pub events: Vec<RuntimeEvent>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct MatchStats {
    pub pellets: u32,
    pub power_ups: u32,
    pub captures: u32,
    pub deaths: u32,
    pub teleports: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct GameSummary {
    pub reason: Option<GameOverReason>,
    pub level: u32,
    pub score: u32,
    pub lives: u32,
    pub duration_ms: u64,
    pub stats: MatchStats,
}
