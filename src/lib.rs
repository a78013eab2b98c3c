pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod levels;
pub mod rng;
pub mod types;
pub mod walls;
pub mod world;
