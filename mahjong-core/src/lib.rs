//! Mahjong room server core
//!
//! Runs [`mahjong_engine`] rooms as tokio actors behind a registry, decodes
//! client messages, and provides bot self-play and parallel batch
//! simulation for soak testing the engine.

pub mod config;
pub mod game_loop;
pub mod protocol;
pub mod registry;
pub mod room_actor;
pub mod seeding;
pub mod simulator;
