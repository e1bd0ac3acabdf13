// src/lib.rs
pub mod config;
pub mod core;
pub mod library;
pub mod player;
pub mod scheduler;
pub mod testing;

pub use config::{Config, ConfigSource, LogLevel};
pub use crate::core::{ComponentLogger, LogContext, Shutdown};
pub use library::AudioLibrary;
pub use player::{PlayOutcome, Player, RodioPlayer};
pub use scheduler::{CycleReport, Scheduler};
