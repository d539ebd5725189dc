pub mod config;
pub mod shared;
pub mod simulation;
