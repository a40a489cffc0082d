//! Deterministic risk scoring and verdict classification for corporate debt claims.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
