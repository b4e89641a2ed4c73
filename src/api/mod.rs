//! Public pool API.

pub mod config;
pub mod pool;
pub mod releaser;
pub mod stats;
