// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod config;
pub mod difficulty;
pub mod pause_gate;
pub mod registry;
pub mod scores;
pub mod session;
pub mod spawn;
pub mod target;
pub mod words;

/// Tick cadence of the game loop (~60 ticks/second).
pub const TICK_MS: u64 = 16;
