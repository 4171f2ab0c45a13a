use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Difficulty tier selected at game start.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    ValueEnum,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Easy
    }
}

/// Tunable constants for one difficulty tier.
///
/// All per-tick quantities assume the fixed loop cadence in
/// `crate::TICK_MS`; angular speeds are radians per tick.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DifficultyProfile {
    pub initial_target_count: usize,
    /// Distance from the orbit center at spawn, sampled uniformly.
    pub spawn_radius_range: (f64, f64),
    /// Radians per tick, sampled uniformly per target at spawn.
    pub angular_speed_range: (f64, f64),
    /// Radius lost per tick; constant for the tier.
    pub radial_decay_rate: f64,
    pub score_per_hit: u32,
}

impl Difficulty {
    pub fn profile(&self) -> DifficultyProfile {
        match self {
            Difficulty::Easy => DifficultyProfile {
                initial_target_count: 6,
                spawn_radius_range: (240.0, 280.0),
                angular_speed_range: (0.005, 0.010),
                radial_decay_rate: 0.11,
                score_per_hit: 10,
            },
            Difficulty::Normal => DifficultyProfile {
                initial_target_count: 7,
                spawn_radius_range: (235.0, 265.0),
                angular_speed_range: (0.0075, 0.0175),
                radial_decay_rate: 0.17,
                score_per_hit: 20,
            },
            Difficulty::Hard => DifficultyProfile {
                initial_target_count: 8,
                spawn_radius_range: (230.0, 260.0),
                angular_speed_range: (0.0085, 0.0185),
                radial_decay_rate: 0.2,
                score_per_hit: 30,
            },
        }
    }
}
