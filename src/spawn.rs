use rand::Rng;
use std::f64::consts::TAU;

use crate::difficulty::DifficultyProfile;
use crate::registry::TargetRegistry;
use crate::target::Target;
use crate::words::WordSource;

/// Upper bound on duplicate-rejection retries per spawn. When the word
/// source cannot produce a text that is not already live within this
/// many samples, the spawn gives up rather than busy-loop or admit a
/// duplicate.
pub const MAX_SPAWN_ATTEMPTS: usize = 100;

/// Samples a fresh target from `source` and inserts it into
/// `registry`.
///
/// Candidate words are rejected until one is found whose text matches
/// no currently-live target, keeping the registry duplicate-free.
/// Returns the spawned text, or `None` if the source ran out of
/// distinct words within [`MAX_SPAWN_ATTEMPTS`].
///
/// The registry lock is only taken for the membership probe and the
/// final insert, never across a call into the word source.
pub fn spawn_target(
    profile: &DifficultyProfile,
    registry: &TargetRegistry,
    source: &dyn WordSource,
) -> Option<String> {
    let mut text = None;
    for _ in 0..MAX_SPAWN_ATTEMPTS {
        let candidate = source.random_word();
        if !registry.contains_text(&candidate) {
            text = Some(candidate);
            break;
        }
    }
    let text = text?;

    let mut rng = rand::thread_rng();
    let (radius_min, radius_max) = profile.spawn_radius_range;
    let (speed_min, speed_max) = profile.angular_speed_range;
    let radius = rng.gen_range(radius_min..radius_max);
    let angle = rng.gen_range(0.0..TAU);
    let angular_speed = rng.gen_range(speed_min..speed_max);

    registry.insert(Target::new(text.clone(), radius, angle, angular_speed));
    Some(text)
}
