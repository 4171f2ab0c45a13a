use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::difficulty::Difficulty;
use crate::pause_gate::PauseGate;
use crate::registry::TargetRegistry;
use crate::scores::{ScoreEntry, ScoreSink};
use crate::spawn::spawn_target;
use crate::target::Target;
use crate::words::WordSource;
use crate::TICK_MS;

/// Lifecycle of one game session.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Paused,
    GameOver,
}

type Callback = Arc<dyn Fn() + Send + Sync>;

/// State shared between the controller and the loop thread.
struct Shared {
    phase: Mutex<Phase>,
    registry: TargetRegistry,
    gate: PauseGate,
    /// Loop-exit flag; observed between ticks and inside the gate.
    stop: AtomicBool,
    score: AtomicU32,
    center_x: AtomicI32,
    center_y: AtomicI32,
    /// f64 bits; written by the renderer, read by the loop.
    collision_radius: AtomicU64,
    difficulty: Mutex<Difficulty>,
    render: Mutex<Option<Callback>>,
    on_game_over: Mutex<Option<Callback>>,
    /// Latch so the terminal listener fires at most once per session.
    game_over_fired: AtomicBool,
    words: Arc<dyn WordSource>,
}

/// Owns the live game: the phase machine, the background tick loop,
/// and the player-facing operations.
///
/// Every method takes `&self` and is safe to call concurrently with
/// the loop's own tick; the registry mutex is the only lock on the hot
/// path and is never held across a call into the word source, the
/// score sink, or the render callback.
pub struct SessionController {
    shared: Arc<Shared>,
    scores: Arc<dyn ScoreSink>,
    loop_handle: Mutex<Option<JoinHandle<()>>>,
}

impl SessionController {
    pub fn new(words: Arc<dyn WordSource>, scores: Arc<dyn ScoreSink>) -> Self {
        Self {
            shared: Arc::new(Shared {
                phase: Mutex::new(Phase::Idle),
                registry: TargetRegistry::new(),
                gate: PauseGate::new(),
                stop: AtomicBool::new(false),
                score: AtomicU32::new(0),
                center_x: AtomicI32::new(0),
                center_y: AtomicI32::new(0),
                collision_radius: AtomicU64::new(0f64.to_bits()),
                difficulty: Mutex::new(Difficulty::Easy),
                render: Mutex::new(None),
                on_game_over: Mutex::new(None),
                game_over_fired: AtomicBool::new(false),
                words,
            }),
            scores,
            loop_handle: Mutex::new(None),
        }
    }

    /// Registers the listener fired exactly once per session, after
    /// the loop has stopped on a collision.
    pub fn on_game_over(&self, listener: impl Fn() + Send + Sync + 'static) {
        *self.shared.on_game_over.lock().unwrap() = Some(Arc::new(listener));
    }

    /// Starts a new session. No-op unless the phase is `Idle` or
    /// `GameOver`, so rapid repeated calls cannot spawn a second loop.
    pub fn start_game(&self, difficulty: Difficulty, render: impl Fn() + Send + Sync + 'static) {
        let shared = &self.shared;
        // The handle slot serializes concurrent starts: whoever holds
        // it decides whether a new loop may spawn.
        let mut handle_slot = self.loop_handle.lock().unwrap();
        match *shared.phase.lock().unwrap() {
            Phase::Idle | Phase::GameOver => {}
            Phase::Running | Phase::Paused => return,
        }

        // Reap the previous loop thread; it may still be draining its
        // last tick after a stop. Never join while holding the phase
        // lock: the exiting loop takes it for its final check.
        if let Some(handle) = handle_slot.take() {
            let _ = handle.join();
        }

        {
            let mut phase = shared.phase.lock().unwrap();
            shared.registry.clear();
            shared.score.store(0, Ordering::SeqCst);
            shared.stop.store(false, Ordering::SeqCst);
            shared.game_over_fired.store(false, Ordering::SeqCst);
            shared.gate.resume();
            *shared.difficulty.lock().unwrap() = difficulty;
            *shared.render.lock().unwrap() = Some(Arc::new(render));

            let profile = difficulty.profile();
            for _ in 0..profile.initial_target_count {
                spawn_target(&profile, &shared.registry, &*shared.words);
            }

            *phase = Phase::Running;
        }

        let loop_shared = Arc::clone(shared);
        *handle_slot = Some(thread::spawn(move || run_loop(loop_shared)));
    }

    /// Signals the loop to exit; safe from any state, including when
    /// no loop is running or the loop is parked in the pause gate.
    pub fn stop_game(&self) {
        let shared = &self.shared;
        shared.stop.store(true, Ordering::SeqCst);
        {
            let mut phase = shared.phase.lock().unwrap();
            if *phase != Phase::GameOver {
                *phase = Phase::Idle;
            }
        }
        // A paused loop must not outlive the session.
        shared.gate.wake();
    }

    /// Flips `Running` <-> `Paused`. No-op in `Idle` and `GameOver`.
    pub fn toggle_pause(&self) {
        let shared = &self.shared;
        let mut phase = shared.phase.lock().unwrap();
        match *phase {
            Phase::Running => {
                *phase = Phase::Paused;
                shared.gate.pause();
            }
            Phase::Paused => {
                *phase = Phase::Running;
                shared.gate.resume();
            }
            Phase::Idle | Phase::GameOver => {}
        }
    }

    /// Player keystroke path: exact-match removal plus one respawn.
    /// Empty input and misses are silently ignored.
    pub fn submit_input(&self, input: &str) {
        let shared = &self.shared;
        if *shared.phase.lock().unwrap() != Phase::Running {
            return;
        }
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return;
        }

        if shared.registry.remove_by_text(trimmed).is_none() {
            return;
        }

        let profile = shared.difficulty.lock().unwrap().profile();
        shared.score.fetch_add(profile.score_per_hit, Ordering::SeqCst);
        spawn_target(&profile, &shared.registry, &*shared.words);
    }

    /// Recorded for the next tick; last write wins.
    pub fn set_orbit_center(&self, x: i32, y: i32) {
        self.shared.center_x.store(x, Ordering::SeqCst);
        self.shared.center_y.store(y, Ordering::SeqCst);
    }

    /// Recorded for the next tick; last write wins.
    pub fn set_collision_radius(&self, radius: f64) {
        self.shared
            .collision_radius
            .store(radius.to_bits(), Ordering::SeqCst);
    }

    pub fn phase(&self) -> Phase {
        *self.shared.phase.lock().unwrap()
    }

    pub fn score(&self) -> u32 {
        self.shared.score.load(Ordering::SeqCst)
    }

    pub fn difficulty(&self) -> Difficulty {
        *self.shared.difficulty.lock().unwrap()
    }

    /// Independent copy of the live targets for rendering.
    pub fn snapshot(&self) -> Vec<Target> {
        self.shared.registry.snapshot()
    }

    pub fn target_count(&self) -> usize {
        self.shared.registry.len()
    }

    // Word-list passthroughs for the hosting UI.

    pub fn add_word(&self, word: &str) -> std::io::Result<()> {
        self.shared.words.add_word(word)
    }

    pub fn all_words(&self) -> Vec<String> {
        self.shared.words.all_words()
    }

    // Score-history passthroughs.

    /// Persists the current score under `name`; zero scores are not
    /// worth recording.
    pub fn save_score(&self, name: &str) -> rusqlite::Result<()> {
        let score = self.score();
        if score == 0 {
            return Ok(());
        }
        self.scores.save_score(name.trim(), score)
    }

    pub fn top_scores(&self, limit: usize) -> rusqlite::Result<Vec<ScoreEntry>> {
        self.scores.load_top_scores(limit)
    }

    /// Ranked "1. name - score" lines for display.
    pub fn top_scores_text(&self, limit: usize) -> rusqlite::Result<String> {
        let top = self.scores.load_top_scores(limit)?;
        if top.is_empty() {
            return Ok("No scores recorded yet.".to_string());
        }
        Ok(top
            .iter()
            .enumerate()
            .map(|(i, e)| format!("{}. {} - {}", i + 1, e.name, e.score))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.shared.stop.store(true, Ordering::SeqCst);
        self.shared.gate.wake();
        if let Some(handle) = self.loop_handle.lock().unwrap().take() {
            let _ = handle.join();
        }
    }
}

/// The background tick loop. Advances all targets, detects collisions
/// after the full sweep, notifies the renderer, and sleeps to the next
/// tick boundary. Parks in the pause gate while paused.
fn run_loop(shared: Arc<Shared>) {
    // Fixed for the whole session.
    let profile = shared.difficulty.lock().unwrap().profile();
    let render = shared.render.lock().unwrap().clone();
    let notify = |cb: &Option<Callback>| {
        if let Some(cb) = cb {
            cb();
        }
    };

    while !shared.stop.load(Ordering::SeqCst) {
        if shared.gate.is_paused() {
            // One frame on suspend (paused overlay), one on resume.
            notify(&render);
            shared.gate.wait_while_paused(&shared.stop);
            if shared.stop.load(Ordering::SeqCst) {
                break;
            }
            notify(&render);
        }

        let center_x = shared.center_x.load(Ordering::SeqCst);
        let center_y = shared.center_y.load(Ordering::SeqCst);
        let collision_radius = f64::from_bits(shared.collision_radius.load(Ordering::SeqCst));

        let crashed = shared.registry.advance_all(
            center_x,
            center_y,
            profile.radial_decay_rate,
            collision_radius,
        );

        if crashed {
            *shared.phase.lock().unwrap() = Phase::GameOver;
            shared.stop.store(true, Ordering::SeqCst);
            notify(&render);
            break;
        }

        notify(&render);
        thread::sleep(Duration::from_millis(TICK_MS));
    }

    // Terminal notification happens here, after the loop has stopped,
    // and at most once per session.
    if *shared.phase.lock().unwrap() == Phase::GameOver
        && !shared.game_over_fired.swap(true, Ordering::SeqCst)
    {
        let listener = shared.on_game_over.lock().unwrap().clone();
        notify(&listener);
    }
}
