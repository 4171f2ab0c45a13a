use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex};

/// Suspend/resume primitive for the game loop.
///
/// The loop parks in [`PauseGate::wait_while_paused`] whenever the
/// paused flag is up; `resume` (or `wake`, used on shutdown) releases
/// it. Waits re-check the flag on every wakeup, so spurious wakes and
/// pause-again races are harmless.
#[derive(Debug, Default)]
pub struct PauseGate {
    paused: Mutex<bool>,
    cond: Condvar,
}

impl PauseGate {
    pub fn new() -> Self {
        Self {
            paused: Mutex::new(false),
            cond: Condvar::new(),
        }
    }

    pub fn pause(&self) {
        *self.paused.lock().unwrap() = true;
    }

    pub fn resume(&self) {
        *self.paused.lock().unwrap() = false;
        self.cond.notify_all();
    }

    pub fn is_paused(&self) -> bool {
        *self.paused.lock().unwrap()
    }

    /// Wakes any waiter without clearing the paused flag. Used by the
    /// stop path so a paused loop can observe cancellation instead of
    /// parking forever.
    pub fn wake(&self) {
        self.cond.notify_all();
    }

    /// Blocks while the gate is paused and `cancelled` is unset.
    /// Returns as soon as either the gate resumes or `cancelled`
    /// becomes true.
    pub fn wait_while_paused(&self, cancelled: &AtomicBool) {
        let mut paused = self.paused.lock().unwrap();
        while *paused && !cancelled.load(Ordering::SeqCst) {
            paused = self.cond.wait(paused).unwrap();
        }
    }
}
