use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

/// When to hold the console open after a session ends.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PausePolicy {
    /// Windows consoles attached to a terminal only.
    #[default]
    Auto,
    Always,
    Never,
}

pub fn should_pause(policy: PausePolicy, is_windows: bool, stdin_is_terminal: bool) -> bool {
    match policy {
        PausePolicy::Always => stdin_is_terminal,
        PausePolicy::Never => false,
        PausePolicy::Auto => is_windows && stdin_is_terminal,
    }
}

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

const NOT_PAUSED: i32 = -1;
static PAUSE_EXIT_CODE: AtomicI32 = AtomicI32::new(NOT_PAUSED);

/// Records a user interrupt. Safe to call from a signal handler thread.
pub fn mark_interrupted() {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Records a user interrupt and, if the console is being held open, returns
/// the exit code the session already settled on.
pub fn interrupt() -> Option<u8> {
    mark_interrupted();
    u8::try_from(PAUSE_EXIT_CODE.load(Ordering::SeqCst)).ok()
}

/// Marks the start of an exit pause for a session ending with `code`.
pub fn begin_pause(code: u8) {
    PAUSE_EXIT_CODE.store(i32::from(code), Ordering::SeqCst);
}

pub fn end_pause() {
    PAUSE_EXIT_CODE.store(NOT_PAUSED, Ordering::SeqCst);
}

pub fn was_interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}
