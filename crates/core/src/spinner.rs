use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
const FRAME_INTERVAL: Duration = Duration::from_millis(100);

/// Status line redrawn on stderr by a background thread until stopped.
///
/// Purely cosmetic: the only state shared with the thread is the run flag.
pub struct Spinner {
    message: String,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Spinner {
    pub fn start(message: impl Into<String>) -> Self {
        let message = message.into();
        let running = Arc::new(AtomicBool::new(true));

        let flag = Arc::clone(&running);
        let line = message.clone();
        let handle = thread::spawn(move || {
            let mut stderr = io::stderr();
            for frame in FRAMES.iter().cycle() {
                if !flag.load(Ordering::Relaxed) {
                    break;
                }
                let _ = write!(stderr, "\r{frame} {line}...");
                let _ = stderr.flush();
                thread::sleep(FRAME_INTERVAL);
            }
        });

        Self {
            message,
            running,
            handle: Some(handle),
        }
    }

    pub fn frame(index: usize) -> char {
        FRAMES[index % FRAMES.len()]
    }

    /// Stops the thread and blanks the status line. Idempotent.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        let Some(handle) = self.handle.take() else {
            return;
        };
        let _ = handle.join();

        let width = self.message.chars().count() + 10;
        let mut stderr = io::stderr();
        let _ = write!(stderr, "\r{}\r", " ".repeat(width));
        let _ = stderr.flush();
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.stop();
    }
}
