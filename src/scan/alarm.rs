//! The audible missing-item alarm.
//!
//! One [`Alarm`] is created by the application root and shared by reference.
//! While playing it rings its [`Chime`] every `interval` until stopped.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

/// One beat of the alarm sound.
pub trait Chime: Send + Sync + 'static {
    fn ring(&self);
}

/// Rings the terminal bell on stderr.
#[derive(Debug, Default)]
pub struct TerminalBell;

impl Chime for TerminalBell {
    fn ring(&self) {
        use std::io::Write;
        let mut stderr = std::io::stderr();
        let _ = stderr.write_all(b"\x07");
        let _ = stderr.flush();
    }
}

pub struct Alarm {
    chime: Arc<dyn Chime>,
    interval: Duration,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Alarm {
    pub fn new(chime: Arc<dyn Chime>, interval: Duration) -> Self {
        Self {
            chime,
            interval,
            task: Mutex::new(None),
        }
    }

    /// Start looping. A second start while playing does nothing.
    pub fn start(&self) {
        let mut task = self.lock();
        if task.as_ref().is_some_and(|t| !t.is_finished()) {
            return;
        }

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                tracing::warn!(error = %e, "no async runtime, alarm not started");
                return;
            }
        };

        let chime = Arc::clone(&self.chime);
        let interval = self.interval;
        *task = Some(runtime.spawn(async move {
            loop {
                chime.ring();
                tokio::time::sleep(interval).await;
            }
        }));
        tracing::debug!(interval_ms = interval.as_millis() as u64, "alarm started");
    }

    /// Stop the loop. Safe to call when not playing.
    pub fn stop(&self) {
        if let Some(task) = self.lock().take() {
            task.abort();
            tracing::debug!("alarm stopped");
        }
    }

    pub fn is_playing(&self) -> bool {
        self.lock().as_ref().is_some_and(|t| !t.is_finished())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        // A poisoned lock only means a panic mid-update of the handle slot.
        self.task.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for Alarm {
    fn drop(&mut self) {
        self.stop();
    }
}
