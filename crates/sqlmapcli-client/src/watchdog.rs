//! Deferred kill for bounded scan runs.

use crate::protocol::{self, Ack, StatusResponse};
use crate::transport::Transport;
use sqlmapcli_core::TaskId;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::AbortHandle;

const ARMED: u8 = 0;
const CHECKING: u8 = 1;
const KILLING: u8 = 2;
const DISARMED: u8 = 3;

/// Kills a remote task that has not finished when a deadline passes.
///
/// The timer runs as a separate tokio task. Dropping the watchdog disarms
/// it, so every exit path of the guarded run cancels the pending kill.
#[derive(Debug)]
pub struct KillWatchdog {
    handle: Option<AbortHandle>,
    state: Arc<AtomicU8>,
    fired: Arc<AtomicBool>,
}

impl KillWatchdog {
    /// Arm a watchdog for `task_id` that fires after `timeout`.
    ///
    /// When it fires it asks the server for the task's status and sends a
    /// kill unless the task reports `terminated`. A failed status query
    /// counts as not terminated.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn arm(transport: Transport, task_id: TaskId, timeout: Duration) -> Self {
        let state = Arc::new(AtomicU8::new(ARMED));
        let fired = Arc::new(AtomicBool::new(false));
        let watch_state = Arc::clone(&state);
        let watch_fired = Arc::clone(&fired);

        let handle = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            if !advance(&watch_state, ARMED, CHECKING) {
                return;
            }
            watch_fired.store(true, Ordering::SeqCst);

            let finished = transport
                .get::<StatusResponse>(&protocol::scan_status(&task_id))
                .await
                .is_ok_and(|r| r.status.is_terminal());
            if finished {
                tracing::debug!("Task<{}> finished before timeout, nothing to kill", task_id);
                return;
            }

            // Disarmed while the status check was in flight.
            if !advance(&watch_state, CHECKING, KILLING) {
                return;
            }
            tracing::warn!(
                "Task<{}> still running after {}s, killing it",
                task_id,
                timeout.as_secs_f64()
            );
            if transport
                .get::<Ack>(&protocol::scan_kill(&task_id))
                .await
                .is_ok()
            {
                tracing::info!("Kill task<{}>", task_id);
            }
        });

        Self {
            handle: Some(handle.abort_handle()),
            state,
            fired,
        }
    }

    /// Cancel the pending kill. Calling this more than once is a no-op.
    ///
    /// A kill request that has already been sent is left to complete;
    /// anything before that, including an in-flight status check, is
    /// cancelled.
    pub fn disarm(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        let cancelled = advance(&self.state, ARMED, DISARMED)
            || advance(&self.state, CHECKING, DISARMED);
        if cancelled {
            handle.abort();
        }
    }

    /// Whether the deadline passed before the watchdog was disarmed.
    #[must_use]
    pub fn fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    /// Whether the watchdog sent a kill request.
    #[must_use]
    pub fn killed(&self) -> bool {
        self.state.load(Ordering::SeqCst) == KILLING
    }
}

fn advance(state: &AtomicU8, from: u8, to: u8) -> bool {
    state
        .compare_exchange(from, to, Ordering::SeqCst, Ordering::SeqCst)
        .is_ok()
}

impl Drop for KillWatchdog {
    fn drop(&mut self) {
        self.disarm();
    }
}
