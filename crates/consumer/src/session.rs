//! Single-session subscription state.
//!
//! At most one subscription is active per process. The running flag and
//! topic set live behind one mutex, so concurrent start calls serialize
//! and the no-op-when-running semantics hold under parallel execution.

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct State {
    topics: Vec<String>,
    // Some(token) while the receive loop runs; the token stops it.
    cancel: Option<CancellationToken>,
    // Bumped on every successful start. Rollbacks quote the epoch of the
    // start they revert, so a stale rollback cannot touch a successor.
    epoch: u64,
}

/// Status snapshot for the control endpoints.
#[derive(Debug, Clone)]
pub struct SessionStatus {
    pub is_consuming: bool,
    pub topics: Vec<String>,
}

/// Outcome of a start request.
#[derive(Debug)]
pub enum StartOutcome {
    /// The session was stopped; the caller owns the new loop token and
    /// must either spawn the receive loop or roll back, quoting `epoch`.
    Started {
        token: CancellationToken,
        epoch: u64,
    },
    /// Already running. Carries the existing topic set, unchanged.
    AlreadyRunning(Vec<String>),
}

#[derive(Default)]
pub struct SubscriptionSession {
    inner: Mutex<State>,
}

impl SubscriptionSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move `Stopped -> Running` with the given topic set.
    ///
    /// Starting while already running is a no-op that reports the existing
    /// state rather than erroring.
    pub async fn start(&self, topics: Vec<String>) -> StartOutcome {
        let mut state = self.inner.lock().await;

        if state.cancel.is_some() {
            tracing::info!("Consumer is already running");
            return StartOutcome::AlreadyRunning(state.topics.clone());
        }

        let token = CancellationToken::new();
        state.topics = topics;
        state.cancel = Some(token.clone());
        state.epoch += 1;
        StartOutcome::Started {
            token,
            epoch: state.epoch,
        }
    }

    /// Revert a failed start: back to `Stopped`.
    ///
    /// Only the session started at `epoch` is reverted. The subscribe that
    /// follows a start runs outside the session lock, so by the time a
    /// failure comes back the session may already have been stopped and
    /// restarted; a stale rollback must leave that successor running.
    pub async fn rollback(&self, epoch: u64) {
        let mut state = self.inner.lock().await;
        if state.epoch != epoch {
            return;
        }
        if let Some(token) = state.cancel.take() {
            token.cancel();
        }
        state.topics.clear();
    }

    /// Move `Running -> Stopped`, cancelling the receive loop. Stopping
    /// while stopped is a no-op. Returns whether a loop was cancelled.
    pub async fn stop(&self) -> bool {
        let mut state = self.inner.lock().await;
        match state.cancel.take() {
            Some(token) => {
                token.cancel();
                state.topics.clear();
                tracing::info!("Consumer stopped");
                true
            }
            None => false,
        }
    }

    pub async fn status(&self) -> SessionStatus {
        let state = self.inner.lock().await;
        SessionStatus {
            is_consuming: state.cancel.is_some(),
            topics: state.topics.clone(),
        }
    }
}
