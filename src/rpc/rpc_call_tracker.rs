use crate::rpc::RpcError;
use futures::FutureExt;
use futures::channel::oneshot;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::task::AbortHandle;

/// What a caller eventually sees for an outbound request.
pub type RpcCallOutcome = Result<Option<Vec<u8>>, RpcError>;

struct PendingCall {
    settle: oneshot::Sender<RpcCallOutcome>,
    watchdog: Option<AbortHandle>,
}

type PendingCalls = Mutex<HashMap<u64, PendingCall>>;

/// Correlates outbound requests with their eventual outcome.
///
/// Each tracked ID settles exactly once: by `resolve`, `reject`, its timeout
/// watchdog, or `reject_all`. Whichever removes the entry first wins; every
/// later attempt finds nothing and is a no-op.
///
/// Arming a timeout spawns a Tokio task, so `create` and `arm_timeout` must be
/// called from within a Tokio runtime.
pub struct RpcCallTracker {
    pending: Arc<PendingCalls>,
}

impl Default for RpcCallTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl RpcCallTracker {
    pub fn new() -> Self {
        Self {
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Tracks `id` and, with `Some(timeout)`, starts its watchdog.
    ///
    /// `None` disables the watchdog; the call then waits until it is settled
    /// some other way.
    pub fn create(&self, id: u64, timeout: Option<Duration>) -> RpcPendingCall {
        let pending_call = self.register(id);

        if let Some(timeout) = timeout {
            self.arm_timeout(id, timeout);
        }

        pending_call
    }

    /// Tracks `id` without a watchdog.
    ///
    /// If `id` is still pending, that earlier call is rejected with the
    /// superseded error.
    pub fn register(&self, id: u64) -> RpcPendingCall {
        let (settle, receiver) = oneshot::channel();

        let previous = lock(&self.pending).insert(
            id,
            PendingCall {
                settle,
                watchdog: None,
            },
        );

        if let Some(previous) = previous {
            tracing::warn!("RPC call id {} was re-registered while pending", id);
            if let Some(watchdog) = previous.watchdog {
                watchdog.abort();
            }
            let _ = previous.settle.send(Err(RpcError::superseded()));
        }

        RpcPendingCall { id, receiver }
    }

    /// Starts the timeout watchdog for an already tracked `id`.
    ///
    /// Returns `false` (and starts nothing) if `id` has already settled.
    pub fn arm_timeout(&self, id: u64, timeout: Duration) -> bool {
        let mut guard = lock(&self.pending);
        let Some(call) = guard.get_mut(&id) else {
            return false;
        };

        // Firing needs this lock, so the handle is recorded before it can settle anything.
        let pending = Arc::downgrade(&self.pending);
        let watchdog = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            fire_timeout(pending, id);
        });

        if let Some(replaced) = call.watchdog.replace(watchdog.abort_handle()) {
            replaced.abort();
        }
        true
    }

    /// Fulfils the call with `result`. Returns `false` for unknown IDs.
    pub fn resolve(&self, id: u64, result: Option<Vec<u8>>) -> bool {
        settle(&self.pending, id, Ok(result))
    }

    /// Fails the call with `error`. Returns `false` for unknown IDs.
    pub fn reject(&self, id: u64, error: RpcError) -> bool {
        settle(&self.pending, id, Err(error))
    }

    /// Stops tracking `id` without settling it.
    pub fn discard(&self, id: u64) -> bool {
        match lock(&self.pending).remove(&id) {
            Some(call) => {
                if let Some(watchdog) = call.watchdog {
                    watchdog.abort();
                }
                true
            }
            None => false,
        }
    }

    /// Fails every pending call with `error`. Returns how many were settled.
    pub fn reject_all(&self, error: RpcError) -> usize {
        let drained: Vec<PendingCall> = lock(&self.pending).drain().map(|(_, c)| c).collect();
        let count = drained.len();

        for call in drained {
            if let Some(watchdog) = call.watchdog {
                watchdog.abort();
            }
            let _ = call.settle.send(Err(error.clone()));
        }

        count
    }

    pub fn contains(&self, id: u64) -> bool {
        lock(&self.pending).contains_key(&id)
    }

    pub fn len(&self) -> usize {
        lock(&self.pending).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for RpcCallTracker {
    fn drop(&mut self) {
        for call in lock(&self.pending).values() {
            if let Some(watchdog) = &call.watchdog {
                watchdog.abort();
            }
        }
    }
}

fn lock(pending: &PendingCalls) -> std::sync::MutexGuard<'_, HashMap<u64, PendingCall>> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

fn settle(pending: &PendingCalls, id: u64, outcome: RpcCallOutcome) -> bool {
    // Removal is the exactly-once guard; the lock is released before waking the waiter.
    let call = lock(pending).remove(&id);

    match call {
        Some(call) => {
            if let Some(watchdog) = call.watchdog {
                watchdog.abort();
            }
            // The receiver may already be gone if the caller stopped waiting.
            let _ = call.settle.send(outcome);
            true
        }
        None => false,
    }
}

fn fire_timeout(pending: Weak<PendingCalls>, id: u64) {
    let Some(pending) = pending.upgrade() else {
        return;
    };

    if settle(&pending, id, Err(RpcError::timeout())) {
        tracing::debug!("RPC call {} timed out", id);
    }
}

/// The waiting side of a tracked call; resolves to the call's outcome.
///
/// If the tracker is dropped before the call settles, it resolves to the
/// node-stopped error.
#[must_use = "a pending call does nothing unless awaited"]
pub struct RpcPendingCall {
    id: u64,
    receiver: oneshot::Receiver<RpcCallOutcome>,
}

impl RpcPendingCall {
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Future for RpcPendingCall {
    type Output = RpcCallOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.receiver
            .poll_unpin(cx)
            .map(|received| received.unwrap_or_else(|_| Err(RpcError::node_stopped())))
    }
}
