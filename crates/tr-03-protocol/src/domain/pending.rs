//! # Pending Request Store
//!
//! Correlates outbound V1 requests with reply frames by request id.
//!
//! Flow:
//! 1. `V1Session::send` builds a request frame and calls
//!    `register_pending_request()` to get a oneshot receiver
//! 2. The frame goes out on the channel
//! 3. The session reader sees a frame with `in_reply_to` and calls `complete()`
//! 4. `send` awaits the receiver bounded by the reply timeout
//!
//! A failed transport write calls `reject_pending_request()` so the waiter
//! learns the cause.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use shared_types::{NetworkMessage, PeerId};
use tokio::sync::oneshot;
use tracing::{debug, warn};
use uuid::Uuid;

use super::errors::SessionError;
use super::frame::V1Frame;
use crate::ports::outbound::{PendingRequests, ReplyResult};

struct PendingRequest {
    sender: oneshot::Sender<ReplyResult>,
    peer: PeerId,
    created_at: Instant,
    /// Request kind, for logging.
    kind: &'static str,
}

/// Counters for the pending store.
#[derive(Debug, Default)]
pub struct PendingStats {
    pub total_registered: AtomicU64,
    pub total_completed: AtomicU64,
    pub total_rejected: AtomicU64,
    pub total_timeouts: AtomicU64,
    /// Completions whose waiter had already gone away.
    pub total_abandoned: AtomicU64,
}

/// DashMap-backed [`PendingRequests`] implementation.
pub struct PendingRequestStore {
    pending: DashMap<Uuid, PendingRequest>,
    timeout: Duration,
    stats: PendingStats,
}

impl PendingRequestStore {
    /// Store whose `remove_expired` drops requests older than `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self {
            pending: DashMap::new(),
            timeout,
            stats: PendingStats::default(),
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, request_id: &Uuid) -> bool {
        self.pending.contains_key(request_id)
    }

    pub fn stats(&self) -> &PendingStats {
        &self.stats
    }

    /// Drop requests older than the store timeout. Their waiters observe a
    /// closed channel.
    pub fn remove_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;

        self.pending.retain(|id, request| {
            let elapsed = now.duration_since(request.created_at);
            if elapsed > self.timeout {
                warn!(
                    request_id = %id,
                    kind = request.kind,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Removing expired pending request"
                );
                self.stats.total_timeouts.fetch_add(1, Ordering::Relaxed);
                removed += 1;
                false
            } else {
                true
            }
        });

        removed
    }

    fn resolve(&self, request_id: Uuid, result: ReplyResult) -> bool {
        let Some((_, pending)) = self.pending.remove(&request_id) else {
            debug!(request_id = %request_id, "Reply for unknown or expired request");
            return false;
        };

        let counter = if result.is_ok() {
            &self.stats.total_completed
        } else {
            &self.stats.total_rejected
        };

        match pending.sender.send(result) {
            Ok(()) => {
                counter.fetch_add(1, Ordering::Relaxed);
                debug!(
                    request_id = %request_id,
                    peer = %hex::encode(&pending.peer[..4]),
                    kind = pending.kind,
                    response_time_ms = pending.created_at.elapsed().as_millis() as u64,
                    "Resolved pending request"
                );
                true
            }
            Err(_) => {
                self.stats.total_abandoned.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }
}

impl PendingRequests for PendingRequestStore {
    fn register_pending_request(
        &self,
        peer: PeerId,
        frame: &V1Frame,
    ) -> oneshot::Receiver<ReplyResult> {
        let (tx, rx) = oneshot::channel();
        self.pending.insert(
            frame.id,
            PendingRequest {
                sender: tx,
                peer,
                created_at: Instant::now(),
                kind: frame.message.kind(),
            },
        );
        self.stats.total_registered.fetch_add(1, Ordering::Relaxed);
        debug!(request_id = %frame.id, kind = frame.message.kind(), "Registered pending request");
        rx
    }

    fn complete(&self, request_id: Uuid, reply: NetworkMessage) -> bool {
        self.resolve(request_id, Ok(reply))
    }

    fn reject_pending_request(&self, request_id: Uuid, error: SessionError) -> bool {
        self.resolve(request_id, Err(error))
    }
}
