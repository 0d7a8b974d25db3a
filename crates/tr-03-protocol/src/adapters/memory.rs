//! # In-Memory Mux Transport
//!
//! A pair of [`MemoryConnection`]s joined back to back. Each protocol tag
//! gets its own bounded duplex channel, opened lazily by whichever end asks
//! first. Used by the runtime's loopback mode and by tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::PeerId;
use tokio::sync::mpsc;
use tracing::debug;

use crate::domain::errors::TransportError;
use crate::ports::outbound::{ChannelFrame, ChannelSink, MuxChannel, MuxConnection};

const DEFAULT_CAPACITY: usize = 64;

/// Both directions of one protocol channel, indexed by side.
struct Duplex {
    inbound: [Option<mpsc::Receiver<ChannelFrame>>; 2],
    outbound: [Option<mpsc::Sender<ChannelFrame>>; 2],
}

impl Duplex {
    fn new(capacity: usize) -> Self {
        let (to_zero, from_zero) = mpsc::channel(capacity);
        let (to_one, from_one) = mpsc::channel(capacity);
        Self {
            inbound: [Some(from_zero), Some(from_one)],
            outbound: [Some(to_one), Some(to_zero)],
        }
    }
}

struct Link {
    destroyed: Arc<AtomicBool>,
    reason: Mutex<Option<String>>,
    channels: Mutex<HashMap<&'static str, Duplex>>,
    sinks: Mutex<Vec<Arc<MemorySink>>>,
    capacity: usize,
}

struct MemorySink {
    tx: Mutex<Option<mpsc::Sender<ChannelFrame>>>,
    destroyed: Arc<AtomicBool>,
}

#[async_trait]
impl ChannelSink for MemorySink {
    async fn send(&self, frame: ChannelFrame) -> Result<(), TransportError> {
        if self.destroyed.load(Ordering::Acquire) {
            return Err(TransportError::Destroyed);
        }
        let tx = self
            .tx
            .lock()
            .clone()
            .ok_or(TransportError::ChannelClosed)?;
        tx.send(frame)
            .await
            .map_err(|_| TransportError::ChannelClosed)
    }

    fn close(&self) {
        self.tx.lock().take();
    }
}

/// One end of an in-memory connection.
pub struct MemoryConnection {
    side: usize,
    local: PeerId,
    remote: PeerId,
    link: Arc<Link>,
}

/// Two connected ends: the first is `a`'s view of `b`, the second `b`'s view
/// of `a`.
pub fn memory_pair(a: PeerId, b: PeerId) -> (Arc<MemoryConnection>, Arc<MemoryConnection>) {
    memory_pair_with_capacity(a, b, DEFAULT_CAPACITY)
}

/// [`memory_pair`] with an explicit per-direction buffer size.
pub fn memory_pair_with_capacity(
    a: PeerId,
    b: PeerId,
    capacity: usize,
) -> (Arc<MemoryConnection>, Arc<MemoryConnection>) {
    let link = Arc::new(Link {
        destroyed: Arc::new(AtomicBool::new(false)),
        reason: Mutex::new(None),
        channels: Mutex::new(HashMap::new()),
        sinks: Mutex::new(Vec::new()),
        capacity,
    });
    (
        Arc::new(MemoryConnection {
            side: 0,
            local: a,
            remote: b,
            link: link.clone(),
        }),
        Arc::new(MemoryConnection {
            side: 1,
            local: b,
            remote: a,
            link,
        }),
    )
}

impl MemoryConnection {
    pub fn local_peer(&self) -> PeerId {
        self.local
    }

    /// Reason passed to the first `destroy` call.
    pub fn destroy_reason(&self) -> Option<String> {
        self.link.reason.lock().clone()
    }
}

impl MuxConnection for MemoryConnection {
    fn remote_peer(&self) -> PeerId {
        self.remote
    }

    fn open_channel(&self, protocol: &'static str) -> Result<MuxChannel, TransportError> {
        if self.is_destroyed() {
            return Err(TransportError::Destroyed);
        }

        let mut channels = self.link.channels.lock();
        let duplex = channels
            .entry(protocol)
            .or_insert_with(|| Duplex::new(self.link.capacity));

        let (Some(inbound), Some(tx)) = (
            duplex.inbound[self.side].take(),
            duplex.outbound[self.side].take(),
        ) else {
            return Err(TransportError::ChannelInUse(protocol));
        };

        let sink = Arc::new(MemorySink {
            tx: Mutex::new(Some(tx)),
            destroyed: self.link.destroyed.clone(),
        });
        self.link.sinks.lock().push(sink.clone());

        debug!(protocol, side = self.side, "[tr-03] Memory channel opened");
        Ok(MuxChannel { sink, inbound })
    }

    fn destroy(&self, reason: &str) {
        if self.link.destroyed.swap(true, Ordering::AcqRel) {
            return;
        }
        *self.link.reason.lock() = Some(reason.to_string());

        for sink in self.link.sinks.lock().drain(..) {
            sink.close();
        }
        self.link.channels.lock().clear();
        debug!(reason, "[tr-03] Memory connection destroyed");
    }

    fn is_destroyed(&self) -> bool {
        self.link.destroyed.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::NetworkMessage;

    const TAG: &str = "test/proto";

    #[tokio::test]
    async fn test_frames_cross_the_link() {
        let (a, b) = memory_pair([1u8; 32], [2u8; 32]);
        assert_eq!(a.remote_peer(), [2u8; 32]);
        assert_eq!(b.remote_peer(), [1u8; 32]);

        let a_channel = a.open_channel(TAG).unwrap();
        let mut b_channel = b.open_channel(TAG).unwrap();

        let frame = ChannelFrame::Structured(NetworkMessage::Ack { accepted: true });
        a_channel.sink.send(frame.clone()).await.unwrap();
        assert_eq!(b_channel.inbound.recv().await, Some(frame));
    }

    #[test]
    fn test_channel_opens_once_per_side() {
        let (a, _b) = memory_pair([1u8; 32], [2u8; 32]);
        let _channel = a.open_channel(TAG).unwrap();
        assert!(matches!(
            a.open_channel(TAG),
            Err(TransportError::ChannelInUse(TAG))
        ));
    }

    #[tokio::test]
    async fn test_destroy_ends_both_sides() {
        let (a, b) = memory_pair([1u8; 32], [2u8; 32]);
        let a_channel = a.open_channel(TAG).unwrap();
        let mut b_channel = b.open_channel(TAG).unwrap();

        b.destroy("test");
        assert!(a.is_destroyed());
        assert_eq!(a.destroy_reason().as_deref(), Some("test"));
        assert_eq!(b_channel.inbound.recv().await, None);
        assert_eq!(
            a_channel
                .sink
                .send(ChannelFrame::Binary(vec![1]))
                .await
                .unwrap_err(),
            TransportError::Destroyed
        );
        assert!(matches!(a.open_channel("other"), Err(TransportError::Destroyed)));
    }
}
