//! State shared by both session variants: the channel's write half, the
//! reader task and the close flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::domain::errors::SessionError;
use crate::ports::outbound::{ChannelFrame, ChannelSink, MuxConnection};

pub(super) struct SessionCore {
    pub connection: Arc<dyn MuxConnection>,
    sink: Arc<dyn ChannelSink>,
    closed: AtomicBool,
    reader: Mutex<Option<JoinHandle<()>>>,
}

impl SessionCore {
    pub fn new(connection: Arc<dyn MuxConnection>, sink: Arc<dyn ChannelSink>) -> Self {
        Self {
            connection,
            sink,
            closed: AtomicBool::new(false),
            reader: Mutex::new(None),
        }
    }

    pub fn set_reader(&self, handle: JoinHandle<()>) {
        if self.is_closed() {
            handle.abort();
            return;
        }
        *self.reader.lock() = Some(handle);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Mark closed and close the write half. Returns `false` if the session
    /// was already closed.
    pub fn shutdown(&self) -> bool {
        if self.closed.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.sink.close();
        true
    }

    /// Stop the reader task. Must not be called from the reader itself.
    pub fn abort_reader(&self) {
        if let Some(handle) = self.reader.lock().take() {
            handle.abort();
        }
    }

    pub async fn write(&self, frame: ChannelFrame) -> Result<(), SessionError> {
        if self.is_closed() {
            return Err(SessionError::Closed);
        }
        self.sink.send(frame).await.map_err(SessionError::from)
    }
}
