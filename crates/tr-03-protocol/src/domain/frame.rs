//! # V1 Frame Codec
//!
//! Every V1 message travels as one bincode-encoded [`V1Frame`]. Requests carry
//! a fresh id; replies echo the request id in `in_reply_to`.

use bincode::Options;
use serde::{Deserialize, Serialize};
use shared_types::NetworkMessage;
use uuid::Uuid;

use super::errors::SessionError;

/// Upper bound on an encoded frame.
pub const MAX_FRAME_SIZE: u64 = 1024 * 1024;

/// A V1 wire frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct V1Frame {
    pub id: Uuid,
    /// Request this frame answers, if it is a reply.
    pub in_reply_to: Option<Uuid>,
    pub message: NetworkMessage,
}

fn codec() -> impl Options {
    bincode::options()
        .with_fixint_encoding()
        .with_limit(MAX_FRAME_SIZE)
}

impl V1Frame {
    pub fn request(message: NetworkMessage) -> Self {
        Self {
            id: Uuid::new_v4(),
            in_reply_to: None,
            message,
        }
    }

    pub fn reply(request_id: Uuid, message: NetworkMessage) -> Self {
        Self {
            id: Uuid::new_v4(),
            in_reply_to: Some(request_id),
            message,
        }
    }

    pub fn is_reply(&self) -> bool {
        self.in_reply_to.is_some()
    }

    pub fn encode(&self) -> Result<Vec<u8>, SessionError> {
        codec()
            .serialize(self)
            .map_err(|e| SessionError::Encode(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, SessionError> {
        codec()
            .deserialize(bytes)
            .map_err(|e| SessionError::Decode(e.to_string()))
    }
}
