//! Decoded pubsub messages.

use serde::{Deserialize, Serialize};

/// A message received on a pubsub subscription.
///
/// Payload fields are already decoded from their wire encoding.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PubSubRecord {
    /// Peer ID of the publisher.
    pub from: String,
    /// Message payload.
    pub data: Vec<u8>,
    /// Publisher sequence number.
    pub seqno: Vec<u8>,
    /// Topics the message was published on.
    pub topic_ids: Vec<String>,
}

impl PubSubRecord {
    /// Returns the payload as UTF-8, if it is valid.
    pub fn data_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }
}
