//! Publish/subscribe messaging.
//!
//! Two wire encodings exist. Daemons before the multibase switch take the
//! topic and payload as plain arguments and send payloads and the sender ID
//! as standard base64. Current daemons want the topic as a multibase `u`
//! string and the payload as a file body, and send every binary field in
//! multibase. See [`PubSubEncoding`].

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use bytes::Bytes;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use ipfs_shell_core::error::{Result, ShellError};
use ipfs_shell_core::types::PubSubRecord;

use crate::config::PubSubEncoding;
use crate::shell::Shell;
use crate::stream::JsonStream;

/// A message as it appears on the wire.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawMessage {
    #[serde(default)]
    from: String,
    #[serde(default)]
    data: String,
    #[serde(default)]
    seqno: String,
    #[serde(rename = "topicIDs", default)]
    topic_ids: Option<Vec<String>>,
}

impl RawMessage {
    /// The daemon writes an empty record to flush headers.
    fn is_flush(&self) -> bool {
        self.from.is_empty() && self.data.is_empty() && self.seqno.is_empty()
    }

    fn decode(self, encoding: PubSubEncoding) -> Result<PubSubRecord> {
        let topic_ids = self.topic_ids.unwrap_or_default();
        match encoding {
            PubSubEncoding::Legacy => Ok(PubSubRecord {
                from: legacy_peer_id(&self.from),
                data: decode_base64("data", &self.data)?,
                seqno: decode_base64("seqno", &self.seqno)?,
                topic_ids,
            }),
            PubSubEncoding::Multibase => Ok(PubSubRecord {
                from: self.from,
                data: decode_multibase("data", &self.data)?,
                seqno: decode_multibase("seqno", &self.seqno)?,
                topic_ids: topic_ids
                    .iter()
                    .map(|t| {
                        decode_multibase("topicIDs", t)
                            .map(|raw| String::from_utf8_lossy(&raw).into_owned())
                    })
                    .collect::<Result<_>>()?,
            }),
        }
    }
}

fn decode_base64(field: &str, value: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(value)
        .map_err(|e| ShellError::DecodeError(format!("pubsub/sub: {}: {}", field, e)))
}

/// Older daemons send the sender as base64 of the raw peer ID bytes; the
/// usual form is its base58 encoding. Anything else is kept as sent.
fn legacy_peer_id(from: &str) -> String {
    match STANDARD.decode(from) {
        Ok(raw) if !raw.is_empty() => bs58::encode(raw).into_string(),
        _ => from.to_string(),
    }
}

/// Decodes a base64-family multibase string (`u`, `U`, `m`, `M`).
pub(crate) fn decode_multibase(field: &str, value: &str) -> Result<Vec<u8>> {
    let mut chars = value.chars();
    let decoded = match chars.next() {
        None => return Ok(Vec::new()),
        Some('u') => URL_SAFE_NO_PAD.decode(chars.as_str()),
        Some('U') => URL_SAFE.decode(chars.as_str()),
        Some('m') => STANDARD_NO_PAD.decode(chars.as_str()),
        Some('M') => STANDARD.decode(chars.as_str()),
        Some(prefix) => {
            return Err(ShellError::DecodeError(format!(
                "pubsub/sub: {}: unsupported multibase prefix '{}'",
                field, prefix
            )))
        }
    };
    decoded.map_err(|e| ShellError::DecodeError(format!("pubsub/sub: {}: {}", field, e)))
}

/// Encodes `data` as multibase base64url (`u` prefix).
pub(crate) fn encode_multibase(data: &[u8]) -> String {
    format!("u{}", URL_SAFE_NO_PAD.encode(data))
}

/// Cancels a subscription from another task.
#[derive(Clone, Debug)]
pub struct SubscriptionHandle {
    token: CancellationToken,
}

impl SubscriptionHandle {
    /// Closes the subscription. A pending or later `next()` returns
    /// [`ShellError::SubscriptionClosed`].
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the subscription has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// An open subscription to a pubsub topic.
pub struct PubSubSubscription {
    topic: String,
    encoding: PubSubEncoding,
    stream: Option<JsonStream<RawMessage>>,
    token: CancellationToken,
}

impl PubSubSubscription {
    pub(crate) fn new(topic: String, encoding: PubSubEncoding, stream: JsonStream<RawMessage>) -> Self {
        Self {
            topic,
            encoding,
            stream: Some(stream),
            token: CancellationToken::new(),
        }
    }

    /// Topic this subscription listens on.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Waits for the next message.
    ///
    /// Flush records are skipped. Once the subscription is cancelled or the
    /// daemon closes the stream, every call returns
    /// [`ShellError::SubscriptionClosed`]. A message that fails to decode is
    /// returned as an error without closing the subscription.
    pub async fn next(&mut self) -> Result<PubSubRecord> {
        loop {
            let Some(stream) = self.stream.as_mut() else {
                return Err(ShellError::SubscriptionClosed);
            };

            let item = tokio::select! {
                biased;
                _ = self.token.cancelled() => None,
                item = stream.next() => item,
            };

            match item {
                Some(Ok(raw)) if raw.is_flush() => continue,
                Some(Ok(raw)) => return raw.decode(self.encoding),
                Some(Err(e)) => {
                    self.stream = None;
                    return Err(e);
                }
                None => {
                    debug!(topic = %self.topic, "Subscription closed");
                    self.stream = None;
                    return Err(ShellError::SubscriptionClosed);
                }
            }
        }
    }

    /// Closes the subscription and its connection.
    pub fn cancel(&mut self) {
        self.token.cancel();
        self.stream = None;
    }

    /// Returns a handle that can cancel this subscription from elsewhere.
    pub fn handle(&self) -> SubscriptionHandle {
        SubscriptionHandle {
            token: self.token.clone(),
        }
    }
}

impl Shell {
    /// Subscribes to `topic`.
    ///
    /// The subscription is exempt from the shell's request timeout.
    #[instrument(skip(self))]
    pub async fn pubsub_subscribe(&self, topic: &str) -> Result<PubSubSubscription> {
        let encoding = self.pubsub_encoding();
        let arg = match encoding {
            PubSubEncoding::Legacy => topic.to_string(),
            PubSubEncoding::Multibase => encode_multibase(topic.as_bytes()),
        };

        let stream = self
            .request("pubsub/sub")
            .argument(arg)
            .timeout(None)
            .exec_stream::<RawMessage>()
            .await?;

        debug!(topic, %encoding, "Subscribed");
        Ok(PubSubSubscription::new(topic.to_string(), encoding, stream))
    }

    /// Publishes `data` on `topic`.
    ///
    /// With the legacy encoding the payload travels as a query argument and
    /// must be valid UTF-8.
    #[instrument(skip(self, data))]
    pub async fn pubsub_publish(&self, topic: &str, data: impl Into<Bytes>) -> Result<()> {
        let data = data.into();
        match self.pubsub_encoding() {
            PubSubEncoding::Legacy => {
                let payload = std::str::from_utf8(&data).map_err(|_| {
                    ShellError::ConfigError(
                        "legacy pubsub encoding only publishes UTF-8 payloads".to_string(),
                    )
                })?;
                self.request("pubsub/pub")
                    .arguments([topic, payload])
                    .exec_discard()
                    .await
            }
            PubSubEncoding::Multibase => {
                self.request("pubsub/pub")
                    .argument(encode_multibase(topic.as_bytes()))
                    .body_file(data)?
                    .exec_discard()
                    .await
            }
        }
    }
}
