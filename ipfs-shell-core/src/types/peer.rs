//! Swarm, DHT and bootstrap shapes.

use serde::{Deserialize, Serialize};

use super::node::null_as_empty;

/// Peer list returned by the `bootstrap/*` commands.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PeersList {
    /// Bootstrap multiaddrs.
    #[serde(rename = "Peers", default, deserialize_with = "null_as_empty")]
    pub peers: Vec<String>,
}

/// A peer and its known addresses.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerInfo {
    /// Known multiaddrs.
    #[serde(rename = "Addrs", default, deserialize_with = "null_as_empty")]
    pub addrs: Vec<String>,
    /// Peer ID.
    #[serde(rename = "ID")]
    pub id: String,
}

/// One record of the `dht/findpeer` event stream.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct FindPeerOutput {
    /// Peers found by this query event.
    #[serde(rename = "Responses", default, deserialize_with = "null_as_empty")]
    pub responses: Vec<PeerInfo>,
}

/// A stream open on a swarm connection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwarmStreamInfo {
    /// Protocol ID of the stream.
    #[serde(rename = "Protocol", default)]
    pub protocol: String,
}

/// A connected peer as reported by `swarm/peers`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwarmConnInfo {
    /// Remote multiaddr.
    #[serde(rename = "Addr")]
    pub addr: String,
    /// Remote peer ID.
    #[serde(rename = "Peer")]
    pub peer: String,
    /// Latency, when requested.
    #[serde(rename = "Latency", default)]
    pub latency: String,
    /// Stream multiplexer, when requested.
    #[serde(rename = "Muxer", default)]
    pub muxer: String,
    /// Open streams, when requested.
    #[serde(rename = "Streams", default, deserialize_with = "null_as_empty")]
    pub streams: Vec<SwarmStreamInfo>,
}

/// Output of `swarm/peers`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwarmConnInfos {
    /// Connected peers.
    #[serde(rename = "Peers", default, deserialize_with = "null_as_empty")]
    pub peers: Vec<SwarmConnInfo>,
}
