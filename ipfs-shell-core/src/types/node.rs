//! Node identity, version, bandwidth and key shapes.

use serde::{Deserialize, Serialize};

/// Output of `id`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdOutput {
    /// Peer ID.
    #[serde(rename = "ID")]
    pub id: String,
    /// Base64 public key.
    #[serde(rename = "PublicKey", default)]
    pub public_key: String,
    /// Listen multiaddrs; the daemon sends `null` when there are none.
    #[serde(rename = "Addresses", default, deserialize_with = "null_as_empty")]
    pub addresses: Vec<String>,
    /// Agent string, e.g. `kubo/0.29.0`.
    #[serde(rename = "AgentVersion", default)]
    pub agent_version: String,
    /// Protocol version string.
    #[serde(rename = "ProtocolVersion", default)]
    pub protocol_version: String,
}

/// Output of `version`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    /// Daemon version.
    #[serde(rename = "Version")]
    pub version: String,
    /// Build commit, empty for release builds.
    #[serde(rename = "Commit", default)]
    pub commit: String,
    /// Repository format version.
    #[serde(rename = "Repo", default)]
    pub repo: String,
    /// `arch/os` of the daemon host.
    #[serde(rename = "System", default)]
    pub system: String,
    /// Toolchain the daemon was built with.
    #[serde(rename = "Golang", default)]
    pub golang: String,
}

/// Output of `stats/bw`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BandwidthStats {
    /// Total bytes received.
    #[serde(rename = "TotalIn", default)]
    pub total_in: i64,
    /// Total bytes sent.
    #[serde(rename = "TotalOut", default)]
    pub total_out: i64,
    /// Receive rate in bytes/s.
    #[serde(rename = "RateIn", default)]
    pub rate_in: f64,
    /// Send rate in bytes/s.
    #[serde(rename = "RateOut", default)]
    pub rate_out: f64,
}

/// A keystore entry (`key/gen`, `key/list`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    /// Key name.
    #[serde(rename = "Name")]
    pub name: String,
    /// Peer ID derived from the key.
    #[serde(rename = "Id")]
    pub id: String,
}

/// Raw `key/list` response.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct KeyList {
    /// Keys in the keystore.
    #[serde(rename = "Keys", default, deserialize_with = "null_as_empty")]
    pub keys: Vec<Key>,
}

/// Decodes `null` as an empty collection.
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
