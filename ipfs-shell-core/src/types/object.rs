//! Object, block, DAG and refs shapes.

use serde::{Deserialize, Serialize};

use super::lenient;
use super::node::null_as_empty;

/// Result of `add`: one entry per added file or directory.
///
/// `size` is sent as a decimal string and decoded leniently (see
/// [`lenient`](super::lenient)): an unparsable value becomes `0`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Object {
    /// Content identifier of the added node.
    #[serde(rename = "Hash", default)]
    pub hash: String,
    /// Name (path relative to the upload root).
    #[serde(rename = "Name", default)]
    pub name: String,
    /// Cumulative size in bytes.
    #[serde(rename = "Size", default, deserialize_with = "lenient::u64_or_zero")]
    pub size: u64,
}

/// Responses that only carry a hash (`object/new`, `object/patch/*`, ...).
#[derive(Clone, Debug, Default, Deserialize)]
pub struct HashOutput {
    /// Resulting hash.
    #[serde(rename = "Hash")]
    pub hash: String,
}

/// A link inside a merkledag object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectLink {
    /// Link name.
    #[serde(rename = "Name", default)]
    pub name: String,
    /// Target hash.
    #[serde(rename = "Hash")]
    pub hash: String,
    /// Target cumulative size.
    #[serde(rename = "Size", default)]
    pub size: u64,
}

/// A merkledag object as returned by `object/get` and accepted by `object/put`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpfsObject {
    /// Outgoing links.
    #[serde(rename = "Links", default, deserialize_with = "null_as_empty")]
    pub links: Vec<ObjectLink>,
    /// Data field.
    #[serde(rename = "Data", default)]
    pub data: String,
}

/// Output of `object/stat`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectStats {
    /// Object hash.
    #[serde(rename = "Hash")]
    pub hash: String,
    /// Size of the encoded block.
    #[serde(rename = "BlockSize", default)]
    pub block_size: u64,
    /// Size of the object and everything it links to.
    #[serde(rename = "CumulativeSize", default)]
    pub cumulative_size: u64,
    /// Size of the data field.
    #[serde(rename = "DataSize", default)]
    pub data_size: u64,
    /// Size of the links segment.
    #[serde(rename = "LinksSize", default)]
    pub links_size: u64,
    /// Number of links.
    #[serde(rename = "NumLinks", default)]
    pub num_links: u64,
}

/// Output of `block/stat` and `block/put`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct BlockStat {
    /// Block key.
    #[serde(rename = "Key")]
    pub key: String,
    /// Block size in bytes.
    #[serde(rename = "Size", default)]
    pub size: u64,
}

/// An IPLD link in its JSON form: `{"/": "<cid>"}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CidLink {
    /// Target CID.
    #[serde(rename = "/")]
    pub target: String,
}

/// Output of `dag/put`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct DagPutOutput {
    /// Link to the stored node.
    #[serde(rename = "Cid")]
    pub cid: CidLink,
}

/// One line of `refs` output.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RefOutput {
    /// Referenced hash.
    #[serde(rename = "Ref", default)]
    pub reference: String,
    /// Per-ref error reported by the daemon.
    #[serde(rename = "Err", default)]
    pub err: String,
}
