//! Directory listing shapes for `ls` and `file/ls`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::node::null_as_empty;

/// UnixFS node type as reported by `ls`.
///
/// Unknown values are preserved so newer daemons do not break decoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum NodeType {
    /// Raw leaf data.
    Raw,
    /// Directory.
    Directory,
    /// File.
    File,
    /// Metadata node.
    Metadata,
    /// Symbolic link.
    Symlink,
    /// Sharded directory.
    HamtShard,
    /// Any other value.
    Unknown(i32),
}

impl From<i32> for NodeType {
    fn from(value: i32) -> Self {
        match value {
            0 => NodeType::Raw,
            1 => NodeType::Directory,
            2 => NodeType::File,
            3 => NodeType::Metadata,
            4 => NodeType::Symlink,
            5 => NodeType::HamtShard,
            other => NodeType::Unknown(other),
        }
    }
}

impl From<NodeType> for i32 {
    fn from(value: NodeType) -> Self {
        match value {
            NodeType::Raw => 0,
            NodeType::Directory => 1,
            NodeType::File => 2,
            NodeType::Metadata => 3,
            NodeType::Symlink => 4,
            NodeType::HamtShard => 5,
            NodeType::Unknown(other) => other,
        }
    }
}

impl Default for NodeType {
    fn default() -> Self {
        NodeType::Raw
    }
}

/// A directory entry returned by `ls`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LsLink {
    /// Entry hash.
    #[serde(rename = "Hash")]
    pub hash: String,
    /// Entry name.
    #[serde(rename = "Name", default)]
    pub name: String,
    /// Entry size in bytes.
    #[serde(rename = "Size", default)]
    pub size: u64,
    /// UnixFS node type.
    #[serde(rename = "Type", default)]
    pub kind: NodeType,
}

/// One listed object in an `ls` response.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct LsObject {
    /// Hash of the listed object.
    #[serde(rename = "Hash", default)]
    pub hash: String,
    /// Its entries.
    #[serde(rename = "Links", default, deserialize_with = "null_as_empty")]
    pub links: Vec<LsLink>,
}

/// Raw `ls` response.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct LsOutput {
    /// One object per argument.
    #[serde(rename = "Objects", default, deserialize_with = "null_as_empty")]
    pub objects: Vec<LsObject>,
}

/// A directory entry returned by `file/ls`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnixLsLink {
    /// Entry hash.
    #[serde(rename = "Hash")]
    pub hash: String,
    /// Entry name.
    #[serde(rename = "Name", default)]
    pub name: String,
    /// Entry size in bytes.
    #[serde(rename = "Size", default)]
    pub size: u64,
    /// `"File"`, `"Directory"`, ...
    #[serde(rename = "Type", default)]
    pub kind: String,
}

/// An object returned by `file/ls`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnixLsObject {
    /// Object hash.
    #[serde(rename = "Hash", default)]
    pub hash: String,
    /// File size; `0` for directories.
    #[serde(rename = "Size", default)]
    pub size: u64,
    /// `"File"` or `"Directory"`.
    #[serde(rename = "Type", default)]
    pub kind: String,
    /// Directory entries; empty for files.
    #[serde(rename = "Links", default, deserialize_with = "null_as_empty")]
    pub links: Vec<UnixLsLink>,
}

/// Raw `file/ls` response: arguments map to hashes, hashes to objects.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct FileLsOutput {
    /// Requested path → resolved hash.
    #[serde(rename = "Arguments", default, deserialize_with = "null_as_empty")]
    pub arguments: HashMap<String, String>,
    /// Hash → listed object.
    #[serde(rename = "Objects", default, deserialize_with = "null_as_empty")]
    pub objects: HashMap<String, UnixLsObject>,
}

impl FileLsOutput {
    /// Looks up the object listed for `path`.
    pub fn object_for(&self, path: &str) -> Option<&UnixLsObject> {
        self.arguments
            .get(path)
            .and_then(|hash| self.objects.get(hash))
    }
}
