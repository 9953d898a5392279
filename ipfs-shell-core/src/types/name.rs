//! IPNS shapes.

use serde::{Deserialize, Serialize};

/// Output of `name/publish`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishResponse {
    /// IPNS name the value was published under.
    #[serde(rename = "Name")]
    pub name: String,
    /// Published path.
    #[serde(rename = "Value")]
    pub value: String,
}

/// Output of `name/resolve`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ResolveOutput {
    /// Resolved path.
    #[serde(rename = "Path")]
    pub path: String,
}
