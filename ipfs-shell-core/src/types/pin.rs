//! Pin set shapes.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::node::null_as_empty;

/// Kind of pin held on an object.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinType {
    /// Pins only the object itself.
    Direct,
    /// Pins the object and everything reachable from it.
    Recursive,
    /// Retained because a recursive pin reaches it.
    Indirect,
    /// Any type this client does not know about.
    #[serde(other)]
    Unknown,
}

impl fmt::Display for PinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PinType::Direct => "direct",
            PinType::Recursive => "recursive",
            PinType::Indirect => "indirect",
            PinType::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Pin information for one key of `pin/ls`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinInfo {
    /// Pin type.
    #[serde(rename = "Type")]
    pub kind: PinType,
}

/// Raw `pin/ls` response.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PinLsOutput {
    /// Pinned hash → pin info.
    #[serde(rename = "Keys", default, deserialize_with = "null_as_empty")]
    pub keys: HashMap<String, PinInfo>,
}
