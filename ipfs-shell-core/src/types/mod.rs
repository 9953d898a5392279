//! Response types returned by the daemon's RPC commands.

pub mod lenient;
mod ls;
mod name;
mod node;
mod object;
mod peer;
mod pin;
mod pubsub;

pub use ls::{FileLsOutput, LsLink, LsObject, LsOutput, NodeType, UnixLsLink, UnixLsObject};
pub use name::{PublishResponse, ResolveOutput};
pub use node::{BandwidthStats, IdOutput, Key, KeyList, VersionInfo};
pub use object::{
    BlockStat, CidLink, DagPutOutput, HashOutput, IpfsObject, Object, ObjectLink, ObjectStats,
    RefOutput,
};
pub use peer::{FindPeerOutput, PeerInfo, PeersList, SwarmConnInfo, SwarmConnInfos, SwarmStreamInfo};
pub use pin::{PinInfo, PinLsOutput, PinType};
pub use pubsub::PubSubRecord;
