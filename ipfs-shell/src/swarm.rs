//! Peers: swarm connections and DHT peer lookup.

use tracing::{debug, instrument};

use ipfs_shell_core::error::{Result, ShellError};
use ipfs_shell_core::types::{FindPeerOutput, PeerInfo, SwarmConnInfos};

use crate::shell::Shell;

impl Shell {
    /// Currently connected peers.
    #[instrument(skip(self))]
    pub async fn swarm_peers(&self) -> Result<SwarmConnInfos> {
        self.request("swarm/peers").exec().await
    }

    /// Opens connections to the given multiaddrs.
    #[instrument(skip(self))]
    pub async fn swarm_connect(&self, addrs: &[&str]) -> Result<()> {
        self.request("swarm/connect")
            .arguments(addrs.iter().copied())
            .exec_discard()
            .await
    }

    /// Looks up the addresses of `peer` in the DHT.
    ///
    /// The daemon streams query events; the first one that carries a
    /// response wins.
    #[instrument(skip(self))]
    pub async fn find_peer(&self, peer: &str) -> Result<PeerInfo> {
        let mut stream = self
            .request("dht/findpeer")
            .argument(peer)
            .exec_stream::<FindPeerOutput>()
            .await?;

        while let Some(event) = stream.next().await {
            if let Some(info) = event?.responses.into_iter().next() {
                debug!(peer, addrs = info.addrs.len(), "Peer found");
                return Ok(info);
            }
        }
        Err(ShellError::PeerNotFound(peer.to_string()))
    }
}
