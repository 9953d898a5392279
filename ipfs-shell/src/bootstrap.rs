//! Bootstrap peer list.

use tracing::instrument;

use ipfs_shell_core::error::Result;
use ipfs_shell_core::types::PeersList;

use crate::shell::Shell;

impl Shell {
    /// Adds `peers` to the bootstrap list; returns the peers added.
    #[instrument(skip(self))]
    pub async fn bootstrap_add(&self, peers: &[&str]) -> Result<Vec<String>> {
        let out: PeersList = self
            .request("bootstrap/add")
            .arguments(peers.iter().copied())
            .exec()
            .await?;
        Ok(out.peers)
    }

    /// Restores the default bootstrap peers.
    #[instrument(skip(self))]
    pub async fn bootstrap_add_default(&self) -> Result<Vec<String>> {
        let out: PeersList = self.request("bootstrap/add/default").exec().await?;
        Ok(out.peers)
    }

    /// Empties the bootstrap list; returns the peers removed.
    #[instrument(skip(self))]
    pub async fn bootstrap_rm_all(&self) -> Result<Vec<String>> {
        let out: PeersList = self.request("bootstrap/rm/all").exec().await?;
        Ok(out.peers)
    }
}
