//! Pin management.

use std::collections::HashMap;

use tracing::instrument;

use ipfs_shell_core::error::Result;
use ipfs_shell_core::types::{PinInfo, PinLsOutput};

use crate::shell::Shell;

impl Shell {
    /// Pins `path` recursively.
    #[instrument(skip(self))]
    pub async fn pin(&self, path: &str) -> Result<()> {
        self.request("pin/add")
            .argument(path)
            .option("recursive", true)
            .exec_discard()
            .await
    }

    /// Removes the recursive pin on `path`.
    #[instrument(skip(self))]
    pub async fn unpin(&self, path: &str) -> Result<()> {
        self.request("pin/rm")
            .argument(path)
            .option("recursive", true)
            .exec_discard()
            .await
    }

    /// All pinned objects, keyed by hash.
    #[instrument(skip(self))]
    pub async fn pins(&self) -> Result<HashMap<String, PinInfo>> {
        let out: PinLsOutput = self.request("pin/ls").exec().await?;
        Ok(out.keys)
    }
}
