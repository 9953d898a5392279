//! Keystore commands.

use tracing::instrument;

use ipfs_shell_core::error::Result;
use ipfs_shell_core::types::{Key, KeyList};

use crate::shell::Shell;

impl Shell {
    /// Generates a key named `name` of type `key_type` (`"ed25519"`, `"rsa"`).
    /// `size` only applies to key types that take one.
    #[instrument(skip(self))]
    pub async fn key_gen(&self, name: &str, key_type: &str, size: Option<u32>) -> Result<Key> {
        let mut request = self.request("key/gen").argument(name).option("type", key_type);
        if let Some(size) = size {
            request = request.option("size", size);
        }
        request.exec().await
    }

    /// Keys in the node's keystore.
    #[instrument(skip(self))]
    pub async fn key_list(&self) -> Result<Vec<Key>> {
        let out: KeyList = self.request("key/list").exec().await?;
        Ok(out.keys)
    }
}
