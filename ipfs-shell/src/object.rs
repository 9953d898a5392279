//! Merkledag objects, raw blocks and refs.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tracing::instrument;

use ipfs_shell_core::error::{Result, ShellError};
use ipfs_shell_core::types::{BlockStat, HashOutput, IpfsObject, ObjectStats, RefOutput};

use crate::shell::Shell;

impl Shell {
    /// Applies `object/patch/<action>` to `root` and returns the new root.
    #[instrument(skip(self))]
    pub async fn patch(&self, root: &str, action: &str, args: &[&str]) -> Result<String> {
        let out: HashOutput = self
            .request(format!("object/patch/{}", action))
            .argument(root)
            .arguments(args.iter().copied())
            .exec()
            .await?;
        Ok(out.hash)
    }

    /// Adds a link named `path` to `child` under `root`.
    ///
    /// With `create`, missing intermediate directories are created.
    #[instrument(skip(self))]
    pub async fn patch_link(
        &self,
        root: &str,
        path: &str,
        child: &str,
        create: bool,
    ) -> Result<String> {
        let out: HashOutput = self
            .request("object/patch/add-link")
            .arguments([root, path, child])
            .option("create", create)
            .exec()
            .await?;
        Ok(out.hash)
    }

    /// Replaces (`set`) or extends the data of `root`.
    #[instrument(skip(self, data))]
    pub async fn patch_data(&self, root: &str, set: bool, data: impl Into<Bytes>) -> Result<String> {
        let action = if set { "set-data" } else { "append-data" };
        let out: HashOutput = self
            .request(format!("object/patch/{}", action))
            .argument(root)
            .body_file(data)?
            .exec()
            .await?;
        Ok(out.hash)
    }

    /// Creates a new object from `template` (e.g. `"unixfs-dir"`); an empty
    /// template creates an empty object.
    #[instrument(skip(self))]
    pub async fn new_object(&self, template: &str) -> Result<String> {
        let request = self.request("object/new");
        let request = if template.is_empty() {
            request
        } else {
            request.argument(template)
        };
        let out: HashOutput = request.exec().await?;
        Ok(out.hash)
    }

    /// Resolves `path` to the hash of the object it names.
    #[instrument(skip(self))]
    pub async fn resolve_path(&self, path: &str) -> Result<String> {
        Ok(self.object_stat(path).await?.hash)
    }

    /// Fetches the object at `path`.
    #[instrument(skip(self))]
    pub async fn object_get(&self, path: &str) -> Result<IpfsObject> {
        self.request("object/get").argument(path).exec().await
    }

    /// Stores `object` and returns its hash.
    #[instrument(skip(self, object))]
    pub async fn object_put(&self, object: &IpfsObject) -> Result<String> {
        let body = serde_json::to_vec(object)?;
        let out: HashOutput = self
            .request("object/put")
            .body_file(body)?
            .exec()
            .await?;
        Ok(out.hash)
    }

    /// Statistics of the object at `path`.
    #[instrument(skip(self))]
    pub async fn object_stat(&self, path: &str) -> Result<ObjectStats> {
        self.request("object/stat").argument(path).exec().await
    }

    /// Key and size of the block at `path`.
    #[instrument(skip(self))]
    pub async fn block_stat(&self, path: &str) -> Result<BlockStat> {
        self.request("block/stat").argument(path).exec().await
    }

    /// Raw bytes of the block at `path`.
    #[instrument(skip(self))]
    pub async fn block_get(&self, path: &str) -> Result<Bytes> {
        self.request("block/get").argument(path).send().await?.bytes().await
    }

    /// Stores a raw block and returns its key.
    ///
    /// `mhlen` of `-1` lets the daemon pick the digest length.
    #[instrument(skip(self, block))]
    pub async fn block_put(
        &self,
        block: impl Into<Bytes>,
        format: &str,
        mhtype: &str,
        mhlen: i32,
    ) -> Result<String> {
        let out: BlockStat = self
            .request("block/put")
            .option("format", format)
            .option("mhtype", mhtype)
            .option("mhlen", mhlen)
            .body_file(block)?
            .exec()
            .await?;
        Ok(out.key)
    }

    /// Streams the hashes referenced by `hash`, the whole DAG if `recursive`.
    ///
    /// A ref the daemon could not resolve is yielded as a daemon error; the
    /// stream continues after it.
    #[instrument(skip(self))]
    pub async fn refs(
        &self,
        hash: &str,
        recursive: bool,
    ) -> Result<impl Stream<Item = Result<String>> + Send + 'static> {
        let stream = self
            .request("refs")
            .argument(hash)
            .option("recursive", recursive)
            .exec_stream::<RefOutput>()
            .await?;

        Ok(stream.into_stream().map(|item| {
            let out = item?;
            if out.err.is_empty() {
                Ok(out.reference)
            } else {
                Err(ShellError::daemon("refs", out.err, 0))
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use wiremock::matchers::{body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ROOT: &str = "QmUNLLsPACCz1vLxQVkXqqLX5R1X345qqfHbsf67hvA3Nn";

    async fn respond(server: &MockServer, command: &str, body: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path(format!("/api/v0/{}", command)))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_patch_link() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v0/object/patch/add-link"))
            .and(query_param("create", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Hash": "QmdYTBrYaV2sVRZiEwk2UeudvLa7YZoE7gLPYvxGNE9Qyn"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let shell = Shell::new(server.uri()).unwrap();
        let hash = shell
            .patch_link(ROOT, "foo/bar", "QmChild", true)
            .await
            .unwrap();
        assert_eq!(hash, "QmdYTBrYaV2sVRZiEwk2UeudvLa7YZoE7gLPYvxGNE9Qyn");

        let requests = server.received_requests().await.unwrap();
        let args: Vec<String> = requests[0]
            .url
            .query_pairs()
            .filter(|(k, _)| k == "arg")
            .map(|(_, v)| v.into_owned())
            .collect();
        assert_eq!(args, vec![ROOT, "foo/bar", "QmChild"]);
    }

    #[tokio::test]
    async fn test_patch_rm_link() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v0/object/patch/rm-link"))
            .and(query_param("arg", "about"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Hash": "QmPmCJpciopaZnKcwymfQyRAEjXReR6UL2rdSfEscZfzcp"
            })))
            .mount(&server)
            .await;

        let shell = Shell::new(server.uri()).unwrap();
        let hash = shell.patch(ROOT, "rm-link", &["about"]).await.unwrap();
        assert_eq!(hash, "QmPmCJpciopaZnKcwymfQyRAEjXReR6UL2rdSfEscZfzcp");
    }

    #[tokio::test]
    async fn test_patch_data_uses_file_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v0/object/patch/append-data"))
            .and(body_string_contains("more bytes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "Hash": "QmAppended" })))
            .mount(&server)
            .await;

        let shell = Shell::new(server.uri()).unwrap();
        assert_eq!(
            shell.patch_data(ROOT, false, "more bytes").await.unwrap(),
            "QmAppended"
        );
    }

    #[tokio::test]
    async fn test_new_object_template() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v0/object/new"))
            .and(query_param("arg", "unixfs-dir"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "Hash": ROOT })))
            .mount(&server)
            .await;

        let shell = Shell::new(server.uri()).unwrap();
        assert_eq!(shell.new_object("unixfs-dir").await.unwrap(), ROOT);
    }

    #[tokio::test]
    async fn test_object_stat_and_resolve_path() {
        let server = MockServer::start().await;
        respond(
            &server,
            "object/stat",
            serde_json::json!({
                "Hash": "QmS4ustL54uo8FzR9455qaxZwuMiUhyvMcX9Ba8nUH4uVv",
                "NumLinks": 1, "BlockSize": 56, "LinksSize": 3, "DataSize": 53, "CumulativeSize": 1688
            }),
        )
        .await;

        let shell = Shell::new(server.uri()).unwrap();
        let stat = shell.object_stat("/ipfs/QmS4ust/about").await.unwrap();
        assert_eq!(stat.links_size, 3);
        assert_eq!(stat.cumulative_size, 1688);
        assert_eq!(
            shell.resolve_path("/ipfs/QmS4ust/about").await.unwrap(),
            "QmS4ustL54uo8FzR9455qaxZwuMiUhyvMcX9Ba8nUH4uVv"
        );
    }

    #[tokio::test]
    async fn test_object_put_sends_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v0/object/put"))
            .and(body_string_contains("\"Data\":\"hello\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "Hash": "QmPut", "Links": [] })))
            .mount(&server)
            .await;

        let shell = Shell::new(server.uri()).unwrap();
        let object = IpfsObject {
            links: Vec::new(),
            data: "hello".into(),
        };
        assert_eq!(shell.object_put(&object).await.unwrap(), "QmPut");
    }

    #[tokio::test]
    async fn test_block_roundtrip_calls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v0/block/put"))
            .and(query_param("format", "raw"))
            .and(query_param("mhtype", "sha2-256"))
            .and(query_param("mhlen", "-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "Key": "bafkreiblock", "Size": 4 })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v0/block/get"))
            .and(query_param("arg", "bafkreiblock"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8, 1, 2, 3]))
            .mount(&server)
            .await;
        respond(&server, "block/stat", serde_json::json!({ "Key": "bafkreiblock", "Size": 4 })).await;

        let shell = Shell::new(server.uri()).unwrap();
        let key = shell
            .block_put(vec![0u8, 1, 2, 3], "raw", "sha2-256", -1)
            .await
            .unwrap();
        assert_eq!(key, "bafkreiblock");
        assert_eq!(shell.block_get(&key).await.unwrap().as_ref(), &[0, 1, 2, 3]);
        assert_eq!(shell.block_stat(&key).await.unwrap().size, 4);
    }

    #[tokio::test]
    async fn test_refs_stream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v0/refs"))
            .and(query_param("recursive", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "{\"Ref\":\"QmA\",\"Err\":\"\"}\n{\"Ref\":\"QmB\",\"Err\":\"\"}\n",
            ))
            .mount(&server)
            .await;

        let shell = Shell::new(server.uri()).unwrap();
        let refs: Vec<String> = shell.refs(ROOT, true).await.unwrap().try_collect().await.unwrap();
        assert_eq!(refs, vec!["QmA", "QmB"]);
    }

    #[tokio::test]
    async fn test_refs_error_entry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v0/refs"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "{\"Ref\":\"\",\"Err\":\"merkledag: not found\"}\n{\"Ref\":\"QmB\",\"Err\":\"\"}\n",
            ))
            .mount(&server)
            .await;

        let shell = Shell::new(server.uri()).unwrap();
        let items: Vec<Result<String>> = shell.refs(ROOT, false).await.unwrap().collect().await;
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[0].as_ref().unwrap_err().to_string(),
            "refs: merkledag: not found"
        );
        assert_eq!(items[1].as_ref().unwrap(), "QmB");
    }
}
