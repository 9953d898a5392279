//! The `Shell` handle and the node-level commands.

use std::time::Duration;

use reqwest::redirect::Policy;
use tracing::{debug, instrument};
use url::Url;

use ipfs_shell_core::constants::API_PATH;
use ipfs_shell_core::error::{Result, ShellError};
use ipfs_shell_core::types::{
    BandwidthStats, FileLsOutput, IdOutput, LsLink, LsOutput, UnixLsObject, VersionInfo,
};

use crate::config::{PubSubEncoding, ShellConfig};
use crate::request::RequestBuilder;
use crate::response::Response;

/// Client for a daemon's `/api/v0` RPC API.
///
/// Cloning is cheap and clones share the connection pool. The shell holds no
/// mutable state: concurrent calls are as safe as the HTTP client they share.
#[derive(Clone, Debug)]
pub struct Shell {
    config: ShellConfig,
    base_url: Url,
    http_client: reqwest::Client,
    timeout: Option<Duration>,
}

impl Shell {
    /// Creates a shell for the daemon at `api_url` (`host:port`, URL, or
    /// multiaddr).
    pub fn new(api_url: impl Into<String>) -> Result<Self> {
        Self::with_config(ShellConfig::new(api_url))
    }

    /// Creates a shell for the local daemon, located through the repo's
    /// `api` file.
    pub fn local() -> Result<Self> {
        Self::with_config(ShellConfig::local())
    }

    /// Creates a shell configured from the environment.
    pub fn from_env() -> Result<Self> {
        Self::with_config(ShellConfig::from_env()?)
    }

    /// Creates a shell with custom configuration.
    pub fn with_config(config: ShellConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .redirect(Policy::none())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ShellError::ConfigError(format!("failed to create HTTP client: {}", e)))?;

        Self::with_client(config, http_client)
    }

    /// Creates a shell around an existing HTTP client.
    ///
    /// The client should not follow redirects; a redirect that reaches the
    /// shell is reported as [`ShellError::UnexpectedRedirect`].
    pub fn with_client(config: ShellConfig, http_client: reqwest::Client) -> Result<Self> {
        let base_url = config.base_url()?;
        let timeout = config.timeout_seconds.map(Duration::from_secs);

        debug!(base_url = %base_url, ?timeout, "Created shell");
        Ok(Self {
            config,
            base_url,
            http_client,
            timeout,
        })
    }

    /// Sets the timeout applied to every subsequent request.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = Some(timeout);
    }

    /// Removes the client-side timeout.
    pub fn clear_timeout(&mut self) {
        self.timeout = None;
    }

    /// Current request timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Configuration the shell was built from.
    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    /// Normalized daemon base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Root of the RPC API, `<base>/api/v0`.
    pub fn api_base(&self) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), API_PATH)
    }

    pub(crate) fn http_client(&self) -> &reqwest::Client {
        &self.http_client
    }

    pub(crate) fn pubsub_encoding(&self) -> PubSubEncoding {
        self.config.pubsub_encoding
    }

    /// Starts building a request for `command` (e.g. `"pin/ls"`).
    pub fn request(&self, command: impl Into<String>) -> RequestBuilder<'_> {
        RequestBuilder::new(self, command)
    }

    /// Identity of the node, or of `peer` if given.
    #[instrument(skip(self))]
    pub async fn id(&self, peer: Option<&str>) -> Result<IdOutput> {
        self.request("id").arguments(peer).exec().await
    }

    /// Daemon version.
    #[instrument(skip(self))]
    pub async fn version(&self) -> Result<VersionInfo> {
        self.request("version").exec().await
    }

    /// Returns true if the daemon answers `version`.
    pub async fn is_up(&self) -> bool {
        self.version().await.is_ok()
    }

    /// Streams the content at `path`.
    ///
    /// The body is returned unread; read it with [`Response::bytes`],
    /// [`Response::bytes_stream`] or [`Response::into_reader`].
    #[instrument(skip(self))]
    pub async fn cat(&self, path: &str) -> Result<Response> {
        self.request("cat").argument(path).send().await
    }

    /// Lists the entries of the directory at `path`.
    #[instrument(skip(self))]
    pub async fn list(&self, path: &str) -> Result<Vec<LsLink>> {
        let out: LsOutput = self.request("ls").argument(path).exec().await?;
        if out.objects.len() != 1 {
            return Err(ShellError::UnexpectedResponse(format!(
                "ls: expected 1 object, got {}",
                out.objects.len()
            )));
        }
        Ok(out.objects.into_iter().flat_map(|o| o.links).collect())
    }

    /// Lists the UnixFS object at `path` via `file/ls`.
    #[instrument(skip(self))]
    pub async fn file_list(&self, path: &str) -> Result<UnixLsObject> {
        let out: FileLsOutput = self.request("file/ls").argument(path).exec().await?;
        out.object_for(path).cloned().ok_or_else(|| {
            ShellError::UnexpectedResponse(format!("file/ls: no object listed for {}", path))
        })
    }

    /// Bandwidth counters of the node.
    #[instrument(skip(self))]
    pub async fn stats_bw(&self) -> Result<BandwidthStats> {
        self.request("stats/bw").exec().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipfs_shell_core::types::NodeType;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn shell_for(server: &MockServer) -> Shell {
        Shell::new(server.uri()).unwrap()
    }

    #[test]
    fn test_new_rejects_bad_address() {
        assert!(matches!(
            Shell::new("/ip4/127.0.0.1/udp/1"),
            Err(ShellError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn test_api_base() {
        let shell = Shell::new("/ip4/127.0.0.1/tcp/5001").unwrap();
        assert_eq!(shell.api_base(), "http://127.0.0.1:5001/api/v0");
    }

    #[test]
    fn test_timeout_from_config() {
        let shell = Shell::with_config(ShellConfig::new("localhost:5001").with_timeout(3)).unwrap();
        assert_eq!(shell.timeout(), Some(Duration::from_secs(3)));

        let mut shell = shell;
        shell.set_timeout(Duration::from_millis(250));
        assert_eq!(shell.timeout(), Some(Duration::from_millis(250)));
        shell.clear_timeout();
        assert!(shell.timeout().is_none());
    }

    #[tokio::test]
    async fn test_version() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v0/version"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Version": "0.29.0", "Commit": "3f0947b", "Repo": "15", "System": "amd64/linux", "Golang": "go1.22.4"
            })))
            .mount(&server)
            .await;

        let shell = shell_for(&server).await;
        let version = shell.version().await.unwrap();
        assert_eq!(version.version, "0.29.0");
        assert!(shell.is_up().await);
    }

    #[tokio::test]
    async fn test_is_up_false_when_unreachable() {
        let server = MockServer::start().await;
        let shell = shell_for(&server).await;
        drop(server);
        assert!(!shell.is_up().await);
    }

    #[tokio::test]
    async fn test_redirect_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v0/version"))
            .respond_with(
                ResponseTemplate::new(301).insert_header("Location", "/api/v0/version/"),
            )
            .mount(&server)
            .await;

        let shell = shell_for(&server).await;
        let err = shell.version().await.unwrap_err();
        assert!(err.to_string().contains("unexpected redirect"));
        assert!(err.is_transport_error());
    }

    #[tokio::test]
    async fn test_json_daemon_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v0/cat"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "Message": "invalid path \"nope\"", "Code": 0, "Type": "error"
            })))
            .mount(&server)
            .await;

        let shell = shell_for(&server).await;
        match shell.cat("nope").await.unwrap_err() {
            ShellError::Daemon { command, message, code } => {
                assert_eq!(command, "cat");
                assert_eq!(message, "invalid path \"nope\"");
                assert_eq!(code, 0);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_text_daemon_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v0/cat"))
            .respond_with(ResponseTemplate::new(400).set_body_raw("no link named \"x\"\n", "text/plain"))
            .mount(&server)
            .await;

        let shell = shell_for(&server).await;
        let err = shell.cat("/ipfs/QmA/x").await.unwrap_err();
        assert_eq!(err.to_string(), "cat: no link named \"x\"");
    }

    #[tokio::test]
    async fn test_not_found_is_command_not_found() {
        let server = MockServer::start().await;
        let shell = shell_for(&server).await;
        let err = shell.request("does/not/exist").exec_discard().await.unwrap_err();
        assert_eq!(err.to_string(), "does/not/exist: command not found");
    }

    #[tokio::test]
    async fn test_unknown_error_encoding() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v0/version"))
            .respond_with(ResponseTemplate::new(502).set_body_raw("<html>bad gateway</html>", "text/html"))
            .mount(&server)
            .await;

        let shell = shell_for(&server).await;
        let err = shell.version().await.unwrap_err();
        assert!(err.is_daemon_error());
        assert!(err.to_string().contains("unknown ipfs-shell error encoding"));
        assert!(err.to_string().contains("text/html"));
    }

    #[tokio::test]
    async fn test_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v0/cat"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let mut shell = shell_for(&server).await;
        shell.set_timeout(Duration::from_millis(100));
        let err = shell.cat("QmUnstored").await.unwrap_err();
        assert!(matches!(err, ShellError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_cat_returns_raw_bytes() {
        let server = MockServer::start().await;
        let payload: Vec<u8> = (0..=255u8).cycle().take(1 << 16).collect();
        Mock::given(method("POST"))
            .and(path("/api/v0/cat"))
            .and(query_param("arg", "/ipfs/QmA/readme"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(payload.clone()))
            .mount(&server)
            .await;

        let shell = shell_for(&server).await;
        let body = shell.cat("/ipfs/QmA/readme").await.unwrap().bytes().await.unwrap();
        assert_eq!(body.as_ref(), payload.as_slice());
    }

    #[tokio::test]
    async fn test_cat_into_reader() {
        use tokio::io::AsyncReadExt;

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v0/cat"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Hello IPFS Shell tests"))
            .mount(&server)
            .await;

        let shell = shell_for(&server).await;
        let mut reader = shell.cat("QmUfZ9rAdhV5ioBzXKdUTh2ZNsz9bzbkaLVyQ8uc8pj21F").await.unwrap().into_reader();
        let mut out = String::new();
        reader.read_to_string(&mut out).await.unwrap();
        assert_eq!(out, "Hello IPFS Shell tests");
    }

    #[tokio::test]
    async fn test_list() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v0/ls"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Objects": [{
                    "Hash": "QmS4ustL54uo8FzR9455qaxZwuMiUhyvMcX9Ba8nUH4uVv",
                    "Links": [
                        {"Name": "about", "Hash": "QmZTR5bcpQD7cFgTorqxZDYaew1Wqgfbd2ud9QqGPAkK2V", "Size": 1677, "Type": 2},
                        {"Name": "ping", "Hash": "QmejvEPop4D7YUadeGqYWmZxHhLc4JBUCzJJHWMzdcMe2y", "Size": 4, "Type": 2}
                    ]
                }]
            })))
            .mount(&server)
            .await;

        let shell = shell_for(&server).await;
        let links = shell.list("/ipfs/QmS4ustL54uo8FzR9455qaxZwuMiUhyvMcX9Ba8nUH4uVv").await.unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(
            links[0],
            LsLink {
                kind: NodeType::File,
                hash: "QmZTR5bcpQD7cFgTorqxZDYaew1Wqgfbd2ud9QqGPAkK2V".into(),
                name: "about".into(),
                size: 1677,
            }
        );
    }

    #[tokio::test]
    async fn test_list_rejects_multiple_objects() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v0/ls"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "Objects": [] })))
            .mount(&server)
            .await;

        let shell = shell_for(&server).await;
        assert!(matches!(
            shell.list("QmA").await,
            Err(ShellError::UnexpectedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_file_list() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v0/file/ls"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Arguments": {"/ipfs/QmDir": "QmDir"},
                "Objects": {"QmDir": {"Hash": "QmDir", "Size": 0, "Type": "Directory", "Links": [
                    {"Name": "help", "Hash": "QmY5heUM5qgRubMDD1og9fhCPA6QdkMp3QCwd4s7gJsyE7", "Size": 311, "Type": "File"}
                ]}}
            })))
            .mount(&server)
            .await;

        let shell = shell_for(&server).await;
        let obj = shell.file_list("/ipfs/QmDir").await.unwrap();
        assert_eq!(obj.kind, "Directory");
        assert_eq!(obj.links[0].size, 311);

        assert!(matches!(
            shell.file_list("/ipfs/QmOther").await,
            Err(ShellError::UnexpectedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_file_list_on_a_file() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v0/file/ls"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"Arguments":{"/ipfs/QmF":"QmF"},"Objects":{"QmF":{"Hash":"QmF","Size":4,"Type":"File","Links":null}}}"#,
            ))
            .mount(&server)
            .await;

        let shell = shell_for(&server).await;
        let obj = shell.file_list("/ipfs/QmF").await.unwrap();
        assert_eq!(obj.kind, "File");
        assert_eq!(obj.size, 4);
        assert!(obj.links.is_empty());
    }

    #[tokio::test]
    async fn test_empty_body_is_no_results() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v0/stats/bw"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let shell = shell_for(&server).await;
        assert!(matches!(shell.stats_bw().await, Err(ShellError::NoResults)));
    }

    #[tokio::test]
    async fn test_id_with_peer_argument() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v0/id"))
            .and(query_param("arg", "QmPeer"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ID": "QmPeer", "PublicKey": "", "Addresses": null, "AgentVersion": "", "ProtocolVersion": ""
            })))
            .mount(&server)
            .await;

        let shell = shell_for(&server).await;
        assert_eq!(shell.id(Some("QmPeer")).await.unwrap().id, "QmPeer");
    }
}
