//! IPLD DAG nodes.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::instrument;

use ipfs_shell_core::error::Result;
use ipfs_shell_core::types::DagPutOutput;

use crate::request::RequestBuilder;
use crate::shell::Shell;

/// Settings for `dag/put`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DagPutOptions {
    /// Encoding of the submitted data (`"json"`, `"raw"`, ...).
    pub input_enc: String,
    /// Format the node is stored in (`"cbor"`, `"protobuf"`, ...).
    pub kind: String,
    /// Pin the stored node; the daemon default applies when unset.
    pub pin: Option<bool>,
    /// Hash function; the daemon default applies when unset.
    pub hash: Option<String>,
}

impl Default for DagPutOptions {
    fn default() -> Self {
        Self {
            input_enc: "json".to_string(),
            kind: "cbor".to_string(),
            pin: None,
            hash: None,
        }
    }
}

impl DagPutOptions {
    /// Sets the input encoding.
    pub fn input_enc(mut self, enc: impl Into<String>) -> Self {
        self.input_enc = enc.into();
        self
    }

    /// Sets the storage format.
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Pins (or explicitly does not pin) the stored node.
    pub fn pin(mut self, pin: bool) -> Self {
        self.pin = Some(pin);
        self
    }

    /// Sets the hash function, e.g. `"sha2-256"`.
    pub fn hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    /// Applies the settings to a request.
    pub fn apply(&self, request: &mut RequestBuilder<'_>) {
        request.set_option("input-enc", &self.input_enc);
        request.set_option("format", &self.kind);
        if let Some(pin) = self.pin {
            request.set_option("pin", pin);
        }
        if let Some(hash) = &self.hash {
            request.set_option("hash", hash);
        }
    }
}

impl Shell {
    /// Fetches the node at `reference` and decodes it as `T`.
    #[instrument(skip(self))]
    pub async fn dag_get<T: DeserializeOwned>(&self, reference: &str) -> Result<T> {
        self.request("dag/get").argument(reference).exec().await
    }

    /// Stores `data`, encoded as `input_enc`, as a node of format `kind`.
    pub async fn dag_put(
        &self,
        data: impl Into<Bytes>,
        input_enc: &str,
        kind: &str,
    ) -> Result<String> {
        let options = DagPutOptions::default().input_enc(input_enc).kind(kind);
        self.dag_put_with_opts(data, &options).await
    }

    /// Stores `data` with explicit options and returns the node's CID.
    #[instrument(skip(self, data))]
    pub async fn dag_put_with_opts(
        &self,
        data: impl Into<Bytes>,
        options: &DagPutOptions,
    ) -> Result<String> {
        let mut request = self.request("dag/put");
        options.apply(&mut request);
        let out: DagPutOutput = request.body_file(data)?.exec().await?;
        Ok(out.cid.target)
    }

    /// Serializes `value` as JSON and stores it as a CBOR node.
    pub async fn dag_put_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let body = serde_json::to_vec(value)?;
        self.dag_put_with_opts(body, &DagPutOptions::default()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use wiremock::matchers::{body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CID: &str = "zdpuAt47YjE9XTgSxUBkiYCbmnktKajQNheQBGASHj3FfYf8M";

    #[test]
    fn test_options_apply() {
        let shell = Shell::new("localhost:5001").unwrap();
        let mut request = shell.request("dag/put");
        DagPutOptions::default()
            .kind("protobuf")
            .pin(true)
            .hash("sha3-512")
            .apply(&mut request);
        assert_eq!(request.get_option("input-enc"), Some("json"));
        assert_eq!(request.get_option("format"), Some("protobuf"));
        assert_eq!(request.get_option("pin"), Some("true"));
        assert_eq!(request.get_option("hash"), Some("sha3-512"));
    }

    #[test]
    fn test_default_options_leave_pin_unset() {
        let shell = Shell::new("localhost:5001").unwrap();
        let mut request = shell.request("dag/put");
        DagPutOptions::default().apply(&mut request);
        assert_eq!(request.get_option("pin"), None);
        assert_eq!(request.get_option("hash"), None);
    }

    #[tokio::test]
    async fn test_dag_put() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v0/dag/put"))
            .and(query_param("input-enc", "json"))
            .and(query_param("format", "cbor"))
            .and(body_string_contains("{\"x\": \"abc\",\"y\":5}"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "Cid": { "/": CID } })))
            .expect(1)
            .mount(&server)
            .await;

        let shell = Shell::new(server.uri()).unwrap();
        let cid = shell
            .dag_put("{\"x\": \"abc\",\"y\":5}", "json", "cbor")
            .await
            .unwrap();
        assert_eq!(cid, CID);
    }

    #[tokio::test]
    async fn test_dag_put_json_and_get() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Node {
            x: String,
            y: u32,
        }

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v0/dag/put"))
            .and(body_string_contains("{\"x\":\"abc\",\"y\":5}"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "Cid": { "/": CID } })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v0/dag/get"))
            .and(query_param("arg", CID))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "x": "abc", "y": 5 })))
            .mount(&server)
            .await;

        let shell = Shell::new(server.uri()).unwrap();
        let node = Node { x: "abc".into(), y: 5 };
        let cid = shell.dag_put_json(&node).await.unwrap();
        let back: Node = shell.dag_get(&cid).await.unwrap();
        assert_eq!(back, node);
    }
}
