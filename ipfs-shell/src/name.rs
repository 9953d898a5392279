//! IPNS publishing and resolution.

use std::time::Duration;

use tracing::instrument;

use ipfs_shell_core::error::Result;
use ipfs_shell_core::types::{PublishResponse, ResolveOutput};

use crate::shell::Shell;

/// Formats `d` in the daemon's duration syntax, in the coarsest unit that
/// loses nothing.
fn go_duration(d: Duration) -> String {
    if d.subsec_nanos() == 0 {
        format!("{}s", d.as_secs())
    } else if d.subsec_nanos() % 1_000_000 == 0 {
        format!("{}ms", d.as_millis())
    } else {
        format!("{}ns", d.as_nanos())
    }
}

impl Shell {
    /// Publishes `value` under the node's key, or under `node` when it is
    /// non-empty.
    #[instrument(skip(self))]
    pub async fn publish(&self, node: &str, value: &str) -> Result<()> {
        let request = self.request("name/publish");
        let request = if node.is_empty() {
            request
        } else {
            request.argument(node)
        };
        request
            .argument(value)
            .exec::<PublishResponse>()
            .await
            .map(|_| ())
    }

    /// Publishes `content` with an explicit key, record lifetime and cache
    /// TTL. Zero durations and an empty key leave the daemon defaults.
    #[instrument(skip(self))]
    pub async fn publish_with_details(
        &self,
        content: &str,
        key: &str,
        lifetime: Duration,
        ttl: Duration,
        resolve: bool,
    ) -> Result<PublishResponse> {
        let mut request = self.request("name/publish").argument(content);
        if !key.is_empty() {
            request = request.option("key", key);
        }
        if !lifetime.is_zero() {
            request = request.option("lifetime", go_duration(lifetime));
        }
        if !ttl.is_zero() {
            request = request.option("ttl", go_duration(ttl));
        }
        request.option("resolve", resolve).exec().await
    }

    /// Resolves the IPNS name `id`; an empty `id` resolves the node's own
    /// name.
    #[instrument(skip(self))]
    pub async fn resolve(&self, id: &str) -> Result<String> {
        let request = self.request("name/resolve");
        let request = if id.is_empty() {
            request
        } else {
            request.argument(id)
        };
        let out: ResolveOutput = request.exec().await?;
        Ok(out.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn args(request: &wiremock::Request) -> Vec<String> {
        request
            .url
            .query_pairs()
            .filter(|(k, _)| k == "arg")
            .map(|(_, v)| v.into_owned())
            .collect()
    }

    #[test_case(Duration::from_secs(86400), "86400s")]
    #[test_case(Duration::from_millis(500), "500ms")]
    #[test_case(Duration::from_millis(1500), "1500ms")]
    #[test_case(Duration::from_micros(1500), "1500000ns")]
    fn test_go_duration(d: Duration, expected: &str) {
        assert_eq!(go_duration(d), expected);
    }

    async fn publish_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v0/name/publish"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Name": "k51qzi5uqu5dlvj2baxnqndepeb86cbk3ng7n3i46uzyxzyqj2xjonzllnv0v8",
                "Value": "/ipfs/QmContent"
            })))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_publish_arguments() {
        let server = publish_server().await;
        let shell = Shell::new(server.uri()).unwrap();
        shell.publish("", "/ipfs/QmContent").await.unwrap();
        shell.publish("self", "/ipfs/QmContent").await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(args(&requests[0]), vec!["/ipfs/QmContent"]);
        assert_eq!(args(&requests[1]), vec!["self", "/ipfs/QmContent"]);
    }

    #[tokio::test]
    async fn test_publish_with_details() {
        let server = publish_server().await;
        let shell = Shell::new(server.uri()).unwrap();
        let out = shell
            .publish_with_details(
                "/ipfs/QmContent",
                "mykey",
                Duration::from_secs(24 * 3600),
                Duration::from_millis(500),
                false,
            )
            .await
            .unwrap();
        assert_eq!(out.value, "/ipfs/QmContent");

        let requests = server.received_requests().await.unwrap();
        let pairs: Vec<(String, String)> = requests[0]
            .url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("key".into(), "mykey".into())));
        assert!(pairs.contains(&("lifetime".into(), "86400s".into())));
        assert!(pairs.contains(&("ttl".into(), "500ms".into())));
        assert!(pairs.contains(&("resolve".into(), "false".into())));
    }

    #[tokio::test]
    async fn test_publish_with_details_skips_zero_durations() {
        let server = publish_server().await;
        let shell = Shell::new(server.uri()).unwrap();
        shell
            .publish_with_details("/ipfs/QmContent", "", Duration::ZERO, Duration::ZERO, true)
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let keys: Vec<String> = requests[0]
            .url
            .query_pairs()
            .map(|(k, _)| k.into_owned())
            .collect();
        assert!(!keys.iter().any(|k| k == "lifetime" || k == "ttl" || k == "key"));
    }

    #[tokio::test]
    async fn test_resolve() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v0/name/resolve"))
            .and(query_param("arg", "k51qzi5uqu5d"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "Path": "/ipfs/QmContent" })))
            .mount(&server)
            .await;

        let shell = Shell::new(server.uri()).unwrap();
        assert_eq!(shell.resolve("k51qzi5uqu5d").await.unwrap(), "/ipfs/QmContent");
    }
}
