//! Response handling: status checks, daemon error decoding, body access.

use bytes::Bytes;
use futures::{Stream, StreamExt, TryStreamExt};
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;
use tracing::warn;

use ipfs_shell_core::error::{Result, ShellError};

use crate::stream::JsonStream;

/// Successful response to an RPC command.
///
/// The body has not been read yet: decode it with [`Response::json`] or
/// [`Response::into_json_stream`], or consume it raw.
#[derive(Debug)]
pub struct Response {
    command: String,
    inner: reqwest::Response,
}

impl Response {
    /// Checks the status of `response`, turning redirects and error statuses
    /// into errors.
    pub(crate) async fn from_http(command: String, response: reqwest::Response) -> Result<Self> {
        let status = response.status();

        if status.is_redirection() {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            warn!(command = %command, status = %status, ?location, "Daemon answered with a redirect");
            return Err(ShellError::UnexpectedRedirect { location });
        }

        if status.is_client_error() || status.is_server_error() {
            return Err(daemon_error(&command, response).await);
        }

        Ok(Self {
            command,
            inner: response,
        })
    }

    /// The command this response answers.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// HTTP status of the response.
    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    /// Reads the next chunk of the body, `None` at end of stream.
    pub async fn chunk(&mut self) -> Result<Option<Bytes>> {
        self.inner.chunk().await.map_err(transport_error)
    }

    /// Reads the whole body into memory.
    pub async fn bytes(self) -> Result<Bytes> {
        self.inner.bytes().await.map_err(transport_error)
    }

    /// Returns the body as a stream of chunks.
    pub fn bytes_stream(self) -> impl Stream<Item = Result<Bytes>> + Send + 'static {
        self.inner.bytes_stream().map(|chunk| chunk.map_err(transport_error))
    }

    /// Returns the body as an `AsyncRead`.
    pub fn into_reader(self) -> impl AsyncRead + Send + Unpin + 'static {
        StreamReader::new(
            self.inner
                .bytes_stream()
                .map_err(std::io::Error::other)
                .boxed(),
        )
    }

    /// Decodes the body as a sequence of JSON values.
    pub fn into_json_stream<T: DeserializeOwned>(self) -> JsonStream<T> {
        JsonStream::new(self.command, self.inner.bytes_stream().boxed())
    }

    /// Decodes the first JSON value of the body.
    ///
    /// An empty body is reported as [`ShellError::NoResults`].
    pub async fn json<T: DeserializeOwned>(self) -> Result<T> {
        self.into_json_stream::<T>()
            .next()
            .await
            .unwrap_or(Err(ShellError::NoResults))
    }
}

/// Maps a transport failure to the matching error kind.
pub(crate) fn transport_error(err: reqwest::Error) -> ShellError {
    if err.is_timeout() {
        ShellError::Timeout(err.to_string())
    } else {
        ShellError::HttpError(err.to_string())
    }
}

/// Error body sent by the daemon with `application/json` error responses.
#[derive(Debug, Deserialize)]
struct DaemonErrorBody {
    #[serde(rename = "Message", default)]
    message: String,
    #[serde(rename = "Code", default)]
    code: i64,
}

async fn daemon_error(command: &str, response: reqwest::Response) -> ShellError {
    let status = response.status();

    if status == StatusCode::NOT_FOUND {
        return ShellError::daemon(command, "command not found", 0);
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().to_ascii_lowercase())
        .unwrap_or_default();

    let body = match response.bytes().await {
        Ok(body) => body,
        Err(e) => return transport_error(e),
    };

    match content_type.as_str() {
        "text/plain" => {
            ShellError::daemon(command, String::from_utf8_lossy(&body).trim_end(), 0)
        }
        "application/json" => match serde_json::from_slice::<DaemonErrorBody>(&body) {
            Ok(err) => ShellError::daemon(command, err.message, err.code),
            Err(e) => {
                warn!(command, status = %status, error = %e, "Daemon error response unreadable");
                ShellError::daemon(command, format!("HTTP {}", status), 0)
            }
        },
        other => {
            warn!(command, status = %status, content_type = other, "Unhandled daemon error encoding");
            ShellError::daemon(
                command,
                format!(
                    "unknown ipfs-shell error encoding: {:?} - {:?}",
                    other,
                    String::from_utf8_lossy(&body)
                ),
                0,
            )
        }
    }
}
