//! Request construction for `/api/v0` commands.

use std::collections::BTreeMap;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::Form;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use ipfs_shell_core::constants::{API_PATH, DEFAULT_OPTIONS, FORM_FIELD_FILE, MIME_FILE};
use ipfs_shell_core::error::{Result, ShellError};

use crate::files;
use crate::response::{transport_error, Response};
use crate::shell::Shell;
use crate::stream::JsonStream;

enum RequestBody {
    Raw(Bytes),
    Multipart(Form),
}

/// Builder for a single RPC call.
///
/// Positional arguments are sent as repeated `arg` query parameters and
/// options as `key=value` parameters. Setting an option twice keeps the last
/// value. Every request starts with `encoding=json` and
/// `stream-channels=true`.
pub struct RequestBuilder<'a> {
    shell: &'a Shell,
    command: String,
    args: Vec<String>,
    options: BTreeMap<String, String>,
    headers: Vec<(String, String)>,
    body: Option<RequestBody>,
    timeout: Option<Duration>,
}

impl<'a> RequestBuilder<'a> {
    pub(crate) fn new(shell: &'a Shell, command: impl Into<String>) -> Self {
        let options = DEFAULT_OPTIONS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        Self {
            shell,
            command: command.into(),
            args: Vec::new(),
            options,
            headers: Vec::new(),
            body: None,
            timeout: shell.timeout(),
        }
    }

    /// The command this request will call.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Appends one positional argument.
    pub fn argument(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends positional arguments in order.
    pub fn arguments<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets an option, overwriting any earlier value for `key`.
    pub fn option(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.set_option(key, value);
        self
    }

    /// In-place form of [`option`](Self::option), used by option types.
    pub fn set_option(&mut self, key: impl Into<String>, value: impl ToString) {
        self.options.insert(key.into(), value.to_string());
    }

    /// Returns the current value of an option.
    pub fn get_option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    /// Adds a request header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Overrides the shell's timeout for this request; `None` disables it.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sends `data` as a raw `application/octet-stream` body.
    pub fn body_bytes(mut self, data: impl Into<Bytes>) -> Self {
        self.body = Some(RequestBody::Raw(data.into()));
        self
    }

    /// Sends `data` as a raw body.
    pub fn body_string(self, data: impl Into<String>) -> Self {
        self.body_bytes(data.into())
    }

    /// Sends `data` as a single unnamed file in a multipart body, the way the
    /// daemon expects file arguments.
    pub fn body_file(self, data: impl Into<Bytes>) -> Result<Self> {
        let part = files::bytes_part("", data.into())?;
        Ok(self.body_form(Form::new().part(FORM_FIELD_FILE, part)))
    }

    /// Sends a prepared multipart form.
    pub fn body_form(mut self, form: Form) -> Self {
        self.body = Some(RequestBody::Multipart(form));
        self
    }

    /// Builds the full request URL.
    pub fn url(&self) -> Result<Url> {
        let base = self.shell.base_url().as_str().trim_end_matches('/');
        let raw = format!("{}{}/{}", base, API_PATH, self.command);
        let mut url = Url::parse(&raw).map_err(|e| ShellError::InvalidAddress {
            address: raw.clone(),
            reason: e.to_string(),
        })?;

        {
            let mut query = url.query_pairs_mut();
            for arg in &self.args {
                query.append_pair("arg", arg);
            }
            for (key, value) in &self.options {
                query.append_pair(key, value);
            }
        }

        Ok(url)
    }

    /// Sends the request and checks the response status.
    #[instrument(skip(self), fields(command = %self.command))]
    pub async fn send(self) -> Result<Response> {
        let url = self.url()?;
        debug!(url = %url, args = self.args.len(), "Sending request");

        let mut request = self.shell.http_client().post(url);

        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        request = match self.body {
            None => request,
            Some(RequestBody::Raw(data)) => request.header(CONTENT_TYPE, MIME_FILE).body(data),
            Some(RequestBody::Multipart(form)) => request.multipart(form),
        };

        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await.map_err(transport_error)?;
        Response::from_http(self.command, response).await
    }

    /// Sends the request and decodes the first JSON value of the response.
    pub async fn exec<T: DeserializeOwned>(self) -> Result<T> {
        self.send().await?.json().await
    }

    /// Sends the request and decodes the response as a stream of JSON values.
    pub async fn exec_stream<T: DeserializeOwned>(self) -> Result<JsonStream<T>> {
        Ok(self.send().await?.into_json_stream())
    }

    /// Sends the request and discards the response body.
    pub async fn exec_discard(self) -> Result<()> {
        self.send().await?.bytes().await.map(|_| ())
    }
}
