//! Client configuration and API address discovery.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use ipfs_shell_core::constants::{
    API_FILE, API_PATH, DEFAULT_API_ADDRESS, DEFAULT_REPO_DIR, DEFAULT_USER_AGENT, ENV_API_URL,
    ENV_IPFS_PATH, ENV_PUBSUB_ENCODING, ENV_TIMEOUT_SECONDS,
};
use ipfs_shell_core::error::{Result, ShellError};

/// How pubsub topics and payloads are encoded on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PubSubEncoding {
    /// Topic and data travel as plain arguments; received payloads are base64.
    #[default]
    Legacy,
    /// Topics are multibase-encoded, data is sent as a file body, and received
    /// payloads are multibase strings (Kubo 0.11 and later).
    Multibase,
}

impl FromStr for PubSubEncoding {
    type Err = ShellError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(PubSubEncoding::Legacy),
            "multibase" => Ok(PubSubEncoding::Multibase),
            other => Err(ShellError::ConfigError(format!(
                "unknown pubsub encoding '{}', expected 'legacy' or 'multibase'",
                other
            ))),
        }
    }
}

impl fmt::Display for PubSubEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PubSubEncoding::Legacy => f.write_str("legacy"),
            PubSubEncoding::Multibase => f.write_str("multibase"),
        }
    }
}

/// Shell configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ShellConfig {
    /// Daemon API address: `host:port`, a URL, or a multiaddr
    /// such as `/ip4/127.0.0.1/tcp/5001`.
    pub api_url: String,
    /// Request timeout in seconds; `None` disables the client-side timeout.
    pub timeout_seconds: Option<u64>,
    /// Pubsub wire encoding.
    #[serde(default)]
    pub pubsub_encoding: PubSubEncoding,
    /// `User-Agent` sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_ADDRESS)
    }
}

impl ShellConfig {
    /// Creates a config for the daemon at `api_url`.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            timeout_seconds: None,
            pubsub_encoding: PubSubEncoding::default(),
            user_agent: default_user_agent(),
        }
    }

    /// Config for the local daemon, read from the repo's `api` file.
    ///
    /// Falls back to `localhost:5001` when no API file can be read.
    pub fn local() -> Self {
        Self::new(local_api_address())
    }

    /// Builds a config from the environment.
    ///
    /// Loads `.env` if present, then reads `IPFS_API_URL` (falling back to
    /// [`ShellConfig::local`]), `IPFS_TIMEOUT_SECONDS` and
    /// `IPFS_PUBSUB_ENCODING`.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut config = match std::env::var(ENV_API_URL) {
            Ok(url) if !url.trim().is_empty() => Self::new(url.trim()),
            _ => Self::local(),
        };

        if let Ok(raw) = std::env::var(ENV_TIMEOUT_SECONDS) {
            let seconds = raw.trim().parse::<u64>().map_err(|_| {
                ShellError::ConfigError(format!("{} must be a number of seconds, got '{}'", ENV_TIMEOUT_SECONDS, raw))
            })?;
            config.timeout_seconds = Some(seconds);
        }

        if let Ok(raw) = std::env::var(ENV_PUBSUB_ENCODING) {
            config.pubsub_encoding = raw.parse()?;
        }

        Ok(config)
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }

    /// Sets the pubsub wire encoding.
    pub fn with_pubsub_encoding(mut self, encoding: PubSubEncoding) -> Self {
        self.pubsub_encoding = encoding;
        self
    }

    /// Sets the `User-Agent` header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Returns the normalized base URL (without the `/api/v0` suffix).
    pub fn base_url(&self) -> Result<Url> {
        normalize_api_address(&self.api_url)
    }
}

/// Resolves the local daemon's API address.
///
/// Reads `$IPFS_PATH/api` (default `~/.ipfs/api`); a missing or empty file
/// yields `localhost:5001`.
pub fn local_api_address() -> String {
    repo_path()
        .and_then(|repo| api_address_from_repo(&repo))
        .unwrap_or_else(|| DEFAULT_API_ADDRESS.to_string())
}

fn repo_path() -> Option<PathBuf> {
    match std::env::var(ENV_IPFS_PATH) {
        Ok(path) if !path.trim().is_empty() => Some(expand_home(path.trim())),
        _ => dirs::home_dir().map(|home| home.join(DEFAULT_REPO_DIR)),
    }
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}

/// Reads the API address stored in `<repo>/api`.
pub fn api_address_from_repo(repo: &Path) -> Option<String> {
    let path = repo.join(API_FILE);
    match std::fs::read_to_string(&path) {
        Ok(contents) => {
            let address = contents.trim();
            if address.is_empty() {
                None
            } else {
                debug!(path = %path.display(), address, "Read API address from repo");
                Some(address.to_string())
            }
        }
        Err(_) => None,
    }
}

/// Normalizes an API address into an `http(s)` base URL.
///
/// Accepts `host:port`, full URLs, and `/ip4|ip6|dns|dns4|dns6/<host>/tcp/<port>`
/// multiaddrs with an optional `/http` or `/https` suffix. A trailing
/// `/api/v0` is stripped.
pub fn normalize_api_address(address: &str) -> Result<Url> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(invalid_address(address, "address is empty"));
    }

    let candidate = if trimmed.starts_with('/') {
        multiaddr_to_url(trimmed)?
    } else if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };

    let candidate = candidate.trim_end_matches('/');
    let candidate = candidate.strip_suffix(API_PATH).unwrap_or(candidate);

    let url = Url::parse(candidate).map_err(|e| invalid_address(address, e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid_address(
            address,
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if url.host_str().is_none() {
        return Err(invalid_address(address, "missing host"));
    }

    Ok(url)
}

fn multiaddr_to_url(addr: &str) -> Result<String> {
    let parts: Vec<&str> = addr.trim_matches('/').split('/').collect();

    match parts.as_slice() {
        [proto, host, "tcp", port, rest @ ..] => {
            let host = match *proto {
                "ip4" | "dns" | "dns4" | "dns6" => host.to_string(),
                "ip6" => format!("[{}]", host),
                other => {
                    return Err(invalid_address(
                        addr,
                        format!("unsupported protocol '{}'", other),
                    ))
                }
            };
            let port: u16 = port
                .parse()
                .map_err(|_| invalid_address(addr, format!("invalid port '{}'", port)))?;
            let scheme = match rest {
                [] | ["http"] => "http",
                ["https"] => "https",
                _ => return Err(invalid_address(addr, "unsupported multiaddr suffix")),
            };
            Ok(format!("{}://{}:{}", scheme, host, port))
        }
        _ => Err(invalid_address(addr, "expected /<proto>/<host>/tcp/<port>")),
    }
}

fn invalid_address(address: &str, reason: impl Into<String>) -> ShellError {
    ShellError::InvalidAddress {
        address: address.to_string(),
        reason: reason.into(),
    }
}
