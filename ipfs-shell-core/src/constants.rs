//! Protocol constants for the daemon RPC API.

// ═══════════════════════════════════════════════════════════════════════════════
// ADDRESSING
// ═══════════════════════════════════════════════════════════════════════════════

/// Path prefix of every RPC command on the daemon.
pub const API_PATH: &str = "/api/v0";

/// Address used when no API file or explicit address is available.
pub const DEFAULT_API_ADDRESS: &str = "localhost:5001";

/// Repo directory name under the user's home when `IPFS_PATH` is unset.
pub const DEFAULT_REPO_DIR: &str = ".ipfs";

/// File inside the repo holding the daemon's API multiaddr.
pub const API_FILE: &str = "api";

// ═══════════════════════════════════════════════════════════════════════════════
// ENVIRONMENT
// ═══════════════════════════════════════════════════════════════════════════════

/// Overrides the repo location used to discover the API file.
pub const ENV_IPFS_PATH: &str = "IPFS_PATH";

/// Explicit API address (host:port, URL, or multiaddr).
pub const ENV_API_URL: &str = "IPFS_API_URL";

/// Client-side request timeout in seconds.
pub const ENV_TIMEOUT_SECONDS: &str = "IPFS_TIMEOUT_SECONDS";

/// Pubsub wire encoding (`legacy` or `multibase`).
pub const ENV_PUBSUB_ENCODING: &str = "IPFS_PUBSUB_ENCODING";

// ═══════════════════════════════════════════════════════════════════════════════
// REQUEST DEFAULTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Options attached to every request unless overwritten.
pub const DEFAULT_OPTIONS: [(&str, &str); 2] = [("encoding", "json"), ("stream-channels", "true")];

/// Default `User-Agent` header.
pub const DEFAULT_USER_AGENT: &str = concat!("ipfs-shell/", env!("CARGO_PKG_VERSION"));

// ═══════════════════════════════════════════════════════════════════════════════
// MULTIPART CONTENT TYPES
// ═══════════════════════════════════════════════════════════════════════════════

/// Content type of a regular file part.
pub const MIME_FILE: &str = "application/octet-stream";

/// Content type of a directory part.
pub const MIME_DIRECTORY: &str = "application/x-directory";

/// Content type of a symlink part; the part body is the link target.
pub const MIME_SYMLINK: &str = "application/symlink";

/// Form field name the daemon reads file parts from.
pub const FORM_FIELD_FILE: &str = "file";
