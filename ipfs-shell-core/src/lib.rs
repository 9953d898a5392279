//! # ipfs-shell core
//!
//! Wire types, errors, and constants shared by the ipfs-shell crates.
//!
//! - **Types**: response shapes returned by the daemon's `/api/v0` commands
//! - **Errors**: the `ShellError` hierarchy and `Result` alias
//! - **Constants**: API paths, default addresses, environment variable names
//!
//! ## Example
//!
//! ```rust
//! use ipfs_shell_core::Object;
//!
//! // `add` reports sizes as strings; unparsable values decode to zero.
//! let obj: Object = serde_json::from_str(r#"{"Hash":"Qm..","Name":"a","Size":"12"}"#).unwrap();
//! assert_eq!(obj.size, 12);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod types;

pub use constants::*;
pub use error::{Result, ShellError};
pub use types::*;
