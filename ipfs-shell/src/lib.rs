//! Async client for the IPFS daemon HTTP RPC API.
//!
//! A [`Shell`] issues `POST /api/v0/<command>` requests through a
//! [`RequestBuilder`] and decodes the answers into the types of
//! `ipfs-shell-core`.
//!
//! ```no_run
//! use ipfs_shell::{AddOption, Shell};
//!
//! # async fn run() -> ipfs_shell::Result<()> {
//! let shell = Shell::new("localhost:5001")?;
//! let added = shell.add("hello", &[AddOption::Pin(false)]).await?;
//! let body = shell.cat(&added.hash).await?.bytes().await?;
//! assert_eq!(&body[..], b"hello");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms, clippy::all)]

mod add;
mod bootstrap;
pub mod config;
mod dag;
mod files;
mod key;
mod name;
mod object;
mod pin;
mod pubsub;
mod request;
mod response;
mod shell;
mod stream;
mod swarm;

pub use add::AddOption;
pub use config::{PubSubEncoding, ShellConfig};
pub use dag::DagPutOptions;
pub use pubsub::{PubSubSubscription, SubscriptionHandle};
pub use request::RequestBuilder;
pub use response::Response;
pub use shell::Shell;
pub use stream::JsonStream;

pub use ipfs_shell_core::error::{Result, ShellError};
pub use ipfs_shell_core::types;
