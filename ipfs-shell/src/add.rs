//! Uploads: `add` for bytes, readers, files, symlinks and directory trees.

use std::path::Path;

use bytes::Bytes;
use reqwest::multipart::Form;
use tokio::io::AsyncRead;
use tracing::{debug, instrument};

use ipfs_shell_core::error::{Result, ShellError};
use ipfs_shell_core::types::Object;

use crate::files;
use crate::request::RequestBuilder;
use crate::shell::Shell;

/// Option applied to an `add` request.
///
/// Options are applied in the order given; a later option for the same key
/// replaces an earlier one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddOption {
    /// Compute the identifier without storing the content.
    OnlyHash(bool),
    /// Pin the added content (daemon default: true).
    Pin(bool),
    /// Ask the daemon for progress records.
    Progress(bool),
    /// Store leaves as raw blocks.
    RawLeaves(bool),
}

impl AddOption {
    /// Query key this option sets.
    pub fn key(&self) -> &'static str {
        match self {
            AddOption::OnlyHash(_) => "only-hash",
            AddOption::Pin(_) => "pin",
            AddOption::Progress(_) => "progress",
            AddOption::RawLeaves(_) => "raw-leaves",
        }
    }

    fn enabled(&self) -> bool {
        match *self {
            AddOption::OnlyHash(v)
            | AddOption::Pin(v)
            | AddOption::Progress(v)
            | AddOption::RawLeaves(v) => v,
        }
    }

    /// Applies the option to a request.
    pub fn apply(&self, request: &mut RequestBuilder<'_>) {
        request.set_option(self.key(), self.enabled());
    }
}

impl Shell {
    fn add_request(&self, options: &[AddOption]) -> RequestBuilder<'_> {
        let mut request = self.request("add");
        for option in options {
            option.apply(&mut request);
        }
        request
    }

    /// Sends an `add` with `form` and returns the final object.
    ///
    /// With progress enabled the daemon interleaves records that carry no
    /// hash; the result is the last record that has one.
    async fn add_form(&self, form: Form, options: &[AddOption]) -> Result<Object> {
        let mut stream = self
            .add_request(options)
            .body_form(form)
            .exec_stream::<Object>()
            .await?;

        let mut last = None;
        while let Some(object) = stream.next().await {
            let object = object?;
            if !object.hash.is_empty() {
                last = Some(object);
            }
        }
        last.ok_or(ShellError::NoResults)
    }

    /// Adds `data` as a single unnamed file.
    #[instrument(skip_all)]
    pub async fn add(&self, data: impl Into<Bytes>, options: &[AddOption]) -> Result<Object> {
        let data = data.into();
        debug!(len = data.len(), ?options, "Adding bytes");
        let form = files::single(files::bytes_part("", data)?);
        self.add_form(form, options).await
    }

    /// Adds the content of `reader` as a single unnamed file, streaming it.
    #[instrument(skip(self, reader))]
    pub async fn add_reader<R>(&self, reader: R, options: &[AddOption]) -> Result<Object>
    where
        R: AsyncRead + Send + Sync + 'static,
    {
        let form = files::single(files::reader_part("", reader)?);
        self.add_form(form, options).await
    }

    /// Adds the file at `path`, named by its base name.
    ///
    /// A symlink is added as a link, not followed. Directories are rejected;
    /// use [`add_dir`](Self::add_dir).
    #[instrument(skip_all)]
    pub async fn add_file(&self, path: impl AsRef<Path>) -> Result<Object> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Adding file");
        let meta = tokio::fs::symlink_metadata(path).await?;
        let name = files::base_name(path)?;

        let part = if meta.file_type().is_symlink() {
            let target = tokio::fs::read_link(path).await?;
            files::symlink_part(&name, &target.to_string_lossy())?
        } else if meta.is_dir() {
            return Err(ShellError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is a directory", path.display()),
            )));
        } else {
            files::path_part(&name, path).await?
        };

        self.add_form(files::single(part), &[]).await
    }

    /// Adds a symlink node pointing at `target`.
    #[instrument(skip(self))]
    pub async fn add_link(&self, target: &str) -> Result<Object> {
        let form = files::single(files::symlink_part("", target)?);
        self.add_form(form, &[]).await
    }

    /// Adds the directory tree at `dir` recursively.
    ///
    /// Returns one object per added entry, the root last.
    #[instrument(skip_all)]
    pub async fn add_dir(&self, dir: impl AsRef<Path>) -> Result<Vec<Object>> {
        let dir = dir.as_ref();
        debug!(dir = %dir.display(), "Adding directory");
        if !tokio::fs::symlink_metadata(dir).await?.is_dir() {
            return Err(ShellError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is not a directory", dir.display()),
            )));
        }

        let form = files::directory_form(dir).await?;
        let objects = self
            .request("add")
            .option("recursive", true)
            .body_form(form)
            .exec_stream::<Object>()
            .await?
            .try_collect()
            .await?;

        if objects.is_empty() {
            return Err(ShellError::NoResults);
        }
        debug!(count = objects.len(), "Directory added");
        Ok(objects)
    }

    /// Adds `data` without pinning it.
    #[deprecated(note = "use `add` with `AddOption::Pin(false)`")]
    pub async fn add_no_pin(&self, data: impl Into<Bytes>) -> Result<Object> {
        self.add(data, &[AddOption::Pin(false)]).await
    }

    /// Adds `data` with explicit pin and raw-leaves settings.
    #[deprecated(note = "use `add` with `AddOption::Pin` and `AddOption::RawLeaves`")]
    pub async fn add_with_opts(
        &self,
        data: impl Into<Bytes>,
        pin: bool,
        raw_leaves: bool,
    ) -> Result<Object> {
        self.add(data, &[AddOption::Pin(pin), AddOption::RawLeaves(raw_leaves)])
            .await
    }
}
