//! Multipart encoding of files, symlinks and directory trees for upload.
//!
//! Each entry is one part in the `file` field. The part's filename is the
//! entry path relative to the upload root (the encoder percent-encodes it)
//! and its content type tells the daemon what kind of node it is.

use std::path::{Component, Path};

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;
use tracing::debug;
use walkdir::WalkDir;

use ipfs_shell_core::constants::{FORM_FIELD_FILE, MIME_DIRECTORY, MIME_FILE, MIME_SYMLINK};
use ipfs_shell_core::error::{Result, ShellError};

fn typed(part: Part, mime: &str) -> Result<Part> {
    part.mime_str(mime)
        .map_err(|e| ShellError::ConfigError(format!("invalid content type '{}': {}", mime, e)))
}

/// A regular file part holding `data`.
pub(crate) fn bytes_part(name: &str, data: Bytes) -> Result<Part> {
    let len = data.len() as u64;
    typed(
        Part::stream_with_length(Body::from(data), len).file_name(name.to_string()),
        MIME_FILE,
    )
}

/// A regular file part streaming from `reader`.
pub(crate) fn reader_part<R>(name: &str, reader: R) -> Result<Part>
where
    R: AsyncRead + Send + Sync + 'static,
{
    let body = Body::wrap_stream(ReaderStream::new(reader));
    typed(Part::stream(body).file_name(name.to_string()), MIME_FILE)
}

/// A symlink part; the body is the link target.
pub(crate) fn symlink_part(name: &str, target: &str) -> Result<Part> {
    typed(
        Part::bytes(target.as_bytes().to_vec()).file_name(name.to_string()),
        MIME_SYMLINK,
    )
}

/// An empty directory marker part.
pub(crate) fn directory_part(name: &str) -> Result<Part> {
    typed(Part::bytes(Vec::new()).file_name(name.to_string()), MIME_DIRECTORY)
}

/// A regular file part streaming the file at `path`.
pub(crate) async fn path_part(name: &str, path: &Path) -> Result<Part> {
    let file = tokio::fs::File::open(path).await?;
    let len = file.metadata().await?.len();
    let body = Body::wrap_stream(ReaderStream::new(file));
    typed(
        Part::stream_with_length(body, len).file_name(name.to_string()),
        MIME_FILE,
    )
}

/// A form holding a single part.
pub(crate) fn single(part: Part) -> Form {
    Form::new().part(FORM_FIELD_FILE, part)
}

/// Last path component of `path` as UTF-8.
pub(crate) fn base_name(path: &Path) -> Result<String> {
    let name = match path.components().next_back() {
        Some(Component::Normal(name)) => name.to_string_lossy().into_owned(),
        _ => {
            let canonical = std::fs::canonicalize(path)?;
            canonical
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| {
                    std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        format!("cannot determine a name for {}", path.display()),
                    )
                })?
        }
    };
    Ok(name)
}

fn slash_path(root_name: &str, relative: &Path) -> String {
    let mut name = root_name.to_string();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            name.push('/');
            name.push_str(&part.to_string_lossy());
        }
    }
    name
}

/// Encodes the tree rooted at `root` as a multipart form.
///
/// The root directory itself is the first part, named after its base name.
/// Entries are emitted parents before children, siblings sorted by file name,
/// so the same tree always produces the same body. Symlinks are uploaded as
/// links, never followed.
pub(crate) async fn directory_form(root: &Path) -> Result<Form> {
    let root_name = base_name(root)?;
    let mut form = Form::new();
    let mut entries = 0usize;

    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| ShellError::IoError(std::io::Error::new(std::io::ErrorKind::InvalidInput, e)))?;
        let name = slash_path(&root_name, relative);
        let file_type = entry.file_type();

        let part = if file_type.is_dir() {
            directory_part(&name)?
        } else if file_type.is_symlink() {
            let target = std::fs::read_link(entry.path())?;
            symlink_part(&name, &target.to_string_lossy())?
        } else {
            path_part(&name, entry.path()).await?
        };

        form = form.part(FORM_FIELD_FILE, part);
        entries += 1;
    }

    debug!(root = %root.display(), entries, "Encoded directory for upload");
    Ok(form)
}
