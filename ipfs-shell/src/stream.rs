//! Incremental decoding of bodies made of concatenated JSON values.
//!
//! Commands such as `add` (recursive), `refs`, `dht/findpeer` and
//! `pubsub/sub` answer with one JSON value per result, written as the daemon
//! produces them.

use std::marker::PhantomData;

use bytes::Bytes;
use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use serde::de::DeserializeOwned;

use ipfs_shell_core::error::{Result, ShellError};

use crate::response::transport_error;

/// Locates the end of each top-level JSON value without decoding it.
///
/// Bytes are examined once, however many chunks a value is split over, so a
/// value is handed to serde only when it is complete.
#[derive(Debug, Default)]
struct Framer {
    scanned: usize,
    depth: usize,
    started: bool,
    in_string: bool,
    escaped: bool,
}

impl Framer {
    /// Scans the unseen tail of `buf` and returns the length of the prefix
    /// that holds the first complete value. The caller drains that prefix
    /// before scanning again.
    fn scan(&mut self, buf: &[u8]) -> Option<usize> {
        while self.scanned < buf.len() {
            let i = self.scanned;
            let b = buf[i];
            self.scanned += 1;

            if self.in_string {
                if self.escaped {
                    self.escaped = false;
                } else if b == b'\\' {
                    self.escaped = true;
                } else if b == b'"' {
                    self.in_string = false;
                    if self.depth == 0 {
                        return Some(self.finish(i + 1));
                    }
                }
                continue;
            }

            if !self.started {
                if b.is_ascii_whitespace() {
                    continue;
                }
                self.started = true;
                match b {
                    b'{' | b'[' => self.depth = 1,
                    b'"' => self.in_string = true,
                    _ => {}
                }
                continue;
            }

            match b {
                // A bare scalar ends where the next token starts.
                b'"' | b'{' | b'[' if self.depth == 0 => return Some(self.finish(i)),
                b'"' => self.in_string = true,
                b'{' | b'[' => self.depth += 1,
                b'}' | b']' if self.depth <= 1 => {
                    let end = if self.depth == 1 { i + 1 } else { i };
                    return Some(self.finish(end));
                }
                b'}' | b']' => self.depth -= 1,
                b if self.depth == 0 && b.is_ascii_whitespace() => return Some(self.finish(i)),
                _ => {}
            }
        }
        None
    }

    /// True while no value has started, i.e. everything scanned was
    /// whitespace.
    fn is_idle(&self) -> bool {
        !self.started
    }

    fn finish(&mut self, end: usize) -> usize {
        *self = Framer::default();
        end
    }
}

/// A lazy, finite, non-restartable sequence of JSON values.
///
/// Values are decoded as soon as their bytes arrive. End of stream ends the
/// sequence normally. A malformed value, a truncated trailing value, or a
/// transport failure is yielded once as an error and ends the sequence.
pub struct JsonStream<T> {
    command: String,
    body: BoxStream<'static, reqwest::Result<Bytes>>,
    buf: Vec<u8>,
    framer: Framer,
    finished: bool,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> JsonStream<T> {
    pub(crate) fn new(command: String, body: BoxStream<'static, reqwest::Result<Bytes>>) -> Self {
        Self {
            command,
            body,
            buf: Vec::new(),
            framer: Framer::default(),
            finished: false,
            _marker: PhantomData,
        }
    }

    /// The command whose output is being decoded.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Decodes the next value, `None` once the stream is exhausted.
    pub async fn next(&mut self) -> Option<Result<T>> {
        loop {
            if let Some(end) = self.framer.scan(&self.buf) {
                let decoded = serde_json::from_slice(&self.buf[..end]);
                self.buf.drain(..end);
                return Some(decoded.map_err(|e| self.fail(e)));
            }
            if self.framer.is_idle() {
                self.buf.clear();
                self.framer = Framer::default();
            }

            if self.finished {
                if self.buf.is_empty() {
                    return None;
                }
                // Trailing bare scalar, or a value cut short by end of stream.
                let decoded = serde_json::from_slice(&self.buf);
                self.buf.clear();
                self.framer = Framer::default();
                return Some(decoded.map_err(|e| self.fail(e)));
            }

            match self.body.next().await {
                Some(Ok(chunk)) => self.buf.extend_from_slice(&chunk),
                Some(Err(e)) => {
                    self.finished = true;
                    return Some(Err(transport_error(e)));
                }
                None => self.finished = true,
            }
        }
    }

    fn fail(&mut self, e: serde_json::Error) -> ShellError {
        self.finished = true;
        self.buf.clear();
        self.framer = Framer::default();
        ShellError::DecodeError(format!("{}: {}", self.command, e))
    }

    /// Collects every remaining value, failing on the first error.
    pub async fn try_collect(mut self) -> Result<Vec<T>> {
        let mut out = Vec::new();
        while let Some(item) = self.next().await {
            out.push(item?);
        }
        Ok(out)
    }

    /// Converts into a `futures::Stream`.
    pub fn into_stream(self) -> impl Stream<Item = Result<T>> + Send + 'static
    where
        T: Send + 'static,
    {
        futures::stream::unfold(self, |mut stream| async move {
            stream.next().await.map(|item| (item, stream))
        })
    }
}

#[cfg(test)]
pub(crate) fn from_chunks<T: DeserializeOwned>(command: &str, chunks: Vec<&'static str>) -> JsonStream<T> {
    let body = futures::stream::iter(
        chunks
            .into_iter()
            .map(|c| Ok::<_, reqwest::Error>(Bytes::from_static(c.as_bytes()))),
    )
    .boxed();
    JsonStream::new(command.to_string(), body)
}
