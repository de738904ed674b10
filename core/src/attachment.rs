//! Resolves a picture reference into a readable stream for upload.
//!
//! A reference starting with `http://` or `https://` is fetched through the
//! dispatcher; anything else is a local path. Opening fails fast: a picture
//! that cannot be read aborts the operation instead of uploading an empty
//! part.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::dispatch::Dispatcher;
use crate::error::{Result, WeiboError};
use crate::multipart::MultipartWriter;

const DEFAULT_FILE_NAME: &str = "pic";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentSource {
    Remote(String),
    Local(PathBuf),
}

impl AttachmentSource {
    /// Classify a picture reference. Returns `None` only for an empty
    /// reference; the reference is used exactly as given.
    pub fn parse(reference: &str) -> Option<Self> {
        (!reference.is_empty()).then(|| Self::from_reference(reference))
    }

    /// Classify a reference already known to be non-empty.
    pub fn from_reference(reference: &str) -> Self {
        let lower = reference.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            AttachmentSource::Remote(reference.to_string())
        } else {
            AttachmentSource::Local(PathBuf::from(reference))
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, AttachmentSource::Remote(_))
    }

    /// File name reported in the multipart part header.
    pub fn file_name(&self) -> String {
        let name = match self {
            AttachmentSource::Remote(url) => url::Url::parse(url)
                .ok()
                .and_then(|u| {
                    u.path_segments()
                        .and_then(|mut segments| segments.next_back().map(str::to_string))
                })
                .filter(|s| !s.is_empty()),
            AttachmentSource::Local(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned()),
        };
        name.unwrap_or_else(|| DEFAULT_FILE_NAME.to_string())
    }

    /// Open the source. Remote sources issue one GET through `dispatcher`;
    /// local sources never touch it.
    pub fn open<D: Dispatcher + ?Sized>(&self, dispatcher: &D) -> Result<Attachment> {
        let reader: Box<dyn Read> = match self {
            AttachmentSource::Remote(url) => {
                debug!(%url, "fetching remote picture");
                dispatcher.fetch(url)?
            }
            AttachmentSource::Local(path) => Box::new(open_local(path)?),
        };
        Ok(Attachment {
            file_name: self.file_name(),
            reader,
        })
    }
}

impl fmt::Display for AttachmentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttachmentSource::Remote(url) => f.write_str(url),
            AttachmentSource::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

fn open_local(path: &Path) -> Result<File> {
    File::open(path)
        .map_err(|e| WeiboError::Transport(format!("open picture {}: {e}", path.display())))
}

/// An opened picture stream. Consumed by `write_into`, which releases the
/// underlying file or connection whether or not the copy succeeds.
pub struct Attachment {
    file_name: String,
    reader: Box<dyn Read>,
}

impl Attachment {
    pub fn from_reader(file_name: impl Into<String>, reader: impl Read + 'static) -> Self {
        Self {
            file_name: file_name.into(),
            reader: Box::new(reader),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Copy the whole stream into a file part named `field`.
    pub fn write_into(mut self, writer: &mut MultipartWriter, field: &str) -> io::Result<u64> {
        writer.write_file(field, &self.file_name, &mut self.reader)
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("file_name", &self.file_name)
            .finish_non_exhaustive()
    }
}
