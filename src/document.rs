//! Reading, writing and removing the files that make up a document.

use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Error, Result};

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Character encoding of a document on disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextEncoding {
    /// UTF-8
    #[default]
    Utf8,
    /// ISO-8859-1: every char up to U+00FF is one byte of the same value
    Latin1,
}

impl TextEncoding {
    /// Encode `text` into bytes. Characters the encoding cannot represent
    /// are an error rather than being replaced.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>> {
        match self {
            TextEncoding::Utf8 => Ok(text.as_bytes().to_vec()),
            TextEncoding::Latin1 => {
                if !encoding_rs::mem::is_str_latin1(text) {
                    return Err(Error::Encoding(
                        "text contains characters not representable in Latin-1".to_string(),
                    ));
                }
                Ok(encoding_rs::mem::encode_latin1_lossy(text).into_owned())
            }
        }
    }

    /// Decode bytes into text.
    pub fn decode(&self, bytes: &[u8]) -> Result<String> {
        match self {
            TextEncoding::Utf8 => std::str::from_utf8(bytes)
                .map(str::to_string)
                .map_err(|e| Error::Encoding(e.to_string())),
            TextEncoding::Latin1 => Ok(encoding_rs::mem::decode_latin1(bytes).into_owned()),
        }
    }
}

/// Whether `path` names no document yet (an unsaved buffer).
pub fn is_unsaved(path: &Path) -> bool {
    path.as_os_str().is_empty()
}

/// Read and decode the whole file at `path`.
pub fn read_text(path: &Path, encoding: TextEncoding) -> Result<String> {
    let bytes = fs::read(path)?;
    encoding.decode(&bytes)
}

/// Overwrite the file at `path` with `text`.
pub fn write_text(path: &Path, text: &str, encoding: TextEncoding) -> Result<()> {
    let bytes = encoding.encode(text)?;
    fs::write(path, &bytes)?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "wrote file");
    Ok(())
}

/// Directory holding `document`. Empty for a bare relative file name.
pub fn document_dir(document: &Path) -> &Path {
    document.parent().unwrap_or_else(|| Path::new(""))
}

/// Create a fresh, empty preview file next to `document`.
///
/// The name is `<prefix><secs>.<nanos>.html`. If a file with that stamp
/// already exists the stamp is bumped until an unused name is found, so
/// rapid repeated calls never share a path.
pub fn create_preview_file(document: &Path, prefix: &str) -> Result<(PathBuf, File)> {
    let dir = document_dir(document);
    let mut stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);

    loop {
        let name = format!(
            "{}{}.{:09}.html",
            prefix,
            stamp / NANOS_PER_SEC,
            stamp % NANOS_PER_SEC
        );
        let path = dir.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => stamp += 1,
            Err(e) => return Err(e.into()),
        }
    }
}

/// Write `html` into the preview file opened at `preview` and close it.
/// On failure the file is removed so no empty preview is left behind.
pub fn fill_preview(preview: &Path, mut file: File, html: &str) -> Result<()> {
    let written = file.write_all(html.as_bytes()).and_then(|()| file.flush());
    drop(file);
    if let Err(e) = written {
        remove_quietly(preview);
        return Err(e.into());
    }
    Ok(())
}

/// Remove `path`, ignoring every failure. Returns whether a file was removed.
pub fn remove_quietly(path: &Path) -> bool {
    match fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "removed file");
            true
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => false,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "could not remove file");
            false
        }
    }
}
