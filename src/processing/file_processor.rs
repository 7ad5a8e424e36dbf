//! Corpus file loading.
//!
//! Reads a corpus file in one pass, decodes it with the configured
//! encoding and splits it into trimmed lines. The file handle is released
//! before any extraction work starts.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str;

use tracing::debug;

use crate::error::{ExtractError, Result};
use crate::types::Encoding;

/// A decoded corpus file.
#[derive(Debug, Clone)]
pub struct CorpusFile {
    /// Original file path.
    pub path: PathBuf,
    /// File name without extension; the middle segment of occurrence ids.
    pub stem: String,
    /// Lines, trimmed of surrounding whitespace.
    pub lines: Vec<String>,
    /// Encoding the content was decoded with.
    pub encoding: &'static str,
}

impl CorpusFile {
    /// Build a corpus file from in-memory content.
    pub fn from_content(path: impl Into<PathBuf>, content: &str) -> Self {
        let path = path.into();
        let stem = file_stem(&path).unwrap_or_default();
        Self {
            path,
            stem,
            lines: split_lines(content),
            encoding: "utf-8",
        }
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the file has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Loader for corpus files.
#[derive(Debug, Clone)]
pub struct FileProcessor {
    encoding: Encoding,
}

impl Default for FileProcessor {
    fn default() -> Self {
        Self::new(Encoding::Latin1)
    }
}

impl FileProcessor {
    /// Create a new file processor for the given encoding.
    pub fn new(encoding: Encoding) -> Self {
        Self { encoding }
    }

    /// Read and decode a corpus file.
    pub fn load(&self, path: &Path) -> Result<CorpusFile> {
        let bytes = std::fs::read(path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => ExtractError::NotFound {
                path: path.to_path_buf(),
            },
            _ => ExtractError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;

        let (text, encoding) = self.decode(path, &bytes)?;
        let lines = split_lines(&self.normalize_line_endings(&text));

        debug!(path = %path.display(), lines = lines.len(), encoding, "Loaded corpus file");

        Ok(CorpusFile {
            path: path.to_path_buf(),
            stem: file_stem(path).unwrap_or_default(),
            lines,
            encoding,
        })
    }

    /// Decode raw bytes with the configured encoding.
    ///
    /// UTF-8 decoding also accepts UTF-16 content that starts with a byte
    /// order mark. Latin-1 decoding always succeeds.
    pub fn decode(&self, path: &Path, content: &[u8]) -> Result<(String, &'static str)> {
        match self.encoding {
            Encoding::Latin1 => Ok((content.iter().map(|&b| b as char).collect(), "latin-1")),
            Encoding::Utf8 => {
                let content = content.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(content);
                match str::from_utf8(content) {
                    Ok(s) => Ok((s.to_string(), "utf-8")),
                    Err(e) => decode_utf16(content).ok_or_else(|| ExtractError::Decode {
                        path: path.to_path_buf(),
                        encoding: self.encoding.as_str(),
                        reason: e.to_string(),
                    }),
                }
            }
        }
    }

    /// Normalize line endings to Unix-style (LF).
    pub fn normalize_line_endings(&self, content: &str) -> String {
        content.replace("\r\n", "\n").replace('\r', "\n")
    }
}

/// Decode UTF-16 content carrying a byte order mark.
fn decode_utf16(content: &[u8]) -> Option<(String, &'static str)> {
    let (body, little_endian, name) = match content {
        [0xFF, 0xFE, rest @ ..] => (rest, true, "utf-16-le"),
        [0xFE, 0xFF, rest @ ..] => (rest, false, "utf-16-be"),
        _ => return None,
    };
    let units: Vec<u16> = body
        .chunks_exact(2)
        .map(|c| {
            if little_endian {
                u16::from_le_bytes([c[0], c[1]])
            } else {
                u16::from_be_bytes([c[0], c[1]])
            }
        })
        .collect();
    String::from_utf16(&units).ok().map(|s| (s, name))
}

fn split_lines(content: &str) -> Vec<String> {
    content.lines().map(|l| l.trim().to_string()).collect()
}

/// File name without its extension.
pub fn file_stem(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
}
