//! Source Map
//!
//! Registered source files addressed by stable handles. Offsets are byte
//! offsets into the file text.

use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_MAP: AtomicU32 = AtomicU32::new(0);

/// Opaque handle to a file registered in a [`SourceMap`]
///
/// Handles carry the identity of the map that issued them, so resolving a
/// handle against any other map fails even when the index exists there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId {
    map: u32,
    index: u32,
}

impl FileId {
    /// Raw index of this handle; only meaningful to the map that issued it
    pub fn index(self) -> usize {
        self.index as usize
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index)
    }
}

impl Serialize for FileId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.index)
    }
}

/// One source file with its full text
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub id: FileId,
    pub path: String,
    pub text: String,
    line_starts: Vec<usize>,
}

impl SourceFile {
    fn new(id: FileId, path: String, text: String) -> Self {
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(idx, _)| idx + 1))
            .collect();

        Self {
            id,
            path,
            text,
            line_starts,
        }
    }

    /// 1-based line and column for a byte offset
    ///
    /// Columns count characters, not bytes. Offsets past the end clamp to the
    /// end of the text.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.text.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let line_start = self.line_starts[line];

        let column = self
            .text
            .get(line_start..offset)
            .map(|prefix| prefix.chars().count())
            .unwrap_or(offset - line_start);

        (line + 1, column + 1)
    }

    /// Number of lines in the file
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

/// Ordered collection of source files
///
/// Every new map gets its own identity; clones share it.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceMap {
    id: u32,
    files: Vec<SourceFile>,
}

impl Default for SourceMap {
    fn default() -> Self {
        Self {
            id: NEXT_MAP.fetch_add(1, Ordering::Relaxed),
            files: Vec::new(),
        }
    }
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file and return its handle
    pub fn add(&mut self, path: impl Into<String>, text: impl Into<String>) -> FileId {
        let id = FileId {
            map: self.id,
            index: self.files.len() as u32,
        };
        self.files.push(SourceFile::new(id, path.into(), text.into()));
        id
    }

    /// Look up a file; `None` for handles issued by another map
    pub fn get(&self, id: FileId) -> Option<&SourceFile> {
        if id.map != self.id {
            return None;
        }
        self.files.get(id.index())
    }

    /// Look up a file, failing when the handle was not issued by this map
    pub fn resolve(&self, id: FileId) -> Result<&SourceFile, UnknownFile> {
        self.get(id).ok_or(UnknownFile(id))
    }

    pub fn files(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.iter()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// A file handle that does not belong to the source map it was resolved against
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("file {0} is not part of the source set")]
pub struct UnknownFile(pub FileId);
