//! Byte spans into cached source files.

use serde::{Deserialize, Serialize};

/// Index of a file in a [`SourceCache`](crate::SourceCache).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileId(pub u32);

impl FileId {
    /// Used for spans that do not belong to any cached file.
    pub const DUMMY: FileId = FileId(u32::MAX);
}

/// Half-open byte range `[start, end)` inside one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// File the offsets refer to
    pub file_id: FileId,
    /// Byte offset of the first byte (inclusive)
    pub start: u32,
    /// Byte offset one past the last byte (exclusive)
    pub end: u32,
}

impl Span {
    /// A span with no location, for diagnostics not tied to source text.
    pub const DUMMY: Span = Span {
        file_id: FileId::DUMMY,
        start: 0,
        end: 0,
    };

    /// Create a span covering `start..end` in `file_id`.
    pub fn new(file_id: FileId, start: u32, end: u32) -> Self {
        Self { file_id, start, end }
    }

    /// True when the span belongs to no cached file.
    pub fn is_dummy(&self) -> bool {
        self.file_id == FileId::DUMMY
    }

    /// Length in bytes; zero for inverted ranges.
    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::DUMMY
    }
}

/// A span's start resolved to a human-readable position (1-indexed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// File name as registered in the cache
    pub file: String,
    /// Line number (1-indexed)
    pub line: u32,
    /// Column in characters (1-indexed)
    pub column: u32,
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dummy_span() {
        assert!(Span::DUMMY.is_dummy());
        assert!(Span::default().is_dummy());
        assert!(!Span::new(FileId(0), 0, 3).is_dummy());
    }

    #[test]
    fn test_inverted_span_has_zero_len() {
        let span = Span::new(FileId(0), 9, 4);
        assert_eq!(span.len(), 0);
        assert!(span.is_empty());
    }

    #[test]
    fn test_location_display() {
        let loc = Location {
            file: "src/app.js".to_string(),
            line: 3,
            column: 14,
        };
        assert_eq!(loc.to_string(), "src/app.js:3:14");
    }
}
