use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Position in a text document (line and character)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Line number (0-indexed)
    pub line: u32,
    /// Character offset within the line (0-indexed, unit set by [`OffsetEncoding`])
    pub character: u32,
}

impl Position {
    pub const fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line
            .cmp(&other.line)
            .then(self.character.cmp(&other.character))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.character)
    }
}

/// Span between two positions in a text document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Empty range at `position`, the shape of a pure insertion
    pub const fn point(position: Position) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    /// True when the end precedes the start in document order
    pub fn is_inverted(&self) -> bool {
        self.end < self.start
    }

    /// Check whether two ranges overlap
    ///
    /// Two ranges are disjoint only when one ends strictly before the other
    /// begins. Ranges that touch at a shared boundary point overlap, so two
    /// insertions at the same position, or an edit ending where the next one
    /// starts, conflict.
    pub fn overlaps(&self, other: &Range) -> bool {
        if self.start.line > other.end.line || other.start.line > self.end.line {
            return false;
        }
        if self.start.line == other.end.line && self.start.character > other.end.character {
            return false;
        }
        if other.start.line == self.end.line && other.start.character > self.end.character {
            return false;
        }
        true
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Unit in which `Position::character` counts
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum OffsetEncoding {
    /// Bytes of the UTF-8 encoding
    #[serde(rename = "utf-8")]
    #[value(name = "utf-8")]
    Utf8,
    /// UTF-16 code units, the protocol default
    #[default]
    #[serde(rename = "utf-16")]
    #[value(name = "utf-16")]
    Utf16,
    /// Unicode scalar values
    #[serde(rename = "utf-32")]
    #[value(name = "utf-32")]
    Utf32,
}

impl OffsetEncoding {
    /// Convert a character offset into a byte index into `line`
    ///
    /// Offsets past the end of the line clamp to `line.len()`. An offset that
    /// falls inside a multi-unit character resolves to that character's start,
    /// so the returned index is always a char boundary.
    pub fn byte_index(self, line: &str, character: u32) -> usize {
        let target = character as usize;
        match self {
            OffsetEncoding::Utf8 => {
                if target >= line.len() {
                    return line.len();
                }
                let mut index = target;
                while !line.is_char_boundary(index) {
                    index -= 1;
                }
                index
            }
            OffsetEncoding::Utf16 => {
                let mut units = 0;
                for (index, ch) in line.char_indices() {
                    units += ch.len_utf16();
                    if units > target {
                        return index;
                    }
                }
                line.len()
            }
            OffsetEncoding::Utf32 => line
                .char_indices()
                .nth(target)
                .map_or(line.len(), |(index, _)| index),
        }
    }
}

impl fmt::Display for OffsetEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OffsetEncoding::Utf8 => "utf-8",
            OffsetEncoding::Utf16 => "utf-16",
            OffsetEncoding::Utf32 => "utf-32",
        };
        f.write_str(name)
    }
}
