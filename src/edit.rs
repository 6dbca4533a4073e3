use crate::position::{OffsetEncoding, Range};
use crate::protocol::TextEdit;
use thiserror::Error;

/// Error types for edit operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// Start line does not exist in the document
    #[error("invalid start line: {line} (document has {line_count} lines)")]
    InvalidStartLine { line: u32, line_count: usize },
    /// Range ends before it starts
    #[error("invalid range {range}: end precedes start")]
    InvertedRange { range: Range },
    /// Two edits of one batch touch or intersect
    #[error("overlapping edits detected between edit {first} and {second}")]
    Overlap { first: usize, second: usize },
    /// Edit variant that cannot be reduced to a plain text edit
    #[error("edit {index}: unsupported edit kind `{kind}`")]
    UnsupportedEditKind { index: usize, kind: &'static str },
    /// A single edit of a batch failed
    #[error("edit {index}: {source}")]
    Rejected {
        index: usize,
        #[source]
        source: Box<EditError>,
    },
}

impl EditError {
    fn at(self, index: usize) -> Self {
        EditError::Rejected {
            index,
            source: Box::new(self),
        }
    }

    /// Index of the offending edit within its batch, if the error names one
    pub fn edit_index(&self) -> Option<usize> {
        match self {
            EditError::UnsupportedEditKind { index, .. } | EditError::Rejected { index, .. } => {
                Some(*index)
            }
            EditError::Overlap { first, .. } => Some(*first),
            EditError::InvalidStartLine { .. } | EditError::InvertedRange { .. } => None,
        }
    }
}

/// Apply a single edit to a set of lines
///
/// Pure transform: `lines` is left untouched and a new line array is
/// returned. An end line past the document clamps to the last line, keeping
/// its end character. Character offsets clamp to the length of their line.
///
/// # Returns
/// * `Ok(Vec<String>)` - Lines after the edit
/// * `Err(EditError)` - Start line outside the document or inverted range
pub fn apply_text_edit(
    lines: &[String],
    edit: &TextEdit,
    encoding: OffsetEncoding,
) -> Result<Vec<String>, EditError> {
    let range = edit.range;
    if range.is_inverted() {
        return Err(EditError::InvertedRange { range });
    }

    let start_line = range.start.line as usize;
    if start_line >= lines.len() {
        return Err(EditError::InvalidStartLine {
            line: range.start.line,
            line_count: lines.len(),
        });
    }

    let end_line = (range.end.line as usize).min(lines.len() - 1);
    let end_char = range.end.character;

    let start_text = &lines[start_line];
    let prefix = &start_text[..encoding.byte_index(start_text, range.start.character)];
    let end_text = &lines[end_line];
    let mut end_byte = encoding.byte_index(end_text, end_char);
    if end_line == start_line {
        // A clamped end may land before the start on the same line
        end_byte = end_byte.max(prefix.len());
    }
    let suffix = &end_text[end_byte..];

    let mut result = Vec::with_capacity(lines.len());
    result.extend_from_slice(&lines[..start_line]);

    if edit.new_text.is_empty() {
        // Deleting a whole line together with its ending leaves nothing behind
        if !prefix.is_empty() || !suffix.is_empty() {
            result.push(format!("{prefix}{suffix}"));
        }
    } else {
        let mut pieces = split_replacement(&edit.new_text);
        let last = pieces.pop().unwrap_or_default();
        match pieces.split_first() {
            None => result.push(format!("{prefix}{last}{suffix}")),
            Some((first, middle)) => {
                result.push(format!("{prefix}{first}"));
                result.extend(middle.iter().map(|line| line.to_string()));
                result.push(format!("{last}{suffix}"));
            }
        }
    }

    result.extend_from_slice(&lines[end_line + 1..]);
    Ok(result)
}

/// Split replacement text into lines
///
/// Accepts both `\n` and `\r\n` so the replacement never carries a line
/// ending of its own into the document.
fn split_replacement(text: &str) -> Vec<&str> {
    let mut pieces: Vec<&str> = text.split('\n').collect();
    let terminated = pieces.len() - 1;
    for piece in &mut pieces[..terminated] {
        let line: &str = *piece;
        *piece = line.strip_suffix('\r').unwrap_or(line);
    }
    pieces
}

/// Find the first pair of overlapping edits
///
/// Pairs are checked in index order, so the returned `(i, j)` always has
/// `i < j` and is the lowest such pair.
pub fn find_overlap(edits: &[TextEdit]) -> Option<(usize, usize)> {
    edits.iter().enumerate().find_map(|(i, first)| {
        edits[i + 1..]
            .iter()
            .position(|second| first.range.overlaps(&second.range))
            .map(|offset| (i, i + 1 + offset))
    })
}

/// Check a batch before anything is applied
///
/// Rejects inverted ranges first, then any overlapping pair.
pub fn validate_edits(edits: &[TextEdit]) -> Result<(), EditError> {
    for (index, edit) in edits.iter().enumerate() {
        if edit.range.is_inverted() {
            return Err(EditError::InvertedRange { range: edit.range }.at(index));
        }
    }
    match find_overlap(edits) {
        Some((first, second)) => Err(EditError::Overlap { first, second }),
        None => Ok(()),
    }
}

/// Sort edits by start position in descending order for sequential application
///
/// Applying from the bottom of the document upward keeps the line and
/// character positions of the remaining edits valid. Each edit is paired
/// with its index in the caller's slice for error reporting.
pub fn sort_edits_descending(edits: &[TextEdit]) -> Vec<(usize, &TextEdit)> {
    let mut sorted: Vec<(usize, &TextEdit)> = edits.iter().enumerate().collect();
    sorted.sort_by(|(_, a), (_, b)| b.range.start.cmp(&a.range.start));
    sorted
}

/// Apply a batch of edits against one snapshot of lines
///
/// The batch is validated as a whole before the first edit is applied, then
/// folded bottom-up through [`apply_text_edit`].
pub fn apply_edits(
    lines: Vec<String>,
    edits: &[TextEdit],
    encoding: OffsetEncoding,
) -> Result<Vec<String>, EditError> {
    validate_edits(edits)?;

    sort_edits_descending(edits)
        .into_iter()
        .try_fold(lines, |lines, (index, edit)| {
            apply_text_edit(&lines, edit, encoding).map_err(|e| e.at(index))
        })
}
