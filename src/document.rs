use crate::edit::{self, EditError};
use crate::position::OffsetEncoding;
use crate::protocol::TextEdit;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Line ending convention of a whole file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    /// Any `\r\n` in the content selects CRLF for the whole file
    pub fn detect(content: &str) -> Self {
        if content.contains("\r\n") {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

impl fmt::Display for LineEnding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineEnding::Lf => f.write_str("LF"),
            LineEnding::CrLf => f.write_str("CRLF"),
        }
    }
}

/// Immutable snapshot of a file's text, split into lines
///
/// Lines are stored without their endings. The detected ending and the
/// trailing-newline flag are carried through every edit so that
/// [`Document::render`] reproduces the file's conventions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    lines: Vec<String>,
    line_ending: LineEnding,
    trailing_newline: bool,
}

impl Document {
    pub fn parse(content: &str) -> Self {
        let line_ending = LineEnding::detect(content);
        let trailing_newline = !content.is_empty() && content.ends_with(line_ending.as_str());
        let lines = content
            .split(line_ending.as_str())
            .map(str::to_string)
            .collect();

        Self {
            lines,
            line_ending,
            trailing_newline,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    pub fn has_trailing_newline(&self) -> bool {
        self.trailing_newline
    }

    /// Apply a batch of edits, producing a new snapshot
    ///
    /// All-or-nothing: on error no snapshot is produced and `self` is
    /// unchanged.
    pub fn apply_edits(
        &self,
        edits: &[TextEdit],
        encoding: OffsetEncoding,
    ) -> Result<Document, EditError> {
        let lines = edit::apply_edits(self.lines.clone(), edits, encoding)?;
        Ok(Document {
            lines,
            line_ending: self.line_ending,
            trailing_newline: self.trailing_newline,
        })
    }

    /// Line endings at the end of the joined lines that [`render`] drops
    ///
    /// Non-zero only for a file that had no trailing newline and was edited
    /// to end with one or more, e.g. by an "insert final newline" edit.
    ///
    /// [`render`]: Document::render
    pub fn dropped_trailing_endings(&self) -> usize {
        if self.trailing_newline {
            return 0;
        }
        let trailing_empty = self.lines.iter().rev().take_while(|line| line.is_empty()).count();
        trailing_empty.min(self.lines.len().saturating_sub(1))
    }

    /// Join the lines back into file content
    ///
    /// A file that ended with a line ending ends with one again (one is
    /// appended only when missing). A file that did not never gains one:
    /// trailing endings produced by edits are dropped, see
    /// [`dropped_trailing_endings`](Document::dropped_trailing_endings).
    pub fn render(&self) -> String {
        let ending = self.line_ending.as_str();
        let mut content = self.lines.join(ending);

        if self.trailing_newline {
            if !content.ends_with(ending) {
                content.push_str(ending);
            }
        } else {
            while content.ends_with(ending) {
                content.truncate(content.len() - ending.len());
            }
        }

        content
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::{Position, Range};
    use pretty_assertions::assert_eq;

    fn edit(sl: u32, sc: u32, el: u32, ec: u32, text: &str) -> TextEdit {
        TextEdit::new(
            Range::new(Position::new(sl, sc), Position::new(el, ec)),
            text,
        )
    }

    fn apply(content: &str, edits: &[TextEdit]) -> String {
        Document::parse(content)
            .apply_edits(edits, OffsetEncoding::Utf16)
            .unwrap()
            .render()
    }

    #[test]
    fn test_detect_line_ending() {
        assert_eq!(LineEnding::detect("a\nb\n"), LineEnding::Lf);
        assert_eq!(LineEnding::detect("a\r\nb\r\n"), LineEnding::CrLf);
        assert_eq!(LineEnding::detect("a\nb\r\nc\n"), LineEnding::CrLf);
        assert_eq!(LineEnding::detect(""), LineEnding::Lf);
    }

    #[test]
    fn test_parse() {
        let doc = Document::parse("abc\r\ndef\r\n");
        assert_eq!(doc.lines(), &["abc", "def", ""]);
        assert_eq!(doc.line_ending(), LineEnding::CrLf);
        assert!(doc.has_trailing_newline());

        let doc = Document::parse("abc\ndef");
        assert_eq!(doc.lines(), &["abc", "def"]);
        assert!(!doc.has_trailing_newline());
    }

    #[test]
    fn test_empty_batch_round_trips() {
        for content in [
            "",
            "\n",
            "abc",
            "abc\n",
            "abc\n\n",
            "a\r\nb\r\n",
            "a\r\nb",
            "mixed\r\nends\n",
        ] {
            assert_eq!(apply(content, &[]), content);
        }
    }

    #[test]
    fn test_crlf_preserved_for_lf_replacement_text() {
        assert_eq!(
            apply("one\r\ntwo\r\n", &[edit(0, 3, 0, 3, "\nadded")]),
            "one\r\nadded\r\ntwo\r\n"
        );
    }

    #[test]
    fn test_lf_preserved_for_crlf_replacement_text() {
        assert_eq!(
            apply("one\ntwo\n", &[edit(1, 0, 1, 3, "x\r\ny")]),
            "one\nx\ny\n"
        );
    }

    #[test]
    fn test_no_trailing_newline_stays_absent() {
        assert_eq!(apply("abc", &[edit(0, 3, 0, 3, "\n")]), "abc");
        assert_eq!(apply("abc\ndef", &[edit(1, 0, 1, 3, "")]), "abc");
    }

    #[test]
    fn test_inserted_final_newline_is_dropped() {
        let doc = Document::parse("a\nb");
        assert_eq!(doc.dropped_trailing_endings(), 0);

        let edited = doc
            .apply_edits(&[edit(1, 1, 1, 1, "\n\n")], OffsetEncoding::Utf16)
            .unwrap();
        assert_eq!(edited.dropped_trailing_endings(), 2);
        assert_eq!(edited.render(), "a\nb");

        let kept = Document::parse("a\n")
            .apply_edits(&[edit(1, 0, 1, 0, "\n")], OffsetEncoding::Utf16)
            .unwrap();
        assert_eq!(kept.dropped_trailing_endings(), 0);

        let blank = Document::parse("")
            .apply_edits(&[edit(0, 0, 0, 0, "\n")], OffsetEncoding::Utf16)
            .unwrap();
        assert_eq!(blank.dropped_trailing_endings(), 1);
        assert_eq!(blank.render(), "");
    }

    #[test]
    fn test_trailing_newline_restored_once() {
        assert_eq!(apply("abc\n", &[edit(0, 0, 1, 0, "")]), "\n");
        assert_eq!(apply("abc\ndef\n", &[edit(0, 3, 2, 0, "")]), "abc\n");
        assert_eq!(apply("abc\n", &[edit(0, 3, 0, 3, "!")]), "abc!\n");
    }

    #[test]
    fn test_insert_then_delete_restores_original() {
        let original = "fn main() {\n    run();\n}\n";
        let inserted = apply(original, &[edit(1, 4, 1, 4, "let x = 1;\n    ")]);
        assert_eq!(inserted, "fn main() {\n    let x = 1;\n    run();\n}\n");

        let restored = apply(&inserted, &[edit(1, 4, 2, 4, "")]);
        assert_eq!(restored, original);
    }

    #[test]
    fn test_failed_batch_leaves_snapshot_untouched() {
        let doc = Document::parse("abc\ndef\n");
        let result = doc.apply_edits(
            &[edit(0, 0, 0, 1, "x"), edit(0, 1, 0, 2, "y")],
            OffsetEncoding::Utf16,
        );
        assert_eq!(result, Err(EditError::Overlap { first: 0, second: 1 }));
        assert_eq!(doc.render(), "abc\ndef\n");
    }
}
