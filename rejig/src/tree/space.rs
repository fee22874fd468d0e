//! Whitespace and comment capture.
//!
//! Every node owns the whitespace and comments that immediately precede it
//! (its prefix). Printing a prefix back out must reproduce the original
//! bytes exactly, which is what makes unmodified trees round-trip.

use serde::{Deserialize, Serialize};

/// The style of a captured comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommentStyle {
    /// A `// ...` comment running to the end of the line.
    Line,
    /// A `/* ... */` comment.
    Block,
}

/// A comment captured inside a [`Space`], together with the whitespace
/// that follows it (up to the next comment or the owning token).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Whether this is a line or block comment.
    pub style: CommentStyle,
    /// Comment text without the `//` or `/* */` delimiters.
    pub text: String,
    /// Whitespace between the end of this comment and whatever follows.
    pub suffix: String,
}

impl Comment {
    /// Creates a line comment with the given text and trailing whitespace.
    #[must_use]
    pub fn line(text: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            style: CommentStyle::Line,
            text: text.into(),
            suffix: suffix.into(),
        }
    }

    /// Creates a block comment with the given text and trailing whitespace.
    #[must_use]
    pub fn block(text: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            style: CommentStyle::Block,
            text: text.into(),
            suffix: suffix.into(),
        }
    }
}

/// Captured leading trivia: whitespace followed by zero or more comments.
///
/// The `whitespace` field holds the bytes before the first comment (or all
/// of the trivia when there are no comments); each comment then carries its
/// own suffix. Concatenating the pieces in order reproduces the input.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Space {
    /// Whitespace preceding the first comment (or the owning token).
    pub whitespace: String,
    /// Comments in source order, each with its trailing whitespace.
    pub comments: Vec<Comment>,
}

impl Space {
    /// An empty space: no whitespace, no comments.
    pub const EMPTY: Self = Self {
        whitespace: String::new(),
        comments: Vec::new(),
    };

    /// Creates a space holding only whitespace.
    #[must_use]
    pub fn of(whitespace: impl Into<String>) -> Self {
        Self {
            whitespace: whitespace.into(),
            comments: Vec::new(),
        }
    }

    /// A single ASCII space, the most common separator.
    #[must_use]
    pub fn single_space() -> Self {
        Self::of(" ")
    }

    /// True when the space contains no bytes at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.whitespace.is_empty() && self.comments.is_empty()
    }

    /// Renders the space back to its exact source bytes.
    #[must_use]
    pub fn print(&self) -> String {
        let mut out = String::with_capacity(self.whitespace.len());
        out.push_str(&self.whitespace);
        for comment in &self.comments {
            match comment.style {
                CommentStyle::Line => {
                    out.push_str("//");
                    out.push_str(&comment.text);
                }
                CommentStyle::Block => {
                    out.push_str("/*");
                    out.push_str(&comment.text);
                    out.push_str("*/");
                }
            }
            out.push_str(&comment.suffix);
        }
        out
    }

    /// The whitespace after the last newline in this space, i.e. the
    /// indentation of the line the owning token starts on. Empty when the
    /// space contains no newline.
    #[must_use]
    pub fn indent(&self) -> &str {
        let last = if let Some(comment) = self.comments.last() {
            &comment.suffix
        } else {
            &self.whitespace
        };
        match last.rfind('\n') {
            Some(pos) => &last[pos + 1..],
            None => "",
        }
    }

    /// Returns a copy with the indentation (everything after the last
    /// newline) replaced. Spaces without a newline are left untouched so
    /// that inline elements keep their single-space separators.
    #[must_use]
    pub fn with_indent(&self, indent: &str) -> Self {
        let mut out = self.clone();
        let target = if let Some(comment) = out.comments.last_mut() {
            &mut comment.suffix
        } else {
            &mut out.whitespace
        };
        if let Some(pos) = target.rfind('\n') {
            target.truncate(pos + 1);
            target.push_str(indent);
        }
        out
    }

    /// True when the space contains a newline (directly or in a comment
    /// suffix), meaning the owning token starts a new line.
    #[must_use]
    pub fn has_newline(&self) -> bool {
        self.whitespace.contains('\n')
            || self
                .comments
                .iter()
                .any(|c| c.suffix.contains('\n') || (c.style == CommentStyle::Line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_space_prints_nothing() {
        assert_eq!(Space::EMPTY.print(), "");
    }

    #[test]
    fn whitespace_round_trips() {
        let space = Space::of("\n    ");
        assert_eq!(space.print(), "\n    ");
    }

    #[test]
    fn comments_round_trip_in_order() {
        let space = Space {
            whitespace: "\n".to_owned(),
            comments: vec![
                Comment::line(" first", "\n"),
                Comment::block(" second ", "\n    "),
            ],
        };
        assert_eq!(space.print(), "\n// first\n/* second */\n    ");
    }

    #[test]
    fn indent_is_text_after_last_newline() {
        assert_eq!(Space::of("\n\n    ").indent(), "    ");
        assert_eq!(Space::of("  ").indent(), "");
        let with_comment = Space {
            whitespace: "\n".to_owned(),
            comments: vec![Comment::line(" note", "\n\t")],
        };
        assert_eq!(with_comment.indent(), "\t");
    }

    #[test]
    fn with_indent_replaces_only_last_line() {
        let space = Space::of("\n\n        ");
        let reindented = space.with_indent("  ");
        assert_eq!(reindented.print(), "\n\n  ");
        // No newline means nothing to re-indent.
        let inline = Space::of(" ");
        assert_eq!(inline.with_indent("    ").print(), " ");
    }
}
