//! Declarative matching against method, type, and annotation patterns.
//!
//! Patterns are compiled once, at construction, into regular expressions;
//! evaluation against candidates is then cheap and repeatable. Malformed
//! patterns fail at construction with a descriptive error, never at match
//! time.
//!
//! Wildcard semantics follow pointcut conventions: `*` matches within a
//! single package/class segment and never crosses a dot; `..` matches any
//! number of segments, including zero.

mod annotation_matcher;
mod method_matcher;
mod type_matcher;

pub use annotation_matcher::AnnotationMatcher;
pub use method_matcher::MethodMatcher;
pub use type_matcher::TypeMatcher;

use std::fmt;

use regex::Regex;

/// A pattern failed to compile. Raised at matcher construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// The pattern was empty where a name was required.
    Empty,
    /// A character outside the pattern grammar was found.
    InvalidCharacter {
        /// The offending character.
        character: char,
        /// The full pattern, for the error message.
        pattern: String,
    },
    /// A `.` produced an empty segment (leading, trailing, or `...`).
    EmptySegment {
        /// The full pattern.
        pattern: String,
    },
    /// The pattern ends with `..`, which has nothing to bind to.
    TrailingDotDot {
        /// The full pattern.
        pattern: String,
    },
    /// The overall shape of the pattern is wrong for the matcher kind.
    Malformed {
        /// The full pattern.
        pattern: String,
        /// What was expected.
        expected: &'static str,
    },
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty pattern"),
            Self::InvalidCharacter { character, pattern } => {
                write!(f, "invalid character {character:?} in pattern {pattern:?}")
            }
            Self::EmptySegment { pattern } => {
                write!(f, "empty segment in pattern {pattern:?}")
            }
            Self::TrailingDotDot { pattern } => {
                write!(f, "pattern {pattern:?} may not end with '..'")
            }
            Self::Malformed { pattern, expected } => {
                write!(f, "malformed pattern {pattern:?}: expected {expected}")
            }
        }
    }
}

impl std::error::Error for PatternError {}

/// One token of a dotted name pattern.
enum NameToken {
    /// A literal/wildcard segment such as `foo`, `*`, or `Ba*r`.
    Segment(String),
    /// The `..` multi-segment wildcard.
    DotDot,
}

/// Tokenizes a dotted name pattern, validating segment shapes.
fn tokenize_name(pattern: &str) -> Result<Vec<NameToken>, PatternError> {
    if pattern.is_empty() {
        return Err(PatternError::Empty);
    }
    let mut tokens = Vec::new();
    let mut segment = String::new();
    let mut chars = pattern.chars().peekable();
    let mut last_was_separator = true;
    while let Some(c) = chars.next() {
        match c {
            '.' => {
                if chars.peek() == Some(&'.') {
                    chars.next();
                    if !segment.is_empty() {
                        tokens.push(NameToken::Segment(std::mem::take(&mut segment)));
                    } else if !last_was_separator {
                        // e.g. "a...", a dot directly before `..`
                        return Err(PatternError::EmptySegment {
                            pattern: pattern.to_owned(),
                        });
                    }
                    tokens.push(NameToken::DotDot);
                    last_was_separator = true;
                } else {
                    if segment.is_empty() {
                        return Err(PatternError::EmptySegment {
                            pattern: pattern.to_owned(),
                        });
                    }
                    tokens.push(NameToken::Segment(std::mem::take(&mut segment)));
                    last_was_separator = false;
                }
            }
            c if c.is_alphanumeric() || matches!(c, '_' | '$' | '*' | '[' | ']') => {
                segment.push(c);
                last_was_separator = false;
            }
            other => {
                return Err(PatternError::InvalidCharacter {
                    character: other,
                    pattern: pattern.to_owned(),
                })
            }
        }
    }
    if !segment.is_empty() {
        tokens.push(NameToken::Segment(segment));
    } else if let Some(NameToken::DotDot) = tokens.last() {
        return Err(PatternError::TrailingDotDot {
            pattern: pattern.to_owned(),
        });
    } else {
        return Err(PatternError::EmptySegment {
            pattern: pattern.to_owned(),
        });
    }
    Ok(tokens)
}

/// Renders one segment to regex, expanding `*` to a within-segment
/// wildcard and escaping regex metacharacters.
fn segment_regex(segment: &str, out: &mut String) {
    for c in segment.chars() {
        match c {
            '*' => out.push_str("[^.]*"),
            '$' => out.push_str("\\$"),
            '[' => out.push_str("\\["),
            ']' => out.push_str("\\]"),
            other => out.push(other),
        }
    }
}

/// Compiles a dotted name pattern (with `*` and `..` wildcards) into an
/// anchored regex over fully qualified names.
pub(crate) fn compile_name_pattern(pattern: &str) -> Result<Regex, PatternError> {
    let tokens = tokenize_name(pattern)?;
    let mut regex = String::with_capacity(pattern.len() + 8);
    regex.push('^');
    let mut first = true;
    let mut pending_dotdot = false;
    for token in &tokens {
        match token {
            NameToken::DotDot => pending_dotdot = true,
            NameToken::Segment(segment) => {
                if pending_dotdot {
                    if first {
                        regex.push_str("(?:[^.]+\\.)*");
                    } else {
                        regex.push_str("\\.(?:[^.]+\\.)*");
                    }
                    pending_dotdot = false;
                } else if !first {
                    regex.push_str("\\.");
                }
                segment_regex(segment, &mut regex);
                first = false;
            }
        }
    }
    regex.push('$');
    Regex::new(&regex).map_err(|_| PatternError::Malformed {
        pattern: pattern.to_owned(),
        expected: "a dotted name pattern",
    })
}

/// Compiles a simple (dotless) name pattern, e.g. a method name with `*`
/// wildcards.
pub(crate) fn compile_simple_pattern(pattern: &str) -> Result<Regex, PatternError> {
    if pattern.is_empty() {
        return Err(PatternError::Empty);
    }
    let mut regex = String::with_capacity(pattern.len() + 4);
    regex.push('^');
    for c in pattern.chars() {
        match c {
            '*' => regex.push_str("[^.]*"),
            '$' => regex.push_str("\\$"),
            c if c.is_alphanumeric() || c == '_' => regex.push(c),
            other => {
                return Err(PatternError::InvalidCharacter {
                    character: other,
                    pattern: pattern.to_owned(),
                })
            }
        }
    }
    regex.push('$');
    Regex::new(&regex).map_err(|_| PatternError::Malformed {
        pattern: pattern.to_owned(),
        expected: "a simple name pattern",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_stays_within_segment() {
        let re = compile_name_pattern("com.foo.*").expect("compiles");
        assert!(re.is_match("com.foo.Bar"));
        assert!(!re.is_match("com.foo.sub.Baz"));
    }

    #[test]
    fn dotdot_crosses_segments() {
        let re = compile_name_pattern("com.foo..*").expect("compiles");
        assert!(re.is_match("com.foo.Baz"));
        assert!(re.is_match("com.foo.sub.Baz"));
        assert!(!re.is_match("com.other.Baz"));
    }

    #[test]
    fn leading_dotdot_matches_any_prefix() {
        let re = compile_name_pattern("..List").expect("compiles");
        assert!(re.is_match("java.util.List"));
        assert!(re.is_match("List"));
        assert!(!re.is_match("java.util.ArrayList"));
    }

    #[test]
    fn malformed_patterns_fail_at_compile_time() {
        assert!(matches!(
            compile_name_pattern(""),
            Err(PatternError::Empty)
        ));
        assert!(compile_name_pattern(".foo").is_err());
        assert!(compile_name_pattern("foo.").is_err());
        assert!(compile_name_pattern("com..").is_err());
        assert!(compile_name_pattern("com.f oo").is_err());
        assert!(compile_name_pattern("a...b").is_err());
    }

    #[test]
    fn simple_pattern_wildcards() {
        let re = compile_simple_pattern("get*").expect("compiles");
        assert!(re.is_match("getName"));
        assert!(!re.is_match("setName"));
        assert!(compile_simple_pattern("a.b").is_err());
    }
}
