//! Matching annotations against `@Type(arguments)` patterns.

use super::type_matcher::TypeMatcher;
use super::PatternError;
use crate::semantic::TypeArena;
use crate::tree::{printer, Annotation, Expression, LiteralValue};

/// The expected value of one annotation argument in a pattern.
#[derive(Debug, Clone)]
enum ArgValue {
    /// A string literal, compared by content.
    Str(String),
    /// A class literal: the `.class` suffix is stripped at compile time
    /// and the remainder compared as a type pattern against the fully
    /// qualified name.
    ClassRef(TypeMatcher),
    /// Anything else (numbers, booleans, enum constants), compared by
    /// source text.
    Text(String),
}

/// One argument slot in an annotation pattern.
#[derive(Debug, Clone)]
struct ArgPattern {
    /// The argument name; `None` means the implicit `value` argument.
    name: Option<String>,
    value: ArgValue,
}

/// A compiled annotation pattern.
///
/// The fully qualified annotation type is checked first as a cheap
/// short-circuit; argument values are only inspected when the type
/// matched. A pattern without an argument list matches regardless of the
/// candidate's arguments; a pattern with arguments requires each of them
/// to be present and equal.
#[derive(Debug, Clone)]
pub struct AnnotationMatcher {
    raw: String,
    ty: TypeMatcher,
    args: Option<Vec<ArgPattern>>,
}

impl AnnotationMatcher {
    /// Compiles an annotation pattern such as
    /// `@java.lang.SuppressWarnings("deprecation")`. Fails immediately on
    /// malformed input.
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        let trimmed = pattern.trim();
        let malformed = |expected| PatternError::Malformed {
            pattern: trimmed.to_owned(),
            expected,
        };
        let body = trimmed
            .strip_prefix('@')
            .ok_or_else(|| malformed("a leading '@'"))?;

        let (type_text, args) = match body.find('(') {
            Some(open) => {
                if !body.ends_with(')') {
                    return Err(malformed("a closing parenthesis"));
                }
                let inner = &body[open + 1..body.len() - 1];
                (&body[..open], Some(parse_args(inner, trimmed)?))
            }
            None => (body, None),
        };

        Ok(Self {
            raw: trimmed.to_owned(),
            ty: TypeMatcher::new(type_text)?,
            args,
        })
    }

    /// The pattern as written.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.raw
    }

    /// Matches a candidate annotation node.
    #[must_use]
    pub fn matches(&self, annotation: &Annotation, arena: &TypeArena) -> bool {
        // Type first: the cheap short-circuit.
        let fqn = annotation
            .annotation_type
            .type_ref()
            .map(|t| arena.full_name(t))
            .filter(|n| !n.is_empty())
            .or_else(|| annotation.annotation_type.qualified_name());
        let Some(fqn) = fqn else { return false };
        if !self.ty.matches_name(&fqn) {
            return false;
        }

        let Some(arg_patterns) = &self.args else {
            return true;
        };
        let Some(arguments) = &annotation.arguments else {
            // The pattern demands arguments; a bare annotation has none.
            return false;
        };
        let candidates: Vec<&Expression> = arguments.iter().collect();
        arg_patterns
            .iter()
            .all(|pattern| candidates.iter().any(|c| arg_matches(pattern, c, arena)))
    }
}

/// Matches one pattern argument against one candidate argument.
fn arg_matches(pattern: &ArgPattern, candidate: &Expression, arena: &TypeArena) -> bool {
    let wanted_name = pattern.name.as_deref().unwrap_or("value");
    let value = match candidate {
        Expression::Assignment(assign) => {
            let Some(name) = assign.variable.simple_name() else {
                return false;
            };
            if name != wanted_name {
                return false;
            }
            &assign.assignment.element
        }
        // A single unnamed argument is the implicit `value`.
        other => {
            if wanted_name != "value" {
                return false;
            }
            other
        }
    };
    value_matches(&pattern.value, value, arena)
}

fn value_matches(expected: &ArgValue, candidate: &Expression, arena: &TypeArena) -> bool {
    match expected {
        ArgValue::Str(s) => matches!(
            candidate,
            Expression::Literal(lit) if matches!(&lit.value, LiteralValue::String(v) if v == s)
        ),
        ArgValue::ClassRef(matcher) => {
            // Candidate shaped like `Foo.class`: strip the access and
            // compare the remaining type by fully qualified name.
            let Expression::FieldAccess(access) = candidate else {
                return false;
            };
            if access.name.element.simple_name != "class" {
                return false;
            }
            let fqn = access
                .target
                .type_ref()
                .map(|t| arena.full_name(t))
                .filter(|n| !n.is_empty())
                .or_else(|| access.target.qualified_name());
            fqn.is_some_and(|n| matcher.matches_name(&n))
        }
        ArgValue::Text(t) => printer::print_expression(candidate).trim() == t,
    }
}

/// Splits the argument list at top-level commas (string literals may
/// contain commas) and parses each slot.
fn parse_args(inner: &str, whole: &str) -> Result<Vec<ArgPattern>, PatternError> {
    let mut args = Vec::new();
    let mut in_string = false;
    let mut start = 0;
    let mut prev_escape = false;
    let mut parts: Vec<String> = Vec::new();
    for (i, c) in inner.char_indices() {
        match c {
            '"' if !prev_escape => in_string = !in_string,
            ',' if !in_string => {
                parts.push(inner[start..i].to_owned());
                start = i + 1;
            }
            _ => {}
        }
        prev_escape = c == '\\' && !prev_escape;
    }
    let tail = inner[start..].trim();
    if !tail.is_empty() {
        parts.push(tail.to_owned());
    }

    for part in parts {
        let part = part.trim();
        let (name, value_text) = match split_named(part) {
            Some((name, value)) => (Some(name.to_owned()), value.trim()),
            None => (None, part),
        };
        if value_text.is_empty() {
            return Err(PatternError::Malformed {
                pattern: whole.to_owned(),
                expected: "an argument value",
            });
        }
        let value = if value_text.starts_with('"') && value_text.ends_with('"') && value_text.len() >= 2
        {
            ArgValue::Str(unescape(&value_text[1..value_text.len() - 1]))
        } else if let Some(class_name) = value_text.strip_suffix(".class") {
            ArgValue::ClassRef(TypeMatcher::new(class_name)?)
        } else {
            ArgValue::Text(value_text.to_owned())
        };
        args.push(ArgPattern { name, value });
    }
    Ok(args)
}

/// Splits `name = value` at a top-level `=`, rejecting `==`.
fn split_named(part: &str) -> Option<(&str, &str)> {
    let mut in_string = false;
    let mut prev_escape = false;
    for (i, c) in part.char_indices() {
        match c {
            '"' if !prev_escape => in_string = !in_string,
            '=' if !in_string => {
                if part[i + 1..].starts_with('=') {
                    return None;
                }
                return Some((part[..i].trim(), &part[i + 1..]));
            }
            _ => {}
        }
        prev_escape = c == '\\' && !prev_escape;
    }
    None
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_and_rejects() {
        assert!(AnnotationMatcher::new("@java.lang.Deprecated").is_ok());
        assert!(AnnotationMatcher::new("java.lang.Deprecated").is_err());
        assert!(AnnotationMatcher::new("@com.foo.Anno(value = )").is_err());
        assert!(AnnotationMatcher::new("@com.foo.Anno(\"x\"").is_err());
    }

    #[test]
    fn class_literal_suffix_stripped_at_compile_time() {
        let m = AnnotationMatcher::new("@com.foo.Uses(com.foo.Bar.class)").expect("compiles");
        assert_eq!(m.pattern(), "@com.foo.Uses(com.foo.Bar.class)");
    }
}
