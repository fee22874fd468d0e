//! Matching fully qualified type names against wildcard patterns.

use regex::Regex;

use super::{compile_name_pattern, PatternError};
use crate::semantic::{Ty, TyId, TypeArena};

/// A compiled type pattern. Matches against the erased fully qualified
/// name of a resolved type, never against handle identity or the
/// syntactic spelling at the use site.
#[derive(Debug, Clone)]
pub struct TypeMatcher {
    raw: String,
    regex: Regex,
    /// Dotless patterns additionally match `java.lang` simple names, since
    /// those types are usable without an import.
    dotless: bool,
}

impl TypeMatcher {
    /// Compiles a type pattern. Fails immediately on malformed input.
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        let trimmed = pattern.trim();
        let regex = compile_name_pattern(trimmed)?;
        Ok(Self {
            raw: trimmed.to_owned(),
            regex,
            dotless: !trimmed.contains('.'),
        })
    }

    /// The pattern as written.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.raw
    }

    /// Matches a fully qualified name.
    #[must_use]
    pub fn matches_name(&self, fqn: &str) -> bool {
        if fqn.is_empty() {
            return false;
        }
        if self.regex.is_match(fqn) {
            return true;
        }
        // `String` (no dots) should match `java.lang.String`: java.lang is
        // importable without being written out.
        if self.dotless {
            if let Some(simple) = fqn.strip_prefix("java.lang.") {
                return !simple.contains('.') && self.regex.is_match(simple);
            }
        }
        false
    }

    /// Matches a resolved type by its erased fully qualified name.
    #[must_use]
    pub fn matches(&self, ty: TyId, arena: &TypeArena) -> bool {
        if matches!(arena.ty(ty), Ty::Unknown) {
            return false;
        }
        self.matches_name(&arena.full_name(ty))
    }

    /// Matches the type or any of its supertypes/interfaces. Used when a
    /// matcher is asked to also accept overridden/inherited declarations.
    #[must_use]
    pub fn matches_or_supertype(&self, ty: TyId, arena: &TypeArena) -> bool {
        arena
            .self_and_supertypes(ty)
            .into_iter()
            .any(|t| self.matches(t, arena))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::TypeArena;

    #[test]
    fn exact_name_matches() {
        let m = TypeMatcher::new("java.util.List").expect("compiles");
        assert!(m.matches_name("java.util.List"));
        assert!(!m.matches_name("java.util.ArrayList"));
    }

    #[test]
    fn dotless_pattern_matches_java_lang() {
        let m = TypeMatcher::new("String").expect("compiles");
        assert!(m.matches_name("java.lang.String"));
        assert!(m.matches_name("String"));
        assert!(!m.matches_name("com.example.String"));
    }

    #[test]
    fn supertype_matching_walks_hierarchy() {
        let arena = TypeArena::new();
        let array_list = arena.find_class("java.util.ArrayList").expect("preloaded");
        let m = TypeMatcher::new("java.util.List").expect("compiles");
        assert!(!m.matches(array_list, &arena));
        assert!(m.matches_or_supertype(array_list, &arena));
    }

    #[test]
    fn unknown_type_never_matches() {
        let arena = TypeArena::new();
        let m = TypeMatcher::new("..*").expect("compiles");
        assert!(!m.matches(arena.unknown(), &arena));
    }
}
