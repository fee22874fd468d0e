//! Matching method declarations and invocations against pointcut-style
//! patterns: `<target-type> <name>(<param-types>)`.

use regex::Regex;

use super::type_matcher::TypeMatcher;
use super::{compile_simple_pattern, PatternError};
use crate::semantic::{MethodId, MethodSig, TyId, TypeArena};
use crate::tree::{MethodDecl, MethodInvocation};

/// One parameter slot in a method pattern.
#[derive(Debug, Clone)]
enum ParamPattern {
    /// `..`: any run of parameters, including none.
    AnyRun,
    /// A type pattern for a single parameter.
    Ty(TypeMatcher),
}

/// A compiled method pattern.
///
/// Matching is semantic: the candidate's *resolved* declaring type is
/// compared, not the syntactic receiver, because a receiver's static type
/// and the resolved declaring type differ for inherited methods. With
/// `match_overrides` enabled the declaring type's supertype chain is
/// searched as well.
#[derive(Debug, Clone)]
pub struct MethodMatcher {
    raw: String,
    target: TypeMatcher,
    name: Regex,
    params: Vec<ParamPattern>,
    match_overrides: bool,
}

impl MethodMatcher {
    /// Compiles a method pattern such as `java.util.List add(..)` or
    /// `com.foo.Bar doThing(int, String)`. Fails immediately on malformed
    /// input.
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        let trimmed = pattern.trim();
        let malformed = |expected| PatternError::Malformed {
            pattern: trimmed.to_owned(),
            expected,
        };

        let open = trimmed
            .find('(')
            .ok_or_else(|| malformed("an opening parenthesis"))?;
        if !trimmed.ends_with(')') {
            return Err(malformed("a closing parenthesis"));
        }
        let head = trimmed[..open].trim();
        let params_text = &trimmed[open + 1..trimmed.len() - 1];

        let mut head_parts = head.split_whitespace();
        let target_text = head_parts.next().ok_or_else(|| malformed("a target type"))?;
        let name_text = head_parts.next().ok_or_else(|| malformed("a method name"))?;
        if head_parts.next().is_some() {
            return Err(malformed("exactly `<type> <name>` before the parameter list"));
        }

        let target = TypeMatcher::new(target_text)?;
        let name = compile_simple_pattern(name_text)?;

        let mut params = Vec::new();
        let params_text = params_text.trim();
        if !params_text.is_empty() {
            for part in params_text.split(',') {
                let part = part.trim();
                if part == ".." {
                    params.push(ParamPattern::AnyRun);
                } else if part.is_empty() {
                    return Err(malformed("a parameter type between commas"));
                } else {
                    params.push(ParamPattern::Ty(TypeMatcher::new(part)?));
                }
            }
        }

        Ok(Self {
            raw: trimmed.to_owned(),
            target,
            name,
            params,
            match_overrides: false,
        })
    }

    /// Also match methods whose declaring type is a subtype of the target
    /// pattern, i.e. overrides of a matched declaration.
    #[must_use]
    pub fn match_overrides(mut self, enabled: bool) -> Self {
        self.match_overrides = enabled;
        self
    }

    /// The pattern as written.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.raw
    }

    /// Matches a resolved method signature.
    #[must_use]
    pub fn matches_sig(&self, sig: &MethodSig, arena: &TypeArena) -> bool {
        let target_hit = if self.match_overrides {
            self.target.matches_or_supertype(sig.declaring, arena)
        } else {
            self.target.matches(sig.declaring, arena)
        };
        if !target_hit {
            return false;
        }
        if !self.name.is_match(&sig.name) {
            return false;
        }
        match_params(&self.params, &sig.parameter_types, arena, sig.varargs)
    }

    /// Matches a method by handle.
    #[must_use]
    pub fn matches_method(&self, method: MethodId, arena: &TypeArena) -> bool {
        self.matches_sig(arena.method_sig(method), arena)
    }

    /// Matches an invocation through its resolved signature. An
    /// unattributed invocation never matches.
    #[must_use]
    pub fn matches_invocation(&self, node: &MethodInvocation, arena: &TypeArena) -> bool {
        node.method
            .is_some_and(|m| self.matches_method(m, arena))
    }

    /// Matches a method declaration through its resolved signature. An
    /// unattributed declaration never matches.
    #[must_use]
    pub fn matches_declaration(&self, node: &MethodDecl, arena: &TypeArena) -> bool {
        node.method
            .is_some_and(|m| self.matches_method(m, arena))
    }
}

/// Matches a parameter pattern list against resolved parameter types.
///
/// `..` may absorb any run of parameters. When the candidate is variadic
/// and the pattern list is shorter than the argument list, the final
/// declared pattern repeats for all trailing arguments.
fn match_params(
    patterns: &[ParamPattern],
    tys: &[TyId],
    arena: &TypeArena,
    varargs: bool,
) -> bool {
    match patterns.split_first() {
        None => tys.is_empty(),
        Some((ParamPattern::AnyRun, rest)) => {
            (0..=tys.len()).any(|k| match_params(rest, &tys[k..], arena, varargs))
        }
        Some((ParamPattern::Ty(matcher), rest)) => {
            let Some((first, remaining)) = tys.split_first() else {
                return false;
            };
            if !matcher.matches(*first, arena) {
                return false;
            }
            if rest.is_empty() && varargs && !remaining.is_empty() {
                return remaining.iter().all(|t| matcher.matches(*t, arena));
            }
            match_params(rest, remaining, arena, varargs)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::{ClassKind, MethodSig, PrimitiveKind, TypeArena};

    fn sig(
        arena: &mut TypeArena,
        declaring: &str,
        name: &str,
        params: Vec<TyId>,
        varargs: bool,
    ) -> MethodSig {
        let declaring = arena.intern_class(declaring, ClassKind::Class, None, vec![]);
        MethodSig {
            declaring,
            name: name.into(),
            return_ty: arena.unknown(),
            parameter_types: params,
            varargs,
            is_static: false,
            thrown: vec![],
        }
    }

    #[test]
    fn dotdot_matches_any_argument_count() {
        let arena = TypeArena::new();
        let string = arena.find_class("java.lang.String").expect("preloaded");
        let m = MethodMatcher::new("java.util.List add(..)").expect("compiles");
        let list = arena.find_class("java.util.List").expect("preloaded");
        let none = MethodSig {
            declaring: list,
            name: "add".into(),
            return_ty: arena.unknown(),
            parameter_types: vec![],
            varargs: false,
            is_static: false,
            thrown: vec![],
        };
        assert!(m.matches_sig(&none, &arena));
        let two = MethodSig {
            parameter_types: vec![string, string],
            ..none
        };
        assert!(m.matches_sig(&two, &arena));
    }

    #[test]
    fn parameter_order_matters() {
        let mut arena = TypeArena::new();
        let int = arena.primitive(PrimitiveKind::Int);
        let string = arena.find_class("java.lang.String").expect("preloaded");
        let m = MethodMatcher::new("com.foo.Bar doThing(int, String)").expect("compiles");
        let right = sig(&mut arena, "com.foo.Bar", "doThing", vec![int, string], false);
        assert!(m.matches_sig(&right, &arena));
        let swapped = sig(&mut arena, "com.foo.Bar", "doThing", vec![string, int], false);
        assert!(!m.matches_sig(&swapped, &arena));
    }

    #[test]
    fn varargs_final_parameter_repeats() {
        let mut arena = TypeArena::new();
        let string = arena.find_class("java.lang.String").expect("preloaded");
        let m = MethodMatcher::new("com.foo.Util join(String)").expect("compiles");
        // A variadic call site carries one resolved type per argument.
        let call = sig(
            &mut arena,
            "com.foo.Util",
            "join",
            vec![string, string, string],
            true,
        );
        assert!(m.matches_sig(&call, &arena));
        // A non-variadic signature with extra parameters does not match.
        let plain = sig(
            &mut arena,
            "com.foo.Util",
            "join",
            vec![string, string, string],
            false,
        );
        assert!(!m.matches_sig(&plain, &arena));
    }

    #[test]
    fn overrides_walk_the_declaring_chain() {
        let mut arena = TypeArena::new();
        let array_list = arena.find_class("java.util.ArrayList").expect("preloaded");
        let decl = MethodSig {
            declaring: array_list,
            name: "add".into(),
            return_ty: arena.unknown(),
            parameter_types: vec![],
            varargs: false,
            is_static: false,
            thrown: vec![],
        };
        let exact = MethodMatcher::new("java.util.List add(..)").expect("compiles");
        assert!(!exact.matches_sig(&decl, &arena));
        let with_overrides = MethodMatcher::new("java.util.List add(..)")
            .expect("compiles")
            .match_overrides(true);
        assert!(with_overrides.matches_sig(&decl, &arena));
    }

    #[test]
    fn malformed_patterns_fail_at_construction() {
        assert!(MethodMatcher::new("java.util.List add").is_err());
        assert!(MethodMatcher::new("add(..)").is_err());
        assert!(MethodMatcher::new("a b c(..)").is_err());
        assert!(MethodMatcher::new("java.util.List add(,)").is_err());
    }
}
