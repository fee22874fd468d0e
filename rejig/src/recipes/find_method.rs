//! Search-only recipe: mark invocations matching a method pattern.

use std::sync::Arc;

use super::{Recipe, RecipeMetadata};
use crate::matcher::{MethodMatcher, PatternError};
use crate::tree::{CompilationUnit, Marker, MethodInvocation};
use crate::visitor::{walk_method_invocation, TraversalContext, TreeVisitor, VisitResult};

/// Attaches a search-result marker to every invocation the pattern
/// matches. Markers replace same-kind markers wholesale, so re-running
/// the search does not stack duplicates.
pub struct FindMethodUses {
    matcher: MethodMatcher,
}

impl FindMethodUses {
    /// Compiles the method pattern; malformed patterns fail here.
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        Ok(Self {
            matcher: MethodMatcher::new(pattern)?.match_overrides(true),
        })
    }
}

impl Recipe for FindMethodUses {
    fn name(&self) -> &'static str {
        "Find method uses"
    }

    fn metadata(&self) -> RecipeMetadata {
        RecipeMetadata {
            id: "find-method",
            category: "search",
        }
    }

    fn description(&self) -> &'static str {
        "Mark invocations matching a method pattern with search results"
    }

    fn visitor(&self) -> Box<dyn TreeVisitor + Send> {
        Box::new(FindMethodVisitor {
            matcher: self.matcher.clone(),
        })
    }
}

struct FindMethodVisitor {
    matcher: MethodMatcher,
}

impl TreeVisitor for FindMethodVisitor {
    fn visit_method_invocation(
        &mut self,
        node: Arc<MethodInvocation>,
        ctx: &mut TraversalContext,
    ) -> VisitResult<Arc<MethodInvocation>> {
        let node = walk_method_invocation(self, node, ctx)?;
        if self.matcher.matches_invocation(&node, ctx.arena()) {
            let description = node.method.map(|m| ctx.arena().method_signature(m));
            Ok(Arc::new(MethodInvocation {
                markers: node.markers.with(Marker::search_result(description)),
                ..(*node).clone()
            }))
        } else {
            Ok(node)
        }
    }
}

/// Counts search-result markers in a tree. Used to report find-only runs.
#[must_use]
pub fn count_search_results(cu: &CompilationUnit) -> usize {
    struct Counter {
        hits: usize,
    }
    impl TreeVisitor for Counter {
        fn visit_method_invocation(
            &mut self,
            node: Arc<MethodInvocation>,
            ctx: &mut TraversalContext,
        ) -> VisitResult<Arc<MethodInvocation>> {
            if node.markers.has_search_result() {
                self.hits += 1;
            }
            walk_method_invocation(self, node, ctx)
        }
    }
    let mut counter = Counter { hits: 0 };
    let mut ctx = TraversalContext::new(Arc::new(crate::semantic::TypeArena::new()));
    let _ = counter.visit_compilation_unit(cu.clone(), &mut ctx);
    counter.hits
}
