//! Rename methods matching a pattern, at declarations and call sites.

use std::sync::Arc;

use compact_str::CompactString;

use super::{Recipe, RecipeMetadata};
use crate::matcher::{MethodMatcher, PatternError};
use crate::tree::{Identifier, MethodDecl, MethodInvocation};
use crate::visitor::{
    walk_method_decl, walk_method_invocation, TraversalContext, TreeVisitor, VisitResult,
};

/// Renames declarations and invocations resolved to a matched method.
/// Safe to re-run: once renamed, the pattern no longer matches.
pub struct RenameMethod {
    matcher: MethodMatcher,
    new_name: CompactString,
}

impl RenameMethod {
    /// Compiles the method pattern; malformed patterns fail here.
    pub fn new(pattern: &str, new_name: impl Into<CompactString>) -> Result<Self, PatternError> {
        Ok(Self {
            matcher: MethodMatcher::new(pattern)?.match_overrides(true),
            new_name: new_name.into(),
        })
    }
}

impl Recipe for RenameMethod {
    fn name(&self) -> &'static str {
        "Rename method"
    }

    fn metadata(&self) -> RecipeMetadata {
        RecipeMetadata {
            id: "rename-method",
            category: "refactor",
        }
    }

    fn description(&self) -> &'static str {
        "Rename declarations and invocations matching a method pattern"
    }

    fn visitor(&self) -> Box<dyn TreeVisitor + Send> {
        Box::new(RenameMethodVisitor {
            matcher: self.matcher.clone(),
            new_name: self.new_name.clone(),
        })
    }
}

struct RenameMethodVisitor {
    matcher: MethodMatcher,
    new_name: CompactString,
}

impl RenameMethodVisitor {
    fn renamed(&self, name: &Identifier) -> Identifier {
        Identifier {
            simple_name: self.new_name.clone(),
            ..name.clone()
        }
    }
}

impl TreeVisitor for RenameMethodVisitor {
    fn visit_method_decl(
        &mut self,
        method: Arc<MethodDecl>,
        ctx: &mut TraversalContext,
    ) -> VisitResult<Arc<MethodDecl>> {
        let method = walk_method_decl(self, method, ctx)?;
        if self.matcher.matches_declaration(&method, ctx.arena()) {
            Ok(Arc::new(MethodDecl {
                name: self.renamed(&method.name),
                ..(*method).clone()
            }))
        } else {
            Ok(method)
        }
    }

    fn visit_method_invocation(
        &mut self,
        node: Arc<MethodInvocation>,
        ctx: &mut TraversalContext,
    ) -> VisitResult<Arc<MethodInvocation>> {
        let node = walk_method_invocation(self, node, ctx)?;
        if self.matcher.matches_invocation(&node, ctx.arena()) {
            Ok(Arc::new(MethodInvocation {
                name: self.renamed(&node.name),
                ..(*node).clone()
            }))
        } else {
            Ok(node)
        }
    }
}
