//! Replace references to one type with another.

use std::sync::Arc;

use compact_str::CompactString;

use super::imports::{name_tree, AddImportVisitor, RemoveImportVisitor};
use super::{Recipe, RecipeMetadata};
use crate::tree::{CompilationUnit, Expression, Identifier, Import};
use crate::visitor::{
    walk_compilation_unit, walk_expression, TraversalContext, TreeVisitor, VisitResult,
};

/// Rewrites simple-name and fully qualified references from one type to
/// another, then defers import maintenance to the import visitors.
pub struct ChangeType {
    old_fqn: String,
    new_fqn: String,
}

impl ChangeType {
    /// Creates the recipe for a pair of fully qualified names.
    #[must_use]
    pub fn new(old_fqn: impl Into<String>, new_fqn: impl Into<String>) -> Self {
        Self {
            old_fqn: old_fqn.into(),
            new_fqn: new_fqn.into(),
        }
    }
}

impl Recipe for ChangeType {
    fn name(&self) -> &'static str {
        "Change type"
    }

    fn metadata(&self) -> RecipeMetadata {
        RecipeMetadata {
            id: "change-type",
            category: "refactor",
        }
    }

    fn description(&self) -> &'static str {
        "Replace references to one type with another, updating imports"
    }

    fn visitor(&self) -> Box<dyn TreeVisitor + Send> {
        let new_simple = self
            .new_fqn
            .rsplit('.')
            .next()
            .unwrap_or(&self.new_fqn)
            .to_owned();
        let old_simple = self
            .old_fqn
            .rsplit('.')
            .next()
            .unwrap_or(&self.old_fqn)
            .to_owned();
        Box::new(ChangeTypeVisitor {
            old_fqn: self.old_fqn.clone(),
            new_fqn: self.new_fqn.clone(),
            old_simple: CompactString::from(old_simple),
            new_simple: CompactString::from(new_simple),
            changed: false,
        })
    }
}

struct ChangeTypeVisitor {
    old_fqn: String,
    new_fqn: String,
    old_simple: CompactString,
    new_simple: CompactString,
    changed: bool,
}

impl TreeVisitor for ChangeTypeVisitor {
    fn visit_compilation_unit(
        &mut self,
        cu: CompilationUnit,
        ctx: &mut TraversalContext,
    ) -> VisitResult<CompilationUnit> {
        let cu = walk_compilation_unit(self, cu, ctx)?;
        if self.changed {
            // The import visitors decide placement; this visitor only
            // reports the need.
            ctx.schedule_after(Box::new(RemoveImportVisitor::new(self.old_fqn.clone())));
            ctx.schedule_after(Box::new(AddImportVisitor::new(self.new_fqn.clone())));
        }
        Ok(cu)
    }

    /// Imports are maintained by the deferred visitors, not rewritten in
    /// place.
    fn visit_import(&mut self, import: Import, _ctx: &mut TraversalContext) -> VisitResult<Import> {
        Ok(import)
    }

    fn visit_identifier(
        &mut self,
        node: Arc<Identifier>,
        ctx: &mut TraversalContext,
    ) -> VisitResult<Arc<Identifier>> {
        let is_type_use = node.variable.is_none()
            && node.simple_name == self.old_simple
            && node
                .type_ref
                .is_some_and(|t| ctx.arena().full_name(t) == self.old_fqn);
        if is_type_use {
            self.changed = true;
            Ok(Arc::new(Identifier {
                simple_name: self.new_simple.clone(),
                type_ref: None,
                ..(*node).clone()
            }))
        } else {
            Ok(node)
        }
    }

    fn visit_expression(
        &mut self,
        expression: Expression,
        ctx: &mut TraversalContext,
    ) -> VisitResult<Expression> {
        // A fully written qualified reference is replaced as a whole.
        if matches!(expression, Expression::FieldAccess(_))
            && expression.qualified_name().as_deref() == Some(self.old_fqn.as_str())
        {
            self.changed = true;
            let prefix = expression.prefix().clone();
            return Ok(name_tree(&self.new_fqn).with_prefix(prefix));
        }
        walk_expression(self, expression, ctx)
    }
}
