//! Add an annotation to methods matching a method pattern.

use std::sync::Arc;

use super::{Recipe, RecipeMetadata};
use crate::matcher::{AnnotationMatcher, MethodMatcher, PatternError};
use crate::template::{add_annotation_to_method, Template};
use crate::tree::MethodDecl;
use crate::visitor::{walk_method_decl, TraversalContext, TreeVisitor, VisitResult};

/// Adds an annotation before the existing annotations of every method the
/// pattern matches. Idempotent: a method already carrying a matching
/// annotation is left alone.
pub struct AddAnnotation {
    method_matcher: MethodMatcher,
    existing: AnnotationMatcher,
    annotation_text: String,
    annotation_fqn: String,
}

impl AddAnnotation {
    /// Compiles the patterns; malformed ones fail here.
    ///
    /// `annotation_text` is the snippet as it should appear in the source
    /// (e.g. `@Deprecated`), `annotation_fqn` the fully qualified type it
    /// refers to, used both for the idempotence check and the import.
    pub fn new(
        method_pattern: &str,
        annotation_text: impl Into<String>,
        annotation_fqn: impl Into<String>,
    ) -> Result<Self, PatternError> {
        let annotation_fqn = annotation_fqn.into();
        Ok(Self {
            method_matcher: MethodMatcher::new(method_pattern)?,
            existing: AnnotationMatcher::new(&format!("@{annotation_fqn}"))?,
            annotation_text: annotation_text.into(),
            annotation_fqn,
        })
    }
}

impl Recipe for AddAnnotation {
    fn name(&self) -> &'static str {
        "Add annotation"
    }

    fn metadata(&self) -> RecipeMetadata {
        RecipeMetadata {
            id: "add-annotation",
            category: "refactor",
        }
    }

    fn description(&self) -> &'static str {
        "Add an annotation to methods matching a method pattern"
    }

    fn visitor(&self) -> Box<dyn TreeVisitor + Send> {
        Box::new(AddAnnotationVisitor {
            method_matcher: self.method_matcher.clone(),
            existing: self.existing.clone(),
            template: Template::new(self.annotation_text.clone())
                .imports([self.annotation_fqn.clone()]),
        })
    }
}

struct AddAnnotationVisitor {
    method_matcher: MethodMatcher,
    existing: AnnotationMatcher,
    template: Template,
}

impl TreeVisitor for AddAnnotationVisitor {
    fn visit_method_decl(
        &mut self,
        method: Arc<MethodDecl>,
        ctx: &mut TraversalContext,
    ) -> VisitResult<Arc<MethodDecl>> {
        let method = walk_method_decl(self, method, ctx)?;
        if !self.method_matcher.matches_declaration(&method, ctx.arena()) {
            return Ok(method);
        }
        if method
            .leading_annotations
            .iter()
            .any(|a| self.existing.matches(a, ctx.arena()))
        {
            return Ok(method);
        }

        let (annotation, needs_imports) = self.template.apply_annotation(&ctx.cursor, &[])?;
        let method = add_annotation_to_method(&method, annotation);
        for import in needs_imports {
            ctx.schedule_after(Box::new(super::AddImportVisitor::new(import)));
        }
        Ok(method)
    }
}
