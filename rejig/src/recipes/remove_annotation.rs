//! Remove annotations matching an annotation pattern.

use std::sync::Arc;

use super::{Recipe, RecipeMetadata};
use crate::matcher::{AnnotationMatcher, PatternError};
use crate::semantic::TypeArena;
use crate::tree::{Annotation, ClassDecl, Marker, MethodDecl, Space};
use crate::visitor::{walk_class_decl, walk_method_decl, TraversalContext, TreeVisitor, VisitResult};

/// Removes matching annotations from method and class declarations,
/// transferring captured spacing so no blank artifact is left behind.
pub struct RemoveAnnotation {
    matcher: AnnotationMatcher,
}

impl RemoveAnnotation {
    /// Compiles the annotation pattern; malformed patterns fail here.
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        Ok(Self {
            matcher: AnnotationMatcher::new(pattern)?,
        })
    }
}

impl Recipe for RemoveAnnotation {
    fn name(&self) -> &'static str {
        "Remove annotation"
    }

    fn metadata(&self) -> RecipeMetadata {
        RecipeMetadata {
            id: "remove-annotation",
            category: "refactor",
        }
    }

    fn description(&self) -> &'static str {
        "Remove annotations matching an annotation pattern"
    }

    fn visitor(&self) -> Box<dyn TreeVisitor + Send> {
        Box::new(RemoveAnnotationVisitor {
            matcher: self.matcher.clone(),
        })
    }
}

struct RemoveAnnotationVisitor {
    matcher: AnnotationMatcher,
}

impl RemoveAnnotationVisitor {
    /// Filters the annotation list. When the first annotation goes away,
    /// its prefix moves to whatever becomes the declaration's first
    /// element, so the declaration keeps its leading trivia.
    fn filter(
        &self,
        annotations: &[Annotation],
        arena: &TypeArena,
    ) -> Option<(Vec<Annotation>, Option<Space>)> {
        if !annotations.iter().any(|a| self.matcher.matches(a, arena)) {
            return None;
        }
        let mut kept: Vec<Annotation> = Vec::with_capacity(annotations.len());
        let mut freed_prefix = None;
        for (i, annotation) in annotations.iter().enumerate() {
            if self.matcher.matches(annotation, arena) {
                if i == 0 {
                    freed_prefix = Some(annotation.prefix.clone());
                }
            } else if kept.is_empty() {
                if let Some(prefix) = freed_prefix.take() {
                    kept.push(Annotation {
                        prefix,
                        ..annotation.clone()
                    });
                    continue;
                }
                kept.push(annotation.clone());
            } else {
                kept.push(annotation.clone());
            }
        }
        Some((kept, freed_prefix))
    }
}

/// Moves a freed prefix onto the first remaining element of the
/// declaration after every annotation was removed.
fn reattach_method_prefix(method: &mut MethodDecl, prefix: Space) {
    if let Some(first) = method.modifiers.first_mut() {
        first.prefix = prefix;
    } else if let Some(return_type) = method.return_type.take() {
        method.return_type = Some(return_type.with_prefix(prefix));
    } else {
        method.name.prefix = prefix;
    }
}

impl TreeVisitor for RemoveAnnotationVisitor {
    fn visit_method_decl(
        &mut self,
        method: Arc<MethodDecl>,
        ctx: &mut TraversalContext,
    ) -> VisitResult<Arc<MethodDecl>> {
        let method = walk_method_decl(self, method, ctx)?;
        let Some((kept, freed)) = self.filter(&method.leading_annotations, ctx.arena()) else {
            return Ok(method);
        };
        let mut new = (*method).clone();
        new.leading_annotations = kept;
        if let Some(prefix) = freed {
            reattach_method_prefix(&mut new, prefix);
        }
        new.markers = new.markers.with(Marker::modified());
        Ok(Arc::new(new))
    }

    fn visit_class_decl(
        &mut self,
        class: Arc<ClassDecl>,
        ctx: &mut TraversalContext,
    ) -> VisitResult<Arc<ClassDecl>> {
        let class = walk_class_decl(self, class, ctx)?;
        let Some((kept, freed)) = self.filter(&class.leading_annotations, ctx.arena()) else {
            return Ok(class);
        };
        let mut new = (*class).clone();
        new.leading_annotations = kept;
        if let Some(prefix) = freed {
            if let Some(first) = new.modifiers.first_mut() {
                first.prefix = prefix;
            } else {
                new.kind.before = prefix;
            }
        }
        Ok(Arc::new(new))
    }
}
