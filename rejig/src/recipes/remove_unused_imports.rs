//! Remove imports with no remaining usage.

use std::sync::Arc;

use rustc_hash::FxHashSet;

use super::{Recipe, RecipeMetadata};
use crate::tree::{CompilationUnit, Identifier, Import};
use crate::visitor::type_visitor::reachable_class_names;
use crate::visitor::{TraversalContext, TreeVisitor, VisitResult};

/// Drops imports whose type is no longer referenced anywhere in the file.
/// A usage anywhere counts: plain references, generic type arguments,
/// annotation arguments. Unresolvable names retain their imports, and
/// static imports are always kept, erring on the side of compiling code.
pub struct RemoveUnusedImports;

impl Recipe for RemoveUnusedImports {
    fn name(&self) -> &'static str {
        "Remove unused imports"
    }

    fn metadata(&self) -> RecipeMetadata {
        RecipeMetadata {
            id: "remove-unused-imports",
            category: "imports",
        }
    }

    fn description(&self) -> &'static str {
        "Remove imports with no remaining usage"
    }

    fn visitor(&self) -> Box<dyn TreeVisitor + Send> {
        Box::new(RemoveUnusedImportsVisitor)
    }
}

/// Collects the evidence of type usage: resolved fully qualified names
/// (with everything reachable through generics) and unresolved simple
/// names.
#[derive(Default)]
struct UsageCollector {
    used_fqns: FxHashSet<String>,
    unresolved: FxHashSet<String>,
}

impl TreeVisitor for UsageCollector {
    /// Import declarations are what is being judged, not usage evidence.
    fn visit_import(&mut self, import: Import, _ctx: &mut TraversalContext) -> VisitResult<Import> {
        Ok(import)
    }

    fn visit_identifier(
        &mut self,
        node: Arc<Identifier>,
        ctx: &mut TraversalContext,
    ) -> VisitResult<Arc<Identifier>> {
        match node.type_ref {
            Some(ty) => {
                let full = ctx.arena().full_name(ty);
                // Only a direct type-name use counts as evidence for an
                // import; a variable reference does not.
                let is_type_use = node.variable.is_none()
                    && (full == node.simple_name.as_str()
                        || full.ends_with(&format!(".{}", node.simple_name)));
                if is_type_use {
                    self.used_fqns
                        .extend(reachable_class_names(ty, ctx.arena()));
                }
            }
            None => {
                if node.variable.is_none() {
                    self.unresolved.insert(node.simple_name.to_string());
                }
            }
        }
        Ok(node)
    }
}

struct RemoveUnusedImportsVisitor;

impl TreeVisitor for RemoveUnusedImportsVisitor {
    fn visit_compilation_unit(
        &mut self,
        mut cu: CompilationUnit,
        ctx: &mut TraversalContext,
    ) -> VisitResult<CompilationUnit> {
        let mut collector = UsageCollector::default();
        let mut sample_ctx = TraversalContext::new(ctx.arena_handle());
        let _ = collector.visit_compilation_unit(cu.clone(), &mut sample_ctx)?;

        let keep = |import: &Import| -> bool {
            if import.statik.is_some() {
                return true;
            }
            if import.is_star() {
                let package = import.package_name();
                return collector.used_fqns.iter().any(|fqn| {
                    fqn.rsplit_once('.')
                        .is_some_and(|(fqn_package, _)| fqn_package == package)
                }) || !collector.unresolved.is_empty();
            }
            let qualified = import.qualified_name();
            collector.used_fqns.contains(&qualified)
                || collector
                    .unresolved
                    .contains(import.simple_name().as_str())
        };

        let mut removed_first_prefix = None;
        let mut kept = Vec::with_capacity(cu.imports.len());
        for (index, padded) in cu.imports.drain(..).enumerate() {
            if keep(&padded.element) {
                kept.push(padded);
            } else if index == 0 {
                removed_first_prefix = Some(padded.element.prefix.clone());
            }
        }
        // The new first import takes over the removed one's leading
        // trivia when that one carried the start-of-list position.
        if let Some(prefix) = removed_first_prefix {
            if let Some(first) = kept.first_mut() {
                if !prefix.has_newline() {
                    let mut import = first.element.clone();
                    import.prefix = prefix;
                    first.element = import;
                }
            }
        }
        cu.imports = kept;
        Ok(cu)
    }
}
