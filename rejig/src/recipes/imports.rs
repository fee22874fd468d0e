//! Import management visitors: the collaborators other recipes defer to
//! when a transformation makes an import necessary or obsolete.

use std::sync::Arc;

use crate::tree::{
    CompilationUnit, Expression, FieldAccess, Identifier, Import, LeftPadded, NodeId, RightPadded,
    Space,
};
use crate::visitor::{TraversalContext, TreeVisitor, VisitResult};

/// Builds a dotted name tree (`java.util.List`) with a leading space on
/// its first identifier, as it appears after the `import` keyword.
#[must_use]
pub fn name_tree(fqn: &str) -> Expression {
    let mut parts = fqn.split('.');
    let first = parts.next().unwrap_or_default();
    let mut ident = Identifier::build(first);
    ident.prefix = Space::single_space();
    let mut expr = Expression::Identifier(Arc::new(ident));
    for part in parts {
        let (prefix, target) = {
            let prefix = expr.prefix().clone();
            (prefix, expr.with_prefix(Space::EMPTY))
        };
        expr = Expression::FieldAccess(Arc::new(FieldAccess {
            id: NodeId::new_v4(),
            prefix,
            markers: crate::tree::Markers::EMPTY,
            target,
            name: LeftPadded::new(Identifier::build(part)),
            type_ref: None,
        }));
    }
    expr
}

/// True when the unit already imports the fully qualified name, exactly
/// or through a star import of its package.
#[must_use]
pub fn is_imported(cu: &CompilationUnit, fqn: &str) -> bool {
    cu.imports.iter().any(|padded| {
        let import = &padded.element;
        if import.statik.is_some() {
            return false;
        }
        if import.is_star() {
            fqn.rsplit_once('.')
                .is_some_and(|(package, _)| import.package_name() == package)
        } else {
            import.qualified_name() == fqn
        }
    })
}

/// Appends an import for one type, unless it is already covered. Where
/// the import lands within the list is left to the ordering recipe.
pub struct AddImportVisitor {
    fqn: String,
}

impl AddImportVisitor {
    /// Creates the visitor for one fully qualified name.
    #[must_use]
    pub fn new(fqn: impl Into<String>) -> Self {
        Self { fqn: fqn.into() }
    }
}

impl TreeVisitor for AddImportVisitor {
    fn visit_compilation_unit(
        &mut self,
        mut cu: CompilationUnit,
        _ctx: &mut TraversalContext,
    ) -> VisitResult<CompilationUnit> {
        if self.fqn.is_empty() || is_imported(&cu, &self.fqn) {
            return Ok(cu);
        }
        // java.lang needs no import.
        if self
            .fqn
            .strip_prefix("java.lang.")
            .is_some_and(|rest| !rest.contains('.'))
        {
            return Ok(cu);
        }

        let prefix = if cu.imports.is_empty() && cu.package.is_none() {
            // The import becomes the first construct; push the previous
            // first construct down a line instead.
            if let Some(first_class) = cu.classes.first() {
                if !first_class.prefix.has_newline() {
                    let mut moved = (**first_class).clone();
                    let mut prefix = std::mem::take(&mut moved.prefix);
                    prefix.whitespace = format!("\n\n{}", prefix.whitespace);
                    moved.prefix = prefix;
                    cu.classes[0] = Arc::new(moved);
                }
            }
            Space::EMPTY
        } else if cu.imports.is_empty() {
            Space::of("\n\n")
        } else {
            Space::of("\n")
        };

        let import = Import {
            id: NodeId::new_v4(),
            prefix,
            markers: crate::tree::Markers::EMPTY,
            statik: None,
            qualid: name_tree(&self.fqn),
        };
        cu.imports.push(RightPadded::new(import));
        Ok(cu)
    }
}

/// Removes the import of one type, if present, keeping surrounding
/// spacing intact.
pub struct RemoveImportVisitor {
    fqn: String,
}

impl RemoveImportVisitor {
    /// Creates the visitor for one fully qualified name.
    #[must_use]
    pub fn new(fqn: impl Into<String>) -> Self {
        Self { fqn: fqn.into() }
    }
}

impl TreeVisitor for RemoveImportVisitor {
    fn visit_compilation_unit(
        &mut self,
        mut cu: CompilationUnit,
        _ctx: &mut TraversalContext,
    ) -> VisitResult<CompilationUnit> {
        let Some(index) = cu
            .imports
            .iter()
            .position(|p| p.element.qualified_name() == self.fqn)
        else {
            return Ok(cu);
        };
        let removed = cu.imports.remove(index);
        // Removing the first import must not leave the file starting with
        // a stray blank line.
        if index == 0 {
            if let Some(next) = cu.imports.first_mut() {
                if !removed.element.prefix.has_newline() {
                    let mut import = next.element.clone();
                    import.prefix = removed.element.prefix.clone();
                    next.element = import;
                }
            }
        }
        Ok(cu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_tree_prints_with_leading_space() {
        let tree = name_tree("java.util.List");
        assert_eq!(crate::tree::printer::print_expression(&tree), " java.util.List");
        assert_eq!(tree.qualified_name().as_deref(), Some("java.util.List"));
    }
}
