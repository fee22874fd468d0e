//! Group, sort, and star-fold the import list.

use rustc_hash::FxHashMap;

use super::imports::name_tree;
use super::{Recipe, RecipeMetadata};
use crate::style::ImportLayoutStyle;
use crate::tree::{CompilationUnit, Import, NodeId, RightPadded, Space};
use crate::visitor::{TraversalContext, TreeVisitor, VisitResult};

/// Reorders imports into configured groups, sorts within each group, and
/// folds imports into a star import once enough name the same package.
///
/// Not idempotence-safe relative to concurrent import edits: it rewrites
/// the whole list's spacing, so it runs after any pass that adds or
/// removes imports, never interleaved with one.
pub struct OrderImports {
    style: ImportLayoutStyle,
}

impl OrderImports {
    /// Creates the recipe with the given layout style.
    #[must_use]
    pub fn new(style: ImportLayoutStyle) -> Self {
        Self { style }
    }
}

impl Recipe for OrderImports {
    fn name(&self) -> &'static str {
        "Order imports"
    }

    fn metadata(&self) -> RecipeMetadata {
        RecipeMetadata {
            id: "order-imports",
            category: "imports",
        }
    }

    fn description(&self) -> &'static str {
        "Group and sort imports, folding into star imports past the threshold"
    }

    fn idempotent(&self) -> bool {
        false
    }

    fn visitor(&self) -> Box<dyn TreeVisitor + Send> {
        Box::new(OrderImportsVisitor {
            style: self.style.clone(),
        })
    }
}

struct OrderImportsVisitor {
    style: ImportLayoutStyle,
}

impl OrderImportsVisitor {
    /// The group index of an import: position of the longest matching
    /// configured prefix, or one past the last group when none match.
    fn group_of(&self, import: &Import) -> usize {
        let qualified = import.qualified_name();
        let mut best: Option<(usize, usize)> = None;
        for (index, prefix) in self.style.groups.iter().enumerate() {
            let hit = qualified == *prefix
                || qualified.starts_with(&format!("{prefix}."));
            if hit {
                best = match best {
                    Some((_, len)) if len >= prefix.len() => best,
                    _ => Some((index, prefix.len())),
                };
            }
        }
        best.map_or(self.style.groups.len(), |(index, _)| index)
    }

    /// Folds explicit imports into a star import when at least the
    /// threshold count name the same package. Static imports never fold.
    fn fold_stars(&self, imports: Vec<Import>) -> Vec<Import> {
        let mut package_counts: FxHashMap<String, usize> = FxHashMap::default();
        for import in &imports {
            if import.statik.is_none() && !import.is_star() {
                *package_counts.entry(import.package_name()).or_insert(0) += 1;
            }
        }
        let folded: Vec<String> = package_counts
            .into_iter()
            .filter(|(package, count)| {
                !package.is_empty() && *count >= self.style.star_import_threshold
            })
            .map(|(package, _)| package)
            .collect();
        if folded.is_empty() {
            return imports;
        }

        let mut out = Vec::with_capacity(imports.len());
        let mut emitted: Vec<String> = Vec::new();
        for import in imports {
            let package = import.package_name();
            if import.statik.is_none() && !import.is_star() && folded.contains(&package) {
                if !emitted.contains(&package) {
                    emitted.push(package.clone());
                    out.push(Import {
                        id: NodeId::new_v4(),
                        prefix: Space::EMPTY,
                        markers: crate::tree::Markers::EMPTY,
                        statik: None,
                        qualid: name_tree(&format!("{package}.*")),
                    });
                }
            } else {
                out.push(import);
            }
        }
        out
    }
}

impl TreeVisitor for OrderImportsVisitor {
    fn visit_compilation_unit(
        &mut self,
        mut cu: CompilationUnit,
        _ctx: &mut TraversalContext,
    ) -> VisitResult<CompilationUnit> {
        if cu.imports.len() < 2 {
            return Ok(cu);
        }
        let first_prefix = cu.imports[0].element.prefix.clone();

        let imports: Vec<Import> = cu.imports.drain(..).map(|p| p.element).collect();
        let mut imports = self.fold_stars(imports);
        imports.sort_by(|a, b| {
            // Static imports sort after type imports within a group.
            self.group_of(a)
                .cmp(&self.group_of(b))
                .then_with(|| a.statik.is_some().cmp(&b.statik.is_some()))
                .then_with(|| a.qualified_name().cmp(&b.qualified_name()))
        });

        let mut rebuilt = Vec::with_capacity(imports.len());
        let mut previous_group = None;
        for (index, import) in imports.into_iter().enumerate() {
            let group = self.group_of(&import);
            let prefix = if index == 0 {
                first_prefix.clone()
            } else if previous_group.is_some_and(|g| g != group) {
                // A blank line separates groups.
                Space::of("\n\n")
            } else {
                Space::of("\n")
            };
            previous_group = Some(group);
            rebuilt.push(RightPadded::new(Import { prefix, ..import }));
        }
        cu.imports = rebuilt;
        Ok(cu)
    }
}
