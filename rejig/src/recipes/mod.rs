//! Concrete transformation recipes.
//!
//! A recipe is metadata plus a visitor factory. Pattern compilation
//! happens when the recipe is constructed, so malformed patterns surface
//! immediately instead of inside a match loop.

pub mod add_annotation;
pub mod change_type;
pub mod find_method;
pub mod imports;
pub mod order_imports;
pub mod remove_annotation;
pub mod remove_unused_imports;
pub mod rename_method;

pub use add_annotation::AddAnnotation;
pub use change_type::ChangeType;
pub use find_method::{count_search_results, FindMethodUses};
pub use imports::{AddImportVisitor, RemoveImportVisitor};
pub use order_imports::OrderImports;
pub use remove_annotation::RemoveAnnotation;
pub use remove_unused_imports::RemoveUnusedImports;
pub use rename_method::RenameMethod;

use crate::visitor::TreeVisitor;

/// Metadata associated with a recipe.
#[derive(Debug, Clone, Copy)]
pub struct RecipeMetadata {
    /// Unique id, as written in configuration.
    pub id: &'static str,
    /// Functional category.
    pub category: &'static str,
}

/// Trait defining a transformation recipe.
pub trait Recipe: Send + Sync {
    /// The descriptive name of the recipe.
    fn name(&self) -> &'static str;
    /// The unique id of the recipe.
    fn id(&self) -> &'static str {
        self.metadata().id
    }
    /// The full metadata for the recipe.
    fn metadata(&self) -> RecipeMetadata;
    /// One-line description of what the recipe does.
    fn description(&self) -> &'static str;
    /// Whether re-running on an already-transformed tree leaves it
    /// unchanged. Recipes that are order-sensitive override this.
    fn idempotent(&self) -> bool {
        true
    }
    /// Builds the visitor that performs the transformation. Called once
    /// per file; matchers were already compiled at construction.
    fn visitor(&self) -> Box<dyn TreeVisitor + Send>;
}

/// Descriptions of the built-in recipes, for `rejig list`.
#[must_use]
pub fn builtin_descriptions() -> Vec<(&'static str, &'static str, &'static str)> {
    vec![
        (
            "add-annotation",
            "refactor",
            "Add an annotation to methods matching a method pattern",
        ),
        (
            "remove-annotation",
            "refactor",
            "Remove annotations matching an annotation pattern",
        ),
        (
            "rename-method",
            "refactor",
            "Rename declarations and invocations matching a method pattern",
        ),
        (
            "change-type",
            "refactor",
            "Replace references to one type with another, updating imports",
        ),
        (
            "order-imports",
            "imports",
            "Group and sort imports, folding into star imports past the threshold",
        ),
        (
            "remove-unused-imports",
            "imports",
            "Remove imports with no remaining usage",
        ),
        (
            "find-method",
            "search",
            "Mark invocations matching a method pattern with search results",
        ),
    ]
}
