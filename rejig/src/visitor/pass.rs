//! Pass execution: run a visitor over a tree, then drain the deferred
//! visitor queue in scheduling order.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use crate::matcher::PatternError;
use crate::semantic::TypeArena;
use crate::template::TemplateError;
use crate::tree::CompilationUnit;
use crate::visitor::{TraversalContext, TreeVisitor};

/// A parsed and attributed source file: the tree plus its type graph.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// The lossless tree.
    pub cu: CompilationUnit,
    /// The attributed type graph, shared read-only.
    pub arena: Arc<TypeArena>,
}

/// A hard failure that aborts the current pass. Local conditions like a
/// non-matching candidate are ordinary returns, never errors; these are
/// the truly exceptional cases.
#[derive(Debug)]
pub enum PassError {
    /// A pattern failed to compile. Raised at matcher construction and
    /// carried through when construction happens inside a pass.
    Pattern(PatternError),
    /// A template snippet failed to parse or attribute in context.
    Template(TemplateError),
    /// A structural precondition was violated: the tree is corrupt. This
    /// is an implementation bug, not a user-facing recoverable error.
    Corrupt {
        /// What was expected and what was found.
        detail: String,
    },
}

impl fmt::Display for PassError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pattern(err) => write!(f, "pattern error: {err}"),
            Self::Template(err) => write!(f, "template error: {err}"),
            Self::Corrupt { detail } => write!(f, "corrupt tree: {detail}"),
        }
    }
}

impl std::error::Error for PassError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Pattern(err) => Some(err),
            Self::Template(err) => Some(err),
            Self::Corrupt { .. } => None,
        }
    }
}

impl From<PatternError> for PassError {
    fn from(err: PatternError) -> Self {
        Self::Pattern(err)
    }
}

impl From<TemplateError> for PassError {
    fn from(err: TemplateError) -> Self {
        Self::Template(err)
    }
}

impl PassError {
    /// Builds a corrupt-tree failure. Callers use this when a child that
    /// is structurally guaranteed present turns out to be absent, instead
    /// of silently doing nothing.
    #[must_use]
    pub fn corrupt(detail: impl Into<String>) -> Self {
        Self::Corrupt {
            detail: detail.into(),
        }
    }
}

/// Runs one visitor over the tree, then any visitors it scheduled to run
/// after it, in scheduling order, each seeing the output of the previous.
/// The pass either completes or fails; there is no partial result.
pub fn run(
    cu: CompilationUnit,
    arena: &Arc<TypeArena>,
    visitor: &mut (dyn TreeVisitor + Send),
) -> Result<CompilationUnit, PassError> {
    let mut ctx = TraversalContext::new(Arc::clone(arena));
    let mut cu = visitor.visit_compilation_unit(cu, &mut ctx)?;
    let mut queue: VecDeque<Box<dyn TreeVisitor + Send>> = ctx.take_deferred().into();
    while let Some(mut deferred) = queue.pop_front() {
        let mut deferred_ctx = TraversalContext::new(Arc::clone(arena));
        cu = deferred.visit_compilation_unit(cu, &mut deferred_ctx)?;
        queue.extend(deferred_ctx.take_deferred());
    }
    Ok(cu)
}

/// Runs a sequence of visitors, each (with its deferred followers) over
/// the output of the previous.
pub fn run_recipe_visitors(
    mut cu: CompilationUnit,
    arena: &Arc<TypeArena>,
    visitors: Vec<Box<dyn TreeVisitor + Send>>,
) -> Result<CompilationUnit, PassError> {
    for mut visitor in visitors {
        cu = run(cu, arena, visitor.as_mut())?;
    }
    Ok(cu)
}
