//! Auto-format: re-indent structurally modified subtrees to match the
//! prevailing style of the rest of the file.
//!
//! The indentation unit is inferred by sampling the indentation of
//! *unmodified* lines only, so freshly inserted (unindented) code never
//! contaminates the sample. Indent depth is then computed from block
//! nesting, not copied from the snippet that was inserted. Lines at
//! column zero never vote, which also makes the pass a no-op on an
//! already-formatted file.

use std::sync::Arc;

use crate::style::IndentStyle;
use crate::tree::{Annotation, Block, CompilationUnit, MethodDecl, Space, Statement};
use crate::visitor::{
    walk_block, walk_compilation_unit, walk_method_decl, walk_statement, TraversalContext,
    TreeVisitor, VisitResult,
};

/// One indentation sample from an unmodified line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IndentVote {
    Tabs,
    Spaces(usize),
}

fn vote_for(space: &Space) -> Option<IndentVote> {
    if !space.has_newline() {
        return None;
    }
    let indent = space.indent();
    if indent.is_empty() {
        // A zero-indent baseline is never counted.
        return None;
    }
    if indent.chars().all(|c| c == '\t') {
        Some(IndentVote::Tabs)
    } else if indent.chars().all(|c| c == ' ') {
        Some(IndentVote::Spaces(indent.len()))
    } else {
        None
    }
}

fn gcd(a: usize, b: usize) -> usize {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

/// Collects indentation votes from unmodified regions of the tree.
#[derive(Default)]
struct IndentCollector {
    modified_depth: usize,
    tab_votes: usize,
    space_votes: usize,
    space_gcd: usize,
}

impl IndentCollector {
    fn sample(&mut self, space: &Space) {
        if self.modified_depth > 0 {
            return;
        }
        match vote_for(space) {
            Some(IndentVote::Tabs) => self.tab_votes += 1,
            Some(IndentVote::Spaces(width)) => {
                self.space_votes += 1;
                self.space_gcd = gcd(self.space_gcd, width);
            }
            None => {}
        }
    }

    /// Decides the prevailing unit. Ties between tab- and space-indented
    /// lines prefer spaces.
    fn decide(&self, fallback: IndentStyle) -> IndentStyle {
        if self.tab_votes == 0 && self.space_votes == 0 {
            return fallback;
        }
        if self.tab_votes > self.space_votes {
            return IndentStyle {
                use_tabs: true,
                width: fallback.width,
            };
        }
        let width = if self.space_gcd == 0 {
            fallback.width
        } else {
            self.space_gcd
        };
        IndentStyle {
            use_tabs: false,
            width,
        }
    }
}

impl TreeVisitor for IndentCollector {
    fn visit_statement(
        &mut self,
        statement: Statement,
        ctx: &mut TraversalContext,
    ) -> VisitResult<Statement> {
        let entered = statement.markers().is_modified();
        if entered {
            self.modified_depth += 1;
        }
        self.sample(statement.prefix());
        let out = walk_statement(self, statement, ctx)?;
        if entered {
            self.modified_depth -= 1;
        }
        Ok(out)
    }

    fn visit_method_decl(
        &mut self,
        method: Arc<MethodDecl>,
        ctx: &mut TraversalContext,
    ) -> VisitResult<Arc<MethodDecl>> {
        let entered = method.markers.is_modified();
        if entered {
            self.modified_depth += 1;
        }
        let out = walk_method_decl(self, method, ctx)?;
        if entered {
            self.modified_depth -= 1;
        }
        Ok(out)
    }

    fn visit_block(&mut self, block: Block, ctx: &mut TraversalContext) -> VisitResult<Block> {
        self.sample(&block.end);
        walk_block(self, block, ctx)
    }
}

/// The auto-format visitor. Runs indentation inference over the whole
/// tree, then rewrites the leading whitespace of every line inside
/// modified subtrees to `unit x block-nesting-depth`. Modified markers
/// are consumed, so running the pass twice is a no-op.
pub struct AutoFormatVisitor {
    fallback: IndentStyle,
    unit: IndentStyle,
    modified_depth: usize,
}

impl AutoFormatVisitor {
    /// Creates the visitor with a fallback style for files that yield no
    /// inference sample.
    #[must_use]
    pub fn new(fallback: IndentStyle) -> Self {
        Self {
            fallback,
            unit: fallback,
            modified_depth: 0,
        }
    }

    fn reindent(&self, space: &Space, depth: usize) -> Space {
        space.with_indent(&self.unit.indent_for(depth))
    }

    fn in_modified_scope(&self) -> bool {
        self.modified_depth > 0
    }
}

impl TreeVisitor for AutoFormatVisitor {
    fn visit_compilation_unit(
        &mut self,
        cu: CompilationUnit,
        ctx: &mut TraversalContext,
    ) -> VisitResult<CompilationUnit> {
        let mut collector = IndentCollector::default();
        let mut sample_ctx = TraversalContext::new(ctx.arena_handle());
        let cu = collector.visit_compilation_unit(cu, &mut sample_ctx)?;
        self.unit = collector.decide(self.fallback);
        walk_compilation_unit(self, cu, ctx)
    }

    fn visit_statement(
        &mut self,
        statement: Statement,
        ctx: &mut TraversalContext,
    ) -> VisitResult<Statement> {
        let entered = statement.markers().is_modified();
        if entered {
            self.modified_depth += 1;
        }
        let statement = if self.in_modified_scope() {
            let depth = ctx.cursor.block_depth();
            let prefix = self.reindent(statement.prefix(), depth);
            statement.with_prefix(prefix)
        } else {
            statement
        };
        let mut out = walk_statement(self, statement, ctx)?;
        if entered {
            self.modified_depth -= 1;
            // Consume the marker: the subtree is now formatted.
            let markers = out.markers().without("modified");
            out = out.with_markers(markers);
        }
        Ok(out)
    }

    fn visit_method_decl(
        &mut self,
        method: Arc<MethodDecl>,
        ctx: &mut TraversalContext,
    ) -> VisitResult<Arc<MethodDecl>> {
        let entered = method.markers.is_modified();
        if entered {
            self.modified_depth += 1;
        }
        let method = if self.in_modified_scope() {
            let depth = ctx.cursor.block_depth();
            let mut new = (*method).clone();
            for annotation in &mut new.leading_annotations {
                annotation.prefix = self.reindent(&annotation.prefix, depth);
            }
            for modifier in &mut new.modifiers {
                modifier.prefix = self.reindent(&modifier.prefix, depth);
            }
            if let Some(return_type) = new.return_type.take() {
                let prefix = self.reindent(return_type.prefix(), depth);
                new.return_type = Some(return_type.with_prefix(prefix));
            }
            new.name.prefix = self.reindent(&new.name.prefix, depth);
            Arc::new(new)
        } else {
            method
        };
        let mut out = walk_method_decl(self, method, ctx)?;
        if entered {
            self.modified_depth -= 1;
            if out.markers.is_modified() {
                out = Arc::new(MethodDecl {
                    markers: out.markers.without("modified"),
                    ..(*out).clone()
                });
            }
        }
        Ok(out)
    }

    fn visit_annotation(
        &mut self,
        annotation: Annotation,
        ctx: &mut TraversalContext,
    ) -> VisitResult<Annotation> {
        let annotation = if self.in_modified_scope() {
            let depth = ctx.cursor.block_depth();
            Annotation {
                prefix: self.reindent(&annotation.prefix, depth),
                ..annotation
            }
        } else {
            annotation
        };
        crate::visitor::walk_annotation(self, annotation, ctx)
    }

    fn visit_block(&mut self, block: Block, ctx: &mut TraversalContext) -> VisitResult<Block> {
        let block = walk_block(self, block, ctx)?;
        if self.in_modified_scope() {
            // The closing brace aligns with the block's opener.
            let depth = ctx.cursor.block_depth();
            let end = self.reindent(&block.end, depth);
            Ok(Block { end, ..block })
        } else {
            Ok(block)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_indent_never_votes() {
        assert_eq!(vote_for(&Space::of("\n")), None);
        assert_eq!(vote_for(&Space::of("\n    ")), Some(IndentVote::Spaces(4)));
        assert_eq!(vote_for(&Space::of("\n\t")), Some(IndentVote::Tabs));
        // Inline spacing is not a line start at all.
        assert_eq!(vote_for(&Space::of("  ")), None);
    }

    #[test]
    fn tie_prefers_spaces() {
        let mut collector = IndentCollector::default();
        collector.sample(&Space::of("\n\t"));
        collector.sample(&Space::of("\n  "));
        let decided = collector.decide(IndentStyle::default());
        assert!(!decided.use_tabs);
        assert_eq!(decided.width, 2);
    }

    #[test]
    fn width_is_gcd_of_samples() {
        let mut collector = IndentCollector::default();
        collector.sample(&Space::of("\n    "));
        collector.sample(&Space::of("\n        "));
        let decided = collector.decide(IndentStyle::default());
        assert_eq!(decided.width, 4);
    }

    #[test]
    fn no_votes_falls_back_to_style() {
        let collector = IndentCollector::default();
        let fallback = IndentStyle {
            use_tabs: true,
            width: 4,
        };
        assert_eq!(collector.decide(fallback), fallback);
    }
}
