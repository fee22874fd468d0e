//! The traversal cursor: the live path from the tree root to the node
//! being visited, plus a typed per-traversal message map.

use std::any::Any;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::tree::{ClassDecl, CompilationUnit, MethodDecl, NodeId};

/// A lightweight record of an import, kept on the cursor so visitors and
/// the template engine can resolve names without holding the whole tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRecord {
    /// The dotted imported name (`java.util.List` or `java.util.*`).
    pub qualified: String,
    /// True for static imports.
    pub is_static: bool,
    /// True for star imports.
    pub is_star: bool,
}

/// Summary of the enclosing compilation unit pushed at the root of every
/// traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitInfo {
    /// Root node identity.
    pub id: NodeId,
    /// The declared package, when present.
    pub package: Option<String>,
    /// Imports in source order.
    pub imports: Vec<ImportRecord>,
}

impl UnitInfo {
    /// Builds the record from a compilation unit.
    #[must_use]
    pub fn of(cu: &CompilationUnit) -> Self {
        Self {
            id: cu.id,
            package: cu.package.as_ref().map(|p| p.element.name()),
            imports: cu
                .imports
                .iter()
                .map(|i| ImportRecord {
                    qualified: i.element.qualified_name(),
                    is_static: i.element.statik.is_some(),
                    is_star: i.element.is_star(),
                })
                .collect(),
        }
    }
}

/// The syntactic kind of a plain cursor entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A block scope: each one adds an indentation level.
    Block,
    /// Any statement.
    Statement,
    /// Any expression.
    Expression,
    /// Anything else (annotations, imports, variables).
    Other,
}

/// One entry on the cursor path. Scope-bearing nodes carry cheap `Arc`
/// clones so descendants can inspect them; everything else carries just
/// identity and kind.
#[derive(Debug, Clone)]
pub enum CursorValue {
    /// The compilation-unit summary.
    Unit(UnitInfo),
    /// An enclosing class declaration.
    Class(Arc<ClassDecl>),
    /// An enclosing method declaration.
    Method(Arc<MethodDecl>),
    /// Any other node on the path.
    Node {
        /// The node's stable identity.
        id: NodeId,
        /// Its coarse syntactic kind.
        kind: NodeKind,
    },
}

impl CursorValue {
    /// The stable identity of the node this entry stands for.
    #[must_use]
    pub fn id(&self) -> NodeId {
        match self {
            Self::Unit(info) => info.id,
            Self::Class(class) => class.id,
            Self::Method(method) => method.id,
            Self::Node { id, .. } => *id,
        }
    }
}

/// The live ancestor path during a single traversal, with a typed,
/// per-traversal key/value message channel between ancestor and
/// descendant visits. Created fresh per traversal and never persisted.
#[derive(Default)]
pub struct Cursor {
    path: SmallVec<[CursorValue; 16]>,
    messages: FxHashMap<&'static str, Box<dyn Any + Send>>,
}

impl Cursor {
    /// Creates an empty cursor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes an entry on descent. Called by the traversal walks.
    pub fn push(&mut self, value: CursorValue) {
        self.path.push(value);
    }

    /// Pops the innermost entry on return. Called by the traversal walks.
    pub fn pop(&mut self) {
        self.path.pop();
    }

    /// Depth of the path (number of enclosing entries).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Iterates the path from innermost to outermost entry.
    pub fn ancestors(&self) -> impl Iterator<Item = &CursorValue> {
        self.path.iter().rev()
    }

    /// The compilation-unit summary pushed at the traversal root.
    #[must_use]
    pub fn unit(&self) -> Option<&UnitInfo> {
        self.path.iter().find_map(|v| match v {
            CursorValue::Unit(info) => Some(info),
            _ => None,
        })
    }

    /// The nearest enclosing class declaration.
    #[must_use]
    pub fn enclosing_class(&self) -> Option<&Arc<ClassDecl>> {
        self.ancestors().find_map(|v| match v {
            CursorValue::Class(class) => Some(class),
            _ => None,
        })
    }

    /// The nearest enclosing method declaration.
    #[must_use]
    pub fn enclosing_method(&self) -> Option<&Arc<MethodDecl>> {
        self.ancestors().find_map(|v| match v {
            CursorValue::Method(method) => Some(method),
            _ => None,
        })
    }

    /// Number of enclosing block scopes: the indentation depth of the
    /// position being visited.
    #[must_use]
    pub fn block_depth(&self) -> usize {
        self.path
            .iter()
            .filter(|v| matches!(v, CursorValue::Node { kind: NodeKind::Block, .. }))
            .count()
    }

    /// Identity-based containment: true when the node with the given id is
    /// on the current path, i.e. the visited position is the node itself
    /// or one of its descendants. Distinct from structural equality.
    #[must_use]
    pub fn is_scope(&self, id: NodeId) -> bool {
        self.path.iter().any(|v| v.id() == id)
    }

    /// Leaves a typed message for a visit elsewhere on this traversal.
    /// A message under the same key is replaced.
    pub fn put_message<T: Any + Send>(&mut self, key: &'static str, value: T) {
        self.messages.insert(key, Box::new(value));
    }

    /// Takes a message, removing it from the channel. Returns `None` when
    /// the key is absent or holds a different type.
    pub fn poll_message<T: Any>(&mut self, key: &'static str) -> Option<T> {
        let boxed = self.messages.remove(key)?;
        match boxed.downcast::<T>() {
            Ok(value) => Some(*value),
            Err(other) => {
                // Wrong type requested: put the message back untouched.
                self.messages.insert(key, other);
                None
            }
        }
    }

    /// Reads a message without removing it.
    #[must_use]
    pub fn peek_message<T: Any>(&self, key: &'static str) -> Option<&T> {
        self.messages.get(key).and_then(|b| b.downcast_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_typed() {
        let mut cursor = Cursor::new();
        cursor.put_message("count", 3_usize);
        assert_eq!(cursor.peek_message::<usize>("count"), Some(&3));
        // Asking for the wrong type neither yields nor destroys it.
        assert_eq!(cursor.poll_message::<String>("count"), None);
        assert_eq!(cursor.poll_message::<usize>("count"), Some(3));
        assert_eq!(cursor.poll_message::<usize>("count"), None);
    }

    #[test]
    fn block_depth_counts_only_blocks() {
        let mut cursor = Cursor::new();
        let block = |id| CursorValue::Node {
            id,
            kind: NodeKind::Block,
        };
        cursor.push(block(NodeId::new_v4()));
        cursor.push(CursorValue::Node {
            id: NodeId::new_v4(),
            kind: NodeKind::Statement,
        });
        cursor.push(block(NodeId::new_v4()));
        assert_eq!(cursor.block_depth(), 2);
    }

    #[test]
    fn is_scope_matches_path_ids() {
        let mut cursor = Cursor::new();
        let id = NodeId::new_v4();
        cursor.push(CursorValue::Node {
            id,
            kind: NodeKind::Statement,
        });
        assert!(cursor.is_scope(id));
        cursor.pop();
        assert!(!cursor.is_scope(id));
    }
}
