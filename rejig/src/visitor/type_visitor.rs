//! Traversal over the attributed type graph.
//!
//! The graph may be cyclic (`T extends Comparable<T>`), so the walk keeps
//! a visited set and calls the hook exactly once per reachable type.

use rustc_hash::FxHashSet;

use crate::semantic::{Ty, TyId, TypeArena};

/// A visitor over resolved types. The single hook is called once for each
/// type reachable from the roots handed to [`walk_types`].
pub trait TypeVisitor {
    /// Called once per reachable type.
    fn visit_ty(&mut self, id: TyId, arena: &TypeArena);
}

/// Depth-first walk over every type reachable from `root`: parameterized
/// bases and arguments, array elements, generic bounds, supertypes, and
/// interfaces. Cycle-safe.
pub fn walk_types<V: TypeVisitor + ?Sized>(root: TyId, arena: &TypeArena, visitor: &mut V) {
    let mut seen: FxHashSet<TyId> = FxHashSet::default();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        visitor.visit_ty(id, arena);
        match arena.ty(id) {
            Ty::Unknown | Ty::Primitive(_) => {}
            Ty::Class(class) => {
                if let Some(parent) = class.supertype {
                    stack.push(parent);
                }
                stack.extend(class.interfaces.iter().copied());
            }
            Ty::Parameterized { base, type_args } => {
                stack.push(*base);
                stack.extend(type_args.iter().copied());
            }
            Ty::Array { elem } => stack.push(*elem),
            Ty::GenericVariable { bounds, .. } => stack.extend(bounds.iter().copied()),
        }
    }
}

/// Collects the erased fully qualified names of every type reachable from
/// a root. Convenience built on [`walk_types`].
#[must_use]
pub fn reachable_class_names(root: TyId, arena: &TypeArena) -> FxHashSet<String> {
    struct Collector {
        names: FxHashSet<String>,
    }
    impl TypeVisitor for Collector {
        fn visit_ty(&mut self, id: TyId, arena: &TypeArena) {
            if let Ty::Class(class) = arena.ty(id) {
                self.names.insert(class.fully_qualified_name.clone());
            }
        }
    }
    let mut collector = Collector {
        names: FxHashSet::default(),
    };
    walk_types(root, arena, &mut collector);
    collector.names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::TypeArena;

    #[test]
    fn cyclic_bounds_terminate() {
        let mut arena = TypeArena::new();
        let t = arena.generic("T");
        let comparable = arena.find_class("java.lang.Comparable").expect("preloaded");
        let comparable_t = arena.parameterized(comparable, vec![t]);
        arena.set_generic_bounds(t, vec![comparable_t]);

        let names = reachable_class_names(t, &arena);
        assert!(names.contains("java.lang.Comparable"));
    }

    #[test]
    fn parameterized_reaches_arguments() {
        let mut arena = TypeArena::new();
        let list = arena.find_class("java.util.List").expect("preloaded");
        let string = arena.find_class("java.lang.String").expect("preloaded");
        let list_of_string = arena.parameterized(list, vec![string]);

        let names = reachable_class_names(list_of_string, &arena);
        assert!(names.contains("java.util.List"));
        assert!(names.contains("java.lang.String"));
    }
}
