//! The attributed type graph.
//!
//! Types live in an arena and are addressed by opaque handles, so cyclic
//! shapes (`T extends Comparable<T>`) need no back-references. Syntax nodes
//! hold handles into this graph; the graph itself is built by the
//! attribution step, wrapped in an `Arc`, and from then on shared read-only
//! across files and worker threads. Transformations that need a different
//! type append a new entry instead of mutating a shared one.

pub mod attribution;

use compact_str::CompactString;
use rustc_hash::{FxHashMap, FxHashSet};

/// Handle to a type in a [`TypeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TyId(u32);

/// Handle to a method signature in a [`TypeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodId(u32);

/// Handle to a variable signature in a [`TypeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarId(u32);

/// Primitive type kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// `boolean`
    Boolean,
    /// `char`
    Char,
    /// `int`
    Int,
    /// `long`
    Long,
    /// `double`
    Double,
    /// `void`
    Void,
    /// The `null` literal's type.
    Null,
}

impl PrimitiveKind {
    /// The primitive's source keyword.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Char => "char",
            Self::Int => "int",
            Self::Long => "long",
            Self::Double => "double",
            Self::Void => "void",
            Self::Null => "null",
        }
    }
}

/// The kind of a declared class type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    /// An ordinary class.
    Class,
    /// An interface.
    Interface,
    /// An enum.
    Enum,
    /// An annotation type.
    Annotation,
}

/// A resolved class or interface type.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassTy {
    /// The fully qualified name, e.g. `java.util.List`.
    pub fully_qualified_name: String,
    /// Class, interface, enum, or annotation.
    pub kind: ClassKind,
    /// The superclass, when known.
    pub supertype: Option<TyId>,
    /// Implemented (or extended, for interfaces) interfaces.
    pub interfaces: Vec<TyId>,
}

/// A resolved type.
#[derive(Debug, Clone, PartialEq)]
pub enum Ty {
    /// Attribution could not resolve this type.
    Unknown,
    /// A primitive type.
    Primitive(PrimitiveKind),
    /// A class, interface, enum, or annotation type.
    Class(ClassTy),
    /// A generic type instantiation, e.g. `List<String>`.
    Parameterized {
        /// The raw type.
        base: TyId,
        /// Type arguments in declaration order.
        type_args: Vec<TyId>,
    },
    /// An array type.
    Array {
        /// The element type.
        elem: TyId,
    },
    /// A generic type variable, possibly with self-referential bounds.
    GenericVariable {
        /// The variable's declared name.
        name: CompactString,
        /// Upper bounds; may reference this same entry.
        bounds: Vec<TyId>,
    },
}

/// A resolved method signature.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodSig {
    /// The type declaring the method.
    pub declaring: TyId,
    /// The method name.
    pub name: CompactString,
    /// The return type.
    pub return_ty: TyId,
    /// Parameter types in declaration order.
    pub parameter_types: Vec<TyId>,
    /// True when the final parameter is variadic.
    pub varargs: bool,
    /// True for static methods.
    pub is_static: bool,
    /// Declared thrown types.
    pub thrown: Vec<TyId>,
}

/// A resolved variable (field, parameter, or local) signature.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableSig {
    /// The owning type for fields, `None` for locals and parameters.
    pub owner: Option<TyId>,
    /// The variable name.
    pub name: CompactString,
    /// The declared type.
    pub ty: TyId,
}

/// Arena holding every resolved type, method, and variable for one
/// attribution run. Handles are indices; equality between types is
/// structural on the rendered signature, never on handle identity.
#[derive(Debug, Clone)]
pub struct TypeArena {
    tys: Vec<Ty>,
    methods: Vec<MethodSig>,
    variables: Vec<VariableSig>,
    by_fqn: FxHashMap<String, TyId>,
    unknown: TyId,
}

impl Default for TypeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeArena {
    /// Creates an arena preloaded with primitives and the well-known
    /// `java.lang` / `java.util` types the attribution step leans on.
    #[must_use]
    pub fn new() -> Self {
        let mut arena = Self {
            tys: Vec::with_capacity(64),
            methods: Vec::new(),
            variables: Vec::new(),
            by_fqn: FxHashMap::default(),
            unknown: TyId(0),
        };
        arena.tys.push(Ty::Unknown);
        arena.preload_well_known();
        arena
    }

    fn preload_well_known(&mut self) {
        let object = self.intern_class("java.lang.Object", ClassKind::Class, None, vec![]);
        let iterable =
            self.intern_class("java.lang.Iterable", ClassKind::Interface, Some(object), vec![]);
        let collection = self.intern_class(
            "java.util.Collection",
            ClassKind::Interface,
            Some(object),
            vec![iterable],
        );
        let list = self.intern_class(
            "java.util.List",
            ClassKind::Interface,
            Some(object),
            vec![collection],
        );
        self.intern_class(
            "java.util.ArrayList",
            ClassKind::Class,
            Some(object),
            vec![list],
        );
        let set = self.intern_class(
            "java.util.Set",
            ClassKind::Interface,
            Some(object),
            vec![collection],
        );
        self.intern_class("java.util.HashSet", ClassKind::Class, Some(object), vec![set]);
        let map = self.intern_class("java.util.Map", ClassKind::Interface, Some(object), vec![]);
        self.intern_class("java.util.HashMap", ClassKind::Class, Some(object), vec![map]);
        for name in [
            "java.lang.String",
            "java.lang.Integer",
            "java.lang.Boolean",
            "java.lang.Character",
            "java.lang.Long",
            "java.lang.Double",
            "java.lang.System",
            "java.lang.Comparable",
            "java.io.PrintStream",
        ] {
            self.intern_class(name, ClassKind::Class, Some(object), vec![]);
        }
        let exception =
            self.intern_class("java.lang.Exception", ClassKind::Class, Some(object), vec![]);
        let runtime = self.intern_class(
            "java.lang.RuntimeException",
            ClassKind::Class,
            Some(exception),
            vec![],
        );
        self.intern_class(
            "java.lang.IllegalArgumentException",
            ClassKind::Class,
            Some(runtime),
            vec![],
        );
        for name in [
            "java.lang.Override",
            "java.lang.Deprecated",
            "java.lang.SuppressWarnings",
        ] {
            self.intern_class(name, ClassKind::Annotation, Some(object), vec![]);
        }
    }

    /// The shared handle for an unresolved type.
    #[must_use]
    pub fn unknown(&self) -> TyId {
        self.unknown
    }

    /// Appends a type entry and returns its handle.
    fn push(&mut self, ty: Ty) -> TyId {
        self.tys.push(ty);
        TyId(u32::try_from(self.tys.len() - 1).unwrap_or(0))
    }

    /// Looks up or creates the primitive type entry.
    pub fn primitive(&mut self, kind: PrimitiveKind) -> TyId {
        // Primitives are few; a linear scan keeps them deduplicated.
        for (i, ty) in self.tys.iter().enumerate() {
            if matches!(ty, Ty::Primitive(k) if *k == kind) {
                return TyId(u32::try_from(i).unwrap_or(0));
            }
        }
        self.push(Ty::Primitive(kind))
    }

    /// Looks up or creates a class entry for the given fully qualified
    /// name. An existing entry keeps its hierarchy links; a new entry gets
    /// the supplied ones.
    pub fn intern_class(
        &mut self,
        fqn: &str,
        kind: ClassKind,
        supertype: Option<TyId>,
        interfaces: Vec<TyId>,
    ) -> TyId {
        if let Some(id) = self.by_fqn.get(fqn) {
            return *id;
        }
        let id = self.push(Ty::Class(ClassTy {
            fully_qualified_name: fqn.to_owned(),
            kind,
            supertype,
            interfaces,
        }));
        self.by_fqn.insert(fqn.to_owned(), id);
        id
    }

    /// Finds a class entry by fully qualified name without creating one.
    #[must_use]
    pub fn find_class(&self, fqn: &str) -> Option<TyId> {
        self.by_fqn.get(fqn).copied()
    }

    /// Fills in the hierarchy links of a class entry. Used by attribution
    /// after all declared classes have been interned, since `extends` and
    /// `implements` may reference classes later in the file.
    pub fn set_class_hierarchy(
        &mut self,
        id: TyId,
        supertype: Option<TyId>,
        interfaces: Vec<TyId>,
    ) {
        if let Some(Ty::Class(class)) = self.tys.get_mut(id.0 as usize) {
            class.supertype = supertype;
            class.interfaces = interfaces;
        }
    }

    /// Creates a parameterized type entry.
    pub fn parameterized(&mut self, base: TyId, type_args: Vec<TyId>) -> TyId {
        self.push(Ty::Parameterized { base, type_args })
    }

    /// Creates an array type entry.
    pub fn array(&mut self, elem: TyId) -> TyId {
        self.push(Ty::Array { elem })
    }

    /// Creates a generic type variable entry with no bounds yet; bounds
    /// may reference the returned handle and are attached afterwards.
    pub fn generic(&mut self, name: impl Into<CompactString>) -> TyId {
        self.push(Ty::GenericVariable {
            name: name.into(),
            bounds: Vec::new(),
        })
    }

    /// Attaches bounds to a generic variable created by [`Self::generic`].
    pub fn set_generic_bounds(&mut self, id: TyId, new_bounds: Vec<TyId>) {
        if let Some(Ty::GenericVariable { bounds, .. }) = self.tys.get_mut(id.0 as usize) {
            *bounds = new_bounds;
        }
    }

    /// Registers a method signature.
    pub fn method(&mut self, sig: MethodSig) -> MethodId {
        self.methods.push(sig);
        MethodId(u32::try_from(self.methods.len() - 1).unwrap_or(0))
    }

    /// Registers a variable signature.
    pub fn variable(&mut self, sig: VariableSig) -> VarId {
        self.variables.push(sig);
        VarId(u32::try_from(self.variables.len() - 1).unwrap_or(0))
    }

    /// The type behind a handle.
    #[must_use]
    pub fn ty(&self, id: TyId) -> &Ty {
        &self.tys[id.0 as usize]
    }

    /// The method signature behind a handle.
    #[must_use]
    pub fn method_sig(&self, id: MethodId) -> &MethodSig {
        &self.methods[id.0 as usize]
    }

    /// The variable signature behind a handle.
    #[must_use]
    pub fn variable_sig(&self, id: VarId) -> &VariableSig {
        &self.variables[id.0 as usize]
    }

    /// Number of type entries (used by traversals for visited sets).
    #[must_use]
    pub fn len(&self) -> usize {
        self.tys.len()
    }

    /// True when the arena holds only the unknown sentinel.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tys.len() <= 1
    }

    /// The fully qualified name of a type, erased of generics: the name a
    /// matcher compares against. Arrays render with `[]`, generic
    /// variables with their name, unresolved types as an empty string.
    #[must_use]
    pub fn full_name(&self, id: TyId) -> String {
        match self.ty(id) {
            Ty::Unknown => String::new(),
            Ty::Primitive(kind) => kind.keyword().to_owned(),
            Ty::Class(class) => class.fully_qualified_name.clone(),
            Ty::Parameterized { base, .. } => self.full_name(*base),
            Ty::Array { elem } => format!("{}[]", self.full_name(*elem)),
            Ty::GenericVariable { name, .. } => name.to_string(),
        }
    }

    /// Renders a structural signature including generic arguments. Two
    /// types are equal exactly when their signatures are equal; handle
    /// identity is never the comparison.
    #[must_use]
    pub fn signature(&self, id: TyId) -> String {
        self.signature_guarded(id, &mut FxHashSet::default())
    }

    fn signature_guarded(&self, id: TyId, seen: &mut FxHashSet<TyId>) -> String {
        match self.ty(id) {
            Ty::Unknown => "<unknown>".to_owned(),
            Ty::Primitive(kind) => kind.keyword().to_owned(),
            Ty::Class(class) => class.fully_qualified_name.clone(),
            Ty::Parameterized { base, type_args } => {
                let args: Vec<String> = type_args
                    .iter()
                    .map(|a| self.signature_guarded(*a, seen))
                    .collect();
                format!("{}<{}>", self.signature_guarded(*base, seen), args.join(", "))
            }
            Ty::Array { elem } => format!("{}[]", self.signature_guarded(*elem, seen)),
            Ty::GenericVariable { name, bounds } => {
                // Self-referential bounds terminate at the second visit.
                if !seen.insert(id) || bounds.is_empty() {
                    return name.to_string();
                }
                let rendered: Vec<String> = bounds
                    .iter()
                    .map(|b| self.signature_guarded(*b, seen))
                    .collect();
                format!("{name} extends {}", rendered.join(" & "))
            }
        }
    }

    /// True when the two handles denote structurally equal types.
    #[must_use]
    pub fn same_type(&self, a: TyId, b: TyId) -> bool {
        a == b || self.signature(a) == self.signature(b)
    }

    /// The declared supertype chain and interfaces of a type, transitively
    /// and cycle-safe, starting with the type itself.
    #[must_use]
    pub fn self_and_supertypes(&self, id: TyId) -> Vec<TyId> {
        let mut out = Vec::new();
        let mut seen = FxHashSet::default();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if !seen.insert(next) {
                continue;
            }
            out.push(next);
            if let Ty::Class(class) = self.ty(next) {
                if let Some(parent) = class.supertype {
                    stack.push(parent);
                }
                stack.extend(class.interfaces.iter().copied());
            } else if let Ty::Parameterized { base, .. } = self.ty(next) {
                stack.push(*base);
            }
        }
        out
    }

    /// Renders a method signature for diagnostics and equality checks.
    #[must_use]
    pub fn method_signature(&self, id: MethodId) -> String {
        let sig = self.method_sig(id);
        let params: Vec<String> = sig
            .parameter_types
            .iter()
            .map(|p| self.signature(*p))
            .collect();
        format!(
            "{} {}({})",
            self.full_name(sig.declaring),
            sig.name,
            params.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_known_types_preloaded() {
        let arena = TypeArena::new();
        assert!(arena.find_class("java.util.List").is_some());
        assert!(arena.find_class("java.lang.String").is_some());
        assert!(arena.find_class("com.example.Missing").is_none());
    }

    #[test]
    fn interning_is_idempotent() {
        let mut arena = TypeArena::new();
        let a = arena.intern_class("com.example.A", ClassKind::Class, None, vec![]);
        let b = arena.intern_class("com.example.A", ClassKind::Class, None, vec![]);
        assert_eq!(a, b);
    }

    #[test]
    fn equality_is_structural_not_handle_identity() {
        let mut arena = TypeArena::new();
        let list = arena.find_class("java.util.List").expect("preloaded");
        let string = arena.find_class("java.lang.String").expect("preloaded");
        let a = arena.parameterized(list, vec![string]);
        let b = arena.parameterized(list, vec![string]);
        assert_ne!(a, b);
        assert!(arena.same_type(a, b));
        assert_eq!(arena.signature(a), "java.util.List<java.lang.String>");
    }

    #[test]
    fn self_referential_bound_renders_without_recursing() {
        let mut arena = TypeArena::new();
        let t = arena.generic("T");
        let comparable = arena.find_class("java.lang.Comparable").expect("preloaded");
        let comparable_t = arena.parameterized(comparable, vec![t]);
        arena.set_generic_bounds(t, vec![comparable_t]);
        let sig = arena.signature(t);
        assert_eq!(sig, "T extends java.lang.Comparable<T>");
    }

    #[test]
    fn supertype_chain_reaches_interfaces() {
        let arena = TypeArena::new();
        let array_list = arena.find_class("java.util.ArrayList").expect("preloaded");
        let list = arena.find_class("java.util.List").expect("preloaded");
        let supers = arena.self_and_supertypes(array_list);
        assert!(supers.contains(&list));
    }

    #[test]
    fn array_full_name_has_brackets() {
        let mut arena = TypeArena::new();
        let string = arena.find_class("java.lang.String").expect("preloaded");
        let arr = arena.array(string);
        assert_eq!(arena.full_name(arr), "java.lang.String[]");
    }
}
