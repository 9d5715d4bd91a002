//! C++ type representation.
//!
//! A `Type` is the spelling of a type at one use site (a parameter, a result,
//! a field). It never owns the declaration it names: `target` is a lookup key
//! into the [`DeclGraph`](crate::DeclGraph) filled in by the resolution pass.

use crate::decl::DeclId;
use sharpbind_common::{clean_segment, join_scope, make_id, split_scope};
use smol_str::SmolStr;

/// Outermost type constructor of a spelled type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    /// A class, struct, enum or typedef name.
    Named,
    /// One of the fundamental types (`int`, `long unsigned int`, `void`, ...).
    Fundamental,
    /// `T[N]`; bounds as spelled by the parser.
    Array {
        min: Option<SmolStr>,
        max: Option<SmolStr>,
    },
    /// `T&`
    Reference,
    /// `T*`
    Pointer,
    /// Pointer to function: `R (*)(Args...)`.
    Function { result: Box<Type>, params: Vec<Type> },
    /// Pointer to member function: `R (C::*)(Args...)`.
    Method {
        result: Box<Type>,
        params: Vec<Type>,
        class: Vec<SmolStr>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Type {
    pub kind: TypeKind,
    /// Qualified name path of the underlying type. Empty for function types.
    pub name: Vec<SmolStr>,
    pub is_const: bool,
    pub is_volatile: bool,
    pub is_restricted: bool,
    /// Declarator suffix: `&`, `*`, `*&`, `**`, or empty.
    pub suffix: SmolStr,
    /// Default argument, only meaningful for parameters.
    pub default: Option<SmolStr>,
    /// Whether the underlying named type is a fundamental type.
    pub fundamental: bool,
    /// Whether crossing the boundary by value needs a conversion.
    pub must_marshal: bool,
    /// Resolved declaration of the underlying type.
    pub target: Option<DeclId>,
}

impl Type {
    fn base(kind: TypeKind, name: Vec<SmolStr>, fundamental: bool, must_marshal: bool) -> Self {
        Self {
            kind,
            name,
            is_const: false,
            is_volatile: false,
            is_restricted: false,
            suffix: SmolStr::default(),
            default: None,
            fundamental,
            must_marshal,
            target: None,
        }
    }

    /// A fundamental type such as `int` or `long long unsigned int`.
    pub fn fundamental(name: &str) -> Self {
        let spelling = name.split_whitespace().collect::<Vec<_>>().join(" ");
        Self::base(TypeKind::Fundamental, vec![SmolStr::new(spelling)], true, false)
    }

    /// A class, enum or typedef name, e.g. `ns::Point` or `std::basic_string<char>`.
    pub fn named(qualified: &str) -> Self {
        Self::base(TypeKind::Named, split_scope(qualified), false, true)
    }

    /// `inner&`. Constness and the resolved target are carried over.
    pub fn reference_to(inner: Type) -> Self {
        Self::wrap(inner, TypeKind::Reference, "&")
    }

    /// `inner*`. Function types are already spelled as pointers and are
    /// returned unchanged.
    pub fn pointer_to(inner: Type) -> Self {
        if inner.is_function() {
            return inner;
        }
        Self::wrap(inner, TypeKind::Pointer, "*")
    }

    pub fn array_of(inner: Type, min: Option<&str>, max: Option<&str>) -> Self {
        let mut ty = Self::wrap(
            inner,
            TypeKind::Array {
                min: min.map(SmolStr::new),
                max: max.map(SmolStr::new),
            },
            "",
        );
        ty.must_marshal = true;
        ty
    }

    fn wrap(inner: Type, kind: TypeKind, suffix: &str) -> Self {
        let mut full_suffix = inner.suffix.to_string();
        full_suffix.push_str(suffix);
        Self {
            kind,
            name: inner.name,
            is_const: inner.is_const,
            is_volatile: inner.is_volatile,
            is_restricted: inner.is_restricted,
            suffix: SmolStr::new(full_suffix),
            default: None,
            fundamental: inner.fundamental,
            must_marshal: false,
            target: inner.target,
        }
    }

    pub fn function(result: Type, params: Vec<Type>) -> Self {
        Self::base(
            TypeKind::Function {
                result: Box::new(result),
                params,
            },
            Vec::new(),
            false,
            false,
        )
    }

    pub fn method_pointer(result: Type, params: Vec<Type>, class: &str) -> Self {
        Self::base(
            TypeKind::Method {
                result: Box::new(result),
                params,
                class: split_scope(class),
            },
            Vec::new(),
            false,
            false,
        )
    }

    pub fn with_const(mut self) -> Self {
        self.is_const = true;
        self
    }

    pub fn with_default(mut self, default: impl Into<SmolStr>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn is_function(&self) -> bool {
        matches!(self.kind, TypeKind::Function { .. } | TypeKind::Method { .. })
    }

    pub fn is_reference(&self) -> bool {
        self.suffix.ends_with('&')
    }

    pub fn is_pointer(&self) -> bool {
        self.suffix.ends_with('*')
    }

    /// Both pointers and references count as indirections.
    pub fn is_indirect(&self) -> bool {
        self.is_reference() || self.is_pointer()
    }

    pub fn is_void(&self) -> bool {
        self.fundamental && self.suffix.is_empty() && self.name.len() == 1 && self.name[0] == "void"
    }

    /// Qualified name of the underlying type, without qualifiers or suffix.
    pub fn qualified_name(&self) -> String {
        join_scope(&self.name)
    }

    /// The language-neutral name path (`getFullNameAbstract` of the type).
    pub fn abstract_name(&self) -> &[SmolStr] {
        &self.name
    }

    /// Complete C++ spelling, e.g. `const std::basic_string<char>&`.
    pub fn full_name(&self) -> String {
        match &self.kind {
            TypeKind::Function { result, params } => {
                format!("{} (*)({})", result.full_name(), join_types(params))
            }
            TypeKind::Method {
                result,
                params,
                class,
            } => format!(
                "{} ({}::*)({})",
                result.full_name(),
                join_scope(class),
                join_types(params)
            ),
            _ => {
                let mut out = String::new();
                if self.is_const {
                    out.push_str("const ");
                }
                out.push_str(&self.qualified_name());
                out.push_str(&self.suffix);
                out
            }
        }
    }

    /// The spelling with the name path only, no qualifiers.
    pub fn no_ns_name(&self) -> String {
        match self.name.last() {
            Some(last) => last.to_string(),
            None => self.full_name(),
        }
    }

    /// Identifier form of the name path: `std_basic_string_char_`.
    pub fn clean_name(&self) -> String {
        if self.name.is_empty() {
            return make_id(&self.full_name());
        }
        self.name
            .iter()
            .map(|segment| clean_segment(segment))
            .collect::<Vec<_>>()
            .join("_")
    }

    /// Identifier used when building overload-safe function ids. Includes
    /// constness and the suffix so `f(int)`, `f(int&)` and `f(const int&)`
    /// all differ.
    pub fn id_fragment(&self) -> String {
        let mut out = String::new();
        if self.is_const {
            out.push_str("const_");
        }
        out.push_str(&self.clean_name());
        for ch in self.suffix.chars() {
            match ch {
                '&' => out.push_str("_ref"),
                '*' => out.push_str("_ptr"),
                _ => {}
            }
        }
        if matches!(self.kind, TypeKind::Array { .. }) {
            out.push_str("_array");
        }
        out
    }

    /// Same type passed by value: reference suffix and constness removed.
    pub fn by_value(&self) -> Type {
        let mut ty = self.clone();
        let trimmed = ty.suffix.trim_end_matches('&').to_string();
        ty.suffix = SmolStr::new(trimmed);
        if ty.kind == TypeKind::Reference {
            if ty.suffix.is_empty() {
                ty.is_const = false;
                ty.kind = if ty.fundamental {
                    TypeKind::Fundamental
                } else {
                    TypeKind::Named
                };
                ty.must_marshal = !ty.fundamental;
            } else {
                ty.kind = TypeKind::Pointer;
            }
        }
        ty
    }

    /// Visit every nested type mutably, including this one.
    pub fn walk_mut(&mut self, f: &mut dyn FnMut(&mut Type)) {
        f(self);
        match &mut self.kind {
            TypeKind::Function { result, params } | TypeKind::Method { result, params, .. } => {
                result.walk_mut(f);
                for param in params {
                    param.walk_mut(f);
                }
            }
            _ => {}
        }
    }
}

fn join_types(types: &[Type]) -> String {
    types
        .iter()
        .map(Type::full_name)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name_of_const_reference() {
        let ty = Type::reference_to(Type::named("std::basic_string<char>").with_const());
        assert_eq!(ty.full_name(), "const std::basic_string<char>&");
        assert_eq!(ty.kind, TypeKind::Reference);
        assert!(ty.is_reference());
        assert!(!ty.must_marshal);
    }

    #[test]
    fn test_pointer_to_reference_suffix() {
        let ty = Type::reference_to(Type::pointer_to(Type::fundamental("char")));
        assert_eq!(ty.full_name(), "char*&");
        assert!(ty.fundamental);
        assert!(ty.is_reference());
    }

    #[test]
    fn test_fundamental_spelling_is_normalized() {
        let ty = Type::fundamental("long   long unsigned  int");
        assert_eq!(ty.full_name(), "long long unsigned int");
        assert!(!ty.must_marshal);
    }

    #[test]
    fn test_function_pointer_spelling() {
        let ty = Type::function(
            Type::fundamental("void"),
            vec![Type::fundamental("int"), Type::pointer_to(Type::named("ns::Foo"))],
        );
        assert_eq!(ty.full_name(), "void (*)(int, ns::Foo*)");
        assert_eq!(Type::pointer_to(ty.clone()), ty);

        let method = Type::method_pointer(Type::fundamental("int"), vec![], "ns::Foo");
        assert_eq!(method.full_name(), "int (ns::Foo::*)()");
    }

    #[test]
    fn test_id_fragment_distinguishes_qualifiers() {
        let plain = Type::fundamental("int");
        let reference = Type::reference_to(Type::fundamental("int"));
        let const_ref = Type::reference_to(Type::fundamental("int").with_const());
        assert_eq!(plain.id_fragment(), "int");
        assert_eq!(reference.id_fragment(), "int_ref");
        assert_eq!(const_ref.id_fragment(), "const_int_ref");
    }

    #[test]
    fn test_clean_name_is_identifier_safe() {
        let ty = Type::named("std::map<int, ns::Foo>");
        let clean = ty.clean_name();
        assert!(clean.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
        assert_eq!(clean, "std_map_int__ns__Foo_");
    }

    #[test]
    fn test_by_value_strips_reference() {
        let ty = Type::reference_to(Type::named("ns::Foo").with_const());
        let value = ty.by_value();
        assert_eq!(value.full_name(), "ns::Foo");
        assert_eq!(value.kind, TypeKind::Named);
        assert!(value.must_marshal);

        let ptr_ref = Type::reference_to(Type::pointer_to(Type::named("ns::Foo")));
        assert_eq!(ptr_ref.by_value().full_name(), "ns::Foo*");
    }

    #[test]
    fn test_void() {
        assert!(Type::fundamental("void").is_void());
        assert!(!Type::pointer_to(Type::fundamental("void")).is_void());
    }
}
