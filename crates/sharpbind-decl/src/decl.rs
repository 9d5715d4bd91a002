//! Declaration nodes.

use crate::operator::OperatorSymbol;
use crate::types::{Type, TypeKind};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sharpbind_common::{split_scope, SourceLocation};
use smol_str::SmolStr;

/// Index of a declaration inside a [`DeclGraph`](crate::DeclGraph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DeclId(pub(crate) u32);

impl DeclId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// C++ access specifier of a member, nested type or base edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

impl Visibility {
    pub fn is_public(self) -> bool {
        self == Visibility::Public
    }
}

/// A node of the parsed-header graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Decl {
    /// The C++ name, possibly template qualified (`vector<int>`).
    pub name: SmolStr,
    /// Namespace path, or the owning class path for members and nested types.
    pub scope: Vec<SmolStr>,
    pub location: SourceLocation,
    /// Only forward declared.
    pub incomplete: bool,
    /// False when another declaration shares the same full name (overloads).
    pub is_unique: bool,
    pub must_marshal: bool,
    pub kind: DeclKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeclKind {
    Class(Class),
    Function(Function),
    Method(Method),
    Variable(Variable),
    Enumeration(Enumeration),
    Typedef(Typedef),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Class {
    /// Members in declaration order.
    pub members: Vec<DeclId>,
    pub is_abstract: bool,
    pub is_struct: bool,
    /// Set for nested classes: their visibility inside the owning class.
    pub nested: Option<Visibility>,
    /// Direct bases, same as `hierarchy[0]`.
    pub bases: Vec<Base>,
    /// Level 0 holds the direct bases, each following level the bases one
    /// step further up. Diamond duplicates at the same depth are merged.
    pub hierarchy: Vec<Vec<Base>>,
}

impl Class {
    /// Every base in the hierarchy, level by level.
    pub fn all_bases(&self) -> impl Iterator<Item = &Base> {
        self.hierarchy.iter().flatten()
    }
}

/// An inheritance edge. Refers to the base class, never owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Base {
    pub class: DeclId,
    pub visibility: Visibility,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub ty: Type,
    /// Synthetic name: `p0`, `p1`, ...
    pub name: SmolStr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    /// `None` for constructors and destructors.
    pub result: Option<Type>,
    pub params: Vec<Param>,
    /// Exception specification; `None` when the function has none.
    pub throws: Option<Vec<Type>>,
    /// Set for free operators.
    pub operator: Option<OperatorSymbol>,
}

impl Function {
    pub fn new(result: Option<Type>, params: Vec<Type>) -> Self {
        let params = params
            .into_iter()
            .enumerate()
            .map(|(i, ty)| Param {
                ty,
                name: SmolStr::new(format!("p{i}")),
            })
            .collect();
        Self {
            result,
            params,
            throws: None,
            operator: None,
        }
    }

    /// Number of leading parameters without a default value.
    pub fn min_args(&self) -> usize {
        self.params
            .iter()
            .take_while(|param| param.ty.default.is_none())
            .count()
    }

    pub fn max_args(&self) -> usize {
        self.params.len()
    }

    /// ` throw(A, B)` or an empty string.
    pub fn exceptions(&self) -> String {
        match &self.throws {
            None => String::new(),
            Some(types) => format!(
                " throw({})",
                types
                    .iter()
                    .map(Type::full_name)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }

    pub fn param_types(&self) -> impl Iterator<Item = &Type> {
        self.params.iter().map(|p| &p.ty)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Normal,
    Constructor,
    Destructor,
    Operator(OperatorSymbol),
    /// `operator T()`; the target type is the function result.
    Converter,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub function: Function,
    pub kind: MethodKind,
    pub visibility: Visibility,
    pub is_virtual: bool,
    /// Pure virtual.
    pub is_abstract: bool,
    pub is_static: bool,
    pub is_const: bool,
}

impl Method {
    pub fn is_plain(&self) -> bool {
        self.kind == MethodKind::Normal
    }

    pub fn is_constructor(&self) -> bool {
        self.kind == MethodKind::Constructor
    }

    /// Public constructor taking a single `const Owner&`.
    pub fn is_copy_constructor(&self, owner: &[SmolStr]) -> bool {
        if !self.is_constructor() || self.function.params.len() != 1 {
            return false;
        }
        let param = &self.function.params[0].ty;
        param.kind == TypeKind::Reference
            && param.suffix == "&"
            && param.name.as_slice() == owner
            && param.is_const
            && self.visibility.is_public()
    }

    pub fn is_default_constructor(&self) -> bool {
        self.is_constructor() && self.function.params.is_empty() && self.visibility.is_public()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub visibility: Visibility,
    pub is_static: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub ty: Type,
    /// Set for class data members.
    pub field: Option<Field>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Enumeration {
    pub values: IndexMap<SmolStr, i64>,
    /// Set for enumerations declared inside a class.
    pub visibility: Option<Visibility>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Typedef {
    pub ty: Type,
    pub visibility: Visibility,
}

impl Decl {
    fn new(scope: &str, name: &str, must_marshal: bool, kind: DeclKind) -> Self {
        Self {
            name: SmolStr::new(name),
            scope: split_scope(scope),
            location: SourceLocation::default(),
            incomplete: false,
            is_unique: true,
            must_marshal,
            kind,
        }
    }

    pub fn class(scope: &str, name: &str) -> Self {
        Self::new(scope, name, true, DeclKind::Class(Class::default()))
    }

    pub fn function(scope: &str, name: &str, result: Type, params: Vec<Type>) -> Self {
        Self::new(
            scope,
            name,
            false,
            DeclKind::Function(Function::new(Some(result), params)),
        )
    }

    /// A namespace-scope operator such as `ns::operator==`.
    pub fn operator(scope: &str, symbol: OperatorSymbol, result: Type, params: Vec<Type>) -> Self {
        let mut function = Function::new(Some(result), params);
        function.operator = Some(symbol);
        Self::new(scope, symbol.as_str(), false, DeclKind::Function(function))
    }

    fn member(name: &str, kind: MethodKind, result: Option<Type>, params: Vec<Type>) -> Self {
        Self::new(
            "",
            name,
            false,
            DeclKind::Method(Method {
                function: Function::new(result, params),
                kind,
                visibility: Visibility::Public,
                is_virtual: false,
                is_abstract: false,
                is_static: false,
                is_const: false,
            }),
        )
    }

    /// A public, non-virtual member function. The scope is set when the
    /// member is added to its class.
    pub fn method(name: &str, result: Type, params: Vec<Type>) -> Self {
        Self::member(name, MethodKind::Normal, Some(result), params)
    }

    pub fn constructor(name: &str, params: Vec<Type>) -> Self {
        Self::member(name, MethodKind::Constructor, None, params)
    }

    pub fn destructor(name: &str) -> Self {
        Self::member(name, MethodKind::Destructor, None, Vec::new())
    }

    pub fn class_operator(symbol: OperatorSymbol, result: Type, params: Vec<Type>) -> Self {
        Self::member(symbol.as_str(), MethodKind::Operator(symbol), Some(result), params)
    }

    pub fn converter(result: Type) -> Self {
        let name = format!("operator {}", result.full_name());
        Self::member(&name, MethodKind::Converter, Some(result), Vec::new())
    }

    pub fn variable(scope: &str, name: &str, ty: Type) -> Self {
        Self::new(scope, name, false, DeclKind::Variable(Variable { ty, field: None }))
    }

    pub fn field(name: &str, ty: Type) -> Self {
        Self::new(
            "",
            name,
            false,
            DeclKind::Variable(Variable {
                ty,
                field: Some(Field {
                    visibility: Visibility::Public,
                    is_static: false,
                }),
            }),
        )
    }

    pub fn enumeration<'a>(
        scope: &str,
        name: &str,
        values: impl IntoIterator<Item = (&'a str, i64)>,
    ) -> Self {
        let values = values
            .into_iter()
            .map(|(k, v)| (SmolStr::new(k), v))
            .collect();
        Self::new(
            scope,
            name,
            false,
            DeclKind::Enumeration(Enumeration {
                values,
                visibility: None,
            }),
        )
    }

    pub fn typedef(scope: &str, name: &str, ty: Type) -> Self {
        Self::new(
            scope,
            name,
            false,
            DeclKind::Typedef(Typedef {
                ty,
                visibility: Visibility::Public,
            }),
        )
    }

    pub fn at(mut self, file: &str, line: u32) -> Self {
        self.location = SourceLocation::new(file, line);
        self
    }

    pub fn with_incomplete(mut self) -> Self {
        self.incomplete = true;
        self
    }

    /// Visibility of a member, nested type or class enumeration.
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        match &mut self.kind {
            DeclKind::Method(m) => m.visibility = visibility,
            DeclKind::Variable(v) => {
                if let Some(field) = &mut v.field {
                    field.visibility = visibility;
                }
            }
            DeclKind::Class(c) => c.nested = Some(visibility),
            DeclKind::Enumeration(e) => e.visibility = Some(visibility),
            DeclKind::Typedef(t) => t.visibility = visibility,
            DeclKind::Function(_) => {}
        }
        self
    }

    /// Mark a method virtual; `pure` makes it abstract as well.
    pub fn with_virtual(mut self, pure: bool) -> Self {
        if let DeclKind::Method(m) = &mut self.kind {
            m.is_virtual = true;
            m.is_abstract = pure;
        }
        self
    }

    pub fn with_static(mut self) -> Self {
        match &mut self.kind {
            DeclKind::Method(m) => m.is_static = true,
            DeclKind::Variable(Variable {
                field: Some(field), ..
            }) => field.is_static = true,
            _ => {}
        }
        self
    }

    pub fn with_const(mut self) -> Self {
        if let DeclKind::Method(m) = &mut self.kind {
            m.is_const = true;
        }
        self
    }

    pub fn with_abstract(mut self) -> Self {
        if let DeclKind::Class(c) = &mut self.kind {
            c.is_abstract = true;
        }
        self
    }

    pub fn with_throws(mut self, throws: Vec<Type>) -> Self {
        if let Some(function) = self.function_mut() {
            function.throws = Some(throws);
        }
        self
    }

    pub fn as_class(&self) -> Option<&Class> {
        match &self.kind {
            DeclKind::Class(c) => Some(c),
            _ => None,
        }
    }

    pub(crate) fn as_class_mut(&mut self) -> Option<&mut Class> {
        match &mut self.kind {
            DeclKind::Class(c) => Some(c),
            _ => None,
        }
    }

    /// The callable part of free functions and methods alike.
    pub fn as_function(&self) -> Option<&Function> {
        match &self.kind {
            DeclKind::Function(f) => Some(f),
            DeclKind::Method(m) => Some(&m.function),
            _ => None,
        }
    }

    pub(crate) fn function_mut(&mut self) -> Option<&mut Function> {
        match &mut self.kind {
            DeclKind::Function(f) => Some(f),
            DeclKind::Method(m) => Some(&mut m.function),
            _ => None,
        }
    }

    pub fn as_method(&self) -> Option<&Method> {
        match &self.kind {
            DeclKind::Method(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_method_mut(&mut self) -> Option<&mut Method> {
        match &mut self.kind {
            DeclKind::Method(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_variable(&self) -> Option<&Variable> {
        match &self.kind {
            DeclKind::Variable(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_enumeration(&self) -> Option<&Enumeration> {
        match &self.kind {
            DeclKind::Enumeration(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_typedef(&self) -> Option<&Typedef> {
        match &self.kind {
            DeclKind::Typedef(t) => Some(t),
            _ => None,
        }
    }

    pub fn is_class(&self) -> bool {
        matches!(self.kind, DeclKind::Class(_))
    }

    pub fn is_nested_class(&self) -> bool {
        matches!(&self.kind, DeclKind::Class(c) if c.nested.is_some())
    }

    pub fn is_free_operator(&self) -> bool {
        matches!(&self.kind, DeclKind::Function(f) if f.operator.is_some())
    }

    /// Visibility inside the enclosing class; `None` for namespace-scope
    /// declarations.
    pub fn visibility(&self) -> Option<Visibility> {
        match &self.kind {
            DeclKind::Method(m) => Some(m.visibility),
            DeclKind::Variable(v) => v.field.map(|f| f.visibility),
            DeclKind::Class(c) => c.nested,
            DeclKind::Enumeration(e) => e.visibility,
            DeclKind::Typedef(t) => Some(t.visibility),
            DeclKind::Function(_) => None,
        }
    }

    /// Namespace-scope declarations count as public.
    pub fn is_public(&self) -> bool {
        self.visibility().map_or(true, Visibility::is_public)
    }

    /// Every type spelled by this declaration, mutably.
    pub(crate) fn types_mut(&mut self) -> Vec<&mut Type> {
        let mut out = Vec::new();
        match &mut self.kind {
            DeclKind::Function(f) => collect_function_types(f, &mut out),
            DeclKind::Method(m) => collect_function_types(&mut m.function, &mut out),
            DeclKind::Variable(v) => out.push(&mut v.ty),
            DeclKind::Typedef(t) => out.push(&mut t.ty),
            DeclKind::Class(_) | DeclKind::Enumeration(_) => {}
        }
        out
    }

    /// Copy of this member attributed to another class.
    pub fn retagged(&self, owner: &[SmolStr]) -> Decl {
        let mut copy = self.clone();
        copy.scope = owner.to_vec();
        copy
    }
}

fn collect_function_types<'a>(function: &'a mut Function, out: &mut Vec<&'a mut Type>) {
    if let Some(result) = &mut function.result {
        out.push(result);
    }
    for param in &mut function.params {
        out.push(&mut param.ty);
    }
    if let Some(throws) = &mut function.throws {
        out.extend(throws.iter_mut());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_and_max_args() {
        let f = Function::new(
            Some(Type::fundamental("void")),
            vec![
                Type::fundamental("int"),
                Type::fundamental("int").with_default("1"),
                Type::fundamental("int").with_default("2"),
            ],
        );
        assert_eq!(f.min_args(), 1);
        assert_eq!(f.max_args(), 3);
        assert_eq!(f.params[2].name, "p2");
    }

    #[test]
    fn test_exceptions_spelling() {
        let mut f = Function::new(None, vec![]);
        assert_eq!(f.exceptions(), "");
        f.throws = Some(vec![Type::named("std::bad_alloc")]);
        assert_eq!(f.exceptions(), " throw(std::bad_alloc)");
        f.throws = Some(vec![]);
        assert_eq!(f.exceptions(), " throw()");
    }

    #[test]
    fn test_copy_constructor_detection() {
        let owner = vec![SmolStr::new("ns"), SmolStr::new("Foo")];
        let copy = Decl::constructor(
            "Foo",
            vec![Type::reference_to(Type::named("ns::Foo").with_const())],
        );
        assert!(copy.as_method().unwrap().is_copy_constructor(&owner));

        let non_const = Decl::constructor("Foo", vec![Type::reference_to(Type::named("ns::Foo"))]);
        assert!(!non_const.as_method().unwrap().is_copy_constructor(&owner));

        let private_copy = copy.clone().with_visibility(Visibility::Private);
        assert!(!private_copy.as_method().unwrap().is_copy_constructor(&owner));

        let default = Decl::constructor("Foo", vec![]);
        assert!(default.as_method().unwrap().is_default_constructor());
    }

    #[test]
    fn test_visibility_defaults() {
        let free = Decl::function("ns", "f", Type::fundamental("void"), vec![]);
        assert_eq!(free.visibility(), None);
        assert!(free.is_public());

        let field = Decl::field("x", Type::fundamental("int")).with_visibility(Visibility::Protected);
        assert_eq!(field.visibility(), Some(Visibility::Protected));
        assert!(!field.is_public());
    }

    #[test]
    fn test_retagged_changes_scope_only() {
        let mut m = Decl::method("f", Type::fundamental("void"), vec![]);
        m.scope = vec![SmolStr::new("Base")];
        let copy = m.retagged(&[SmolStr::new("Derived")]);
        assert_eq!(copy.scope, vec![SmolStr::new("Derived")]);
        assert_eq!(copy.name, m.name);
        assert_eq!(copy.kind, m.kind);
    }
}
