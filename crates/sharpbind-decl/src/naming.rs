//! Naming of declarations in C++ and identifier form.

use crate::decl::{Decl, DeclKind, Function, MethodKind};
use sharpbind_common::{clean_segment, join_scope};
use smol_str::SmolStr;

impl Decl {
    /// The unqualified C++ spelling: `~Foo`, `operator+`, `operator int`.
    pub fn cxx_name(&self) -> String {
        match &self.kind {
            DeclKind::Method(m) => match m.kind {
                MethodKind::Destructor => format!("~{}", self.name),
                MethodKind::Operator(sym) => format!("operator{sym}"),
                MethodKind::Converter => match &m.function.result {
                    Some(result) => format!("operator {}", result.full_name()),
                    None => self.name.to_string(),
                },
                _ => self.name.to_string(),
            },
            DeclKind::Function(Function {
                operator: Some(sym),
                ..
            }) => format!("operator{sym}"),
            _ => self.name.to_string(),
        }
    }

    /// Fully qualified C++ name, e.g. `ns::Foo::operator==`.
    pub fn full_name(&self) -> String {
        if self.scope.is_empty() {
            self.cxx_name()
        } else {
            format!("{}::{}", join_scope(&self.scope), self.cxx_name())
        }
    }

    /// Scope path plus name, the language-neutral path of this declaration.
    pub fn abstract_name(&self) -> Vec<SmolStr> {
        let mut path = self.scope.clone();
        path.push(SmolStr::new(self.cxx_name()));
        path
    }

    /// Identifier-safe join of the scope path: `ns_Foo`.
    pub fn clean_scope(&self) -> String {
        self.scope
            .iter()
            .map(|segment| clean_segment(segment))
            .collect::<Vec<_>>()
            .join("_")
    }

    /// Identifier-safe join of [`abstract_name`](Self::abstract_name).
    pub fn clean_name(&self) -> String {
        self.abstract_name()
            .iter()
            .map(|segment| clean_segment(segment))
            .collect::<Vec<_>>()
            .join("_")
    }

    fn id_base(&self) -> String {
        let symbol = match &self.kind {
            DeclKind::Method(m) => match m.kind {
                MethodKind::Operator(sym) => Some((sym, m.function.params.is_empty())),
                _ => None,
            },
            DeclKind::Function(f) => f.operator.map(|sym| (sym, f.params.len() == 1)),
            _ => None,
        };
        match symbol {
            Some((sym, unary)) => {
                let scope = self.clean_scope();
                if scope.is_empty() {
                    format!("operator_{}", sym.word(unary))
                } else {
                    format!("{scope}_operator_{}", sym.word(unary))
                }
            }
            None => self.clean_name(),
        }
    }

    /// Identifier that tells overloads apart.
    ///
    /// Functions append the identifier form of every parameter type, so
    /// `Add(int, int)` and `Add(int, int, int)` yield `Add__int_int` and
    /// `Add__int_int_int`. Operators use a word instead of the symbol.
    pub fn id(&self) -> String {
        let base = self.id_base();
        match self.as_function() {
            Some(function) if !function.params.is_empty() => {
                let params = function
                    .param_types()
                    .map(|ty| ty.id_fragment())
                    .collect::<Vec<_>>()
                    .join("_");
                format!("{base}__{params}")
            }
            _ => base,
        }
    }

    /// Expression taking the address of this function.
    ///
    /// Unique functions use `&name`. Overloaded ones (or `force`) need the
    /// casted form so the compiler can pick the right overload. Constructors
    /// and destructors have no address.
    pub fn pointer_declaration(&self, force: bool) -> String {
        let Some(function) = self.as_function() else {
            return String::new();
        };
        let method = self.as_method();
        if let Some(m) = method {
            if matches!(m.kind, MethodKind::Constructor | MethodKind::Destructor) {
                return String::new();
            }
        }
        let full_name = self.full_name();
        if self.is_unique && !force {
            return format!("&{full_name}");
        }

        let result = function
            .result
            .as_ref()
            .map_or_else(|| "void".to_string(), |ty| ty.full_name());
        let params = function
            .param_types()
            .map(|ty| ty.full_name())
            .collect::<Vec<_>>()
            .join(", ");
        match method {
            Some(m) if !m.is_static => {
                let constness = if m.is_const { " const" } else { "" };
                format!(
                    "({result} ({}::*)({params}){constness}{})&{full_name}",
                    join_scope(&self.scope),
                    function.exceptions()
                )
            }
            _ => format!("({result} (*)({params}))&{full_name}"),
        }
    }

    /// Qualified name of one enumerator: enumerators live in the scope that
    /// encloses the enumeration.
    pub fn value_full_name(&self, value: &str) -> String {
        if self.scope.is_empty() {
            value.to_string()
        } else {
            format!("{}::{value}", join_scope(&self.scope))
        }
    }

    /// Name, parameter types and constness; two methods with the same
    /// signature in different classes override one another.
    pub fn signature(&self) -> Option<Signature> {
        let function = self.as_function()?;
        Some(Signature {
            name: SmolStr::new(self.cxx_name()),
            params: function.param_types().map(|ty| ty.full_name()).collect(),
            is_const: self.as_method().is_some_and(|m| m.is_const),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    pub name: SmolStr,
    pub params: Vec<String>,
    pub is_const: bool,
}
