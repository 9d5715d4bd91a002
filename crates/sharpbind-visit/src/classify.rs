//! Classification of spelled types into the categories the visitors know.

use crate::error::ClassifyError;
use rustc_hash::FxHashMap;
use sharpbind_common::split_template_args;
use sharpbind_decl::{DeclGraph, DeclId, DeclKind, Type, TypeKind};
use std::cell::RefCell;

/// The fundamental types that can cross the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fundamental {
    Bool,
    Char,
    SignedChar,
    UnsignedChar,
    WChar,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    LongLong,
    ULongLong,
    Float,
    Double,
    Void,
}

impl Fundamental {
    /// Parse a fundamental spelling. Word order does not matter, so
    /// `long unsigned int` and `unsigned long` are the same type.
    pub fn parse(spelling: &str) -> Result<Self, ClassifyError> {
        let unsupported = || ClassifyError::UnsupportedFundamental(spelling.trim().to_string());

        let mut signed = false;
        let mut unsigned = false;
        let mut int = false;
        let mut shorts = 0;
        let mut longs = 0;
        let mut base: Option<&str> = None;
        for word in spelling.split_whitespace() {
            match word {
                "signed" if !signed => signed = true,
                "unsigned" if !unsigned => unsigned = true,
                "int" if !int => int = true,
                "short" => shorts += 1,
                "long" => longs += 1,
                "const" | "volatile" => {}
                "char" | "wchar_t" | "bool" | "float" | "double" | "void" if base.is_none() => {
                    base = Some(word)
                }
                _ => return Err(unsupported()),
            }
        }
        if signed && unsigned {
            return Err(unsupported());
        }
        let sign = signed || unsigned;

        let fundamental = match (base, shorts, longs, int) {
            (Some("char"), 0, 0, false) if unsigned => Self::UnsignedChar,
            (Some("char"), 0, 0, false) if signed => Self::SignedChar,
            (Some("char"), 0, 0, false) => Self::Char,
            (Some("wchar_t"), 0, 0, false) if !sign => Self::WChar,
            (Some("bool"), 0, 0, false) if !sign => Self::Bool,
            (Some("float"), 0, 0, false) if !sign => Self::Float,
            (Some("double"), 0, 0, false) if !sign => Self::Double,
            (Some("void"), 0, 0, false) if !sign => Self::Void,
            (None, 1, 0, _) if unsigned => Self::UShort,
            (None, 1, 0, _) => Self::Short,
            (None, 0, 0, true) if unsigned => Self::UInt,
            (None, 0, 0, true) => Self::Int,
            (None, 0, 0, false) if unsigned => Self::UInt,
            (None, 0, 0, false) if signed => Self::Int,
            (None, 0, 1, _) if unsigned => Self::ULong,
            (None, 0, 1, _) => Self::Long,
            (None, 0, 2, _) if unsigned => Self::ULongLong,
            (None, 0, 2, _) => Self::LongLong,
            _ => return Err(unsupported()),
        };
        Ok(fundamental)
    }

    /// The managed type of the same width. `long` is taken as 32 bits and
    /// `long long` as 64.
    pub fn csharp_name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Char | Self::SignedChar => "sbyte",
            Self::UnsignedChar => "byte",
            Self::WChar => "char",
            Self::Short => "short",
            Self::UShort => "ushort",
            Self::Int | Self::Long => "int",
            Self::UInt | Self::ULong => "uint",
            Self::LongLong => "long",
            Self::ULongLong => "ulong",
            Self::Float => "float",
            Self::Double => "double",
            Self::Void => "void",
        }
    }
}

/// What a type is, as far as crossing the boundary is concerned. Qualifiers
/// and the declarator suffix are not part of the category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeCategory {
    Void,
    Fundamental(Fundamental),
    /// The `std::basic_string` family.
    String,
    /// `boost::shared_ptr<T>` or `std::shared_ptr<T>`.
    SmartPointer { pointee: Type },
    Enum,
    FunctionPointer,
    UserDefined,
}

impl TypeCategory {
    pub fn is_object(&self) -> bool {
        matches!(self, Self::UserDefined | Self::SmartPointer { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TypeKey {
    name: String,
    fundamental: bool,
    target: Option<DeclId>,
}

/// Classifies types against a declaration graph.
///
/// Results are cached per underlying type, so `const Foo&`, `Foo*` and `Foo`
/// share one entry. The graph itself is never touched.
pub struct Classifier<'g> {
    graph: &'g DeclGraph,
    cache: RefCell<FxHashMap<TypeKey, Result<TypeCategory, ClassifyError>>>,
}

const SMART_POINTERS: &[&str] = &["boost::shared_ptr", "std::shared_ptr"];

impl<'g> Classifier<'g> {
    pub fn new(graph: &'g DeclGraph) -> Self {
        Self {
            graph,
            cache: RefCell::default(),
        }
    }

    pub fn graph(&self) -> &'g DeclGraph {
        self.graph
    }

    pub fn classify(&self, ty: &Type) -> Result<TypeCategory, ClassifyError> {
        match ty.kind {
            TypeKind::Function { .. } => return Ok(TypeCategory::FunctionPointer),
            TypeKind::Method { .. } => {
                return Err(ClassifyError::UnsupportedType(ty.full_name()))
            }
            _ => {}
        }

        let key = TypeKey {
            name: ty.qualified_name(),
            fundamental: ty.fundamental,
            target: ty.target,
        };
        if let Some(cached) = self.cache.borrow().get(&key) {
            return cached.clone();
        }
        let category = self.classify_uncached(ty);
        tracing::trace!(ty = %key.name, ?category, "classified");
        self.cache.borrow_mut().insert(key, category.clone());
        category
    }

    fn classify_uncached(&self, ty: &Type) -> Result<TypeCategory, ClassifyError> {
        if ty.fundamental {
            return fundamental_category(&ty.qualified_name());
        }
        if ty.name.iter().any(|segment| segment.contains("basic_string"))
            || matches!(ty.qualified_name().as_str(), "std::string" | "std::wstring")
        {
            return Ok(TypeCategory::String);
        }
        if let Some(pointee) = self.smart_pointee(ty) {
            return Ok(TypeCategory::SmartPointer { pointee });
        }

        let Some(decl) = self.graph.type_decl(ty) else {
            return Ok(TypeCategory::UserDefined);
        };
        match &decl.kind {
            DeclKind::Enumeration(_) => Ok(TypeCategory::Enum),
            // A typedef that does not end at a declaration names a builtin,
            // e.g. `typedef unsigned int uint32`.
            DeclKind::Typedef(t) => self.classify(&t.ty),
            _ => Ok(TypeCategory::UserDefined),
        }
    }

    fn smart_pointee(&self, ty: &Type) -> Option<Type> {
        let qualified = ty.qualified_name();
        let template = SMART_POINTERS
            .iter()
            .find(|prefix| qualified.starts_with(&format!("{prefix}<")))?;
        let args = qualified[template.len() + 1..].strip_suffix('>')?;
        let pointee_name = split_template_args(args).into_iter().next()?;
        let mut pointee = Type::named(&pointee_name);
        pointee.target = self.graph.find(&pointee_name);
        Some(pointee)
    }
}

fn fundamental_category(spelling: &str) -> Result<TypeCategory, ClassifyError> {
    match Fundamental::parse(spelling)? {
        Fundamental::Void => Ok(TypeCategory::Void),
        other => Ok(TypeCategory::Fundamental(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sharpbind_decl::{Decl, GraphBuilder};

    #[test]
    fn test_word_order_does_not_matter() {
        for spelling in ["long unsigned int", "unsigned long", "unsigned long int", "long int unsigned"] {
            assert_eq!(Fundamental::parse(spelling), Ok(Fundamental::ULong), "{spelling}");
        }
        assert_eq!(
            Fundamental::parse("long long unsigned int"),
            Ok(Fundamental::ULongLong)
        );
        assert_eq!(Fundamental::parse("short unsigned int"), Ok(Fundamental::UShort));
        assert_eq!(Fundamental::parse("signed"), Ok(Fundamental::Int));
    }

    #[test]
    fn test_managed_widths() {
        let table = [
            ("char", "sbyte"),
            ("signed char", "sbyte"),
            ("unsigned char", "byte"),
            ("short int", "short"),
            ("short unsigned int", "ushort"),
            ("int", "int"),
            ("long int", "int"),
            ("unsigned int", "uint"),
            ("long unsigned int", "uint"),
            ("long long int", "long"),
            ("long long unsigned int", "ulong"),
            ("bool", "bool"),
            ("float", "float"),
            ("double", "double"),
            ("wchar_t", "char"),
            ("void", "void"),
        ];
        for (spelling, managed) in table {
            assert_eq!(Fundamental::parse(spelling).unwrap().csharp_name(), managed, "{spelling}");
        }
    }

    #[test]
    fn test_unsupported_spellings_are_errors() {
        for spelling in ["long double", "__int128", "unsigned signed int", "short long", "", "bool bool"] {
            assert!(
                matches!(
                    Fundamental::parse(spelling),
                    Err(ClassifyError::UnsupportedFundamental(_))
                ),
                "{spelling}"
            );
        }
    }

    #[test]
    fn test_categories() {
        let mut b = GraphBuilder::new();
        b.add_root(Decl::class("ns", "Foo"));
        b.add_root(Decl::enumeration("ns", "Color", [("Red", 0)]));
        b.add_root(Decl::typedef("ns", "u32", Type::fundamental("unsigned int")));
        let color = Decl::variable("ns", "c", Type::named("ns::Color"));
        let count = Decl::variable("ns", "n", Type::named("ns::u32"));
        let c = b.add_root(color);
        let n = b.add_root(count);
        let graph = b.finish().unwrap();
        let classifier = Classifier::new(&graph);

        let string = Type::reference_to(Type::named("std::basic_string<char>").with_const());
        assert_eq!(classifier.classify(&string), Ok(TypeCategory::String));

        let shared = Type::named("boost::shared_ptr<ns::Foo>");
        match classifier.classify(&shared).unwrap() {
            TypeCategory::SmartPointer { pointee } => {
                assert_eq!(pointee.full_name(), "ns::Foo");
                assert_eq!(pointee.target, graph.find("ns::Foo"));
            }
            other => panic!("unexpected category {other:?}"),
        }

        let color_ty = &graph.get(c).as_variable().unwrap().ty;
        assert_eq!(classifier.classify(color_ty), Ok(TypeCategory::Enum));

        let count_ty = &graph.get(n).as_variable().unwrap().ty;
        assert_eq!(
            classifier.classify(count_ty),
            Ok(TypeCategory::Fundamental(Fundamental::UInt))
        );

        assert_eq!(
            classifier.classify(&Type::fundamental("void")),
            Ok(TypeCategory::Void)
        );
        let callback = Type::function(Type::fundamental("void"), vec![]);
        assert_eq!(classifier.classify(&callback), Ok(TypeCategory::FunctionPointer));
        assert_eq!(
            classifier.classify(&Type::named("Unknown")),
            Ok(TypeCategory::UserDefined)
        );
    }

    #[test]
    fn test_cache_does_not_change_results() {
        let graph = GraphBuilder::new().finish().unwrap();
        let classifier = Classifier::new(&graph);
        let ld = Type::fundamental("long double");
        let first = classifier.classify(&ld);
        let second = classifier.classify(&Type::reference_to(ld.clone()));
        assert_eq!(first, second);
        assert!(first.is_err());
    }
}
