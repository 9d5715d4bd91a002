//! The managed syntax: P/Invoke declarations and the C# wrapper classes.

use crate::classify::{Classifier, TypeCategory};
use crate::error::ClassifyError;
use crate::plan::{ParamPlan, ReturnConversion, ReturnPlan, TypeNames};
use sharpbind_common::make_id;
use sharpbind_decl::{Decl, Type, TypeKind};
use smol_str::SmolStr;

pub struct CSharpVisitor<'a, 'g> {
    classifier: &'a Classifier<'g>,
}

/// `ns::vector<int>` becomes `ns.vector_int`.
pub fn dotted(path: &[SmolStr]) -> String {
    path.iter()
        .map(|segment| make_id(segment))
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}

/// Number of pointer or reference levels.
fn indirection(ty: &Type) -> usize {
    let array = usize::from(matches!(ty.kind, TypeKind::Array { .. }));
    ty.suffix.chars().filter(|c| matches!(c, '&' | '*')).count() + array
}

impl<'a, 'g> CSharpVisitor<'a, 'g> {
    pub fn new(classifier: &'a Classifier<'g>) -> Self {
        Self { classifier }
    }

    pub fn decl_names(&self, decl: &Decl) -> TypeNames {
        let raw = dotted(&decl.abstract_name());
        TypeNames {
            usage: raw.clone(),
            raw,
            no_ns: make_id(&decl.cxx_name()),
            generic: decl.id(),
        }
    }

    pub fn names(&self, ty: &Type) -> Result<TypeNames, ClassifyError> {
        let category = self.classifier.classify(ty)?;
        Ok(TypeNames {
            raw: dotted(&ty.name),
            no_ns: ty.name.last().map(|s| make_id(s)).unwrap_or_default(),
            generic: ty.clean_name(),
            usage: managed_name(ty, &category),
        })
    }

    /// Parameter type in the `[DllImport]` declaration.
    pub fn pinvoke_param(&self, ty: &Type, name: &str) -> Result<ParamPlan, ClassifyError> {
        let category = self.classifier.classify(ty)?;
        let depth = indirection(ty);
        let plan = match &category {
            TypeCategory::Void if depth == 0 => {
                return Err(ClassifyError::UnsupportedType(ty.full_name()))
            }
            TypeCategory::String if ty.is_reference() && !ty.is_const => {
                ParamPlan::direct(name, "ref String")
            }
            TypeCategory::String if !ty.is_pointer() => ParamPlan::direct(name, "String"),
            TypeCategory::Fundamental(_) | TypeCategory::Enum if depth == 0 => {
                ParamPlan::direct(name, integral_name(&category))
            }
            TypeCategory::Fundamental(_) | TypeCategory::Enum if depth == 1 => ParamPlan {
                needs_unsafe: true,
                ..ParamPlan::direct(name, format!("{}*", integral_name(&category)))
            },
            TypeCategory::FunctionPointer => {
                ParamPlan::direct(name, managed_name(ty, &category))
            }
            _ => ParamPlan::direct(name, "IntPtr"),
        };
        Ok(plan)
    }

    /// Parameter of the managed wrapper method and the argument it hands to
    /// the P/Invoke call.
    pub fn param(&self, ty: &Type, name: &str) -> Result<ParamPlan, ClassifyError> {
        let category = self.classifier.classify(ty)?;
        let depth = indirection(ty);
        let plan = match &category {
            TypeCategory::Void if depth == 0 => {
                return Err(ClassifyError::UnsupportedType(ty.full_name()))
            }
            TypeCategory::String if ty.is_reference() && !ty.is_const => ParamPlan {
                argument: format!("ref {name}"),
                ..ParamPlan::direct(name, "ref String")
            },
            TypeCategory::String if !ty.is_pointer() => ParamPlan::direct(name, "String"),
            TypeCategory::Fundamental(f) if depth == 0 => ParamPlan::direct(name, f.csharp_name()),
            TypeCategory::Enum if depth == 0 => ParamPlan {
                argument: format!("(int) {name}"),
                ..ParamPlan::direct(name, dotted(&ty.name))
            },
            TypeCategory::Fundamental(_) | TypeCategory::Enum if depth == 1 => ParamPlan {
                name: name.to_string(),
                usage: format!("ref {}", integral_name(&category)),
                argument: format!("&{name}"),
                must_marshal: true,
                needs_unsafe: true,
                marshal: None,
            },
            TypeCategory::UserDefined | TypeCategory::SmartPointer { .. } if depth <= 1 => {
                ParamPlan {
                    argument: format!("{name}.mRawObject"),
                    must_marshal: true,
                    ..ParamPlan::direct(name, managed_name(ty, &category))
                }
            }
            TypeCategory::FunctionPointer => {
                ParamPlan::direct(name, managed_name(ty, &category))
            }
            _ => ParamPlan::direct(name, "IntPtr"),
        };
        Ok(plan)
    }

    /// Return type of the managed method, of the P/Invoke declaration, and
    /// the conversion between the two.
    pub fn ret(&self, ty: Option<&Type>) -> Result<ReturnPlan, ClassifyError> {
        let Some(ty) = ty else {
            return Ok(plan("void", "void", ReturnConversion::None));
        };
        let category = self.classifier.classify(ty)?;
        let result = match &category {
            TypeCategory::Void if ty.suffix.is_empty() => {
                plan("void", "void", ReturnConversion::None)
            }
            TypeCategory::Fundamental(f) if !ty.is_pointer() => {
                plan(f.csharp_name(), f.csharp_name(), ReturnConversion::None)
            }
            TypeCategory::String if !ty.is_pointer() => {
                plan("String", "String", ReturnConversion::None)
            }
            TypeCategory::Enum if !ty.is_pointer() => {
                let target = dotted(&ty.name);
                plan(&target, "int", ReturnConversion::EnumCast { target: target.clone() })
            }
            TypeCategory::UserDefined | TypeCategory::SmartPointer { .. } => {
                let class = managed_name(ty, &category);
                plan(&class, "IntPtr", ReturnConversion::WrapHandle { class: class.clone() })
            }
            _ => plan("IntPtr", "IntPtr", ReturnConversion::None),
        };
        Ok(result)
    }
}

fn integral_name(category: &TypeCategory) -> &'static str {
    match category {
        TypeCategory::Fundamental(f) => f.csharp_name(),
        _ => "int",
    }
}

fn managed_name(ty: &Type, category: &TypeCategory) -> String {
    match category {
        TypeCategory::Fundamental(f) => f.csharp_name().to_string(),
        TypeCategory::Void => "void".to_string(),
        TypeCategory::String => "String".to_string(),
        TypeCategory::SmartPointer { pointee } => dotted(&pointee.name),
        TypeCategory::Enum | TypeCategory::UserDefined => dotted(&ty.name),
        TypeCategory::FunctionPointer => ty.clean_name(),
    }
}

fn plan(usage: &str, pinvoke_usage: &str, conversion: ReturnConversion) -> ReturnPlan {
    ReturnPlan {
        usage: usage.to_string(),
        pinvoke_usage: pinvoke_usage.to_string(),
        conversion,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sharpbind_decl::{DeclGraph, GraphBuilder};

    fn graph() -> DeclGraph {
        let mut b = GraphBuilder::new();
        b.add_root(Decl::class("ns", "Foo"));
        b.add_root(Decl::enumeration("ns", "Color", [("Red", 0)]));
        b.finish().unwrap()
    }

    fn named(graph: &DeclGraph, name: &str) -> Type {
        let mut ty = Type::named(name);
        ty.target = graph.find(name);
        ty
    }

    #[test]
    fn test_strings_are_managed_strings() {
        let graph = graph();
        let classifier = Classifier::new(&graph);
        let visitor = CSharpVisitor::new(&classifier);

        let ty = Type::reference_to(Type::named("std::basic_string<char>").with_const());
        assert_eq!(visitor.param(&ty, "p0").unwrap().usage, "String");
        assert_eq!(visitor.pinvoke_param(&ty, "p0").unwrap().usage, "String");
        assert!(!visitor.param(&ty, "p0").unwrap().must_marshal);

        let out = Type::reference_to(Type::named("std::basic_string<char>"));
        let plan = visitor.param(&out, "p0").unwrap();
        assert_eq!(plan.usage, "ref String");
        assert_eq!(plan.argument, "ref p0");
    }

    #[test]
    fn test_fundamental_references_are_ref_parameters() {
        let graph = graph();
        let classifier = Classifier::new(&graph);
        let visitor = CSharpVisitor::new(&classifier);

        let ty = Type::reference_to(Type::fundamental("long long unsigned int"));
        let managed = visitor.param(&ty, "p0").unwrap();
        assert_eq!(managed.usage, "ref ulong");
        assert_eq!(managed.argument, "&p0");
        assert!(managed.needs_unsafe);

        let pinvoke = visitor.pinvoke_param(&ty, "p0").unwrap();
        assert_eq!(pinvoke.usage, "ulong*");
        assert!(pinvoke.needs_unsafe);

        let plain = visitor.param(&Type::fundamental("short"), "p0").unwrap();
        assert_eq!(plain.usage, "short");
        assert!(!plain.must_marshal);
    }

    #[test]
    fn test_objects_pass_their_handle() {
        let graph = graph();
        let classifier = Classifier::new(&graph);
        let visitor = CSharpVisitor::new(&classifier);

        let ty = Type::reference_to(named(&graph, "ns::Foo").with_const());
        let managed = visitor.param(&ty, "p0").unwrap();
        assert_eq!(managed.usage, "ns.Foo");
        assert_eq!(managed.argument, "p0.mRawObject");
        assert_eq!(visitor.pinvoke_param(&ty, "p0").unwrap().usage, "IntPtr");

        let ret = visitor.ret(Some(&named(&graph, "ns::Foo"))).unwrap();
        assert_eq!(ret.usage, "ns.Foo");
        assert_eq!(ret.pinvoke_usage, "IntPtr");
        assert_eq!(ret.conversion.apply("r"), "new ns.Foo(r)");
    }

    #[test]
    fn test_smart_pointers_use_the_pointee_name() {
        let graph = graph();
        let classifier = Classifier::new(&graph);
        let visitor = CSharpVisitor::new(&classifier);

        let shared = Type::named("boost::shared_ptr<ns::Foo>");
        assert_eq!(visitor.names(&shared).unwrap().usage, "ns.Foo");
        assert_eq!(visitor.param(&shared, "p0").unwrap().usage, "ns.Foo");
        assert_eq!(visitor.ret(Some(&shared)).unwrap().usage, "ns.Foo");
    }

    #[test]
    fn test_enums_cast_through_int() {
        let graph = graph();
        let classifier = Classifier::new(&graph);
        let visitor = CSharpVisitor::new(&classifier);
        let color = named(&graph, "ns::Color");

        let param = visitor.param(&color, "p0").unwrap();
        assert_eq!(param.usage, "ns.Color");
        assert_eq!(param.argument, "(int) p0");
        assert_eq!(visitor.pinvoke_param(&color, "p0").unwrap().usage, "int");

        let ret = visitor.ret(Some(&color)).unwrap();
        assert_eq!(ret.pinvoke_usage, "int");
        assert_eq!(ret.conversion.apply("r"), "(ns.Color) r");
    }

    #[test]
    fn test_decl_names_are_dotted() {
        let graph = graph();
        let classifier = Classifier::new(&graph);
        let visitor = CSharpVisitor::new(&classifier);

        let decl = Decl::class("ns", "vector<int>");
        let names = visitor.decl_names(&decl);
        assert_eq!(names.raw, "ns.vector_int");
        assert_eq!(names.no_ns, "vector_int");
        assert_eq!(
            visitor.names(&Type::pointer_to(Type::fundamental("void"))).unwrap().usage,
            "void"
        );
        assert_eq!(
            visitor.ret(Some(&Type::pointer_to(Type::fundamental("void")))).unwrap().usage,
            "IntPtr"
        );
    }
}
