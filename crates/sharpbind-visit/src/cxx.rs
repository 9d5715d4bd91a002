//! The native bridge syntax: `extern "C"` functions wrapping C++ calls.

use crate::classify::{Classifier, TypeCategory};
use crate::error::ClassifyError;
use crate::plan::{MarshalStep, ParamPlan, ReturnConversion, ReturnPlan, TypeNames};
use sharpbind_decl::{Decl, Type, TypeKind};

pub struct CxxVisitor<'a, 'g> {
    classifier: &'a Classifier<'g>,
}

fn string_usage(ty: &Type) -> &'static str {
    if ty.is_const {
        "const char*"
    } else {
        "char*"
    }
}

/// `Foo&` becomes `Foo*`, `Foo*&` becomes `Foo**`.
fn reference_as_pointer(raw: &str) -> String {
    match raw.strip_suffix('&') {
        Some(stripped) => format!("{stripped}*"),
        None => raw.to_string(),
    }
}

impl<'a, 'g> CxxVisitor<'a, 'g> {
    pub fn new(classifier: &'a Classifier<'g>) -> Self {
        Self { classifier }
    }

    pub fn decl_names(&self, decl: &Decl) -> TypeNames {
        let raw = decl.full_name();
        TypeNames {
            usage: raw.clone(),
            raw,
            no_ns: decl.cxx_name(),
            generic: decl.id(),
        }
    }

    pub fn names(&self, ty: &Type) -> Result<TypeNames, ClassifyError> {
        let category = self.classifier.classify(ty)?;
        let raw = ty.full_name();
        let usage = match category {
            TypeCategory::String => string_usage(ty).to_string(),
            _ => raw.clone(),
        };
        Ok(TypeNames {
            raw,
            no_ns: ty.no_ns_name(),
            generic: ty.clean_name(),
            usage,
        })
    }

    /// Parameter of the bridge function and the argument it forwards.
    pub fn param(&self, ty: &Type, name: &str) -> Result<ParamPlan, ClassifyError> {
        let category = self.classifier.classify(ty)?;
        let raw = ty.full_name();
        let marshal_name = format!("marshal_{name}");

        let plan = match category {
            TypeCategory::Void if !ty.is_indirect() => {
                return Err(ClassifyError::UnsupportedType(raw))
            }
            TypeCategory::String if ty.is_reference() && !ty.is_const => ParamPlan {
                name: name.to_string(),
                usage: "char**".to_string(),
                argument: marshal_name.clone(),
                must_marshal: true,
                needs_unsafe: false,
                marshal: Some(MarshalStep {
                    pre_call: format!("std::string {marshal_name} = *{name}"),
                    post_call: Some(format!("*{name} = strdup({marshal_name}.c_str())")),
                    name: marshal_name,
                }),
            },
            TypeCategory::String if !ty.is_pointer() => ParamPlan::direct(name, string_usage(ty)),
            TypeCategory::Enum if ty.suffix.is_empty() => ParamPlan {
                argument: format!("static_cast<{raw}>({name})"),
                ..ParamPlan::direct(name, "int")
            },
            _ if ty.is_reference() => ParamPlan {
                name: name.to_string(),
                usage: reference_as_pointer(&raw),
                argument: marshal_name.clone(),
                must_marshal: true,
                needs_unsafe: false,
                marshal: Some(MarshalStep {
                    pre_call: format!("{raw} {marshal_name} = *{name}"),
                    post_call: None,
                    name: marshal_name,
                }),
            },
            _ if matches!(ty.kind, TypeKind::Array { .. }) => {
                ParamPlan::direct(name, format!("{raw}*"))
            }
            ref category if category.is_object() && !ty.is_pointer() => ParamPlan {
                argument: format!("*{name}"),
                must_marshal: true,
                ..ParamPlan::direct(name, format!("{raw}*"))
            },
            _ => ParamPlan::direct(name, raw),
        };
        Ok(plan)
    }

    /// Return type of the bridge function and the conversion of the result.
    /// `None` stands for constructors and destructors.
    pub fn ret(&self, ty: Option<&Type>) -> Result<ReturnPlan, ClassifyError> {
        let Some(ty) = ty else {
            return Ok(plan("void".to_string(), ReturnConversion::None));
        };
        let category = self.classifier.classify(ty)?;
        let value = ty.by_value();

        let result = match category {
            TypeCategory::String if !ty.is_pointer() => {
                plan("char*".to_string(), ReturnConversion::StringDup)
            }
            TypeCategory::Enum if !ty.is_pointer() => plan(
                "int".to_string(),
                ReturnConversion::EnumCast {
                    target: "int".to_string(),
                },
            ),
            TypeCategory::SmartPointer { .. } if !ty.is_pointer() => {
                let holder = value.full_name();
                plan(
                    format!("{holder}*"),
                    ReturnConversion::SmartPointerAlloc { holder },
                )
            }
            TypeCategory::UserDefined if !ty.is_pointer() => {
                let class = value.full_name();
                plan(format!("{class}*"), ReturnConversion::CopyToHeap { class })
            }
            _ if ty.is_reference() => plan(value.full_name(), ReturnConversion::StripReference),
            _ => plan(ty.full_name(), ReturnConversion::None),
        };
        Ok(result)
    }
}

fn plan(usage: String, conversion: ReturnConversion) -> ReturnPlan {
    ReturnPlan {
        pinvoke_usage: usage.clone(),
        usage,
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
    fn test_const_string_reference_becomes_char_pointer() {
        let graph = graph();
        let classifier = Classifier::new(&graph);
        let visitor = CxxVisitor::new(&classifier);

        // void f(const std::string& s);
        let ty = Type::reference_to(Type::named("std::basic_string<char>").with_const());
        let plan = visitor.param(&ty, "p0").unwrap();
        assert_eq!(plan.usage, "const char*");
        assert_eq!(plan.argument, "p0");
        assert!(!plan.must_marshal);
        assert!(plan.marshal.is_none());

        // By value the named type would need marshaling; the string does not.
        let by_value = Type::named("std::basic_string<char>");
        assert!(by_value.must_marshal);
        assert!(!visitor.param(&by_value, "p0").unwrap().must_marshal);
    }

    #[test]
    fn test_non_const_string_reference_round_trips() {
        let graph = graph();
        let classifier = Classifier::new(&graph);
        let visitor = CxxVisitor::new(&classifier);

        let ty = Type::reference_to(Type::named("std::basic_string<char>"));
        let plan = visitor.param(&ty, "p1").unwrap();
        assert_eq!(plan.usage, "char**");
        assert_eq!(plan.argument, "marshal_p1");
        let step = plan.marshal.unwrap();
        assert_eq!(step.pre_call, "std::string marshal_p1 = *p1");
        assert_eq!(step.post_call.as_deref(), Some("*p1 = strdup(marshal_p1.c_str())"));
    }

    #[test]
    fn test_int_never_marshals() {
        let graph = graph();
        let classifier = Classifier::new(&graph);
        let visitor = CxxVisitor::new(&classifier);

        let plan = visitor.param(&Type::fundamental("int"), "p0").unwrap();
        assert_eq!(plan.usage, "int");
        assert!(!plan.must_marshal);
        assert_eq!(
            visitor.ret(Some(&Type::fundamental("int"))).unwrap().conversion,
            ReturnConversion::None
        );
    }

    #[test]
    fn test_references_become_pointers() {
        let graph = graph();
        let classifier = Classifier::new(&graph);
        let visitor = CxxVisitor::new(&classifier);

        let int_ref = Type::reference_to(Type::fundamental("int"));
        let plan = visitor.param(&int_ref, "p0").unwrap();
        assert_eq!(plan.usage, "int*");
        assert_eq!(plan.marshal.unwrap().pre_call, "int& marshal_p0 = *p0");

        let foo_ref = Type::reference_to(named(&graph, "ns::Foo").with_const());
        let plan = visitor.param(&foo_ref, "p1").unwrap();
        assert_eq!(plan.usage, "const ns::Foo*");
        assert_eq!(plan.argument, "marshal_p1");
        assert!(plan.must_marshal);
    }

    #[test]
    fn test_objects_by_value_are_dereferenced() {
        let graph = graph();
        let classifier = Classifier::new(&graph);
        let visitor = CxxVisitor::new(&classifier);

        let plan = visitor.param(&named(&graph, "ns::Foo"), "p0").unwrap();
        assert_eq!(plan.usage, "ns::Foo*");
        assert_eq!(plan.argument, "*p0");

        let ptr = Type::pointer_to(named(&graph, "ns::Foo"));
        let plan = visitor.param(&ptr, "p0").unwrap();
        assert_eq!(plan.usage, "ns::Foo*");
        assert_eq!(plan.argument, "p0");
    }

    #[test]
    fn test_enums_cross_as_int() {
        let graph = graph();
        let classifier = Classifier::new(&graph);
        let visitor = CxxVisitor::new(&classifier);
        let color = named(&graph, "ns::Color");

        let plan = visitor.param(&color, "p0").unwrap();
        assert_eq!(plan.usage, "int");
        assert_eq!(plan.argument, "static_cast<ns::Color>(p0)");

        let ret = visitor.ret(Some(&color)).unwrap();
        assert_eq!(ret.usage, "int");
        assert_eq!(ret.conversion.apply("r"), "static_cast<int>(r)");
    }

    #[test]
    fn test_return_conversions() {
        let graph = graph();
        let classifier = Classifier::new(&graph);
        let visitor = CxxVisitor::new(&classifier);

        let ret = visitor.ret(Some(&named(&graph, "ns::Foo"))).unwrap();
        assert_eq!(ret.usage, "ns::Foo*");
        assert_eq!(ret.conversion.apply("r"), "new ns::Foo(r)");

        let const_ref = Type::reference_to(named(&graph, "ns::Foo").with_const());
        assert_eq!(visitor.ret(Some(&const_ref)).unwrap().usage, "ns::Foo*");

        let string = Type::named("std::basic_string<char>");
        let ret = visitor.ret(Some(&string)).unwrap();
        assert_eq!(ret.usage, "char*");
        assert_eq!(ret.conversion, ReturnConversion::StringDup);

        let int_ref = Type::reference_to(Type::fundamental("int").with_const());
        let ret = visitor.ret(Some(&int_ref)).unwrap();
        assert_eq!(ret.usage, "int");
        assert_eq!(ret.conversion, ReturnConversion::StripReference);

        let shared = Type::named("boost::shared_ptr<ns::Foo>");
        let ret = visitor.ret(Some(&shared)).unwrap();
        assert_eq!(ret.usage, "boost::shared_ptr<ns::Foo>*");
        assert_eq!(ret.conversion.apply("r"), "new boost::shared_ptr<ns::Foo>(r)");

        assert_eq!(visitor.ret(None).unwrap().usage, "void");
    }

    #[test]
    fn test_unsupported_types_are_errors() {
        let graph = graph();
        let classifier = Classifier::new(&graph);
        let visitor = CxxVisitor::new(&classifier);

        assert!(matches!(
            visitor.param(&Type::fundamental("long double"), "p0"),
            Err(ClassifyError::UnsupportedFundamental(_))
        ));
        assert!(matches!(
            visitor.param(&Type::fundamental("void"), "p0"),
            Err(ClassifyError::UnsupportedType(_))
        ));
        let void_ptr = Type::pointer_to(Type::fundamental("void"));
        assert_eq!(visitor.param(&void_ptr, "p0").unwrap().usage, "void*");
    }

    #[test]
    fn test_names() {
        let graph = graph();
        let classifier = Classifier::new(&graph);
        let visitor = CxxVisitor::new(&classifier);

        let names = visitor.names(&Type::named("std::basic_string<char>")).unwrap();
        assert_eq!(names.raw, "std::basic_string<char>");
        assert_eq!(names.no_ns, "basic_string<char>");
        assert_eq!(names.generic, "std_basic_string_char_");
        assert_eq!(names.usage, "char*");

        let add = Decl::function("", "Add", Type::fundamental("int"), vec![Type::fundamental("int")]);
        let names = visitor.decl_names(&add);
        assert_eq!(names.raw, "Add");
        assert_eq!(names.generic, "Add__int");
    }
}
