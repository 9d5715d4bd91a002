//! The export model: everything code emission needs, fully resolved.
//!
//! One [`ExportModel`] per exported declaration. Every name is spelled in
//! both syntaxes so the emitter never has to look at the declaration graph.

use crate::policy::{CodeSection, Policy, SmartPointer, Wrapper};
use serde::Serialize;
use sharpbind_common::{make_id, Diagnostic};
use sharpbind_decl::Visibility;
use sharpbind_visit::{ParamPlan, ReturnPlan, TypeNames};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExportModel {
    Class(ClassModel),
    FreeTypes(FreeTypesModel),
    Enum(EnumModel),
    Variable(VariableModel),
    Code(CodeModel),
}

impl ExportModel {
    /// Name of the exported declaration, or of the holder class.
    pub fn name(&self) -> &str {
        match self {
            Self::Class(m) => &m.name,
            Self::FreeTypes(m) => &m.holder_class,
            Self::Enum(m) => &m.name,
            Self::Variable(m) => &m.name,
            Self::Code(_) => "",
        }
    }

    /// Diagnostics of this model and everything nested in it.
    pub fn diagnostics(&self) -> Vec<&Diagnostic> {
        match self {
            Self::Class(m) => m.all_diagnostics(),
            Self::FreeTypes(m) => m.diagnostics.iter().collect(),
            Self::Variable(m) => m.diagnostics.iter().collect(),
            Self::Enum(_) | Self::Code(_) => Vec::new(),
        }
    }

    pub fn as_class(&self) -> Option<&ClassModel> {
        match self {
            Self::Class(m) => Some(m),
            _ => None,
        }
    }
}

/// A name in the native bridge and in the managed code.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Naming {
    pub cxx: TypeNames,
    pub csharp: TypeNames,
}

/// Generated source files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputFiles {
    pub cxx: String,
    pub csharp: String,
}

impl OutputFiles {
    /// `ns::Foo` goes to `ns_Foo.cpp` and `ns_Foo.cs`.
    pub fn for_path<S: AsRef<str>>(path: &[S]) -> Self {
        let base = path
            .iter()
            .map(|segment| make_id(segment.as_ref()))
            .collect::<Vec<_>>()
            .join("_");
        Self {
            cxx: format!("{base}.cpp"),
            csharp: format!("{base}.cs"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamModel {
    pub name: String,
    /// Default argument as spelled in the header.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    pub cxx: ParamPlan,
    pub pinvoke: ParamPlan,
    pub csharp: ParamPlan,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultModel {
    pub cxx: ReturnPlan,
    pub csharp: ReturnPlan,
}

/// A function, method or constructor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionModel {
    /// C++ name, e.g. `f`, `operator+` or `~Foo`.
    pub name: String,
    pub full_name: String,
    /// Overload-safe identifier used for bridge symbols.
    pub id: String,
    /// Name on the managed side.
    pub managed_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rename: Option<String>,
    /// Address expression of the wrapped function.
    pub pointer: String,
    pub is_unique: bool,
    pub is_static: bool,
    pub is_const: bool,
    pub is_virtual: bool,
    pub is_abstract: bool,
    /// Overrides a method of an exported base class.
    pub is_override: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    /// Class the member was declared in, when it was inherited.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inherited_from: Option<String>,
    pub min_args: usize,
    pub max_args: usize,
    pub params: Vec<ParamModel>,
    pub result: ResultModel,
    /// Some parameter needs an `unsafe` managed context.
    pub needs_unsafe: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<Policy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrapper: Option<Wrapper>,
}

/// Trampoline that lets a managed override be reached through native
/// virtual dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallbackModel {
    /// Name of the function pointer type and of the managed delegate.
    pub name: String,
    /// Id of the virtual method it dispatches.
    pub method: String,
    /// `typedef R (*name)(void*, Args...);`
    pub typedef: String,
    /// Managed delegate declaration.
    pub delegate: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperatorModel {
    pub symbol: String,
    pub is_unary: bool,
    /// Member operator, as opposed to a free function taking the class.
    pub is_member: bool,
    /// Bridge function name: `<class>_<word>`.
    pub wrapper_name: String,
    /// Managed operator method, e.g. `operator +`.
    pub csharp_operator: String,
    pub function: FunctionModel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataMemberModel {
    pub name: String,
    pub full_name: String,
    pub is_static: bool,
    pub is_const: bool,
    pub naming: Naming,
    pub getter: ResultModel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BaseModel {
    pub name: String,
    pub naming: Naming,
}

/// Code placed around the generated bridge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Sections {
    pub include: Vec<String>,
    pub declaration_outside: Vec<String>,
    pub declaration: Vec<String>,
}

impl Sections {
    pub fn push(&mut self, section: CodeSection, code: impl Into<String>) {
        let code = code.into();
        let target = match section {
            CodeSection::Include => &mut self.include,
            CodeSection::DeclarationOutside => &mut self.declaration_outside,
            CodeSection::Declaration | CodeSection::Module => &mut self.declaration,
        };
        if !target.contains(&code) {
            target.push(code);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassModel {
    /// Fully qualified C++ name as exported.
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rename: Option<String>,
    pub module: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<String>,
    pub files: OutputFiles,
    pub naming: Naming,
    pub is_abstract: bool,
    pub is_interface: bool,
    pub is_struct: bool,
    pub sealed: bool,
    /// No public constructor and no holder: the managed class cannot be
    /// instantiated.
    pub no_init: bool,
    pub non_copyable: bool,
    pub has_destructor: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holder: Option<String>,
    pub bases: Vec<BaseModel>,
    pub bridge_bases: Vec<BaseModel>,
    pub constructors: Vec<FunctionModel>,
    pub virtual_methods: Vec<FunctionModel>,
    pub static_methods: Vec<FunctionModel>,
    pub non_virtual_methods: Vec<FunctionModel>,
    pub callbacks: Vec<CallbackModel>,
    pub operators: Vec<OperatorModel>,
    pub converters: Vec<FunctionModel>,
    /// `operator<<` onto an output stream is exported as `ToString`.
    pub has_to_string: bool,
    pub nested_classes: Vec<ClassModel>,
    pub nested_enums: Vec<EnumModel>,
    pub static_members: Vec<DataMemberModel>,
    pub non_static_members: Vec<DataMemberModel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smart_ptr: Option<SmartPointerModel>,
    /// `no_smart_ptr`: instances are handed out as raw pointers.
    pub direct_call: bool,
    pub sections: Sections,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tail: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ClassModel {
    pub fn all_diagnostics(&self) -> Vec<&Diagnostic> {
        let mut out: Vec<&Diagnostic> = self.diagnostics.iter().collect();
        for nested in &self.nested_classes {
            out.extend(nested.all_diagnostics());
        }
        out
    }

    /// Every method bucket, in emission order.
    pub fn methods(&self) -> impl Iterator<Item = &FunctionModel> {
        self.virtual_methods
            .iter()
            .chain(&self.static_methods)
            .chain(&self.non_virtual_methods)
    }

    pub fn method(&self, name: &str) -> Option<&FunctionModel> {
        self.methods().find(|m| m.name == name || m.managed_name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SmartPointerModel {
    /// The smart pointer spelled for this class.
    pub declaration: String,
    pub ref_counted: bool,
}

impl SmartPointerModel {
    pub fn new(pointer: &SmartPointer, class: &str) -> Self {
        Self {
            declaration: pointer.declaration_for(class),
            ref_counted: pointer.ref_counted,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumValueModel {
    pub name: String,
    pub full_name: String,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumModel {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rename: Option<String>,
    pub module: String,
    pub naming: Naming,
    pub is_nested: bool,
    pub values: Vec<EnumValueModel>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FreeTypesModel {
    pub holder_class: String,
    pub module: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<String>,
    pub files: OutputFiles,
    pub functions: Vec<FunctionModel>,
    pub enums: Vec<EnumModel>,
    pub constants: Vec<VariableModel>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableModel {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rename: Option<String>,
    pub module: String,
    pub is_const: bool,
    pub naming: Naming,
    pub getter: ResultModel,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeModel {
    pub section: CodeSection,
    pub code: String,
}
