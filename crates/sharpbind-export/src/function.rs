//! Function, parameter and result models, built with both visitors.

use crate::model::{FunctionModel, Naming, ParamModel, ResultModel};
use crate::policy::{DeclInfo, Policy};
use sharpbind_common::Diagnostic;
use sharpbind_decl::{Decl, MethodKind, Type};
use sharpbind_visit::{
    CSharpVisitor, ClassifyError, Classifier, CxxVisitor, ReturnConversion, ReturnPlan,
};

/// Per-call choices the exporter makes about one function.
#[derive(Debug, Clone, Default)]
pub(crate) struct FunctionOptions<'i> {
    pub info: Option<&'i DeclInfo>,
    /// Overrides `info.rename`, used for `add_method` entries.
    pub rename: Option<String>,
    pub is_override: bool,
    pub inherited_from: Option<String>,
    /// Free functions gathered into a class are static on the managed side.
    pub force_static: bool,
}

pub(crate) struct Visitors<'a, 'g> {
    pub cxx: CxxVisitor<'a, 'g>,
    pub csharp: CSharpVisitor<'a, 'g>,
}

impl<'a, 'g> Visitors<'a, 'g> {
    pub fn new(classifier: &'a Classifier<'g>) -> Self {
        Self {
            cxx: CxxVisitor::new(classifier),
            csharp: CSharpVisitor::new(classifier),
        }
    }

    pub fn decl_naming(&self, decl: &Decl) -> Naming {
        Naming {
            cxx: self.cxx.decl_names(decl),
            csharp: self.csharp.decl_names(decl),
        }
    }

    pub fn type_naming(&self, ty: &Type) -> Result<Naming, ClassifyError> {
        Ok(Naming {
            cxx: self.cxx.names(ty)?,
            csharp: self.csharp.names(ty)?,
        })
    }

    pub fn empty_result(&self) -> ResultModel {
        let void = ReturnPlan {
            usage: "void".to_string(),
            pinvoke_usage: "void".to_string(),
            conversion: ReturnConversion::None,
        };
        ResultModel {
            cxx: void.clone(),
            csharp: void,
        }
    }

    /// How a result crosses the boundary under `policy`.
    pub fn result(
        &self,
        ty: Option<&Type>,
        policy: Option<Policy>,
    ) -> Result<ResultModel, ClassifyError> {
        let mut cxx = self.cxx.ret(ty)?;
        let csharp = self.csharp.ret(ty)?;
        let returns_reference = ty.is_some_and(Type::is_reference);
        if returns_reference
            && policy.is_some_and(Policy::returns_existing)
            && matches!(cxx.conversion, ReturnConversion::CopyToHeap { .. })
        {
            cxx.conversion = ReturnConversion::AddressOf;
        }
        Ok(ResultModel { cxx, csharp })
    }

    pub fn function(
        &self,
        decl: &Decl,
        options: FunctionOptions<'_>,
    ) -> Result<FunctionModel, ClassifyError> {
        let Some(function) = decl.as_function() else {
            return Err(ClassifyError::UnsupportedType(decl.full_name()));
        };
        let method = decl.as_method();
        let policy = options.info.and_then(|info| info.policy);

        let mut params = Vec::with_capacity(function.params.len());
        for param in &function.params {
            let name = param.name.as_str();
            params.push(ParamModel {
                name: name.to_string(),
                default: param.ty.default.as_ref().map(|d| d.to_string()),
                cxx: self.cxx.param(&param.ty, name)?,
                pinvoke: self.csharp.pinvoke_param(&param.ty, name)?,
                csharp: self.csharp.param(&param.ty, name)?,
            });
        }
        let result = match method.map(|m| &m.kind) {
            Some(MethodKind::Constructor | MethodKind::Destructor) => self.result(None, None)?,
            _ => self.result(function.result.as_ref(), policy)?,
        };
        let needs_unsafe = params
            .iter()
            .any(|p| p.csharp.needs_unsafe || p.pinvoke.needs_unsafe);

        let rename = options
            .rename
            .or_else(|| options.info.and_then(|info| info.rename.clone()));
        let wrapper = options.info.and_then(|info| info.wrapper.clone());
        let name = decl.cxx_name();
        let pointer = match &wrapper {
            Some(wrapper) => format!("&{}", wrapper.name),
            None => decl.pointer_declaration(false),
        };

        Ok(FunctionModel {
            managed_name: rename.clone().unwrap_or_else(|| name.clone()),
            name,
            full_name: decl.full_name(),
            id: decl.id(),
            rename,
            pointer,
            is_unique: decl.is_unique,
            is_static: options.force_static || method.is_some_and(|m| m.is_static),
            is_const: method.is_some_and(|m| m.is_const),
            is_virtual: method.is_some_and(|m| m.is_virtual),
            is_abstract: method.is_some_and(|m| m.is_abstract),
            is_override: options.is_override,
            visibility: method.map(|m| m.visibility),
            inherited_from: options.inherited_from,
            min_args: function.min_args(),
            max_args: function.max_args(),
            params,
            result,
            needs_unsafe,
            policy,
            wrapper,
        })
    }
}

/// The diagnostic reported when a declaration is skipped.
pub(crate) fn skipped(decl: &Decl, err: &ClassifyError) -> Diagnostic {
    tracing::warn!(decl = %decl.full_name(), %err, "skipping declaration");
    Diagnostic::warning(decl.full_name(), err.to_string())
        .with_location(&decl.location)
        .with_help(format!(
            "exclude `{}` in the interface file or provide a wrapper",
            decl.cxx_name()
        ))
}
