//! What the visitors produce.

use serde::Serialize;

/// The names of one type or declaration in one syntax.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TypeNames {
    /// Fully qualified source form.
    pub raw: String,
    /// Without the enclosing namespaces.
    pub no_ns: String,
    /// Identifier form, usable in generated symbol names.
    pub generic: String,
    /// The form to write in the generated code.
    pub usage: String,
}

/// A local the bridge declares around the call to convert one argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarshalStep {
    /// `marshal_<param>`
    pub name: String,
    pub pre_call: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_call: Option<String>,
}

/// How one parameter crosses the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamPlan {
    pub name: String,
    /// Parameter type in the generated signature.
    pub usage: String,
    /// Expression handed to the wrapped call.
    pub argument: String,
    pub must_marshal: bool,
    pub needs_unsafe: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marshal: Option<MarshalStep>,
}

impl ParamPlan {
    pub(crate) fn direct(name: &str, usage: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            usage: usage.into(),
            argument: name.to_string(),
            must_marshal: false,
            needs_unsafe: false,
            marshal: None,
        }
    }
}

/// Conversion applied to a returned value before it crosses the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReturnConversion {
    #[default]
    None,
    /// Value types are copied to the heap and handed out as a pointer.
    CopyToHeap { class: String },
    /// Return the address of a returned reference.
    AddressOf,
    /// Reference to a value that needs no marshaling: return a copy.
    StripReference,
    /// Strings are duplicated into a C string the caller owns.
    StringDup,
    /// Enums cross as their underlying integer.
    EnumCast { target: String },
    /// Smart pointers are copied into a heap-allocated holder.
    SmartPointerAlloc { holder: String },
    /// Wrap the returned native handle in a managed object.
    WrapHandle { class: String },
}

impl ReturnConversion {
    /// The expression that converts `expr`.
    pub fn apply(&self, expr: &str) -> String {
        match self {
            Self::None | Self::StripReference => expr.to_string(),
            Self::CopyToHeap { class } => format!("new {class}({expr})"),
            Self::AddressOf => format!("&{expr}"),
            Self::StringDup => format!("strdup({expr}.c_str())"),
            Self::EnumCast { target } if target == "int" => format!("static_cast<int>({expr})"),
            Self::EnumCast { target } => format!("({target}) {expr}"),
            Self::SmartPointerAlloc { holder } => format!("new {holder}({expr})"),
            Self::WrapHandle { class } => format!("new {class}({expr})"),
        }
    }
}

/// How a result crosses the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReturnPlan {
    /// Return type of the generated function.
    pub usage: String,
    /// Return type seen by the P/Invoke declaration; same as `usage` for the
    /// native bridge.
    pub pinvoke_usage: String,
    pub conversion: ReturnConversion,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions_render_expressions() {
        assert_eq!(ReturnConversion::None.apply("r"), "r");
        assert_eq!(
            ReturnConversion::CopyToHeap {
                class: "ns::Foo".into()
            }
            .apply("self_->get()"),
            "new ns::Foo(self_->get())"
        );
        assert_eq!(ReturnConversion::StringDup.apply("r"), "strdup(r.c_str())");
        assert_eq!(
            ReturnConversion::EnumCast {
                target: "int".into()
            }
            .apply("r"),
            "static_cast<int>(r)"
        );
        assert_eq!(
            ReturnConversion::EnumCast {
                target: "ns.Color".into()
            }
            .apply("r"),
            "(ns.Color) r"
        );
        assert_eq!(ReturnConversion::AddressOf.apply("r"), "&r");
    }
}
