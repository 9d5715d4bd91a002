//! Interface files: which declarations to export and how.
//!
//! An interface file is TOML. Every entry names a declaration and carries the
//! per-declaration options of [`DeclInfo`]; options for the members of a
//! class nest under `members.<name>` and `operators."<symbol>"`.
//!
//! ```toml
//! module = "geo"
//! include = "geo/point.h"
//!
//! [[reference_type]]
//! name = "geo::Point"
//! use_shared_ptr = true
//!
//! [reference_type.members.area]
//! policy = { return_value_policy = "copy_const_reference" }
//!
//! [reference_type.operators."<<"]
//! exclude = true
//! ```

use crate::error::ConfigError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sharpbind_common::make_id;
use sharpbind_decl::Decl;
use std::path::{Path, PathBuf};

/// Call policy for a function or method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    ReturnInternalReference,
    WithCustodianAndWard,
    ReturnValuePolicy(ReturnValuePolicy),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnValuePolicy {
    ReferenceExistingObject,
    CopyConstReference,
    CopyNonConstReference,
    ReturnOpaquePointer,
    ManageNewObject,
}

impl Policy {
    /// Whether a returned reference is handed out as is instead of copied.
    pub fn returns_existing(self) -> bool {
        matches!(
            self,
            Self::ReturnInternalReference
                | Self::ReturnValuePolicy(ReturnValuePolicy::ReferenceExistingObject)
        )
    }

    pub fn is_opaque_pointer(self) -> bool {
        self == Self::ReturnValuePolicy(ReturnValuePolicy::ReturnOpaquePointer)
    }
}

/// A hand-written function exported in place of the declared one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WrapperSpec")]
pub struct Wrapper {
    pub name: String,
    /// Definition of the wrapper, emitted before the bridge functions.
    pub code: Option<String>,
}

/// `wrapper = "name"` or `wrapper = { name = "...", code = "..." }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum WrapperSpec {
    Name(String),
    Full { name: String, code: Option<String> },
}

impl From<WrapperSpec> for Wrapper {
    fn from(spec: WrapperSpec) -> Self {
        match spec {
            WrapperSpec::Name(name) => Self { name, code: None },
            WrapperSpec::Full { name, code } => Self { name, code },
        }
    }
}

/// A function exported as if it were a method of the class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddedMethod {
    /// Fully qualified name of the function or method to add.
    pub name: String,
    #[serde(default)]
    pub rename: Option<String>,
}

/// Smart pointer a class is held by on the managed side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SmartPointer {
    /// Declaration with `%s` standing for the class, e.g.
    /// `boost::shared_ptr< %s >`.
    pub decl: String,
    pub ref_counted: bool,
}

impl SmartPointer {
    pub fn declaration_for(&self, class: &str) -> String {
        self.decl.replace("%s", class)
    }
}

/// Options for one declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeclInfo {
    pub exclude: bool,
    pub rename: Option<String>,
    pub policy: Option<Policy>,
    pub wrapper: Option<Wrapper>,
    /// Managed code cannot override this virtual method.
    pub no_override: bool,

    pub smart_ptr: bool,
    pub ref_counted: bool,
    pub smart_ptr_decl: Option<String>,
    pub use_shared_ptr: bool,
    pub use_auto_ptr: bool,
    pub no_smart_ptr: bool,
    /// Factory function used to create instances when the class has no
    /// public constructor.
    pub holder: Option<String>,
    pub add_method: Vec<AddedMethod>,
    pub sealed: bool,

    /// Options for members, keyed by unqualified or fully qualified name.
    pub members: IndexMap<String, DeclInfo>,
    /// Options for operators, keyed by symbol (`"+"`, `"<<"`) or, for
    /// conversion operators, by the full name of the result type.
    pub operators: IndexMap<String, DeclInfo>,
}

const SHARED_PTR: &str = "boost::shared_ptr< %s >";
const AUTO_PTR: &str = "std::auto_ptr< %s >";

impl DeclInfo {
    pub fn excluded() -> Self {
        Self {
            exclude: true,
            ..Self::default()
        }
    }

    pub fn renamed(name: impl Into<String>) -> Self {
        Self {
            rename: Some(name.into()),
            ..Self::default()
        }
    }

    /// Options for a member of the class this info describes.
    pub fn member(&self, decl: &Decl) -> Option<&DeclInfo> {
        let name = decl.cxx_name();
        self.members
            .get(decl.name.as_str())
            .or_else(|| self.members.get(&name))
            .or_else(|| self.members.get(&decl.full_name()))
    }

    pub fn is_member_excluded(&self, decl: &Decl) -> bool {
        self.member(decl).is_some_and(|info| info.exclude)
    }

    pub fn operator(&self, key: &str) -> Option<&DeclInfo> {
        self.operators.get(key)
    }

    /// The smart pointer configured by `smart_ptr`, `use_shared_ptr` or
    /// `use_auto_ptr`. `no_smart_ptr` wins over all of them.
    pub fn smart_pointer(&self) -> Option<SmartPointer> {
        if self.no_smart_ptr {
            return None;
        }
        if self.use_shared_ptr {
            return Some(SmartPointer {
                decl: SHARED_PTR.to_string(),
                ref_counted: true,
            });
        }
        if self.use_auto_ptr {
            return Some(SmartPointer {
                decl: AUTO_PTR.to_string(),
                ref_counted: true,
            });
        }
        self.smart_ptr.then(|| SmartPointer {
            decl: self
                .smart_ptr_decl
                .clone()
                .unwrap_or_else(|| SHARED_PTR.to_string()),
            ref_counted: self.ref_counted,
        })
    }
}

/// `[[reference_type]]`: a class exported as a managed reference type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassEntry {
    pub name: String,
    #[serde(default)]
    pub include: Option<String>,
    /// Code appended after the parsed headers to force a template
    /// instantiation.
    #[serde(default)]
    pub tail: Option<String>,
    #[serde(flatten)]
    pub info: DeclInfo,
}

impl ClassEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_info(mut self, info: DeclInfo) -> Self {
        self.info = info;
        self
    }
}

/// `[[template]]`: a class template and the instantiations to export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateEntry {
    pub name: String,
    #[serde(default)]
    pub include: Option<String>,
    #[serde(default)]
    pub instantiate: Vec<Instantiation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instantiation {
    pub types: Vec<String>,
    /// Extra headers the instantiation needs.
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(flatten)]
    pub info: DeclInfo,
}

impl TemplateEntry {
    /// One class entry per instantiation.
    pub fn instances(&self) -> Vec<ClassEntry> {
        self.instantiate
            .iter()
            .map(|inst| {
                let generic = generic_name(&self.name, &inst.types);
                let mut tail: String = inst
                    .headers
                    .iter()
                    .map(|h| format!("#include <{h}>\n"))
                    .collect();
                tail.push_str(&format!(
                    "typedef {}< {} > {generic};\nvoid __instantiate_{generic}()\n{{ sizeof({generic}); }}\n",
                    self.name,
                    inst.types.join(", ")
                ));
                let mut info = inst.info.clone();
                info.rename.get_or_insert(generic);
                ClassEntry {
                    name: instance_name(&self.name, &inst.types),
                    include: self.include.clone(),
                    tail: Some(tail),
                    info,
                }
            })
            .collect()
    }
}

/// `std::map` with `int, double` becomes `std_map_int_double`.
pub fn generic_name(template: &str, types: &[String]) -> String {
    let mut parts = vec![template.replace("::", "_")];
    parts.extend(types.iter().cloned());
    make_id(&parts.join("_"))
}

/// The spelling the declaration dump uses for an instantiation:
/// `ns::Pair<int,std::vector<int> >`.
pub fn instance_name(template: &str, types: &[String]) -> String {
    let spelled = format!("{template}<{}>", types.join(","));
    let mut name = String::with_capacity(spelled.len());
    let mut pending_space = false;
    for c in spelled.chars() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        // Whitespace only survives between two identifier characters.
        if pending_space && is_ident_char(c) && name.chars().last().is_some_and(is_ident_char) {
            name.push(' ');
        }
        pending_space = false;
        name.push(c);
    }
    // Twice, for runs of three or more.
    name.replace(">>", "> >").replace(">>", "> >")
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// `[[free_types]]`: free functions, enums and constants gathered into one
/// managed class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreeTypesEntry {
    pub holder_class: String,
    pub include: Option<String>,
    pub functions: Vec<String>,
    pub enums: Vec<String>,
    pub constants: Vec<String>,
    /// Options keyed by the names listed above.
    pub members: IndexMap<String, DeclInfo>,
}

impl FreeTypesEntry {
    pub fn member(&self, name: &str) -> Option<&DeclInfo> {
        self.members.get(name)
    }
}

/// `[[enum]]` and `[[var]]`: a single enumeration or global variable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamedEntry {
    pub name: String,
    #[serde(default)]
    pub include: Option<String>,
    #[serde(flatten)]
    pub info: DeclInfo,
}

/// `[[header]]`: everything declared in one header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeaderEntry {
    pub include: String,
    /// Options keyed by the full name of the declarations found.
    #[serde(default)]
    pub members: IndexMap<String, DeclInfo>,
}

/// Emission section verbatim code goes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CodeSection {
    Include,
    DeclarationOutside,
    Declaration,
    Module,
}

/// `[[code]]`: verbatim code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeEntry {
    pub section: CodeSection,
    pub code: String,
}

/// One interface file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterfaceFile {
    /// Managed module the declarations go into.
    #[serde(default)]
    pub module: Option<String>,
    /// Header entries without their own `include` come from.
    #[serde(default)]
    pub include: Option<String>,
    /// Other interface files this one depends on, by file name.
    #[serde(default)]
    pub import: Vec<String>,

    #[serde(rename = "reference_type", default)]
    pub classes: Vec<ClassEntry>,
    #[serde(rename = "template", default)]
    pub templates: Vec<TemplateEntry>,
    #[serde(default)]
    pub free_types: Vec<FreeTypesEntry>,
    #[serde(rename = "enum", default)]
    pub enums: Vec<NamedEntry>,
    #[serde(rename = "var", default)]
    pub vars: Vec<NamedEntry>,
    #[serde(rename = "header", default)]
    pub headers: Vec<HeaderEntry>,
    #[serde(default)]
    pub code: Vec<CodeEntry>,
}

impl InterfaceFile {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Every class to export, template instantiations included.
    pub fn all_classes(&self) -> Vec<ClassEntry> {
        let mut classes = self.classes.clone();
        classes.extend(self.templates.iter().flat_map(TemplateEntry::instances));
        classes
    }
}

/// An interface file together with where it was loaded from.
#[derive(Debug, Clone, PartialEq)]
pub struct Interface {
    pub path: PathBuf,
    pub file: InterfaceFile,
}

impl Interface {
    pub fn new(path: impl Into<PathBuf>, file: InterfaceFile) -> Self {
        Self {
            path: path.into(),
            file,
        }
    }

    /// Load an interface from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file = InterfaceFile::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded interface");
        Ok(Self::new(path, file))
    }

    /// File name imports refer to this interface by.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
