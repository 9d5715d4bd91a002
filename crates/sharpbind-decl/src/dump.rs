//! Import of the JSON declaration dump written by the header parser.
//!
//! ```json
//! { "declarations": [
//!     { "kind": "class", "name": "Point", "namespace": "geo",
//!       "location": { "file": "point.h", "line": 3 },
//!       "bases": [ { "name": "Shape", "access": "public" } ],
//!       "members": [
//!         { "kind": "constructor", "name": "Point", "params": [] },
//!         { "kind": "method", "name": "x", "const": true,
//!           "result": { "kind": "fundamental", "name": "double" } }
//!       ] },
//!     { "kind": "operator", "name": "==", "namespace": "geo",
//!       "result": { "kind": "fundamental", "name": "bool" },
//!       "params": [ { "kind": "reference",
//!                     "type": { "kind": "named", "name": "geo::Point", "const": true } } ] }
//! ] }
//! ```

use crate::builder::GraphBuilder;
use crate::decl::{Decl, DeclId, Visibility};
use crate::error::{GraphError, Result};
use crate::graph::DeclGraph;
use crate::operator::OperatorSymbol;
use crate::types::Type;
use indexmap::IndexMap;
use serde::Deserialize;
use sharpbind_common::SourceLocation;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct DeclDump {
    #[serde(default)]
    pub declarations: Vec<RootDump>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RootDump {
    Class(ClassDump),
    Struct(ClassDump),
    Function(FunctionDump),
    Operator(FunctionDump),
    Enum(EnumDump),
    Variable(VariableDump),
    Typedef(TypedefDump),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Common {
    pub name: String,
    pub namespace: String,
    pub location: SourceLocation,
    pub incomplete: bool,
}

#[derive(Debug, Deserialize)]
pub struct ClassDump {
    #[serde(flatten)]
    pub common: Common,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default)]
    pub access: Option<Visibility>,
    #[serde(default)]
    pub bases: Vec<BaseDump>,
    #[serde(default)]
    pub members: Vec<MemberDump>,
}

#[derive(Debug, Deserialize)]
pub struct BaseDump {
    pub name: String,
    #[serde(default)]
    pub access: Visibility,
}

#[derive(Debug, Deserialize)]
pub struct FunctionDump {
    #[serde(flatten)]
    pub common: Common,
    #[serde(default)]
    pub result: Option<TypeDump>,
    #[serde(default)]
    pub params: Vec<TypeDump>,
    #[serde(default)]
    pub throws: Option<Vec<TypeDump>>,
}

#[derive(Debug, Deserialize)]
pub struct MethodDump {
    #[serde(flatten)]
    pub function: FunctionDump,
    #[serde(default)]
    pub access: Visibility,
    #[serde(default, rename = "virtual")]
    pub is_virtual: bool,
    #[serde(default, rename = "pure")]
    pub is_pure: bool,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default, rename = "const")]
    pub is_const: bool,
}

#[derive(Debug, Deserialize)]
pub struct EnumDump {
    #[serde(flatten)]
    pub common: Common,
    #[serde(default)]
    pub access: Option<Visibility>,
    #[serde(default)]
    pub values: IndexMap<String, i64>,
}

#[derive(Debug, Deserialize)]
pub struct VariableDump {
    #[serde(flatten)]
    pub common: Common,
    #[serde(rename = "type")]
    pub ty: TypeDump,
    #[serde(default)]
    pub access: Visibility,
    #[serde(default, rename = "static")]
    pub is_static: bool,
}

#[derive(Debug, Deserialize)]
pub struct TypedefDump {
    #[serde(flatten)]
    pub common: Common,
    #[serde(rename = "type")]
    pub ty: TypeDump,
    #[serde(default)]
    pub access: Visibility,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MemberDump {
    Method(MethodDump),
    Constructor(MethodDump),
    Destructor(MethodDump),
    Operator(MethodDump),
    Converter(MethodDump),
    Field(VariableDump),
    Enum(EnumDump),
    Typedef(TypedefDump),
    Class(ClassDump),
    Struct(ClassDump),
}

#[derive(Debug, Deserialize)]
pub struct TypeDump {
    pub kind: TypeDumpKind,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "const")]
    pub is_const: bool,
    #[serde(default, rename = "volatile")]
    pub is_volatile: bool,
    #[serde(default, rename = "restricted")]
    pub is_restricted: bool,
    #[serde(default)]
    pub default: Option<String>,
    /// Pointee, referent or element type.
    #[serde(default, rename = "type")]
    pub inner: Option<Box<TypeDump>>,
    #[serde(default)]
    pub min: Option<String>,
    #[serde(default)]
    pub max: Option<String>,
    #[serde(default)]
    pub result: Option<Box<TypeDump>>,
    #[serde(default)]
    pub params: Vec<TypeDump>,
    #[serde(default)]
    pub class: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeDumpKind {
    Fundamental,
    Named,
    Reference,
    Pointer,
    Array,
    Function,
    Method,
}

impl TypeDump {
    pub fn to_type(&self) -> Result<Type> {
        let inner = || -> Result<Type> {
            match &self.inner {
                Some(inner) => inner.to_type(),
                None => Err(GraphError::InvalidDump(format!(
                    "{:?} type without an inner `type`",
                    self.kind
                ))),
            }
        };
        let result = || -> Result<Type> {
            match &self.result {
                Some(result) => result.to_type(),
                None => Ok(Type::fundamental("void")),
            }
        };
        let params = || -> Result<Vec<Type>> { self.params.iter().map(TypeDump::to_type).collect() };

        let mut ty = match self.kind {
            TypeDumpKind::Fundamental => Type::fundamental(&self.name),
            TypeDumpKind::Named => Type::named(&self.name),
            TypeDumpKind::Reference => Type::reference_to(inner()?),
            TypeDumpKind::Pointer => Type::pointer_to(inner()?),
            TypeDumpKind::Array => {
                Type::array_of(inner()?, self.min.as_deref(), self.max.as_deref())
            }
            TypeDumpKind::Function => Type::function(result()?, params()?),
            TypeDumpKind::Method => {
                let class = self.class.as_deref().ok_or_else(|| {
                    GraphError::InvalidDump("method pointer type without a `class`".into())
                })?;
                Type::method_pointer(result()?, params()?, class)
            }
        };
        ty.is_const |= self.is_const;
        ty.is_volatile |= self.is_volatile;
        ty.is_restricted |= self.is_restricted;
        if let Some(default) = &self.default {
            ty = ty.with_default(default.as_str());
        }
        Ok(ty)
    }
}

fn types(dumps: &[TypeDump]) -> Result<Vec<Type>> {
    dumps.iter().map(TypeDump::to_type).collect()
}

fn parse_operator(name: &str) -> Result<OperatorSymbol> {
    let symbol = name.trim().trim_start_matches("operator");
    OperatorSymbol::parse(symbol).ok_or_else(|| GraphError::UnknownOperator(name.to_string()))
}

impl FunctionDump {
    fn result_type(&self) -> Result<Type> {
        match &self.result {
            Some(result) => result.to_type(),
            None => Ok(Type::fundamental("void")),
        }
    }

    fn finish(&self, decl: Decl) -> Result<Decl> {
        let decl = decl.at(&self.common.location.file, self.common.location.line);
        match &self.throws {
            Some(throws) => Ok(decl.with_throws(types(throws)?)),
            None => Ok(decl),
        }
    }
}

impl DeclDump {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build and resolve the graph.
    pub fn into_graph(self) -> Result<DeclGraph> {
        let mut builder = GraphBuilder::new();
        for root in &self.declarations {
            add_root(&mut builder, root)?;
        }
        builder.finish()
    }
}

fn with_common(decl: Decl, common: &Common) -> Decl {
    let decl = decl.at(&common.location.file, common.location.line);
    if common.incomplete {
        decl.with_incomplete()
    } else {
        decl
    }
}

fn add_root(builder: &mut GraphBuilder, root: &RootDump) -> Result<()> {
    match root {
        RootDump::Class(class) => add_class(builder, class, None, false),
        RootDump::Struct(class) => add_class(builder, class, None, true),
        RootDump::Function(f) => {
            let decl = Decl::function(
                &f.common.namespace,
                &f.common.name,
                f.result_type()?,
                types(&f.params)?,
            );
            builder.add_root(f.finish(decl)?);
            Ok(())
        }
        RootDump::Operator(f) => {
            let decl = Decl::operator(
                &f.common.namespace,
                parse_operator(&f.common.name)?,
                f.result_type()?,
                types(&f.params)?,
            );
            builder.add_root(f.finish(decl)?);
            Ok(())
        }
        RootDump::Enum(e) => {
            builder.add_root(enum_decl(e));
            Ok(())
        }
        RootDump::Variable(v) => {
            let decl = Decl::variable(&v.common.namespace, &v.common.name, v.ty.to_type()?);
            builder.add_root(with_common(decl, &v.common));
            Ok(())
        }
        RootDump::Typedef(t) => {
            let decl = Decl::typedef(&t.common.namespace, &t.common.name, t.ty.to_type()?);
            builder.add_root(with_common(decl, &t.common));
            Ok(())
        }
    }
}

fn enum_decl(e: &EnumDump) -> Decl {
    let decl = Decl::enumeration(
        &e.common.namespace,
        &e.common.name,
        e.values.iter().map(|(k, v)| (k.as_str(), *v)),
    );
    let decl = with_common(decl, &e.common);
    match e.access {
        Some(access) => decl.with_visibility(access),
        None => decl,
    }
}

fn add_class(
    builder: &mut GraphBuilder,
    dump: &ClassDump,
    owner: Option<DeclId>,
    is_struct: bool,
) -> Result<()> {
    let mut decl = with_common(Decl::class(&dump.common.namespace, &dump.common.name), &dump.common);
    if dump.is_abstract {
        decl = decl.with_abstract();
    }
    if let Some(class) = decl.as_class_mut() {
        class.is_struct = is_struct;
    }
    let id = match owner {
        Some(owner) => {
            let visibility = dump.access.unwrap_or(Visibility::Public);
            builder.add_member(owner, decl.with_visibility(visibility))?
        }
        None => builder.add_root(decl),
    };

    for base in &dump.bases {
        builder.add_base(id, &base.name, base.access);
    }
    for member in &dump.members {
        add_member(builder, id, member)?;
    }
    Ok(())
}

fn method_decl(m: &MethodDump, decl: Decl) -> Result<Decl> {
    let mut decl = m.function.finish(decl)?.with_visibility(m.access);
    if m.is_virtual || m.is_pure {
        decl = decl.with_virtual(m.is_pure);
    }
    if m.is_static {
        decl = decl.with_static();
    }
    if m.is_const {
        decl = decl.with_const();
    }
    Ok(decl)
}

fn add_member(builder: &mut GraphBuilder, class: DeclId, member: &MemberDump) -> Result<()> {
    let decl = match member {
        MemberDump::Method(m) => {
            let f = &m.function;
            method_decl(
                m,
                Decl::method(&f.common.name, f.result_type()?, types(&f.params)?),
            )?
        }
        MemberDump::Constructor(m) => {
            let f = &m.function;
            method_decl(m, Decl::constructor(&f.common.name, types(&f.params)?))?
        }
        MemberDump::Destructor(m) => method_decl(m, Decl::destructor(&m.function.common.name))?,
        MemberDump::Operator(m) => {
            let f = &m.function;
            method_decl(
                m,
                Decl::class_operator(
                    parse_operator(&f.common.name)?,
                    f.result_type()?,
                    types(&f.params)?,
                ),
            )?
        }
        MemberDump::Converter(m) => {
            method_decl(m, Decl::converter(m.function.result_type()?))?
        }
        MemberDump::Field(v) => {
            let mut decl = with_common(Decl::field(&v.common.name, v.ty.to_type()?), &v.common)
                .with_visibility(v.access);
            if v.is_static {
                decl = decl.with_static();
            }
            decl
        }
        MemberDump::Enum(e) => enum_decl(e),
        MemberDump::Typedef(t) => with_common(
            Decl::typedef("", &t.common.name, t.ty.to_type()?),
            &t.common,
        )
        .with_visibility(t.access),
        MemberDump::Class(nested) => return add_class(builder, nested, Some(class), false),
        MemberDump::Struct(nested) => return add_class(builder, nested, Some(class), true),
    };
    builder.add_member(class, decl)?;
    Ok(())
}

impl DeclGraph {
    /// Parse a JSON declaration dump and resolve it into a graph.
    pub fn from_json_str(json: &str) -> Result<Self> {
        DeclDump::from_json_str(json)?.into_graph()
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }
}
