//! Class exporter.
//!
//! Exporting a class runs a fixed pipeline over an overlay of its members:
//!
//! 1. inherit members of bases that are not exported themselves
//! 2. honor `no_override`
//! 3. bases and bridge bases
//! 4. constructors
//! 5. virtual, static and non-virtual methods, plus `add_method`
//! 6. callbacks for virtual methods managed code may override
//! 7. operators and converters
//! 8. nested classes and enums
//! 9. smart pointer, opaque pointer policies and data members
//!
//! The overlay holds copies of the members retagged to the exported class.
//! The declaration graph itself is shared by every exporter and never
//! changes.

use crate::enums::enum_model;
use crate::error::{ExportError, Result};
use crate::function::{skipped, FunctionOptions, Visitors};
use crate::model::{
    BaseModel, CallbackModel, ClassModel, DataMemberModel, FunctionModel, OperatorModel,
    OutputFiles, Sections, SmartPointerModel,
};
use crate::names::ExportedNames;
use crate::policy::{ClassEntry, CodeSection, DeclInfo};
use rustc_hash::{FxHashMap, FxHashSet};
use sharpbind_decl::{
    Base, Class, Decl, DeclGraph, DeclId, DeclKind, MethodKind, OperatorSymbol, Type,
};
use sharpbind_visit::{ClassifyError, Classifier};
use smol_str::SmolStr;

/// Exports one class, recursing into its nested classes.
pub struct ClassExporter<'a, 'g> {
    graph: &'g DeclGraph,
    classifier: &'a Classifier<'g>,
    entry: &'a ClassEntry,
    module: &'a str,
}

/// A member as the exported class sees it.
#[derive(Debug, Clone)]
struct OverlayMember {
    decl: Decl,
    /// The declaration in the graph this member was copied from.
    source: DeclId,
    /// Base class the member was flattened from.
    inherited_from: Option<DeclId>,
}

impl OverlayMember {
    fn is_plain_method(&self) -> bool {
        self.decl.as_method().is_some_and(|m| m.is_plain())
    }

    fn is_virtual(&self) -> bool {
        self.is_plain_method() && self.decl.as_method().is_some_and(|m| m.is_virtual)
    }

    fn method_kind(&self) -> Option<MethodKind> {
        self.decl.as_method().map(|m| m.kind)
    }
}

/// Members a derived class can pick up from a base.
fn inheritable(decl: &Decl) -> bool {
    match &decl.kind {
        DeclKind::Method(m) => m.is_plain(),
        DeclKind::Variable(v) => v.field.is_some(),
        DeclKind::Class(_) | DeclKind::Enumeration(_) => true,
        DeclKind::Function(_) | DeclKind::Typedef(_) => false,
    }
}

/// Members that take part in the export at all.
fn exportable(decl: &Decl) -> bool {
    match &decl.kind {
        DeclKind::Method(_) | DeclKind::Class(_) | DeclKind::Enumeration(_) => true,
        DeclKind::Variable(v) => v.field.is_some(),
        DeclKind::Function(_) | DeclKind::Typedef(_) => false,
    }
}

fn mentions_stream(ty: &Type) -> bool {
    let name = ty.qualified_name();
    name.contains("basic_ostream") || name == "std::ostream"
}

fn operator_symbol(decl: &Decl) -> Option<OperatorSymbol> {
    match decl.as_method().map(|m| m.kind) {
        Some(MethodKind::Operator(sym)) => Some(sym),
        _ => decl.as_function().and_then(|f| f.operator),
    }
}

/// Sort key that puts classes after their bases.
pub fn order_key(graph: &DeclGraph, entry: &ClassEntry) -> (usize, String) {
    let bases = graph
        .lookup(&entry.name)
        .ok()
        .and_then(|id| graph.class(graph.resolve_typedef(id)))
        .map_or(0, |class| class.all_bases().count());
    (bases, entry.name.clone())
}

impl<'a, 'g> ClassExporter<'a, 'g> {
    pub fn new(classifier: &'a Classifier<'g>, entry: &'a ClassEntry, module: &'a str) -> Self {
        Self {
            graph: classifier.graph(),
            classifier,
            entry,
            module,
        }
    }

    /// Export the class. `None` when it is excluded.
    #[tracing::instrument(skip_all, fields(class = %self.entry.name))]
    pub fn export(&self, names: &mut ExportedNames) -> Result<Option<ClassModel>> {
        if self.entry.info.exclude {
            tracing::debug!("class excluded");
            return Ok(None);
        }
        let (id, rename) = self.resolve()?;
        let mut pipeline = Pipeline::new(self, id, rename)?;

        pipeline.inherit_members(names);
        pipeline.make_non_virtual();
        pipeline.export_bases(names);
        pipeline.export_constructors();
        pipeline.export_methods(names)?;
        pipeline.export_callbacks();
        pipeline.export_operators();
        pipeline.export_nested(names)?;
        pipeline.export_smart_pointer();
        pipeline.export_opaque_pointer_policies();
        pipeline.export_data_members();

        names.insert(self.entry.name.as_str());
        names.insert(pipeline.decl.full_name());
        Ok(Some(pipeline.model))
    }

    /// The class the entry names. A typedef exports its underlying class
    /// under the typedef's name.
    fn resolve(&self) -> Result<(DeclId, Option<String>)> {
        let id = self.graph.lookup(&self.entry.name)?;
        let decl = self.graph.get(id);
        let mut rename = self.entry.info.rename.clone();
        let target = if decl.as_typedef().is_some() {
            let target = self.graph.resolve_typedef(id);
            rename.get_or_insert_with(|| decl.name.to_string());
            target
        } else {
            id
        };
        Ok((target, rename))
    }
}

struct Pipeline<'e, 'a, 'g> {
    exporter: &'e ClassExporter<'a, 'g>,
    graph: &'g DeclGraph,
    visitors: Visitors<'a, 'g>,
    info: &'a DeclInfo,
    id: DeclId,
    decl: &'g Decl,
    class: &'g Class,
    path: Vec<SmolStr>,
    overlay: Vec<OverlayMember>,
    /// Indices into `overlay` of the public members of exportable kinds.
    public: Vec<usize>,
    model: ClassModel,
}

impl<'e, 'a, 'g> Pipeline<'e, 'a, 'g> {
    fn new(
        exporter: &'e ClassExporter<'a, 'g>,
        id: DeclId,
        rename: Option<String>,
    ) -> Result<Self> {
        let graph = exporter.graph;
        let decl = graph.get(id);
        let class = decl
            .as_class()
            .ok_or_else(|| ExportError::NotAClass(decl.full_name()))?;
        let visitors = Visitors::new(exporter.classifier);
        let info = &exporter.entry.info;
        let mut path = decl.scope.clone();
        path.push(decl.name.clone());

        let model = ClassModel {
            name: decl.full_name(),
            rename,
            module: exporter.module.to_string(),
            include: exporter.entry.include.clone(),
            files: OutputFiles::for_path(&path),
            naming: visitors.decl_naming(decl),
            is_abstract: class.is_abstract,
            is_interface: graph.is_interface(id),
            is_struct: class.is_struct,
            sealed: info.sealed,
            no_init: false,
            non_copyable: false,
            has_destructor: false,
            holder: info.holder.clone(),
            bases: Vec::new(),
            bridge_bases: Vec::new(),
            constructors: Vec::new(),
            virtual_methods: Vec::new(),
            static_methods: Vec::new(),
            non_virtual_methods: Vec::new(),
            callbacks: Vec::new(),
            operators: Vec::new(),
            converters: Vec::new(),
            has_to_string: false,
            nested_classes: Vec::new(),
            nested_enums: Vec::new(),
            static_members: Vec::new(),
            non_static_members: Vec::new(),
            smart_ptr: None,
            direct_call: info.no_smart_ptr,
            sections: Sections::default(),
            tail: exporter.entry.tail.clone(),
            diagnostics: Vec::new(),
        };

        Ok(Self {
            exporter,
            graph,
            visitors,
            info,
            id,
            decl,
            class,
            path,
            overlay: Vec::new(),
            public: Vec::new(),
            model,
        })
    }

    fn full_name(&self, id: DeclId) -> String {
        self.graph.get(id).full_name()
    }

    fn is_exported(&self, names: &ExportedNames, base: &Base) -> bool {
        names.contains(&self.full_name(base.class))
    }

    fn has_virtual_methods(&self) -> bool {
        self.overlay.iter().any(OverlayMember::is_virtual)
    }

    /// Build a function model, or record why the member was skipped.
    fn function(&mut self, decl: &Decl, options: FunctionOptions<'_>) -> Option<FunctionModel> {
        match self.visitors.function(decl, options) {
            Ok(model) => {
                if let Some(code) = model.wrapper.as_ref().and_then(|w| w.code.clone()) {
                    self.model.sections.push(CodeSection::Declaration, code);
                }
                Some(model)
            }
            Err(err) => {
                self.model.diagnostics.push(skipped(decl, &err));
                None
            }
        }
    }

    fn inherit_members(&mut self, names: &ExportedNames) {
        let own: Vec<OverlayMember> = self
            .graph
            .members(self.id)
            .map(|(id, decl)| OverlayMember {
                decl: decl.clone(),
                source: id,
                inherited_from: None,
            })
            .collect();
        let own_names: FxHashSet<String> = own.iter().map(|m| m.decl.full_name()).collect();
        let mut signatures: FxHashSet<String> = own
            .iter()
            .filter(|m| m.decl.as_method().is_some())
            .map(|m| m.decl.pointer_declaration(true))
            .collect();
        let mut inherited_names = FxHashSet::default();
        self.overlay = own;

        for level in &self.class.hierarchy {
            let mut level_exported = false;
            for base in level {
                if self.is_exported(names, base) {
                    level_exported = true;
                    continue;
                }
                for (source, member) in self.graph.members(base.class) {
                    if !inheritable(member) {
                        continue;
                    }
                    let copy = member.retagged(&self.path);
                    if self.info.is_member_excluded(&copy) {
                        tracing::trace!(member = %copy.full_name(), "inherited member excluded");
                        continue;
                    }
                    let full_name = copy.full_name();
                    if own_names.contains(&full_name) {
                        continue;
                    }
                    let fresh = if copy.as_method().is_some() {
                        signatures.insert(copy.pointer_declaration(true))
                    } else {
                        inherited_names.insert(full_name)
                    };
                    if fresh {
                        self.overlay.push(OverlayMember {
                            decl: copy,
                            source,
                            inherited_from: Some(base.class),
                        });
                    }
                }
            }
            if level_exported {
                break;
            }
        }

        let mut counts: FxHashMap<String, usize> = FxHashMap::default();
        for member in self.overlay.iter().filter(|m| m.decl.as_function().is_some()) {
            *counts.entry(member.decl.full_name()).or_default() += 1;
        }
        for member in &mut self.overlay {
            if member.decl.as_function().is_some() {
                member.decl.is_unique = counts.get(&member.decl.full_name()) == Some(&1);
            }
        }

        self.public = self
            .overlay
            .iter()
            .enumerate()
            .filter(|(_, m)| exportable(&m.decl) && m.decl.is_public())
            .map(|(i, _)| i)
            .collect();
        tracing::debug!(
            members = self.overlay.len(),
            public = self.public.len(),
            "inherited members"
        );
    }

    fn make_non_virtual(&mut self) {
        for member in &mut self.overlay {
            if !member.is_virtual() {
                continue;
            }
            let no_override = self
                .info
                .member(&member.decl)
                .is_some_and(|info| info.no_override);
            if no_override {
                if let Some(method) = member.decl.as_method_mut() {
                    method.is_virtual = false;
                }
            }
        }
    }

    fn base_model(&self, base: &Base) -> BaseModel {
        let decl = self.graph.get(base.class);
        BaseModel {
            name: decl.full_name(),
            naming: self.visitors.decl_naming(decl),
        }
    }

    fn export_bases(&mut self, names: &ExportedNames) {
        let mut bases = Vec::new();
        for level in &self.class.hierarchy {
            bases = level
                .iter()
                .filter(|b| b.visibility.is_public() && self.is_exported(names, b))
                .copied()
                .collect();
            if !bases.is_empty() {
                break;
            }
        }
        if self.has_virtual_methods() {
            self.model.bridge_bases = bases
                .iter()
                .filter(|b| self.graph.has_virtual_methods(b.class))
                .map(|b| self.base_model(b))
                .collect();
        }
        self.model.bases = bases.iter().map(|b| self.base_model(b)).collect();
        tracing::debug!(bases = self.model.bases.len(), "exported bases");
    }

    fn export_constructors(&mut self) {
        let mut constructors: Vec<Decl> = self
            .public
            .iter()
            .map(|&i| &self.overlay[i])
            .filter(|m| m.method_kind() == Some(MethodKind::Constructor))
            .map(|m| m.decl.clone())
            .collect();
        let is_copy = |decl: &Decl, path: &[SmolStr]| {
            decl.as_method().is_some_and(|m| m.is_copy_constructor(path))
        };
        let has_copy = constructors.iter().any(|c| is_copy(c, &self.path));
        if self.class.is_abstract {
            if let Some(pos) = constructors.iter().position(|c| is_copy(c, &self.path)) {
                constructors.remove(pos);
            }
        }

        let class_info = self.info;
        for ctor in &constructors {
            let info = class_info.member(ctor);
            if let Some(model) = self.function(
                ctor,
                FunctionOptions {
                    info,
                    ..FunctionOptions::default()
                },
            ) {
                self.model.constructors.push(model);
            }
        }
        self.model.no_init = self.model.constructors.is_empty() && self.info.holder.is_none();
        self.model.non_copyable = !has_copy || self.class.is_abstract;
        self.model.has_destructor = self.public.iter().any(|&i| {
            self.overlay[i].method_kind() == Some(MethodKind::Destructor)
        });
    }

    /// Whether `decl` overrides a virtual method of an exported base.
    fn overrides(&self, decl: &Decl, names: &ExportedNames) -> bool {
        let Some(signature) = decl.signature() else {
            return false;
        };
        self.class
            .all_bases()
            .filter(|base| self.is_exported(names, base))
            .any(|base| {
                self.graph.members(base.class).any(|(_, member)| {
                    member.as_method().is_some_and(|m| m.is_virtual)
                        && member.signature().as_ref() == Some(&signature)
                })
            })
    }

    fn export_methods(&mut self, names: &ExportedNames) -> Result<()> {
        let info = self.info;
        if self.has_virtual_methods() {
            let virtuals: Vec<OverlayMember> = self
                .overlay
                .iter()
                .filter(|m| m.is_virtual() && !info.is_member_excluded(&m.decl))
                .cloned()
                .collect();
            for member in virtuals {
                let is_override = self.overrides(&member.decl, names);
                let options = FunctionOptions {
                    info: info.member(&member.decl),
                    is_override,
                    inherited_from: member.inherited_from.map(|id| self.full_name(id)),
                    ..FunctionOptions::default()
                };
                if let Some(model) = self.function(&member.decl, options) {
                    tracing::trace!(method = %model.full_name, is_override, "virtual method");
                    self.model.virtual_methods.push(model);
                }
            }
        }

        let plain: Vec<OverlayMember> = self
            .public
            .iter()
            .map(|&i| &self.overlay[i])
            .filter(|m| m.is_plain_method() && !m.is_virtual())
            .filter(|m| !info.is_member_excluded(&m.decl))
            .cloned()
            .collect();
        for member in plain {
            let options = FunctionOptions {
                info: info.member(&member.decl),
                inherited_from: member.inherited_from.map(|id| self.full_name(id)),
                ..FunctionOptions::default()
            };
            if let Some(model) = self.function(&member.decl, options) {
                self.push_method(model);
            }
        }

        let graph = self.graph;
        for added in &info.add_method {
            let decl = graph.get(graph.lookup(&added.name)?);
            if decl.as_function().is_none() {
                return Err(ExportError::NotAFunction(added.name.clone()));
            }
            let options = FunctionOptions {
                rename: added.rename.clone(),
                force_static: decl.as_method().is_none(),
                ..FunctionOptions::default()
            };
            if let Some(model) = self.function(decl, options) {
                self.push_method(model);
            }
        }
        tracing::debug!(
            virtual_methods = self.model.virtual_methods.len(),
            static_methods = self.model.static_methods.len(),
            methods = self.model.non_virtual_methods.len(),
            "exported methods"
        );
        Ok(())
    }

    fn push_method(&mut self, model: FunctionModel) {
        if model.is_static {
            self.model.static_methods.push(model);
        } else {
            self.model.non_virtual_methods.push(model);
        }
    }

    fn export_callbacks(&mut self) {
        let callbacks = self
            .model
            .virtual_methods
            .iter()
            .filter(|m| !m.is_override)
            .map(|method| {
                let name = format!("{}_callback", method.id);
                let native_params = std::iter::once("void*".to_string())
                    .chain(method.params.iter().map(|p| p.cxx.usage.clone()))
                    .collect::<Vec<_>>()
                    .join(", ");
                let managed_params = std::iter::once("IntPtr self".to_string())
                    .chain(
                        method
                            .params
                            .iter()
                            .map(|p| format!("{} {}", p.pinvoke.usage, p.name)),
                    )
                    .collect::<Vec<_>>()
                    .join(", ");
                CallbackModel {
                    typedef: format!(
                        "typedef {} (*{name})({native_params});",
                        method.result.cxx.usage
                    ),
                    delegate: format!(
                        "public delegate {} {name}({managed_params});",
                        method.result.csharp.pinvoke_usage
                    ),
                    method: method.id.clone(),
                    name,
                }
            })
            .collect::<Vec<_>>();
        tracing::debug!(callbacks = callbacks.len(), "callbacks");
        self.model.callbacks = callbacks;
    }

    /// Whether `ty` names the exported class.
    fn names_class(&self, ty: &Type) -> bool {
        match ty.target {
            Some(target) => self.graph.resolve_typedef(target) == self.id,
            None => ty.qualified_name() == self.decl.full_name(),
        }
    }

    fn export_operators(&mut self) {
        let mut candidates: Vec<(Decl, bool)> = Vec::new();
        for &root in self.graph.roots() {
            let decl = self.graph.get(root);
            let Some(function) = decl.as_function().filter(|_| decl.is_free_operator()) else {
                continue;
            };
            let first_is_class = function
                .params
                .first()
                .is_some_and(|p| self.names_class(&p.ty));
            let streams_class = function.params.len() == 2
                && mentions_stream(&function.params[0].ty)
                && self.names_class(&function.params[1].ty);
            if first_is_class || streams_class {
                candidates.push((decl.clone(), false));
            }
        }
        candidates.extend(
            self.public
                .iter()
                .map(|&i| &self.overlay[i])
                .filter(|m| matches!(m.method_kind(), Some(MethodKind::Operator(_))))
                .map(|m| (m.decl.clone(), true)),
        );

        let info = self.info;
        for (decl, is_member) in candidates {
            let (Some(symbol), Some(function)) = (operator_symbol(&decl), decl.as_function())
            else {
                continue;
            };
            let op_info = info.operator(symbol.as_str());
            if op_info.is_some_and(|i| i.exclude) {
                continue;
            }

            let to_stream = symbol == OperatorSymbol::Shl
                && function.result.as_ref().is_some_and(mentions_stream)
                && function.params.first().is_some_and(|p| mentions_stream(&p.ty));
            if to_stream {
                self.model.has_to_string = true;
                self.model
                    .sections
                    .push(CodeSection::Include, "#include <sstream>");
                continue;
            }

            let options = FunctionOptions {
                info: op_info,
                force_static: !is_member,
                ..FunctionOptions::default()
            };
            if op_info.is_some_and(|i| i.rename.is_some() || i.wrapper.is_some()) {
                // Exported as an ordinary method under the given name.
                if let Some(model) = self.function(&decl, options) {
                    self.push_method(model);
                }
                continue;
            }
            if !symbol.is_bridgeable() {
                let err = ClassifyError::UnsupportedOperator(symbol);
                self.model.diagnostics.push(skipped(&decl, &err));
                continue;
            }

            let arity = function.params.len();
            let is_unary = if is_member { arity == 0 } else { arity == 1 };
            let wrapper_name = format!("{}_{}", self.decl.id(), symbol.word(is_unary));
            if let Some(model) = self.function(&decl, options) {
                self.model.operators.push(OperatorModel {
                    symbol: symbol.as_str().to_string(),
                    is_unary,
                    is_member,
                    wrapper_name,
                    csharp_operator: format!("operator {}", symbol.as_str()),
                    function: model,
                });
            }
        }

        let converters: Vec<Decl> = self
            .public
            .iter()
            .map(|&i| &self.overlay[i])
            .filter(|m| m.method_kind() == Some(MethodKind::Converter))
            .map(|m| m.decl.clone())
            .collect();
        for decl in converters {
            let Some(result) = decl.as_function().and_then(|f| f.result.as_ref()) else {
                continue;
            };
            if mentions_stream(result) {
                continue;
            }
            let conv_info = info
                .operator(&result.full_name())
                .or_else(|| info.operator(&result.qualified_name()));
            if conv_info.is_some_and(|i| i.exclude) {
                continue;
            }
            let rename = conv_info
                .and_then(|i| i.rename.clone())
                .unwrap_or_else(|| format!("to_{}", sharpbind_common::make_id(&result.full_name())));
            let options = FunctionOptions {
                info: conv_info,
                rename: Some(rename),
                ..FunctionOptions::default()
            };
            if let Some(model) = self.function(&decl, options) {
                self.model.converters.push(model);
            }
        }
        tracing::debug!(
            operators = self.model.operators.len(),
            converters = self.model.converters.len(),
            "exported operators"
        );
    }

    fn export_nested(&mut self, names: &mut ExportedNames) -> Result<()> {
        let nested: Vec<(DeclId, DeclInfo)> = self
            .public
            .iter()
            .map(|&i| &self.overlay[i])
            .filter(|m| matches!(m.decl.kind, DeclKind::Class(_) | DeclKind::Enumeration(_)))
            .filter(|m| !self.graph.get(m.source).incomplete)
            .map(|m| (m.source, self.info.member(&m.decl).cloned().unwrap_or_default()))
            .filter(|(_, info)| !info.exclude)
            .collect();

        for (source, info) in nested {
            let decl = self.graph.get(source);
            if decl.is_class() {
                let entry = ClassEntry {
                    name: decl.full_name(),
                    include: self.exporter.entry.include.clone(),
                    tail: None,
                    info,
                };
                let exporter =
                    ClassExporter::new(self.exporter.classifier, &entry, self.exporter.module);
                if let Some(model) = exporter.export(names)? {
                    self.model.nested_classes.push(model);
                }
            } else {
                let model = enum_model(&self.visitors, decl, info.rename.clone(), self.exporter.module);
                names.insert(decl.full_name());
                self.model.nested_enums.push(model);
            }
        }
        Ok(())
    }

    fn export_smart_pointer(&mut self) {
        self.model.smart_ptr = self
            .info
            .smart_pointer()
            .map(|pointer| SmartPointerModel::new(&pointer, &self.decl.full_name()));
    }

    /// Methods returning an opaque pointer need the pointee's type id
    /// declared once, outside the bridge functions.
    fn export_opaque_pointer_policies(&mut self) {
        let pointees: Vec<String> = self
            .public
            .iter()
            .map(|&i| &self.overlay[i])
            .filter(|m| m.is_plain_method())
            .filter(|m| {
                self.info
                    .member(&m.decl)
                    .and_then(|info| info.policy)
                    .is_some_and(|policy| policy.is_opaque_pointer())
            })
            .filter_map(|m| m.decl.as_function().and_then(|f| f.result.as_ref()))
            .map(Type::qualified_name)
            .collect();
        for pointee in pointees {
            self.model.sections.push(
                CodeSection::DeclarationOutside,
                format!("SHARPBIND_OPAQUE_TYPE_ID({pointee})"),
            );
        }
    }

    fn export_data_members(&mut self) {
        let fields: Vec<Decl> = self
            .public
            .iter()
            .map(|&i| &self.overlay[i])
            .filter(|m| m.decl.as_variable().is_some_and(|v| v.field.is_some()))
            .filter(|m| !self.info.is_member_excluded(&m.decl))
            .map(|m| m.decl.clone())
            .collect();
        for decl in fields {
            let Some(var) = decl.as_variable() else {
                continue;
            };
            let is_static = var.field.is_some_and(|f| f.is_static);
            let built = self
                .visitors
                .type_naming(&var.ty)
                .and_then(|naming| Ok((naming, self.visitors.result(Some(&var.ty), None)?)));
            match built {
                Ok((naming, getter)) => {
                    let member = DataMemberModel {
                        name: decl.name.to_string(),
                        full_name: decl.full_name(),
                        is_static,
                        is_const: var.ty.is_const,
                        naming,
                        getter,
                    };
                    if is_static {
                        self.model.static_members.push(member);
                    } else {
                        self.model.non_static_members.push(member);
                    }
                }
                Err(err) => self.model.diagnostics.push(skipped(&decl, &err)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{AddedMethod, Policy, ReturnValuePolicy};
    use pretty_assertions::assert_eq;
    use sharpbind_decl::{GraphBuilder, Visibility};

    fn void() -> Type {
        Type::fundamental("void")
    }

    fn int() -> Type {
        Type::fundamental("int")
    }

    fn class_ref(name: &str) -> Type {
        Type::reference_to(Type::named(name).with_const())
    }

    /// ```cpp
    /// namespace geo {
    /// class A { public: void a(); int x; private: void hidden(); };
    /// class B : public A { public: void b(); static int count(); };
    /// class C : public B { public: void c(); void a(int); };
    /// }
    /// ```
    fn chain() -> DeclGraph {
        let mut b = GraphBuilder::new();
        let a = b.add_root(Decl::class("geo", "A"));
        b.add_member(a, Decl::method("a", void(), vec![])).unwrap();
        b.add_member(a, Decl::field("x", int())).unwrap();
        b.add_member(
            a,
            Decl::method("hidden", void(), vec![]).with_visibility(Visibility::Private),
        )
        .unwrap();
        let bb = b.add_root(Decl::class("geo", "B"));
        b.add_base(bb, "A", Visibility::Public);
        b.add_member(bb, Decl::method("b", void(), vec![])).unwrap();
        b.add_member(bb, Decl::method("count", int(), vec![]).with_static())
            .unwrap();
        let c = b.add_root(Decl::class("geo", "C"));
        b.add_base(c, "B", Visibility::Public);
        b.add_member(c, Decl::method("c", void(), vec![])).unwrap();
        b.add_member(c, Decl::method("a", void(), vec![int()])).unwrap();
        b.finish().unwrap()
    }

    fn export(graph: &DeclGraph, entry: &ClassEntry, names: &mut ExportedNames) -> ClassModel {
        let classifier = Classifier::new(graph);
        ClassExporter::new(&classifier, entry, "geo")
            .export(names)
            .unwrap()
            .unwrap()
    }

    fn method_names(methods: &[FunctionModel]) -> Vec<&str> {
        methods.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn test_flattens_unexported_bases() {
        let graph = chain();
        let model = export(&graph, &ClassEntry::new("geo::C"), &mut ExportedNames::new());

        // A::a is hidden by C::a(int); A::hidden is private.
        assert_eq!(method_names(&model.non_virtual_methods), ["c", "a", "b"]);
        assert_eq!(method_names(&model.static_methods), ["count"]);
        assert_eq!(model.static_methods[0].full_name, "geo::C::count");
        assert_eq!(
            model.non_virtual_methods[2].inherited_from.as_deref(),
            Some("geo::B")
        );
        assert_eq!(model.non_static_members[0].full_name, "geo::C::x");
        assert!(model.bases.is_empty());
    }

    #[test]
    fn test_stops_at_the_first_exported_level() {
        let graph = chain();
        let mut names = ExportedNames::new();
        names.insert("geo::A");
        let model = export(&graph, &ClassEntry::new("geo::C"), &mut names);

        assert_eq!(method_names(&model.non_virtual_methods), ["c", "a", "b"]);
        assert!(model.non_static_members.is_empty());
        let bases: Vec<&str> = model.bases.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(bases, ["geo::A"]);

        names.insert("geo::B");
        let model = export(&graph, &ClassEntry::new("geo::C"), &mut names);
        assert_eq!(method_names(&model.non_virtual_methods), ["c", "a"]);
        assert_eq!(model.bases[0].name, "geo::B");
        assert!(names.contains("geo::C"));
    }

    #[test]
    fn test_excluded_members_are_not_inherited() {
        let graph = chain();
        let mut info = DeclInfo::default();
        info.members.insert("b".into(), DeclInfo::excluded());
        info.members.insert("c".into(), DeclInfo::excluded());
        let entry = ClassEntry::new("geo::C").with_info(info);
        let model = export(&graph, &entry, &mut ExportedNames::new());
        assert_eq!(method_names(&model.non_virtual_methods), ["a"]);
    }

    #[test]
    fn test_inherited_overloads_lose_uniqueness() {
        // struct Base { void f(); };
        // struct Derived : Base { void g(); void g(int); };
        let mut b = GraphBuilder::new();
        let base = b.add_root(Decl::class("", "Base"));
        b.add_member(base, Decl::method("f", void(), vec![])).unwrap();
        let derived = b.add_root(Decl::class("", "Derived"));
        b.add_base(derived, "Base", Visibility::Public);
        b.add_member(derived, Decl::method("g", void(), vec![])).unwrap();
        b.add_member(derived, Decl::method("g", void(), vec![int()])).unwrap();
        let graph = b.finish().unwrap();

        let model = export(&graph, &ClassEntry::new("Derived"), &mut ExportedNames::new());
        let f = model.method("f").unwrap();
        assert!(f.is_unique);
        assert_eq!(f.pointer, "&Derived::f");
        let overloads: Vec<&FunctionModel> =
            model.non_virtual_methods.iter().filter(|m| m.name == "g").collect();
        assert_eq!(overloads.len(), 2);
        assert!(overloads.iter().all(|m| !m.is_unique));
        assert_ne!(overloads[0].id, overloads[1].id);
        assert_eq!(overloads[1].pointer, "(void (Derived::*)(int))&Derived::g");
    }

    /// ```cpp
    /// struct Shape {
    ///     Shape(); Shape(const Shape&);
    ///     virtual double area() const = 0;
    ///     virtual void draw();
    ///     virtual void sealed_op();
    ///     ~Shape();
    /// };
    /// struct Circle : Shape { Circle(); double area() const; };
    /// ```
    fn shapes() -> DeclGraph {
        let mut b = GraphBuilder::new();
        let shape = b.add_root(Decl::class("", "Shape"));
        b.add_member(shape, Decl::constructor("Shape", vec![])).unwrap();
        b.add_member(shape, Decl::constructor("Shape", vec![class_ref("Shape")]))
            .unwrap();
        b.add_member(
            shape,
            Decl::method("area", Type::fundamental("double"), vec![])
                .with_const()
                .with_virtual(true),
        )
        .unwrap();
        b.add_member(shape, Decl::method("draw", void(), vec![]).with_virtual(false))
            .unwrap();
        b.add_member(shape, Decl::method("sealed_op", void(), vec![]).with_virtual(false))
            .unwrap();
        b.add_member(shape, Decl::destructor("Shape")).unwrap();
        let circle = b.add_root(Decl::class("", "Circle"));
        b.add_base(circle, "Shape", Visibility::Public);
        b.add_member(circle, Decl::constructor("Circle", vec![])).unwrap();
        b.add_member(
            circle,
            Decl::method("area", Type::fundamental("double"), vec![])
                .with_const()
                .with_virtual(false),
        )
        .unwrap();
        b.finish().unwrap()
    }

    #[test]
    fn test_abstract_class_constructors() {
        let graph = shapes();
        let model = export(&graph, &ClassEntry::new("Shape"), &mut ExportedNames::new());
        assert!(model.is_abstract);
        assert_eq!(model.constructors.len(), 1);
        assert!(model.constructors[0].params.is_empty());
        assert!(model.non_copyable);
        assert!(!model.no_init);
        assert!(model.has_destructor);
    }

    #[test]
    fn test_no_override_and_callbacks() {
        let graph = shapes();
        let mut info = DeclInfo::default();
        info.members.insert(
            "sealed_op".into(),
            DeclInfo {
                no_override: true,
                ..DeclInfo::default()
            },
        );
        let mut names = ExportedNames::new();
        let shape = export(&graph, &ClassEntry::new("Shape").with_info(info), &mut names);
        assert_eq!(method_names(&shape.virtual_methods), ["area", "draw"]);
        assert_eq!(method_names(&shape.non_virtual_methods), ["sealed_op"]);
        assert_eq!(shape.callbacks.len(), 2);
        assert_eq!(
            shape.callbacks[0].typedef,
            "typedef double (*Shape_area_callback)(void*);"
        );

        // Shape is exported now: Circle::area overrides it, draw stays with
        // Shape's own bridge.
        let circle = export(&graph, &ClassEntry::new("Circle"), &mut names);
        assert_eq!(method_names(&circle.virtual_methods), ["area"]);
        assert!(circle.virtual_methods[0].is_override);
        assert!(circle.callbacks.is_empty());
        assert_eq!(circle.bridge_bases[0].name, "Shape");
        assert!(circle.non_copyable);
    }

    #[test]
    fn test_override_needs_matching_signature() {
        // struct Base { virtual void f(int); };
        // struct Derived : Base { virtual void f(double); };
        let mut b = GraphBuilder::new();
        let base = b.add_root(Decl::class("", "Base"));
        b.add_member(base, Decl::method("f", void(), vec![int()]).with_virtual(false))
            .unwrap();
        let derived = b.add_root(Decl::class("", "Derived"));
        b.add_base(derived, "Base", Visibility::Public);
        b.add_member(
            derived,
            Decl::method("f", void(), vec![Type::fundamental("double")]).with_virtual(false),
        )
        .unwrap();
        let graph = b.finish().unwrap();

        let mut names = ExportedNames::new();
        names.insert("Base");
        let model = export(&graph, &ClassEntry::new("Derived"), &mut names);
        assert_eq!(model.virtual_methods.len(), 1);
        assert!(!model.virtual_methods[0].is_override);
        assert_eq!(model.callbacks.len(), 1);
    }

    /// ```cpp
    /// namespace geo {
    /// struct Vec { Vec operator-() const; bool operator==(const Vec&) const;
    ///              Vec& operator=(const Vec&); operator double() const; };
    /// Vec operator+(const Vec&, const Vec&);
    /// std::ostream& operator<<(std::ostream&, const Vec&);
    /// Vec operator*(double, const Vec&);
    /// }
    /// ```
    fn vectors() -> DeclGraph {
        let vec_ref = || class_ref("geo::Vec");
        let stream = || Type::reference_to(Type::named("std::basic_ostream<char>"));
        let mut b = GraphBuilder::new();
        let v = b.add_root(Decl::class("geo", "Vec"));
        b.add_member(v, Decl::class_operator(OperatorSymbol::Minus, Type::named("geo::Vec"), vec![]))
            .unwrap();
        b.add_member(
            v,
            Decl::class_operator(OperatorSymbol::EqEq, Type::fundamental("bool"), vec![vec_ref()]),
        )
        .unwrap();
        b.add_member(
            v,
            Decl::class_operator(
                OperatorSymbol::Assign,
                Type::reference_to(Type::named("geo::Vec")),
                vec![vec_ref()],
            ),
        )
        .unwrap();
        b.add_member(v, Decl::converter(Type::fundamental("double"))).unwrap();
        b.add_root(Decl::operator(
            "geo",
            OperatorSymbol::Plus,
            Type::named("geo::Vec"),
            vec![vec_ref(), vec_ref()],
        ));
        b.add_root(Decl::operator("geo", OperatorSymbol::Shl, stream(), vec![stream(), vec_ref()]));
        b.add_root(Decl::operator(
            "geo",
            OperatorSymbol::Star,
            Type::named("geo::Vec"),
            vec![Type::fundamental("double"), vec_ref()],
        ));
        b.finish().unwrap()
    }

    #[test]
    fn test_operators() {
        let graph = vectors();
        let model = export(&graph, &ClassEntry::new("geo::Vec"), &mut ExportedNames::new());

        let symbols: Vec<(&str, bool, bool)> = model
            .operators
            .iter()
            .map(|o| (o.symbol.as_str(), o.is_unary, o.is_member))
            .collect();
        // `*` takes a double first and belongs to no class.
        assert_eq!(symbols, [("+", false, false), ("-", true, true), ("==", false, true)]);
        assert!(model.operators[0].function.is_static);
        assert_eq!(model.operators[0].wrapper_name, "geo_Vec_add");
        assert_eq!(model.operators[1].wrapper_name, "geo_Vec_negate");

        assert!(model.has_to_string);
        assert_eq!(model.sections.include, ["#include <sstream>"]);

        assert_eq!(model.converters.len(), 1);
        assert_eq!(model.converters[0].managed_name, "to_double");

        // Assignment has no managed form.
        assert_eq!(model.diagnostics.len(), 1);
        assert!(model.diagnostics[0].subject.ends_with("operator="));
    }

    #[test]
    fn test_operator_policies() {
        let graph = vectors();
        let mut info = DeclInfo::default();
        info.operators.insert("==".into(), DeclInfo::excluded());
        info.operators.insert("=".into(), DeclInfo::renamed("Assign"));
        info.operators.insert("double".into(), DeclInfo::renamed("ToDouble"));
        let entry = ClassEntry::new("geo::Vec").with_info(info);
        let model = export(&graph, &entry, &mut ExportedNames::new());

        assert!(model.operators.iter().all(|o| o.symbol != "=="));
        assert!(model.diagnostics.is_empty());
        assert_eq!(model.method("Assign").unwrap().name, "operator=");
        assert_eq!(model.converters[0].managed_name, "ToDouble");
    }

    #[test]
    fn test_nested_types_and_data_members() {
        // struct Outer {
        //     struct Inner { int v; };
        //     enum Mode { On = 1 };
        //     static const int limit;
        //     long double precise;
        // };
        let mut b = GraphBuilder::new();
        let outer = b.add_root(Decl::class("", "Outer"));
        let inner = b.add_member(outer, Decl::class("", "Inner")).unwrap();
        b.add_member(inner, Decl::field("v", int())).unwrap();
        b.add_member(outer, Decl::enumeration("", "Mode", [("On", 1)]))
            .unwrap();
        b.add_member(outer, Decl::field("limit", int().with_const()).with_static())
            .unwrap();
        b.add_member(outer, Decl::field("precise", Type::fundamental("long double")))
            .unwrap();
        let graph = b.finish().unwrap();

        let mut names = ExportedNames::new();
        let model = export(&graph, &ClassEntry::new("Outer"), &mut names);
        assert_eq!(model.nested_classes[0].name, "Outer::Inner");
        assert_eq!(model.nested_classes[0].non_static_members[0].name, "v");
        assert_eq!(model.nested_enums[0].values[0].full_name, "Outer::On");
        assert!(names.contains("Outer::Inner"));
        assert!(names.contains("Outer::Mode"));

        assert_eq!(model.static_members[0].name, "limit");
        assert!(model.static_members[0].is_const);
        assert!(model.non_static_members.is_empty());
        assert_eq!(model.diagnostics.len(), 1);
        assert_eq!(model.diagnostics[0].subject, "Outer::precise");
        assert!(model.no_init);
    }

    #[test]
    fn test_class_options() {
        // struct Handle {}; struct Pool { Handle* get(); };
        // Pool* make_pool(); typedef Pool DefaultPool;
        let mut b = GraphBuilder::new();
        b.add_root(Decl::class("", "Handle"));
        let pool = b.add_root(Decl::class("", "Pool"));
        b.add_member(pool, Decl::method("get", Type::pointer_to(Type::named("Handle")), vec![]))
            .unwrap();
        b.add_root(Decl::function("", "pool_size", int(), vec![class_ref("Pool")]));
        b.add_root(Decl::typedef("", "DefaultPool", Type::named("Pool")));
        let graph = b.finish().unwrap();

        let mut info = DeclInfo {
            use_shared_ptr: true,
            holder: Some("make_pool".into()),
            sealed: true,
            add_method: vec![AddedMethod {
                name: "pool_size".into(),
                rename: Some("Size".into()),
            }],
            ..DeclInfo::default()
        };
        info.members.insert(
            "get".into(),
            DeclInfo {
                policy: Some(Policy::ReturnValuePolicy(ReturnValuePolicy::ReturnOpaquePointer)),
                ..DeclInfo::default()
            },
        );
        let mut names = ExportedNames::new();
        let model = export(&graph, &ClassEntry::new("DefaultPool").with_info(info), &mut names);

        assert_eq!(model.name, "Pool");
        assert_eq!(model.rename.as_deref(), Some("DefaultPool"));
        assert_eq!(
            model.smart_ptr.as_ref().unwrap().declaration,
            "boost::shared_ptr< Pool >"
        );
        assert!(!model.no_init);
        assert!(model.sealed);
        assert_eq!(model.static_methods[0].managed_name, "Size");
        assert_eq!(
            model.sections.declaration_outside,
            ["SHARPBIND_OPAQUE_TYPE_ID(Handle)"]
        );
        assert!(names.contains("DefaultPool"));
        assert!(names.contains("Pool"));
        assert_eq!(model.files.cxx, "Pool.cpp");
    }

    #[test]
    fn test_missing_declarations_are_fatal() {
        let graph = chain();
        let classifier = Classifier::new(&graph);
        let entry = ClassEntry::new("geo::Missing");
        let err = ClassExporter::new(&classifier, &entry, "geo")
            .export(&mut ExportedNames::new())
            .unwrap_err();
        assert_eq!(err.to_string(), "no geo::Missing declaration found!");

        let entry = ClassEntry::new("geo::C").with_info(DeclInfo {
            add_method: vec![AddedMethod {
                name: "geo::nothing".into(),
                rename: None,
            }],
            ..DeclInfo::default()
        });
        assert!(matches!(
            ClassExporter::new(&classifier, &entry, "geo").export(&mut ExportedNames::new()),
            Err(ExportError::DeclarationNotFound { .. })
        ));

        let excluded = ClassEntry::new("geo::Missing").with_info(DeclInfo::excluded());
        assert!(ClassExporter::new(&classifier, &excluded, "geo")
            .export(&mut ExportedNames::new())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_order_key_counts_all_bases() {
        let graph = chain();
        assert_eq!(order_key(&graph, &ClassEntry::new("geo::A")).0, 0);
        assert_eq!(order_key(&graph, &ClassEntry::new("geo::C")).0, 2);
        assert_eq!(order_key(&graph, &ClassEntry::new("nowhere")).0, 0);
    }
}
