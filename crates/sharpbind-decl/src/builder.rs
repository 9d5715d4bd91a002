//! Graph construction and the resolution pass.
//!
//! Declarations are added in parse order. `finish()` then resolves base
//! names, computes the hierarchy levels of every class, binds every spelled
//! type to the declaration it names and marks overloads non-unique. Nothing
//! in the graph changes after that.

use crate::decl::{Base, Decl, DeclId, DeclKind, Visibility};
use crate::error::{GraphError, Result};
use crate::graph::DeclGraph;
use crate::types::TypeKind;
use rustc_hash::{FxHashMap, FxHashSet};
use sharpbind_common::join_scope;
use smol_str::SmolStr;

struct PendingBase {
    class: DeclId,
    name: String,
    visibility: Visibility,
}

#[derive(Default)]
pub struct GraphBuilder {
    decls: Vec<Decl>,
    roots: Vec<DeclId>,
    bases: Vec<PendingBase>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, decl: Decl) -> DeclId {
        let id = DeclId(self.decls.len() as u32);
        self.decls.push(decl);
        id
    }

    /// Add a namespace-scope declaration.
    pub fn add_root(&mut self, decl: Decl) -> DeclId {
        let id = self.push(decl);
        self.roots.push(id);
        id
    }

    /// Add a member to `class`. The member's scope becomes the class path.
    /// Nested classes without a visibility are taken as public.
    pub fn add_member(&mut self, class: DeclId, mut decl: Decl) -> Result<DeclId> {
        let owner = &self.decls[class.index()];
        if !owner.is_class() {
            return Err(GraphError::NotAClass(owner.full_name()));
        }
        let mut scope = owner.scope.clone();
        scope.push(owner.name.clone());
        decl.scope = scope;
        if let DeclKind::Class(nested) = &mut decl.kind {
            nested.nested.get_or_insert(Visibility::Public);
        }
        if let DeclKind::Enumeration(e) = &mut decl.kind {
            e.visibility.get_or_insert(Visibility::Public);
        }

        let id = self.push(decl);
        if let Some(owner) = self.decls[class.index()].as_class_mut() {
            owner.members.push(id);
        }
        Ok(id)
    }

    /// Record that `class` derives from the class named `base`. The name is
    /// resolved in `finish()`, relative to the scope of `class`.
    pub fn add_base(&mut self, class: DeclId, base: &str, visibility: Visibility) {
        self.bases.push(PendingBase {
            class,
            name: base.to_string(),
            visibility,
        });
    }

    /// Run the resolution pass and freeze the graph.
    #[tracing::instrument(skip_all)]
    pub fn finish(mut self) -> Result<DeclGraph> {
        let by_name = self.index_names();
        self.resolve_bases(&by_name)?;
        self.compute_hierarchies()?;
        self.resolve_types(&by_name);
        self.mark_abstract_classes();
        self.mark_overloads();

        tracing::debug!(
            decls = self.decls.len(),
            roots = self.roots.len(),
            "declaration graph resolved"
        );
        Ok(DeclGraph {
            decls: self.decls,
            roots: self.roots,
            by_name,
        })
    }

    fn incomplete_flags(&self) -> Vec<bool> {
        self.decls.iter().map(|d| d.incomplete).collect()
    }

    fn index_names(&self) -> FxHashMap<String, Vec<DeclId>> {
        let mut by_name: FxHashMap<String, Vec<DeclId>> = FxHashMap::default();
        for (i, decl) in self.decls.iter().enumerate() {
            by_name
                .entry(decl.full_name())
                .or_default()
                .push(DeclId(i as u32));
        }
        by_name
    }

    fn resolve_bases(&mut self, by_name: &FxHashMap<String, Vec<DeclId>>) -> Result<()> {
        let pending = std::mem::take(&mut self.bases);
        let incomplete = self.incomplete_flags();
        for PendingBase {
            class,
            name,
            visibility,
        } in pending
        {
            let owner = &self.decls[class.index()];
            let class_name = owner.full_name();
            let base = lookup_in_scope(by_name, &incomplete, &owner.scope, &name).ok_or_else(|| {
                GraphError::UnknownBase {
                    class: class_name.clone(),
                    base: name.clone(),
                }
            })?;
            if !self.decls[base.index()].is_class() {
                return Err(GraphError::BaseNotAClass {
                    class: class_name,
                    base: name,
                });
            }
            if let Some(owner) = self.decls[class.index()].as_class_mut() {
                owner.bases.push(Base {
                    class: base,
                    visibility,
                });
            }
        }
        Ok(())
    }

    fn compute_hierarchies(&mut self) -> Result<()> {
        let mut memo: FxHashMap<DeclId, Vec<Vec<Base>>> = FxHashMap::default();
        let mut visiting = FxHashSet::default();
        for i in 0..self.decls.len() {
            let id = DeclId(i as u32);
            if self.decls[i].is_class() {
                hierarchy_of(&self.decls, id, &mut memo, &mut visiting)?;
            }
        }
        for (id, levels) in memo {
            if let Some(class) = self.decls[id.index()].as_class_mut() {
                class.hierarchy = levels;
            }
        }
        Ok(())
    }

    fn resolve_types(&mut self, by_name: &FxHashMap<String, Vec<DeclId>>) {
        let enums: FxHashSet<DeclId> = self
            .decls
            .iter()
            .enumerate()
            .filter(|(_, d)| matches!(d.kind, DeclKind::Enumeration(_)))
            .map(|(i, _)| DeclId(i as u32))
            .collect();
        let incomplete = self.incomplete_flags();

        for i in 0..self.decls.len() {
            let scope = self.decls[i].scope.clone();
            for ty in self.decls[i].types_mut() {
                ty.walk_mut(&mut |ty| {
                    if ty.fundamental || ty.is_function() || ty.name.is_empty() {
                        return;
                    }
                    let Some(target) =
                        lookup_in_scope(by_name, &incomplete, &scope, &ty.qualified_name())
                    else {
                        return;
                    };
                    ty.target = Some(target);
                    if ty.kind == TypeKind::Named && enums.contains(&target) {
                        ty.must_marshal = false;
                    }
                });
            }
        }
    }

    fn mark_abstract_classes(&mut self) {
        for i in 0..self.decls.len() {
            let abstract_member = match self.decls[i].as_class() {
                Some(class) => class.members.iter().any(|m| {
                    self.decls[m.index()]
                        .as_method()
                        .is_some_and(|m| m.is_abstract)
                }),
                None => continue,
            };
            if abstract_member {
                if let Some(class) = self.decls[i].as_class_mut() {
                    class.is_abstract = true;
                }
            }
        }
    }

    /// Group class members and namespace-scope functions by full name; every
    /// member of a group with more than one entry loses `is_unique`.
    fn mark_overloads(&mut self) {
        let mut groups: Vec<Vec<DeclId>> = Vec::new();
        for decl in &self.decls {
            if let Some(class) = decl.as_class() {
                groups.push(class.members.clone());
            }
        }
        groups.push(self.roots.clone());

        let mut colliding = Vec::new();
        for group in groups {
            let mut by_name: FxHashMap<String, Vec<DeclId>> = FxHashMap::default();
            for id in group {
                let decl = &self.decls[id.index()];
                if decl.as_function().is_some() {
                    by_name.entry(decl.full_name()).or_default().push(id);
                }
            }
            colliding.extend(by_name.into_values().filter(|ids| ids.len() > 1).flatten());
        }
        for id in colliding {
            tracing::trace!(name = %self.decls[id.index()].full_name(), "overloaded");
            self.decls[id.index()].is_unique = false;
        }
    }
}

/// Look `name` up from inside `scope`, innermost enclosing scope first.
/// Complete declarations win over forward declarations.
fn lookup_in_scope(
    by_name: &FxHashMap<String, Vec<DeclId>>,
    incomplete: &[bool],
    scope: &[SmolStr],
    name: &str,
) -> Option<DeclId> {
    let name = name.trim_start_matches("::");
    for depth in (0..=scope.len()).rev() {
        let candidate = if depth == 0 {
            name.to_string()
        } else {
            format!("{}::{name}", join_scope(&scope[..depth]))
        };
        if let Some(ids) = by_name.get(&candidate) {
            let complete = ids.iter().copied().find(|id| !incomplete[id.index()]);
            if let Some(id) = complete.or_else(|| ids.first().copied()) {
                return Some(id);
            }
        }
    }
    None
}

fn hierarchy_of(
    decls: &[Decl],
    id: DeclId,
    memo: &mut FxHashMap<DeclId, Vec<Vec<Base>>>,
    visiting: &mut FxHashSet<DeclId>,
) -> Result<Vec<Vec<Base>>> {
    if let Some(levels) = memo.get(&id) {
        return Ok(levels.clone());
    }
    if !visiting.insert(id) {
        return Err(GraphError::CyclicInheritance(decls[id.index()].full_name()));
    }

    let direct = decls[id.index()]
        .as_class()
        .map(|c| c.bases.clone())
        .unwrap_or_default();
    let mut levels = Vec::new();
    if !direct.is_empty() {
        levels.push(merge_level(direct.iter().copied()));
        let mut parents = Vec::with_capacity(direct.len());
        for base in &direct {
            parents.push(hierarchy_of(decls, base.class, memo, visiting)?);
        }
        let depth = parents.iter().map(Vec::len).max().unwrap_or(0);
        for n in 0..depth {
            levels.push(merge_level(
                parents.iter().filter_map(|p| p.get(n)).flatten().copied(),
            ));
        }
    }

    visiting.remove(&id);
    memo.insert(id, levels.clone());
    Ok(levels)
}

/// Deduplicate bases reached through several paths; first occurrence wins.
fn merge_level(bases: impl Iterator<Item = Base>) -> Vec<Base> {
    let mut seen = FxHashSet::default();
    bases.filter(|base| seen.insert(base.class)).collect()
}
