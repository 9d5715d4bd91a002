//! The finished, read-only declaration graph.

use crate::decl::{Class, Decl, DeclId, DeclKind};
use crate::error::LookupError;
use crate::types::{Type, TypeKind};
use rustc_hash::FxHashMap;

/// Every declaration of one parsed header set.
///
/// Built once by [`GraphBuilder`](crate::GraphBuilder) and immutable
/// afterwards. Declarations are addressed by [`DeclId`]; `Type::target` and
/// `Base::class` are ids into this graph.
#[derive(Debug, Clone, Default)]
pub struct DeclGraph {
    pub(crate) decls: Vec<Decl>,
    /// Namespace-scope declarations in dump order.
    pub(crate) roots: Vec<DeclId>,
    /// Full C++ name to every declaration spelled that way.
    pub(crate) by_name: FxHashMap<String, Vec<DeclId>>,
}

impl DeclGraph {
    pub fn get(&self, id: DeclId) -> &Decl {
        &self.decls[id.index()]
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn roots(&self) -> &[DeclId] {
        &self.roots
    }

    /// All declarations with their ids, in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (DeclId, &Decl)> {
        self.decls
            .iter()
            .enumerate()
            .map(|(i, decl)| (DeclId(i as u32), decl))
    }

    /// Find the declaration named `name`.
    ///
    /// When several share the name (overloads) the first one is returned;
    /// use [`lookup_all`](Self::lookup_all) to get every overload. A
    /// forward declaration loses against a complete one.
    pub fn lookup(&self, name: &str) -> Result<DeclId, LookupError> {
        let ids = self.lookup_all(name)?;
        Ok(ids
            .iter()
            .copied()
            .find(|id| !self.get(*id).incomplete)
            .unwrap_or(ids[0]))
    }

    pub fn lookup_all(&self, name: &str) -> Result<&[DeclId], LookupError> {
        let key = name.trim().trim_start_matches("::");
        match self.by_name.get(key) {
            Some(ids) if !ids.is_empty() => Ok(ids),
            _ => Err(LookupError::NotFound(name.to_string())),
        }
    }

    pub fn find(&self, name: &str) -> Option<DeclId> {
        self.lookup(name).ok()
    }

    pub fn class(&self, id: DeclId) -> Option<&Class> {
        self.get(id).as_class()
    }

    /// Members of a class, in declaration order. Empty for non-classes.
    pub fn members(&self, id: DeclId) -> impl Iterator<Item = (DeclId, &Decl)> {
        self.class(id)
            .map(|class| class.members.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|member| (*member, self.get(*member)))
    }

    /// A class is an interface when it has members and every member is
    /// either a pure virtual method or a non-public constructor.
    pub fn is_interface(&self, id: DeclId) -> bool {
        let Some(class) = self.class(id) else {
            return false;
        };
        !class.members.is_empty()
            && self.members(id).all(|(_, member)| match member.as_method() {
                Some(m) if m.is_constructor() => !m.visibility.is_public(),
                Some(m) => m.is_abstract,
                None => false,
            })
    }

    /// Whether the class or one of its bases declares a virtual method.
    pub fn has_virtual_methods(&self, id: DeclId) -> bool {
        let declares = |class_id: DeclId| {
            self.members(class_id)
                .any(|(_, m)| m.as_method().is_some_and(|m| m.is_virtual))
        };
        declares(id)
            || self
                .class(id)
                .is_some_and(|class| class.all_bases().any(|base| declares(base.class)))
    }

    /// Follow typedef chains down to the declaration a type names.
    pub fn resolve_typedef(&self, id: DeclId) -> DeclId {
        let mut current = id;
        for _ in 0..self.decls.len() {
            match &self.get(current).kind {
                DeclKind::Typedef(t) => match t.ty.target {
                    Some(next) if t.ty.kind == TypeKind::Named => current = next,
                    _ => break,
                },
                _ => break,
            }
        }
        current
    }

    /// The declaration a type names, with typedefs resolved.
    pub fn type_decl(&self, ty: &Type) -> Option<&Decl> {
        ty.target.map(|id| self.get(self.resolve_typedef(id)))
    }

    pub fn is_enum_type(&self, ty: &Type) -> bool {
        self.type_decl(ty)
            .is_some_and(|decl| matches!(decl.kind, DeclKind::Enumeration(_)))
    }

    /// Declarations located in `header`, namespace scope only.
    pub fn roots_in(&self, header: &str) -> impl Iterator<Item = DeclId> + '_ {
        let header = header.to_string();
        self.roots
            .iter()
            .copied()
            .filter(move |id| self.get(*id).location.is_in(&header))
    }
}
