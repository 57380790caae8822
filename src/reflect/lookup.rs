use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::trace;

use super::{ClassInfo, ClassKind, Reflector};
use crate::error::Result;
use crate::ir::{Type, TypeIdentifier};

// ------------------------------- Policy ---------------------------------- //

/// Interfaces granting iteration or indexed access.
pub const COLLECTION_INTERFACES: [&str; 2] = ["Traversable", "ArrayAccess"];

/// Interface implemented by every enumeration.
pub const ENUM_INTERFACE: &str = "UnitEnum";

/// Cached view over a [`Reflector`].
///
/// Both caches are read-mostly and safe to populate from several threads;
/// a racing first lookup may compute the same entry twice, which is harmless
/// since entries are pure.
pub struct ClassLookup {
    reflector: Arc<dyn Reflector>,
    /// normalized class name -> exists
    existing: DashMap<String, bool>,
    /// resolved parent name -> exists
    parents: DashMap<String, bool>,
}

impl fmt::Debug for ClassLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassLookup")
            .field("existing", &self.existing.len())
            .field("parents", &self.parents.len())
            .finish()
    }
}

impl ClassLookup {
    pub fn new(reflector: Arc<dyn Reflector>) -> Self {
        Self { reflector, existing: DashMap::new(), parents: DashMap::new() }
    }

    pub fn reflector(&self) -> &dyn Reflector {
        self.reflector.as_ref()
    }

    pub fn class(&self, name: &str) -> Option<&ClassInfo> {
        self.reflector.class(strip_root(name))
    }

    /// Memoized existence check.
    pub fn exists(&self, name: &str) -> bool {
        let name = strip_root(name);
        if let Some(hit) = self.existing.get(name) {
            return *hit;
        }
        let found = self.reflector.class(name).is_some();
        trace!(class = name, found, "ClassLookup::exists - caching");
        self.existing.insert(name.to_string(), found);
        found
    }

    /// Memoized existence check for resolved parent names.
    pub fn parent_exists(&self, parent: &str) -> bool {
        if let Some(hit) = self.parents.get(parent) {
            return *hit;
        }
        let found = self.reflector.class(strip_root(parent)).is_some();
        trace!(parent, found, "ClassLookup::parent_exists - caching");
        self.parents.insert(parent.to_string(), found);
        found
    }

    /// Fully qualified name of the immediate ancestor.
    pub fn parent_of(&self, name: &str) -> Option<String> {
        let parent = self.class(name)?.parent.as_deref()?;
        Some(self.canonical_name(parent))
    }

    /// Spelling registered by the reflector, or the name without root marker.
    pub fn canonical_name(&self, name: &str) -> String {
        self.class(name).map_or_else(|| strip_root(name).to_string(), |c| c.name.clone())
    }

    /// `name` is `ancestor`, extends it, or implements it.
    pub fn is_a(&self, name: &str, ancestor: &str) -> bool {
        let mut seen = HashSet::new();
        self.is_a_inner(strip_root(name), strip_root(ancestor), &mut seen)
    }

    fn is_a_inner(&self, name: &str, ancestor: &str, seen: &mut HashSet<String>) -> bool {
        if name.eq_ignore_ascii_case(ancestor) {
            return true;
        }
        if !seen.insert(name.to_ascii_lowercase()) {
            return false;
        }
        let Some(class) = self.class(name) else {
            return false;
        };
        class
            .parent
            .iter()
            .chain(class.interfaces.iter())
            .any(|next| self.is_a_inner(strip_root(next), ancestor, seen))
    }

    pub fn is_enum(&self, name: &str) -> bool {
        matches!(self.class(name), Some(c) if c.kind == ClassKind::Enum) || self.is_a(name, ENUM_INTERFACE)
    }

    /// Iterable or indexable through one of [`COLLECTION_INTERFACES`].
    pub fn is_collection_like(&self, name: &str) -> bool {
        COLLECTION_INTERFACES.iter().any(|iface| self.is_a(name, iface))
    }

    /// Object, enum or backed enum for a class name.
    pub fn classify(&self, name: &str) -> Result<Type> {
        let canonical = self.canonical_name(name);
        if !self.is_enum(&canonical) {
            return Ok(Type::object_of(canonical));
        }
        let backing = self.class(&canonical).and_then(|c| c.backing).map(Type::builtin);
        Type::enumeration(canonical, backing)
    }

    /// Object-like type whose class is (or descends from) `class`.
    pub fn type_is_a(&self, ty: &Type, class: &str) -> bool {
        match ty {
            Type::Collection(c) => self.type_is_a(c.wrapped(), class),
            Type::Generic(g) => self.type_is_a(g.wrapped(), class),
            Type::Nullable(inner) => self.type_is_a(inner, class),
            Type::Builtin(b) => b.kind() == TypeIdentifier::Object && class.eq_ignore_ascii_case("object"),
            other => other.class_name().is_some_and(|name| self.is_a(name, class)),
        }
    }

    pub fn clear(&self) {
        self.existing.clear();
        self.parents.clear();
    }

    pub fn cached_entries(&self) -> usize {
        self.existing.len() + self.parents.len()
    }
}

pub(crate) fn strip_root(name: &str) -> &str {
    name.trim_start_matches('\\')
}
