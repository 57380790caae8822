//! Reflection collaborator.
//!
//! Hosts expose their class metadata through [`Reflector`]; the resolvers only
//! ever query it, through the caching [`ClassLookup`].
pub mod lookup;
pub mod table;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ir::TypeIdentifier;

pub use lookup::ClassLookup;
pub use table::ClassTable;

/// Native type node attached to a parameter, property or return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReflectionType {
    Named(NamedType),
    Union(Vec<ReflectionType>),
    Intersection(Vec<ReflectionType>),
    /// A node shape the bridge does not know; carries its kind name.
    Other(String),
}

impl ReflectionType {
    pub fn named(name: impl Into<String>, builtin: bool, allows_null: bool) -> Self {
        ReflectionType::Named(NamedType { name: name.into(), builtin, allows_null })
    }

    /// Native builtin; `null` and `mixed` allow null by nature.
    pub fn builtin(name: impl Into<String>) -> Self {
        let name = name.into();
        let allows_null = matches!(name.as_str(), "null" | "mixed");
        ReflectionType::named(name, true, allows_null)
    }

    pub fn class(name: impl Into<String>) -> Self {
        ReflectionType::named(name, false, false)
    }

    /// Same node, accepting null.
    pub fn or_null(self) -> Self {
        match self {
            ReflectionType::Named(named) => ReflectionType::Named(NamedType { allows_null: true, ..named }),
            other => other,
        }
    }

    pub fn kind_name(&self) -> &str {
        match self {
            ReflectionType::Named(_) => "named type",
            ReflectionType::Union(_) => "union type",
            ReflectionType::Intersection(_) => "intersection type",
            ReflectionType::Other(kind) => kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ManifestNamedType")]
pub struct NamedType {
    pub name: String,
    pub builtin: bool,
    pub allows_null: bool,
}

/// Manifest spelling of [`NamedType`]: `builtin` defaults to whether the
/// name is a builtin keyword.
#[derive(Deserialize)]
struct ManifestNamedType {
    name: String,
    #[serde(default)]
    builtin: Option<bool>,
    #[serde(default)]
    allows_null: bool,
}

impl From<ManifestNamedType> for NamedType {
    fn from(raw: ManifestNamedType) -> Self {
        let builtin = raw.builtin.unwrap_or_else(|| TypeIdentifier::from_name(&raw.name).is_some());
        NamedType { name: raw.name, builtin, allows_null: raw.allows_null }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    Class,
    Interface,
    Trait,
    Enum,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    /// Fully qualified name, without root marker.
    pub name: String,
    #[serde(default = "default_class_kind")]
    pub kind: ClassKind,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub traits: Vec<String>,
    /// `int` or `string` for backed enums.
    #[serde(default)]
    pub backing: Option<TypeIdentifier>,
    /// Alias table (`short name -> target`) of the declaring file.
    #[serde(default)]
    pub uses: IndexMap<String, String>,
    #[serde(default)]
    pub doc_comment: Option<String>,
    #[serde(default)]
    pub properties: Vec<PropertyInfo>,
    #[serde(default)]
    pub methods: Vec<FunctionInfo>,
}

fn default_class_kind() -> ClassKind {
    ClassKind::Class
}

impl ClassInfo {
    pub fn new(name: impl Into<String>, kind: ClassKind) -> Self {
        Self {
            name: name.into(),
            kind,
            parent: None,
            interfaces: Vec::new(),
            traits: Vec::new(),
            backing: None,
            uses: IndexMap::new(),
            doc_comment: None,
            properties: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn short_name(&self) -> &str {
        self.name.rsplit('\\').next().unwrap_or(&self.name)
    }

    /// Namespace of the class, empty for the global one.
    pub fn namespace(&self) -> &str {
        self.name.rsplit_once('\\').map_or("", |(ns, _)| ns)
    }

    pub fn property(&self, name: &str) -> Option<&PropertyInfo> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn method(&self, name: &str) -> Option<&FunctionInfo> {
        self.methods.iter().find(|m| m.name.eq_ignore_ascii_case(name))
    }
}

/// Function or method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionInfo {
    pub name: String,
    /// Scope class for methods and bound closures.
    #[serde(default)]
    pub declaring_class: Option<String>,
    #[serde(default)]
    pub doc_comment: Option<String>,
    #[serde(default)]
    pub return_type: Option<ReflectionType>,
    #[serde(default)]
    pub parameters: Vec<ParameterInfo>,
}

impl FunctionInfo {
    pub fn parameter(&self, name: &str) -> Option<&ParameterInfo> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterInfo {
    pub name: String,
    #[serde(default, rename = "type")]
    pub ty: Option<ReflectionType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyInfo {
    pub name: String,
    #[serde(default)]
    pub declaring_class: String,
    #[serde(default)]
    pub doc_comment: Option<String>,
    #[serde(default, rename = "type")]
    pub ty: Option<ReflectionType>,
}

/// Parameter together with the function declaring it.
#[derive(Debug, Clone, Copy)]
pub struct Parameter<'a> {
    pub function: &'a FunctionInfo,
    pub info: &'a ParameterInfo,
}

/// Source of class metadata.
pub trait Reflector: Send + Sync {
    /// Looks a class-like up by fully qualified name (no root marker).
    fn class(&self, name: &str) -> Option<&ClassInfo>;

    /// Alias table in effect for `class`. Hosts harvesting it lazily may fail.
    fn imports(&self, class: &ClassInfo) -> anyhow::Result<IndexMap<String, String>> {
        Ok(class.uses.clone())
    }
}
