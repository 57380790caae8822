use indexmap::IndexMap;
use serde::Deserialize;
use tracing::debug;

use super::{ClassInfo, ClassKind, Reflector};
use crate::path_de::from_str_with_path;

/// In-memory [`Reflector`] keyed case-insensitively by class name.
#[derive(Debug, Clone, Default)]
pub struct ClassTable {
    classes: IndexMap<String, ClassInfo>,
}

/// JSON manifest accepted by [`ClassTable::from_json_str`].
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    /// Register the host's well-known interfaces first.
    #[serde(default = "yes")]
    builtins: bool,
    #[serde(default)]
    classes: Vec<ClassInfo>,
}

fn yes() -> bool {
    true
}

impl ClassTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table pre-populated with the host's capability and enum interfaces.
    pub fn with_builtins() -> Self {
        let mut table = Self::new();
        let iface = |name: &str, parents: &[&str]| {
            let mut info = ClassInfo::new(name, ClassKind::Interface);
            info.interfaces = parents.iter().map(|p| p.to_string()).collect();
            info
        };
        table.insert(iface("Traversable", &[]));
        table.insert(iface("Iterator", &["Traversable"]));
        table.insert(iface("IteratorAggregate", &["Traversable"]));
        table.insert(iface("ArrayAccess", &[]));
        table.insert(iface("Countable", &[]));
        table.insert(iface("Stringable", &[]));
        table.insert(iface("UnitEnum", &[]));
        table.insert(iface("BackedEnum", &["UnitEnum"]));
        table.insert(iface("DateTimeInterface", &[]));
        let mut date = ClassInfo::new("DateTime", ClassKind::Class);
        date.interfaces = vec!["DateTimeInterface".into()];
        table.insert(date);
        table
    }

    pub fn from_json_str(src: &str) -> anyhow::Result<Self> {
        let manifest: Manifest = from_str_with_path(src)?;
        let mut table = if manifest.builtins { Self::with_builtins() } else { Self::new() };
        for class in manifest.classes {
            table.insert(class);
        }
        debug!(classes = table.len(), "ClassTable::from_json_str - loaded");
        Ok(table)
    }

    /// Registers (or replaces) a class; the root marker is dropped.
    pub fn insert(&mut self, mut class: ClassInfo) {
        class.name = class.name.trim_start_matches('\\').to_string();
        self.classes.insert(class.name.to_ascii_lowercase(), class);
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassInfo> {
        self.classes.values()
    }
}

impl Reflector for ClassTable {
    fn class(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.get(&name.trim_start_matches('\\').to_ascii_lowercase())
    }
}
