//! Property kind registry.
//!
//! Standard kind names are loaded once when the registry is built. Local
//! kinds are created on first use of an unseen (title, parent, extra
//! metadata) triple; later requests for an equal triple return the existing
//! kind.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

use super::standard_kinds::STANDARD_KINDS;
use crate::core::ExtraMetadata;

/// Parent classification assumed when none is given.
pub const DEFAULT_PARENT: &str = "continuous";

/// A locally defined property kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyKind {
    pub uuid: Uuid,
    pub title: String,
    /// Parent kind name, e.g. "continuous" or "discrete".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "ExtraMetadata::is_empty")]
    pub extra_metadata: ExtraMetadata,
}

impl PropertyKind {
    /// Parent name with the default applied.
    pub fn parent_or_default(&self) -> &str {
        self.parent.as_deref().unwrap_or(DEFAULT_PARENT)
    }

    fn key(&self) -> KindKey {
        KindKey::new(&self.title, self.parent.as_deref(), &self.extra_metadata)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct KindKey {
    title: String,
    parent: String,
    extra: Vec<(String, String)>,
}

impl KindKey {
    fn new(title: &str, parent: Option<&str>, extra: &ExtraMetadata) -> Self {
        Self {
            title: title.to_string(),
            parent: parent.unwrap_or(DEFAULT_PARENT).to_string(),
            extra: extra.canonical(),
        }
    }
}

/// Registry of standard and local property kinds for one model.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(from = "Vec<PropertyKind>", into = "Vec<PropertyKind>")]
pub struct PropertyKindRegistry {
    standard: BTreeSet<&'static str>,
    local: Vec<PropertyKind>,
    by_key: HashMap<KindKey, usize>,
}

impl Default for PropertyKindRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyKindRegistry {
    pub fn new() -> Self {
        Self {
            standard: STANDARD_KINDS.iter().copied().collect(),
            local: Vec::new(),
            by_key: HashMap::new(),
        }
    }

    /// True for a standard (non-local) kind name.
    pub fn is_standard(&self, name: &str) -> bool {
        self.standard.contains(name)
    }

    /// Sorted standard kind names.
    pub fn valid_property_kinds(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.standard.iter().copied()
    }

    /// Uuid of the local kind equal to the triple, creating it if unseen.
    pub fn create_local_kind(&mut self, title: &str, parent: Option<&str>, extra_metadata: &ExtraMetadata) -> Uuid {
        let key = KindKey::new(title, parent, extra_metadata);
        if let Some(&i) = self.by_key.get(&key) {
            return self.local[i].uuid;
        }
        let kind = PropertyKind {
            uuid: Uuid::new_v4(),
            title: title.to_string(),
            parent: parent.map(str::to_string),
            extra_metadata: extra_metadata.clone(),
        };
        tracing::debug!(title, parent = kind.parent_or_default(), uuid = %kind.uuid, "created local property kind");
        let uuid = kind.uuid;
        self.by_key.insert(key, self.local.len());
        self.local.push(kind);
        uuid
    }

    pub fn local_kind(&self, uuid: &Uuid) -> Option<&PropertyKind> {
        self.local.iter().find(|k| &k.uuid == uuid)
    }

    /// First local kind with the given title.
    pub fn local_kind_by_title(&self, title: &str) -> Option<&PropertyKind> {
        self.local.iter().find(|k| k.title == title)
    }

    pub fn local_kinds(&self) -> &[PropertyKind] {
        &self.local
    }

    /// Number of local kinds.
    pub fn len(&self) -> usize {
        self.local.len()
    }

    pub fn is_empty(&self) -> bool {
        self.local.is_empty()
    }
}

impl From<Vec<PropertyKind>> for PropertyKindRegistry {
    fn from(kinds: Vec<PropertyKind>) -> Self {
        let mut registry = Self::new();
        for kind in kinds {
            let key = kind.key();
            if registry.by_key.contains_key(&key) {
                continue;
            }
            registry.by_key.insert(key, registry.local.len());
            registry.local.push(kind);
        }
        registry
    }
}

impl From<PropertyKindRegistry> for Vec<PropertyKind> {
    fn from(registry: PropertyKindRegistry) -> Self {
        registry.local
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn important() -> ExtraMetadata {
        ExtraMetadata::new()
            .with("something", "important")
            .with("and_another_thing", "42")
    }

    #[test]
    fn test_standard_kinds_loaded() {
        let reg = PropertyKindRegistry::new();
        assert!(reg.is_standard("angle per time"));
        assert!(reg.is_standard("porosity"));
        assert!(!reg.is_standard("foobar"));
        assert!(reg.valid_property_kinds().any(|k| k == "net to gross ratio"));
        assert!(reg.is_empty());
    }

    #[test]
    fn test_local_kind_dedup() {
        let mut reg = PropertyKindRegistry::new();
        let pk1 = reg.create_local_kind("my kind of property", None, &important());
        let pk2 = reg.create_local_kind("my kind of property", None, &important());
        assert_eq!(pk1, pk2);
        assert_eq!(reg.len(), 1);

        let pk3 = reg.create_local_kind("your kind of property", None, &important());
        assert_ne!(pk1, pk3);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_absent_parent_means_continuous() {
        let mut reg = PropertyKindRegistry::new();
        let pk4 = reg.create_local_kind("ours", Some("continuous"), &important());
        let pk6 = reg.create_local_kind("ours", None, &important());
        assert_eq!(pk4, pk6);

        let pk5 = reg.create_local_kind("ours", Some("discrete"), &important());
        assert_ne!(pk4, pk5);

        let more = important().with("yet", "more");
        let pk7 = reg.create_local_kind("ours", None, &more);
        assert_ne!(pk4, pk7);
        assert_eq!(reg.len(), 3);
    }

    #[test]
    fn test_extra_metadata_order_irrelevant() {
        let mut reg = PropertyKindRegistry::new();
        let a = ExtraMetadata::new().with("a", "1").with("b", "2");
        let b = ExtraMetadata::new().with("b", "2").with("a", "1");
        assert_eq!(reg.create_local_kind("k", None, &a), reg.create_local_kind("k", None, &b));
    }

    #[test]
    fn test_serde_keeps_local_kinds_only() {
        let mut reg = PropertyKindRegistry::new();
        let uuid = reg.create_local_kind("zone", Some("discrete"), &ExtraMetadata::new());
        let json = serde_json::to_string(&reg).unwrap();
        assert!(!json.contains("porosity"));

        let mut back: PropertyKindRegistry = serde_json::from_str(&json).unwrap();
        assert!(back.is_standard("porosity"));
        assert_eq!(back.local_kind(&uuid).unwrap().parent_or_default(), "discrete");
        assert_eq!(back.create_local_kind("zone", Some("discrete"), &ExtraMetadata::new()), uuid);
    }
}
