//! Categorical string lookups for discrete properties.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::core::ExtraMetadata;
use crate::util::{Error, Result};

/// Bidirectional mapping between integer codes and display strings.
///
/// Storage switches between a dense list (code = position) and a sparse
/// map depending on how contiguous the codes are. The representation is
/// not observable through lookups; reverse lookups always return the
/// lowest code carrying the text.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StringLookup {
    pub uuid: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "ExtraMetadata::is_empty")]
    pub extra_metadata: ExtraMetadata,
    storage: LookupStorage,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "storage", content = "entries", rename_all = "snake_case")]
enum LookupStorage {
    Dense(Vec<Option<String>>),
    Sparse(BTreeMap<i64, String>),
}

impl Default for LookupStorage {
    fn default() -> Self {
        Self::Dense(Vec::new())
    }
}

impl StringLookup {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            title: title.into(),
            extra_metadata: ExtraMetadata::new(),
            storage: LookupStorage::default(),
        }
    }

    /// Build from (code, text) pairs.
    pub fn from_pairs<S: Into<String>>(title: impl Into<String>, pairs: impl IntoIterator<Item = (i64, S)>) -> Result<Self> {
        let mut lookup = Self::new(title);
        for (code, text) in pairs {
            lookup.set_string(code, text)?;
        }
        Ok(lookup)
    }

    /// Bind `text` to `code`. Rebinding the same text is a no-op; binding
    /// different text to a used code fails with `DuplicateCode`.
    pub fn set_string(&mut self, code: i64, text: impl Into<String>) -> Result<()> {
        let text = text.into();
        if let Some(existing) = self.get_string(code) {
            if existing == text {
                return Ok(());
            }
            return Err(Error::DuplicateCode {
                code,
                existing: existing.to_string(),
                requested: text,
            });
        }
        let mut map = self.as_map();
        map.insert(code, text);
        self.storage = Self::choose_storage(map);
        Ok(())
    }

    /// Text for a code, None if unbound.
    pub fn get_string(&self, code: i64) -> Option<&str> {
        match &self.storage {
            LookupStorage::Dense(list) => usize::try_from(code)
                .ok()
                .and_then(|i| list.get(i))
                .and_then(|s| s.as_deref()),
            LookupStorage::Sparse(map) => map.get(&code).map(|s| s.as_str()),
        }
    }

    /// Lowest code bound to `text`, None if absent.
    pub fn get_index_for_string(&self, text: &str) -> Option<i64> {
        match &self.storage {
            LookupStorage::Dense(list) => list
                .iter()
                .position(|s| s.as_deref() == Some(text))
                .map(|i| i as i64),
            LookupStorage::Sparse(map) => map.iter().find(|(_, s)| s.as_str() == text).map(|(c, _)| *c),
        }
    }

    /// All bindings ordered by code.
    pub fn as_map(&self) -> BTreeMap<i64, String> {
        match &self.storage {
            LookupStorage::Dense(list) => list
                .iter()
                .enumerate()
                .filter_map(|(i, s)| s.clone().map(|s| (i as i64, s)))
                .collect(),
            LookupStorage::Sparse(map) => map.clone(),
        }
    }

    /// Dense: highest code + 1. Sparse: number of entries.
    pub fn length(&self) -> usize {
        match &self.storage {
            LookupStorage::Dense(list) => list.len(),
            LookupStorage::Sparse(map) => map.len(),
        }
    }

    /// True when stored as a dense list.
    pub fn stored_as_list(&self) -> bool {
        matches!(self.storage, LookupStorage::Dense(_))
    }

    pub fn min_index(&self) -> Option<i64> {
        self.as_map().keys().next().copied()
    }

    pub fn max_index(&self) -> Option<i64> {
        self.as_map().keys().next_back().copied()
    }

    /// Same bindings and extra metadata; titles are ignored.
    pub fn same_content(&self, other: &StringLookup) -> bool {
        self.as_map() == other.as_map() && self.extra_metadata == other.extra_metadata
    }

    fn choose_storage(map: BTreeMap<i64, String>) -> LookupStorage {
        let dense = match (map.keys().next(), map.keys().next_back()) {
            (Some(&min), Some(&max)) => min >= 0 && (max as u64) < 2 * map.len() as u64,
            _ => true,
        };
        if !dense {
            return LookupStorage::Sparse(map);
        }
        let len = map.keys().next_back().map_or(0, |m| *m as usize + 1);
        let mut list = vec![None; len];
        for (code, text) in map {
            list[code as usize] = Some(text);
        }
        LookupStorage::Dense(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dense_from_contiguous_codes() {
        let lookup = StringLookup::from_pairs("stuff", [(1, "one"), (2, "two"), (3, "three"), (4, "four")]).unwrap();
        assert!(lookup.stored_as_list());
        assert_eq!(lookup.length(), 5);
        assert_eq!(lookup.get_string(0), None);
        assert_eq!(lookup.get_string(3), Some("three"));
        assert_eq!(lookup.get_index_for_string("four"), Some(4));
        assert_eq!(lookup.min_index(), Some(1));
        assert_eq!(lookup.max_index(), Some(4));
    }

    #[test]
    fn test_sparse_from_scattered_codes() {
        let lookup =
            StringLookup::from_pairs("sparse", [(0, "zero"), (27, "twenty seven"), (173, "a big number"), (1072, "a very big number")])
                .unwrap();
        assert!(!lookup.stored_as_list());
        assert_eq!(lookup.length(), 4);
        assert_eq!(lookup.get_string(173), Some("a big number"));
        assert_eq!(lookup.get_string(555), None);
        assert_eq!(lookup.get_index_for_string("nothing"), None);
    }

    #[test]
    fn test_negative_codes_are_sparse() {
        let lookup = StringLookup::from_pairs("neg", [(-1, "unset"), (0, "shale")]).unwrap();
        assert!(!lookup.stored_as_list());
        assert_eq!(lookup.get_string(-1), Some("unset"));
    }

    #[test]
    fn test_set_string_idempotent_and_conflict() {
        let mut lookup = StringLookup::new("facies");
        lookup.set_string(2, "sand").unwrap();
        lookup.set_string(2, "sand").unwrap();
        assert_eq!(lookup.as_map().len(), 1);

        let err = lookup.set_string(2, "shale").unwrap_err();
        assert!(matches!(err, Error::DuplicateCode { code: 2, .. }));
        assert_eq!(lookup.get_string(2), Some("sand"));
    }

    #[test]
    fn test_representation_switches() {
        let mut lookup = StringLookup::from_pairs("grow", [(0, "a"), (1, "b")]).unwrap();
        assert!(lookup.stored_as_list());
        lookup.set_string(100, "far").unwrap();
        assert!(!lookup.stored_as_list());
        assert_eq!(lookup.get_string(1), Some("b"));
    }

    #[test]
    fn test_reverse_lookup_lowest_code() {
        let dense = StringLookup::from_pairs("dup", [(0, "x"), (1, "y"), (2, "x")]).unwrap();
        let sparse = StringLookup::from_pairs("dup", [(-5, "y"), (7, "x"), (40, "x")]).unwrap();
        assert_eq!(dense.get_index_for_string("x"), Some(0));
        assert_eq!(sparse.get_index_for_string("x"), Some(7));
    }

    #[test]
    fn test_same_content_ignores_title() {
        let a = StringLookup::from_pairs("a", [(0, "x")]).unwrap();
        let mut b = StringLookup::from_pairs("b", [(0, "x")]).unwrap();
        assert!(a.same_content(&b));
        b.extra_metadata.set("source", "log");
        assert!(!a.same_content(&b));
    }

    #[test]
    fn test_serde_roundtrip() {
        let lookup = StringLookup::from_pairs("s", [(0, "zero"), (1072, "big")]).unwrap();
        let json = serde_json::to_string(&lookup).unwrap();
        let back: StringLookup = serde_json::from_str(&json).unwrap();
        assert!(back.same_content(&lookup));
        assert!(!back.stored_as_list());
    }
}
