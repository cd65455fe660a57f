//! Extra metadata for property descriptors, kinds and lookups.
//!
//! Extra metadata is an open set of string key/value pairs. It is opaque to
//! the collection engine except for duplicate detection, where two maps are
//! equal when they hold the same pairs in any order.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;

/// Key-value metadata storage, insertion ordered.
///
/// Uses SmallVec optimization for common case of few entries.
#[derive(Clone, Default)]
pub struct ExtraMetadata {
    entries: SmallVec<[(String, String); 4]>,
}

impl ExtraMetadata {
    /// Create empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, replacing any existing value for the key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();

        if let Some((_, v)) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            *v = value;
            return;
        }
        self.entries.push((key, value));
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Remove a key and return its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over key-value pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Order-independent key used for duplicate detection.
    pub fn canonical(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<_> = self.entries.iter().cloned().collect();
        pairs.sort();
        pairs
    }

    /// Serialize to `key=value;key2=value2` with `\`, `;` and `=` escaped.
    /// Pairs are written in canonical (sorted) order.
    pub fn serialize(&self) -> String {
        self.canonical()
            .iter()
            .map(|(k, v)| format!("{}={}", escape(k), escape(v)))
            .collect::<Vec<_>>()
            .join(";")
    }

    /// Parse the format produced by [`serialize`](Self::serialize).
    pub fn parse(s: &str) -> Self {
        let mut meta = Self::new();
        for part in split_unescaped(s, b';') {
            if let Some(eq) = find_unescaped(part, b'=') {
                let key = unescape(&part[..eq]);
                if !key.is_empty() {
                    meta.set(key, unescape(&part[eq + 1..]));
                }
            }
        }
        meta
    }
}

impl PartialEq for ExtraMetadata {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.canonical() == other.canonical()
    }
}

impl Eq for ExtraMetadata {}

impl fmt::Debug for ExtraMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl From<HashMap<String, String>> for ExtraMetadata {
    fn from(map: HashMap<String, String>) -> Self {
        map.into_iter().collect()
    }
}

impl FromIterator<(String, String)> for ExtraMetadata {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        let mut meta = Self::new();
        for (k, v) in iter {
            meta.set(k, v);
        }
        meta
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for ExtraMetadata {
    fn from_iter<T: IntoIterator<Item = (&'a str, &'a str)>>(iter: T) -> Self {
        iter.into_iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }
}

impl Serialize for ExtraMetadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct ExtraMetadataVisitor;

impl<'de> Visitor<'de> for ExtraMetadataVisitor {
    type Value = ExtraMetadata;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of strings")
    }

    fn visit_map<M: MapAccess<'de>>(self, mut access: M) -> Result<Self::Value, M::Error> {
        let mut meta = ExtraMetadata::new();
        while let Some((k, v)) = access.next_entry::<String, String>()? {
            meta.set(k, v);
        }
        Ok(meta)
    }
}

impl<'de> Deserialize<'de> for ExtraMetadata {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ExtraMetadataVisitor)
    }
}

fn escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | ';' | '=') {
            result.push('\\');
        }
        result.push(c);
    }
    result
}

fn unescape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('\\', Some(&next)) if matches!(next, '\\' | ';' | '=') => {
                result.push(next);
                chars.next();
            }
            _ => result.push(c),
        }
    }
    result
}

/// True if the byte at `i` is preceded by an even number of backslashes.
fn unescaped_at(bytes: &[u8], i: usize) -> bool {
    bytes[..i].iter().rev().take_while(|b| **b == b'\\').count() % 2 == 0
}

fn find_unescaped(s: &str, ch: u8) -> Option<usize> {
    let bytes = s.as_bytes();
    (0..bytes.len()).find(|&i| bytes[i] == ch && unescaped_at(bytes, i))
}

fn split_unescaped(s: &str, sep: u8) -> Vec<&str> {
    let bytes = s.as_bytes();
    let mut parts = Vec::new();
    let mut start = 0;
    for i in 0..bytes.len() {
        if bytes[i] == sep && unescaped_at(bytes, i) {
            parts.push(&s[start..i]);
            start = i + 1;
        }
    }
    if start < s.len() {
        parts.push(&s[start..]);
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_update() {
        let mut meta = ExtraMetadata::new();
        meta.set("source", "sim");
        meta.set("source", "well log");

        assert_eq!(meta.get("source"), Some("well log"));
        assert_eq!(meta.len(), 1);
        assert_eq!(meta.remove("source").as_deref(), Some("well log"));
        assert!(meta.is_empty());
    }

    #[test]
    fn test_equality_ignores_order() {
        let a = ExtraMetadata::new().with("a", "1").with("b", "2");
        let b = ExtraMetadata::new().with("b", "2").with("a", "1");
        let c = ExtraMetadata::new().with("a", "1");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.canonical(), b.canonical());
    }

    #[test]
    fn test_serialize_parse() {
        let meta = ExtraMetadata::new()
            .with("zone=top", "a;b")
            .with("origin", "C:\\data");

        let s = meta.serialize();
        assert!(s.starts_with("origin="));
        let parsed = ExtraMetadata::parse(&s);
        assert_eq!(parsed, meta);
        assert_eq!(parsed.get("zone=top"), Some("a;b"));
        assert!(ExtraMetadata::parse("").is_empty());
    }

    #[test]
    fn test_serde_as_map() {
        let meta = ExtraMetadata::new().with("b", "2").with("a", "1");
        let json = serde_json::to_string(&meta).unwrap();
        assert_eq!(json, r#"{"b":"2","a":"1"}"#);
        let back: ExtraMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back.iter().next(), Some(("b", "2")));
    }
}
