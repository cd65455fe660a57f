//! Model - the metadata persistence collaborator.
//!
//! A [`Model`] owns every metadata record of one dataset (supports,
//! property descriptors, kinds, lookups, time series, property sets) and
//! the array store holding property payloads. On disk a model is a JSON
//! catalog `X.json` plus a binary store `X.parr` next to it.
//!
//! Property collections share a model through [`SharedModel`]. Concurrent
//! writes to the same array from different collections are not coordinated
//! here; callers serialize them.

mod catalog;
mod property_set;

pub use catalog::{store_path_for, Catalog, CATALOG_VERSION, STORE_EXTENSION};
pub use property_set::PropertySet;

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::{ExtraMetadata, TimeSeries};
use crate::property::{PropertyDescriptor, PropertyKind, PropertyKindRegistry, StringLookup};
use crate::store::{ArrayStore, FileArrayStore, MemoryArrayStore, StoreOptions};
use crate::support::{Support, SupportObject};
use crate::util::{Error, Result};

/// Model shared between property collections.
pub type SharedModel = Arc<RwLock<Model>>;

/// Record types held by a model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Support,
    Property,
    PropertyKind,
    StringLookup,
    TimeSeries,
    PropertySet,
}

impl RecordKind {
    pub const ALL: [RecordKind; 6] = [
        Self::Support,
        Self::Property,
        Self::PropertyKind,
        Self::StringLookup,
        Self::TimeSeries,
        Self::PropertySet,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Support => "supports",
            Self::Property => "properties",
            Self::PropertyKind => "local property kinds",
            Self::StringLookup => "string lookups",
            Self::TimeSeries => "time series",
            Self::PropertySet => "property sets",
        }
    }
}

/// Metadata records plus the array store of one dataset.
pub struct Model {
    store: Box<dyn ArrayStore>,
    supports: Vec<SupportObject>,
    order: Vec<Uuid>,
    properties: HashMap<Uuid, Arc<PropertyDescriptor>>,
    kinds: PropertyKindRegistry,
    lookups: Vec<StringLookup>,
    time_series: Vec<TimeSeries>,
    property_sets: Vec<PropertySet>,
    path: Option<PathBuf>,
}

impl Model {
    fn with_store(store: Box<dyn ArrayStore>, path: Option<PathBuf>) -> Self {
        Self {
            store,
            supports: Vec::new(),
            order: Vec::new(),
            properties: HashMap::new(),
            kinds: PropertyKindRegistry::new(),
            lookups: Vec::new(),
            time_series: Vec::new(),
            property_sets: Vec::new(),
            path,
        }
    }

    /// Scratch model backed by memory; cannot be saved.
    pub fn in_memory() -> Self {
        Self::with_store(Box::new(MemoryArrayStore::new()), None)
    }

    /// Create a new on-disk model, truncating any existing catalog and store.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let store = FileArrayStore::create(store_path_for(&path))?;
        let mut model = Self::with_store(Box::new(store), Some(path));
        model.save()?;
        info!(path = %model.path_display(), "created model");
        Ok(model)
    }

    /// Open an existing model read-write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, StoreOptions::default())
    }

    /// Open an existing model with explicit store options.
    pub fn open_with(path: impl AsRef<Path>, options: StoreOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let catalog = Catalog::read(&path)?;
        let store = FileArrayStore::open_with(store_path_for(&path), options)?;
        let mut model = Self::with_store(Box::new(store), Some(path));
        model.supports = catalog.supports;
        model.kinds = catalog.property_kinds;
        model.lookups = catalog.string_lookups;
        model.time_series = catalog.time_series;
        model.property_sets = catalog.property_sets;
        for d in catalog.properties {
            model.order.push(d.uuid);
            model.properties.insert(d.uuid, Arc::new(d));
        }
        info!(
            path = %model.path_display(),
            properties = model.order.len(),
            supports = model.supports.len(),
            "opened model"
        );
        Ok(model)
    }

    /// Write the catalog and flush the array store.
    pub fn save(&mut self) -> Result<()> {
        let path = self
            .path
            .clone()
            .ok_or_else(|| Error::other("in-memory model cannot be saved"))?;
        let catalog = Catalog {
            version: CATALOG_VERSION,
            supports: self.supports.clone(),
            properties: self.properties().map(|d| d.as_ref().clone()).collect(),
            property_kinds: self.kinds.clone(),
            string_lookups: self.lookups.clone(),
            time_series: self.time_series.clone(),
            property_sets: self.property_sets.clone(),
        };
        self.store.flush()?;
        catalog.write(&path)?;
        info!(path = %path.display(), properties = self.order.len(), "saved model");
        Ok(())
    }

    pub fn into_shared(self) -> SharedModel {
        Arc::new(RwLock::new(self))
    }

    /// Catalog path, None for in-memory models.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn path_display(&self) -> String {
        self.path
            .as_ref()
            .map_or_else(|| "<memory>".to_string(), |p| p.display().to_string())
    }

    pub fn store(&self) -> &dyn ArrayStore {
        self.store.as_ref()
    }

    pub fn store_mut(&mut self) -> &mut dyn ArrayStore {
        self.store.as_mut()
    }

    // ---- supports ----

    pub fn add_support(&mut self, support: impl Into<SupportObject>) -> Uuid {
        let support = support.into();
        let uuid = support.as_support().uuid();
        self.supports.retain(|s| s.as_support().uuid() != uuid);
        self.supports.push(support);
        uuid
    }

    pub fn support(&self, uuid: &Uuid) -> Option<&dyn Support> {
        self.support_object(uuid).map(SupportObject::as_support)
    }

    pub fn support_mut(&mut self, uuid: &Uuid) -> Option<&mut dyn Support> {
        self.supports
            .iter_mut()
            .find(|s| s.as_support().uuid() == *uuid)
            .map(SupportObject::as_support_mut)
    }

    pub fn support_object(&self, uuid: &Uuid) -> Option<&SupportObject> {
        self.supports.iter().find(|s| s.as_support().uuid() == *uuid)
    }

    pub fn supports(&self) -> impl Iterator<Item = &SupportObject> {
        self.supports.iter()
    }

    // ---- properties ----

    /// Register a new descriptor. The support must exist and the uuid must be unused.
    pub fn add_property(&mut self, descriptor: PropertyDescriptor) -> Result<Arc<PropertyDescriptor>> {
        descriptor.validate()?;
        if self.support(&descriptor.support_uuid).is_none() {
            return Err(Error::not_found(format!("support {}", descriptor.support_uuid)));
        }
        if self.properties.contains_key(&descriptor.uuid) {
            return Err(Error::descriptor(format!("uuid {} already in use", descriptor.uuid)));
        }
        let uuid = descriptor.uuid;
        let descriptor = Arc::new(descriptor);
        self.order.push(uuid);
        self.properties.insert(uuid, Arc::clone(&descriptor));
        debug!(%uuid, kind = %descriptor.property_kind, "added property");
        Ok(descriptor)
    }

    /// Replace the record of an existing descriptor, keeping its position.
    pub fn replace_property(&mut self, descriptor: PropertyDescriptor) -> Result<Arc<PropertyDescriptor>> {
        descriptor.validate()?;
        let slot = self
            .properties
            .get_mut(&descriptor.uuid)
            .ok_or_else(|| Error::not_found(format!("property {}", descriptor.uuid)))?;
        if slot.support_uuid != descriptor.support_uuid {
            return Err(Error::SupportMismatch {
                expected: slot.support_uuid.to_string(),
                actual: descriptor.support_uuid.to_string(),
            });
        }
        let descriptor = Arc::new(descriptor);
        *slot = Arc::clone(&descriptor);
        Ok(descriptor)
    }

    pub fn property(&self, uuid: &Uuid) -> Option<Arc<PropertyDescriptor>> {
        self.properties.get(uuid).cloned()
    }

    /// All descriptors in insertion order.
    pub fn properties(&self) -> impl Iterator<Item = &Arc<PropertyDescriptor>> {
        self.order.iter().filter_map(|u| self.properties.get(u))
    }

    /// Descriptors attached to a support, in insertion order.
    pub fn properties_for_support(&self, support_uuid: &Uuid) -> Vec<Arc<PropertyDescriptor>> {
        self.properties()
            .filter(|d| d.support_uuid == *support_uuid)
            .cloned()
            .collect()
    }

    /// Drop a descriptor record. Its stored array, if any, stays in the store.
    pub fn remove_property(&mut self, uuid: &Uuid) -> Option<Arc<PropertyDescriptor>> {
        let removed = self.properties.remove(uuid)?;
        self.order.retain(|u| u != uuid);
        debug!(%uuid, "removed property");
        Some(removed)
    }

    // ---- time series ----

    pub fn add_time_series(&mut self, series: TimeSeries) -> Uuid {
        let uuid = series.uuid;
        self.time_series.retain(|t| t.uuid != uuid);
        self.time_series.push(series);
        uuid
    }

    pub fn time_series(&self, uuid: &Uuid) -> Option<&TimeSeries> {
        self.time_series.iter().find(|t| t.uuid == *uuid)
    }

    // ---- string lookups ----

    /// Register a lookup, returning the uuid of an existing lookup with the
    /// same content instead when there is one.
    pub fn create_string_lookup(&mut self, lookup: StringLookup) -> Uuid {
        if let Some(existing) = self.lookups.iter().find(|l| l.same_content(&lookup)) {
            debug!(uuid = %existing.uuid, title = %lookup.title, "reusing equivalent string lookup");
            return existing.uuid;
        }
        let uuid = lookup.uuid;
        self.lookups.push(lookup);
        uuid
    }

    pub fn string_lookup(&self, uuid: &Uuid) -> Option<&StringLookup> {
        self.lookups.iter().find(|l| l.uuid == *uuid)
    }

    // ---- property kinds ----

    /// Local kind uuid for the triple, created on first use.
    pub fn create_property_kind(&mut self, title: &str, parent: Option<&str>, extra_metadata: &ExtraMetadata) -> Uuid {
        self.kinds.create_local_kind(title, parent, extra_metadata)
    }

    pub fn property_kind(&self, uuid: &Uuid) -> Option<&PropertyKind> {
        self.kinds.local_kind(uuid)
    }

    pub fn kinds(&self) -> &PropertyKindRegistry {
        &self.kinds
    }

    pub fn kinds_mut(&mut self) -> &mut PropertyKindRegistry {
        &mut self.kinds
    }

    // ---- property sets ----

    pub fn create_property_set(&mut self, set: PropertySet) -> Uuid {
        let uuid = set.uuid;
        self.property_sets.retain(|s| s.uuid != uuid);
        self.property_sets.push(set);
        uuid
    }

    pub fn property_set(&self, uuid: &Uuid) -> Option<&PropertySet> {
        self.property_sets.iter().find(|s| s.uuid == *uuid)
    }

    // ---- enumeration ----

    /// Number of records of one type.
    pub fn count(&self, kind: RecordKind) -> usize {
        match kind {
            RecordKind::Support => self.supports.len(),
            RecordKind::Property => self.order.len(),
            RecordKind::PropertyKind => self.kinds.len(),
            RecordKind::StringLookup => self.lookups.len(),
            RecordKind::TimeSeries => self.time_series.len(),
            RecordKind::PropertySet => self.property_sets.len(),
        }
    }

    /// Titles of the records of one type, in insertion order.
    pub fn titles(&self, kind: RecordKind) -> Vec<String> {
        match kind {
            RecordKind::Support => self.supports.iter().map(|s| s.as_support().title().to_string()).collect(),
            RecordKind::Property => self.properties().map(|d| d.citation_title.clone()).collect(),
            RecordKind::PropertyKind => self.kinds.local_kinds().iter().map(|k| k.title.clone()).collect(),
            RecordKind::StringLookup => self.lookups.iter().map(|l| l.title.clone()).collect(),
            RecordKind::TimeSeries => self.time_series.iter().map(|t| t.title.clone()).collect(),
            RecordKind::PropertySet => self.property_sets.iter().map(|s| s.title.clone()).collect(),
        }
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("path", &self.path)
            .field("supports", &self.supports.len())
            .field("properties", &self.order.len())
            .field("local_kinds", &self.kinds.len())
            .field("string_lookups", &self.lookups.len())
            .field("time_series", &self.time_series.len())
            .field("property_sets", &self.property_sets.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::descriptor::fixtures::descriptor;
    use crate::support::RegularGrid;

    #[test]
    fn test_add_and_remove_property() {
        let mut model = Model::in_memory();
        let grid = model.add_support(RegularGrid::new("g", 2, 3, 4));

        let a = descriptor(grid, "porosity");
        let b = descriptor(grid, "net to gross ratio");
        let (ua, ub) = (a.uuid, b.uuid);
        model.add_property(a.clone()).unwrap();
        model.add_property(b).unwrap();
        assert!(matches!(model.add_property(a), Err(Error::InvalidDescriptor(_))));

        let order: Vec<Uuid> = model.properties_for_support(&grid).iter().map(|d| d.uuid).collect();
        assert_eq!(order, vec![ua, ub]);

        assert!(model.remove_property(&ua).is_some());
        assert!(model.property(&ua).is_none());
        assert_eq!(model.count(RecordKind::Property), 1);
    }

    #[test]
    fn test_property_requires_known_support() {
        let mut model = Model::in_memory();
        let d = descriptor(Uuid::new_v4(), "porosity");
        assert!(matches!(model.add_property(d), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_lookup_dedup() {
        let mut model = Model::in_memory();
        let a = StringLookup::from_pairs("facies", [(0, "sand"), (1, "shale")]).unwrap();
        let b = StringLookup::from_pairs("facies again", [(0, "sand"), (1, "shale")]).unwrap();
        let c = StringLookup::from_pairs("facies", [(0, "sand"), (2, "shale")]).unwrap();
        let ua = model.create_string_lookup(a);
        assert_eq!(model.create_string_lookup(b), ua);
        assert_eq!(model.count(RecordKind::StringLookup), 1);
        assert_ne!(model.create_string_lookup(c), ua);
        assert_eq!(model.count(RecordKind::StringLookup), 2);
    }

    #[test]
    fn test_in_memory_save_fails() {
        let mut model = Model::in_memory();
        assert!(model.save().is_err());
    }

    #[test]
    fn test_titles() {
        let mut model = Model::in_memory();
        model.add_support(RegularGrid::new("block", 1, 1, 1));
        model.create_property_set(PropertySet::new("set one"));
        assert_eq!(model.titles(RecordKind::Support), vec!["block".to_string()]);
        assert_eq!(model.titles(RecordKind::PropertySet), vec!["set one".to_string()]);
        assert!(model.titles(RecordKind::TimeSeries).is_empty());
    }
}
