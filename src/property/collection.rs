//! Property collection - the catalog of descriptors bound to one support.
//!
//! A collection holds an ordered list of descriptor uuids that resolve
//! through its [`SharedModel`], an explicit array cache, and an import
//! buffer of staged entries. Selection produces a new collection over the
//! same descriptors; nothing is copied. Arrays are loaded at most once per
//! collection until invalidated.

use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info_span, warn};
use uuid::Uuid;

use super::criteria::Criteria;
use super::descriptor::{Payload, PropertyDescriptor};
use super::import::ImportEntry;
use super::lookup::StringLookup;
use crate::core::{ArrayCache, IndexableElement};
use crate::model::{Model, PropertySet, SharedModel};
use crate::support::GeometrySource;
use crate::util::{leading_range, Error, PropertyArray, Result, ScalarValue};

/// Whether the parts of a collection form a snapshot at one time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeSetKind {
    NotATimeSet,
    SingleTime,
}

/// Ordered catalog of property descriptors sharing one support.
#[derive(Debug)]
pub struct PropertyCollection {
    pub(super) model: SharedModel,
    pub(super) support_uuid: Option<Uuid>,
    pub(super) parts: Vec<Uuid>,
    pub(super) realization: Option<u32>,
    pub(super) cache: ArrayCache,
    pub(super) imports: Vec<ImportEntry>,
    multiple_realizations: Option<bool>,
}

/// Materialize a descriptor's payload at its canonical shape.
pub(crate) fn load_array(model: &Model, d: &PropertyDescriptor) -> Result<PropertyArray> {
    let support = model
        .support(&d.support_uuid)
        .ok_or_else(|| Error::not_found(format!("support {}", d.support_uuid)))?;
    let shape = d.canonical_shape(support)?;
    match d.payload {
        Payload::Constant(value) => PropertyArray::filled(shape, value, d.pod),
        Payload::Stored { array_uuid } => {
            let array = model.store().read(&array_uuid)?;
            if array.shape() != &shape {
                return Err(Error::ShapeMismatch {
                    expected: shape,
                    actual: array.shape().clone(),
                });
            }
            Ok(array)
        }
    }
}

impl PropertyCollection {
    /// Empty collection with no support bound yet.
    pub fn new(model: SharedModel) -> Self {
        Self {
            model,
            support_uuid: None,
            parts: Vec::new(),
            realization: None,
            cache: ArrayCache::new(),
            imports: Vec::new(),
            multiple_realizations: None,
        }
    }

    /// Collection of every descriptor attached to a support.
    pub fn for_support(model: SharedModel, support_uuid: Uuid) -> Result<Self> {
        let parts: Vec<Uuid> = {
            let m = model.read();
            if m.support(&support_uuid).is_none() {
                return Err(Error::not_found(format!("support {}", support_uuid)));
            }
            m.properties_for_support(&support_uuid).iter().map(|d| d.uuid).collect()
        };
        let mut pc = Self::new(model);
        pc.support_uuid = Some(support_uuid);
        pc.parts = parts;
        Ok(pc)
    }

    /// Restrict the collection to one realization, dropping other parts.
    /// Parts added later are filtered the same way.
    pub fn with_realization(mut self, realization: u32) -> Self {
        self.realization = Some(realization);
        let keep = {
            let model = self.model.read();
            self.parts
                .iter()
                .copied()
                .filter(|u| model.property(u).is_some_and(|d| d.realization == Some(realization)))
                .collect()
        };
        self.parts = keep;
        self.multiple_realizations = None;
        self
    }

    /// Bind the support. Fails if the collection already holds parts on
    /// another support.
    pub fn set_support(&mut self, support_uuid: Uuid) -> Result<()> {
        if self.model.read().support(&support_uuid).is_none() {
            return Err(Error::not_found(format!("support {}", support_uuid)));
        }
        if let Some(current) = self.support_uuid {
            if current != support_uuid && !self.parts.is_empty() {
                return Err(Error::SupportMismatch {
                    expected: current.to_string(),
                    actual: support_uuid.to_string(),
                });
            }
        }
        self.support_uuid = Some(support_uuid);
        Ok(())
    }

    pub fn support_uuid(&self) -> Option<Uuid> {
        self.support_uuid
    }

    pub fn realization(&self) -> Option<u32> {
        self.realization
    }

    pub fn model(&self) -> &SharedModel {
        &self.model
    }

    pub(super) fn require_support(&self) -> Result<Uuid> {
        self.support_uuid
            .ok_or_else(|| Error::not_found("collection has no support bound"))
    }

    // ---- catalog ----

    pub fn count(&self) -> usize {
        self.parts.len()
    }

    pub fn number_of_parts(&self) -> usize {
        self.count()
    }

    /// Part uuids in catalog order.
    pub fn parts(&self) -> &[Uuid] {
        &self.parts
    }

    pub fn contains(&self, uuid: &Uuid) -> bool {
        self.parts.contains(uuid)
    }

    /// Descriptor of a part of this collection.
    pub fn descriptor(&self, uuid: &Uuid) -> Result<Arc<PropertyDescriptor>> {
        if !self.contains(uuid) {
            return Err(Error::not_found(format!("part {} not in collection", uuid)));
        }
        self.model
            .read()
            .property(uuid)
            .ok_or_else(|| Error::not_found(format!("property {}", uuid)))
    }

    /// Descriptors of all parts, in order. Parts whose record has been
    /// removed from the model are skipped.
    pub fn descriptors(&self) -> Vec<Arc<PropertyDescriptor>> {
        let model = self.model.read();
        self.parts.iter().filter_map(|u| model.property(u)).collect()
    }

    /// Add an existing model descriptor. Returns false when the part is
    /// already present or excluded by the realization filter.
    pub fn add_part(&mut self, uuid: Uuid) -> Result<bool> {
        let d = self
            .model
            .read()
            .property(&uuid)
            .ok_or_else(|| Error::not_found(format!("property {}", uuid)))?;
        match self.support_uuid {
            None => self.support_uuid = Some(d.support_uuid),
            Some(s) if s != d.support_uuid => {
                return Err(Error::SupportMismatch {
                    expected: s.to_string(),
                    actual: d.support_uuid.to_string(),
                })
            }
            Some(_) => {}
        }
        if self.realization.is_some_and(|r| d.realization != Some(r)) {
            return Ok(false);
        }
        if self.contains(&uuid) {
            return Ok(false);
        }
        self.parts.push(uuid);
        self.multiple_realizations = None;
        Ok(true)
    }

    /// Drop a part from this collection. The model record is untouched.
    pub fn remove_part(&mut self, uuid: &Uuid) -> bool {
        let before = self.parts.len();
        self.parts.retain(|u| u != uuid);
        self.cache.invalidate(uuid);
        self.multiple_realizations = None;
        self.parts.len() != before
    }

    /// Add every part of another collection on the same model.
    pub fn inherit_parts_from_other_collection(&mut self, other: &PropertyCollection) -> Result<usize> {
        self.check_same_model(other)?;
        let mut added = 0;
        for uuid in other.parts() {
            if self.add_part(*uuid)? {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Add parts of `other` matching `example` in everything except time index.
    pub fn inherit_similar_parts_for_time_series_from_other_collection(
        &mut self,
        other: &PropertyCollection,
        example: &Uuid,
    ) -> Result<usize> {
        let mut criteria = Criteria::from_descriptor(&*other.descriptor(example)?);
        criteria.time_index = None;
        criteria.citation_title = None;
        self.inherit_selected(other, &criteria)
    }

    /// Add parts of `other` matching `example` in everything except realization.
    pub fn inherit_similar_parts_for_realizations_from_other_collection(
        &mut self,
        other: &PropertyCollection,
        example: &Uuid,
    ) -> Result<usize> {
        let mut criteria = Criteria::from_descriptor(&*other.descriptor(example)?);
        criteria.realization = None;
        criteria.citation_title = None;
        self.inherit_selected(other, &criteria)
    }

    fn inherit_selected(&mut self, other: &PropertyCollection, criteria: &Criteria) -> Result<usize> {
        self.check_same_model(other)?;
        let selected = other.select(criteria);
        self.inherit_parts_from_other_collection(&selected)
    }

    fn check_same_model(&self, other: &PropertyCollection) -> Result<()> {
        if Arc::ptr_eq(&self.model, &other.model) {
            Ok(())
        } else {
            Err(Error::other("collections belong to different models"))
        }
    }

    // ---- selection ----

    /// New collection over the matching parts, in catalog order.
    pub fn select(&self, criteria: &Criteria) -> PropertyCollection {
        let parts = {
            let model = self.model.read();
            self.parts
                .iter()
                .copied()
                .filter(|u| model.property(u).is_some_and(|d| criteria.matches(&d)))
                .collect()
        };
        PropertyCollection {
            model: Arc::clone(&self.model),
            support_uuid: self.support_uuid,
            parts,
            realization: self.realization,
            cache: ArrayCache::new(),
            imports: Vec::new(),
            multiple_realizations: None,
        }
    }

    /// The single matching descriptor, None if nothing matches.
    pub fn singleton(&self, criteria: &Criteria) -> Result<Option<Arc<PropertyDescriptor>>> {
        let model = self.model.read();
        let mut matches: Vec<Arc<PropertyDescriptor>> = self
            .parts
            .iter()
            .filter_map(|u| model.property(u))
            .filter(|d| criteria.matches(d))
            .collect();
        match matches.len() {
            0 | 1 => Ok(matches.pop()),
            n => Err(Error::AmbiguousSelection { matches: n }),
        }
    }

    // ---- introspection ----

    /// True when every part is discrete (vacuously true when empty).
    pub fn all_discrete(&self) -> bool {
        self.descriptors().iter().all(|d| d.is_discrete)
    }

    pub fn all_continuous(&self) -> bool {
        self.descriptors().iter().all(|d| d.is_continuous())
    }

    /// Recompute and remember whether parts span several realizations.
    pub fn establish_has_multiple_realizations(&mut self) -> bool {
        let multiple = self.realization_list().len() > 1;
        self.multiple_realizations = Some(multiple);
        multiple
    }

    pub fn has_multiple_realizations(&self) -> bool {
        self.multiple_realizations
            .unwrap_or_else(|| self.realization_list().len() > 1)
    }

    /// `SingleTime` when every part carries the same time index of the
    /// same series.
    pub fn establish_time_set_kind(&self) -> TimeSetKind {
        let descriptors = self.descriptors();
        let Some(first) = descriptors.first() else {
            return TimeSetKind::NotATimeSet;
        };
        if first.time_index.is_none() {
            return TimeSetKind::NotATimeSet;
        }
        let same = descriptors
            .iter()
            .all(|d| d.time_index == first.time_index && d.time_series_uuid == first.time_series_uuid);
        if same {
            TimeSetKind::SingleTime
        } else {
            TimeSetKind::NotATimeSet
        }
    }

    /// Distinct realization numbers, ascending.
    pub fn realization_list(&self) -> Vec<u32> {
        let set: BTreeSet<u32> = self.descriptors().iter().filter_map(|d| d.realization).collect();
        set.into_iter().collect()
    }

    /// Distinct time indices, ascending.
    pub fn time_index_list(&self) -> Vec<usize> {
        let set: BTreeSet<usize> = self.descriptors().iter().filter_map(|d| d.time_index).collect();
        set.into_iter().collect()
    }

    pub fn part_str(&self, uuid: &Uuid, include_title: bool) -> Result<String> {
        Ok(self.descriptor(uuid)?.part_str(include_title))
    }

    pub fn part_filename(&self, uuid: &Uuid) -> Result<String> {
        Ok(self.descriptor(uuid)?.part_filename())
    }

    pub fn string_lookup_for_part(&self, uuid: &Uuid) -> Result<Option<StringLookup>> {
        let d = self.descriptor(uuid)?;
        let Some(lookup_uuid) = d.string_lookup_uuid else {
            return Ok(None);
        };
        self.model
            .read()
            .string_lookup(&lookup_uuid)
            .cloned()
            .map(Some)
            .ok_or_else(|| Error::not_found(format!("string lookup {}", lookup_uuid)))
    }

    pub fn constant_value_for_part(&self, uuid: &Uuid) -> Result<Option<ScalarValue>> {
        Ok(self.descriptor(uuid)?.const_value())
    }

    /// Recorded minimum, else computed from the values.
    pub fn minimum_value_for_part(&self, uuid: &Uuid) -> Result<Option<f64>> {
        Ok(self.min_max_for_part(uuid)?.map(|(lo, _)| lo))
    }

    /// Recorded maximum, else computed from the values.
    pub fn maximum_value_for_part(&self, uuid: &Uuid) -> Result<Option<f64>> {
        Ok(self.min_max_for_part(uuid)?.map(|(_, hi)| hi))
    }

    fn min_max_for_part(&self, uuid: &Uuid) -> Result<Option<(f64, f64)>> {
        let d = self.descriptor(uuid)?;
        if let (Some(lo), Some(hi)) = (d.min_value, d.max_value) {
            return Ok(Some((lo, hi)));
        }
        if let Some(v) = d.const_value() {
            let v = v.as_f64();
            return Ok(v.is_finite().then_some((v, v)));
        }
        Ok(self.cached_part_array_ref(uuid)?.min_max(d.null_value))
    }

    /// Replace the recorded bounds of a part.
    pub fn override_min_max(&mut self, uuid: &Uuid, min: f64, max: f64) -> Result<()> {
        let mut d = (*self.descriptor(uuid)?).clone();
        d.min_value = Some(min);
        d.max_value = Some(max);
        self.model.write().replace_property(d)?;
        Ok(())
    }

    // ---- arrays ----

    /// Materialized array of a part, loaded once and cached.
    pub fn cached_part_array_ref(&self, uuid: &Uuid) -> Result<Arc<PropertyArray>> {
        if let Some(array) = self.cache.get(uuid) {
            return Ok(array);
        }
        let d = self.descriptor(uuid)?;
        let array = load_array(&self.model.read(), &d)?;
        debug!(part = %uuid, shape = %array.shape(), constant = d.const_value().is_some(), "loaded part array");
        Ok(self.cache.insert(*uuid, array))
    }

    /// Array of the single part matching `criteria`.
    pub fn single_array_ref(&self, criteria: &Criteria) -> Result<Arc<PropertyArray>> {
        let d = self
            .singleton(criteria)?
            .ok_or_else(|| Error::not_found("no part matches the selection"))?;
        self.cached_part_array_ref(&d.uuid)
    }

    /// Drop the cached array of one part.
    pub fn uncache_part_array(&self, uuid: &Uuid) -> bool {
        self.cache.invalidate(uuid)
    }

    /// Drop every cached array, e.g. after the support geometry changed.
    pub fn invalidate_cache(&self) {
        debug!(entries = self.cache.len(), "invalidating collection array cache");
        self.cache.clear();
    }

    /// Reload a part's array from storage.
    pub fn reload_part_array(&self, uuid: &Uuid) -> Result<Arc<PropertyArray>> {
        self.uncache_part_array(uuid);
        self.cached_part_array_ref(uuid)
    }

    /// Number of cached arrays.
    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    pub fn is_cached(&self, uuid: &Uuid) -> bool {
        self.cache.contains(uuid)
    }

    /// Sub-array indexed on leading axes, read without loading the full array.
    pub fn read_slice(&self, uuid: &Uuid, index: &[isize]) -> Result<PropertyArray> {
        let d = self.descriptor(uuid)?;
        let model = self.model.read();
        match d.payload {
            Payload::Constant(value) => {
                let support = model
                    .support(&d.support_uuid)
                    .ok_or_else(|| Error::not_found(format!("support {}", d.support_uuid)))?;
                let (_, _, shape) = leading_range(&d.canonical_shape(support)?, index)?;
                PropertyArray::filled(shape, value, d.pod)
            }
            Payload::Stored { array_uuid } => model.store().read_slice(&array_uuid, index),
        }
    }

    /// Overwrite a sub-array in storage and drop the cached copy.
    pub fn overwrite_slice(&mut self, uuid: &Uuid, index: &[isize], values: &PropertyArray) -> Result<()> {
        let d = self.descriptor(uuid)?;
        let Payload::Stored { array_uuid } = d.payload else {
            return Err(Error::descriptor(format!(
                "part {} is constant; expand it before writing slices",
                uuid
            )));
        };
        self.model.write().store_mut().overwrite_slice(&array_uuid, index, values)?;
        self.cache.invalidate(uuid);
        debug!(part = %uuid, ?index, "overwrote slice");
        Ok(())
    }

    /// Convert a constant part into a stored array. No-op for stored parts.
    pub fn expand_constant_part(&mut self, uuid: &Uuid) -> Result<()> {
        let d = self.descriptor(uuid)?;
        let Some(value) = d.const_value() else {
            return Ok(());
        };
        let mut model = self.model.write();
        let shape = {
            let support = model
                .support(&d.support_uuid)
                .ok_or_else(|| Error::not_found(format!("support {}", d.support_uuid)))?;
            d.canonical_shape(support)?
        };
        let array = PropertyArray::filled(shape, value, d.pod)?;
        model.store_mut().write_array(d.uuid, &array)?;
        let mut expanded = (*d).clone();
        expanded.payload = Payload::Stored { array_uuid: d.uuid };
        model.replace_property(expanded)?;
        drop(model);
        self.cache.invalidate(uuid);
        debug!(part = %uuid, "expanded constant part");
        Ok(())
    }

    // ---- geometry ----

    /// Make the support adopt the single matching points property as its
    /// geometry. An optional ACTIVE property recomputes the inactive mask.
    pub fn set_support_geometry_from_property(&mut self, points: &Criteria, active: Option<&Criteria>) -> Result<()> {
        let d = self
            .singleton(&points.clone().points(true))?
            .ok_or_else(|| Error::not_found("no points property matches the selection"))?;
        let array = self.cached_part_array_ref(&d.uuid)?;
        let active_array = match active {
            Some(criteria) => {
                let a = self
                    .singleton(criteria)?
                    .ok_or_else(|| Error::not_found("no active property matches the selection"))?;
                Some(self.cached_part_array_ref(&a.uuid)?)
            }
            None => None,
        };
        let source = GeometrySource {
            realization: d.realization,
            time_index: d.time_index,
            time_series_uuid: d.time_series_uuid,
        };
        {
            let mut model = self.model.write();
            let support = model
                .support_mut(&d.support_uuid)
                .ok_or_else(|| Error::not_found(format!("support {}", d.support_uuid)))?;
            support.set_geometry_from_property(&array, source, active_array.as_deref())?;
        }
        self.invalidate_cache();
        Ok(())
    }

    /// Add constant K, J and I cell length properties for a regular grid support.
    pub fn add_cell_length_properties(&mut self) -> Result<Vec<Uuid>> {
        let support_uuid = self.require_support()?;
        let lengths = {
            let model = self.model.read();
            let grid = model
                .support_object(&support_uuid)
                .and_then(|s| s.as_grid())
                .ok_or_else(|| Error::other("cell length properties require a regular grid support"))?;
            grid.cell_lengths()
        };
        let entries = ["K", "J", "I"]
            .into_iter()
            .zip(lengths)
            .map(|(axis, length)| {
                ImportEntry::constant(format!("D{}", axis), length)
                    .kind("cell length")
                    .facet("direction", axis)
                    .uom("m")
            })
            .collect();
        self.commit_entries(entries, None)
    }

    // ---- property sets ----

    /// Persist the current parts as a named property set.
    pub fn create_property_set(&self, title: &str) -> Result<Uuid> {
        let descriptors = self.descriptors();
        let mut set = PropertySet::new(title);
        for d in &descriptors {
            set.add(d.uuid);
        }
        let kinds: BTreeSet<&str> = descriptors.iter().map(|d| d.property_kind.as_str()).collect();
        set.has_single_property_kind = kinds.len() == 1;
        set.has_multiple_realizations = self.realization_list().len() > 1;
        let uuid = self.model.write().create_property_set(set);
        debug!(%uuid, title, members = descriptors.len(), "created property set");
        Ok(uuid)
    }

    /// Add the members of a property set that live on this collection's support.
    pub fn populate_from_property_set(&mut self, set_uuid: &Uuid) -> Result<usize> {
        let members: Vec<Uuid> = {
            let model = self.model.read();
            let set = model
                .property_set(set_uuid)
                .ok_or_else(|| Error::not_found(format!("property set {}", set_uuid)))?;
            set.iter().copied().collect()
        };
        let mut added = 0;
        for uuid in members {
            match self.add_part(uuid) {
                Ok(true) => added += 1,
                Ok(false) | Err(Error::SupportMismatch { .. }) => {}
                Err(Error::NotFound(what)) => warn!(%set_uuid, %what, "property set member missing"),
                Err(e) => return Err(e),
            }
        }
        Ok(added)
    }

    /// Mask of excluded elements for a part, when the support knows one and
    /// the part is indexed by cells.
    pub(super) fn inactive_mask_for(&self, d: &PropertyDescriptor) -> Option<Vec<bool>> {
        if d.indexable_element != IndexableElement::Cells {
            return None;
        }
        let model = self.model.read();
        let mask = model.support(&d.support_uuid)?.inactive_mask()?;
        let repeat: usize = d.trailing_dims().iter().product();
        Some(mask.iter().flat_map(|m| std::iter::repeat(*m).take(repeat)).collect())
    }

    pub(super) fn reset_realization_flag(&mut self) {
        self.multiple_realizations = None;
    }

    pub(super) fn span(&self, name: &'static str) -> tracing::Span {
        info_span!("collection", op = name, parts = self.parts.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;
    use crate::support::RegularGrid;
    use crate::util::Shape;

    fn setup() -> (PropertyCollection, Uuid) {
        let mut model = Model::in_memory();
        let grid = model.add_support(RegularGrid::new("g", 1, 2, 2));
        let mut pc = PropertyCollection::new(model.into_shared());
        pc.set_support(grid).unwrap();
        (pc, grid)
    }

    fn stage(pc: &mut PropertyCollection, entry: ImportEntry) -> Uuid {
        pc.add_cached_array_to_imported_list(entry).unwrap();
        pc.write_for_imported_list().unwrap();
        pc.create_metadata_for_imported_list(None).unwrap()[0]
    }

    #[test]
    fn test_add_and_select() {
        let (mut pc, _) = setup();
        let poro = stage(
            &mut pc,
            ImportEntry::array("PORO", PropertyArray::from_f64(Shape::d3(1, 2, 2), vec![0.1, 0.2, 0.3, 0.4]).unwrap())
                .kind("porosity")
                .uom("m3/m3"),
        );
        let ntg = stage(&mut pc, ImportEntry::constant("NTG", 0.8).kind("net to gross ratio").uom("m3/m3"));
        assert_eq!(pc.parts(), &[poro, ntg]);

        let sub = pc.select(&Criteria::new().kind("porosity"));
        assert_eq!(sub.parts(), &[poro]);
        assert!(pc.select(&Criteria::new().kind("facies")).parts().is_empty());
        assert!(matches!(pc.singleton(&Criteria::new()), Err(Error::AmbiguousSelection { matches: 2 })));
        assert!(pc.singleton(&Criteria::new().kind("nothing")).unwrap().is_none());
    }

    #[test]
    fn test_cache_loads_once() {
        let (mut pc, _) = setup();
        let u = stage(&mut pc, ImportEntry::constant("NTG", 0.5).uom("m3/m3"));
        let a = pc.cached_part_array_ref(&u).unwrap();
        let b = pc.cached_part_array_ref(&u).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(pc.uncache_part_array(&u));
        assert!(!pc.is_cached(&u));
        let c = pc.reload_part_array(&u).unwrap();
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(c.shape().sizes(), &[1, 2, 2]);
    }

    #[test]
    fn test_remove_part_keeps_model_record() {
        let (mut pc, _) = setup();
        let u = stage(&mut pc, ImportEntry::constant("NTG", 0.5).uom("m3/m3"));
        assert!(pc.remove_part(&u));
        assert!(!pc.remove_part(&u));
        assert_eq!(pc.count(), 0);
        assert!(pc.model().read().property(&u).is_some());
        assert!(matches!(pc.descriptor(&u), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_add_part_support_mismatch() {
        let (mut pc, _) = setup();
        let other = {
            let mut model = pc.model().write();
            let other = model.add_support(RegularGrid::new("h", 1, 1, 1));
            let mut d = crate::property::descriptor::fixtures::descriptor(other, "porosity");
            d.payload = Payload::Constant(ScalarValue::Float(0.1));
            model.add_property(d).unwrap().uuid
        };
        assert!(matches!(pc.add_part(other), Err(Error::SupportMismatch { .. })));
    }

    #[test]
    fn test_time_set_kind() {
        let (pc, _) = setup();
        assert_eq!(pc.establish_time_set_kind(), TimeSetKind::NotATimeSet);
    }
}
