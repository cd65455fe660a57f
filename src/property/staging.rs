//! Import buffer: staging, writing and committing new properties.
//!
//! Commit runs in two steps. `write_for_imported_list` checks each staged
//! array against the support, assigns a fresh uuid and writes the payload
//! to the array store. `create_metadata_for_imported_list` then creates one
//! descriptor per entry and appends it to the collection. A failure part
//! way through the second step leaves the descriptors created so far in
//! place; the failing entry and those after it stay staged.

use std::collections::VecDeque;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::collection::PropertyCollection;
use super::descriptor::{trailing_dims, Payload, PropertyDescriptor};
use super::import::ImportEntry;
use crate::core::ExtraMetadata;
use crate::util::{Error, PropertyArray, Result, Shape};

/// Unit recorded for continuous properties staged without one.
pub const DEFAULT_CONTINUOUS_UOM: &str = "Euc";

impl PropertyCollection {
    /// Stage an entry. Exactly one of its array and constant must be set.
    pub fn add_cached_array_to_imported_list(&mut self, entry: ImportEntry) -> Result<usize> {
        match (&entry.array, &entry.const_value) {
            (Some(_), Some(_)) => {
                return Err(Error::descriptor(format!(
                    "'{}' has both an array and a constant value",
                    entry.title
                )))
            }
            (None, None) => {
                return Err(Error::descriptor(format!(
                    "'{}' has neither an array nor a constant value",
                    entry.title
                )))
            }
            _ => {}
        }
        if entry.count == 0 {
            return Err(Error::descriptor(format!("'{}' has a count of zero", entry.title)));
        }
        if entry.points && entry.discrete {
            return Err(Error::descriptor(format!("'{}': points properties cannot be discrete", entry.title)));
        }
        if let (Some(filter), Some(r)) = (self.realization, entry.realization) {
            if filter != r {
                return Err(Error::descriptor(format!(
                    "'{}' has realization {} but the collection is restricted to realization {}",
                    entry.title, r, filter
                )));
            }
        }
        self.imports.push(entry);
        Ok(self.imports.len() - 1)
    }

    pub fn imported_list(&self) -> &[ImportEntry] {
        &self.imports
    }

    pub fn imported_list_len(&self) -> usize {
        self.imports.len()
    }

    pub fn clear_imported_list(&mut self) {
        self.imports.clear();
    }

    /// Write staged arrays (and expanded constants) to the array store.
    ///
    /// Every entry not yet written is assigned a new uuid, which becomes
    /// both the descriptor uuid and the stored array key. Returns the number
    /// of arrays written.
    pub fn write_for_imported_list(&mut self) -> Result<usize> {
        let _span = self.span("write_for_imported_list").entered();
        let support_uuid = self.require_support()?;
        let mut model = self.model.write();

        let shapes: Vec<Shape> = {
            let support = model
                .support(&support_uuid)
                .ok_or_else(|| Error::not_found(format!("support {}", support_uuid)))?;
            self.imports
                .iter()
                .map(|e| Ok(support.element_shape(e.indexable_element)?.concat(&trailing_dims(e.count, e.points))))
                .collect::<Result<_>>()?
        };

        let mut written = 0;
        for (entry, shape) in self.imports.iter_mut().zip(shapes) {
            if entry.assigned.is_some() {
                continue;
            }
            let pod = entry.resolved_pod();
            let array = match (&entry.array, entry.const_value) {
                (Some(array), _) => {
                    if array.shape() != &shape {
                        return Err(Error::ShapeMismatch {
                            expected: shape,
                            actual: array.shape().clone(),
                        });
                    }
                    Some(array.cast(pod)?)
                }
                (None, Some(value)) if entry.expand_const => Some(PropertyArray::filled(shape, value, pod)?),
                _ => None,
            };
            let uuid = Uuid::new_v4();
            if let Some(array) = array {
                model.store_mut().write_array(uuid, &array)?;
                debug!(%uuid, title = %entry.title, shape = %array.shape(), pod = %pod, "wrote staged array");
                written += 1;
            }
            entry.assigned = Some(uuid);
        }
        Ok(written)
    }

    /// Create descriptors for every staged entry and clear the buffer.
    ///
    /// Entries carrying a time index are linked to `time_series_uuid`.
    /// Returns the new descriptor uuids in staging order.
    pub fn create_metadata_for_imported_list(&mut self, time_series_uuid: Option<Uuid>) -> Result<Vec<Uuid>> {
        let span = self.span("create_metadata_for_imported_list");
        let _guard = span.enter();
        let support_uuid = self.require_support()?;
        let mut pending: VecDeque<ImportEntry> = std::mem::take(&mut self.imports).into();
        let mut created = Vec::with_capacity(pending.len());
        while let Some(entry) = pending.front() {
            match self.commit_entry(entry, support_uuid, time_series_uuid) {
                Ok(uuid) => {
                    pending.pop_front();
                    created.push(uuid);
                }
                Err(e) => {
                    warn!(title = %entry.title, error = %e, created = created.len(), "commit stopped part way");
                    self.imports = pending.into();
                    return Err(e);
                }
            }
        }
        info!(count = created.len(), "committed imported properties");
        Ok(created)
    }

    /// Stage, write and commit a batch without disturbing entries already staged.
    pub(crate) fn commit_entries(&mut self, entries: Vec<ImportEntry>, time_series_uuid: Option<Uuid>) -> Result<Vec<Uuid>> {
        let saved = std::mem::take(&mut self.imports);
        let result = entries
            .into_iter()
            .try_for_each(|e| self.add_cached_array_to_imported_list(e).map(|_| ()))
            .and_then(|_| self.write_for_imported_list())
            .and_then(|_| self.create_metadata_for_imported_list(time_series_uuid));
        let leftover = std::mem::replace(&mut self.imports, saved);
        if result.is_err() {
            self.imports.extend(leftover);
        }
        result
    }

    fn commit_entry(&mut self, entry: &ImportEntry, support_uuid: Uuid, time_series_uuid: Option<Uuid>) -> Result<Uuid> {
        let uuid = entry
            .assigned
            .ok_or_else(|| Error::descriptor(format!("'{}' has not been written", entry.title)))?;
        let realization = entry.realization.or(self.realization);
        if self.realization.is_some() && realization != self.realization {
            return Err(Error::descriptor(format!(
                "'{}' does not belong to realization {:?} of this collection",
                entry.title, self.realization
            )));
        }
        let continuous = !entry.discrete;
        let mut model = self.model.write();

        let default_parent = if entry.discrete { "discrete" } else { "continuous" };
        let (property_kind, local_property_kind_uuid) = match &entry.property_kind {
            None => (default_parent.to_string(), None),
            Some(kind) if model.kinds().is_standard(kind) => (kind.clone(), None),
            Some(kind) => {
                let parent = entry.local_kind_parent.as_deref().unwrap_or(default_parent);
                let local = model.create_property_kind(kind, Some(parent), &ExtraMetadata::new());
                (kind.clone(), Some(local))
            }
        };

        let uom = match (&entry.uom, continuous) {
            (None, true) => {
                warn!(title = %entry.title, "continuous property without unit of measure, using {}", DEFAULT_CONTINUOUS_UOM);
                Some(DEFAULT_CONTINUOUS_UOM.to_string())
            }
            (uom, _) => uom.clone(),
        };

        if continuous && entry.null_value.is_some() {
            return Err(Error::descriptor(format!(
                "'{}': continuous properties use NaN, not a null value",
                entry.title
            )));
        }
        if let Some(lookup) = entry.string_lookup_uuid {
            if continuous {
                return Err(Error::descriptor(format!("'{}': string lookup requires a discrete property", entry.title)));
            }
            if model.string_lookup(&lookup).is_none() {
                return Err(Error::not_found(format!("string lookup {}", lookup)));
            }
        }

        let linked_series = match entry.time_index {
            None => None,
            Some(index) => {
                let ts = time_series_uuid
                    .ok_or_else(|| Error::descriptor(format!("'{}' has a time index but no time series", entry.title)))?;
                let series = model
                    .time_series(&ts)
                    .ok_or_else(|| Error::not_found(format!("time series {}", ts)))?;
                if index >= series.len() {
                    return Err(Error::IndexOutOfBounds {
                        index: index as isize,
                        len: series.len(),
                    });
                }
                Some(ts)
            }
        };

        let pod = entry.resolved_pod();
        let null_value = if entry.discrete {
            entry.null_value.or_else(|| pod.default_null())
        } else {
            None
        };

        let payload = if entry.stays_constant() {
            match entry.const_value {
                Some(value) => Payload::Constant(value),
                None => return Err(Error::descriptor(format!("'{}' lost its constant value", entry.title))),
            }
        } else {
            if !model.store().contains(&uuid) {
                return Err(Error::descriptor(format!("'{}' has not been written", entry.title)));
            }
            Payload::Stored { array_uuid: uuid }
        };

        let bounds = if entry.points {
            None
        } else {
            match (&entry.array, entry.const_value) {
                (Some(array), _) => array.min_max(null_value),
                (None, Some(value)) => Some(value.as_f64()).filter(|v| v.is_finite()).map(|v| (v, v)),
                (None, None) => None,
            }
        };

        let descriptor = PropertyDescriptor {
            uuid,
            citation_title: entry.title.clone(),
            property_kind,
            local_property_kind_uuid,
            facet_type: entry.facet_type.clone(),
            facet: entry.facet.clone(),
            indexable_element: entry.indexable_element,
            is_discrete: entry.discrete,
            is_points: entry.points,
            count: entry.count,
            uom,
            realization,
            time_index: linked_series.and(entry.time_index),
            time_series_uuid: linked_series,
            string_lookup_uuid: entry.string_lookup_uuid,
            null_value,
            min_value: bounds.map(|b| b.0),
            max_value: bounds.map(|b| b.1),
            pod,
            support_uuid,
            payload,
            source: entry.source.clone(),
            extra_metadata: entry.extra_metadata.clone(),
        };
        model.add_property(descriptor)?;
        drop(model);
        self.parts.push(uuid);
        self.reset_realization_flag();
        Ok(uuid)
    }
}
