//! Multi-part array assembly: stacks over time or realizations, and
//! normalized arrays for display.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use super::collection::PropertyCollection;
use super::descriptor::PropertyDescriptor;
use super::normalize::{normalize, NormalizeOptions};
use crate::core::IndexableElement;
use crate::util::{Error, PropertyArray, Result};

/// Fields that members of one stack must share.
#[derive(PartialEq)]
struct StackIdentity<'a> {
    kind: &'a str,
    facet_type: Option<&'a str>,
    facet: Option<&'a str>,
    element: IndexableElement,
    points: bool,
    discrete: bool,
    string_lookup: Option<Uuid>,
    count: usize,
    time_series: Option<Uuid>,
    pinned: Option<u64>,
}

impl<'a> StackIdentity<'a> {
    fn of(d: &'a PropertyDescriptor, pinned: Option<u64>) -> Self {
        Self {
            kind: &d.property_kind,
            facet_type: d.facet_type.as_deref(),
            facet: d.facet.as_deref(),
            element: d.indexable_element,
            points: d.is_points,
            discrete: d.is_discrete,
            string_lookup: d.string_lookup_uuid,
            count: d.count,
            time_series: d.time_series_uuid,
            pinned,
        }
    }
}

/// Check members describe one quantity and order them by `key`, which must be unique.
fn order_members<K: Ord + Copy>(
    members: Vec<Arc<PropertyDescriptor>>,
    key: impl Fn(&PropertyDescriptor) -> Option<K>,
    pinned: impl Fn(&PropertyDescriptor) -> Option<u64>,
) -> Result<BTreeMap<K, Arc<PropertyDescriptor>>> {
    let Some(first) = members.first() else {
        return Err(Error::not_found("no parts to stack"));
    };
    let identity = StackIdentity::of(first, pinned(first.as_ref()));
    if members.iter().any(|d| StackIdentity::of(d, pinned(d.as_ref())) != identity) {
        return Err(Error::AmbiguousSelection { matches: members.len() });
    }
    let mut ordered = BTreeMap::new();
    for d in members {
        let Some(k) = key(d.as_ref()) else { continue };
        if ordered.insert(k, d).is_some() {
            return Err(Error::AmbiguousSelection { matches: 2 });
        }
    }
    Ok(ordered)
}

impl PropertyCollection {
    /// Stack the parts of one time series along a new leading axis in
    /// ascending time index order.
    ///
    /// Members must share kind, facet, element, discreteness, string lookup,
    /// count and series; when
    /// `realization` is None they must also share one realization. Every
    /// index of the series must be present.
    pub fn time_series_array_ref(&self, time_series_uuid: Option<Uuid>, realization: Option<u32>) -> Result<PropertyArray> {
        let _span = self.span("time_series_array_ref").entered();
        let members: Vec<_> = self
            .descriptors()
            .into_iter()
            .filter(|d| d.time_index.is_some())
            .filter(|d| time_series_uuid.map_or(true, |ts| d.time_series_uuid == Some(ts)))
            .filter(|d| realization.map_or(true, |r| d.realization == Some(r)))
            .collect();
        let ordered = order_members(members, |d| d.time_index, |d| d.realization.map(u64::from))?;

        let series_len = {
            let model = self.model.read();
            let ts = ordered.values().next().and_then(|d| d.time_series_uuid);
            ts.and_then(|u| model.time_series(&u)).map(|s| s.len())
        };
        let expected = series_len.unwrap_or_else(|| ordered.keys().next_back().map_or(0, |m| m + 1));
        if let Some((&bad, _)) = ordered.range(expected..).next() {
            return Err(Error::IndexOutOfBounds {
                index: bad as isize,
                len: expected,
            });
        }
        let missing: Vec<usize> = (0..expected).filter(|i| !ordered.contains_key(i)).collect();
        if !missing.is_empty() {
            return Err(Error::IncompleteSeries { missing });
        }

        self.stack_members(ordered.values())
    }

    /// Stack parts by ascending realization number. Gaps in the numbering
    /// are allowed.
    pub fn realizations_array_ref(&self, time_index: Option<usize>) -> Result<PropertyArray> {
        let _span = self.span("realizations_array_ref").entered();
        let members: Vec<_> = self
            .descriptors()
            .into_iter()
            .filter(|d| d.realization.is_some())
            .filter(|d| time_index.map_or(true, |t| d.time_index == Some(t)))
            .collect();
        let ordered = order_members(members, |d| d.realization, |d| d.time_index.map(|t| t as u64))?;
        self.stack_members(ordered.values())
    }

    fn stack_members<'a>(&self, members: impl Iterator<Item = &'a Arc<PropertyDescriptor>>) -> Result<PropertyArray> {
        let arrays = members
            .map(|d| self.cached_part_array_ref(&d.uuid))
            .collect::<Result<Vec<_>>>()?;
        let refs: Vec<&PropertyArray> = arrays.iter().map(|a| a.as_ref()).collect();
        let stacked = PropertyArray::stack(&refs)?;
        debug!(members = refs.len(), shape = %stacked.shape(), "stacked part arrays");
        Ok(stacked)
    }

    /// Part values rescaled into [0, 1] with the bounds used.
    pub fn normalized_part_array(&self, uuid: &Uuid, options: &NormalizeOptions) -> Result<(PropertyArray, f64, f64)> {
        let _span = self.span("normalized_part_array").entered();
        let d = self.descriptor(uuid)?;
        let array = self.cached_part_array_ref(uuid)?;
        let mask = if options.masked { self.inactive_mask_for(&d) } else { None };
        let recorded = d.min_value.zip(d.max_value);
        let out = normalize(
            &array.to_f64_vec(d.null_value),
            mask.as_deref(),
            d.is_discrete,
            recorded,
            options,
        );
        let normalized = PropertyArray::from_f64(array.shape().clone(), out.values)?;
        Ok((normalized, out.min, out.max))
    }
}
