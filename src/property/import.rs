//! Staged property entries awaiting commit.

use uuid::Uuid;

use crate::core::{ExtraMetadata, IndexableElement};
use crate::util::{PlainOldDataType, PropertyArray, ScalarValue};

/// One staged property: an in-memory array or a constant value plus the
/// metadata the committed descriptor will carry.
///
/// Unset metadata is filled in at commit: the kind defaults to
/// `continuous` or `discrete`, the storage type follows the array (or the
/// constant), and discrete integer data gets the storage type's null
/// sentinel.
#[derive(Clone, Debug)]
pub struct ImportEntry {
    pub array: Option<PropertyArray>,
    pub const_value: Option<ScalarValue>,
    pub source: Option<String>,
    pub title: String,
    pub property_kind: Option<String>,
    pub facet_type: Option<String>,
    pub facet: Option<String>,
    pub indexable_element: IndexableElement,
    pub discrete: bool,
    pub points: bool,
    pub count: usize,
    pub uom: Option<String>,
    pub realization: Option<u32>,
    pub time_index: Option<usize>,
    pub null_value: Option<i64>,
    pub string_lookup_uuid: Option<Uuid>,
    /// Parent for a locally defined kind; defaults from `discrete`.
    pub local_kind_parent: Option<String>,
    pub extra_metadata: ExtraMetadata,
    /// Write a constant as a full stored array instead of keeping it constant.
    pub expand_const: bool,
    /// Storage type; inferred when None.
    pub pod: Option<PlainOldDataType>,
    /// Uuid assigned by `write_for_imported_list`.
    pub(crate) assigned: Option<Uuid>,
}

impl ImportEntry {
    /// General constructor; exactly one of `array` and `const_value` must be
    /// given for the entry to be accepted.
    pub fn new(title: impl Into<String>, array: Option<PropertyArray>, const_value: Option<ScalarValue>) -> Self {
        Self {
            array,
            const_value,
            source: None,
            title: title.into(),
            property_kind: None,
            facet_type: None,
            facet: None,
            indexable_element: IndexableElement::Cells,
            discrete: false,
            points: false,
            count: 1,
            uom: None,
            realization: None,
            time_index: None,
            null_value: None,
            string_lookup_uuid: None,
            local_kind_parent: None,
            extra_metadata: ExtraMetadata::new(),
            expand_const: false,
            pod: None,
            assigned: None,
        }
    }

    pub fn array(title: impl Into<String>, array: PropertyArray) -> Self {
        Self::new(title, Some(array), None)
    }

    pub fn constant(title: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        Self::new(title, None, Some(value.into()))
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.property_kind = Some(kind.into());
        self
    }

    pub fn facet(mut self, facet_type: impl Into<String>, facet: impl Into<String>) -> Self {
        self.facet_type = Some(facet_type.into());
        self.facet = Some(facet.into());
        self
    }

    pub fn element(mut self, element: IndexableElement) -> Self {
        self.indexable_element = element;
        self
    }

    pub fn discrete(mut self) -> Self {
        self.discrete = true;
        self
    }

    pub fn points(mut self) -> Self {
        self.points = true;
        self
    }

    pub fn count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn uom(mut self, uom: impl Into<String>) -> Self {
        self.uom = Some(uom.into());
        self
    }

    pub fn realization(mut self, realization: u32) -> Self {
        self.realization = Some(realization);
        self
    }

    pub fn time_index(mut self, time_index: usize) -> Self {
        self.time_index = Some(time_index);
        self
    }

    pub fn null_value(mut self, null: i64) -> Self {
        self.null_value = Some(null);
        self
    }

    pub fn string_lookup(mut self, uuid: Uuid) -> Self {
        self.string_lookup_uuid = Some(uuid);
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn local_kind_parent(mut self, parent: impl Into<String>) -> Self {
        self.local_kind_parent = Some(parent.into());
        self
    }

    pub fn extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_metadata.set(key, value);
        self
    }

    pub fn expand(mut self) -> Self {
        self.expand_const = true;
        self
    }

    pub fn pod(mut self, pod: PlainOldDataType) -> Self {
        self.pod = Some(pod);
        self
    }

    /// Uuid assigned when the entry was written, if it has been.
    pub fn assigned_uuid(&self) -> Option<Uuid> {
        self.assigned
    }

    /// True when the committed descriptor will keep a constant payload.
    pub(crate) fn stays_constant(&self) -> bool {
        self.array.is_none() && self.const_value.is_some() && !self.expand_const
    }

    /// Storage type for the committed payload.
    pub(crate) fn resolved_pod(&self) -> PlainOldDataType {
        if let Some(pod) = self.pod {
            return pod;
        }
        match (&self.array, &self.const_value) {
            (Some(a), _) => a.pod(),
            (None, Some(v)) if !self.discrete && matches!(v, ScalarValue::Int(_)) => PlainOldDataType::Float64,
            (None, Some(v)) => v.natural_pod(),
            (None, None) => PlainOldDataType::Float64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::Shape;

    #[test]
    fn test_builder() {
        let e = ImportEntry::constant("NTG", 0.5)
            .kind("net to gross ratio")
            .uom("m3/m3")
            .realization(3)
            .extra("source", "petrel");
        assert_eq!(e.const_value, Some(ScalarValue::Float(0.5)));
        assert_eq!(e.realization, Some(3));
        assert!(e.stays_constant());
        assert!(!e.clone().expand().stays_constant());
        assert_eq!(e.extra_metadata.get("source"), Some("petrel"));
    }

    #[test]
    fn test_resolved_pod() {
        let arr = PropertyArray::from_i32(Shape::d1(3), &[1, 2, 3]).unwrap();
        assert_eq!(ImportEntry::array("zone", arr).resolved_pod(), PlainOldDataType::Int32);
        assert_eq!(ImportEntry::constant("z", 2i64).discrete().resolved_pod(), PlainOldDataType::Int32);
        assert_eq!(ImportEntry::constant("thickness", 2i64).resolved_pod(), PlainOldDataType::Float64);
        assert_eq!(
            ImportEntry::constant("a", true).pod(PlainOldDataType::Boolean).resolved_pod(),
            PlainOldDataType::Boolean
        );
    }
}
