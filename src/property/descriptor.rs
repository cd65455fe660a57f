//! Property descriptors: the metadata record of one property.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{ExtraMetadata, IndexableElement};
use crate::support::Support;
use crate::util::{Error, PlainOldDataType, Result, ScalarValue, Shape};

/// Where a property's values come from.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Payload {
    /// Values stored in the array store under `array_uuid`.
    Stored { array_uuid: Uuid },
    /// Every element holds the same value; nothing is stored.
    Constant(ScalarValue),
}

/// Full metadata of one property.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    pub uuid: Uuid,
    pub citation_title: String,
    pub property_kind: String,
    /// Set when `property_kind` names a locally defined kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_property_kind_uuid: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facet_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facet: Option<String>,
    pub indexable_element: IndexableElement,
    pub is_discrete: bool,
    #[serde(default)]
    pub is_points: bool,
    /// Values per indexable element; more than one adds a trailing axis.
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uom: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realization: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_series_uuid: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_lookup_uuid: Option<Uuid>,
    /// Discrete null marker; continuous data uses NaN instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub null_value: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    pub pod: PlainOldDataType,
    pub support_uuid: Uuid,
    pub payload: Payload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "ExtraMetadata::is_empty")]
    pub extra_metadata: ExtraMetadata,
}

impl PropertyDescriptor {
    #[inline]
    pub fn is_continuous(&self) -> bool {
        !self.is_discrete
    }

    /// True for discrete properties carrying a string lookup.
    #[inline]
    pub fn is_categorical(&self) -> bool {
        self.is_discrete && self.string_lookup_uuid.is_some()
    }

    pub fn const_value(&self) -> Option<ScalarValue> {
        match self.payload {
            Payload::Constant(v) => Some(v),
            Payload::Stored { .. } => None,
        }
    }

    pub fn array_uuid(&self) -> Option<Uuid> {
        match self.payload {
            Payload::Stored { array_uuid } => Some(array_uuid),
            Payload::Constant(_) => None,
        }
    }

    /// Axes appended after the element shape: count (if > 1), then 3 for points.
    pub fn trailing_dims(&self) -> Vec<usize> {
        trailing_dims(self.count, self.is_points)
    }

    /// Full array shape on the given support.
    pub fn canonical_shape(&self, support: &dyn Support) -> Result<Shape> {
        if support.uuid() != self.support_uuid {
            return Err(Error::SupportMismatch {
                expected: self.support_uuid.to_string(),
                actual: support.uuid().to_string(),
            });
        }
        Ok(support
            .element_shape(self.indexable_element)?
            .concat(&self.trailing_dims()))
    }

    /// Check field combinations.
    pub fn validate(&self) -> Result<()> {
        if self.count == 0 {
            return Err(Error::descriptor("count must be at least 1"));
        }
        if self.is_points && self.is_discrete {
            return Err(Error::descriptor("points properties cannot be discrete"));
        }
        if self.is_continuous() && self.null_value.is_some() {
            return Err(Error::descriptor("continuous properties use NaN, not a null value"));
        }
        if self.is_continuous() && self.string_lookup_uuid.is_some() {
            return Err(Error::descriptor("string lookup requires a discrete property"));
        }
        if self.time_index.is_some() != self.time_series_uuid.is_some() {
            return Err(Error::descriptor("time index and time series must be given together"));
        }
        if let Payload::Constant(v) = self.payload {
            let fits = match v {
                ScalarValue::Bool(_) => self.pod.is_bool(),
                ScalarValue::Int(_) => self.pod.is_integer() || self.pod.is_float(),
                ScalarValue::Float(_) => self.pod.is_float(),
            };
            if !fits {
                return Err(Error::descriptor(format!("constant {} does not fit {}", v, self.pod)));
            }
        }
        Ok(())
    }

    /// Display label `kind[: facet][; timestep: n][ (title)]`.
    pub fn part_str(&self, include_title: bool) -> String {
        let mut s = self.property_kind.clone();
        if let Some(facet) = &self.facet {
            s.push_str(": ");
            s.push_str(facet);
        }
        if let Some(t) = self.time_index {
            s.push_str(&format!("; timestep: {}", t));
        }
        if include_title && !self.citation_title.is_empty() {
            s.push_str(&format!(" ({})", self.citation_title));
        }
        s
    }

    /// File name stem `kind[_facet][_r{n}][_ts_{n}]` with spaces as `_`.
    pub fn part_filename(&self) -> String {
        let mut s = self.property_kind.replace(' ', "_");
        if let Some(facet) = &self.facet {
            s.push('_');
            s.push_str(&facet.replace(' ', "_"));
        }
        if let Some(r) = self.realization {
            s.push_str(&format!("_r{}", r));
        }
        if let Some(t) = self.time_index {
            s.push_str(&format!("_ts_{}", t));
        }
        s
    }
}

pub(crate) fn trailing_dims(count: usize, is_points: bool) -> Vec<usize> {
    let mut dims = Vec::with_capacity(2);
    if count > 1 {
        dims.push(count);
    }
    if is_points {
        dims.push(3);
    }
    dims
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Continuous cells descriptor with no optional fields set.
    pub fn descriptor(support_uuid: Uuid, kind: &str) -> PropertyDescriptor {
        let uuid = Uuid::new_v4();
        PropertyDescriptor {
            uuid,
            citation_title: kind.to_string(),
            property_kind: kind.to_string(),
            local_property_kind_uuid: None,
            facet_type: None,
            facet: None,
            indexable_element: IndexableElement::Cells,
            is_discrete: false,
            is_points: false,
            count: 1,
            uom: Some("m3/m3".into()),
            realization: None,
            time_index: None,
            time_series_uuid: None,
            string_lookup_uuid: None,
            null_value: None,
            min_value: None,
            max_value: None,
            pod: PlainOldDataType::Float64,
            support_uuid,
            payload: Payload::Stored { array_uuid: uuid },
            source: None,
            extra_metadata: ExtraMetadata::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::descriptor;
    use super::*;
    use crate::support::RegularGrid;

    #[test]
    fn test_canonical_shape() {
        let grid = RegularGrid::new("g", 2, 3, 4);
        let mut d = descriptor(grid.uuid, "length");
        assert_eq!(d.canonical_shape(&grid).unwrap().sizes(), &[2, 3, 4]);

        d.indexable_element = IndexableElement::Nodes;
        d.is_points = true;
        assert_eq!(d.canonical_shape(&grid).unwrap().sizes(), &[3, 4, 5, 3]);

        d.is_points = false;
        d.indexable_element = IndexableElement::Cells;
        d.count = 2;
        assert_eq!(d.canonical_shape(&grid).unwrap().sizes(), &[2, 3, 4, 2]);

        let other = RegularGrid::new("h", 1, 1, 1);
        assert!(matches!(d.canonical_shape(&other), Err(Error::SupportMismatch { .. })));
    }

    #[test]
    fn test_validate() {
        let grid = RegularGrid::new("g", 1, 1, 1);
        let mut d = descriptor(grid.uuid, "porosity");
        d.validate().unwrap();

        d.null_value = Some(-1);
        assert!(matches!(d.validate(), Err(Error::InvalidDescriptor(_))));
        d.is_discrete = true;
        d.validate().unwrap();

        d.time_index = Some(2);
        assert!(d.validate().is_err());
        d.time_series_uuid = Some(Uuid::new_v4());
        d.validate().unwrap();

        d.payload = Payload::Constant(ScalarValue::Float(0.5));
        d.pod = PlainOldDataType::Int32;
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_part_str_and_filename() {
        let grid = RegularGrid::new("g", 1, 1, 1);
        let mut d = descriptor(grid.uuid, "discrete");
        d.citation_title = "Zone".into();
        assert_eq!(d.part_str(true), "discrete (Zone)");
        assert_eq!(d.part_str(false), "discrete");

        let mut sw = descriptor(grid.uuid, "saturation");
        sw.citation_title = "SW".into();
        sw.facet_type = Some("what".into());
        sw.facet = Some("water".into());
        sw.time_index = Some(2);
        assert_eq!(sw.part_str(true), "saturation: water; timestep: 2 (SW)");
        assert_eq!(sw.part_filename(), "saturation_water_ts_2");

        let mut perm = descriptor(grid.uuid, "rock permeability");
        perm.citation_title = "Perm".into();
        perm.facet_type = Some("direction".into());
        perm.facet = Some("J".into());
        assert_eq!(perm.part_str(true), "rock permeability: J (Perm)");
        assert_eq!(perm.part_filename(), "rock_permeability_J");
        perm.realization = Some(3);
        assert_eq!(perm.part_filename(), "rock_permeability_J_r3");
    }

    #[test]
    fn test_payload_accessors() {
        let grid = RegularGrid::new("g", 1, 1, 1);
        let mut d = descriptor(grid.uuid, "porosity");
        assert_eq!(d.array_uuid(), Some(d.uuid));
        assert_eq!(d.const_value(), None);
        d.payload = Payload::Constant(ScalarValue::Float(0.25));
        assert_eq!(d.array_uuid(), None);
        assert_eq!(d.const_value(), Some(ScalarValue::Float(0.25)));
    }
}
