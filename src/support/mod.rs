//! Spatial supports that properties are attached to.
//!
//! A support reports the array shape of each indexable element it can
//! carry values for, and owns point geometry that a points property can
//! replace. [`SupportObject`] wraps the concrete supports for persistence.

mod grid;
mod mesh;

pub use grid::RegularGrid;
pub use mesh::RegularMesh;

use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::core::IndexableElement;
use crate::util::{Error, PropertyArray, Result, Shape};

/// Identity of the points property a support's geometry was adopted from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeometrySource {
    pub realization: Option<u32>,
    pub time_index: Option<usize>,
    pub time_series_uuid: Option<Uuid>,
}

/// Behaviour the property engine needs from a spatial support.
pub trait Support: fmt::Debug + Send + Sync {
    fn uuid(&self) -> Uuid;

    fn title(&self) -> &str;

    /// Short type name, e.g. `"regular grid"`.
    fn support_kind(&self) -> &'static str;

    /// Leading array shape for values defined over `element`.
    fn element_shape(&self, element: IndexableElement) -> Result<Shape>;

    /// Current point geometry, trailing axis of size 3.
    fn points(&self) -> Result<PropertyArray>;

    /// Replace the support's geometry with a points property array.
    ///
    /// Invalidates derived geometry caches. When `active` is given the
    /// inactive cell mask is recomputed from it.
    fn set_geometry_from_property(
        &mut self,
        points: &PropertyArray,
        source: GeometrySource,
        active: Option<&PropertyArray>,
    ) -> Result<()>;

    /// Where adopted geometry came from, None for the native geometry.
    fn geometry_source(&self) -> Option<GeometrySource>;

    /// Per-cell inactive flags, if known.
    fn inactive_mask(&self) -> Option<&[bool]>;

    /// Number of cells.
    fn cell_count(&self) -> usize {
        self.element_shape(IndexableElement::Cells)
            .map(|s| s.num_elements())
            .unwrap_or(0)
    }

    fn unsupported(&self, element: IndexableElement) -> Error {
        Error::UnsupportedElement {
            element: element.name().to_string(),
            support: self.support_kind().to_string(),
        }
    }
}

/// Persisted form of any support.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SupportObject {
    Grid(RegularGrid),
    Mesh(RegularMesh),
}

impl SupportObject {
    pub fn as_support(&self) -> &dyn Support {
        match self {
            Self::Grid(g) => g,
            Self::Mesh(m) => m,
        }
    }

    pub fn as_support_mut(&mut self) -> &mut dyn Support {
        match self {
            Self::Grid(g) => g,
            Self::Mesh(m) => m,
        }
    }

    pub fn as_grid(&self) -> Option<&RegularGrid> {
        match self {
            Self::Grid(g) => Some(g),
            _ => None,
        }
    }
}

impl From<RegularGrid> for SupportObject {
    fn from(g: RegularGrid) -> Self {
        Self::Grid(g)
    }
}

impl From<RegularMesh> for SupportObject {
    fn from(m: RegularMesh) -> Self {
        Self::Mesh(m)
    }
}

/// Read a points array (trailing axis 3) as vectors after checking its shape.
pub(crate) fn points_from_array(array: &PropertyArray, expected: &Shape) -> Result<Vec<DVec3>> {
    if array.shape() != expected {
        return Err(Error::ShapeMismatch {
            expected: expected.clone(),
            actual: array.shape().clone(),
        });
    }
    Ok(array
        .to_f64_vec(None)
        .chunks_exact(3)
        .map(|c| DVec3::new(c[0], c[1], c[2]))
        .collect())
}

/// Build a points array of the given shape from vectors.
pub(crate) fn points_to_array(shape: Shape, points: &[DVec3]) -> Result<PropertyArray> {
    let flat: Vec<f64> = points.iter().flat_map(|p| p.to_array()).collect();
    PropertyArray::from_f64(shape, flat)
}

/// Inactive flags from an ACTIVE property (non-zero or true means active).
pub(crate) fn inactive_from_active(active: &PropertyArray, cells: &Shape) -> Result<Vec<bool>> {
    if active.shape() != cells {
        return Err(Error::ShapeMismatch {
            expected: cells.clone(),
            actual: active.shape().clone(),
        });
    }
    Ok(active.to_f64_vec(None).iter().map(|v| *v == 0.0).collect())
}
