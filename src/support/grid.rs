//! Regular (IJK block) grid support.

use glam::DVec3;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::{inactive_from_active, points_from_array, points_to_array, GeometrySource, Support};
use crate::core::IndexableElement;
use crate::util::{PropertyArray, Result, Shape};

/// Block grid of `nk x nj x ni` cells with axis-aligned cell size.
///
/// Geometry starts as regular node positions computed from `origin` and
/// `cell_size`; a points property may replace it. Cell centres are derived
/// from the node geometry and cached until the geometry changes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegularGrid {
    pub uuid: Uuid,
    pub title: String,
    /// Cell counts `(nk, nj, ni)`.
    pub extent: [usize; 3],
    pub origin: DVec3,
    /// Cell size along (i, j, k) as (x, y, z).
    pub cell_size: DVec3,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    adopted: Option<AdoptedGeometry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inactive: Option<Vec<bool>>,
    #[serde(skip)]
    centres: CentreCache,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct AdoptedGeometry {
    source: GeometrySource,
    nodes: Vec<DVec3>,
}

#[derive(Debug, Default)]
struct CentreCache(RwLock<Option<Arc<Vec<DVec3>>>>);

impl Clone for CentreCache {
    fn clone(&self) -> Self {
        Self(RwLock::new(self.0.read().clone()))
    }
}

impl RegularGrid {
    /// New grid with unit cells at the origin.
    pub fn new(title: impl Into<String>, nk: usize, nj: usize, ni: usize) -> Self {
        Self::with_geometry(title, [nk, nj, ni], DVec3::ZERO, DVec3::ONE)
    }

    pub fn with_geometry(title: impl Into<String>, extent: [usize; 3], origin: DVec3, cell_size: DVec3) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            title: title.into(),
            extent,
            origin,
            cell_size,
            adopted: None,
            inactive: None,
            centres: CentreCache::default(),
        }
    }

    #[inline]
    pub fn nk(&self) -> usize {
        self.extent[0]
    }

    #[inline]
    pub fn nj(&self) -> usize {
        self.extent[1]
    }

    #[inline]
    pub fn ni(&self) -> usize {
        self.extent[2]
    }

    fn node_shape(&self) -> Shape {
        Shape::d3(self.nk() + 1, self.nj() + 1, self.ni() + 1)
    }

    fn regular_nodes(&self) -> Vec<DVec3> {
        let [nk, nj, ni] = self.extent;
        let mut nodes = Vec::with_capacity((nk + 1) * (nj + 1) * (ni + 1));
        for k in 0..=nk {
            for j in 0..=nj {
                for i in 0..=ni {
                    let step = DVec3::new(i as f64, j as f64, k as f64);
                    nodes.push(self.origin + step * self.cell_size);
                }
            }
        }
        nodes
    }

    fn nodes(&self) -> Vec<DVec3> {
        match &self.adopted {
            Some(a) => a.nodes.clone(),
            None => self.regular_nodes(),
        }
    }

    /// Cell centres in cell order, computed from the current node geometry.
    pub fn centres(&self) -> Arc<Vec<DVec3>> {
        if let Some(cached) = self.centres.0.read().as_ref() {
            return Arc::clone(cached);
        }
        let nodes = self.nodes();
        let [nk, nj, ni] = self.extent;
        let node = |k: usize, j: usize, i: usize| nodes[(k * (nj + 1) + j) * (ni + 1) + i];
        let mut centres = Vec::with_capacity(nk * nj * ni);
        for k in 0..nk {
            for j in 0..nj {
                for i in 0..ni {
                    let mut sum = DVec3::ZERO;
                    for (dk, dj, di) in CORNERS {
                        sum += node(k + dk, j + dj, i + di);
                    }
                    centres.push(sum / 8.0);
                }
            }
        }
        let centres = Arc::new(centres);
        *self.centres.0.write() = Some(Arc::clone(&centres));
        centres
    }

    /// True if cell centres are currently cached.
    pub fn has_cached_centres(&self) -> bool {
        self.centres.0.read().is_some()
    }

    /// Drop derived geometry.
    pub fn invalidate_geometry_cache(&self) {
        *self.centres.0.write() = None;
    }

    /// Uniform cell length along K, J and I (dz, dy, dx).
    pub fn cell_lengths(&self) -> [f64; 3] {
        [self.cell_size.z, self.cell_size.y, self.cell_size.x]
    }
}

const CORNERS: [(usize, usize, usize); 8] = [
    (0, 0, 0),
    (0, 0, 1),
    (0, 1, 0),
    (0, 1, 1),
    (1, 0, 0),
    (1, 0, 1),
    (1, 1, 0),
    (1, 1, 1),
];

impl Support for RegularGrid {
    fn uuid(&self) -> Uuid {
        self.uuid
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn support_kind(&self) -> &'static str {
        "regular grid"
    }

    fn element_shape(&self, element: IndexableElement) -> Result<Shape> {
        let [nk, nj, ni] = self.extent;
        Ok(match element {
            IndexableElement::Cells => Shape::d3(nk, nj, ni),
            IndexableElement::Nodes => self.node_shape(),
            IndexableElement::NodesPerCell => Shape::from_slice(&[nk, nj, ni, 2, 2, 2]),
            IndexableElement::FacesPerCell => Shape::from_slice(&[nk, nj, ni, 6]),
            IndexableElement::EdgesPerCell => Shape::from_slice(&[nk, nj, ni, 12]),
            IndexableElement::Faces => {
                Shape::d1((nk + 1) * nj * ni + nk * (nj + 1) * ni + nk * nj * (ni + 1))
            }
            IndexableElement::Columns => Shape::d2(nj, ni),
            IndexableElement::Pillars => Shape::d2(nj + 1, ni + 1),
            IndexableElement::Layers => Shape::d1(nk),
            IndexableElement::KFaces => Shape::d3(nk + 1, nj, ni),
            IndexableElement::JFaces => Shape::d3(nk, nj + 1, ni),
            IndexableElement::IFaces => Shape::d3(nk, nj, ni + 1),
        })
    }

    fn points(&self) -> Result<PropertyArray> {
        points_to_array(self.node_shape().concat(&[3]), &self.nodes())
    }

    fn set_geometry_from_property(
        &mut self,
        points: &PropertyArray,
        source: GeometrySource,
        active: Option<&PropertyArray>,
    ) -> Result<()> {
        let nodes = points_from_array(points, &self.node_shape().concat(&[3]))?;
        let inactive = match active {
            Some(a) => Some(inactive_from_active(a, &self.element_shape(IndexableElement::Cells)?)?),
            None => None,
        };
        self.adopted = Some(AdoptedGeometry { source, nodes });
        if inactive.is_some() {
            self.inactive = inactive;
        }
        self.invalidate_geometry_cache();
        tracing::debug!(grid = %self.uuid, ?source, "grid adopted geometry from points property");
        Ok(())
    }

    fn geometry_source(&self) -> Option<GeometrySource> {
        self.adopted.as_ref().map(|a| a.source)
    }

    fn inactive_mask(&self) -> Option<&[bool]> {
        self.inactive.as_deref()
    }
}
