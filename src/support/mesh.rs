//! Regular 2D mesh (surface lattice) support.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{inactive_from_active, points_from_array, points_to_array, GeometrySource, Support};
use crate::core::IndexableElement;
use crate::util::{PropertyArray, Result, Shape};

/// Lattice of `nj x ni` nodes; cells and columns are the `(nj-1) x (ni-1)`
/// quads between them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegularMesh {
    pub uuid: Uuid,
    pub title: String,
    pub ni: usize,
    pub nj: usize,
    pub origin: DVec3,
    /// Node spacing along i (x) and j (y).
    pub spacing: [f64; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    adopted: Option<(GeometrySource, Vec<DVec3>)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inactive: Option<Vec<bool>>,
}

impl RegularMesh {
    pub fn new(title: impl Into<String>, ni: usize, nj: usize, origin: DVec3, spacing: [f64; 2]) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            title: title.into(),
            ni,
            nj,
            origin,
            spacing,
            adopted: None,
            inactive: None,
        }
    }

    fn node_shape(&self) -> Shape {
        Shape::d2(self.nj, self.ni)
    }

    fn regular_nodes(&self) -> Vec<DVec3> {
        (0..self.nj)
            .flat_map(|j| {
                (0..self.ni).map(move |i| {
                    self.origin + DVec3::new(i as f64 * self.spacing[0], j as f64 * self.spacing[1], 0.0)
                })
            })
            .collect()
    }
}

impl Support for RegularMesh {
    fn uuid(&self) -> Uuid {
        self.uuid
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn support_kind(&self) -> &'static str {
        "regular mesh"
    }

    fn element_shape(&self, element: IndexableElement) -> Result<Shape> {
        match element {
            IndexableElement::Nodes => Ok(self.node_shape()),
            IndexableElement::Cells | IndexableElement::Columns => {
                Ok(Shape::d2(self.nj.saturating_sub(1), self.ni.saturating_sub(1)))
            }
            other => Err(self.unsupported(other)),
        }
    }

    fn points(&self) -> Result<PropertyArray> {
        let shape = self.node_shape().concat(&[3]);
        match &self.adopted {
            Some((_, nodes)) => points_to_array(shape, nodes),
            None => points_to_array(shape, &self.regular_nodes()),
        }
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
        self.adopted = Some((source, nodes));
        if inactive.is_some() {
            self.inactive = inactive;
        }
        Ok(())
    }

    fn geometry_source(&self) -> Option<GeometrySource> {
        self.adopted.as_ref().map(|(s, _)| *s)
    }

    fn inactive_mask(&self) -> Option<&[bool]> {
        self.inactive.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::Error;

    #[test]
    fn test_mesh_shapes() {
        let m = RegularMesh::new("surface", 5, 4, DVec3::ZERO, [25.0, 25.0]);
        assert_eq!(m.element_shape(IndexableElement::Nodes).unwrap(), Shape::d2(4, 5));
        assert_eq!(m.element_shape(IndexableElement::Cells).unwrap(), Shape::d2(3, 4));
        assert!(matches!(
            m.element_shape(IndexableElement::KFaces),
            Err(Error::UnsupportedElement { .. })
        ));
    }

    #[test]
    fn test_mesh_points() {
        let m = RegularMesh::new("surface", 3, 2, DVec3::new(10.0, 20.0, -5.0), [1.0, 2.0]);
        let pts = m.points().unwrap();
        assert_eq!(pts.shape().sizes(), &[2, 3, 3]);
        assert_eq!(pts.get_nd(&[1, 2, 0]).unwrap().as_f64(), 12.0);
        assert_eq!(pts.get_nd(&[1, 2, 1]).unwrap().as_f64(), 22.0);
        assert_eq!(pts.get_nd(&[1, 2, 2]).unwrap().as_f64(), -5.0);
    }

    #[test]
    fn test_mesh_keeps_active_mask() {
        let mut m = RegularMesh::new("surface", 3, 2, DVec3::ZERO, [1.0, 1.0]);
        let nodes = m.points().unwrap();
        let active = PropertyArray::from_bool(Shape::d2(1, 2), vec![true, false]).unwrap();
        m.set_geometry_from_property(&nodes, GeometrySource::default(), Some(&active))
            .unwrap();
        assert_eq!(m.inactive_mask(), Some(&[false, true][..]));

        let wrong = PropertyArray::from_bool(Shape::d2(2, 3), vec![true; 6]).unwrap();
        assert!(m.set_geometry_from_property(&nodes, GeometrySource::default(), Some(&wrong)).is_err());
        assert_eq!(m.inactive_mask(), Some(&[false, true][..]));
    }
}
