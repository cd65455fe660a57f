//! Array shape support.
//!
//! A shape lists the size of each axis of a property array, leading axis first.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Shape of a multi-dimensional property array.
///
/// Grid properties are typically rank 3 (`nk, nj, ni`) with optional
/// trailing axes for multi-valued or points data.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Shape {
    /// Size of each axis. Empty means scalar (rank 0).
    dims: SmallVec<[usize; 6]>,
}

impl Shape {
    /// Create scalar shape (rank 0).
    pub fn scalar() -> Self {
        Self { dims: SmallVec::new() }
    }

    /// Create 1D shape.
    pub fn d1(size: usize) -> Self {
        Self { dims: smallvec::smallvec![size] }
    }

    /// Create 2D shape.
    pub fn d2(a: usize, b: usize) -> Self {
        Self { dims: smallvec::smallvec![a, b] }
    }

    /// Create 3D shape.
    pub fn d3(a: usize, b: usize, c: usize) -> Self {
        Self { dims: smallvec::smallvec![a, b, c] }
    }

    /// Create from a slice of sizes.
    pub fn from_slice(sizes: &[usize]) -> Self {
        Self { dims: SmallVec::from_slice(sizes) }
    }

    /// Number of axes.
    #[inline]
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Size of one axis, None if the axis index is out of range.
    pub fn size(&self, axis: usize) -> Option<usize> {
        self.dims.get(axis).copied()
    }

    /// All axis sizes.
    pub fn sizes(&self) -> &[usize] {
        &self.dims
    }

    /// Total number of elements (product of all axis sizes).
    pub fn num_elements(&self) -> usize {
        self.dims.iter().product()
    }

    /// Check if this represents a scalar (rank 0).
    #[inline]
    pub fn is_scalar(&self) -> bool {
        self.dims.is_empty()
    }

    /// Add a trailing axis.
    pub fn push(&mut self, size: usize) {
        self.dims.push(size);
    }

    /// Shape with an extra leading axis, as produced by stacking.
    pub fn with_leading(&self, size: usize) -> Self {
        let mut dims = SmallVec::with_capacity(self.dims.len() + 1);
        dims.push(size);
        dims.extend_from_slice(&self.dims);
        Self { dims }
    }

    /// Shape with trailing axes appended.
    pub fn concat(&self, trailing: &[usize]) -> Self {
        let mut dims = self.dims.clone();
        dims.extend_from_slice(trailing);
        Self { dims }
    }

    /// Shape left after indexing away the first `n` axes.
    pub fn trailing(&self, n: usize) -> Self {
        Self::from_slice(&self.dims[n.min(self.dims.len())..])
    }

    /// Number of elements spanned by one step along `axis`.
    pub fn stride(&self, axis: usize) -> usize {
        self.dims.iter().skip(axis + 1).product()
    }
}

impl From<usize> for Shape {
    fn from(size: usize) -> Self {
        Self::d1(size)
    }
}

impl From<(usize, usize)> for Shape {
    fn from((a, b): (usize, usize)) -> Self {
        Self::d2(a, b)
    }
}

impl From<(usize, usize, usize)> for Shape {
    fn from((a, b, c): (usize, usize, usize)) -> Self {
        Self::d3(a, b, c)
    }
}

impl From<Vec<usize>> for Shape {
    fn from(v: Vec<usize>) -> Self {
        Self { dims: SmallVec::from_vec(v) }
    }
}

impl From<&[usize]> for Shape {
    fn from(v: &[usize]) -> Self {
        Self::from_slice(v)
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, s) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, " x ")?;
            }
            write!(f, "{}", s)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar() {
        let s = Shape::scalar();
        assert_eq!(s.rank(), 0);
        assert!(s.is_scalar());
        assert_eq!(s.num_elements(), 1);
        assert_eq!(format!("{}", s), "[]");
    }

    #[test]
    fn test_grid_shape() {
        let s = Shape::d3(2, 3, 4);
        assert_eq!(s.rank(), 3);
        assert_eq!(s.num_elements(), 24);
        assert_eq!(s.stride(0), 12);
        assert_eq!(s.stride(2), 1);
        assert_eq!(format!("{}", s), "[2 x 3 x 4]");
    }

    #[test]
    fn test_concat_and_leading() {
        let s = Shape::d3(2, 3, 4).concat(&[2, 3]);
        assert_eq!(s.sizes(), &[2, 3, 4, 2, 3]);

        let stacked = Shape::d2(3, 4).with_leading(5);
        assert_eq!(stacked.sizes(), &[5, 3, 4]);
        assert_eq!(stacked.trailing(1), Shape::d2(3, 4));
        assert_eq!(stacked.trailing(9), Shape::scalar());
    }

    #[test]
    fn test_from_conversions() {
        let a: Shape = 100usize.into();
        assert_eq!(a.rank(), 1);
        let b: Shape = (800usize, 600usize).into();
        assert_eq!(b.rank(), 2);
        let c: Shape = vec![1usize, 2, 3, 3].into();
        assert_eq!(c.rank(), 4);
    }

    #[test]
    fn test_serde_transparent() {
        let s = Shape::d3(2, 3, 4);
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, "[2,3,4]");
        let back: Shape = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
