//! In-memory property arrays.
//!
//! A [`PropertyArray`] pairs a [`Shape`] and a storage width
//! ([`PlainOldDataType`]) with values held in one of three domains:
//! booleans, 64-bit integers or 64-bit floats. The storage width only
//! matters when the array is encoded for the array store.

use byteorder::{ByteOrder, LittleEndian};
use half::f16;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Error, PlainOldDataType, PodValue, Result, Shape, StoragePod};

/// A single value, used for constant properties and element access.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl ScalarValue {
    /// Value as a float (booleans map to 0/1).
    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::Bool(b) => b as u8 as f64,
            Self::Int(i) => i as f64,
            Self::Float(f) => f,
        }
    }

    /// Integer value, None for floats.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::Bool(b) => Some(b as i64),
            Self::Int(i) => Some(i),
            Self::Float(_) => None,
        }
    }

    /// Default storage width for a value of this kind.
    pub fn natural_pod(&self) -> PlainOldDataType {
        match self {
            Self::Bool(_) => PlainOldDataType::Boolean,
            Self::Int(_) => PlainOldDataType::Int32,
            Self::Float(_) => PlainOldDataType::Float64,
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(v) => write!(f, "{}", v),
        }
    }
}

impl From<PodValue> for ScalarValue {
    fn from(v: PodValue) -> Self {
        match v {
            PodValue::Bool(b) => Self::Bool(b),
            PodValue::Int(i) => Self::Int(i),
            PodValue::Float(f) => Self::Float(f),
        }
    }
}

impl From<f64> for ScalarValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<i64> for ScalarValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for ScalarValue {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<bool> for ScalarValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

/// Flat element storage in row-major order.
#[derive(Clone, Debug, PartialEq)]
pub enum ArrayValues {
    Bool(Vec<bool>),
    Int(Vec<i64>),
    Float(Vec<f64>),
}

impl ArrayValues {
    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            Self::Bool(v) => v.len(),
            Self::Int(v) => v.len(),
            Self::Float(v) => v.len(),
        }
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn domain_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
        }
    }

    fn accepts(&self, pod: PlainOldDataType) -> bool {
        match self {
            Self::Bool(_) => pod.is_bool(),
            Self::Int(_) => pod.is_integer(),
            Self::Float(_) => pod.is_float(),
        }
    }

    fn range(&self, start: usize, len: usize) -> Self {
        let end = start + len;
        match self {
            Self::Bool(v) => Self::Bool(v[start..end].to_vec()),
            Self::Int(v) => Self::Int(v[start..end].to_vec()),
            Self::Float(v) => Self::Float(v[start..end].to_vec()),
        }
    }
}

/// A shaped, typed property array.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyArray {
    shape: Shape,
    pod: PlainOldDataType,
    values: ArrayValues,
}

impl PropertyArray {
    /// Create an array, checking element count and value domain against the pod.
    pub fn new(shape: Shape, pod: PlainOldDataType, values: ArrayValues) -> Result<Self> {
        if values.len() != shape.num_elements() {
            return Err(Error::ShapeMismatch {
                expected: shape,
                actual: Shape::d1(values.len()),
            });
        }
        if !values.accepts(pod) {
            return Err(Error::TypeMismatch {
                expected: pod.name().to_string(),
                actual: values.domain_name().to_string(),
            });
        }
        if let (ArrayValues::Int(v), true) = (&values, pod != PlainOldDataType::Int64) {
            if let Some(bad) = v.iter().find(|x| !int_fits(pod, **x)) {
                return Err(Error::TypeMismatch {
                    expected: pod.name().to_string(),
                    actual: format!("integer {}", bad),
                });
            }
        }
        Ok(Self { shape, pod, values })
    }

    /// Float64 array.
    pub fn from_f64(shape: impl Into<Shape>, values: Vec<f64>) -> Result<Self> {
        Self::new(shape.into(), PlainOldDataType::Float64, ArrayValues::Float(values))
    }

    /// Int64 array.
    pub fn from_i64(shape: impl Into<Shape>, values: Vec<i64>) -> Result<Self> {
        Self::new(shape.into(), PlainOldDataType::Int64, ArrayValues::Int(values))
    }

    /// Int32 array.
    pub fn from_i32(shape: impl Into<Shape>, values: &[i32]) -> Result<Self> {
        Self::from_slice(shape, values)
    }

    /// Boolean array.
    pub fn from_bool(shape: impl Into<Shape>, values: Vec<bool>) -> Result<Self> {
        Self::new(shape.into(), PlainOldDataType::Boolean, ArrayValues::Bool(values))
    }

    /// Array from a typed slice; the storage width follows `T`.
    pub fn from_slice<T: StoragePod>(shape: impl Into<Shape>, data: &[T]) -> Result<Self> {
        let widened = data.iter().map(|x| x.to_value()).collect::<Result<Vec<_>>>()?;
        let values = match T::POD_TYPE {
            p if p.is_bool() => {
                ArrayValues::Bool(widened.into_iter().map(|v| matches!(v, PodValue::Bool(true))).collect())
            }
            p if p.is_integer() => ArrayValues::Int(
                widened
                    .into_iter()
                    .map(|v| match v {
                        PodValue::Int(i) => i,
                        _ => 0,
                    })
                    .collect(),
            ),
            _ => ArrayValues::Float(
                widened
                    .into_iter()
                    .map(|v| match v {
                        PodValue::Float(f) => f,
                        _ => 0.0,
                    })
                    .collect(),
            ),
        };
        Self::new(shape.into(), T::POD_TYPE, values)
    }

    /// Array of the given shape with every element set to `value`.
    pub fn filled(shape: impl Into<Shape>, value: ScalarValue, pod: PlainOldDataType) -> Result<Self> {
        let shape = shape.into();
        let n = shape.num_elements();
        let values = match value {
            ScalarValue::Bool(b) => ArrayValues::Bool(vec![b; n]),
            ScalarValue::Int(i) if pod.is_float() => ArrayValues::Float(vec![i as f64; n]),
            ScalarValue::Int(i) => ArrayValues::Int(vec![i; n]),
            ScalarValue::Float(f) => ArrayValues::Float(vec![f; n]),
        };
        Self::new(shape, pod, values)
    }

    /// Same values with a different storage width of the same domain.
    pub fn with_pod(self, pod: PlainOldDataType) -> Result<Self> {
        Self::new(self.shape, pod, self.values)
    }

    /// Convert to another storage width, promoting integers to float when
    /// the target is a float type.
    pub fn cast(&self, pod: PlainOldDataType) -> Result<Self> {
        if pod == self.pod {
            return Ok(self.clone());
        }
        match (&self.values, pod.is_float()) {
            (ArrayValues::Int(_), true) => {
                Self::new(self.shape.clone(), pod, ArrayValues::Float(self.to_f64_vec(None)))
            }
            _ => Self::new(self.shape.clone(), pod, self.values.clone()),
        }
    }

    /// Same values viewed with a different shape of equal element count.
    pub fn reshape(self, shape: impl Into<Shape>) -> Result<Self> {
        let shape = shape.into();
        if shape.num_elements() != self.shape.num_elements() {
            return Err(Error::ShapeMismatch {
                expected: shape,
                actual: self.shape,
            });
        }
        Ok(Self { shape, ..self })
    }

    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    #[inline]
    pub fn pod(&self) -> PlainOldDataType {
        self.pod
    }

    #[inline]
    pub fn values(&self) -> &ArrayValues {
        &self.values
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Approximate in-memory size in bytes.
    pub fn size_bytes(&self) -> usize {
        match &self.values {
            ArrayValues::Bool(v) => v.len(),
            ArrayValues::Int(v) => v.len() * 8,
            ArrayValues::Float(v) => v.len() * 8,
        }
    }

    pub fn as_f64(&self) -> Option<&[f64]> {
        match &self.values {
            ArrayValues::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<&[i64]> {
        match &self.values {
            ArrayValues::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<&[bool]> {
        match &self.values {
            ArrayValues::Bool(v) => Some(v),
            _ => None,
        }
    }

    /// Flat element by row-major index.
    pub fn get(&self, flat: usize) -> Option<ScalarValue> {
        match &self.values {
            ArrayValues::Bool(v) => v.get(flat).map(|b| ScalarValue::Bool(*b)),
            ArrayValues::Int(v) => v.get(flat).map(|i| ScalarValue::Int(*i)),
            ArrayValues::Float(v) => v.get(flat).map(|f| ScalarValue::Float(*f)),
        }
    }

    /// Element by full multi-dimensional index.
    pub fn get_nd(&self, index: &[usize]) -> Option<ScalarValue> {
        if index.len() != self.shape.rank() {
            return None;
        }
        let mut flat = 0;
        for (axis, &i) in index.iter().enumerate() {
            if i >= self.shape.sizes()[axis] {
                return None;
            }
            flat += i * self.shape.stride(axis);
        }
        self.get(flat)
    }

    /// All values as floats; elements equal to `null` become NaN.
    pub fn to_f64_vec(&self, null: Option<i64>) -> Vec<f64> {
        match &self.values {
            ArrayValues::Bool(v) => v.iter().map(|b| *b as u8 as f64).collect(),
            ArrayValues::Int(v) => v
                .iter()
                .map(|i| if Some(*i) == null { f64::NAN } else { *i as f64 })
                .collect(),
            ArrayValues::Float(v) => v.clone(),
        }
    }

    /// Minimum and maximum over finite, non-null elements.
    pub fn min_max(&self, null: Option<i64>) -> Option<(f64, f64)> {
        let mut result: Option<(f64, f64)> = None;
        for v in self.to_f64_vec(null) {
            if !v.is_finite() {
                continue;
            }
            result = Some(match result {
                None => (v, v),
                Some((lo, hi)) => (lo.min(v), hi.max(v)),
            });
        }
        result
    }

    /// Sub-array selected by indexing the leading axes, numpy style.
    /// Negative indices count from the end of an axis.
    pub fn slice_leading(&self, index: &[isize]) -> Result<Self> {
        let (start, len, shape) = leading_range(&self.shape, index)?;
        Ok(Self {
            shape,
            pod: self.pod,
            values: self.values.range(start, len),
        })
    }

    /// Replace the sub-array selected by `index` with `patch`.
    pub fn overwrite_leading(&mut self, index: &[isize], patch: &PropertyArray) -> Result<()> {
        let (start, len, shape) = leading_range(&self.shape, index)?;
        if patch.shape != shape {
            return Err(Error::ShapeMismatch {
                expected: shape,
                actual: patch.shape.clone(),
            });
        }
        let end = start + len;
        match (&mut self.values, &patch.values) {
            (ArrayValues::Bool(dst), ArrayValues::Bool(src)) => dst[start..end].copy_from_slice(src),
            (ArrayValues::Int(dst), ArrayValues::Int(src)) => dst[start..end].copy_from_slice(src),
            (ArrayValues::Float(dst), ArrayValues::Float(src)) => dst[start..end].copy_from_slice(src),
            (ArrayValues::Float(dst), ArrayValues::Int(src)) => {
                for (d, s) in dst[start..end].iter_mut().zip(src) {
                    *d = *s as f64;
                }
            }
            (dst, src) => {
                return Err(Error::TypeMismatch {
                    expected: dst.domain_name().to_string(),
                    actual: src.domain_name().to_string(),
                })
            }
        }
        Ok(())
    }

    /// Stack arrays of identical shape along a new leading axis.
    ///
    /// Mixed integer and float members are promoted to float. Integer
    /// members share the widest member width, promoted until every value
    /// fits; the result is signed when any member is.
    pub fn stack(arrays: &[&PropertyArray]) -> Result<Self> {
        let first = arrays
            .first()
            .ok_or_else(|| Error::InconsistentShapes("nothing to stack".into()))?;
        if let Some(odd) = arrays.iter().find(|a| a.shape != first.shape) {
            return Err(Error::InconsistentShapes(format!(
                "member shapes {} and {} differ",
                first.shape, odd.shape
            )));
        }
        let shape = first.shape.with_leading(arrays.len());
        let all_bool = arrays.iter().all(|a| matches!(a.values, ArrayValues::Bool(_)));
        let all_int = arrays.iter().all(|a| matches!(a.values, ArrayValues::Int(_)));
        let (values, pod) = if all_bool {
            let mut out = Vec::with_capacity(shape.num_elements());
            for a in arrays {
                if let ArrayValues::Bool(v) = &a.values {
                    out.extend_from_slice(v);
                }
            }
            (ArrayValues::Bool(out), PlainOldDataType::Boolean)
        } else if all_int {
            let mut out = Vec::with_capacity(shape.num_elements());
            for a in arrays {
                if let ArrayValues::Int(v) = &a.values {
                    out.extend_from_slice(v);
                }
            }
            let pod = stacked_int_pod(arrays, &out);
            (ArrayValues::Int(out), pod)
        } else {
            let mut out = Vec::with_capacity(shape.num_elements());
            for a in arrays {
                out.extend(a.to_f64_vec(None));
            }
            (ArrayValues::Float(out), PlainOldDataType::Float64)
        };
        Self::new(shape, pod, values)
    }

    /// Element-wise comparison; floats within `tolerance`, NaN equal to NaN.
    pub fn approx_eq(&self, other: &PropertyArray, tolerance: f64) -> bool {
        if self.shape != other.shape {
            return false;
        }
        match (&self.values, &other.values) {
            (ArrayValues::Bool(a), ArrayValues::Bool(b)) => a == b,
            (ArrayValues::Int(a), ArrayValues::Int(b)) => a == b,
            _ => self
                .to_f64_vec(None)
                .iter()
                .zip(other.to_f64_vec(None))
                .all(|(a, b)| (a.is_nan() && b.is_nan()) || (a - b).abs() <= tolerance),
        }
    }

    /// Encode elements little-endian at the array's storage width.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let n = self.len();
        let mut out = vec![0u8; n * self.pod.num_bytes()];
        match (&self.values, self.pod) {
            (ArrayValues::Bool(v), _) => {
                for (dst, b) in out.iter_mut().zip(v) {
                    *dst = *b as u8;
                }
            }
            (ArrayValues::Int(v), pod) => match pod {
                PlainOldDataType::Uint8 => {
                    for (dst, x) in out.iter_mut().zip(v) {
                        *dst = *x as u8;
                    }
                }
                PlainOldDataType::Int8 => {
                    let narrowed: Vec<i8> = v.iter().map(|x| *x as i8).collect();
                    out.copy_from_slice(bytemuck::cast_slice(&narrowed));
                }
                PlainOldDataType::Uint16 => {
                    let narrowed: Vec<u16> = v.iter().map(|x| *x as u16).collect();
                    LittleEndian::write_u16_into(&narrowed, &mut out);
                }
                PlainOldDataType::Int16 => {
                    let narrowed: Vec<i16> = v.iter().map(|x| *x as i16).collect();
                    LittleEndian::write_i16_into(&narrowed, &mut out);
                }
                PlainOldDataType::Uint32 => {
                    let narrowed: Vec<u32> = v.iter().map(|x| *x as u32).collect();
                    LittleEndian::write_u32_into(&narrowed, &mut out);
                }
                PlainOldDataType::Int32 => {
                    let narrowed: Vec<i32> = v.iter().map(|x| *x as i32).collect();
                    LittleEndian::write_i32_into(&narrowed, &mut out);
                }
                PlainOldDataType::Uint64 => {
                    let widened: Vec<u64> = v.iter().map(|x| *x as u64).collect();
                    LittleEndian::write_u64_into(&widened, &mut out);
                }
                _ => LittleEndian::write_i64_into(v, &mut out),
            },
            (ArrayValues::Float(v), pod) => match pod {
                PlainOldDataType::Float16 => {
                    let bits: Vec<u16> = v.iter().map(|x| f16::from_f64(*x).to_bits()).collect();
                    LittleEndian::write_u16_into(&bits, &mut out);
                }
                PlainOldDataType::Float32 => {
                    let narrowed: Vec<f32> = v.iter().map(|x| *x as f32).collect();
                    LittleEndian::write_f32_into(&narrowed, &mut out);
                }
                _ => LittleEndian::write_f64_into(v, &mut out),
            },
        }
        out
    }

    /// Decode little-endian bytes written by [`to_le_bytes`](Self::to_le_bytes).
    pub fn from_le_bytes(pod: PlainOldDataType, shape: Shape, bytes: &[u8]) -> Result<Self> {
        let n = shape.num_elements();
        if bytes.len() != n * pod.num_bytes() {
            return Err(Error::invalid(format!(
                "payload of {} bytes does not hold {} x {}",
                bytes.len(),
                n,
                pod
            )));
        }
        let values = match pod {
            PlainOldDataType::Boolean => ArrayValues::Bool(bytes.iter().map(|b| *b != 0).collect()),
            PlainOldDataType::Uint8 => ArrayValues::Int(bytes.iter().map(|b| *b as i64).collect()),
            PlainOldDataType::Int8 => {
                let signed: &[i8] = bytemuck::cast_slice(bytes);
                ArrayValues::Int(signed.iter().map(|b| *b as i64).collect())
            }
            PlainOldDataType::Uint16 => {
                let mut tmp = vec![0u16; n];
                LittleEndian::read_u16_into(bytes, &mut tmp);
                ArrayValues::Int(tmp.into_iter().map(i64::from).collect())
            }
            PlainOldDataType::Int16 => {
                let mut tmp = vec![0i16; n];
                LittleEndian::read_i16_into(bytes, &mut tmp);
                ArrayValues::Int(tmp.into_iter().map(i64::from).collect())
            }
            PlainOldDataType::Uint32 => {
                let mut tmp = vec![0u32; n];
                LittleEndian::read_u32_into(bytes, &mut tmp);
                ArrayValues::Int(tmp.into_iter().map(i64::from).collect())
            }
            PlainOldDataType::Int32 => {
                let mut tmp = vec![0i32; n];
                LittleEndian::read_i32_into(bytes, &mut tmp);
                ArrayValues::Int(tmp.into_iter().map(i64::from).collect())
            }
            PlainOldDataType::Uint64 => {
                let mut tmp = vec![0u64; n];
                LittleEndian::read_u64_into(bytes, &mut tmp);
                let widened = tmp
                    .into_iter()
                    .map(|x| {
                        i64::try_from(x).map_err(|_| Error::TypeMismatch {
                            expected: PlainOldDataType::Int64.name().to_string(),
                            actual: format!("integer {}", x),
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                ArrayValues::Int(widened)
            }
            PlainOldDataType::Int64 => {
                let mut tmp = vec![0i64; n];
                LittleEndian::read_i64_into(bytes, &mut tmp);
                ArrayValues::Int(tmp)
            }
            PlainOldDataType::Float16 => {
                let mut tmp = vec![0u16; n];
                LittleEndian::read_u16_into(bytes, &mut tmp);
                ArrayValues::Float(tmp.into_iter().map(|b| f16::from_bits(b).to_f64()).collect())
            }
            PlainOldDataType::Float32 => {
                let mut tmp = vec![0f32; n];
                LittleEndian::read_f32_into(bytes, &mut tmp);
                ArrayValues::Float(tmp.into_iter().map(f64::from).collect())
            }
            PlainOldDataType::Float64 => {
                let mut tmp = vec![0f64; n];
                LittleEndian::read_f64_into(bytes, &mut tmp);
                ArrayValues::Float(tmp)
            }
        };
        Self::new(shape, pod, values)
    }
}

/// Resolve a leading-axes index to (flat start, element count, remaining shape).
pub(crate) fn leading_range(shape: &Shape, index: &[isize]) -> Result<(usize, usize, Shape)> {
    if index.len() > shape.rank() {
        return Err(Error::IndexOutOfBounds {
            index: index.len() as isize,
            len: shape.rank(),
        });
    }
    let mut start = 0;
    for (axis, &i) in index.iter().enumerate() {
        let len = shape.sizes()[axis];
        let resolved = if i < 0 { i + len as isize } else { i };
        if resolved < 0 || resolved as usize >= len {
            return Err(Error::IndexOutOfBounds { index: i, len });
        }
        start += resolved as usize * shape.stride(axis);
    }
    let remaining = shape.trailing(index.len());
    let count = remaining.num_elements();
    Ok((start, count, remaining))
}

fn stacked_int_pod(members: &[&PropertyArray], values: &[i64]) -> PlainOldDataType {
    const UNSIGNED: [PlainOldDataType; 4] = [
        PlainOldDataType::Uint8,
        PlainOldDataType::Uint16,
        PlainOldDataType::Uint32,
        PlainOldDataType::Uint64,
    ];
    const SIGNED: [PlainOldDataType; 4] = [
        PlainOldDataType::Int8,
        PlainOldDataType::Int16,
        PlainOldDataType::Int32,
        PlainOldDataType::Int64,
    ];
    let width = members.iter().map(|a| a.pod.num_bytes()).max().unwrap_or(8);
    let signed = values.iter().any(|v| *v < 0) || members.iter().any(|a| SIGNED.contains(&a.pod));
    let candidates = if signed { SIGNED } else { UNSIGNED };
    candidates
        .into_iter()
        .filter(|pod| pod.num_bytes() >= width)
        .find(|pod| values.iter().all(|v| int_fits(*pod, *v)))
        .unwrap_or(PlainOldDataType::Int64)
}

fn int_fits(pod: PlainOldDataType, v: i64) -> bool {
    match pod {
        PlainOldDataType::Uint8 => (0..=u8::MAX as i64).contains(&v),
        PlainOldDataType::Int8 => (i8::MIN as i64..=i8::MAX as i64).contains(&v),
        PlainOldDataType::Uint16 => (0..=u16::MAX as i64).contains(&v),
        PlainOldDataType::Int16 => (i16::MIN as i64..=i16::MAX as i64).contains(&v),
        PlainOldDataType::Uint32 => (0..=u32::MAX as i64).contains(&v),
        PlainOldDataType::Int32 => (i32::MIN as i64..=i32::MAX as i64).contains(&v),
        PlainOldDataType::Uint64 => v >= 0,
        _ => true,
    }
}
