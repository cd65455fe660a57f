//! Plain Old Data types - the storage widths of property array elements.

use bytemuck::{Pod, Zeroable};
use half::f16;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Error, Result};

/// Plain Old Data type enum - the element type of a stored property array.
///
/// Each type has a fixed size and a little-endian binary representation in
/// the array store. Discrete properties default their null value to the
/// maximum representable integer of their storage width.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum PlainOldDataType {
    /// Boolean (stored as u8: 0 = false, non-zero = true)
    Boolean = 0,
    /// Unsigned 8-bit integer
    Uint8 = 1,
    /// Signed 8-bit integer
    Int8 = 2,
    /// Unsigned 16-bit integer
    Uint16 = 3,
    /// Signed 16-bit integer
    Int16 = 4,
    /// Unsigned 32-bit integer
    Uint32 = 5,
    /// Signed 32-bit integer
    Int32 = 6,
    /// Unsigned 64-bit integer
    Uint64 = 7,
    /// Signed 64-bit integer
    Int64 = 8,
    /// 16-bit floating point (IEEE 754 half precision)
    Float16 = 9,
    /// 32-bit floating point (IEEE 754 single precision)
    Float32 = 10,
    /// 64-bit floating point (IEEE 754 double precision)
    #[default]
    Float64 = 11,
}

impl PlainOldDataType {
    /// Number of POD types
    pub const COUNT: usize = 12;

    /// Returns the size in bytes of a single element of this type.
    #[inline]
    pub const fn num_bytes(self) -> usize {
        match self {
            Self::Boolean => 1,
            Self::Uint8 => 1,
            Self::Int8 => 1,
            Self::Uint16 => 2,
            Self::Int16 => 2,
            Self::Uint32 => 4,
            Self::Int32 => 4,
            Self::Uint64 => 8,
            Self::Int64 => 8,
            Self::Float16 => 2,
            Self::Float32 => 4,
            Self::Float64 => 8,
        }
    }

    /// Returns the name of this type as a string.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Boolean => "bool_t",
            Self::Uint8 => "uint8_t",
            Self::Int8 => "int8_t",
            Self::Uint16 => "uint16_t",
            Self::Int16 => "int16_t",
            Self::Uint32 => "uint32_t",
            Self::Int32 => "int32_t",
            Self::Uint64 => "uint64_t",
            Self::Int64 => "int64_t",
            Self::Float16 => "float16_t",
            Self::Float32 => "float32_t",
            Self::Float64 => "float64_t",
        }
    }

    /// Parse POD type from its name string.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "bool_t" => Self::Boolean,
            "uint8_t" => Self::Uint8,
            "int8_t" => Self::Int8,
            "uint16_t" => Self::Uint16,
            "int16_t" => Self::Int16,
            "uint32_t" => Self::Uint32,
            "int32_t" => Self::Int32,
            "uint64_t" => Self::Uint64,
            "int64_t" => Self::Int64,
            "float16_t" => Self::Float16,
            "float32_t" => Self::Float32,
            "float64_t" => Self::Float64,
            _ => return None,
        })
    }

    /// Convert from the u8 tag used in the store format.
    pub const fn from_u8(v: u8) -> Option<Self> {
        Some(match v {
            0 => Self::Boolean,
            1 => Self::Uint8,
            2 => Self::Int8,
            3 => Self::Uint16,
            4 => Self::Int16,
            5 => Self::Uint32,
            6 => Self::Int32,
            7 => Self::Uint64,
            8 => Self::Int64,
            9 => Self::Float16,
            10 => Self::Float32,
            11 => Self::Float64,
            _ => return None,
        })
    }

    /// Returns true if this is an integer type.
    #[inline]
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            Self::Uint8
                | Self::Int8
                | Self::Uint16
                | Self::Int16
                | Self::Uint32
                | Self::Int32
                | Self::Uint64
                | Self::Int64
        )
    }

    /// Returns true if this is a floating point type.
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float16 | Self::Float32 | Self::Float64)
    }

    /// Returns true for the boolean type.
    #[inline]
    pub const fn is_bool(self) -> bool {
        matches!(self, Self::Boolean)
    }

    /// Null sentinel for discrete data of this width: the maximum
    /// representable integer. `Uint64` saturates to `i64::MAX`.
    pub const fn default_null(self) -> Option<i64> {
        match self {
            Self::Uint8 => Some(u8::MAX as i64),
            Self::Int8 => Some(i8::MAX as i64),
            Self::Uint16 => Some(u16::MAX as i64),
            Self::Int16 => Some(i16::MAX as i64),
            Self::Uint32 => Some(u32::MAX as i64),
            Self::Int32 => Some(i32::MAX as i64),
            Self::Uint64 | Self::Int64 => Some(i64::MAX),
            Self::Boolean | Self::Float16 | Self::Float32 | Self::Float64 => None,
        }
    }
}

impl fmt::Display for PlainOldDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// === POD Trait for type-safe conversions ===

/// Element value domain an array is held in once loaded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PodValue {
    Bool(bool),
    Int(i64),
    Float(f64),
}

/// Trait for types that can be stored as property array elements.
pub trait StoragePod: Pod + Zeroable + Copy + Default {
    /// The corresponding PlainOldDataType enum value.
    const POD_TYPE: PlainOldDataType;

    /// Size of this type in bytes.
    const SIZE: usize = std::mem::size_of::<Self>();

    /// Widen into the loaded value domain. Fails for `u64` values above `i64::MAX`.
    fn to_value(self) -> Result<PodValue>;
}

macro_rules! impl_int_pod {
    ($($t:ty => $pod:ident),* $(,)?) => {
        $(
            impl StoragePod for $t {
                const POD_TYPE: PlainOldDataType = PlainOldDataType::$pod;

                #[inline]
                fn to_value(self) -> Result<PodValue> {
                    i64::try_from(self).map(PodValue::Int).map_err(|_| Error::TypeMismatch {
                        expected: PlainOldDataType::Int64.name().to_string(),
                        actual: format!("integer {}", self),
                    })
                }
            }
        )*
    };
}

impl_int_pod!(
    u8 => Uint8,
    i8 => Int8,
    u16 => Uint16,
    i16 => Int16,
    u32 => Uint32,
    i32 => Int32,
    u64 => Uint64,
    i64 => Int64,
);

impl StoragePod for f32 {
    const POD_TYPE: PlainOldDataType = PlainOldDataType::Float32;

    #[inline]
    fn to_value(self) -> Result<PodValue> {
        Ok(PodValue::Float(self as f64))
    }
}

impl StoragePod for f64 {
    const POD_TYPE: PlainOldDataType = PlainOldDataType::Float64;

    #[inline]
    fn to_value(self) -> Result<PodValue> {
        Ok(PodValue::Float(self))
    }
}

impl StoragePod for f16 {
    const POD_TYPE: PlainOldDataType = PlainOldDataType::Float16;

    #[inline]
    fn to_value(self) -> Result<PodValue> {
        Ok(PodValue::Float(self.to_f64()))
    }
}

/// Boolean type with guaranteed 1-byte storage.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct Bool(u8);

impl Bool {
    pub const TRUE: Self = Self(1);
    pub const FALSE: Self = Self(0);

    #[inline]
    pub const fn new(v: bool) -> Self {
        Self(v as u8)
    }

    #[inline]
    pub const fn get(self) -> bool {
        self.0 != 0
    }
}

impl From<bool> for Bool {
    #[inline]
    fn from(v: bool) -> Self {
        Self::new(v)
    }
}

impl From<Bool> for bool {
    #[inline]
    fn from(v: Bool) -> Self {
        v.get()
    }
}

impl fmt::Debug for Bool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

impl StoragePod for Bool {
    const POD_TYPE: PlainOldDataType = PlainOldDataType::Boolean;

    #[inline]
    fn to_value(self) -> Result<PodValue> {
        Ok(PodValue::Bool(self.get()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pod_sizes() {
        assert_eq!(PlainOldDataType::Boolean.num_bytes(), 1);
        assert_eq!(PlainOldDataType::Int32.num_bytes(), 4);
        assert_eq!(PlainOldDataType::Float16.num_bytes(), 2);
        assert_eq!(PlainOldDataType::Float64.num_bytes(), 8);
        assert_eq!(<i16 as StoragePod>::SIZE, 2);
    }

    #[test]
    fn test_pod_roundtrip() {
        for i in 0..PlainOldDataType::COUNT as u8 {
            let pod = PlainOldDataType::from_u8(i).unwrap();
            assert_eq!(PlainOldDataType::from_name(pod.name()), Some(pod));
        }
        assert_eq!(PlainOldDataType::from_u8(12), None);
        assert_eq!(PlainOldDataType::from_name("string"), None);
    }

    #[test]
    fn test_default_null() {
        assert_eq!(PlainOldDataType::Int32.default_null(), Some(i32::MAX as i64));
        assert_eq!(PlainOldDataType::Uint8.default_null(), Some(255));
        assert_eq!(PlainOldDataType::Int64.default_null(), Some(i64::MAX));
        assert_eq!(PlainOldDataType::Float32.default_null(), None);
        assert_eq!(PlainOldDataType::Boolean.default_null(), None);
    }

    #[test]
    fn test_storage_pod_values() {
        assert_eq!(7i8.to_value().unwrap(), PodValue::Int(7));
        assert_eq!(2.5f32.to_value().unwrap(), PodValue::Float(2.5));
        assert_eq!(f16::from_f32(0.5).to_value().unwrap(), PodValue::Float(0.5));
        assert_eq!(Bool::TRUE.to_value().unwrap(), PodValue::Bool(true));
        assert!(matches!(u64::MAX.to_value(), Err(Error::TypeMismatch { .. })));
        assert_eq!((i64::MAX as u64).to_value().unwrap(), PodValue::Int(i64::MAX));
        assert_eq!(std::mem::size_of::<Bool>(), 1);
    }
}
