//! Utility types used throughout the crate.
//!
//! - [`PlainOldDataType`] - storage width of array elements
//! - [`Shape`] - array shapes
//! - [`PropertyArray`] / [`ScalarValue`] - in-memory arrays and values
//! - [`Error`] / [`Result`] - error handling

mod pod;
mod error;
mod shape;
mod array;

pub use pod::*;
pub use error::*;
pub use shape::*;
pub use array::*;
