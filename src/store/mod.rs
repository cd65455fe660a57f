//! Binary array store.
//!
//! Property payloads live outside the metadata catalog, addressed by uuid.
//! [`ArrayStore`] is the interface the collection engine consumes;
//! [`MemoryArrayStore`] backs scratch models and [`FileArrayStore`] persists
//! datasets in a single container file.
//!
//! Shape validation against descriptors is the caller's job. The store only
//! checks that a write matches the layout that was allocated for it.

pub mod format;
mod reader;
mod writer;
mod file;

pub use file::FileArrayStore;
pub use reader::StoreReader;
pub use writer::StoreWriter;

use std::collections::HashMap;
use uuid::Uuid;

use crate::util::{leading_range, Error, PlainOldDataType, PropertyArray, Result, Shape};

/// Allocated slot for one dataset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArrayHandle {
    pub key: Uuid,
    pub pod: PlainOldDataType,
    pub shape: Shape,
}

impl ArrayHandle {
    /// Check an array against the allocated layout and convert it to the
    /// allocated storage width.
    pub fn conform(&self, array: &PropertyArray) -> Result<PropertyArray> {
        if array.shape() != &self.shape {
            return Err(Error::ShapeMismatch {
                expected: self.shape.clone(),
                actual: array.shape().clone(),
            });
        }
        array.cast(self.pod)
    }
}

/// How a store file is opened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StoreOptions {
    /// Allow writes (appending and in-place rewrites).
    pub writable: bool,
    /// Memory-map the file. Only honoured for read-only stores with the
    /// `mmap` feature enabled.
    pub use_mmap: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            writable: true,
            use_mmap: false,
        }
    }
}

impl StoreOptions {
    /// Read-only, memory mapped when available.
    pub fn read_only() -> Self {
        Self {
            writable: false,
            use_mmap: cfg!(feature = "mmap"),
        }
    }
}

/// Identifier-addressed storage of property arrays.
pub trait ArrayStore: Send + Sync {
    /// Reserve storage for a dataset with the given layout.
    fn allocate(&mut self, key: Uuid, pod: PlainOldDataType, shape: &Shape) -> Result<ArrayHandle>;

    /// Write a full array into an allocated slot.
    fn write(&mut self, handle: &ArrayHandle, array: &PropertyArray) -> Result<()>;

    /// Read a full dataset.
    fn read(&self, key: &Uuid) -> Result<PropertyArray>;

    /// Read the sub-array selected by indexing leading axes.
    fn read_slice(&self, key: &Uuid, index: &[isize]) -> Result<PropertyArray>;

    /// Replace the sub-array selected by indexing leading axes.
    fn overwrite_slice(&mut self, key: &Uuid, index: &[isize], array: &PropertyArray) -> Result<()>;

    /// True if a dataset has been written under `key`.
    fn contains(&self, key: &Uuid) -> bool;

    /// Stored layout of a dataset.
    fn shape_of(&self, key: &Uuid) -> Option<(PlainOldDataType, Shape)>;

    /// All written keys.
    fn keys(&self) -> Vec<Uuid>;

    /// Make written data durable.
    fn flush(&mut self) -> Result<()>;

    /// Allocate and write in one call.
    fn write_array(&mut self, key: Uuid, array: &PropertyArray) -> Result<ArrayHandle> {
        let handle = self.allocate(key, array.pod(), array.shape())?;
        self.write(&handle, array)?;
        Ok(handle)
    }
}

/// HashMap backed store for scratch models and tests.
#[derive(Debug, Default)]
pub struct MemoryArrayStore {
    arrays: HashMap<Uuid, PropertyArray>,
    allocated: HashMap<Uuid, ArrayHandle>,
}

impl MemoryArrayStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    fn get(&self, key: &Uuid) -> Result<&PropertyArray> {
        self.arrays
            .get(key)
            .ok_or_else(|| Error::not_found(format!("array {}", key)))
    }
}

impl ArrayStore for MemoryArrayStore {
    fn allocate(&mut self, key: Uuid, pod: PlainOldDataType, shape: &Shape) -> Result<ArrayHandle> {
        let handle = ArrayHandle {
            key,
            pod,
            shape: shape.clone(),
        };
        self.allocated.insert(key, handle.clone());
        Ok(handle)
    }

    fn write(&mut self, handle: &ArrayHandle, array: &PropertyArray) -> Result<()> {
        if !self.allocated.contains_key(&handle.key) {
            return Err(Error::not_found(format!("allocation {}", handle.key)));
        }
        let stored = handle.conform(array)?;
        self.arrays.insert(handle.key, stored);
        Ok(())
    }

    fn read(&self, key: &Uuid) -> Result<PropertyArray> {
        self.get(key).cloned()
    }

    fn read_slice(&self, key: &Uuid, index: &[isize]) -> Result<PropertyArray> {
        self.get(key)?.slice_leading(index)
    }

    fn overwrite_slice(&mut self, key: &Uuid, index: &[isize], array: &PropertyArray) -> Result<()> {
        let target = self
            .arrays
            .get_mut(key)
            .ok_or_else(|| Error::not_found(format!("array {}", key)))?;
        let (_, _, shape) = leading_range(target.shape(), index)?;
        let patch = array.cast(target.pod())?;
        if patch.shape() != &shape {
            return Err(Error::ShapeMismatch {
                expected: shape,
                actual: patch.shape().clone(),
            });
        }
        target.overwrite_leading(index, &patch)
    }

    fn contains(&self, key: &Uuid) -> bool {
        self.arrays.contains_key(key)
    }

    fn shape_of(&self, key: &Uuid) -> Option<(PlainOldDataType, Shape)> {
        self.arrays.get(key).map(|a| (a.pod(), a.shape().clone()))
    }

    fn keys(&self) -> Vec<Uuid> {
        self.arrays.keys().copied().collect()
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryArrayStore::new();
        let key = Uuid::new_v4();
        let array = PropertyArray::from_f64(Shape::d2(2, 3), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();

        store.write_array(key, &array).unwrap();
        assert!(store.contains(&key));
        assert_eq!(store.read(&key).unwrap(), array);
        assert_eq!(store.shape_of(&key), Some((PlainOldDataType::Float64, Shape::d2(2, 3))));

        let row = store.read_slice(&key, &[-1]).unwrap();
        assert_eq!(row.as_f64().unwrap(), &[3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_write_checks_allocation() {
        let mut store = MemoryArrayStore::new();
        let key = Uuid::new_v4();
        let handle = store.allocate(key, PlainOldDataType::Int32, &Shape::d1(3)).unwrap();

        let wrong = PropertyArray::from_i64(Shape::d1(4), vec![1, 2, 3, 4]).unwrap();
        assert!(matches!(store.write(&handle, &wrong), Err(Error::ShapeMismatch { .. })));

        let right = PropertyArray::from_i64(Shape::d1(3), vec![1, 2, 3]).unwrap();
        store.write(&handle, &right).unwrap();
        assert_eq!(store.read(&key).unwrap().pod(), PlainOldDataType::Int32);

        let stray = ArrayHandle {
            key: Uuid::new_v4(),
            pod: PlainOldDataType::Int32,
            shape: Shape::d1(3),
        };
        assert!(matches!(store.write(&stray, &right), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_memory_overwrite_slice() {
        let mut store = MemoryArrayStore::new();
        let key = Uuid::new_v4();
        let array = PropertyArray::from_f64(Shape::d2(2, 2), vec![1.0; 4]).unwrap();
        store.write_array(key, &array).unwrap();

        let patch = PropertyArray::from_i64(Shape::d1(2), vec![7, 8]).unwrap();
        store.overwrite_slice(&key, &[0], &patch).unwrap();
        assert_eq!(store.read(&key).unwrap().as_f64().unwrap(), &[7.0, 8.0, 1.0, 1.0]);

        assert!(store.read(&Uuid::new_v4()).is_err());
    }
}
