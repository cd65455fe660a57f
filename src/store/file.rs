//! Single-file array store.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use uuid::Uuid;

use super::format::{encode_index, BlockInfo, StoreHeader};
use super::{ArrayHandle, ArrayStore, StoreOptions, StoreReader, StoreWriter};
use crate::util::{leading_range, Error, PlainOldDataType, PropertyArray, Result, Shape};

/// Array store persisted in one container file.
///
/// Blocks are appended as they are written; the index is written on
/// [`flush`](ArrayStore::flush) (and on drop). Rewrites of identical layout
/// and slice overwrites happen in place.
pub struct FileArrayStore {
    path: PathBuf,
    reader: StoreReader,
    writer: Option<StoreWriter>,
    index: BTreeMap<Uuid, BlockInfo>,
    allocated: HashMap<Uuid, ArrayHandle>,
    dirty: bool,
}

impl FileArrayStore {
    /// Create a new, empty store file, truncating any existing file.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let writer = StoreWriter::create(&path)?;
        let reader = StoreReader::open_opts(&path, false)?;
        info!(path = %path.display(), "created array store");
        Ok(Self {
            path,
            reader,
            writer: Some(writer),
            index: BTreeMap::new(),
            allocated: HashMap::new(),
            dirty: false,
        })
    }

    /// Open an existing store read-write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, StoreOptions::default())
    }

    /// Open an existing store.
    pub fn open_with(path: impl AsRef<Path>, options: StoreOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let reader = StoreReader::open_opts(&path, options.use_mmap && !options.writable)?;
        let index = reader.read_index()?;
        let writer = if options.writable {
            Some(StoreWriter::open(&path)?)
        } else {
            None
        };
        info!(
            path = %path.display(),
            datasets = index.len(),
            mapped = reader.is_mapped(),
            "opened array store"
        );
        Ok(Self {
            path,
            reader,
            writer,
            index,
            allocated: HashMap::new(),
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_writable(&self) -> bool {
        self.writer.is_some()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    fn block(&self, key: &Uuid) -> Result<&BlockInfo> {
        self.index
            .get(key)
            .ok_or_else(|| Error::not_found(format!("array {}", key)))
    }

    fn writer(&mut self) -> Result<&mut StoreWriter> {
        self.writer.as_mut().ok_or(Error::ReadOnly)
    }

    /// Mark the header as not frozen before the first write after a flush.
    fn begin_write(&mut self) -> Result<()> {
        if self.dirty {
            return Ok(());
        }
        let header = self.reader.header()?;
        let writer = self.writer()?;
        writer.patch_header(&StoreHeader::new(false, header.index_pos))?;
        writer.flush()?;
        self.dirty = true;
        Ok(())
    }
}

impl ArrayStore for FileArrayStore {
    fn allocate(&mut self, key: Uuid, pod: PlainOldDataType, shape: &Shape) -> Result<ArrayHandle> {
        if self.writer.is_none() {
            return Err(Error::ReadOnly);
        }
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
        let payload = stored.to_le_bytes();
        self.begin_write()?;

        let existing = self
            .index
            .get(&handle.key)
            .filter(|b| b.same_layout(handle.pod, &handle.shape))
            .cloned();
        let writer = self.writer()?;
        let block = match existing {
            Some(block) => {
                writer.seek(block.payload_pos())?;
                writer.write_bytes(&payload)?;
                writer.seek_end()?;
                debug!(key = %handle.key, pos = block.pos, "rewrote dataset in place");
                block
            }
            None => {
                let pos = writer.seek_end()?;
                let block = BlockInfo {
                    pos,
                    pod: handle.pod,
                    shape: handle.shape.clone(),
                };
                writer.write_bytes(&block.encode_header())?;
                writer.write_bytes(&payload)?;
                debug!(key = %handle.key, pos, bytes = payload.len(), "appended dataset");
                block
            }
        };
        writer.flush()?;
        self.index.insert(handle.key, block);
        self.allocated.remove(&handle.key);
        Ok(())
    }

    fn read(&self, key: &Uuid) -> Result<PropertyArray> {
        let block = self.block(key)?;
        let bytes = self
            .reader
            .read_bytes(block.payload_pos(), block.payload_len() as usize)?;
        debug!(key = %key, shape = %block.shape, "read dataset");
        PropertyArray::from_le_bytes(block.pod, block.shape.clone(), &bytes)
    }

    fn read_slice(&self, key: &Uuid, index: &[isize]) -> Result<PropertyArray> {
        let block = self.block(key)?;
        let (start, count, shape) = leading_range(&block.shape, index)?;
        let width = block.pod.num_bytes();
        let bytes = self
            .reader
            .read_bytes(block.payload_pos() + (start * width) as u64, count * width)?;
        PropertyArray::from_le_bytes(block.pod, shape, &bytes)
    }

    fn overwrite_slice(&mut self, key: &Uuid, index: &[isize], array: &PropertyArray) -> Result<()> {
        let block = self.block(key)?.clone();
        let (start, _, shape) = leading_range(&block.shape, index)?;
        if array.shape() != &shape {
            return Err(Error::ShapeMismatch {
                expected: shape,
                actual: array.shape().clone(),
            });
        }
        let payload = array.cast(block.pod)?.to_le_bytes();
        self.begin_write()?;

        let writer = self.writer()?;
        writer.seek(block.payload_pos() + (start * block.pod.num_bytes()) as u64)?;
        writer.write_bytes(&payload)?;
        writer.seek_end()?;
        writer.flush()?;
        debug!(key = %key, ?index, "overwrote slice");
        Ok(())
    }

    fn contains(&self, key: &Uuid) -> bool {
        self.index.contains_key(key)
    }

    fn shape_of(&self, key: &Uuid) -> Option<(PlainOldDataType, Shape)> {
        self.index.get(key).map(|b| (b.pod, b.shape.clone()))
    }

    fn keys(&self) -> Vec<Uuid> {
        self.index.keys().copied().collect()
    }

    fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        let index = encode_index(self.index.iter());
        let writer = self.writer()?;
        let index_pos = writer.seek_end()?;
        writer.write_bytes(&index)?;
        writer.patch_header(&StoreHeader::new(true, index_pos))?;
        writer.sync()?;
        self.dirty = false;
        info!(path = %self.path.display(), datasets = self.index.len(), "flushed array store");
        Ok(())
    }
}

impl Drop for FileArrayStore {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::warn!(path = %self.path.display(), error = %e, "array store flush on drop failed");
        }
    }
}

impl std::fmt::Debug for FileArrayStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileArrayStore")
            .field("path", &self.path)
            .field("datasets", &self.index.len())
            .field("writable", &self.is_writable())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn grid_array() -> PropertyArray {
        PropertyArray::from_f64(Shape::d3(2, 3, 4), (0..24).map(|x| x as f64 / 23.0).collect()).unwrap()
    }

    #[test]
    fn test_write_flush_reopen() {
        let tmp = NamedTempFile::new().unwrap();
        let key = Uuid::new_v4();
        let codes = Uuid::new_v4();
        {
            let mut store = FileArrayStore::create(tmp.path()).unwrap();
            store.write_array(key, &grid_array()).unwrap();
            let discrete = PropertyArray::from_i64(Shape::d1(3), vec![0, 5, -2])
                .unwrap()
                .with_pod(PlainOldDataType::Int16)
                .unwrap();
            store.write_array(codes, &discrete).unwrap();
            store.flush().unwrap();
        }

        let store = FileArrayStore::open_with(tmp.path(), StoreOptions::read_only()).unwrap();
        assert_eq!(store.len(), 2);
        assert!(store.read(&key).unwrap().approx_eq(&grid_array(), 1e-12));
        let back = store.read(&codes).unwrap();
        assert_eq!(back.pod(), PlainOldDataType::Int16);
        assert_eq!(back.as_i64().unwrap(), &[0, 5, -2]);
    }

    #[test]
    fn test_read_only_rejects_writes() {
        let tmp = NamedTempFile::new().unwrap();
        FileArrayStore::create(tmp.path()).unwrap();
        let mut store = FileArrayStore::open_with(tmp.path(), StoreOptions::read_only()).unwrap();
        assert!(matches!(
            store.allocate(Uuid::new_v4(), PlainOldDataType::Float64, &Shape::d1(1)),
            Err(Error::ReadOnly)
        ));
    }

    #[test]
    fn test_slices_in_place() {
        let tmp = NamedTempFile::new().unwrap();
        let key = Uuid::new_v4();
        let mut store = FileArrayStore::create(tmp.path()).unwrap();
        store.write_array(key, &grid_array()).unwrap();
        let size_before = std::fs::metadata(tmp.path()).unwrap().len();

        let layer = store.read_slice(&key, &[-1, 0]).unwrap();
        assert_eq!(layer.shape(), &Shape::d1(4));
        assert!((layer.as_f64().unwrap()[0] - 12.0 / 23.0).abs() < 1e-12);

        let zeros = PropertyArray::from_f64(Shape::d2(3, 4), vec![0.0; 12]).unwrap();
        store.overwrite_slice(&key, &[1], &zeros).unwrap();
        assert_eq!(std::fs::metadata(tmp.path()).unwrap().len(), size_before);

        let full = store.read(&key).unwrap();
        assert_eq!(full.get_nd(&[1, 2, 3]).unwrap().as_f64(), 0.0);
        assert!(full.get_nd(&[0, 2, 3]).unwrap().as_f64() > 0.0);
    }

    #[test]
    fn test_rewrite_same_layout_in_place() {
        let tmp = NamedTempFile::new().unwrap();
        let key = Uuid::new_v4();
        let mut store = FileArrayStore::create(tmp.path()).unwrap();
        store.write_array(key, &grid_array()).unwrap();
        let size_before = std::fs::metadata(tmp.path()).unwrap().len();

        let ones = PropertyArray::from_f64(Shape::d3(2, 3, 4), vec![1.0; 24]).unwrap();
        store.write_array(key, &ones).unwrap();
        assert_eq!(std::fs::metadata(tmp.path()).unwrap().len(), size_before);
        assert_eq!(store.read(&key).unwrap(), ones);

        let other = PropertyArray::from_f64(Shape::d1(2), vec![1.0, 2.0]).unwrap();
        store.write_array(key, &other).unwrap();
        assert!(std::fs::metadata(tmp.path()).unwrap().len() > size_before);
        assert_eq!(store.shape_of(&key).unwrap().1, Shape::d1(2));
    }

    #[test]
    fn test_open_rejects_garbage() {
        let tmp = NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), b"not an array store at all").unwrap();
        assert!(matches!(FileArrayStore::open(tmp.path()), Err(Error::InvalidMagic)));

        let missing = tmp.path().with_extension("missing");
        assert!(matches!(FileArrayStore::open(&missing), Err(Error::FileNotFound(_))));
    }
}
