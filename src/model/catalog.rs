//! On-disk JSON catalog of a model's metadata records.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::PropertySet;
use crate::core::TimeSeries;
use crate::property::{PropertyDescriptor, PropertyKindRegistry, StringLookup};
use crate::support::SupportObject;
use crate::util::{Error, Result};

/// Catalog format version written by this crate.
pub const CATALOG_VERSION: u32 = 1;

/// Extension of the array store file sitting next to a catalog.
pub const STORE_EXTENSION: &str = "parr";

/// Serialized form of every metadata record in a model.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub version: u32,
    #[serde(default)]
    pub supports: Vec<SupportObject>,
    #[serde(default)]
    pub properties: Vec<PropertyDescriptor>,
    #[serde(default)]
    pub property_kinds: PropertyKindRegistry,
    #[serde(default)]
    pub string_lookups: Vec<StringLookup>,
    #[serde(default)]
    pub time_series: Vec<TimeSeries>,
    #[serde(default)]
    pub property_sets: Vec<PropertySet>,
}

impl Catalog {
    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound(path.to_path_buf())
            } else {
                Error::Io(e)
            }
        })?;
        let catalog: Catalog = serde_json::from_str(&text)?;
        if catalog.version != CATALOG_VERSION {
            return Err(Error::invalid(format!("unsupported catalog version {}", catalog.version)));
        }
        Ok(catalog)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }
}

/// Array store path for a catalog path (`X.json` -> `X.parr`).
pub fn store_path_for(catalog: &Path) -> PathBuf {
    catalog.with_extension(STORE_EXTENSION)
}
