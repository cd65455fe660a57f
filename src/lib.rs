//! # reservoir-props
//!
//! Property collections for reservoir models: catalogs of property arrays
//! (porosity, permeability, facies codes, point geometry, ...) attached to
//! a grid or mesh, with metadata selection, lazy array loading, staging and
//! commit, and stacking across time series or realizations.
//!
//! ## Modules
//!
//! - [`util`] - Basic types (storage types, shapes, arrays, errors)
//! - [`core`] - Extra metadata, indexable elements, time series, array cache
//! - [`store`] - Binary array store (memory and single-file container)
//! - [`support`] - Grids and meshes properties are defined over
//! - [`model`] - Metadata records and their JSON catalog
//! - [`property`] - Descriptors, collections, kinds and lookups
//!
//! ## Example
//!
//! ```ignore
//! use reservoir_props::prelude::*;
//!
//! let mut model = Model::create("field.json")?;
//! let grid = model.add_support(RegularGrid::new("block", 2, 3, 4));
//! let model = model.into_shared();
//!
//! let mut pc = PropertyCollection::new(model.clone());
//! pc.set_support(grid)?;
//! pc.add_cached_array_to_imported_list(ImportEntry::constant("NTG", 0.8).kind("net to gross ratio").uom("m3/m3"))?;
//! pc.write_for_imported_list()?;
//! pc.create_metadata_for_imported_list(None)?;
//! model.write().save()?;
//! ```

pub mod util;
pub mod core;
pub mod store;
pub mod support;
pub mod model;
pub mod property;

// Re-export commonly used types
pub use util::{Error, PlainOldDataType, PropertyArray, Result, ScalarValue, Shape};
pub use model::{Model, SharedModel};
pub use property::{Criteria, ImportEntry, Property, PropertyCollection, PropertyDescriptor};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{ExtraMetadata, IndexableElement, TimeSeries};
    pub use crate::model::{Model, PropertySet, SharedModel};
    pub use crate::property::{
        Criteria, ImportEntry, NormalizeOptions, Property, PropertyCollection, PropertyDescriptor, StringLookup,
        TimeSetKind, TitleMode,
    };
    pub use crate::store::{ArrayStore, StoreOptions};
    pub use crate::support::{RegularGrid, RegularMesh, Support};
    pub use crate::util::{Error, PlainOldDataType, PropertyArray, Result, ScalarValue, Shape};
}
