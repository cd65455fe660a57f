//! Property layer - descriptors, collections and their registries.
//!
//! - [`PropertyCollection`] - ordered catalog of descriptors on one support
//! - [`Criteria`] - selection predicates
//! - [`PropertyDescriptor`] - metadata of one property
//! - [`ImportEntry`] - staged arrays and constants awaiting commit
//! - [`Property`] - single property view
//! - [`PropertyKindRegistry`] / [`StringLookup`] - kinds and categorical lookups
//! - [`normalize`] - display rescaling

mod assembly;
mod collection;
pub(crate) mod criteria;
pub(crate) mod descriptor;
mod functions;
mod import;
mod kind;
mod lookup;
mod normalize;
mod staging;
mod standard_kinds;
mod view;

pub use collection::{PropertyCollection, TimeSetKind};
pub use criteria::{Criteria, TitleFilter, TitleMode};
pub use descriptor::{Payload, PropertyDescriptor};
pub use functions::{
    create_active_property, property_collection_for_keyword, property_over_time_series_from_collection,
    selective_version_of_collection, ACTIVE_TITLE,
};
pub use import::ImportEntry;
pub use kind::{PropertyKind, PropertyKindRegistry, DEFAULT_PARENT};
pub use lookup::StringLookup;
pub use normalize::{normalize, NormalizeOptions, Normalized};
pub use staging::DEFAULT_CONTINUOUS_UOM;
pub use standard_kinds::infer_property_kind;
pub use view::Property;
