//! Core layer - fundamental types shared by supports, stores and properties.
//!
//! This module provides:
//! - [`ExtraMetadata`] - open key-value metadata with order-independent equality
//! - [`IndexableElement`] - which support element a property is defined over
//! - [`TimeSeries`] - ordered time points for dynamic properties
//! - [`ArrayCache`] - explicit per-collection cache of materialized arrays

mod metadata;
mod element;
mod time_series;
mod cache;

pub use metadata::ExtraMetadata;
pub use element::IndexableElement;
pub use time_series::{TimeFrame, TimeSeries, Timestamp};
pub use cache::ArrayCache;
