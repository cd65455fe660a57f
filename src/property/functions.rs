//! Free helpers building collections and common properties.

use std::sync::Arc;
use uuid::Uuid;

use super::collection::PropertyCollection;
use super::criteria::{Criteria, TitleMode};
use super::import::ImportEntry;
use crate::model::SharedModel;
use crate::util::{Error, PlainOldDataType, PropertyArray, Result};

/// Title of the properties made by [`create_active_property`].
pub const ACTIVE_TITLE: &str = "ACTIVE";

/// Parts of `collection` matching `criteria`, as a new collection.
pub fn selective_version_of_collection(collection: &PropertyCollection, criteria: &Criteria) -> PropertyCollection {
    collection.select(criteria)
}

/// Parts whose citation title equals `keyword`, ignoring case.
pub fn property_collection_for_keyword(collection: &PropertyCollection, keyword: &str) -> PropertyCollection {
    collection.select(&Criteria::new().title_with(keyword, TitleMode::Exact, true))
}

/// Every part of `collection` that is the same property as `example` at
/// another time index.
pub fn property_over_time_series_from_collection(
    collection: &PropertyCollection,
    example: &Uuid,
) -> Result<PropertyCollection> {
    let mut result = PropertyCollection::new(Arc::clone(collection.model()));
    if let Some(support) = collection.support_uuid() {
        result.set_support(support)?;
    }
    result.inherit_similar_parts_for_time_series_from_other_collection(collection, example)?;
    Ok(result)
}

/// Commit a boolean cell property flagging active cells.
///
/// The kind `active` is registered as a local discrete kind.
pub fn create_active_property(
    model: SharedModel,
    support_uuid: Uuid,
    active: &PropertyArray,
    time_series_uuid: Option<Uuid>,
    time_index: Option<usize>,
) -> Result<Uuid> {
    let mut collection = PropertyCollection::new(model);
    collection.set_support(support_uuid)?;
    let values = active.to_f64_vec(None).iter().map(|v| *v != 0.0).collect();
    let flags = PropertyArray::from_bool(active.shape().clone(), values)?;
    let mut entry = ImportEntry::array(ACTIVE_TITLE, flags)
        .kind("active")
        .discrete()
        .pod(PlainOldDataType::Boolean);
    entry.time_index = time_index;
    collection
        .commit_entries(vec![entry], time_series_uuid)?
        .first()
        .copied()
        .ok_or_else(|| Error::other("active property was not committed"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::IndexableElement;
    use crate::model::Model;
    use crate::support::RegularGrid;
    use crate::util::Shape;

    #[test]
    fn test_keyword_is_case_insensitive() {
        let mut model = Model::in_memory();
        let grid = model.add_support(RegularGrid::new("g", 1, 1, 1));
        let mut pc = PropertyCollection::new(model.into_shared());
        pc.set_support(grid).unwrap();
        pc.add_cached_array_to_imported_list(ImportEntry::constant("SW", 0.3).kind("saturation").uom("m3/m3"))
            .unwrap();
        pc.add_cached_array_to_imported_list(ImportEntry::constant("SWL", 0.1).kind("saturation").uom("m3/m3"))
            .unwrap();
        pc.write_for_imported_list().unwrap();
        pc.create_metadata_for_imported_list(None).unwrap();

        assert_eq!(property_collection_for_keyword(&pc, "sw").count(), 1);
        assert_eq!(selective_version_of_collection(&pc, &Criteria::new().kind("saturation")).count(), 2);
    }

    #[test]
    fn test_active_property_sets_mask() {
        let mut model = Model::in_memory();
        let grid = model.add_support(RegularGrid::new("g", 1, 1, 2));
        let model = model.into_shared();
        let active = PropertyArray::from_i32(Shape::d3(1, 1, 2), &[1, 0]).unwrap();
        let uuid = create_active_property(Arc::clone(&model), grid, &active, None, None).unwrap();

        let mut pc = PropertyCollection::for_support(Arc::clone(&model), grid).unwrap();
        let d = pc.descriptor(&uuid).unwrap();
        assert_eq!(d.pod, PlainOldDataType::Boolean);
        assert!(d.is_discrete);
        assert!(d.local_property_kind_uuid.is_some());
        assert_eq!(d.null_value, None);

        let nodes = model.read().support(&grid).unwrap().points().unwrap();
        let points = ImportEntry::array("geometry", nodes).element(IndexableElement::Nodes).points().uom("m");
        pc.add_cached_array_to_imported_list(points).unwrap();
        pc.write_for_imported_list().unwrap();
        pc.create_metadata_for_imported_list(None).unwrap();

        pc.set_support_geometry_from_property(&Criteria::new(), Some(&Criteria::new().title(ACTIVE_TITLE)))
            .unwrap();
        let m = model.read();
        assert_eq!(m.support(&grid).unwrap().inactive_mask(), Some(&[false, true][..]));
    }
}
