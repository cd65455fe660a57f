//! Single property view over a one-part collection.

use std::sync::Arc;
use uuid::Uuid;

use super::collection::PropertyCollection;
use super::criteria::Criteria;
use super::descriptor::PropertyDescriptor;
use super::import::ImportEntry;
use super::lookup::StringLookup;
use crate::core::{ExtraMetadata, IndexableElement};
use crate::model::SharedModel;
use crate::util::{Error, PropertyArray, Result, ScalarValue};

/// One property, backed by a singleton collection.
#[derive(Debug)]
pub struct Property {
    collection: PropertyCollection,
    uuid: Uuid,
}

impl Property {
    /// View an existing property record.
    pub fn open(model: SharedModel, uuid: Uuid) -> Result<Self> {
        let mut collection = PropertyCollection::new(model);
        collection.add_part(uuid)?;
        Ok(Self { collection, uuid })
    }

    /// View the only part of a collection. Fails unless it holds exactly one.
    pub fn from_singleton_collection(collection: &PropertyCollection) -> Result<Self> {
        let d = collection
            .singleton(&Criteria::new())?
            .ok_or_else(|| Error::not_found("collection is empty"))?;
        Self::open(Arc::clone(collection.model()), d.uuid)
    }

    /// Stage, write and commit one entry on a support, returning its view.
    pub fn from_array(
        model: SharedModel,
        entry: ImportEntry,
        support_uuid: Uuid,
        time_series_uuid: Option<Uuid>,
    ) -> Result<Self> {
        let mut collection = PropertyCollection::new(model);
        collection.set_support(support_uuid)?;
        let created = collection.commit_entries(vec![entry], time_series_uuid)?;
        let uuid = created
            .first()
            .copied()
            .ok_or_else(|| Error::other("nothing committed"))?;
        Ok(Self { collection, uuid })
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn collection(&self) -> &PropertyCollection {
        &self.collection
    }

    pub fn descriptor(&self) -> Result<Arc<PropertyDescriptor>> {
        self.collection.descriptor(&self.uuid)
    }

    /// Full array; constants are broadcast.
    pub fn array_ref(&self) -> Result<Arc<PropertyArray>> {
        self.collection.cached_part_array_ref(&self.uuid)
    }

    pub fn constant_value(&self) -> Result<Option<ScalarValue>> {
        self.collection.constant_value_for_part(&self.uuid)
    }

    pub fn citation_title(&self) -> Result<String> {
        Ok(self.descriptor()?.citation_title.clone())
    }

    pub fn property_kind(&self) -> Result<String> {
        Ok(self.descriptor()?.property_kind.clone())
    }

    pub fn facet(&self) -> Result<(Option<String>, Option<String>)> {
        let d = self.descriptor()?;
        Ok((d.facet_type.clone(), d.facet.clone()))
    }

    pub fn indexable_element(&self) -> Result<IndexableElement> {
        Ok(self.descriptor()?.indexable_element)
    }

    pub fn is_continuous(&self) -> Result<bool> {
        Ok(self.descriptor()?.is_continuous())
    }

    pub fn is_categorical(&self) -> Result<bool> {
        Ok(self.descriptor()?.is_categorical())
    }

    pub fn is_points(&self) -> Result<bool> {
        Ok(self.descriptor()?.is_points)
    }

    pub fn count(&self) -> Result<usize> {
        Ok(self.descriptor()?.count)
    }

    pub fn uom(&self) -> Result<Option<String>> {
        Ok(self.descriptor()?.uom.clone())
    }

    pub fn realization(&self) -> Result<Option<u32>> {
        Ok(self.descriptor()?.realization)
    }

    pub fn time_index(&self) -> Result<Option<usize>> {
        Ok(self.descriptor()?.time_index)
    }

    pub fn time_series_uuid(&self) -> Result<Option<Uuid>> {
        Ok(self.descriptor()?.time_series_uuid)
    }

    pub fn null_value(&self) -> Result<Option<i64>> {
        Ok(self.descriptor()?.null_value)
    }

    pub fn min_value(&self) -> Result<Option<f64>> {
        self.collection.minimum_value_for_part(&self.uuid)
    }

    pub fn max_value(&self) -> Result<Option<f64>> {
        self.collection.maximum_value_for_part(&self.uuid)
    }

    pub fn string_lookup(&self) -> Result<Option<StringLookup>> {
        self.collection.string_lookup_for_part(&self.uuid)
    }

    pub fn extra_metadata(&self) -> Result<ExtraMetadata> {
        Ok(self.descriptor()?.extra_metadata.clone())
    }

    pub fn support_uuid(&self) -> Result<Uuid> {
        Ok(self.descriptor()?.support_uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;
    use crate::support::RegularGrid;
    use crate::util::Shape;

    #[test]
    fn test_from_array_and_reopen() {
        let mut model = Model::in_memory();
        let grid = model.add_support(RegularGrid::new("g", 1, 1, 3));
        let model = model.into_shared();

        let arr = PropertyArray::from_f64(Shape::d3(1, 1, 3), vec![1.0, 2.0, 4.0]).unwrap();
        let entry = ImportEntry::array("Perm", arr.clone())
            .kind("rock permeability")
            .facet("direction", "I")
            .uom("mD")
            .extra("origin", "test");
        let p = Property::from_array(Arc::clone(&model), entry, grid, None).unwrap();
        assert!(p.is_continuous().unwrap());
        assert_eq!(p.max_value().unwrap(), Some(4.0));
        assert_eq!(p.facet().unwrap().1.as_deref(), Some("I"));
        assert_eq!(p.extra_metadata().unwrap().get("origin"), Some("test"));

        let again = Property::open(model, p.uuid()).unwrap();
        assert!(again.array_ref().unwrap().approx_eq(&arr, 0.0));
        assert_eq!(again.constant_value().unwrap(), None);
    }

    #[test]
    fn test_from_singleton_collection() {
        let mut model = Model::in_memory();
        let grid = model.add_support(RegularGrid::new("g", 1, 1, 1));
        let model = model.into_shared();
        let p = Property::from_array(Arc::clone(&model), ImportEntry::constant("NTG", 0.5).uom("m3/m3"), grid, None)
            .unwrap();

        let pc = PropertyCollection::for_support(Arc::clone(&model), grid).unwrap();
        let view = Property::from_singleton_collection(&pc).unwrap();
        assert_eq!(view.uuid(), p.uuid());
        assert_eq!(view.constant_value().unwrap(), Some(ScalarValue::Float(0.5)));

        let empty = pc.select(&Criteria::new().kind("porosity"));
        assert!(matches!(Property::from_singleton_collection(&empty), Err(Error::NotFound(_))));
    }
}
