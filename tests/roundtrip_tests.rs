//! Integration tests for saving a model to disk and reading it back.

use std::sync::Arc;

use reservoir_props::core::{IndexableElement, TimeSeries};
use reservoir_props::model::{store_path_for, Model, RecordKind};
use reservoir_props::property::{Criteria, ImportEntry, PropertyCollection, StringLookup};
use reservoir_props::store::StoreOptions;
use reservoir_props::support::{RegularGrid, RegularMesh};
use reservoir_props::util::{Error, PlainOldDataType, PropertyArray, ScalarValue, Shape};
use tempfile::TempDir;

#[test]
fn test_roundtrip_arrays_and_metadata() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("field.json");

    let poro = PropertyArray::from_f64(Shape::d3(2, 3, 4), (0..24).map(|i| i as f64 / 23.0).collect())
        .expect("porosity array");
    let facies = PropertyArray::from_i32(Shape::d3(2, 3, 4), &(0..24).map(|i| i % 3).collect::<Vec<_>>())
        .expect("facies array");

    let (grid, lookup_uuid, ts_uuid) = {
        let mut model = Model::create(&path).expect("Failed to create model");
        let grid = model.add_support(RegularGrid::new("block", 2, 3, 4));
        let lookup = StringLookup::from_pairs("facies", [(0, "sand"), (1, "silt"), (2, "shale")]).unwrap();
        let lookup_uuid = model.create_string_lookup(lookup);
        let ts_uuid = model.add_time_series(TimeSeries::from_dates("history", &["2010-01-01", "2011-01-01"]).unwrap());
        let model = model.into_shared();

        let mut pc = PropertyCollection::new(Arc::clone(&model));
        pc.set_support(grid).unwrap();
        pc.add_cached_array_to_imported_list(ImportEntry::array("PORO", poro.clone()).kind("porosity").uom("m3/m3"))
            .unwrap();
        pc.add_cached_array_to_imported_list(
            ImportEntry::array("Facies", facies.clone())
                .kind("categorical")
                .discrete()
                .string_lookup(lookup_uuid),
        )
        .unwrap();
        pc.add_cached_array_to_imported_list(ImportEntry::constant("NTG", 0.9).kind("net to gross ratio").uom("m3/m3"))
            .unwrap();
        pc.add_cached_array_to_imported_list(
            ImportEntry::constant("Temp", 80.0).kind("reservoir temperature").uom("degC").time_index(1),
        )
        .unwrap();
        assert_eq!(pc.write_for_imported_list().unwrap(), 2);
        assert_eq!(pc.create_metadata_for_imported_list(Some(ts_uuid)).unwrap().len(), 4);

        model.write().save().expect("Failed to save model");
        (grid, lookup_uuid, ts_uuid)
    };
    assert!(store_path_for(&path).exists());

    let model = Model::open(&path).expect("Failed to reopen model").into_shared();
    {
        let m = model.read();
        assert_eq!(m.count(RecordKind::Property), 4);
        assert_eq!(m.count(RecordKind::StringLookup), 1);
        assert_eq!(m.count(RecordKind::TimeSeries), 1);
        // Local kind created for the non-standard temperature kind
        assert_eq!(m.count(RecordKind::PropertyKind), 1);
        assert_eq!(m.string_lookup(&lookup_uuid).unwrap().get_string(2), Some("shale"));
    }

    let pc = PropertyCollection::for_support(Arc::clone(&model), grid).expect("support present");
    assert_eq!(pc.count(), 4);

    let p = pc.single_array_ref(&Criteria::new().kind("porosity")).unwrap();
    assert!(p.approx_eq(&poro, 0.0));

    let f = pc.singleton(&Criteria::new().kind("categorical")).unwrap().unwrap();
    assert_eq!(f.pod, PlainOldDataType::Int32);
    assert!(pc.cached_part_array_ref(&f.uuid).unwrap().approx_eq(&facies, 0.0));
    assert_eq!(pc.string_lookup_for_part(&f.uuid).unwrap().unwrap().get_index_for_string("silt"), Some(1));

    let ntg = pc.singleton(&Criteria::new().title("NTG")).unwrap().unwrap();
    assert_eq!(ntg.const_value(), Some(ScalarValue::Float(0.9)));

    let temp = pc.singleton(&Criteria::new().time_index(1)).unwrap().unwrap();
    assert_eq!(temp.time_series_uuid, Some(ts_uuid));
    assert!(temp.local_property_kind_uuid.is_some());
}

#[test]
fn test_roundtrip_read_only_rejects_writes() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("ro.json");
    let grid = {
        let mut model = Model::create(&path).expect("Failed to create model");
        let grid = model.add_support(RegularGrid::new("g", 1, 2, 2));
        let model = model.into_shared();
        let mut pc = PropertyCollection::new(Arc::clone(&model));
        pc.set_support(grid).unwrap();
        pc.add_cached_array_to_imported_list(ImportEntry::constant("NTG", 1.0).uom("m3/m3"))
            .unwrap();
        pc.add_cached_array_to_imported_list(ImportEntry::array(
            "PORO",
            PropertyArray::from_f64(Shape::d3(1, 2, 2), vec![0.1, 0.2, 0.3, 0.4]).unwrap(),
        ))
        .unwrap();
        pc.write_for_imported_list().unwrap();
        pc.create_metadata_for_imported_list(None).unwrap();
        model.write().save().expect("Failed to save model");
        grid
    };

    let model = Model::open_with(&path, StoreOptions::read_only())
        .expect("Failed to open read-only")
        .into_shared();
    let mut pc = PropertyCollection::for_support(Arc::clone(&model), grid).unwrap();
    let ntg = pc.singleton(&Criteria::new().title("NTG")).unwrap().unwrap().uuid;
    let poro = pc.singleton(&Criteria::new().title("PORO")).unwrap().unwrap().uuid;

    let slice = pc.read_slice(&poro, &[0, 1]).unwrap();
    assert_eq!(slice.as_f64().unwrap(), &[0.3, 0.4]);
    assert!(matches!(pc.expand_constant_part(&ntg), Err(Error::ReadOnly)));
    let patch = PropertyArray::from_f64(Shape::d1(2), vec![0.0, 0.0]).unwrap();
    assert!(matches!(pc.overwrite_slice(&poro, &[0, 0], &patch), Err(Error::ReadOnly)));
}

#[test]
fn test_roundtrip_expanded_constant_and_slice_write() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("rw.json");
    let (grid, ntg) = {
        let mut model = Model::create(&path).expect("Failed to create model");
        let grid = model.add_support(RegularGrid::new("g", 2, 2, 2));
        let model = model.into_shared();
        let mut pc = PropertyCollection::new(Arc::clone(&model));
        pc.set_support(grid).unwrap();
        let ntg = pc
            .add_cached_array_to_imported_list(ImportEntry::constant("NTG", 0.5).uom("m3/m3"))
            .and_then(|_| pc.write_for_imported_list())
            .and_then(|_| pc.create_metadata_for_imported_list(None))
            .unwrap()[0];
        pc.expand_constant_part(&ntg).unwrap();
        model.write().save().unwrap();
        (grid, ntg)
    };

    {
        let model = Model::open(&path).expect("Failed to reopen").into_shared();
        let mut pc = PropertyCollection::for_support(Arc::clone(&model), grid).unwrap();
        assert_eq!(pc.constant_value_for_part(&ntg).unwrap(), None);
        let ones = PropertyArray::from_f64(Shape::d1(2), vec![1.0, 1.0]).unwrap();
        pc.overwrite_slice(&ntg, &[-1, -1], &ones).unwrap();
        model.write().save().unwrap();
    }

    let model = Model::open(&path).expect("Failed to reopen").into_shared();
    let pc = PropertyCollection::for_support(model, grid).unwrap();
    let values = pc.cached_part_array_ref(&ntg).unwrap();
    assert_eq!(values.as_f64().unwrap(), &[0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 1.0, 1.0]);
}

#[test]
fn test_roundtrip_adopted_geometry() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("geom.json");
    let mesh = {
        let mut model = Model::create(&path).expect("Failed to create model");
        let mesh = model.add_support(RegularMesh::new("surface", 2, 2, glam::DVec3::ZERO, [10.0, 10.0]));
        let model = model.into_shared();
        let mut pc = PropertyCollection::new(Arc::clone(&model));
        pc.set_support(mesh).unwrap();

        let nodes = model.read().support(&mesh).unwrap().points().unwrap();
        let mut shifted = nodes.to_f64_vec(None);
        for z in shifted.iter_mut().skip(2).step_by(3) {
            *z = -500.0;
        }
        let shifted = PropertyArray::from_f64(nodes.shape().clone(), shifted).unwrap();
        pc.add_cached_array_to_imported_list(
            ImportEntry::array("depth surface", shifted)
                .element(IndexableElement::Nodes)
                .points()
                .uom("m")
                .realization(3),
        )
        .unwrap();
        pc.write_for_imported_list().unwrap();
        pc.create_metadata_for_imported_list(None).unwrap();
        pc.set_support_geometry_from_property(&Criteria::new().realization(3), None)
            .unwrap();
        model.write().save().unwrap();
        mesh
    };

    let model = Model::open(&path).expect("Failed to reopen");
    let support = model.support(&mesh).expect("mesh persisted");
    let source = support.geometry_source().expect("adopted geometry persisted");
    assert_eq!(source.realization, Some(3));
    let points = support.points().unwrap();
    assert!(points.to_f64_vec(None).iter().skip(2).step_by(3).all(|z| *z == -500.0));
}

#[test]
fn test_open_missing_catalog() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let result = Model::open(dir.path().join("absent.json"));
    assert!(matches!(result, Err(Error::FileNotFound(_))));
}
