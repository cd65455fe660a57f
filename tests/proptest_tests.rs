//! Property-based tests for lookups and selection.

use std::collections::BTreeMap;
use std::sync::Arc;

use proptest::prelude::*;
use reservoir_props::model::Model;
use reservoir_props::property::{Criteria, ImportEntry, PropertyCollection, StringLookup};
use reservoir_props::support::RegularGrid;

proptest! {
    /// Lookups answer the same whether codes end up dense or sparse.
    #[test]
    fn lookup_answers_match_bindings(bindings in prop::collection::btree_map(-5i64..200, "[a-z]{1,6}", 0..24)) {
        let lookup = StringLookup::from_pairs("codes", bindings.clone()).unwrap();
        prop_assert_eq!(lookup.as_map(), bindings.clone());
        for (code, text) in &bindings {
            prop_assert_eq!(lookup.get_string(*code), Some(text.as_str()));
            let lowest = bindings.iter().find(|(_, t)| *t == text).map(|(c, _)| *c);
            prop_assert_eq!(lookup.get_index_for_string(text), lowest);
        }
        prop_assert_eq!(lookup.get_string(1000), None);
        prop_assert_eq!(lookup.min_index(), bindings.keys().next().copied());
    }

    /// Every committed descriptor is found again by criteria built from it.
    #[test]
    fn descriptor_criteria_select_exactly_one(
        parts in prop::collection::btree_set((0u32..3, 0usize..3, prop::sample::select(vec!["I", "J", "K"])), 1..12)
    ) {
        let mut model = Model::in_memory();
        let grid = model.add_support(RegularGrid::new("g", 1, 1, 1));
        let ts = model.add_time_series(
            reservoir_props::core::TimeSeries::from_dates("ts", &["2000-01-01", "2000-02-01", "2000-03-01"]).unwrap(),
        );
        let model = model.into_shared();
        let mut pc = PropertyCollection::new(Arc::clone(&model));
        pc.set_support(grid).unwrap();
        for (r, t, axis) in &parts {
            pc.add_cached_array_to_imported_list(
                ImportEntry::constant("PERM", 1.0)
                    .kind("rock permeability")
                    .facet("direction", *axis)
                    .uom("mD")
                    .realization(*r)
                    .time_index(*t),
            )
            .unwrap();
        }
        pc.write_for_imported_list().unwrap();
        let created = pc.create_metadata_for_imported_list(Some(ts)).unwrap();
        prop_assert_eq!(created.len(), parts.len());

        for uuid in &created {
            let d = pc.descriptor(uuid).unwrap();
            let found = pc.singleton(&Criteria::from_descriptor(&d)).unwrap();
            prop_assert_eq!(found.map(|f| f.uuid), Some(*uuid));
        }

        let mut per_realization: BTreeMap<u32, usize> = BTreeMap::new();
        for (r, _, _) in &parts {
            *per_realization.entry(*r).or_default() += 1;
        }
        for (r, n) in per_realization {
            prop_assert_eq!(pc.select(&Criteria::new().realization(r)).count(), n);
        }
    }
}
