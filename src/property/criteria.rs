//! Selection criteria over descriptor metadata.
//!
//! A [`Criteria`] is a conjunction of optional predicates. Unset fields
//! match anything. Optional descriptor fields use a nested option so a
//! criterion can also require the field to be absent:
//! `None` = any, `Some(None)` = absent, `Some(Some(v))` = equal to `v`.

use std::collections::HashSet;
use uuid::Uuid;

use super::descriptor::PropertyDescriptor;
use crate::core::IndexableElement;

/// How a citation title criterion is compared.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TitleMode {
    #[default]
    Exact,
    StartsWith,
    EndsWith,
    Contains,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TitleFilter {
    pub text: String,
    pub mode: TitleMode,
    pub ignore_case: bool,
}

impl TitleFilter {
    pub fn matches(&self, title: &str) -> bool {
        let (title, text) = if self.ignore_case {
            (title.to_lowercase(), self.text.to_lowercase())
        } else {
            (title.to_string(), self.text.clone())
        };
        match self.mode {
            TitleMode::Exact => title == text,
            TitleMode::StartsWith => title.starts_with(&text),
            TitleMode::EndsWith => title.ends_with(&text),
            TitleMode::Contains => title.contains(&text),
        }
    }
}

/// Conjunction of metadata predicates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Criteria {
    pub property_kind: Option<String>,
    pub facet_type: Option<Option<String>>,
    pub facet: Option<Option<String>>,
    pub indexable_element: Option<IndexableElement>,
    pub is_discrete: Option<bool>,
    pub is_points: Option<bool>,
    pub count: Option<usize>,
    pub realization: Option<Option<u32>>,
    pub time_index: Option<Option<usize>>,
    pub time_series_uuid: Option<Option<Uuid>>,
    pub string_lookup_uuid: Option<Option<Uuid>>,
    pub uom: Option<Option<String>>,
    pub citation_title: Option<TitleFilter>,
    pub uuid: Option<Uuid>,
    pub uuid_set: Option<HashSet<Uuid>>,
}

fn field_matches<T: PartialEq>(filter: &Option<Option<T>>, value: &Option<T>) -> bool {
    filter.as_ref().map_or(true, |want| want == value)
}

impl Criteria {
    /// Criteria matching everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Criteria pinning every metadata field of `d` except its uuid.
    pub fn from_descriptor(d: &PropertyDescriptor) -> Self {
        Self {
            property_kind: Some(d.property_kind.clone()),
            facet_type: Some(d.facet_type.clone()),
            facet: Some(d.facet.clone()),
            indexable_element: Some(d.indexable_element),
            is_discrete: Some(d.is_discrete),
            is_points: Some(d.is_points),
            count: Some(d.count),
            realization: Some(d.realization),
            time_index: Some(d.time_index),
            time_series_uuid: Some(d.time_series_uuid),
            string_lookup_uuid: Some(d.string_lookup_uuid),
            uom: Some(d.uom.clone()),
            citation_title: Some(TitleFilter {
                text: d.citation_title.clone(),
                mode: TitleMode::Exact,
                ignore_case: false,
            }),
            uuid: None,
            uuid_set: None,
        }
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.property_kind = Some(kind.into());
        self
    }

    pub fn facet(mut self, facet_type: impl Into<String>, facet: impl Into<String>) -> Self {
        self.facet_type = Some(Some(facet_type.into()));
        self.facet = Some(Some(facet.into()));
        self
    }

    pub fn no_facet(mut self) -> Self {
        self.facet_type = Some(None);
        self.facet = Some(None);
        self
    }

    pub fn element(mut self, element: IndexableElement) -> Self {
        self.indexable_element = Some(element);
        self
    }

    pub fn discrete(mut self, discrete: bool) -> Self {
        self.is_discrete = Some(discrete);
        self
    }

    pub fn points(mut self, points: bool) -> Self {
        self.is_points = Some(points);
        self
    }

    pub fn count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    pub fn realization(mut self, realization: u32) -> Self {
        self.realization = Some(Some(realization));
        self
    }

    pub fn no_realization(mut self) -> Self {
        self.realization = Some(None);
        self
    }

    pub fn time_index(mut self, time_index: usize) -> Self {
        self.time_index = Some(Some(time_index));
        self
    }

    pub fn no_time_index(mut self) -> Self {
        self.time_index = Some(None);
        self
    }

    pub fn time_series(mut self, uuid: Uuid) -> Self {
        self.time_series_uuid = Some(Some(uuid));
        self
    }

    pub fn string_lookup(mut self, uuid: Uuid) -> Self {
        self.string_lookup_uuid = Some(Some(uuid));
        self
    }

    pub fn uom(mut self, uom: impl Into<String>) -> Self {
        self.uom = Some(Some(uom.into()));
        self
    }

    /// Exact, case-sensitive title.
    pub fn title(self, title: impl Into<String>) -> Self {
        self.title_with(title, TitleMode::Exact, false)
    }

    pub fn title_with(mut self, title: impl Into<String>, mode: TitleMode, ignore_case: bool) -> Self {
        self.citation_title = Some(TitleFilter {
            text: title.into(),
            mode,
            ignore_case,
        });
        self
    }

    pub fn uuid(mut self, uuid: Uuid) -> Self {
        self.uuid = Some(uuid);
        self
    }

    pub fn uuids(mut self, uuids: impl IntoIterator<Item = Uuid>) -> Self {
        self.uuid_set = Some(uuids.into_iter().collect());
        self
    }

    /// True if every set predicate holds for `d`.
    pub fn matches(&self, d: &PropertyDescriptor) -> bool {
        self.property_kind.as_ref().map_or(true, |k| *k == d.property_kind)
            && field_matches(&self.facet_type, &d.facet_type)
            && field_matches(&self.facet, &d.facet)
            && self.indexable_element.map_or(true, |e| e == d.indexable_element)
            && self.is_discrete.map_or(true, |b| b == d.is_discrete)
            && self.is_points.map_or(true, |b| b == d.is_points)
            && self.count.map_or(true, |c| c == d.count)
            && field_matches(&self.realization, &d.realization)
            && field_matches(&self.time_index, &d.time_index)
            && field_matches(&self.time_series_uuid, &d.time_series_uuid)
            && field_matches(&self.string_lookup_uuid, &d.string_lookup_uuid)
            && field_matches(&self.uom, &d.uom)
            && self.citation_title.as_ref().map_or(true, |t| t.matches(&d.citation_title))
            && self.uuid.map_or(true, |u| u == d.uuid)
            && self.uuid_set.as_ref().map_or(true, |set| set.contains(&d.uuid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::descriptor::fixtures::descriptor;

    #[test]
    fn test_empty_matches_all() {
        let d = descriptor(Uuid::new_v4(), "porosity");
        assert!(Criteria::new().matches(&d));
    }

    #[test]
    fn test_field_predicates() {
        let mut d = descriptor(Uuid::new_v4(), "rock permeability");
        d.facet_type = Some("direction".into());
        d.facet = Some("K".into());
        d.realization = Some(2);

        assert!(Criteria::new().kind("rock permeability").facet("direction", "K").matches(&d));
        assert!(!Criteria::new().facet("direction", "I").matches(&d));
        assert!(!Criteria::new().no_facet().matches(&d));
        assert!(Criteria::new().realization(2).matches(&d));
        assert!(!Criteria::new().no_realization().matches(&d));
        assert!(Criteria::new().no_time_index().matches(&d));
        assert!(!Criteria::new().discrete(true).matches(&d));
        assert!(Criteria::new().uuids([d.uuid]).matches(&d));
        assert!(!Criteria::new().uuid(Uuid::new_v4()).matches(&d));
    }

    #[test]
    fn test_title_modes() {
        let mut d = descriptor(Uuid::new_v4(), "porosity");
        d.citation_title = "Layer Porosity".into();
        assert!(Criteria::new().title("Layer Porosity").matches(&d));
        assert!(!Criteria::new().title("layer porosity").matches(&d));
        assert!(Criteria::new().title_with("layer porosity", TitleMode::Exact, true).matches(&d));
        assert!(Criteria::new().title_with("Layer", TitleMode::StartsWith, false).matches(&d));
        assert!(Criteria::new().title_with("Porosity", TitleMode::EndsWith, false).matches(&d));
        assert!(Criteria::new().title_with("r P", TitleMode::Contains, false).matches(&d));
        assert!(!Criteria::new().title_with("Perm", TitleMode::Contains, false).matches(&d));
    }

    #[test]
    fn test_from_descriptor_distinguishes_absent_fields() {
        let support = Uuid::new_v4();
        let plain = descriptor(support, "porosity");
        let mut staged = plain.clone();
        staged.uuid = Uuid::new_v4();
        staged.realization = Some(0);

        let c = Criteria::from_descriptor(&plain);
        assert!(c.matches(&plain));
        assert!(!c.matches(&staged));
    }
}
