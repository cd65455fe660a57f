//! Property sets: persisted named groups of property uuids.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::ExtraMetadata;

/// Named group of descriptor uuids.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertySet {
    pub uuid: Uuid,
    pub title: String,
    members: Vec<Uuid>,
    /// All members share one property kind.
    pub has_single_property_kind: bool,
    /// Members span more than one realization.
    pub has_multiple_realizations: bool,
    #[serde(default, skip_serializing_if = "ExtraMetadata::is_empty")]
    pub extra_metadata: ExtraMetadata,
}

impl PropertySet {
    /// Create an empty set.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            title: title.into(),
            members: Vec::new(),
            has_single_property_kind: false,
            has_multiple_realizations: false,
            extra_metadata: ExtraMetadata::new(),
        }
    }

    /// Add a member; duplicates are ignored.
    pub fn add(&mut self, uuid: Uuid) {
        if !self.contains(&uuid) {
            self.members.push(uuid);
        }
    }

    pub fn contains(&self, uuid: &Uuid) -> bool {
        self.members.contains(uuid)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Uuid> {
        self.members.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_set_basic() {
        let mut set = PropertySet::new("initial conditions");
        assert!(set.is_empty());

        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        set.add(a);
        set.add(b);
        set.add(a);

        assert_eq!(set.len(), 2);
        assert!(set.contains(&b));
        assert!(!set.contains(&Uuid::new_v4()));
        assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![a, b]);
    }
}
