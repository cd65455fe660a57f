//! Indexable elements of a spatial support.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The structural element of a support that a property assigns one
/// value-group to. Determines the leading dimensions of the property array.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IndexableElement {
    #[default]
    #[serde(rename = "cells")]
    Cells,
    #[serde(rename = "nodes")]
    Nodes,
    #[serde(rename = "nodes per cell")]
    NodesPerCell,
    #[serde(rename = "faces")]
    Faces,
    #[serde(rename = "faces per cell")]
    FacesPerCell,
    #[serde(rename = "edges per cell")]
    EdgesPerCell,
    #[serde(rename = "columns")]
    Columns,
    #[serde(rename = "pillars")]
    Pillars,
    #[serde(rename = "layers")]
    Layers,
    #[serde(rename = "K faces")]
    KFaces,
    #[serde(rename = "J faces")]
    JFaces,
    #[serde(rename = "I faces")]
    IFaces,
}

impl IndexableElement {
    pub const ALL: [Self; 12] = [
        Self::Cells,
        Self::Nodes,
        Self::NodesPerCell,
        Self::Faces,
        Self::FacesPerCell,
        Self::EdgesPerCell,
        Self::Columns,
        Self::Pillars,
        Self::Layers,
        Self::KFaces,
        Self::JFaces,
        Self::IFaces,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Cells => "cells",
            Self::Nodes => "nodes",
            Self::NodesPerCell => "nodes per cell",
            Self::Faces => "faces",
            Self::FacesPerCell => "faces per cell",
            Self::EdgesPerCell => "edges per cell",
            Self::Columns => "columns",
            Self::Pillars => "pillars",
            Self::Layers => "layers",
            Self::KFaces => "K faces",
            Self::JFaces => "J faces",
            Self::IFaces => "I faces",
        }
    }

    /// Parse an element name; case-insensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|e| e.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for IndexableElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_roundtrip() {
        for e in IndexableElement::ALL {
            assert_eq!(IndexableElement::from_name(e.name()), Some(e));
        }
        assert_eq!(IndexableElement::from_name("Nodes"), Some(IndexableElement::Nodes));
        assert_eq!(IndexableElement::from_name("hinge"), None);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&IndexableElement::NodesPerCell).unwrap();
        assert_eq!(json, "\"nodes per cell\"");
        let back: IndexableElement = serde_json::from_str("\"K faces\"").unwrap();
        assert_eq!(back, IndexableElement::KFaces);
    }
}
