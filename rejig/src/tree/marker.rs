//! Extensible side-channel metadata attached to tree nodes.
//!
//! Markers carry information that is not part of the language grammar: a
//! search hit, a record that a subtree was structurally modified, a source
//! position. Each marker has a stable identity so that passes can check
//! whether they already ran (idempotent re-application).

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single typed marker. The set is closed for the kinds the engine itself
/// consumes, with a `Custom` escape hatch for recipe-defined metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Marker {
    /// A match produced by a search-only visitor.
    SearchResult {
        /// Stable marker identity.
        id: Uuid,
        /// Optional human-readable description of the hit.
        description: Option<String>,
    },
    /// The subtree rooted at the owning node was structurally changed and
    /// should be re-indented by the auto-format pass.
    Modified {
        /// Stable marker identity.
        id: Uuid,
    },
    /// Byte span of the node in the original source text.
    SourcePosition {
        /// Stable marker identity.
        id: Uuid,
        /// Start byte offset (inclusive).
        start: usize,
        /// End byte offset (exclusive).
        end: usize,
    },
    /// The attribution step could not resolve a type for this node.
    MissingType {
        /// Stable marker identity.
        id: Uuid,
    },
    /// Recipe-defined metadata, keyed so later passes can find it.
    Custom {
        /// Stable marker identity.
        id: Uuid,
        /// Discriminating key for the custom payload.
        key: CompactString,
        /// Arbitrary serializable payload.
        data: serde_json::Value,
    },
}

impl Marker {
    /// Creates a search-result marker with a fresh identity.
    #[must_use]
    pub fn search_result(description: Option<String>) -> Self {
        Self::SearchResult {
            id: Uuid::new_v4(),
            description,
        }
    }

    /// Creates a modified marker with a fresh identity.
    #[must_use]
    pub fn modified() -> Self {
        Self::Modified { id: Uuid::new_v4() }
    }

    /// Creates a missing-type marker with a fresh identity.
    #[must_use]
    pub fn missing_type() -> Self {
        Self::MissingType { id: Uuid::new_v4() }
    }

    /// The stable identity of this marker.
    #[must_use]
    pub fn id(&self) -> Uuid {
        match self {
            Self::SearchResult { id, .. }
            | Self::Modified { id }
            | Self::SourcePosition { id, .. }
            | Self::MissingType { id }
            | Self::Custom { id, .. } => *id,
        }
    }

    /// A key identifying the marker kind, used for wholesale replacement:
    /// adding a marker replaces any existing marker with the same key.
    #[must_use]
    pub fn key(&self) -> CompactString {
        match self {
            Self::SearchResult { .. } => CompactString::const_new("search_result"),
            Self::Modified { .. } => CompactString::const_new("modified"),
            Self::SourcePosition { .. } => CompactString::const_new("source_position"),
            Self::MissingType { .. } => CompactString::const_new("missing_type"),
            Self::Custom { key, .. } => key.clone(),
        }
    }
}

/// The marker set attached to a node. Markers are immutable once attached:
/// updating one means replacing it wholesale.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Markers {
    /// Markers in attachment order.
    pub markers: Vec<Marker>,
}

impl Markers {
    /// An empty marker set.
    pub const EMPTY: Self = Self {
        markers: Vec::new(),
    };

    /// True when no markers are attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Returns a copy with the given marker attached, replacing any
    /// existing marker with the same key. This is what makes re-running a
    /// marking pass idempotent.
    #[must_use]
    pub fn with(&self, marker: Marker) -> Self {
        let key = marker.key();
        let mut markers: Vec<Marker> =
            self.markers.iter().filter(|m| m.key() != key).cloned().collect();
        markers.push(marker);
        Self { markers }
    }

    /// Finds the first marker with the given key.
    #[must_use]
    pub fn find(&self, key: &str) -> Option<&Marker> {
        self.markers.iter().find(|m| m.key() == key)
    }

    /// True when a `Modified` marker is attached.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.find("modified").is_some()
    }

    /// True when a `SearchResult` marker is attached.
    #[must_use]
    pub fn has_search_result(&self) -> bool {
        self.find("search_result").is_some()
    }

    /// Returns a copy without any marker of the given key.
    #[must_use]
    pub fn without(&self, key: &str) -> Self {
        Self {
            markers: self.markers.iter().filter(|m| m.key() != key).cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_replaces_same_kind() {
        let markers = Markers::EMPTY
            .with(Marker::modified())
            .with(Marker::modified());
        assert_eq!(markers.markers.len(), 1);
        assert!(markers.is_modified());
    }

    #[test]
    fn custom_markers_keyed_independently() {
        let markers = Markers::EMPTY
            .with(Marker::Custom {
                id: Uuid::new_v4(),
                key: CompactString::from("a"),
                data: serde_json::json!(1),
            })
            .with(Marker::Custom {
                id: Uuid::new_v4(),
                key: CompactString::from("b"),
                data: serde_json::json!(2),
            });
        assert_eq!(markers.markers.len(), 2);
        assert!(markers.find("a").is_some());
        assert!(markers.find("b").is_some());
    }

    #[test]
    fn without_removes_by_key() {
        let markers = Markers::EMPTY.with(Marker::modified());
        assert!(markers.without("modified").is_empty());
    }

    #[test]
    fn markers_serialize_with_stable_ids() {
        let marker = Marker::search_result(Some("hit".to_owned()));
        let id = marker.id();
        let json = serde_json::to_string(&marker).expect("serializable");
        let back: Marker = serde_json::from_str(&json).expect("deserializable");
        assert_eq!(back.id(), id);
    }
}
