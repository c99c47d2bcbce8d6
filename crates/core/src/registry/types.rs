//! Upstream change feed types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Bookkeeping key carried by the mapping form of the change feed.
pub const FEED_UPDATED_KEY: &str = "_updated";

/// One entry of the list form of the change feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub name: String,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl ChangeRecord {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metadata: Map::new(),
        }
    }
}

/// Response of the "changed since" endpoint.
///
/// Registries answer either with a list of change records (the static daily
/// feed) or with an object keyed by package name that also carries the
/// [`FEED_UPDATED_KEY`] entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChangeFeed {
    Records(Vec<ChangeRecord>),
    Mapping(Map<String, Value>),
}

impl ChangeFeed {
    /// Number of entries, not counting the bookkeeping key.
    pub fn len(&self) -> usize {
        match self {
            ChangeFeed::Records(records) => records.len(),
            ChangeFeed::Mapping(map) => {
                map.len() - usize::from(map.contains_key(FEED_UPDATED_KEY))
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_records_form() {
        let feed: ChangeFeed =
            serde_json::from_value(json!([{"name": "x", "version": "1.0.0"}, {"name": "y"}]))
                .unwrap();
        match feed {
            ChangeFeed::Records(records) => {
                assert_eq!(records.len(), 2);
                assert_eq!(records[0].name, "x");
                assert_eq!(records[0].metadata["version"], "1.0.0");
                assert_eq!(records[1].name, "y");
            }
            other => panic!("expected records, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_mapping_form() {
        let feed: ChangeFeed = serde_json::from_value(json!({
            "_updated": 1700000000000u64,
            "x": {"name": "x"},
            "y": {"name": "y"}
        }))
        .unwrap();
        assert!(matches!(feed, ChangeFeed::Mapping(_)));
        assert_eq!(feed.len(), 2);
    }

    #[test]
    fn test_mapping_with_only_bookkeeping_is_empty() {
        let feed: ChangeFeed =
            serde_json::from_value(json!({"_updated": 1700000000000u64})).unwrap();
        assert!(feed.is_empty());
    }
}
