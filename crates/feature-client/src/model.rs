use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One GeoJSON feature as returned by a chunk query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Feature {
    #[serde(rename = "type", default = "feature_tag")]
    pub feature_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub geometry: Option<Value>,
    #[serde(default)]
    pub properties: serde_json::Map<String, Value>,
}

fn feature_tag() -> String {
    "Feature".to_string()
}

impl Feature {
    /// Attribute lookup by field name.
    pub fn attribute(&self, field: &str) -> Option<&Value> {
        self.properties.get(field)
    }
}

/// The merged result of a fetch: every matching feature, renumbered with a
/// fresh contiguous index. Recreated on every call; the caller owns it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureCollection {
    #[serde(rename = "type", default = "collection_tag")]
    pub collection_type: String,
    pub features: Vec<Feature>,
}

fn collection_tag() -> String {
    "FeatureCollection".to_string()
}

impl FeatureCollection {
    pub fn empty() -> Self {
        Self {
            collection_type: collection_tag(),
            features: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Reassign ids 0..n in collection order.
    pub(crate) fn renumber(&mut self) {
        for (i, feature) in self.features.iter_mut().enumerate() {
            feature.id = Some(Value::from(i as u64));
        }
    }
}

/// Counters for one fetch invocation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct FetchStats {
    /// Ids returned by the id-only query, after sorting and deduplication.
    pub matched_ids: usize,
    /// Server-imposed per-request record cap.
    pub max_record_count: usize,
    /// Chunk queries issued.
    pub chunk_requests: usize,
    /// Chunks that yielded zero features even though their ids existed at
    /// list time (e.g. concurrent deletion). Anomaly, not a failure.
    pub empty_chunks: usize,
}

/// A fetched collection together with its counters.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub collection: FeatureCollection,
    pub stats: FetchStats,
}
