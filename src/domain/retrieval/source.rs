//! Retrieved solution sources and prompt context assembly.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Provenance of one retrieved chunk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_index: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Any other metadata the store returned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SourceMetadata {
    /// Reads metadata leniently. Values of the wrong type are left in `extra`.
    pub fn from_json(value: &Value) -> Self {
        let mut extra = match value {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };

        let doc_id = take_if(&mut extra, "docId", |v| v.as_str().map(str::to_string));
        let chunk_index = take_if(&mut extra, "chunkIndex", Value::as_u64);
        let title = take_if(&mut extra, "title", |v| v.as_str().map(str::to_string));

        Self {
            doc_id,
            chunk_index,
            title,
            extra,
        }
    }
}

fn take_if<T>(map: &mut Map<String, Value>, key: &str, read: impl Fn(&Value) -> Option<T>) -> Option<T> {
    let value = map.get(key).and_then(&read)?;
    map.remove(key);
    Some(value)
}

/// One chunk returned by a similarity query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedSource {
    pub id: String,
    pub content: String,
    pub metadata: SourceMetadata,
    /// Smaller is closer. Absent when the store did not report it.
    pub distance: Option<f64>,
}

impl RetrievedSource {
    /// True when the source is at least as close as `max_distance`.
    pub fn within_distance(&self, max_distance: f64) -> bool {
        self.distance.is_some_and(|d| d <= max_distance)
    }
}

/// Keeps sources within `max_distance`; returns all when no limit is set.
pub fn filter_by_distance(sources: Vec<RetrievedSource>, max_distance: Option<f64>) -> Vec<RetrievedSource> {
    match max_distance.filter(|d| d.is_finite()) {
        Some(limit) => sources.into_iter().filter(|s| s.within_distance(limit)).collect(),
        None => sources,
    }
}

/// Formats sources as numbered blocks for the solution prompt.
///
/// ```text
/// SOURCE 1 (id=a docId=guide chunkIndex=0 | title=Carts)
/// chunk text
/// ```
pub fn build_context_block(sources: &[RetrievedSource]) -> String {
    sources
        .iter()
        .enumerate()
        .map(|(i, source)| {
            let doc_id = source.metadata.doc_id.as_deref().unwrap_or("?");
            let chunk_index = source
                .metadata
                .chunk_index
                .map(|c| c.to_string())
                .unwrap_or_else(|| "?".to_string());
            let title = source
                .metadata
                .title
                .as_deref()
                .filter(|t| !t.is_empty())
                .map(|t| format!(" | title={}", t))
                .unwrap_or_default();
            format!(
                "SOURCE {} (id={} docId={} chunkIndex={}{})\n{}",
                i + 1,
                source.id,
                doc_id,
                chunk_index,
                title,
                source.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
