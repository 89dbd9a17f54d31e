use crate::endpoint::FeatureServiceEndpoint;
use crate::error::{FetchError, Result};
use crate::model::{Feature, FeatureCollection, FetchOutcome, FetchStats};
use crate::query::QuerySpec;
use serde_json::Value;

/// Client for paginated feature retrieval.
///
/// Retrieves every feature matching a query from a service that refuses to
/// return more than `maxRecordCount` records per request, without gaps or
/// duplicates, and without assuming object ids are contiguous. Requests are
/// issued strictly sequentially; nothing is cached or retried.
///
/// The client enforces no timeout of its own. Callers needing bounded
/// latency inject a `reqwest::Client` built with one and treat a timeout as
/// [`FetchError::EndpointUnavailable`].
#[derive(Debug, Clone, Default)]
pub struct FeatureClient {
    http: reqwest::Client,
}

impl FeatureClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a caller-configured transport (proxy, timeout, TLS options).
    pub fn with_http(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Fetch every feature matching `predicate`, with geometry and all
    /// attributes. Zero matches yield an empty collection, not an error.
    pub async fn fetch_all_features(
        &self,
        endpoint: &FeatureServiceEndpoint,
        predicate: &str,
    ) -> Result<FeatureCollection> {
        let outcome = self
            .fetch(endpoint, &QuerySpec::with_predicate(predicate))
            .await?;
        Ok(outcome.collection)
    }

    /// Fetch every feature matching `spec`, returning the merged collection
    /// together with per-invocation counters.
    pub async fn fetch(
        &self,
        endpoint: &FeatureServiceEndpoint,
        spec: &QuerySpec,
    ) -> Result<FetchOutcome> {
        let max_record_count = self.max_record_count(endpoint).await?;
        log::debug!("{endpoint}: record extract limit {max_record_count}");

        let (id_field, ids) = self.object_ids(endpoint, spec).await?;
        log::debug!("{endpoint}: {} matching ids ({id_field})", ids.len());

        let mut stats = FetchStats {
            matched_ids: ids.len(),
            max_record_count,
            ..FetchStats::default()
        };
        let mut collection = FeatureCollection::empty();

        for (lo, hi) in chunk_ranges(&ids, max_record_count) {
            // The id range is ANDed with the caller's predicate, so ids
            // skipped inside [lo, hi] still get filtered server-side.
            let clause = format!("({id_field} BETWEEN {lo} AND {hi}) AND ({})", spec.predicate);
            let chunk = self.feature_chunk(endpoint, spec, &clause).await?;
            stats.chunk_requests += 1;
            if chunk.is_empty() {
                stats.empty_chunks += 1;
                log::warn!(
                    "{endpoint}: chunk {id_field} {lo}..={hi} listed ids but returned no features"
                );
            }
            collection.features.extend(chunk);
        }

        collection.renumber();
        log::debug!(
            "{endpoint}: fetched {} features in {} requests ({} empty)",
            collection.len(),
            stats.chunk_requests,
            stats.empty_chunks
        );
        Ok(FetchOutcome { collection, stats })
    }

    /// Step 1: layer metadata, for the per-request record cap.
    async fn max_record_count(&self, endpoint: &FeatureServiceEndpoint) -> Result<usize> {
        let url = endpoint.metadata_url();
        let params = [("f", "json".to_string())];
        let value = self.get_json(url, &params, "metadata").await?;
        if let Some(message) = service_error(&value) {
            return Err(FetchError::unavailable(url, "metadata", message));
        }
        let count = value
            .get("maxRecordCount")
            .and_then(Value::as_u64)
            .filter(|&n| n >= 1)
            .ok_or_else(|| {
                FetchError::unavailable(url, "metadata", "missing or non-numeric maxRecordCount")
            })?;
        Ok(count as usize)
    }

    /// Step 2: the id-only query. Geometry and attributes are withheld here
    /// to keep the payload small.
    async fn object_ids(
        &self,
        endpoint: &FeatureServiceEndpoint,
        spec: &QuerySpec,
    ) -> Result<(String, Vec<i64>)> {
        let url = endpoint.query_url();
        let mut params = vec![
            ("where", spec.predicate.clone()),
            ("returnIdsOnly", "true".to_string()),
            ("f", "json".to_string()),
        ];
        spec.push_geometry_params(&mut params);

        let value = self.get_json(&url, &params, "object-ids").await?;
        if let Some(message) = service_error(&value) {
            return Err(FetchError::PredicateRejected {
                url,
                predicate: spec.predicate.clone(),
                message,
            });
        }

        let id_field = value
            .get("objectIdFieldName")
            .and_then(Value::as_str)
            .ok_or_else(|| FetchError::malformed(&url, "object-ids", "missing objectIdFieldName"))?
            .to_string();
        let ids_value = value
            .get("objectIds")
            .ok_or_else(|| FetchError::malformed(&url, "object-ids", "missing objectIds"))?;
        let mut ids = match ids_value {
            // Some servers answer zero matches with an explicit null.
            Value::Null => Vec::new(),
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_i64().ok_or_else(|| {
                        FetchError::malformed(&url, "object-ids", "non-integer object id")
                    })
                })
                .collect::<Result<Vec<i64>>>()?,
            _ => {
                return Err(FetchError::malformed(
                    &url,
                    "object-ids",
                    "objectIds is neither an array nor null",
                ))
            }
        };
        ids.sort_unstable();
        ids.dedup();
        Ok((id_field, ids))
    }

    /// Step 5: one full feature query for an id sub-range.
    async fn feature_chunk(
        &self,
        endpoint: &FeatureServiceEndpoint,
        spec: &QuerySpec,
        clause: &str,
    ) -> Result<Vec<Feature>> {
        let url = endpoint.query_url();
        let mut params = vec![
            ("where", clause.to_string()),
            ("returnGeometry", "true".to_string()),
            ("outFields", spec.out_fields.clone()),
            ("f", "geojson".to_string()),
        ];
        if let Some(epsg) = spec.out_sr {
            params.push(("outSR", epsg.to_string()));
        }
        spec.push_geometry_params(&mut params);

        let value = self.get_json(&url, &params, "features").await?;
        if let Some(message) = service_error(&value) {
            return Err(FetchError::PredicateRejected {
                url,
                predicate: clause.to_string(),
                message,
            });
        }
        let features = value
            .get("features")
            .ok_or_else(|| FetchError::malformed(&url, "features", "missing features"))?;
        serde_json::from_value(features.clone())
            .map_err(|e| FetchError::malformed(&url, "features", e.to_string()))
    }

    async fn get_json(
        &self,
        url: &str,
        params: &[(&'static str, String)],
        step: &'static str,
    ) -> Result<Value> {
        let response = self
            .http
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| FetchError::unavailable(url, step, e.to_string()))?
            .error_for_status()
            .map_err(|e| FetchError::unavailable(url, step, e.to_string()))?;
        response
            .json::<Value>()
            .await
            .map_err(|e| FetchError::malformed(url, step, e.to_string()))
    }
}

/// A 2xx body carrying an `error` object is a service-level rejection.
fn service_error(value: &Value) -> Option<String> {
    let error = value.get("error")?;
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("query error");
    match error.get("code").and_then(Value::as_i64) {
        Some(code) => Some(format!("{message} (code {code})")),
        None => Some(message.to_string()),
    }
}

/// Partition a sorted, deduplicated id list into inclusive `(lo, hi)` ranges
/// of at most `max_record_count` ids each. Boundaries come from list
/// entries, never from numeric arithmetic, so gaps in the id space cannot
/// widen a chunk past the record cap.
fn chunk_ranges(ids: &[i64], max_record_count: usize) -> Vec<(i64, i64)> {
    ids.chunks(max_record_count.max(1))
        .filter_map(|chunk| match (chunk.first(), chunk.last()) {
            (Some(&lo), Some(&hi)) => Some((lo, hi)),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{chunk_ranges, service_error};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn ranges_split_by_entry_count_not_numeric_width() {
        // Gap list: a numeric split would put 5 and 9 in the wrong windows.
        assert_eq!(chunk_ranges(&[1, 2, 5, 9], 3), vec![(1, 5), (9, 9)]);
    }

    #[test]
    fn request_count_is_ceil_of_ids_over_cap() {
        for (len, cap, want) in [(7usize, 3usize, 3usize), (6, 3, 2), (1, 1000, 1), (10, 10, 1)] {
            let ids: Vec<i64> = (1..=len as i64).collect();
            assert_eq!(chunk_ranges(&ids, cap).len(), want, "len={len} cap={cap}");
        }
    }

    #[test]
    fn cap_of_one_yields_one_range_per_id() {
        assert_eq!(
            chunk_ranges(&[2, 4, 6, 8, 10], 1),
            vec![(2, 2), (4, 4), (6, 6), (8, 8), (10, 10)]
        );
    }

    #[test]
    fn final_chunk_keeps_the_last_id() {
        // The off-by-one variants of this loop dropped the tail entry.
        let ids: Vec<i64> = (1..=10).collect();
        assert_eq!(chunk_ranges(&ids, 4), vec![(1, 4), (5, 8), (9, 10)]);
    }

    #[test]
    fn empty_list_yields_no_ranges() {
        assert!(chunk_ranges(&[], 5).is_empty());
    }

    #[test]
    fn service_error_extracts_message_and_code() {
        let body = json!({"error": {"code": 400, "message": "Invalid where clause"}});
        assert_eq!(
            service_error(&body).as_deref(),
            Some("Invalid where clause (code 400)")
        );
        assert_eq!(service_error(&json!({"features": []})), None);
    }
}
