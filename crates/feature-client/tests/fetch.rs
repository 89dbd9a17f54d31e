//! Pagination behavior against a mock feature service.

use munigis_client::{
    FeatureClient, FeatureServiceEndpoint, FetchError, FeatureCollection, GeometryFilter,
    QuerySpec,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LAYER: &str = "/FeatureServer/0";
const QUERY: &str = "/FeatureServer/0/query";

fn endpoint(server: &MockServer) -> FeatureServiceEndpoint {
    FeatureServiceEndpoint::new(format!("{}{LAYER}", server.uri())).unwrap()
}

async fn mount_metadata(server: &MockServer, max_record_count: u64, times: u64) {
    Mock::given(method("GET"))
        .and(path(LAYER))
        .and(query_param("f", "json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({
                "maxRecordCount": max_record_count,
                "type": "Feature Layer"
            })),
        )
        .expect(times)
        .mount(server)
        .await;
}

async fn mount_id_query(server: &MockServer, body: Value, times: u64) {
    Mock::given(method("GET"))
        .and(path(QUERY))
        .and(query_param("returnIdsOnly", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(times)
        .mount(server)
        .await;
}

async fn mount_chunk(server: &MockServer, where_clause: &str, ids: &[i64], times: u64) {
    Mock::given(method("GET"))
        .and(path(QUERY))
        .and(query_param("f", "geojson"))
        .and(query_param("where", where_clause))
        .respond_with(ResponseTemplate::new(200).set_body_json(geojson(ids)))
        .expect(times)
        .mount(server)
        .await;
}

fn geojson(ids: &[i64]) -> Value {
    let features: Vec<Value> = ids
        .iter()
        .map(|id| {
            json!({
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [-74.0, 40.2]},
                "properties": {"OBJECTID": id, "NAME": format!("feature {id}")}
            })
        })
        .collect();
    json!({"type": "FeatureCollection", "features": features})
}

fn object_ids(collection: &FeatureCollection) -> Vec<i64> {
    collection
        .features
        .iter()
        .map(|f| f.attribute("OBJECTID").and_then(Value::as_i64).unwrap())
        .collect()
}

#[tokio::test]
async fn fetches_every_id_across_chunks_without_gaps_or_duplicates() {
    let server = MockServer::start().await;
    mount_metadata(&server, 3, 1).await;
    mount_id_query(
        &server,
        json!({"objectIdFieldName": "OBJECTID", "objectIds": [12, 1, 9, 2, 5, 8, 3]}),
        1,
    )
    .await;
    // Ids sort to [1,2,3,5,8,9,12]; windows of 3 list entries each.
    let predicate = "MUN_CODE='1507'";
    mount_chunk(
        &server,
        "(OBJECTID BETWEEN 1 AND 3) AND (MUN_CODE='1507')",
        &[1, 2, 3],
        1,
    )
    .await;
    mount_chunk(
        &server,
        "(OBJECTID BETWEEN 5 AND 9) AND (MUN_CODE='1507')",
        &[5, 8, 9],
        1,
    )
    .await;
    mount_chunk(
        &server,
        "(OBJECTID BETWEEN 12 AND 12) AND (MUN_CODE='1507')",
        &[12],
        1,
    )
    .await;

    let client = FeatureClient::new();
    let outcome = client
        .fetch(&endpoint(&server), &QuerySpec::with_predicate(predicate))
        .await
        .unwrap();

    assert_eq!(object_ids(&outcome.collection), vec![1, 2, 3, 5, 8, 9, 12]);
    assert_eq!(outcome.stats.matched_ids, 7);
    assert_eq!(outcome.stats.chunk_requests, 3);
    assert_eq!(outcome.stats.empty_chunks, 0);
    // Fresh contiguous index after merging.
    let indexes: Vec<u64> = outcome
        .collection
        .features
        .iter()
        .map(|f| f.id.as_ref().and_then(Value::as_u64).unwrap())
        .collect();
    assert_eq!(indexes, (0..7).collect::<Vec<u64>>());
}

#[tokio::test]
async fn zero_matches_yield_an_empty_collection_and_no_chunk_requests() {
    let server = MockServer::start().await;
    mount_metadata(&server, 1000, 1).await;
    mount_id_query(
        &server,
        json!({"objectIdFieldName": "OBJECTID", "objectIds": []}),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path(QUERY))
        .and(query_param("f", "geojson"))
        .respond_with(ResponseTemplate::new(200).set_body_json(geojson(&[])))
        .expect(0)
        .mount(&server)
        .await;

    let client = FeatureClient::new();
    let outcome = client
        .fetch(&endpoint(&server), &QuerySpec::match_all())
        .await
        .unwrap();

    assert!(outcome.collection.is_empty());
    assert_eq!(outcome.stats.chunk_requests, 0);
}

#[tokio::test]
async fn record_cap_of_one_issues_one_request_per_id() {
    let server = MockServer::start().await;
    mount_metadata(&server, 1, 1).await;
    mount_id_query(
        &server,
        json!({"objectIdFieldName": "OBJECTID", "objectIds": [1, 2, 3, 4, 5]}),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path(QUERY))
        .and(query_param("f", "geojson"))
        .respond_with(ResponseTemplate::new(200).set_body_json(geojson(&[1])))
        .expect(5)
        .mount(&server)
        .await;

    let client = FeatureClient::new();
    let outcome = client
        .fetch(&endpoint(&server), &QuerySpec::match_all())
        .await
        .unwrap();

    assert_eq!(outcome.stats.chunk_requests, 5);
    assert_eq!(outcome.collection.len(), 5);
}

#[tokio::test]
async fn metadata_failure_is_endpoint_unavailable_and_stops_the_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(LAYER))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(QUERY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let client = FeatureClient::new();
    let err = client
        .fetch_all_features(&endpoint(&server), "1=1")
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::EndpointUnavailable { .. }), "{err}");
}

#[tokio::test]
async fn metadata_without_a_numeric_record_cap_is_endpoint_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(LAYER))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"maxRecordCount": "plenty", "type": "Feature Layer"})),
        )
        .mount(&server)
        .await;

    let client = FeatureClient::new();
    let err = client
        .fetch_all_features(&endpoint(&server), "1=1")
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::EndpointUnavailable { .. }), "{err}");
}

#[tokio::test]
async fn missing_object_ids_is_a_malformed_response() {
    let server = MockServer::start().await;
    mount_metadata(&server, 100, 1).await;
    mount_id_query(&server, json!({"objectIdFieldName": "OBJECTID"}), 1).await;

    let client = FeatureClient::new();
    let err = client
        .fetch_all_features(&endpoint(&server), "1=1")
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::MalformedResponse { .. }), "{err}");
}

#[tokio::test]
async fn null_object_ids_count_as_zero_matches() {
    let server = MockServer::start().await;
    mount_metadata(&server, 100, 1).await;
    mount_id_query(
        &server,
        json!({"objectIdFieldName": "OBJECTID", "objectIds": null}),
        1,
    )
    .await;

    let client = FeatureClient::new();
    let collection = client
        .fetch_all_features(&endpoint(&server), "1=1")
        .await
        .unwrap();

    assert!(collection.is_empty());
}

#[tokio::test]
async fn service_error_body_is_a_predicate_rejection() {
    let server = MockServer::start().await;
    mount_metadata(&server, 100, 1).await;
    mount_id_query(
        &server,
        json!({"error": {"code": 400, "message": "Invalid where clause", "details": []}}),
        1,
    )
    .await;

    let client = FeatureClient::new();
    let err = client
        .fetch_all_features(&endpoint(&server), "NOT A PREDICATE")
        .await
        .unwrap_err();

    match err {
        FetchError::PredicateRejected {
            predicate, message, ..
        } => {
            assert_eq!(predicate, "NOT A PREDICATE");
            assert!(message.contains("Invalid where clause"), "{message}");
        }
        other => panic!("expected PredicateRejected, got {other}"),
    }
}

#[tokio::test]
async fn repeated_fetches_return_identical_collections() {
    let server = MockServer::start().await;
    mount_metadata(&server, 2, 2).await;
    mount_id_query(
        &server,
        json!({"objectIdFieldName": "OBJECTID", "objectIds": [4, 1, 3]}),
        2,
    )
    .await;
    mount_chunk(&server, "(OBJECTID BETWEEN 1 AND 3) AND (1=1)", &[1, 3], 2).await;
    mount_chunk(&server, "(OBJECTID BETWEEN 4 AND 4) AND (1=1)", &[4], 2).await;

    let client = FeatureClient::new();
    let ep = endpoint(&server);
    let first = client.fetch_all_features(&ep, "1=1").await.unwrap();
    let second = client.fetch_all_features(&ep, "1=1").await.unwrap();

    assert_eq!(object_ids(&first), vec![1, 3, 4]);
    assert_eq!(first, second);
}

#[tokio::test]
async fn geometry_filter_rides_the_id_query_and_every_chunk_query() {
    let server = MockServer::start().await;
    mount_metadata(&server, 10, 1).await;
    Mock::given(method("GET"))
        .and(path(QUERY))
        .and(query_param("returnIdsOnly", "true"))
        .and(query_param("spatialRel", "esriSpatialRelIntersects"))
        .and(query_param("geometryType", "esriGeometryPolygon"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"objectIdFieldName": "OBJECTID", "objectIds": [7, 8]})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(QUERY))
        .and(query_param("f", "geojson"))
        .and(query_param("spatialRel", "esriSpatialRelIntersects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(geojson(&[7, 8])))
        .expect(1)
        .mount(&server)
        .await;

    let boundary = json!({"rings": [[[-74.1, 40.1], [-74.0, 40.1], [-74.0, 40.2], [-74.1, 40.1]]]});
    let spec = QuerySpec::match_all()
        .geometry_filter(GeometryFilter::intersects_polygon(boundary))
        .out_sr(4326);

    let client = FeatureClient::new();
    let outcome = client.fetch(&endpoint(&server), &spec).await.unwrap();

    assert_eq!(object_ids(&outcome.collection), vec![7, 8]);
}

#[tokio::test]
async fn empty_chunks_are_counted_not_fatal() {
    let server = MockServer::start().await;
    mount_metadata(&server, 2, 1).await;
    mount_id_query(
        &server,
        json!({"objectIdFieldName": "OBJECTID", "objectIds": [1, 2, 3]}),
        1,
    )
    .await;
    // Ids 1 and 2 vanished between the id query and the chunk query.
    mount_chunk(&server, "(OBJECTID BETWEEN 1 AND 2) AND (1=1)", &[], 1).await;
    mount_chunk(&server, "(OBJECTID BETWEEN 3 AND 3) AND (1=1)", &[3], 1).await;

    let client = FeatureClient::new();
    let outcome = client
        .fetch(&endpoint(&server), &QuerySpec::match_all())
        .await
        .unwrap();

    assert_eq!(object_ids(&outcome.collection), vec![3]);
    assert_eq!(outcome.stats.chunk_requests, 2);
    assert_eq!(outcome.stats.empty_chunks, 1);
}
