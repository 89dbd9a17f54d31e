use crate::error::{CatalogError, Result};
use munigis_client::GeometryFilter;
use serde_json::{json, Value};

/// Convert a municipality boundary GeoJSON geometry (Polygon or
/// MultiPolygon, WGS84) into the ESRI intersects filter the query API
/// expects. ESRI polygons are a flat list of rings, so MultiPolygon parts
/// collapse into one ring list.
pub fn boundary_filter(geometry: &Value) -> Result<GeometryFilter> {
    let kind = geometry.get("type").and_then(Value::as_str);
    let coordinates = geometry.get("coordinates");
    let rings: Vec<Value> = match (kind, coordinates) {
        (Some("Polygon"), Some(Value::Array(rings))) => rings.clone(),
        (Some("MultiPolygon"), Some(Value::Array(polygons))) => polygons
            .iter()
            .filter_map(Value::as_array)
            .flatten()
            .cloned()
            .collect(),
        _ => return Err(CatalogError::UnusableBoundary),
    };
    if rings.is_empty() {
        return Err(CatalogError::UnusableBoundary);
    }
    Ok(GeometryFilter::intersects_polygon(json!({
        "rings": rings,
        "spatialReference": {"wkid": 4326}
    })))
}
