use serde_json::Value;

/// The universal predicate: matches every feature.
pub const MATCH_ALL: &str = "1=1";

/// Server-side spatial filter, passed through to the `geometry`,
/// `geometryType` and `spatialRel` query parameters on every request of a
/// fetch (id query and chunk queries alike).
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryFilter {
    /// ESRI JSON geometry, sent verbatim.
    pub geometry: Value,
    pub geometry_type: String,
    pub spatial_rel: String,
}

impl GeometryFilter {
    /// Filter to features intersecting the given polygon.
    pub fn intersects_polygon(geometry: Value) -> Self {
        Self {
            geometry,
            geometry_type: "esriGeometryPolygon".to_string(),
            spatial_rel: "esriSpatialRelIntersects".to_string(),
        }
    }
}

/// What to ask a feature service for: a predicate, an optional spatial
/// filter, and the output shape of the returned features.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    /// Boolean filter expression in the service's predicate syntax, opaque
    /// to the fetcher except for being ANDed with the synthesized id-range
    /// clause.
    pub predicate: String,
    pub geometry: Option<GeometryFilter>,
    /// Output-field selector, `*` for all attributes.
    pub out_fields: String,
    /// Output spatial reference (EPSG code), service default when `None`.
    pub out_sr: Option<u32>,
}

impl QuerySpec {
    pub fn with_predicate(predicate: impl Into<String>) -> Self {
        Self {
            predicate: predicate.into(),
            geometry: None,
            out_fields: "*".to_string(),
            out_sr: None,
        }
    }

    /// Select all features.
    pub fn match_all() -> Self {
        Self::with_predicate(MATCH_ALL)
    }

    pub fn geometry_filter(mut self, filter: GeometryFilter) -> Self {
        self.geometry = Some(filter);
        self
    }

    pub fn out_fields(mut self, fields: impl Into<String>) -> Self {
        self.out_fields = fields.into();
        self
    }

    pub fn out_sr(mut self, epsg: u32) -> Self {
        self.out_sr = Some(epsg);
        self
    }

    /// Append the spatial-filter parameters, when present.
    pub(crate) fn push_geometry_params(&self, params: &mut Vec<(&'static str, String)>) {
        if let Some(filter) = &self.geometry {
            params.push(("geometry", filter.geometry.to_string()));
            params.push(("geometryType", filter.geometry_type.clone()));
            params.push(("spatialRel", filter.spatial_rel.clone()));
        }
    }
}
