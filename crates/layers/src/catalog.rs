use crate::boundary::boundary_filter;
use crate::error::{CatalogError, Result};
use munigis_client::QuerySpec;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

/// The municipal layers this tool knows how to download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    County,
    Municipality,
    Parcels,
    Roads,
    Wetlands,
    NeighboringMunicipalities,
    Waterbodies,
}

impl LayerKind {
    pub const ALL: [LayerKind; 7] = [
        LayerKind::Municipality,
        LayerKind::County,
        LayerKind::Parcels,
        LayerKind::Roads,
        LayerKind::Wetlands,
        LayerKind::NeighboringMunicipalities,
        LayerKind::Waterbodies,
    ];

    /// Stable name, also used as the output subfolder.
    pub fn name(self) -> &'static str {
        match self {
            LayerKind::County => "county",
            LayerKind::Municipality => "municipality",
            LayerKind::Parcels => "parcels",
            LayerKind::Roads => "roads",
            LayerKind::Wetlands => "wetlands",
            LayerKind::NeighboringMunicipalities => "neighboring_municipalities",
            LayerKind::Waterbodies => "waterbodies",
        }
    }
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LayerKind {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        LayerKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| CatalogError::UnknownLayer(s.to_string()))
    }
}

/// How a layer narrows the service down to one municipality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerFilter {
    /// Attribute predicate `<field>='<municipality code>'`.
    Attribute { field: &'static str },
    /// Features intersecting the municipality boundary polygon.
    Boundary,
}

/// One downloadable layer: where it lives and how it is filtered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerDef {
    pub kind: LayerKind,
    pub url: String,
    pub filter: LayerFilter,
}

impl LayerDef {
    /// Whether this layer needs the municipality boundary geometry before it
    /// can be queried.
    pub fn requires_boundary(&self) -> bool {
        matches!(self.filter, LayerFilter::Boundary)
    }

    /// Build the query for one municipality. `boundary` is the municipality
    /// boundary GeoJSON geometry, required by spatially filtered layers.
    pub fn query_spec(&self, municipality_code: &str, boundary: Option<&Value>) -> Result<QuerySpec> {
        let spec = match &self.filter {
            LayerFilter::Attribute { field } => {
                QuerySpec::with_predicate(format!("{field}='{municipality_code}'"))
            }
            LayerFilter::Boundary => {
                let geometry = boundary.ok_or(CatalogError::MissingBoundary(self.kind))?;
                QuerySpec::match_all().geometry_filter(boundary_filter(geometry)?)
            }
        };
        Ok(spec.out_sr(4326))
    }
}

/// Overrides loaded from a TOML config file:
///
/// ```toml
/// [endpoints]
/// roads = "https://maps.example.gov/arcgis/rest/services/Roads/MapServer/3"
/// ```
#[derive(Debug, Default, Deserialize)]
struct CatalogConfig {
    #[serde(default)]
    endpoints: HashMap<LayerKind, String>,
}

/// The full set of layer definitions for a run.
#[derive(Debug, Clone)]
pub struct LayerCatalog {
    layers: Vec<LayerDef>,
}

impl LayerCatalog {
    /// The fixed public NJ endpoints this tool was built around.
    pub fn builtin() -> Self {
        let def = |kind, url: &str, filter| LayerDef {
            kind,
            url: url.to_string(),
            filter,
        };
        Self {
            layers: vec![
                def(
                    LayerKind::Municipality,
                    "https://services2.arcgis.com/XVOqAjTOJ5P6ngMu/arcgis/rest/services/NJ_Municipalities_3857/FeatureServer/0",
                    LayerFilter::Attribute { field: "MUN_CODE" },
                ),
                def(
                    LayerKind::County,
                    "https://maps.nj.gov/arcgis/rest/services/Framework/Government_Boundaries/MapServer/1",
                    LayerFilter::Boundary,
                ),
                def(
                    LayerKind::Parcels,
                    "https://services2.arcgis.com/XVOqAjTOJ5P6ngMu/arcgis/rest/services/Hosted_Parcels_Test_WebMer_20201016/FeatureServer/0",
                    LayerFilter::Attribute { field: "PCL_MUN" },
                ),
                def(
                    LayerKind::Roads,
                    "https://maps.nj.gov/arcgis/rest/services/Framework/Transportation/MapServer/14",
                    LayerFilter::Boundary,
                ),
                def(
                    LayerKind::Wetlands,
                    "https://mapsdep.nj.gov/arcgis/rest/services/Features/Land_lu/MapServer/2",
                    LayerFilter::Boundary,
                ),
                def(
                    LayerKind::NeighboringMunicipalities,
                    "https://services2.arcgis.com/XVOqAjTOJ5P6ngMu/arcgis/rest/services/NJ_Municipalities_3857/FeatureServer/0",
                    LayerFilter::Boundary,
                ),
                def(
                    LayerKind::Waterbodies,
                    "https://mapsdep.nj.gov/arcgis/rest/services/Features/Hydrography/MapServer/6",
                    LayerFilter::Boundary,
                ),
            ],
        }
    }

    /// Builtin catalog with endpoint URLs overridden from a TOML file.
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: CatalogConfig = toml::from_str(&raw)?;
        let mut catalog = Self::builtin();
        for layer in &mut catalog.layers {
            if let Some(url) = config.endpoints.get(&layer.kind) {
                log::info!("{}: endpoint overridden to {url}", layer.kind);
                layer.url = url.clone();
            }
        }
        Ok(catalog)
    }

    pub fn get(&self, kind: LayerKind) -> Option<&LayerDef> {
        self.layers.iter().find(|layer| layer.kind == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LayerDef> {
        self.layers.iter()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}
