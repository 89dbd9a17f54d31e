//! # Munigis Layers
//!
//! The catalog of municipal GIS layers: which feature service hosts each
//! layer and how it narrows down to one municipality. Attribute-filtered
//! layers (municipality, parcels) match on the municipality code; the rest
//! (county, roads, wetlands, neighboring municipalities, waterbodies) select
//! features intersecting the municipality boundary, so the boundary layer is
//! always fetched first.

mod boundary;
mod catalog;
mod error;

pub use boundary::boundary_filter;
pub use catalog::{LayerCatalog, LayerDef, LayerFilter, LayerKind};
pub use error::{CatalogError, Result};
