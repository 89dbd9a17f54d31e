//! # Munigis Client
//!
//! Paginated feature retrieval from ArcGIS REST feature services.
//!
//! Feature services cap how many records one query may return. This crate
//! fetches complete result sets anyway:
//!
//! ```text
//! Endpoint
//!     │
//!     ├──> Metadata (?f=json)
//!     │      └─> maxRecordCount
//!     │
//!     ├──> Id-only query (where + returnIdsOnly)
//!     │      └─> sorted object ids
//!     │
//!     └──> One query per id window of maxRecordCount ids
//!            └─> merged FeatureCollection
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use munigis_client::{FeatureClient, FeatureServiceEndpoint};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let endpoint = FeatureServiceEndpoint::new(
//!         "https://maps.nj.gov/arcgis/rest/services/Framework/Transportation/MapServer/14",
//!     )?;
//!     let client = FeatureClient::new();
//!     let roads = client
//!         .fetch_all_features(&endpoint, "COUNTY_L='882270'")
//!         .await?;
//!     println!("{} road segments", roads.len());
//!     Ok(())
//! }
//! ```

mod endpoint;
mod error;
mod fetcher;
mod model;
mod query;

pub use endpoint::FeatureServiceEndpoint;
pub use error::{FetchError, Result};
pub use fetcher::FeatureClient;
pub use model::{Feature, FeatureCollection, FetchOutcome, FetchStats};
pub use query::{GeometryFilter, QuerySpec, MATCH_ALL};
