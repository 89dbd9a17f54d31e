use anyhow::{bail, Context, Result};
use munigis_client::{FeatureClient, FeatureServiceEndpoint, FetchOutcome};
use munigis_layers::{LayerCatalog, LayerDef, LayerKind};
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;

use crate::oplog::OperationsLog;
use crate::output;

pub struct RunConfig {
    pub municipality_code: String,
    pub project_name: String,
    pub output_dir: PathBuf,
    /// Empty selects every catalog layer.
    pub layers: Vec<LayerKind>,
    pub config_file: Option<PathBuf>,
    pub timeout: Duration,
}

/// Download the selected layers for one municipality, strictly one request
/// at a time, and write them under the output directory.
pub async fn run(config: RunConfig) -> Result<()> {
    let catalog = match &config.config_file {
        Some(path) => LayerCatalog::from_config_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => LayerCatalog::builtin(),
    };
    let selected: Vec<LayerKind> = if config.layers.is_empty() {
        LayerKind::ALL.to_vec()
    } else {
        config.layers.clone()
    };

    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("creating {}", config.output_dir.display()))?;
    let mut oplog = OperationsLog::create(&config.output_dir, &config.project_name)?;

    // The fetcher enforces no timeout of its own; it comes in with the
    // transport, and a timeout fails the layer as unavailable.
    let http = reqwest::Client::builder()
        .timeout(config.timeout)
        .build()
        .context("building HTTP client")?;
    let client = FeatureClient::with_http(http);

    // Spatial layers filter against the municipality boundary, so that
    // layer comes first whenever anything needs it.
    let needs_boundary = catalog
        .iter()
        .any(|def| selected.contains(&def.kind) && def.requires_boundary());
    let mut boundary: Option<Value> = None;

    if needs_boundary || selected.contains(&LayerKind::Municipality) {
        let muni = catalog
            .get(LayerKind::Municipality)
            .context("catalog has no municipality layer")?;
        let outcome = fetch_layer(&client, muni, &config.municipality_code, None).await?;
        if outcome.collection.is_empty() {
            bail!(
                "no municipality found for code {}",
                config.municipality_code
            );
        }
        if selected.contains(&LayerKind::Municipality) {
            output::write_layer(&config.output_dir, LayerKind::Municipality, &outcome.collection)?;
            oplog.record(LayerKind::Municipality, &muni.url, &outcome.stats)?;
        }
        if needs_boundary {
            let geometry = outcome.collection.features[0]
                .geometry
                .clone()
                .context("municipality boundary feature has no geometry")?;
            boundary = Some(geometry);
        }
    }

    for def in catalog.iter() {
        if def.kind == LayerKind::Municipality {
            continue;
        }
        if !selected.contains(&def.kind) {
            oplog.skipped(def.kind, "not selected")?;
            continue;
        }
        let outcome = fetch_layer(&client, def, &config.municipality_code, boundary.as_ref())
            .await
            .with_context(|| format!("downloading layer {}", def.kind))?;
        output::write_layer(&config.output_dir, def.kind, &outcome.collection)?;
        oplog.record(def.kind, &def.url, &outcome.stats)?;
    }

    let log_path = oplog.finish()?;
    log::info!("run log written to {}", log_path.display());
    Ok(())
}

async fn fetch_layer(
    client: &FeatureClient,
    def: &LayerDef,
    municipality_code: &str,
    boundary: Option<&Value>,
) -> Result<FetchOutcome> {
    let endpoint = FeatureServiceEndpoint::new(&def.url)?;
    let spec = def.query_spec(municipality_code, boundary)?;
    log::info!("{}: querying {endpoint}", def.kind);
    let outcome = client.fetch(&endpoint, &spec).await?;
    log::info!(
        "{}: {} features in {} requests",
        def.kind,
        outcome.collection.len(),
        outcome.stats.chunk_requests
    );
    Ok(outcome)
}
