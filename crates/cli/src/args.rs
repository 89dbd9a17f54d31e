use clap::Parser;
use munigis_layers::LayerKind;
use std::path::PathBuf;
use std::time::Duration;

use crate::run::RunConfig;

/// Download municipal GIS layers from public ArcGIS feature services.
#[derive(Parser, Debug)]
#[command(name = "munigis", version, about)]
pub struct Args {
    /// Municipality code, e.g. 1507
    pub municipality_code: String,

    /// Project name, used in the run log filename
    #[arg(long, default_value = "munigis")]
    pub project: String,

    /// Output directory; per-layer subfolders are created inside
    #[arg(short, long, default_value = "output")]
    pub output: PathBuf,

    /// Comma-separated layers to download (default: all).
    /// One of: municipality, county, parcels, roads, wetlands,
    /// neighboring_municipalities, waterbodies
    #[arg(long, value_delimiter = ',')]
    pub layers: Vec<LayerKind>,

    /// TOML file overriding layer endpoint URLs
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// HTTP timeout in seconds; a timeout fails the layer as unavailable
    #[arg(long, default_value_t = 60)]
    pub timeout_secs: u64,

    /// Increase log verbosity (-v: debug, -vv: trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn into_config(self) -> RunConfig {
        RunConfig {
            municipality_code: self.municipality_code,
            project_name: self.project,
            output_dir: self.output,
            layers: self.layers,
            config_file: self.config,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}
