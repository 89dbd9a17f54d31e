//! # Munigis CLI
//!
//! The `munigis` binary: downloads the municipal GIS layers for one
//! municipality code into per-layer subfolders, writing a plain-text run
//! log next to them.
//!
//! ```text
//! munigis 1507 --project SW-1042 --output ./sw-1042 --layers roads,wetlands
//! ```

mod args;
mod oplog;
mod output;
mod run;

pub use run::{run, RunConfig};

use anyhow::Result;
use clap::Parser;

pub async fn main_entry() -> Result<()> {
    let args = args::Args::parse();
    init_logging(args.verbose);
    run::run(args.into_config()).await
}

fn init_logging(verbosity: u8) {
    let default = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}
