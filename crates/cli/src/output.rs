use anyhow::{Context, Result};
use munigis_client::FeatureCollection;
use munigis_layers::LayerKind;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Write a merged collection as `<layer>/<layer>.geojson` under the output
/// directory. The file lands via a temp file renamed into place, so an
/// interrupted run never leaves a half-written layer behind.
pub fn write_layer(
    output_dir: &Path,
    kind: LayerKind,
    collection: &FeatureCollection,
) -> Result<PathBuf> {
    let folder = output_dir.join(kind.name());
    fs::create_dir_all(&folder)
        .with_context(|| format!("creating layer folder {}", folder.display()))?;

    let path = folder.join(format!("{}.geojson", kind.name()));
    let tmp = folder.join(format!("{}.geojson.tmp", kind.name()));

    let written = write_to(&tmp, collection).and_then(|()| {
        fs::rename(&tmp, &path)
            .with_context(|| format!("moving {} into place", path.display()))
    });
    if written.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    written?;

    log::info!("{kind}: wrote {} features to {}", collection.len(), path.display());
    Ok(path)
}

fn write_to(path: &Path, collection: &FeatureCollection) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, collection)
        .with_context(|| format!("serializing {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("flushing {}", path.display()))?;
    Ok(())
}
