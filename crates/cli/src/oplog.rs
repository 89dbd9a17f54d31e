use anyhow::{Context, Result};
use chrono::Local;
use munigis_client::FetchStats;
use munigis_layers::LayerKind;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Plain-text run log written into the output folder: project name, data
/// sources, per-layer counts, completion time.
pub struct OperationsLog {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl OperationsLog {
    pub fn create(output_dir: &Path, project_name: &str) -> Result<Self> {
        let path = output_dir.join(format!("operations_log_{project_name}.txt"));
        let file =
            File::create(&path).with_context(|| format!("creating run log {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "Operations Log - {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(writer, "Project: {project_name}")?;
        writeln!(writer, "Output Folder: {}", output_dir.display())?;
        writeln!(writer)?;
        writeln!(writer, "Data Sources:")?;
        Ok(Self { writer, path })
    }

    /// One line per downloaded layer.
    pub fn record(&mut self, kind: LayerKind, url: &str, stats: &FetchStats) -> Result<()> {
        writeln!(
            self.writer,
            "{kind}: {url} ({} features in {} requests, {} empty chunks)",
            stats.matched_ids, stats.chunk_requests, stats.empty_chunks
        )?;
        Ok(())
    }

    pub fn skipped(&mut self, kind: LayerKind, reason: &str) -> Result<()> {
        writeln!(self.writer, "{kind}: skipped ({reason})")?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<PathBuf> {
        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "Completed at {}",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        )?;
        self.writer.flush()?;
        Ok(self.path)
    }
}
