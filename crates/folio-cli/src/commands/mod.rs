//! Subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod inspect;
pub mod parse;

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use folio_core::Line;
use folio_core::models::config::{FolioConfig, PdfConfig};

pub use folio_core::is_supported;

/// Per-user configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("folio")
        .join("config.json")
}

/// Configuration from `--config`, else the per-user file, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<FolioConfig> {
    if let Some(path) = config_path {
        return FolioConfig::from_file(Path::new(path))
            .with_context(|| format!("Failed to read config {}", path));
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using config at {}", default_path.display());
        return FolioConfig::from_file(&default_path)
            .with_context(|| format!("Failed to read config {}", default_path.display()));
    }

    Ok(FolioConfig::default())
}

/// Reconstructed lines of a statement file, read on a blocking thread.
pub async fn read_lines(path: &Path, pdf: &PdfConfig) -> anyhow::Result<Vec<Line>> {
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }

    let owned = path.to_path_buf();
    let pdf = pdf.clone();
    let lines = tokio::task::spawn_blocking(move || folio_core::read_lines(&owned, &pdf))
        .await?
        .with_context(|| format!("Failed to read {}", path.display()))?;

    debug!("{}: {} lines", path.display(), lines.len());
    Ok(lines)
}
