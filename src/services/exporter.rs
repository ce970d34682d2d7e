use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use crate::models::estimate::{EstimationResult, CSV_HEADERS};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("nothing to export: no successful estimate is displayed")]
    NotExportable,
    #[error("export destination must be a relative path inside the export directory: {0}")]
    InvalidDestination(String),
    #[error("cannot write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Single-row CSV: one header line, one value line. Values are numbers or
/// plain text, so no quoting.
pub fn render_csv(result: &EstimationResult) -> String {
    format!("{}\n{}\n", CSV_HEADERS.join(","), result.values().join(","))
}

/// Places a requested file name under `export_dir`.
///
/// Only plain relative names are accepted: no root, no drive prefix, no `..`.
pub fn resolve_destination(export_dir: &Path, requested: &str) -> Result<PathBuf, ExportError> {
    let requested_path = Path::new(requested.trim());
    let plain = requested_path
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if !plain || requested_path.file_name().is_none() {
        return Err(ExportError::InvalidDestination(requested.to_string()));
    }
    Ok(export_dir.join(requested_path))
}

/// Writes `result` to `path`, replacing any existing file and creating missing
/// parent directories. Returns the byte count.
pub fn export_csv(result: &EstimationResult, path: &Path) -> Result<usize, ExportError> {
    let io_err = |source| ExportError::Io {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let csv = render_csv(result);
    std::fs::write(path, &csv).map_err(io_err)?;
    Ok(csv.len())
}
