//! Load mode definitions from a directory of YAML files

use crate::catalog::{CatalogError, ModeCatalog};
use crate::models::ModeRecord;
use serde_yaml::Value;
use std::path::{Path, PathBuf};

/// `*.yaml` / `*.yml` files in `dir`, sorted by file name
pub fn mode_files(dir: &Path) -> Result<Vec<PathBuf>, CatalogError> {
    if !dir.is_dir() {
        return Err(CatalogError::ModesDirMissing(dir.to_path_buf()));
    }

    let entries = std::fs::read_dir(dir).map_err(|source| CatalogError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| CatalogError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext == "yaml" || ext == "yml")
            .unwrap_or(false);
        if is_yaml && path.is_file() {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Parse every mode record in `dir`, preserving file order and in-file order
pub fn load_mode_records(dir: &Path) -> Result<Vec<ModeRecord>, CatalogError> {
    let mut records = Vec::new();

    for path in mode_files(dir)? {
        let content = std::fs::read_to_string(&path).map_err(|source| CatalogError::Io {
            path: path.clone(),
            source,
        })?;
        let document: Value =
            serde_yaml::from_str(&content).map_err(|source| CatalogError::Parse {
                path: path.clone(),
                source,
            })?;

        let parse = |value: Value| {
            serde_yaml::from_value::<ModeRecord>(value).map_err(|source| CatalogError::Parse {
                path: path.clone(),
                source,
            })
        };

        match document {
            Value::Null => {
                tracing::warn!(path = %path.display(), "Skipping empty mode file");
            }
            Value::Mapping(_) => records.push(parse(document)?),
            Value::Sequence(items) => {
                for item in items {
                    records.push(parse(item)?);
                }
            }
            _ => return Err(CatalogError::InvalidFile { path: path.clone() }),
        }
    }

    Ok(records)
}

/// Load and validate the catalog from a modes directory
pub fn load_catalog(dir: &Path) -> Result<ModeCatalog, CatalogError> {
    let records = load_mode_records(dir)?;
    let catalog = ModeCatalog::from_records(records)?;
    tracing::debug!(
        modes_dir = %dir.display(),
        count = catalog.len(),
        "Mode catalog loaded"
    );
    Ok(catalog)
}
