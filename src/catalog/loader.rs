//! Catalog loading from TOML.
//!
//! The catalog is a flat `[[templates]]` table. A built-in catalog is
//! embedded in the binary; a custom file can replace it via config.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::{TemplateGraph, TemplateRecord};
use crate::error::{Result, SummitError};

/// Embedded default catalog.
pub const BUILTIN_CATALOG: &str = include_str!("builtin.toml");

/// On-disk catalog layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogFile {
    /// Flat template table.
    #[serde(default)]
    pub templates: Vec<TemplateRecord>,
}

/// Parse and validate a catalog from TOML text.
pub fn load_catalog_str(content: &str) -> Result<TemplateGraph> {
    let file: CatalogFile = toml::from_str(content)
        .map_err(|e| SummitError::config(format!("failed to parse catalog: {}", e)))?;
    TemplateGraph::from_records(file.templates)
}

/// Load and validate a catalog file.
pub fn load_catalog_file(path: &Path) -> Result<TemplateGraph> {
    let content = fs::read_to_string(path).map_err(|e| SummitError::storage(path, e))?;
    load_catalog_str(&content)
}

/// Load the embedded catalog.
pub fn builtin_catalog() -> Result<TemplateGraph> {
    load_catalog_str(BUILTIN_CATALOG)
}

/// Load the catalog at `path`, or the built-in one when `path` is `None`.
pub fn load_catalog(path: Option<&Path>) -> Result<TemplateGraph> {
    match path {
        Some(path) => load_catalog_file(path),
        None => builtin_catalog(),
    }
}
