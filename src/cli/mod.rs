//! CLI commands for Summit.
//!
//! Each command follows the same shape: build it from config, `run` it to
//! get a serializable output, then `format_output` as JSON, human-readable
//! text, or nothing.
//! - **Engine commands**: ladder, classify, badge, diagnose
//! - **Lookup commands**: catalog

pub mod badge;
pub mod catalog;
pub mod classify;
pub mod diagnose;
pub mod ladder;

pub use badge::BadgeCommand;
pub use catalog::{CatalogAction, CatalogCommand};
pub use classify::ClassifyCommand;
pub use diagnose::DiagnoseCommand;
pub use ladder::LadderCommand;

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::{Result, SummitError};

/// Read a JSON input file, or stdin when `path` is `-`.
pub fn read_json_input<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| SummitError::storage("<stdin>", e))?;
        buf
    } else {
        fs::read_to_string(path).map_err(|e| SummitError::storage(path, e))?
    };
    serde_json::from_str(&content)
        .map_err(|e| SummitError::serde(format!("{}: {}", path.display(), e)))
}
