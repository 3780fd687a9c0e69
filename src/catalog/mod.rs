//! Goal template catalog.
//!
//! Static, read-only data describing the three-tier goal hierarchy
//! (L1 aspiration → L2 achievement → L3 trackable goal). The graph is
//! constructed explicitly and passed to the engines that need it.

pub mod graph;
pub mod loader;
pub mod template;

pub use graph::{TemplateGraph, TemplateRecord};
pub use loader::{
    builtin_catalog, load_catalog, load_catalog_file, load_catalog_str, CatalogFile,
    BUILTIN_CATALOG,
};
pub use template::{DisplayCategory, GoalLevel, GoalTemplate, TemplateType};
