//! Catalog command for Summit.
//!
//! Read-only lookups against the goal template graph.

use serde::Serialize;

use crate::catalog::{GoalTemplate, TemplateGraph};
use crate::error::Result;

/// Catalog lookup to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogAction {
    /// Direct children of a template.
    Children(String),
    /// Direct parents of a template.
    Parents(String),
    /// A single template with its edges.
    Show(String),
}

impl CatalogAction {
    fn id(&self) -> &str {
        match self {
            Self::Children(id) | Self::Parents(id) | Self::Show(id) => id,
        }
    }
}

/// Options for the catalog command.
#[derive(Debug, Clone, Default)]
pub struct CatalogOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the catalog command.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogOutput {
    /// Whether the lookup succeeded.
    pub success: bool,
    /// Template id looked up.
    pub id: String,
    /// The template itself (`show`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<GoalTemplate>,
    /// Parent ids (`show`).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
    /// Child ids (`show`).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
    /// Related templates (`children`, `parents`).
    pub templates: Vec<GoalTemplate>,
    /// Error message if the lookup failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CatalogOutput {
    fn empty(id: &str) -> Self {
        Self {
            success: true,
            id: id.to_string(),
            template: None,
            parents: Vec::new(),
            children: Vec::new(),
            templates: Vec::new(),
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(id: &str, error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::empty(id)
        }
    }
}

fn ids(templates: &[&GoalTemplate]) -> Vec<String> {
    templates.iter().map(|t| t.id.clone()).collect()
}

/// The catalog command implementation.
pub struct CatalogCommand {
    graph: TemplateGraph,
}

impl CatalogCommand {
    /// Create a new catalog command over a loaded graph.
    pub fn new(graph: TemplateGraph) -> Self {
        Self { graph }
    }

    /// Run the catalog command.
    pub fn run(&self, action: &CatalogAction) -> CatalogOutput {
        match self.lookup(action) {
            Ok(output) => output,
            Err(e) => CatalogOutput::failure(action.id(), e.to_string()),
        }
    }

    fn lookup(&self, action: &CatalogAction) -> Result<CatalogOutput> {
        let mut output = CatalogOutput::empty(action.id());
        match action {
            CatalogAction::Children(id) => {
                output.templates = self.graph.get_children(id)?.into_iter().cloned().collect();
            }
            CatalogAction::Parents(id) => {
                output.templates = self.graph.get_parents(id)?.into_iter().cloned().collect();
            }
            CatalogAction::Show(id) => {
                output.template = Some(self.graph.get(id)?.clone());
                output.parents = ids(&self.graph.get_parents(id)?);
                output.children = ids(&self.graph.get_children(id)?);
            }
        }
        Ok(output)
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &CatalogOutput, options: &CatalogOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    fn format_human_readable(&self, output: &CatalogOutput) -> String {
        if !output.success {
            return format!(
                "Catalog lookup failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        let mut lines = Vec::new();
        match &output.template {
            Some(template) => {
                lines.push(format!("[{}] {} - {}", template.level, template.id, template.title));
                if let Some(category) = template.display_category {
                    lines.push(format!("  category: {}", category.display_name()));
                }
                if let Some(kind) = template.template_type {
                    lines.push(format!("  type: {}", kind.as_str()));
                }
                if !output.parents.is_empty() {
                    lines.push(format!("  parents: {}", output.parents.join(", ")));
                }
                if !output.children.is_empty() {
                    lines.push(format!("  children: {}", output.children.join(", ")));
                }
            }
            None if output.templates.is_empty() => {
                lines.push(format!("No related templates for {}.", output.id));
            }
            None => {
                for template in &output.templates {
                    lines.push(format!("[{}] {} - {}", template.level, template.id, template.title));
                }
            }
        }
        lines.join("\n") + "\n"
    }
}
