//! Diagnose command for Summit.
//!
//! Scores three domain terms for a phase and tags each for display.

use serde::Serialize;

use crate::config::Config;
use crate::diagnostic::{
    compute_diagnostic, DiagnosticScore, DiagnosticTerms, TermKind, TermScore,
};
use crate::phase::GoalPhase;

/// Options for the diagnose command.
#[derive(Debug, Clone, Default)]
pub struct DiagnoseOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the diagnose command.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnoseOutput {
    /// Whether scoring succeeded.
    pub success: bool,
    /// Phase the terms were weighted for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<GoalPhase>,
    /// Product of the three terms.
    pub composite: f64,
    /// Classified terms in display order.
    pub terms: Vec<TermScore>,
    /// Terms tagged as bottlenecks.
    pub bottlenecks: Vec<TermKind>,
    /// Term the phase weights most heavily.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_focus: Option<TermKind>,
    /// Error message if scoring failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DiagnoseOutput {
    /// Create a successful output.
    pub fn success(score: &DiagnosticScore) -> Self {
        Self {
            success: true,
            phase: Some(score.phase),
            composite: score.composite,
            terms: score.terms().into_iter().copied().collect(),
            bottlenecks: score.bottlenecks(),
            primary_focus: Some(score.primary_focus()),
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            phase: None,
            composite: 0.0,
            terms: Vec::new(),
            bottlenecks: Vec::new(),
            primary_focus: None,
            error: Some(error.into()),
        }
    }
}

/// The diagnose command implementation.
pub struct DiagnoseCommand {
    config: Config,
}

impl DiagnoseCommand {
    /// Create a new diagnose command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the diagnose command.
    pub fn run(&self, terms: &DiagnosticTerms, phase: GoalPhase) -> DiagnoseOutput {
        let result = compute_diagnostic(
            terms,
            phase,
            &self.config.diagnostic.weights,
            &self.config.diagnostic.thresholds,
        );
        match result {
            Ok(score) => DiagnoseOutput::success(&score),
            Err(e) => DiagnoseOutput::failure(e.to_string()),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &DiagnoseOutput, options: &DiagnoseOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    fn format_human_readable(&self, output: &DiagnoseOutput) -> String {
        if !output.success {
            return format!(
                "Diagnose failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        let mut lines = Vec::new();
        if let Some(phase) = output.phase {
            lines.push(format!("Phase: {}", phase));
        }
        lines.push(format!("Composite: {:.3}", output.composite));
        for term in &output.terms {
            lines.push(format!(
                "  {:<15} {:.2}  (weight {:.2})  {}",
                term.kind.as_str(),
                term.value,
                term.weight,
                term.status
            ));
        }
        if let Some(focus) = output.primary_focus {
            lines.push(format!("Focus: {}", focus));
        }
        if !output.bottlenecks.is_empty() {
            let names: Vec<&str> = output.bottlenecks.iter().map(|k| k.as_str()).collect();
            lines.push(format!("Bottlenecks: {}", names.join(", ")));
        }
        lines.join("\n") + "\n"
    }
}
