//! Ladder command for Summit.
//!
//! Generates the milestone rungs for a start value, target, and curve.

use serde::Serialize;

use crate::error::Result;
use crate::ladder::{generate_ladder, CurveShape, Granularity, MilestoneLadderConfig, RungCount};

/// Options for the ladder command.
#[derive(Debug, Clone)]
pub struct LadderOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Starting value.
    pub start: f64,
    /// Final target.
    pub target: f64,
    /// Curve name (linear, ease-in, ease-out, ease-in-out).
    pub curve: String,
    /// Explicit rung count.
    pub rungs: Option<u32>,
    /// Schedule length in weeks, used with `weeks_per_rung`.
    pub weeks: Option<u32>,
    /// Weeks between rungs.
    pub weeks_per_rung: Option<u32>,
    /// Round rungs to multiples of this step instead of integers.
    pub step: Option<f64>,
}

impl Default for LadderOptions {
    fn default() -> Self {
        Self {
            json: false,
            quiet: false,
            start: 0.0,
            target: 0.0,
            curve: "linear".to_string(),
            rungs: None,
            weeks: None,
            weeks_per_rung: None,
            step: None,
        }
    }
}

impl LadderOptions {
    /// Build the engine config from command-line values.
    pub fn to_config(&self) -> Result<MilestoneLadderConfig> {
        let curve: CurveShape = self.curve.parse()?;
        let rungs = match (self.rungs, self.weeks, self.weeks_per_rung) {
            (Some(n), _, _) => RungCount::Explicit(n),
            (None, Some(weeks), per) => RungCount::Duration {
                weeks,
                weeks_per_rung: per.unwrap_or(1),
            },
            (None, None, _) => RungCount::default(),
        };
        let granularity = match self.step {
            Some(step) => Granularity::Step(step),
            None => Granularity::Integer,
        };
        Ok(MilestoneLadderConfig::new(self.start, self.target, curve, rungs)
            .with_granularity(granularity))
    }
}

/// Output format for the ladder command.
#[derive(Debug, Clone, Serialize)]
pub struct LadderOutput {
    /// Whether the ladder was generated.
    pub success: bool,
    /// Curve used.
    pub curve: String,
    /// Generated rungs.
    pub rungs: Vec<f64>,
    /// Error message if generation failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LadderOutput {
    /// Create a successful output.
    pub fn success(curve: &CurveShape, rungs: Vec<f64>) -> Self {
        Self {
            success: true,
            curve: curve.name().to_string(),
            rungs,
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            curve: String::new(),
            rungs: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// The ladder command implementation.
#[derive(Debug, Default)]
pub struct LadderCommand;

impl LadderCommand {
    /// Create a new ladder command.
    pub fn new() -> Self {
        Self
    }

    /// Run the ladder command.
    pub fn run(&self, options: &LadderOptions) -> LadderOutput {
        let config = match options.to_config() {
            Ok(config) => config,
            Err(e) => return LadderOutput::failure(e.to_string()),
        };

        match generate_ladder(&config) {
            Ok(rungs) => LadderOutput::success(&config.curve, rungs),
            Err(e) => LadderOutput::failure(e.to_string()),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &LadderOutput, options: &LadderOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    fn format_human_readable(&self, output: &LadderOutput) -> String {
        if !output.success {
            return format!(
                "Ladder failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        let mut lines = vec![format!(
            "{} rung(s), {} curve:",
            output.rungs.len(),
            output.curve
        )];
        for (i, rung) in output.rungs.iter().enumerate() {
            lines.push(format!("  {:>2}. {}", i + 1, rung));
        }
        lines.join("\n") + "\n"
    }
}
