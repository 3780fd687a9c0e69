//! Badge command for Summit.
//!
//! Computes an L2 badge either from explicit child progress or from the
//! user's goal instances looked up through the catalog.

use serde::{Deserialize, Serialize};

use crate::badge::{
    compute_badge, compute_badge_from_graph, BadgeStatus, BadgeTier, ChildProgress,
};
use crate::config::Config;
use crate::error::Result;
use crate::goal::GoalInstance;

/// Options for the badge command.
#[derive(Debug, Clone, Default)]
pub struct BadgeOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Input for the badge command (JSON file).
#[derive(Debug, Clone, Deserialize)]
pub struct BadgeInput {
    /// L2 template id.
    pub badge_id: String,
    /// Explicit child contributions.
    #[serde(default)]
    pub children: Vec<ChildProgress>,
    /// Goal instances; when present, children come from the catalog.
    #[serde(default)]
    pub instances: Option<Vec<GoalInstance>>,
}

/// Output format for the badge command.
#[derive(Debug, Clone, Serialize)]
pub struct BadgeOutput {
    /// Whether the badge was computed.
    pub success: bool,
    /// L2 template id.
    pub badge_id: String,
    /// Tier reached.
    pub tier: BadgeTier,
    /// Weighted aggregate progress.
    pub progress: f64,
    /// Whether any tier was reached.
    pub unlocked: bool,
    /// Error message if computation failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BadgeOutput {
    /// Create a successful output.
    pub fn success(status: BadgeStatus) -> Self {
        Self {
            success: true,
            badge_id: status.badge_id,
            tier: status.tier,
            progress: status.progress,
            unlocked: status.unlocked,
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(badge_id: &str, error: impl Into<String>) -> Self {
        Self {
            success: false,
            badge_id: badge_id.to_string(),
            tier: BadgeTier::None,
            progress: 0.0,
            unlocked: false,
            error: Some(error.into()),
        }
    }
}

/// The badge command implementation.
pub struct BadgeCommand {
    config: Config,
}

impl BadgeCommand {
    /// Create a new badge command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the badge command.
    pub fn run(&self, input: &BadgeInput, _options: &BadgeOptions) -> BadgeOutput {
        match self.compute(input) {
            Ok(status) => BadgeOutput::success(status),
            Err(e) => BadgeOutput::failure(&input.badge_id, e.to_string()),
        }
    }

    fn compute(&self, input: &BadgeInput) -> Result<BadgeStatus> {
        let thresholds = self.config.tiers.thresholds();
        let weighting = self.config.tiers.weighting();

        match &input.instances {
            Some(instances) => {
                let graph = self.config.load_catalog()?;
                compute_badge_from_graph(
                    &graph,
                    &input.badge_id,
                    instances,
                    &thresholds,
                    &weighting,
                )
            }
            None => compute_badge(&input.badge_id, &input.children, &thresholds, &weighting),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &BadgeOutput, options: &BadgeOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    fn format_human_readable(&self, output: &BadgeOutput) -> String {
        if !output.success {
            return format!(
                "Badge failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        let state = if output.unlocked { "unlocked" } else { "locked" };
        format!(
            "{}: {} ({:.1}% progress, {})\n",
            output.badge_id,
            output.tier,
            output.progress * 100.0,
            state
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::GoalPhase;

    fn child(id: &str, progress: f64, phase: GoalPhase) -> ChildProgress {
        ChildProgress::new(id, progress, phase)
    }

    fn explicit(children: Vec<ChildProgress>) -> BadgeInput {
        BadgeInput {
            badge_id: "endurance".to_string(),
            children,
            instances: None,
        }
    }

    #[test]
    fn test_explicit_children() {
        let cmd = BadgeCommand::new(Config::default());
        let output = cmd.run(
            &explicit(vec![
                child("a", 1.0, GoalPhase::Graduated),
                child("b", 1.0, GoalPhase::Graduated),
                child("c", 0.0, GoalPhase::Acquisition),
            ]),
            &BadgeOptions::default(),
        );
        assert!(output.success);
        assert!(output.progress < 0.67);
        assert_eq!(output.tier, BadgeTier::Silver);
    }

    #[test]
    fn test_config_weight_applies() {
        let mut config = Config::default();
        config.tiers.acquisition_weight = 0.2;
        let cmd = BadgeCommand::new(config);
        let output = cmd.run(
            &explicit(vec![child("a", 1.0, GoalPhase::Acquisition)]),
            &BadgeOptions::default(),
        );
        assert!((output.progress - 0.2).abs() < 1e-12);
        assert_eq!(output.tier, BadgeTier::None);
    }

    #[test]
    fn test_instances_use_builtin_catalog() {
        let cmd = BadgeCommand::new(Config::default());
        let input = BadgeInput {
            badge_id: "endurance".to_string(),
            children: Vec::new(),
            instances: Some(vec![GoalInstance::new("i1", "run-distance", 10.0, 10.0)
                .with_phase(GoalPhase::Graduated)]),
        };
        let output = cmd.run(&input, &BadgeOptions::default());
        assert!(output.success, "{:?}", output.error);
        // run-distance complete, weekly-runs not started
        assert!((output.progress - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_badge_fails() {
        let cmd = BadgeCommand::new(Config::default());
        let input = BadgeInput {
            badge_id: "ghost".to_string(),
            children: Vec::new(),
            instances: Some(Vec::new()),
        };
        let output = cmd.run(&input, &BadgeOptions::default());
        assert!(!output.success);
        assert!(output.error.unwrap().contains("not found"));
    }

    #[test]
    fn test_format_output() {
        let cmd = BadgeCommand::new(Config::default());
        let output = cmd.run(&explicit(Vec::new()), &BadgeOptions::default());
        let human = cmd.format_output(&output, &BadgeOptions::default());
        assert_eq!(human, "endurance: none (0.0% progress, locked)\n");

        let json = cmd.format_output(
            &output,
            &BadgeOptions {
                json: true,
                quiet: false,
            },
        );
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["tier"], "none");
        assert_eq!(value["unlocked"], false);
    }
}
