//! Classify command for Summit.
//!
//! Evaluates a goal's weekly snapshot history. Without a store the result
//! is only reported; with a store the engine's read-classify-write cycle
//! persists it. `--preview` never writes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::phase::{
    evaluate, preview_phase, GoalPhase, PhaseEngine, PhaseTransition, SnapshotHistory,
    WeeklySnapshot,
};
use crate::storage::PhaseStore;

/// Options for the classify command.
#[derive(Debug, Clone, Default)]
pub struct ClassifyOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Report the phase without persisting it.
    pub preview: bool,
}

/// Input for the classify command (JSON file).
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifyInput {
    /// Goal instance id.
    pub goal_id: String,
    /// Phase to start from when no store is used.
    #[serde(default)]
    pub current_phase: GoalPhase,
    /// Weekly snapshots, oldest first.
    pub snapshots: Vec<WeeklySnapshot>,
}

/// How the reported phase was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifyMode {
    /// Computed from the input phase, nothing stored.
    Classified,
    /// Display-only preview.
    Preview,
    /// Evaluated against and written to the phase store.
    Recorded,
}

/// Output format for the classify command.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifyOutput {
    /// Whether classification succeeded.
    pub success: bool,
    /// Goal instance id.
    pub goal_id: String,
    /// How the phase was produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<ClassifyMode>,
    /// Phase before evaluation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<GoalPhase>,
    /// Phase after evaluation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<GoalPhase>,
    /// Transition applied, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition: Option<PhaseTransition>,
    /// Newest week considered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week: Option<NaiveDate>,
    /// Stored version (recorded mode only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
    /// Whether the store was written.
    pub persisted: bool,
    /// Error message if classification failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ClassifyOutput {
    fn new(goal_id: &str, mode: ClassifyMode, previous: GoalPhase, phase: GoalPhase) -> Self {
        Self {
            success: true,
            goal_id: goal_id.to_string(),
            mode: Some(mode),
            previous: Some(previous),
            phase: Some(phase),
            transition: None,
            week: None,
            version: None,
            persisted: false,
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(goal_id: &str, error: impl Into<String>) -> Self {
        Self {
            success: false,
            goal_id: goal_id.to_string(),
            mode: None,
            previous: None,
            phase: None,
            transition: None,
            week: None,
            version: None,
            persisted: false,
            error: Some(error.into()),
        }
    }
}

/// The classify command implementation.
pub struct ClassifyCommand<S: PhaseStore> {
    engine: Option<PhaseEngine<S>>,
}

impl<S: PhaseStore> ClassifyCommand<S> {
    /// Classify without persisting anything.
    pub fn stateless() -> Self {
        Self { engine: None }
    }

    /// Classify against a phase store.
    pub fn with_store(store: S) -> Self {
        Self {
            engine: Some(PhaseEngine::new(store)),
        }
    }

    /// Run the classify command.
    pub fn run(&self, input: &ClassifyInput, options: &ClassifyOptions) -> ClassifyOutput {
        match self.try_run(input, options) {
            Ok(output) => output,
            Err(e) => ClassifyOutput::failure(&input.goal_id, e.to_string()),
        }
    }

    fn try_run(&self, input: &ClassifyInput, options: &ClassifyOptions) -> Result<ClassifyOutput> {
        let current = match &self.engine {
            Some(engine) => engine.current(&input.goal_id)?.phase,
            None => input.current_phase,
        };

        if options.preview {
            let preview = preview_phase(current, &input.snapshots)?;
            let mut output =
                ClassifyOutput::new(&input.goal_id, ClassifyMode::Preview, current, preview.phase);
            output.week = preview.based_on_week;
            return Ok(output);
        }

        match &self.engine {
            Some(engine) => {
                let update = engine.record_week(&input.goal_id, &input.snapshots)?;
                let mut output = ClassifyOutput::new(
                    &input.goal_id,
                    ClassifyMode::Recorded,
                    update.previous,
                    update.phase,
                );
                output.transition = update.transition;
                output.week = update.evaluated_through;
                output.version = Some(update.version);
                output.persisted = update.persisted;
                Ok(output)
            }
            None => {
                let history = SnapshotHistory::new(input.snapshots.clone())?;
                let result = evaluate(current, &history);
                let mut output = ClassifyOutput::new(
                    &input.goal_id,
                    ClassifyMode::Classified,
                    current,
                    result.phase,
                );
                output.transition = result.transition;
                output.week = history.latest_week();
                Ok(output)
            }
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &ClassifyOutput, options: &ClassifyOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    fn format_human_readable(&self, output: &ClassifyOutput) -> String {
        if !output.success {
            return format!(
                "Classify failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        let phase = output.phase.map(|p| p.to_string()).unwrap_or_default();
        let mut text = match output.transition {
            Some(t) => format!("{}: {} -> {}", output.goal_id, t.from, t.to),
            None => format!("{}: {} (unchanged)", output.goal_id, phase),
        };
        if let Some(week) = output.week {
            text.push_str(&format!(", through week of {}", week));
        }
        match output.mode {
            Some(ClassifyMode::Preview) => text.push_str(" [preview]"),
            Some(ClassifyMode::Recorded) if !output.persisted => {
                text.push_str(" [already evaluated]")
            }
            _ => {}
        }
        text.push('\n');
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryPhaseStore;
    use chrono::Duration;
    use std::sync::Arc;

    fn input(current: GoalPhase, ratios: &[f64]) -> ClassifyInput {
        let start = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        ClassifyInput {
            goal_id: "goal-1".to_string(),
            current_phase: current,
            snapshots: ratios
                .iter()
                .enumerate()
                .map(|(i, &r)| {
                    WeeklySnapshot::new(start + Duration::weeks(i as i64), 10.0, r * 10.0)
                })
                .collect(),
        }
    }

    #[test]
    fn test_stateless_promotion() {
        let cmd = ClassifyCommand::<MemoryPhaseStore>::stateless();
        let output = cmd.run(
            &input(GoalPhase::Acquisition, &[1.1, 1.0, 1.05, 1.2]),
            &ClassifyOptions::default(),
        );
        assert!(output.success);
        assert_eq!(output.phase, Some(GoalPhase::Consolidation));
        assert_eq!(output.mode, Some(ClassifyMode::Classified));
        assert!(!output.persisted);
    }

    #[test]
    fn test_invalid_history_reported() {
        let cmd = ClassifyCommand::<MemoryPhaseStore>::stateless();
        let mut bad = input(GoalPhase::Acquisition, &[1.0, 1.0]);
        bad.snapshots.swap(0, 1);
        let output = cmd.run(&bad, &ClassifyOptions::default());
        assert!(!output.success);
        assert!(output.error.unwrap().contains("invalid history"));
    }

    #[test]
    fn test_recorded_mode_is_idempotent() {
        let store = Arc::new(MemoryPhaseStore::new());
        let cmd = ClassifyCommand::with_store(Arc::clone(&store));
        let weak = input(GoalPhase::Acquisition, &[0.4, 0.3]);

        let first = cmd.run(&weak, &ClassifyOptions::default());
        assert!(first.success);
        assert!(first.persisted);
        assert_eq!(first.version, Some(1));

        let second = cmd.run(&weak, &ClassifyOptions::default());
        assert!(!second.persisted);
        assert_eq!(second.version, Some(1));
    }

    #[test]
    fn test_preview_never_writes() {
        let store = Arc::new(MemoryPhaseStore::new());
        let cmd = ClassifyCommand::with_store(Arc::clone(&store));
        let options = ClassifyOptions {
            preview: true,
            ..ClassifyOptions::default()
        };

        let output = cmd.run(&input(GoalPhase::Acquisition, &[1.0; 4]), &options);
        assert_eq!(output.mode, Some(ClassifyMode::Preview));
        assert_eq!(output.phase, Some(GoalPhase::Consolidation));
        assert!(store.is_empty());
    }

    #[test]
    fn test_format_output() {
        let cmd = ClassifyCommand::<MemoryPhaseStore>::stateless();
        let options = ClassifyOptions::default();
        let output = cmd.run(&input(GoalPhase::Consolidation, &[0.4, 0.3]), &options);

        let human = cmd.format_output(&output, &options);
        assert!(human.contains("consolidation -> acquisition"));

        let json = cmd.format_output(
            &output,
            &ClassifyOptions {
                json: true,
                ..options
            },
        );
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["phase"], "acquisition");
        assert_eq!(value["transition"]["reason"]["weak_streak"]["weeks"], 2);
    }

    #[test]
    fn test_input_deserializes_with_default_phase() {
        let json = r#"{
            "goal_id": "g",
            "snapshots": [
                {"week_start": "2026-03-02", "target_for_week": 3, "actual_for_week": 3}
            ]
        }"#;
        let input: ClassifyInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.current_phase, GoalPhase::Acquisition);
        assert_eq!(input.snapshots.len(), 1);
    }
}
