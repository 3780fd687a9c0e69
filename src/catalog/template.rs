//! Goal template entities.
//!
//! Templates are immutable catalog entries. Parent/child relationships are
//! not embedded here; they live as explicit edges in [`TemplateGraph`].
//!
//! [`TemplateGraph`]: crate::catalog::TemplateGraph

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SummitError};
use crate::ladder::{HabitRamp, MilestoneLadderConfig};

/// Tier of a template in the three-level hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum GoalLevel {
    /// Overarching aspiration.
    Aspiration = 1,
    /// Achievement group, shown as a badge.
    Achievement = 2,
    /// Individually trackable goal.
    Trackable = 3,
}

impl GoalLevel {
    /// Numeric level (1, 2, or 3).
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// The level directly above this one, if any.
    pub fn parent_level(self) -> Option<GoalLevel> {
        match self {
            Self::Aspiration => None,
            Self::Achievement => Some(Self::Aspiration),
            Self::Trackable => Some(Self::Achievement),
        }
    }
}

impl TryFrom<u8> for GoalLevel {
    type Error = SummitError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Self::Aspiration),
            2 => Ok(Self::Achievement),
            3 => Ok(Self::Trackable),
            other => Err(SummitError::invalid_config(format!(
                "template level must be 1, 2 or 3, got {}",
                other
            ))),
        }
    }
}

impl From<GoalLevel> for u8 {
    fn from(level: GoalLevel) -> Self {
        level.as_u8()
    }
}

impl fmt::Display for GoalLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.as_u8())
    }
}

/// Life area an L3 goal is grouped under for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayCategory {
    Health,
    Fitness,
    Mind,
    Career,
    Finance,
    Relationships,
    Creativity,
    Home,
}

impl DisplayCategory {
    /// Human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Health => "Health",
            Self::Fitness => "Fitness",
            Self::Mind => "Mind",
            Self::Career => "Career",
            Self::Finance => "Finance",
            Self::Relationships => "Relationships",
            Self::Creativity => "Creativity",
            Self::Home => "Home",
        }
    }
}

/// How an L3 goal's weekly targets are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateType {
    /// Cumulative target split into ladder rungs.
    MilestoneLadder,
    /// Weekly frequency target that steps up over time.
    HabitRamp,
}

impl TemplateType {
    /// Stable identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MilestoneLadder => "milestone_ladder",
            Self::HabitRamp => "habit_ramp",
        }
    }
}

/// Immutable catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalTemplate {
    /// Unique template id.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Hierarchy level.
    pub level: GoalLevel,
    /// Display category (L3 only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_category: Option<DisplayCategory>,
    /// Target-production type (L3 only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_type: Option<TemplateType>,
    /// Default ladder (L3 milestone templates only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_milestones: Option<MilestoneLadderConfig>,
    /// Default ramp (L3 habit templates only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_ramp_steps: Option<HabitRamp>,
}

impl GoalTemplate {
    /// Create a template with no L3-only fields.
    pub fn new(id: impl Into<String>, title: impl Into<String>, level: GoalLevel) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            level,
            display_category: None,
            template_type: None,
            default_milestones: None,
            default_ramp_steps: None,
        }
    }

    /// Create an L3 template.
    pub fn trackable(
        id: impl Into<String>,
        title: impl Into<String>,
        category: DisplayCategory,
        template_type: TemplateType,
    ) -> Self {
        let mut template = Self::new(id, title, GoalLevel::Trackable);
        template.display_category = Some(category);
        template.template_type = Some(template_type);
        template
    }

    /// Attach a default ladder.
    pub fn with_default_milestones(mut self, config: MilestoneLadderConfig) -> Self {
        self.default_milestones = Some(config);
        self
    }

    /// Attach a default ramp.
    pub fn with_default_ramp(mut self, ramp: HabitRamp) -> Self {
        self.default_ramp_steps = Some(ramp);
        self
    }

    /// Check the level-dependent field rules.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(SummitError::invalid_config("template id is empty"));
        }

        if self.level != GoalLevel::Trackable {
            let has_l3_fields = self.display_category.is_some()
                || self.template_type.is_some()
                || self.default_milestones.is_some()
                || self.default_ramp_steps.is_some();
            if has_l3_fields {
                return Err(SummitError::invalid_config(format!(
                    "{} template '{}' carries fields reserved for L3",
                    self.level, self.id
                )));
            }
            return Ok(());
        }

        if self.display_category.is_none() {
            return Err(SummitError::invalid_config(format!(
                "L3 template '{}' has no display_category",
                self.id
            )));
        }

        match self.template_type {
            None => Err(SummitError::invalid_config(format!(
                "L3 template '{}' has no template_type",
                self.id
            ))),
            Some(TemplateType::MilestoneLadder) => {
                if self.default_ramp_steps.is_some() {
                    return Err(SummitError::invalid_config(format!(
                        "milestone template '{}' cannot have default_ramp_steps",
                        self.id
                    )));
                }
                match &self.default_milestones {
                    Some(config) => config.validate(),
                    None => Ok(()),
                }
            }
            Some(TemplateType::HabitRamp) => {
                if self.default_milestones.is_some() {
                    return Err(SummitError::invalid_config(format!(
                        "habit template '{}' cannot have default_milestones",
                        self.id
                    )));
                }
                Ok(())
            }
        }
    }
}
