//! The three-tier goal template graph.
//!
//! Built once at startup from catalog records and never mutated. Integrity
//! is checked when the graph is built, so lookups never re-validate:
//! - ids are unique
//! - every parent edge points exactly one level up
//! - L1 templates have no parents; every L2 and L3 has at least one
//!
//! Edges always point from level `n` to level `n - 1`, so the graph is
//! acyclic by construction.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::catalog::{GoalLevel, GoalTemplate};
use crate::error::{Result, SummitError};

/// A template plus its parent edges, as stored in a flat catalog table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateRecord {
    /// The template itself.
    #[serde(flatten)]
    pub template: GoalTemplate,
    /// Ids of the templates one level up.
    #[serde(default)]
    pub parent_ids: Vec<String>,
}

impl TemplateRecord {
    /// Create a record.
    pub fn new(template: GoalTemplate, parent_ids: Vec<String>) -> Self {
        Self {
            template,
            parent_ids,
        }
    }
}

/// Immutable template graph with parent/child lookups.
#[derive(Debug, Clone)]
pub struct TemplateGraph {
    templates: Vec<GoalTemplate>,
    index: HashMap<String, usize>,
    children: Vec<Vec<usize>>,
    parents: Vec<Vec<usize>>,
}

impl TemplateGraph {
    /// Build and validate a graph from flat records.
    ///
    /// Children are returned in record order.
    pub fn from_records(records: Vec<TemplateRecord>) -> Result<Self> {
        let mut index = HashMap::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            record.template.validate()?;
            if index.insert(record.template.id.clone(), i).is_some() {
                return Err(SummitError::invalid_config(format!(
                    "duplicate template id '{}'",
                    record.template.id
                )));
            }
        }

        let mut children = vec![Vec::new(); records.len()];
        let mut parents = vec![Vec::new(); records.len()];

        for (i, record) in records.iter().enumerate() {
            let template = &record.template;
            match template.level.parent_level() {
                None => {
                    if !record.parent_ids.is_empty() {
                        return Err(SummitError::invalid_config(format!(
                            "L1 template '{}' cannot have parents",
                            template.id
                        )));
                    }
                }
                Some(expected) => {
                    if record.parent_ids.is_empty() {
                        return Err(SummitError::invalid_config(format!(
                            "{} template '{}' is not reachable from any {} template",
                            template.level, template.id, expected
                        )));
                    }

                    let mut seen = HashSet::new();
                    for parent_id in &record.parent_ids {
                        if !seen.insert(parent_id.as_str()) {
                            return Err(SummitError::invalid_config(format!(
                                "template '{}' lists parent '{}' twice",
                                template.id, parent_id
                            )));
                        }
                        let &p = index.get(parent_id).ok_or_else(|| {
                            SummitError::invalid_config(format!(
                                "template '{}' references unknown parent '{}'",
                                template.id, parent_id
                            ))
                        })?;
                        let parent_level = records[p].template.level;
                        if parent_level != expected {
                            return Err(SummitError::invalid_config(format!(
                                "template '{}' ({}) has parent '{}' at {}, expected {}",
                                template.id, template.level, parent_id, parent_level, expected
                            )));
                        }
                        parents[i].push(p);
                        children[p].push(i);
                    }
                }
            }
        }

        let templates: Vec<GoalTemplate> = records.into_iter().map(|r| r.template).collect();

        tracing::info!(templates = templates.len(), "loaded goal template catalog");

        Ok(Self {
            templates,
            index,
            children,
            parents,
        })
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| SummitError::not_found(id))
    }

    /// Look up a single template.
    pub fn get(&self, id: &str) -> Result<&GoalTemplate> {
        Ok(&self.templates[self.position(id)?])
    }

    /// Whether the catalog contains `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Ordered children of a template (empty for L3).
    pub fn get_children(&self, id: &str) -> Result<Vec<&GoalTemplate>> {
        let pos = self.position(id)?;
        Ok(self.children[pos]
            .iter()
            .map(|&c| &self.templates[c])
            .collect())
    }

    /// Parents of a template (empty for L1).
    pub fn get_parents(&self, id: &str) -> Result<Vec<&GoalTemplate>> {
        let pos = self.position(id)?;
        Ok(self.parents[pos]
            .iter()
            .map(|&p| &self.templates[p])
            .collect())
    }

    /// All L3 templates beneath `id`, deduplicated, in first-seen order.
    ///
    /// An L3 id yields itself.
    pub fn descendants(&self, id: &str) -> Result<Vec<&GoalTemplate>> {
        let pos = self.position(id)?;
        let mut seen = HashSet::new();
        let mut leaves = Vec::new();
        let mut stack = vec![pos];

        while let Some(current) = stack.pop() {
            if self.templates[current].level == GoalLevel::Trackable {
                if seen.insert(current) {
                    leaves.push(&self.templates[current]);
                }
                continue;
            }
            // Reverse so the stack pops children in catalog order.
            stack.extend(self.children[current].iter().rev());
        }

        Ok(leaves)
    }

    /// All L1 templates, in catalog order.
    pub fn roots(&self) -> Vec<&GoalTemplate> {
        self.templates_at(GoalLevel::Aspiration)
    }

    /// All templates at a level, in catalog order.
    pub fn templates_at(&self, level: GoalLevel) -> Vec<&GoalTemplate> {
        self.templates.iter().filter(|t| t.level == level).collect()
    }

    /// Number of templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
