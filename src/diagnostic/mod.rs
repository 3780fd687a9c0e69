//! Phase-gated diagnostic scoring.
//!
//! Three domain-supplied terms combine into a multiplicative composite.
//! Each term is tagged for display based on its value and how much the
//! goal's current phase cares about it.

pub mod formula;
pub mod terms;
pub mod weights;

pub use formula::{classify_term, compute_diagnostic, DiagnosticScore, TermScore};
pub use terms::{clamp_ratio, DiagnosticTerms, TermKind, TermStatus};
pub use weights::{PhaseWeightProfiles, StatusThresholds, WeightProfile};
