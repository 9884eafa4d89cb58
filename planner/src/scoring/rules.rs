//! Scoring rules.
//!
//! Each rule is a pure heuristic scoring a candidate in `[0, 1]`. The set of
//! rules is closed: [`ScoringRule::ALL`] is the registry, and rules are looked
//! up by their display name when weights are configured.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveTime};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, PlannerResult};
use crate::models::{CandidateTarget, ExposureCompletion, ProjectPriority};
use crate::scoring::engine::ScoringContext;

/// A heuristic used to rank imaging candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScoringRule {
    ProjectPriority,
    PercentComplete,
    MeridianWindowPriority,
    SettingSoonest,
    TargetSwitchPenalty,
    MosaicCompletion,
}

static REGISTRY: Lazy<HashMap<&'static str, ScoringRule>> =
    Lazy::new(|| ScoringRule::ALL.iter().map(|r| (r.name(), *r)).collect());

impl ScoringRule {
    /// Every rule, in registry order.
    pub const ALL: [ScoringRule; 6] = [
        ScoringRule::ProjectPriority,
        ScoringRule::PercentComplete,
        ScoringRule::MeridianWindowPriority,
        ScoringRule::SettingSoonest,
        ScoringRule::TargetSwitchPenalty,
        ScoringRule::MosaicCompletion,
    ];

    /// Unique display name, used as the configuration key.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ProjectPriority => "Project Priority",
            Self::PercentComplete => "Percent Complete",
            Self::MeridianWindowPriority => "Meridian Window Priority",
            Self::SettingSoonest => "Setting Soonest",
            Self::TargetSwitchPenalty => "Target Switch Penalty",
            Self::MosaicCompletion => "Mosaic Completion",
        }
    }

    pub fn default_weight(&self) -> f64 {
        match self {
            Self::ProjectPriority => 50.0,
            Self::PercentComplete => 50.0,
            Self::MeridianWindowPriority => 75.0,
            Self::SettingSoonest => 50.0,
            Self::TargetSwitchPenalty => 67.0,
            Self::MosaicCompletion => 50.0,
        }
    }

    /// Look a rule up by display name.
    pub fn from_name(name: &str) -> PlannerResult<Self> {
        REGISTRY
            .get(name.trim())
            .copied()
            .ok_or_else(|| PlannerError::UnknownRule(name.to_string()))
    }

    /// Score `candidate` in `[0, 1]`.
    pub fn score(&self, context: &ScoringContext, candidate: &CandidateTarget<'_>) -> f64 {
        match self {
            Self::ProjectPriority => project_priority(candidate),
            Self::PercentComplete => percent_complete(candidate),
            Self::MeridianWindowPriority => meridian_window_priority(candidate),
            Self::SettingSoonest => setting_soonest(context, candidate),
            Self::TargetSwitchPenalty => target_switch_penalty(context, candidate),
            Self::MosaicCompletion => mosaic_completion(candidate),
        }
    }
}

impl fmt::Display for ScoringRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScoringRule {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

fn project_priority(candidate: &CandidateTarget<'_>) -> f64 {
    match candidate.project().priority {
        ProjectPriority::Low => 0.0,
        ProjectPriority::Normal => 0.5,
        ProjectPriority::High => 1.0,
    }
}

fn percent_complete(candidate: &CandidateTarget<'_>) -> f64 {
    ExposureCompletion::Graded.target_ratio(candidate.target())
}

fn meridian_window_priority(candidate: &CandidateTarget<'_>) -> f64 {
    if candidate.project().meridian_window() > Duration::zero() {
        1.0
    } else {
        0.0
    }
}

/// Place the window end in the 24h frame starting at the previous local
/// noon; the earlier in that frame, the higher the score.
fn setting_soonest(context: &ScoringContext, candidate: &CandidateTarget<'_>) -> f64 {
    let end = candidate
        .end_time()
        .with_timezone(&context.utc_offset())
        .naive_local();
    let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN);
    let mut frame_start = end.date().and_time(noon);
    if end < frame_start {
        frame_start -= Duration::days(1);
    }
    let elapsed = (end - frame_start).num_milliseconds() as f64;
    let frame = Duration::days(1).num_milliseconds() as f64;
    (1.0 - elapsed / frame).clamp(0.0, 1.0)
}

fn target_switch_penalty(context: &ScoringContext, candidate: &CandidateTarget<'_>) -> f64 {
    match context.previous_target() {
        Some(previous) if previous == candidate.target().id => 1.0,
        _ => 0.0,
    }
}

/// Gap between the average completion of the other panels and this panel.
fn mosaic_completion(candidate: &CandidateTarget<'_>) -> f64 {
    let project = candidate.project();
    if !project.is_mosaic || project.panel_count() <= 1 {
        return 0.0;
    }

    let completion = project.completion();
    let own_id = candidate.target().id;
    let (sum, count) = project
        .targets
        .iter()
        .filter(|t| t.id != own_id)
        .map(|t| completion.target_ratio(t))
        .fold((0.0, 0usize), |(sum, count), r| (sum + r, count + 1));
    if count == 0 {
        return 0.0;
    }

    let others = sum / count as f64;
    let own = completion.target_ratio(candidate.target());
    (others - own).max(0.0)
}
