//! Weighted multi-rule scoring of imaging candidates.

use std::collections::BTreeMap;

use chrono::{FixedOffset, Offset, Utc};
use log::debug;
use serde::Serialize;

use crate::error::{PlannerError, PlannerResult};
use crate::models::{CandidateTarget, TargetId};
use crate::scoring::rules::ScoringRule;

/// Per-cycle inputs shared by every rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringContext {
    previous_target: Option<TargetId>,
    utc_offset: FixedOffset,
}

impl Default for ScoringContext {
    fn default() -> Self {
        Self {
            previous_target: None,
            utc_offset: Utc.fix(),
        }
    }
}

impl ScoringContext {
    pub fn new(previous_target: Option<TargetId>, utc_offset: FixedOffset) -> Self {
        Self {
            previous_target,
            utc_offset,
        }
    }

    pub fn with_previous_target(mut self, target: TargetId) -> Self {
        self.previous_target = Some(target);
        self
    }

    /// Offset of the observer's local clock, used to find local noon.
    pub fn with_utc_offset(mut self, offset: FixedOffset) -> Self {
        self.utc_offset = offset;
        self
    }

    pub fn previous_target(&self) -> Option<TargetId> {
        self.previous_target
    }

    pub fn utc_offset(&self) -> FixedOffset {
        self.utc_offset
    }
}

/// Configured weight for every rule. A weight of 0 disables a rule.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleWeights {
    weights: BTreeMap<ScoringRule, f64>,
}

impl Default for RuleWeights {
    fn default() -> Self {
        Self {
            weights: ScoringRule::ALL
                .iter()
                .map(|r| (*r, r.default_weight()))
                .collect(),
        }
    }
}

impl RuleWeights {
    /// Every rule at weight 0.
    pub fn disabled() -> Self {
        Self {
            weights: ScoringRule::ALL.iter().map(|r| (*r, 0.0)).collect(),
        }
    }

    /// Start from the default weights and override by display name.
    ///
    /// # Errors
    /// Unknown names, repeated names and negative or non-finite weights.
    pub fn from_names<I, S>(entries: I) -> PlannerResult<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut weights = Self::default();
        let mut seen = Vec::new();
        for (name, weight) in entries {
            let rule = ScoringRule::from_name(name.as_ref())?;
            if seen.contains(&rule) {
                return Err(PlannerError::Configuration(format!(
                    "weight for '{}' given more than once",
                    rule
                )));
            }
            seen.push(rule);
            weights.set(rule, weight)?;
        }
        Ok(weights)
    }

    pub fn set(&mut self, rule: ScoringRule, weight: f64) -> PlannerResult<()> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(PlannerError::InvalidWeight {
                rule: rule.name().to_string(),
                weight,
            });
        }
        self.weights.insert(rule, weight);
        Ok(())
    }

    pub fn with(mut self, rule: ScoringRule, weight: f64) -> PlannerResult<Self> {
        self.set(rule, weight)?;
        Ok(self)
    }

    pub fn get(&self, rule: ScoringRule) -> f64 {
        self.weights.get(&rule).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ScoringRule, f64)> + '_ {
        self.weights.iter().map(|(r, w)| (*r, *w))
    }
}

/// One rule's share of a composite score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RuleScore {
    pub rule: ScoringRule,
    pub weight: f64,
    pub score: f64,
}

impl RuleScore {
    pub fn contribution(&self) -> f64 {
        self.weight * self.score
    }
}

/// Composite score of a candidate with its per-rule terms.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub target: TargetId,
    pub rules: Vec<RuleScore>,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.rules.iter().map(RuleScore::contribution).sum()
    }
}

/// A candidate paired with its score breakdown.
#[derive(Debug, Clone)]
pub struct ScoredCandidate<'a> {
    pub candidate: CandidateTarget<'a>,
    pub breakdown: ScoreBreakdown,
}

impl ScoredCandidate<'_> {
    pub fn score(&self) -> f64 {
        self.breakdown.total()
    }
}

/// Ranks candidates by the weighted sum of the active rules.
///
/// Built once per planning cycle; rules with a zero weight are dropped here
/// and never evaluated.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    context: ScoringContext,
    active: Vec<(ScoringRule, f64)>,
}

impl ScoringEngine {
    pub fn new(context: ScoringContext, weights: &RuleWeights) -> Self {
        let active: Vec<(ScoringRule, f64)> = ScoringRule::ALL
            .iter()
            .map(|r| (*r, weights.get(*r)))
            .filter(|(_, w)| *w != 0.0)
            .collect();
        debug!(
            "scoring engine with {} active rules: {:?}",
            active.len(),
            active
        );
        Self { context, active }
    }

    pub fn context(&self) -> &ScoringContext {
        &self.context
    }

    pub fn active_rules(&self) -> &[(ScoringRule, f64)] {
        &self.active
    }

    pub fn score_target(&self, candidate: &CandidateTarget<'_>) -> f64 {
        self.active
            .iter()
            .map(|(rule, weight)| weight * rule.score(&self.context, candidate))
            .sum()
    }

    pub fn score_breakdown(&self, candidate: &CandidateTarget<'_>) -> ScoreBreakdown {
        let rules = self
            .active
            .iter()
            .map(|(rule, weight)| {
                let score = rule.score(&self.context, candidate);
                debug!(
                    "target {} rule '{}': {:.3} x {:.1}",
                    candidate.target().id,
                    rule,
                    score,
                    weight
                );
                RuleScore {
                    rule: *rule,
                    weight: *weight,
                    score,
                }
            })
            .collect();
        ScoreBreakdown {
            target: candidate.target().id,
            rules,
        }
    }

    /// Candidates by descending score. Ties keep their input order.
    pub fn rank<'a>(&self, candidates: &[CandidateTarget<'a>]) -> Vec<ScoredCandidate<'a>> {
        let mut scored: Vec<ScoredCandidate<'a>> = candidates
            .iter()
            .map(|c| ScoredCandidate {
                candidate: *c,
                breakdown: self.score_breakdown(c),
            })
            .collect();
        scored.sort_by(|a, b| b.score().total_cmp(&a.score()));
        scored
    }

    /// The highest-scoring candidate, if any.
    pub fn select_target<'a>(
        &self,
        candidates: &[CandidateTarget<'a>],
    ) -> Option<ScoredCandidate<'a>> {
        let winner = self.rank(candidates).into_iter().next()?;
        debug!(
            "selected target {} ({}) with score {:.3}",
            winner.candidate.target().id,
            winner.candidate.target().name,
            winner.score()
        );
        Some(winner)
    }
}
