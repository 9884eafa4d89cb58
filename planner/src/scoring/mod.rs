//! Candidate scoring: a closed registry of heuristic rules combined by a
//! weighted sum.

pub mod engine;
pub mod rules;

pub use engine::{
    RuleScore, RuleWeights, ScoreBreakdown, ScoredCandidate, ScoringContext, ScoringEngine,
};
pub use rules::ScoringRule;
