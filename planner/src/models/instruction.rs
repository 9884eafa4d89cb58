//! Plan instructions: the linear sequence handed to the execution runtime.

use qtty::Seconds;
use serde::{Deserialize, Serialize};

use crate::models::{ExposurePlanId, TargetId};

/// Exposure-plan entry referenced by a [`PlanInstruction::TakeExposure`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureRef {
    pub plan_id: ExposurePlanId,
    pub filter_name: String,
    pub exposure_length: Seconds,
}

impl ExposureRef {
    pub fn new(plan_id: i64, filter_name: impl Into<String>, exposure_length: Seconds) -> Self {
        Self {
            plan_id: ExposurePlanId(plan_id),
            filter_name: filter_name.into(),
            exposure_length,
        }
    }
}

/// One step of a target's execution plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlanInstruction {
    Slew { target: TargetId, center: bool },
    SwitchFilter { filter_name: String },
    SetReadoutMode { mode: u32 },
    TakeExposure { exposure: ExposureRef },
    Dither,
    Message { text: String },
}

impl PlanInstruction {
    pub fn exposure(exposure: ExposureRef) -> Self {
        Self::TakeExposure { exposure }
    }

    /// Filter of a `TakeExposure`, `None` for every other variant.
    pub fn exposure_filter(&self) -> Option<&str> {
        match self {
            Self::TakeExposure { exposure } => Some(exposure.filter_name.as_str()),
            Self::Slew { .. }
            | Self::SwitchFilter { .. }
            | Self::SetReadoutMode { .. }
            | Self::Dither
            | Self::Message { .. } => None,
        }
    }

    pub fn is_dither(&self) -> bool {
        matches!(self, Self::Dither)
    }
}

/// Number of `TakeExposure` instructions in a sequence.
pub fn count_exposures(instructions: &[PlanInstruction]) -> usize {
    instructions
        .iter()
        .filter(|i| i.exposure_filter().is_some())
        .count()
}
