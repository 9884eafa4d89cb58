//! Projects, targets and exposure plans as seen by the scoring rules.
//!
//! These are read-only snapshots supplied by the persistence layer for one
//! planning cycle.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, PlannerResult};
use crate::models::TargetCoordinates;

/// Database row ids, serialized as bare integers.
macro_rules! row_ids {
    ($($name:ident),+ $(,)?) => {$(
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub fn value(&self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "#{}", self.0)
            }
        }
    )+};
}

row_ids!(ProjectId, TargetId, ExposurePlanId);

/// User-assigned project priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProjectPriority {
    Low,
    #[default]
    Normal,
    High,
}

/// Desired/accepted/acquired exposure counts for one filter of a target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposurePlan {
    pub id: ExposurePlanId,
    pub filter_name: String,
    pub desired: u32,
    #[serde(default)]
    pub accepted: u32,
    #[serde(default)]
    pub acquired: u32,
}

impl ExposurePlan {
    pub fn new(id: i64, filter_name: impl Into<String>, desired: u32) -> Self {
        Self {
            id: ExposurePlanId(id),
            filter_name: filter_name.into(),
            desired,
            accepted: 0,
            acquired: 0,
        }
    }

    pub fn with_progress(mut self, accepted: u32, acquired: u32) -> Self {
        self.accepted = accepted;
        self.acquired = acquired;
        self
    }

    /// Accepted count, never more than desired.
    pub fn accepted_clamped(&self) -> u32 {
        self.accepted.min(self.desired)
    }
}

/// An imaging target (a whole object, or one panel of a mosaic).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub id: TargetId,
    pub name: String,
    pub coordinates: TargetCoordinates,
    #[serde(default)]
    pub exposure_plans: Vec<ExposurePlan>,
}

impl Target {
    pub fn new(id: i64, name: impl Into<String>, coordinates: TargetCoordinates) -> Self {
        Self {
            id: TargetId(id),
            name: name.into(),
            coordinates,
            exposure_plans: Vec::new(),
        }
    }

    pub fn with_exposure_plan(mut self, plan: ExposurePlan) -> Self {
        self.exposure_plans.push(plan);
        self
    }
}

/// A project groups the targets (or mosaic panels) imaged under one set of
/// preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub priority: ProjectPriority,
    /// Minutes on either side of the meridian; 0 disables the window.
    #[serde(default)]
    pub meridian_window_minutes: u32,
    #[serde(default)]
    pub is_mosaic: bool,
    /// Whether completion is measured by graded (accepted) exposures.
    #[serde(default = "default_enable_grader")]
    pub enable_grader: bool,
    /// Share of desired exposures to acquire when grading is off, in percent.
    #[serde(default = "default_throttle_percent")]
    pub exposure_throttle_percent: f64,
    #[serde(default)]
    pub targets: Vec<Target>,
}

fn default_enable_grader() -> bool {
    true
}

fn default_throttle_percent() -> f64 {
    125.0
}

impl Project {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id: ProjectId(id),
            name: name.into(),
            priority: ProjectPriority::Normal,
            meridian_window_minutes: 0,
            is_mosaic: false,
            enable_grader: default_enable_grader(),
            exposure_throttle_percent: default_throttle_percent(),
            targets: Vec::new(),
        }
    }

    pub fn with_priority(mut self, priority: ProjectPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_meridian_window(mut self, minutes: u32) -> Self {
        self.meridian_window_minutes = minutes;
        self
    }

    pub fn as_mosaic(mut self) -> Self {
        self.is_mosaic = true;
        self
    }

    pub fn with_grading(mut self, enable_grader: bool, exposure_throttle_percent: f64) -> Self {
        self.enable_grader = enable_grader;
        self.exposure_throttle_percent = exposure_throttle_percent;
        self
    }

    pub fn with_target(mut self, target: Target) -> Self {
        self.targets.push(target);
        self
    }

    /// Number of mosaic panels (targets) in the project.
    pub fn panel_count(&self) -> usize {
        self.targets.len()
    }

    pub fn meridian_window(&self) -> Duration {
        Duration::minutes(i64::from(self.meridian_window_minutes))
    }

    pub fn completion(&self) -> ExposureCompletion {
        ExposureCompletion::for_project(self)
    }
}

/// How far a target is towards its desired exposures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExposureCompletion {
    /// Completion counts graded (accepted) exposures against desired.
    Graded,
    /// Completion counts acquired exposures against desired × throttle.
    Throttled { throttle_percent: f64 },
}

impl ExposureCompletion {
    pub fn for_project(project: &Project) -> Self {
        if project.enable_grader {
            Self::Graded
        } else {
            Self::Throttled {
                throttle_percent: project.exposure_throttle_percent,
            }
        }
    }

    /// Completion ratio of a whole target in `[0, 1]`, summing counts across
    /// its exposure plans before dividing.
    pub fn target_ratio(&self, target: &Target) -> f64 {
        let (done, wanted) = target
            .exposure_plans
            .iter()
            .map(|p| self.plan_counts(p))
            .fold((0.0, 0.0), |(d, w), (pd, pw)| (d + pd, w + pw));
        if wanted <= 0.0 {
            return 0.0;
        }
        (done / wanted).clamp(0.0, 1.0)
    }

    fn plan_counts(&self, plan: &ExposurePlan) -> (f64, f64) {
        match *self {
            Self::Graded => (f64::from(plan.accepted_clamped()), f64::from(plan.desired)),
            Self::Throttled { throttle_percent } => {
                let wanted = f64::from(plan.desired) * throttle_percent / 100.0;
                (f64::from(plan.acquired).min(wanted), wanted)
            }
        }
    }
}

/// A target eligible for imaging now, with its visibility window.
#[derive(Debug, Clone, Copy)]
pub struct CandidateTarget<'a> {
    project: &'a Project,
    target: &'a Target,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
}

impl<'a> CandidateTarget<'a> {
    /// # Errors
    /// Returns [`PlannerError::InvalidTimeRange`] if the window is empty or
    /// reversed.
    pub fn new(
        project: &'a Project,
        target: &'a Target,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> PlannerResult<Self> {
        if start_time >= end_time {
            return Err(PlannerError::time_range(start_time, end_time));
        }
        Ok(Self {
            project,
            target,
            start_time,
            end_time,
        })
    }

    pub fn project(&self) -> &'a Project {
        self.project
    }

    pub fn target(&self) -> &'a Target {
        self.target
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }
}
