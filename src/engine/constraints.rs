//! Caller-supplied constraints for one assignment call

use crate::config::ConstraintPolicy;
use crate::types::RegionCode;
use serde::{Deserialize, Serialize};

/// Constraints applied to a single `assign` call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssignmentConstraints {
    /// Every team must contain at least one competitor of this region
    pub required_region: Option<RegionCode>,
    /// Explicit team size vector overriding team-count determination
    pub explicit_sizes: Option<Vec<usize>>,
    /// Include the partnership penalty term in the balance score
    pub avoid_partnerships: bool,
    /// How to handle constraints that cannot be satisfied
    pub policy: ConstraintPolicy,
}

impl AssignmentConstraints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require every team to contain a competitor of `region`
    pub fn with_required_region(mut self, region: impl Into<RegionCode>) -> Self {
        self.required_region = Some(region.into());
        self
    }

    /// Request exact team sizes (e.g. `[3, 3, 4]`)
    pub fn with_explicit_sizes(mut self, sizes: Vec<usize>) -> Self {
        self.explicit_sizes = Some(sizes);
        self
    }

    /// Penalize repeatedly co-assigned pairs during the search
    pub fn with_partnership_avoidance(mut self) -> Self {
        self.avoid_partnerships = true;
        self
    }

    /// Relax unsatisfiable constraints instead of failing, reporting the effect
    pub fn with_relax_and_warn(mut self) -> Self {
        self.policy = ConstraintPolicy::RelaxAndWarn;
        self
    }
}
