//! Rating models for resolving match outcomes into rating deltas
//!
//! Three interchangeable variants sit behind the `RatingModel` trait:
//! a piecewise-linear placement delta, a multi-factor model with opponent
//! strength and curve scaling, and a Bayesian skill model backed by the
//! skillratings Weng-Lin implementation. Variants are pure over input state
//! and can resolve the same outcome without interfering.

pub mod bayesian;
pub mod model;
pub mod multi_factor;
pub mod placement;

// Re-export commonly used types
pub use bayesian::BayesianSkillModel;
pub use model::{rating_model, RatingDeltaSet, RatingModel, RatingModelKind};
pub use multi_factor::{MultiFactorModel, RatingChangeBreakdown};
pub use placement::PlacementDeltaModel;
