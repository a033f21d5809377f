//! Configuration threaded through every auction entry point.

use crate::error::AuctionError;
use crate::utility::UtilityModel;

/// How much of the task set each agent knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TaskKnowledge {
    /// Every agent knows every task.
    #[default]
    Global,
    /// Agents see tasks within the visibility radius and learn the rest from
    /// peers in their connected component.
    Local,
}

/// Configuration for an auction run.
///
/// Controls the utility model, the visibility relation, and the auction
/// tolerance. The values are plain data; call [`SolverConfig::validate`] (the
/// entry points do) before solving.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SolverConfig {
    // --- Utility model ---
    /// Upper bound scale of pairwise utility.
    pub max_utility: f64,
    /// Added to every distance so that zero distance stays finite.
    pub distance_offset: f64,

    // --- Visibility ---
    /// Agents (and, under [`TaskKnowledge::Local`], tasks) within this distance
    /// are visible. Zero or negative isolates every agent.
    pub visibility_radius: f64,
    /// Whether task knowledge is global or restricted by visibility.
    pub task_knowledge: TaskKnowledge,

    // --- Auction ---
    /// Bid increment slack ε. Must be strictly positive.
    pub epsilon: f64,
}

impl SolverConfig {
    /// Returns the utility model described by this configuration.
    pub fn utility_model(&self) -> UtilityModel {
        UtilityModel::new(self.max_utility, self.distance_offset)
    }

    /// Checks every precondition of a run.
    ///
    /// # Errors
    ///
    /// - `InvalidEpsilon` if epsilon is not finite and positive
    /// - `InvalidParameter` for a non-positive utility bound or offset, or a NaN radius
    pub fn validate(&self) -> Result<(), AuctionError> {
        validate_epsilon(self.epsilon)?;
        positive("max_utility", self.max_utility)?;
        positive("distance_offset", self.distance_offset)?;
        if self.visibility_radius.is_nan() {
            return Err(AuctionError::InvalidParameter {
                name: "visibility_radius",
                value: self.visibility_radius,
            });
        }
        Ok(())
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_utility: 30.0,
            distance_offset: 0.1,
            visibility_radius: 100.0,
            task_knowledge: TaskKnowledge::Global,
            epsilon: 1e-5,
        }
    }
}

/// Rejects epsilons for which the auction may never terminate.
pub(crate) fn validate_epsilon(epsilon: f64) -> Result<(), AuctionError> {
    if epsilon.is_finite() && epsilon > 0.0 {
        Ok(())
    } else {
        Err(AuctionError::InvalidEpsilon(epsilon))
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), AuctionError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(AuctionError::InvalidParameter { name, value })
    }
}
