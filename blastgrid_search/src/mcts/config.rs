/// When a search stops iterating.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopCondition {
    /// Stop once the remaining time drops below twice the average iteration
    /// time, or below a small safety margin.
    Time { millis: u64 },
    /// Stop after a fixed number of iterations.
    Iterations(u32),
    /// Stop before the next iteration would exceed this many forward-model
    /// calls. Each iteration is charged `rollout_depth` calls.
    FmCalls(u32),
}

/// How actors other than the controlled one are simulated.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OpponentModel {
    /// Each opponent draws a uniformly random legal action every step.
    #[default]
    Random,
    /// Opponents play the spatial mirror of the controlled actor's action.
    Mirror,
    /// Opponents play exactly the controlled actor's action.
    SameAction,
}

/// Which state evaluator the heuristic factory should build.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HeuristicMethod {
    Custom,
    #[default]
    Advanced,
}

#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MctsParams {
    /// UCT exploration constant.
    pub k: f64,
    /// Smoothing term for divisions by visit counts and scale of the
    /// tie-breaking noise.
    pub epsilon: f64,
    /// Absolute depth (from the root) at which tree descent and rollouts stop.
    pub rollout_depth: u32,
    pub heuristic_method: HeuristicMethod,
    /// Multiplier applied to visit counts and values when a tree is reused.
    /// Must be in `[0, 1)`.
    pub decay_factor: f64,
    pub stop_condition: StopCondition,
    pub opponent_model: OpponentModel,
    /// Ticks ahead of the collapse schedule at which rollouts start avoiding
    /// the border band.
    pub pre_collapse_steps: i32,
    /// Keep the subtree of the chosen action between decisions.
    pub reuse_tree: bool,
    /// Log the top of the tree after every decision.
    pub debug: bool,
}

impl MctsParams {
    pub const STANDARD: Self = Self {
        k: 1.0,
        epsilon: 1e-6,
        rollout_depth: 18,
        heuristic_method: HeuristicMethod::Advanced,
        decay_factor: 0.78,
        stop_condition: StopCondition::Time { millis: 40 },
        opponent_model: OpponentModel::Random,
        pre_collapse_steps: 10,
        reuse_tree: true,
        debug: false,
    };

    /// Suggested budget for [`StopCondition::Iterations`].
    pub const DEFAULT_ITERATIONS: u32 = 300;

    /// Suggested budget for [`StopCondition::FmCalls`].
    pub const DEFAULT_FM_CALLS: u32 = 2000;

    #[inline]
    pub fn with_stop_condition(self, stop_condition: StopCondition) -> Self {
        Self { stop_condition, ..self }
    }

    #[inline]
    pub fn with_opponent_model(self, opponent_model: OpponentModel) -> Self {
        Self { opponent_model, ..self }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..1.0).contains(&self.decay_factor) {
            return Err(ConfigError::DecayFactor(self.decay_factor));
        }
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(ConfigError::Epsilon(self.epsilon));
        }
        if !(self.k.is_finite() && self.k >= 0.0) {
            return Err(ConfigError::Exploration(self.k));
        }
        if self.rollout_depth == 0 {
            return Err(ConfigError::ZeroRolloutDepth);
        }
        let zero_budget = match self.stop_condition {
            StopCondition::Time { millis } => millis == 0,
            StopCondition::Iterations(n) | StopCondition::FmCalls(n) => n == 0,
        };
        if zero_budget {
            return Err(ConfigError::ZeroBudget(self.stop_condition));
        }
        Ok(())
    }
}

impl Default for MctsParams {
    fn default() -> Self {
        Self::STANDARD
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("decay factor must be in [0, 1), got {0}")]
    DecayFactor(f64),
    #[error("epsilon must be finite and positive, got {0}")]
    Epsilon(f64),
    #[error("exploration constant must be finite and non-negative, got {0}")]
    Exploration(f64),
    #[error("rollout depth must be at least 1")]
    ZeroRolloutDepth,
    #[error("search budget must be non-zero, got {0:?}")]
    ZeroBudget(StopCondition),
    #[error("the legal action table is empty")]
    EmptyActionSet,
}
