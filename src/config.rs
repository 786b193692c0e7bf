//! Configuration for terrain generation, the two solvers and the evaluator.
//!
//! Every struct carries the suggested defaults and builder-style setters, and can be
//! loaded from JSON so experiments can be scripted without recompiling.

use std::{fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{Error, Result, types::StateId};

/// Bonus added to any transition that arrives at the stranded person's cell
pub const DEFAULT_FOUND_BONUS: f64 = 50.0;

/// Highest obstacle density a cell can carry
pub const MAX_DENSITY: u8 = 3;

/// Load any config struct from a JSON file.
///
/// Missing fields fall back to their defaults.
pub fn load_json<T, P>(path: P) -> Result<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|source| Error::io(format!("open config {}", path.display()), source))?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

fn check_discount(discount: f64) -> Result<()> {
    if (0.0..=1.0).contains(&discount) {
        Ok(())
    } else {
        Err(Error::InvalidConfiguration {
            message: format!("discount factor {discount} must lie in [0, 1]"),
        })
    }
}

fn check_epochs(max_epochs: usize) -> Result<()> {
    if max_epochs == 0 {
        return Err(Error::InvalidConfiguration {
            message: "epoch budget must be at least 1".to_string(),
        });
    }
    Ok(())
}

/// Terrain and dataset generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Grid side length (the grid is `size x size`)
    pub size: usize,
    /// Reward bonus for arriving at the stranded person
    pub found_bonus: f64,
    /// Random seed for terrain and stranded location
    pub seed: Option<u64>,
}

impl TerrainConfig {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_found_bonus(mut self, bonus: f64) -> Self {
        self.found_bonus = bonus;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.size == 0 {
            return Err(Error::InvalidSize {
                rows: self.size,
                columns: self.size,
            });
        }
        if !self.found_bonus.is_finite() {
            return Err(Error::InvalidConfiguration {
                message: format!("found bonus {} must be finite", self.found_bonus),
            });
        }
        Ok(())
    }
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            size: 10,
            found_bonus: DEFAULT_FOUND_BONUS,
            seed: None,
        }
    }
}

/// Q-learning hyper-parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QLearningConfig {
    /// Learning rate α
    pub learning_rate: f64,
    /// Discount factor γ
    pub discount: f64,
    /// Maximum number of sweeps over the dataset
    pub max_epochs: usize,
    /// An update smaller than this counts as stable
    pub stability_epsilon: f64,
    /// Seed for the random Q-table initialization
    pub seed: Option<u64>,
}

impl QLearningConfig {
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_discount(mut self, discount: f64) -> Self {
        self.discount = discount;
        self
    }

    pub fn with_max_epochs(mut self, max_epochs: usize) -> Self {
        self.max_epochs = max_epochs;
        self
    }

    pub fn with_stability_epsilon(mut self, epsilon: f64) -> Self {
        self.stability_epsilon = epsilon;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.learning_rate.is_nan() || self.learning_rate <= 0.0 || self.learning_rate > 1.0 {
            return Err(Error::InvalidConfiguration {
                message: format!("learning rate {} must lie in (0, 1]", self.learning_rate),
            });
        }
        check_discount(self.discount)?;
        check_epochs(self.max_epochs)?;
        if self.stability_epsilon.is_nan() || self.stability_epsilon < 0.0 {
            return Err(Error::InvalidConfiguration {
                message: format!(
                    "stability epsilon {} must be non-negative",
                    self.stability_epsilon
                ),
            });
        }
        Ok(())
    }
}

impl Default for QLearningConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount: 0.9,
            max_epochs: 100,
            stability_epsilon: 0.001,
            seed: None,
        }
    }
}

/// Value-iteration hyper-parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueIterationConfig {
    /// Discount factor γ
    pub discount: f64,
    /// Maximum number of Gauss-Seidel sweeps
    pub max_epochs: usize,
    /// Stop once the largest utility change in a sweep drops below this
    pub convergence_threshold: f64,
    /// Highest density on the map; successors at `max_density - 1` or above slip
    pub max_density: u8,
}

impl ValueIterationConfig {
    pub fn with_discount(mut self, discount: f64) -> Self {
        self.discount = discount;
        self
    }

    pub fn with_max_epochs(mut self, max_epochs: usize) -> Self {
        self.max_epochs = max_epochs;
        self
    }

    pub fn with_convergence_threshold(mut self, threshold: f64) -> Self {
        self.convergence_threshold = threshold;
        self
    }

    pub fn with_max_density(mut self, max_density: u8) -> Self {
        self.max_density = max_density;
        self
    }

    pub fn validate(&self) -> Result<()> {
        check_discount(self.discount)?;
        check_epochs(self.max_epochs)?;
        if self.convergence_threshold.is_nan() || self.convergence_threshold < 0.0 {
            return Err(Error::InvalidConfiguration {
                message: format!(
                    "convergence threshold {} must be non-negative",
                    self.convergence_threshold
                ),
            });
        }
        if !(1..=MAX_DENSITY).contains(&self.max_density) {
            return Err(Error::InvalidConfiguration {
                message: format!(
                    "max density {} must lie in 1..={MAX_DENSITY}",
                    self.max_density
                ),
            });
        }
        Ok(())
    }
}

impl Default for ValueIterationConfig {
    fn default() -> Self {
        Self {
            discount: 0.9,
            max_epochs: 100,
            convergence_threshold: 0.005,
            max_density: MAX_DENSITY,
        }
    }
}

/// Monte-Carlo evaluation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Number of rollouts
    pub trials: usize,
    /// Steps per rollout; `None` means half the number of states
    pub horizon: Option<usize>,
    /// Seed for start states and the random baseline
    pub seed: Option<u64>,
    /// Stranded person's state, used to report how often rollouts reach it
    pub stranded: Option<StateId>,
}

impl EvaluationConfig {
    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = Some(horizon);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_stranded(mut self, stranded: StateId) -> Self {
        self.stranded = Some(stranded);
        self
    }

    /// Rollout length for a policy over `num_states` states
    pub fn horizon_for(&self, num_states: usize) -> usize {
        self.horizon.unwrap_or(num_states / 2)
    }

    pub fn validate(&self) -> Result<()> {
        if self.trials == 0 {
            return Err(Error::InvalidConfiguration {
                message: "trial count must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            trials: 100_000,
            horizon: None,
            seed: None,
            stranded: None,
        }
    }
}
