//! Solve configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::engine::{FirstSolutionStrategy, SearchParameters};
use crate::error::{Result, RoutingError};
use crate::routing::{DepotTopology, MissingArcPolicy};

/// Settings for a multi-strategy solve.
///
/// Every field has a default, so a JSON config only needs the fields it
/// changes.
///
/// # Examples
///
/// ```
/// use u_fleet_routing::config::SolveConfig;
/// use u_fleet_routing::engine::FirstSolutionStrategy;
///
/// let config = SolveConfig::default()
///     .with_strategies(vec![FirstSolutionStrategy::CheapestInsertion])
///     .with_time_limit_ms(5_000)
///     .with_parallel(false);
/// assert_eq!(config.strategies.len(), 1);
/// assert!(config.validate().is_ok());
///
/// let parsed = SolveConfig::from_json_str(r#"{ "seed": 9, "missing_arcs": "forbidden" }"#).unwrap();
/// assert_eq!(parsed.seed, 9);
/// assert_eq!(parsed.strategies, SolveConfig::default().strategies);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolveConfig {
    /// Candidate first-solution strategies, compared in this order.
    pub strategies: Vec<FirstSolutionStrategy>,
    /// Overall search time limit per strategy run (ms).
    pub time_limit_ms: u64,
    /// Local-search refinement time limit per strategy run (ms).
    pub local_search_time_limit_ms: u64,
    /// Vehicle start and end nodes.
    pub topology: DepotTopology,
    /// Treatment of node pairs without travel data.
    pub missing_arcs: MissingArcPolicy,
    /// Run strategies on the rayon thread pool.
    pub parallel: bool,
    /// Seed for randomized search phases.
    pub seed: u64,
    /// Large-neighbourhood iteration cap per run.
    pub max_lns_iterations: usize,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            strategies: vec![FirstSolutionStrategy::Savings, FirstSolutionStrategy::Automatic],
            time_limit_ms: 300_000,
            local_search_time_limit_ms: 3_000,
            topology: DepotTopology::SingleDepot,
            missing_arcs: MissingArcPolicy::Zero,
            parallel: true,
            seed: 42,
            max_lns_iterations: 1000,
        }
    }
}

impl SolveConfig {
    /// Parses a config from JSON; absent fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Sets the candidate strategies.
    pub fn with_strategies(mut self, strategies: Vec<FirstSolutionStrategy>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Sets the overall time limit in milliseconds.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = ms;
        self
    }

    /// Sets the local-search time limit in milliseconds.
    pub fn with_local_search_time_limit_ms(mut self, ms: u64) -> Self {
        self.local_search_time_limit_ms = ms;
        self
    }

    /// Sets the depot topology.
    pub fn with_topology(mut self, topology: DepotTopology) -> Self {
        self.topology = topology;
        self
    }

    /// Sets the missing arc policy.
    pub fn with_missing_arcs(mut self, policy: MissingArcPolicy) -> Self {
        self.missing_arcs = policy;
        self
    }

    /// Enables or disables parallel strategy runs.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the large-neighbourhood iteration cap.
    pub fn with_max_lns_iterations(mut self, n: usize) -> Self {
        self.max_lns_iterations = n;
        self
    }

    /// Checks settings that cannot be expressed in the types.
    pub fn validate(&self) -> Result<()> {
        if self.strategies.is_empty() {
            return Err(RoutingError::InvalidConfig {
                reason: "at least one strategy is required".into(),
            });
        }
        Ok(())
    }

    /// Search parameters for one strategy run.
    pub fn search_parameters(&self, strategy: FirstSolutionStrategy) -> SearchParameters {
        SearchParameters::new(strategy)
            .with_time_limit(Duration::from_millis(self.time_limit_ms))
            .with_local_search_time_limit(Duration::from_millis(self.local_search_time_limit_ms))
            .with_seed(self.seed)
            .with_max_lns_iterations(self.max_lns_iterations)
    }
}
