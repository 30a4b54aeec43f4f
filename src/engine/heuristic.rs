//! The built-in heuristic routing engine.

use std::time::Instant;

use tracing::{debug, warn};

use crate::routing::RoutingModel;

use super::construction::construct;
use super::{lns, local_search, Assignment, Deadline, RouteSimulator, RoutingEngine, SearchParameters};

/// Construction + local search + large neighbourhood search.
///
/// 1. Builds a first solution with [`SearchParameters::first_solution`].
/// 2. Runs relocate/2-opt descent within the local-search time limit.
/// 3. Runs random-removal LNS within the overall time limit and
///    [`SearchParameters::max_lns_iterations`].
///
/// Both refinement phases can be switched off. The overall time limit also
/// bounds construction: a first solution not finished in time yields `None`.
///
/// # Examples
///
/// ```
/// use u_fleet_routing::distance::ArcMatrix;
/// use u_fleet_routing::engine::{
///     FirstSolutionStrategy, HeuristicEngine, RoutingEngine, SearchParameters,
/// };
/// use u_fleet_routing::routing::RoutingModel;
///
/// let distance = ArcMatrix::from_data(3, vec![0, 1000, 2000, 1000, 0, 1000, 2000, 1000, 0]).unwrap();
/// let time = ArcMatrix::from_data(3, vec![0, 10, 20, 10, 0, 10, 20, 10, 0]).unwrap();
/// let model = RoutingModel::builder(distance, time)
///     .pallet_demands(vec![0, 100, 100])
///     .window(1, 0, 100)
///     .window(2, 0, 100)
///     .vehicle(200, 100, 1.5, 10_000)
///     .build()
///     .unwrap();
///
/// let engine = HeuristicEngine::default();
/// let params = SearchParameters::new(FirstSolutionStrategy::Savings);
/// let assignment = engine.solve(&model, &params).unwrap();
/// assert!((assignment.objective() - 6.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeuristicEngine {
    local_search: bool,
    lns: bool,
}

impl Default for HeuristicEngine {
    fn default() -> Self {
        Self {
            local_search: true,
            lns: true,
        }
    }
}

impl HeuristicEngine {
    /// Creates an engine with all phases enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables the relocate/2-opt phase.
    pub fn with_local_search(mut self, enabled: bool) -> Self {
        self.local_search = enabled;
        self
    }

    /// Enables or disables the large neighbourhood phase.
    pub fn with_lns(mut self, enabled: bool) -> Self {
        self.lns = enabled;
        self
    }
}

impl RoutingEngine for HeuristicEngine {
    fn solve(&self, model: &RoutingModel, params: &SearchParameters) -> Option<Assignment> {
        let started = Instant::now();
        let deadline = Deadline::after(params.time_limit);
        let sim = RouteSimulator::new(model);

        let Some(mut plan) = construct(&sim, params.first_solution, deadline) else {
            if deadline.expired() {
                warn!(
                    strategy = %params.first_solution,
                    time_limit_ms = params.time_limit.as_millis() as u64,
                    "time limit reached before a first solution was built"
                );
            }
            return None;
        };
        let initial_cost = sim.plan_cost(&plan);

        let mut ls_moves = 0;
        if self.local_search {
            let ls_deadline = deadline.min(Deadline::after(params.local_search_time_limit));
            ls_moves = local_search::improve(&sim, &mut plan, ls_deadline);
        }
        if self.lns && params.max_lns_iterations > 0 {
            plan = lns::search(&sim, plan, params.seed, params.max_lns_iterations, deadline);
        }

        let assignment = sim.assemble(&plan)?;
        debug!(
            strategy = %params.first_solution,
            initial_cost,
            final_cost = assignment.objective(),
            ls_moves,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "search finished"
        );
        Some(assignment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::line_model;
    use crate::engine::FirstSolutionStrategy;
    use std::time::Duration;

    fn params(strategy: FirstSolutionStrategy) -> SearchParameters {
        SearchParameters::new(strategy)
            .with_time_limit(Duration::from_secs(30))
            .with_max_lns_iterations(100)
    }

    #[test]
    fn test_solves_all_strategies() {
        let m = line_model(
            &[0, 3, 1, 4, 2],
            &[0, 40, 40, 40, 40],
            &[(100, 1.0), (100, 1.0)],
        );
        let engine = HeuristicEngine::default();
        for strategy in [
            FirstSolutionStrategy::Savings,
            FirstSolutionStrategy::PathCheapestArc,
            FirstSolutionStrategy::CheapestInsertion,
            FirstSolutionStrategy::Automatic,
        ] {
            let a = engine.solve(&m, &params(strategy)).expect("feasible");
            assert_eq!(a.routes().len(), 2);
            let served: usize = a.routes().iter().map(|r| r.visits().len()).sum();
            assert_eq!(served, 4);
        }
    }

    #[test]
    fn test_refinement_never_hurts() {
        let m = line_model(
            &[0, 3, 1, 4, 2, 6],
            &[0, 40, 40, 40, 40, 20],
            &[(100, 1.0), (100, 1.3), (100, 0.9)],
        );
        let p = params(FirstSolutionStrategy::PathCheapestArc);
        let plain = HeuristicEngine::new()
            .with_local_search(false)
            .with_lns(false)
            .solve(&m, &p)
            .expect("feasible");
        let full = HeuristicEngine::new().solve(&m, &p).expect("feasible");
        assert!(full.objective() <= plain.objective() + 1e-9);
    }

    #[test]
    fn test_infeasible_returns_none() {
        let m = line_model(&[0, 1], &[0, 150], &[(100, 1.0)]);
        let engine = HeuristicEngine::default();
        assert!(engine
            .solve(&m, &params(FirstSolutionStrategy::Automatic))
            .is_none());
    }

    #[test]
    fn test_time_limit_bounds_construction() {
        let mut positions = vec![0];
        positions.extend((1..=150).map(|i| (i * 37) % 200 + 1));
        let mut pallets = vec![0];
        pallets.extend([10; 150]);
        let vehicles: Vec<(i64, f64)> = (0..20).map(|v| (100, 1.0 + v as f64 * 0.05)).collect();
        let m = line_model(&positions, &pallets, &vehicles);
        let limit = Duration::from_millis(50);
        let p = SearchParameters::new(FirstSolutionStrategy::Automatic)
            .with_time_limit(limit)
            .with_max_lns_iterations(1000);

        let started = Instant::now();
        let _ = HeuristicEngine::default().solve(&m, &p);
        assert!(started.elapsed() < limit + Duration::from_millis(450));
    }

    #[test]
    fn test_zero_time_limit_yields_nothing() {
        let m = line_model(&[0, 1, 2], &[0, 10, 10], &[(100, 1.0)]);
        let p = params(FirstSolutionStrategy::Savings).with_time_limit(Duration::ZERO);
        assert!(HeuristicEngine::default().solve(&m, &p).is_none());
    }

    #[test]
    fn test_deterministic_for_seed() {
        let m = line_model(
            &[0, 3, 1, 4, 2, 6],
            &[0, 40, 40, 40, 40, 20],
            &[(100, 1.0), (100, 1.3), (100, 0.9)],
        );
        let p = params(FirstSolutionStrategy::Savings).with_seed(3);
        let engine = HeuristicEngine::default();
        let a = engine.solve(&m, &p).expect("feasible");
        let b = engine.solve(&m, &p).expect("feasible");
        assert_eq!(a, b);
    }
}
