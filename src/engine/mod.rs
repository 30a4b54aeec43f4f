//! Routing engines that solve a [`RoutingModel`].
//!
//! # Modules
//!
//! - **`simulator`**: Route feasibility and cumul propagation over all dimensions
//! - **`construction`**: First-solution strategies (savings, path cheapest arc,
//!   cheapest insertion, automatic)
//! - **`local_search`**: Relocate and 2-opt descent
//! - **`lns`**: Random removal + cheapest reinsertion
//! - **`heuristic`**: [`HeuristicEngine`], the built-in engine
//!
//! The pipeline only depends on the [`RoutingEngine`] trait; any other search
//! backend can be plugged in by implementing it.

mod construction;
mod heuristic;
mod lns;
mod local_search;
mod simulator;

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::routing::{DimensionKind, RoutingModel};

pub use construction::construct;
pub use heuristic::HeuristicEngine;
pub use simulator::RouteSimulator;

/// First-solution construction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirstSolutionStrategy {
    /// Clarke-Wright savings merged into chains, then assigned to vehicles.
    Savings,
    /// Extends each vehicle's route with the cheapest feasible next node.
    PathCheapestArc,
    /// Repeatedly inserts the globally cheapest feasible (node, position).
    CheapestInsertion,
    /// Tries every other strategy and keeps the cheapest complete result.
    Automatic,
}

impl FirstSolutionStrategy {
    /// Strategy name as used in logs and reports.
    pub fn name(self) -> &'static str {
        match self {
            FirstSolutionStrategy::Savings => "savings",
            FirstSolutionStrategy::PathCheapestArc => "path_cheapest_arc",
            FirstSolutionStrategy::CheapestInsertion => "cheapest_insertion",
            FirstSolutionStrategy::Automatic => "automatic",
        }
    }
}

impl fmt::Display for FirstSolutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Search parameters handed to an engine for one run.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use u_fleet_routing::engine::{FirstSolutionStrategy, SearchParameters};
///
/// let params = SearchParameters::new(FirstSolutionStrategy::Savings)
///     .with_time_limit(Duration::from_secs(10))
///     .with_local_search_time_limit(Duration::from_secs(1))
///     .with_seed(7);
/// assert_eq!(params.first_solution, FirstSolutionStrategy::Savings);
/// assert_eq!(params.seed, 7);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParameters {
    /// Construction strategy.
    pub first_solution: FirstSolutionStrategy,
    /// Wall-clock limit for the whole search.
    pub time_limit: Duration,
    /// Wall-clock limit for the local-search refinement phase.
    pub local_search_time_limit: Duration,
    /// Seed for randomized phases.
    pub seed: u64,
    /// Maximum number of large-neighbourhood iterations.
    pub max_lns_iterations: usize,
}

impl SearchParameters {
    /// Creates parameters with default limits for the given strategy.
    pub fn new(first_solution: FirstSolutionStrategy) -> Self {
        Self {
            first_solution,
            time_limit: Duration::from_secs(300),
            local_search_time_limit: Duration::from_secs(3),
            seed: 42,
            max_lns_iterations: 1000,
        }
    }

    /// Sets the overall time limit.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = limit;
        self
    }

    /// Sets the local-search time limit.
    pub fn with_local_search_time_limit(mut self, limit: Duration) -> Self {
        self.local_search_time_limit = limit;
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
}

/// Feasible range of a cumul variable in an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CumulValue {
    /// Earliest feasible value.
    pub min: i64,
    /// Latest feasible value.
    pub max: i64,
}

impl CumulValue {
    /// A fixed value.
    pub fn fixed(value: i64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }
}

/// One node of a route with the realized cumul of every dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteStop {
    node: usize,
    cumuls: [CumulValue; 4],
}

impl RouteStop {
    /// Creates a stop.
    pub fn new(node: usize, cumuls: [CumulValue; 4]) -> Self {
        Self { node, cumuls }
    }

    /// Node visited.
    pub fn node(&self) -> usize {
        self.node
    }

    /// Cumul of the given dimension at this stop.
    pub fn cumul(&self, kind: DimensionKind) -> CumulValue {
        self.cumuls[kind.index()]
    }
}

/// The route of one vehicle, from its start node to its end node.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleRoute {
    vehicle: usize,
    stops: Vec<RouteStop>,
    cost: f64,
}

impl VehicleRoute {
    /// Creates a route. `stops` includes the start and end nodes.
    pub fn new(vehicle: usize, stops: Vec<RouteStop>, cost: f64) -> Self {
        Self {
            vehicle,
            stops,
            cost,
        }
    }

    /// Vehicle index.
    pub fn vehicle(&self) -> usize {
        self.vehicle
    }

    /// All stops including the start and end nodes.
    pub fn stops(&self) -> &[RouteStop] {
        &self.stops
    }

    /// Visited nodes between start and end.
    pub fn visits(&self) -> Vec<usize> {
        match self.stops.len() {
            0..=2 => Vec::new(),
            n => self.stops[1..n - 1].iter().map(|s| s.node).collect(),
        }
    }

    /// Returns `true` if the vehicle serves no node.
    pub fn is_idle(&self) -> bool {
        self.stops.len() <= 2
    }

    /// Arc cost of the route.
    pub fn cost(&self) -> f64 {
        self.cost
    }
}

/// A complete solution: one route per vehicle.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    routes: Vec<VehicleRoute>,
    objective: f64,
}

impl Assignment {
    /// Creates an assignment; the objective is the sum of route costs.
    pub fn new(routes: Vec<VehicleRoute>) -> Self {
        let objective = routes.iter().map(|r| r.cost).sum();
        Self { routes, objective }
    }

    /// Routes by vehicle index.
    pub fn routes(&self) -> &[VehicleRoute] {
        &self.routes
    }

    /// Route of a vehicle.
    pub fn route(&self, vehicle: usize) -> Option<&VehicleRoute> {
        self.routes.get(vehicle)
    }

    /// Total arc cost.
    pub fn objective(&self) -> f64 {
        self.objective
    }
}

/// Wall-clock cut-off for a search phase.
///
/// Every phase of [`HeuristicEngine`] polls it between moves, construction
/// included, so a run never outlives [`SearchParameters::time_limit`] by
/// more than one move evaluation.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use u_fleet_routing::engine::Deadline;
///
/// assert!(Deadline::after(Duration::ZERO).expired());
/// assert!(!Deadline::none().expired());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    /// Expires `limit` from now; a limit too large to represent never expires.
    pub fn after(limit: Duration) -> Self {
        Self(Instant::now().checked_add(limit))
    }

    /// A deadline that never expires.
    pub fn none() -> Self {
        Self(None)
    }

    /// The earlier of two deadlines.
    pub fn min(self, other: Self) -> Self {
        match (self.0, other.0) {
            (Some(a), Some(b)) => Self(Some(a.min(b))),
            (a, b) => Self(a.or(b)),
        }
    }

    /// Returns `true` once the deadline has passed.
    pub fn expired(self) -> bool {
        self.0.is_some_and(|d| Instant::now() >= d)
    }
}

/// A search backend for [`RoutingModel`]s.
///
/// Returns `None` when no feasible assignment was found within the limits.
/// A returned assignment visits every non-endpoint node exactly once and
/// respects every dimension.
pub trait RoutingEngine: Send + Sync {
    /// Solves the model.
    fn solve(&self, model: &RoutingModel, params: &SearchParameters) -> Option<Assignment>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(node: usize) -> RouteStop {
        RouteStop::new(node, [CumulValue::default(); 4])
    }

    #[test]
    fn test_strategy_names() {
        assert_eq!(FirstSolutionStrategy::Savings.to_string(), "savings");
        let s: FirstSolutionStrategy = serde_json::from_str("\"path_cheapest_arc\"").expect("valid");
        assert_eq!(s, FirstSolutionStrategy::PathCheapestArc);
    }

    #[test]
    fn test_route_visits() {
        let route = VehicleRoute::new(0, vec![stop(0), stop(3), stop(1), stop(0)], 5.0);
        assert_eq!(route.visits(), vec![3, 1]);
        assert!(!route.is_idle());
        let idle = VehicleRoute::new(1, vec![stop(0), stop(0)], 0.0);
        assert!(idle.is_idle());
        assert!(idle.visits().is_empty());
    }

    #[test]
    fn test_deadline() {
        assert!(Deadline::after(Duration::ZERO).expired());
        let long = Deadline::after(Duration::from_secs(3600));
        assert!(!long.expired());
        assert!(long.min(Deadline::after(Duration::ZERO)).expired());
        assert!(!Deadline::none().expired());
        assert!(!Deadline::none().min(long).expired());
    }

    #[test]
    fn test_assignment_objective() {
        let a = Assignment::new(vec![
            VehicleRoute::new(0, vec![stop(0), stop(1), stop(0)], 2.5),
            VehicleRoute::new(1, vec![stop(0), stop(2), stop(0)], 4.0),
        ]);
        assert!((a.objective() - 6.5).abs() < 1e-12);
        assert_eq!(a.route(1).map(|r| r.vehicle()), Some(1));
        assert!(a.route(2).is_none());
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::distance::ArcMatrix;
    use crate::routing::RoutingModel;

    /// Nodes on a line at `positions` km (node 0 is the depot), 10 minutes
    /// per km, every node open over `[0, 10_000]`. Vehicles are
    /// `(centipallet capacity, cost per km)`.
    pub(crate) fn line_model(positions: &[i64], pallets: &[i64], vehicles: &[(i64, f64)]) -> RoutingModel {
        let n = positions.len();
        let mut distance = Vec::with_capacity(n * n);
        let mut time = Vec::with_capacity(n * n);
        for &a in positions {
            for &b in positions {
                distance.push((a - b).abs() * 1000);
                time.push((a - b).abs() * 10);
            }
        }
        let mut builder = RoutingModel::builder(
            ArcMatrix::from_data(n, distance).expect("square"),
            ArcMatrix::from_data(n, time).expect("square"),
        )
        .pallet_demands(pallets.to_vec())
        .weight_demands(vec![0; n]);
        for node in 1..n {
            builder = builder.window(node, 0, 10_000);
        }
        for &(capacity, cost) in vehicles {
            builder = builder.vehicle(capacity, 1_000_000, cost, 1_000_000);
        }
        builder.build().expect("valid model")
    }
}
