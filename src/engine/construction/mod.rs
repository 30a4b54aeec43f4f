//! First-solution construction strategies.
//!
//! - `savings` — Clarke-Wright savings (1964), chains assigned to vehicles
//! - `path_cheapest_arc` — Cheapest next arc per vehicle
//! - `cheapest_insertion` — Global cheapest feasible insertion
//!
//! A plan is `Vec<Vec<usize>>`: the visited nodes of each vehicle, in order,
//! without start and end nodes.

mod cheapest_insertion;
mod path_cheapest_arc;
mod savings;

use tracing::trace;

use crate::engine::{Deadline, FirstSolutionStrategy, RouteSimulator};

pub(crate) use cheapest_insertion::insert_pending;

/// Builds a complete feasible plan with the given strategy.
///
/// Returns `None` if some node could not be placed before the deadline.
/// `Automatic` runs cheapest insertion, path cheapest arc and savings, in
/// that order, and keeps the cheapest complete plan (the first one on ties);
/// strategies cut off by the deadline are skipped.
///
/// # Examples
///
/// ```
/// use u_fleet_routing::distance::ArcMatrix;
/// use u_fleet_routing::engine::{construct, Deadline, FirstSolutionStrategy, RouteSimulator};
/// use u_fleet_routing::routing::RoutingModel;
///
/// let distance = ArcMatrix::from_data(3, vec![0, 1000, 2000, 1000, 0, 1000, 2000, 1000, 0]).unwrap();
/// let time = ArcMatrix::from_data(3, vec![0, 10, 20, 10, 0, 10, 20, 10, 0]).unwrap();
/// let model = RoutingModel::builder(distance, time)
///     .pallet_demands(vec![0, 100, 100])
///     .window(1, 0, 100)
///     .window(2, 0, 100)
///     .vehicle(200, 100, 1.0, 10_000)
///     .build()
///     .unwrap();
///
/// let sim = RouteSimulator::new(&model);
/// let plan = construct(&sim, FirstSolutionStrategy::Automatic, Deadline::none()).unwrap();
/// assert_eq!(plan[0].len(), 2);
/// ```
pub fn construct(
    sim: &RouteSimulator<'_>,
    strategy: FirstSolutionStrategy,
    deadline: Deadline,
) -> Option<Vec<Vec<usize>>> {
    let plan = match strategy {
        FirstSolutionStrategy::Savings => savings::savings(sim, deadline),
        FirstSolutionStrategy::PathCheapestArc => {
            path_cheapest_arc::path_cheapest_arc(sim, deadline)
        }
        FirstSolutionStrategy::CheapestInsertion => {
            cheapest_insertion::cheapest_insertion(sim, deadline)
        }
        FirstSolutionStrategy::Automatic => [
            FirstSolutionStrategy::CheapestInsertion,
            FirstSolutionStrategy::PathCheapestArc,
            FirstSolutionStrategy::Savings,
        ]
        .into_iter()
        .filter_map(|s| construct(sim, s, deadline))
        .map(|plan| (sim.plan_cost(&plan), plan))
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, plan)| plan),
    };
    trace!(
        %strategy,
        complete = plan.is_some(),
        timed_out = deadline.expired(),
        cost = plan.as_ref().map(|p| sim.plan_cost(p)),
        "construction finished"
    );
    plan
}
