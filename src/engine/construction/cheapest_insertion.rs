//! Global cheapest feasible insertion.
//!
//! # Algorithm
//!
//! Every pending node is evaluated at every position of every vehicle's
//! route (idle vehicles included). The insertion cost is the arc delta
//! under the vehicle's own cost evaluator:
//!
//! ```text
//! delta = c_v(prev, u) + c_v(u, next) - c_v(prev, next)     (non-empty route)
//! delta = c_v(start, u) + c_v(u, end)                        (idle route)
//! ```
//!
//! The cheapest feasible (node, vehicle, position) is applied and the loop
//! repeats until nothing is pending, no feasible insertion exists or the
//! deadline passes.
//!
//! # Complexity
//!
//! O(P² · N · S) where P = pending nodes, N = route positions, S = route
//! simulation cost.

use crate::engine::{Deadline, RouteSimulator};

/// A candidate insertion of one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Insertion {
    pub vehicle: usize,
    pub position: usize,
    pub delta: f64,
}

/// Cheapest feasible insertion of `node` into the plan.
pub(crate) fn best_insertion(
    sim: &RouteSimulator<'_>,
    plan: &[Vec<usize>],
    node: usize,
) -> Option<Insertion> {
    let model = sim.model();
    let mut best: Option<Insertion> = None;

    for (vehicle, route) in plan.iter().enumerate() {
        let start = model.start(vehicle);
        let end = model.end(vehicle);
        let mut candidate = Vec::with_capacity(route.len() + 1);

        for position in 0..=route.len() {
            let prev = if position == 0 { start } else { route[position - 1] };
            let next = if position == route.len() { end } else { route[position] };
            let delta = if route.is_empty() {
                model.arc_cost(vehicle, start, node) + model.arc_cost(vehicle, node, end)
            } else {
                model.arc_cost(vehicle, prev, node) + model.arc_cost(vehicle, node, next)
                    - model.arc_cost(vehicle, prev, next)
            };

            if best.is_some_and(|b| delta >= b.delta) {
                continue;
            }

            candidate.clear();
            candidate.extend_from_slice(&route[..position]);
            candidate.push(node);
            candidate.extend_from_slice(&route[position..]);
            if sim.is_feasible(vehicle, &candidate) {
                best = Some(Insertion {
                    vehicle,
                    position,
                    delta,
                });
            }
        }
    }

    best
}

/// Inserts every pending node at its cheapest feasible position.
///
/// Returns `false` if some node has no feasible position or the deadline
/// passed first; the plan then holds the nodes inserted so far.
pub(crate) fn insert_pending(
    sim: &RouteSimulator<'_>,
    plan: &mut [Vec<usize>],
    mut pending: Vec<usize>,
    deadline: Deadline,
) -> bool {
    while !pending.is_empty() {
        let mut best: Option<(usize, Insertion)> = None;
        for (idx, &node) in pending.iter().enumerate() {
            if deadline.expired() {
                return false;
            }
            if let Some(ins) = best_insertion(sim, plan, node) {
                if best.as_ref().is_none_or(|(_, b)| ins.delta < b.delta) {
                    best = Some((idx, ins));
                }
            }
        }

        let Some((idx, ins)) = best else {
            return false;
        };
        let node = pending.remove(idx);
        plan[ins.vehicle].insert(ins.position, node);
    }
    true
}

/// Builds a plan from scratch by cheapest insertion.
pub(crate) fn cheapest_insertion(
    sim: &RouteSimulator<'_>,
    deadline: Deadline,
) -> Option<Vec<Vec<usize>>> {
    let model = sim.model();
    let mut plan = vec![Vec::new(); model.num_vehicles()];
    insert_pending(sim, &mut plan, model.visit_nodes(), deadline).then_some(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::line_model;
    use std::time::Duration;

    #[test]
    fn test_single_vehicle_line() {
        let m = line_model(&[0, 1, 2, 3], &[0, 10, 10, 10], &[(100, 1.0)]);
        let sim = RouteSimulator::new(&m);
        let plan = cheapest_insertion(&sim, Deadline::none()).expect("feasible");
        assert_eq!(plan[0].len(), 3);
        assert!((sim.plan_cost(&plan) - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_prefers_cheaper_vehicle() {
        let m = line_model(&[0, 2], &[0, 10], &[(100, 3.0), (100, 1.0)]);
        let sim = RouteSimulator::new(&m);
        let plan = cheapest_insertion(&sim, Deadline::none()).expect("feasible");
        assert!(plan[0].is_empty());
        assert_eq!(plan[1], vec![1]);
    }

    #[test]
    fn test_capacity_splits_routes() {
        let m = line_model(&[0, 1, 2], &[0, 60, 60], &[(100, 1.0), (100, 1.0)]);
        let sim = RouteSimulator::new(&m);
        let plan = cheapest_insertion(&sim, Deadline::none()).expect("feasible");
        assert_eq!(plan[0].len(), 1);
        assert_eq!(plan[1].len(), 1);
    }

    #[test]
    fn test_infeasible_when_fleet_too_small() {
        let m = line_model(&[0, 1, 2], &[0, 60, 60], &[(100, 1.0)]);
        let sim = RouteSimulator::new(&m);
        assert!(cheapest_insertion(&sim, Deadline::none()).is_none());
    }

    #[test]
    fn test_best_insertion_middle() {
        let m = line_model(&[0, 1, 2, 3], &[0, 10, 10, 10], &[(100, 1.0)]);
        let sim = RouteSimulator::new(&m);
        let ins = best_insertion(&sim, &[vec![1, 3]], 2).expect("feasible");
        assert_eq!(ins.position, 1);
        assert!(ins.delta.abs() < 1e-9);
    }

    #[test]
    fn test_expired_deadline_stops_insertion() {
        let m = line_model(&[0, 1, 2, 3], &[0, 10, 10, 10], &[(100, 1.0)]);
        let sim = RouteSimulator::new(&m);
        let expired = Deadline::after(Duration::ZERO);
        assert!(cheapest_insertion(&sim, expired).is_none());

        let mut plan = vec![Vec::new()];
        assert!(!insert_pending(&sim, &mut plan, vec![1, 2], expired));
        assert!(plan[0].is_empty());
    }

    #[test]
    fn test_nothing_pending() {
        let m = line_model(&[0], &[0], &[(100, 1.0)]);
        let sim = RouteSimulator::new(&m);
        assert_eq!(cheapest_insertion(&sim, Deadline::none()), Some(vec![Vec::new()]));
    }
}
