//! Path cheapest arc construction.
//!
//! # Algorithm
//!
//! Vehicles are filled one after another. Starting at the vehicle's start
//! node, the route is extended with the pending node reachable by the
//! cheapest arc such that the extended route (closed at the vehicle's end
//! node) stays feasible. When no node can be appended the next vehicle
//! starts. Nodes left when the fleet is exhausted go through cheapest
//! insertion. The deadline is polled before every extension step.
//!
//! # Complexity
//!
//! O(n² · S) where n = nodes, S = route simulation cost.

use crate::engine::{Deadline, RouteSimulator};

use super::cheapest_insertion::insert_pending;

/// Builds a plan by extending each vehicle's path with its cheapest arc.
pub(crate) fn path_cheapest_arc(
    sim: &RouteSimulator<'_>,
    deadline: Deadline,
) -> Option<Vec<Vec<usize>>> {
    let model = sim.model();
    let mut pending = model.visit_nodes();
    let mut plan = vec![Vec::new(); model.num_vehicles()];

    for (vehicle, route) in plan.iter_mut().enumerate() {
        if pending.is_empty() {
            break;
        }

        loop {
            if deadline.expired() {
                return None;
            }
            let current = route.last().copied().unwrap_or(model.start(vehicle));
            let mut best: Option<(usize, f64)> = None;

            for (idx, &node) in pending.iter().enumerate() {
                let cost = model.arc_cost(vehicle, current, node);
                if best.is_some_and(|(_, b)| cost >= b) {
                    continue;
                }
                route.push(node);
                let feasible = sim.is_feasible(vehicle, route);
                route.pop();
                if feasible {
                    best = Some((idx, cost));
                }
            }

            match best {
                Some((idx, _)) => route.push(pending.remove(idx)),
                None => break,
            }
        }
    }

    insert_pending(sim, &mut plan, pending, deadline).then_some(plan)
}
