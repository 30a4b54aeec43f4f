//! Relocate and 2-opt descent over a feasible plan.
//!
//! # Operators
//!
//! - **2-opt** (Croes, 1958): reverses a segment `[i..=j]` inside one route,
//!   first improvement.
//! - **Relocate** (Or, 1976): moves one node to another vehicle's route,
//!   idle vehicles included, best improvement.
//!
//! Costs are evaluated per vehicle, so moving a node to a cheaper vehicle is
//! an improvement even when the geometry is unchanged. Every accepted move
//! keeps all routes feasible. Moves must improve by more than `1e-10`.

use tracing::trace;

use super::{Deadline, RouteSimulator};

const EPSILON: f64 = 1e-10;

#[derive(Debug, Clone)]
struct RelocateMove {
    from_vehicle: usize,
    from_pos: usize,
    to_vehicle: usize,
    to_pos: usize,
    delta: f64,
}

/// Runs 2-opt and relocate until no improving move remains or the deadline
/// passes. Returns the number of applied moves.
pub(crate) fn improve(sim: &RouteSimulator<'_>, plan: &mut [Vec<usize>], deadline: Deadline) -> usize {
    let mut moves = 0;
    loop {
        if deadline.expired() {
            break;
        }
        let mut improved = false;

        for (vehicle, route) in plan.iter_mut().enumerate() {
            let applied = two_opt(sim, vehicle, route, deadline);
            moves += applied;
            improved |= applied > 0;
        }

        if let Some(mv) = find_best_relocate(sim, plan, deadline) {
            let node = plan[mv.from_vehicle].remove(mv.from_pos);
            plan[mv.to_vehicle].insert(mv.to_pos, node);
            trace!(
                node,
                from = mv.from_vehicle,
                to = mv.to_vehicle,
                delta = mv.delta,
                "relocate applied"
            );
            moves += 1;
            improved = true;
        }

        if !improved {
            break;
        }
    }
    moves
}

/// First-improvement 2-opt on one route. Returns the number of reversals.
fn two_opt(sim: &RouteSimulator<'_>, vehicle: usize, route: &mut Vec<usize>, deadline: Deadline) -> usize {
    if route.len() < 2 {
        return 0;
    }
    let mut applied = 0;
    let mut current_cost = sim.route_cost(vehicle, route);
    let mut improved = true;

    while improved && !deadline.expired() {
        improved = false;
        let n = route.len();
        for i in 0..n - 1 {
            for j in i + 1..n {
                let mut candidate = route.clone();
                candidate[i..=j].reverse();
                let cost = sim.route_cost(vehicle, &candidate);
                if cost < current_cost - EPSILON && sim.is_feasible(vehicle, &candidate) {
                    trace!(vehicle, i, j, delta = cost - current_cost, "2-opt applied");
                    *route = candidate;
                    current_cost = cost;
                    applied += 1;
                    improved = true;
                }
            }
        }
    }
    applied
}

fn find_best_relocate(
    sim: &RouteSimulator<'_>,
    plan: &[Vec<usize>],
    deadline: Deadline,
) -> Option<RelocateMove> {
    let costs: Vec<f64> = plan
        .iter()
        .enumerate()
        .map(|(v, r)| sim.route_cost(v, r))
        .collect();
    let mut best: Option<RelocateMove> = None;

    for (from_vehicle, from_route) in plan.iter().enumerate() {
        if deadline.expired() {
            break;
        }
        for from_pos in 0..from_route.len() {
            let node = from_route[from_pos];
            let mut shortened = from_route.clone();
            shortened.remove(from_pos);
            let removal_delta = sim.route_cost(from_vehicle, &shortened) - costs[from_vehicle];
            let mut shortened_feasible: Option<bool> = None;

            for (to_vehicle, to_route) in plan.iter().enumerate() {
                if to_vehicle == from_vehicle {
                    continue;
                }
                for to_pos in 0..=to_route.len() {
                    let mut extended = to_route.clone();
                    extended.insert(to_pos, node);
                    let delta = removal_delta + sim.route_cost(to_vehicle, &extended)
                        - costs[to_vehicle];

                    if delta >= -EPSILON || best.as_ref().is_some_and(|b| delta >= b.delta) {
                        continue;
                    }
                    if !sim.is_feasible(to_vehicle, &extended) {
                        continue;
                    }
                    let from_ok = *shortened_feasible
                        .get_or_insert_with(|| sim.is_feasible(from_vehicle, &shortened));
                    if !from_ok {
                        continue;
                    }
                    best = Some(RelocateMove {
                        from_vehicle,
                        from_pos,
                        to_vehicle,
                        to_pos,
                        delta,
                    });
                }
            }
        }
    }

    best
}
