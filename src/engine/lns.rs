//! Large neighbourhood search: random removal + cheapest reinsertion.
//!
//! Each iteration removes a random 10–40% of the served nodes from the best
//! plan and reinserts them with cheapest feasible insertion. The result
//! replaces the best plan only if it is fully feasible and strictly cheaper.
//! The RNG is seeded, so runs that stop on the iteration cap are
//! reproducible.
//!
//! # Reference
//!
//! Ropke, S. & Pisinger, D. (2006). "An Adaptive Large Neighborhood Search
//! Heuristic for the Pickup and Delivery Problem with Time Windows",
//! *Transportation Science* 40(4), 455-472.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

use super::construction::insert_pending;
use super::{Deadline, RouteSimulator};

const MIN_DEGREE: f64 = 0.1;
const MAX_DEGREE: f64 = 0.4;

/// Improves `plan` until the iteration cap or the deadline is reached.
pub(crate) fn search(
    sim: &RouteSimulator<'_>,
    plan: Vec<Vec<usize>>,
    seed: u64,
    max_iterations: usize,
    deadline: Deadline,
) -> Vec<Vec<usize>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut best_cost = sim.plan_cost(&plan);
    let mut best = plan;

    for iteration in 0..max_iterations {
        if deadline.expired() {
            break;
        }
        let mut candidate = best.clone();
        let degree = rng.random_range(MIN_DEGREE..=MAX_DEGREE);
        let removed = random_removal(&mut candidate, degree, &mut rng);
        if removed.is_empty() {
            break;
        }
        if !insert_pending(sim, &mut candidate, removed, deadline) {
            continue;
        }

        let cost = sim.plan_cost(&candidate);
        if cost < best_cost - 1e-10
            && candidate
                .iter()
                .enumerate()
                .all(|(v, route)| sim.is_feasible(v, route))
        {
            trace!(iteration, cost, previous = best_cost, "lns improvement");
            best = candidate;
            best_cost = cost;
        }
    }

    best
}

/// Removes `round(served × degree)` random nodes (at least one) from the
/// plan and returns them in removal order.
fn random_removal<R: Rng>(plan: &mut [Vec<usize>], degree: f64, rng: &mut R) -> Vec<usize> {
    let served: usize = plan.iter().map(Vec::len).sum();
    let num_remove = ((served as f64 * degree).round() as usize).clamp(1, served.max(1));
    let mut removed = Vec::with_capacity(num_remove);

    for _ in 0..num_remove {
        let assigned: usize = plan.iter().map(Vec::len).sum();
        if assigned == 0 {
            break;
        }
        let mut target = rng.random_range(0..assigned);
        for route in plan.iter_mut() {
            if target < route.len() {
                removed.push(route.remove(target));
                break;
            }
            target -= route.len();
        }
    }

    removed
}
