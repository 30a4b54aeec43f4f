//! Clarke-Wright savings construction for a heterogeneous fleet.
//!
//! # Algorithm
//!
//! Every node starts as its own chain. For each ordered pair the saving of
//! serving `j` right after `i` instead of on separate trips is
//!
//! ```text
//! s(i, j) = c(i, end) + c(start, j) - c(i, j)
//! ```
//!
//! measured with vehicle 0's cost and endpoints. Chains are joined tail to
//! head in decreasing order of savings while the merged chain is feasible
//! for at least one vehicle. The chains, longest first, are then given to
//! the cheapest unused vehicle that can run them; whatever is left goes
//! through cheapest insertion. The deadline is polled before every merge
//! attempt and chain assignment.
//!
//! # Complexity
//!
//! O(n² log n + n² · V · S) where V = vehicles, S = route simulation cost.
//!
//! # Reference
//!
//! Clarke, G. & Wright, J.W. (1964). "Scheduling of Vehicles from a Central
//! Depot to a Number of Delivery Points", *Operations Research* 12(4), 568-581.

use std::cmp::Reverse;

use crate::engine::{Deadline, RouteSimulator};

use super::cheapest_insertion::insert_pending;

#[derive(Debug)]
struct Saving {
    i: usize,
    j: usize,
    value: f64,
}

/// Builds a plan with the savings heuristic.
pub(crate) fn savings(sim: &RouteSimulator<'_>, deadline: Deadline) -> Option<Vec<Vec<usize>>> {
    let model = sim.model();
    let nodes = model.visit_nodes();
    let num_vehicles = model.num_vehicles();
    let mut plan = vec![Vec::new(); num_vehicles];
    if nodes.is_empty() {
        return Some(plan);
    }
    if num_vehicles == 0 {
        return None;
    }

    let (start, end) = (model.start(0), model.end(0));
    let cost = |a: usize, b: usize| model.arc_cost(0, a, b);

    let mut savings = Vec::with_capacity(nodes.len() * nodes.len());
    for &i in &nodes {
        for &j in &nodes {
            if i == j {
                continue;
            }
            let value = cost(i, end) + cost(start, j) - cost(i, j);
            if value > 0.0 {
                savings.push(Saving { i, j, value });
            }
        }
    }
    savings.sort_by(|a, b| b.value.total_cmp(&a.value));

    let mut chains: Vec<Vec<usize>> = nodes.iter().map(|&n| vec![n]).collect();
    let mut chain_of = vec![0usize; model.num_nodes()];
    for (c, &n) in nodes.iter().enumerate() {
        chain_of[n] = c;
    }

    for saving in &savings {
        if deadline.expired() {
            return None;
        }
        let (ci, cj) = (chain_of[saving.i], chain_of[saving.j]);
        if ci == cj {
            continue;
        }
        // i must close its chain and j must open the other one
        if chains[ci].last() != Some(&saving.i) || chains[cj].first() != Some(&saving.j) {
            continue;
        }

        let merged = [chains[ci].as_slice(), chains[cj].as_slice()].concat();
        if !(0..num_vehicles).any(|v| sim.is_feasible(v, &merged)) {
            continue;
        }

        for &n in &chains[cj] {
            chain_of[n] = ci;
        }
        chains[cj].clear();
        chains[ci] = merged;
    }

    let mut chains: Vec<Vec<usize>> = chains.into_iter().filter(|c| !c.is_empty()).collect();
    chains.sort_by_key(|c| Reverse(c.len()));

    let mut used = vec![false; num_vehicles];
    let mut leftovers = Vec::new();
    for chain in chains {
        if deadline.expired() {
            return None;
        }
        let best = (0..num_vehicles)
            .filter(|&v| !used[v] && sim.is_feasible(v, &chain))
            .map(|v| (v, sim.route_cost(v, &chain)))
            .min_by(|a, b| a.1.total_cmp(&b.1));
        match best {
            Some((v, _)) => {
                used[v] = true;
                plan[v] = chain;
            }
            None => leftovers.extend(chain),
        }
    }

    insert_pending(sim, &mut plan, leftovers, deadline).then_some(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::line_model;
    use std::time::Duration;

    #[test]
    fn test_merges_line_into_one_route() {
        let m = line_model(&[0, 1, 2, 3], &[0, 10, 10, 10], &[(100, 1.0)]);
        let sim = RouteSimulator::new(&m);
        let plan = savings(&sim, Deadline::none()).expect("feasible");
        assert_eq!(plan[0].len(), 3);
        assert!((sim.plan_cost(&plan) - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_capacity_split() {
        let m = line_model(
            &[0, 1, 2, 3],
            &[0, 50, 50, 50],
            &[(100, 1.0), (100, 1.0)],
        );
        let sim = RouteSimulator::new(&m);
        let plan = savings(&sim, Deadline::none()).expect("feasible");
        let served: usize = plan.iter().map(Vec::len).sum();
        assert_eq!(served, 3);
        assert!(plan.iter().all(|r| r.len() <= 2));
    }

    #[test]
    fn test_long_chain_gets_capable_vehicle() {
        // only vehicle 1 can carry both nodes
        let m = line_model(&[0, 1, 2], &[0, 60, 60], &[(100, 1.0), (150, 2.0)]);
        let sim = RouteSimulator::new(&m);
        let plan = savings(&sim, Deadline::none()).expect("feasible");
        assert_eq!(plan[1].len() + plan[0].len(), 2);
        assert!(sim.assemble(&plan).is_some());
    }

    #[test]
    fn test_single_node() {
        let m = line_model(&[0, 5], &[0, 10], &[(100, 1.0), (100, 0.5)]);
        let sim = RouteSimulator::new(&m);
        let plan = savings(&sim, Deadline::none()).expect("feasible");
        assert_eq!(plan[1], vec![1]);
    }

    #[test]
    fn test_expired_deadline() {
        let m = line_model(&[0, 1, 2, 3], &[0, 10, 10, 10], &[(100, 1.0)]);
        let sim = RouteSimulator::new(&m);
        assert!(savings(&sim, Deadline::after(Duration::ZERO)).is_none());
    }

    #[test]
    fn test_no_vehicles() {
        let m = line_model(&[0, 5], &[0, 10], &[]);
        let sim = RouteSimulator::new(&m);
        assert!(savings(&sim, Deadline::none()).is_none());
    }
}
