//! Multi-strategy selection.

use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::SolveConfig;
use crate::engine::{FirstSolutionStrategy, HeuristicEngine, RoutingEngine};
use crate::error::Result;
use crate::input::InstanceDocument;
use crate::solution::{decompose, NetworkPlan};

use super::Instance;

/// Cost of one strategy run; `f64::INFINITY` when it found no solution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StrategyRun {
    /// Strategy used.
    pub strategy: FirstSolutionStrategy,
    /// Total network cost including return legs.
    pub total_cost: f64,
}

impl StrategyRun {
    /// Returns `true` if the run produced a solution.
    pub fn is_feasible(&self) -> bool {
        self.total_cost.is_finite()
    }
}

/// Final result of a multi-strategy solve.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// No orders or no vehicles; no strategy was run.
    NothingToSolve,
    /// Every strategy failed to find a feasible assignment.
    Infeasible {
        /// Strategies that were tried.
        attempted: Vec<FirstSolutionStrategy>,
    },
    /// The cheapest feasible plan.
    Solved {
        /// Strategy that produced the plan.
        strategy: FirstSolutionStrategy,
        /// The plan.
        plan: NetworkPlan,
    },
}

/// Outcome plus the cost of every run, in strategy order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    /// Final outcome.
    pub outcome: Outcome,
    /// One entry per strategy, in the configured order.
    pub runs: Vec<StrategyRun>,
}

impl Selection {
    /// The selected plan, if any strategy succeeded.
    pub fn plan(&self) -> Option<&NetworkPlan> {
        match &self.outcome {
            Outcome::Solved { plan, .. } => Some(plan),
            _ => None,
        }
    }

    /// The winning strategy, if any.
    pub fn strategy(&self) -> Option<FirstSolutionStrategy> {
        match &self.outcome {
            Outcome::Solved { strategy, .. } => Some(*strategy),
            _ => None,
        }
    }

    /// Total cost of the selected plan, or `f64::INFINITY`.
    pub fn total_cost(&self) -> f64 {
        self.plan().map_or(f64::INFINITY, |p| p.total_cost)
    }
}

/// Loads the document and solves it with the built-in [`HeuristicEngine`].
///
/// # Examples
///
/// ```
/// use u_fleet_routing::config::SolveConfig;
/// use u_fleet_routing::input::InstanceDocument;
/// use u_fleet_routing::pipeline::solve_document;
///
/// let doc = InstanceDocument::from_json_str(r#"{
///     "locations": [
///         { "index": 0, "id": "DC", "is_depot": true,
///           "travel": [{ "to": "A", "km": 10.0, "minutes": 15 }] },
///         { "index": 1, "id": "A",
///           "travel": [{ "to": "DC", "km": 10.0, "minutes": 15 }] }
///     ],
///     "orders": [
///         { "index": 0, "location_to": "A", "pallet_type": 0,
///           "pallet_quantity": 2, "weight_per_pallet": 300,
///           "delivery_start": 0, "delivery_end": 480 }
///     ],
///     "pallet_types": [{ "index": 0, "ratio_to_std_pallet": 1.0 }],
///     "standard_pallet": { "index": 0, "ratio_to_std_pallet": 1.0 },
///     "vehicles": [
///         { "index": 0, "capacity_in_std_pallets": 18, "max_weight": 12000,
///           "cost_per_km": 2.0, "max_km": 600 }
///     ]
/// }"#).unwrap();
///
/// let selection = solve_document(&doc, &SolveConfig::default()).unwrap();
/// assert!((selection.total_cost() - 40.0).abs() < 1e-9);
/// assert_eq!(selection.runs.len(), 2);
/// ```
pub fn solve_document(doc: &InstanceDocument, config: &SolveConfig) -> Result<Selection> {
    solve_document_with(doc, config, &HeuristicEngine::default())
}

/// Loads the document and solves it with the given engine.
pub fn solve_document_with<E>(doc: &InstanceDocument, config: &SolveConfig, engine: &E) -> Result<Selection>
where
    E: RoutingEngine + ?Sized,
{
    config.validate()?;
    let instance = Instance::build(doc)?;
    solve_instance(&instance, config, engine)
}

/// Runs every configured strategy on a loaded instance and keeps the
/// cheapest plan.
///
/// Input or model errors abort the batch; infeasibility of a strategy does
/// not.
pub fn solve_instance<E>(instance: &Instance, config: &SolveConfig, engine: &E) -> Result<Selection>
where
    E: RoutingEngine + ?Sized,
{
    config.validate()?;
    if instance.is_trivial() {
        info!(
            orders = instance.num_orders(),
            vehicles = instance.fleet().len(),
            "nothing to solve"
        );
        return Ok(Selection {
            outcome: Outcome::NothingToSolve,
            runs: Vec::new(),
        });
    }

    let results: Vec<Result<Option<NetworkPlan>>> = if config.parallel {
        config
            .strategies
            .par_iter()
            .map(|&s| run_strategy(instance, config, engine, s))
            .collect()
    } else {
        config
            .strategies
            .iter()
            .map(|&s| run_strategy(instance, config, engine, s))
            .collect()
    };

    let results = config
        .strategies
        .iter()
        .copied()
        .zip(results)
        .map(|(s, r)| r.map(|plan| (s, plan)))
        .collect::<Result<Vec<_>>>()?;

    Ok(select_cheapest(results))
}

/// Builds a model, solves it with one strategy and decomposes the result.
///
/// Returns `Ok(None)` when the engine finds no feasible assignment.
pub fn run_strategy<E>(
    instance: &Instance,
    config: &SolveConfig,
    engine: &E,
    strategy: FirstSolutionStrategy,
) -> Result<Option<NetworkPlan>>
where
    E: RoutingEngine + ?Sized,
{
    let model = instance.model(config)?;
    let params = config.search_parameters(strategy);

    let Some(assignment) = engine.solve(&model, &params) else {
        warn!(%strategy, "no feasible solution found");
        return Ok(None);
    };

    let plan = decompose(&model, instance.nodes().mapping(), &assignment)?;
    info!(
        %strategy,
        total_cost = plan.total_cost,
        total_cost_without_return = plan.total_cost_without_return,
        routes = plan.num_routes(),
        idle = plan.idle_vehicles.len(),
        "strategy solved"
    );
    Ok(Some(plan))
}

/// Picks the cheapest plan; ties keep the first in input order.
pub fn select_cheapest(results: Vec<(FirstSolutionStrategy, Option<NetworkPlan>)>) -> Selection {
    let runs: Vec<StrategyRun> = results
        .iter()
        .map(|(strategy, plan)| StrategyRun {
            strategy: *strategy,
            total_cost: plan.as_ref().map_or(f64::INFINITY, |p| p.total_cost),
        })
        .collect();

    let mut best: Option<(FirstSolutionStrategy, NetworkPlan)> = None;
    for (strategy, plan) in results {
        let Some(plan) = plan else { continue };
        if best
            .as_ref()
            .is_none_or(|(_, b)| plan.total_cost < b.total_cost)
        {
            best = Some((strategy, plan));
        }
    }

    let outcome = match best {
        Some((strategy, plan)) => {
            info!(%strategy, total_cost = plan.total_cost, "strategy selected");
            Outcome::Solved { strategy, plan }
        }
        None => {
            warn!(strategies = runs.len(), "no strategy found a feasible solution");
            Outcome::Infeasible {
                attempted: runs.iter().map(|r| r.strategy).collect(),
            }
        }
    };

    Selection { outcome, runs }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Assignment, SearchParameters};
    use crate::pipeline::fixtures;
    use crate::routing::RoutingModel;

    fn plan(cost: f64) -> NetworkPlan {
        NetworkPlan {
            total_cost: cost,
            total_cost_without_return: cost / 2.0,
            routes: Vec::new(),
            idle_vehicles: Vec::new(),
            undelivered_orders: Vec::new(),
        }
    }

    fn sequential() -> SolveConfig {
        SolveConfig::default()
            .with_parallel(false)
            .with_max_lns_iterations(50)
            .with_time_limit_ms(30_000)
    }

    #[test]
    fn test_select_cheapest_ties_keep_first() {
        let s = select_cheapest(vec![
            (FirstSolutionStrategy::Savings, Some(plan(10.0))),
            (FirstSolutionStrategy::Automatic, Some(plan(10.0))),
            (FirstSolutionStrategy::PathCheapestArc, Some(plan(12.0))),
        ]);
        assert_eq!(s.strategy(), Some(FirstSolutionStrategy::Savings));
        assert_eq!(s.runs.len(), 3);
    }

    #[test]
    fn test_select_cheapest_skips_infeasible() {
        let s = select_cheapest(vec![
            (FirstSolutionStrategy::Savings, None),
            (FirstSolutionStrategy::Automatic, Some(plan(15.0))),
        ]);
        assert_eq!(s.strategy(), Some(FirstSolutionStrategy::Automatic));
        assert!(!s.runs[0].is_feasible());
        assert_eq!(s.runs[0].total_cost, f64::INFINITY);
        assert!((s.total_cost() - 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_select_cheapest_all_infeasible() {
        let s = select_cheapest(vec![
            (FirstSolutionStrategy::Savings, None),
            (FirstSolutionStrategy::Automatic, None),
        ]);
        assert_eq!(
            s.outcome,
            Outcome::Infeasible {
                attempted: vec![FirstSolutionStrategy::Savings, FirstSolutionStrategy::Automatic]
            }
        );
        assert!(s.plan().is_none());
    }

    #[test]
    fn test_solve_sample_document() {
        let s = solve_document(&fixtures::document(), &sequential()).expect("valid");
        let plan = s.plan().expect("solved");
        let mut orders: Vec<usize> = plan.routes.iter().flat_map(|r| r.orders()).collect();
        orders.sort_unstable();
        assert_eq!(orders, vec![0, 1, 2]);
        assert!(s.runs.iter().all(StrategyRun::is_feasible));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let doc = fixtures::document();
        let a = solve_document(&doc, &sequential()).expect("valid");
        let b = solve_document(&doc, &sequential().with_parallel(true)).expect("valid");
        assert_eq!(a.runs, b.runs);
        assert_eq!(a.strategy(), b.strategy());
    }

    #[test]
    fn test_nothing_to_solve() {
        let mut doc = fixtures::document();
        doc.orders.clear();
        let s = solve_document(&doc, &sequential()).expect("valid");
        assert_eq!(s.outcome, Outcome::NothingToSolve);
        assert!(s.runs.is_empty());
    }

    #[test]
    fn test_empty_strategy_list_rejected() {
        let config = sequential().with_strategies(Vec::new());
        assert!(solve_document(&fixtures::document(), &config).is_err());
    }

    struct Refusing;

    impl RoutingEngine for Refusing {
        fn solve(&self, _model: &RoutingModel, _params: &SearchParameters) -> Option<Assignment> {
            None
        }
    }

    #[test]
    fn test_custom_engine_infeasible() {
        let s = solve_document_with(&fixtures::document(), &sequential(), &Refusing).expect("valid");
        assert!(matches!(s.outcome, Outcome::Infeasible { .. }));
        assert_eq!(s.runs.len(), 2);
    }

    #[test]
    fn test_dyn_engine() {
        let engine: Box<dyn RoutingEngine> = Box::new(HeuristicEngine::default());
        let s = solve_document_with(&fixtures::document(), &sequential(), engine.as_ref())
            .expect("valid");
        assert!(s.plan().is_some());
    }
}
