//! Route simulation over all model dimensions.
//!
//! For a vehicle and an ordered list of visited nodes, the simulator walks
//! `start → visits → end`, propagating every dimension's cumul as an interval
//! `[min, max]`:
//!
//! ```text
//! forward:  min[k+1] = max(min[k] + t, 0, range.start)
//!           max[k+1] = min(max[k] + t + slack, capacity, range.end)
//! backward: max[k]   = min(max[k], max[k+1] - t)
//!           min[k]   = max(min[k], min[k+1] - t - slack)
//! ```
//!
//! A route is feasible iff no interval becomes empty and every arc is allowed.
//! After the backward pass `[min, max]` is exactly the set of cumul values
//! some feasible schedule can realize at that stop.

use crate::routing::{Dimension, DimensionKind, RoutingModel};

use super::{Assignment, CumulValue, RouteStop, VehicleRoute};

/// Evaluates candidate routes against a [`RoutingModel`].
///
/// # Examples
///
/// ```
/// use u_fleet_routing::distance::ArcMatrix;
/// use u_fleet_routing::engine::RouteSimulator;
/// use u_fleet_routing::routing::{DimensionKind, RoutingModel};
///
/// let distance = ArcMatrix::from_data(3, vec![0, 1000, 2000, 1000, 0, 1000, 2000, 1000, 0]).unwrap();
/// let time = ArcMatrix::from_data(3, vec![0, 10, 20, 10, 0, 10, 20, 10, 0]).unwrap();
/// let model = RoutingModel::builder(distance, time)
///     .pallet_demands(vec![0, 100, 100])
///     .weight_demands(vec![0, 10, 10])
///     .window(1, 0, 100)
///     .window(2, 50, 100)
///     .vehicle(200, 100, 1.0, 10_000)
///     .build()
///     .unwrap();
///
/// let sim = RouteSimulator::new(&model);
/// let route = sim.simulate(0, &[1, 2]).unwrap();
/// assert!((route.cost() - 4.0).abs() < 1e-9);
/// let arrival = route.stops()[2].cumul(DimensionKind::Time);
/// assert_eq!(arrival.min, 50);
/// assert!(sim.simulate(0, &[2, 1]).is_some());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RouteSimulator<'a> {
    model: &'a RoutingModel,
}

impl<'a> RouteSimulator<'a> {
    /// Creates a simulator for the model.
    pub fn new(model: &'a RoutingModel) -> Self {
        Self { model }
    }

    /// The simulated model.
    pub fn model(&self) -> &'a RoutingModel {
        self.model
    }

    /// Full node sequence `start, visits.., end` of a vehicle.
    pub fn path(&self, vehicle: usize, visits: &[usize]) -> Vec<usize> {
        let mut path = Vec::with_capacity(visits.len() + 2);
        path.push(self.model.start(vehicle));
        path.extend_from_slice(visits);
        path.push(self.model.end(vehicle));
        path
    }

    /// Arc cost of a route; an idle route costs nothing.
    pub fn route_cost(&self, vehicle: usize, visits: &[usize]) -> f64 {
        if visits.is_empty() {
            return 0.0;
        }
        self.path(vehicle, visits)
            .windows(2)
            .map(|arc| self.model.arc_cost(vehicle, arc[0], arc[1]))
            .sum()
    }

    /// Total arc cost of a plan (visits per vehicle).
    pub fn plan_cost(&self, plan: &[Vec<usize>]) -> f64 {
        plan.iter()
            .enumerate()
            .map(|(v, visits)| self.route_cost(v, visits))
            .sum()
    }

    /// Returns `true` if the route satisfies every arc and dimension constraint.
    pub fn is_feasible(&self, vehicle: usize, visits: &[usize]) -> bool {
        self.propagate(vehicle, visits).is_some()
    }

    /// Simulates a route, returning its stops with realized cumuls, or `None`
    /// if it is infeasible.
    pub fn simulate(&self, vehicle: usize, visits: &[usize]) -> Option<VehicleRoute> {
        let cumuls = self.propagate(vehicle, visits)?;
        let stops = self
            .path(vehicle, visits)
            .into_iter()
            .zip(cumuls)
            .map(|(node, c)| RouteStop::new(node, c))
            .collect();
        Some(VehicleRoute::new(
            vehicle,
            stops,
            self.route_cost(vehicle, visits),
        ))
    }

    /// Turns a plan into an assignment, or `None` if any route is infeasible.
    pub fn assemble(&self, plan: &[Vec<usize>]) -> Option<Assignment> {
        let routes = plan
            .iter()
            .enumerate()
            .map(|(v, visits)| self.simulate(v, visits))
            .collect::<Option<Vec<_>>>()?;
        Some(Assignment::new(routes))
    }

    fn propagate(&self, vehicle: usize, visits: &[usize]) -> Option<Vec<[CumulValue; 4]>> {
        let path = self.path(vehicle, visits);
        if visits.is_empty() {
            return Some(vec![[CumulValue::fixed(0); 4]; path.len()]);
        }
        if path
            .windows(2)
            .any(|arc| !self.model.is_arc_allowed(arc[0], arc[1]))
        {
            return None;
        }

        let mut cumuls = vec![[CumulValue::default(); 4]; path.len()];
        for kind in DimensionKind::ALL {
            let ranges = propagate_dimension(self.model.dimension(kind), vehicle, &path)?;
            for (stop, range) in cumuls.iter_mut().zip(ranges) {
                stop[kind.index()] = range;
            }
        }
        Some(cumuls)
    }
}

fn propagate_dimension(dim: &Dimension, vehicle: usize, path: &[usize]) -> Option<Vec<CumulValue>> {
    let capacity = dim.capacity(vehicle);
    let slack = dim.slack_max();
    let clamp = |node: usize, min: i64, max: i64| -> Option<CumulValue> {
        let (min, max) = match dim.cumul_range(node) {
            Some(range) => (min.max(range.start()), max.min(range.end())),
            None => (min, max),
        };
        (min <= max).then_some(CumulValue { min, max })
    };

    let start_max = if dim.fixes_start_cumul() { 0 } else { capacity };
    let mut ranges = Vec::with_capacity(path.len());
    ranges.push(clamp(path[0], 0, start_max.min(capacity))?);

    for arc in path.windows(2) {
        let prev = ranges[ranges.len() - 1];
        let transit = dim.transit(arc[0], arc[1]);
        let min = prev.min.saturating_add(transit).max(0);
        let max = prev
            .max
            .saturating_add(transit)
            .saturating_add(slack)
            .min(capacity);
        ranges.push(clamp(arc[1], min, max)?);
    }

    for k in (0..path.len() - 1).rev() {
        let transit = dim.transit(path[k], path[k + 1]);
        let next = ranges[k + 1];
        let cur = &mut ranges[k];
        cur.max = cur.max.min(next.max.saturating_sub(transit));
        cur.min = cur
            .min
            .max(next.min.saturating_sub(transit).saturating_sub(slack));
    }

    Some(ranges)
}
