//! Decomposes an engine assignment into per-route reports.

use serde::Serialize;
use tracing::warn;

use crate::engine::{Assignment, RouteStop, VehicleRoute};
use crate::error::{Result, RoutingError};
use crate::graph::NodeMapping;
use crate::models::CENTIPALLETS_PER_PALLET;
use crate::routing::{DimensionKind, RoutingModel};

/// A stop of a reported route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stop {
    /// Order delivered here, or `None` for the depot.
    pub order: Option<usize>,
    /// Routing node.
    pub node: usize,
    /// Earliest feasible time at this stop (minutes).
    pub earliest: i64,
    /// Latest feasible time at this stop (minutes).
    pub latest: i64,
}

/// Cost, distance and time of a route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RouteMetrics {
    /// Arc cost.
    pub cost: f64,
    /// Driven kilometers.
    pub distance_km: f64,
    /// Elapsed minutes.
    pub time: i64,
}

/// Report of one used vehicle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePlan {
    /// Vehicle index.
    pub vehicle: usize,
    /// Metrics including the return leg to the end node.
    pub full: RouteMetrics,
    /// Metrics up to the last delivered stop.
    pub without_return: RouteMetrics,
    /// Loaded standard pallets.
    pub pallets_used: f64,
    /// Pallet capacity in standard pallets.
    pub pallets_capacity: f64,
    /// `pallets_used / pallets_capacity`.
    pub pallet_utilization: f64,
    /// Loaded kilograms.
    pub weight_used: i64,
    /// Weight capacity in kilograms.
    pub weight_capacity: i64,
    /// `weight_used / weight_capacity`.
    pub weight_utilization: f64,
    /// Stops from start to end node.
    pub stops: Vec<Stop>,
}

impl RoutePlan {
    /// Orders delivered on this route, in visiting order.
    ///
    /// With per-vehicle endpoints a route may start or end on an order node;
    /// that order is delivered too and is listed here.
    pub fn orders(&self) -> Vec<usize> {
        self.stops.iter().filter_map(|s| s.order).collect()
    }
}

/// The decomposed network plan.
///
/// Only vehicles that serve at least one order get a [`RoutePlan`]; the rest
/// are listed in `idle_vehicles`. An idle vehicle never leaves its start, so
/// an order node used only as an idle vehicle's endpoint is not delivered and
/// appears in `undelivered_orders`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkPlan {
    /// Sum of route costs including return legs.
    pub total_cost: f64,
    /// Sum of route costs excluding return legs.
    pub total_cost_without_return: f64,
    /// Used vehicles, by vehicle index.
    pub routes: Vec<RoutePlan>,
    /// Vehicles that stay at their start node.
    pub idle_vehicles: Vec<usize>,
    /// Orders on no route; only endpoint orders of idle vehicles end up here.
    pub undelivered_orders: Vec<usize>,
}

impl NetworkPlan {
    /// Number of used vehicles.
    pub fn num_routes(&self) -> usize {
        self.routes.len()
    }

    /// Route of a vehicle, if it is used.
    pub fn route_of(&self, vehicle: usize) -> Option<&RoutePlan> {
        self.routes.iter().find(|r| r.vehicle == vehicle)
    }
}

/// Reads cumuls and costs off an assignment.
///
/// Routes with no visited node (two stops) are dropped and reported as idle.
/// Stops on the depot node carry `order: None`. An assignment referring to
/// vehicles or nodes outside the model is rejected.
///
/// # Examples
///
/// ```
/// use u_fleet_routing::distance::ArcMatrix;
/// use u_fleet_routing::engine::{FirstSolutionStrategy, HeuristicEngine, RoutingEngine, SearchParameters};
/// use u_fleet_routing::graph::NodeMapping;
/// use u_fleet_routing::routing::RoutingModel;
/// use u_fleet_routing::solution::decompose;
///
/// let distance = ArcMatrix::from_data(2, vec![0, 10_000, 10_000, 0]).unwrap();
/// let time = ArcMatrix::from_data(2, vec![0, 15, 15, 0]).unwrap();
/// let model = RoutingModel::builder(distance, time)
///     .pallet_demands(vec![0, 150])
///     .weight_demands(vec![0, 400])
///     .window(1, 0, 60)
///     .vehicle(300, 1000, 2.0, 100_000)
///     .vehicle(300, 1000, 3.0, 100_000)
///     .build()
///     .unwrap();
/// let params = SearchParameters::new(FirstSolutionStrategy::Savings);
/// let assignment = HeuristicEngine::default().solve(&model, &params).unwrap();
///
/// let plan = decompose(&model, &NodeMapping::new(vec![0, 1]), &assignment).unwrap();
/// assert_eq!(plan.idle_vehicles, vec![1]);
/// let route = &plan.routes[0];
/// assert!((route.full.cost - 40.0).abs() < 1e-9);
/// assert!((route.without_return.cost - 20.0).abs() < 1e-9);
/// assert!((route.pallet_utilization - 0.5).abs() < 1e-9);
/// assert_eq!(route.orders(), vec![0]);
/// ```
pub fn decompose(
    model: &RoutingModel,
    mapping: &NodeMapping,
    assignment: &Assignment,
) -> Result<NetworkPlan> {
    let mut routes = Vec::new();
    let mut idle_vehicles = Vec::new();

    for route in assignment.routes() {
        validate(model, route)?;
        if route.is_idle() {
            idle_vehicles.push(route.vehicle());
        } else {
            routes.push(route_plan(model, mapping, route));
        }
    }

    let mut delivered = vec![false; mapping.num_orders()];
    for order in routes.iter().flat_map(RoutePlan::orders) {
        if let Some(slot) = delivered.get_mut(order) {
            *slot = true;
        }
    }
    let undelivered_orders: Vec<usize> = (0..mapping.num_orders())
        .filter(|&order| !delivered[order])
        .collect();
    if !undelivered_orders.is_empty() {
        warn!(
            orders = ?undelivered_orders,
            "orders only serve as endpoints of idle vehicles"
        );
    }

    Ok(NetworkPlan {
        total_cost: routes.iter().map(|r| r.full.cost).sum(),
        total_cost_without_return: routes.iter().map(|r| r.without_return.cost).sum(),
        routes,
        idle_vehicles,
        undelivered_orders,
    })
}

fn validate(model: &RoutingModel, route: &VehicleRoute) -> Result<()> {
    if route.vehicle() >= model.num_vehicles() {
        return Err(RoutingError::InvalidIndex {
            kind: "vehicle",
            index: route.vehicle(),
            len: model.num_vehicles(),
        });
    }
    if let Some(stop) = route.stops().iter().find(|s| s.node() >= model.num_nodes()) {
        return Err(RoutingError::InvalidIndex {
            kind: "node",
            index: stop.node(),
            len: model.num_nodes(),
        });
    }
    Ok(())
}

fn route_plan(model: &RoutingModel, mapping: &NodeMapping, route: &VehicleRoute) -> RoutePlan {
    let vehicle = route.vehicle();
    let stops = route.stops();
    let end = &stops[stops.len() - 1];
    let last = &stops[stops.len() - 2];

    let return_cost = model.arc_cost(vehicle, last.node(), end.node());
    let metrics_at = |stop: &RouteStop, cost: f64| RouteMetrics {
        cost,
        distance_km: stop.cumul(DimensionKind::Distance).min as f64 / 1000.0,
        time: stop.cumul(DimensionKind::Time).min,
    };

    let pallets = end.cumul(DimensionKind::Pallets).min;
    let pallet_capacity = model.dimension(DimensionKind::Pallets).capacity(vehicle);
    let weight = end.cumul(DimensionKind::Weight).min;
    let weight_capacity = model.dimension(DimensionKind::Weight).capacity(vehicle);

    RoutePlan {
        vehicle,
        full: metrics_at(end, route.cost()),
        without_return: metrics_at(last, route.cost() - return_cost),
        pallets_used: pallets as f64 / CENTIPALLETS_PER_PALLET,
        pallets_capacity: pallet_capacity as f64 / CENTIPALLETS_PER_PALLET,
        pallet_utilization: ratio(pallets, pallet_capacity),
        weight_used: weight,
        weight_capacity,
        weight_utilization: ratio(weight, weight_capacity),
        stops: stops
            .iter()
            .map(|s| {
                let time = s.cumul(DimensionKind::Time);
                Stop {
                    order: mapping.order_of_node(s.node()),
                    node: s.node(),
                    earliest: time.min,
                    latest: time.max,
                }
            })
            .collect(),
    }
}

fn ratio(used: i64, capacity: i64) -> f64 {
    if capacity > 0 {
        used as f64 / capacity as f64
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::ArcMatrix;
    use crate::engine::RouteSimulator;
    use crate::routing::{DepotTopology, VehicleEndpoints};

    fn model() -> RoutingModel {
        // depot, two orders at the same location 5 km away
        let d = ArcMatrix::from_data(3, vec![0, 5000, 5000, 5000, 0, 0, 5000, 0, 0]).expect("valid");
        let t = ArcMatrix::from_data(3, vec![0, 20, 20, 20, 0, 0, 20, 0, 0]).expect("valid");
        RoutingModel::builder(d, t)
            .pallet_demands(vec![0, 250, 100])
            .weight_demands(vec![0, 900, 300])
            .window(1, 30, 120)
            .window(2, 0, 120)
            .vehicle(500, 2400, 2.0, 100_000)
            .vehicle(1500, 8700, 2.45, 1_000_000)
            .build()
            .expect("valid")
    }

    fn mapping() -> NodeMapping {
        NodeMapping::new(vec![0, 1, 1])
    }

    #[test]
    fn test_route_report() {
        let m = model();
        let a = RouteSimulator::new(&m)
            .assemble(&[vec![1, 2], vec![]])
            .expect("feasible");
        let plan = decompose(&m, &mapping(), &a).expect("valid");

        assert_eq!(plan.num_routes(), 1);
        assert_eq!(plan.idle_vehicles, vec![1]);
        let r = plan.route_of(0).expect("used");
        assert!((r.full.cost - 20.0).abs() < 1e-9);
        assert!((r.full.distance_km - 10.0).abs() < 1e-9);
        assert_eq!(r.full.time, 50);
        assert!((r.without_return.cost - 10.0).abs() < 1e-9);
        assert!((r.without_return.distance_km - 5.0).abs() < 1e-9);
        assert_eq!(r.without_return.time, 30);
        assert!((r.pallets_used - 3.5).abs() < 1e-9);
        assert!((r.pallets_capacity - 5.0).abs() < 1e-9);
        assert!((r.pallet_utilization - 0.7).abs() < 1e-9);
        assert_eq!(r.weight_used, 1200);
        assert!((r.weight_utilization - 0.5).abs() < 1e-9);
        assert_eq!(r.orders(), vec![0, 1]);
    }

    #[test]
    fn test_stops_carry_window_range() {
        let m = model();
        let a = RouteSimulator::new(&m)
            .assemble(&[vec![1, 2], vec![]])
            .expect("feasible");
        let plan = decompose(&m, &mapping(), &a).expect("valid");
        let stops = &plan.routes[0].stops;
        assert_eq!(stops.len(), 4);
        assert_eq!(stops[0].order, None);
        assert_eq!(stops[3].order, None);
        assert_eq!(stops[1].order, Some(0));
        assert_eq!((stops[1].earliest, stops[1].latest), (30, 100));
    }

    #[test]
    fn test_totals() {
        let m = model();
        let a = RouteSimulator::new(&m)
            .assemble(&[vec![1], vec![2]])
            .expect("feasible");
        let plan = decompose(&m, &mapping(), &a).expect("valid");
        assert_eq!(plan.num_routes(), 2);
        assert!((plan.total_cost - (20.0 + 24.5)).abs() < 1e-9);
        assert!((plan.total_cost_without_return - (10.0 + 12.25)).abs() < 1e-9);
        assert!((plan.total_cost - a.objective()).abs() < 1e-9);
    }

    #[test]
    fn test_all_idle() {
        let m = model();
        let a = RouteSimulator::new(&m)
            .assemble(&[vec![], vec![]])
            .expect("feasible");
        let plan = decompose(&m, &mapping(), &a).expect("valid");
        assert!(plan.routes.is_empty());
        assert_eq!(plan.idle_vehicles, vec![0, 1]);
        assert_eq!(plan.total_cost, 0.0);
        assert_eq!(plan.undelivered_orders, vec![0, 1]);
    }

    fn ending_at_order() -> RoutingModel {
        let d = ArcMatrix::from_data(3, vec![0, 3000, 4000, 3000, 0, 2000, 4000, 2000, 0])
            .expect("valid");
        let t = ArcMatrix::from_data(3, vec![0, 10, 10, 10, 0, 10, 10, 10, 0]).expect("valid");
        RoutingModel::builder(d, t)
            .pallet_demands(vec![0, 100, 100])
            .window(1, 0, 100)
            .window(2, 0, 100)
            .vehicle(500, 1000, 1.0, 100_000)
            .vehicle(500, 1000, 1.0, 100_000)
            .topology(DepotTopology::MultiDepot {
                endpoints: vec![
                    VehicleEndpoints { vehicle: 0, start: 0, end: 0 },
                    VehicleEndpoints { vehicle: 1, start: 0, end: 2 },
                ],
            })
            .build()
            .expect("valid")
    }

    #[test]
    fn test_order_endpoint_is_reported() {
        let m = ending_at_order();
        let a = RouteSimulator::new(&m)
            .assemble(&[vec![], vec![1]])
            .expect("feasible");
        let plan = decompose(&m, &NodeMapping::new(vec![0, 1, 2]), &a).expect("valid");
        let r = plan.route_of(1).expect("used");
        assert_eq!(r.orders(), vec![0, 1]);
        assert_eq!(r.stops.last().map(|s| s.order), Some(Some(1)));
        assert!((r.full.cost - 5.0).abs() < 1e-9);
        assert!((r.without_return.cost - 3.0).abs() < 1e-9);
        assert!(plan.undelivered_orders.is_empty());
    }

    #[test]
    fn test_idle_order_endpoint_is_undelivered() {
        let m = ending_at_order();
        let a = RouteSimulator::new(&m)
            .assemble(&[vec![1], vec![]])
            .expect("feasible");
        let plan = decompose(&m, &NodeMapping::new(vec![0, 1, 2]), &a).expect("valid");
        assert_eq!(plan.idle_vehicles, vec![1]);
        assert_eq!(plan.undelivered_orders, vec![1]);
    }

    #[test]
    fn test_foreign_assignment_rejected() {
        let m = model();
        let a = Assignment::new(vec![VehicleRoute::new(7, Vec::new(), 0.0)]);
        assert!(matches!(
            decompose(&m, &mapping(), &a),
            Err(RoutingError::InvalidIndex { kind: "vehicle", .. })
        ));
    }

    #[test]
    fn test_serializes() {
        let m = model();
        let a = RouteSimulator::new(&m)
            .assemble(&[vec![2], vec![]])
            .expect("feasible");
        let plan = decompose(&m, &mapping(), &a).expect("valid");
        let json = serde_json::to_value(&plan).expect("serializable");
        assert_eq!(json["routes"][0]["stops"][1]["order"], 1);
        assert!(json["routes"][0]["stops"][0]["order"].is_null());
    }
}
