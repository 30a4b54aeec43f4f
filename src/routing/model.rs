//! Routing model assembly.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::distance::ArcMatrix;
use crate::error::{Result, RoutingError};
use crate::graph::NodeGraph;
use crate::models::{Fleet, NodeDemands};

use super::dimension::{Dimension, DimensionKind, TransitFn};
use super::topology::DepotTopology;

/// Arc cost evaluator of one vehicle: `(from_node, to_node) → cost`.
pub type ArcCostFn = Arc<dyn Fn(usize, usize) -> f64 + Send + Sync>;

/// How pairs without travel data are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingArcPolicy {
    /// Missing pairs cost nothing and take no time.
    #[default]
    Zero,
    /// Missing pairs cannot be traversed.
    Forbidden,
}

/// A fully declared vehicle routing model.
///
/// Holds the node and vehicle counts, per-vehicle start/end nodes, one arc
/// cost evaluator per vehicle, and the four dimensions (pallets, weight,
/// distance, time). Evaluators close over their coefficients at build time
/// and are pure; the model is immutable once built.
///
/// # Examples
///
/// ```
/// use u_fleet_routing::distance::ArcMatrix;
/// use u_fleet_routing::routing::{DimensionKind, RoutingModel};
///
/// let distance = ArcMatrix::from_data(2, vec![0, 10_000, 10_000, 0]).unwrap();
/// let time = ArcMatrix::from_data(2, vec![0, 15, 15, 0]).unwrap();
/// let model = RoutingModel::builder(distance, time)
///     .pallet_demands(vec![0, 100])
///     .weight_demands(vec![0, 500])
///     .window(1, 0, 60)
///     .vehicle(200, 1000, 2.0, 100_000)
///     .build()
///     .unwrap();
///
/// assert_eq!(model.num_nodes(), 2);
/// assert!((model.arc_cost(0, 0, 1) - 20.0).abs() < 1e-9);
/// assert_eq!(model.dimension(DimensionKind::Time).capacity(0), 60);
/// ```
#[derive(Clone)]
pub struct RoutingModel {
    num_nodes: usize,
    starts: Vec<usize>,
    ends: Vec<usize>,
    arc_costs: Vec<ArcCostFn>,
    dimensions: Vec<Dimension>,
    traversable: Option<Arc<ArcMatrix>>,
    horizon: i64,
}

impl RoutingModel {
    /// Assembles the model from the node graph, demands and fleet.
    pub fn build(
        nodes: &NodeGraph,
        demands: &NodeDemands,
        fleet: &Fleet,
        topology: &DepotTopology,
        missing_arcs: MissingArcPolicy,
    ) -> Result<Self> {
        let num_nodes = nodes.num_nodes();
        if demands.len() != num_nodes {
            return Err(RoutingError::InvalidConfig {
                reason: format!(
                    "{} demand entries for {} nodes",
                    demands.len(),
                    num_nodes
                ),
            });
        }

        let endpoints = topology.resolve(fleet.len(), num_nodes)?;
        let distance = Arc::new(nodes.matrices().distance.clone());
        let time = Arc::new(nodes.matrices().time.clone());
        let horizon = demands.horizon();

        let arc_costs: Vec<ArcCostFn> = fleet
            .vehicles()
            .iter()
            .map(|v| {
                let distance = Arc::clone(&distance);
                let cost_per_meter = v.cost_per_km() / 1000.0;
                Arc::new(move |from: usize, to: usize| distance.get(from, to) as f64 * cost_per_meter)
                    as ArcCostFn
            })
            .collect();

        let pallets = Arc::new(demands.pallet_demands().to_vec());
        let weight = Arc::new(demands.weight_demands().to_vec());
        let pallet_transit: TransitFn = Arc::new(move |from, _to| pallets[from]);
        let weight_transit: TransitFn = Arc::new(move |from, _to| weight[from]);
        let distance_transit: TransitFn = {
            let distance = Arc::clone(&distance);
            Arc::new(move |from, to| distance.get(from, to))
        };
        let time_transit: TransitFn = {
            let time = Arc::clone(&time);
            Arc::new(move |from, to| time.get(from, to))
        };

        let mut time_dimension = Dimension::with_vehicle_capacity(
            DimensionKind::Time,
            time_transit,
            horizon,
            vec![horizon; fleet.len()],
            true,
            num_nodes,
        );
        for node in 1..num_nodes {
            time_dimension.set_cumul_range(node, demands.window(node));
        }

        let dimensions = vec![
            Dimension::with_vehicle_capacity(
                DimensionKind::Pallets,
                pallet_transit,
                0,
                fleet.pallet_capacities(),
                true,
                num_nodes,
            ),
            Dimension::with_vehicle_capacity(
                DimensionKind::Weight,
                weight_transit,
                0,
                fleet.weight_capacities(),
                true,
                num_nodes,
            ),
            Dimension::with_vehicle_capacity(
                DimensionKind::Distance,
                distance_transit,
                0,
                fleet.max_ranges(),
                true,
                num_nodes,
            ),
            time_dimension,
        ];

        let missing = distance.missing_pairs();
        let traversable = match missing_arcs {
            MissingArcPolicy::Forbidden => Some(Arc::clone(&distance)),
            MissingArcPolicy::Zero => {
                if missing > 0 {
                    warn!(
                        missing_pairs = missing,
                        "node pairs without travel data are treated as zero-cost arcs"
                    );
                }
                None
            }
        };

        debug!(
            nodes = num_nodes,
            vehicles = fleet.len(),
            horizon,
            ?missing_arcs,
            "routing model built"
        );

        Ok(Self {
            num_nodes,
            starts: endpoints.iter().map(|&(s, _)| s).collect(),
            ends: endpoints.iter().map(|&(_, e)| e).collect(),
            arc_costs,
            dimensions,
            traversable,
            horizon,
        })
    }

    /// Starts a builder over explicit node matrices, for hand-made models.
    pub fn builder(distance: ArcMatrix, time: ArcMatrix) -> RoutingModelBuilder {
        RoutingModelBuilder::new(distance, time)
    }

    /// Number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Number of vehicles.
    pub fn num_vehicles(&self) -> usize {
        self.starts.len()
    }

    /// Start node of a vehicle.
    pub fn start(&self, vehicle: usize) -> usize {
        self.starts[vehicle]
    }

    /// End node of a vehicle.
    pub fn end(&self, vehicle: usize) -> usize {
        self.ends[vehicle]
    }

    /// Returns `true` if the node is some vehicle's start or end.
    pub fn is_endpoint(&self, node: usize) -> bool {
        self.starts.contains(&node) || self.ends.contains(&node)
    }

    /// Nodes that must be visited by exactly one route.
    pub fn visit_nodes(&self) -> Vec<usize> {
        (0..self.num_nodes).filter(|&n| !self.is_endpoint(n)).collect()
    }

    /// Cost of arc `from → to` for `vehicle`.
    pub fn arc_cost(&self, vehicle: usize, from: usize, to: usize) -> f64 {
        (self.arc_costs[vehicle])(from, to)
    }

    /// Returns `true` if the arc may be used.
    pub fn is_arc_allowed(&self, from: usize, to: usize) -> bool {
        self.traversable
            .as_ref()
            .map_or(true, |m| m.is_known(from, to))
    }

    /// The declared dimension of the given kind.
    pub fn dimension(&self, kind: DimensionKind) -> &Dimension {
        &self.dimensions[kind.index()]
    }

    /// All dimensions in [`DimensionKind::ALL`] order.
    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    /// Shared time horizon (latest delivery end).
    pub fn horizon(&self) -> i64 {
        self.horizon
    }
}

impl fmt::Debug for RoutingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutingModel")
            .field("num_nodes", &self.num_nodes)
            .field("starts", &self.starts)
            .field("ends", &self.ends)
            .field("dimensions", &self.dimensions)
            .field("forbids_missing_arcs", &self.traversable.is_some())
            .field("horizon", &self.horizon)
            .finish()
    }
}

/// Builder for small models declared directly in node space.
///
/// Goes through the same assembly as [`RoutingModel::build`]; node 0 is the
/// depot.
#[derive(Debug, Clone)]
pub struct RoutingModelBuilder {
    distance: ArcMatrix,
    time: ArcMatrix,
    pallets: Vec<i64>,
    weight: Vec<i64>,
    windows: Vec<(usize, i64, i64)>,
    vehicles: Vec<crate::models::Vehicle>,
    topology: DepotTopology,
    missing_arcs: MissingArcPolicy,
}

impl RoutingModelBuilder {
    fn new(distance: ArcMatrix, time: ArcMatrix) -> Self {
        let n = distance.size();
        Self {
            distance,
            time,
            pallets: vec![0; n],
            weight: vec![0; n],
            windows: Vec::new(),
            vehicles: Vec::new(),
            topology: DepotTopology::SingleDepot,
            missing_arcs: MissingArcPolicy::Zero,
        }
    }

    /// Pallet demand per node (centipallets).
    pub fn pallet_demands(mut self, pallets: Vec<i64>) -> Self {
        self.pallets = pallets;
        self
    }

    /// Weight demand per node (kg).
    pub fn weight_demands(mut self, weight: Vec<i64>) -> Self {
        self.weight = weight;
        self
    }

    /// Delivery window of a node (minutes).
    pub fn window(mut self, node: usize, start: i64, end: i64) -> Self {
        self.windows.push((node, start, end));
        self
    }

    /// Appends a vehicle (centipallets, kg, cost per km, meters).
    pub fn vehicle(mut self, pallets: i64, weight: i64, cost_per_km: f64, max_range: i64) -> Self {
        let index = self.vehicles.len();
        self.vehicles.push(crate::models::Vehicle::new(
            index,
            pallets,
            weight,
            cost_per_km,
            max_range,
        ));
        self
    }

    /// Sets the depot topology.
    pub fn topology(mut self, topology: DepotTopology) -> Self {
        self.topology = topology;
        self
    }

    /// Sets the missing arc policy.
    pub fn missing_arcs(mut self, policy: MissingArcPolicy) -> Self {
        self.missing_arcs = policy;
        self
    }

    /// Builds the model.
    pub fn build(self) -> Result<RoutingModel> {
        let n = self.distance.size();
        if self.time.size() != n || self.pallets.len() != n || self.weight.len() != n {
            return Err(RoutingError::InvalidConfig {
                reason: "matrix and demand sizes differ".into(),
            });
        }
        let nodes = NodeGraph::from_parts(
            crate::graph::NodeMapping::new(vec![0; n]),
            crate::distance::TravelMatrices {
                distance: self.distance,
                time: self.time,
            },
        );
        let demands = NodeDemands::from_parts(self.pallets, self.weight, &self.windows)?;
        let fleet = Fleet::new(self.vehicles);
        RoutingModel::build(&nodes, &demands, &fleet, &self.topology, self.missing_arcs)
    }
}
