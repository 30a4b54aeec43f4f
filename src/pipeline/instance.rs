//! A loaded instance: location graph, node matrices, demands and fleet.

use tracing::debug;

use crate::config::SolveConfig;
use crate::error::Result;
use crate::graph::{LocationGraph, NodeGraph};
use crate::input::InstanceDocument;
use crate::models::{Fleet, NodeDemands};
use crate::routing::RoutingModel;

/// Every input stage applied to a document, ready for model building.
///
/// The stages run in order (graph, expansion, demands, fleet) and the first
/// failure aborts the load, so no partial instance is ever observable.
///
/// # Examples
///
/// ```
/// use u_fleet_routing::input::InstanceDocument;
/// use u_fleet_routing::pipeline::Instance;
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
///           "cost_per_km": 2.5, "max_km": 600 }
///     ]
/// }"#).unwrap();
///
/// let instance = Instance::build(&doc).unwrap();
/// assert_eq!(instance.num_orders(), 1);
/// assert_eq!(instance.nodes().distance(0, 1), 10_000);
/// assert_eq!(instance.demands().pallets(1), 200);
/// ```
#[derive(Debug, Clone)]
pub struct Instance {
    graph: LocationGraph,
    nodes: NodeGraph,
    demands: NodeDemands,
    fleet: Fleet,
}

impl Instance {
    /// Runs all input stages on the document.
    pub fn build(doc: &InstanceDocument) -> Result<Self> {
        let graph = LocationGraph::build(&doc.locations)?;
        let nodes = NodeGraph::expand(&graph, &doc.orders)?;
        let demands = NodeDemands::extract(&doc.orders, &doc.pallet_types, &doc.standard_pallet)?;
        let fleet = Fleet::load(&doc.vehicles)?;
        debug!(
            locations = graph.len(),
            orders = doc.orders.len(),
            vehicles = fleet.len(),
            "instance loaded"
        );
        Ok(Self {
            graph,
            nodes,
            demands,
            fleet,
        })
    }

    /// Builds a fresh routing model; every call owns its own matrices.
    pub fn model(&self, config: &SolveConfig) -> Result<RoutingModel> {
        RoutingModel::build(
            &self.nodes,
            &self.demands,
            &self.fleet,
            &config.topology,
            config.missing_arcs,
        )
    }

    /// Location graph.
    pub fn graph(&self) -> &LocationGraph {
        &self.graph
    }

    /// Node-space matrices and node mapping.
    pub fn nodes(&self) -> &NodeGraph {
        &self.nodes
    }

    /// Node demands and windows.
    pub fn demands(&self) -> &NodeDemands {
        &self.demands
    }

    /// Fleet.
    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    /// Number of orders.
    pub fn num_orders(&self) -> usize {
        self.nodes.mapping().num_orders()
    }

    /// Returns `true` if there are no orders or no vehicles.
    pub fn is_trivial(&self) -> bool {
        self.num_orders() == 0 || self.fleet.is_empty()
    }
}
