//! Order matrix expander: location space → depot + order node space.

use tracing::debug;

use crate::distance::TravelMatrices;
use crate::error::{Result, RoutingError};
use crate::input::{dense_positions, OrderRecord};

use super::LocationGraph;

/// Immutable bijection between routing nodes and orders.
///
/// Node 0 is the depot; node `k > 0` is order `k - 1`. Each node also knows
/// the location it sits on, so several nodes may share a location.
///
/// # Examples
///
/// ```
/// use u_fleet_routing::graph::NodeMapping;
///
/// let mapping = NodeMapping::new(vec![0, 3, 3, 1]);
/// assert_eq!(mapping.num_orders(), 3);
/// assert_eq!(mapping.node_of_order(0), Some(1));
/// assert_eq!(mapping.order_of_node(0), None);
/// assert_eq!(mapping.order_of_node(3), Some(2));
/// assert_eq!(mapping.location_of_node(2), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeMapping {
    locations: Vec<usize>,
}

impl NodeMapping {
    /// The depot node.
    pub const DEPOT: usize = 0;

    /// Creates a mapping from `locations[node]`; `locations[0]` is the depot.
    pub fn new(locations: Vec<usize>) -> Self {
        Self { locations }
    }

    /// Number of nodes (orders + depot).
    pub fn num_nodes(&self) -> usize {
        self.locations.len()
    }

    /// Number of orders.
    pub fn num_orders(&self) -> usize {
        self.locations.len().saturating_sub(1)
    }

    /// Node carrying the given order.
    pub fn node_of_order(&self, order: usize) -> Option<usize> {
        (order < self.num_orders()).then_some(order + 1)
    }

    /// Order carried by the given node (`None` for the depot or out of range).
    pub fn order_of_node(&self, node: usize) -> Option<usize> {
        (node > Self::DEPOT && node < self.locations.len()).then(|| node - 1)
    }

    /// Location index the node sits on.
    ///
    /// # Panics
    ///
    /// Panics if `node` is out of range.
    pub fn location_of_node(&self, node: usize) -> usize {
        self.locations[node]
    }
}

/// Distance/time matrices over the depot + order node space.
///
/// Always `(M + 1) × (M + 1)` regardless of how many locations exist.
#[derive(Debug, Clone)]
pub struct NodeGraph {
    mapping: NodeMapping,
    matrices: TravelMatrices,
}

impl NodeGraph {
    /// Remaps the location matrices into node space.
    ///
    /// Each order's destination id is resolved once through the graph's
    /// id index, so the fill is O(M²). An order pointing at an unknown
    /// location is reported with its index.
    pub fn expand(graph: &LocationGraph, orders: &[OrderRecord]) -> Result<Self> {
        let positions = dense_positions("order", orders.iter().map(|o| o.index))?;

        let mut locations = Vec::with_capacity(orders.len() + 1);
        locations.push(graph.depot());
        for &pos in &positions {
            let order = &orders[pos];
            let location = graph.index_of(&order.location_to).ok_or_else(|| {
                RoutingError::UnknownDestination {
                    order: order.index,
                    id: order.location_to.clone(),
                }
            })?;
            locations.push(location);
        }

        let source = graph.matrices();
        let n = locations.len();
        let mut matrices = TravelMatrices::new(n);
        for (i, &from) in locations.iter().enumerate() {
            for (j, &to) in locations.iter().enumerate() {
                if i == j {
                    continue;
                }
                if source.distance.is_known(from, to) {
                    matrices.distance.set(i, j, source.distance.get(from, to));
                }
                if source.time.is_known(from, to) {
                    matrices.time.set(i, j, source.time.get(from, to));
                }
            }
        }

        debug!(
            nodes = n,
            missing_pairs = matrices.distance.missing_pairs(),
            "order matrices expanded"
        );

        Ok(Self {
            mapping: NodeMapping::new(locations),
            matrices,
        })
    }

    /// Wraps already expanded matrices.
    pub fn from_parts(mapping: NodeMapping, matrices: TravelMatrices) -> Self {
        Self { mapping, matrices }
    }

    /// The node/order/location mapping.
    pub fn mapping(&self) -> &NodeMapping {
        &self.mapping
    }

    /// Node-space distance/time matrices.
    pub fn matrices(&self) -> &TravelMatrices {
        &self.matrices
    }

    /// Number of nodes (orders + depot).
    pub fn num_nodes(&self) -> usize {
        self.mapping.num_nodes()
    }

    /// Distance in meters between two nodes.
    pub fn distance(&self, from: usize, to: usize) -> i64 {
        self.matrices.distance.get(from, to)
    }

    /// Travel time in minutes between two nodes.
    pub fn time(&self, from: usize, to: usize) -> i64 {
        self.matrices.time.get(from, to)
    }
}
