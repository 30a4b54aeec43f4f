//! Depot topology: where each vehicle starts and ends.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RoutingError};

/// Start and end node of one vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleEndpoints {
    /// Vehicle index.
    pub vehicle: usize,
    /// Node the route starts at.
    pub start: usize,
    /// Node the route ends at.
    pub end: usize,
}

/// How vehicles are anchored to the node graph.
///
/// # Examples
///
/// ```
/// use u_fleet_routing::routing::{DepotTopology, VehicleEndpoints};
///
/// let single = DepotTopology::SingleDepot;
/// assert_eq!(single.resolve(2, 5).unwrap(), vec![(0, 0), (0, 0)]);
///
/// let multi = DepotTopology::MultiDepot {
///     endpoints: vec![
///         VehicleEndpoints { vehicle: 1, start: 0, end: 3 },
///         VehicleEndpoints { vehicle: 0, start: 0, end: 0 },
///     ],
/// };
/// assert_eq!(multi.resolve(2, 5).unwrap(), vec![(0, 0), (0, 3)]);
/// assert!(multi.resolve(3, 5).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DepotTopology {
    /// Every vehicle starts and ends at node 0.
    #[default]
    SingleDepot,
    /// Each vehicle has its own start and end node.
    MultiDepot {
        /// One entry per vehicle.
        endpoints: Vec<VehicleEndpoints>,
    },
}

impl DepotTopology {
    /// Resolves `(start, end)` per vehicle, validated against the fleet size
    /// and node count.
    pub fn resolve(&self, num_vehicles: usize, num_nodes: usize) -> Result<Vec<(usize, usize)>> {
        match self {
            DepotTopology::SingleDepot => Ok(vec![(0, 0); num_vehicles]),
            DepotTopology::MultiDepot { endpoints } => {
                if endpoints.len() != num_vehicles {
                    return Err(invalid(format!(
                        "{} endpoint entries for {} vehicles",
                        endpoints.len(),
                        num_vehicles
                    )));
                }
                let mut resolved: Vec<Option<(usize, usize)>> = vec![None; num_vehicles];
                for ep in endpoints {
                    if ep.start >= num_nodes || ep.end >= num_nodes {
                        return Err(invalid(format!(
                            "vehicle {} endpoints ({}, {}) outside {} nodes",
                            ep.vehicle, ep.start, ep.end, num_nodes
                        )));
                    }
                    let Some(slot) = resolved.get_mut(ep.vehicle) else {
                        return Err(invalid(format!("unknown vehicle {}", ep.vehicle)));
                    };
                    if slot.is_some() {
                        return Err(invalid(format!("vehicle {} configured twice", ep.vehicle)));
                    }
                    *slot = Some((ep.start, ep.end));
                }
                Ok(resolved.into_iter().flatten().collect())
            }
        }
    }
}

fn invalid(reason: String) -> RoutingError {
    RoutingError::InvalidTopology { reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ep(vehicle: usize, start: usize, end: usize) -> VehicleEndpoints {
        VehicleEndpoints {
            vehicle,
            start,
            end,
        }
    }

    #[test]
    fn test_single_depot() {
        assert_eq!(DepotTopology::SingleDepot.resolve(3, 1).expect("valid").len(), 3);
        assert!(DepotTopology::SingleDepot.resolve(0, 1).expect("valid").is_empty());
    }

    #[test]
    fn test_multi_depot_duplicate_vehicle() {
        let t = DepotTopology::MultiDepot {
            endpoints: vec![ep(0, 0, 0), ep(0, 0, 1)],
        };
        assert!(matches!(
            t.resolve(2, 3),
            Err(RoutingError::InvalidTopology { .. })
        ));
    }

    #[test]
    fn test_multi_depot_node_out_of_range() {
        let t = DepotTopology::MultiDepot {
            endpoints: vec![ep(0, 0, 9)],
        };
        assert!(t.resolve(1, 3).is_err());
    }

    #[test]
    fn test_multi_depot_unknown_vehicle() {
        let t = DepotTopology::MultiDepot {
            endpoints: vec![ep(4, 0, 0)],
        };
        assert!(t.resolve(1, 3).is_err());
    }

    #[test]
    fn test_deserialize_tagged() {
        let t: DepotTopology = serde_json::from_str(
            r#"{ "kind": "multi_depot", "endpoints": [{ "vehicle": 0, "start": 0, "end": 2 }] }"#,
        )
        .expect("valid");
        assert_eq!(t.resolve(1, 3).expect("valid"), vec![(0, 2)]);
        let s: DepotTopology = serde_json::from_str(r#"{ "kind": "single_depot" }"#).expect("valid");
        assert_eq!(s, DepotTopology::SingleDepot);
    }
}
