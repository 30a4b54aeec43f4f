//! Location graph builder.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::distance::TravelMatrices;
use crate::error::{Result, RoutingError};
use crate::input::{dense_positions, LocationRecord};

/// A location of the road network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    index: usize,
    id: String,
    is_depot: bool,
}

impl Location {
    /// Dense index in `0..N`.
    pub fn index(&self) -> usize {
        self.index
    }

    /// External identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether this is the distribution center.
    pub fn is_depot(&self) -> bool {
        self.is_depot
    }
}

/// All locations with a dense index, the depot, and location×location
/// distance/time matrices.
///
/// Distances are stored in meters (`km × 1000`, rounded to the nearest
/// meter) and times in minutes (rounded to the nearest minute). Pairs with
/// no travel data read as `0`; use [`ArcMatrix::is_known`] to tell them
/// apart.
///
/// [`ArcMatrix::is_known`]: crate::distance::ArcMatrix::is_known
///
/// # Examples
///
/// ```
/// use u_fleet_routing::graph::LocationGraph;
/// use u_fleet_routing::input::{LocationRecord, TravelEdge};
///
/// let records = vec![
///     LocationRecord {
///         index: 0,
///         id: "DC".into(),
///         is_depot: true,
///         travel: vec![TravelEdge { to: "A".into(), km: 12.5, minutes: 20.0 }],
///     },
///     LocationRecord { index: 1, id: "A".into(), is_depot: false, travel: vec![] },
/// ];
/// let graph = LocationGraph::build(&records).unwrap();
/// assert_eq!(graph.depot(), 0);
/// assert_eq!(graph.index_of("A"), Some(1));
/// assert_eq!(graph.distance(0, 1), 12_500);
/// assert_eq!(graph.time(0, 1), 20);
/// assert_eq!(graph.distance(1, 0), 0);
/// ```
#[derive(Debug, Clone)]
pub struct LocationGraph {
    locations: Vec<Location>,
    index_of: FxHashMap<String, usize>,
    depot: usize,
    matrices: TravelMatrices,
}

impl LocationGraph {
    /// Builds the graph from raw location records.
    ///
    /// Fails on non-dense indices, duplicate ids, a depot count other than
    /// one, and edges to unknown or with invalid travel data.
    pub fn build(records: &[LocationRecord]) -> Result<Self> {
        let positions = dense_positions("location", records.iter().map(|r| r.index))?;

        let mut locations = Vec::with_capacity(records.len());
        let mut index_of = FxHashMap::default();
        for (index, &pos) in positions.iter().enumerate() {
            let record = &records[pos];
            if index_of.insert(record.id.clone(), index).is_some() {
                return Err(RoutingError::DuplicateLocation {
                    id: record.id.clone(),
                });
            }
            locations.push(Location {
                index,
                id: record.id.clone(),
                is_depot: record.is_depot,
            });
        }

        let depots: Vec<usize> = locations
            .iter()
            .filter(|l| l.is_depot)
            .map(|l| l.index)
            .collect();
        let depot = match depots.as_slice() {
            [depot] => *depot,
            _ => {
                return Err(RoutingError::DepotCount {
                    count: depots.len(),
                })
            }
        };

        let mut matrices = TravelMatrices::new(locations.len());
        for (from, &pos) in positions.iter().enumerate() {
            for edge in &records[pos].travel {
                let to = *index_of
                    .get(&edge.to)
                    .ok_or_else(|| RoutingError::UnknownLocation {
                        location: from,
                        id: edge.to.clone(),
                    })?;
                if !is_valid_measure(edge.km) || !is_valid_measure(edge.minutes) {
                    return Err(RoutingError::InvalidTravel {
                        location: from,
                        id: edge.to.clone(),
                    });
                }
                if from == to {
                    continue;
                }
                matrices
                    .distance
                    .set(from, to, (edge.km * 1000.0).round() as i64);
                matrices.time.set(from, to, edge.minutes.round() as i64);
            }
        }

        debug!(
            locations = locations.len(),
            depot,
            missing_pairs = matrices.distance.missing_pairs(),
            "location graph built"
        );

        Ok(Self {
            locations,
            index_of,
            depot,
            matrices,
        })
    }

    /// Number of locations.
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// Returns `true` if there are no locations.
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Index of the depot location.
    pub fn depot(&self) -> usize {
        self.depot
    }

    /// All locations in index order.
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// Resolves an external id to its dense index.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_of.get(id).copied()
    }

    /// Distance in meters between two location indices.
    pub fn distance(&self, from: usize, to: usize) -> i64 {
        self.matrices.distance.get(from, to)
    }

    /// Travel time in minutes between two location indices.
    pub fn time(&self, from: usize, to: usize) -> i64 {
        self.matrices.time.get(from, to)
    }

    /// The underlying matrices.
    pub fn matrices(&self) -> &TravelMatrices {
        &self.matrices
    }
}

fn is_valid_measure(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::TravelEdge;

    fn loc(index: usize, id: &str, is_depot: bool, travel: &[(&str, f64, f64)]) -> LocationRecord {
        LocationRecord {
            index,
            id: id.into(),
            is_depot,
            travel: travel
                .iter()
                .map(|&(to, km, minutes)| TravelEdge {
                    to: to.into(),
                    km,
                    minutes,
                })
                .collect(),
        }
    }

    #[test]
    fn test_build_basic() {
        let records = vec![
            loc(0, "DC", true, &[("A", 1.5, 10.0), ("B", 2.0, 12.0)]),
            loc(1, "A", false, &[("DC", 1.5, 11.0)]),
            loc(2, "B", false, &[]),
        ];
        let g = LocationGraph::build(&records).expect("valid");
        assert_eq!(g.len(), 3);
        assert_eq!(g.depot(), 0);
        assert_eq!(g.distance(0, 1), 1500);
        assert_eq!(g.distance(0, 2), 2000);
        assert_eq!(g.time(1, 0), 11);
        assert_eq!(g.distance(2, 0), 0);
        assert!(!g.matrices().distance.is_known(2, 0));
        assert!(g.locations()[0].is_depot());
        assert_eq!(g.locations()[2].id(), "B");
    }

    #[test]
    fn test_records_out_of_order() {
        let records = vec![
            loc(1, "A", false, &[("DC", 3.0, 5.0)]),
            loc(0, "DC", true, &[]),
        ];
        let g = LocationGraph::build(&records).expect("valid");
        assert_eq!(g.depot(), 0);
        assert_eq!(g.index_of("A"), Some(1));
        assert_eq!(g.distance(1, 0), 3000);
    }

    #[test]
    fn test_depot_elsewhere() {
        let records = vec![loc(0, "A", false, &[]), loc(1, "DC", true, &[])];
        let g = LocationGraph::build(&records).expect("valid");
        assert_eq!(g.depot(), 1);
    }

    #[test]
    fn test_no_depot() {
        let records = vec![loc(0, "A", false, &[])];
        let err = LocationGraph::build(&records).expect_err("no depot");
        assert!(matches!(err, RoutingError::DepotCount { count: 0 }));
    }

    #[test]
    fn test_two_depots() {
        let records = vec![loc(0, "A", true, &[]), loc(1, "B", true, &[])];
        let err = LocationGraph::build(&records).expect_err("two depots");
        assert!(matches!(err, RoutingError::DepotCount { count: 2 }));
    }

    #[test]
    fn test_duplicate_id() {
        let records = vec![loc(0, "A", true, &[]), loc(1, "A", false, &[])];
        let err = LocationGraph::build(&records).expect_err("duplicate");
        assert!(matches!(err, RoutingError::DuplicateLocation { .. }));
    }

    #[test]
    fn test_edge_to_unknown() {
        let records = vec![loc(0, "DC", true, &[("X", 1.0, 1.0)])];
        let err = LocationGraph::build(&records).expect_err("unknown");
        assert!(matches!(err, RoutingError::UnknownLocation { location: 0, .. }));
    }

    #[test]
    fn test_negative_travel() {
        let records = vec![
            loc(0, "DC", true, &[("A", -1.0, 1.0)]),
            loc(1, "A", false, &[]),
        ];
        let err = LocationGraph::build(&records).expect_err("negative km");
        assert!(matches!(err, RoutingError::InvalidTravel { .. }));
    }

    #[test]
    fn test_self_edge_ignored() {
        let records = vec![loc(0, "DC", true, &[("DC", 4.0, 4.0)])];
        let g = LocationGraph::build(&records).expect("valid");
        assert_eq!(g.distance(0, 0), 0);
    }

    #[test]
    fn test_fractional_km_rounds_to_meter() {
        let records = vec![
            loc(0, "DC", true, &[("A", 0.0126, 0.4)]),
            loc(1, "A", false, &[]),
        ];
        let g = LocationGraph::build(&records).expect("valid");
        assert_eq!(g.distance(0, 1), 13);
        assert_eq!(g.time(0, 1), 0);
        assert!(g.matrices().time.is_known(0, 1));
    }
}
