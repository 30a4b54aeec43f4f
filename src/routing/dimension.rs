//! Cumulative resource dimensions.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::models::TimeWindow;

/// Transit evaluator: `(from_node, to_node) → amount added to the cumul`.
pub type TransitFn = Arc<dyn Fn(usize, usize) -> i64 + Send + Sync>;

/// The four resource axes tracked along every route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionKind {
    /// Loaded centipallets.
    Pallets,
    /// Loaded kilograms.
    Weight,
    /// Driven meters.
    Distance,
    /// Elapsed minutes.
    Time,
}

impl DimensionKind {
    /// All dimensions, in storage order.
    pub const ALL: [DimensionKind; 4] = [
        DimensionKind::Pallets,
        DimensionKind::Weight,
        DimensionKind::Distance,
        DimensionKind::Time,
    ];

    /// Position of this dimension in per-stop cumul arrays.
    pub fn index(self) -> usize {
        match self {
            DimensionKind::Pallets => 0,
            DimensionKind::Weight => 1,
            DimensionKind::Distance => 2,
            DimensionKind::Time => 3,
        }
    }

    /// Dimension name.
    pub fn name(self) -> &'static str {
        match self {
            DimensionKind::Pallets => "pallets",
            DimensionKind::Weight => "weight",
            DimensionKind::Distance => "distance",
            DimensionKind::Time => "time",
        }
    }
}

impl fmt::Display for DimensionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A named cumulative resource with per-vehicle capacity.
///
/// Along a route `n0 → n1 → … → nk` the cumul obeys
/// `cumul(n_{i+1}) - cumul(n_i) ∈ [transit(n_i, n_{i+1}), transit + slack_max]`,
/// every cumul lies in `[0, capacity(vehicle)]`, and optionally inside the
/// node's own range.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use u_fleet_routing::routing::{Dimension, DimensionKind};
///
/// let demand = vec![0, 150, 80];
/// let dim = Dimension::with_vehicle_capacity(
///     DimensionKind::Pallets,
///     Arc::new(move |from, _to| demand[from]),
///     0,
///     vec![200, 100],
///     true,
///     3,
/// );
/// assert_eq!(dim.transit(1, 2), 150);
/// assert_eq!(dim.capacity(1), 100);
/// assert!(dim.cumul_range(1).is_none());
/// ```
#[derive(Clone)]
pub struct Dimension {
    kind: DimensionKind,
    transit: TransitFn,
    slack_max: i64,
    capacities: Vec<i64>,
    fix_start_cumul_to_zero: bool,
    cumul_ranges: Vec<Option<TimeWindow>>,
}

impl Dimension {
    /// Declares a dimension with one capacity per vehicle.
    pub fn with_vehicle_capacity(
        kind: DimensionKind,
        transit: TransitFn,
        slack_max: i64,
        capacities: Vec<i64>,
        fix_start_cumul_to_zero: bool,
        num_nodes: usize,
    ) -> Self {
        Self {
            kind,
            transit,
            slack_max,
            capacities,
            fix_start_cumul_to_zero,
            cumul_ranges: vec![None; num_nodes],
        }
    }

    /// Which resource this is.
    pub fn kind(&self) -> DimensionKind {
        self.kind
    }

    /// Amount added to the cumul when travelling `from → to`.
    pub fn transit(&self, from: usize, to: usize) -> i64 {
        (self.transit)(from, to)
    }

    /// Maximum idle amount that may be added on an arc.
    pub fn slack_max(&self) -> i64 {
        self.slack_max
    }

    /// Capacity for the given vehicle.
    pub fn capacity(&self, vehicle: usize) -> i64 {
        self.capacities[vehicle]
    }

    /// All per-vehicle capacities.
    pub fn capacities(&self) -> &[i64] {
        &self.capacities
    }

    /// Whether every route starts with a cumul of zero.
    pub fn fixes_start_cumul(&self) -> bool {
        self.fix_start_cumul_to_zero
    }

    /// Restricts the cumul at `node` to `range`.
    pub fn set_cumul_range(&mut self, node: usize, range: TimeWindow) {
        self.cumul_ranges[node] = Some(range);
    }

    /// Range the cumul at `node` must lie in, if constrained.
    pub fn cumul_range(&self, node: usize) -> Option<TimeWindow> {
        self.cumul_ranges.get(node).copied().flatten()
    }
}

impl fmt::Debug for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dimension")
            .field("kind", &self.kind)
            .field("slack_max", &self.slack_max)
            .field("capacities", &self.capacities)
            .field("fix_start_cumul_to_zero", &self.fix_start_cumul_to_zero)
            .field(
                "constrained_nodes",
                &self.cumul_ranges.iter().filter(|r| r.is_some()).count(),
            )
            .finish()
    }
}
