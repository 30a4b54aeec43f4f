//! Solution decomposition.
//!
//! Turns an engine [`Assignment`](crate::engine::Assignment) into a
//! [`NetworkPlan`]: per-vehicle cost, distance, time, utilization and the
//! ordered stops with their feasible time ranges.

mod decompose;

pub use decompose::{decompose, NetworkPlan, RouteMetrics, RoutePlan, Stop};
