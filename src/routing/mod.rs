//! Vehicle routing model.
//!
//! # Modules
//!
//! - **`dimension`**: Cumulative resources (pallets, weight, distance, time)
//! - **`topology`**: Per-vehicle start and end nodes
//! - **`model`**: The assembled model handed to a routing engine
//!
//! The model is engine-agnostic: it only declares nodes, vehicles, arc costs
//! and dimension constraints. Engines in [`crate::engine`] consume it.

mod dimension;
mod model;
mod topology;

pub use dimension::{Dimension, DimensionKind, TransitFn};
pub use model::{ArcCostFn, MissingArcPolicy, RoutingModel, RoutingModelBuilder};
pub use topology::{DepotTopology, VehicleEndpoints};
