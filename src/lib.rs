//! # u-fleet-routing
//!
//! Heterogeneous capacitated vehicle routing with time windows (CVRPTW):
//! delivery orders with pallet and weight demands, a mixed fleet with
//! per-vehicle capacity, range and cost per km, and a single depot.
//!
//! ## Modules
//!
//! - [`input`] — JSON instance document (locations, orders, pallets, vehicles)
//! - [`graph`] — Location graph and its expansion into order node space
//! - [`distance`] — Integer distance (m) and time (min) matrices
//! - [`models`] — Node demands, delivery windows, fleet in model units
//! - [`routing`] — Routing model with pallets/weight/distance/time dimensions
//! - [`engine`] — Construction strategies, local search and LNS
//! - [`solution`] — Per-vehicle route plans with loads and cumul windows
//! - [`pipeline`] — Multi-strategy solve with cheapest-plan selection
//! - [`config`] — Solve configuration
//!
//! ## Quick start
//!
//! ```no_run
//! use u_fleet_routing::{solve_document, InstanceDocument, SolveConfig};
//!
//! let doc = InstanceDocument::from_path("instance.json").unwrap();
//! let selection = solve_document(&doc, &SolveConfig::default()).unwrap();
//! if let Some(plan) = selection.plan() {
//!     println!("total cost: {:.2}", plan.total_cost);
//! }
//! ```

pub mod config;
pub mod distance;
pub mod engine;
mod error;
pub mod graph;
pub mod input;
pub mod models;
pub mod pipeline;
pub mod routing;
pub mod solution;

pub use config::SolveConfig;
pub use error::{Result, RoutingError};
pub use input::InstanceDocument;
pub use pipeline::{solve_document, solve_document_with, Outcome, Selection};
pub use solution::NetworkPlan;
