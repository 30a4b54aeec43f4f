//! Location graph and its expansion into routing node space.
//!
//! - [`LocationGraph`] — dense location indices, depot, location matrices
//! - [`NodeGraph`] — `(M + 1)²` node matrices, node 0 = depot
//! - [`NodeMapping`] — node ↔ order ↔ location lookups

mod expand;
mod location;

pub use expand::{NodeGraph, NodeMapping};
pub use location::{Location, LocationGraph};
