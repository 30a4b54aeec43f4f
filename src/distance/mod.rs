//! Distance and travel time matrices.
//!
//! Provides flat row-major integer matrices shared by the location graph and
//! the order node graph.

mod matrix;

pub use matrix::{ArcMatrix, TravelMatrices};
