//! Domain model types for the fleet routing problem.
//!
//! Provides delivery windows, the per-node demand vectors derived from the
//! orders, and the heterogeneous fleet converted into model units
//! (centipallets, kilograms, meters).

mod demand;
mod time_window;
mod vehicle;

pub use demand::{NodeDemands, CENTIPALLETS_PER_PALLET};
pub use time_window::TimeWindow;
pub use vehicle::{Fleet, Vehicle};
