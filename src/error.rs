//! Error type shared by every stage of the pipeline.

use thiserror::Error;

/// Errors raised while loading an instance or assembling a routing model.
///
/// Infeasibility is deliberately *not* an error: an engine that finds no
/// assignment yields `None`, and the strategy selector records it as an
/// infinite-cost run.
#[derive(Debug, Error)]
pub enum RoutingError {
    /// The input document is not valid JSON or violates the schema.
    #[error("failed to parse instance document: {0}")]
    Parse(#[from] serde_json::Error),

    /// The input document could not be read.
    #[error("failed to read instance document: {0}")]
    Io(#[from] std::io::Error),

    /// Exactly one location must be flagged as the depot.
    #[error("expected exactly one depot location, found {count}")]
    DepotCount {
        /// Number of depot-flagged locations.
        count: usize,
    },

    /// Two locations share the same external id.
    #[error("duplicate location id `{id}`")]
    DuplicateLocation {
        /// The repeated external id.
        id: String,
    },

    /// A travel edge points at a location id that does not exist.
    #[error("location {location} has travel data to unknown location `{id}`")]
    UnknownLocation {
        /// Index of the location owning the edge.
        location: usize,
        /// The unresolved destination id.
        id: String,
    },

    /// A travel edge carries a negative or non-finite distance or time.
    #[error("location {location} has invalid travel data to `{id}`")]
    InvalidTravel {
        /// Index of the location owning the edge.
        location: usize,
        /// Destination id of the edge.
        id: String,
    },

    /// An order references a destination location id that does not exist.
    #[error("order {order} references unknown destination location `{id}`")]
    UnknownDestination {
        /// Index of the offending order.
        order: usize,
        /// The unresolved destination id.
        id: String,
    },

    /// An order references a pallet type that does not exist.
    #[error("order {order} references unknown pallet type {pallet_type}")]
    UnknownPalletType {
        /// Index of the offending order.
        order: usize,
        /// The unresolved pallet type index.
        pallet_type: usize,
    },

    /// Record indices of a section are not a dense `0..len` permutation.
    #[error("{kind} index {index} is out of range or repeated (section has {len} records)")]
    InvalidIndex {
        /// Section name (`location`, `order`, ...).
        kind: &'static str,
        /// Offending index.
        index: usize,
        /// Number of records in the section.
        len: usize,
    },

    /// A vehicle record cannot be used.
    #[error("vehicle {vehicle} is invalid: {reason}")]
    InvalidVehicle {
        /// Index of the offending vehicle.
        vehicle: usize,
        /// What is wrong with it.
        reason: String,
    },

    /// A pallet ratio is zero, negative or non-finite.
    #[error("pallet type {pallet_type} has invalid ratio {ratio}")]
    InvalidPalletRatio {
        /// Index of the pallet type.
        pallet_type: usize,
        /// The rejected ratio.
        ratio: f64,
    },

    /// The standard pallet's ratio is zero, negative or non-finite.
    #[error("standard pallet has invalid ratio {ratio}")]
    InvalidStandardRatio {
        /// The rejected ratio.
        ratio: f64,
    },

    /// An order's delivery window is empty or negative.
    #[error("order {order} has invalid delivery window [{start}, {end}]")]
    InvalidWindow {
        /// Index of the offending order.
        order: usize,
        /// Window start in minutes.
        start: i64,
        /// Window end in minutes.
        end: i64,
    },

    /// The per-vehicle start/end configuration does not match the instance.
    #[error("invalid depot topology: {reason}")]
    InvalidTopology {
        /// What is wrong with it.
        reason: String,
    },

    /// The solve configuration cannot be used.
    #[error("invalid solve configuration: {reason}")]
    InvalidConfig {
        /// What is wrong with it.
        reason: String,
    },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RoutingError>;
