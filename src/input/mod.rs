//! Input document types.
//!
//! The document has four sections (locations, orders, pallet types with the
//! standard pallet, vehicles) and is deserialized from JSON with unknown
//! fields rejected.

mod document;

pub(crate) use document::dense_positions;
pub use document::{
    InstanceDocument, LocationRecord, OrderRecord, PalletTypeRecord, TravelEdge, VehicleRecord,
};
