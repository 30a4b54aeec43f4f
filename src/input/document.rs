//! Raw instance document: locations, orders, pallet types and fleet.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RoutingError};

/// A complete problem instance as read from the input document.
///
/// Records are read-only once loaded; every derived structure (matrices,
/// demand vectors, routing models) is built from this document.
///
/// # Examples
///
/// ```
/// use u_fleet_routing::input::InstanceDocument;
///
/// let doc = InstanceDocument::from_json_str(r#"{
///     "locations": [
///         { "index": 0, "id": "DC", "is_depot": true,
///           "travel": [{ "to": "A", "km": 10.0, "minutes": 15 }] },
///         { "index": 1, "id": "A",
///           "travel": [{ "to": "DC", "km": 10.0, "minutes": 15 }] }
///     ],
///     "orders": [
///         { "index": 0, "location_to": "A", "pallet_type": 0,
///           "pallet_quantity": 2, "weight_per_pallet": 300,
///           "delivery_start": 0, "delivery_end": 480 }
///     ],
///     "pallet_types": [{ "index": 0, "ratio_to_std_pallet": 1.0 }],
///     "standard_pallet": { "index": 0, "ratio_to_std_pallet": 1.0 },
///     "vehicles": [
///         { "index": 0, "capacity_in_std_pallets": 18, "max_weight": 12000,
///           "cost_per_km": 2.5, "max_km": 600 }
///     ]
/// }"#).unwrap();
///
/// assert_eq!(doc.locations.len(), 2);
/// assert_eq!(doc.orders[0].location_to, "A");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstanceDocument {
    /// Location graph with travel data.
    pub locations: Vec<LocationRecord>,
    /// Delivery orders.
    pub orders: Vec<OrderRecord>,
    /// Pallet sizes expressed relative to the standard pallet.
    pub pallet_types: Vec<PalletTypeRecord>,
    /// The reference pallet all ratios are expressed against.
    pub standard_pallet: PalletTypeRecord,
    /// Heterogeneous fleet.
    pub vehicles: Vec<VehicleRecord>,
}

impl InstanceDocument {
    /// Parses a document from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parses a document from any reader yielding JSON.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Reads and parses a JSON document from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(RoutingError::Io)?;
        Self::from_reader(std::io::BufReader::new(file))
    }
}

/// A location with its outgoing travel data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocationRecord {
    /// Dense index in `0..N`.
    pub index: usize,
    /// Stable external identifier referenced by orders and edges.
    pub id: String,
    /// Whether this location is the distribution center.
    #[serde(default)]
    pub is_depot: bool,
    /// Outgoing travel edges.
    #[serde(default)]
    pub travel: Vec<TravelEdge>,
}

/// Travel data from the owning location to another one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TravelEdge {
    /// External id of the destination location.
    pub to: String,
    /// Road distance in kilometers.
    pub km: f64,
    /// Travel time in minutes.
    pub minutes: f64,
}

/// A delivery order bound to a destination location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderRecord {
    /// Dense index in `0..M`.
    pub index: usize,
    /// External id of the destination location.
    pub location_to: String,
    /// Index into the pallet type section.
    pub pallet_type: usize,
    /// Number of pallets delivered.
    pub pallet_quantity: u32,
    /// Weight of one pallet in kilograms.
    pub weight_per_pallet: u32,
    /// Delivery window start, minutes.
    pub delivery_start: i64,
    /// Delivery window end, minutes.
    pub delivery_end: i64,
}

/// A pallet size relative to the standard pallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PalletTypeRecord {
    /// Dense index in `0..P`.
    pub index: usize,
    /// Footprint as a fraction of one standard pallet.
    pub ratio_to_std_pallet: f64,
}

/// A vehicle of the heterogeneous fleet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VehicleRecord {
    /// Dense index in `0..V`.
    pub index: usize,
    /// Loading section capacity in standard pallets.
    pub capacity_in_std_pallets: f64,
    /// Maximum payload in kilograms.
    pub max_weight: i64,
    /// Operating cost per kilometer.
    pub cost_per_km: f64,
    /// Maximum route length in kilometers.
    pub max_km: f64,
}

/// Returns `positions[index] = record position` for a section whose records
/// carry their own index, rejecting gaps and repeats.
pub(crate) fn dense_positions(
    kind: &'static str,
    indices: impl ExactSizeIterator<Item = usize>,
) -> Result<Vec<usize>> {
    let len = indices.len();
    let mut positions = vec![usize::MAX; len];
    for (pos, index) in indices.enumerate() {
        match positions.get_mut(index) {
            Some(slot) if *slot == usize::MAX => *slot = pos,
            _ => return Err(RoutingError::InvalidIndex { kind, index, len }),
        }
    }
    Ok(positions)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "locations": [{ "index": 0, "id": "DC", "is_depot": true }],
        "orders": [],
        "pallet_types": [],
        "standard_pallet": { "index": 0, "ratio_to_std_pallet": 1.0 },
        "vehicles": []
    }"#;

    #[test]
    fn test_parse_minimal() {
        let doc = InstanceDocument::from_json_str(MINIMAL).expect("valid");
        assert_eq!(doc.locations.len(), 1);
        assert!(doc.locations[0].is_depot);
        assert!(doc.locations[0].travel.is_empty());
        assert!(doc.orders.is_empty());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let json = MINIMAL.replace("\"orders\"", "\"oders\"");
        let err = InstanceDocument::from_json_str(&json).expect_err("schema violation");
        assert!(matches!(err, RoutingError::Parse(_)));
    }

    #[test]
    fn test_missing_section_rejected() {
        let json = r#"{ "locations": [], "orders": [] }"#;
        assert!(InstanceDocument::from_json_str(json).is_err());
    }

    #[test]
    fn test_from_reader() {
        let doc = InstanceDocument::from_reader(MINIMAL.as_bytes()).expect("valid");
        assert_eq!(doc.standard_pallet.ratio_to_std_pallet, 1.0);
    }

    #[test]
    fn test_from_missing_path() {
        let err = InstanceDocument::from_path("/nonexistent/instance.json").expect_err("io");
        assert!(matches!(err, RoutingError::Io(_)));
    }

    #[test]
    fn test_dense_positions_permutation() {
        let positions = dense_positions("order", [2usize, 0, 1].into_iter()).expect("dense");
        assert_eq!(positions, vec![1, 2, 0]);
    }

    #[test]
    fn test_dense_positions_gap() {
        let err = dense_positions("order", [0usize, 2].into_iter()).expect_err("gap");
        assert!(matches!(
            err,
            RoutingError::InvalidIndex {
                kind: "order",
                index: 2,
                len: 2
            }
        ));
    }

    #[test]
    fn test_dense_positions_repeat() {
        assert!(dense_positions("vehicle", [0usize, 0].into_iter()).is_err());
    }
}
