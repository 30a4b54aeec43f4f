//! Vehicles of the heterogeneous fleet.

use tracing::debug;

use crate::error::{Result, RoutingError};
use crate::input::{dense_positions, VehicleRecord};

use super::demand::CENTIPALLETS_PER_PALLET;

/// A vehicle with its capacity, cost and range limits.
///
/// # Examples
///
/// ```
/// use u_fleet_routing::models::Vehicle;
///
/// let v = Vehicle::new(0, 1800, 12_000, 2.5, 600_000);
/// assert_eq!(v.pallet_capacity(), 1800);
/// assert_eq!(v.max_range(), 600_000);
/// assert!((v.cost_of(10_000) - 25.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    index: usize,
    pallet_capacity: i64,
    weight_capacity: i64,
    cost_per_km: f64,
    max_range: i64,
}

impl Vehicle {
    /// Creates a vehicle.
    ///
    /// `pallet_capacity` is in centipallets, `weight_capacity` in kg and
    /// `max_range` in meters.
    pub fn new(
        index: usize,
        pallet_capacity: i64,
        weight_capacity: i64,
        cost_per_km: f64,
        max_range: i64,
    ) -> Self {
        Self {
            index,
            pallet_capacity,
            weight_capacity,
            cost_per_km,
            max_range,
        }
    }

    /// Converts a vehicle record into model units.
    ///
    /// Pallet capacity is truncated to whole centipallets and must stay
    /// positive; range is converted from km to meters. A zero weight limit
    /// or range is accepted: such a vehicle can only stay idle.
    pub fn from_record(record: &VehicleRecord) -> Result<Self> {
        let invalid = |reason: &str| RoutingError::InvalidVehicle {
            vehicle: record.index,
            reason: reason.to_string(),
        };

        if !record.capacity_in_std_pallets.is_finite() {
            return Err(invalid("pallet capacity must be a number"));
        }
        let pallet_capacity = whole_centipallets(record.capacity_in_std_pallets);
        if pallet_capacity <= 0 {
            return Err(invalid("pallet capacity must be at least one centipallet"));
        }
        if record.max_weight < 0 {
            return Err(invalid("weight capacity must be non-negative"));
        }
        if !record.cost_per_km.is_finite() || record.cost_per_km < 0.0 {
            return Err(invalid("cost per km must be a non-negative number"));
        }
        if !record.max_km.is_finite() || record.max_km < 0.0 {
            return Err(invalid("max range must be a non-negative number"));
        }

        Ok(Self::new(
            record.index,
            pallet_capacity,
            record.max_weight,
            record.cost_per_km,
            (record.max_km * 1000.0).round() as i64,
        ))
    }

    /// Vehicle index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Loading capacity in centipallets.
    pub fn pallet_capacity(&self) -> i64 {
        self.pallet_capacity
    }

    /// Payload capacity in kilograms.
    pub fn weight_capacity(&self) -> i64 {
        self.weight_capacity
    }

    /// Operating cost per kilometer.
    pub fn cost_per_km(&self) -> f64 {
        self.cost_per_km
    }

    /// Maximum route length in meters.
    pub fn max_range(&self) -> i64 {
        self.max_range
    }

    /// Cost of driving `meters` with this vehicle.
    pub fn cost_of(&self, meters: i64) -> f64 {
        meters as f64 / 1000.0 * self.cost_per_km
    }
}

/// Truncates standard pallets to centipallets.
///
/// The product is snapped to six decimals first, so `2.3 × 100` (which is
/// `229.999…` in binary) yields 230 rather than 229.
fn whole_centipallets(pallets: f64) -> i64 {
    let scaled = pallets * CENTIPALLETS_PER_PALLET;
    ((scaled * 1e6).round() / 1e6).floor() as i64
}

/// The fleet, ordered by vehicle index.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fleet {
    vehicles: Vec<Vehicle>,
}

impl Fleet {
    /// Creates a fleet from already converted vehicles.
    pub fn new(vehicles: Vec<Vehicle>) -> Self {
        Self { vehicles }
    }

    /// Loads and validates all vehicle records.
    pub fn load(records: &[VehicleRecord]) -> Result<Self> {
        let positions = dense_positions("vehicle", records.iter().map(|r| r.index))?;
        let vehicles = positions
            .iter()
            .map(|&pos| Vehicle::from_record(&records[pos]))
            .collect::<Result<Vec<_>>>()?;
        debug!(vehicles = vehicles.len(), "fleet loaded");
        Ok(Self { vehicles })
    }

    /// All vehicles.
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// Vehicle by index.
    pub fn get(&self, index: usize) -> Option<&Vehicle> {
        self.vehicles.get(index)
    }

    /// Number of vehicles.
    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    /// Returns `true` if the fleet is empty.
    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    /// Pallet capacities by vehicle.
    pub fn pallet_capacities(&self) -> Vec<i64> {
        self.vehicles.iter().map(|v| v.pallet_capacity).collect()
    }

    /// Weight capacities by vehicle.
    pub fn weight_capacities(&self) -> Vec<i64> {
        self.vehicles.iter().map(|v| v.weight_capacity).collect()
    }

    /// Maximum ranges by vehicle.
    pub fn max_ranges(&self) -> Vec<i64> {
        self.vehicles.iter().map(|v| v.max_range).collect()
    }
}
