#![allow(dead_code)]

use serde_json::{json, Value};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use u_fleet_routing::{InstanceDocument, SolveConfig};

/// Installs a test subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_test_writer())
        .with(EnvFilter::from_default_env())
        .try_init();
}

/// A sequential config with a short search, enough for tiny instances.
pub fn quick_config() -> SolveConfig {
    SolveConfig::default()
        .with_parallel(false)
        .with_max_lns_iterations(30)
        .with_time_limit_ms(30_000)
        .with_local_search_time_limit_ms(1_000)
}

/// Incrementally assembled instance document.
#[derive(Debug, Default)]
pub struct DocBuilder {
    locations: Vec<Value>,
    orders: Vec<Value>,
    vehicles: Vec<Value>,
    pallet_ratios: Vec<f64>,
    standard_ratio: Option<f64>,
}

impl DocBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a location; the first one added is the depot.
    pub fn location(mut self, id: &str, travel: &[(&str, f64, f64)]) -> Self {
        let index = self.locations.len();
        let travel: Vec<Value> = travel
            .iter()
            .map(|(to, km, minutes)| json!({ "to": to, "km": km, "minutes": minutes }))
            .collect();
        self.locations.push(json!({
            "index": index,
            "id": id,
            "is_depot": index == 0,
            "travel": travel,
        }));
        self
    }

    /// Adds a pallet type; without any, type 0 is the standard pallet.
    pub fn pallet_type(mut self, ratio: f64) -> Self {
        self.pallet_ratios.push(ratio);
        self
    }

    pub fn standard_ratio(mut self, ratio: f64) -> Self {
        self.standard_ratio = Some(ratio);
        self
    }

    /// Adds an order of standard pallets.
    pub fn order(self, to: &str, pallets: u32, kg_per_pallet: u32, window: (i64, i64)) -> Self {
        self.typed_order(to, 0, pallets, kg_per_pallet, window)
    }

    /// Adds an order of the given pallet type.
    pub fn typed_order(
        mut self,
        to: &str,
        pallet_type: usize,
        pallets: u32,
        kg_per_pallet: u32,
        window: (i64, i64),
    ) -> Self {
        let index = self.orders.len();
        self.orders.push(json!({
            "index": index,
            "location_to": to,
            "pallet_type": pallet_type,
            "pallet_quantity": pallets,
            "weight_per_pallet": kg_per_pallet,
            "delivery_start": window.0,
            "delivery_end": window.1,
        }));
        self
    }

    pub fn vehicle(mut self, pallets: f64, max_weight: i64, cost_per_km: f64, max_km: f64) -> Self {
        let index = self.vehicles.len();
        self.vehicles.push(json!({
            "index": index,
            "capacity_in_std_pallets": pallets,
            "max_weight": max_weight,
            "cost_per_km": cost_per_km,
            "max_km": max_km,
        }));
        self
    }

    pub fn json(&self) -> String {
        let ratios = if self.pallet_ratios.is_empty() {
            vec![1.0]
        } else {
            self.pallet_ratios.clone()
        };
        let pallet_types: Vec<Value> = ratios
            .iter()
            .enumerate()
            .map(|(index, ratio)| json!({ "index": index, "ratio_to_std_pallet": ratio }))
            .collect();
        json!({
            "locations": self.locations,
            "orders": self.orders,
            "pallet_types": pallet_types,
            "standard_pallet": {
                "index": 0,
                "ratio_to_std_pallet": self.standard_ratio.unwrap_or(1.0),
            },
            "vehicles": self.vehicles,
        })
        .to_string()
    }

    pub fn build(&self) -> InstanceDocument {
        InstanceDocument::from_json_str(&self.json()).expect("generated document parses")
    }
}
