//! Per-node pallet/weight demand and delivery windows.

use tracing::debug;

use crate::error::{Result, RoutingError};
use crate::input::{dense_positions, OrderRecord, PalletTypeRecord};

use super::TimeWindow;

/// Scale between standard pallets and the integer centipallet unit.
pub const CENTIPALLETS_PER_PALLET: f64 = 100.0;

/// Demand and window vectors indexed by node (index 0 = depot placeholder).
///
/// Pallet demand is in centipallets: `quantity × ratio × 100`, rounded to the
/// nearest integer. Weight demand is `quantity × weight_per_pallet` in kg.
/// The depot has zero demand and the window `[0, horizon]`, where the horizon
/// is the latest delivery end over all orders.
///
/// # Examples
///
/// ```
/// use u_fleet_routing::input::{OrderRecord, PalletTypeRecord};
/// use u_fleet_routing::models::NodeDemands;
///
/// let pallets = vec![PalletTypeRecord { index: 0, ratio_to_std_pallet: 0.5 }];
/// let standard = PalletTypeRecord { index: 0, ratio_to_std_pallet: 1.0 };
/// let orders = vec![OrderRecord {
///     index: 0,
///     location_to: "A".into(),
///     pallet_type: 0,
///     pallet_quantity: 3,
///     weight_per_pallet: 200,
///     delivery_start: 60,
///     delivery_end: 240,
/// }];
///
/// let demands = NodeDemands::extract(&orders, &pallets, &standard).unwrap();
/// assert_eq!(demands.len(), 2);
/// assert_eq!(demands.pallets(1), 150);
/// assert_eq!(demands.weight(1), 600);
/// assert_eq!(demands.pallets(0), 0);
/// assert_eq!(demands.horizon(), 240);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDemands {
    pallets: Vec<i64>,
    weight: Vec<i64>,
    windows: Vec<TimeWindow>,
    horizon: i64,
}

impl NodeDemands {
    /// Extracts node-indexed demands and windows from the order records.
    ///
    /// The standard pallet's ratio is validated but does not scale demand:
    /// every `ratio_to_std_pallet` is already expressed in standard pallets.
    pub fn extract(
        orders: &[OrderRecord],
        pallet_types: &[PalletTypeRecord],
        standard: &PalletTypeRecord,
    ) -> Result<Self> {
        if !is_valid_ratio(standard.ratio_to_std_pallet) {
            return Err(RoutingError::InvalidStandardRatio {
                ratio: standard.ratio_to_std_pallet,
            });
        }

        let pallet_positions =
            dense_positions("pallet type", pallet_types.iter().map(|p| p.index))?;
        let mut ratios = Vec::with_capacity(pallet_types.len());
        for &pos in &pallet_positions {
            let pallet = &pallet_types[pos];
            if !is_valid_ratio(pallet.ratio_to_std_pallet) {
                return Err(RoutingError::InvalidPalletRatio {
                    pallet_type: pallet.index,
                    ratio: pallet.ratio_to_std_pallet,
                });
            }
            ratios.push(pallet.ratio_to_std_pallet);
        }

        let order_positions = dense_positions("order", orders.iter().map(|o| o.index))?;
        let n = orders.len() + 1;
        let mut pallets = Vec::with_capacity(n);
        let mut weight = Vec::with_capacity(n);
        let mut windows = Vec::with_capacity(n);
        pallets.push(0);
        weight.push(0);

        let mut order_windows = Vec::with_capacity(orders.len());
        for &pos in &order_positions {
            let order = &orders[pos];
            let ratio = *ratios.get(order.pallet_type).ok_or(
                RoutingError::UnknownPalletType {
                    order: order.index,
                    pallet_type: order.pallet_type,
                },
            )?;
            let window = TimeWindow::new(order.delivery_start, order.delivery_end).ok_or(
                RoutingError::InvalidWindow {
                    order: order.index,
                    start: order.delivery_start,
                    end: order.delivery_end,
                },
            )?;
            let quantity = f64::from(order.pallet_quantity);
            pallets.push((quantity * ratio * CENTIPALLETS_PER_PALLET).round() as i64);
            weight.push(i64::from(order.pallet_quantity) * i64::from(order.weight_per_pallet));
            order_windows.push(window);
        }

        let horizon = order_windows.iter().map(|w| w.end()).max().unwrap_or(0);
        windows.push(TimeWindow::horizon(horizon));
        windows.extend(order_windows);

        debug!(
            orders = orders.len(),
            horizon,
            total_centipallets = pallets.iter().sum::<i64>(),
            "demands extracted"
        );

        Ok(Self {
            pallets,
            weight,
            windows,
            horizon,
        })
    }

    /// Builds demands directly in node space.
    ///
    /// `windows` holds `(node, start, end)`; nodes without an entry, and the
    /// depot, get `[0, horizon]`.
    pub fn from_parts(
        pallets: Vec<i64>,
        weight: Vec<i64>,
        windows: &[(usize, i64, i64)],
    ) -> Result<Self> {
        let n = pallets.len();
        if weight.len() != n {
            return Err(RoutingError::InvalidIndex {
                kind: "weight demand",
                index: weight.len(),
                len: n,
            });
        }
        let mut explicit: Vec<Option<TimeWindow>> = vec![None; n];
        for &(node, start, end) in windows {
            if node == 0 || node >= n {
                return Err(RoutingError::InvalidIndex {
                    kind: "window node",
                    index: node,
                    len: n,
                });
            }
            explicit[node] = Some(TimeWindow::new(start, end).ok_or(
                RoutingError::InvalidWindow {
                    order: node - 1,
                    start,
                    end,
                },
            )?);
        }
        let horizon = explicit.iter().flatten().map(|w| w.end()).max().unwrap_or(0);
        let windows = explicit
            .into_iter()
            .map(|w| w.unwrap_or(TimeWindow::horizon(horizon)))
            .collect();
        Ok(Self {
            pallets,
            weight,
            windows,
            horizon,
        })
    }

    /// Number of nodes (orders + depot).
    pub fn len(&self) -> usize {
        self.pallets.len()
    }

    /// Returns `true` if only the depot placeholder exists.
    pub fn is_empty(&self) -> bool {
        self.pallets.len() <= 1
    }

    /// Pallet demand of a node in centipallets.
    pub fn pallets(&self, node: usize) -> i64 {
        self.pallets[node]
    }

    /// Weight demand of a node in kilograms.
    pub fn weight(&self, node: usize) -> i64 {
        self.weight[node]
    }

    /// Delivery window of a node.
    pub fn window(&self, node: usize) -> TimeWindow {
        self.windows[node]
    }

    /// All pallet demands by node.
    pub fn pallet_demands(&self) -> &[i64] {
        &self.pallets
    }

    /// All weight demands by node.
    pub fn weight_demands(&self) -> &[i64] {
        &self.weight
    }

    /// Latest delivery end over all orders.
    pub fn horizon(&self) -> i64 {
        self.horizon
    }
}

fn is_valid_ratio(ratio: f64) -> bool {
    ratio.is_finite() && ratio > 0.0
}
