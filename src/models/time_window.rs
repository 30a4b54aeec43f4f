//! Delivery time windows.

use serde::{Deserialize, Serialize};

/// A closed interval of minutes `[start, end]`.
///
/// Used both for order delivery windows and for the cumulative-value ranges
/// a routing dimension enforces at a node.
///
/// # Examples
///
/// ```
/// use u_fleet_routing::models::TimeWindow;
///
/// let tw = TimeWindow::new(480, 720).unwrap();
/// assert!(tw.contains(600));
/// assert!(!tw.contains(721));
/// assert!(TimeWindow::new(10, 5).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    start: i64,
    end: i64,
}

impl TimeWindow {
    /// Creates a new window.
    ///
    /// Returns `None` if `start > end` or `start` is negative.
    pub fn new(start: i64, end: i64) -> Option<Self> {
        if start < 0 || start > end {
            return None;
        }
        Some(Self { start, end })
    }

    /// Window covering the whole planning horizon `[0, horizon]`.
    pub fn horizon(horizon: i64) -> Self {
        Self {
            start: 0,
            end: horizon.max(0),
        }
    }

    /// Earliest allowed value.
    pub fn start(&self) -> i64 {
        self.start
    }

    /// Latest allowed value.
    pub fn end(&self) -> i64 {
        self.end
    }

    /// Returns `true` if `value` lies inside the window.
    pub fn contains(&self, value: i64) -> bool {
        value >= self.start && value <= self.end
    }
}
