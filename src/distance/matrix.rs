//! Dense integer arc matrices.

/// A dense n×n integer matrix stored in row-major order.
///
/// Each entry also records whether travel data was supplied for it. Entries
/// never set read as `0`; [`is_known`](Self::is_known) tells a genuine zero
/// apart from absent data. The diagonal is always known and zero.
///
/// # Examples
///
/// ```
/// use u_fleet_routing::distance::ArcMatrix;
///
/// let mut m = ArcMatrix::new(3);
/// m.set(0, 1, 12_500);
/// assert_eq!(m.get(0, 1), 12_500);
/// assert_eq!(m.get(1, 0), 0);
/// assert!(m.is_known(0, 1));
/// assert!(!m.is_known(1, 0));
/// assert!(m.is_known(2, 2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArcMatrix {
    data: Vec<i64>,
    known: Vec<bool>,
    size: usize,
}

impl ArcMatrix {
    /// Creates a matrix of the given size with no travel data.
    pub fn new(size: usize) -> Self {
        let mut known = vec![false; size * size];
        for i in 0..size {
            known[i * size + i] = true;
        }
        Self {
            data: vec![0; size * size],
            known,
            size,
        }
    }

    /// Creates a fully known matrix from an explicit row-major grid.
    ///
    /// Returns `None` if the data length doesn't match `size * size`.
    pub fn from_data(size: usize, data: Vec<i64>) -> Option<Self> {
        if data.len() != size * size {
            return None;
        }
        Some(Self {
            known: vec![true; data.len()],
            data,
            size,
        })
    }

    /// Returns the value from `from` to `to` (`0` when absent).
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, from: usize, to: usize) -> i64 {
        self.data[from * self.size + to]
    }

    /// Sets the value from `from` to `to` and marks it as known.
    pub fn set(&mut self, from: usize, to: usize, value: i64) {
        let idx = from * self.size + to;
        self.data[idx] = value;
        self.known[idx] = true;
    }

    /// Returns `true` if a value was supplied for this pair.
    pub fn is_known(&self, from: usize, to: usize) -> bool {
        self.known[from * self.size + to]
    }

    /// Number of rows (and columns).
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of off-diagonal pairs without data.
    pub fn missing_pairs(&self) -> usize {
        self.known.iter().filter(|&&k| !k).count()
    }

    /// Row-major view of the values.
    pub fn as_slice(&self) -> &[i64] {
        &self.data
    }

    /// Returns `true` if `m[i][j] == m[j][i]` for every pair.
    pub fn is_symmetric(&self) -> bool {
        for i in 0..self.size {
            for j in (i + 1)..self.size {
                if self.get(i, j) != self.get(j, i) {
                    return false;
                }
            }
        }
        true
    }
}

/// Distance (meters) and travel time (minutes) over the same index space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TravelMatrices {
    /// Distances in meters.
    pub distance: ArcMatrix,
    /// Travel times in minutes.
    pub time: ArcMatrix,
}

impl TravelMatrices {
    /// Creates empty matrices of the given size.
    pub fn new(size: usize) -> Self {
        Self {
            distance: ArcMatrix::new(size),
            time: ArcMatrix::new(size),
        }
    }

    /// Number of indexed points.
    pub fn size(&self) -> usize {
        self.distance.size()
    }
}
