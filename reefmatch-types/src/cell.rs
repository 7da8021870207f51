use geo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a reef cell in the input cell table.
///
/// The wrapped value is the 0-based row index used everywhere inside the
/// crate. Persisted artifacts number cells from 1, so anything written for
/// outside consumption goes through [`CellId::one_based`].
///
/// # Examples
///
/// ```
/// use reefmatch_types::cell::CellId;
///
/// let id = CellId::new(0);
/// assert_eq!(id.index(), 0);
/// assert_eq!(id.one_based(), 1);
/// assert_eq!(CellId::from_one_based(1), Some(id));
/// assert_eq!(CellId::from_one_based(0), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellId(pub usize);

impl CellId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Internal 0-based row index.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }

    /// External 1-based cell number.
    #[inline]
    pub fn one_based(self) -> usize {
        self.0 + 1
    }

    /// Convert an external 1-based cell number back to an id.
    pub fn from_one_based(number: usize) -> Option<Self> {
        number.checked_sub(1).map(Self)
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.one_based())
    }
}

/// One grid point of the simulated reef model.
///
/// Cells are created once from the input coordinate table and never change.
/// The region label a cell ends up with lives in the output table, not here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReefCell {
    /// Cell center, longitude as x and latitude as y (signed degrees).
    pub point: Point<f64>,
}

impl ReefCell {
    /// Create a cell from longitude and latitude in degrees.
    pub fn new(lon: f64, lat: f64) -> Self {
        Self {
            point: Point::new(lon, lat),
        }
    }

    pub fn from_point(point: Point<f64>) -> Self {
        Self { point }
    }

    #[inline]
    pub fn lon(&self) -> f64 {
        self.point.x()
    }

    #[inline]
    pub fn lat(&self) -> f64 {
        self.point.y()
    }

    /// Whether both coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.lon().is_finite() && self.lat().is_finite()
    }

    /// Longitude on the 0..360 range, see [`wrap_longitude_360`].
    pub fn lon_360(&self) -> f64 {
        wrap_longitude_360(self.lon())
    }
}

impl From<(f64, f64)> for ReefCell {
    fn from((lon, lat): (f64, f64)) -> Self {
        Self::new(lon, lat)
    }
}

/// Move a signed longitude onto 0..360.
///
/// Reef maps are centered on the Pacific, where the ±180 seam would split the
/// densest reef areas in two. Negative longitudes are shifted east by a full
/// turn; everything else is returned unchanged.
///
/// # Examples
///
/// ```
/// use reefmatch_types::cell::wrap_longitude_360;
///
/// assert_eq!(wrap_longitude_360(-80.0), 280.0);
/// assert_eq!(wrap_longitude_360(146.0), 146.0);
/// assert_eq!(wrap_longitude_360(0.0), 0.0);
/// ```
pub fn wrap_longitude_360(lon: f64) -> f64 {
    if lon < 0.0 { lon + 360.0 } else { lon }
}
