use geo::{Point, Rect, coord};
use serde::{Deserialize, Serialize};

/// A hand-specified lon/lat box that forces a region label.
///
/// Containment is strict on all four edges: a cell exactly on a boundary is
/// outside the box.
///
/// # Examples
///
/// ```
/// use reefmatch_types::bbox::OverrideBox;
/// use geo::Point;
///
/// let brazil = OverrideBox::new(-40.0, -25.0, -26.0, -16.0, "WAtl");
/// assert!(brazil.contains(&Point::new(-30.0, -20.0)));
/// assert!(!brazil.contains(&Point::new(-25.0, -20.0)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideBox {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
    /// Label forced onto every cell inside the box.
    pub region: String,
}

impl OverrideBox {
    pub fn new(
        lon_min: f64,
        lon_max: f64,
        lat_min: f64,
        lat_max: f64,
        region: impl Into<String>,
    ) -> Self {
        Self {
            lon_min,
            lon_max,
            lat_min,
            lat_max,
            region: region.into(),
        }
    }

    /// Open-interval containment test on both axes.
    #[inline]
    pub fn contains(&self, point: &Point<f64>) -> bool {
        let (lon, lat) = (point.x(), point.y());
        lon > self.lon_min && lon < self.lon_max && lat > self.lat_min && lat < self.lat_max
    }

    /// Closed rectangle covering the box, for envelope queries and display.
    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(
            coord! { x: self.lon_min, y: self.lat_min },
            coord! { x: self.lon_max, y: self.lat_max },
        )
    }

    pub fn is_finite(&self) -> bool {
        [self.lon_min, self.lon_max, self.lat_min, self.lat_max]
            .iter()
            .all(|v| v.is_finite())
    }
}
