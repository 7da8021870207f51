use geo::Point;
use serde::{Deserialize, Serialize};

/// A named, human-curated reef area with a reported center and footprint.
///
/// The `name` is the label handed to every cell the region claims. Several
/// table rows may share a label (many reefs belong to the same broad ocean
/// region); a region's identity is its label plus its row ordinal.
///
/// # Examples
///
/// ```
/// use reefmatch_types::region::ReefRegion;
///
/// let reef = ReefRegion::new("Pac", -149.9, -17.5, Some(1200.0));
/// assert_eq!(reef.effective_area_km2(), 1200.0);
///
/// let unknown = ReefRegion::new("Pac", -150.0, -17.0, None);
/// assert_eq!(unknown.effective_area_km2(), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReefRegion {
    /// Label written to claimed cells.
    pub name: String,
    /// Reported center, longitude as x and latitude as y.
    pub center: Point<f64>,
    /// Reported area in square kilometers, if the source lists one.
    #[serde(default)]
    pub area_km2: Option<f64>,
}

impl ReefRegion {
    pub fn new(name: impl Into<String>, lon: f64, lat: f64, area_km2: Option<f64>) -> Self {
        Self {
            name: name.into(),
            center: Point::new(lon, lat),
            area_km2,
        }
    }

    #[inline]
    pub fn lon(&self) -> f64 {
        self.center.x()
    }

    #[inline]
    pub fn lat(&self) -> f64 {
        self.center.y()
    }

    /// Area used for radius computation.
    ///
    /// Missing, NaN and negative areas all count as zero.
    pub fn effective_area_km2(&self) -> f64 {
        match self.area_km2 {
            Some(area) if area > 0.0 => area,
            _ => 0.0,
        }
    }

    /// Whether the source table reported a usable area for this region.
    pub fn has_area(&self) -> bool {
        matches!(self.area_km2, Some(area) if area.is_finite() && area >= 0.0)
    }
}
