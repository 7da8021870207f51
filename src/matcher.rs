//! Candidate cells for each named reef region.
//!
//! A region is treated as a circle around its reported center whose radius
//! comes from its reported area:
//!
//! ```text
//! radius = base + sqrt(max(area_km2, 0)) / 111
//! ```
//!
//! in degrees, where 111 approximates kilometers per degree at the equator
//! and `base` (0.5 by default) is a fixed allowance for the cell size. The
//! formula is a modeling choice that downstream comparisons depend on; keep
//! it exactly as is.

use crate::compute::spatial::SpatialIndex;
use crate::config::Config;
use crate::error::{Result, ReefError};
use reefmatch_types::cell::CellId;
use reefmatch_types::region::ReefRegion;

/// Search radius in degrees for a region of `area_km2`.
///
/// Missing, NaN and negative areas count as zero, so the result is never
/// below `base`.
///
/// # Examples
///
/// ```
/// use reefmatch::matcher::search_radius;
///
/// assert_eq!(search_radius(None, 0.5, 111.0), 0.5);
/// assert_eq!(search_radius(Some(f64::NAN), 0.5, 111.0), 0.5);
/// assert_eq!(search_radius(Some(12321.0), 0.5, 111.0), 1.5);
/// ```
pub fn search_radius(area_km2: Option<f64>, base: f64, km_per_degree: f64) -> f64 {
    let area = match area_km2 {
        Some(area) if area > 0.0 => area,
        _ => 0.0,
    };
    base + area.sqrt() / km_per_degree
}

/// Cells within `radius` degrees of the region's center. Purely a query.
pub fn candidates(region: &ReefRegion, index: &SpatialIndex, radius: f64) -> Result<Vec<CellId>> {
    index.query_range(&region.center, radius)
}

/// Radius queries for regions against one cell index.
pub struct RegionMatcher<'a> {
    index: &'a SpatialIndex,
    base_radius: f64,
    km_per_degree: f64,
}

impl<'a> RegionMatcher<'a> {
    pub fn new(index: &'a SpatialIndex, config: &Config) -> Self {
        Self {
            index,
            base_radius: config.base_radius_deg,
            km_per_degree: config.km_per_degree,
        }
    }

    pub fn index(&self) -> &SpatialIndex {
        self.index
    }

    /// Base allowance in degrees, the first radius multiplier.
    pub fn base_radius(&self) -> f64 {
        self.base_radius
    }

    /// Radius for `region` with the given multiplier in place of the base
    /// allowance.
    pub fn radius_for(&self, region: &ReefRegion, multiplier: f64) -> f64 {
        search_radius(region.area_km2, multiplier, self.km_per_degree)
    }

    /// Radius for `region` at the base allowance.
    pub fn base_radius_for(&self, region: &ReefRegion) -> f64 {
        self.radius_for(region, self.base_radius)
    }

    pub fn candidates(&self, region: &ReefRegion, radius: f64) -> Result<Vec<CellId>> {
        candidates(region, self.index, radius)
    }

    /// Run the base-radius query for every region, in table order.
    pub fn match_all(&self, regions: &[ReefRegion]) -> Result<RegionMatches> {
        let mut matches = Vec::with_capacity(regions.len());

        for (idx, region) in regions.iter().enumerate() {
            let radius = self.base_radius_for(region);
            let cells = self.candidates(region, radius)?;
            matches.push(RegionMatch {
                region: idx,
                radius,
                cells,
            });
        }

        let result = RegionMatches {
            matches,
            cell_count: self.index.len(),
        };
        log::info!(
            "{} of {} regions have candidate cells at the base radius",
            result.matched_count(),
            result.len()
        );
        Ok(result)
    }
}

/// Candidate cells of one region.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionMatch {
    /// Region ordinal in the input table.
    pub region: usize,
    /// Radius used for the query, in degrees.
    pub radius: f64,
    /// Candidate cells, sorted by id.
    pub cells: Vec<CellId>,
}

impl RegionMatch {
    /// Whether any cell fell within the region's radius.
    pub fn is_matched(&self) -> bool {
        !self.cells.is_empty()
    }

    /// Candidate cells as external 1-based numbers.
    pub fn cell_numbers(&self) -> Vec<usize> {
        self.cells.iter().map(|id| id.one_based()).collect()
    }
}

/// Candidate lists for every region, in table order.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionMatches {
    matches: Vec<RegionMatch>,
    cell_count: usize,
}

impl RegionMatches {
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn get(&self, region: usize) -> Option<&RegionMatch> {
        self.matches.get(region)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegionMatch> {
        self.matches.iter()
    }

    /// Number of regions with at least one candidate cell.
    pub fn matched_count(&self) -> usize {
        self.matches.iter().filter(|m| m.is_matched()).count()
    }

    /// Per-region matched flags, in table order.
    pub fn matched_flags(&self) -> Vec<bool> {
        self.matches.iter().map(|m| m.is_matched()).collect()
    }

    /// Average a per-cell quantity over each region's candidate cells.
    ///
    /// `values[i]` belongs to cell `i`. Regions without candidates get
    /// `None`.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if `values` does not have one entry per indexed cell.
    pub fn mean_over_candidates(&self, values: &[f64]) -> Result<Vec<Option<f64>>> {
        if values.len() != self.cell_count {
            return Err(ReefError::InvalidInput(format!(
                "Expected {} per-cell values, got {}",
                self.cell_count,
                values.len()
            )));
        }

        Ok(self
            .matches
            .iter()
            .map(|m| {
                if m.cells.is_empty() {
                    return None;
                }
                let sum: f64 = m.cells.iter().map(|id| values[id.index()]).sum();
                Some(sum / m.cells.len() as f64)
            })
            .collect())
    }
}
