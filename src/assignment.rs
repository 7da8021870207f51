//! Doubling-radius assignment of every cell to exactly one region.
//!
//! Each pass visits the regions in priority order. A region claims every
//! candidate cell within `multiplier + sqrt(area) / km_per_degree` degrees
//! that no earlier region (in this pass or an earlier one) has claimed. When
//! a pass leaves cells unassigned the multiplier doubles and the next pass
//! starts; the run stops as soon as a pass ends with every cell labeled.
//!
//! A cell's label therefore never changes during the loop, and a cell
//! reachable by several regions goes to whichever of them reaches it at the
//! smallest multiplier, ties broken by priority order.

use crate::compute::validation::{validate_cells, validate_permutation, validate_regions};
use crate::error::{Result, ReefError};
use crate::matcher::RegionMatcher;
use crate::table::{AssignedCells, RegionOrigin};
use reefmatch_types::cell::ReefCell;
use reefmatch_types::region::ReefRegion;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Order in which regions claim contested cells within a pass.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionOrder {
    /// Input table order.
    #[default]
    TableOrder,
    /// Explicit permutation of region ordinals, highest priority first.
    Priority(Vec<usize>),
}

impl RegionOrder {
    /// Smallest effective area first, so compact regions claim the cells
    /// nearest their centers before sprawling neighbors do. Equal areas keep
    /// table order.
    pub fn smallest_first(regions: &[ReefRegion]) -> Self {
        let mut order: Vec<usize> = (0..regions.len()).collect();
        order.sort_by(|&a, &b| {
            regions[a]
                .effective_area_km2()
                .total_cmp(&regions[b].effective_area_km2())
        });
        Self::Priority(order)
    }

    /// Region ordinals in visiting order for a table of `count` regions.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if a priority list is not a permutation of `0..count`.
    pub fn resolve(&self, count: usize) -> Result<Vec<usize>> {
        match self {
            RegionOrder::TableOrder => Ok((0..count).collect()),
            RegionOrder::Priority(order) => {
                validate_permutation(order, count)?;
                Ok(order.clone())
            }
        }
    }
}

/// Outcome of one radius pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PassStats {
    /// 0-based pass number; pass `k` ran after `k` doublings.
    pub pass: usize,
    /// Radius multiplier in degrees used for this pass.
    pub multiplier: f64,
    /// Cells first labeled during this pass.
    pub newly_assigned: usize,
    /// Cells labeled after this pass.
    pub assigned: usize,
}

/// Per-pass history of a converged run.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvergenceReport {
    pub passes: Vec<PassStats>,
    pub total: usize,
    pub elapsed: Duration,
}

impl ConvergenceReport {
    /// Number of times the multiplier doubled before every cell was labeled.
    pub fn doublings(&self) -> usize {
        self.passes.len().saturating_sub(1)
    }

    /// Multiplier of the last pass.
    pub fn final_multiplier(&self) -> Option<f64> {
        self.passes.last().map(|p| p.multiplier)
    }

    pub fn multipliers(&self) -> Vec<f64> {
        self.passes.iter().map(|p| p.multiplier).collect()
    }
}

/// A fully labeled cell table and how it was reached.
#[derive(Debug, Clone)]
pub struct Converged {
    pub table: AssignedCells,
    pub report: ConvergenceReport,
}

/// Label every cell with the region that first reaches it.
///
/// `matcher` must index `cells` in order. At most `max_doublings` doublings
/// are attempted, i.e. `max_doublings + 1` passes.
///
/// # Errors
///
/// - `InvalidInput` for empty or invalid tables, a bad `order`, or a matcher
///   built over a different number of cells.
/// - `Convergence` if cells remain unlabeled after the last allowed pass.
///   No partial table is returned.
pub fn converge(
    regions: &[ReefRegion],
    cells: &[ReefCell],
    matcher: &RegionMatcher<'_>,
    order: &RegionOrder,
    max_doublings: u32,
) -> Result<Converged> {
    validate_regions(regions)?;
    validate_cells(cells)?;

    if matcher.index().len() != cells.len() {
        return Err(ReefError::InvalidInput(format!(
            "Cell index holds {} points but the cell table has {}",
            matcher.index().len(),
            cells.len()
        )));
    }

    let order = order.resolve(regions.len())?;
    let total = cells.len();
    let mut table = AssignedCells::unassigned(cells);
    let mut passes = Vec::new();
    let mut multiplier = matcher.base_radius();
    let start = Instant::now();

    for pass in 0..=max_doublings as usize {
        let before = table.assigned_count();

        for &region_idx in &order {
            let region = &regions[region_idx];
            let radius = matcher.radius_for(region, multiplier);
            let origin = RegionOrigin::Matched {
                region: region_idx,
                pass,
            };
            for id in matcher.candidates(region, radius)? {
                table.claim(id, &region.name, origin);
            }
        }

        let assigned = table.assigned_count();
        log::info!(
            "After r = {}, {} of {} cells are assigned",
            multiplier,
            assigned,
            total
        );
        passes.push(PassStats {
            pass,
            multiplier,
            newly_assigned: assigned - before,
            assigned,
        });

        if table.is_fully_assigned() {
            let elapsed = start.elapsed();
            log::debug!(
                "Region search took {:?} over {} passes",
                elapsed,
                passes.len()
            );
            return Ok(Converged {
                table,
                report: ConvergenceReport {
                    passes,
                    total,
                    elapsed,
                },
            });
        }

        multiplier *= 2.0;
    }

    Err(ReefError::Convergence {
        passes: passes.len(),
        assigned: table.assigned_count(),
        total,
    })
}
