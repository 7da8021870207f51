//! Builder for a configured assignment run.
//!
//! A run sequences the whole pipeline: validate the input tables, index the
//! cells once, converge on a label for every cell, apply the override boxes
//! and, when a snapshot path is set, write the final table to disk.

use crate::assignment::{ConvergenceReport, RegionOrder, converge};
use crate::compute::spatial::SpatialIndex;
use crate::compute::validation::validate_regions;
use crate::config::Config;
use crate::error::{Result, ReefError};
use crate::export::{CellTableFile, SnapshotFormat};
use crate::matcher::{RegionMatcher, RegionMatches};
use crate::table::AssignedCells;
use reefmatch_types::cell::ReefCell;
use reefmatch_types::region::ReefRegion;
use std::path::PathBuf;

/// Builder for [`RegionAssigner`].
#[derive(Debug)]
pub struct AssignerBuilder {
    config: Config,
    order: RegionOrder,
    snapshot_path: Option<PathBuf>,
    snapshot_format: SnapshotFormat,
}

impl AssignerBuilder {
    /// Create a builder with the reference configuration and table order.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            order: RegionOrder::TableOrder,
            snapshot_path: None,
            snapshot_format: SnapshotFormat::default(),
        }
    }

    /// Set the assignment configuration (radius, cap, overrides).
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Set the order in which regions claim contested cells.
    pub fn region_order(mut self, order: RegionOrder) -> Self {
        self.order = order;
        self
    }

    /// Write the final table to `path` after every successful run.
    pub fn snapshot_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }

    pub fn snapshot_format(mut self, format: SnapshotFormat) -> Self {
        self.snapshot_format = format;
        self
    }

    /// Validate the configuration and build the assigner.
    pub fn build(self) -> Result<RegionAssigner> {
        self.config
            .validate()
            .map_err(|e| ReefError::InvalidInput(format!("Invalid configuration: {}", e)))?;

        let snapshot = self
            .snapshot_path
            .map(|path| CellTableFile::new(path, self.snapshot_format));

        Ok(RegionAssigner {
            config: self.config,
            order: self.order,
            snapshot,
        })
    }
}

impl Default for AssignerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A validated, reusable assignment pipeline.
pub struct RegionAssigner {
    config: Config,
    order: RegionOrder,
    snapshot: Option<CellTableFile>,
}

impl RegionAssigner {
    pub fn builder() -> AssignerBuilder {
        AssignerBuilder::new()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn region_order(&self) -> &RegionOrder {
        &self.order
    }

    /// Assign every cell to a region.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for empty or malformed tables or a bad region order.
    /// - `Convergence` if the radius cap is hit first.
    /// - I/O and serialization errors from the snapshot, if one is set.
    pub fn run(&self, regions: &[ReefRegion], cells: &[ReefCell]) -> Result<AssignmentRun> {
        let index = SpatialIndex::from_cells(cells)?;
        let matcher = RegionMatcher::new(&index, &self.config);

        let converged = converge(
            regions,
            cells,
            &matcher,
            &self.order,
            self.config.max_doublings,
        )?;

        let mut table = converged.table;
        let override_writes = self.config.overrides.apply(&mut table);

        if let Some(snapshot) = &self.snapshot {
            snapshot.save(&table)?;
        }

        log::info!(
            "Assigned {} cells to {} regions after {} doublings",
            table.len(),
            regions.len(),
            converged.report.doublings()
        );

        Ok(AssignmentRun {
            table,
            report: converged.report,
            override_writes,
        })
    }

    /// Candidate cells of every region at the base radius, without assigning.
    pub fn match_regions(
        &self,
        regions: &[ReefRegion],
        cells: &[ReefCell],
    ) -> Result<RegionMatches> {
        validate_regions(regions)?;
        let index = SpatialIndex::from_cells(cells)?;
        RegionMatcher::new(&index, &self.config).match_all(regions)
    }
}

/// Final table of a run, with its convergence history.
#[derive(Debug, Clone)]
pub struct AssignmentRun {
    pub table: AssignedCells,
    pub report: ConvergenceReport,
    /// Cell writes performed by override rules.
    pub override_writes: usize,
}
