//! Reef-cell to reef-region assignment and covariate PCA.
//!
//! ## Features
//! - **Spatial matching**: R-tree radius queries from each region center,
//!   with a radius derived from the region's reported area
//! - **Convergence**: a doubling-radius loop that labels every cell exactly
//!   once, first write wins, in an explicit region priority order
//! - **Overrides**: literal lon/lat boxes that correct known mismatches
//! - **PCA**: correlation or covariance eigen-decomposition of covariates
//! - **Export**: GeoJSON features and atomically written snapshot files
//!
//! ```rust
//! use reefmatch::prelude::*;
//!
//! let regions = vec![
//!     ReefRegion::new("AuA", 146.0, -18.0, Some(2500.0)),
//!     ReefRegion::new("Pac", -150.0, -17.0, None),
//! ];
//! let cells = vec![
//!     ReefCell::new(146.3, -18.2),
//!     ReefCell::new(-149.5, -17.5),
//!     ReefCell::new(150.0, -20.0),
//! ];
//!
//! let run = RegionAssigner::builder().build()?.run(&regions, &cells)?;
//! assert!(run.table.is_fully_assigned());
//! assert_eq!(run.table.label(CellId::new(1)), "Pac");
//! # Ok::<(), reefmatch::ReefError>(())
//! ```

pub mod assignment;
pub mod builder;
pub mod compute;
pub mod config;
pub mod error;
pub mod export;
pub mod matcher;
pub mod overrides;
pub mod pca;
pub mod table;

pub use assignment::{ConvergenceReport, PassStats, RegionOrder, converge};
pub use builder::{AssignerBuilder, AssignmentRun, RegionAssigner};
pub use compute::spatial::SpatialIndex;
pub use config::Config;
pub use error::{ReefError, Result};
pub use export::{CellTableFile, ExportOptions, SnapshotFormat, to_feature_collection, to_geojson};
pub use matcher::{RegionMatch, RegionMatcher, RegionMatches, search_radius};
pub use overrides::{OverrideRules, WEST_ATLANTIC};
pub use pca::{PcaOptions, PcaResult, pca};
pub use table::{AssignedCells, CellRecord, RegionOrigin};

pub use reefmatch_types::UNASSIGNED_LABEL;
pub use reefmatch_types::bbox::OverrideBox;
pub use reefmatch_types::cell::{CellId, ReefCell};
pub use reefmatch_types::region::ReefRegion;

pub use geo::Point;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{AssignerBuilder, RegionAssigner, ReefError, Result};

    pub use crate::{CellId, OverrideBox, ReefCell, ReefRegion};

    pub use crate::{AssignedCells, Config, OverrideRules, RegionOrder};

    pub use crate::{PcaOptions, pca};

    pub use geo::Point;
}
