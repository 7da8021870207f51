//! # reefmatch-types
//!
//! Core data types shared by the reefmatch region-assignment pipeline.
//!
//! - **Cells**: `ReefCell`, `CellId` (0-based internally, 1-based externally)
//! - **Regions**: `ReefRegion` with a reported area and a label
//! - **Overrides**: `OverrideBox`, an open lon/lat box that forces a label
//!
//! All types are serializable with Serde and built on top of the `geo` crate's
//! `Point`.
//!
//! ## Examples
//!
//! ```rust
//! use reefmatch_types::cell::{CellId, ReefCell};
//! use reefmatch_types::region::ReefRegion;
//!
//! let cell = ReefCell::new(146.5, -18.2);
//! let region = ReefRegion::new("AuA", 146.0, -18.0, Some(2500.0));
//! assert_eq!(CellId::new(0).one_based(), 1);
//! assert!(cell.lon() > region.lon());
//! ```

pub mod bbox;
pub mod cell;
pub mod region;

/// External label written for a cell that no region has claimed.
pub const UNASSIGNED_LABEL: &str = "none";
