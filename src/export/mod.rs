//! Writing the final cell table for downstream tools.
//!
//! - [`geojson`]: one Point feature per cell, plus override boxes as
//!   Polygons, for maps and GIS tools.
//! - [`snapshot`]: an atomically replaced file holding the whole table.

pub mod geojson;
pub mod snapshot;

pub use self::geojson::{
    ExportOptions, from_geojson, overrides_to_feature_collection, to_feature_collection, to_geojson,
};
pub use self::snapshot::{CellTableFile, SnapshotFormat};
