pub mod rtree;
pub use rtree::{IndexedCell, SpatialIndex};
