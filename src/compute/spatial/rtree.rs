//! Cell index using an R-tree over lon/lat degree space.
//!
//! Reef cells are bulk-loaded once into an `rstar` R-tree. Range queries use
//! `locate_within_distance`, which prunes by node envelope and then filters
//! by exact squared distance, giving O(log n + k) queries instead of a scan
//! over every cell.
//!
//! ## Distance
//!
//! Distances are plain Euclidean distances in degrees. Longitude degrees
//! shrink with latitude, so this is an approximation; region matching is
//! built around that approximation and must not be made geodesic.
//!
//! ## Example
//!
//! ```rust
//! use reefmatch::SpatialIndex;
//! use geo::Point;
//!
//! let index = SpatialIndex::build(&[
//!     Point::new(0.0, 0.0),
//!     Point::new(0.3, 0.3),
//!     Point::new(5.0, 5.0),
//! ])
//! .unwrap();
//!
//! let hits = index.query_range(&Point::new(0.0, 0.0), 0.5).unwrap();
//! let numbers: Vec<usize> = hits.iter().map(|id| id.one_based()).collect();
//! assert_eq!(numbers, vec![1, 2]);
//! ```

use crate::compute::validation::validate_coordinate;
use crate::error::{Result, ReefError};
use geo::Point;
use reefmatch_types::cell::{CellId, ReefCell};
use rstar::{Point as RstarPoint, PointDistance, RTree};

/// 2D point for R-tree indexing, carrying its cell row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexedCell {
    pub lon: f64,
    pub lat: f64,
    pub index: usize,
}

impl IndexedCell {
    pub fn new(lon: f64, lat: f64, index: usize) -> Self {
        Self { lon, lat, index }
    }

    fn probe(point: &Point<f64>) -> Self {
        Self::new(point.x(), point.y(), usize::MAX)
    }
}

impl RstarPoint for IndexedCell {
    type Scalar = f64;
    const DIMENSIONS: usize = 2;

    fn generate(mut generator: impl FnMut(usize) -> Self::Scalar) -> Self {
        Self {
            lon: generator(0),
            lat: generator(1),
            index: 0,
        }
    }

    fn nth(&self, index: usize) -> Self::Scalar {
        match index {
            0 => self.lon,
            1 => self.lat,
            _ => unreachable!(),
        }
    }

    fn nth_mut(&mut self, index: usize) -> &mut Self::Scalar {
        match index {
            0 => &mut self.lon,
            1 => &mut self.lat,
            _ => unreachable!(),
        }
    }
}

/// Immutable point index over every reef cell.
///
/// Built once before any matching query; no method takes `&mut self`.
pub struct SpatialIndex {
    tree: RTree<IndexedCell>,
    /// Cell coordinates by row, for constant-time lookup.
    points: Vec<Point<f64>>,
}

impl SpatialIndex {
    /// Bulk-load an index over `points`; point `i` becomes cell `i`.
    ///
    /// Fails with `InvalidInput` on an empty slice, a non-finite coordinate,
    /// or a latitude outside [-90, 90].
    pub fn build(points: &[Point<f64>]) -> Result<Self> {
        if points.is_empty() {
            return Err(ReefError::InvalidInput(
                "Cannot build a spatial index over zero points".to_string(),
            ));
        }

        let mut entries = Vec::with_capacity(points.len());
        for (idx, point) in points.iter().enumerate() {
            validate_coordinate(point)
                .map_err(|e| ReefError::InvalidInput(format!("Point at index {}: {}", idx, e)))?;
            entries.push(IndexedCell::new(point.x(), point.y(), idx));
        }

        let tree = RTree::bulk_load(entries);
        log::debug!("Built cell index over {} points", tree.size());
        Ok(Self {
            tree,
            points: points.to_vec(),
        })
    }

    /// Index the cell table.
    pub fn from_cells(cells: &[ReefCell]) -> Result<Self> {
        let points: Vec<Point<f64>> = cells.iter().map(|cell| cell.point).collect();
        Self::build(&points)
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Cells whose Euclidean distance to `center` is at most `radius` degrees.
    ///
    /// Results are sorted by cell id. A radius of zero matches only cells
    /// exactly at `center`.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if `center` is not a valid coordinate or `radius` is
    /// negative or NaN.
    pub fn query_range(&self, center: &Point<f64>, radius: f64) -> Result<Vec<CellId>> {
        validate_coordinate(center)?;

        if radius.is_nan() || radius < 0.0 {
            return Err(ReefError::InvalidInput(format!(
                "Query radius must be non-negative, got: {}",
                radius
            )));
        }

        let mut hits: Vec<CellId> = self
            .tree
            .locate_within_distance(IndexedCell::probe(center), radius * radius)
            .map(|cell| CellId::new(cell.index))
            .collect();

        hits.sort_unstable();
        Ok(hits)
    }

    /// Number of cells within `radius` degrees of `center`.
    pub fn count_within(&self, center: &Point<f64>, radius: f64) -> Result<usize> {
        Ok(self.query_range(center, radius)?.len())
    }

    /// The cell closest to `center` and its distance in degrees.
    ///
    /// Ties are broken arbitrarily.
    pub fn nearest(&self, center: &Point<f64>) -> Option<(CellId, f64)> {
        let probe = IndexedCell::probe(center);
        self.tree
            .nearest_neighbor(&probe)
            .map(|cell| (CellId::new(cell.index), cell.distance_2(&probe).sqrt()))
    }

    /// Coordinates of an indexed cell.
    pub fn point(&self, id: CellId) -> Option<Point<f64>> {
        self.points.get(id.index()).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(n: usize, step: f64) -> Vec<Point<f64>> {
        let mut points = Vec::with_capacity(n * n);
        for i in 0..n {
            for j in 0..n {
                points.push(Point::new(j as f64 * step, i as f64 * step));
            }
        }
        points
    }

    fn brute_force(points: &[Point<f64>], center: &Point<f64>, radius: f64) -> Vec<CellId> {
        points
            .iter()
            .enumerate()
            .filter(|(_, p)| {
                let dx = p.x() - center.x();
                let dy = p.y() - center.y();
                dx * dx + dy * dy <= radius * radius
            })
            .map(|(idx, _)| CellId::new(idx))
            .collect()
    }

    #[test]
    fn test_build_rejects_empty() {
        assert!(matches!(
            SpatialIndex::build(&[]),
            Err(ReefError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_build_rejects_non_finite() {
        let points = vec![Point::new(0.0, 0.0), Point::new(f64::NAN, 1.0)];
        assert!(SpatialIndex::build(&points).is_err());

        let points = vec![Point::new(f64::INFINITY, 0.0)];
        assert!(SpatialIndex::build(&points).is_err());
    }

    #[test]
    fn test_build_checks_latitude_but_not_longitude() {
        let err = SpatialIndex::build(&[Point::new(0.0, 0.0), Point::new(10.0, 90.5)])
            .err()
            .unwrap()
            .to_string();
        assert!(err.contains("index 1"), "{}", err);

        let pacific = SpatialIndex::build(&[Point::new(190.0, -14.0)]).unwrap();
        assert_eq!(pacific.len(), 1);
        assert!(pacific.query_range(&Point::new(0.0, -91.0), 1.0).is_err());
    }

    #[test]
    fn test_query_matches_brute_force() {
        let points = grid(30, 0.25);
        let index = SpatialIndex::build(&points).unwrap();
        assert_eq!(index.len(), 900);

        for (center, radius) in [
            (Point::new(3.0, 3.0), 0.6),
            (Point::new(0.0, 0.0), 1.1),
            (Point::new(7.3, 1.2), 2.0),
            (Point::new(-5.0, -5.0), 1.0),
        ] {
            let hits = index.query_range(&center, radius).unwrap();
            assert_eq!(hits, brute_force(&points, &center, radius));
        }
    }

    #[test]
    fn test_query_is_inclusive_at_radius() {
        let index = SpatialIndex::build(&[Point::new(3.0, 4.0)]).unwrap();
        let hits = index.query_range(&Point::new(0.0, 0.0), 5.0).unwrap();
        assert_eq!(hits, vec![CellId::new(0)]);
    }

    #[test]
    fn test_zero_radius() {
        let index = SpatialIndex::build(&[Point::new(1.0, 1.0), Point::new(1.0, 1.5)]).unwrap();

        let hits = index.query_range(&Point::new(1.0, 1.0), 0.0).unwrap();
        assert_eq!(hits, vec![CellId::new(0)]);

        let misses = index.query_range(&Point::new(2.0, 2.0), 0.0).unwrap();
        assert!(misses.is_empty());
    }

    #[test]
    fn test_query_rejects_bad_radius() {
        let index = SpatialIndex::build(&[Point::new(1.0, 1.0)]).unwrap();
        assert!(index.query_range(&Point::new(0.0, 0.0), -0.1).is_err());
        assert!(index.query_range(&Point::new(0.0, 0.0), f64::NAN).is_err());
        assert!(index.query_range(&Point::new(f64::NAN, 0.0), 1.0).is_err());
    }

    #[test]
    fn test_duplicate_points_are_all_returned() {
        let index = SpatialIndex::build(&[
            Point::new(2.0, 2.0),
            Point::new(2.0, 2.0),
            Point::new(9.0, 9.0),
        ])
        .unwrap();
        let hits = index.query_range(&Point::new(2.0, 2.0), 0.1).unwrap();
        assert_eq!(hits, vec![CellId::new(0), CellId::new(1)]);
    }

    #[test]
    fn test_nearest_and_point() {
        let points = vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
        let index = SpatialIndex::build(&points).unwrap();

        let (id, dist) = index.nearest(&Point::new(7.0, 0.0)).unwrap();
        assert_eq!(id, CellId::new(1));
        assert!((dist - 3.0).abs() < 1e-12);

        assert_eq!(index.point(CellId::new(0)), Some(Point::new(0.0, 0.0)));
        assert_eq!(index.point(CellId::new(1)), Some(Point::new(10.0, 0.0)));
        assert_eq!(index.point(CellId::new(5)), None);
        assert_eq!(index.count_within(&Point::new(0.0, 0.0), 10.0).unwrap(), 2);
    }
}
