//! Validation for cell and region input tables.

use crate::error::{Result, ReefError};
use geo::Point;
use reefmatch_types::UNASSIGNED_LABEL;
use reefmatch_types::cell::ReefCell;
use reefmatch_types::region::ReefRegion;

/// Validates a lon/lat coordinate.
///
/// Both values must be finite and latitude must lie in [-90.0, 90.0].
/// Longitude is not range-checked so that both signed (-180..180) and
/// Pacific-centered (0..360) tables are accepted.
///
/// # Examples
///
/// ```
/// use reefmatch::compute::validation::validate_coordinate;
/// use geo::Point;
///
/// assert!(validate_coordinate(&Point::new(146.0, -18.0)).is_ok());
/// assert!(validate_coordinate(&Point::new(280.0, 12.0)).is_ok());
/// assert!(validate_coordinate(&Point::new(f64::NAN, 0.0)).is_err());
/// assert!(validate_coordinate(&Point::new(0.0, 95.0)).is_err());
/// ```
pub fn validate_coordinate(point: &Point) -> Result<()> {
    let (x, y) = (point.x(), point.y());

    if !x.is_finite() {
        return Err(ReefError::InvalidInput(format!(
            "Longitude must be finite, got: {}",
            x
        )));
    }

    if !y.is_finite() {
        return Err(ReefError::InvalidInput(format!(
            "Latitude must be finite, got: {}",
            y
        )));
    }

    if !(-90.0..=90.0).contains(&y) {
        return Err(ReefError::InvalidInput(format!(
            "Latitude out of range [-90.0, 90.0]: {}",
            y
        )));
    }

    Ok(())
}

/// Validates a non-empty table of reef cells.
pub fn validate_cells(cells: &[ReefCell]) -> Result<()> {
    if cells.is_empty() {
        return Err(ReefError::InvalidInput(
            "Cell table must contain at least one cell".to_string(),
        ));
    }

    for (idx, cell) in cells.iter().enumerate() {
        validate_coordinate(&cell.point)
            .map_err(|e| ReefError::InvalidInput(format!("Cell at index {}: {}", idx, e)))?;
    }
    Ok(())
}

/// Validates a non-empty table of reef regions.
///
/// Labels must be non-empty and must not collide with the unassigned label.
/// A missing, NaN or negative area is accepted and counts as zero; an
/// infinite area is rejected.
pub fn validate_regions(regions: &[ReefRegion]) -> Result<()> {
    if regions.is_empty() {
        return Err(ReefError::InvalidInput(
            "Region table must contain at least one region".to_string(),
        ));
    }

    for (idx, region) in regions.iter().enumerate() {
        validate_coordinate(&region.center)
            .map_err(|e| ReefError::InvalidInput(format!("Region at index {}: {}", idx, e)))?;

        if region.name.is_empty() {
            return Err(ReefError::InvalidInput(format!(
                "Region at index {} has an empty name",
                idx
            )));
        }

        if region.name == UNASSIGNED_LABEL {
            return Err(ReefError::InvalidInput(format!(
                "Region at index {} uses the reserved name '{}'",
                idx, UNASSIGNED_LABEL
            )));
        }

        if let Some(area) = region.area_km2
            && area.is_infinite()
        {
            return Err(ReefError::InvalidInput(format!(
                "Region at index {} has infinite area",
                idx
            )));
        }

        if !region.has_area() {
            log::warn!(
                "Region {} ('{}') has no usable area; treating it as zero",
                idx,
                region.name
            );
        }
    }
    Ok(())
}

/// Validates that `order` visits every region ordinal in `0..count` exactly once.
///
/// # Examples
///
/// ```
/// use reefmatch::compute::validation::validate_permutation;
///
/// assert!(validate_permutation(&[2, 0, 1], 3).is_ok());
/// assert!(validate_permutation(&[0, 0, 1], 3).is_err());
/// assert!(validate_permutation(&[0, 1], 3).is_err());
/// ```
pub fn validate_permutation(order: &[usize], count: usize) -> Result<()> {
    if order.len() != count {
        return Err(ReefError::InvalidInput(format!(
            "Region order lists {} regions, table has {}",
            order.len(),
            count
        )));
    }

    let mut seen = vec![false; count];
    for &idx in order {
        if idx >= count {
            return Err(ReefError::InvalidInput(format!(
                "Region order references index {} but table has {} regions",
                idx, count
            )));
        }
        if std::mem::replace(&mut seen[idx], true) {
            return Err(ReefError::InvalidInput(format!(
                "Region order lists index {} more than once",
                idx
            )));
        }
    }
    Ok(())
}
