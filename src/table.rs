//! Per-cell region labels, the single mutable output of a run.
//!
//! A fresh table has every cell unassigned. The convergence loop claims
//! cells with [`AssignedCells::claim`], which never overwrites, and override
//! rules rewrite them with [`AssignedCells::force`].

use reefmatch_types::UNASSIGNED_LABEL;
use reefmatch_types::cell::{CellId, ReefCell};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// How a cell got its label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionOrigin {
    /// Claimed by region row `region` during radius pass `pass` (0-based).
    Matched { region: usize, pass: usize },
    /// Forced by override rule `rule`.
    Override { rule: usize },
}

#[derive(Debug, Clone, PartialEq)]
struct Assignment {
    region: String,
    /// `None` for labels loaded from rows that did not record an origin.
    origin: Option<RegionOrigin>,
}

/// Cells with their current region labels.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignedCells {
    cells: Vec<ReefCell>,
    assignments: Vec<Option<Assignment>>,
    assigned: usize,
}

impl AssignedCells {
    /// A table with every cell unassigned.
    pub fn unassigned(cells: &[ReefCell]) -> Self {
        Self {
            cells: cells.to_vec(),
            assignments: vec![None; cells.len()],
            assigned: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of cells holding a real region label.
    pub fn assigned_count(&self) -> usize {
        self.assigned
    }

    pub fn is_fully_assigned(&self) -> bool {
        self.assigned == self.cells.len()
    }

    pub fn is_assigned(&self, id: CellId) -> bool {
        matches!(self.assignments.get(id.index()), Some(Some(_)))
    }

    pub fn cell(&self, id: CellId) -> Option<&ReefCell> {
        self.cells.get(id.index())
    }

    /// Region label of a cell, or `"none"` while unassigned.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range for this table.
    pub fn label(&self, id: CellId) -> &str {
        self.assignments[id.index()]
            .as_ref()
            .map_or(UNASSIGNED_LABEL, |a| a.region.as_str())
    }

    /// Region label of a cell, `None` while unassigned or out of range.
    pub fn region(&self, id: CellId) -> Option<&str> {
        self.assignments
            .get(id.index())
            .and_then(|a| a.as_ref())
            .map(|a| a.region.as_str())
    }

    /// How the cell got its label, if it has one and the origin is known.
    pub fn origin(&self, id: CellId) -> Option<RegionOrigin> {
        self.assignments
            .get(id.index())
            .and_then(|a| a.as_ref())
            .and_then(|a| a.origin)
    }

    /// Label an unassigned cell. Returns `false`, leaving the cell untouched,
    /// if it already has a label.
    pub(crate) fn claim(&mut self, id: CellId, region: &str, origin: RegionOrigin) -> bool {
        let slot = &mut self.assignments[id.index()];
        if slot.is_some() {
            return false;
        }
        *slot = Some(Assignment {
            region: region.to_string(),
            origin: Some(origin),
        });
        self.assigned += 1;
        true
    }

    /// Label a cell regardless of its current state.
    pub(crate) fn force(&mut self, id: CellId, region: &str, origin: RegionOrigin) {
        let slot = &mut self.assignments[id.index()];
        if slot.is_none() {
            self.assigned += 1;
        }
        *slot = Some(Assignment {
            region: region.to_string(),
            origin: Some(origin),
        });
    }

    /// Iterate cells in table order with their current labels.
    pub fn iter(&self) -> impl Iterator<Item = (CellId, &ReefCell, &str)> {
        self.cells
            .iter()
            .zip(&self.assignments)
            .enumerate()
            .map(|(idx, (cell, assignment))| {
                let label = assignment
                    .as_ref()
                    .map_or(UNASSIGNED_LABEL, |a| a.region.as_str());
                (CellId::new(idx), cell, label)
            })
    }

    /// Cell ids that still have no label.
    pub fn unassigned_ids(&self) -> Vec<CellId> {
        self.assignments
            .iter()
            .enumerate()
            .filter(|(_, a)| a.is_none())
            .map(|(idx, _)| CellId::new(idx))
            .collect()
    }

    /// Number of cells per label. Unassigned cells are counted under `"none"`.
    pub fn region_counts(&self) -> FxHashMap<String, usize> {
        let mut counts: FxHashMap<String, usize> = FxHashMap::default();
        for (_, _, label) in self.iter() {
            *counts.entry(label.to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Flat rows for persistence, numbered from 1.
    pub fn records(&self) -> Vec<CellRecord> {
        self.cells
            .iter()
            .zip(&self.assignments)
            .enumerate()
            .map(|(idx, (cell, assignment))| CellRecord {
                cell: CellId::new(idx).one_based(),
                lon: cell.lon(),
                lat: cell.lat(),
                region: assignment
                    .as_ref()
                    .map_or_else(|| UNASSIGNED_LABEL.to_string(), |a| a.region.clone()),
                origin: assignment.as_ref().and_then(|a| a.origin),
            })
            .collect()
    }

    /// Rebuild a table from persisted rows.
    ///
    /// Rows must be numbered 1..=n in order. A real label without a recorded
    /// origin is kept as assigned.
    pub fn from_records(records: &[CellRecord]) -> crate::Result<Self> {
        let mut cells = Vec::with_capacity(records.len());
        let mut assignments = Vec::with_capacity(records.len());
        let mut assigned = 0;

        for (idx, record) in records.iter().enumerate() {
            if record.cell != idx + 1 {
                return Err(crate::ReefError::InvalidInput(format!(
                    "Cell record {} is numbered {}, expected {}",
                    idx,
                    record.cell,
                    idx + 1
                )));
            }
            cells.push(ReefCell::new(record.lon, record.lat));
            let assignment = match record.region.as_str() {
                UNASSIGNED_LABEL => None,
                "" => {
                    return Err(crate::ReefError::InvalidInput(format!(
                        "Cell record {} has an empty region label",
                        record.cell
                    )));
                }
                region => Some(Assignment {
                    region: region.to_string(),
                    origin: record.origin,
                }),
            };
            if assignment.is_some() {
                assigned += 1;
            }
            assignments.push(assignment);
        }

        Ok(Self {
            cells,
            assignments,
            assigned,
        })
    }
}

/// One persisted row of the final cell table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellRecord {
    /// 1-based cell number.
    pub cell: usize,
    pub lon: f64,
    pub lat: f64,
    pub region: String,
    #[serde(default)]
    pub origin: Option<RegionOrigin>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells() -> Vec<ReefCell> {
        vec![
            ReefCell::new(0.0, 0.0),
            ReefCell::new(1.0, 1.0),
            ReefCell::new(2.0, 2.0),
        ]
    }

    #[test]
    fn test_fresh_table_is_unassigned() {
        let table = AssignedCells::unassigned(&cells());
        assert_eq!(table.len(), 3);
        assert_eq!(table.assigned_count(), 0);
        assert_eq!(table.label(CellId::new(1)), "none");
        assert_eq!(table.region(CellId::new(1)), None);
        assert_eq!(table.unassigned_ids().len(), 3);
    }

    #[test]
    fn test_claim_never_overwrites() {
        let mut table = AssignedCells::unassigned(&cells());
        let first = RegionOrigin::Matched { region: 0, pass: 0 };
        let second = RegionOrigin::Matched { region: 1, pass: 1 };

        assert!(table.claim(CellId::new(0), "Pac", first));
        assert!(!table.claim(CellId::new(0), "AuA", second));

        assert_eq!(table.label(CellId::new(0)), "Pac");
        assert_eq!(table.origin(CellId::new(0)), Some(first));
        assert_eq!(table.assigned_count(), 1);
    }

    #[test]
    fn test_force_overwrites_and_counts_once() {
        let mut table = AssignedCells::unassigned(&cells());
        table.claim(CellId::new(0), "Pac", RegionOrigin::Matched { region: 0, pass: 0 });
        table.force(CellId::new(0), "WAtl", RegionOrigin::Override { rule: 0 });
        table.force(CellId::new(2), "WAtl", RegionOrigin::Override { rule: 0 });

        assert_eq!(table.label(CellId::new(0)), "WAtl");
        assert_eq!(table.assigned_count(), 2);
        assert!(!table.is_fully_assigned());
    }

    #[test]
    fn test_region_counts() {
        let mut table = AssignedCells::unassigned(&cells());
        let origin = RegionOrigin::Matched { region: 0, pass: 0 };
        table.claim(CellId::new(0), "Pac", origin);
        table.claim(CellId::new(1), "Pac", origin);

        let counts = table.region_counts();
        assert_eq!(counts.get("Pac"), Some(&2));
        assert_eq!(counts.get("none"), Some(&1));
    }

    #[test]
    fn test_records_are_one_based() {
        let mut table = AssignedCells::unassigned(&cells());
        table.claim(CellId::new(2), "AuA", RegionOrigin::Matched { region: 3, pass: 1 });

        let records = table.records();
        assert_eq!(records[0].cell, 1);
        assert_eq!(records[0].region, "none");
        assert_eq!(records[0].origin, None);
        assert_eq!(records[2].cell, 3);
        assert_eq!(records[2].region, "AuA");

        let rebuilt = AssignedCells::from_records(&records).unwrap();
        assert_eq!(rebuilt, table);
    }

    #[test]
    fn test_from_records_keeps_labels_without_origin() {
        let records = vec![
            CellRecord {
                cell: 1,
                lon: -170.0,
                lat: -14.0,
                region: "Pac".to_string(),
                origin: None,
            },
            CellRecord {
                cell: 2,
                lon: 146.0,
                lat: -18.0,
                region: "none".to_string(),
                origin: None,
            },
        ];

        let table = AssignedCells::from_records(&records).unwrap();
        assert_eq!(table.label(CellId::new(0)), "Pac");
        assert_eq!(table.origin(CellId::new(0)), None);
        assert_eq!(table.assigned_count(), 1);
        assert!(!table.is_assigned(CellId::new(1)));
        assert_eq!(table.records(), records);

        let mut empty = records;
        empty[0].region = String::new();
        assert!(AssignedCells::from_records(&empty).is_err());
    }

    #[test]
    fn test_from_records_rejects_gaps() {
        let mut records = AssignedCells::unassigned(&cells()).records();
        records[1].cell = 7;
        assert!(AssignedCells::from_records(&records).is_err());
    }
}
