//! Hand-curated bounding-box corrections applied after convergence.
//!
//! Some reef cells sit closer to the center of a reef area in a different
//! ocean basin than to any area in their own (cells off Brazil and in the
//! south-west Caribbean are the known cases). These are easier to spot on a
//! map than to fix in the matching heuristic, so they are corrected with
//! literal boxes.
//!
//! Rules run strictly after the convergence loop, in list order, and
//! overwrite whatever label a cell already has. When boxes overlap the later
//! rule wins.

use crate::table::{AssignedCells, RegionOrigin};
use reefmatch_types::UNASSIGNED_LABEL;
use reefmatch_types::bbox::OverrideBox;
use serde::{Deserialize, Serialize};

/// Label forced by every rule in the reference correction table.
pub const WEST_ATLANTIC: &str = "WAtl";

/// Ordered list of override boxes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverrideRules {
    rules: Vec<OverrideBox>,
}

impl OverrideRules {
    pub fn new(rules: Vec<OverrideBox>) -> Self {
        Self { rules }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// The correction table used for the Hughes/Logan comparison.
    pub fn reference() -> Self {
        Self::new(vec![
            // South Atlantic off Brazil, initially matched to Indian Ocean / Middle East.
            OverrideBox::new(-40.0, -25.0, -26.0, -16.0, WEST_ATLANTIC),
            // Further up the Brazilian coast, initially matched to the Pacific.
            OverrideBox::new(-39.0, -34.0, -16.0, -8.0, WEST_ATLANTIC),
            // South-west Caribbean, matched across the isthmus to the Pacific.
            OverrideBox::new(-83.0, -80.0, 12.0, 16.0, WEST_ATLANTIC),
            OverrideBox::new(-81.0, -76.0, 8.8, 11.0, WEST_ATLANTIC),
        ])
    }

    pub fn push(&mut self, rule: OverrideBox) {
        self.rules.push(rule);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OverrideBox> {
        self.rules.iter()
    }

    pub fn validate(&self) -> Result<(), String> {
        for (idx, rule) in self.rules.iter().enumerate() {
            if !rule.is_finite() {
                return Err(format!("Override rule {} has non-finite bounds", idx));
            }
            if rule.lon_min >= rule.lon_max || rule.lat_min >= rule.lat_max {
                return Err(format!(
                    "Override rule {} has empty bounds: lon ({}, {}), lat ({}, {})",
                    idx, rule.lon_min, rule.lon_max, rule.lat_min, rule.lat_max
                ));
            }
            if rule.region.is_empty() {
                return Err(format!("Override rule {} has an empty region label", idx));
            }
            if rule.region == UNASSIGNED_LABEL {
                return Err(format!(
                    "Override rule {} uses the reserved label '{}'",
                    idx, UNASSIGNED_LABEL
                ));
            }
        }
        Ok(())
    }

    /// Force every cell inside each box to that box's label.
    ///
    /// Returns the number of cell writes performed, counting a cell once per
    /// rule that matched it.
    pub fn apply(&self, table: &mut AssignedCells) -> usize {
        let mut writes = 0;

        for (rule_idx, rule) in self.rules.iter().enumerate() {
            let inside: Vec<_> = table
                .iter()
                .filter(|(_, cell, _)| rule.contains(&cell.point))
                .map(|(id, _, _)| id)
                .collect();

            for &id in &inside {
                table.force(id, &rule.region, RegionOrigin::Override { rule: rule_idx });
            }

            log::debug!(
                "Override rule {} forced {} cells to '{}'",
                rule_idx,
                inside.len(),
                rule.region
            );
            writes += inside.len();
        }

        if !self.rules.is_empty() {
            log::info!(
                "Applied {} override rules, {} cell writes",
                self.rules.len(),
                writes
            );
        }

        writes
    }
}

impl From<Vec<OverrideBox>> for OverrideRules {
    fn from(rules: Vec<OverrideBox>) -> Self {
        Self::new(rules)
    }
}
