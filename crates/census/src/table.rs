//! The sorted member table and its read-only queries.
//!
//! Key invariants:
//! - Rows are ordered by (cluster code, building sequence), both coerced to numbers
//! - The sort is stable: equal keys keep pipeline order
//! - Queries borrow rows and never mutate the table

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use crate::model::{DerivedRow, Field, FlatRow, Presence, Relationship};

/// Numeric value of a loosely typed key. Missing, non-numeric or non-finite is 0.
pub fn numeric_key(raw: Option<&str>) -> f64 {
    let value = raw
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0);
    // Fold -0.0 into 0.0 so it ties with zero under total ordering.
    if value == 0.0 {
        0.0
    } else {
        value
    }
}

fn sort_key(row: &FlatRow) -> (f64, f64) {
    (
        numeric_key(row.location.cluster_code.as_deref()),
        numeric_key(row.household.building_sequence.as_deref()),
    )
}

/// Immutable, sorted derived rows.
#[derive(Debug, Clone, Default)]
pub struct CensusTable {
    rows: Vec<DerivedRow>,
}

impl CensusTable {
    /// Sort rows by cluster then building sequence. Keys are dropped after sorting.
    pub fn build(rows: Vec<DerivedRow>) -> Self {
        let mut keyed: Vec<((f64, f64), DerivedRow)> =
            rows.into_iter().map(|row| (sort_key(&row.flat), row)).collect();
        keyed.sort_by(|(a, _), (b, _)| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
        Self {
            rows: keyed.into_iter().map(|(_, row)| row).collect(),
        }
    }

    pub fn rows(&self) -> &[DerivedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows matching every supplied criterion.
    pub fn filter(&self, criteria: &FilterCriteria) -> Vec<&DerivedRow> {
        self.cascade(criteria).rows
    }

    /// Run the filter stage by stage, collecting the options each stage offers
    /// from the rows left by the stages before it.
    pub fn cascade(&self, criteria: &FilterCriteria) -> FilterCascade<'_> {
        let mut rows: Vec<&DerivedRow> = self.rows.iter().collect();
        let mut options = FilterOptions::default();

        for stage in FilterStage::ALL {
            *options.for_stage_mut(stage) = distinct_values(&rows, stage);
            if let Some(wanted) = criteria.for_stage(stage) {
                rows.retain(|row| stage.value(&row.flat).as_deref() == Some(wanted));
            }
        }

        FilterCascade { options, rows }
    }
}

/// The four cascading filter stages, in application order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterStage {
    Region,
    SubRegion,
    SubDistrict,
    HouseholdHead,
}

impl FilterStage {
    pub const ALL: [FilterStage; 4] = [
        FilterStage::Region,
        FilterStage::SubRegion,
        FilterStage::SubDistrict,
        FilterStage::HouseholdHead,
    ];

    fn value<'a>(&self, row: &'a FlatRow) -> &'a Field {
        match self {
            Self::Region => &row.location.region,
            Self::SubRegion => &row.location.sub_region,
            Self::SubDistrict => &row.location.sub_district,
            Self::HouseholdHead => &row.household.head_name,
        }
    }
}

impl std::fmt::Display for FilterStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Region => write!(f, "region"),
            Self::SubRegion => write!(f, "sub_region"),
            Self::SubDistrict => write!(f, "sub_district"),
            Self::HouseholdHead => write!(f, "household_head"),
        }
    }
}

/// Exact-match criteria. `None` means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterCriteria {
    pub region: Option<String>,
    pub sub_region: Option<String>,
    pub sub_district: Option<String>,
    pub household_head: Option<String>,
}

impl FilterCriteria {
    fn for_stage(&self, stage: FilterStage) -> Option<&str> {
        match stage {
            FilterStage::Region => self.region.as_deref(),
            FilterStage::SubRegion => self.sub_region.as_deref(),
            FilterStage::SubDistrict => self.sub_district.as_deref(),
            FilterStage::HouseholdHead => self.household_head.as_deref(),
        }
    }
}

/// Values a caller may pick at each stage, sorted and distinct.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub regions: Vec<String>,
    pub sub_regions: Vec<String>,
    pub sub_districts: Vec<String>,
    pub household_heads: Vec<String>,
}

impl FilterOptions {
    pub fn for_stage(&self, stage: FilterStage) -> &[String] {
        match stage {
            FilterStage::Region => &self.regions,
            FilterStage::SubRegion => &self.sub_regions,
            FilterStage::SubDistrict => &self.sub_districts,
            FilterStage::HouseholdHead => &self.household_heads,
        }
    }

    fn for_stage_mut(&mut self, stage: FilterStage) -> &mut Vec<String> {
        match stage {
            FilterStage::Region => &mut self.regions,
            FilterStage::SubRegion => &mut self.sub_regions,
            FilterStage::SubDistrict => &mut self.sub_districts,
            FilterStage::HouseholdHead => &mut self.household_heads,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilterCascade<'a> {
    pub options: FilterOptions,
    pub rows: Vec<&'a DerivedRow>,
}

fn distinct_values(rows: &[&DerivedRow], stage: FilterStage) -> Vec<String> {
    rows.iter()
        .filter_map(|row| stage.value(&row.flat).as_deref())
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TableSummary {
    pub total_rows: usize,
    /// Rows whose member presence is "Ditemukan".
    pub found_rows: usize,
    /// Distinct household-head names.
    pub household_heads: usize,
    /// Distinct household record ids.
    pub households: usize,
    /// `found_rows / total_rows * 100`, or 0 for an empty subset.
    pub found_percentage: f64,
    pub head_rows: usize,
    pub heads_found: usize,
    pub others_found: usize,
}

impl TableSummary {
    /// True when the filter left nothing. Not an error: the caller may widen the filter.
    pub fn is_empty(&self) -> bool {
        self.total_rows == 0
    }
}

/// Counts over a subset.
pub fn aggregate(rows: &[&DerivedRow]) -> TableSummary {
    let mut heads = HashSet::new();
    let mut households = HashSet::new();
    let mut summary = TableSummary {
        total_rows: rows.len(),
        ..Default::default()
    };

    for row in rows {
        let flat = &row.flat;
        if let Some(name) = flat.household.head_name.as_deref().filter(|n| !n.is_empty()) {
            heads.insert(name);
        }
        households.insert(&flat.record_id);

        let found = flat.presence() == Presence::Found;
        let is_head = flat.relationship() == Relationship::Head;
        if found {
            summary.found_rows += 1;
        }
        match (is_head, found) {
            (true, true) => {
                summary.head_rows += 1;
                summary.heads_found += 1;
            }
            (true, false) => summary.head_rows += 1,
            (false, true) => summary.others_found += 1,
            (false, false) => {}
        }
    }

    summary.household_heads = heads.len();
    summary.households = households.len();
    summary.found_percentage = if summary.total_rows == 0 {
        0.0
    } else {
        summary.found_rows as f64 / summary.total_rows as f64 * 100.0
    };
    summary
}

/// Found members of a subset, for the per-household detail view.
#[derive(Debug, Clone)]
pub struct Roster<'a> {
    pub members: Vec<&'a DerivedRow>,
    /// (youngest, oldest) derived age among the members that have one.
    pub age_range: Option<(i64, i64)>,
}

pub fn roster<'a>(rows: &[&'a DerivedRow]) -> Roster<'a> {
    let members: Vec<&DerivedRow> = rows
        .iter()
        .copied()
        .filter(|row| row.flat.presence() == Presence::Found)
        .collect();
    let ages = members.iter().filter_map(|row| row.age);
    let age_range = ages.clone().min().zip(ages.max());
    Roster { members, age_range }
}
