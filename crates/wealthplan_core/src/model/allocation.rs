//! Allocation snapshots and per-class percentage tables

use std::str::FromStr;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use super::events::UnknownVariant;

/// Broad asset classes an allocation is split across
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetClass {
    Equities,
    FixedIncome,
    Cash,
    RealEstate,
    International,
    Alternatives,
}

impl AssetClass {
    pub const COUNT: usize = 6;

    pub const ALL: [AssetClass; Self::COUNT] = [
        AssetClass::Equities,
        AssetClass::FixedIncome,
        AssetClass::Cash,
        AssetClass::RealEstate,
        AssetClass::International,
        AssetClass::Alternatives,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AssetClass::Equities => "EQUITIES",
            AssetClass::FixedIncome => "FIXED_INCOME",
            AssetClass::Cash => "CASH",
            AssetClass::RealEstate => "REAL_ESTATE",
            AssetClass::International => "INTERNATIONAL",
            AssetClass::Alternatives => "ALTERNATIVES",
        }
    }

    /// Lower-case name used in human-readable messages
    pub fn label(self) -> &'static str {
        match self {
            AssetClass::Equities => "equities",
            AssetClass::FixedIncome => "fixed income",
            AssetClass::Cash => "cash",
            AssetClass::RealEstate => "real estate",
            AssetClass::International => "international",
            AssetClass::Alternatives => "alternatives",
        }
    }
}

impl FromStr for AssetClass {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AssetClass::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "asset class",
                value: s.to_string(),
            })
    }
}

/// Whether a snapshot records what the subject holds or what they should hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SnapshotKind {
    Current,
    Plan,
}

impl SnapshotKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SnapshotKind::Current => "CURRENT",
            SnapshotKind::Plan => "PLAN",
        }
    }
}

impl FromStr for SnapshotKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CURRENT" => Ok(SnapshotKind::Current),
            "PLAN" => Ok(SnapshotKind::Plan),
            other => Err(UnknownVariant {
                kind: "snapshot kind",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub asset_class: AssetClass,
    pub percent: f64,
}

/// Portfolio split at a point in time
///
/// Percentages sum to 100 (within a small tolerance enforced at the input
/// boundary). Only the latest snapshot of each kind is authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationSnapshot {
    pub kind: SnapshotKind,
    pub as_of_date: Date,
    pub total_value: f64,
    pub allocations: Vec<Allocation>,
}

impl AllocationSnapshot {
    pub fn new(kind: SnapshotKind, as_of_date: Date, total_value: f64) -> Self {
        Self {
            kind,
            as_of_date,
            total_value,
            allocations: Vec::new(),
        }
    }

    pub fn with(mut self, asset_class: AssetClass, percent: f64) -> Self {
        self.allocations.push(Allocation {
            asset_class,
            percent,
        });
        self
    }

    pub fn percent_sum(&self) -> f64 {
        self.allocations.iter().map(|a| a.percent).sum()
    }

    pub fn table(&self) -> AllocationTable {
        AllocationTable::from_allocations(&self.allocations)
    }
}

/// Percent held per asset class, indexed by the enumeration
///
/// Classes that never appeared are distinguishable from classes present at
/// 0% so comparisons can iterate "every class in either snapshot".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AllocationTable {
    percents: [f64; AssetClass::COUNT],
    present: [bool; AssetClass::COUNT],
}

impl AllocationTable {
    /// Build a table, accumulating repeated entries for the same class
    pub fn from_allocations(allocations: &[Allocation]) -> Self {
        let mut table = Self::default();
        for a in allocations {
            table.add(a.asset_class, a.percent);
        }
        table
    }

    pub fn add(&mut self, class: AssetClass, percent: f64) {
        let i = class.index();
        self.percents[i] += percent;
        self.present[i] = true;
    }

    /// Percent for `class`, 0 when absent
    #[inline]
    pub fn get(&self, class: AssetClass) -> f64 {
        self.percents[class.index()]
    }

    #[inline]
    pub fn contains(&self, class: AssetClass) -> bool {
        self.present[class.index()]
    }

    /// Classes present in the table, in enumeration order
    pub fn classes(&self) -> impl Iterator<Item = AssetClass> + '_ {
        AssetClass::ALL.into_iter().filter(|c| self.contains(*c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_accumulates_and_tracks_presence() {
        let table = AllocationTable::from_allocations(&[
            Allocation {
                asset_class: AssetClass::Equities,
                percent: 40.0,
            },
            Allocation {
                asset_class: AssetClass::Cash,
                percent: 0.0,
            },
            Allocation {
                asset_class: AssetClass::Equities,
                percent: 20.0,
            },
        ]);
        assert_eq!(table.get(AssetClass::Equities), 60.0);
        assert!(table.contains(AssetClass::Cash));
        assert!(!table.contains(AssetClass::RealEstate));
        assert_eq!(table.get(AssetClass::RealEstate), 0.0);
        assert_eq!(
            table.classes().collect::<Vec<_>>(),
            vec![AssetClass::Equities, AssetClass::Cash]
        );
    }

    #[test]
    fn test_asset_class_labels_roundtrip() {
        for class in AssetClass::ALL {
            assert_eq!(class.as_str().parse::<AssetClass>(), Ok(class));
        }
        assert!("BONDS".parse::<AssetClass>().is_err());
    }
}
