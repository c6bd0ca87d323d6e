use serde::{Deserialize, Serialize};

use super::types::{Dimension, RangeFilter, Run, RunCollection};

/// One optional inclusive filter per dimension, applied conjunctively.
///
/// Market bounds are in percent; `apply` compares against `market * 100`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FilterSet {
    age: Option<RangeFilter>,
    balance: Option<RangeFilter>,
    market: Option<RangeFilter>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the dimension's filter. Bounds are stored as given.
    pub fn set(&mut self, dimension: Dimension, low: f64, high: f64) {
        *self.slot_mut(dimension) = Some(RangeFilter::new(low, high));
    }

    pub fn clear(&mut self, dimension: Dimension) {
        *self.slot_mut(dimension) = None;
    }

    pub fn get(&self, dimension: Dimension) -> Option<RangeFilter> {
        match dimension {
            Dimension::Age => self.age,
            Dimension::Balance => self.balance,
            Dimension::Market => self.market,
        }
    }

    pub fn is_filtered(&self, dimension: Dimension) -> bool {
        self.get(dimension).is_some()
    }

    pub fn matches(&self, run: &Run) -> bool {
        Dimension::ALL.iter().all(|&dimension| {
            self.get(dimension)
                .is_none_or(|filter| filter.contains(dimension.value(run)))
        })
    }

    pub fn apply(&self, runs: &RunCollection) -> Vec<Run> {
        runs.runs()
            .iter()
            .filter(|run| self.matches(run))
            .copied()
            .collect()
    }

    fn slot_mut(&mut self, dimension: Dimension) -> &mut Option<RangeFilter> {
        match dimension {
            Dimension::Age => &mut self.age,
            Dimension::Balance => &mut self.balance,
            Dimension::Market => &mut self.market,
        }
    }
}
