use serde::Serialize;

use super::filter::FilterSet;
use super::format::range_label;
use super::range::{RangeError, compute_range};
use super::types::{BinParams, Dimension, Run, RunCollection};

/// Values of one dimension over the filtered runs, ready for a histogram.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BinnedSeries {
    pub dimension: Dimension,
    pub values: Vec<f64>,
    /// `None` when nothing survived filtering.
    pub range: Option<(f64, f64)>,
    pub label: String,
    pub filtered: bool,
    pub bins: BinParams,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub filtered: Vec<Run>,
    pub age: BinnedSeries,
    pub balance: BinnedSeries,
    pub market: BinnedSeries,
}

impl Projection {
    pub fn is_empty(&self) -> bool {
        self.filtered.is_empty()
    }
}

/// Filters the runs and recomputes every axis range over what remains.
pub fn project(runs: &RunCollection, filters: &FilterSet) -> Projection {
    let filtered = filters.apply(runs);
    let series = |dimension| binned_series(&filtered, filters, dimension);
    let age = series(Dimension::Age);
    let balance = series(Dimension::Balance);
    let market = series(Dimension::Market);

    tracing::debug!(
        total = runs.len(),
        visible = filtered.len(),
        "projected summary"
    );

    Projection {
        filtered,
        age,
        balance,
        market,
    }
}

fn binned_series(filtered: &[Run], filters: &FilterSet, dimension: Dimension) -> BinnedSeries {
    let values: Vec<f64> = filtered.iter().map(|run| dimension.value(run)).collect();
    let range = match compute_range(&values, dimension.bucket_size()) {
        Ok(range) => Some(range),
        Err(RangeError::EmptyInput) => None,
        Err(err @ RangeError::InvalidBucketSize(_)) => {
            unreachable!("fixed bucket size for {}: {err}", dimension.as_str())
        }
    };
    BinnedSeries {
        dimension,
        label: range_label(dimension, range),
        filtered: filters.is_filtered(dimension),
        bins: dimension.bins(),
        values,
        range,
    }
}
