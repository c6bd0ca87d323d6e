use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Age,
    Balance,
    Market,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Dimension::Age, Dimension::Balance, Dimension::Market];

    /// Value of this dimension for a run, in display units (market return in percent).
    pub fn value(self, run: &Run) -> f64 {
        match self {
            Dimension::Age => run.death,
            Dimension::Balance => run.balance,
            Dimension::Market => run.market * 100.0,
        }
    }

    /// Granularity used to align the displayed axis range.
    pub fn bucket_size(self) -> f64 {
        match self {
            Dimension::Age => 2.0,
            Dimension::Balance => 250_000.0,
            Dimension::Market => 0.5,
        }
    }

    pub fn bins(self) -> BinParams {
        match self {
            Dimension::Age => BinParams {
                start: 40.0,
                end: 100.0,
                size: 2.0,
            },
            Dimension::Balance => BinParams {
                start: -2_000_000.0,
                end: 10_000_000.0,
                size: 250_000.0,
            },
            Dimension::Market => BinParams {
                start: -10.0,
                end: 12.0,
                size: 0.5,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dimension::Age => "age",
            Dimension::Balance => "balance",
            Dimension::Market => "market",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Dimension::Age => "Age",
            Dimension::Balance => "Balance",
            Dimension::Market => "Market",
        }
    }
}

/// One simulated trajectory outcome.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Run {
    pub index: usize,
    pub death: f64,
    pub balance: f64,
    pub market: f64,
}

/// Outcome fields as they appear in the summary document, before indexing.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct RunOutcome {
    pub death: f64,
    pub balance: f64,
    pub market: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunCollection {
    runs: Vec<Run>,
}

impl RunCollection {
    /// Indices are taken from document position here and never recomputed.
    pub fn from_outcomes(outcomes: impl IntoIterator<Item = RunOutcome>) -> Self {
        let runs = outcomes
            .into_iter()
            .enumerate()
            .map(|(index, outcome)| Run {
                index,
                death: outcome.death,
                balance: outcome.balance,
                market: outcome.market,
            })
            .collect();
        Self { runs }
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

/// Inclusive `[low, high]` bound in display units.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct RangeFilter {
    pub low: f64,
    pub high: f64,
}

impl RangeFilter {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }
}

/// Fixed histogram binning handed to the chart renderer.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct BinParams {
    pub start: f64,
    pub end: f64,
    pub size: f64,
}
