use serde::{Deserialize, Serialize};

use super::types::{Run, RunOutcome};

/// One outcome value paired with the run it came from.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct IndexedValue {
    #[serde(rename = "ix")]
    pub index: usize,
    #[serde(rename = "v")]
    pub value: f64,
}

/// Outcome at one percentile, each dimension sorted on its own.
/// Market values are stored as fractions, like the run outcomes.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct PercentileMarker {
    pub age: IndexedValue,
    pub balance: IndexedValue,
    pub market: IndexedValue,
}

/// Aggregate fields the simulator writes next to the runs.
///
/// Every field is optional in the document; absent ones take their default.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all(serialize = "camelCase"))]
pub struct SummaryStats {
    pub count: usize,
    pub start: f64,
    pub early_deaths: Vec<usize>,
    pub liquidity_crises: Vec<usize>,
    pub bankruptcies: Vec<usize>,
    pub mean: Option<RunOutcome>,
    pub worst: Option<PercentileMarker>,
    pub worst95: Option<PercentileMarker>,
    pub worst75: Option<PercentileMarker>,
    pub median: Option<PercentileMarker>,
    pub best75: Option<PercentileMarker>,
    pub best95: Option<PercentileMarker>,
    pub best: Option<PercentileMarker>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunFlags {
    pub early_death: bool,
    pub liquidity_crisis: bool,
    pub bankruptcy: bool,
}

/// How many runs of a view carry each flag.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagCounts {
    pub early_deaths: usize,
    pub liquidity_crises: usize,
    pub bankruptcies: usize,
}

impl SummaryStats {
    pub fn flags(&self, index: usize) -> RunFlags {
        RunFlags {
            early_death: self.early_deaths.contains(&index),
            liquidity_crisis: self.liquidity_crises.contains(&index),
            bankruptcy: self.bankruptcies.contains(&index),
        }
    }

    pub fn flag_counts(&self, runs: &[Run]) -> FlagCounts {
        runs.iter()
            .map(|run| self.flags(run.index))
            .fold(FlagCounts::default(), |mut counts, flags| {
                counts.early_deaths += usize::from(flags.early_death);
                counts.liquidity_crises += usize::from(flags.liquidity_crisis);
                counts.bankruptcies += usize::from(flags.bankruptcy);
                counts
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::RunCollection;

    fn stats() -> SummaryStats {
        serde_json::from_str(
            r#"{
                "count": 4,
                "start": 1500000,
                "early_deaths": [0],
                "liquidity_crises": [1, 3],
                "bankruptcies": [3],
                "mean": {"index": 0, "death": 78.5, "balance": 2100000.0, "market": 0.055},
                "median": {
                    "age": {"ix": 2, "v": 81},
                    "balance": {"ix": 1, "v": 1900000},
                    "market": {"ix": 2, "v": 0.058}
                }
            }"#,
        )
        .expect("stats")
    }

    #[test]
    fn reads_simulator_fields() {
        let stats = stats();
        assert_eq!(stats.count, 4);
        assert_eq!(stats.start, 1_500_000.0);
        assert_eq!(stats.bankruptcies, vec![3]);
        assert_eq!(stats.mean.map(|m| m.death), Some(78.5));
        let median = stats.median.expect("median");
        assert_eq!(median.balance.index, 1);
        assert_eq!(median.market.value, 0.058);
        assert!(stats.worst.is_none());
    }

    #[test]
    fn missing_fields_default() {
        let stats: SummaryStats = serde_json::from_str("{}").expect("stats");
        assert_eq!(stats, SummaryStats::default());
        assert_eq!(stats.flags(0), RunFlags::default());
    }

    #[test]
    fn counts_flags_over_the_given_runs() {
        let runs = RunCollection::from_outcomes((0..4).map(|i| RunOutcome {
            death: 60.0 + f64::from(i),
            balance: 0.0,
            market: 0.05,
        }));
        let stats = stats();
        assert!(stats.flags(3).bankruptcy && stats.flags(3).liquidity_crisis);

        let all = stats.flag_counts(runs.runs());
        assert_eq!(
            all,
            FlagCounts {
                early_deaths: 1,
                liquidity_crises: 2,
                bankruptcies: 1,
            }
        );
        let tail = stats.flag_counts(&runs.runs()[2..]);
        assert_eq!(tail.early_deaths, 0);
        assert_eq!(tail.liquidity_crises, 1);
    }

    #[test]
    fn serializes_camel_case_with_short_marker_keys() {
        let json = serde_json::to_value(stats()).expect("serialize");
        assert_eq!(json["earlyDeaths"], serde_json::json!([0]));
        assert_eq!(json["median"]["age"]["ix"], 2);
        assert!(json["best"].is_null());
    }
}
