use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::core::{DetailKind, Row, RunCollection, RunOutcome, SummaryStats, detail_file_name};

pub const SUMMARY_FILE: &str = "index.json";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid summary document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("{file} is missing the `{column}` column")]
    MissingColumn { file: String, column: &'static str },
    #[error("no detail files for run {0}")]
    RunNotFound(usize),
}

#[derive(Debug, Deserialize)]
struct SummaryDocument {
    runs: Vec<RunOutcome>,
    #[serde(flatten)]
    stats: SummaryStats,
}

/// Runs of the summary document with the aggregates written beside them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub runs: RunCollection,
    pub stats: SummaryStats,
}

/// Balance and event rows of one run, as read from its detail files.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailRows {
    pub balances: Vec<Row>,
    pub events: Vec<Row>,
}

pub fn parse_summary<R: Read>(reader: R) -> Result<Summary, LoadError> {
    let document: SummaryDocument = serde_json::from_reader(reader)?;
    Ok(Summary {
        runs: RunCollection::from_outcomes(document.runs),
        stats: document.stats,
    })
}

/// Reads CSV with a header line into header-keyed rows. Short records simply
/// lack the trailing keys.
pub fn parse_rows<R: Read>(reader: R) -> Result<Vec<Row>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Row = headers
            .iter()
            .zip(record.iter())
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

pub fn load_summary(results_dir: &Path) -> Result<Summary, LoadError> {
    let path = results_dir.join(SUMMARY_FILE);
    let summary = parse_summary(open(&path)?)?;
    let runs = summary.runs.len();
    if summary.stats.count != 0 && summary.stats.count != runs {
        tracing::warn!(count = summary.stats.count, runs, "summary count disagrees with runs");
    }
    tracing::info!(
        path = %path.display(),
        runs,
        bankruptcies = summary.stats.bankruptcies.len(),
        "loaded summary"
    );
    Ok(summary)
}

pub fn load_detail_rows(results_dir: &Path, index: usize) -> Result<DetailRows, LoadError> {
    let balances_name = detail_file_name(DetailKind::Balances, index);
    let events_name = detail_file_name(DetailKind::Events, index);
    let balances_path = results_dir.join(&balances_name);
    if !balances_path.is_file() {
        return Err(LoadError::RunNotFound(index));
    }

    let balances = parse_rows(open(&balances_path)?)?;
    require_column(&balances, &balances_name, "date")?;

    let events_path = results_dir.join(&events_name);
    let events = if events_path.is_file() {
        let events = parse_rows(open(&events_path)?)?;
        for column in ["date", "severity", "value"] {
            require_column(&events, &events_name, column)?;
        }
        events
    } else {
        tracing::warn!(path = %events_path.display(), "no events file, drawing balances only");
        Vec::new()
    };

    tracing::debug!(
        index,
        balance_rows = balances.len(),
        event_rows = events.len(),
        "loaded detail rows"
    );
    Ok(DetailRows { balances, events })
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn require_column(rows: &[Row], file: &str, column: &'static str) -> Result<(), LoadError> {
    match rows.first() {
        Some(first) if !first.contains_key(column) => Err(LoadError::MissingColumn {
            file: file.to_string(),
            column,
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_indices_follow_document_order() {
        let json = r#"{
            "count": 3,
            "runs": [
                {"index": 7, "death": 81.5, "balance": 1200000.0, "market": 0.061},
                {"death": 64.0, "balance": -25000.0, "market": 0.02},
                {"death": 95.0, "balance": 4000000.0, "market": 0.093}
            ]
        }"#;
        let summary = parse_summary(json.as_bytes()).expect("summary");
        let indices: Vec<usize> = summary.runs.runs().iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(summary.runs.runs()[1].balance, -25_000.0);
        assert_eq!(summary.stats.count, 3);
    }

    #[test]
    fn summary_keeps_simulator_aggregates() {
        let json = r#"{
            "count": 2,
            "start": 1000000,
            "early_deaths": [],
            "liquidity_crises": [1],
            "bankruptcies": [1],
            "runs": [
                {"index": 0, "death": 90.0, "balance": 2500000.0, "market": 0.07},
                {"index": 1, "death": 70.0, "balance": -40000.0, "market": 0.01}
            ],
            "mean": {"index": 0, "death": 80.0, "balance": 1230000.0, "market": 0.04},
            "worst": {
                "age": {"ix": 1, "v": 70},
                "balance": {"ix": 1, "v": -40000},
                "market": {"ix": 1, "v": 0.01}
            },
            "best": {
                "age": {"ix": 0, "v": 90},
                "balance": {"ix": 0, "v": 2500000},
                "market": {"ix": 0, "v": 0.07}
            }
        }"#;
        let Summary { runs, stats } = parse_summary(json.as_bytes()).expect("summary");
        assert_eq!(runs.len(), 2);
        assert_eq!(stats.start, 1_000_000.0);
        assert!(stats.flags(1).bankruptcy);
        assert!(!stats.flags(0).liquidity_crisis);
        assert_eq!(stats.mean.map(|m| m.balance), Some(1_230_000.0));
        assert_eq!(stats.worst.map(|w| w.balance.index), Some(1));
        assert_eq!(stats.best.map(|b| b.age.value), Some(90.0));
        assert!(stats.median.is_none());
    }

    #[test]
    fn short_first_balance_row_keeps_later_accounts() {
        let csv = "date,Bonds,Total\n2030-01-01,5\n2031-01-01,6,10\n";
        let rows = parse_rows(csv.as_bytes()).expect("rows");
        let drill_down = crate::core::transform(&rows, &[]);
        let names: Vec<&str> = drill_down
            .series
            .iter()
            .map(|series| series.name.as_str())
            .collect();
        assert_eq!(names, vec!["Bonds", "Total"]);
    }

    #[test]
    fn summary_without_runs_is_rejected() {
        let err = parse_summary(r#"{"count": 0}"#.as_bytes()).expect_err("must reject");
        assert!(matches!(err, LoadError::Json(_)));
    }

    #[test]
    fn rows_are_keyed_by_header_and_keep_empty_cells() {
        let csv = "date,Bonds,Total\n2030-01-01,,100.00\n2031-01-01,25.50,130.00\n";
        let rows = parse_rows(csv.as_bytes()).expect("rows");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Bonds"], "");
        assert_eq!(rows[1]["Bonds"], "25.50");
        assert_eq!(rows[1]["date"], "2031-01-01");
    }

    #[test]
    fn short_records_drop_trailing_keys() {
        let csv = "date,severity,value\n2030-01-01,7\n";
        let rows = parse_rows(csv.as_bytes()).expect("rows");
        assert_eq!(rows[0].get("severity").map(String::as_str), Some("7"));
        assert!(!rows[0].contains_key("value"));
    }

    #[test]
    fn missing_column_is_reported() {
        let rows = parse_rows("when,Total\n2030-01-01,1\n".as_bytes()).expect("rows");
        let err = require_column(&rows, "balances-000001.csv", "date").expect_err("missing");
        assert_eq!(
            err.to_string(),
            "balances-000001.csv is missing the `date` column"
        );
    }

    #[test]
    fn unknown_run_is_not_found() {
        let dir = std::env::temp_dir().join("retirement-explorer-no-such-results");
        let err = load_detail_rows(&dir, 42).expect_err("missing run");
        assert!(matches!(err, LoadError::RunNotFound(42)));
    }
}
