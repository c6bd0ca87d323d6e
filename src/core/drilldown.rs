use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

/// One CSV row keyed by header.
pub type Row = BTreeMap<String, String>;

pub const DATE_KEY: &str = "date";
pub const TOTAL_ACCOUNT: &str = "Total";

const MIN_SEVERITY: u8 = 1;
const ANNOTATION_SEVERITY_THRESHOLD: u8 = 5;
const STAGGER_STEP_PX: i32 = -20;
const STAGGER_CYCLE: usize = 10;

const TOTAL_STYLE: LineStyle = LineStyle {
    color: "rgb(0, 0, 0)",
    width: 3.0,
};
const ACCOUNT_LINE_WIDTH: f64 = 2.0;

const PALETTE: [&str; 18] = [
    "rgb(127, 0, 0)",
    "rgb(0, 127, 0)",
    "rgb(0, 0, 127)",
    "rgb(127, 127, 0)",
    "rgb(127, 0, 127)",
    "rgb(0, 127, 127)",
    "rgb(255, 127, 0)",
    "rgb(255, 0, 127)",
    "rgb(127, 255, 0)",
    "rgb(127, 0, 255)",
    "rgb(0, 255, 127)",
    "rgb(0, 127, 255)",
    "rgb(255, 127, 127)",
    "rgb(127, 255, 127)",
    "rgb(127, 127, 255)",
    "rgb(255, 255, 127)",
    "rgb(255, 127, 255)",
    "rgb(127, 255, 255)",
];

// Row `n` styles severity `n + 1`; severities past the end use the last row.
const SEVERITY_STYLES: [AnnotationStyle; 11] = [
    AnnotationStyle::plain("rgba(255,255,255,0.5)"),
    AnnotationStyle::plain("rgba(255,255,255,0.5)"),
    AnnotationStyle::plain("rgba(255,255,255,0.5)"),
    AnnotationStyle::plain("rgba(127,255,127,0.5)"),
    AnnotationStyle::plain("rgba(127,255,127,0.5)"),
    AnnotationStyle::plain("rgba(127,127,255,0.5)"),
    AnnotationStyle::plain("rgba(127,127,255,0.5)"),
    AnnotationStyle::alert("rgba(255,0,0,0.5)"),
    AnnotationStyle::alert("rgba(255,0,0,0.75)"),
    AnnotationStyle::alert("rgba(255,0,0,0.75)"),
    AnnotationStyle::alert("rgba(255,0,0,1.0)"),
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LineStyle {
    pub color: &'static str,
    pub width: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationStyle {
    pub bgcolor: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_color: Option<&'static str>,
}

impl AnnotationStyle {
    const fn plain(bgcolor: &'static str) -> Self {
        Self {
            bgcolor,
            font_color: None,
        }
    }

    const fn alert(bgcolor: &'static str) -> Self {
        Self {
            bgcolor,
            font_color: Some("white"),
        }
    }

    pub fn for_severity(severity: u8) -> Self {
        let row = usize::from(severity.max(MIN_SEVERITY) - 1).min(SEVERITY_STYLES.len() - 1);
        SEVERITY_STYLES[row]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountSeries {
    pub name: String,
    pub dates: Vec<String>,
    /// `None` is a gap in the line, not zero.
    pub values: Vec<Option<f64>>,
    pub line: LineStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventAnnotation {
    pub date: String,
    pub text: String,
    pub severity: u8,
    pub style: AnnotationStyle,
    pub offset_y: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DrillDown {
    pub series: Vec<AccountSeries>,
    pub annotations: Vec<EventAnnotation>,
}

pub fn transform(balance_rows: &[Row], event_rows: &[Row]) -> DrillDown {
    DrillDown {
        series: account_series(balance_rows),
        annotations: event_annotations(event_rows),
    }
}

/// One line per account, sorted by name; colours follow sorted position.
pub fn account_series(rows: &[Row]) -> Vec<AccountSeries> {
    // Short records lack trailing keys, so every row contributes names.
    let accounts: BTreeSet<&String> = rows
        .iter()
        .flat_map(|row| row.keys())
        .filter(|key| key.as_str() != DATE_KEY)
        .collect();
    let dates: Vec<String> = rows
        .iter()
        .map(|row| row.get(DATE_KEY).cloned().unwrap_or_default())
        .collect();

    accounts
        .into_iter()
        .enumerate()
        .map(|(position, name)| AccountSeries {
            name: name.clone(),
            dates: dates.clone(),
            values: rows.iter().map(|row| parse_cell(row.get(name))).collect(),
            line: line_style(name, position),
        })
        .collect()
}

pub fn event_annotations(rows: &[Row]) -> Vec<EventAnnotation> {
    rows.iter()
        .filter_map(|row| {
            let severity = parse_severity(row.get("severity"));
            (severity > ANNOTATION_SEVERITY_THRESHOLD).then_some((row, severity))
        })
        .enumerate()
        .map(|(k, (row, severity))| EventAnnotation {
            date: row.get(DATE_KEY).cloned().unwrap_or_default(),
            text: row.get("value").cloned().unwrap_or_default(),
            severity,
            style: AnnotationStyle::for_severity(severity),
            offset_y: stagger_offset(k),
        })
        .collect()
}

/// Vertical label offset for the k-th annotation, cycling every ten events.
pub fn stagger_offset(k: usize) -> i32 {
    let step = (k % STAGGER_CYCLE) as i32 + 2;
    STAGGER_STEP_PX * step
}

fn line_style(name: &str, position: usize) -> LineStyle {
    if name == TOTAL_ACCOUNT {
        return TOTAL_STYLE;
    }
    LineStyle {
        color: PALETTE[position % PALETTE.len()],
        width: ACCOUNT_LINE_WIDTH,
    }
}

fn parse_cell(cell: Option<&String>) -> Option<f64> {
    cell.map(|raw| raw.trim())
        .filter(|raw| !raw.is_empty())
        .and_then(|raw| raw.parse::<f64>().ok())
        .filter(|value| value.is_finite())
}

// Reads the leading integer (`"7.5"` is 7) and clamps it into `1..=255`.
// Text with no leading digits counts as the lowest severity.
fn parse_severity(cell: Option<&String>) -> u8 {
    let severity = cell
        .and_then(|raw| leading_integer(raw.trim()))
        .unwrap_or(i64::from(MIN_SEVERITY));
    severity.clamp(i64::from(MIN_SEVERITY), i64::from(u8::MAX)) as u8
}

fn leading_integer(text: &str) -> Option<i64> {
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let len = digits.bytes().take_while(u8::is_ascii_digit).count();
    if len == 0 {
        return None;
    }
    let magnitude = digits[..len].bytes().fold(0i64, |acc, digit| {
        acc.saturating_mul(10)
            .saturating_add(i64::from(digit - b'0'))
    });
    Some(if negative { -magnitude } else { magnitude })
}
