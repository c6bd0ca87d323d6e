use super::types::Dimension;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DetailKind {
    Balances,
    Events,
}

impl DetailKind {
    fn prefix(self) -> &'static str {
        match self {
            DetailKind::Balances => "balances",
            DetailKind::Events => "events",
        }
    }
}

/// Per-run detail files are addressed by the run index padded to six digits.
pub fn detail_file_name(kind: DetailKind, index: usize) -> String {
    format!("{}-{index:06}.csv", kind.prefix())
}

/// Compact dollar text: `$0`, `$950`, `$250k`, `$1.25M`, `-$500k`.
///
/// The scaled amount is printed in full, so `1_234_567.0` is `$1.234567M`.
pub fn format_dollars(value: f64) -> String {
    if value == 0.0 {
        return "$0".to_string();
    }
    let magnitude = value.abs();
    let (scaled, suffix) = if magnitude >= 1_000_000.0 {
        (magnitude / 1_000_000.0, "M")
    } else if magnitude >= 1_000.0 {
        (magnitude / 1_000.0, "k")
    } else {
        (magnitude, "")
    };
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}${}{suffix}", plain_number(scaled))
}

pub fn range_label(dimension: Dimension, range: Option<(f64, f64)>) -> String {
    let Some((low, high)) = range else {
        return format!("{} Range: no data", dimension.title());
    };
    let (low, high) = match dimension {
        Dimension::Balance => (format_dollars(low), format_dollars(high)),
        Dimension::Age | Dimension::Market => (plain_number(low), plain_number(high)),
    };
    format!("{} Range: {low} - {high}", dimension.title())
}

// Shortest text that reads back as the same value, without rounding.
fn plain_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{value}")
}
