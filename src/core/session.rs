use serde::Deserialize;

use super::click::{BarClick, ClickError, resolve_bar_click};
use super::filter::FilterSet;
use super::projector::{Projection, project};
use super::types::{Dimension, Run, RunCollection};

/// Axis change reported by the chart renderer after a zoom or reset.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AxisChange {
    Autorange,
    Range(f64, f64),
}

/// Owns the loaded runs and the only mutable filter state of a summary view.
#[derive(Debug, Clone, Default)]
pub struct SummarySession {
    runs: RunCollection,
    filters: FilterSet,
}

impl SummarySession {
    pub fn with_filters(runs: RunCollection, filters: FilterSet) -> Self {
        Self { runs, filters }
    }

    pub fn runs(&self) -> &RunCollection {
        &self.runs
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn set_filter(&mut self, dimension: Dimension, low: f64, high: f64) {
        tracing::info!(dimension = dimension.as_str(), low, high, "filter set");
        self.filters.set(dimension, low, high);
    }

    pub fn clear_filter(&mut self, dimension: Dimension) {
        tracing::info!(dimension = dimension.as_str(), "filter cleared");
        self.filters.clear(dimension);
    }

    /// Autorange clears the dimension's own filter; an explicit range sets it.
    pub fn handle_axis_change(&mut self, dimension: Dimension, change: AxisChange) {
        match change {
            AxisChange::Autorange => self.clear_filter(dimension),
            AxisChange::Range(low, high) => self.set_filter(dimension, low, high),
        }
    }

    pub fn projection(&self) -> Projection {
        project(&self.runs, &self.filters)
    }

    /// Maps a bar click back to the clicked run.
    ///
    /// Point indices from the renderer address the filtered series, so the
    /// click is resolved against the current filtered view and the run's own
    /// index is returned. `Ok(None)` means the point no longer exists.
    pub fn resolve_click(&self, click: &BarClick) -> Result<Option<Run>, ClickError> {
        let point = resolve_bar_click(click)?;
        let filtered = self.filters.apply(&self.runs);
        let run = filtered.get(point).copied();
        let dimension = click.dimension.map_or("unknown", Dimension::as_str);
        match run {
            Some(run) => {
                tracing::debug!(dimension, point, index = run.index, "resolved bar click")
            }
            None => {
                tracing::warn!(dimension, point, visible = filtered.len(), "click outside view")
            }
        }
        Ok(run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::click::BarGeometry;
    use crate::core::types::RunOutcome;

    fn session() -> SummarySession {
        let runs = RunCollection::from_outcomes(
            [(45.0, 0.01), (55.0, 0.05), (65.0, 0.07), (75.0, 0.09)]
                .into_iter()
                .map(|(death, market)| RunOutcome {
                    death,
                    balance: 1_000_000.0,
                    market,
                }),
        );
        SummarySession::with_filters(runs, FilterSet::new())
    }

    #[test]
    fn explicit_range_sets_and_autorange_clears() {
        let mut session = session();
        session.handle_axis_change(Dimension::Age, AxisChange::Range(50.0, 70.0));
        assert!(session.filters().is_filtered(Dimension::Age));
        assert_eq!(session.projection().filtered.len(), 2);

        session.handle_axis_change(Dimension::Age, AxisChange::Autorange);
        assert!(!session.filters().is_filtered(Dimension::Age));
        assert_eq!(session.projection().filtered.len(), 4);
    }

    #[test]
    fn market_autorange_clears_market_not_balance() {
        let mut session = session();
        session.set_filter(Dimension::Balance, 0.0, 2_000_000.0);
        session.handle_axis_change(Dimension::Market, AxisChange::Range(4.0, 8.0));

        session.handle_axis_change(Dimension::Market, AxisChange::Autorange);
        assert!(!session.filters().is_filtered(Dimension::Market));
        assert!(session.filters().is_filtered(Dimension::Balance));
    }

    #[test]
    fn click_resolves_through_filtered_view_to_original_index() {
        let mut session = session();
        session.set_filter(Dimension::Age, 50.0, 80.0);
        let click = BarClick {
            dimension: Some(Dimension::Age),
            geometry: BarGeometry {
                bottom: 0.0,
                height: 100.0,
            },
            click_y: 100.0,
            axis_span: 3.0,
            point_indices: vec![1, 2],
        };
        let run = session.resolve_click(&click).expect("click").expect("run");
        assert_eq!(run.index, 2);
        assert_eq!(run.death, 65.0);
    }

    #[test]
    fn click_on_stale_point_yields_none() {
        let mut session = session();
        session.set_filter(Dimension::Age, 70.0, 80.0);
        let click = BarClick {
            dimension: None,
            geometry: BarGeometry {
                bottom: 0.0,
                height: 10.0,
            },
            click_y: 5.0,
            axis_span: 1.0,
            point_indices: vec![3],
        };
        assert_eq!(session.resolve_click(&click), Ok(None));
    }

    #[test]
    fn session_keeps_runs_when_everything_is_filtered_out() {
        let mut session = session();
        session.set_filter(Dimension::Age, 90.0, 95.0);
        assert_eq!(session.runs().len(), 4);
        assert!(session.projection().is_empty());
    }
}
