//! Resolves a click on a stacked histogram bar to a single run.
//!
//! A bar aggregates many runs, so the renderer cannot say which one was hit.
//! The rank within the bar is estimated from how far up the bar the click
//! landed:
//!
//! ```text
//! fraction = (height + bottom - click_y) / height
//! rank     = round(fraction * axis_span), clamped to [0, len - 1]
//! ```
//!
//! This is an approximation. The only guarantee is that the rank never
//! decreases as the click moves from the bar bottom towards its top; callers
//! must tolerate off-by-one selections.

use serde::Deserialize;
use thiserror::Error;

use super::types::Dimension;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ClickError {
    #[error("clicked bar has no points")]
    EmptyBar,
    #[error("bar geometry must have a positive, finite height")]
    InvalidGeometry,
}

/// Pixel geometry of the clicked bar, as reported by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarGeometry {
    pub bottom: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarClick {
    /// Histogram the bar belongs to, when the renderer reports it.
    #[serde(default)]
    pub dimension: Option<Dimension>,
    pub geometry: BarGeometry,
    pub click_y: f64,
    /// Extent of the value axis (`max - min`) at the time of the click.
    pub axis_span: f64,
    /// Point indices belonging to the bar, in renderer order.
    pub point_indices: Vec<usize>,
}

/// Estimated rank of the clicked point within the bar.
pub fn bucket_rank(click: &BarClick) -> Result<usize, ClickError> {
    let BarGeometry { bottom, height } = click.geometry;
    if !height.is_finite() || height <= 0.0 {
        return Err(ClickError::InvalidGeometry);
    }
    if click.point_indices.is_empty() {
        return Err(ClickError::EmptyBar);
    }

    let fraction = (height + bottom - click.click_y) / height;
    let estimate = (fraction * click.axis_span).round();
    let last = click.point_indices.len() - 1;
    // NaN and negative estimates fall to the first point.
    let rank = if estimate.is_nan() || estimate <= 0.0 {
        0
    } else if estimate >= last as f64 {
        last
    } else {
        estimate as usize
    };
    Ok(rank)
}

/// Point index selected by the click.
pub fn resolve_bar_click(click: &BarClick) -> Result<usize, ClickError> {
    let rank = bucket_rank(click)?;
    Ok(click.point_indices[rank])
}
