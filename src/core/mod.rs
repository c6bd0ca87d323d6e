mod click;
mod drilldown;
mod filter;
mod format;
mod projector;
mod range;
mod session;
mod stats;
mod types;

pub use click::{BarClick, BarGeometry, ClickError, bucket_rank, resolve_bar_click};
pub use drilldown::{
    AccountSeries, AnnotationStyle, DrillDown, EventAnnotation, LineStyle, Row, TOTAL_ACCOUNT,
    transform,
};
pub use filter::FilterSet;
pub use format::{DetailKind, detail_file_name, format_dollars, range_label};
pub use projector::{BinnedSeries, Projection, project};
pub use range::{RangeError, compute_range};
pub use session::{AxisChange, SummarySession};
pub use stats::{FlagCounts, IndexedValue, PercentileMarker, RunFlags, SummaryStats};
pub use types::{BinParams, Dimension, RangeFilter, Run, RunCollection, RunOutcome};
