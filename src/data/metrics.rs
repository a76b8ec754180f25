//! Aligned time-series columns for per-node resource metrics.

use super::row::RowSet;

/// Maximum number of samples kept per series; matches the `LIMIT` of the
/// metric query.
pub const MAX_SAMPLES: usize = 100;

const TIME_COLUMN: &str = "event_time";
const MEMORY_COLUMN: &str = "CurrentMetric_MemoryTracking";
const USER_TIME_COLUMN: &str = "ProfileEvent_UserTimeMicroseconds";
const SYSTEM_TIME_COLUMN: &str = "ProfileEvent_SystemTimeMicroseconds";

/// Resource metrics for one node: a single timestamp axis (newest first)
/// with one aligned value column per tracked metric.
///
/// Every value column always has the same length as `timestamps`; charts
/// consume the columns in the order the feed returned them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricSeries {
    /// Shared time axis, DateTime strings as the endpoint rendered them.
    pub timestamps: Vec<String>,
    /// Tracked memory bytes.
    pub memory: Vec<f64>,
    /// User CPU time, microseconds.
    pub user_time_us: Vec<f64>,
    /// System CPU time, microseconds.
    pub system_time_us: Vec<f64>,
}

impl MetricSeries {
    /// Split one `system.metric_log` row set into aligned columns.
    ///
    /// Rows arrive newest first and are consumed in that order. A row
    /// without a timestamp is dropped; a missing value cell becomes 0 so
    /// the columns stay aligned with the axis.
    pub fn from_rows(rows: &RowSet) -> Self {
        let mut series = Self::default();

        for row in rows.iter().take(MAX_SAMPLES) {
            let Some(ts) = row.get(TIME_COLUMN) else {
                continue;
            };
            series.timestamps.push(ts.to_string());
            series.memory.push(number_or_zero(row, MEMORY_COLUMN));
            series.user_time_us.push(number_or_zero(row, USER_TIME_COLUMN));
            series
                .system_time_us
                .push(number_or_zero(row, SYSTEM_TIME_COLUMN));
        }

        series
    }

    /// Number of samples on the shared axis.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

fn number_or_zero(row: &super::row::LogRow, column: &str) -> f64 {
    row.get(column).and_then(|c| c.as_number()).unwrap_or(0.0)
}
