use chrono::{DateTime, Utc};
use serde::Serialize;

use stylecast_core::Status;

const MIDNIGHT: usize = 0;
const NOON: usize = 12;
const EVENING: usize = 18;

/// Read model published to observers after every mutation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    /// Last known current temperature in Celsius
    pub temperature: Option<f64>,
    /// Last known hourly series; empty until the first successful fetch
    pub hourly_series: Vec<f64>,
    pub advice: Option<String>,
    /// Lifecycle of the primary fetch only
    pub status: Status,
    /// Present only while `status` is `Failed`
    pub error_message: Option<String>,
    /// A derived fetch for the latest requested temperature is in flight
    pub advice_loading: bool,
    /// When the forecast currently shown was fetched
    pub updated_at: Option<DateTime<Utc>>,
    /// Bumped on every publish
    pub version: u64,
}

/// Readings the widget shows for the three parts of the day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HourlyHighlights {
    pub midnight: f64,
    pub noon: f64,
    pub evening: f64,
}

impl Snapshot {
    /// Primary status with advice progress folded in.
    pub fn phase(&self) -> Status {
        if self.status == Status::Ready && self.advice_loading {
            Status::LoadingDerived
        } else {
            self.status
        }
    }

    pub fn is_loading(&self) -> bool {
        self.phase().is_loading()
    }

    pub fn has_forecast(&self) -> bool {
        self.temperature.is_some()
    }

    pub fn highlights(&self) -> Option<HourlyHighlights> {
        Some(HourlyHighlights {
            midnight: *self.hourly_series.get(MIDNIGHT)?,
            noon: *self.hourly_series.get(NOON)?,
            evening: *self.hourly_series.get(EVENING)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready(advice_loading: bool) -> Snapshot {
        Snapshot {
            temperature: Some(18.0),
            hourly_series: (0..24u8).map(f64::from).collect(),
            status: Status::Ready,
            advice_loading,
            ..Snapshot::default()
        }
    }

    #[test]
    fn test_initial_snapshot_is_idle_and_empty() {
        let snapshot = Snapshot::default();
        assert_eq!(snapshot.status, Status::Idle);
        assert!(snapshot.temperature.is_none());
        assert!(snapshot.hourly_series.is_empty());
        assert!(snapshot.advice.is_none());
        assert!(snapshot.error_message.is_none());
        assert!(snapshot.highlights().is_none());
    }

    #[test]
    fn test_phase_reports_derived_loading() {
        assert_eq!(ready(true).phase(), Status::LoadingDerived);
        assert_eq!(ready(true).status, Status::Ready);
        assert_eq!(ready(false).phase(), Status::Ready);
        assert!(ready(true).is_loading());
    }

    #[test]
    fn test_phase_ignores_advice_when_not_ready() {
        let snapshot = Snapshot {
            status: Status::Failed,
            advice_loading: true,
            ..Snapshot::default()
        };
        assert_eq!(snapshot.phase(), Status::Failed);
    }

    #[test]
    fn test_highlights() {
        let highlights = ready(false).highlights().unwrap();
        assert_eq!(highlights.midnight, 0.0);
        assert_eq!(highlights.noon, 12.0);
        assert_eq!(highlights.evening, 18.0);
    }
}
