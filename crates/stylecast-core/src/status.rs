//! Primary fetch lifecycle (idle/loading/ready/failed).
//!
//! Ensures only one forecast fetch runs at a time. Used by the coordinator.

use serde::Serialize;

/// Lifecycle of the primary (forecast) fetch as seen by observers.
///
/// `LoadingDerived` is never stored as the primary status; it is only reported
/// by views that fold advice progress into a single phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Idle,
    LoadingPrimary,
    LoadingDerived,
    Ready,
    Failed,
}

impl Status {
    /// True if a new primary fetch can be started.
    pub fn can_start_primary(self) -> bool {
        !matches!(self, Status::LoadingPrimary)
    }

    /// State after the forecast arrived.
    pub fn on_primary_success(self) -> Self {
        Status::Ready
    }

    /// State after the forecast failed.
    pub fn on_primary_failure(self) -> Self {
        Status::Failed
    }

    pub fn is_loading(self) -> bool {
        matches!(self, Status::LoadingPrimary | Status::LoadingDerived)
    }
}
