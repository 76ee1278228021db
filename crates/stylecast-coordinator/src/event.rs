/// Change notifications broadcast by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoordinatorEvent {
    /// A primary fetch succeeded. Sent exactly once per success, after the
    /// snapshot carrying `temperature` has been published.
    PrimaryReady { temperature: f64 },
    /// Advice (or its fallback) for `temperature` was stored.
    AdviceUpdated { temperature: f64 },
}
