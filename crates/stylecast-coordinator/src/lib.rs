//! Weather/advice coordinator.
//!
//! Owns the forecast and advice state shared by every presentation surface.
//! Surfaces hold a cloned [`Coordinator`] handle, read [`Snapshot`]s through a
//! watch channel and fire triggers; they never mutate state directly.

pub mod coordinator;
pub mod event;
pub mod snapshot;

pub use coordinator::{Coordinator, CoordinatorSettings};
pub use event::CoordinatorEvent;
pub use snapshot::{HourlyHighlights, Snapshot};
