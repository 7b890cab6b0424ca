mod allocation;
mod events;
mod goals;
mod ids;
mod results;

pub use allocation::{Allocation, AllocationSnapshot, AllocationTable, AssetClass, SnapshotKind};
pub use events::{CashFlowEvent, EventKind, Frequency, UnknownVariant};
pub use goals::Goal;
pub use ids::{ClientId, EventId, GoalId, SnapshotId};
pub use results::{AlignmentCategory, AlignmentResult, SeriesPoint, last_value};
