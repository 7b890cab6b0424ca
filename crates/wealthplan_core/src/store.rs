//! Storage collaborator consumed by the advisory engine
//!
//! The engine never owns persistence. It reads snapshots, events and goals
//! through [`AdvisoryStore`] and writes back only the alignment columns.

use std::collections::HashMap;
use std::sync::Mutex;

use jiff::civil::Date;

use crate::error::{AdvisoryError, StoreError};
use crate::model::{AlignmentCategory, AllocationSnapshot, CashFlowEvent, ClientId, Goal, SnapshotKind};

/// Closed date range used to prefilter events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub from: Date,
    pub to: Date,
}

impl DateWindow {
    pub fn new(from: Date, to: Date) -> Self {
        Self { from, to }
    }

    /// Whether an event could be active anywhere inside the window
    pub fn overlaps(&self, event: &CashFlowEvent) -> bool {
        event.start <= self.to && event.end.is_none_or(|end| end >= self.from)
    }
}

pub trait AdvisoryStore {
    /// Most recent snapshot of `kind` by as-of date
    fn latest_snapshot(
        &self,
        client: ClientId,
        kind: SnapshotKind,
    ) -> Result<Option<AllocationSnapshot>, StoreError>;

    /// Events ordered by start date, restricted to `window` when given
    fn events(
        &self,
        client: ClientId,
        window: Option<DateWindow>,
    ) -> Result<Vec<CashFlowEvent>, StoreError>;

    /// Goals ordered by target date ascending
    fn goals(&self, client: ClientId) -> Result<Vec<Goal>, StoreError>;

    fn write_alignment(
        &self,
        client: ClientId,
        percent: Option<f64>,
        category: Option<AlignmentCategory>,
    ) -> Result<(), StoreError>;
}

/// Latest Current snapshot, the starting point of every projection
pub fn require_baseline<S: AdvisoryStore + ?Sized>(
    store: &S,
    client: ClientId,
) -> Result<AllocationSnapshot, AdvisoryError> {
    store
        .latest_snapshot(client, SnapshotKind::Current)?
        .ok_or(AdvisoryError::NoBaseline(client))
}

#[derive(Debug, Default)]
struct ClientRecords {
    snapshots: Vec<AllocationSnapshot>,
    events: Vec<CashFlowEvent>,
    goals: Vec<Goal>,
    alignment: Option<(Option<f64>, Option<AlignmentCategory>)>,
}

#[derive(Debug, Default)]
struct MemoryState {
    clients: HashMap<ClientId, ClientRecords>,
    fail_writes: bool,
}

/// In-process [`AdvisoryStore`] for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_client<R>(&self, client: ClientId, f: impl FnOnce(&mut ClientRecords) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(state.clients.entry(client).or_default())
    }

    pub fn add_snapshot(&self, client: ClientId, snapshot: AllocationSnapshot) {
        self.with_client(client, |c| c.snapshots.push(snapshot));
    }

    pub fn add_event(&self, client: ClientId, event: CashFlowEvent) {
        self.with_client(client, |c| c.events.push(event));
    }

    pub fn add_goal(&self, client: ClientId, goal: Goal) {
        self.with_client(client, |c| c.goals.push(goal));
    }

    /// Alignment last written for `client`, `None` if never written
    pub fn persisted_alignment(
        &self,
        client: ClientId,
    ) -> Option<(Option<f64>, Option<AlignmentCategory>)> {
        self.with_client(client, |c| c.alignment)
    }

    /// Make every subsequent write-back fail with [`StoreError::Unavailable`]
    pub fn fail_writes(&self, fail: bool) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.fail_writes = fail;
    }
}

impl AdvisoryStore for MemoryStore {
    fn latest_snapshot(
        &self,
        client: ClientId,
        kind: SnapshotKind,
    ) -> Result<Option<AllocationSnapshot>, StoreError> {
        Ok(self.with_client(client, |c| {
            c.snapshots
                .iter()
                .filter(|s| s.kind == kind)
                .max_by_key(|s| s.as_of_date)
                .cloned()
        }))
    }

    fn events(
        &self,
        client: ClientId,
        window: Option<DateWindow>,
    ) -> Result<Vec<CashFlowEvent>, StoreError> {
        let mut events = self.with_client(client, |c| {
            c.events
                .iter()
                .filter(|e| window.is_none_or(|w| w.overlaps(e)))
                .cloned()
                .collect::<Vec<_>>()
        });
        events.sort_by_key(|e| e.start);
        Ok(events)
    }

    fn goals(&self, client: ClientId) -> Result<Vec<Goal>, StoreError> {
        let mut goals = self.with_client(client, |c| c.goals.clone());
        goals.sort_by_key(|g| g.target_date);
        Ok(goals)
    }

    fn write_alignment(
        &self,
        client: ClientId,
        percent: Option<f64>,
        category: Option<AlignmentCategory>,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.fail_writes {
            return Err(StoreError::Unavailable("alignment write rejected".into()));
        }
        state.clients.entry(client).or_default().alignment = Some((percent, category));
        Ok(())
    }
}
