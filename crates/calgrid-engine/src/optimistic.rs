//! Optimistic mutations layered over the server-confirmed collection.
//!
//! User edits are applied locally before the network call resolves. The
//! state keeps two things apart: the `confirmed` collection from the last
//! successful fetch, and a queue of pending mutations. What the UI shows is
//! always [`project`] of the two, so rolling back a failed request is just
//! dropping its entry from the queue.
//!
//! Each mutation moves `Applied -> Confirmed | RolledBack`. A confirmed
//! mutation keeps contributing to the projection until the next server-driven
//! [`OptimisticState::sync_confirmed`] replaces it with the authoritative item,
//! which avoids a flash of the old layout in between.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::collection::{build_item, sort_items, EventCollectionItem};
use crate::error::Result;
use crate::event::CalendarEvent;

/// A mutation requested by a UI interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MutationIntent {
    /// A new event carrying a client-generated id.
    Create { event: CalendarEvent },
    Update { event: CalendarEvent },
    #[serde(rename_all = "camelCase")]
    Delete { event_id: String },
}

/// A mutation already normalized into the display zone.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingAction {
    /// Create or update: replace any item with the same id.
    Upsert(EventCollectionItem),
    Delete(String),
}

impl PendingAction {
    /// Normalize an intent into the display zone.
    ///
    /// # Errors
    ///
    /// Propagates normalization errors from the event's boundaries.
    pub fn from_intent(intent: &MutationIntent, tz: &Tz) -> Result<Self> {
        match intent {
            MutationIntent::Create { event } | MutationIntent::Update { event } => {
                Ok(PendingAction::Upsert(build_item(event, tz)?))
            }
            MutationIntent::Delete { event_id } => Ok(PendingAction::Delete(event_id.clone())),
        }
    }

    pub fn event_id(&self) -> &str {
        match self {
            PendingAction::Upsert(item) => item.id(),
            PendingAction::Delete(id) => id,
        }
    }
}

/// Apply one action to a start-sorted collection, keeping it sorted.
///
/// Deleting an id that is not present returns the collection unchanged:
/// duplicate deletes are expected when requests race.
pub fn reduce(items: &[EventCollectionItem], action: &PendingAction) -> Vec<EventCollectionItem> {
    let mut next: Vec<EventCollectionItem> = items
        .iter()
        .filter(|item| item.id() != action.event_id())
        .cloned()
        .collect();

    match action {
        PendingAction::Delete(id) => {
            if next.len() == items.len() {
                debug!(event_id = %id, "delete of unknown event ignored");
            }
        }
        PendingAction::Upsert(item) => {
            let at = next.partition_point(|existing| existing.start <= item.start);
            next.insert(at, item.clone());
        }
    }
    next
}

/// Identifies one pending mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MutationId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MutationStatus {
    /// Shown locally, request in flight.
    Applied,
    /// Server accepted; shown until the next confirmed collection arrives.
    Confirmed,
    /// Request failed; no longer shown.
    RolledBack,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingMutation {
    pub id: MutationId,
    pub action: PendingAction,
    pub status: MutationStatus,
}

/// Fold every mutation that has not been rolled back over `confirmed`.
pub fn project(
    confirmed: &[EventCollectionItem],
    pending: &[PendingMutation],
) -> Vec<EventCollectionItem> {
    pending
        .iter()
        .filter(|m| m.status != MutationStatus::RolledBack)
        .fold(confirmed.to_vec(), |items, m| reduce(&items, &m.action))
}

/// Confirmed collection plus the queue of local mutations on top of it.
#[derive(Debug, Clone, Default)]
pub struct OptimisticState {
    confirmed: Vec<EventCollectionItem>,
    pending: Vec<PendingMutation>,
    next_id: u64,
}

impl OptimisticState {
    pub fn new(mut confirmed: Vec<EventCollectionItem>) -> Self {
        sort_items(&mut confirmed);
        OptimisticState {
            confirmed,
            pending: Vec::new(),
            next_id: 0,
        }
    }

    /// Queue a mutation and show it immediately.
    ///
    /// # Errors
    ///
    /// Propagates normalization errors; nothing is queued in that case.
    pub fn apply(&mut self, intent: &MutationIntent, tz: &Tz) -> Result<MutationId> {
        let action = PendingAction::from_intent(intent, tz)?;
        Ok(self.apply_action(action))
    }

    /// Queue an already-normalized action.
    pub fn apply_action(&mut self, action: PendingAction) -> MutationId {
        let id = MutationId(self.next_id);
        self.next_id += 1;
        debug!(mutation = id.0, event_id = %action.event_id(), "applied optimistic mutation");
        self.pending.push(PendingMutation {
            id,
            action,
            status: MutationStatus::Applied,
        });
        id
    }

    /// Mark a mutation as accepted by the server. Returns false for unknown or
    /// already-settled ids.
    pub fn confirm(&mut self, id: MutationId) -> bool {
        self.transition(id, MutationStatus::Confirmed)
    }

    /// Undo a failed mutation. Returns false for unknown or already-settled ids.
    pub fn rollback(&mut self, id: MutationId) -> bool {
        self.transition(id, MutationStatus::RolledBack)
    }

    fn transition(&mut self, id: MutationId, to: MutationStatus) -> bool {
        match self
            .pending
            .iter_mut()
            .find(|m| m.id == id && m.status == MutationStatus::Applied)
        {
            Some(mutation) => {
                mutation.status = to;
                debug!(mutation = id.0, status = ?to, "settled optimistic mutation");
                true
            }
            None => false,
        }
    }

    /// Install a freshly fetched collection. Settled mutations are dropped;
    /// ones still in flight keep applying on top of the new data.
    pub fn sync_confirmed(&mut self, mut confirmed: Vec<EventCollectionItem>) {
        sort_items(&mut confirmed);
        self.confirmed = confirmed;
        self.pending.retain(|m| m.status == MutationStatus::Applied);
    }

    /// What the UI should render right now.
    pub fn displayed(&self) -> Vec<EventCollectionItem> {
        project(&self.confirmed, &self.pending)
    }

    pub fn confirmed(&self) -> &[EventCollectionItem] {
        &self.confirmed
    }

    pub fn pending(&self) -> &[PendingMutation] {
        &self.pending
    }

    pub fn status(&self, id: MutationId) -> Option<MutationStatus> {
        self.pending.iter().find(|m| m.id == id).map(|m| m.status)
    }
}
