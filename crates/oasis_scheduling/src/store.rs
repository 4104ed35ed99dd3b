// --- File: crates/oasis_scheduling/src/store.rs ---
//! In-memory stores for the authoritative booking set and the waitlist.
//!
//! The booking store is the single writer gate: every mutation runs as a
//! closure under the write lock, so validate-then-commit sequences (conflict
//! scan + insert, guard + status change) are atomic and the first committed
//! write wins. Each committed mutation bumps a monotonically increasing
//! revision that feeds the poll-and-diff endpoint and the watch channel.

use oasis_common::{not_found, OasisError};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::RwLock;
use tokio::sync::watch;
use uuid::Uuid;

use crate::models::{Booking, WaitlistItem};

struct BookingShelf {
    bookings: HashMap<Uuid, Booking>,
    /// Revision at which each booking was last touched.
    touched_at: HashMap<Uuid, u64>,
    revision: u64,
}

pub struct BookingStore {
    inner: RwLock<BookingShelf>,
    revision_tx: watch::Sender<u64>,
}

/// Payload of the poll-and-diff feed.
#[derive(Debug, Clone, Serialize)]
pub struct BookingChanges {
    pub revision: u64,
    pub bookings: Vec<Booking>,
}

impl Default for BookingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingStore {
    pub fn new() -> Self {
        let (revision_tx, _) = watch::channel(0);
        Self {
            inner: RwLock::new(BookingShelf {
                bookings: HashMap::new(),
                touched_at: HashMap::new(),
                revision: 0,
            }),
            revision_tx,
        }
    }

    /// Runs `op` under the write lock. On `Ok((booking_id, value))` the
    /// revision is bumped and the touched booking stamped; on `Err` nothing
    /// is published (zero side effects).
    pub fn commit<T>(
        &self,
        op: impl FnOnce(&mut HashMap<Uuid, Booking>) -> Result<(Uuid, T), OasisError>,
    ) -> Result<T, OasisError> {
        let mut shelf = self.inner.write().expect("booking store lock poisoned");
        let (booking_id, value) = op(&mut shelf.bookings)?;
        shelf.revision += 1;
        let revision = shelf.revision;
        shelf.touched_at.insert(booking_id, revision);
        drop(shelf);
        // Receivers may have gone away; that is fine.
        let _ = self.revision_tx.send(revision);
        Ok(value)
    }

    pub fn get(&self, booking_id: Uuid) -> Result<Booking, OasisError> {
        self.inner
            .read()
            .expect("booking store lock poisoned")
            .bookings
            .get(&booking_id)
            .cloned()
            .ok_or_else(|| not_found(format!("unknown booking: {booking_id}")))
    }

    /// Full snapshot for read-only projections (availability, day views).
    pub fn snapshot(&self) -> Vec<Booking> {
        self.inner
            .read()
            .expect("booking store lock poisoned")
            .bookings
            .values()
            .cloned()
            .collect()
    }

    pub fn revision(&self) -> u64 {
        self.inner
            .read()
            .expect("booking store lock poisoned")
            .revision
    }

    /// Bookings touched after `since`, plus the current revision. Staff
    /// clients poll this to converge; there is no push channel.
    pub fn changes_since(&self, since: u64) -> BookingChanges {
        let shelf = self.inner.read().expect("booking store lock poisoned");
        let mut bookings: Vec<Booking> = shelf
            .touched_at
            .iter()
            .filter(|(_, rev)| **rev > since)
            .filter_map(|(id, _)| shelf.bookings.get(id).cloned())
            .collect();
        bookings.sort_by_key(|b| b.start_time);
        BookingChanges {
            revision: shelf.revision,
            bookings,
        }
    }

    /// Watch channel carrying the latest revision.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision_tx.subscribe()
    }
}

#[derive(Default)]
pub struct WaitlistStore {
    items: RwLock<HashMap<Uuid, WaitlistItem>>,
}

impl WaitlistStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, item: WaitlistItem) {
        self.items
            .write()
            .expect("waitlist lock poisoned")
            .insert(item.id, item);
    }

    pub fn get(&self, item_id: Uuid) -> Result<WaitlistItem, OasisError> {
        self.items
            .read()
            .expect("waitlist lock poisoned")
            .get(&item_id)
            .cloned()
            .ok_or_else(|| not_found(format!("unknown waitlist item: {item_id}")))
    }

    /// Removes an item, either on successful conversion or explicit staff
    /// deletion. Conversion callers must only invoke this after the booking
    /// was created.
    pub fn remove(&self, item_id: Uuid) -> Result<WaitlistItem, OasisError> {
        self.items
            .write()
            .expect("waitlist lock poisoned")
            .remove(&item_id)
            .ok_or_else(|| not_found(format!("unknown waitlist item: {item_id}")))
    }

    pub fn list(&self) -> Vec<WaitlistItem> {
        let mut items: Vec<WaitlistItem> = self
            .items
            .read()
            .expect("waitlist lock poisoned")
            .values()
            .cloned()
            .collect();
        items.sort_by_key(|i| i.created_at);
        items
    }
}
