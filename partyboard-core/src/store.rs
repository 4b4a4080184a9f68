//! The listing store, single source of truth for the board.
//!
//! The board is a copy-on-write value published through a `watch` channel.
//! Every mutation produces a fully-settled [`Board`] before it becomes
//! visible, so readers holding an `Arc<Board>` never observe a half-applied
//! change and never hold a lock while rendering.
//!
//! # Lifecycle
//!
//! `Active -> Expired -> Removed`, with `Removed` reachable directly from
//! either state. All mutators are idempotent and tolerate out-of-order
//! delivery:
//!
//! - `expire` and `remove` leave a tombstone for the id, so a late `created`
//!   (or a stale snapshot row) cannot resurrect a purged listing or bring an
//!   expired one back to `Active`.
//! - Tombstones and listings older than the retention window are dropped by
//!   [`ListingStore::prune_older_than`].
//!
//! The store never decides *when* a listing expires; it only reacts to the
//! transitions it is told about. The backend owns the timers and guarantees
//! expiry no earlier than 5 minutes and removal no earlier than 1 hour after
//! creation.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use time::{Duration, OffsetDateTime};
use tokio::sync::watch;

use crate::entities::{Listing, ListingId, ListingStatus};

/// Sort key: newest first, ties broken by id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ListingKey {
    created_at: Reverse<OffsetDateTime>,
    id: ListingId,
}

impl ListingKey {
    fn of(listing: &Listing) -> Self {
        Self {
            created_at: Reverse(listing.created_at),
            id: listing.id.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TombstoneKind {
    Expired,
    Removed,
}

#[derive(Debug, Clone, Copy)]
struct Tombstone {
    kind: TombstoneKind,
    recorded_at: OffsetDateTime,
}

/// A settled, immutable view of every listing on the board.
#[derive(Debug, Clone, Default)]
pub struct Board {
    listings: BTreeMap<ListingKey, Listing>,
    index: HashMap<ListingId, ListingKey>,
    tombstones: HashMap<ListingId, Tombstone>,
}

impl Board {
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    pub fn get(&self, id: &ListingId) -> Option<&Listing> {
        self.index.get(id).and_then(|key| self.listings.get(key))
    }

    /// Listings ordered by creation time, most recent first.
    pub fn iter(&self) -> impl Iterator<Item = &Listing> {
        self.listings.values()
    }

    /// Owned copy of [`iter`](Board::iter).
    pub fn snapshot(&self) -> Vec<Listing> {
        self.iter().cloned().collect()
    }

    fn insert(&mut self, mut listing: Listing) -> bool {
        if self.index.contains_key(&listing.id) {
            return false;
        }
        match self.tombstones.get(&listing.id).map(|t| t.kind) {
            Some(TombstoneKind::Removed) => return false,
            Some(TombstoneKind::Expired) => listing.status = ListingStatus::Expired,
            None => {}
        }
        let key = ListingKey::of(&listing);
        self.index.insert(listing.id.clone(), key.clone());
        self.listings.insert(key, listing);
        true
    }

    fn expire(&mut self, id: &ListingId, now: OffsetDateTime) -> bool {
        let tombstone = self.tombstones.entry(id.clone()).or_insert(Tombstone {
            kind: TombstoneKind::Expired,
            recorded_at: now,
        });
        if tombstone.kind == TombstoneKind::Removed {
            return false;
        }
        let Some(key) = self.index.get(id) else {
            return false;
        };
        match self.listings.get_mut(key) {
            Some(listing) if listing.status == ListingStatus::Active => {
                listing.status = ListingStatus::Expired;
                true
            }
            _ => false,
        }
    }

    fn remove(&mut self, id: &ListingId, now: OffsetDateTime) -> bool {
        self.tombstones.insert(
            id.clone(),
            Tombstone {
                kind: TombstoneKind::Removed,
                recorded_at: now,
            },
        );
        match self.index.remove(id) {
            Some(key) => self.listings.remove(&key).is_some(),
            None => false,
        }
    }

    fn prune(&mut self, now: OffsetDateTime, retention: Duration) -> usize {
        let cutoff = now - retention;
        let stale: Vec<ListingKey> = self
            .listings
            .keys()
            .filter(|key| key.created_at.0 < cutoff)
            .cloned()
            .collect();
        for key in &stale {
            self.listings.remove(key);
            self.index.remove(&key.id);
            self.tombstones.insert(
                key.id.clone(),
                Tombstone {
                    kind: TombstoneKind::Removed,
                    recorded_at: now,
                },
            );
        }
        self.tombstones.retain(|_, t| t.recorded_at >= cutoff);
        stale.len()
    }

    /// A new board holding `listings`, carrying over this board's tombstones.
    fn rebuilt(&self, listings: Vec<Listing>) -> Board {
        let mut board = Board {
            tombstones: self.tombstones.clone(),
            ..Board::default()
        };
        for listing in listings {
            board.insert(listing);
        }
        board
    }
}

/// Owner of the board state.
///
/// Cloning shares the same board. Mutations are expected to come from a
/// single writer (see [`StoreWriter`](crate::processors::StoreWriter));
/// everything else should hold a [`BoardReader`].
#[derive(Clone)]
pub struct ListingStore {
    tx: Arc<watch::Sender<Arc<Board>>>,
}

impl ListingStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Arc::new(Board::default()));
        Self { tx: Arc::new(tx) }
    }

    /// A read-only handle that can also wait for changes.
    pub fn reader(&self) -> BoardReader {
        BoardReader {
            rx: self.tx.subscribe(),
        }
    }

    /// The current board.
    pub fn view(&self) -> Arc<Board> {
        self.tx.borrow().clone()
    }

    /// Current listings, newest first, ties broken by id.
    pub fn snapshot(&self) -> Vec<Listing> {
        self.view().snapshot()
    }

    /// Insert `listing` unless its id is already known. Returns whether the
    /// board changed.
    pub fn apply_create(&self, listing: Listing) -> bool {
        self.mutate(|board| board.insert(listing))
    }

    /// Mark `id` expired if it is active. Absent ids are not an error.
    pub fn apply_expire(&self, id: &ListingId) -> bool {
        let now = OffsetDateTime::now_utc();
        self.mutate(|board| board.expire(id, now))
    }

    /// Delete `id` regardless of status. Absent ids are not an error.
    pub fn apply_remove(&self, id: &ListingId) -> bool {
        let now = OffsetDateTime::now_utc();
        self.mutate(|board| board.remove(id, now))
    }

    /// Atomically replace every listing with `listings`. Returns the number
    /// of listings on the new board.
    pub fn replace_all(&self, listings: Vec<Listing>) -> usize {
        let mut count = 0;
        self.tx.send_modify(|board| {
            let next = board.rebuilt(listings);
            count = next.len();
            *board = Arc::new(next);
        });
        count
    }

    /// Drop listings created more than `retention` before `now`, along with
    /// expired tombstones. Returns the number of listings dropped.
    pub fn prune_older_than(&self, now: OffsetDateTime, retention: Duration) -> usize {
        let mut pruned = 0;
        self.tx.send_if_modified(|board| {
            let board = Arc::make_mut(board);
            pruned = board.prune(now, retention);
            pruned > 0
        });
        pruned
    }

    fn mutate(&self, f: impl FnOnce(&mut Board) -> bool) -> bool {
        self.tx.send_if_modified(|board| f(Arc::make_mut(board)))
    }
}

impl Default for ListingStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only handle on the board.
#[derive(Clone)]
pub struct BoardReader {
    rx: watch::Receiver<Arc<Board>>,
}

impl BoardReader {
    pub fn current(&self) -> Arc<Board> {
        self.rx.borrow().clone()
    }

    /// Wait for the next published change.
    pub async fn changed(&mut self) -> Result<Arc<Board>, watch::error::RecvError> {
        self.rx.changed().await?;
        Ok(self.rx.borrow_and_update().clone())
    }

    /// Wait until the board satisfies `predicate`.
    pub async fn wait_for(
        &mut self,
        mut predicate: impl FnMut(&Board) -> bool,
    ) -> Result<Arc<Board>, watch::error::RecvError> {
        let board = self.rx.wait_for(|board| predicate(board)).await?;
        Ok(board.clone())
    }
}
