//! Fixed-capacity correlation table keyed by `id mod capacity`.
//!
//! Slot acquisition is a single compare-and-set against a free-slot
//! witness; the only shared state mutated on the hot path is the slot's
//! occupancy flag and stamped id, so the table never needs a global lock.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use ethereal_primitives::{Error, Result};
use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::jsonrpc::RawResponse;

type Completion = oneshot::Sender<std::result::Result<RawResponse, Error>>;

struct Slot {
    occupied: AtomicBool,
    id: AtomicU64,
    sender: Mutex<Option<Completion>>,
}

impl Slot {
    fn new() -> Self {
        Slot {
            occupied: AtomicBool::new(false),
            id: AtomicU64::new(0),
            sender: Mutex::new(None),
        }
    }
}

/// The request/response correlation table described in the transport's
/// scheduling model: one slot per `id mod capacity`, CAS-guarded.
pub struct SlotTable {
    slots: Vec<Slot>,
    capacity: u64,
    next_id: AtomicU64,
    orphaned_responses: AtomicU64,
}

impl SlotTable {
    /// `capacity` must be a power of two (the default is 65536).
    pub fn new(capacity: usize) -> Self {
        assert!(capacity.is_power_of_two(), "slot table capacity must be a power of two");
        let slots = (0..capacity).map(|_| Slot::new()).collect();
        SlotTable {
            slots,
            capacity: capacity as u64,
            next_id: AtomicU64::new(1),
            orphaned_responses: AtomicU64::new(0),
        }
    }

    /// Draws the next monotonic request id.
    pub fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Reserves the slot for `id`, returning a receiver that completes when
    /// the matching response arrives (or the request is failed/timed out).
    pub fn acquire(&self, id: u64) -> Result<oneshot::Receiver<std::result::Result<RawResponse, Error>>> {
        let index = (id % self.capacity) as usize;
        let slot = &self.slots[index];
        if slot
            .occupied
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::Backpressure {
                slot: index,
                occupancy: self.occupied_count(),
            });
        }
        slot.id.store(id, Ordering::Release);
        let (tx, rx) = oneshot::channel();
        *slot.sender.lock() = Some(tx);
        Ok(rx)
    }

    /// Delivers a parsed response for `id`, if the slot is still waiting on
    /// it. Returns `false` (and bumps `orphaned_responses`) on a stale or
    /// mismatched id — a collision/wrap guard against a slot being reused
    /// before its previous response landed.
    pub fn complete(&self, id: u64, response: RawResponse) -> bool {
        let index = (id % self.capacity) as usize;
        let slot = &self.slots[index];
        if !slot.occupied.load(Ordering::Acquire) || slot.id.load(Ordering::Acquire) != id {
            self.orphaned_responses.fetch_add(1, Ordering::Relaxed);
            return false;
        }
        let sender = slot.sender.lock().take();
        slot.occupied.store(false, Ordering::Release);
        match sender {
            Some(sender) => sender.send(Ok(response)).is_ok(),
            None => {
                self.orphaned_responses.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Frees `id`'s slot if it is still occupied by that exact id, without
    /// delivering a value (used by the per-request timeout).
    pub fn release_if_current(&self, id: u64) {
        let index = (id % self.capacity) as usize;
        let slot = &self.slots[index];
        if slot.occupied.load(Ordering::Acquire) && slot.id.load(Ordering::Acquire) == id {
            *slot.sender.lock() = None;
            slot.occupied.store(false, Ordering::Release);
        }
    }

    /// Fails every occupied slot with an error built by `build` and clears
    /// the table; used on `close()` and on connection loss.
    pub fn fail_all(&self, build: impl Fn() -> Error) {
        for slot in &self.slots {
            if slot.occupied.swap(false, Ordering::AcqRel) {
                if let Some(sender) = slot.sender.lock().take() {
                    let _ = sender.send(Err(build()));
                }
            }
        }
    }

    pub fn orphaned_responses(&self) -> u64 {
        self.orphaned_responses.load(Ordering::Relaxed)
    }

    fn occupied_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| s.occupied.load(Ordering::Relaxed))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jsonrpc::RawResponse;

    #[test]
    fn acquire_then_occupied_slot_rejects_second_acquire() {
        let table = SlotTable::new(4);
        let _rx = table.acquire(1).unwrap();
        // 1 % 4 == 5 % 4, so this collides on the same slot while occupied.
        assert!(matches!(table.acquire(5), Err(Error::Backpressure { .. })));
    }

    #[tokio::test]
    async fn complete_delivers_to_the_matching_slot() {
        let table = SlotTable::new(4);
        let rx = table.acquire(7).unwrap();
        assert!(table.complete(7, RawResponse::result(serde_json::json!(42))));
        let response = rx.await.unwrap().unwrap();
        assert_eq!(response.result, Some(serde_json::json!(42)));
    }

    #[tokio::test]
    async fn fail_all_delivers_the_built_error_to_every_waiting_slot() {
        let table = SlotTable::new(4);
        let rx = table.acquire(1).unwrap();
        table.fail_all(|| Error::ConnectionLost);
        assert!(matches!(rx.await.unwrap(), Err(Error::ConnectionLost)));
    }

    #[test]
    fn mismatched_id_counts_as_orphaned() {
        let table = SlotTable::new(4);
        let _rx = table.acquire(3).unwrap();
        // 11 % 4 == 3 % 4 but ids differ: stale/collided response.
        assert!(!table.complete(11, RawResponse::result(serde_json::json!(null))));
        assert_eq!(table.orphaned_responses(), 1);
    }

    #[test]
    fn release_if_current_frees_the_slot_for_reuse() {
        let table = SlotTable::new(4);
        let _rx = table.acquire(2).unwrap();
        table.release_if_current(2);
        assert!(table.acquire(2).is_ok());
    }
}
