//! Time-ordered index of token expiry deadlines.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::sync::Mutex;

/// One (token, deadline) pair mirrored into the expiry index at issuance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiryEntry {
    /// The token value (or revocation id for the signed strategy).
    pub token: String,
    /// Absolute expiry deadline, seconds since the Unix epoch.
    pub expires_at: i64,
}

/// Heap slot wrapping an entry with an insertion sequence number so that
/// equal deadlines pop in insertion order.
#[derive(Debug, PartialEq, Eq)]
struct Slot {
    entry: ExpiryEntry,
    seq: u64,
}

impl Ord for Slot {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.entry.expires_at, self.seq).cmp(&(other.entry.expires_at, other.seq))
    }
}

impl PartialOrd for Slot {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A min-heap of [`ExpiryEntry`] values ordered by soonest deadline.
///
/// The queue does not know whether a token is still live in the token
/// store; explicit invalidation leaves a stale entry behind, and the sweep
/// tolerates popping it. All access goes through the internal mutex, so
/// issuance and the sweep task may touch the queue from different tasks.
#[derive(Debug, Default)]
pub struct ExpiryQueue {
    inner: Mutex<QueueState>,
}

#[derive(Debug, Default)]
struct QueueState {
    heap: BinaryHeap<Reverse<Slot>>,
    next_seq: u64,
}

impl ExpiryQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes an entry. O(log n).
    pub fn push(&self, entry: ExpiryEntry) {
        let mut state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let seq = state.next_seq;
        state.next_seq += 1;
        state.heap.push(Reverse(Slot { entry, seq }));
    }

    /// Returns a copy of the earliest-deadline entry without removing it.
    pub fn peek(&self) -> Option<ExpiryEntry> {
        let state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        state.heap.peek().map(|slot| slot.0.entry.clone())
    }

    /// Removes and returns the earliest-deadline entry. O(log n).
    pub fn pop(&self) -> Option<ExpiryEntry> {
        let mut state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        state.heap.pop().map(|slot| slot.0.entry)
    }

    /// Number of entries, including stale ones.
    pub fn len(&self) -> usize {
        let state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        state.heap.len()
    }

    /// Whether the queue holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(token: &str, expires_at: i64) -> ExpiryEntry {
        ExpiryEntry {
            token: token.to_string(),
            expires_at,
        }
    }

    #[test]
    fn test_empty_queue() {
        let queue = ExpiryQueue::new();
        assert!(queue.peek().is_none());
        assert!(queue.pop().is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_pops_in_deadline_order() {
        let base = 1_700_000_000;
        let queue = ExpiryQueue::new();
        queue.push(entry("fifteen", base + 15 * 60));
        queue.push(entry("five", base + 5 * 60));
        queue.push(entry("ten", base + 10 * 60));

        assert_eq!(queue.peek().unwrap().token, "five");
        assert_eq!(queue.len(), 3);

        assert_eq!(queue.pop().unwrap().token, "five");
        assert_eq!(queue.pop().unwrap().token, "ten");
        assert_eq!(queue.pop().unwrap().token, "fifteen");
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_equal_deadlines_pop_in_insertion_order() {
        let queue = ExpiryQueue::new();
        queue.push(entry("first", 100));
        queue.push(entry("second", 100));
        queue.push(entry("third", 100));

        assert_eq!(queue.pop().unwrap().token, "first");
        assert_eq!(queue.pop().unwrap().token, "second");
        assert_eq!(queue.pop().unwrap().token, "third");
    }
}
