//! Per-key mutual exclusion.

use parking_lot::lock_api::ArcMutexGuard;
use parking_lot::{Mutex, RawMutex};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

/// Idle entries are swept once the map grows past this size.
const PRUNE_THRESHOLD: usize = 256;

/// Held while an operation owns a key.
pub struct KeyGuard {
    _guard: ArcMutexGuard<RawMutex, ()>,
}

/// A set of mutexes addressed by key.
///
/// Operations on the same key are serialized; operations on different keys
/// run concurrently.
pub struct KeyLocks<K> {
    slots: Mutex<HashMap<K, Arc<Mutex<()>>>>,
}

impl<K: Eq + Hash + Copy> KeyLocks<K> {
    /// Creates an empty lock set.
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Blocks until `key` is free, then holds it until the guard drops.
    pub fn lock(&self, key: K) -> KeyGuard {
        let slot = {
            let mut slots = self.slots.lock();
            if slots.len() >= PRUNE_THRESHOLD {
                // Only the map holds an idle slot; waiters and holders own a clone.
                slots.retain(|_, slot| Arc::strong_count(slot) > 1);
            }
            Arc::clone(slots.entry(key).or_default())
        };
        KeyGuard {
            _guard: slot.lock_arc(),
        }
    }

    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    /// Returns true if no keys are tracked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Eq + Hash + Copy> Default for KeyLocks<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn same_key_is_serialized() {
        let locks = Arc::new(KeyLocks::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let locks = Arc::clone(&locks);
                let inside = Arc::clone(&inside);
                let max_inside = Arc::clone(&max_inside);
                thread::spawn(move || {
                    let _guard = locks.lock(1u32);
                    let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                    max_inside.fetch_max(now, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(2));
                    inside.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn different_keys_do_not_block() {
        let locks = KeyLocks::new();
        let _a = locks.lock(1u32);
        let _b = locks.lock(2u32);
        assert_eq!(locks.len(), 2);
    }

    #[test]
    fn idle_slots_are_pruned() {
        let locks = KeyLocks::new();
        for key in 0..PRUNE_THRESHOLD as u32 {
            drop(locks.lock(key));
        }
        let _held = locks.lock(10_000u32);
        assert_eq!(locks.len(), 1);
    }
}
