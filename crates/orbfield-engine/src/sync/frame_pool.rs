use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Bounded pool of in-flight frame slots.
///
/// A slot represents one frame whose GPU work has been submitted but not yet
/// confirmed complete. `acquire` blocks while every slot is out, which bounds
/// how far the CPU can run ahead of the GPU.
///
/// Slots are fungible: any release frees capacity for any waiter, so the pool
/// tolerates completion callbacks firing out of submission order. Each slot
/// still carries an index in `0..capacity`, unique among outstanding slots, so
/// per-frame transient resources can be keyed by it.
///
/// Cloning the pool shares the same underlying slots.
#[derive(Clone)]
pub struct FramePool {
    inner: Arc<PoolInner>,
}

struct PoolInner {
    capacity: usize,
    free: Mutex<Vec<usize>>,
    released: Condvar,
}

impl FramePool {
    /// Creates a pool with `capacity` slots.
    ///
    /// A zero capacity would deadlock the first acquire; it is clamped to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = if capacity == 0 {
            log::warn!("frame pool capacity 0 requested; using 1");
            1
        } else {
            capacity
        };

        // Reversed so that slot 0 is handed out first.
        let free = (0..capacity).rev().collect();

        Self {
            inner: Arc::new(PoolInner {
                capacity,
                free: Mutex::new(free),
                released: Condvar::new(),
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Number of slots currently held (submitted but not completed).
    pub fn in_flight(&self) -> usize {
        self.inner.capacity - self.inner.lock_free().len()
    }

    /// Takes a slot if one is free, without blocking.
    pub fn try_acquire(&self) -> Option<FrameSlot> {
        let index = self.inner.lock_free().pop()?;
        Some(self.slot(index))
    }

    /// Takes a slot, blocking the calling thread until one is released.
    pub fn acquire(&self) -> FrameSlot {
        let mut free = self.inner.lock_free();
        loop {
            if let Some(index) = free.pop() {
                drop(free);
                return self.slot(index);
            }
            free = self
                .inner
                .released
                .wait(free)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }

    /// Takes a slot, waiting at most `timeout` for one to be released.
    pub fn acquire_timeout(&self, timeout: Duration) -> Option<FrameSlot> {
        let deadline = Instant::now() + timeout;
        let mut free = self.inner.lock_free();
        loop {
            if let Some(index) = free.pop() {
                drop(free);
                return Some(self.slot(index));
            }

            let now = Instant::now();
            if now >= deadline {
                return None;
            }

            let (guard, _) = self
                .inner
                .released
                .wait_timeout(free, deadline - now)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            free = guard;
        }
    }

    fn slot(&self, index: usize) -> FrameSlot {
        FrameSlot {
            index,
            pool: Arc::clone(&self.inner),
        }
    }
}

impl fmt::Debug for FramePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FramePool")
            .field("capacity", &self.capacity())
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

impl PoolInner {
    // A panic while holding the lock cannot leave the free list half-updated
    // (every critical section is a single push or pop), so poison is ignored.
    fn lock_free(&self) -> MutexGuard<'_, Vec<usize>> {
        self.free.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn release(&self, index: usize) {
        let mut free = self.lock_free();
        debug_assert!(!free.contains(&index), "slot {index} released twice");
        free.push(index);
        drop(free);
        self.released.notify_one();
    }
}

/// One acquired in-flight slot.
///
/// Dropping the slot returns it to its pool. Move it into the GPU completion
/// callback to hold it until the frame's work is done; drop it early to
/// abandon a frame that was never submitted.
pub struct FrameSlot {
    index: usize,
    pool: Arc<PoolInner>,
}

impl FrameSlot {
    /// Index in `0..capacity`, unique among outstanding slots.
    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Debug for FrameSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameSlot").field("index", &self.index).finish()
    }
}

impl Drop for FrameSlot {
    fn drop(&mut self) {
        self.pool.release(self.index);
    }
}
