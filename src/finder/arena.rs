//! Fixed-capacity list arena with lock-free bounded append.
//!
//! A [`BoundedLists`] holds one list of `u32` values per key, each with room for
//! exactly `capacity` entries, laid out flat as `keys × capacity` slots plus a
//! per-key count. Writers reserve a slot by bumping the key's count with a
//! compare-and-swap that refuses to go past `capacity`, then store into the
//! reserved slot. Rejected values are tallied in an overflow counter.
//!
//! Once a phase has finished writing, the arena is frozen into a read-only
//! [`ListTable`] with each list sorted ascending.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use crate::error::FinderError;

/// `len` atomics set to `init`, reserved fallibly. `None` means the length
/// itself overflowed.
pub(crate) fn atomic_slots(what: &'static str, len: Option<usize>, init: u32) -> Result<Vec<AtomicU32>, FinderError> {
    let bytes = len.and_then(|n| n.checked_mul(std::mem::size_of::<AtomicU32>()));
    let (Some(len), Some(bytes)) = (len, bytes) else {
        return Err(FinderError::Allocation {
            what,
            bytes: usize::MAX,
            source: None,
        });
    };
    let mut slots = Vec::new();
    slots.try_reserve_exact(len).map_err(|e| FinderError::Allocation {
        what,
        bytes,
        source: Some(e),
    })?;
    slots.extend((0..len).map(|_| AtomicU32::new(init)));
    Ok(slots)
}

pub struct BoundedLists {
    capacity: usize,
    counts: Vec<AtomicU32>,
    slots: Vec<AtomicU32>,
    dropped: AtomicU64,
}

impl BoundedLists {
    /// An arena of `num_keys` empty lists, each holding at most `capacity` values.
    ///
    /// Fails if `capacity` does not fit a `u32` count or the slots cannot be
    /// allocated.
    pub fn new(num_keys: usize, capacity: usize) -> Result<Self, FinderError> {
        if u32::try_from(capacity).is_err() {
            return Err(FinderError::InvalidConfig(format!(
                "list capacity {capacity} exceeds u32::MAX"
            )));
        }
        Ok(Self {
            capacity,
            counts: atomic_slots("list counts", Some(num_keys), 0)?,
            slots: atomic_slots("list slots", num_keys.checked_mul(capacity), 0)?,
            dropped: AtomicU64::new(0),
        })
    }

    pub fn num_keys(&self) -> usize {
        self.counts.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append `value` to the list of `key`. Returns `false` (and counts the drop)
    /// when that list is already full.
    pub fn push(&self, key: usize, value: u32) -> bool {
        let cap = self.capacity as u32;
        let reserved = self.counts[key].fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| {
            if c < cap {
                Some(c + 1)
            } else {
                None
            }
        });
        match reserved {
            Ok(slot) => {
                self.slots[key * self.capacity + slot as usize].store(value, Ordering::Relaxed);
                true
            }
            Err(_) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Number of values rejected so far because their list was full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Finish the write phase and produce a read-only table.
    pub fn freeze(self) -> ListTable {
        let capacity = self.capacity;
        let counts: Vec<u32> = self.counts.into_iter().map(AtomicU32::into_inner).collect();
        let mut slots: Vec<u32> = self.slots.into_iter().map(AtomicU32::into_inner).collect();
        for (key, &count) in counts.iter().enumerate() {
            let start = key * capacity;
            slots[start..start + count as usize].sort_unstable();
        }
        ListTable {
            capacity,
            counts,
            slots,
            dropped: self.dropped.into_inner(),
        }
    }
}

/// Read-only view of a frozen [`BoundedLists`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListTable {
    capacity: usize,
    counts: Vec<u32>,
    slots: Vec<u32>,
    dropped: u64,
}

impl ListTable {
    /// The values stored for `key`, ascending.
    #[inline]
    pub fn get(&self, key: usize) -> &[u32] {
        let start = key * self.capacity;
        &self.slots[start..start + self.counts[key] as usize]
    }

    /// Number of values stored for `key` (never more than `capacity`).
    #[inline]
    pub fn count(&self, key: usize) -> usize {
        self.counts[key] as usize
    }

    pub fn num_keys(&self) -> usize {
        self.counts.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Sum of all list lengths.
    pub fn total_entries(&self) -> usize {
        self.counts.iter().map(|&c| c as usize).sum()
    }

    /// Values rejected during the write phase.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}
