//! Storage for packets with stable handles.
//!
//! Packets live in a slot arena owned by the caller. Chains and queues only
//! ever hold handles into that arena, so moving a packet between queues is a
//! couple of link writes and never a copy.

use crate::Handle;

/// Slab-like packet storage with stable handles.
///
/// # Requirements
///
/// Implementations must provide:
/// - **Stable handles**: a handle remains valid until explicitly removed
/// - **O(1)** insert, remove, get operations
///
/// # Implementations
///
/// - [`PacketPool<T>`] - fixed capacity, allocated once up front
/// - `slab::Slab<T>` - growable (feature `slab`)
pub trait Storage<T> {
    /// Handle type for this storage.
    type Handle: Handle;

    /// Error type for failed insertions.
    ///
    /// - [`Full<T>`] for fixed-capacity storage
    /// - `Infallible` for growable storage
    type Error;

    /// Inserts a packet, returning its stable handle.
    fn try_insert(&mut self, value: T) -> Result<Self::Handle, Self::Error>;

    /// Removes and returns the packet at `handle`, if present.
    fn remove(&mut self, handle: Self::Handle) -> Option<T>;

    /// Returns a reference to the packet at `handle`, if present.
    fn get(&self, handle: Self::Handle) -> Option<&T>;

    /// Returns a mutable reference to the packet at `handle`, if present.
    fn get_mut(&mut self, handle: Self::Handle) -> Option<&mut T>;
}

/// Error returned when fixed-capacity storage is full.
///
/// Carries the packet that could not be inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("packet storage is full")]
pub struct Full<T>(pub T);

impl<T> Full<T> {
    /// Returns the packet that could not be inserted.
    pub fn into_inner(self) -> T {
        self.0
    }
}

// =============================================================================
// PacketPool - fixed capacity, intrusive free list
// =============================================================================

enum Slot<T, H> {
    Occupied(T),
    Vacant { next_free: H },
}

/// Fixed-capacity packet storage.
///
/// All slots are allocated by [`with_capacity`](Self::with_capacity); inserts
/// and removals afterwards never allocate. Vacant slots form a LIFO free list
/// threaded through the slots themselves, so the most recently freed handle is
/// reused first.
///
/// # Example
///
/// ```
/// use nexus_packet::{PacketPool, Storage};
///
/// let mut pool: PacketPool<u64> = PacketPool::with_capacity(1000);
/// assert_eq!(pool.capacity(), 1000);
///
/// let handle = pool.try_insert(42).unwrap();
/// assert_eq!(pool.get(handle), Some(&42));
/// ```
pub struct PacketPool<T, H: Handle = u32> {
    slots: Box<[Slot<T, H>]>,
    free_head: H,
    len: usize,
}

impl<T, H: Handle> PacketPool<T, H> {
    /// Creates a pool with exactly `capacity` slots.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0 or does not fit below the handle sentinel.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be > 0");
        assert!(
            capacity <= H::NONE.as_usize(),
            "capacity exceeds handle type maximum"
        );

        let slots = (0..capacity)
            .map(|i| Slot::Vacant {
                next_free: if i + 1 < capacity {
                    H::from_usize(i + 1)
                } else {
                    H::NONE
                },
            })
            .collect();

        Self {
            slots,
            free_head: H::from_usize(0),
            len: 0,
        }
    }

    /// Returns the capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of occupied slots.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no slots are occupied.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if all slots are occupied.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.free_head.is_none()
    }
}

impl<T, H: Handle> Storage<T> for PacketPool<T, H> {
    type Handle = H;
    type Error = Full<T>;

    #[inline]
    fn try_insert(&mut self, value: T) -> Result<H, Full<T>> {
        let handle = self.free_head;
        if handle.is_none() {
            return Err(Full(value));
        }

        let slot = &mut self.slots[handle.as_usize()];
        if let Slot::Vacant { next_free } = *slot {
            self.free_head = next_free;
        }
        *slot = Slot::Occupied(value);
        self.len += 1;

        Ok(handle)
    }

    #[inline]
    fn remove(&mut self, handle: H) -> Option<T> {
        let free_head = self.free_head;
        let slot = self.slots.get_mut(handle.as_usize())?;
        if !matches!(slot, Slot::Occupied(_)) {
            return None;
        }

        match core::mem::replace(slot, Slot::Vacant { next_free: free_head }) {
            Slot::Occupied(value) => {
                self.free_head = handle;
                self.len -= 1;
                Some(value)
            }
            Slot::Vacant { .. } => None,
        }
    }

    #[inline]
    fn get(&self, handle: H) -> Option<&T> {
        match self.slots.get(handle.as_usize())? {
            Slot::Occupied(value) => Some(value),
            Slot::Vacant { .. } => None,
        }
    }

    #[inline]
    fn get_mut(&mut self, handle: H) -> Option<&mut T> {
        match self.slots.get_mut(handle.as_usize())? {
            Slot::Occupied(value) => Some(value),
            Slot::Vacant { .. } => None,
        }
    }
}

impl<T, H: Handle> core::fmt::Debug for PacketPool<T, H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PacketPool")
            .field("capacity", &self.capacity())
            .field("len", &self.len)
            .finish()
    }
}

// =============================================================================
// slab::Slab implementation
// =============================================================================

#[cfg(feature = "slab")]
impl<T> Storage<T> for slab::Slab<T> {
    type Handle = usize;
    type Error = core::convert::Infallible;

    #[inline]
    fn try_insert(&mut self, value: T) -> Result<usize, Self::Error> {
        Ok(self.insert(value))
    }

    #[inline]
    fn remove(&mut self, handle: usize) -> Option<T> {
        self.try_remove(handle)
    }

    #[inline]
    fn get(&self, handle: usize) -> Option<&T> {
        self.get(handle)
    }

    #[inline]
    fn get_mut(&mut self, handle: usize) -> Option<&mut T> {
        self.get_mut(handle)
    }
}
