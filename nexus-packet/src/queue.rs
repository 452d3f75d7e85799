//! Packet queue: a chain plus a tail handle.
//!
//! Keeping the tail alongside the head makes appending a packet, or a whole
//! sub-chain whose tail is already known, O(1). Converting a bare chain into a
//! queue costs one walk to find its tail; every append after that is O(1).
//!
//! # Example
//!
//! ```
//! use nexus_packet::{Handle, Linked, PacketPool, PacketQueue, Storage};
//!
//! #[derive(Debug)]
//! struct Packet {
//!     id: u32,
//!     next: u32,
//! }
//!
//! impl Linked<u32> for Packet {
//!     fn next(&self) -> u32 { self.next }
//!     fn set_next(&mut self, next: u32) { self.next = next; }
//! }
//!
//! let mut pool: PacketPool<Packet> = PacketPool::with_capacity(16);
//! let a = pool.try_insert(Packet { id: 1, next: u32::NONE }).unwrap();
//! let b = pool.try_insert(Packet { id: 2, next: u32::NONE }).unwrap();
//!
//! let mut queue: PacketQueue = PacketQueue::new();
//! queue.append_single(&mut pool, a);
//! queue.append_single(&mut pool, b);
//!
//! let ids: Vec<u32> = queue.iter(&pool).map(|(_, p)| p.id).collect();
//! assert_eq!(ids, vec![1, 2]);
//!
//! assert_eq!(queue.pop_front(&mut pool), a);
//! assert_eq!(queue.take_chain(), b);
//! assert!(queue.is_empty());
//! ```

use crate::linked::{self, ChainIter, next_of, set_next_of};
use crate::{Handle, Linked, Storage};

/// A destination that classifiers append completed runs to.
///
/// Implemented by [`PacketQueue`] and
/// [`CountedPacketQueue`](crate::CountedPacketQueue). Every classifier is
/// generic over this trait, so the counted flavour of each algorithm is the
/// same code with the run length threaded through; for [`PacketQueue`] the
/// count is ignored and optimised away.
pub trait RunQueue<H: Handle>: Default {
    /// Appends the run `first..=last` holding `count` packets.
    ///
    /// Writes `last.next = NONE`, which is what cuts the run off the rest of
    /// its chain. Same preconditions as [`PacketQueue::append_chain`].
    fn append_run<T, S>(&mut self, storage: &mut S, first: H, last: H, count: usize)
    where
        T: Linked<H>,
        S: Storage<T, Handle = H>;

    /// Returns the first packet, or `H::NONE` if empty.
    fn head(&self) -> H;

    /// Returns `true` if the queue holds no packets.
    #[inline]
    fn is_empty(&self) -> bool {
        self.head().is_none()
    }

    /// Checks the queue's invariants. Compiled out without debug assertions.
    fn debug_assert_valid<T, S>(&self, storage: &S)
    where
        T: Linked<H>,
        S: Storage<T, Handle = H>;
}

/// A singly-linked chain of packets with O(1) append.
///
/// # Invariant
///
/// If `head` is some, `tail` is reachable from `head` and `tail.next` is
/// `NONE`. If `head` is `NONE` the queue is empty; `tail` is then `NONE` too,
/// but callers should only ever look at [`is_empty`](Self::is_empty).
///
/// A queue must always be used with the storage its packets live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketQueue<H: Handle = u32> {
    head: H,
    tail: H,
}

impl<H: Handle> Default for PacketQueue<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Handle> PacketQueue<H> {
    /// Creates an empty queue.
    #[inline]
    pub const fn new() -> Self {
        Self {
            head: H::NONE,
            tail: H::NONE,
        }
    }

    /// Builds a queue from a bare chain.
    ///
    /// O(n): walks `head` once to find its tail. `head` may be `NONE`.
    #[inline]
    pub fn from_chain<T, S>(storage: &mut S, head: H) -> Self
    where
        T: Linked<H>,
        S: Storage<T, Handle = H>,
    {
        let mut queue = Self::new();
        queue.append_chain_slow(storage, head);
        queue
    }

    /// Forgets all packets, leaving the queue empty.
    ///
    /// The packets' links are left untouched.
    #[inline]
    pub fn reset(&mut self) {
        self.head = H::NONE;
        self.tail = H::NONE;
    }

    /// Returns `true` if the queue holds no packets.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Returns the first packet, or `H::NONE` if empty.
    #[inline]
    pub const fn head(&self) -> H {
        self.head
    }

    /// Returns the last packet, or `H::NONE` if empty.
    #[inline]
    pub const fn tail(&self) -> H {
        self.tail
    }

    /// Counts the packets by walking the chain. O(n).
    #[inline]
    pub fn count<T, S>(&self, storage: &S) -> usize
    where
        T: Linked<H>,
        S: Storage<T, Handle = H>,
    {
        linked::chain_len(storage, self.head)
    }

    /// Appends the sub-chain `head..=tail`. O(1).
    ///
    /// The sub-chain must not already be part of this queue. `tail.next` is
    /// overwritten with `NONE`, so `tail` may still be linked to packets that
    /// belong to someone else.
    ///
    /// `tail` **must** be reachable from `head`. This is not checked: passing
    /// a `tail` from some other chain silently corrupts the queue.
    ///
    /// # Panics
    ///
    /// Panics if `tail` or the current tail does not resolve in storage.
    #[inline]
    pub fn append_chain<T, S>(&mut self, storage: &mut S, head: H, tail: H)
    where
        T: Linked<H>,
        S: Storage<T, Handle = H>,
    {
        debug_assert!(head.is_some() && tail.is_some(), "cannot append an empty chain");

        set_next_of(storage, tail, H::NONE);

        if self.head.is_some() {
            set_next_of(storage, self.tail, head);
        } else {
            self.head = head;
        }

        self.tail = tail;
    }

    /// Appends a single packet. O(1).
    ///
    /// # Panics
    ///
    /// Panics if `packet` does not resolve in storage.
    #[inline]
    pub fn append_single<T, S>(&mut self, storage: &mut S, packet: H)
    where
        T: Linked<H>,
        S: Storage<T, Handle = H>,
    {
        self.append_chain(storage, packet, packet);
    }

    /// Appends a bare chain whose tail is unknown. O(n) in the chain length.
    ///
    /// Does nothing if `head` is `NONE`.
    pub fn append_chain_slow<T, S>(&mut self, storage: &mut S, head: H)
    where
        T: Linked<H>,
        S: Storage<T, Handle = H>,
    {
        if head.is_none() {
            return;
        }

        let tail = linked::last_in_chain(storage, head);
        self.append_chain(storage, head, tail);
    }

    /// Moves every packet of `other` to the back of this queue. O(1).
    ///
    /// `other` is left empty.
    #[inline]
    pub fn append_queue<T, S>(&mut self, storage: &mut S, other: &mut Self)
    where
        T: Linked<H>,
        S: Storage<T, Handle = H>,
    {
        if other.is_empty() {
            return;
        }

        if self.head.is_some() {
            set_next_of(storage, self.tail, other.head);
        } else {
            self.head = other.head;
        }

        self.tail = other.tail;
        other.reset();
    }

    /// Detaches and returns the first packet, or `H::NONE` if empty.
    ///
    /// The returned packet's link is cleared.
    #[inline]
    pub fn pop_front<T, S>(&mut self, storage: &mut S) -> H
    where
        T: Linked<H>,
        S: Storage<T, Handle = H>,
    {
        let packet = self.head;
        if packet.is_none() {
            return H::NONE;
        }

        self.head = next_of(storage, packet);
        if self.head.is_none() {
            self.tail = H::NONE;
        }
        set_next_of(storage, packet, H::NONE);

        packet
    }

    /// Detaches the whole chain and returns its head (`NONE` if empty).
    ///
    /// The queue is left empty.
    #[inline]
    pub fn take_chain(&mut self) -> H {
        let head = self.head;
        self.reset();
        head
    }

    /// Returns an iterator over `(handle, &packet)` from front to back.
    #[inline]
    pub fn iter<'a, T, S>(&self, storage: &'a S) -> ChainIter<'a, T, S, H>
    where
        T: Linked<H>,
        S: Storage<T, Handle = H>,
    {
        linked::chain_iter(storage, self.head)
    }

    /// Checks the queue invariant. Compiled out without debug assertions.
    ///
    /// O(n): walks the whole chain.
    #[inline]
    pub fn debug_assert_valid<T, S>(&self, storage: &S)
    where
        T: Linked<H>,
        S: Storage<T, Handle = H>,
    {
        #[cfg(debug_assertions)]
        if self.head.is_some() {
            assert!(
                linked::last_in_chain(storage, self.head) == self.tail,
                "queue tail is not the last packet of its chain"
            );
        }

        #[cfg(not(debug_assertions))]
        let _ = storage;
    }
}

impl<H: Handle> RunQueue<H> for PacketQueue<H> {
    #[inline]
    fn append_run<T, S>(&mut self, storage: &mut S, first: H, last: H, _count: usize)
    where
        T: Linked<H>,
        S: Storage<T, Handle = H>,
    {
        self.append_chain(storage, first, last);
    }

    #[inline]
    fn head(&self) -> H {
        self.head
    }

    #[inline]
    fn debug_assert_valid<T, S>(&self, storage: &S)
    where
        T: Linked<H>,
        S: Storage<T, Handle = H>,
    {
        PacketQueue::debug_assert_valid(self, storage);
    }
}
