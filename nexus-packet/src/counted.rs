//! Packet queue with a maintained element count.
//!
//! [`CountedPacketQueue`] wraps a [`PacketQueue`] and keeps `len` in lockstep
//! with the chain. Every append takes (or derives) the number of packets it
//! adds and every pop decrements, so [`len`](CountedPacketQueue::len) is O(1)
//! and always matches a walk of the chain.

use crate::linked::{self, ChainIter};
use crate::queue::RunQueue;
use crate::{Handle, Linked, PacketQueue, Storage};

/// A [`PacketQueue`] that also tracks how many packets it holds.
///
/// # Example
///
/// ```
/// use nexus_packet::{CountedPacketQueue, Handle, Linked, PacketPool, Storage};
///
/// #[derive(Debug)]
/// struct Packet {
///     next: u32,
/// }
///
/// impl Linked<u32> for Packet {
///     fn next(&self) -> u32 { self.next }
///     fn set_next(&mut self, next: u32) { self.next = next; }
/// }
///
/// let mut pool: PacketPool<Packet> = PacketPool::with_capacity(16);
/// let mut queue: CountedPacketQueue = CountedPacketQueue::new();
///
/// for _ in 0..3 {
///     let h = pool.try_insert(Packet { next: u32::NONE }).unwrap();
///     queue.append_single(&mut pool, h);
/// }
/// assert_eq!(queue.len(), 3);
///
/// queue.pop_front(&mut pool);
/// assert_eq!(queue.len(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountedPacketQueue<H: Handle = u32> {
    queue: PacketQueue<H>,
    len: usize,
}

impl<H: Handle> Default for CountedPacketQueue<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Handle> CountedPacketQueue<H> {
    /// Creates an empty queue.
    #[inline]
    pub const fn new() -> Self {
        Self {
            queue: PacketQueue::new(),
            len: 0,
        }
    }

    /// Builds a counted queue from a bare chain. O(n).
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

    /// Counts an existing queue. O(n).
    #[inline]
    pub fn from_queue<T, S>(storage: &S, queue: PacketQueue<H>) -> Self
    where
        T: Linked<H>,
        S: Storage<T, Handle = H>,
    {
        Self {
            len: queue.count(storage),
            queue,
        }
    }

    /// Forgets all packets, leaving the queue empty.
    #[inline]
    pub fn reset(&mut self) {
        self.queue.reset();
        self.len = 0;
    }

    /// Returns the number of packets. O(1).
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the queue holds no packets.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Returns the first packet, or `H::NONE` if empty.
    #[inline]
    pub const fn head(&self) -> H {
        self.queue.head()
    }

    /// Returns the last packet, or `H::NONE` if empty.
    #[inline]
    pub const fn tail(&self) -> H {
        self.queue.tail()
    }

    /// Borrows the underlying uncounted queue.
    #[inline]
    pub const fn as_queue(&self) -> &PacketQueue<H> {
        &self.queue
    }

    /// Appends the sub-chain `head..=tail` holding `count` packets. O(1).
    ///
    /// Same contract as [`PacketQueue::append_chain`]. `count` must be the
    /// exact length of the sub-chain; it is trusted, not verified.
    #[inline]
    pub fn append_chain<T, S>(&mut self, storage: &mut S, head: H, tail: H, count: usize)
    where
        T: Linked<H>,
        S: Storage<T, Handle = H>,
    {
        debug_assert!(count > 0, "a non-empty chain has at least one packet");

        self.queue.append_chain(storage, head, tail);
        self.len += count;
    }

    /// Appends a single packet. O(1).
    #[inline]
    pub fn append_single<T, S>(&mut self, storage: &mut S, packet: H)
    where
        T: Linked<H>,
        S: Storage<T, Handle = H>,
    {
        self.append_chain(storage, packet, packet, 1);
    }

    /// Appends a bare chain, counting it on the way. O(n).
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

        let (tail, count) = linked::last_in_chain_with_count(storage, head);
        self.append_chain(storage, head, tail, count);
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
        self.queue.append_queue(storage, &mut other.queue);
        self.len += other.len;
        other.len = 0;
    }

    /// Moves every packet of an uncounted queue to the back of this one.
    ///
    /// O(n) in the length of `other`, which has to be counted. `other` is
    /// left empty.
    pub fn append_uncounted_queue<T, S>(&mut self, storage: &mut S, other: &mut PacketQueue<H>)
    where
        T: Linked<H>,
        S: Storage<T, Handle = H>,
    {
        let count = other.count(storage);
        self.queue.append_queue(storage, other);
        self.len += count;
    }

    /// Detaches and returns the first packet, or `H::NONE` if empty.
    #[inline]
    pub fn pop_front<T, S>(&mut self, storage: &mut S) -> H
    where
        T: Linked<H>,
        S: Storage<T, Handle = H>,
    {
        let packet = self.queue.pop_front(storage);
        if packet.is_some() {
            self.len -= 1;
        }
        packet
    }

    /// Detaches the whole chain and returns its head (`NONE` if empty).
    #[inline]
    pub fn take_chain(&mut self) -> H {
        self.len = 0;
        self.queue.take_chain()
    }

    /// Returns an iterator over `(handle, &packet)` from front to back.
    #[inline]
    pub fn iter<'a, T, S>(&self, storage: &'a S) -> ChainIter<'a, T, S, H>
    where
        T: Linked<H>,
        S: Storage<T, Handle = H>,
    {
        self.queue.iter(storage)
    }

    /// Checks the tail and count invariants. Compiled out without debug
    /// assertions.
    #[inline]
    pub fn debug_assert_valid<T, S>(&self, storage: &S)
    where
        T: Linked<H>,
        S: Storage<T, Handle = H>,
    {
        self.queue.debug_assert_valid(storage);

        #[cfg(debug_assertions)]
        assert!(
            self.queue.count(storage) == self.len,
            "queue length does not match its chain"
        );
    }
}

impl<H: Handle> From<CountedPacketQueue<H>> for PacketQueue<H> {
    #[inline]
    fn from(counted: CountedPacketQueue<H>) -> Self {
        counted.queue
    }
}

impl<H: Handle> RunQueue<H> for CountedPacketQueue<H> {
    #[inline]
    fn append_run<T, S>(&mut self, storage: &mut S, first: H, last: H, count: usize)
    where
        T: Linked<H>,
        S: Storage<T, Handle = H>,
    {
        self.append_chain(storage, first, last, count);
    }

    #[inline]
    fn head(&self) -> H {
        self.queue.head()
    }

    #[inline]
    fn debug_assert_valid<T, S>(&self, storage: &S)
    where
        T: Linked<H>,
        S: Storage<T, Handle = H>,
    {
        CountedPacketQueue::debug_assert_valid(self, storage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PacketPool;

    #[derive(Debug)]
    struct Node {
        value: u64,
        next: u32,
    }

    impl Linked<u32> for Node {
        fn next(&self) -> u32 {
            self.next
        }
        fn set_next(&mut self, next: u32) {
            self.next = next;
        }
    }

    fn chain(storage: &mut PacketPool<Node>, values: &[u64]) -> u32 {
        let mut queue: PacketQueue = PacketQueue::new();
        for &value in values {
            let h = storage
                .try_insert(Node {
                    value,
                    next: u32::NONE,
                })
                .unwrap();
            queue.append_single(storage, h);
        }
        queue.take_chain()
    }

    #[test]
    fn new_queue_is_empty() {
        let queue: CountedPacketQueue = CountedPacketQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
        assert!(queue.head().is_none());
    }

    #[test]
    fn appends_track_len() {
        let mut storage: PacketPool<Node> = PacketPool::with_capacity(32);
        let mut queue: CountedPacketQueue = CountedPacketQueue::new();

        let head = chain(&mut storage, &[1, 2, 3]);
        queue.append_chain_slow(&mut storage, head);
        assert_eq!(queue.len(), 3);

        let single = chain(&mut storage, &[4]);
        queue.append_single(&mut storage, single);
        assert_eq!(queue.len(), 4);

        let head = chain(&mut storage, &[5, 6]);
        let tail = linked::last_in_chain(&storage, head);
        queue.append_chain(&mut storage, head, tail, 2);
        assert_eq!(queue.len(), 6);

        queue.append_chain_slow(&mut storage, u32::NONE);
        assert_eq!(queue.len(), 6);

        let values: Vec<u64> = queue.iter(&storage).map(|(_, n)| n.value).collect();
        assert_eq!(values, vec![1, 2, 3, 4, 5, 6]);
        queue.debug_assert_valid(&storage);
    }

    #[test]
    fn pops_track_len() {
        let mut storage: PacketPool<Node> = PacketPool::with_capacity(16);
        let head = chain(&mut storage, &[1, 2, 3]);
        let mut queue = CountedPacketQueue::from_chain(&mut storage, head);

        assert_eq!(queue.len(), 3);
        assert!(queue.pop_front(&mut storage).is_some());
        assert_eq!(queue.len(), 2);
        queue.debug_assert_valid(&storage);

        assert!(queue.pop_front(&mut storage).is_some());
        assert!(queue.pop_front(&mut storage).is_some());
        assert_eq!(queue.len(), 0);
        assert!(queue.is_empty());

        // Popping an empty queue leaves the count alone.
        assert!(queue.pop_front(&mut storage).is_none());
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn append_queue_moves_count() {
        let mut storage: PacketPool<Node> = PacketPool::with_capacity(16);
        let a = chain(&mut storage, &[1, 2]);
        let b = chain(&mut storage, &[3, 4, 5]);
        let mut front = CountedPacketQueue::from_chain(&mut storage, a);
        let mut back = CountedPacketQueue::from_chain(&mut storage, b);

        front.append_queue(&mut storage, &mut back);

        assert_eq!(front.len(), 5);
        assert_eq!(back.len(), 0);
        assert!(back.is_empty());
        front.debug_assert_valid(&storage);
    }

    #[test]
    fn append_uncounted_queue_counts_it() {
        let mut storage: PacketPool<Node> = PacketPool::with_capacity(16);
        let a = chain(&mut storage, &[1]);
        let b = chain(&mut storage, &[2, 3, 4]);
        let mut counted = CountedPacketQueue::from_chain(&mut storage, a);
        let mut plain = PacketQueue::from_chain(&mut storage, b);

        counted.append_uncounted_queue(&mut storage, &mut plain);

        assert_eq!(counted.len(), 4);
        assert!(plain.is_empty());
        counted.debug_assert_valid(&storage);
    }

    #[test]
    fn conversions() {
        let mut storage: PacketPool<Node> = PacketPool::with_capacity(16);
        let head = chain(&mut storage, &[1, 2, 3]);
        let plain = PacketQueue::from_chain(&mut storage, head);

        let counted = CountedPacketQueue::from_queue(&storage, plain);
        assert_eq!(counted.len(), 3);
        assert_eq!(counted.as_queue(), &plain);

        let back: PacketQueue = counted.into();
        assert_eq!(back, plain);
    }

    #[test]
    fn take_chain_resets_len() {
        let mut storage: PacketPool<Node> = PacketPool::with_capacity(16);
        let head = chain(&mut storage, &[1, 2]);
        let mut queue = CountedPacketQueue::from_chain(&mut storage, head);

        assert_eq!(queue.take_chain(), head);
        assert_eq!(queue.len(), 0);
        assert!(queue.is_empty());
    }

    #[test]
    fn run_queue_adds_count() {
        let mut storage: PacketPool<Node> = PacketPool::with_capacity(16);
        let head = chain(&mut storage, &[1, 2, 3]);
        let tail = linked::last_in_chain(&storage, head);
        let mut queue: CountedPacketQueue = CountedPacketQueue::new();

        RunQueue::append_run(&mut queue, &mut storage, head, tail, 3);

        assert_eq!(queue.len(), 3);
        queue.debug_assert_valid(&storage);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "queue length does not match its chain")]
    fn wrong_count_is_detected() {
        let mut storage: PacketPool<Node> = PacketPool::with_capacity(16);
        let head = chain(&mut storage, &[1, 2, 3]);
        let tail = linked::last_in_chain(&storage, head);
        let mut queue: CountedPacketQueue = CountedPacketQueue::new();

        queue.append_chain(&mut storage, head, tail, 2);
        queue.debug_assert_valid(&storage);
    }
}
