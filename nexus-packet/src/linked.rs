//! Intrusive forward links and chain utilities.
//!
//! A packet embeds a single `next` handle. Following `next` from a head handle
//! until [`Handle::NONE`] yields a *chain*. Whoever holds the head handle owns
//! the whole suffix; handing the head to a queue or classifier hands over
//! every packet behind it.
//!
//! Chains must not be cyclic. Nothing here checks for cycles: walking a cyclic
//! chain never terminates.

use core::marker::PhantomData;

use crate::{Handle, Storage};

/// Trait for packets that can be linked into a chain.
///
/// Implementors embed one `next` handle directly in their struct. The engine
/// reads and rewrites this field and nothing else.
///
/// # Example
///
/// ```
/// use nexus_packet::{Handle, Linked};
///
/// struct Frame {
///     vlan: u16,
///     len: u32,
///     next: u32,
/// }
///
/// impl Linked<u32> for Frame {
///     fn next(&self) -> u32 { self.next }
///     fn set_next(&mut self, next: u32) { self.next = next; }
/// }
/// ```
pub trait Linked<H: Handle> {
    /// Returns the next packet's handle, or `H::NONE` at the end of a chain.
    fn next(&self) -> H;

    /// Sets the next packet's handle.
    fn set_next(&mut self, next: H);
}

#[inline]
pub(crate) fn packet<T, S, H>(storage: &S, handle: H) -> &T
where
    H: Handle,
    S: Storage<T, Handle = H>,
{
    storage.get(handle).expect("invalid packet handle")
}

#[inline]
pub(crate) fn next_of<T, S, H>(storage: &S, handle: H) -> H
where
    H: Handle,
    T: Linked<H>,
    S: Storage<T, Handle = H>,
{
    packet(storage, handle).next()
}

#[inline]
pub(crate) fn set_next_of<T, S, H>(storage: &mut S, handle: H, next: H)
where
    H: Handle,
    T: Linked<H>,
    S: Storage<T, Handle = H>,
{
    storage
        .get_mut(handle)
        .expect("invalid packet handle")
        .set_next(next);
}

/// Returns the number of packets in a chain.
///
/// `head` may be `H::NONE`, in which case the count is 0.
pub fn chain_len<T, S, H>(storage: &S, head: H) -> usize
where
    H: Handle,
    T: Linked<H>,
    S: Storage<T, Handle = H>,
{
    let mut count = 0;
    let mut handle = head;
    while handle.is_some() {
        count += 1;
        handle = next_of(storage, handle);
    }
    count
}

/// Returns the last packet of a non-empty chain.
///
/// # Panics
///
/// Panics if `head` is `H::NONE` or does not resolve in storage.
#[inline]
pub fn last_in_chain<T, S, H>(storage: &S, head: H) -> H
where
    H: Handle,
    T: Linked<H>,
    S: Storage<T, Handle = H>,
{
    last_in_chain_with_count(storage, head).0
}

/// Returns the last packet of a non-empty chain along with the chain length.
///
/// # Panics
///
/// Panics if `head` is `H::NONE` or does not resolve in storage.
pub fn last_in_chain_with_count<T, S, H>(storage: &S, head: H) -> (H, usize)
where
    H: Handle,
    T: Linked<H>,
    S: Storage<T, Handle = H>,
{
    let mut last = head;
    let mut count = 1;
    loop {
        let next = next_of(storage, last);
        if next.is_none() {
            return (last, count);
        }
        last = next;
        count += 1;
    }
}

/// Asserts that two chains share no packets.
///
/// Two acyclic chains overlap exactly when they end in the same packet, so
/// this compares their last packets. Compiled out without debug assertions.
#[inline]
pub fn debug_assert_chains_disjoint<T, S, H>(storage: &S, a: H, b: H)
where
    H: Handle,
    T: Linked<H>,
    S: Storage<T, Handle = H>,
{
    #[cfg(debug_assertions)]
    if a.is_some() && b.is_some() {
        assert!(
            last_in_chain(storage, a) != last_in_chain(storage, b),
            "packet chains overlap"
        );
    }

    #[cfg(not(debug_assertions))]
    let _ = (storage, a, b);
}

/// Returns an iterator over the packets of a chain, starting at `head`.
#[inline]
pub fn chain_iter<T, S, H>(storage: &S, head: H) -> ChainIter<'_, T, S, H>
where
    H: Handle,
    T: Linked<H>,
    S: Storage<T, Handle = H>,
{
    ChainIter {
        storage,
        current: head,
        _marker: PhantomData,
    }
}

/// Iterator over `(handle, &packet)` pairs of a chain.
///
/// Created by [`chain_iter`] or the queues' `iter` methods.
pub struct ChainIter<'a, T, S, H: Handle> {
    storage: &'a S,
    current: H,
    _marker: PhantomData<&'a T>,
}

impl<'a, T, S, H> Iterator for ChainIter<'a, T, S, H>
where
    H: Handle,
    T: Linked<H> + 'a,
    S: Storage<T, Handle = H>,
{
    type Item = (H, &'a T);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_none() {
            return None;
        }

        let handle = self.current;
        let node = packet(self.storage, handle);
        self.current = node.next();
        Some((handle, node))
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

    /// Inserts `values` and links them front to back, returning the handles.
    fn build(storage: &mut PacketPool<Node>, values: &[u64]) -> Vec<u32> {
        let handles: Vec<u32> = values
            .iter()
            .map(|&value| {
                storage
                    .try_insert(Node {
                        value,
                        next: u32::NONE,
                    })
                    .unwrap()
            })
            .collect();
        for pair in handles.windows(2) {
            storage.get_mut(pair[0]).unwrap().next = pair[1];
        }
        handles
    }

    #[test]
    fn empty_chain_has_no_packets() {
        let storage: PacketPool<Node> = PacketPool::with_capacity(4);
        assert_eq!(chain_len(&storage, u32::NONE), 0);
        assert_eq!(chain_iter(&storage, u32::NONE).count(), 0);
    }

    #[test]
    fn len_and_last() {
        let mut storage: PacketPool<Node> = PacketPool::with_capacity(16);
        let handles = build(&mut storage, &[10, 20, 30, 40]);

        assert_eq!(chain_len(&storage, handles[0]), 4);
        assert_eq!(last_in_chain(&storage, handles[0]), handles[3]);
        assert_eq!(last_in_chain_with_count(&storage, handles[0]), (handles[3], 4));

        // A suffix is a chain of its own.
        assert_eq!(last_in_chain_with_count(&storage, handles[2]), (handles[3], 2));
    }

    #[test]
    fn single_packet_is_its_own_last() {
        let mut storage: PacketPool<Node> = PacketPool::with_capacity(4);
        let handles = build(&mut storage, &[1]);

        assert_eq!(last_in_chain_with_count(&storage, handles[0]), (handles[0], 1));
    }

    #[test]
    fn iterate_forward() {
        let mut storage: PacketPool<Node> = PacketPool::with_capacity(16);
        let handles = build(&mut storage, &[1, 2, 3]);

        let values: Vec<u64> = chain_iter(&storage, handles[0])
            .map(|(_, node)| node.value)
            .collect();
        assert_eq!(values, vec![1, 2, 3]);

        let seen: Vec<u32> = chain_iter(&storage, handles[0]).map(|(h, _)| h).collect();
        assert_eq!(seen, handles);
    }

    #[test]
    fn disjoint_chains_pass() {
        let mut storage: PacketPool<Node> = PacketPool::with_capacity(16);
        let a = build(&mut storage, &[1, 2]);
        let b = build(&mut storage, &[3, 4]);

        debug_assert_chains_disjoint(&storage, a[0], b[0]);
        debug_assert_chains_disjoint(&storage, a[0], u32::NONE);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "packet chains overlap")]
    fn overlapping_chains_assert() {
        let mut storage: PacketPool<Node> = PacketPool::with_capacity(16);
        let a = build(&mut storage, &[1, 2, 3, 4]);

        debug_assert_chains_disjoint(&storage, a[0], a[2]);
    }

    #[test]
    #[should_panic(expected = "invalid packet handle")]
    fn dangling_handle_panics() {
        let storage: PacketPool<Node> = PacketPool::with_capacity(4);
        let _ = chain_len(&storage, 2);
    }
}
