//! Classification by an opaque key, one batch per contiguous run.

use core::mem;

use crate::linked::{next_of, packet};
use crate::{Handle, Linked, RunQueue, Storage};

/// Splits a chain into batches of consecutive packets sharing a key.
///
/// `key_of` is called once per packet. Every time the key changes, the run
/// that just ended is handed to `flush` together with its key; the final run
/// is always flushed. Batches arrive in chain order and each keeps its
/// packets' relative order.
///
/// Only adjacent packets are merged: keys `A, B, A` produce three flushes.
/// Use [`classify_by_value_lookahead`](super::classify_by_value_lookahead)
/// when interleaved keys are common.
///
/// The queue passed to `flush` is a view of the batch, valid for the duration
/// of the call. Take the packets out of it to keep them.
///
/// # Example
///
/// ```
/// use nexus_packet::{Handle, Linked, PacketPool, PacketQueue, Storage, classify_by_value};
///
/// #[derive(Debug)]
/// struct Packet {
///     vlan: u16,
///     next: u32,
/// }
///
/// impl Linked<u32> for Packet {
///     fn next(&self) -> u32 { self.next }
///     fn set_next(&mut self, next: u32) { self.next = next; }
/// }
///
/// let mut pool: PacketPool<Packet> = PacketPool::with_capacity(16);
/// let mut incoming: PacketQueue = PacketQueue::new();
/// for vlan in [1, 1, 2, 2, 1] {
///     let h = pool.try_insert(Packet { vlan, next: u32::NONE }).unwrap();
///     incoming.append_single(&mut pool, h);
/// }
///
/// let mut batches = Vec::new();
/// classify_by_value(
///     &mut pool,
///     incoming.take_chain(),
///     |p: &Packet| p.vlan,
///     |pool: &mut PacketPool<Packet>, vlan, batch: &mut PacketQueue| {
///         batches.push((vlan, batch.count(pool)));
///     },
/// );
///
/// assert_eq!(batches, vec![(1, 2), (2, 2), (1, 1)]);
/// ```
#[inline]
pub fn classify_by_value<T, S, H, Q, K, KF, FF>(
    storage: &mut S,
    chain: H,
    mut key_of: KF,
    mut flush: FF,
) where
    H: Handle,
    T: Linked<H>,
    S: Storage<T, Handle = H>,
    Q: RunQueue<H>,
    K: PartialEq,
    KF: FnMut(&T) -> K,
    FF: FnMut(&mut S, K, &mut Q),
{
    debug_assert!(chain.is_some(), "cannot classify an empty chain");

    let mut first = chain;
    let mut previous = chain;
    let mut count = 1;
    let mut target = key_of(packet(storage, chain));

    let mut handle = next_of(storage, chain);
    while handle.is_some() {
        let key = key_of(packet(storage, handle));

        if key != target {
            let mut batch = Q::default();
            batch.append_run(storage, first, previous, count);
            flush(storage, mem::replace(&mut target, key), &mut batch);

            first = handle;
            count = 0;
        }

        count += 1;
        previous = handle;
        handle = next_of(storage, handle);
    }

    let mut batch = Q::default();
    batch.append_run(storage, first, previous, count);
    flush(storage, target, &mut batch);
}

/// Detaches the leading run of packets that share a key.
///
/// Returns the run as a queue along with its key and advances `chain` to the
/// first packet with a different key (`H::NONE` once the chain is used up).
/// Calling this in a loop until `chain` is empty yields exactly the batches
/// [`classify_by_value`] would flush, without a callback.
///
/// # Example
///
/// ```
/// use nexus_packet::{
///     CountedPacketQueue, Handle, Linked, PacketPool, PacketQueue, Storage,
///     partial_classify_by_value,
/// };
///
/// #[derive(Debug)]
/// struct Packet {
///     flow: u8,
///     next: u32,
/// }
///
/// impl Linked<u32> for Packet {
///     fn next(&self) -> u32 { self.next }
///     fn set_next(&mut self, next: u32) { self.next = next; }
/// }
///
/// let mut pool: PacketPool<Packet> = PacketPool::with_capacity(16);
/// let mut incoming: PacketQueue = PacketQueue::new();
/// for flow in [7, 7, 7, 9] {
///     let h = pool.try_insert(Packet { flow, next: u32::NONE }).unwrap();
///     incoming.append_single(&mut pool, h);
/// }
///
/// let mut chain = incoming.take_chain();
/// let mut runs = Vec::new();
/// while chain.is_some() {
///     let (run, flow): (CountedPacketQueue, u8) =
///         partial_classify_by_value(&mut pool, &mut chain, |p: &Packet| p.flow);
///     runs.push((flow, run.len()));
/// }
///
/// assert_eq!(runs, vec![(7, 3), (9, 1)]);
/// ```
#[inline]
pub fn partial_classify_by_value<T, S, H, Q, K, KF>(
    storage: &mut S,
    chain: &mut H,
    mut key_of: KF,
) -> (Q, K)
where
    H: Handle,
    T: Linked<H>,
    S: Storage<T, Handle = H>,
    Q: RunQueue<H>,
    K: PartialEq,
    KF: FnMut(&T) -> K,
{
    debug_assert!(chain.is_some(), "cannot classify an empty chain");

    let first = *chain;
    let mut previous = first;
    let mut count = 1;
    let target = key_of(packet(storage, first));

    let mut handle = next_of(storage, first);
    while handle.is_some() && key_of(packet(storage, handle)) == target {
        count += 1;
        previous = handle;
        handle = next_of(storage, handle);
    }

    *chain = handle;

    let mut run = Q::default();
    run.append_run(storage, first, previous, count);
    (run, target)
}
