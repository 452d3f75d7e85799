//! Classification into a small, fixed set of queues.

use crate::linked::{next_of, packet};
use crate::{Handle, Linked, RunQueue, Storage};

/// Splits a chain into two queues.
///
/// `selector` is called once per packet and must return `0` (packet goes to
/// `q0`) or `1` (packet goes to `q1`). Packets keep their relative order
/// within each queue. The queues are appended to, not cleared, so repeated
/// calls accumulate into the same outputs.
///
/// Any other selector result trips a debug assertion. Without debug
/// assertions it is undefined which queue such a packet lands in.
///
/// # Example
///
/// ```
/// use nexus_packet::{Handle, Linked, PacketPool, PacketQueue, Storage, classify2};
///
/// #[derive(Debug)]
/// struct Packet {
///     valid: bool,
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
/// for valid in [true, false, true] {
///     let h = pool.try_insert(Packet { valid, next: u32::NONE }).unwrap();
///     incoming.append_single(&mut pool, h);
/// }
///
/// let mut drop: PacketQueue = PacketQueue::new();
/// let mut good: PacketQueue = PacketQueue::new();
/// classify2(
///     &mut pool,
///     incoming.take_chain(),
///     |p: &Packet| usize::from(p.valid),
///     &mut drop,
///     &mut good,
/// );
///
/// assert_eq!(drop.count(&pool), 1);
/// assert_eq!(good.count(&pool), 2);
/// ```
#[inline]
pub fn classify2<T, S, H, Q, F>(storage: &mut S, chain: H, mut selector: F, q0: &mut Q, q1: &mut Q)
where
    H: Handle,
    T: Linked<H>,
    S: Storage<T, Handle = H>,
    Q: RunQueue<H>,
    F: FnMut(&T) -> usize,
{
    debug_assert!(chain.is_some(), "cannot classify an empty chain");
    q0.debug_assert_valid(storage);
    q1.debug_assert_valid(storage);

    let mut first = chain;
    let mut previous = chain;
    let mut count = 1;
    let mut current = selector(packet(storage, chain));
    debug_assert!(current <= 1, "two-way selector returned {current}");

    let mut handle = next_of(storage, chain);
    while handle.is_some() {
        let index = selector(packet(storage, handle));
        debug_assert!(index <= 1, "two-way selector returned {index}");

        if index != current {
            let queue = if current == 0 { &mut *q0 } else { &mut *q1 };
            queue.append_run(storage, first, previous, count);

            current = index;
            first = handle;
            count = 0;
        }

        count += 1;
        previous = handle;
        handle = next_of(storage, handle);
    }

    let queue = if current == 0 { q0 } else { q1 };
    queue.append_run(storage, first, previous, count);
}

/// Splits a chain into `queues.len()` queues by index.
///
/// `selector` is called once per packet and returns the index of the queue
/// that receives it. Packets keep their relative order within each queue, and
/// the queues are appended to rather than cleared.
///
/// An index outside `0..queues.len()` trips a debug assertion; without debug
/// assertions it panics on the slice bounds check.
///
/// # Example
///
/// ```
/// use nexus_packet::{Handle, Linked, PacketPool, PacketQueue, Storage, classify_by_index};
///
/// #[derive(Debug, Clone, Copy)]
/// enum Proto { V4, V6, Other }
///
/// #[derive(Debug)]
/// struct Packet {
///     proto: Proto,
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
/// for proto in [Proto::V4, Proto::Other, Proto::V6, Proto::V4] {
///     let h = pool.try_insert(Packet { proto, next: u32::NONE }).unwrap();
///     incoming.append_single(&mut pool, h);
/// }
///
/// let mut queues = [PacketQueue::new(); 3];
/// classify_by_index(
///     &mut pool,
///     incoming.take_chain(),
///     |p: &Packet| p.proto as usize,
///     &mut queues,
/// );
///
/// assert_eq!(queues[0].count(&pool), 2);
/// assert_eq!(queues[1].count(&pool), 1);
/// assert_eq!(queues[2].count(&pool), 1);
/// ```
#[inline]
pub fn classify_by_index<T, S, H, Q, F>(storage: &mut S, chain: H, mut selector: F, queues: &mut [Q])
where
    H: Handle,
    T: Linked<H>,
    S: Storage<T, Handle = H>,
    Q: RunQueue<H>,
    F: FnMut(&T) -> usize,
{
    debug_assert!(chain.is_some(), "cannot classify an empty chain");
    #[cfg(debug_assertions)]
    for queue in queues.iter() {
        queue.debug_assert_valid(storage);
    }

    let mut first = chain;
    let mut previous = chain;
    let mut count = 1;
    let mut current = selector(packet(storage, chain));
    debug_assert!(
        current < queues.len(),
        "selector returned {current} for {} queues",
        queues.len()
    );

    let mut handle = next_of(storage, chain);
    while handle.is_some() {
        let index = selector(packet(storage, handle));
        debug_assert!(
            index < queues.len(),
            "selector returned {index} for {} queues",
            queues.len()
        );

        if index != current {
            queues[current].append_run(storage, first, previous, count);

            current = index;
            first = handle;
            count = 0;
        }

        count += 1;
        previous = handle;
        handle = next_of(storage, handle);
    }

    queues[current].append_run(storage, first, previous, count);
}

/// Separates the packets whose field equals `target` from the rest.
///
/// `field_of` reads the field to compare (a cancellation id, the handle of
/// the component that originated the packet, the pool it was allocated
/// from, ...). Matching packets go to `matched`, all others to `keep`, both
/// in their original relative order.
///
/// # Example
///
/// ```
/// use nexus_packet::{Handle, Linked, PacketPool, PacketQueue, Storage, split_by_match};
///
/// #[derive(Debug)]
/// struct Packet {
///     cancel_id: u32,
///     next: u32,
/// }
///
/// impl Linked<u32> for Packet {
///     fn next(&self) -> u32 { self.next }
///     fn set_next(&mut self, next: u32) { self.next = next; }
/// }
///
/// let mut pool: PacketPool<Packet> = PacketPool::with_capacity(16);
/// let mut pending: PacketQueue = PacketQueue::new();
/// for cancel_id in [4, 3, 2, 3] {
///     let h = pool.try_insert(Packet { cancel_id, next: u32::NONE }).unwrap();
///     pending.append_single(&mut pool, h);
/// }
///
/// let mut keep: PacketQueue = PacketQueue::new();
/// let mut cancel: PacketQueue = PacketQueue::new();
/// split_by_match(
///     &mut pool,
///     pending.take_chain(),
///     |p: &Packet| p.cancel_id,
///     3,
///     &mut keep,
///     &mut cancel,
/// );
///
/// let kept: Vec<u32> = keep.iter(&pool).map(|(_, p)| p.cancel_id).collect();
/// assert_eq!(kept, vec![4, 2]);
/// assert_eq!(cancel.count(&pool), 2);
/// ```
#[inline]
pub fn split_by_match<T, S, H, Q, V, F>(
    storage: &mut S,
    chain: H,
    mut field_of: F,
    target: V,
    keep: &mut Q,
    matched: &mut Q,
) where
    H: Handle,
    T: Linked<H>,
    S: Storage<T, Handle = H>,
    Q: RunQueue<H>,
    V: PartialEq,
    F: FnMut(&T) -> V,
{
    classify2(
        storage,
        chain,
        |p: &T| usize::from(field_of(p) == target),
        keep,
        matched,
    );
}
