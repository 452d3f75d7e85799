//! Classification by key with a small window of open batches.

use core::array;

use crate::linked::{next_of, packet};
use crate::{Handle, Linked, RunQueue, Storage};

/// Number of batches [`classify_by_value_lookahead`] keeps open at once.
pub const DEFAULT_LOOKAHEAD_DEPTH: usize = 4;

/// Key classifier that keeps up to `DEPTH` batches open at once.
///
/// Where [`classify_by_value`](super::classify_by_value) flushes whenever the
/// key changes, this classifier parks each run in one of `DEPTH` slots and
/// resumes the slot when its key shows up again. Interleaved traffic such as
/// `A, B, A, B` is coalesced into one batch per key instead of one per
/// packet.
///
/// When a new key arrives and every slot is taken, the slot after the current
/// one is evicted round-robin: its batch is flushed and the slot reused. At
/// the end of the chain the remaining slots are flushed in slot order.
///
/// A key can therefore be flushed more than once if it was evicted and came
/// back. Within every batch packets keep their chain order, but batches are
/// not globally ordered by first appearance.
///
/// `DEPTH` must be non-zero (checked at compile time). The slots live on the
/// stack, so keep it small.
///
/// # Example
///
/// ```
/// use nexus_packet::{Handle, Linked, Lookahead, PacketPool, PacketQueue, Storage};
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
/// for vlan in [1, 2, 1, 2, 1, 2] {
///     let h = pool.try_insert(Packet { vlan, next: u32::NONE }).unwrap();
///     incoming.append_single(&mut pool, h);
/// }
///
/// let mut batches = Vec::new();
/// Lookahead::<2>::classify(
///     &mut pool,
///     incoming.take_chain(),
///     |p: &Packet| p.vlan,
///     |pool: &mut PacketPool<Packet>, vlan, batch: &mut PacketQueue| {
///         batches.push((vlan, batch.count(pool)));
///     },
/// );
///
/// assert_eq!(batches, vec![(1, 3), (2, 3)]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Lookahead<const DEPTH: usize = DEFAULT_LOOKAHEAD_DEPTH>;

impl<const DEPTH: usize> Lookahead<DEPTH> {
    /// Number of slots.
    pub const DEPTH: usize = DEPTH;

    const _ASSERT_DEPTH: () = assert!(DEPTH > 0, "lookahead depth must be non-zero");

    /// Classifies `chain`, flushing one batch per slot use.
    ///
    /// `key_of` is called once per packet. `flush` receives the storage, the
    /// batch's key and the batch; the same transient-view rules as
    /// [`classify_by_value`](super::classify_by_value) apply.
    pub fn classify<T, S, H, Q, K, KF, FF>(storage: &mut S, chain: H, mut key_of: KF, mut flush: FF)
    where
        H: Handle,
        T: Linked<H>,
        S: Storage<T, Handle = H>,
        Q: RunQueue<H>,
        K: PartialEq,
        KF: FnMut(&T) -> K,
        FF: FnMut(&mut S, K, &mut Q),
    {
        let _ = Self::_ASSERT_DEPTH;
        debug_assert!(chain.is_some(), "cannot classify an empty chain");

        // Slots are claimed front to back, so the first `None` ends the used
        // prefix.
        let mut keys: [Option<K>; DEPTH] = array::from_fn(|_| None);
        let mut queues: [Q; DEPTH] = array::from_fn(|_| Q::default());

        let mut current = 0;
        keys[current] = Some(key_of(packet(storage, chain)));

        let mut first = chain;
        let mut previous = chain;
        let mut count = 1;

        let mut handle = next_of(storage, chain);
        while handle.is_some() {
            let key = key_of(packet(storage, handle));

            if keys[current].as_ref() != Some(&key) {
                queues[current].append_run(storage, first, previous, count);
                first = handle;
                count = 0;

                let slot = keys
                    .iter()
                    .position(|slot| slot.as_ref().is_none_or(|k| *k == key));

                current = match slot {
                    Some(slot) => {
                        if keys[slot].is_none() {
                            keys[slot] = Some(key);
                        }
                        slot
                    }
                    None => {
                        let victim = (current + 1) % DEPTH;
                        if let Some(evicted) = keys[victim].replace(key) {
                            tracing::trace!(slot = victim, depth = DEPTH, "evicting lookahead slot");
                            flush(storage, evicted, &mut queues[victim]);
                        }
                        queues[victim] = Q::default();
                        victim
                    }
                };
            }

            count += 1;
            previous = handle;
            handle = next_of(storage, handle);
        }

        queues[current].append_run(storage, first, previous, count);

        for (key, queue) in keys.into_iter().zip(queues.iter_mut()) {
            let Some(key) = key else { break };
            flush(storage, key, queue);
        }
    }
}

/// [`Lookahead::classify`] with [`DEFAULT_LOOKAHEAD_DEPTH`] slots.
///
/// On `A, B, C, A` both `A` packets come out in a single batch.
#[inline]
pub fn classify_by_value_lookahead<T, S, H, Q, K, KF, FF>(
    storage: &mut S,
    chain: H,
    key_of: KF,
    flush: FF,
) where
    H: Handle,
    T: Linked<H>,
    S: Storage<T, Handle = H>,
    Q: RunQueue<H>,
    K: PartialEq,
    KF: FnMut(&T) -> K,
    FF: FnMut(&mut S, K, &mut Q),
{
    Lookahead::<DEFAULT_LOOKAHEAD_DEPTH>::classify(storage, chain, key_of, flush);
}

#[cfg(test)]
mod tests {
    use super::super::classify_by_value;
    use super::super::testing::{Packet, chain, ids, pool};
    use super::*;
    use crate::{CountedPacketQueue, PacketPool, PacketQueue};

    type Batches = Vec<(u64, Vec<u32>)>;

    fn lookahead<const DEPTH: usize>(keys: &[u64]) -> Batches {
        let mut pool = pool();
        let head = chain(&mut pool, keys);

        let mut batches = Vec::new();
        Lookahead::<DEPTH>::classify(
            &mut pool,
            head,
            |p: &Packet| p.key,
            |pool: &mut PacketPool<Packet>, key, batch: &mut PacketQueue| {
                batch.debug_assert_valid(pool);
                batches.push((key, ids(pool, batch.head())));
            },
        );
        batches
    }

    fn eager(keys: &[u64]) -> Batches {
        let mut pool = pool();
        let head = chain(&mut pool, keys);

        let mut batches = Vec::new();
        classify_by_value(
            &mut pool,
            head,
            |p: &Packet| p.key,
            |pool: &mut PacketPool<Packet>, key, batch: &mut PacketQueue| {
                batches.push((key, ids(pool, batch.head())));
            },
        );
        batches
    }

    #[test]
    fn default_depth() {
        assert_eq!(Lookahead::<DEFAULT_LOOKAHEAD_DEPTH>::DEPTH, 4);
    }

    #[test]
    fn interleaved_keys_coalesce() {
        assert_eq!(
            lookahead::<4>(&[1, 2, 1, 2, 1, 2]),
            vec![(1, vec![1, 3, 5]), (2, vec![2, 4, 6])]
        );
        assert_eq!(lookahead::<2>(&[1, 2, 1, 2, 1, 2]).len(), 2);
        assert_eq!(eager(&[1, 2, 1, 2, 1, 2]).len(), 6);
    }

    #[test]
    fn vlan_batches() {
        assert_eq!(
            lookahead::<4>(&[1, 1, 2, 2, 1]),
            vec![(1, vec![1, 2, 5]), (2, vec![3, 4])]
        );
    }

    #[test]
    fn round_robin_eviction() {
        // C evicts the slot after A's (slot 0 wraps), then A evicts B.
        assert_eq!(
            lookahead::<2>(&[1, 2, 3, 1]),
            vec![
                (1, vec![1]),
                (2, vec![2]),
                (3, vec![3]),
                (1, vec![4]),
            ]
        );
    }

    #[test]
    fn eviction_skips_the_current_slot() {
        // With 3 slots holding 1,2,3 and 3 current, key 4 evicts slot 0 (key 1).
        assert_eq!(
            lookahead::<3>(&[1, 2, 3, 4, 2]),
            vec![
                (1, vec![1]),
                (4, vec![4]),
                (2, vec![2, 5]),
                (3, vec![3]),
            ]
        );
    }

    #[test]
    fn depth_one_matches_eager() {
        let keys = [5, 5, 6, 5, 7, 7, 7, 6];
        assert_eq!(lookahead::<1>(&keys), eager(&keys));
    }

    #[test]
    fn single_packet() {
        assert_eq!(lookahead::<4>(&[8]), vec![(8, vec![1])]);
    }

    #[test]
    fn free_function_uses_default_depth() {
        let mut pool = pool();
        let head = chain(&mut pool, &[1, 2, 3, 4, 1, 2, 3, 4]);

        let mut flushes = 0;
        classify_by_value_lookahead(
            &mut pool,
            head,
            |p: &Packet| p.key,
            |_: &mut PacketPool<Packet>, _, batch: &mut PacketQueue| {
                assert!(!batch.is_empty());
                flushes += 1;
            },
        );

        assert_eq!(flushes, 4);
    }

    #[test]
    fn counted_batches() {
        let mut pool = pool();
        let head = chain(&mut pool, &[1, 2, 2, 1, 3, 1]);

        let mut lens = Vec::new();
        Lookahead::<4>::classify(
            &mut pool,
            head,
            |p: &Packet| p.key,
            |pool: &mut PacketPool<Packet>, key, batch: &mut CountedPacketQueue| {
                batch.debug_assert_valid(pool);
                lens.push((key, batch.len()));
            },
        );

        assert_eq!(lens, vec![(1, 3), (2, 2), (3, 1)]);
    }

    #[test]
    fn never_more_batches_than_eager() {
        let keys = [3, 1, 3, 3, 2, 1, 4, 5, 3, 1, 1, 2, 6, 3];
        assert!(lookahead::<2>(&keys).len() <= eager(&keys).len());
        assert!(lookahead::<4>(&keys).len() <= eager(&keys).len());
    }
}
