//! Zero-allocation queueing and classification of packet chains.
//!
//! Network receive paths deliver packets as long singly-linked chains. Before
//! anything useful can happen the chain has to be split: valid from invalid,
//! one flow from another, one VLAN from the next. This crate does that split
//! in a single forward walk, cutting the chain only where the classification
//! changes, and never allocates.
//!
//! # Design Philosophy
//!
//! Packets are not owned by the queues that order them:
//!
//! ```text
//! Storage (PacketPool, Slab) - owns packets, provides stable handles
//! PacketQueue / classifiers  - relink handles, don't own packets
//! ```
//!
//! Each packet embeds one `next` handle (see [`Linked`]). A queue is just a
//! head and a tail handle, so it is `Copy`, lives on the stack and appends in
//! O(1). Classifiers keep their per-call state in fixed-size arrays.
//!
//! # Quick Start
//!
//! ```
//! use nexus_packet::{
//!     CountedPacketQueue, Handle, Linked, PacketPool, PacketQueue, Storage,
//!     classify_by_value_lookahead,
//! };
//!
//! #[derive(Debug)]
//! struct Packet {
//!     vlan: u16,
//!     next: u32,
//! }
//!
//! impl Linked<u32> for Packet {
//!     fn next(&self) -> u32 { self.next }
//!     fn set_next(&mut self, next: u32) { self.next = next; }
//! }
//!
//! // Storage owns the packets.
//! let mut pool: PacketPool<Packet> = PacketPool::with_capacity(1024);
//!
//! // A receive batch arrives as one chain.
//! let mut rx: PacketQueue = PacketQueue::new();
//! for vlan in [10, 10, 20, 20, 10] {
//!     let h = pool.try_insert(Packet { vlan, next: u32::NONE }).unwrap();
//!     rx.append_single(&mut pool, h);
//! }
//!
//! // One batch per VLAN, even though VLAN 10 is split in the chain.
//! let mut batches = Vec::new();
//! classify_by_value_lookahead(
//!     &mut pool,
//!     rx.take_chain(),
//!     |p: &Packet| p.vlan,
//!     |_: &mut PacketPool<Packet>, vlan, batch: &mut CountedPacketQueue| {
//!         batches.push((vlan, batch.len()));
//!     },
//! );
//!
//! assert_eq!(batches, vec![(10, 3), (20, 2)]);
//! ```
//!
//! # Critical Invariant: Same Storage Instance
//!
//! Every operation on a queue or chain must use the storage its packets live
//! in. Handles are plain indices; resolving one in the wrong storage either
//! panics (`"invalid packet handle"`) or silently relinks the wrong packets.
//!
//! # Storage Options
//!
//! | Storage | Capacity | Allocation | Use Case |
//! |---------|----------|------------|----------|
//! | [`PacketPool`] | Fixed (runtime) | Single heap alloc | Default choice |
//! | `slab::Slab` | Growable | May reallocate | When size unknown |
//!
//! # Feature Flags
//!
//! - `slab` - Enable [`Storage`] impl for `slab::Slab`

#![warn(missing_docs)]

pub mod classify;
pub mod counted;
pub mod handle;
pub mod linked;
pub mod queue;
pub mod storage;

pub use classify::{
    DEFAULT_LOOKAHEAD_DEPTH, Lookahead, classify_by_index, classify_by_value,
    classify_by_value_lookahead, classify2, partial_classify_by_value, split_by_match,
};
pub use counted::CountedPacketQueue;
pub use handle::Handle;
pub use linked::{
    ChainIter, Linked, chain_iter, chain_len, debug_assert_chains_disjoint, last_in_chain,
    last_in_chain_with_count,
};
pub use queue::{PacketQueue, RunQueue};
pub use storage::{Full, PacketPool, Storage};
