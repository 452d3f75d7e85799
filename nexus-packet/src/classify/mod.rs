//! Single-pass classification of packet chains.
//!
//! A driver typically receives one long chain and has to split it: drop the
//! malformed packets, separate IPv4 from IPv6, dispatch by VLAN. The routines
//! here do the list surgery once, in a single forward walk, cutting the chain
//! only at run boundaries (where the classification changes) rather than per
//! packet. Nothing allocates; all state lives on the stack.
//!
//! # Choosing a classifier
//!
//! | Routine | Buckets | Output |
//! |---------|---------|--------|
//! | [`classify2`] | exactly 2 | two queues |
//! | [`classify_by_index`] | small, known N | slice of N queues |
//! | [`split_by_match`] | field equals / differs | two queues |
//! | [`classify_by_value`] | unbounded keys | callback per contiguous run |
//! | [`classify_by_value_lookahead`] | unbounded keys | callback per coalesced run |
//! | [`partial_classify_by_value`] | unbounded keys | one run per call, no callback |
//!
//! Suppose a chain arrives with these VLAN ids:
//!
//! ```text
//! A[1] -> B[1] -> C[2] -> D[2] -> E[1]
//! ```
//!
//! [`classify_by_value`] flushes three batches: `A,B` (1), `C,D` (2), `E` (1).
//! [`classify_by_value_lookahead`] keeps several runs open at once and
//! flushes two: `A,B,E` (1) and `C,D` (2).
//!
//! # Counted output
//!
//! Every routine is generic over [`RunQueue`](crate::RunQueue). Pass
//! [`CountedPacketQueue`](crate::CountedPacketQueue)s (or ask for them in the
//! flush callback) and each batch arrives with its length already known.
//!
//! # Callback contract
//!
//! Selectors and key extractors receive `&T` and must be pure with respect to
//! the chain. The flush callback receives the storage mutably so it can walk
//! or relink its batch; it must not touch the links of any other packet. The
//! queue it is handed is only a view for the duration of the call: move the
//! packets out (e.g. [`take_chain`](crate::PacketQueue::take_chain)) to keep
//! them.
//!
//! # Preconditions
//!
//! Input chains must be non-empty and acyclic. Index selectors must return a
//! value in range. These are checked with `debug_assert!` only.

mod index;
mod lookahead;
mod value;

pub use index::{classify_by_index, classify2, split_by_match};
pub use lookahead::{DEFAULT_LOOKAHEAD_DEPTH, Lookahead, classify_by_value_lookahead};
pub use value::{classify_by_value, partial_classify_by_value};

#[cfg(test)]
mod testing;
