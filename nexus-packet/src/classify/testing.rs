use crate::{Handle, Linked, PacketPool, PacketQueue, Storage, chain_iter};

#[derive(Debug)]
pub(super) struct Packet {
    pub id: u32,
    pub key: u64,
    pub next: u32,
}

impl Linked<u32> for Packet {
    fn next(&self) -> u32 {
        self.next
    }
    fn set_next(&mut self, next: u32) {
        self.next = next;
    }
}

pub(super) fn pool() -> PacketPool<Packet> {
    PacketPool::with_capacity(256)
}

/// Links one packet per key into a chain; packet ids count up from 1.
pub(super) fn chain(pool: &mut PacketPool<Packet>, keys: &[u64]) -> u32 {
    let mut queue: PacketQueue = PacketQueue::new();
    for (i, &key) in keys.iter().enumerate() {
        let h = pool
            .try_insert(Packet {
                id: i as u32 + 1,
                key,
                next: u32::NONE,
            })
            .unwrap();
        queue.append_single(pool, h);
    }
    queue.take_chain()
}

pub(super) fn ids(pool: &PacketPool<Packet>, head: u32) -> Vec<u32> {
    chain_iter(pool, head).map(|(_, p)| p.id).collect()
}
