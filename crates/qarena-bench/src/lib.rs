//! Workload generators and profiles for benchmarking qarena.
//!
//! - [`churn_workload`]: a seeded stream of mixed queue operations
//! - [`apply`]: replay a workload against an arena, tallying outcomes
//! - [`prefilled_arena`]: an arena with every slot live and partly full

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use qarena_store::{ArenaConfig, QueueArena, QueueHandle};
use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// One generated operation. Queues are addressed by an index into the
/// caller's handle table, taken modulo its length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkOp {
    Create,
    Destroy(usize),
    Enqueue(usize, u8),
    Dequeue(usize),
}

/// Outcome counts from [`apply`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    pub succeeded: usize,
    pub out_of_memory: usize,
    pub illegal: usize,
}

/// Generate `len` operations weighted towards enqueue/dequeue traffic.
///
/// Roughly 5% creates, 3% destroys, and the rest split evenly between
/// enqueues and dequeues. Deterministic for a given `seed`.
pub fn churn_workload(seed: u64, len: usize) -> Vec<WorkOp> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..len)
        .map(|_| {
            let roll = rng.next_u32() % 100;
            let target = rng.next_u32() as usize;
            match roll {
                0..=4 => WorkOp::Create,
                5..=7 => WorkOp::Destroy(target),
                8..=53 => WorkOp::Enqueue(target, rng.next_u32() as u8),
                _ => WorkOp::Dequeue(target),
            }
        })
        .collect()
}

/// Replay `ops` against `arena`, creating handles as the stream demands.
///
/// Failed operations are counted, not propagated.
pub fn apply(arena: &mut QueueArena, ops: &[WorkOp]) -> Tally {
    let mut handles: Vec<QueueHandle> = Vec::new();
    let mut tally = Tally::default();
    for op in ops {
        let result = match *op {
            WorkOp::Create => arena.create_queue().map(|h| handles.push(h)),
            WorkOp::Destroy(i) => match pick(&handles, i) {
                Some(h) => arena.destroy_queue(h),
                None => continue,
            },
            WorkOp::Enqueue(i, b) => match pick(&handles, i) {
                Some(h) => arena.enqueue_byte(h, b),
                None => continue,
            },
            WorkOp::Dequeue(i) => match pick(&handles, i) {
                Some(h) => arena.dequeue_byte(h).map(|_| ()),
                None => continue,
            },
        };
        match result {
            Ok(()) => tally.succeeded += 1,
            Err(e) if e.is_out_of_memory() => tally.out_of_memory += 1,
            Err(_) => tally.illegal += 1,
        }
    }
    tally
}

fn pick(handles: &[QueueHandle], i: usize) -> Option<QueueHandle> {
    if handles.is_empty() {
        None
    } else {
        Some(handles[i % handles.len()])
    }
}

/// Build an arena with every directory slot live and `per_queue` bytes in
/// each queue. Returns the arena and its handles in slot order.
///
/// # Panics
///
/// Panics if the payloads do not fit in `config.capacity`.
pub fn prefilled_arena(config: ArenaConfig, per_queue: usize) -> (QueueArena, Vec<QueueHandle>) {
    let mut arena = QueueArena::new(config).expect("benchmark config must be valid");
    let slots = arena.config().max_queues;
    let payload: Vec<u8> = (0..per_queue).map(|i| i as u8).collect();
    let handles = (0..slots)
        .map(|_| {
            let q = arena.create_queue().expect("directory has room");
            arena
                .enqueue_slice(q, &payload)
                .expect("prefill fits in capacity");
            q
        })
        .collect();
    (arena, handles)
}
