//! Scripted queue scenarios.
//!
//! A scenario is a list of [`Step`]s naming queues by their creation index.
//! [`run`] drives a [`QueueArena`] through it and returns every dequeued
//! byte, so tests can compare the output against the script's expectation.

use qarena_store::{ArenaError, QueueArena, QueueHandle};

/// One scripted arena operation. Queues are named by creation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Create,
    Enqueue(usize, u8),
    Dequeue(usize),
    Destroy(usize),
}

/// The two-queue interleaving used as the canonical smoke test.
///
/// Dequeues yield `[0, 1, 2, 5, 3, 4, 6]` in order.
pub fn reference_trace() -> Vec<Step> {
    use Step::*;
    vec![
        Create,
        Enqueue(0, 0),
        Enqueue(0, 1),
        Create,
        Enqueue(1, 3),
        Enqueue(0, 2),
        Enqueue(1, 4),
        Dequeue(0),
        Dequeue(0),
        Enqueue(0, 5),
        Enqueue(1, 6),
        Dequeue(0),
        Dequeue(0),
        Destroy(0),
        Dequeue(1),
        Dequeue(1),
        Dequeue(1),
        Destroy(1),
    ]
}

/// Bytes [`reference_trace`] dequeues, in order.
pub const REFERENCE_OUTPUT: [u8; 7] = [0, 1, 2, 5, 3, 4, 6];

/// Run `steps` against `arena`, returning dequeued bytes in order.
///
/// Stops at the first failing step.
///
/// # Panics
///
/// Panics if a step names a queue that has not been created yet.
pub fn run(arena: &mut QueueArena, steps: &[Step]) -> Result<Vec<u8>, ArenaError> {
    let mut queues: Vec<QueueHandle> = Vec::new();
    let mut out = Vec::new();
    for step in steps {
        match *step {
            Step::Create => queues.push(arena.create_queue()?),
            Step::Enqueue(q, b) => arena.enqueue_byte(queues[q], b)?,
            Step::Dequeue(q) => out.push(arena.dequeue_byte(queues[q])?),
            Step::Destroy(q) => arena.destroy_queue(queues[q])?,
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_trace_produces_reference_output() {
        let mut arena = QueueArena::default();
        let out = run(&mut arena, &reference_trace()).unwrap();
        assert_eq!(out, REFERENCE_OUTPUT);
        assert_eq!(arena.live_queues(), 0);
    }

    #[test]
    fn run_stops_at_first_failure() {
        let mut arena = QueueArena::default();
        let err = run(&mut arena, &[Step::Create, Step::Dequeue(0), Step::Enqueue(0, 1)])
            .unwrap_err();
        assert!(err.is_illegal_operation());
        assert_eq!(arena.used_bytes(), arena.config().header_bytes());
    }
}
