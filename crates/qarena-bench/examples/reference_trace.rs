//! Reference trace example.
//!
//! Demonstrates: build an arena → install the tracing failure hook → run the
//! two-queue interleaving → provoke one failure of each kind.
//!
//! Run with `RUST_LOG=debug` to see lifecycle events.

use qarena::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), ArenaError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== qarena reference trace ===\n");

    let mut arena = QueueArena::default().with_failure_hook(TracingHook);

    let q0 = arena.create_queue()?;
    arena.enqueue_byte(q0, 0)?;
    arena.enqueue_byte(q0, 1)?;
    let q1 = arena.create_queue()?;
    arena.enqueue_byte(q1, 3)?;
    arena.enqueue_byte(q0, 2)?;
    arena.enqueue_byte(q1, 4)?;
    print!("{}", arena.dequeue_byte(q0)?);
    println!(" {}", arena.dequeue_byte(q0)?);
    arena.enqueue_byte(q0, 5)?;
    arena.enqueue_byte(q1, 6)?;
    print!("{}", arena.dequeue_byte(q0)?);
    println!(" {}", arena.dequeue_byte(q0)?);
    arena.destroy_queue(q0)?;
    print!("{}", arena.dequeue_byte(q1)?);
    print!(" {}", arena.dequeue_byte(q1)?);
    println!(" {}", arena.dequeue_byte(q1)?);
    arena.destroy_queue(q1)?;

    println!("\n{:?}", arena.stats());

    println!("\nProvoking failures (logged at warn level):");
    let q = arena.create_queue()?;
    if let Err(e) = arena.dequeue_byte(q) {
        println!("  dequeue on empty queue: {e}");
    }
    let free = arena.free_bytes();
    arena.enqueue_slice(q, &vec![0xAB; free])?;
    if let Err(e) = arena.enqueue_byte(q, 0) {
        println!("  enqueue on full arena:  {e}");
    }
    arena.destroy_queue(q)?;
    if let Err(e) = arena.destroy_queue(q) {
        println!("  double destroy:         {e}");
    }

    Ok(())
}
