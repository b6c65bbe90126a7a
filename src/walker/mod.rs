//! Parallel directory walker
//!
//! # Architecture
//!
//! ```text
//!                  ┌──────────────────────────────┐
//!                  │        WalkCoordinator       │
//!                  │  dispatch loop (caller)      │
//!                  └──────┬───────────────▲───────┘
//!                         │ ScanTicket    │ pop_or_wait
//!                         ▼               │
//!              ┌─────────────────┐  ┌─────┴──────────────┐
//!              │ crossbeam chan  │  │     TaskQueue      │
//!              │  (bounded N)    │  │ pending + in-flight│
//!              └──┬────┬────┬────┘  └─────▲──────────────┘
//!                 │    │    │             │ push(subdir)
//!           ┌─────▼┐ ┌─▼────┐ ┌▼─────┐    │
//!           │scan-0│ │scan-1│ │scan-N├────┘
//!           └──┬───┘ └──┬───┘ └──┬───┘
//!              └────────┼────────┘
//!                       ▼
//!              ┌──────────────────┐
//!              │     Printer      │
//!              │ filter + sink    │
//!              └──────────────────┘
//! ```
//!
//! A scan lists one directory. Subdirectories go back onto the queue, other
//! entries go straight to the printer. The walk ends when the queue is empty
//! and no scan is outstanding.

mod coordinator;
pub mod printer;
pub mod queue;
pub mod scanner;
mod worker;

pub use coordinator::{
    run_walk, ProgressProbe, ShutdownHandle, WalkCoordinator, WalkProgress, WalkResult,
};
pub use printer::Printer;
pub use queue::{TaskQueue, POLL_INTERVAL};
pub use scanner::{Scanner, WalkStats};
