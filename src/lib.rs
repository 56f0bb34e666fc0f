#![cfg_attr(not(test), no_std)]

//! tick_sched - deferred one-shot task scheduler for bare-metal main loops
//!
//! Callers ask for a completion function to run once, a number of CPU ticks
//! from now; a host loop calls [`Scheduler::update`] repeatedly and due
//! callbacks are dispatched in deadline order. The scheduler may be shared
//! with interrupt handlers, which can schedule and unschedule tasks of
//! their own.
//!
//! # Design Principles
//!
//! - **No allocation**: fixed-capacity task table, capacity chosen at
//!   compile time
//! - **No runtime**: the host main loop drives dispatch; there is no
//!   executor and no preemption
//! - **Trait abstractions**: the hardware is reached only through the
//!   [`CpuInterface`] facade, so the whole crate runs on the host against
//!   [`MockCpu`]
//!
//! # Modules
//!
//! - [`platform`]: CPU facade trait, critical-section guard, mock CPU
//! - [`scheduler`]: the task table and the schedule/unschedule/update
//!   operations

mod logging;
pub mod platform;
pub mod scheduler;

pub use platform::{CpuInterface, CriticalSection, MockCpu};
pub use scheduler::{
    CompletionHandler, Result, Scheduler, SchedulerError, SchedulerInterface, TaskId,
};
