//! Deferred-scheduler demonstration
//!
//! Runs the scheduler on the host with a millisecond tick. It shows the
//! advertised main-loop shape:
//! - Arm a handful of one-shot completions with different delays
//! - Push one of them back with an id reuse before it fires
//! - Drive `update()` from a loop, sleeping between passes
//!
//! # Usage
//!
//! ```bash
//! cargo run --example main_loop
//! ```

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use tick_sched::{CpuInterface, Scheduler};

/// Host CPU facade: the tick is milliseconds since program start and the
/// critical sections are no-ops (there are no interrupts to mask here).
struct HostCpu {
    start: Instant,
}

impl HostCpu {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl CpuInterface for HostCpu {
    fn enter_critical_section(&self) {}

    fn leave_critical_section(&self) {}

    fn system_tick(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }

    fn sleep(&self) {
        std::thread::sleep(Duration::from_millis(1));
    }
}

static COMPLETED: AtomicU32 = AtomicU32::new(0);

/// The param carries a small integer disguised as the opaque pointer; the
/// scheduler passes it through untouched.
fn announce(param: *mut ()) {
    let tag = param as usize;
    println!("  completion #{tag} fired");
    COMPLETED.fetch_add(1, Ordering::Relaxed);
}

fn main() {
    let scheduler: Scheduler<HostCpu, 8> = Scheduler::new(HostCpu::new());

    println!("tick_sched main-loop demo");
    println!("=========================");
    println!();
    println!("Arming completions:");
    println!("  #1 in 100 ms");
    println!("  #2 in 250 ms");
    println!("  #3 in 400 ms, pushed back to 700 ms before it fires");
    println!();

    let r1 = scheduler.schedule_task(announce, 1 as *mut (), 100, None);
    let r2 = scheduler.schedule_task(announce, 2 as *mut (), 250, None);
    let r3 = scheduler.schedule_task(announce, 3 as *mut (), 400, None);
    let (_, _, watchdog) = match (r1, r2, r3) {
        (Ok(a), Ok(b), Ok(c)) => (a, b, c),
        _ => {
            eprintln!("task table full at startup");
            return;
        }
    };

    std::thread::sleep(Duration::from_millis(300));

    // #3 has not fired yet; rescheduling against its id replaces it.
    match scheduler.schedule_task(announce, 3 as *mut (), 400, Some(watchdog)) {
        Ok(id) => println!("  pushed back #{} to t+700 ms", id.get()),
        Err(err) => eprintln!("  reschedule failed: {err}"),
    }

    while COMPLETED.load(Ordering::Relaxed) < 3 {
        scheduler.update();
        scheduler.cpu().sleep();
    }

    println!();
    println!("All completions dispatched, exiting");
}
