//! Deferred task scheduling
//!
//! The scheduler owns a fixed-capacity table of pending tasks, sorted by
//! absolute due tick under wrap-aware comparison. Callers (foreground code
//! or interrupt handlers) insert and remove tasks with [`schedule_task`]
//! and [`unschedule_task`]; the host main loop calls [`update`] to
//! dispatch everything that is due.
//!
//! Every access to the table happens inside a CPU critical section, but
//! completion functions are always invoked with the section released, so a
//! callback is free to re-enter the scheduler and re-arm itself.
//!
//! [`schedule_task`]: Scheduler::schedule_task
//! [`unschedule_task`]: Scheduler::unschedule_task
//! [`update`]: Scheduler::update

pub mod error;
pub mod task;

pub use error::{Result, SchedulerError};
pub use task::{CompletionHandler, TaskId};

use core::cell::UnsafeCell;
use core::num::NonZeroU32;

use heapless::Vec;

use crate::platform::traits::{CpuInterface, CriticalSection};
use task::{ticks_since, Task};

/// The three operations of a deferred scheduler.
///
/// Application code that only needs to arm and disarm completions can be
/// written against this trait and tested with a substitute, the same way
/// the platform side substitutes [`MockCpu`](crate::platform::MockCpu)
/// for the real CPU.
pub trait SchedulerInterface {
    /// Schedule `func(param)` to run `delay` ticks from now. See
    /// [`Scheduler::schedule_task`].
    fn schedule_task(
        &self,
        func: CompletionHandler,
        param: *mut (),
        delay: u32,
        reuse_id: Option<TaskId>,
    ) -> Result<TaskId>;

    /// Remove a pending task. See [`Scheduler::unschedule_task`].
    fn unschedule_task(&self, id: TaskId);

    /// Dispatch all currently-due tasks. See [`Scheduler::update`].
    fn update(&self);
}

/// Pending tasks plus the identity counter, only ever touched inside a
/// critical section.
struct TaskTable<const N: usize> {
    /// Live tasks in ascending due-tick order; equal deadlines keep their
    /// scheduling order.
    tasks: Vec<Task, N>,
    next_id: NonZeroU32,
}

impl<const N: usize> TaskTable<N> {
    const fn new() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: NonZeroU32::MIN,
        }
    }

    fn allocate_id(&mut self) -> TaskId {
        let id = self.next_id;
        // The counter wraps past 0 so a handed-out id is never zero.
        self.next_id = match NonZeroU32::new(id.get().wrapping_add(1)) {
            Some(next) => next,
            None => NonZeroU32::MIN,
        };
        TaskId(id)
    }

    /// Compacting removal by id. Returns whether a task was removed.
    fn remove(&mut self, id: TaskId) -> bool {
        match self.tasks.iter().position(|t| t.id == id) {
            Some(index) => {
                self.tasks.remove(index);
                true
            }
            None => false,
        }
    }
}

/// Deferred one-shot task scheduler.
///
/// `C` is the CPU facade, `N` the maximum number of concurrently pending
/// tasks. The table is stored inline; no allocation ever happens.
///
/// [`new`](Scheduler::new) is const, so the scheduler can be shared with
/// interrupt handlers the way any other peripheral state is:
///
/// ```
/// use tick_sched::{MockCpu, Scheduler};
///
/// static SCHEDULER: Scheduler<MockCpu, 8> = Scheduler::new(MockCpu::new());
/// ```
pub struct Scheduler<C: CpuInterface, const N: usize> {
    cpu: C,
    table: UnsafeCell<TaskTable<N>>,
}

// Safety: the table is only reachable through `with_table`, which holds
// the CPU critical section for the whole borrow. On the single core this
// crate targets, that masks the only other context (an ISR) that could
// observe the table, so references never alias. Implementations of
// `CpuInterface` are required to make the section a compiler barrier.
unsafe impl<C: CpuInterface + Send, const N: usize> Send for Scheduler<C, N> {}
unsafe impl<C: CpuInterface + Sync, const N: usize> Sync for Scheduler<C, N> {}

impl<C: CpuInterface, const N: usize> Scheduler<C, N> {
    /// Maximum number of concurrently pending tasks.
    pub const CAPACITY: usize = N;

    /// Creates an empty scheduler: no tasks, identity counter at 1.
    pub const fn new(cpu: C) -> Self {
        Self {
            cpu,
            table: UnsafeCell::new(TaskTable::new()),
        }
    }

    /// The CPU facade this scheduler runs on.
    pub fn cpu(&self) -> &C {
        &self.cpu
    }

    /// Number of tasks currently pending, read under the critical section.
    pub fn pending_tasks(&self) -> usize {
        self.with_table(|table| table.tasks.len())
    }

    /// Runs `f` with exclusive access to the task table.
    fn with_table<R>(&self, f: impl FnOnce(&mut TaskTable<N>) -> R) -> R {
        let _section = CriticalSection::enter(&self.cpu);
        // SAFETY: the critical section masks interrupts on this core for
        // the whole borrow and the scheduler never nests its own sections,
        // so this is the only live reference to the table.
        let table = unsafe { &mut *self.table.get() };
        f(table)
    }

    /// Schedule `func(param)` to run once, `delay` ticks from now.
    ///
    /// With `reuse_id: Some(id)`, any pending task carrying `id` is
    /// removed first and the new task keeps that id, so a caller can
    /// atomically push back a completion it has already armed. With
    /// `None` a fresh id is allocated.
    ///
    /// `delay` must stay below 2^31 ticks; beyond that the wrap-aware
    /// deadline comparison is no longer meaningful. `param` is passed to
    /// `func` verbatim and never dereferenced by the scheduler; the caller
    /// must keep whatever it points to alive until the task has run or
    /// been unscheduled.
    ///
    /// # Returns
    ///
    /// The id of the pending task, or
    /// [`SchedulerError::CapacityExhausted`] if the table is full. A
    /// failed call has no effect beyond the reuse-removal: rescheduling a
    /// live id on a full table frees that slot first and therefore
    /// succeeds.
    ///
    /// # Example
    ///
    /// ```
    /// use core::ptr;
    /// use tick_sched::{MockCpu, Scheduler};
    ///
    /// fn ping(_: *mut ()) {}
    ///
    /// let scheduler: Scheduler<MockCpu, 8> = Scheduler::new(MockCpu::new());
    /// let id = scheduler.schedule_task(ping, ptr::null_mut(), 10, None)?;
    ///
    /// scheduler.cpu().advance(10);
    /// scheduler.update(); // ping fires here
    /// # let _ = id;
    /// # Ok::<(), tick_sched::SchedulerError>(())
    /// ```
    pub fn schedule_task(
        &self,
        func: CompletionHandler,
        param: *mut (),
        delay: u32,
        reuse_id: Option<TaskId>,
    ) -> Result<TaskId> {
        // Sample the tick before taking the critical section.
        let target = self.cpu.system_tick().wrapping_add(delay);

        let outcome = self.with_table(|table| {
            if let Some(id) = reuse_id {
                table.remove(id);
            }

            if table.tasks.len() >= N {
                return Err(SchedulerError::CapacityExhausted);
            }

            let id = match reuse_id {
                Some(id) => id,
                None => table.allocate_id(),
            };

            // The new task goes after every entry not strictly later than
            // `target`, so equal deadlines dispatch in scheduling order.
            let slot = table
                .tasks
                .iter()
                .position(|t| ticks_since(target, t.execute_time) < 0)
                .unwrap_or(table.tasks.len());

            table
                .tasks
                .insert(
                    slot,
                    Task {
                        execute_time: target,
                        func,
                        param,
                        id,
                    },
                )
                .map_err(|_| SchedulerError::CapacityExhausted)?;

            Ok(id)
        });

        if outcome.is_err() {
            crate::log_warn!("task table full, dropping schedule request");
        }
        outcome
    }

    /// Remove the pending task carrying `id`.
    ///
    /// No-op if no such task exists; already-dispatched tasks count as
    /// gone.
    pub fn unschedule_task(&self, id: TaskId) {
        self.with_table(|table| {
            table.remove(id);
        });
    }

    /// Dispatch every task due at the current tick, in deadline order.
    ///
    /// The tick is sampled once per call, so a task scheduled by a
    /// callback for a later tick always waits for a future `update`. Each
    /// task is removed from the table before its completion function runs,
    /// and the function runs with the critical section released, so it may
    /// schedule or unschedule freely. When dispatch empties the table the
    /// pass ends immediately.
    pub fn update(&self) {
        let now = self.cpu.system_tick();

        loop {
            let due = self.with_table(|table| {
                let head = *table.tasks.first()?;
                if !head.is_due(now) {
                    return None;
                }
                let task = table.tasks.remove(0);
                Some((task, table.tasks.len()))
            });

            let Some((task, remaining)) = due else { return };

            crate::log_trace!("dispatching task {} at tick {}", task.id.get(), now);

            // The slot is already free and interrupts are enabled; the
            // completion may re-enter the scheduler.
            (task.func)(task.param);

            if remaining == 0 {
                return;
            }
        }
    }
}

impl<C: CpuInterface, const N: usize> SchedulerInterface for Scheduler<C, N> {
    fn schedule_task(
        &self,
        func: CompletionHandler,
        param: *mut (),
        delay: u32,
        reuse_id: Option<TaskId>,
    ) -> Result<TaskId> {
        Scheduler::schedule_task(self, func, param, delay, reuse_id)
    }

    fn unschedule_task(&self, id: TaskId) {
        Scheduler::unschedule_task(self, id)
    }

    fn update(&self) {
        Scheduler::update(self)
    }
}
