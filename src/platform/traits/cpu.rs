//! CPU facade trait
//!
//! The scheduler interacts with the hardware only through this interface:
//! interrupt masking for mutual exclusion, the free-running system tick,
//! and a low-power hint for the host loop.

/// Platform-agnostic CPU facade.
///
/// This trait abstracts over different CPU backends:
/// - A zero-sized wrapper around the target's intrinsics on embedded
///   targets (calls monomorphise to direct intrinsic calls)
/// - [`MockCpu`](crate::platform::MockCpu) for host testing with a
///   scripted tick
///
/// # Implementation requirements
///
/// `enter_critical_section` / `leave_critical_section` must establish
/// mutual exclusion against interrupt handlers on this core, and must act
/// as a compiler barrier so that memory accesses cannot be reordered
/// across the section boundary (on Cortex-M, `cpsid i` / `cpsie i` with a
/// compiler fence). The scheduler never nests its own sections; nesting
/// support is only needed if the host itself nests them.
pub trait CpuInterface {
    /// Mask interrupts that could mutate scheduler state on this core.
    fn enter_critical_section(&self);

    /// Unmask interrupts masked by [`enter_critical_section`].
    ///
    /// [`enter_critical_section`]: CpuInterface::enter_critical_section
    fn leave_critical_section(&self);

    /// Current value of the free-running tick counter.
    ///
    /// Wraps modulo 2^32; consumers compare ticks with wrap-aware signed
    /// arithmetic and must keep intervals below 2^31 ticks.
    fn system_tick(&self) -> u32;

    /// Low-power hint.
    ///
    /// The scheduler never calls this itself; the host loop may use it
    /// between [`update`](crate::Scheduler::update) calls (on Cortex-M,
    /// `wfi`).
    fn sleep(&self);
}

/// Scope guard for a CPU critical section.
///
/// Enters the section on construction and leaves it when dropped, so no
/// early return can leave interrupts masked.
///
/// # Example
///
/// ```
/// use tick_sched::{CriticalSection, MockCpu};
///
/// let cpu = MockCpu::new();
/// {
///     let _section = CriticalSection::enter(&cpu);
///     assert_eq!(cpu.critical_depth(), 1);
/// }
/// assert_eq!(cpu.critical_depth(), 0);
/// ```
pub struct CriticalSection<'a, C: CpuInterface> {
    cpu: &'a C,
}

impl<'a, C: CpuInterface> CriticalSection<'a, C> {
    /// Mask interrupts until the returned guard is dropped.
    pub fn enter(cpu: &'a C) -> Self {
        cpu.enter_critical_section();
        Self { cpu }
    }
}

impl<C: CpuInterface> Drop for CriticalSection<'_, C> {
    fn drop(&mut self) {
        self.cpu.leave_critical_section();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::MockCpu;

    #[test]
    fn guard_brackets_the_section() {
        let cpu = MockCpu::new();
        assert_eq!(cpu.critical_depth(), 0);

        let section = CriticalSection::enter(&cpu);
        assert_eq!(cpu.critical_depth(), 1);
        assert_eq!(cpu.enter_count(), 1);

        drop(section);
        assert_eq!(cpu.critical_depth(), 0);
    }

    #[test]
    fn guard_releases_on_early_return() {
        fn bails_out(cpu: &MockCpu, bail: bool) -> Option<u32> {
            let _section = CriticalSection::enter(cpu);
            if bail {
                return None;
            }
            Some(cpu.system_tick())
        }

        let cpu = MockCpu::new();
        assert!(bails_out(&cpu, true).is_none());
        assert_eq!(cpu.critical_depth(), 0);

        assert!(bails_out(&cpu, false).is_some());
        assert_eq!(cpu.critical_depth(), 0);
        assert_eq!(cpu.enter_count(), 2);
    }
}
