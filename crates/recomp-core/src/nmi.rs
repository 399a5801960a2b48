//! NMI delivery and skip heuristic.
//!
//! Real hardware drops an NMI when the previous handler is still running at the
//! start of the next VBlank. The game logic driven by this core runs its
//! handler to completion instantly, so those overruns have to be predicted.
//! The scheduler watches two cells the game keeps up to date, a coarse
//! "task" phase and a "mode", and arms a number of skips when the task moves
//! from 0 to 1, which is where the long setup routines start.

use core::fmt;

use crate::nmi_trace;

/// Skips armed at power-on to cover the cold boot sequence.
pub const WARMUP_SKIPS: u32 = 3;

/// Outcome of polling the scheduler for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NmiDecision {
    /// No interrupt condition this frame.
    Idle,
    /// An interrupt was due and was suppressed.
    Skipped,
    /// An interrupt is pending for delivery.
    Fire,
}

impl fmt::Display for NmiDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Idle => "idle",
            Self::Skipped => "skipped",
            Self::Fire => "fire",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NmiScheduler {
    pending_skips: u32,
    prev_task: u8,
    prev_mode: u8,
    first_frame: bool,
    pending: bool,
    skipped_total: u64,
    fired_total: u64,
}

impl Default for NmiScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl NmiScheduler {
    pub fn new() -> Self {
        Self {
            pending_skips: WARMUP_SKIPS,
            prev_task: 0,
            prev_mode: 0,
            first_frame: true,
            pending: false,
            skipped_total: 0,
            fired_total: 0,
        }
    }

    /// Feeds the current task/mode cells. Call once per frame after the PPU
    /// phase change.
    pub fn observe(&mut self, task: u8, mode: u8) {
        if self.first_frame {
            self.first_frame = false;
            self.prev_task = task;
            self.prev_mode = mode;
            return;
        }

        if self.prev_task == 0 && task == 1 {
            match mode {
                0 => self.pending_skips = 2,
                1 => self.pending_skips = 1,
                _ => {}
            }
            tracing::debug!(mode, skips = self.pending_skips, "task 0 -> 1 transition");
        }

        self.prev_task = task;
        self.prev_mode = mode;
    }

    /// Resolves the interrupt condition for this frame.
    pub fn poll(&mut self, nmi_due: bool) -> NmiDecision {
        if !nmi_due {
            return NmiDecision::Idle;
        }
        if self.pending_skips > 0 {
            self.pending_skips -= 1;
            self.skipped_total += 1;
            NmiDecision::Skipped
        } else {
            self.pending = true;
            NmiDecision::Fire
        }
    }

    /// Consumes the pending interrupt, if any.
    pub fn take_pending(&mut self) -> bool {
        let pending = std::mem::take(&mut self.pending);
        if pending {
            self.fired_total += 1;
        }
        pending
    }

    /// Declares extra skips for overruns the transition heuristic cannot see.
    pub fn skip(&mut self, count: u32) {
        self.pending_skips = self.pending_skips.saturating_add(count);
    }

    /// Drops all pending skips and treats the given state as already seen.
    /// Used after loading state from a snapshot.
    pub fn disable(&mut self, task: u8, mode: u8) {
        self.pending_skips = 0;
        self.prev_task = task;
        self.prev_mode = mode;
        self.first_frame = false;
    }

    pub fn pending_skips(&self) -> u32 {
        self.pending_skips
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn skipped_total(&self) -> u64 {
        self.skipped_total
    }

    pub fn fired_total(&self) -> u64 {
        self.fired_total
    }

    /// Last observed `(task, mode)`.
    pub fn previous(&self) -> (u8, u8) {
        (self.prev_task, self.prev_mode)
    }
}

pub(crate) fn trace_line(
    frame: u64,
    task: u8,
    mode: u8,
    due: bool,
    skips: u32,
    decision: NmiDecision,
) -> String {
    format!(
        "frame={frame} task={task} mode={mode} due={} skips={skips} decision={decision}",
        nmi_trace::flag(due)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_until_fire(scheduler: &mut NmiScheduler) -> usize {
        let mut skipped = 0;
        while scheduler.poll(true) == NmiDecision::Skipped {
            skipped += 1;
        }
        skipped
    }

    #[test]
    fn warmup_skips_three_interrupts() {
        let mut scheduler = NmiScheduler::new();
        scheduler.observe(0, 0);
        assert_eq!(count_until_fire(&mut scheduler), 3);
        assert!(scheduler.take_pending());
        assert!(!scheduler.take_pending());
        assert_eq!(scheduler.fired_total(), 1);
    }

    #[test]
    fn first_observation_only_seeds_history() {
        let mut scheduler = NmiScheduler::new();
        // A first frame already at task 1 is not a transition.
        scheduler.observe(1, 0);
        assert_eq!(scheduler.pending_skips(), WARMUP_SKIPS);
        scheduler.observe(1, 0);
        assert_eq!(scheduler.pending_skips(), WARMUP_SKIPS);
        assert_eq!(scheduler.previous(), (1, 0));
    }

    #[test]
    fn transition_with_mode_zero_sets_two_skips() {
        let mut scheduler = NmiScheduler::new();
        scheduler.observe(0, 0);
        scheduler.observe(1, 0);
        // Back to 0 and up again: the count is set, not accumulated.
        scheduler.observe(0, 0);
        scheduler.observe(1, 0);
        assert_eq!(scheduler.pending_skips(), 2);

        assert_eq!(scheduler.poll(true), NmiDecision::Skipped);
        assert_eq!(scheduler.poll(true), NmiDecision::Skipped);
        assert_eq!(scheduler.poll(true), NmiDecision::Fire);
        assert_eq!(scheduler.skipped_total(), 2);
    }

    #[test]
    fn transition_skip_count_depends_on_mode() {
        let mut scheduler = NmiScheduler::new();
        scheduler.disable(0, 1);
        scheduler.observe(1, 1);
        assert_eq!(scheduler.pending_skips(), 1);

        scheduler.disable(0, 7);
        scheduler.skip(4);
        scheduler.observe(1, 7);
        assert_eq!(scheduler.pending_skips(), 4, "other modes leave the count alone");
    }

    #[test]
    fn skips_only_consumed_when_interrupt_is_due() {
        let mut scheduler = NmiScheduler::new();
        scheduler.observe(0, 0);
        for _ in 0..10 {
            assert_eq!(scheduler.poll(false), NmiDecision::Idle);
        }
        assert_eq!(scheduler.pending_skips(), WARMUP_SKIPS);
        assert!(!scheduler.is_pending());
    }

    #[test]
    fn explicit_skip_adds_to_pending() {
        let mut scheduler = NmiScheduler::new();
        scheduler.disable(3, 0);
        scheduler.skip(1);
        assert_eq!(scheduler.poll(true), NmiDecision::Skipped);
        assert_eq!(scheduler.poll(true), NmiDecision::Fire);
        assert_eq!(scheduler.previous(), (3, 0));
    }

    #[test]
    fn trace_line_format() {
        let line = trace_line(12, 1, 0, true, 2, NmiDecision::Skipped);
        assert_eq!(line, "frame=12 task=1 mode=0 due=1 skips=2 decision=skipped");
    }
}
