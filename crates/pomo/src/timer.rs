//! Timer state machine
//!
//! States are `NotStarted`, `Running` and `Paused`. Reaching zero while
//! Running is not a state of its own: it collapses straight into a segment
//! transition that leaves the next segment loaded and `NotStarted`.
//!
//! The machine owns the single tick lease. Entering Running acquires it,
//! every exit from Running (pause, expiry, drop) releases it.

use crate::segment::{Segment, Status, TimerState};
use crate::settings::{Direction, Settings};
use crate::store::KeyValueStore;
use crate::ticker::TickSource;

/// Focus completions per long break unless configured otherwise
pub const DEFAULT_LONG_BREAK_EVERY: u64 = 4;

/// A completed segment and what comes next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub finished: Segment,
    pub next: Segment,
    /// New completed count, when the finished segment was a focus segment
    pub completed: Option<u64>,
}

/// Result of delivering a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not Running, or the tick came from a released lease
    Ignored,
    /// Seconds left in the current segment
    Counting(u64),
    /// The segment ran out and the machine moved on
    Expired(Transition),
}

/// Receives the segment-end side effect
pub trait Notifier {
    fn segment_finished(&mut self, transition: &Transition);
}

impl<F: FnMut(&Transition)> Notifier for F {
    fn segment_finished(&mut self, transition: &Transition) {
        self(transition)
    }
}

/// Pomodoro timer
pub struct Timer<S, T: TickSource, N> {
    settings: Settings<S>,
    ticks: T,
    notifier: N,
    long_break_every: u64,
    state: TimerState,
    lease: Option<T::Lease>,
    generation: u64,
}

impl<S, T, N> Timer<S, T, N>
where
    S: KeyValueStore,
    T: TickSource,
    N: Notifier,
{
    /// Create an unstarted focus segment, pre-loaded from settings
    pub fn new(settings: Settings<S>, ticks: T, notifier: N) -> Self {
        let remaining = settings.duration(Segment::Focus);
        Self {
            settings,
            ticks,
            notifier,
            long_break_every: DEFAULT_LONG_BREAK_EVERY,
            state: TimerState::new(remaining),
            lease: None,
            generation: 0,
        }
    }

    pub fn with_long_break_every(mut self, every: u64) -> Self {
        self.long_break_every = every.max(1);
        self
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn segment(&self) -> Segment {
        self.state.segment
    }

    pub fn status(&self) -> Status {
        self.state.status
    }

    pub fn remaining(&self) -> u64 {
        self.state.remaining_seconds
    }

    /// Generation of the live lease, if Running
    pub fn current_generation(&self) -> Option<u64> {
        self.lease.as_ref().map(|_| self.generation)
    }

    pub fn settings(&self) -> &Settings<S> {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings<S> {
        &mut self.settings
    }

    /// Start (or resume) the countdown; no-op while Running
    pub fn start(&mut self) {
        match self.state.status {
            Status::Running => return,
            Status::NotStarted => {
                self.state.remaining_seconds = self.settings.duration(self.state.segment);
            }
            Status::Paused => {}
        }

        self.state.status = Status::Running;
        self.acquire_lease();
        tracing::debug!(
            segment = self.state.segment.as_str(),
            remaining = self.state.remaining_seconds,
            "timer running"
        );
    }

    /// Start, pause or resume depending on the current status
    pub fn toggle(&mut self) -> Status {
        match self.state.status {
            Status::NotStarted | Status::Paused => self.start(),
            Status::Running => {
                self.release_lease();
                self.state.status = Status::Paused;
                tracing::debug!(remaining = self.state.remaining_seconds, "timer paused");
            }
        }
        self.state.status
    }

    /// Advance the countdown by one second
    pub fn tick(&mut self) -> TickOutcome {
        if self.state.status != Status::Running {
            return TickOutcome::Ignored;
        }

        self.state.remaining_seconds = self.state.remaining_seconds.saturating_sub(1);
        if self.state.remaining_seconds == 0 {
            TickOutcome::Expired(self.on_expiry())
        } else {
            TickOutcome::Counting(self.state.remaining_seconds)
        }
    }

    /// Deliver a tick produced by the lease of `generation`
    ///
    /// Ticks from a released lease (one queued before a pause, say) are
    /// dropped so they cannot count against a later Running phase.
    pub fn tick_from(&mut self, generation: u64) -> TickOutcome {
        if self.current_generation() != Some(generation) {
            tracing::trace!(generation, current = self.generation, "stale tick ignored");
            return TickOutcome::Ignored;
        }
        self.tick()
    }

    /// Zero the persisted completed counter; the countdown is untouched
    pub fn reset_session_counter(&mut self) {
        self.settings.reset_completed_count();
        tracing::info!("completed segment counter reset");
    }

    /// Lengthen or shorten a segment's configured duration
    ///
    /// Only the stored value changes. The current countdown, running or
    /// not, keeps its remaining seconds; the new value is loaded the next
    /// time that segment starts fresh.
    pub fn adjust_duration(&mut self, segment: Segment, direction: Direction) -> u64 {
        self.settings.adjust_duration(segment, direction)
    }

    fn on_expiry(&mut self) -> Transition {
        self.release_lease();
        self.state.status = Status::NotStarted;

        let finished = self.state.segment;
        let (next, completed) = match finished {
            Segment::Focus => {
                let count = self.settings.increment_completed_count();
                let next = if count % self.long_break_every == 0 {
                    Segment::LongBreak
                } else {
                    Segment::ShortBreak
                };
                (next, Some(count))
            }
            Segment::ShortBreak | Segment::LongBreak => (Segment::Focus, None),
        };

        let transition = Transition {
            finished,
            next,
            completed,
        };

        if self.settings.notifications_enabled() {
            self.notifier.segment_finished(&transition);
        }

        self.state.segment = next;
        self.state.remaining_seconds = self.settings.duration(next);

        tracing::info!(
            finished = finished.as_str(),
            next = next.as_str(),
            completed = ?completed,
            "segment complete"
        );
        transition
    }

    fn acquire_lease(&mut self) {
        // Never two schedules at once
        self.release_lease();
        self.generation += 1;
        self.lease = Some(self.ticks.schedule(self.generation));
        tracing::debug!(generation = self.generation, "tick lease acquired");
    }

    fn release_lease(&mut self) {
        if self.lease.take().is_some() {
            tracing::debug!(generation = self.generation, "tick lease released");
        }
    }
}
