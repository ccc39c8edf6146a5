//! Countdown clock
//!
//! A [`TickSource`] hands out one lease per Running phase. While the lease
//! is alive, ticks tagged with its generation are delivered once per
//! period; dropping the lease stops them.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// One tick of the countdown clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Generation of the lease that produced this tick
    pub generation: u64,
}

/// Something that can schedule a periodic tick
pub trait TickSource {
    /// Scoped handle; the schedule is cancelled when it is dropped
    type Lease;

    fn schedule(&mut self, generation: u64) -> Self::Lease;
}

/// Periodic tick on the tokio runtime, delivered into an event channel
pub struct IntervalTicker<E> {
    tx: UnboundedSender<E>,
    period: Duration,
}

impl<E> IntervalTicker<E>
where
    E: From<Tick> + Send + 'static,
{
    pub fn new(tx: UnboundedSender<E>, period: Duration) -> Self {
        Self { tx, period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

impl<E> TickSource for IntervalTicker<E>
where
    E: From<Tick> + Send + 'static,
{
    type Lease = TickLease;

    /// Must be called from within a tokio runtime
    fn schedule(&mut self, generation: u64) -> TickLease {
        let tx = self.tx.clone();
        let period = self.period;

        let task = tokio::spawn(async move {
            // First tick one full period after (re)starting
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(Tick { generation }.into()).is_err() {
                    break;
                }
            }
        });

        TickLease { task, generation }
    }
}

/// Lease on a running [`IntervalTicker`] schedule
#[derive(Debug)]
pub struct TickLease {
    task: JoinHandle<()>,
    generation: u64,
}

impl TickLease {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for TickLease {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Tick source driven by hand
///
/// Nothing is scheduled; the caller delivers ticks itself. Live leases are
/// counted so callers can check that at most one schedule exists.
#[derive(Debug, Clone, Default)]
pub struct ManualTicker {
    live: Rc<Cell<usize>>,
    scheduled: Rc<Cell<u64>>,
    last_generation: Rc<Cell<Option<u64>>>,
}

impl ManualTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Leases currently alive
    pub fn live(&self) -> usize {
        self.live.get()
    }

    /// Leases handed out so far
    pub fn scheduled(&self) -> u64 {
        self.scheduled.get()
    }

    /// Generation of the most recent lease
    pub fn last_generation(&self) -> Option<u64> {
        self.last_generation.get()
    }
}

impl TickSource for ManualTicker {
    type Lease = ManualLease;

    fn schedule(&mut self, generation: u64) -> ManualLease {
        self.live.set(self.live.get() + 1);
        self.scheduled.set(self.scheduled.get() + 1);
        self.last_generation.set(Some(generation));
        ManualLease {
            live: Rc::clone(&self.live),
        }
    }
}

/// Lease handed out by [`ManualTicker`]
#[derive(Debug)]
pub struct ManualLease {
    live: Rc<Cell<usize>>,
}

impl Drop for ManualLease {
    fn drop(&mut self) {
        self.live.set(self.live.get() - 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn test_lease_ticks_once_per_period() {
        let (tx, mut rx) = mpsc::unbounded_channel::<Tick>();
        let mut ticker = IntervalTicker::new(tx, Duration::from_secs(1));

        let started = Instant::now();
        let lease = ticker.schedule(7);
        assert_eq!(lease.generation(), 7);

        for n in 1..=3u64 {
            let tick = rx.recv().await.unwrap();
            assert_eq!(tick.generation, 7);
            let elapsed = started.elapsed();
            assert!(elapsed >= Duration::from_secs(n));
            assert!(elapsed < Duration::from_secs(n) + Duration::from_millis(100));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_lease_stops_ticks() {
        let (tx, mut rx) = mpsc::unbounded_channel::<Tick>();
        let mut ticker = IntervalTicker::new(tx, Duration::from_secs(1));

        let lease = ticker.schedule(1);
        assert!(rx.recv().await.is_some());
        drop(lease);

        let next = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await;
        assert!(next.is_err(), "no tick expected after the lease is released");
    }

    #[test]
    fn test_manual_ticker_counts_live_leases() {
        let mut ticker = ManualTicker::new();
        let probe = ticker.clone();

        let first = ticker.schedule(1);
        assert_eq!(probe.live(), 1);
        let second = ticker.schedule(2);
        assert_eq!(probe.live(), 2);
        assert_eq!(probe.last_generation(), Some(2));

        drop(first);
        drop(second);
        assert_eq!(probe.live(), 0);
        assert_eq!(probe.scheduled(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_lease_carries_new_generation() {
        let (tx, mut rx) = mpsc::unbounded_channel::<Tick>();
        let mut ticker = IntervalTicker::new(tx, Duration::from_millis(500));

        drop(ticker.schedule(1));
        let _lease = ticker.schedule(2);

        let tick = rx.recv().await.unwrap();
        assert_eq!(tick.generation, 2);
    }
}
