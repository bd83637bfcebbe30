//! Timer service for recognizers
//!
//! Press and click timeouts need one-shot timers, but the coordinator never
//! schedules its own work: a recognizer asks the [`TimerService`] for a
//! deadline and returns; the callback firing later is a fresh top-level call
//! into the state machine.
//!
//! The service itself is driven by the host. Either poll it from the event
//! loop:
//!
//! ```rust,ignore
//! loop {
//!     // ... handle events ...
//!     timers.check_timers();
//!     // ... paint ...
//! }
//! ```
//!
//! or, with a tokio runtime around, let it drive itself until told to stop:
//!
//! ```rust,ignore
//! let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
//! tokio::spawn(timers.clone().run_until_shutdown(shutdown_rx));
//! // ...
//! let _ = shutdown_tx.send(());
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use smallvec::SmallVec;

/// Counter for unique timer IDs.
static TIMER_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

impl TimerId {
    fn next() -> Self {
        Self(TIMER_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw ID value.
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Handle to a scheduled timer. Cheap to clone; cancelling is idempotent.
#[derive(Clone)]
pub struct TimerHandle {
    id: TimerId,
    cancelled: Arc<AtomicBool>,
}

impl TimerHandle {
    fn new(id: TimerId) -> Self {
        Self {
            id,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Cancels the timer; its callback will not run.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether the timer has been cancelled.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// The timer's unique ID.
    #[inline]
    pub fn id(&self) -> TimerId {
        self.id
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle")
            .field("id", &self.id)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

struct TimerEntry {
    deadline: Instant,
    callback: Box<dyn FnOnce() + Send + 'static>,
    cancelled: Arc<AtomicBool>,
}

impl TimerEntry {
    #[inline]
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Schedules one-shot callbacks for gesture deadlines.
///
/// Cheap `Clone` handle; all clones share the same queue.
#[derive(Clone)]
pub struct TimerService {
    /// Pending timers, sorted by deadline (earliest first).
    timers: Arc<Mutex<Vec<TimerEntry>>>,
}

impl TimerService {
    /// Creates an empty timer service.
    pub fn new() -> Self {
        Self {
            timers: Arc::new(Mutex::new(Vec::with_capacity(4))),
        }
    }

    /// Schedules `callback` to run once `duration` has elapsed.
    pub fn schedule<F>(&self, duration: Duration, callback: F) -> TimerHandle
    where
        F: FnOnce() + Send + 'static,
    {
        self.schedule_at(Instant::now() + duration, callback)
    }

    /// Schedules `callback` for a specific instant.
    pub fn schedule_at<F>(&self, deadline: Instant, callback: F) -> TimerHandle
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = TimerHandle::new(TimerId::next());
        let entry = TimerEntry {
            deadline,
            callback: Box::new(callback),
            cancelled: handle.cancelled.clone(),
        };

        let mut timers = self.timers.lock();
        let pos = timers
            .binary_search_by(|e| e.deadline.cmp(&deadline))
            .unwrap_or_else(|pos| pos);
        timers.insert(pos, entry);

        handle
    }

    /// Fires every expired timer. Returns how many fired.
    pub fn check_timers(&self) -> usize {
        let now = Instant::now();

        // take the ready prefix under the lock, run callbacks outside it
        let ready: SmallVec<[TimerEntry; 4]> = {
            let mut timers = self.timers.lock();
            timers.retain(|e| !e.is_cancelled());
            let ready_count = timers.iter().take_while(|e| e.deadline <= now).count();
            timers.drain(0..ready_count).collect()
        };

        let mut fired = 0;
        for entry in ready {
            if !entry.is_cancelled() {
                (entry.callback)();
                fired += 1;
            }
        }
        fired
    }

    /// Time until the next live timer is due; `None` with nothing pending.
    pub fn time_until_next(&self) -> Option<Duration> {
        let timers = self.timers.lock();
        timers
            .iter()
            .find(|e| !e.is_cancelled())
            .map(|e| e.deadline.saturating_duration_since(Instant::now()))
    }

    /// Whether any live timer is pending.
    pub fn has_pending(&self) -> bool {
        self.timers.lock().iter().any(|e| !e.is_cancelled())
    }

    /// Number of live pending timers.
    pub fn pending_count(&self) -> usize {
        self.timers.lock().iter().filter(|e| !e.is_cancelled()).count()
    }

    /// Drops every pending timer without firing it.
    pub fn cancel_all(&self) {
        self.timers.lock().clear();
    }

    /// Drives the service on a tokio runtime until the shutdown signal
    /// arrives.
    pub async fn run_until_shutdown(self, mut shutdown: tokio::sync::oneshot::Receiver<()>) {
        loop {
            self.check_timers();

            let wait = self
                .time_until_next()
                .unwrap_or(Duration::from_millis(50))
                .min(Duration::from_millis(50));

            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = &mut shutdown => {
                    tracing::trace!("timer service shutting down");
                    break;
                }
            }
        }
    }
}

impl Default for TimerService {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TimerService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerService")
            .field("pending", &self.pending_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_fires() {
        let timers = TimerService::new();
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();

        timers.schedule(Duration::ZERO, move || {
            flag.store(true, Ordering::SeqCst);
        });

        assert_eq!(timers.check_timers(), 1);
        assert!(fired.load(Ordering::SeqCst));
        assert!(!timers.has_pending());
    }

    #[test]
    fn test_cancelled_timer_does_not_fire() {
        let timers = TimerService::new();
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();

        let handle = timers.schedule(Duration::ZERO, move || {
            flag.store(true, Ordering::SeqCst);
        });
        handle.cancel();
        assert!(handle.is_cancelled());

        assert_eq!(timers.check_timers(), 0);
        assert!(!fired.load(Ordering::SeqCst));
    }

    #[test]
    fn test_future_timer_stays_pending() {
        let timers = TimerService::new();
        timers.schedule(Duration::from_secs(3600), || {});

        assert_eq!(timers.check_timers(), 0);
        assert!(timers.has_pending());
        assert!(timers.time_until_next().is_some());
    }

    #[test]
    fn test_cancel_all() {
        let timers = TimerService::new();
        timers.schedule(Duration::from_millis(10), || {});
        timers.schedule(Duration::from_millis(20), || {});
        assert_eq!(timers.pending_count(), 2);

        timers.cancel_all();
        assert_eq!(timers.pending_count(), 0);
    }

    #[test]
    fn test_timer_ids_unique() {
        let timers = TimerService::new();
        let a = timers.schedule(Duration::from_millis(1), || {});
        let b = timers.schedule(Duration::from_millis(1), || {});
        assert_ne!(a.id(), b.id());
    }

    #[tokio::test]
    async fn test_run_until_shutdown() {
        let timers = TimerService::new();
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();

        timers.schedule(Duration::from_millis(5), move || {
            flag.store(true, Ordering::SeqCst);
        });

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let runner = tokio::spawn(timers.clone().run_until_shutdown(shutdown_rx));

        tokio::time::sleep(Duration::from_millis(100)).await;
        let _ = shutdown_tx.send(());
        runner.await.unwrap();

        assert!(fired.load(Ordering::SeqCst));
    }
}
