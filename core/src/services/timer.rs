use tokio::task::JoinHandle;
use tokio::time::{self, Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Handle to a repeating timer. Dropping the handle stops the timer.
pub struct IntervalHandle {
    id: String,
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl IntervalHandle {
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Stop the timer and wait for the task to wind down.
    pub async fn cancel(mut self) {
        debug!(timer = %self.id, "cancelling timer");
        self.token.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for IntervalHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Spawn a repeating timer that calls `on_tick` every `period`.
///
/// The first tick fires one full period after spawning. Must be called from
/// within a tokio runtime. A zero period, or one too large to schedule, yields
/// a handle that is already cancelled and never ticks.
pub fn spawn_interval<F>(id: impl Into<String>, period: Duration, mut on_tick: F) -> IntervalHandle
where
    F: FnMut() + Send + 'static,
{
    let id = id.into();
    let token = CancellationToken::new();
    let start = match Instant::now().checked_add(period) {
        Some(start) if !period.is_zero() => start,
        _ => {
            warn!(timer = %id, ?period, "period cannot be scheduled, timer not started");
            token.cancel();
            return IntervalHandle {
                id,
                token,
                task: None,
            };
        }
    };
    let child = token.clone();
    let timer_id = id.clone();
    let task = tokio::spawn(async move {
        let mut interval = time::interval_at(start, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                biased;
                _ = child.cancelled() => break,
                _ = interval.tick() => on_tick(),
            }
        }
        debug!(timer = %timer_id, "timer stopped");
    });
    IntervalHandle {
        id,
        token,
        task: Some(task),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    #[tokio::test(start_paused = true)]
    async fn ticks_after_each_period() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let handle = spawn_interval("t", Duration::from_secs(10), move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        time::sleep(Duration::from_secs(26)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
        handle.cancel().await;
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_ticks() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let handle = spawn_interval("t", Duration::from_secs(1), move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        time::sleep(Duration::from_millis(1500)).await;
        handle.cancel().await;
        let seen = count.load(Ordering::SeqCst);
        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(count.load(Ordering::SeqCst), seen);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_stops_ticks() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let handle = spawn_interval("t", Duration::from_secs(1), move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        drop(handle);
        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn unschedulable_period_is_refused() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let huge = spawn_interval("huge", Duration::MAX, move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        assert!(huge.is_cancelled());
        let zero = spawn_interval("zero", Duration::ZERO, || {});
        assert!(zero.is_cancelled());
        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        huge.cancel().await;
        zero.cancel().await;
    }
}
