use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Run `work` every `period` until `liveness` is cancelled. The first run
/// happens one period after the call. Ticks where `should_poll` answers
/// `false` are skipped. A failing run is the work's own business: the next
/// tick comes regardless.
pub fn spawn_refresh<P, PF, W, WF>(
    period: Duration,
    liveness: CancellationToken,
    should_poll: P,
    work: W,
) -> JoinHandle<()>
where
    P: Fn() -> PF + Send + 'static,
    PF: Future<Output = bool> + Send,
    W: Fn() -> WF + Send + 'static,
    WF: Future<Output = ()> + Send,
{
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = liveness.cancelled() => break,
                _ = ticker.tick() => {}
            }

            if !should_poll().await {
                debug!("Refresh tick skipped");
                continue;
            }
            debug!("Refresh tick");

            tokio::select! {
                _ = liveness.cancelled() => break,
                _ = work() => {}
            }
        }
        debug!("Refresh stopped");
    })
}

/// Holds the timer of one screen so it can be re-established: starting a
/// new one cancels the previous.
#[derive(Clone, Default)]
pub struct RefreshSlot {
    current: Arc<Mutex<Option<CancellationToken>>>,
}

impl RefreshSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// The new timer is a child of `parent`, so cancelling the parent stops it too.
    pub fn restart<P, PF, W, WF>(&self, parent: &CancellationToken, period: Duration, should_poll: P, work: W)
    where
        P: Fn() -> PF + Send + 'static,
        PF: Future<Output = bool> + Send,
        W: Fn() -> WF + Send + 'static,
        WF: Future<Output = ()> + Send,
    {
        let token = parent.child_token();
        if let Ok(mut current) = self.current.lock() {
            if let Some(previous) = current.replace(token.clone()) {
                previous.cancel();
            }
        }
        spawn_refresh(period, token, should_poll, work);
    }

    pub fn stop(&self) {
        if let Ok(mut current) = self.current.lock() {
            if let Some(previous) = current.take() {
                previous.cancel();
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.current
            .lock()
            .map(|current| current.as_ref().is_some_and(|token| !token.is_cancelled()))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, impl Fn() -> futures_util::future::Ready<()> + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let handle = count.clone();
        let work = move || {
            handle.fetch_add(1, Ordering::SeqCst);
            futures_util::future::ready(())
        };
        (count, work)
    }

    fn always() -> futures_util::future::Ready<bool> {
        futures_util::future::ready(true)
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_run_after_one_period() {
        let token = CancellationToken::new();
        let (count, work) = counter();
        spawn_refresh(Duration::from_secs(30), token.clone(), always, work);

        tokio::time::sleep(Duration::from_secs(29)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
        token.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_ticks() {
        let token = CancellationToken::new();
        let (count, work) = counter();
        let handle = spawn_refresh(Duration::from_secs(30), token.clone(), always, work);

        tokio::time::sleep(Duration::from_secs(31)).await;
        token.cancel();
        handle.await.unwrap();

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_predicate_skips_ticks() {
        let token = CancellationToken::new();
        let (count, work) = counter();
        let enabled = Arc::new(AtomicBool::new(false));
        let flag = enabled.clone();
        spawn_refresh(
            Duration::from_secs(30),
            token.clone(),
            move || futures_util::future::ready(flag.load(Ordering::SeqCst)),
            work,
        );

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        enabled.store(true, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        token.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_cancels_previous_timer() {
        let parent = CancellationToken::new();
        let slot = RefreshSlot::new();
        let (first, work) = counter();
        slot.restart(&parent, Duration::from_secs(30), always, work);

        tokio::time::sleep(Duration::from_secs(20)).await;
        let (second, work) = counter();
        slot.restart(&parent, Duration::from_secs(30), always, work);

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(second.load(Ordering::SeqCst), 1);

        parent.cancel();
        assert!(!slot.is_running());
    }
}
