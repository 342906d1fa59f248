//! Cancellable auto-refresh timer.

use crate::session::DashboardEvent;
use crate::weather::page::WeatherEvent;
use log::debug;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

struct Running {
    interval: Duration,
    generation: u64,
    token: CancellationToken,
}

/// Sends [`WeatherEvent::Tick`] into a session's event queue every interval while running.
///
/// The timer task is cancelled by [`stop`](Self::stop), by reconfiguring with a new
/// interval, and when the driver is dropped. Every start gets a new generation number
/// that its ticks carry, so ticks still queued from an earlier timer can be told apart.
pub struct RefreshDriver {
    sender: mpsc::Sender<DashboardEvent>,
    running: Option<Running>,
    generations: u64,
}

impl RefreshDriver {
    pub fn new(sender: mpsc::Sender<DashboardEvent>) -> Self {
        Self {
            sender,
            running: None,
            generations: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn interval(&self) -> Option<Duration> {
        self.running.as_ref().map(|running| running.interval)
    }

    /// Generation of the running timer.
    pub fn generation(&self) -> Option<u64> {
        self.running.as_ref().map(|running| running.generation)
    }

    /// Whether a tick of `generation` came from the timer that is running now.
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation() == Some(generation)
    }

    /// Runs the timer with `interval`, or stops it for `None`. A running timer with the
    /// same interval is left alone so its phase is kept.
    pub fn configure(&mut self, interval: Option<Duration>) {
        match interval {
            Some(interval) if self.interval() == Some(interval) => {}
            Some(interval) => self.start(interval),
            None => self.stop(),
        }
    }

    fn start(&mut self, interval: Duration) {
        self.stop();
        self.generations += 1;
        let generation = self.generations;
        debug!("Starting auto refresh every {:?} (generation {})", interval, generation);

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let sender = self.sender.clone();
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {
                        if sender.send(DashboardEvent::Weather(WeatherEvent::Tick(generation))).await.is_err() {
                            break;
                        }
                    }
                }
            }
        });
        self.running = Some(Running {
            interval,
            generation,
            token,
        });
    }

    pub fn stop(&mut self) {
        if let Some(running) = self.running.take() {
            debug!("Stopping auto refresh (generation {})", running.generation);
            running.token.cancel();
        }
    }
}

impl Drop for RefreshDriver {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_ticks_until_stopped() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut driver = RefreshDriver::new(tx);
        driver.configure(Some(Duration::from_secs(10)));

        let started = Instant::now();
        for _ in 0..2 {
            assert_eq!(
                rx.recv().await,
                Some(DashboardEvent::Weather(WeatherEvent::Tick(1)))
            );
        }
        assert_eq!(started.elapsed(), Duration::from_secs(20));

        driver.stop();
        assert!(!driver.is_running());
        let quiet = tokio::time::timeout(Duration::from_secs(60), rx.recv()).await;
        assert!(quiet.is_err(), "no ticks after stop");
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconfigure_restarts_with_new_interval() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut driver = RefreshDriver::new(tx);
        driver.configure(Some(Duration::from_secs(100)));
        driver.configure(Some(Duration::from_secs(15)));
        assert_eq!(driver.interval(), Some(Duration::from_secs(15)));

        assert_eq!(driver.generation(), Some(2));
        assert!(!driver.is_current(1));

        let started = Instant::now();
        assert_eq!(
            rx.recv().await,
            Some(DashboardEvent::Weather(WeatherEvent::Tick(2)))
        );
        assert_eq!(started.elapsed(), Duration::from_secs(15));

        // Same interval keeps the running timer.
        driver.configure(Some(Duration::from_secs(15)));
        assert_eq!(driver.generation(), Some(2));

        driver.configure(None);
        assert_eq!(driver.interval(), None);
        assert!(!driver.is_current(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_timer() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut driver = RefreshDriver::new(tx);
        driver.configure(Some(Duration::from_secs(10)));
        drop(driver);

        // Every sender is gone once the task observes cancellation.
        assert_eq!(rx.recv().await, None);
    }
}
