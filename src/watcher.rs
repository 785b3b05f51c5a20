use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};

use crate::availability::{AvailabilityCheck, CheckWindow};
use crate::notifier::{Notify, NotifyError};

/// Lifecycle of the watcher. `Notified` is terminal for the process;
/// a restart is the only way back to `Awaiting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    Awaiting,
    Notified,
}

/// Poll-and-notify driver: checks availability on a fixed interval and
/// sends the alert SMS exactly once, the first time a send succeeds.
pub struct Watcher<C, N> {
    checker: C,
    notifier: N,
    window: CheckWindow,
    recipient: String,
    poll_interval: Duration,
    state: WatcherState,
}

impl<C, N> Watcher<C, N>
where
    C: AvailabilityCheck,
    N: Notify,
{
    pub fn new(
        checker: C,
        notifier: N,
        window: CheckWindow,
        recipient: String,
        poll_interval: Duration,
    ) -> Self {
        Self {
            checker,
            notifier,
            window,
            recipient,
            poll_interval,
            state: WatcherState::Awaiting,
        }
    }

    pub fn state(&self) -> WatcherState {
        self.state
    }

    /// One-time greeting naming the tracked park and date, sent regardless
    /// of availability.
    pub async fn send_introduction(&self) -> Result<(), NotifyError> {
        let body = format!(
            "Hi, I'm Bot Iger! I'll send you an alert when a park reservation opens for {} on {}.",
            self.window.park.display_name(),
            self.window.start.format("%A, %B %-d"),
        );
        self.notifier.send(&self.recipient, &body).await?;
        Ok(())
    }

    /// One poll cycle. Failures are logged and swallowed so the next tick
    /// proceeds normally; the cycle is self-healing through the timer.
    pub async fn run_cycle(&mut self) {
        if self.state == WatcherState::Notified {
            return;
        }

        match self.checker.check_availability(&self.window).await {
            Ok(true) => {
                let body = format!(
                    "🚨 There is an open park reservation at {} now!",
                    self.window.park.display_name()
                );
                match self.notifier.send(&self.recipient, &body).await {
                    Ok(_) => {
                        self.state = WatcherState::Notified;
                    }
                    // Availability still holds, so the next cycle retries
                    // the send naturally.
                    Err(e) => tracing::error!("Failed to send availability alert: {}", e),
                }
            }
            Ok(false) => {
                tracing::debug!(
                    "No open reservations for {} yet",
                    self.window.park.display_name()
                );
            }
            Err(e) => tracing::error!("Availability check failed: {}", e),
        }
    }

    /// Sends the introduction, then polls until the alert is delivered.
    pub async fn run(&mut self) {
        if let Err(e) = self.send_introduction().await {
            tracing::error!("Failed to send introductory SMS: {}", e);
        }

        tracing::info!(
            "Watching {} from {} to {} (interval: {:?})",
            self.window.park.display_name(),
            self.window.start,
            self.window.end,
            self.poll_interval,
        );

        let mut ticker = time::interval(self.poll_interval);
        // Cycles run sequentially on this task; skipping missed ticks keeps
        // a slow upstream from stacking outbound requests.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        while self.state == WatcherState::Awaiting {
            ticker.tick().await;
            self.run_cycle().await;
        }

        tracing::info!("Alert delivered, polling stopped");
    }
}
