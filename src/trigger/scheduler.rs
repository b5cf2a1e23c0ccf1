//! Interval-driven polling for hosts without their own poll timer

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{PollBatch, PollState, TriggerMode, poll};
use crate::config::PollingConfig;
use crate::transport::Transport;

/// Runs the trigger on a fixed interval and forwards new batches
///
/// The scheduler owns the watermark while it runs and hands it back from
/// [`PollScheduler::run`] so the host can persist it. Polls never overlap;
/// a failed poll is logged and the next tick tries again with the same
/// watermark.
pub struct PollScheduler {
    transport: Arc<dyn Transport>,
    mode: TriggerMode,
    state: PollState,
    interval: Duration,
}

impl PollScheduler {
    /// Create a scheduler starting from an empty watermark
    pub fn new(transport: Arc<dyn Transport>, mode: TriggerMode, config: &PollingConfig) -> Self {
        Self {
            transport,
            mode,
            state: PollState::default(),
            interval: config.interval,
        }
    }

    /// Resume from a previously persisted watermark
    pub fn with_state(mut self, state: PollState) -> Self {
        self.state = state;
        self
    }

    /// Current watermark
    pub fn state(&self) -> &PollState {
        &self.state
    }

    /// Poll until `cancel` fires or the receiver goes away
    ///
    /// The first poll happens immediately. Returns the final watermark.
    pub async fn run(mut self, batches: mpsc::Sender<PollBatch>, cancel: CancellationToken) -> PollState {
        info!(
            trigger = self.mode.as_str(),
            interval = ?self.interval,
            "poll scheduler started"
        );

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {
                    match poll(self.transport.as_ref(), &self.mode, &mut self.state).await {
                        Ok(Some(batch)) => {
                            debug!(count = batch.records.len(), "forwarding poll batch");
                            if batches.send(batch).await.is_err() {
                                info!("poll batch receiver dropped");
                                break;
                            }
                        }
                        Ok(None) => debug!("no new data"),
                        Err(e) => warn!(error = %e, "scheduled poll failed"),
                    }
                }
            }
        }

        info!(trigger = self.mode.as_str(), "poll scheduler stopped");
        self.state
    }
}
