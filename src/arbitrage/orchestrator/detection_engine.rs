//! Detection Engine Module
//!
//! Polling fan-out and the synchronous strategy pass that follows it.

use super::core::ArbitrageOrchestrator;
use crate::arbitrage::{strategy::MarketSnapshot, types::TradeIntent};
use crate::dex::PoolId;

use chrono::Utc;
use futures::future::join_all;
use log::{debug, warn};
use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};
use tokio::time::timeout;

/// What happened to this tick's quote requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub timed_out: usize,
}

impl ArbitrageOrchestrator {
    /// Quotes every pool concurrently. Each finished quote goes into the cache right
    /// away, so whatever completed before `deadline` is visible to this tick; the rest
    /// are abandoned and their pools keep the last-known observation.
    pub(crate) async fn poll_pools(&self, deadline: Duration) -> PollSummary {
        let succeeded = AtomicUsize::new(0);
        let failed = AtomicUsize::new(0);
        let total = self.pools.len();

        let polls = self.pools.iter().map(|(pool_id, adapter)| {
            let succeeded = &succeeded;
            let failed = &failed;
            async move {
                match adapter.get_quote(pool_id).await {
                    Ok(observation) => {
                        self.price_cache.update(observation);
                        succeeded.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(e) => {
                        warn!(
                            "⚠️ Quote failed for pool {} ({} {}): {}; keeping last observation",
                            pool_id,
                            adapter.spec().venue,
                            adapter.spec().address,
                            e
                        );
                        failed.fetch_add(1, Ordering::SeqCst);
                    }
                }
            }
        });

        if timeout(deadline, join_all(polls)).await.is_err() {
            debug!("Polling deadline of {:?} reached", deadline);
        }

        let succeeded = succeeded.load(Ordering::SeqCst);
        let failed = failed.load(Ordering::SeqCst);
        let summary = PollSummary {
            succeeded,
            failed,
            timed_out: total.saturating_sub(succeeded + failed),
        };
        if summary.timed_out > 0 {
            warn!(
                "⏱️ {} of {} pools did not answer within {:?}; using stale data",
                summary.timed_out, total, deadline
            );
        }
        self.metrics.record_polls(
            summary.succeeded as u64,
            summary.failed as u64,
            summary.timed_out as u64,
        );
        summary
    }

    /// Runs every strategy, in registration order, against one snapshot of the cache.
    /// Strategies with a never-observed subscription are skipped. Returns the intents
    /// in emission order and the number of skipped strategies.
    pub(crate) fn evaluate_strategies(&mut self) -> (Vec<TradeIntent>, usize) {
        let snapshot = MarketSnapshot::new(
            self.price_cache.snapshot(),
            &self.pools,
            &self.coins,
            Utc::now(),
        );

        let mut intents = Vec::new();
        let mut skipped = 0;
        for strategy in self.strategies.iter_mut() {
            let missing: Vec<PoolId> = strategy
                .subscriptions()
                .iter()
                .filter(|id| snapshot.observation(id).is_none())
                .copied()
                .collect();
            if !missing.is_empty() {
                debug!(
                    "Skipping {}: no observation yet for {} pool(s)",
                    strategy.name(),
                    missing.len()
                );
                skipped += 1;
                continue;
            }
            let emitted = strategy.evaluate(&snapshot);
            if !emitted.is_empty() {
                debug!("{} emitted {} intent(s)", strategy.name(), emitted.len());
            }
            intents.extend(emitted);
        }

        self.metrics
            .record_evaluation(intents.len() as u64, skipped as u64);
        (intents, skipped)
    }

    pub(crate) fn warn_stale_pools(&self) {
        let Some(max_age) = self.limits.stale_after else {
            return;
        };
        let Ok(max_age) = chrono::Duration::from_std(max_age) else {
            return;
        };
        for pool_id in self.price_cache.stale_pools(Utc::now(), max_age) {
            warn!("🕰️ Pool {} has no fresh observation for over {}s", pool_id, max_age.num_seconds());
        }
    }
}
