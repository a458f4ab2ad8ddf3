use crate::error::ArbError;
use std::sync::atomic::{AtomicU64, Ordering};

/// Summary line frequency, in ticks.
pub const SUMMARY_EVERY_TICKS: u64 = 60;

/// Runtime counters for the scheduler. Lock-free; updated from the tick loop and
/// from spawned execution tasks.
#[derive(Debug, Default)]
pub struct OrchestratorMetrics {
    // Polling.
    ticks: AtomicU64,
    quotes_ok: AtomicU64,
    quotes_failed: AtomicU64,
    quotes_timed_out: AtomicU64,

    // Strategy output.
    intents_emitted: AtomicU64,
    strategies_skipped: AtomicU64,

    // Dispatch.
    dropped_contention: AtomicU64,
    dropped_gas: AtomicU64,
    dropped_other: AtomicU64,
    executions_ok: AtomicU64,
    executions_failed: AtomicU64,
    gas_spent: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub ticks: u64,
    pub quotes_ok: u64,
    pub quotes_failed: u64,
    pub quotes_timed_out: u64,
    pub intents_emitted: u64,
    pub strategies_skipped: u64,
    pub dropped_contention: u64,
    pub dropped_gas: u64,
    pub dropped_other: u64,
    pub executions_ok: u64,
    pub executions_failed: u64,
    pub gas_spent: u64,
}

impl OrchestratorMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the new tick count.
    pub fn record_tick(&self) -> u64 {
        self.ticks.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn record_polls(&self, ok: u64, failed: u64, timed_out: u64) {
        self.quotes_ok.fetch_add(ok, Ordering::Relaxed);
        self.quotes_failed.fetch_add(failed, Ordering::Relaxed);
        self.quotes_timed_out.fetch_add(timed_out, Ordering::Relaxed);
    }

    pub fn record_evaluation(&self, intents: u64, skipped: u64) {
        self.intents_emitted.fetch_add(intents, Ordering::Relaxed);
        self.strategies_skipped.fetch_add(skipped, Ordering::Relaxed);
    }

    pub fn record_drop(&self, reason: &ArbError) {
        let counter = match reason {
            ArbError::LockContention(_) => &self.dropped_contention,
            ArbError::GasPriceExceeded { .. } => &self.dropped_gas,
            _ => &self.dropped_other,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_execution(&self, success: bool, gas_used: u64) {
        if success {
            self.executions_ok.fetch_add(1, Ordering::Relaxed);
            self.gas_spent.fetch_add(gas_used, Ordering::Relaxed);
        } else {
            self.executions_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            ticks: self.ticks.load(Ordering::Relaxed),
            quotes_ok: self.quotes_ok.load(Ordering::Relaxed),
            quotes_failed: self.quotes_failed.load(Ordering::Relaxed),
            quotes_timed_out: self.quotes_timed_out.load(Ordering::Relaxed),
            intents_emitted: self.intents_emitted.load(Ordering::Relaxed),
            strategies_skipped: self.strategies_skipped.load(Ordering::Relaxed),
            dropped_contention: self.dropped_contention.load(Ordering::Relaxed),
            dropped_gas: self.dropped_gas.load(Ordering::Relaxed),
            dropped_other: self.dropped_other.load(Ordering::Relaxed),
            executions_ok: self.executions_ok.load(Ordering::Relaxed),
            executions_failed: self.executions_failed.load(Ordering::Relaxed),
            gas_spent: self.gas_spent.load(Ordering::Relaxed),
        }
    }

    /// One-line summary of all counters.
    pub fn report(&self) -> String {
        let s = self.snapshot();
        format!(
            "Ticks: {}. Quotes - ok: {}, failed: {}, timed out: {}. \
             Intents - emitted: {}, strategies skipped: {}. \
             Dropped - contention: {}, gas: {}, other: {}. \
             Executions - ok: {}, failed: {}, gas spent: {} MIST.",
            s.ticks,
            s.quotes_ok,
            s.quotes_failed,
            s.quotes_timed_out,
            s.intents_emitted,
            s.strategies_skipped,
            s.dropped_contention,
            s.dropped_gas,
            s.dropped_other,
            s.executions_ok,
            s.executions_failed,
            s.gas_spent
        )
    }
}
