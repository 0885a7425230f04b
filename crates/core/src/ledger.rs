//! Shared run-session state: the append-only record log with its aggregate
//! counters, and the cooperative run flag.

use crate::records::{TradeOutcome, TradeRecord};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;

/// Running totals folded from every recorded outcome of the session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub stake_total: Decimal,
    pub payout_total: Decimal,
    pub wins: u64,
    pub losses: u64,
    pub profit: Decimal,
}

impl AggregateStats {
    /// Folds one outcome into the totals. Wins and losses are counted from
    /// the sign of the realized result, so Even and failure statuses move
    /// neither counter.
    pub fn apply(&mut self, outcome: &TradeOutcome) {
        self.stake_total += outcome.stake;
        self.payout_total += outcome.payout;
        self.profit += outcome.profit_loss;
        if outcome.profit_loss > Decimal::ZERO {
            self.wins += 1;
        } else if outcome.profit_loss < Decimal::ZERO {
            self.losses += 1;
        }
    }
}

#[derive(Debug, Default)]
struct LedgerInner {
    records: Vec<TradeRecord>,
    stats: AggregateStats,
}

/// Append-only session ledger.
///
/// One lock guards the append together with the stats update, so recording
/// is atomic: concurrent trades finishing simultaneously can neither corrupt
/// the totals nor interleave a partial record. Each record is also
/// republished on a broadcast channel for live consumers; a consumer that
/// falls behind misses broadcasts but the log itself is complete.
#[derive(Debug)]
pub struct TradeLedger {
    inner: Mutex<LedgerInner>,
    events: broadcast::Sender<TradeRecord>,
}

impl Default for TradeLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl TradeLedger {
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(1024);
        Self {
            inner: Mutex::new(LedgerInner::default()),
            events,
        }
    }

    /// Appends a record, folding outcomes into the aggregate totals, and
    /// republishes it to subscribers.
    pub fn record(&self, record: TradeRecord) {
        let mut inner = self.inner.lock();
        if let TradeRecord::Outcome(outcome) = &record {
            inner.stats.apply(outcome);
        }
        inner.records.push(record.clone());
        // Publishing under the lock keeps the stream in log order.
        let _ = self.events.send(record);
    }

    /// Snapshot of the aggregate totals.
    #[must_use]
    pub fn stats(&self) -> AggregateStats {
        self.inner.lock().stats.clone()
    }

    /// Snapshot of the full record log.
    #[must_use]
    pub fn records(&self) -> Vec<TradeRecord> {
        self.inner.lock().records.clone()
    }

    /// Number of records, markers included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().records.is_empty()
    }

    /// Number of trade outcomes, markers excluded.
    #[must_use]
    pub fn outcome_count(&self) -> usize {
        self.inner
            .lock()
            .records
            .iter()
            .filter(|record| !record.is_marker())
            .count()
    }

    /// Clears the log and totals for a new run session. Subscriptions stay
    /// valid across the reset.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.records.clear();
        inner.stats = AggregateStats::default();
    }

    /// Subscribes to records as they are appended.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TradeRecord> {
        self.events.subscribe()
    }
}

/// Cooperative cancellation flag for the continuous runner.
///
/// Reads and writes are relaxed on purpose: staleness of at most one loop
/// iteration is acceptable, and in-flight trades are never forcibly aborted.
#[derive(Debug, Default)]
pub struct RunControl {
    running: AtomicBool,
}

impl RunControl {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self) {
        self.running.store(true, Ordering::Relaxed);
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}
