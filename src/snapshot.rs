//! Last successfully observed value per metric.

use crate::extract::{Extraction, Metric};

/// Last-known-good values, seeded to zero.
///
/// A value is only ever replaced by a fresh extraction; stale results are
/// read from here and never written back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LastKnown {
    observed_nonce: u64,
    claim_event_nonce: u64,
    pending_valsets: u64,
    pending_batches: u64,
}

impl LastKnown {
    pub fn get(&self, metric: Metric) -> u64 {
        match metric {
            Metric::ObservedNonce   => self.observed_nonce,
            Metric::ClaimEventNonce => self.claim_event_nonce,
            Metric::PendingValsets  => self.pending_valsets,
            Metric::PendingBatches  => self.pending_batches,
        }
    }

    /// Fold one extraction result into the cache. Returns the value to
    /// publish.
    pub fn record(&mut self, metric: Metric, extraction: Extraction) -> u64 {
        if extraction.stale {
            return self.get(metric);
        }
        let slot = match metric {
            Metric::ObservedNonce   => &mut self.observed_nonce,
            Metric::ClaimEventNonce => &mut self.claim_event_nonce,
            Metric::PendingValsets  => &mut self.pending_valsets,
            Metric::PendingBatches  => &mut self.pending_batches,
        };
        *slot = extraction.value;
        extraction.value
    }
}
