//! Prometheus counters for live comment delivery.
//!
//! Counters are owned by each bus rather than the global registry so that
//! independent buses (and tests) never collide on registration.

use prometheus::{IntCounterVec, Opts, Registry};

#[derive(Clone)]
pub struct NotifierMetrics {
    deliveries: IntCounterVec,
}

impl NotifierMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let deliveries = IntCounterVec::new(
            Opts::new(
                "board_notifier_deliveries_total",
                "Live comment delivery attempts by outcome",
            ),
            &["outcome"],
        )?;

        Ok(Self { deliveries })
    }

    /// Expose the counters through a caller-owned registry.
    pub fn register(&self, registry: &Registry) -> prometheus::Result<()> {
        registry.register(Box::new(self.deliveries.clone()))
    }

    pub(crate) fn record(&self, delivered: usize, dropped: usize, closed: usize) {
        self.deliveries
            .with_label_values(&["delivered"])
            .inc_by(delivered as u64);
        self.deliveries
            .with_label_values(&["dropped"])
            .inc_by(dropped as u64);
        self.deliveries
            .with_label_values(&["closed"])
            .inc_by(closed as u64);
    }

    pub fn count(&self, outcome: &str) -> u64 {
        self.deliveries.with_label_values(&[outcome]).get()
    }
}

impl Default for NotifierMetrics {
    fn default() -> Self {
        Self::new().expect("static metric options are valid")
    }
}
