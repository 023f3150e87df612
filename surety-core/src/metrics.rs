//! Metrics collection for observability
//!
//! Prometheus counters for monitoring the ledger:
//!
//! - `surety_commands_accepted_total` - Commands applied
//! - `surety_commands_rejected_total` - Commands rejected (state unchanged)
//! - `surety_oracle_reports_total` - Oracle reports recorded
//! - `surety_flights_resolved_total` - Flights finalized by quorum
//! - `surety_policies_settled_total` - Policies credited at settlement
//! - `surety_withdrawals_total` - Balances withdrawn

use prometheus::{IntCounter, Registry};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Commands applied
    pub commands_accepted: IntCounter,

    /// Commands rejected
    pub commands_rejected: IntCounter,

    /// Oracle reports recorded
    pub oracle_reports: IntCounter,

    /// Flights finalized by quorum
    pub flights_resolved: IntCounter,

    /// Policies credited at settlement
    pub policies_settled: IntCounter,

    /// Balances withdrawn
    pub withdrawals: IntCounter,

    /// Prometheus registry
    registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector with its own registry
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let commands_accepted =
            IntCounter::new("surety_commands_accepted_total", "Commands applied")?;
        registry.register(Box::new(commands_accepted.clone()))?;

        let commands_rejected =
            IntCounter::new("surety_commands_rejected_total", "Commands rejected")?;
        registry.register(Box::new(commands_rejected.clone()))?;

        let oracle_reports =
            IntCounter::new("surety_oracle_reports_total", "Oracle reports recorded")?;
        registry.register(Box::new(oracle_reports.clone()))?;

        let flights_resolved =
            IntCounter::new("surety_flights_resolved_total", "Flights finalized by quorum")?;
        registry.register(Box::new(flights_resolved.clone()))?;

        let policies_settled =
            IntCounter::new("surety_policies_settled_total", "Policies credited at settlement")?;
        registry.register(Box::new(policies_settled.clone()))?;

        let withdrawals = IntCounter::new("surety_withdrawals_total", "Balances withdrawn")?;
        registry.register(Box::new(withdrawals.clone()))?;

        Ok(Self {
            commands_accepted,
            commands_rejected,
            oracle_reports,
            flights_resolved,
            policies_settled,
            withdrawals,
            registry,
        })
    }

    /// Record a command outcome
    pub fn record_command(&self, accepted: bool) {
        if accepted {
            self.commands_accepted.inc();
        } else {
            self.commands_rejected.inc();
        }
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("commands_accepted", &self.commands_accepted.get())
            .field("commands_rejected", &self.commands_rejected.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        assert_eq!(metrics.commands_accepted.get(), 0);
        assert_eq!(metrics.oracle_reports.get(), 0);
    }

    #[test]
    fn test_record_command() {
        let metrics = Metrics::new().unwrap();
        metrics.record_command(true);
        metrics.record_command(true);
        metrics.record_command(false);
        assert_eq!(metrics.commands_accepted.get(), 2);
        assert_eq!(metrics.commands_rejected.get(), 1);
    }

    #[test]
    fn test_independent_registries() {
        // Two collectors must not clash on metric names
        let a = Metrics::new().unwrap();
        let b = Metrics::new().unwrap();
        a.oracle_reports.inc();
        assert_eq!(b.oracle_reports.get(), 0);
    }
}
