//! Ledger state
//!
//! One explicit object owns every map; there are no ambient singletons.
//! All mutation goes through the command handlers in `governance`,
//! `flights`, `oracle`, and `insurance`, which run on the single actor
//! task, so no handler ever observes a partially-applied write.

use crate::{
    config::Config,
    indexes::IndexSource,
    metrics::Metrics,
    types::{
        Address, Airline, AirlineStatus, Flight, FlightKey, InsurancePolicy, Oracle, OracleRequest,
        RequestKey,
    },
    Error, Result,
};
use rust_decimal::Decimal;
use std::collections::HashMap;
use surety_events::{EventBus, Notification};

/// Authoritative ledger state
pub struct LedgerState {
    pub(crate) config: Config,
    pub(crate) airlines: HashMap<Address, Airline>,
    pub(crate) flights: HashMap<FlightKey, Flight>,
    pub(crate) policies: HashMap<FlightKey, Vec<InsurancePolicy>>,
    pub(crate) oracles: HashMap<Address, Oracle>,
    pub(crate) requests: HashMap<RequestKey, OracleRequest>,
    pub(crate) balances: HashMap<Address, Decimal>,
    pub(crate) index_source: Box<dyn IndexSource>,
    pub(crate) bus: EventBus,
    pub(crate) metrics: Metrics,
}

impl LedgerState {
    /// Create the ledger and seed the genesis airline
    pub fn new(
        config: Config,
        index_source: Box<dyn IndexSource>,
        bus: EventBus,
        metrics: Metrics,
    ) -> Self {
        let genesis = Airline::new(
            Address::new(config.genesis_airline.address.clone()),
            config.genesis_airline.name.clone(),
            AirlineStatus::Registered,
        );

        let mut airlines = HashMap::new();
        airlines.insert(genesis.address.clone(), genesis);

        Self {
            config,
            airlines,
            flights: HashMap::new(),
            policies: HashMap::new(),
            oracles: HashMap::new(),
            requests: HashMap::new(),
            balances: HashMap::new(),
            index_source,
            bus,
            metrics,
        }
    }

    /// Publish a notification on the bus
    pub(crate) fn emit(&self, notification: Notification) {
        self.bus.publish(notification);
    }

    /// Reject unless the caller is a Funded airline
    pub(crate) fn require_funded(&self, caller: &Address) -> Result<()> {
        match self.airlines.get(caller) {
            Some(airline) if airline.status == AirlineStatus::Funded => Ok(()),
            _ => Err(Error::Unauthorized(format!(
                "{} is not a funded airline",
                caller
            ))),
        }
    }

    /// Airlines counting toward the admitted set (Registered or Funded)
    pub(crate) fn admitted_count(&self) -> usize {
        self.airlines
            .values()
            .filter(|a| a.status.is_admitted())
            .count()
    }

    /// Airlines with full voting rights
    pub fn funded_count(&self) -> usize {
        self.airlines
            .values()
            .filter(|a| a.status == AirlineStatus::Funded)
            .count()
    }

    /// Look up an airline
    pub fn airline(&self, address: &Address) -> Option<&Airline> {
        self.airlines.get(address)
    }

    /// Look up a flight
    pub fn flight(&self, key: &FlightKey) -> Option<&Flight> {
        self.flights.get(key)
    }

    /// All registered flights
    pub fn flights(&self) -> Vec<Flight> {
        self.flights.values().cloned().collect()
    }

    /// Policies held on a flight
    pub fn policies(&self, key: &FlightKey) -> Vec<InsurancePolicy> {
        self.policies.get(key).cloned().unwrap_or_default()
    }

    /// Look up an oracle
    pub fn oracle(&self, address: &Address) -> Option<&Oracle> {
        self.oracles.get(address)
    }

    /// A passenger's accumulated withdrawal balance
    pub fn withdrawal_balance(&self, passenger: &Address) -> Decimal {
        self.balances.get(passenger).copied().unwrap_or(Decimal::ZERO)
    }
}

impl std::fmt::Debug for LedgerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerState")
            .field("airlines", &self.airlines.len())
            .field("flights", &self.flights.len())
            .field("oracles", &self.oracles.len())
            .field("open_requests", &self.requests.len())
            .finish()
    }
}
