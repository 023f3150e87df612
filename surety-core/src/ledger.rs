//! Main ledger orchestration layer
//!
//! This module ties state, actor, and event bus together into the
//! high-level API collaborators call.
//!
//! # Example
//!
//! ```no_run
//! use surety_core::{Config, FlightSurety};
//! use surety_core::types::Address;
//! use rust_decimal::Decimal;
//!
//! #[tokio::main]
//! async fn main() -> surety_core::Result<()> {
//!     let surety = FlightSurety::open(Config::default())?;
//!     let genesis = Address::from("0xA1");
//!
//!     surety.fund_airline(&genesis, Decimal::from(10)).await?;
//!     surety.register_flight("FS-100", 1_700_000_000_000, &genesis).await?;
//!
//!     Ok(())
//! }
//! ```

use crate::{
    actor::{spawn_ledger_actor, LedgerHandle},
    indexes::{EntropyIndexSource, IndexSource},
    metrics::Metrics,
    state::LedgerState,
    types::{
        Address, Airline, AirlineStatus, Flight, FlightKey, FlightStatus, InsurancePolicy, Oracle,
    },
    Config, Result,
};
use rust_decimal::Decimal;
use surety_events::{Envelope, EventBus};
use tokio::sync::broadcast;

/// Main ledger interface
///
/// Cloneable; all clones talk to the same single-writer actor.
#[derive(Clone)]
pub struct FlightSurety {
    /// Actor handle for all commands and queries
    handle: LedgerHandle,

    /// Notification bus
    bus: EventBus,

    /// Metrics collector
    metrics: Metrics,
}

impl FlightSurety {
    /// Open the ledger with configuration
    ///
    /// Must be called from within a Tokio runtime; spawns the actor task.
    pub fn open(config: Config) -> Result<Self> {
        Self::open_with_indexes(config, Box::new(EntropyIndexSource::new()))
    }

    /// Open the ledger with an injected index source
    ///
    /// Tests pass a deterministic source so oracle indices are known in
    /// advance.
    pub fn open_with_indexes(config: Config, index_source: Box<dyn IndexSource>) -> Result<Self> {
        config.validate()?;

        let bus = EventBus::new(config.event_capacity);
        let metrics = Metrics::new()?;
        let mailbox_capacity = config.mailbox_capacity;

        let state = LedgerState::new(config, index_source, bus.clone(), metrics.clone());
        let handle = spawn_ledger_actor(state, mailbox_capacity);

        Ok(Self {
            handle,
            bus,
            metrics,
        })
    }

    /// Subscribe to all notifications from this point on
    pub fn subscribe(&self) -> broadcast::Receiver<Envelope> {
        self.bus.subscribe()
    }

    /// Metrics collector (for scraping the registry)
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Register a new airline
    pub async fn register_airline(
        &self,
        name: &str,
        address: &Address,
        caller: &Address,
    ) -> Result<AirlineStatus> {
        self.handle.register_airline(name, address, caller).await
    }

    /// Vote for a queued airline; returns the vote count after this vote
    pub async fn vote_airline(&self, candidate: &Address, caller: &Address) -> Result<usize> {
        self.handle.vote_airline(candidate, caller).await
    }

    /// Fund the calling airline's escrow
    pub async fn fund_airline(&self, caller: &Address, amount: Decimal) -> Result<()> {
        self.handle.fund_airline(caller, amount).await
    }

    /// Register a flight for the calling airline
    pub async fn register_flight(
        &self,
        flight_number: &str,
        scheduled_at: i64,
        caller: &Address,
    ) -> Result<FlightKey> {
        self.handle
            .register_flight(flight_number, scheduled_at, caller)
            .await
    }

    /// Open a status lookup; returns the index oracles must hold
    pub async fn request_flight_status(
        &self,
        airline: &Address,
        flight_number: &str,
        scheduled_at: i64,
    ) -> Result<u8> {
        self.handle
            .request_flight_status(airline, flight_number, scheduled_at)
            .await
    }

    /// Register an oracle; returns its three assigned indices
    pub async fn register_oracle(&self, caller: &Address, fee: Decimal) -> Result<[u8; 3]> {
        self.handle.register_oracle(caller, fee).await
    }

    /// Submit an oracle status report
    pub async fn submit_oracle_response(
        &self,
        index: u8,
        airline: &Address,
        flight_number: &str,
        scheduled_at: i64,
        status: FlightStatus,
        caller: &Address,
    ) -> Result<()> {
        self.handle
            .submit_oracle_response(index, airline, flight_number, scheduled_at, status, caller)
            .await
    }

    /// Buy insurance on a flight
    #[allow(clippy::too_many_arguments)]
    pub async fn buy_insurance(
        &self,
        passenger_name: &str,
        airline: &Address,
        flight_number: &str,
        scheduled_at: i64,
        premium: Decimal,
        caller: &Address,
    ) -> Result<FlightKey> {
        self.handle
            .buy_insurance(
                passenger_name,
                airline,
                flight_number,
                scheduled_at,
                premium,
                caller,
            )
            .await
    }

    /// Withdraw accumulated credits; returns the amount released
    pub async fn withdraw_funds(&self, caller: &Address) -> Result<Decimal> {
        self.handle.withdraw_funds(caller).await
    }

    /// Look up an airline
    pub async fn airline(&self, address: &Address) -> Result<Option<Airline>> {
        self.handle.airline(address).await
    }

    /// Look up a flight
    pub async fn flight(&self, key: FlightKey) -> Result<Option<Flight>> {
        self.handle.flight(key).await
    }

    /// List all flights
    pub async fn flights(&self) -> Result<Vec<Flight>> {
        self.handle.flights().await
    }

    /// Policies held on a flight
    pub async fn policies(&self, key: FlightKey) -> Result<Vec<InsurancePolicy>> {
        self.handle.policies(key).await
    }

    /// Look up an oracle
    pub async fn oracle(&self, address: &Address) -> Result<Option<Oracle>> {
        self.handle.oracle(address).await
    }

    /// A passenger's withdrawal balance
    pub async fn withdrawal_balance(&self, address: &Address) -> Result<Decimal> {
        self.handle.withdrawal_balance(address).await
    }

    /// Count of funded airlines
    pub async fn funded_airline_count(&self) -> Result<usize> {
        self.handle.funded_airline_count().await
    }

    /// Shutdown the ledger actor
    pub async fn shutdown(self) -> Result<()> {
        self.handle.shutdown().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexes::SequenceIndexSource;
    use surety_events::Notification;

    fn addr(s: &str) -> Address {
        Address::from(s)
    }

    #[tokio::test]
    async fn test_open_validates_config() {
        let mut config = Config::default();
        config.oracle.quorum = 0;
        assert!(FlightSurety::open(config).is_err());
    }

    #[tokio::test]
    async fn test_fund_and_register_flow() {
        let surety = FlightSurety::open(Config::default()).unwrap();
        let genesis = addr("0xA1");

        surety.fund_airline(&genesis, Decimal::from(10)).await.unwrap();
        let status = surety
            .register_airline("Borealis Air", &addr("0xA2"), &genesis)
            .await
            .unwrap();
        assert_eq!(status, AirlineStatus::Registered);

        surety.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_subscriber_sees_notifications() {
        let surety = FlightSurety::open(Config::default()).unwrap();
        let mut events = surety.subscribe();
        let genesis = addr("0xA1");

        surety.fund_airline(&genesis, Decimal::from(10)).await.unwrap();

        let envelope = events.recv().await.unwrap();
        assert_eq!(envelope.subject, "surety.airline.funded");
        match envelope.notification {
            Notification::AirlineFunded { airline, escrow } => {
                assert_eq!(airline, "0xA1");
                assert_eq!(escrow, Decimal::from(10));
            }
            other => panic!("unexpected notification: {other:?}"),
        }

        surety.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_command_counted() {
        let surety = FlightSurety::open_with_indexes(
            Config::default(),
            Box::new(SequenceIndexSource::new([])),
        )
        .unwrap();
        let genesis = addr("0xA1");

        // Below the funding minimum
        let result = surety.fund_airline(&genesis, Decimal::from(5)).await;
        assert!(result.is_err());

        surety.fund_airline(&genesis, Decimal::from(10)).await.unwrap();

        assert_eq!(surety.metrics().commands_rejected.get(), 1);
        assert_eq!(surety.metrics().commands_accepted.get(), 1);

        surety.shutdown().await.unwrap();
    }
}
