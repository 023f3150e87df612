//! Actor-based concurrency for the ledger
//!
//! This module implements the single-writer pattern using Tokio actors:
//! - One logical writer task owns all ledger state
//! - Every command applies atomically; no caller observes a partial write
//! - Oracle clients are concurrent producers fanning into one mailbox
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │     Callers (UI, oracle server, oracle clients)      │
//! └─────────────────────┬────────────────────────────────┘
//!                       │
//!                       ▼
//! ┌──────────────────────────────────────────────────────┐
//! │               LedgerHandle (Clone)                   │
//! │         Sends commands to actor mailbox              │
//! └─────────────────────┬────────────────────────────────┘
//!                       │ mpsc::channel (bounded)
//!                       ▼
//! ┌──────────────────────────────────────────────────────┐
//! │             LedgerActor (Single Task)                │
//! │   owns LedgerState, applies one command at a time    │
//! │   publishes notifications on the EventBus            │
//! └──────────────────────────────────────────────────────┘
//! ```

use crate::state::LedgerState;
use crate::types::{
    Address, Airline, AirlineStatus, Flight, FlightKey, FlightStatus, InsurancePolicy, Oracle,
};
use crate::{Error, Result};
use rust_decimal::Decimal;
use tokio::sync::{mpsc, oneshot};

/// Command sent to the ledger actor
pub enum LedgerCommand {
    /// Register a new airline
    RegisterAirline {
        /// Display name
        name: String,
        /// New airline's address
        address: Address,
        /// Caller identity
        caller: Address,
        /// Reply channel
        reply: oneshot::Sender<Result<AirlineStatus>>,
    },

    /// Vote for a queued airline
    VoteAirline {
        /// Candidate address
        candidate: Address,
        /// Caller identity
        caller: Address,
        /// Reply channel (vote count after this vote)
        reply: oneshot::Sender<Result<usize>>,
    },

    /// Fund the calling airline's escrow
    FundAirline {
        /// Caller identity
        caller: Address,
        /// Amount to escrow
        amount: Decimal,
        /// Reply channel
        reply: oneshot::Sender<Result<()>>,
    },

    /// Register a flight
    RegisterFlight {
        /// Flight number
        flight_number: String,
        /// Scheduled departure (epoch millis)
        scheduled_at: i64,
        /// Caller identity
        caller: Address,
        /// Reply channel
        reply: oneshot::Sender<Result<FlightKey>>,
    },

    /// Open a status lookup
    RequestFlightStatus {
        /// Operating airline
        airline: Address,
        /// Flight number
        flight_number: String,
        /// Scheduled departure (epoch millis)
        scheduled_at: i64,
        /// Reply channel (drawn index)
        reply: oneshot::Sender<Result<u8>>,
    },

    /// Register an oracle
    RegisterOracle {
        /// Caller identity
        caller: Address,
        /// Registration fee
        fee: Decimal,
        /// Reply channel (assigned indices)
        reply: oneshot::Sender<Result<[u8; 3]>>,
    },

    /// Submit an oracle status report
    SubmitOracleResponse {
        /// Request index
        index: u8,
        /// Operating airline
        airline: Address,
        /// Flight number
        flight_number: String,
        /// Scheduled departure (epoch millis)
        scheduled_at: i64,
        /// Reported status
        status: FlightStatus,
        /// Caller identity
        caller: Address,
        /// Reply channel
        reply: oneshot::Sender<Result<()>>,
    },

    /// Buy insurance on a flight
    BuyInsurance {
        /// Passenger display name
        passenger_name: String,
        /// Operating airline
        airline: Address,
        /// Flight number
        flight_number: String,
        /// Scheduled departure (epoch millis)
        scheduled_at: i64,
        /// Premium paid
        premium: Decimal,
        /// Caller identity
        caller: Address,
        /// Reply channel
        reply: oneshot::Sender<Result<FlightKey>>,
    },

    /// Withdraw accumulated credits
    WithdrawFunds {
        /// Caller identity
        caller: Address,
        /// Reply channel (amount released)
        reply: oneshot::Sender<Result<Decimal>>,
    },

    /// Look up an airline
    GetAirline {
        /// Airline address
        address: Address,
        /// Reply channel
        reply: oneshot::Sender<Option<Airline>>,
    },

    /// Look up a flight
    GetFlight {
        /// Flight key
        key: FlightKey,
        /// Reply channel
        reply: oneshot::Sender<Option<Flight>>,
    },

    /// List all flights
    ListFlights {
        /// Reply channel
        reply: oneshot::Sender<Vec<Flight>>,
    },

    /// Policies held on a flight
    GetPolicies {
        /// Flight key
        key: FlightKey,
        /// Reply channel
        reply: oneshot::Sender<Vec<InsurancePolicy>>,
    },

    /// Look up an oracle
    GetOracle {
        /// Oracle address
        address: Address,
        /// Reply channel
        reply: oneshot::Sender<Option<Oracle>>,
    },

    /// A passenger's withdrawal balance
    GetBalance {
        /// Passenger address
        address: Address,
        /// Reply channel
        reply: oneshot::Sender<Decimal>,
    },

    /// Count of funded airlines
    FundedAirlineCount {
        /// Reply channel
        reply: oneshot::Sender<usize>,
    },

    /// Shutdown actor
    Shutdown,
}

/// Actor that serializes all ledger mutation
pub struct LedgerActor {
    /// Owned ledger state
    state: LedgerState,

    /// Mailbox for incoming commands
    mailbox: mpsc::Receiver<LedgerCommand>,
}

impl LedgerActor {
    /// Create new actor
    pub fn new(state: LedgerState, mailbox: mpsc::Receiver<LedgerCommand>) -> Self {
        Self { state, mailbox }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(command) = self.mailbox.recv().await {
            if matches!(command, LedgerCommand::Shutdown) {
                tracing::info!("ledger actor shutting down");
                break;
            }
            self.handle_command(command);
        }
    }

    /// Apply a single command against the state
    fn handle_command(&mut self, command: LedgerCommand) {
        match command {
            LedgerCommand::RegisterAirline {
                name,
                address,
                caller,
                reply,
            } => {
                let result = self.state.register_airline(&name, &address, &caller);
                self.state.metrics.record_command(result.is_ok());
                let _ = reply.send(result);
            }

            LedgerCommand::VoteAirline {
                candidate,
                caller,
                reply,
            } => {
                let result = self.state.vote_airline(&candidate, &caller);
                self.state.metrics.record_command(result.is_ok());
                let _ = reply.send(result);
            }

            LedgerCommand::FundAirline {
                caller,
                amount,
                reply,
            } => {
                let result = self.state.fund_airline(&caller, amount);
                self.state.metrics.record_command(result.is_ok());
                let _ = reply.send(result);
            }

            LedgerCommand::RegisterFlight {
                flight_number,
                scheduled_at,
                caller,
                reply,
            } => {
                let result = self
                    .state
                    .register_flight(&flight_number, scheduled_at, &caller);
                self.state.metrics.record_command(result.is_ok());
                let _ = reply.send(result);
            }

            LedgerCommand::RequestFlightStatus {
                airline,
                flight_number,
                scheduled_at,
                reply,
            } => {
                let result = self
                    .state
                    .request_flight_status(&airline, &flight_number, scheduled_at);
                self.state.metrics.record_command(result.is_ok());
                let _ = reply.send(result);
            }

            LedgerCommand::RegisterOracle { caller, fee, reply } => {
                let result = self.state.register_oracle(&caller, fee);
                self.state.metrics.record_command(result.is_ok());
                let _ = reply.send(result);
            }

            LedgerCommand::SubmitOracleResponse {
                index,
                airline,
                flight_number,
                scheduled_at,
                status,
                caller,
                reply,
            } => {
                let result = self.state.submit_oracle_response(
                    index,
                    &airline,
                    &flight_number,
                    scheduled_at,
                    status,
                    &caller,
                );
                self.state.metrics.record_command(result.is_ok());
                let _ = reply.send(result);
            }

            LedgerCommand::BuyInsurance {
                passenger_name,
                airline,
                flight_number,
                scheduled_at,
                premium,
                caller,
                reply,
            } => {
                let result = self.state.buy_insurance(
                    &passenger_name,
                    &airline,
                    &flight_number,
                    scheduled_at,
                    premium,
                    &caller,
                );
                self.state.metrics.record_command(result.is_ok());
                let _ = reply.send(result);
            }

            LedgerCommand::WithdrawFunds { caller, reply } => {
                let result = self.state.withdraw_funds(&caller);
                self.state.metrics.record_command(result.is_ok());
                let _ = reply.send(result);
            }

            LedgerCommand::GetAirline { address, reply } => {
                let _ = reply.send(self.state.airline(&address).cloned());
            }

            LedgerCommand::GetFlight { key, reply } => {
                let _ = reply.send(self.state.flight(&key).cloned());
            }

            LedgerCommand::ListFlights { reply } => {
                let _ = reply.send(self.state.flights());
            }

            LedgerCommand::GetPolicies { key, reply } => {
                let _ = reply.send(self.state.policies(&key));
            }

            LedgerCommand::GetOracle { address, reply } => {
                let _ = reply.send(self.state.oracle(&address).cloned());
            }

            LedgerCommand::GetBalance { address, reply } => {
                let _ = reply.send(self.state.withdrawal_balance(&address));
            }

            LedgerCommand::FundedAirlineCount { reply } => {
                let _ = reply.send(self.state.funded_count());
            }

            LedgerCommand::Shutdown => {
                // Handled in main loop
            }
        }
    }
}

/// Handle for sending commands to the actor
#[derive(Clone)]
pub struct LedgerHandle {
    sender: mpsc::Sender<LedgerCommand>,
}

impl LedgerHandle {
    /// Create new handle
    pub fn new(sender: mpsc::Sender<LedgerCommand>) -> Self {
        Self { sender }
    }

    async fn send(&self, command: LedgerCommand) -> Result<()> {
        self.sender
            .send(command)
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))
    }

    /// Register a new airline
    pub async fn register_airline(
        &self,
        name: &str,
        address: &Address,
        caller: &Address,
    ) -> Result<AirlineStatus> {
        let (tx, rx) = oneshot::channel();
        self.send(LedgerCommand::RegisterAirline {
            name: name.to_string(),
            address: address.clone(),
            caller: caller.clone(),
            reply: tx,
        })
        .await?;
        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))?
    }

    /// Vote for a queued airline
    pub async fn vote_airline(&self, candidate: &Address, caller: &Address) -> Result<usize> {
        let (tx, rx) = oneshot::channel();
        self.send(LedgerCommand::VoteAirline {
            candidate: candidate.clone(),
            caller: caller.clone(),
            reply: tx,
        })
        .await?;
        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))?
    }

    /// Fund the calling airline's escrow
    pub async fn fund_airline(&self, caller: &Address, amount: Decimal) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send(LedgerCommand::FundAirline {
            caller: caller.clone(),
            amount,
            reply: tx,
        })
        .await?;
        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))?
    }

    /// Register a flight
    pub async fn register_flight(
        &self,
        flight_number: &str,
        scheduled_at: i64,
        caller: &Address,
    ) -> Result<FlightKey> {
        let (tx, rx) = oneshot::channel();
        self.send(LedgerCommand::RegisterFlight {
            flight_number: flight_number.to_string(),
            scheduled_at,
            caller: caller.clone(),
            reply: tx,
        })
        .await?;
        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))?
    }

    /// Open a status lookup, returning the drawn index
    pub async fn request_flight_status(
        &self,
        airline: &Address,
        flight_number: &str,
        scheduled_at: i64,
    ) -> Result<u8> {
        let (tx, rx) = oneshot::channel();
        self.send(LedgerCommand::RequestFlightStatus {
            airline: airline.clone(),
            flight_number: flight_number.to_string(),
            scheduled_at,
            reply: tx,
        })
        .await?;
        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))?
    }

    /// Register an oracle, returning its indices
    pub async fn register_oracle(&self, caller: &Address, fee: Decimal) -> Result<[u8; 3]> {
        let (tx, rx) = oneshot::channel();
        self.send(LedgerCommand::RegisterOracle {
            caller: caller.clone(),
            fee,
            reply: tx,
        })
        .await?;
        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))?
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
        let (tx, rx) = oneshot::channel();
        self.send(LedgerCommand::SubmitOracleResponse {
            index,
            airline: airline.clone(),
            flight_number: flight_number.to_string(),
            scheduled_at,
            status,
            caller: caller.clone(),
            reply: tx,
        })
        .await?;
        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))?
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
        let (tx, rx) = oneshot::channel();
        self.send(LedgerCommand::BuyInsurance {
            passenger_name: passenger_name.to_string(),
            airline: airline.clone(),
            flight_number: flight_number.to_string(),
            scheduled_at,
            premium,
            caller: caller.clone(),
            reply: tx,
        })
        .await?;
        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))?
    }

    /// Withdraw accumulated credits
    pub async fn withdraw_funds(&self, caller: &Address) -> Result<Decimal> {
        let (tx, rx) = oneshot::channel();
        self.send(LedgerCommand::WithdrawFunds {
            caller: caller.clone(),
            reply: tx,
        })
        .await?;
        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))?
    }

    /// Look up an airline
    pub async fn airline(&self, address: &Address) -> Result<Option<Airline>> {
        let (tx, rx) = oneshot::channel();
        self.send(LedgerCommand::GetAirline {
            address: address.clone(),
            reply: tx,
        })
        .await?;
        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))
    }

    /// Look up a flight
    pub async fn flight(&self, key: FlightKey) -> Result<Option<Flight>> {
        let (tx, rx) = oneshot::channel();
        self.send(LedgerCommand::GetFlight { key, reply: tx }).await?;
        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))
    }

    /// List all flights
    pub async fn flights(&self) -> Result<Vec<Flight>> {
        let (tx, rx) = oneshot::channel();
        self.send(LedgerCommand::ListFlights { reply: tx }).await?;
        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))
    }

    /// Policies held on a flight
    pub async fn policies(&self, key: FlightKey) -> Result<Vec<InsurancePolicy>> {
        let (tx, rx) = oneshot::channel();
        self.send(LedgerCommand::GetPolicies { key, reply: tx }).await?;
        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))
    }

    /// Look up an oracle
    pub async fn oracle(&self, address: &Address) -> Result<Option<Oracle>> {
        let (tx, rx) = oneshot::channel();
        self.send(LedgerCommand::GetOracle {
            address: address.clone(),
            reply: tx,
        })
        .await?;
        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))
    }

    /// A passenger's withdrawal balance
    pub async fn withdrawal_balance(&self, address: &Address) -> Result<Decimal> {
        let (tx, rx) = oneshot::channel();
        self.send(LedgerCommand::GetBalance {
            address: address.clone(),
            reply: tx,
        })
        .await?;
        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))
    }

    /// Count of funded airlines
    pub async fn funded_airline_count(&self) -> Result<usize> {
        let (tx, rx) = oneshot::channel();
        self.send(LedgerCommand::FundedAirlineCount { reply: tx }).await?;
        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))
    }

    /// Shutdown actor
    pub async fn shutdown(&self) -> Result<()> {
        self.send(LedgerCommand::Shutdown).await
    }
}

/// Spawn the ledger actor
pub fn spawn_ledger_actor(state: LedgerState, mailbox_capacity: usize) -> LedgerHandle {
    let (tx, rx) = mpsc::channel(mailbox_capacity);
    let actor = LedgerActor::new(state, rx);

    tokio::spawn(async move {
        actor.run().await;
    });

    LedgerHandle::new(tx)
}
