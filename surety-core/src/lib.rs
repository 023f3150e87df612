//! FlightSurety ledger core
//!
//! Governance, consensus, and settlement state machine for flight-delay
//! insurance.
//!
//! # Architecture
//!
//! - **Single Writer**: One actor task owns all state; every command is
//!   atomic and totally ordered
//! - **Threshold Governance**: Direct admission for the first airlines,
//!   50% funded-airline voting after that
//! - **Oracle Quorum**: Index-sharded oracles; first status code to three
//!   matching reports finalizes a flight
//! - **Settlement**: LateAirline resolution credits every policy at 1.5x;
//!   withdrawal zeroes the balance before value moves
//!
//! # Invariants
//!
//! - Airline status transitions are monotonic and never revoked
//! - Vote counts only grow; one vote per (voter, candidate)
//! - A flight's status is written exactly once
//! - A rejected command leaves all state unchanged

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod actor;
pub mod config;
pub mod error;
pub mod flights;
pub mod governance;
pub mod indexes;
pub mod insurance;
pub mod ledger;
pub mod metrics;
pub mod oracle;
pub mod state;
pub mod types;

// Re-exports
pub use config::Config;
pub use error::{Error, Result};
pub use ledger::FlightSurety;
pub use state::LedgerState;
pub use types::{
    Address, Airline, AirlineStatus, Flight, FlightKey, FlightStatus, InsurancePolicy, Oracle,
};
