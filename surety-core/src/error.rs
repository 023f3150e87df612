//! Error types for the ledger

use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
///
/// Every variant is a synchronous rejection of the triggering command;
/// a rejected command leaves all ledger state unchanged.
#[derive(Error, Debug)]
pub enum Error {
    /// Caller lacks the role or status the operation requires
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Airline address already registered
    #[error("Airline already registered: {0}")]
    DuplicateAirline(String),

    /// Candidate airline was never registered
    #[error("Unknown airline: {0}")]
    UnknownAirline(String),

    /// Voter already cast a vote for this candidate
    #[error("Duplicate vote for {0}")]
    DuplicateVote(String),

    /// Flight key already registered
    #[error("Duplicate flight: {0}")]
    DuplicateFlight(String),

    /// Passenger already holds a policy on this flight
    #[error("Duplicate policy for flight {0}")]
    DuplicatePolicy(String),

    /// Funding amount below the minimum threshold
    #[error("Insufficient funds: {amount} < minimum {minimum}")]
    InsufficientFunds {
        /// Amount offered
        amount: rust_decimal::Decimal,
        /// Required minimum
        minimum: rust_decimal::Decimal,
    },

    /// Oracle registration fee below the fixed fee
    #[error("Insufficient fee: {fee} < required {required}")]
    InsufficientFee {
        /// Fee offered
        fee: rust_decimal::Decimal,
        /// Required fee
        required: rust_decimal::Decimal,
    },

    /// No flight under the derived key
    #[error("Unknown flight: {0}")]
    UnknownFlight(String),

    /// Status lookup for a flight that already carries a terminal status
    #[error("Flight already resolved: {0}")]
    FlightAlreadyResolved(String),

    /// Caller is not a registered oracle
    #[error("Oracle not registered: {0}")]
    OracleNotRegistered(String),

    /// Submitted index is not among the oracle's assigned indices
    #[error("Index {0} not assigned to this oracle")]
    IndexMismatch(u8),

    /// No oracle request matches (index, airline, flight, timestamp)
    #[error("No open request for index {0}")]
    NoOpenRequest(u8),

    /// Premium outside (0, max]
    #[error("Premium out of range: {premium} (max {max})")]
    PremiumOutOfRange {
        /// Premium offered
        premium: rust_decimal::Decimal,
        /// Maximum premium
        max: rust_decimal::Decimal,
    },

    /// Withdrawal requested against a zero balance
    #[error("Nothing owed to {0}")]
    NothingOwed(String),

    /// Concurrency error (actor mailbox closed, etc.)
    #[error("Concurrency error: {0}")]
    Concurrency(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Metrics registration error
    #[error("Metrics error: {0}")]
    Metrics(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<prometheus::Error> for Error {
    fn from(err: prometheus::Error) -> Self {
        Error::Metrics(err.to_string())
    }
}
