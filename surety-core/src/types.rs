//! Core types for the ledger
//!
//! All types are designed for:
//! - Deterministic keys (SHA-256 flight keys)
//! - Exact arithmetic (Decimal for premiums, escrow, credits)
//! - Monotonic state transitions (airline status, flight status)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Caller identity (airline, passenger, or oracle address)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    /// Create new address
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Airline admission status
///
/// Transitions are monotonic: `Unregistered → Queued → Registered → Funded`,
/// with the Queued step skipped while fewer than the direct-admission limit
/// of airlines are admitted. No status is ever revoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum AirlineStatus {
    /// Never registered
    Unregistered = 0,
    /// Admission requested, waiting on votes
    Queued = 1,
    /// Admitted (directly or via vote quorum)
    Registered = 2,
    /// Escrow funded; full participation rights
    Funded = 3,
}

impl AirlineStatus {
    /// Whether the airline counts toward the admitted set
    pub fn is_admitted(&self) -> bool {
        matches!(self, AirlineStatus::Registered | AirlineStatus::Funded)
    }
}

/// Airline record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Airline {
    /// Unique address
    pub address: Address,

    /// Display name
    pub name: String,

    /// Admission status
    pub status: AirlineStatus,

    /// Voter addresses already cast for this airline
    pub votes: HashSet<Address>,

    /// Escrow balance
    pub escrow: Decimal,
}

impl Airline {
    /// Create a new airline in the given status with empty escrow
    pub fn new(address: Address, name: impl Into<String>, status: AirlineStatus) -> Self {
        Self {
            address,
            name: name.into(),
            status,
            votes: HashSet::new(),
            escrow: Decimal::ZERO,
        }
    }

    /// Number of votes cast for this airline
    pub fn vote_count(&self) -> usize {
        self.votes.len()
    }
}

/// Deterministic flight key: SHA-256 over (airline, flight number, timestamp)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlightKey([u8; 32]);

impl FlightKey {
    /// Derive the key for a flight
    pub fn derive(airline: &Address, flight_number: &str, scheduled_at: i64) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(airline.as_str().as_bytes());
        hasher.update(flight_number.as_bytes());
        hasher.update(scheduled_at.to_be_bytes());
        Self(hasher.finalize().into())
    }

    /// Raw key bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for FlightKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Flight status code
///
/// Codes match the original wire values. A flight starts at `Unknown`
/// and mutates exactly once, to a terminal code, on oracle quorum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum FlightStatus {
    /// Not yet resolved
    Unknown = 0,
    /// Arrived on time
    OnTime = 10,
    /// Late, airline at fault (triggers payouts)
    LateAirline = 20,
    /// Late due to weather
    LateWeather = 30,
    /// Late due to technical issues
    LateTechnical = 40,
    /// Late for other reasons
    LateOther = 50,
}

impl FlightStatus {
    /// Wire code
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Parse from wire code
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(FlightStatus::Unknown),
            10 => Some(FlightStatus::OnTime),
            20 => Some(FlightStatus::LateAirline),
            30 => Some(FlightStatus::LateWeather),
            40 => Some(FlightStatus::LateTechnical),
            50 => Some(FlightStatus::LateOther),
            _ => None,
        }
    }
}

/// Registered flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flight {
    /// Deterministic key
    pub key: FlightKey,

    /// Operating airline
    pub airline: Address,

    /// Flight number
    pub flight_number: String,

    /// Scheduled departure (epoch millis)
    pub scheduled_at: i64,

    /// Status code (Unknown until oracle quorum)
    pub status: FlightStatus,
}

/// Insurance policy, unique per (passenger, flight)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsurancePolicy {
    /// Policy holder
    pub passenger: Address,

    /// Passenger display name
    pub passenger_name: String,

    /// Insured flight
    pub flight: FlightKey,

    /// Premium paid at purchase
    pub premium: Decimal,

    /// Amount credited at settlement (zero until then)
    pub credited: Decimal,

    /// Whether settlement has run for this policy
    pub settled: bool,
}

/// Registered oracle with its three immutable indices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Oracle {
    /// Oracle address
    pub address: Address,

    /// Assigned indices, fixed at registration
    pub indexes: [u8; 3],
}

impl Oracle {
    /// Whether this oracle holds the given index
    pub fn has_index(&self, index: u8) -> bool {
        self.indexes.contains(&index)
    }
}

/// Key identifying an oracle request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    /// Index drawn when the request was opened
    pub index: u8,

    /// Operating airline
    pub airline: Address,

    /// Flight number
    pub flight_number: String,

    /// Scheduled departure (epoch millis)
    pub scheduled_at: i64,
}

impl RequestKey {
    /// Key of the flight this request refers to
    pub fn flight_key(&self) -> FlightKey {
        FlightKey::derive(&self.airline, &self.flight_number, self.scheduled_at)
    }
}

/// Open or resolved oracle request
///
/// Reports keep accumulating after resolution for audit, but only the
/// first status code to reach quorum ever touches the flight.
#[derive(Debug, Clone)]
pub struct OracleRequest {
    /// Reporters grouped by the status code they reported
    pub reports: HashMap<FlightStatus, HashSet<Address>>,

    /// All oracles that have reported (for idempotence)
    pub responders: HashSet<Address>,

    /// Set the instant any code reaches quorum
    pub resolved: bool,
}

impl OracleRequest {
    /// Create an empty, open request
    pub fn new() -> Self {
        Self {
            reports: HashMap::new(),
            responders: HashSet::new(),
            resolved: false,
        }
    }

    /// Whether this oracle already reported on this request
    pub fn has_responded(&self, oracle: &Address) -> bool {
        self.responders.contains(oracle)
    }

    /// Record a report, returning the count for that status code
    pub fn record(&mut self, oracle: Address, status: FlightStatus) -> usize {
        self.responders.insert(oracle.clone());
        let reporters = self.reports.entry(status).or_default();
        reporters.insert(oracle);
        reporters.len()
    }
}

impl Default for OracleRequest {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flight_key_deterministic() {
        let airline = Address::from("0xA1");
        let a = FlightKey::derive(&airline, "FS-100", 1_700_000_000_000);
        let b = FlightKey::derive(&airline, "FS-100", 1_700_000_000_000);
        assert_eq!(a, b);
    }

    #[test]
    fn test_flight_key_distinguishes_inputs() {
        let airline = Address::from("0xA1");
        let base = FlightKey::derive(&airline, "FS-100", 1_700_000_000_000);

        assert_ne!(
            base,
            FlightKey::derive(&Address::from("0xA2"), "FS-100", 1_700_000_000_000)
        );
        assert_ne!(base, FlightKey::derive(&airline, "FS-101", 1_700_000_000_000));
        assert_ne!(base, FlightKey::derive(&airline, "FS-100", 1_700_000_000_001));
    }

    #[test]
    fn test_flight_key_hex_display() {
        let key = FlightKey::derive(&Address::from("0xA1"), "FS-100", 0);
        let hex = key.to_string();
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_status_code_roundtrip() {
        for status in [
            FlightStatus::Unknown,
            FlightStatus::OnTime,
            FlightStatus::LateAirline,
            FlightStatus::LateWeather,
            FlightStatus::LateTechnical,
            FlightStatus::LateOther,
        ] {
            assert_eq!(FlightStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(FlightStatus::from_code(15), None);
    }

    #[test]
    fn test_request_records_distinct_reporters() {
        let mut request = OracleRequest::new();

        assert_eq!(request.record(Address::from("0xO1"), FlightStatus::OnTime), 1);
        assert_eq!(request.record(Address::from("0xO2"), FlightStatus::OnTime), 2);
        // Same reporter again does not grow the set
        assert_eq!(request.record(Address::from("0xO2"), FlightStatus::OnTime), 2);
        assert!(request.has_responded(&Address::from("0xO1")));
        assert!(!request.has_responded(&Address::from("0xO3")));
    }

    #[test]
    fn test_admitted_statuses() {
        assert!(!AirlineStatus::Unregistered.is_admitted());
        assert!(!AirlineStatus::Queued.is_admitted());
        assert!(AirlineStatus::Registered.is_admitted());
        assert!(AirlineStatus::Funded.is_admitted());
    }
}
