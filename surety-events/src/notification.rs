//! Notification payloads and envelope

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Domain notification emitted by the ledger core
///
/// Addresses are carried as plain strings so subscribers do not need the
/// core's type definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// Airline admitted but waiting on votes
    AirlineQueued {
        /// Candidate airline address
        airline: String,
        /// Display name
        name: String,
    },
    /// Airline fully registered (directly or via quorum)
    AirlineRegistered {
        /// Airline address
        airline: String,
        /// Display name
        name: String,
    },
    /// Airline escrow funded past the minimum
    AirlineFunded {
        /// Airline address
        airline: String,
        /// Escrow balance after funding
        escrow: Decimal,
    },
    /// Vote recorded for a queued airline
    AirlineVoted {
        /// Candidate airline address
        candidate: String,
        /// Voting airline address
        voter: String,
        /// Vote count after this vote
        votes: usize,
    },
    /// New flight available for insurance
    FlightRegistered {
        /// Flight key (hex)
        flight_key: String,
        /// Operating airline address
        airline: String,
        /// Flight number
        flight_number: String,
        /// Scheduled departure (epoch millis)
        scheduled_at: i64,
    },
    /// Status lookup opened; oracles holding `index` should respond
    OracleRequest {
        /// Index oracles must hold to answer
        index: u8,
        /// Operating airline address
        airline: String,
        /// Flight number
        flight_number: String,
        /// Scheduled departure (epoch millis)
        scheduled_at: i64,
    },
    /// Individual oracle response accepted
    OracleReport {
        /// Request index
        index: u8,
        /// Operating airline address
        airline: String,
        /// Flight number
        flight_number: String,
        /// Scheduled departure (epoch millis)
        scheduled_at: i64,
        /// Reported status code
        status_code: u8,
        /// Reporting oracle address
        oracle: String,
    },
    /// Flight status finalized by oracle quorum
    FlightStatus {
        /// Flight key (hex)
        flight_key: String,
        /// Terminal status code
        status_code: u8,
    },
    /// Passenger credits written for a late flight (one per flight)
    FlightCreditInsurees {
        /// Flight key (hex)
        flight_key: String,
        /// Number of policies credited
        policies_credited: usize,
        /// Sum credited across all policies
        total_credited: Decimal,
    },
    /// Insurance policy purchased
    PassengerPurchasedInsurance {
        /// Passenger address
        passenger: String,
        /// Flight key (hex)
        flight_key: String,
        /// Premium paid
        premium: Decimal,
    },
    /// Passenger withdrew their credited balance
    PassengerWithdrawBalance {
        /// Passenger address
        passenger: String,
        /// Amount released
        amount: Decimal,
    },
}

impl Notification {
    /// Subject string for this notification
    pub fn subject(&self) -> &'static str {
        match self {
            Notification::AirlineQueued { .. } => "surety.airline.queued",
            Notification::AirlineRegistered { .. } => "surety.airline.registered",
            Notification::AirlineFunded { .. } => "surety.airline.funded",
            Notification::AirlineVoted { .. } => "surety.airline.voted",
            Notification::FlightRegistered { .. } => "surety.flight.registered",
            Notification::OracleRequest { .. } => "surety.oracle.request",
            Notification::OracleReport { .. } => "surety.oracle.report",
            Notification::FlightStatus { .. } => "surety.flight.status",
            Notification::FlightCreditInsurees { .. } => "surety.flight.credit",
            Notification::PassengerPurchasedInsurance { .. } => "surety.passenger.purchase",
            Notification::PassengerWithdrawBalance { .. } => "surety.passenger.withdraw",
        }
    }
}

/// Notification envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Envelope ID (UUIDv7 for ordering)
    pub id: Uuid,

    /// Subject string (for routing/filtering)
    pub subject: String,

    /// Emission timestamp
    pub timestamp: DateTime<Utc>,

    /// The notification itself
    pub notification: Notification,
}

impl Envelope {
    /// Wrap a notification in a fresh envelope
    pub fn new(notification: Notification) -> Self {
        Self {
            id: Uuid::now_v7(),
            subject: notification.subject().to_string(),
            timestamp: Utc::now(),
            notification,
        }
    }

    /// Serialize to bytes (JSON)
    pub fn to_bytes(&self) -> crate::Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Deserialize from bytes (JSON)
    pub fn from_bytes(bytes: &[u8]) -> crate::Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_mapping() {
        let n = Notification::AirlineQueued {
            airline: "0xA1".to_string(),
            name: "Aurora Air".to_string(),
        };
        assert_eq!(n.subject(), "surety.airline.queued");

        let n = Notification::FlightStatus {
            flight_key: "ab".repeat(32),
            status_code: 20,
        };
        assert_eq!(n.subject(), "surety.flight.status");
    }

    #[test]
    fn test_envelope_roundtrip() {
        let envelope = Envelope::new(Notification::OracleRequest {
            index: 7,
            airline: "0xA1".to_string(),
            flight_number: "FS-100".to_string(),
            scheduled_at: 1_700_000_000_000,
        });

        let bytes = envelope.to_bytes().unwrap();
        let decoded = Envelope::from_bytes(&bytes).unwrap();

        assert_eq!(decoded.id, envelope.id);
        assert_eq!(decoded.subject, "surety.oracle.request");
        assert_eq!(decoded.notification, envelope.notification);
    }

    #[test]
    fn test_envelope_ids_are_ordered() {
        let a = Envelope::new(Notification::AirlineFunded {
            airline: "0xA1".to_string(),
            escrow: Decimal::from(10),
        });
        let b = Envelope::new(Notification::AirlineFunded {
            airline: "0xA2".to_string(),
            escrow: Decimal::from(10),
        });
        // UUIDv7 is time-ordered
        assert!(a.id < b.id);
    }
}
