//! Flight registry
//!
//! Flights are keyed by a deterministic hash of (airline, flight number,
//! scheduled time). Only funded airlines register flights; anyone may ask
//! for a flight's status, which opens an oracle request targeting a
//! freshly drawn index.

use crate::{
    state::LedgerState,
    types::{Address, Flight, FlightKey, FlightStatus, OracleRequest, RequestKey},
    Error, Result,
};
use surety_events::Notification;
use tracing::info;

impl LedgerState {
    /// Register a flight for the calling airline
    pub fn register_flight(
        &mut self,
        flight_number: &str,
        scheduled_at: i64,
        caller: &Address,
    ) -> Result<FlightKey> {
        self.require_funded(caller)?;

        let key = FlightKey::derive(caller, flight_number, scheduled_at);
        if self.flights.contains_key(&key) {
            return Err(Error::DuplicateFlight(key.to_string()));
        }

        self.flights.insert(
            key,
            Flight {
                key,
                airline: caller.clone(),
                flight_number: flight_number.to_string(),
                scheduled_at,
                status: FlightStatus::Unknown,
            },
        );

        info!(flight = %key, airline = %caller, flight_number, "flight registered");
        self.emit(Notification::FlightRegistered {
            flight_key: key.to_string(),
            airline: caller.to_string(),
            flight_number: flight_number.to_string(),
            scheduled_at,
        });

        Ok(key)
    }

    /// Open a status lookup for a flight
    ///
    /// Draws an index and announces it; only oracles holding that index
    /// may answer. Asking again for the same (index, flight) re-announces
    /// the open request and keeps its accumulated reports. Once the flight
    /// carries a terminal status the question is settled and further
    /// requests are rejected.
    pub fn request_flight_status(
        &mut self,
        airline: &Address,
        flight_number: &str,
        scheduled_at: i64,
    ) -> Result<u8> {
        let flight_key = FlightKey::derive(airline, flight_number, scheduled_at);
        let flight = self
            .flights
            .get(&flight_key)
            .ok_or_else(|| Error::UnknownFlight(flight_key.to_string()))?;
        if flight.status != FlightStatus::Unknown {
            return Err(Error::FlightAlreadyResolved(flight_key.to_string()));
        }

        let index = self
            .index_source
            .next_index(airline, self.config.oracle.index_space);

        let request_key = RequestKey {
            index,
            airline: airline.clone(),
            flight_number: flight_number.to_string(),
            scheduled_at,
        };
        self.requests.entry(request_key).or_insert_with(OracleRequest::new);

        info!(flight = %flight_key, index, "oracle request opened");
        self.emit(Notification::OracleRequest {
            index,
            airline: airline.to_string(),
            flight_number: flight_number.to_string(),
            scheduled_at,
        });

        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::funded_state;

    fn addr(s: &str) -> Address {
        Address::from(s)
    }

    const SCHEDULED: i64 = 1_700_000_000_000;

    #[test]
    fn test_register_flight_starts_unknown() {
        let mut state = funded_state([]);
        let key = state
            .register_flight("FS-100", SCHEDULED, &addr("0xA1"))
            .unwrap();

        let flight = state.flight(&key).unwrap();
        assert_eq!(flight.status, FlightStatus::Unknown);
        assert_eq!(flight.flight_number, "FS-100");
        assert_eq!(flight.airline, addr("0xA1"));
    }

    #[test]
    fn test_unfunded_airline_cannot_register_flight() {
        let mut state = funded_state([]);
        state
            .register_airline("Borealis Air", &addr("0xA2"), &addr("0xA1"))
            .unwrap();

        // Registered but unfunded
        let result = state.register_flight("FS-200", SCHEDULED, &addr("0xA2"));
        assert!(matches!(result, Err(Error::Unauthorized(_))));
    }

    #[test]
    fn test_duplicate_flight_rejected() {
        let mut state = funded_state([]);
        state
            .register_flight("FS-100", SCHEDULED, &addr("0xA1"))
            .unwrap();

        let result = state.register_flight("FS-100", SCHEDULED, &addr("0xA1"));
        assert!(matches!(result, Err(Error::DuplicateFlight(_))));
        assert_eq!(state.flights().len(), 1);
    }

    #[test]
    fn test_same_number_different_time_allowed() {
        let mut state = funded_state([]);
        state
            .register_flight("FS-100", SCHEDULED, &addr("0xA1"))
            .unwrap();
        state
            .register_flight("FS-100", SCHEDULED + 86_400_000, &addr("0xA1"))
            .unwrap();
        assert_eq!(state.flights().len(), 2);
    }

    #[test]
    fn test_status_request_for_unknown_flight() {
        let mut state = funded_state([7]);
        let result = state.request_flight_status(&addr("0xA1"), "FS-404", SCHEDULED);
        assert!(matches!(result, Err(Error::UnknownFlight(_))));
    }

    #[test]
    fn test_status_request_draws_index() {
        let mut state = funded_state([7]);
        state
            .register_flight("FS-100", SCHEDULED, &addr("0xA1"))
            .unwrap();

        let index = state
            .request_flight_status(&addr("0xA1"), "FS-100", SCHEDULED)
            .unwrap();
        assert_eq!(index, 7);

        let request_key = RequestKey {
            index: 7,
            airline: addr("0xA1"),
            flight_number: "FS-100".to_string(),
            scheduled_at: SCHEDULED,
        };
        assert!(state.requests.contains_key(&request_key));
    }

    #[test]
    fn test_status_request_after_resolution_rejected() {
        use rust_decimal::Decimal;

        // Request at index 7; three oracles all hold it
        let mut state = funded_state([7, 7, 1, 2, 7, 3, 4, 7, 5, 6]);
        state
            .register_flight("FS-100", SCHEDULED, &addr("0xA1"))
            .unwrap();
        state
            .request_flight_status(&addr("0xA1"), "FS-100", SCHEDULED)
            .unwrap();
        for oracle in ["0xO1", "0xO2", "0xO3"] {
            state.register_oracle(&addr(oracle), Decimal::ONE).unwrap();
            state
                .submit_oracle_response(
                    7,
                    &addr("0xA1"),
                    "FS-100",
                    SCHEDULED,
                    FlightStatus::OnTime,
                    &addr(oracle),
                )
                .unwrap();
        }

        // The question is settled; no new request opens
        let result = state.request_flight_status(&addr("0xA1"), "FS-100", SCHEDULED);
        assert!(matches!(result, Err(Error::FlightAlreadyResolved(_))));
    }

    #[test]
    fn test_repeat_request_keeps_accumulated_reports() {
        let mut state = funded_state([7, 7]);
        state
            .register_flight("FS-100", SCHEDULED, &addr("0xA1"))
            .unwrap();
        state
            .request_flight_status(&addr("0xA1"), "FS-100", SCHEDULED)
            .unwrap();

        let request_key = RequestKey {
            index: 7,
            airline: addr("0xA1"),
            flight_number: "FS-100".to_string(),
            scheduled_at: SCHEDULED,
        };
        state
            .requests
            .get_mut(&request_key)
            .unwrap()
            .record(addr("0xO1"), FlightStatus::OnTime);

        // Second request for the same flight draws the same index
        state
            .request_flight_status(&addr("0xA1"), "FS-100", SCHEDULED)
            .unwrap();
        assert!(state.requests[&request_key].has_responded(&addr("0xO1")));
    }
}
