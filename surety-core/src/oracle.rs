//! Oracle consensus protocol
//!
//! Oracles register against a fee and receive three immutable indices.
//! Responses are validated against the caller's indices and the open
//! request set; the first status code to accumulate a quorum of distinct
//! reporters resolves the flight. Reports arriving after resolution are
//! kept for audit and change nothing.

use crate::{
    state::LedgerState,
    types::{Address, FlightStatus, Oracle, RequestKey},
    Error, Result,
};
use rust_decimal::Decimal;
use surety_events::Notification;
use tracing::{debug, info};

impl LedgerState {
    /// Register an oracle and assign its three indices
    ///
    /// Re-registering is idempotent: the originally assigned indices are
    /// returned again.
    pub fn register_oracle(&mut self, caller: &Address, fee: Decimal) -> Result<[u8; 3]> {
        let required = self.config.oracle.registration_fee;
        if fee < required {
            return Err(Error::InsufficientFee { fee, required });
        }

        if let Some(oracle) = self.oracles.get(caller) {
            return Ok(oracle.indexes);
        }

        let indexes = self
            .index_source
            .oracle_indexes(caller, self.config.oracle.index_space);

        self.oracles.insert(
            caller.clone(),
            Oracle {
                address: caller.clone(),
                indexes,
            },
        );

        info!(oracle = %caller, ?indexes, "oracle registered");
        Ok(indexes)
    }

    /// Submit an oracle's status report
    ///
    /// A repeat report from the same oracle on the same request is a
    /// silent no-op. When a status code reaches quorum on an unresolved
    /// request, the flight is finalized and, for LateAirline, every
    /// policy on it is settled in the same operation.
    #[allow(clippy::too_many_arguments)]
    pub fn submit_oracle_response(
        &mut self,
        index: u8,
        airline: &Address,
        flight_number: &str,
        scheduled_at: i64,
        status: FlightStatus,
        caller: &Address,
    ) -> Result<()> {
        let oracle = self
            .oracles
            .get(caller)
            .ok_or_else(|| Error::OracleNotRegistered(caller.to_string()))?;

        if !oracle.has_index(index) {
            return Err(Error::IndexMismatch(index));
        }

        let request_key = RequestKey {
            index,
            airline: airline.clone(),
            flight_number: flight_number.to_string(),
            scheduled_at,
        };
        let request = self
            .requests
            .get_mut(&request_key)
            .ok_or(Error::NoOpenRequest(index))?;

        if request.has_responded(caller) {
            debug!(oracle = %caller, index, "repeat report ignored");
            return Ok(());
        }

        let matching = request.record(caller.clone(), status);
        let resolves = !request.resolved && matching >= self.config.oracle.quorum;
        if resolves {
            request.resolved = true;
        }

        self.metrics.oracle_reports.inc();
        self.emit(Notification::OracleReport {
            index,
            airline: airline.to_string(),
            flight_number: flight_number.to_string(),
            scheduled_at,
            status_code: status.code(),
            oracle: caller.to_string(),
        });

        if resolves {
            self.resolve_flight(&request_key, status);
        }

        Ok(())
    }

    /// Finalize a flight's status after quorum
    ///
    /// Keyed to the flight's single Unknown-to-terminal transition, not to
    /// the request: several requests can be open on one flight, and only
    /// the first quorum across all of them writes the status and settles.
    fn resolve_flight(&mut self, request_key: &RequestKey, status: FlightStatus) {
        let flight_key = request_key.flight_key();

        let transitioned = match self.flights.get_mut(&flight_key) {
            Some(flight) if flight.status == FlightStatus::Unknown => {
                flight.status = status;
                true
            }
            _ => false,
        };
        if !transitioned {
            debug!(flight = %flight_key, "quorum on an already-resolved flight ignored");
            return;
        }

        self.metrics.flights_resolved.inc();
        info!(flight = %flight_key, status_code = status.code(), "flight status resolved");
        self.emit(Notification::FlightStatus {
            flight_key: flight_key.to_string(),
            status_code: status.code(),
        });

        if status == FlightStatus::LateAirline {
            self.credit_insurees(flight_key);
        }
    }
}
