//! Airline governance
//!
//! Admission state machine: the first airlines (up to the configured
//! direct-admission limit) are registered by any funded airline without a
//! vote; later candidates queue until half of the funded airlines have
//! voted for them. Funding escrow promotes Registered to Funded, the
//! terminal status. No transition is ever reversed.

use crate::{
    state::LedgerState,
    types::{Address, Airline, AirlineStatus},
    Error, Result,
};
use rust_decimal::Decimal;
use surety_events::Notification;
use tracing::info;

impl LedgerState {
    /// Register a new airline
    ///
    /// Returns the status the airline landed in: `Registered` below the
    /// direct-admission limit, `Queued` from then on.
    pub fn register_airline(
        &mut self,
        name: &str,
        address: &Address,
        caller: &Address,
    ) -> Result<AirlineStatus> {
        self.require_funded(caller)?;

        if self.airlines.contains_key(address) {
            return Err(Error::DuplicateAirline(address.to_string()));
        }

        let status = if self.admitted_count() < self.config.direct_admission_limit {
            AirlineStatus::Registered
        } else {
            AirlineStatus::Queued
        };

        self.airlines
            .insert(address.clone(), Airline::new(address.clone(), name, status));

        info!(airline = %address, ?status, "airline registered");
        match status {
            AirlineStatus::Registered => self.emit(Notification::AirlineRegistered {
                airline: address.to_string(),
                name: name.to_string(),
            }),
            _ => self.emit(Notification::AirlineQueued {
                airline: address.to_string(),
                name: name.to_string(),
            }),
        }

        Ok(status)
    }

    /// Vote for a queued airline
    ///
    /// Returns the candidate's vote count after this vote. If the count
    /// reaches half the funded airlines (ties admit), the candidate
    /// transitions to Registered within the same operation.
    pub fn vote_airline(&mut self, candidate: &Address, caller: &Address) -> Result<usize> {
        self.require_funded(caller)?;

        let funded = self.funded_count();
        let airline = self
            .airlines
            .get_mut(candidate)
            .ok_or_else(|| Error::UnknownAirline(candidate.to_string()))?;

        if !airline.votes.insert(caller.clone()) {
            return Err(Error::DuplicateVote(candidate.to_string()));
        }

        let votes = airline.vote_count();
        let name = airline.name.clone();
        let reached_quorum = airline.status == AirlineStatus::Queued && votes * 2 >= funded;
        if reached_quorum {
            airline.status = AirlineStatus::Registered;
        }

        info!(candidate = %candidate, voter = %caller, votes, "vote recorded");
        self.emit(Notification::AirlineVoted {
            candidate: candidate.to_string(),
            voter: caller.to_string(),
            votes,
        });

        if reached_quorum {
            info!(candidate = %candidate, votes, funded, "vote quorum reached");
            self.emit(Notification::AirlineRegistered {
                airline: candidate.to_string(),
                name,
            });
        }

        Ok(votes)
    }

    /// Fund an airline's escrow
    ///
    /// Promotes Registered to Funded; re-funding an already-Funded
    /// airline simply adds escrow.
    pub fn fund_airline(&mut self, caller: &Address, amount: Decimal) -> Result<()> {
        let minimum = self.config.min_airline_funding;

        let airline = self
            .airlines
            .get_mut(caller)
            .filter(|a| a.status.is_admitted())
            .ok_or_else(|| Error::Unauthorized(format!("{} is not an admitted airline", caller)))?;

        if amount < minimum {
            return Err(Error::InsufficientFunds { amount, minimum });
        }

        airline.escrow += amount;
        airline.status = AirlineStatus::Funded;
        let escrow = airline.escrow;

        info!(airline = %caller, %amount, %escrow, "airline funded");
        self.emit(Notification::AirlineFunded {
            airline: caller.to_string(),
            escrow,
        });

        Ok(())
    }
}
