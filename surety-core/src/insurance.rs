//! Insurance ledger and payouts
//!
//! Passengers buy bounded-premium policies against registered flights.
//! When oracle quorum resolves a flight LateAirline, every unsettled
//! policy on it is credited at the configured multiplier. Withdrawal
//! zeroes the balance before any value leaves the ledger, so a
//! re-entrant withdraw observes nothing owed.

use crate::{
    state::LedgerState,
    types::{Address, FlightKey, InsurancePolicy},
    Error, Result,
};
use rust_decimal::Decimal;
use surety_events::Notification;
use tracing::info;

impl LedgerState {
    /// Buy an insurance policy on a flight
    #[allow(clippy::too_many_arguments)]
    pub fn buy_insurance(
        &mut self,
        passenger_name: &str,
        airline: &Address,
        flight_number: &str,
        scheduled_at: i64,
        premium: Decimal,
        caller: &Address,
    ) -> Result<FlightKey> {
        let key = FlightKey::derive(airline, flight_number, scheduled_at);
        if !self.flights.contains_key(&key) {
            return Err(Error::UnknownFlight(key.to_string()));
        }

        let max = self.config.max_premium;
        if premium <= Decimal::ZERO || premium > max {
            return Err(Error::PremiumOutOfRange { premium, max });
        }

        let policies = self.policies.entry(key).or_default();
        if policies.iter().any(|p| &p.passenger == caller) {
            return Err(Error::DuplicatePolicy(key.to_string()));
        }

        policies.push(InsurancePolicy {
            passenger: caller.clone(),
            passenger_name: passenger_name.to_string(),
            flight: key,
            premium,
            credited: Decimal::ZERO,
            settled: false,
        });

        info!(flight = %key, passenger = %caller, %premium, "insurance purchased");
        self.emit(Notification::PassengerPurchasedInsurance {
            passenger: caller.to_string(),
            flight_key: key.to_string(),
            premium,
        });

        Ok(key)
    }

    /// Credit every unsettled policy on a flight
    ///
    /// Invoked only from quorum resolution on LateAirline, which fires at
    /// most once per flight.
    pub(crate) fn credit_insurees(&mut self, key: FlightKey) {
        let multiplier = self.config.payout_multiplier;
        let mut credited_policies = 0usize;
        let mut total_credited = Decimal::ZERO;

        if let Some(policies) = self.policies.get_mut(&key) {
            for policy in policies.iter_mut().filter(|p| !p.settled) {
                let credit = policy.premium * multiplier;
                policy.credited = credit;
                policy.settled = true;

                *self
                    .balances
                    .entry(policy.passenger.clone())
                    .or_insert(Decimal::ZERO) += credit;

                credited_policies += 1;
                total_credited += credit;
            }
        }

        self.metrics
            .policies_settled
            .inc_by(credited_policies as u64);
        info!(flight = %key, credited_policies, %total_credited, "insurees credited");
        self.emit(Notification::FlightCreditInsurees {
            flight_key: key.to_string(),
            policies_credited: credited_policies,
            total_credited,
        });
    }

    /// Withdraw a passenger's accumulated credits
    ///
    /// The balance is zeroed before the amount is handed back; a repeat
    /// call, even re-entrant, finds nothing owed.
    pub fn withdraw_funds(&mut self, caller: &Address) -> Result<Decimal> {
        let owed = match self.balances.get_mut(caller) {
            Some(balance) if *balance > Decimal::ZERO => std::mem::take(balance),
            _ => return Err(Error::NothingOwed(caller.to_string())),
        };

        self.metrics.withdrawals.inc();
        info!(passenger = %caller, amount = %owed, "balance withdrawn");
        self.emit(Notification::PassengerWithdrawBalance {
            passenger: caller.to_string(),
            amount: owed,
        });

        Ok(owed)
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

    fn state_with_flight() -> LedgerState {
        let mut state = funded_state([]);
        state
            .register_flight("FS-100", SCHEDULED, &addr("0xA1"))
            .unwrap();
        state
    }

    fn buy(state: &mut LedgerState, passenger: &str, premium: Decimal) -> Result<FlightKey> {
        state.buy_insurance(
            "Jordan",
            &addr("0xA1"),
            "FS-100",
            SCHEDULED,
            premium,
            &addr(passenger),
        )
    }

    #[test]
    fn test_buy_insurance_on_unknown_flight() {
        let mut state = funded_state([]);
        let result = state.buy_insurance(
            "Jordan",
            &addr("0xA1"),
            "FS-404",
            SCHEDULED,
            Decimal::new(5, 1),
            &addr("0xP1"),
        );
        assert!(matches!(result, Err(Error::UnknownFlight(_))));
    }

    #[test]
    fn test_premium_bounds() {
        let mut state = state_with_flight();

        assert!(matches!(
            buy(&mut state, "0xP1", Decimal::ZERO),
            Err(Error::PremiumOutOfRange { .. })
        ));
        assert!(matches!(
            buy(&mut state, "0xP1", Decimal::new(-5, 1)),
            Err(Error::PremiumOutOfRange { .. })
        ));
        assert!(matches!(
            buy(&mut state, "0xP1", Decimal::new(11, 1)),
            Err(Error::PremiumOutOfRange { .. })
        ));

        // Boundary: exactly the cap is allowed
        buy(&mut state, "0xP1", Decimal::ONE).unwrap();
    }

    #[test]
    fn test_duplicate_policy_rejected() {
        let mut state = state_with_flight();
        buy(&mut state, "0xP1", Decimal::new(5, 1)).unwrap();

        let result = buy(&mut state, "0xP1", Decimal::new(3, 1));
        assert!(matches!(result, Err(Error::DuplicatePolicy(_))));
    }

    #[test]
    fn test_settlement_credits_premium_times_multiplier() {
        let mut state = state_with_flight();
        let key = buy(&mut state, "0xP1", Decimal::new(8, 1)).unwrap(); // 0.8
        buy(&mut state, "0xP2", Decimal::new(4, 1)).unwrap(); // 0.4

        state.credit_insurees(key);

        assert_eq!(
            state.withdrawal_balance(&addr("0xP1")),
            Decimal::new(12, 1) // 0.8 * 1.5
        );
        assert_eq!(
            state.withdrawal_balance(&addr("0xP2")),
            Decimal::new(6, 1) // 0.4 * 1.5
        );

        let policies = state.policies(&key);
        assert!(policies.iter().all(|p| p.settled));
    }

    #[test]
    fn test_settlement_skips_already_settled() {
        let mut state = state_with_flight();
        let key = buy(&mut state, "0xP1", Decimal::new(8, 1)).unwrap();

        state.credit_insurees(key);
        let balance = state.withdrawal_balance(&addr("0xP1"));

        state.credit_insurees(key);
        assert_eq!(state.withdrawal_balance(&addr("0xP1")), balance);
    }

    #[test]
    fn test_settlement_leaves_other_flights_untouched() {
        let mut state = state_with_flight();
        state
            .register_flight("FS-200", SCHEDULED, &addr("0xA1"))
            .unwrap();

        let key_100 = buy(&mut state, "0xP1", Decimal::new(8, 1)).unwrap();
        let key_200 = state
            .buy_insurance(
                "Sam",
                &addr("0xA1"),
                "FS-200",
                SCHEDULED,
                Decimal::new(6, 1),
                &addr("0xP2"),
            )
            .unwrap();

        state.credit_insurees(key_100);

        assert_eq!(state.withdrawal_balance(&addr("0xP2")), Decimal::ZERO);
        assert!(!state.policies(&key_200)[0].settled);
    }

    #[test]
    fn test_withdraw_zero_balance() {
        let mut state = funded_state([]);
        let result = state.withdraw_funds(&addr("0xP1"));
        assert!(matches!(result, Err(Error::NothingOwed(_))));
    }

    #[test]
    fn test_withdraw_zeroes_then_returns() {
        let mut state = state_with_flight();
        let key = buy(&mut state, "0xP1", Decimal::new(8, 1)).unwrap();
        state.credit_insurees(key);

        let amount = state.withdraw_funds(&addr("0xP1")).unwrap();
        assert_eq!(amount, Decimal::new(12, 1));
        assert_eq!(state.withdrawal_balance(&addr("0xP1")), Decimal::ZERO);

        // A repeat withdraw observes the zeroed balance
        let result = state.withdraw_funds(&addr("0xP1"));
        assert!(matches!(result, Err(Error::NothingOwed(_))));
    }
}
