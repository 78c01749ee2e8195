use common_errors::{
    ERROR_NOT_STABLE_BORROW, ERROR_NO_BORROW_IN_POOL, ERROR_REBALANCE_DOWN_THRESHOLD_NOT_MET,
    ERROR_REBALANCE_UP_THRESHOLD_NOT_MET,
};
use common_structs::{LoanId, PoolId, UserLoan, UserLoanBorrow};

use crate::{cache::Cache, helpers, oracle, pools, rewards, storage};

use super::{account, update};

multiversx_sc::imports!();

/// Re-pricing of stable borrows to the pool's current stable rate. Anyone may
/// trigger it once the pool crosses the thresholds of its rate parameters.
#[multiversx_sc::module]
pub trait PositionRebalanceModule:
    storage::Storage
    + oracle::OracleModule
    + pools::PoolModule
    + rewards::RewardsModule
    + helpers::MathsModule
    + account::PositionAccountModule
    + update::PositionUpdateModule
    + common_events::EventsModule
    + common_math::SharedMathModule
    + common_rates::InterestRates
{
    /// Allowed while utilisation is at or above the rebalance-up ratio and the
    /// deposit rate is at or below its threshold.
    fn process_rebalance_up(&self, loan_id: LoanId, pool_id: PoolId, cache: &mut Cache<Self>) {
        let mut loan = self.get_active_loan(loan_id);
        let borrow = self.get_stable_borrow(&loan, pool_id);

        let config = cache.get_pool_config(pool_id);
        let state = cache.get_pool_state(pool_id);
        let params = &config.interest_rate_params;
        let utilisation = self.calc_utilisation_ratio(&state.total_debt(), &state.deposit_total);
        require!(
            utilisation >= self.calc_rebalance_up_utilisation_threshold(params)
                && state.deposit_interest_rate
                    <= self.calc_rebalance_up_deposit_rate_threshold(params),
            ERROR_REBALANCE_UP_THRESHOLD_NOT_MET
        );

        let (old_rate, new_rate) = self.rebalance_stable_rate(&mut loan, pool_id, borrow, cache);
        self.user_loan(loan_id).set(&loan);

        self.rebalance_up_event(loan_id, pool_id, &old_rate, &new_rate);
    }

    /// Allowed while the loan's rate is above the pool's stable rate by more
    /// than the rebalance-down delta.
    fn process_rebalance_down(&self, loan_id: LoanId, pool_id: PoolId, cache: &mut Cache<Self>) {
        let mut loan = self.get_active_loan(loan_id);
        let borrow = self.get_stable_borrow(&loan, pool_id);

        let config = cache.get_pool_config(pool_id);
        let state = cache.get_pool_state(pool_id);
        let threshold = self.calc_rebalance_down_rate_threshold(
            &config.interest_rate_params,
            &state.stable_borrow_interest_rate,
        );
        require!(
            borrow.stable_interest_rate > threshold,
            ERROR_REBALANCE_DOWN_THRESHOLD_NOT_MET
        );

        let (old_rate, new_rate) = self.rebalance_stable_rate(&mut loan, pool_id, borrow, cache);
        self.user_loan(loan_id).set(&loan);

        self.rebalance_down_event(loan_id, pool_id, &old_rate, &new_rate);
    }

    /// Settles interest at the old rate, then moves the borrow to the pool's
    /// current stable rate.
    ///
    /// # Returns
    /// - `(old_rate, new_rate)`
    fn rebalance_stable_rate(
        &self,
        loan: &mut UserLoan<Self::Api>,
        pool_id: PoolId,
        mut borrow: UserLoanBorrow<Self::Api>,
        cache: &mut Cache<Self>,
    ) -> (
        ManagedDecimal<Self::Api, NumDecimals>,
        ManagedDecimal<Self::Api, NumDecimals>,
    ) {
        let state = cache.get_pool_state(pool_id);
        let loan_pool = cache.get_loan_pool(loan.loan_type_id, pool_id);
        self.update_loan_borrow_interests(&mut borrow, &state, cache.timestamp);
        self.update_user_borrow_reward(&loan.account_id, pool_id, &loan_pool, &mut borrow);

        let old_rate = borrow.stable_interest_rate.clone();
        let new_rate = self.update_pool_with_rebalance(pool_id, &borrow.amount, &old_rate, cache);
        borrow.stable_interest_rate = new_rate.clone();

        loan.set_borrow(pool_id, borrow);

        (old_rate, new_rate)
    }

    fn get_stable_borrow(&self, loan: &UserLoan<Self::Api>, pool_id: PoolId) -> UserLoanBorrow<Self::Api> {
        let borrow = loan
            .get_borrow(pool_id)
            .unwrap_or_else(|| sc_panic!(ERROR_NO_BORROW_IN_POOL));
        require!(borrow.is_stable(), ERROR_NOT_STABLE_BORROW);

        borrow
    }
}
