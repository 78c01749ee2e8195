use common_errors::ERROR_LOAN_POOL_NOT_FOUND;
use common_structs::{
    LoanPool, LoanTypeId, PoolId, UserLoanBorrow, UserLoanCollateral, UserPoolRewards,
};

use crate::storage;

multiversx_sc::imports!();

/// Reward accrual per loan pool and per position.
///
/// The loan pool indexes must be refreshed before any position amount they
/// weight is read or changed; the cache does it on first load.
#[multiversx_sc::module]
pub trait RewardsModule:
    storage::Storage
    + common_events::EventsModule
    + common_math::SharedMathModule
    + common_rates::InterestRates
{
    fn get_listed_loan_pool(
        &self,
        loan_type_id: LoanTypeId,
        pool_id: PoolId,
    ) -> LoanPool<Self::Api> {
        let mapper = self.loan_pool(loan_type_id, pool_id);
        require!(!mapper.is_empty(), ERROR_LOAN_POOL_NOT_FOUND);

        mapper.get()
    }

    fn update_reward_indexes(
        &self,
        loan_type_id: LoanTypeId,
        pool_id: PoolId,
        loan_pool: &mut LoanPool<Self::Api>,
        timestamp: u64,
    ) {
        if !self.accrue_reward_indexes(loan_pool, timestamp) {
            return;
        }

        self.reward_indexes_updated_event(
            loan_type_id,
            pool_id,
            &loan_pool.reward.collateral_reward_index,
            &loan_pool.reward.borrow_reward_index,
        );
    }

    /// Grows both reward indexes of a loan pool up to `timestamp`. An index
    /// stays put while its used amount is at or below the minimum amount.
    fn accrue_reward_indexes(&self, loan_pool: &mut LoanPool<Self::Api>, timestamp: u64) -> bool {
        let reward = &mut loan_pool.reward;
        if timestamp <= reward.last_update_timestamp {
            return false;
        }
        let elapsed = timestamp - reward.last_update_timestamp;

        let collateral_delta = self.calc_reward_index_delta(
            &loan_pool.collateral_used,
            &reward.minimum_amount,
            &reward.collateral_speed,
            elapsed,
        );
        let borrow_delta = self.calc_reward_index_delta(
            &loan_pool.borrow_used,
            &reward.minimum_amount,
            &reward.borrow_speed,
            elapsed,
        );

        reward.collateral_reward_index += &collateral_delta;
        reward.borrow_reward_index += &borrow_delta;
        reward.last_update_timestamp = timestamp;

        true
    }

    /// Credits the collateral reward earned since the entry's last index and
    /// moves the entry to the current index.
    fn update_user_collateral_reward(
        &self,
        account_id: &ManagedBuffer,
        pool_id: PoolId,
        loan_pool: &LoanPool<Self::Api>,
        collateral: &mut UserLoanCollateral<Self::Api>,
    ) {
        let index = &loan_pool.reward.collateral_reward_index;
        let accrued = self.calc_accrued_rewards(&collateral.balance, index, &collateral.reward_index);

        let mut rewards = self.get_user_pool_rewards(account_id, pool_id);
        rewards.collateral += &accrued;
        self.user_pool_rewards(account_id, pool_id).set(&rewards);

        collateral.reward_index = index.clone();
    }

    /// Borrow rewards are weighted by principal, interest does not earn.
    fn update_user_borrow_reward(
        &self,
        account_id: &ManagedBuffer,
        pool_id: PoolId,
        loan_pool: &LoanPool<Self::Api>,
        borrow: &mut UserLoanBorrow<Self::Api>,
    ) {
        let index = &loan_pool.reward.borrow_reward_index;
        let accrued = self.calc_accrued_rewards(&borrow.amount, index, &borrow.reward_index);

        let mut rewards = self.get_user_pool_rewards(account_id, pool_id);
        rewards.borrow += &accrued;
        self.user_pool_rewards(account_id, pool_id).set(&rewards);

        borrow.reward_index = index.clone();
    }

    /// Same as `update_user_borrow_reward`, weighted by the principal before
    /// the repayment, and records the interest repaid.
    fn update_user_borrow_reward_with_repay(
        &self,
        account_id: &ManagedBuffer,
        pool_id: PoolId,
        loan_pool: &LoanPool<Self::Api>,
        borrow: &mut UserLoanBorrow<Self::Api>,
        interest_paid: &ManagedDecimal<Self::Api, NumDecimals>,
    ) {
        self.update_user_borrow_reward(account_id, pool_id, loan_pool, borrow);

        let mut rewards = self.get_user_pool_rewards(account_id, pool_id);
        rewards.interest_paid += interest_paid;
        self.user_pool_rewards(account_id, pool_id).set(&rewards);
    }

    /// Stored rewards of an account in a pool, zero when nothing accrued yet.
    fn get_user_pool_rewards(
        &self,
        account_id: &ManagedBuffer,
        pool_id: PoolId,
    ) -> UserPoolRewards<Self::Api> {
        let mapper = self.user_pool_rewards(account_id, pool_id);
        if mapper.is_empty() {
            return UserPoolRewards {
                collateral: self.wad_zero(),
                borrow: self.wad_zero(),
                interest_paid: self.zero_at(self.pool_config(pool_id).get().asset_decimals),
            };
        }

        mapper.get()
    }
}
