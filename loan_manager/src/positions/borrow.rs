use common_errors::{
    ERROR_AMOUNT_MUST_BE_GREATER_THAN_ZERO, ERROR_BORROW_TYPE_MISMATCH, ERROR_BORROW_TYPE_UNCHANGED,
    ERROR_LOAN_BORROW_CAP_REACHED, ERROR_LOAN_UNDER_COLLATERALIZED,
    ERROR_MAX_OVER_REPAYMENT_EXCEEDED, ERROR_NO_BORROW_IN_POOL, ERROR_NO_COLLATERAL_IN_POOL,
};
use common_math::Rounding;
use common_structs::{BorrowType, LoanId, PoolId, UserLoan, UserLoanBorrow};

use crate::{cache::Cache, helpers, oracle, pools, rewards, storage};

use super::{account, collateral, liquidity, update};

multiversx_sc::imports!();

/// Split of a repayment against an owed balance, asset decimals.
pub struct RepaidBorrow<M: ManagedTypeApi> {
    pub principal_paid: ManagedDecimal<M, NumDecimals>,
    pub interest_paid: ManagedDecimal<M, NumDecimals>,
    pub excess: ManagedDecimal<M, NumDecimals>,
    /// Rate of the entry before the repayment, zero when variable.
    pub stable_rate: ManagedDecimal<M, NumDecimals>,
}

#[multiversx_sc::module]
pub trait PositionBorrowModule:
    storage::Storage
    + oracle::OracleModule
    + pools::PoolModule
    + pools::token::TokenPoolModule
    + rewards::RewardsModule
    + helpers::MathsModule
    + account::PositionAccountModule
    + update::PositionUpdateModule
    + liquidity::PositionLiquidityModule
    + collateral::PositionCollateralModule
    + common_events::EventsModule
    + common_math::SharedMathModule
    + common_rates::InterestRates
{
    /// Adds `amount` of principal to the loan's borrow in `pool_id`.
    ///
    /// An existing entry is brought up to date first. A stable entry takes the
    /// balance weighted average of its rate and `stable_rate`, rounded up.
    ///
    /// # Arguments
    /// - `stable_rate`: Zero for a variable borrow.
    ///
    /// # Errors
    /// - `ERROR_BORROW_TYPE_MISMATCH`: the existing entry is of the other regime.
    /// - `ERROR_LOAN_BORROW_CAP_REACHED`: dollar value of the loan pool's
    ///   borrowed principal, rounded up, above its cap.
    fn increase_borrow(
        &self,
        loan: &mut UserLoan<Self::Api>,
        pool_id: PoolId,
        amount: &ManagedDecimal<Self::Api, NumDecimals>,
        stable_rate: &ManagedDecimal<Self::Api, NumDecimals>,
        cache: &mut Cache<Self>,
    ) {
        if amount.into_raw_units() == &BigUint::zero() {
            return;
        }

        let state = cache.get_pool_state(pool_id);
        let mut loan_pool = cache.get_loan_pool(loan.loan_type_id, pool_id);
        let is_stable = stable_rate.into_raw_units() > &BigUint::zero();

        let mut borrow = match loan.get_borrow(pool_id) {
            Some(mut existing) => {
                require!(existing.is_stable() == is_stable, ERROR_BORROW_TYPE_MISMATCH);
                self.update_loan_borrow_interests(&mut existing, &state, cache.timestamp);
                self.update_user_borrow_reward(&loan.account_id, pool_id, &loan_pool, &mut existing);
                if is_stable {
                    existing.stable_interest_rate = self.calc_stable_interest_rate(
                        &existing.balance,
                        &existing.stable_interest_rate,
                        amount,
                        stable_rate,
                    );
                }
                existing
            },
            None => UserLoanBorrow {
                amount: self.zero_at(amount.scale()),
                balance: self.zero_at(amount.scale()),
                last_interest_index: state.variable_borrow_interest_index.clone(),
                stable_interest_rate: stable_rate.clone(),
                last_stable_update_timestamp: if is_stable { cache.timestamp } else { 0 },
                reward_index: loan_pool.reward.borrow_reward_index.clone(),
            },
        };

        borrow.amount += amount;
        borrow.balance += amount;
        loan_pool.borrow_used += amount;

        if let Some(cap) = &loan_pool.borrow_cap {
            let feed = cache.get_price_feed(pool_id);
            let value = self.get_token_value(&loan_pool.borrow_used, &feed, Rounding::Ceil);
            require!(
                !self.exceeds_dollar_cap(&value, cap),
                ERROR_LOAN_BORROW_CAP_REACHED
            );
        }

        cache.set_loan_pool(loan.loan_type_id, pool_id, &loan_pool);
        loan.set_borrow(pool_id, borrow);
    }

    /// Applies a repayment of `amount` to the loan's borrow in `pool_id`.
    ///
    /// Interest is paid before principal. Whatever exceeds the updated balance
    /// is returned as `excess`; the entry is dropped once fully repaid.
    fn decrease_borrow(
        &self,
        loan: &mut UserLoan<Self::Api>,
        pool_id: PoolId,
        amount: &ManagedDecimal<Self::Api, NumDecimals>,
        cache: &mut Cache<Self>,
    ) -> RepaidBorrow<Self::Api> {
        let mut borrow = loan
            .get_borrow(pool_id)
            .unwrap_or_else(|| sc_panic!(ERROR_NO_BORROW_IN_POOL));
        let stable_rate = borrow.stable_interest_rate.clone();

        if amount.into_raw_units() == &BigUint::zero() {
            return RepaidBorrow {
                principal_paid: self.zero_at(amount.scale()),
                interest_paid: self.zero_at(amount.scale()),
                excess: self.zero_at(amount.scale()),
                stable_rate,
            };
        }

        let state = cache.get_pool_state(pool_id);
        let mut loan_pool = cache.get_loan_pool(loan.loan_type_id, pool_id);
        self.update_loan_borrow_interests(&mut borrow, &state, cache.timestamp);

        let repaid = self.get_min(amount.clone(), borrow.balance.clone());
        let excess = amount.clone() - repaid.clone();
        let interest_paid = self.get_min(repaid.clone(), borrow.interest());
        let principal_paid = repaid.clone() - interest_paid.clone();

        self.update_user_borrow_reward_with_repay(
            &loan.account_id,
            pool_id,
            &loan_pool,
            &mut borrow,
            &interest_paid,
        );

        borrow.amount -= &principal_paid;
        borrow.balance -= &repaid;
        loan_pool.borrow_used = self.sub_or_zero(&loan_pool.borrow_used, &principal_paid);

        cache.set_loan_pool(loan.loan_type_id, pool_id, &loan_pool);
        loan.set_borrow(pool_id, borrow);

        RepaidBorrow {
            principal_paid,
            interest_paid,
            excess,
            stable_rate,
        }
    }

    /// # Arguments
    /// - `max_stable_rate`: Zero for a variable borrow, otherwise the highest
    ///   stable rate accepted, 18 decimals.
    ///
    /// # Returns
    /// - `(amount, stable_rate, metadata)`
    fn process_borrow(
        &self,
        loan_id: LoanId,
        loan: &mut UserLoan<Self::Api>,
        pool_id: PoolId,
        amount: BigUint,
        max_stable_rate: BigUint,
        recipient: &ManagedAddress,
        cache: &mut Cache<Self>,
    ) -> (
        ManagedDecimal<Self::Api, NumDecimals>,
        ManagedDecimal<Self::Api, NumDecimals>,
        ManagedBuffer,
    ) {
        require!(amount > 0u64, ERROR_AMOUNT_MUST_BE_GREATER_THAN_ZERO);
        self.require_loan_pool_open(loan, pool_id, cache);

        let is_stable = max_stable_rate > 0u64;
        if let Some(existing) = loan.get_borrow(pool_id) {
            require!(existing.is_stable() == is_stable, ERROR_BORROW_TYPE_MISMATCH);
        }

        let config = cache.get_pool_config(pool_id);
        let amount = self.to_decimal(amount, config.asset_decimals);
        let max_stable_rate = self.to_decimal_wad(max_stable_rate);

        let stable_rate = self.update_pool_with_borrow(
            pool_id,
            &amount,
            if is_stable { Some(&max_stable_rate) } else { None },
            cache,
        );
        self.increase_borrow(loan, pool_id, &amount, &stable_rate, cache);
        self.require_loan_healthy(loan, cache, ERROR_LOAN_UNDER_COLLATERALIZED);

        self.borrow_event(loan_id, pool_id, &amount, &stable_rate);

        let metadata = self.send_token(pool_id, &config, recipient, amount.into_raw_units());

        (amount, stable_rate, metadata)
    }

    /// # Arguments
    /// - `max_over_repayment`: Largest excess over the owed balance accepted,
    ///   asset decimals.
    fn process_repay(
        &self,
        loan_id: LoanId,
        loan: &mut UserLoan<Self::Api>,
        pool_id: PoolId,
        amount: BigUint,
        max_over_repayment: BigUint,
        cache: &mut Cache<Self>,
    ) -> RepaidBorrow<Self::Api> {
        require!(amount > 0u64, ERROR_AMOUNT_MUST_BE_GREATER_THAN_ZERO);

        let config = cache.get_pool_config(pool_id);
        let amount = self.to_decimal(amount, config.asset_decimals);
        let max_over_repayment = self.to_decimal(max_over_repayment, config.asset_decimals);

        let repaid = self.decrease_borrow(loan, pool_id, &amount, cache);
        require!(
            repaid.excess <= max_over_repayment,
            ERROR_MAX_OVER_REPAYMENT_EXCEEDED
        );

        self.update_pool_with_repay(
            pool_id,
            &repaid.principal_paid,
            &repaid.interest_paid,
            &repaid.excess,
            &repaid.stable_rate,
            cache,
        );

        self.repay_event(
            loan_id,
            pool_id,
            &repaid.principal_paid,
            &repaid.interest_paid,
            &repaid.excess,
        );

        repaid
    }

    /// Repays the borrow in `pool_id` by burning the loan's collateral in the
    /// same pool. The repayment is capped at the owed balance.
    fn process_repay_with_collateral(
        &self,
        loan_id: LoanId,
        loan: &mut UserLoan<Self::Api>,
        pool_id: PoolId,
        amount: BigUint,
        cache: &mut Cache<Self>,
    ) -> RepaidBorrow<Self::Api> {
        require!(amount > 0u64, ERROR_AMOUNT_MUST_BE_GREATER_THAN_ZERO);
        require!(
            loan.get_collateral(pool_id).is_some(),
            ERROR_NO_COLLATERAL_IN_POOL
        );
        let borrow = loan
            .get_borrow(pool_id)
            .unwrap_or_else(|| sc_panic!(ERROR_NO_BORROW_IN_POOL));

        let config = cache.get_pool_config(pool_id);
        let state = cache.get_pool_state(pool_id);
        let owed = self.get_updated_borrow(&borrow, &state, cache.timestamp).balance;
        let amount = self.get_min(self.to_decimal(amount, config.asset_decimals), owed);

        let repaid = self.decrease_borrow(loan, pool_id, &amount, cache);
        let f_amount = self.update_pool_with_repay_with_collateral(
            pool_id,
            &repaid.principal_paid,
            &repaid.interest_paid,
            &repaid.stable_rate,
            cache,
        );
        self.decrease_collateral(loan, pool_id, &f_amount, cache);
        self.require_loan_healthy(loan, cache, ERROR_LOAN_UNDER_COLLATERALIZED);

        self.repay_with_collateral_event(
            loan_id,
            pool_id,
            &repaid.principal_paid,
            &repaid.interest_paid,
            &f_amount,
        );

        repaid
    }

    /// Moves the whole borrow in `pool_id` to the other rate regime.
    ///
    /// # Arguments
    /// - `max_stable_rate`: Highest rate accepted when switching to stable,
    ///   18 decimals. Ignored when switching to variable.
    fn process_switch_borrow_type(
        &self,
        loan_id: LoanId,
        loan: &mut UserLoan<Self::Api>,
        pool_id: PoolId,
        borrow_type: BorrowType,
        max_stable_rate: BigUint,
        cache: &mut Cache<Self>,
    ) {
        let mut borrow = loan
            .get_borrow(pool_id)
            .unwrap_or_else(|| sc_panic!(ERROR_NO_BORROW_IN_POOL));
        require!(borrow.borrow_type() != borrow_type, ERROR_BORROW_TYPE_UNCHANGED);

        let state = cache.get_pool_state(pool_id);
        let loan_pool = cache.get_loan_pool(loan.loan_type_id, pool_id);
        self.update_loan_borrow_interests(&mut borrow, &state, cache.timestamp);
        self.update_user_borrow_reward(&loan.account_id, pool_id, &loan_pool, &mut borrow);

        let max_stable_rate = self.to_decimal_wad(max_stable_rate);
        let new_rate = self.update_pool_with_switch_borrow_type(
            pool_id,
            &borrow.amount,
            borrow.borrow_type(),
            &borrow.stable_interest_rate,
            &max_stable_rate,
            cache,
        );

        match borrow_type {
            BorrowType::Stable => {
                borrow.stable_interest_rate = new_rate.clone();
                borrow.last_stable_update_timestamp = cache.timestamp;
            },
            BorrowType::Variable => {
                borrow.stable_interest_rate = self.wad_zero();
                borrow.last_stable_update_timestamp = 0;
                borrow.last_interest_index = state.variable_borrow_interest_index.clone();
            },
        }

        self.switch_borrow_type_event(loan_id, pool_id, borrow_type, &borrow.balance, &new_rate);
        loan.set_borrow(pool_id, borrow);
    }

    /// Takes `repay_amount` of balance off the violator's borrow.
    ///
    /// # Returns
    /// - `(principal, stable_rate)`: principal leaving with the repaid share,
    ///   `floor(amount * repay / balance)` or all of it on a full repay, and
    ///   the violator's rate, zero when variable.
    fn transfer_borrow_from_violator(
        &self,
        loan: &mut UserLoan<Self::Api>,
        pool_id: PoolId,
        repay_amount: &ManagedDecimal<Self::Api, NumDecimals>,
        cache: &mut Cache<Self>,
    ) -> (
        ManagedDecimal<Self::Api, NumDecimals>,
        ManagedDecimal<Self::Api, NumDecimals>,
    ) {
        let mut borrow = loan
            .get_borrow(pool_id)
            .unwrap_or_else(|| sc_panic!(ERROR_NO_BORROW_IN_POOL));

        let state = cache.get_pool_state(pool_id);
        let loan_pool = cache.get_loan_pool(loan.loan_type_id, pool_id);
        self.update_loan_borrow_interests(&mut borrow, &state, cache.timestamp);
        self.update_user_borrow_reward(&loan.account_id, pool_id, &loan_pool, &mut borrow);

        let principal = if repay_amount >= &borrow.balance {
            borrow.amount.clone()
        } else {
            self.mul_div_floor(
                &borrow.amount,
                repay_amount,
                &borrow.balance,
                borrow.amount.scale(),
            )
        };
        let repaid = self.get_min(repay_amount.clone(), borrow.balance.clone());

        borrow.amount -= &principal;
        borrow.balance -= &repaid;
        let stable_rate = borrow.stable_interest_rate.clone();

        loan.set_borrow(pool_id, borrow);

        (principal, stable_rate)
    }

    /// Adds the violator's repaid debt to the liquidator's borrow, keeping the
    /// regime. A stable entry averages its rate with the incoming one,
    /// weighted by balance.
    fn transfer_borrow_to_liquidator(
        &self,
        loan: &mut UserLoan<Self::Api>,
        pool_id: PoolId,
        repay_amount: &ManagedDecimal<Self::Api, NumDecimals>,
        principal: &ManagedDecimal<Self::Api, NumDecimals>,
        stable_rate: &ManagedDecimal<Self::Api, NumDecimals>,
        cache: &mut Cache<Self>,
    ) {
        let state = cache.get_pool_state(pool_id);
        let loan_pool = cache.get_loan_pool(loan.loan_type_id, pool_id);
        let is_stable = stable_rate.into_raw_units() > &BigUint::zero();

        let mut borrow = match loan.get_borrow(pool_id) {
            Some(mut existing) => {
                require!(existing.is_stable() == is_stable, ERROR_BORROW_TYPE_MISMATCH);
                self.update_loan_borrow_interests(&mut existing, &state, cache.timestamp);
                self.update_user_borrow_reward(&loan.account_id, pool_id, &loan_pool, &mut existing);
                if is_stable {
                    existing.stable_interest_rate = self.calc_stable_interest_rate(
                        &existing.balance,
                        &existing.stable_interest_rate,
                        repay_amount,
                        stable_rate,
                    );
                }
                existing
            },
            None => UserLoanBorrow {
                amount: self.zero_at(repay_amount.scale()),
                balance: self.zero_at(repay_amount.scale()),
                last_interest_index: state.variable_borrow_interest_index.clone(),
                stable_interest_rate: stable_rate.clone(),
                last_stable_update_timestamp: if is_stable { cache.timestamp } else { 0 },
                reward_index: loan_pool.reward.borrow_reward_index.clone(),
            },
        };

        borrow.amount += principal;
        borrow.balance += repay_amount;

        loan.set_borrow(pool_id, borrow);
    }
}
