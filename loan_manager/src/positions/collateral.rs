use common_errors::{
    ERROR_AMOUNT_MUST_BE_GREATER_THAN_ZERO, ERROR_COLLATERAL_CAP_REACHED, ERROR_F_TOKEN_NOT_MINTABLE,
    ERROR_INSUFFICIENT_COLLATERAL_BALANCE, ERROR_INSUFFICIENT_F_TOKEN_BALANCE,
    ERROR_LOAN_POOL_DEPRECATED, ERROR_LOAN_TYPE_DEPRECATED, ERROR_LOAN_UNDER_COLLATERALIZED,
    ERROR_NO_COLLATERAL_IN_POOL,
};
use common_math::Rounding;
use common_structs::{LoanId, PoolId, UserLoan, UserLoanCollateral};

use crate::{cache::Cache, helpers, oracle, pools, rewards, storage};

use super::{account, liquidity, update};

multiversx_sc::imports!();

#[multiversx_sc::module]
pub trait PositionCollateralModule:
    storage::Storage
    + oracle::OracleModule
    + pools::PoolModule
    + pools::token::TokenPoolModule
    + rewards::RewardsModule
    + helpers::MathsModule
    + account::PositionAccountModule
    + update::PositionUpdateModule
    + liquidity::PositionLiquidityModule
    + common_events::EventsModule
    + common_math::SharedMathModule
    + common_rates::InterestRates
{
    /// Adds `f_amount` f-tokens of `pool_id` to the loan's collateral.
    ///
    /// Rewards accrue on the previous balance first. The loan pool collateral
    /// cap is checked on the dollar value of the collateral used once
    /// converted back to underlying, unless `check_cap` is off.
    fn increase_collateral(
        &self,
        loan: &mut UserLoan<Self::Api>,
        pool_id: PoolId,
        f_amount: &ManagedDecimal<Self::Api, NumDecimals>,
        check_cap: bool,
        cache: &mut Cache<Self>,
    ) {
        if f_amount.into_raw_units() == &BigUint::zero() {
            return;
        }

        let mut loan_pool = cache.get_loan_pool(loan.loan_type_id, pool_id);
        let mut collateral = loan
            .get_collateral(pool_id)
            .unwrap_or_else(|| UserLoanCollateral {
                balance: self.zero_at(f_amount.scale()),
                reward_index: loan_pool.reward.collateral_reward_index.clone(),
            });

        self.update_user_collateral_reward(&loan.account_id, pool_id, &loan_pool, &mut collateral);

        collateral.balance += f_amount;
        loan_pool.collateral_used += f_amount;

        if check_cap {
            if let Some(cap) = &loan_pool.collateral_cap {
                let state = cache.get_pool_state(pool_id);
                let feed = cache.get_price_feed(pool_id);
                let underlying =
                    self.to_underlying_amount(&loan_pool.collateral_used, &state.deposit_interest_index);
                let value = self.get_token_value(&underlying, &feed, Rounding::Ceil);
                require!(
                    !self.exceeds_dollar_cap(&value, cap),
                    ERROR_COLLATERAL_CAP_REACHED
                );
            }
        }

        cache.set_loan_pool(loan.loan_type_id, pool_id, &loan_pool);
        loan.set_collateral(pool_id, collateral);
    }

    /// Removes `f_amount` f-tokens of `pool_id` from the loan's collateral,
    /// dropping the pool from the loan when nothing is left.
    fn decrease_collateral(
        &self,
        loan: &mut UserLoan<Self::Api>,
        pool_id: PoolId,
        f_amount: &ManagedDecimal<Self::Api, NumDecimals>,
        cache: &mut Cache<Self>,
    ) {
        if f_amount.into_raw_units() == &BigUint::zero() {
            return;
        }

        let mut collateral = loan
            .get_collateral(pool_id)
            .unwrap_or_else(|| sc_panic!(ERROR_NO_COLLATERAL_IN_POOL));
        require!(
            &collateral.balance >= f_amount,
            ERROR_INSUFFICIENT_COLLATERAL_BALANCE
        );

        let mut loan_pool = cache.get_loan_pool(loan.loan_type_id, pool_id);
        self.update_user_collateral_reward(&loan.account_id, pool_id, &loan_pool, &mut collateral);

        collateral.balance -= f_amount;
        loan_pool.collateral_used = self.sub_or_zero(&loan_pool.collateral_used, f_amount);

        cache.set_loan_pool(loan.loan_type_id, pool_id, &loan_pool);
        loan.set_collateral(pool_id, collateral);
    }

    fn process_deposit(
        &self,
        loan_id: LoanId,
        loan: &mut UserLoan<Self::Api>,
        pool_id: PoolId,
        amount: BigUint,
        cache: &mut Cache<Self>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        require!(amount > 0u64, ERROR_AMOUNT_MUST_BE_GREATER_THAN_ZERO);
        self.require_loan_pool_open(loan, pool_id, cache);

        let config = cache.get_pool_config(pool_id);
        let amount = self.to_decimal(amount, config.asset_decimals);

        let f_amount = self.update_pool_with_deposit(pool_id, &amount, cache);
        self.increase_collateral(loan, pool_id, &f_amount, true, cache);

        self.deposit_event(loan_id, pool_id, &amount, &f_amount);

        f_amount
    }

    /// Moves f-tokens held by the loan owner outside of any loan into the loan.
    fn process_deposit_f_token(
        &self,
        loan_id: LoanId,
        loan: &mut UserLoan<Self::Api>,
        pool_id: PoolId,
        f_amount: BigUint,
        cache: &mut Cache<Self>,
    ) {
        require!(f_amount > 0u64, ERROR_AMOUNT_MUST_BE_GREATER_THAN_ZERO);
        self.require_loan_pool_open(loan, pool_id, cache);

        let config = cache.get_pool_config(pool_id);
        require!(config.can_mint_f_token(), ERROR_F_TOKEN_NOT_MINTABLE);

        let wallet = self.f_token_balance(&loan.account_id, pool_id);
        require!(wallet.get() >= f_amount, ERROR_INSUFFICIENT_F_TOKEN_BALANCE);
        wallet.update(|balance| *balance -= &f_amount);

        let f_amount = self.to_decimal(f_amount, config.asset_decimals);
        self.increase_collateral(loan, pool_id, &f_amount, true, cache);

        self.deposit_f_token_event(loan_id, pool_id, &f_amount);
    }

    /// Withdraws collateral as underlying and hands it to `recipient`.
    ///
    /// # Returns
    /// - `(underlying, f_amount, metadata)`, metadata being what `send_token`
    ///   returns for the pool.
    fn process_withdraw(
        &self,
        loan_id: LoanId,
        loan: &mut UserLoan<Self::Api>,
        pool_id: PoolId,
        amount: BigUint,
        is_f_amount: bool,
        recipient: &ManagedAddress,
        cache: &mut Cache<Self>,
    ) -> (
        ManagedDecimal<Self::Api, NumDecimals>,
        ManagedDecimal<Self::Api, NumDecimals>,
        ManagedBuffer,
    ) {
        require!(amount > 0u64, ERROR_AMOUNT_MUST_BE_GREATER_THAN_ZERO);
        require!(
            loan.get_collateral(pool_id).is_some(),
            ERROR_NO_COLLATERAL_IN_POOL
        );

        let config = cache.get_pool_config(pool_id);
        let amount = self.to_decimal(amount, config.asset_decimals);

        let (underlying, f_amount) =
            self.update_pool_with_withdraw(pool_id, &amount, is_f_amount, cache);
        self.decrease_collateral(loan, pool_id, &f_amount, cache);
        self.require_loan_healthy(loan, cache, ERROR_LOAN_UNDER_COLLATERALIZED);

        self.withdraw_event(loan_id, pool_id, &underlying, &f_amount);

        let metadata = self.send_token(pool_id, &config, recipient, underlying.into_raw_units());

        (underlying, f_amount, metadata)
    }

    /// Moves collateral out of the loan into the owner's f-token balance. The
    /// pool keeps the underlying.
    fn process_withdraw_f_token(
        &self,
        loan_id: LoanId,
        loan: &mut UserLoan<Self::Api>,
        pool_id: PoolId,
        f_amount: BigUint,
        cache: &mut Cache<Self>,
    ) {
        require!(f_amount > 0u64, ERROR_AMOUNT_MUST_BE_GREATER_THAN_ZERO);

        let config = cache.get_pool_config(pool_id);
        require!(config.can_mint_f_token(), ERROR_F_TOKEN_NOT_MINTABLE);

        let f_decimal = self.to_decimal(f_amount.clone(), config.asset_decimals);
        self.decrease_collateral(loan, pool_id, &f_decimal, cache);
        self.require_loan_healthy(loan, cache, ERROR_LOAN_UNDER_COLLATERALIZED);

        self.f_token_balance(&loan.account_id, pool_id)
            .update(|balance| *balance += &f_amount);

        self.withdraw_f_token_event(loan_id, pool_id, &f_decimal);
    }

    /// New collateral or borrow needs a live loan type and loan pool.
    fn require_loan_pool_open(
        &self,
        loan: &UserLoan<Self::Api>,
        pool_id: PoolId,
        cache: &mut Cache<Self>,
    ) {
        let loan_type = self.get_loan_type(loan.loan_type_id);
        require!(!loan_type.is_deprecated, ERROR_LOAN_TYPE_DEPRECATED);

        let loan_pool = cache.get_loan_pool(loan.loan_type_id, pool_id);
        require!(!loan_pool.is_deprecated, ERROR_LOAN_POOL_DEPRECATED);
    }
}
