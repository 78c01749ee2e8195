use common_constants::WAD_PRECISION;
use common_errors::*;
use common_math::Rounding;
use common_structs::{BorrowType, PoolConfig, PoolId, PoolState};

use crate::{cache::Cache, helpers, oracle, rewards, storage};

pub mod token;

multiversx_sc::imports!();

/// The PoolLedger: every transition of a pool's totals, rates and indexes.
///
/// Each transition reads the pool through the cache (indexes already refreshed
/// to the operation timestamp), validates, mutates the totals, recomputes the
/// rates and stages the result back into the cache.
#[multiversx_sc::module]
pub trait PoolModule:
    storage::Storage
    + oracle::OracleModule
    + rewards::RewardsModule
    + helpers::MathsModule
    + common_events::EventsModule
    + common_math::SharedMathModule
    + common_rates::InterestRates
{
    /// Refreshes the pool indexes and logs the new values. Nothing is logged
    /// when the pool is already at `timestamp`.
    fn update_interest_indexes(
        &self,
        pool_id: PoolId,
        config: &PoolConfig<Self::Api>,
        state: &mut PoolState<Self::Api>,
        timestamp: u64,
    ) {
        if !self.accrue_interest_indexes(config, state, timestamp) {
            return;
        }

        self.interest_indexes_updated_event(
            pool_id,
            &state.variable_borrow_interest_index,
            &state.deposit_interest_index,
            &state.total_retained,
            timestamp,
        );
    }

    /// Accrues the pool up to `timestamp` with the rates in force since the
    /// last refresh. A second call at the same timestamp changes nothing and
    /// returns `false`.
    ///
    /// **Order**: retention first (it reads the rates of the elapsed period),
    /// then the compounded borrow index and the linear deposit index.
    fn accrue_interest_indexes(
        &self,
        config: &PoolConfig<Self::Api>,
        state: &mut PoolState<Self::Api>,
        timestamp: u64,
    ) -> bool {
        if timestamp <= state.last_update_timestamp {
            return false;
        }
        let elapsed = timestamp - state.last_update_timestamp;

        let overall_rate = self.calc_overall_borrow_interest_rate(
            &state.variable_borrow_total,
            &state.stable_borrow_total,
            &state.variable_borrow_interest_rate,
            &state.stable_borrow_average_rate,
        );
        let retained = self.calc_retained_amount(
            &state.total_debt(),
            &overall_rate,
            &config.retention_rate,
            elapsed,
        );
        state.total_retained += &retained;

        state.variable_borrow_interest_index = self.calc_borrow_interest_index(
            &state.variable_borrow_interest_rate,
            &state.variable_borrow_interest_index,
            elapsed,
        );
        state.deposit_interest_index = self.calc_deposit_interest_index(
            &state.deposit_interest_rate,
            &state.deposit_interest_index,
            elapsed,
        );
        state.last_update_timestamp = timestamp;

        true
    }

    /// Recomputes the three pool rates from the current totals. Callers must
    /// have refreshed the indexes first.
    fn update_interest_rates(
        &self,
        pool_id: PoolId,
        config: &PoolConfig<Self::Api>,
        state: &mut PoolState<Self::Api>,
    ) {
        let total_debt = state.total_debt();
        let params = &config.interest_rate_params;

        let utilisation = self.calc_utilisation_ratio(&total_debt, &state.deposit_total);
        let stable_ratio =
            self.calc_stable_debt_to_total_debt_ratio(&state.stable_borrow_total, &total_debt);

        state.variable_borrow_interest_rate =
            self.calc_variable_borrow_interest_rate(params, &utilisation);
        state.stable_borrow_interest_rate =
            self.calc_stable_borrow_interest_rate(params, &utilisation, &stable_ratio);

        let overall_rate = self.calc_overall_borrow_interest_rate(
            &state.variable_borrow_total,
            &state.stable_borrow_total,
            &state.variable_borrow_interest_rate,
            &state.stable_borrow_average_rate,
        );
        state.deposit_interest_rate =
            self.calc_deposit_interest_rate(&utilisation, &overall_rate, &config.retention_rate);

        self.interest_rates_updated_event(
            pool_id,
            &state.variable_borrow_interest_rate,
            &state.stable_borrow_interest_rate,
            &state.deposit_interest_rate,
        );
    }

    fn get_listed_pool_config(&self, pool_id: PoolId) -> PoolConfig<Self::Api> {
        let mapper = self.pool_config(pool_id);
        require!(!mapper.is_empty(), ERROR_POOL_NOT_FOUND);

        mapper.get()
    }

    /// `deposit_total - total_debt`, zero when the pool is fully lent out.
    fn get_available_liquidity(
        &self,
        state: &PoolState<Self::Api>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        self.sub_or_zero(&state.deposit_total, &state.total_debt())
    }

    /// Adds `amount` underlying to the pool and returns the f-tokens minted,
    /// `floor(amount / deposit_index)`.
    ///
    /// # Errors
    /// - `ERROR_POOL_DEPRECATED`
    /// - `ERROR_DEPOSIT_CAP_REACHED`: dollar value of the new deposit total,
    ///   rounded up, above the cap.
    fn update_pool_with_deposit(
        &self,
        pool_id: PoolId,
        amount: &ManagedDecimal<Self::Api, NumDecimals>,
        cache: &mut Cache<Self>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let config = cache.get_pool_config(pool_id);
        require!(!config.is_deprecated(), ERROR_POOL_DEPRECATED);

        let mut state = cache.get_pool_state(pool_id);
        state.deposit_total += amount;

        if let Some(cap) = &config.deposit_cap {
            let feed = cache.get_price_feed(pool_id);
            let value = self.get_token_value(&state.deposit_total, &feed, Rounding::Ceil);
            require!(
                !self.exceeds_dollar_cap(&value, cap),
                ERROR_DEPOSIT_CAP_REACHED
            );
        }

        let f_amount = self.to_f_amount(amount, &state.deposit_interest_index, Rounding::Floor);

        self.update_interest_rates(pool_id, &config, &mut state);
        cache.set_pool_state(pool_id, &state);

        f_amount
    }

    /// Removes underlying from the pool. Allowed while deprecated.
    ///
    /// # Arguments
    /// - `amount`: f-tokens when `is_f_amount`, underlying otherwise.
    ///
    /// # Returns
    /// - `(underlying, f_amount)`: underlying is `floor(f * index)` for an
    ///   f-token request, f-tokens are `ceil(amount / index)` for an underlying
    ///   request.
    ///
    /// # Errors
    /// - `ERROR_INSUFFICIENT_LIQUIDITY`
    fn update_pool_with_withdraw(
        &self,
        pool_id: PoolId,
        amount: &ManagedDecimal<Self::Api, NumDecimals>,
        is_f_amount: bool,
        cache: &mut Cache<Self>,
    ) -> (
        ManagedDecimal<Self::Api, NumDecimals>,
        ManagedDecimal<Self::Api, NumDecimals>,
    ) {
        let config = cache.get_pool_config(pool_id);
        let mut state = cache.get_pool_state(pool_id);

        let (underlying, f_amount) = if is_f_amount {
            (
                self.to_underlying_amount(amount, &state.deposit_interest_index),
                amount.clone(),
            )
        } else {
            (
                amount.clone(),
                self.to_f_amount(amount, &state.deposit_interest_index, Rounding::Ceil),
            )
        };

        require!(
            underlying <= self.get_available_liquidity(&state),
            ERROR_INSUFFICIENT_LIQUIDITY
        );
        state.deposit_total -= &underlying;

        self.update_interest_rates(pool_id, &config, &mut state);
        cache.set_pool_state(pool_id, &state);

        (underlying, f_amount)
    }

    /// Lends `amount` out of the pool.
    ///
    /// # Arguments
    /// - `max_stable_rate`: `None` for a variable borrow, otherwise the highest
    ///   stable rate the borrower accepts.
    ///
    /// # Returns
    /// - The stable rate locked by the borrow, zero for a variable borrow.
    ///
    /// # Errors
    /// - `ERROR_POOL_DEPRECATED`, `ERROR_INSUFFICIENT_LIQUIDITY`
    /// - `ERROR_STABLE_BORROW_NOT_SUPPORTED`, `ERROR_STABLE_BORROW_CAP_REACHED`
    /// - `ERROR_MAX_STABLE_RATE_EXCEEDED`, `ERROR_BORROW_CAP_REACHED`
    fn update_pool_with_borrow(
        &self,
        pool_id: PoolId,
        amount: &ManagedDecimal<Self::Api, NumDecimals>,
        max_stable_rate: Option<&ManagedDecimal<Self::Api, NumDecimals>>,
        cache: &mut Cache<Self>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let config = cache.get_pool_config(pool_id);
        require!(!config.is_deprecated(), ERROR_POOL_DEPRECATED);

        let mut state = cache.get_pool_state(pool_id);
        let available = self.get_available_liquidity(&state);
        require!(amount <= &available, ERROR_INSUFFICIENT_LIQUIDITY);

        let stable_rate = match max_stable_rate {
            Some(max_rate) => {
                require!(config.can_borrow_stable(), ERROR_STABLE_BORROW_NOT_SUPPORTED);
                self.require_within_stable_cap(&config, amount, &available);
                let rate = state.stable_borrow_interest_rate.clone();
                require!(&rate <= max_rate, ERROR_MAX_STABLE_RATE_EXCEEDED);

                state.stable_borrow_average_rate = self.calc_increasing_average_stable_rate(
                    &state.stable_borrow_total,
                    &state.stable_borrow_average_rate,
                    amount,
                    &rate,
                );
                state.stable_borrow_total += amount;
                rate
            },
            None => {
                state.variable_borrow_total += amount;
                self.wad_zero()
            },
        };

        if let Some(cap) = &config.borrow_cap {
            let feed = cache.get_price_feed(pool_id);
            let value = self.get_token_value(&state.total_debt(), &feed, Rounding::Ceil);
            require!(
                !self.exceeds_dollar_cap(&value, cap),
                ERROR_BORROW_CAP_REACHED
            );
        }

        self.update_interest_rates(pool_id, &config, &mut state);
        cache.set_pool_state(pool_id, &state);

        stable_rate
    }

    /// Books a repayment. Never blocked by deprecation.
    ///
    /// Principal leaves the debt totals; interest and any excess over the owed
    /// balance go back to depositors, and the excess is also retained as
    /// protocol fee.
    fn update_pool_with_repay(
        &self,
        pool_id: PoolId,
        principal_paid: &ManagedDecimal<Self::Api, NumDecimals>,
        interest_paid: &ManagedDecimal<Self::Api, NumDecimals>,
        excess: &ManagedDecimal<Self::Api, NumDecimals>,
        loan_stable_rate: &ManagedDecimal<Self::Api, NumDecimals>,
        cache: &mut Cache<Self>,
    ) {
        let config = cache.get_pool_config(pool_id);
        let mut state = cache.get_pool_state(pool_id);

        self.remove_debt(&mut state, principal_paid, loan_stable_rate);
        state.deposit_total += interest_paid;
        state.deposit_total += excess;
        state.total_retained += excess;

        self.update_interest_rates(pool_id, &config, &mut state);
        cache.set_pool_state(pool_id, &state);
    }

    /// Books a repayment funded by collateral of the same pool.
    ///
    /// # Returns
    /// - f-tokens to burn, `ceil((principal + interest) / deposit_index)`.
    fn update_pool_with_repay_with_collateral(
        &self,
        pool_id: PoolId,
        principal_paid: &ManagedDecimal<Self::Api, NumDecimals>,
        interest_paid: &ManagedDecimal<Self::Api, NumDecimals>,
        loan_stable_rate: &ManagedDecimal<Self::Api, NumDecimals>,
        cache: &mut Cache<Self>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let config = cache.get_pool_config(pool_id);
        let mut state = cache.get_pool_state(pool_id);

        let repaid = principal_paid.clone() + interest_paid.clone();
        let f_amount = self.to_f_amount(&repaid, &state.deposit_interest_index, Rounding::Ceil);

        self.remove_debt(&mut state, principal_paid, loan_stable_rate);
        // the interest leaves the depositors' claim and re-enters it as repayment
        state.deposit_total = self.sub_or_zero(&state.deposit_total, principal_paid);

        self.update_interest_rates(pool_id, &config, &mut state);
        cache.set_pool_state(pool_id, &state);

        f_amount
    }

    /// Moves `principal` between the variable and stable totals.
    ///
    /// # Arguments
    /// - `from`: Regime the borrow leaves.
    /// - `old_stable_rate`: Rate of the borrow when it leaves the stable regime.
    /// - `max_stable_rate`: Highest accepted rate when it enters the stable regime.
    ///
    /// # Returns
    /// - The new stable rate, zero when switching to variable.
    fn update_pool_with_switch_borrow_type(
        &self,
        pool_id: PoolId,
        principal: &ManagedDecimal<Self::Api, NumDecimals>,
        from: BorrowType,
        old_stable_rate: &ManagedDecimal<Self::Api, NumDecimals>,
        max_stable_rate: &ManagedDecimal<Self::Api, NumDecimals>,
        cache: &mut Cache<Self>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let config = cache.get_pool_config(pool_id);
        let mut state = cache.get_pool_state(pool_id);

        let new_rate = match from {
            BorrowType::Variable => {
                require!(config.can_borrow_stable(), ERROR_STABLE_BORROW_NOT_SUPPORTED);
                let available = self.get_available_liquidity(&state);
                self.require_within_stable_cap(&config, principal, &available);
                let rate = state.stable_borrow_interest_rate.clone();
                require!(&rate <= max_stable_rate, ERROR_MAX_STABLE_RATE_EXCEEDED);

                state.variable_borrow_total =
                    self.sub_or_zero(&state.variable_borrow_total, principal);
                state.stable_borrow_average_rate = self.calc_increasing_average_stable_rate(
                    &state.stable_borrow_total,
                    &state.stable_borrow_average_rate,
                    principal,
                    &rate,
                );
                state.stable_borrow_total += principal;
                rate
            },
            BorrowType::Stable => {
                self.remove_debt(&mut state, principal, old_stable_rate);
                state.variable_borrow_total += principal;
                self.wad_zero()
            },
        };

        self.update_interest_rates(pool_id, &config, &mut state);
        cache.set_pool_state(pool_id, &state);

        new_rate
    }

    /// Re-prices `principal` of stable debt from `old_rate` to the pool's
    /// current stable rate, which is returned.
    fn update_pool_with_rebalance(
        &self,
        pool_id: PoolId,
        principal: &ManagedDecimal<Self::Api, NumDecimals>,
        old_rate: &ManagedDecimal<Self::Api, NumDecimals>,
        cache: &mut Cache<Self>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let config = cache.get_pool_config(pool_id);
        let mut state = cache.get_pool_state(pool_id);
        let new_rate = state.stable_borrow_interest_rate.clone();

        self.remove_debt(&mut state, principal, old_rate);
        state.stable_borrow_average_rate = self.calc_increasing_average_stable_rate(
            &state.stable_borrow_total,
            &state.stable_borrow_average_rate,
            principal,
            &new_rate,
        );
        state.stable_borrow_total += principal;

        self.update_interest_rates(pool_id, &config, &mut state);
        cache.set_pool_state(pool_id, &state);

        new_rate
    }

    /// Takes the whole retained fee out of the pool.
    ///
    /// # Errors
    /// - `ERROR_INSUFFICIENT_LIQUIDITY`: the fee is currently lent out.
    fn update_pool_with_clear_retained(
        &self,
        pool_id: PoolId,
        cache: &mut Cache<Self>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let config = cache.get_pool_config(pool_id);
        let mut state = cache.get_pool_state(pool_id);

        let retained = state.total_retained.clone();
        require!(
            retained <= self.get_available_liquidity(&state),
            ERROR_INSUFFICIENT_LIQUIDITY
        );
        state.deposit_total -= &retained;
        state.total_retained = self.zero_at(retained.scale());

        self.update_interest_rates(pool_id, &config, &mut state);
        cache.set_pool_state(pool_id, &state);

        retained
    }

    /// Fee owed for flash borrowing `amount`, rounded up.
    fn get_flash_loan_fee(
        &self,
        pool_id: PoolId,
        amount: &ManagedDecimal<Self::Api, NumDecimals>,
        cache: &mut Cache<Self>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let config = cache.get_pool_config(pool_id);
        require!(config.can_flash_loan(), ERROR_FLASH_LOAN_NOT_SUPPORTED);

        self.calc_flash_loan_fee(amount, &config.flash_loan_fee)
    }

    fn remove_debt(
        &self,
        state: &mut PoolState<Self::Api>,
        principal: &ManagedDecimal<Self::Api, NumDecimals>,
        loan_stable_rate: &ManagedDecimal<Self::Api, NumDecimals>,
    ) {
        if loan_stable_rate.into_raw_units() > &BigUint::zero() {
            state.stable_borrow_average_rate = self.calc_decreasing_average_stable_rate(
                &state.stable_borrow_total,
                &state.stable_borrow_average_rate,
                principal,
                loan_stable_rate,
            );
            state.stable_borrow_total = self.sub_or_zero(&state.stable_borrow_total, principal);
        } else {
            state.variable_borrow_total =
                self.sub_or_zero(&state.variable_borrow_total, principal);
        }
    }

    /// A single stable borrow may take at most `stable_borrow_percentage` of
    /// the liquidity available before it.
    fn require_within_stable_cap(
        &self,
        config: &PoolConfig<Self::Api>,
        amount: &ManagedDecimal<Self::Api, NumDecimals>,
        available: &ManagedDecimal<Self::Api, NumDecimals>,
    ) {
        let stable_cap =
            self.mul_floor(available, &config.stable_borrow_percentage, available.scale());
        require!(amount <= &stable_cap, ERROR_STABLE_BORROW_CAP_REACHED);
    }

    /// Caps are whole dollars.
    fn exceeds_dollar_cap(
        &self,
        value: &ManagedDecimal<Self::Api, NumDecimals>,
        cap: &BigUint,
    ) -> bool {
        value > &self.to_decimal(cap.clone(), 0).rescale(WAD_PRECISION)
    }
}
