use common_errors::*;
use common_structs::{
    InterestRateParams, LoanPool, LoanPoolReward, LoanType, LoanTypeId, PoolConfig, PoolFlags,
    PoolId, PoolState, TokenPoolKind,
};

use crate::{cache::Cache, helpers, oracle, pools, rewards, storage, validation};

multiversx_sc::imports!();

/// Owner governance of pools, loan types and their membership.
///
/// Every setter touching a value the interest or reward indexes depend on
/// first refreshes those indexes to the current block with the old value, so
/// the change only applies from now on.
#[multiversx_sc::module]
pub trait ConfigModule:
    storage::Storage
    + oracle::OracleModule
    + pools::PoolModule
    + pools::token::TokenPoolModule
    + rewards::RewardsModule
    + helpers::MathsModule
    + validation::ValidationModule
    + common_events::EventsModule
    + common_math::SharedMathModule
    + common_rates::InterestRates
{
    /// Lists a new pool with empty totals and both indexes at 1.
    ///
    /// # Arguments
    /// - `retention_rate`, `flash_loan_fee`: 6 decimals.
    /// - `deposit_cap`, `borrow_cap`: whole dollars, `None` for uncapped.
    /// - `stable_borrow_percentage`: 18 decimals.
    /// - `f_token_fee_recipient`: account credited with liquidation reserves.
    ///
    /// # Errors
    /// - `ERROR_POOL_ALREADY_EXISTS`
    /// - any parameter validation error
    #[only_owner]
    #[endpoint(addPool)]
    fn add_pool(
        &self,
        pool_id: PoolId,
        asset_decimals: usize,
        token_pool: TokenPoolKind<Self::Api>,
        interest_rate_params: InterestRateParams<Self::Api>,
        retention_rate: BigUint,
        flash_loan_fee: BigUint,
        deposit_cap: Option<BigUint>,
        borrow_cap: Option<BigUint>,
        stable_borrow_percentage: BigUint,
        flags: PoolFlags,
        f_token_fee_recipient: ManagedBuffer,
    ) {
        require!(self.pool_config(pool_id).is_empty(), ERROR_POOL_ALREADY_EXISTS);
        self.validate_asset_decimals(asset_decimals);
        self.validate_interest_rate_params(&interest_rate_params);
        self.validate_pool_fees(&retention_rate, &flash_loan_fee);
        self.validate_stable_borrow_percentage(&stable_borrow_percentage);

        let config = PoolConfig {
            asset_decimals,
            token_pool,
            interest_rate_params,
            retention_rate: self.to_decimal_six_dp(retention_rate),
            flash_loan_fee: self.to_decimal_six_dp(flash_loan_fee),
            deposit_cap,
            borrow_cap,
            stable_borrow_percentage: self.to_decimal_wad(stable_borrow_percentage),
            flags,
            f_token_fee_recipient,
        };

        let zero = self.zero_at(asset_decimals);
        let mut state = PoolState {
            deposit_total: zero.clone(),
            variable_borrow_total: zero.clone(),
            stable_borrow_total: zero.clone(),
            deposit_interest_rate: self.wad_zero(),
            deposit_interest_index: self.wad(),
            variable_borrow_interest_rate: self.wad_zero(),
            variable_borrow_interest_index: self.wad(),
            stable_borrow_interest_rate: self.wad_zero(),
            stable_borrow_average_rate: self.wad_zero(),
            total_retained: zero,
            last_update_timestamp: self.blockchain().get_block_timestamp(),
        };
        self.update_interest_rates(pool_id, &config, &mut state);

        self.pools().insert(pool_id);
        self.pool_config(pool_id).set(&config);
        self.pool_state(pool_id).set(&state);

        self.pool_config_updated_event(pool_id, &config);
    }

    /// Replaces the rate curve. Interest accrued so far uses the old curve.
    #[only_owner]
    #[endpoint(updatePoolInterestRateParams)]
    fn update_pool_interest_rate_params(
        &self,
        pool_id: PoolId,
        interest_rate_params: InterestRateParams<Self::Api>,
    ) {
        self.validate_interest_rate_params(&interest_rate_params);

        let mut cache = Cache::new(self);
        let mut state = cache.get_pool_state(pool_id);
        let mut config = cache.get_pool_config(pool_id);

        config.interest_rate_params = interest_rate_params;
        cache.set_pool_config(pool_id, &config);

        self.update_interest_rates(pool_id, &config, &mut state);
        cache.set_pool_state(pool_id, &state);

        self.pool_config_updated_event(pool_id, &config);
    }

    #[only_owner]
    #[endpoint(updatePoolCaps)]
    fn update_pool_caps(
        &self,
        pool_id: PoolId,
        deposit_cap: Option<BigUint>,
        borrow_cap: Option<BigUint>,
        stable_borrow_percentage: BigUint,
    ) {
        self.validate_stable_borrow_percentage(&stable_borrow_percentage);

        let mut cache = Cache::new(self);
        // accrued up to now under the old configuration
        cache.get_pool_state(pool_id);
        let mut config = cache.get_pool_config(pool_id);
        config.deposit_cap = deposit_cap;
        config.borrow_cap = borrow_cap;
        config.stable_borrow_percentage = self.to_decimal_wad(stable_borrow_percentage);
        cache.set_pool_config(pool_id, &config);

        self.pool_config_updated_event(pool_id, &config);
    }

    /// Retention applies from now on; the deposit rate is recomputed with it.
    #[only_owner]
    #[endpoint(updatePoolFees)]
    fn update_pool_fees(&self, pool_id: PoolId, retention_rate: BigUint, flash_loan_fee: BigUint) {
        self.validate_pool_fees(&retention_rate, &flash_loan_fee);

        let mut cache = Cache::new(self);
        let mut state = cache.get_pool_state(pool_id);
        let mut config = cache.get_pool_config(pool_id);

        config.retention_rate = self.to_decimal_six_dp(retention_rate);
        config.flash_loan_fee = self.to_decimal_six_dp(flash_loan_fee);
        cache.set_pool_config(pool_id, &config);

        self.update_interest_rates(pool_id, &config, &mut state);
        cache.set_pool_state(pool_id, &state);

        self.pool_config_updated_event(pool_id, &config);
    }

    #[only_owner]
    #[endpoint(updatePoolFlags)]
    fn update_pool_flags(&self, pool_id: PoolId, flags: PoolFlags) {
        let mut cache = Cache::new(self);
        // accrued up to now under the old configuration
        cache.get_pool_state(pool_id);
        let mut config = cache.get_pool_config(pool_id);
        config.flags = flags;
        cache.set_pool_config(pool_id, &config);

        self.pool_config_updated_event(pool_id, &config);
    }

    /// Blocks new deposits and borrows; withdrawals and repayments stay open.
    #[only_owner]
    #[endpoint(deprecatePool)]
    fn deprecate_pool(&self, pool_id: PoolId) {
        let mut cache = Cache::new(self);
        // accrued up to now under the old configuration
        cache.get_pool_state(pool_id);
        let mut config = cache.get_pool_config(pool_id);
        config.flags.is_deprecated = true;
        cache.set_pool_config(pool_id, &config);

        self.pool_config_updated_event(pool_id, &config);
    }

    /// # Arguments
    /// - `loan_target_health`: 4 decimals, at least 100%.
    #[only_owner]
    #[endpoint(createLoanType)]
    fn create_loan_type(&self, loan_type_id: LoanTypeId, loan_target_health: BigUint) {
        require!(
            self.loan_type(loan_type_id).is_empty(),
            ERROR_LOAN_TYPE_ALREADY_EXISTS
        );
        self.validate_target_health(&loan_target_health);

        let loan_type = LoanType {
            is_deprecated: false,
            loan_target_health: self.to_decimal_bps(loan_target_health),
        };
        self.loan_types().insert(loan_type_id);
        self.loan_type(loan_type_id).set(&loan_type);

        self.loan_type_updated_event(loan_type_id, &loan_type);
    }

    #[only_owner]
    #[endpoint(deprecateLoanType)]
    fn deprecate_loan_type(&self, loan_type_id: LoanTypeId) {
        let loan_type = self.update_loan_type(loan_type_id, |loan_type| {
            loan_type.is_deprecated = true;
        });
        self.loan_type_updated_event(loan_type_id, &loan_type);
    }

    #[only_owner]
    #[endpoint(updateLoanTypeTargetHealth)]
    fn update_loan_type_target_health(&self, loan_type_id: LoanTypeId, loan_target_health: BigUint) {
        self.validate_target_health(&loan_target_health);

        let target_health = self.to_decimal_bps(loan_target_health);
        let loan_type = self.update_loan_type(loan_type_id, |loan_type| {
            loan_type.loan_target_health = target_health;
        });
        self.loan_type_updated_event(loan_type_id, &loan_type);
    }

    /// Makes `pool_id` usable as collateral and borrow inside a loan type.
    ///
    /// # Arguments
    /// - `collateral_factor`, `borrow_factor`, `liquidation_bonus`,
    ///   `liquidation_fee`: 4 decimals.
    /// - `collateral_cap`, `borrow_cap`: whole dollars, `None` for uncapped.
    /// - `reward_minimum_amount`: asset decimals.
    /// - `collateral_speed`, `borrow_speed`: reward units per second, 18 decimals.
    #[only_owner]
    #[endpoint(addPoolToLoanType)]
    fn add_pool_to_loan_type(
        &self,
        loan_type_id: LoanTypeId,
        pool_id: PoolId,
        collateral_factor: BigUint,
        borrow_factor: BigUint,
        liquidation_bonus: BigUint,
        liquidation_fee: BigUint,
        collateral_cap: Option<BigUint>,
        borrow_cap: Option<BigUint>,
        reward_minimum_amount: BigUint,
        collateral_speed: BigUint,
        borrow_speed: BigUint,
    ) {
        require!(
            !self.loan_type(loan_type_id).is_empty(),
            ERROR_LOAN_TYPE_NOT_FOUND
        );
        let config_mapper = self.pool_config(pool_id);
        require!(!config_mapper.is_empty(), ERROR_POOL_NOT_FOUND);
        require!(
            self.loan_pool(loan_type_id, pool_id).is_empty(),
            ERROR_POOL_ALREADY_IN_LOAN_TYPE
        );
        self.validate_loan_pool_factors(&collateral_factor, &borrow_factor);
        self.validate_liquidation_params(&liquidation_bonus, &liquidation_fee);

        let asset_decimals = config_mapper.get().asset_decimals;
        let loan_pool = LoanPool {
            collateral_used: self.zero_at(asset_decimals),
            borrow_used: self.zero_at(asset_decimals),
            collateral_cap,
            borrow_cap,
            collateral_factor: self.to_decimal_bps(collateral_factor),
            borrow_factor: self.to_decimal_bps(borrow_factor),
            liquidation_bonus: self.to_decimal_bps(liquidation_bonus),
            liquidation_fee: self.to_decimal_bps(liquidation_fee),
            is_deprecated: false,
            reward: LoanPoolReward {
                last_update_timestamp: self.blockchain().get_block_timestamp(),
                minimum_amount: self.to_decimal(reward_minimum_amount, asset_decimals),
                collateral_speed: self.to_decimal_wad(collateral_speed),
                borrow_speed: self.to_decimal_wad(borrow_speed),
                collateral_reward_index: self.wad_zero(),
                borrow_reward_index: self.wad_zero(),
            },
        };

        self.loan_type_pools(loan_type_id).insert(pool_id);
        self.loan_pool(loan_type_id, pool_id).set(&loan_pool);

        self.loan_pool_updated_event(loan_type_id, pool_id, &loan_pool);
    }

    #[only_owner]
    #[endpoint(updateLoanPoolCaps)]
    fn update_loan_pool_caps(
        &self,
        loan_type_id: LoanTypeId,
        pool_id: PoolId,
        collateral_cap: Option<BigUint>,
        borrow_cap: Option<BigUint>,
    ) {
        self.update_loan_pool(loan_type_id, pool_id, |loan_pool| {
            loan_pool.collateral_cap = collateral_cap;
            loan_pool.borrow_cap = borrow_cap;
        });
    }

    #[only_owner]
    #[endpoint(updateLoanPoolFactors)]
    fn update_loan_pool_factors(
        &self,
        loan_type_id: LoanTypeId,
        pool_id: PoolId,
        collateral_factor: BigUint,
        borrow_factor: BigUint,
    ) {
        self.validate_loan_pool_factors(&collateral_factor, &borrow_factor);

        let collateral_factor = self.to_decimal_bps(collateral_factor);
        let borrow_factor = self.to_decimal_bps(borrow_factor);
        self.update_loan_pool(loan_type_id, pool_id, |loan_pool| {
            loan_pool.collateral_factor = collateral_factor;
            loan_pool.borrow_factor = borrow_factor;
        });
    }

    #[only_owner]
    #[endpoint(updateLoanPoolLiquidation)]
    fn update_loan_pool_liquidation(
        &self,
        loan_type_id: LoanTypeId,
        pool_id: PoolId,
        liquidation_bonus: BigUint,
        liquidation_fee: BigUint,
    ) {
        self.validate_liquidation_params(&liquidation_bonus, &liquidation_fee);

        let liquidation_bonus = self.to_decimal_bps(liquidation_bonus);
        let liquidation_fee = self.to_decimal_bps(liquidation_fee);
        self.update_loan_pool(loan_type_id, pool_id, |loan_pool| {
            loan_pool.liquidation_bonus = liquidation_bonus;
            loan_pool.liquidation_fee = liquidation_fee;
        });
    }

    /// New speeds apply from now on, rewards accrued so far use the old ones.
    #[only_owner]
    #[endpoint(updateLoanPoolRewardSpeeds)]
    fn update_loan_pool_reward_speeds(
        &self,
        loan_type_id: LoanTypeId,
        pool_id: PoolId,
        reward_minimum_amount: BigUint,
        collateral_speed: BigUint,
        borrow_speed: BigUint,
    ) {
        let asset_decimals = self.pool_config(pool_id).get().asset_decimals;
        let minimum_amount = self.to_decimal(reward_minimum_amount, asset_decimals);
        let collateral_speed = self.to_decimal_wad(collateral_speed);
        let borrow_speed = self.to_decimal_wad(borrow_speed);

        self.update_loan_pool(loan_type_id, pool_id, |loan_pool| {
            loan_pool.reward.minimum_amount = minimum_amount;
            loan_pool.reward.collateral_speed = collateral_speed;
            loan_pool.reward.borrow_speed = borrow_speed;
        });
    }

    /// Blocks new collateral and borrows of the pool inside the loan type.
    #[only_owner]
    #[endpoint(deprecateLoanPool)]
    fn deprecate_loan_pool(&self, loan_type_id: LoanTypeId, pool_id: PoolId) {
        self.update_loan_pool(loan_type_id, pool_id, |loan_pool| {
            loan_pool.is_deprecated = true;
        });
    }

    #[only_owner]
    #[endpoint(addPriceFeedUpdater)]
    fn add_price_feed_updater(&self, updater: ManagedAddress) {
        self.price_feed_updaters().insert(updater);
    }

    #[only_owner]
    #[endpoint(removePriceFeedUpdater)]
    fn remove_price_feed_updater(&self, updater: ManagedAddress) {
        self.price_feed_updaters().swap_remove(&updater);
    }

    /// Takes the protocol fee retained by a pool out to `recipient`.
    ///
    /// # Returns
    /// - What `send_token` returns for the pool, the bridge message for a
    ///   bridged pool.
    ///
    /// # Errors
    /// - `ERROR_INSUFFICIENT_LIQUIDITY`: part of the fee is lent out.
    #[only_owner]
    #[endpoint(clearRetainedFees)]
    fn clear_retained_fees(&self, pool_id: PoolId, recipient: ManagedAddress) -> ManagedBuffer {
        let mut cache = Cache::new(self);
        let config = cache.get_pool_config(pool_id);
        let retained = self.update_pool_with_clear_retained(pool_id, &mut cache);

        self.retained_fees_cleared_event(pool_id, &retained, &recipient);

        self.send_token(pool_id, &config, &recipient, retained.into_raw_units())
    }

    fn update_loan_type<F: FnOnce(&mut LoanType<Self::Api>)>(
        &self,
        loan_type_id: LoanTypeId,
        f: F,
    ) -> LoanType<Self::Api> {
        let mapper = self.loan_type(loan_type_id);
        require!(!mapper.is_empty(), ERROR_LOAN_TYPE_NOT_FOUND);

        mapper.update(|loan_type| {
            f(loan_type);
            loan_type.clone()
        })
    }

    /// Refreshes the loan pool reward indexes with the current parameters,
    /// applies `f` and stages the result.
    fn update_loan_pool<F: FnOnce(&mut LoanPool<Self::Api>)>(
        &self,
        loan_type_id: LoanTypeId,
        pool_id: PoolId,
        f: F,
    ) {
        let mut cache = Cache::new(self);
        let mut loan_pool = cache.get_loan_pool(loan_type_id, pool_id);
        f(&mut loan_pool);
        cache.set_loan_pool(loan_type_id, pool_id, &loan_pool);

        self.loan_pool_updated_event(loan_type_id, pool_id, &loan_pool);
    }
}
