use common_constants::{
    BPS, BPS_PRECISION, MAX_ASSET_DECIMALS, MAX_RATE_PARAM, SIX_DP, SIX_DP_PRECISION,
    WAD_PRECISION,
};
use common_errors::*;
use common_structs::InterestRateParams;

multiversx_sc::imports!();

/// Range checks for every owner supplied parameter.
#[multiversx_sc::module]
pub trait ValidationModule: common_math::SharedMathModule {
    /// Rate curve points are 6 decimals and at most 1000%, ratios 4 decimals.
    ///
    /// # Errors
    /// - `ERROR_INVALID_RATE_PARAM`: wrong scale, above the bound, or a zero
    ///   `vr1` (stable rates are never zero, zero marks a variable borrow).
    /// - `ERROR_INVALID_OPTIMAL_RATIO`: an optimal ratio outside `(0, 100%)`.
    /// - `ERROR_INVALID_REBALANCE_PARAMS`
    fn validate_interest_rate_params(&self, params: &InterestRateParams<Self::Api>) {
        let max_rate = BigUint::from(MAX_RATE_PARAM);
        for rate in [
            &params.vr0,
            &params.vr1,
            &params.vr2,
            &params.sr0,
            &params.sr1,
            &params.sr2,
            &params.sr3,
        ] {
            require!(
                rate.scale() == SIX_DP_PRECISION && rate.into_raw_units() <= &max_rate,
                ERROR_INVALID_RATE_PARAM
            );
        }
        require!(
            params.vr1.into_raw_units() > &BigUint::zero(),
            ERROR_INVALID_RATE_PARAM
        );

        for ratio in [
            &params.optimal_utilisation_ratio,
            &params.optimal_stable_to_total_debt_ratio,
        ] {
            require!(
                ratio.scale() == BPS_PRECISION
                    && ratio.into_raw_units() > &BigUint::zero()
                    && ratio.into_raw_units() < &BigUint::from(BPS),
                ERROR_INVALID_OPTIMAL_RATIO
            );
        }

        for ratio in [
            &params.rebalance_up_utilisation_ratio,
            &params.rebalance_up_deposit_interest_rate,
            &params.rebalance_down_delta,
        ] {
            require!(
                ratio.scale() == BPS_PRECISION && ratio.into_raw_units() <= &BigUint::from(BPS),
                ERROR_INVALID_REBALANCE_PARAMS
            );
        }
    }

    fn validate_asset_decimals(&self, asset_decimals: usize) {
        require!(asset_decimals <= MAX_ASSET_DECIMALS, ERROR_INVALID_DECIMALS);
    }

    /// Retention rate and flash loan fee, 6 decimals, at most 100%.
    fn validate_pool_fees(&self, retention_rate: &BigUint, flash_loan_fee: &BigUint) {
        require!(
            retention_rate <= &BigUint::from(SIX_DP),
            ERROR_INVALID_RETENTION_RATE
        );
        require!(
            flash_loan_fee <= &BigUint::from(SIX_DP),
            ERROR_INVALID_FLASH_LOAN_FEE
        );
    }

    /// 18 decimals, at most 100%.
    fn validate_stable_borrow_percentage(&self, stable_borrow_percentage: &BigUint) {
        require!(
            stable_borrow_percentage <= &self.pow10(WAD_PRECISION),
            ERROR_INVALID_STABLE_BORROW_PERCENTAGE
        );
    }

    fn validate_target_health(&self, loan_target_health: &BigUint) {
        require!(
            loan_target_health >= &BigUint::from(BPS),
            ERROR_INVALID_TARGET_HEALTH
        );
    }

    /// Collateral factor at most 100%, borrow factor at least 100%.
    fn validate_loan_pool_factors(&self, collateral_factor: &BigUint, borrow_factor: &BigUint) {
        require!(
            collateral_factor <= &BigUint::from(BPS),
            ERROR_INVALID_COLLATERAL_FACTOR
        );
        require!(
            borrow_factor >= &BigUint::from(BPS),
            ERROR_INVALID_BORROW_FACTOR
        );
    }

    fn validate_liquidation_params(&self, liquidation_bonus: &BigUint, liquidation_fee: &BigUint) {
        require!(
            liquidation_bonus <= &BigUint::from(BPS),
            ERROR_INVALID_LIQUIDATION_BONUS
        );
        require!(
            liquidation_fee <= &BigUint::from(BPS),
            ERROR_INVALID_LIQUIDATION_FEE
        );
    }
}
