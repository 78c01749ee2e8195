use common_errors::{
    ERROR_BORROW_TYPE_MISMATCH, ERROR_DIFFERENT_LOAN_TYPES, ERROR_LIQUIDATOR_UNDER_COLLATERALIZED,
    ERROR_LOAN_NOT_LIQUIDATABLE, ERROR_NOTHING_TO_LIQUIDATE, ERROR_NO_BORROW_IN_POOL,
    ERROR_NO_COLLATERAL_IN_POOL, ERROR_SAME_LOAN, ERROR_SEIZE_BELOW_MINIMUM,
};
use common_math::Rounding;
use common_structs::{LoanId, LoanLiquidity, PoolId, UserLoan};

use crate::{cache::Cache, helpers, oracle, pools, rewards, storage};

use super::{account, borrow, collateral, liquidity, update};

multiversx_sc::imports!();

/// Outcome of sizing a liquidation, before anything moves.
pub struct LiquidationAmounts<M: ManagedTypeApi> {
    /// Borrow asset units taken off the violator's balance
    pub repay_amount: ManagedDecimal<M, NumDecimals>,
    /// Collateral f-tokens leaving the violator
    pub seize_f_amount: ManagedDecimal<M, NumDecimals>,
    /// Part of the seize credited to the pool's fee recipient
    pub reserve_f_amount: ManagedDecimal<M, NumDecimals>,
}

#[multiversx_sc::module]
pub trait PositionLiquidationModule:
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
    + borrow::PositionBorrowModule
    + common_events::EventsModule
    + common_math::SharedMathModule
    + common_rates::InterestRates
{
    /// Takes over part of an under-collateralized loan's borrow in exchange
    /// for its collateral plus the liquidation bonus.
    ///
    /// The liquidator's loan inherits the repaid debt, in the same regime,
    /// and receives the seized f-tokens minus the protocol reserve. Both loans
    /// are written back to storage.
    ///
    /// # Arguments
    /// - `max_repay_amount`: Upper bound on the repaid borrow, asset decimals.
    /// - `min_seized_amount`: Lower bound on the f-tokens the liquidator
    ///   receives, collateral asset decimals.
    ///
    /// # Errors
    /// - `ERROR_SAME_LOAN`, `ERROR_DIFFERENT_LOAN_TYPES`, `ERROR_BORROW_TYPE_MISMATCH`
    /// - `ERROR_LOAN_NOT_LIQUIDATABLE`: the violator is over-collateralized.
    /// - `ERROR_NOTHING_TO_LIQUIDATE`: the bounds leave nothing to repay.
    /// - `ERROR_SEIZE_BELOW_MINIMUM`
    /// - `ERROR_LIQUIDATOR_UNDER_COLLATERALIZED`: checked after the transfer.
    fn process_liquidation(
        &self,
        violator_loan_id: LoanId,
        liquidator_loan_id: LoanId,
        liquidator_account_id: &ManagedBuffer,
        col_pool_id: PoolId,
        bor_pool_id: PoolId,
        max_repay_amount: BigUint,
        min_seized_amount: BigUint,
        cache: &mut Cache<Self>,
    ) -> LiquidationAmounts<Self::Api> {
        require!(violator_loan_id != liquidator_loan_id, ERROR_SAME_LOAN);

        let mut violator = self.get_active_loan(violator_loan_id);
        let mut liquidator = self.get_owned_loan(liquidator_loan_id, liquidator_account_id);
        require!(
            violator.loan_type_id == liquidator.loan_type_id,
            ERROR_DIFFERENT_LOAN_TYPES
        );

        let violator_borrow = violator
            .get_borrow(bor_pool_id)
            .unwrap_or_else(|| sc_panic!(ERROR_NO_BORROW_IN_POOL));
        if let Some(liquidator_borrow) = liquidator.get_borrow(bor_pool_id) {
            require!(
                liquidator_borrow.borrow_type() == violator_borrow.borrow_type(),
                ERROR_BORROW_TYPE_MISMATCH
            );
        }

        let liquidity = self.get_loan_liquidity(&violator, cache);
        require!(
            !liquidity.is_over_collateralized(),
            ERROR_LOAN_NOT_LIQUIDATABLE
        );

        let bor_config = cache.get_pool_config(bor_pool_id);
        let max_repay_amount = self.to_decimal(max_repay_amount, bor_config.asset_decimals);
        let amounts = self.calc_liquidation_amounts(
            &violator,
            &liquidity,
            col_pool_id,
            bor_pool_id,
            &max_repay_amount,
            cache,
        );

        let col_config = cache.get_pool_config(col_pool_id);
        let liquidator_f_amount =
            amounts.seize_f_amount.clone() - amounts.reserve_f_amount.clone();
        let min_seized_amount = self.to_decimal(min_seized_amount, col_config.asset_decimals);
        require!(
            liquidator_f_amount >= min_seized_amount,
            ERROR_SEIZE_BELOW_MINIMUM
        );

        let (principal, stable_rate) = self.transfer_borrow_from_violator(
            &mut violator,
            bor_pool_id,
            &amounts.repay_amount,
            cache,
        );
        self.transfer_borrow_to_liquidator(
            &mut liquidator,
            bor_pool_id,
            &amounts.repay_amount,
            &principal,
            &stable_rate,
            cache,
        );

        self.decrease_collateral(&mut violator, col_pool_id, &amounts.seize_f_amount, cache);
        // seizing never raises the collateral used, the cap stays satisfied
        self.increase_collateral(&mut liquidator, col_pool_id, &liquidator_f_amount, false, cache);
        self.f_token_balance(&col_config.f_token_fee_recipient, col_pool_id)
            .update(|balance| *balance += amounts.reserve_f_amount.into_raw_units());

        self.require_loan_healthy(&liquidator, cache, ERROR_LIQUIDATOR_UNDER_COLLATERALIZED);

        self.user_loan(violator_loan_id).set(&violator);
        self.user_loan(liquidator_loan_id).set(&liquidator);

        self.liquidate_event(
            violator_loan_id,
            liquidator_loan_id,
            col_pool_id,
            bor_pool_id,
            &amounts.repay_amount,
            &liquidator_f_amount,
            &amounts.reserve_f_amount,
        );

        amounts
    }

    /// Sizes a liquidation of `violator`.
    ///
    /// The repay starts at `min(max_repay_amount, borrow balance)` and is cut to
    /// the value restoring the loan target health when one exists. When the
    /// resulting seize exceeds the violator's collateral, the seize is clamped
    /// to the collateral and the repay is solved back from it.
    fn calc_liquidation_amounts(
        &self,
        violator: &UserLoan<Self::Api>,
        liquidity: &LoanLiquidity<Self::Api>,
        col_pool_id: PoolId,
        bor_pool_id: PoolId,
        max_repay_amount: &ManagedDecimal<Self::Api, NumDecimals>,
        cache: &mut Cache<Self>,
    ) -> LiquidationAmounts<Self::Api> {
        let violator_borrow = violator
            .get_borrow(bor_pool_id)
            .unwrap_or_else(|| sc_panic!(ERROR_NO_BORROW_IN_POOL));
        let violator_collateral = violator
            .get_collateral(col_pool_id)
            .unwrap_or_else(|| sc_panic!(ERROR_NO_COLLATERAL_IN_POOL));

        let loan_type = self.get_loan_type(violator.loan_type_id);
        let col_loan_pool = cache.get_loan_pool(violator.loan_type_id, col_pool_id);
        let bor_loan_pool = cache.get_loan_pool(violator.loan_type_id, bor_pool_id);
        let col_state = cache.get_pool_state(col_pool_id);
        let bor_state = cache.get_pool_state(bor_pool_id);
        let col_feed = cache.get_price_feed(col_pool_id);
        let bor_feed = cache.get_price_feed(bor_pool_id);

        let borrow_balance = self
            .get_updated_borrow(&violator_borrow, &bor_state, cache.timestamp)
            .balance;

        let mut repay_amount = self.get_min(max_repay_amount.clone(), borrow_balance.clone());
        if let Some(max_repay_value) = self.calc_max_repay_borrow_value(
            &loan_type.loan_target_health,
            &liquidity.effective_collateral_value,
            &liquidity.effective_borrow_value,
            &col_loan_pool.collateral_factor,
            &bor_loan_pool.borrow_factor,
            &col_loan_pool.liquidation_bonus,
        ) {
            let value_cap = self.get_token_amount(&max_repay_value, &bor_feed, Rounding::Floor);
            repay_amount = self.get_min(repay_amount, value_cap);
        }
        require!(
            repay_amount.into_raw_units() > &BigUint::zero(),
            ERROR_NOTHING_TO_LIQUIDATE
        );

        let seize_amount = self.calc_seize_collateral_amount(
            &repay_amount,
            &bor_feed,
            &col_feed,
            &col_loan_pool.liquidation_bonus,
        );
        let mut seize_f_amount =
            self.to_f_amount(&seize_amount, &col_state.deposit_interest_index, Rounding::Floor);

        if seize_f_amount > violator_collateral.balance {
            seize_f_amount = violator_collateral.balance.clone();
            let available =
                self.to_underlying_amount(&seize_f_amount, &col_state.deposit_interest_index);
            let solved = self.calc_repay_amount_from_seize(
                &available,
                &bor_feed,
                &col_feed,
                &col_loan_pool.liquidation_bonus,
            );
            repay_amount = self.get_min(solved, borrow_balance);
            require!(
                repay_amount.into_raw_units() > &BigUint::zero(),
                ERROR_NOTHING_TO_LIQUIDATE
            );
        }

        let reserve_f_amount = self.calc_liquidation_reserve(
            &seize_f_amount,
            &col_loan_pool.liquidation_bonus,
            &col_loan_pool.liquidation_fee,
        );

        LiquidationAmounts {
            repay_amount,
            seize_f_amount,
            reserve_f_amount,
        }
    }
}
