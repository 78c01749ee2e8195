use common_structs::{LoanId, LoanLiquidity, PoolId, PoolState, UserPoolRewards};

use crate::{cache::Cache, helpers, oracle, pools, positions, rewards, storage};

multiversx_sc::imports!();

/// Read-only projections at the current block. The cache is built as a view,
/// refreshed indexes are never written back.
#[multiversx_sc::module]
pub trait ViewsModule:
    storage::Storage
    + oracle::OracleModule
    + pools::PoolModule
    + rewards::RewardsModule
    + helpers::MathsModule
    + positions::account::PositionAccountModule
    + positions::update::PositionUpdateModule
    + positions::liquidity::PositionLiquidityModule
    + common_events::EventsModule
    + common_math::SharedMathModule
    + common_rates::InterestRates
{
    /// Pool state with indexes and retained fees accrued up to now.
    #[view(getUpdatedPoolState)]
    fn get_updated_pool_state(&self, pool_id: PoolId) -> PoolState<Self::Api> {
        let mut cache = Cache::new_view(self);
        cache.get_pool_state(pool_id)
    }

    #[view(getLoanLiquidity)]
    fn get_loan_liquidity_view(&self, loan_id: LoanId) -> LoanLiquidity<Self::Api> {
        let loan = self.get_active_loan(loan_id);
        let mut cache = Cache::new_view(self);
        self.get_loan_liquidity(&loan, &mut cache)
    }

    #[view(isLoanOverCollateralized)]
    fn is_loan_over_collateralized_view(&self, loan_id: LoanId) -> bool {
        let loan = self.get_active_loan(loan_id);
        let mut cache = Cache::new_view(self);
        self.is_loan_over_collateralized(&loan, &mut cache)
    }

    /// Rewards credited so far. Amounts accruing since the account's last
    /// operation in the pool are credited on its next one.
    #[view(getUserPoolRewards)]
    fn get_user_pool_rewards_view(
        &self,
        account_id: ManagedBuffer,
        pool_id: PoolId,
    ) -> UserPoolRewards<Self::Api> {
        self.get_user_pool_rewards(&account_id, pool_id)
    }

    /// Fee owed for flash borrowing `amount` raw units, rounded up.
    #[view(getFlashLoanFee)]
    fn get_flash_loan_fee_view(
        &self,
        pool_id: PoolId,
        amount: BigUint,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let mut cache = Cache::new_view(self);
        let config = cache.get_pool_config(pool_id);
        let amount = self.to_decimal(amount, config.asset_decimals);

        self.get_flash_loan_fee(pool_id, &amount, &mut cache)
    }

    /// Largest dollar value of debt a liquidator may repay on `loan_id` for
    /// the given pool pair.
    ///
    /// # Returns
    /// - `None` when no repay restores the loan target health, the repay is
    ///   then bounded by the borrow balance and the collateral only.
    #[view(getMaxRepayBorrowValue)]
    fn get_max_repay_borrow_value(
        &self,
        loan_id: LoanId,
        col_pool_id: PoolId,
        bor_pool_id: PoolId,
    ) -> Option<ManagedDecimal<Self::Api, NumDecimals>> {
        let loan = self.get_active_loan(loan_id);
        let loan_type = self.get_loan_type(loan.loan_type_id);

        let mut cache = Cache::new_view(self);
        let liquidity = self.get_loan_liquidity(&loan, &mut cache);
        let col_loan_pool = cache.get_loan_pool(loan.loan_type_id, col_pool_id);
        let bor_loan_pool = cache.get_loan_pool(loan.loan_type_id, bor_pool_id);

        self.calc_max_repay_borrow_value(
            &loan_type.loan_target_health,
            &liquidity.effective_collateral_value,
            &liquidity.effective_borrow_value,
            &col_loan_pool.collateral_factor,
            &bor_loan_pool.borrow_factor,
            &col_loan_pool.liquidation_bonus,
        )
    }
}
