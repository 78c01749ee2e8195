use common_math::Rounding;
use common_structs::{LoanLiquidity, UserLoan};

use crate::{cache::Cache, helpers, oracle, pools, rewards, storage};

use super::update;

multiversx_sc::imports!();

#[multiversx_sc::module]
pub trait PositionLiquidityModule:
    storage::Storage
    + oracle::OracleModule
    + pools::PoolModule
    + rewards::RewardsModule
    + helpers::MathsModule
    + update::PositionUpdateModule
    + common_events::EventsModule
    + common_math::SharedMathModule
    + common_rates::InterestRates
{
    /// Factor weighted dollar values of a loan at the cache timestamp.
    ///
    /// Collateral is valued at `floor(f * deposit_index)` underlying, priced and
    /// weighted rounding down. Borrows are valued on their interest-updated
    /// balance, priced and weighted rounding up. The loan itself is not
    /// modified.
    fn get_loan_liquidity(
        &self,
        loan: &UserLoan<Self::Api>,
        cache: &mut Cache<Self>,
    ) -> LoanLiquidity<Self::Api> {
        let mut effective_collateral_value = self.wad_zero();
        for (index, pool_id) in loan.col_pools.iter().enumerate() {
            let collateral = loan.collaterals.get(index);
            let loan_pool = cache.get_loan_pool(loan.loan_type_id, pool_id);
            let state = cache.get_pool_state(pool_id);
            let feed = cache.get_price_feed(pool_id);

            let underlying =
                self.to_underlying_amount(&collateral.balance, &state.deposit_interest_index);
            let value = self.get_token_value(&underlying, &feed, Rounding::Floor);
            effective_collateral_value +=
                &self.calc_effective_collateral_value(&value, &loan_pool.collateral_factor);
        }

        let mut effective_borrow_value = self.wad_zero();
        for (index, pool_id) in loan.bor_pools.iter().enumerate() {
            let borrow = loan.borrows.get(index);
            let loan_pool = cache.get_loan_pool(loan.loan_type_id, pool_id);
            let state = cache.get_pool_state(pool_id);
            let feed = cache.get_price_feed(pool_id);

            let updated = self.get_updated_borrow(&borrow, &state, cache.timestamp);
            let value = self.get_token_value(&updated.balance, &feed, Rounding::Ceil);
            effective_borrow_value +=
                &self.calc_effective_borrow_value(&value, &loan_pool.borrow_factor);
        }

        LoanLiquidity {
            effective_collateral_value,
            effective_borrow_value,
        }
    }

    fn is_loan_over_collateralized(
        &self,
        loan: &UserLoan<Self::Api>,
        cache: &mut Cache<Self>,
    ) -> bool {
        self.get_loan_liquidity(loan, cache).is_over_collateralized()
    }

    fn require_loan_healthy(
        &self,
        loan: &UserLoan<Self::Api>,
        cache: &mut Cache<Self>,
        error: &'static [u8],
    ) {
        require!(self.is_loan_over_collateralized(loan, cache), error);
    }
}
