use common_structs::{PoolState, UserLoanBorrow};

multiversx_sc::imports!();

#[multiversx_sc::module]
pub trait PositionUpdateModule: common_math::SharedMathModule + common_rates::InterestRates {
    /// Brings a borrow entry's balance up to `timestamp`.
    ///
    /// A stable entry compounds on its own clock at its locked rate. A variable
    /// entry is rebased on the pool's shared variable index, rounded up.
    /// Repeating the call with the same inputs leaves the entry unchanged.
    fn update_loan_borrow_interests(
        &self,
        borrow: &mut UserLoanBorrow<Self::Api>,
        state: &PoolState<Self::Api>,
        timestamp: u64,
    ) {
        if borrow.is_stable() {
            if timestamp <= borrow.last_stable_update_timestamp {
                return;
            }
            let elapsed = timestamp - borrow.last_stable_update_timestamp;
            borrow.balance = self.calc_stable_borrow_balance(
                &borrow.balance,
                &borrow.stable_interest_rate,
                elapsed,
            );
            borrow.last_stable_update_timestamp = timestamp;
        } else {
            borrow.balance = self.calc_borrow_balance(
                &borrow.balance,
                &state.variable_borrow_interest_index,
                &borrow.last_interest_index,
            );
            borrow.last_interest_index = state.variable_borrow_interest_index.clone();
        }
    }

    /// Copy of `borrow` with interest settled, leaving the stored entry alone.
    fn get_updated_borrow(
        &self,
        borrow: &UserLoanBorrow<Self::Api>,
        state: &PoolState<Self::Api>,
        timestamp: u64,
    ) -> UserLoanBorrow<Self::Api> {
        let mut updated = borrow.clone();
        self.update_loan_borrow_interests(&mut updated, state, timestamp);

        updated
    }
}
