use common_structs::{
    LoanId, LoanPool, LoanType, LoanTypeId, PoolConfig, PoolId, PoolState, PriceFeed, UserLoan,
};

multiversx_sc::imports!();

#[multiversx_sc::module]
pub trait Storage {
    /// Ids of every listed pool.
    #[view(getPools)]
    #[storage_mapper("pools")]
    fn pools(&self) -> UnorderedSetMapper<PoolId>;

    /// Static configuration of a pool, changed only by the owner.
    #[view(getPoolConfig)]
    #[storage_mapper("pool_config")]
    fn pool_config(&self, pool_id: PoolId) -> SingleValueMapper<PoolConfig<Self::Api>>;

    /// Pool accounting as of its last refresh. `getUpdatedPoolState` projects it to now.
    #[view(getPoolState)]
    #[storage_mapper("pool_state")]
    fn pool_state(&self, pool_id: PoolId) -> SingleValueMapper<PoolState<Self::Api>>;

    #[view(getLoanTypes)]
    #[storage_mapper("loan_types")]
    fn loan_types(&self) -> UnorderedSetMapper<LoanTypeId>;

    #[view(getLoanType)]
    #[storage_mapper("loan_type")]
    fn loan_type(&self, loan_type_id: LoanTypeId) -> SingleValueMapper<LoanType<Self::Api>>;

    /// Pools a loan type accepts, as collateral and as borrow.
    #[view(getLoanTypePools)]
    #[storage_mapper("loan_type_pools")]
    fn loan_type_pools(&self, loan_type_id: LoanTypeId) -> UnorderedSetMapper<PoolId>;

    /// Risk parameters, usage totals and reward indices of a pool inside a loan type.
    #[view(getLoanPool)]
    #[storage_mapper("loan_pool")]
    fn loan_pool(
        &self,
        loan_type_id: LoanTypeId,
        pool_id: PoolId,
    ) -> SingleValueMapper<LoanPool<Self::Api>>;

    #[view(getLastLoanId)]
    #[storage_mapper("last_loan_id")]
    fn last_loan_id(&self) -> SingleValueMapper<LoanId>;

    #[view(getUserLoan)]
    #[storage_mapper("user_loan")]
    fn user_loan(&self, loan_id: LoanId) -> SingleValueMapper<UserLoan<Self::Api>>;

    #[storage_mapper("user_pool_rewards")]
    fn user_pool_rewards(
        &self,
        account_id: &ManagedBuffer,
        pool_id: PoolId,
    ) -> SingleValueMapper<common_structs::UserPoolRewards<Self::Api>>;

    /// f-tokens held by an account outside of any loan, in f-token units at
    /// the pool asset decimals.
    #[view(getFTokenBalance)]
    #[storage_mapper("f_token_balance")]
    fn f_token_balance(&self, account_id: &ManagedBuffer, pool_id: PoolId)
        -> SingleValueMapper<BigUint>;

    #[view(getPriceFeed)]
    #[storage_mapper("price_feed")]
    fn price_feed(&self, pool_id: PoolId) -> SingleValueMapper<PriceFeed<Self::Api>>;

    #[view(getPriceFeedUpdaters)]
    #[storage_mapper("price_feed_updaters")]
    fn price_feed_updaters(&self) -> UnorderedSetMapper<ManagedAddress>;
}
