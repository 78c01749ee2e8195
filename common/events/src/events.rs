#![no_std]

multiversx_sc::imports!();
multiversx_sc::derive_imports!();
pub use common_structs::*;

#[multiversx_sc::module]
pub trait EventsModule {
    #[event("interest_indexes_updated")]
    fn interest_indexes_updated_event(
        &self,
        #[indexed] pool_id: PoolId,
        #[indexed] variable_borrow_interest_index: &ManagedDecimal<Self::Api, NumDecimals>,
        #[indexed] deposit_interest_index: &ManagedDecimal<Self::Api, NumDecimals>,
        #[indexed] total_retained: &ManagedDecimal<Self::Api, NumDecimals>,
        #[indexed] timestamp: u64,
    );

    #[event("interest_rates_updated")]
    fn interest_rates_updated_event(
        &self,
        #[indexed] pool_id: PoolId,
        #[indexed] variable_borrow_interest_rate: &ManagedDecimal<Self::Api, NumDecimals>,
        #[indexed] stable_borrow_interest_rate: &ManagedDecimal<Self::Api, NumDecimals>,
        #[indexed] deposit_interest_rate: &ManagedDecimal<Self::Api, NumDecimals>,
    );

    #[event("reward_indexes_updated")]
    fn reward_indexes_updated_event(
        &self,
        #[indexed] loan_type_id: LoanTypeId,
        #[indexed] pool_id: PoolId,
        #[indexed] collateral_reward_index: &ManagedDecimal<Self::Api, NumDecimals>,
        #[indexed] borrow_reward_index: &ManagedDecimal<Self::Api, NumDecimals>,
    );

    #[event("create_user_loan")]
    fn create_user_loan_event(
        &self,
        #[indexed] loan_id: LoanId,
        #[indexed] account_id: &ManagedBuffer,
        #[indexed] loan_type_id: LoanTypeId,
    );

    #[event("delete_user_loan")]
    fn delete_user_loan_event(&self, #[indexed] loan_id: LoanId, #[indexed] account_id: &ManagedBuffer);

    #[event("deposit")]
    fn deposit_event(
        &self,
        #[indexed] loan_id: LoanId,
        #[indexed] pool_id: PoolId,
        #[indexed] amount: &ManagedDecimal<Self::Api, NumDecimals>,
        #[indexed] f_amount: &ManagedDecimal<Self::Api, NumDecimals>,
    );

    #[event("deposit_f_token")]
    fn deposit_f_token_event(
        &self,
        #[indexed] loan_id: LoanId,
        #[indexed] pool_id: PoolId,
        #[indexed] f_amount: &ManagedDecimal<Self::Api, NumDecimals>,
    );

    #[event("withdraw")]
    fn withdraw_event(
        &self,
        #[indexed] loan_id: LoanId,
        #[indexed] pool_id: PoolId,
        #[indexed] amount: &ManagedDecimal<Self::Api, NumDecimals>,
        #[indexed] f_amount: &ManagedDecimal<Self::Api, NumDecimals>,
    );

    #[event("withdraw_f_token")]
    fn withdraw_f_token_event(
        &self,
        #[indexed] loan_id: LoanId,
        #[indexed] pool_id: PoolId,
        #[indexed] f_amount: &ManagedDecimal<Self::Api, NumDecimals>,
    );

    /// `stable_rate` is zero for a variable borrow.
    #[event("borrow")]
    fn borrow_event(
        &self,
        #[indexed] loan_id: LoanId,
        #[indexed] pool_id: PoolId,
        #[indexed] amount: &ManagedDecimal<Self::Api, NumDecimals>,
        #[indexed] stable_rate: &ManagedDecimal<Self::Api, NumDecimals>,
    );

    #[event("repay")]
    fn repay_event(
        &self,
        #[indexed] loan_id: LoanId,
        #[indexed] pool_id: PoolId,
        #[indexed] principal_paid: &ManagedDecimal<Self::Api, NumDecimals>,
        #[indexed] interest_paid: &ManagedDecimal<Self::Api, NumDecimals>,
        #[indexed] excess: &ManagedDecimal<Self::Api, NumDecimals>,
    );

    #[event("repay_with_collateral")]
    fn repay_with_collateral_event(
        &self,
        #[indexed] loan_id: LoanId,
        #[indexed] pool_id: PoolId,
        #[indexed] principal_paid: &ManagedDecimal<Self::Api, NumDecimals>,
        #[indexed] interest_paid: &ManagedDecimal<Self::Api, NumDecimals>,
        #[indexed] f_amount: &ManagedDecimal<Self::Api, NumDecimals>,
    );

    #[event("liquidate")]
    fn liquidate_event(
        &self,
        #[indexed] violator_loan_id: LoanId,
        #[indexed] liquidator_loan_id: LoanId,
        #[indexed] col_pool_id: PoolId,
        #[indexed] bor_pool_id: PoolId,
        #[indexed] repay_amount: &ManagedDecimal<Self::Api, NumDecimals>,
        #[indexed] liquidator_f_amount: &ManagedDecimal<Self::Api, NumDecimals>,
        #[indexed] reserve_f_amount: &ManagedDecimal<Self::Api, NumDecimals>,
    );

    #[event("switch_borrow_type")]
    fn switch_borrow_type_event(
        &self,
        #[indexed] loan_id: LoanId,
        #[indexed] pool_id: PoolId,
        #[indexed] borrow_type: BorrowType,
        #[indexed] amount: &ManagedDecimal<Self::Api, NumDecimals>,
        #[indexed] stable_rate: &ManagedDecimal<Self::Api, NumDecimals>,
    );

    #[event("rebalance_up")]
    fn rebalance_up_event(
        &self,
        #[indexed] loan_id: LoanId,
        #[indexed] pool_id: PoolId,
        #[indexed] old_rate: &ManagedDecimal<Self::Api, NumDecimals>,
        #[indexed] new_rate: &ManagedDecimal<Self::Api, NumDecimals>,
    );

    #[event("rebalance_down")]
    fn rebalance_down_event(
        &self,
        #[indexed] loan_id: LoanId,
        #[indexed] pool_id: PoolId,
        #[indexed] old_rate: &ManagedDecimal<Self::Api, NumDecimals>,
        #[indexed] new_rate: &ManagedDecimal<Self::Api, NumDecimals>,
    );

    #[event("retained_fees_cleared")]
    fn retained_fees_cleared_event(
        &self,
        #[indexed] pool_id: PoolId,
        #[indexed] amount: &ManagedDecimal<Self::Api, NumDecimals>,
        #[indexed] recipient: &ManagedAddress,
    );

    #[event("pool_config_updated")]
    fn pool_config_updated_event(&self, #[indexed] pool_id: PoolId, config: &PoolConfig<Self::Api>);

    #[event("loan_type_updated")]
    fn loan_type_updated_event(
        &self,
        #[indexed] loan_type_id: LoanTypeId,
        loan_type: &LoanType<Self::Api>,
    );

    #[event("loan_pool_updated")]
    fn loan_pool_updated_event(
        &self,
        #[indexed] loan_type_id: LoanTypeId,
        #[indexed] pool_id: PoolId,
        loan_pool: &LoanPool<Self::Api>,
    );

    #[event("price_feed_updated")]
    fn price_feed_updated_event(
        &self,
        #[indexed] pool_id: PoolId,
        #[indexed] price: &ManagedDecimal<Self::Api, NumDecimals>,
        #[indexed] decimals: usize,
    );

    // Burn on this side, mint instruction forwarded by the caller
    #[event("bridge_transfer")]
    fn bridge_transfer_event(
        &self,
        #[indexed] pool_id: PoolId,
        transfer: &BridgeTransfer<Self::Api>,
    );
}
