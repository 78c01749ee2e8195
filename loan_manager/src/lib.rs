#![no_std]

multiversx_sc::imports!();
multiversx_sc::derive_imports!();

pub mod cache;
pub mod config;
pub mod helpers;
pub mod oracle;
pub mod pools;
pub mod positions;
pub mod rewards;
pub mod storage;
pub mod validation;
pub mod views;

use cache::Cache;
pub use common_errors::*;
pub use common_structs::*;

/// Accounting hub of the lending protocol.
///
/// Holds every pool, loan type and loan, and exposes the loan operations to
/// the allow-listed orchestrators (`addAdmin`). No endpoint takes a payment.
/// Custody of direct pools stays with the orchestrators. Wrapped and bridged
/// pools settle out of the hub's own token balance, which the orchestrators
/// keep stocked; the bridge message of bridged pools is returned for them to
/// forward.
#[multiversx_sc::contract]
pub trait LoanManager:
    positions::account::PositionAccountModule
    + positions::collateral::PositionCollateralModule
    + positions::borrow::PositionBorrowModule
    + positions::liquidation::PositionLiquidationModule
    + positions::liquidity::PositionLiquidityModule
    + positions::rebalance::PositionRebalanceModule
    + positions::update::PositionUpdateModule
    + pools::PoolModule
    + pools::token::TokenPoolModule
    + rewards::RewardsModule
    + config::ConfigModule
    + views::ViewsModule
    + validation::ValidationModule
    + storage::Storage
    + oracle::OracleModule
    + helpers::MathsModule
    + common_events::EventsModule
    + common_math::SharedMathModule
    + common_rates::InterestRates
    + multiversx_sc_modules::only_admin::OnlyAdminModule
    + multiversx_sc_modules::pause::PauseModule
{
    #[init]
    fn init(&self) {}

    #[upgrade]
    fn upgrade(&self) {}

    /// Opens an empty loan for `account_id`.
    ///
    /// # Returns
    /// - The id of the new loan.
    #[endpoint(createUserLoan)]
    fn create_user_loan_endpoint(&self, account_id: ManagedBuffer, loan_type_id: LoanTypeId) -> LoanId {
        self.require_operation_allowed();

        self.create_user_loan(&account_id, loan_type_id)
    }

    #[endpoint(deleteUserLoan)]
    fn delete_user_loan_endpoint(&self, loan_id: LoanId, account_id: ManagedBuffer) {
        self.require_operation_allowed();

        self.delete_user_loan(loan_id, &account_id);
    }

    /// Deposits `amount` raw units of the pool asset as collateral.
    ///
    /// # Returns
    /// - f-tokens added to the loan.
    #[endpoint(deposit)]
    fn deposit(
        &self,
        loan_id: LoanId,
        account_id: ManagedBuffer,
        pool_id: PoolId,
        amount: BigUint,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        self.require_operation_allowed();
        let mut cache = Cache::new(self);
        let mut loan = self.get_owned_loan(loan_id, &account_id);

        let f_amount = self.process_deposit(loan_id, &mut loan, pool_id, amount, &mut cache);

        self.user_loan(loan_id).set(&loan);
        f_amount
    }

    /// Moves f-tokens the account holds outside of any loan into the loan.
    #[endpoint(depositFToken)]
    fn deposit_f_token(
        &self,
        loan_id: LoanId,
        account_id: ManagedBuffer,
        pool_id: PoolId,
        f_amount: BigUint,
    ) {
        self.require_operation_allowed();
        let mut cache = Cache::new(self);
        let mut loan = self.get_owned_loan(loan_id, &account_id);

        self.process_deposit_f_token(loan_id, &mut loan, pool_id, f_amount, &mut cache);

        self.user_loan(loan_id).set(&loan);
    }

    /// Withdraws collateral to `recipient`.
    ///
    /// # Arguments
    /// - `amount`: raw f-tokens when `is_f_amount`, raw underlying otherwise.
    ///
    /// # Returns
    /// - The underlying withdrawn and the `send_token` result of the pool.
    #[endpoint(withdraw)]
    fn withdraw(
        &self,
        loan_id: LoanId,
        account_id: ManagedBuffer,
        pool_id: PoolId,
        amount: BigUint,
        is_f_amount: bool,
        recipient: ManagedAddress,
    ) -> MultiValue2<ManagedDecimal<Self::Api, NumDecimals>, ManagedBuffer> {
        self.require_operation_allowed();
        let mut cache = Cache::new(self);
        let mut loan = self.get_owned_loan(loan_id, &account_id);

        let (underlying, _, metadata) = self.process_withdraw(
            loan_id,
            &mut loan,
            pool_id,
            amount,
            is_f_amount,
            &recipient,
            &mut cache,
        );

        self.user_loan(loan_id).set(&loan);
        (underlying, metadata).into()
    }

    /// Moves collateral out of the loan as f-tokens held by the account.
    #[endpoint(withdrawFToken)]
    fn withdraw_f_token(
        &self,
        loan_id: LoanId,
        account_id: ManagedBuffer,
        pool_id: PoolId,
        f_amount: BigUint,
    ) {
        self.require_operation_allowed();
        let mut cache = Cache::new(self);
        let mut loan = self.get_owned_loan(loan_id, &account_id);

        self.process_withdraw_f_token(loan_id, &mut loan, pool_id, f_amount, &mut cache);

        self.user_loan(loan_id).set(&loan);
    }

    /// Borrows `amount` raw units of the pool asset to `recipient`.
    ///
    /// # Arguments
    /// - `max_stable_rate`: zero for a variable borrow, otherwise the highest
    ///   stable rate accepted, 18 decimals.
    ///
    /// # Returns
    /// - The stable rate locked, zero when variable, and the `send_token`
    ///   result of the pool.
    #[endpoint(borrow)]
    fn borrow(
        &self,
        loan_id: LoanId,
        account_id: ManagedBuffer,
        pool_id: PoolId,
        amount: BigUint,
        max_stable_rate: BigUint,
        recipient: ManagedAddress,
    ) -> MultiValue2<ManagedDecimal<Self::Api, NumDecimals>, ManagedBuffer> {
        self.require_operation_allowed();
        let mut cache = Cache::new(self);
        let mut loan = self.get_owned_loan(loan_id, &account_id);

        let (_, stable_rate, metadata) = self.process_borrow(
            loan_id,
            &mut loan,
            pool_id,
            amount,
            max_stable_rate,
            &recipient,
            &mut cache,
        );

        self.user_loan(loan_id).set(&loan);
        (stable_rate, metadata).into()
    }

    /// Repays `amount` raw units of the borrow in `pool_id`. Allowed on
    /// deprecated pools.
    ///
    /// # Arguments
    /// - `max_over_repayment`: largest excess over the owed balance accepted,
    ///   raw units. The excess is kept by the pool.
    ///
    /// # Returns
    /// - `(principal_paid, interest_paid, excess)`
    #[endpoint(repay)]
    fn repay(
        &self,
        loan_id: LoanId,
        account_id: ManagedBuffer,
        pool_id: PoolId,
        amount: BigUint,
        max_over_repayment: BigUint,
    ) -> MultiValue3<
        ManagedDecimal<Self::Api, NumDecimals>,
        ManagedDecimal<Self::Api, NumDecimals>,
        ManagedDecimal<Self::Api, NumDecimals>,
    > {
        self.require_operation_allowed();
        let mut cache = Cache::new(self);
        let mut loan = self.get_owned_loan(loan_id, &account_id);

        let repaid = self.process_repay(
            loan_id,
            &mut loan,
            pool_id,
            amount,
            max_over_repayment,
            &mut cache,
        );

        self.user_loan(loan_id).set(&loan);
        (repaid.principal_paid, repaid.interest_paid, repaid.excess).into()
    }

    /// Repays the borrow in `pool_id` with the loan's collateral in the same pool.
    ///
    /// # Returns
    /// - `(principal_paid, interest_paid)`
    #[endpoint(repayWithCollateral)]
    fn repay_with_collateral(
        &self,
        loan_id: LoanId,
        account_id: ManagedBuffer,
        pool_id: PoolId,
        amount: BigUint,
    ) -> MultiValue2<ManagedDecimal<Self::Api, NumDecimals>, ManagedDecimal<Self::Api, NumDecimals>>
    {
        self.require_operation_allowed();
        let mut cache = Cache::new(self);
        let mut loan = self.get_owned_loan(loan_id, &account_id);

        let repaid =
            self.process_repay_with_collateral(loan_id, &mut loan, pool_id, amount, &mut cache);

        self.user_loan(loan_id).set(&loan);
        (repaid.principal_paid, repaid.interest_paid).into()
    }

    /// Liquidates `violator_loan_id` into the liquidator's own loan.
    ///
    /// # Returns
    /// - `(repay_amount, liquidator_f_amount)`
    #[endpoint(liquidate)]
    fn liquidate(
        &self,
        violator_loan_id: LoanId,
        liquidator_loan_id: LoanId,
        liquidator_account_id: ManagedBuffer,
        col_pool_id: PoolId,
        bor_pool_id: PoolId,
        max_repay_amount: BigUint,
        min_seized_amount: BigUint,
    ) -> MultiValue2<ManagedDecimal<Self::Api, NumDecimals>, ManagedDecimal<Self::Api, NumDecimals>>
    {
        self.require_operation_allowed();
        let mut cache = Cache::new(self);

        let amounts = self.process_liquidation(
            violator_loan_id,
            liquidator_loan_id,
            &liquidator_account_id,
            col_pool_id,
            bor_pool_id,
            max_repay_amount,
            min_seized_amount,
            &mut cache,
        );

        let liquidator_f_amount = amounts.seize_f_amount - amounts.reserve_f_amount;
        (amounts.repay_amount, liquidator_f_amount).into()
    }

    /// Moves the borrow in `pool_id` to `borrow_type`.
    ///
    /// # Arguments
    /// - `max_stable_rate`: highest rate accepted when switching to stable,
    ///   18 decimals.
    #[endpoint(switchBorrowType)]
    fn switch_borrow_type(
        &self,
        loan_id: LoanId,
        account_id: ManagedBuffer,
        pool_id: PoolId,
        borrow_type: BorrowType,
        max_stable_rate: BigUint,
    ) {
        self.require_operation_allowed();
        let mut cache = Cache::new(self);
        let mut loan = self.get_owned_loan(loan_id, &account_id);

        self.process_switch_borrow_type(
            loan_id,
            &mut loan,
            pool_id,
            borrow_type,
            max_stable_rate,
            &mut cache,
        );

        self.user_loan(loan_id).set(&loan);
    }

    #[endpoint(rebalanceUp)]
    fn rebalance_up(&self, loan_id: LoanId, pool_id: PoolId) {
        self.require_operation_allowed();
        let mut cache = Cache::new(self);

        self.process_rebalance_up(loan_id, pool_id, &mut cache);
    }

    #[endpoint(rebalanceDown)]
    fn rebalance_down(&self, loan_id: LoanId, pool_id: PoolId) {
        self.require_operation_allowed();
        let mut cache = Cache::new(self);

        self.process_rebalance_down(loan_id, pool_id, &mut cache);
    }

    fn require_operation_allowed(&self) {
        self.require_caller_is_admin();
        self.require_not_paused();
    }
}
