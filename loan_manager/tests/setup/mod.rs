use crate::{constants::*, proxys::*};

use multiversx_sc::{
    imports::{MultiValue2, MultiValue3},
    types::{
        BigUint, EsdtLocalRole, ManagedAddress, ManagedBuffer, ManagedDecimal, NumDecimals,
        ReturnsNewManagedAddress, ReturnsResult, TestTokenIdentifier,
    },
};
use multiversx_sc_scenario::{
    api::StaticApi,
    imports::{ExpectMessage, TestAddress},
    ScenarioTxRun, ScenarioWorld,
};

use loan_manager::{
    BorrowType, InterestRateParams, LoanLiquidity, LoanPool, PoolFlags, PoolState, TokenPoolKind,
    UserLoan, UserPoolRewards,
};

pub fn world() -> ScenarioWorld {
    let mut blockchain = ScenarioWorld::new();

    blockchain.register_contract(LOAN_MANAGER_PATH, loan_manager::ContractBuilder);

    blockchain
}

/// `amount` whole tokens in raw units.
pub fn scaled(amount: u64, decimals: usize) -> BigUint<StaticApi> {
    BigUint::from(amount) * BigUint::from(10u64).pow(decimals as u32)
}

pub fn usdc(amount: u64) -> BigUint<StaticApi> {
    scaled(amount, USDC_DECIMALS)
}

pub fn egld(amount: u64) -> BigUint<StaticApi> {
    scaled(amount, EGLD_DECIMALS)
}

pub fn wad(amount: u64) -> BigUint<StaticApi> {
    scaled(amount, 18)
}

pub fn six_dp(raw: u64) -> ManagedDecimal<StaticApi, NumDecimals> {
    ManagedDecimal::from_raw_units(BigUint::from(raw), 6)
}

pub fn bps(raw: u64) -> ManagedDecimal<StaticApi, NumDecimals> {
    ManagedDecimal::from_raw_units(BigUint::from(raw), 4)
}

pub fn default_rate_params() -> InterestRateParams<StaticApi> {
    InterestRateParams {
        vr0: six_dp(VR0),
        vr1: six_dp(VR1),
        vr2: six_dp(VR2),
        sr0: six_dp(SR0),
        sr1: six_dp(SR1),
        sr2: six_dp(SR2),
        sr3: six_dp(SR3),
        optimal_utilisation_ratio: bps(OPTIMAL_UTILISATION),
        optimal_stable_to_total_debt_ratio: bps(OPTIMAL_STABLE_RATIO),
        rebalance_up_utilisation_ratio: bps(REBALANCE_UP_UTILISATION),
        rebalance_up_deposit_interest_rate: bps(REBALANCE_UP_DEPOSIT_RATE),
        rebalance_down_delta: bps(REBALANCE_DOWN_DELTA),
    }
}

pub fn open_pool_flags() -> PoolFlags {
    PoolFlags {
        is_deprecated: false,
        stable_borrow_supported: true,
        flash_loan_supported: true,
        can_mint_f_token: true,
    }
}

pub struct LoanManagerTestState {
    pub world: ScenarioWorld,
    pub loan_manager_sc: ManagedAddress<StaticApi>,
}

impl LoanManagerTestState {
    /// Deploys the hub with a USDC and an EGLD pool, both listed in the
    /// general loan type, priced and open to the orchestrator.
    pub fn new() -> Self {
        let mut world = world();
        world.account(OWNER_ADDRESS).nonce(1);
        world.account(ORCHESTRATOR_ADDRESS).nonce(1);
        world.account(ORACLE_ADDRESS).nonce(1);
        world.account(RECIPIENT_ADDRESS).nonce(1);
        world.current_block().block_timestamp(0);

        let loan_manager_sc = world
            .tx()
            .from(OWNER_ADDRESS)
            .typed(proxy_loan_manager::LoanManagerProxy)
            .init()
            .code(LOAN_MANAGER_PATH)
            .new_address(LOAN_MANAGER_ADDRESS)
            .returns(ReturnsNewManagedAddress)
            .run();

        let mut state = Self {
            world,
            loan_manager_sc,
        };

        state.add_admin(ORCHESTRATOR_ADDRESS);
        state.add_price_feed_updater(ORACLE_ADDRESS);

        state.add_pool(USDC_POOL, USDC_DECIMALS);
        state.add_pool(EGLD_POOL, EGLD_DECIMALS);

        state.create_loan_type(GENERAL_LOAN_TYPE);
        state.add_pool_to_loan_type(GENERAL_LOAN_TYPE, USDC_POOL, USDC_COLLATERAL_FACTOR);
        state.add_pool_to_loan_type(GENERAL_LOAN_TYPE, EGLD_POOL, EGLD_COLLATERAL_FACTOR);

        state.update_price_feed(USDC_POOL, wad(USDC_PRICE));
        state.update_price_feed(EGLD_POOL, wad(EGLD_PRICE));

        state
    }

    pub fn change_timestamp(&mut self, timestamp: u64) {
        self.world.current_block().block_timestamp(timestamp);
    }

    /// Stocks the hub with the pool token an orchestrator settles from.
    pub fn fund_hub(&mut self, token: TestTokenIdentifier, amount: BigUint<StaticApi>) {
        self.world
            .set_esdt_balance(self.loan_manager_sc.clone(), token.as_bytes(), amount);
    }

    pub fn grant_burn_role(&mut self, token: TestTokenIdentifier) {
        self.world.set_esdt_local_roles(
            self.loan_manager_sc.clone(),
            token.as_bytes(),
            &[EsdtLocalRole::Burn],
        );
    }

    // Governance

    pub fn add_admin(&mut self, admin: TestAddress) {
        self.world
            .tx()
            .from(OWNER_ADDRESS)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .add_admin(admin)
            .run();
    }

    pub fn add_price_feed_updater(&mut self, updater: TestAddress) {
        self.world
            .tx()
            .from(OWNER_ADDRESS)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .add_price_feed_updater(updater)
            .run();
    }

    pub fn add_pool(&mut self, pool_id: u8, asset_decimals: usize) {
        self.add_pool_with_token_pool(pool_id, asset_decimals, TokenPoolKind::Direct);
    }

    pub fn add_pool_with_token_pool(
        &mut self,
        pool_id: u8,
        asset_decimals: usize,
        token_pool: TokenPoolKind<StaticApi>,
    ) {
        self.world
            .tx()
            .from(OWNER_ADDRESS)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .add_pool(
                pool_id,
                asset_decimals,
                token_pool,
                default_rate_params(),
                BigUint::from(RETENTION_RATE),
                BigUint::from(FLASH_LOAN_FEE),
                Option::<BigUint<StaticApi>>::None,
                Option::<BigUint<StaticApi>>::None,
                wad(1),
                open_pool_flags(),
                ManagedBuffer::from(TREASURY),
            )
            .run();
    }

    pub fn add_pool_error(
        &mut self,
        pool_id: u8,
        asset_decimals: usize,
        interest_rate_params: InterestRateParams<StaticApi>,
        retention_rate: u64,
        error_message: &[u8],
    ) {
        self.world
            .tx()
            .from(OWNER_ADDRESS)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .add_pool(
                pool_id,
                asset_decimals,
                TokenPoolKind::<StaticApi>::Direct,
                interest_rate_params,
                BigUint::from(retention_rate),
                BigUint::from(FLASH_LOAN_FEE),
                Option::<BigUint<StaticApi>>::None,
                Option::<BigUint<StaticApi>>::None,
                wad(1),
                open_pool_flags(),
                ManagedBuffer::from(TREASURY),
            )
            .returns(ExpectMessage(core::str::from_utf8(error_message).unwrap()))
            .run();
    }

    pub fn create_loan_type(&mut self, loan_type_id: u16) {
        self.world
            .tx()
            .from(OWNER_ADDRESS)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .create_loan_type(loan_type_id, BigUint::from(TARGET_HEALTH))
            .run();
    }

    pub fn create_loan_type_error(
        &mut self,
        loan_type_id: u16,
        loan_target_health: u64,
        error_message: &[u8],
    ) {
        self.world
            .tx()
            .from(OWNER_ADDRESS)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .create_loan_type(loan_type_id, BigUint::from(loan_target_health))
            .returns(ExpectMessage(core::str::from_utf8(error_message).unwrap()))
            .run();
    }

    pub fn add_pool_to_loan_type(&mut self, loan_type_id: u16, pool_id: u8, collateral_factor: u64) {
        self.world
            .tx()
            .from(OWNER_ADDRESS)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .add_pool_to_loan_type(
                loan_type_id,
                pool_id,
                BigUint::from(collateral_factor),
                BigUint::from(BORROW_FACTOR),
                BigUint::from(LIQUIDATION_BONUS),
                BigUint::from(LIQUIDATION_FEE),
                Option::<BigUint<StaticApi>>::None,
                Option::<BigUint<StaticApi>>::None,
                BigUint::zero(),
                BigUint::zero(),
                BigUint::zero(),
            )
            .run();
    }

    pub fn add_pool_to_loan_type_error(
        &mut self,
        loan_type_id: u16,
        pool_id: u8,
        collateral_factor: u64,
        borrow_factor: u64,
        error_message: &[u8],
    ) {
        self.world
            .tx()
            .from(OWNER_ADDRESS)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .add_pool_to_loan_type(
                loan_type_id,
                pool_id,
                BigUint::from(collateral_factor),
                BigUint::from(borrow_factor),
                BigUint::from(LIQUIDATION_BONUS),
                BigUint::from(LIQUIDATION_FEE),
                Option::<BigUint<StaticApi>>::None,
                Option::<BigUint<StaticApi>>::None,
                BigUint::zero(),
                BigUint::zero(),
                BigUint::zero(),
            )
            .returns(ExpectMessage(core::str::from_utf8(error_message).unwrap()))
            .run();
    }

    pub fn update_pool_caps(
        &mut self,
        pool_id: u8,
        deposit_cap: Option<u64>,
        borrow_cap: Option<u64>,
        stable_borrow_percentage: BigUint<StaticApi>,
    ) {
        self.world
            .tx()
            .from(OWNER_ADDRESS)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .update_pool_caps(
                pool_id,
                deposit_cap.map(BigUint::<StaticApi>::from),
                borrow_cap.map(BigUint::<StaticApi>::from),
                stable_borrow_percentage,
            )
            .run();
    }

    pub fn update_pool_interest_rate_params(
        &mut self,
        pool_id: u8,
        interest_rate_params: InterestRateParams<StaticApi>,
    ) {
        self.world
            .tx()
            .from(OWNER_ADDRESS)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .update_pool_interest_rate_params(pool_id, interest_rate_params)
            .run();
    }

    pub fn update_pool_flags(&mut self, pool_id: u8, flags: PoolFlags) {
        self.world
            .tx()
            .from(OWNER_ADDRESS)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .update_pool_flags(pool_id, flags)
            .run();
    }

    pub fn deprecate_pool(&mut self, pool_id: u8) {
        self.world
            .tx()
            .from(OWNER_ADDRESS)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .deprecate_pool(pool_id)
            .run();
    }

    pub fn deprecate_pool_error(&mut self, pool_id: u8, error_message: &[u8]) {
        self.world
            .tx()
            .from(OWNER_ADDRESS)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .deprecate_pool(pool_id)
            .returns(ExpectMessage(core::str::from_utf8(error_message).unwrap()))
            .run();
    }

    pub fn deprecate_loan_type(&mut self, loan_type_id: u16) {
        self.world
            .tx()
            .from(OWNER_ADDRESS)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .deprecate_loan_type(loan_type_id)
            .run();
    }

    pub fn update_loan_pool_caps(
        &mut self,
        loan_type_id: u16,
        pool_id: u8,
        collateral_cap: Option<u64>,
        borrow_cap: Option<u64>,
    ) {
        self.world
            .tx()
            .from(OWNER_ADDRESS)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .update_loan_pool_caps(
                loan_type_id,
                pool_id,
                collateral_cap.map(BigUint::<StaticApi>::from),
                borrow_cap.map(BigUint::<StaticApi>::from),
            )
            .run();
    }

    pub fn update_loan_pool_reward_speeds(
        &mut self,
        loan_type_id: u16,
        pool_id: u8,
        reward_minimum_amount: BigUint<StaticApi>,
        collateral_speed: BigUint<StaticApi>,
        borrow_speed: BigUint<StaticApi>,
    ) {
        self.world
            .tx()
            .from(OWNER_ADDRESS)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .update_loan_pool_reward_speeds(
                loan_type_id,
                pool_id,
                reward_minimum_amount,
                collateral_speed,
                borrow_speed,
            )
            .run();
    }

    pub fn update_loan_type_target_health(&mut self, loan_type_id: u16, loan_target_health: u64) {
        self.world
            .tx()
            .from(OWNER_ADDRESS)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .update_loan_type_target_health(loan_type_id, BigUint::from(loan_target_health))
            .run();
    }

    pub fn deprecate_loan_pool(&mut self, loan_type_id: u16, pool_id: u8) {
        self.world
            .tx()
            .from(OWNER_ADDRESS)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .deprecate_loan_pool(loan_type_id, pool_id)
            .run();
    }

    pub fn clear_retained_fees(&mut self, pool_id: u8) -> ManagedBuffer<StaticApi> {
        self.world
            .tx()
            .from(OWNER_ADDRESS)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .clear_retained_fees(pool_id, RECIPIENT_ADDRESS)
            .returns(ReturnsResult)
            .run()
    }

    pub fn pause(&mut self) {
        self.world
            .tx()
            .from(OWNER_ADDRESS)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .pause_endpoint()
            .run();
    }

    pub fn unpause(&mut self) {
        self.world
            .tx()
            .from(OWNER_ADDRESS)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .unpause_endpoint()
            .run();
    }

    // Price feed

    pub fn update_price_feed(&mut self, pool_id: u8, price: BigUint<StaticApi>) {
        self.world
            .tx()
            .from(ORACLE_ADDRESS)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .update_price_feed(pool_id, price)
            .run();
    }

    pub fn update_price_feed_error(
        &mut self,
        from: TestAddress,
        pool_id: u8,
        price: BigUint<StaticApi>,
        error_message: &[u8],
    ) {
        self.world
            .tx()
            .from(from)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .update_price_feed(pool_id, price)
            .returns(ExpectMessage(core::str::from_utf8(error_message).unwrap()))
            .run();
    }

    // Loan operations, always sent by the orchestrator

    pub fn create_loan(&mut self, account_id: &[u8], loan_type_id: u16) -> u64 {
        self.world
            .tx()
            .from(ORCHESTRATOR_ADDRESS)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .create_user_loan_endpoint(ManagedBuffer::from(account_id), loan_type_id)
            .returns(ReturnsResult)
            .run()
    }

    pub fn create_loan_error(&mut self, from: TestAddress, account_id: &[u8], error_message: &[u8]) {
        self.world
            .tx()
            .from(from)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .create_user_loan_endpoint(ManagedBuffer::from(account_id), GENERAL_LOAN_TYPE)
            .returns(ExpectMessage(core::str::from_utf8(error_message).unwrap()))
            .run();
    }

    pub fn delete_loan(&mut self, loan_id: u64, account_id: &[u8]) {
        self.world
            .tx()
            .from(ORCHESTRATOR_ADDRESS)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .delete_user_loan_endpoint(loan_id, ManagedBuffer::from(account_id))
            .run();
    }

    pub fn delete_loan_error(&mut self, loan_id: u64, account_id: &[u8], error_message: &[u8]) {
        self.world
            .tx()
            .from(ORCHESTRATOR_ADDRESS)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .delete_user_loan_endpoint(loan_id, ManagedBuffer::from(account_id))
            .returns(ExpectMessage(core::str::from_utf8(error_message).unwrap()))
            .run();
    }

    pub fn deposit(
        &mut self,
        loan_id: u64,
        account_id: &[u8],
        pool_id: u8,
        amount: BigUint<StaticApi>,
    ) -> ManagedDecimal<StaticApi, NumDecimals> {
        self.world
            .tx()
            .from(ORCHESTRATOR_ADDRESS)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .deposit(loan_id, ManagedBuffer::from(account_id), pool_id, amount)
            .returns(ReturnsResult)
            .run()
    }

    pub fn deposit_error(
        &mut self,
        loan_id: u64,
        account_id: &[u8],
        pool_id: u8,
        amount: BigUint<StaticApi>,
        error_message: &[u8],
    ) {
        self.world
            .tx()
            .from(ORCHESTRATOR_ADDRESS)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .deposit(loan_id, ManagedBuffer::from(account_id), pool_id, amount)
            .returns(ExpectMessage(core::str::from_utf8(error_message).unwrap()))
            .run();
    }

    pub fn deposit_f_token(
        &mut self,
        loan_id: u64,
        account_id: &[u8],
        pool_id: u8,
        f_amount: BigUint<StaticApi>,
    ) {
        self.world
            .tx()
            .from(ORCHESTRATOR_ADDRESS)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .deposit_f_token(loan_id, ManagedBuffer::from(account_id), pool_id, f_amount)
            .run();
    }

    pub fn deposit_f_token_error(
        &mut self,
        loan_id: u64,
        account_id: &[u8],
        pool_id: u8,
        f_amount: BigUint<StaticApi>,
        error_message: &[u8],
    ) {
        self.world
            .tx()
            .from(ORCHESTRATOR_ADDRESS)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .deposit_f_token(loan_id, ManagedBuffer::from(account_id), pool_id, f_amount)
            .returns(ExpectMessage(core::str::from_utf8(error_message).unwrap()))
            .run();
    }

    pub fn withdraw(
        &mut self,
        loan_id: u64,
        account_id: &[u8],
        pool_id: u8,
        amount: BigUint<StaticApi>,
        is_f_amount: bool,
    ) -> MultiValue2<ManagedDecimal<StaticApi, NumDecimals>, ManagedBuffer<StaticApi>> {
        self.world
            .tx()
            .from(ORCHESTRATOR_ADDRESS)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .withdraw(
                loan_id,
                ManagedBuffer::from(account_id),
                pool_id,
                amount,
                is_f_amount,
                RECIPIENT_ADDRESS,
            )
            .returns(ReturnsResult)
            .run()
    }

    pub fn withdraw_error(
        &mut self,
        loan_id: u64,
        account_id: &[u8],
        pool_id: u8,
        amount: BigUint<StaticApi>,
        error_message: &[u8],
    ) {
        self.world
            .tx()
            .from(ORCHESTRATOR_ADDRESS)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .withdraw(
                loan_id,
                ManagedBuffer::from(account_id),
                pool_id,
                amount,
                false,
                RECIPIENT_ADDRESS,
            )
            .returns(ExpectMessage(core::str::from_utf8(error_message).unwrap()))
            .run();
    }

    pub fn withdraw_f_token(
        &mut self,
        loan_id: u64,
        account_id: &[u8],
        pool_id: u8,
        f_amount: BigUint<StaticApi>,
    ) {
        self.world
            .tx()
            .from(ORCHESTRATOR_ADDRESS)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .withdraw_f_token(loan_id, ManagedBuffer::from(account_id), pool_id, f_amount)
            .run();
    }

    pub fn withdraw_f_token_error(
        &mut self,
        loan_id: u64,
        account_id: &[u8],
        pool_id: u8,
        f_amount: BigUint<StaticApi>,
        error_message: &[u8],
    ) {
        self.world
            .tx()
            .from(ORCHESTRATOR_ADDRESS)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .withdraw_f_token(loan_id, ManagedBuffer::from(account_id), pool_id, f_amount)
            .returns(ExpectMessage(core::str::from_utf8(error_message).unwrap()))
            .run();
    }

    /// `max_stable_rate` of zero borrows at the variable rate.
    pub fn borrow(
        &mut self,
        loan_id: u64,
        account_id: &[u8],
        pool_id: u8,
        amount: BigUint<StaticApi>,
        max_stable_rate: BigUint<StaticApi>,
    ) -> ManagedDecimal<StaticApi, NumDecimals> {
        let (stable_rate, _) =
            self.borrow_with_metadata(loan_id, account_id, pool_id, amount, max_stable_rate);

        stable_rate
    }

    /// Same as `borrow`, also returning what the pool handed to the orchestrator.
    pub fn borrow_with_metadata(
        &mut self,
        loan_id: u64,
        account_id: &[u8],
        pool_id: u8,
        amount: BigUint<StaticApi>,
        max_stable_rate: BigUint<StaticApi>,
    ) -> (ManagedDecimal<StaticApi, NumDecimals>, ManagedBuffer<StaticApi>) {
        self
            .world
            .tx()
            .from(ORCHESTRATOR_ADDRESS)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .borrow(
                loan_id,
                ManagedBuffer::from(account_id),
                pool_id,
                amount,
                max_stable_rate,
                RECIPIENT_ADDRESS,
            )
            .returns(ReturnsResult)
            .run()
            .into_tuple()
    }

    pub fn borrow_error(
        &mut self,
        loan_id: u64,
        account_id: &[u8],
        pool_id: u8,
        amount: BigUint<StaticApi>,
        max_stable_rate: BigUint<StaticApi>,
        error_message: &[u8],
    ) {
        self.world
            .tx()
            .from(ORCHESTRATOR_ADDRESS)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .borrow(
                loan_id,
                ManagedBuffer::from(account_id),
                pool_id,
                amount,
                max_stable_rate,
                RECIPIENT_ADDRESS,
            )
            .returns(ExpectMessage(core::str::from_utf8(error_message).unwrap()))
            .run();
    }

    pub fn repay(
        &mut self,
        loan_id: u64,
        account_id: &[u8],
        pool_id: u8,
        amount: BigUint<StaticApi>,
        max_over_repayment: BigUint<StaticApi>,
    ) -> MultiValue3<
        ManagedDecimal<StaticApi, NumDecimals>,
        ManagedDecimal<StaticApi, NumDecimals>,
        ManagedDecimal<StaticApi, NumDecimals>,
    > {
        self.world
            .tx()
            .from(ORCHESTRATOR_ADDRESS)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .repay(
                loan_id,
                ManagedBuffer::from(account_id),
                pool_id,
                amount,
                max_over_repayment,
            )
            .returns(ReturnsResult)
            .run()
    }

    pub fn repay_error(
        &mut self,
        loan_id: u64,
        account_id: &[u8],
        pool_id: u8,
        amount: BigUint<StaticApi>,
        max_over_repayment: BigUint<StaticApi>,
        error_message: &[u8],
    ) {
        self.world
            .tx()
            .from(ORCHESTRATOR_ADDRESS)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .repay(
                loan_id,
                ManagedBuffer::from(account_id),
                pool_id,
                amount,
                max_over_repayment,
            )
            .returns(ExpectMessage(core::str::from_utf8(error_message).unwrap()))
            .run();
    }

    pub fn repay_with_collateral(
        &mut self,
        loan_id: u64,
        account_id: &[u8],
        pool_id: u8,
        amount: BigUint<StaticApi>,
    ) -> MultiValue2<ManagedDecimal<StaticApi, NumDecimals>, ManagedDecimal<StaticApi, NumDecimals>>
    {
        self.world
            .tx()
            .from(ORCHESTRATOR_ADDRESS)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .repay_with_collateral(loan_id, ManagedBuffer::from(account_id), pool_id, amount)
            .returns(ReturnsResult)
            .run()
    }

    pub fn liquidate(
        &mut self,
        violator_loan_id: u64,
        liquidator_loan_id: u64,
        liquidator_account_id: &[u8],
        col_pool_id: u8,
        bor_pool_id: u8,
        max_repay_amount: BigUint<StaticApi>,
        min_seized_amount: BigUint<StaticApi>,
    ) -> MultiValue2<ManagedDecimal<StaticApi, NumDecimals>, ManagedDecimal<StaticApi, NumDecimals>>
    {
        self.world
            .tx()
            .from(ORCHESTRATOR_ADDRESS)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .liquidate(
                violator_loan_id,
                liquidator_loan_id,
                ManagedBuffer::from(liquidator_account_id),
                col_pool_id,
                bor_pool_id,
                max_repay_amount,
                min_seized_amount,
            )
            .returns(ReturnsResult)
            .run()
    }

    pub fn liquidate_error(
        &mut self,
        violator_loan_id: u64,
        liquidator_loan_id: u64,
        liquidator_account_id: &[u8],
        col_pool_id: u8,
        bor_pool_id: u8,
        max_repay_amount: BigUint<StaticApi>,
        min_seized_amount: BigUint<StaticApi>,
        error_message: &[u8],
    ) {
        self.world
            .tx()
            .from(ORCHESTRATOR_ADDRESS)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .liquidate(
                violator_loan_id,
                liquidator_loan_id,
                ManagedBuffer::from(liquidator_account_id),
                col_pool_id,
                bor_pool_id,
                max_repay_amount,
                min_seized_amount,
            )
            .returns(ExpectMessage(core::str::from_utf8(error_message).unwrap()))
            .run();
    }

    pub fn switch_borrow_type(
        &mut self,
        loan_id: u64,
        account_id: &[u8],
        pool_id: u8,
        borrow_type: BorrowType,
        max_stable_rate: BigUint<StaticApi>,
    ) {
        self.world
            .tx()
            .from(ORCHESTRATOR_ADDRESS)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .switch_borrow_type(
                loan_id,
                ManagedBuffer::from(account_id),
                pool_id,
                borrow_type,
                max_stable_rate,
            )
            .run();
    }

    pub fn switch_borrow_type_error(
        &mut self,
        loan_id: u64,
        account_id: &[u8],
        pool_id: u8,
        borrow_type: BorrowType,
        max_stable_rate: BigUint<StaticApi>,
        error_message: &[u8],
    ) {
        self.world
            .tx()
            .from(ORCHESTRATOR_ADDRESS)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .switch_borrow_type(
                loan_id,
                ManagedBuffer::from(account_id),
                pool_id,
                borrow_type,
                max_stable_rate,
            )
            .returns(ExpectMessage(core::str::from_utf8(error_message).unwrap()))
            .run();
    }

    pub fn rebalance_up(&mut self, loan_id: u64, pool_id: u8) {
        self.world
            .tx()
            .from(ORCHESTRATOR_ADDRESS)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .rebalance_up(loan_id, pool_id)
            .run();
    }

    pub fn rebalance_up_error(&mut self, loan_id: u64, pool_id: u8, error_message: &[u8]) {
        self.world
            .tx()
            .from(ORCHESTRATOR_ADDRESS)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .rebalance_up(loan_id, pool_id)
            .returns(ExpectMessage(core::str::from_utf8(error_message).unwrap()))
            .run();
    }

    pub fn rebalance_down(&mut self, loan_id: u64, pool_id: u8) {
        self.world
            .tx()
            .from(ORCHESTRATOR_ADDRESS)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .rebalance_down(loan_id, pool_id)
            .run();
    }

    pub fn rebalance_down_error(&mut self, loan_id: u64, pool_id: u8, error_message: &[u8]) {
        self.world
            .tx()
            .from(ORCHESTRATOR_ADDRESS)
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .rebalance_down(loan_id, pool_id)
            .returns(ExpectMessage(core::str::from_utf8(error_message).unwrap()))
            .run();
    }

    // Views

    pub fn get_user_loan(&mut self, loan_id: u64) -> UserLoan<StaticApi> {
        self.world
            .query()
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .user_loan(loan_id)
            .returns(ReturnsResult)
            .run()
    }

    pub fn get_pool_state(&mut self, pool_id: u8) -> PoolState<StaticApi> {
        self.world
            .query()
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .pool_state(pool_id)
            .returns(ReturnsResult)
            .run()
    }

    pub fn get_updated_pool_state(&mut self, pool_id: u8) -> PoolState<StaticApi> {
        self.world
            .query()
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .get_updated_pool_state(pool_id)
            .returns(ReturnsResult)
            .run()
    }

    pub fn get_loan_pool(&mut self, loan_type_id: u16, pool_id: u8) -> LoanPool<StaticApi> {
        self.world
            .query()
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .loan_pool(loan_type_id, pool_id)
            .returns(ReturnsResult)
            .run()
    }

    pub fn get_loan_liquidity(&mut self, loan_id: u64) -> LoanLiquidity<StaticApi> {
        self.world
            .query()
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .get_loan_liquidity_view(loan_id)
            .returns(ReturnsResult)
            .run()
    }

    pub fn is_loan_over_collateralized(&mut self, loan_id: u64) -> bool {
        self.world
            .query()
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .is_loan_over_collateralized_view(loan_id)
            .returns(ReturnsResult)
            .run()
    }

    pub fn get_user_pool_rewards(&mut self, account_id: &[u8], pool_id: u8) -> UserPoolRewards<StaticApi> {
        self.world
            .query()
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .get_user_pool_rewards_view(ManagedBuffer::from(account_id), pool_id)
            .returns(ReturnsResult)
            .run()
    }

    pub fn get_f_token_balance(&mut self, account_id: &[u8], pool_id: u8) -> BigUint<StaticApi> {
        self.world
            .query()
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .f_token_balance(ManagedBuffer::from(account_id), pool_id)
            .returns(ReturnsResult)
            .run()
    }

    pub fn get_flash_loan_fee(
        &mut self,
        pool_id: u8,
        amount: BigUint<StaticApi>,
    ) -> ManagedDecimal<StaticApi, NumDecimals> {
        self.world
            .query()
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .get_flash_loan_fee_view(pool_id, amount)
            .returns(ReturnsResult)
            .run()
    }

    pub fn get_max_repay_borrow_value(
        &mut self,
        loan_id: u64,
        col_pool_id: u8,
        bor_pool_id: u8,
    ) -> Option<ManagedDecimal<StaticApi, NumDecimals>> {
        self.world
            .query()
            .to(self.loan_manager_sc.clone())
            .typed(proxy_loan_manager::LoanManagerProxy)
            .get_max_repay_borrow_value(loan_id, col_pool_id, bor_pool_id)
            .returns(ReturnsResult)
            .run()
    }

    /// Raw collateral balance of a loan in a pool, zero without an entry.
    pub fn collateral_of(&mut self, loan_id: u64, pool_id: u8) -> BigUint<StaticApi> {
        self.get_user_loan(loan_id)
            .get_collateral(pool_id)
            .map(|collateral| collateral.balance.into_raw_units().clone())
            .unwrap_or_default()
    }

    /// Raw borrow balance of a loan in a pool as last stored, zero without an entry.
    pub fn borrow_balance_of(&mut self, loan_id: u64, pool_id: u8) -> BigUint<StaticApi> {
        self.get_user_loan(loan_id)
            .get_borrow(pool_id)
            .map(|borrow| borrow.balance.into_raw_units().clone())
            .unwrap_or_default()
    }
}
