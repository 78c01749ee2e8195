#![no_std]

multiversx_sc::imports!();
multiversx_sc::derive_imports!();

pub type PoolId = u8;
pub type LoanTypeId = u16;
pub type LoanId = u64;

/// Kinked curve parameters of a pool.
///
/// `vr*`/`sr*` are 6 decimal rates, the ratios are 4 decimal fractions.
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone)]
pub struct InterestRateParams<M: ManagedTypeApi> {
    pub vr0: ManagedDecimal<M, NumDecimals>,
    pub vr1: ManagedDecimal<M, NumDecimals>,
    pub vr2: ManagedDecimal<M, NumDecimals>,
    pub sr0: ManagedDecimal<M, NumDecimals>,
    pub sr1: ManagedDecimal<M, NumDecimals>,
    pub sr2: ManagedDecimal<M, NumDecimals>,
    pub sr3: ManagedDecimal<M, NumDecimals>,
    pub optimal_utilisation_ratio: ManagedDecimal<M, NumDecimals>,
    pub optimal_stable_to_total_debt_ratio: ManagedDecimal<M, NumDecimals>,
    pub rebalance_up_utilisation_ratio: ManagedDecimal<M, NumDecimals>,
    pub rebalance_up_deposit_interest_rate: ManagedDecimal<M, NumDecimals>,
    pub rebalance_down_delta: ManagedDecimal<M, NumDecimals>,
}

/// Burn-and-mint route of a bridged pool token.
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone)]
pub struct BridgedToken<M: ManagedTypeApi> {
    pub token: TokenIdentifier<M>,
    pub adapter: ManagedAddress<M>,
    pub chain_id: u16,
}

/// How the hub hands out the underlying of a pool.
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone)]
pub enum TokenPoolKind<M: ManagedTypeApi> {
    /// Custody lives outside the hub, nothing moves here.
    Direct,
    /// The hub transfers the token to the recipient out of a balance the
    /// orchestrator keeps stocked.
    Wrapped(EgldOrEsdtTokenIdentifier<M>),
    /// The hub burns from that same kind of balance and returns the mint
    /// instruction for the adapter.
    Bridged(BridgedToken<M>),
}

/// Message returned by a bridged `send_token`, forwarded by the orchestrator.
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone)]
pub struct BridgeTransfer<M: ManagedTypeApi> {
    pub adapter: ManagedAddress<M>,
    pub chain_id: u16,
    pub token: TokenIdentifier<M>,
    pub recipient: ManagedAddress<M>,
    pub amount: BigUint<M>,
}

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone)]
pub struct PoolFlags {
    pub is_deprecated: bool,
    pub stable_borrow_supported: bool,
    pub flash_loan_supported: bool,
    pub can_mint_f_token: bool,
}

/// Static configuration of a pool, changed only through admin setters.
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone)]
pub struct PoolConfig<M: ManagedTypeApi> {
    pub asset_decimals: usize,
    pub token_pool: TokenPoolKind<M>,
    pub interest_rate_params: InterestRateParams<M>,
    /// 6 decimals
    pub retention_rate: ManagedDecimal<M, NumDecimals>,
    /// 6 decimals
    pub flash_loan_fee: ManagedDecimal<M, NumDecimals>,
    /// Whole dollars, `None` for uncapped
    pub deposit_cap: Option<BigUint<M>>,
    pub borrow_cap: Option<BigUint<M>>,
    /// Share of available liquidity a single stable borrow may take, 18 decimals
    pub stable_borrow_percentage: ManagedDecimal<M, NumDecimals>,
    pub flags: PoolFlags,
    /// Account credited with the protocol share of liquidation seizes
    pub f_token_fee_recipient: ManagedBuffer<M>,
}

impl<M: ManagedTypeApi> PoolConfig<M> {
    pub fn is_deprecated(&self) -> bool {
        self.flags.is_deprecated
    }

    pub fn can_borrow_stable(&self) -> bool {
        self.flags.stable_borrow_supported
    }

    pub fn can_flash_loan(&self) -> bool {
        self.flags.flash_loan_supported
    }

    pub fn can_mint_f_token(&self) -> bool {
        self.flags.can_mint_f_token
    }
}

/// Mutable accounting of a pool. Amounts use the asset decimals, rates and
/// indices 18 decimals.
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone)]
pub struct PoolState<M: ManagedTypeApi> {
    pub deposit_total: ManagedDecimal<M, NumDecimals>,
    pub variable_borrow_total: ManagedDecimal<M, NumDecimals>,
    pub stable_borrow_total: ManagedDecimal<M, NumDecimals>,
    pub deposit_interest_rate: ManagedDecimal<M, NumDecimals>,
    pub deposit_interest_index: ManagedDecimal<M, NumDecimals>,
    pub variable_borrow_interest_rate: ManagedDecimal<M, NumDecimals>,
    pub variable_borrow_interest_index: ManagedDecimal<M, NumDecimals>,
    pub stable_borrow_interest_rate: ManagedDecimal<M, NumDecimals>,
    pub stable_borrow_average_rate: ManagedDecimal<M, NumDecimals>,
    pub total_retained: ManagedDecimal<M, NumDecimals>,
    pub last_update_timestamp: u64,
}

impl<M: ManagedTypeApi> PoolState<M> {
    pub fn total_debt(&self) -> ManagedDecimal<M, NumDecimals> {
        self.variable_borrow_total.clone() + self.stable_borrow_total.clone()
    }
}

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone)]
pub struct PriceFeed<M: ManagedTypeApi> {
    /// 18 decimals
    pub price: ManagedDecimal<M, NumDecimals>,
    pub decimals: usize,
}

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone)]
pub struct LoanType<M: ManagedTypeApi> {
    pub is_deprecated: bool,
    /// 4 decimals, at least 100%
    pub loan_target_health: ManagedDecimal<M, NumDecimals>,
}

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone)]
pub struct LoanPoolReward<M: ManagedTypeApi> {
    pub last_update_timestamp: u64,
    /// Asset decimals; indices do not move while the used amount is at or below it
    pub minimum_amount: ManagedDecimal<M, NumDecimals>,
    /// Reward units per second, 18 decimals
    pub collateral_speed: ManagedDecimal<M, NumDecimals>,
    pub borrow_speed: ManagedDecimal<M, NumDecimals>,
    pub collateral_reward_index: ManagedDecimal<M, NumDecimals>,
    pub borrow_reward_index: ManagedDecimal<M, NumDecimals>,
}

/// Membership of a pool in a loan type.
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone)]
pub struct LoanPool<M: ManagedTypeApi> {
    /// Sum of the f-token collateral of every loan of the type
    pub collateral_used: ManagedDecimal<M, NumDecimals>,
    /// Sum of the borrow principal of every loan of the type
    pub borrow_used: ManagedDecimal<M, NumDecimals>,
    pub collateral_cap: Option<BigUint<M>>,
    pub borrow_cap: Option<BigUint<M>>,
    pub collateral_factor: ManagedDecimal<M, NumDecimals>,
    pub borrow_factor: ManagedDecimal<M, NumDecimals>,
    pub liquidation_bonus: ManagedDecimal<M, NumDecimals>,
    pub liquidation_fee: ManagedDecimal<M, NumDecimals>,
    pub is_deprecated: bool,
    pub reward: LoanPoolReward<M>,
}

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Eq, Debug)]
pub enum BorrowType {
    Variable,
    Stable,
}

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, ManagedVecItem, Clone)]
pub struct UserLoanCollateral<M: ManagedTypeApi> {
    /// f-token units
    pub balance: ManagedDecimal<M, NumDecimals>,
    pub reward_index: ManagedDecimal<M, NumDecimals>,
}

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, ManagedVecItem, Clone)]
pub struct UserLoanBorrow<M: ManagedTypeApi> {
    /// Principal still owed, excludes interest
    pub amount: ManagedDecimal<M, NumDecimals>,
    /// Principal plus accrued interest
    pub balance: ManagedDecimal<M, NumDecimals>,
    pub last_interest_index: ManagedDecimal<M, NumDecimals>,
    /// Zero for a variable borrow
    pub stable_interest_rate: ManagedDecimal<M, NumDecimals>,
    /// Zero for a variable borrow
    pub last_stable_update_timestamp: u64,
    pub reward_index: ManagedDecimal<M, NumDecimals>,
}

impl<M: ManagedTypeApi> UserLoanBorrow<M> {
    pub fn is_stable(&self) -> bool {
        self.stable_interest_rate.into_raw_units() > &BigUint::zero()
    }

    pub fn borrow_type(&self) -> BorrowType {
        if self.is_stable() {
            BorrowType::Stable
        } else {
            BorrowType::Variable
        }
    }

    pub fn interest(&self) -> ManagedDecimal<M, NumDecimals> {
        self.balance.clone() - self.amount.clone()
    }
}

/// A loan position. `col_pools[i]` owns `collaterals[i]` and `bor_pools[i]`
/// owns `borrows[i]`; a pool id is listed only while its entry is nonzero.
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone)]
pub struct UserLoan<M: ManagedTypeApi> {
    pub is_active: bool,
    pub account_id: ManagedBuffer<M>,
    pub loan_type_id: LoanTypeId,
    pub col_pools: ManagedVec<M, PoolId>,
    pub bor_pools: ManagedVec<M, PoolId>,
    pub collaterals: ManagedVec<M, UserLoanCollateral<M>>,
    pub borrows: ManagedVec<M, UserLoanBorrow<M>>,
}

impl<M: ManagedTypeApi> UserLoan<M> {
    pub fn new(account_id: ManagedBuffer<M>, loan_type_id: LoanTypeId) -> Self {
        UserLoan {
            is_active: true,
            account_id,
            loan_type_id,
            col_pools: ManagedVec::new(),
            bor_pools: ManagedVec::new(),
            collaterals: ManagedVec::new(),
            borrows: ManagedVec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.col_pools.is_empty() && self.bor_pools.is_empty()
    }

    pub fn get_collateral(&self, pool_id: PoolId) -> Option<UserLoanCollateral<M>> {
        position_of(&self.col_pools, pool_id).map(|index| self.collaterals.get(index).clone())
    }

    pub fn get_borrow(&self, pool_id: PoolId) -> Option<UserLoanBorrow<M>> {
        position_of(&self.bor_pools, pool_id).map(|index| self.borrows.get(index).clone())
    }

    /// Stores the entry, adding the pool on first nonzero balance and
    /// swap-removing it once the balance reaches zero.
    pub fn set_collateral(&mut self, pool_id: PoolId, entry: UserLoanCollateral<M>) {
        let is_zero = entry.balance.into_raw_units() == &BigUint::zero();
        match position_of(&self.col_pools, pool_id) {
            Some(index) if is_zero => {
                let last = self.col_pools.len() - 1;
                if index != last {
                    let moved_pool = self.col_pools.get(last);
                    let moved_entry = self.collaterals.get(last).clone();
                    let _ = self.col_pools.set(index, moved_pool);
                    let _ = self.collaterals.set(index, moved_entry);
                }
                let _ = self.col_pools.remove(last);
                let _ = self.collaterals.remove(last);
            },
            Some(index) => {
                let _ = self.collaterals.set(index, entry);
            },
            None if is_zero => {},
            None => {
                self.col_pools.push(pool_id);
                self.collaterals.push(entry);
            },
        }
    }

    pub fn set_borrow(&mut self, pool_id: PoolId, entry: UserLoanBorrow<M>) {
        let is_zero = entry.balance.into_raw_units() == &BigUint::zero();
        match position_of(&self.bor_pools, pool_id) {
            Some(index) if is_zero => {
                let last = self.bor_pools.len() - 1;
                if index != last {
                    let moved_pool = self.bor_pools.get(last);
                    let moved_entry = self.borrows.get(last).clone();
                    let _ = self.bor_pools.set(index, moved_pool);
                    let _ = self.borrows.set(index, moved_entry);
                }
                let _ = self.bor_pools.remove(last);
                let _ = self.borrows.remove(last);
            },
            Some(index) => {
                let _ = self.borrows.set(index, entry);
            },
            None if is_zero => {},
            None => {
                self.bor_pools.push(pool_id);
                self.borrows.push(entry);
            },
        }
    }
}

fn position_of<M: ManagedTypeApi>(pools: &ManagedVec<M, PoolId>, pool_id: PoolId) -> Option<usize> {
    (0..pools.len()).find(|&index| pools.get(index) == pool_id)
}

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone)]
pub struct UserPoolRewards<M: ManagedTypeApi> {
    pub collateral: ManagedDecimal<M, NumDecimals>,
    pub borrow: ManagedDecimal<M, NumDecimals>,
    /// Interest repaid, asset decimals
    pub interest_paid: ManagedDecimal<M, NumDecimals>,
}

/// Factor-weighted dollar values of a loan, 18 decimals.
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone)]
pub struct LoanLiquidity<M: ManagedTypeApi> {
    pub effective_collateral_value: ManagedDecimal<M, NumDecimals>,
    pub effective_borrow_value: ManagedDecimal<M, NumDecimals>,
}

impl<M: ManagedTypeApi> LoanLiquidity<M> {
    pub fn is_over_collateralized(&self) -> bool {
        self.effective_collateral_value >= self.effective_borrow_value
    }
}
