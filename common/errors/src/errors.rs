#![no_std]

// Configuration

pub static ERROR_INVALID_COLLATERAL_FACTOR: &[u8] = b"Collateral factor must not exceed 100%.";

pub static ERROR_INVALID_BORROW_FACTOR: &[u8] = b"Borrow factor must be at least 100%.";

pub static ERROR_INVALID_LIQUIDATION_BONUS: &[u8] = b"Liquidation bonus must not exceed 100%.";

pub static ERROR_INVALID_LIQUIDATION_FEE: &[u8] = b"Liquidation fee must not exceed 100%.";

pub static ERROR_INVALID_TARGET_HEALTH: &[u8] = b"Loan target health must be at least 100%.";

pub static ERROR_INVALID_RETENTION_RATE: &[u8] = b"Retention rate must not exceed 100%.";

pub static ERROR_INVALID_FLASH_LOAN_FEE: &[u8] = b"Flash loan fee must not exceed 100%.";

pub static ERROR_INVALID_OPTIMAL_RATIO: &[u8] =
    b"Optimal ratios must be strictly between 0% and 100%.";

pub static ERROR_INVALID_RATE_PARAM: &[u8] = b"Interest rate parameter out of range.";

pub static ERROR_INVALID_REBALANCE_PARAMS: &[u8] = b"Rebalance parameters out of range.";

pub static ERROR_INVALID_STABLE_BORROW_PERCENTAGE: &[u8] =
    b"Stable borrow percentage must not exceed 100%.";

pub static ERROR_INVALID_DECIMALS: &[u8] = b"Invalid asset decimals.";

pub static ERROR_INVALID_PRICE: &[u8] = b"Price must be greater than zero.";

pub static ERROR_POOL_ALREADY_EXISTS: &[u8] = b"Pool already exists.";

pub static ERROR_LOAN_TYPE_ALREADY_EXISTS: &[u8] = b"Loan type already exists.";

pub static ERROR_POOL_ALREADY_IN_LOAN_TYPE: &[u8] = b"Pool already added to loan type.";

// Capacity

pub static ERROR_DEPOSIT_CAP_REACHED: &[u8] = b"Pool deposit cap reached.";

pub static ERROR_BORROW_CAP_REACHED: &[u8] = b"Pool borrow cap reached.";

pub static ERROR_COLLATERAL_CAP_REACHED: &[u8] = b"Loan pool collateral cap reached.";

pub static ERROR_LOAN_BORROW_CAP_REACHED: &[u8] = b"Loan pool borrow cap reached.";

pub static ERROR_STABLE_BORROW_CAP_REACHED: &[u8] = b"Stable borrow cap reached.";

pub static ERROR_INSUFFICIENT_LIQUIDITY: &[u8] = b"Insufficient liquidity in pool.";

// Entitlement

pub static ERROR_POOL_NOT_FOUND: &[u8] = b"Unknown pool.";

pub static ERROR_POOL_DEPRECATED: &[u8] = b"Pool is deprecated.";

pub static ERROR_LOAN_TYPE_NOT_FOUND: &[u8] = b"Unknown loan type.";

pub static ERROR_LOAN_TYPE_DEPRECATED: &[u8] = b"Loan type is deprecated.";

pub static ERROR_LOAN_POOL_NOT_FOUND: &[u8] = b"Pool is not part of the loan type.";

pub static ERROR_LOAN_POOL_DEPRECATED: &[u8] = b"Loan pool is deprecated.";

pub static ERROR_LOAN_NOT_FOUND: &[u8] = b"Unknown loan.";

pub static ERROR_LOAN_INACTIVE: &[u8] = b"Loan is not active.";

pub static ERROR_NOT_LOAN_OWNER: &[u8] = b"Account does not own the loan.";

pub static ERROR_LOAN_NOT_EMPTY: &[u8] = b"Loan still has collateral or borrows.";

pub static ERROR_NO_COLLATERAL_IN_POOL: &[u8] = b"No collateral in pool for this loan.";

pub static ERROR_NO_BORROW_IN_POOL: &[u8] = b"No borrow in pool for this loan.";

pub static ERROR_INSUFFICIENT_COLLATERAL_BALANCE: &[u8] =
    b"Collateral balance too low for this amount.";

pub static ERROR_INSUFFICIENT_F_TOKEN_BALANCE: &[u8] = b"Not enough f-tokens in account.";

pub static ERROR_STABLE_BORROW_NOT_SUPPORTED: &[u8] = b"Stable borrowing is not supported.";

pub static ERROR_F_TOKEN_NOT_MINTABLE: &[u8] = b"Pool does not allow f-token minting.";

pub static ERROR_FLASH_LOAN_NOT_SUPPORTED: &[u8] = b"Flash loans are not supported.";

pub static ERROR_NO_PRICE_FEED: &[u8] = b"No price feed configured for pool.";

pub static ERROR_CALLER_NOT_PRICE_UPDATER: &[u8] = b"Caller is not allowed to push prices.";

// Health

pub static ERROR_LOAN_UNDER_COLLATERALIZED: &[u8] = b"Loan would be under-collateralized.";

pub static ERROR_LOAN_NOT_LIQUIDATABLE: &[u8] = b"Loan is over-collateralized.";

pub static ERROR_LIQUIDATOR_UNDER_COLLATERALIZED: &[u8] =
    b"Liquidator loan would be under-collateralized.";

// Rate

pub static ERROR_MAX_STABLE_RATE_EXCEEDED: &[u8] = b"Stable rate is above the accepted maximum.";

pub static ERROR_REBALANCE_UP_THRESHOLD_NOT_MET: &[u8] = b"Rebalance up threshold not met.";

pub static ERROR_REBALANCE_DOWN_THRESHOLD_NOT_MET: &[u8] = b"Rebalance down threshold not met.";

// Consistency

pub static ERROR_AMOUNT_MUST_BE_GREATER_THAN_ZERO: &[u8] = b"Amount must be greater than zero.";

pub static ERROR_BORROW_TYPE_MISMATCH: &[u8] = b"Borrow type does not match existing borrow.";

pub static ERROR_BORROW_TYPE_UNCHANGED: &[u8] = b"Borrow already has the requested type.";

pub static ERROR_NOT_STABLE_BORROW: &[u8] = b"Borrow is not a stable borrow.";

pub static ERROR_SAME_LOAN: &[u8] = b"Violator and liquidator loans must differ.";

pub static ERROR_DIFFERENT_LOAN_TYPES: &[u8] = b"Loans must share the same loan type.";

pub static ERROR_SEIZE_BELOW_MINIMUM: &[u8] = b"Seized collateral below the accepted minimum.";

pub static ERROR_NOTHING_TO_LIQUIDATE: &[u8] = b"Computed repay amount is zero.";

pub static ERROR_MAX_OVER_REPAYMENT_EXCEEDED: &[u8] = b"Repayment exceeds the owed balance by too much.";
