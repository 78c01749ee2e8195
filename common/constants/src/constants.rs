#![no_std]

pub const SECONDS_PER_MINUTE: u64 = 60;
pub const SECONDS_PER_DAY: u64 = 86_400;
/// 365 days, the compounding period used by every rate in the hub
pub const SECONDS_PER_YEAR: u64 = 31_536_000;

/// Rates, indices, prices and dollar values
pub const WAD: u128 = 1_000_000_000_000_000_000;
pub const WAD_PRECISION: usize = 18;

/// Rate-curve parameters, retention rate and flash-loan fee
pub const SIX_DP: u64 = 1_000_000; // 100%
pub const SIX_DP_PRECISION: usize = 6;

/// Ratios, factors and target health
pub const BPS: u64 = 10_000; // 100%
pub const BPS_PRECISION: usize = 4;

pub const MAX_ASSET_DECIMALS: usize = 18;

/// Upper bound for every variable/stable rate-curve parameter (1000%)
pub const MAX_RATE_PARAM: u64 = 10_000_000;
