pub mod account;
pub mod borrow;
pub mod collateral;
pub mod liquidation;
pub mod liquidity;
pub mod rebalance;
pub mod update;
