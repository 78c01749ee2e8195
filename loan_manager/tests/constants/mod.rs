use multiversx_sc::types::{TestAddress, TestSCAddress, TestTokenIdentifier};
use multiversx_sc_scenario::imports::MxscPath;

pub const LOAN_MANAGER_ADDRESS: TestSCAddress = TestSCAddress::new("loan-manager");
pub const LOAN_MANAGER_PATH: MxscPath = MxscPath::new("output/loan_manager.mxsc.json");

pub const OWNER_ADDRESS: TestAddress = TestAddress::new("owner");
pub const ORCHESTRATOR_ADDRESS: TestAddress = TestAddress::new("orchestrator");
pub const ORACLE_ADDRESS: TestAddress = TestAddress::new("oracle");
pub const RECIPIENT_ADDRESS: TestAddress = TestAddress::new("recipient");
pub const ADAPTER_ADDRESS: TestAddress = TestAddress::new("adapter");

// Account ids as the orchestrators know them
pub const ALICE: &[u8] = b"alice";
pub const BOB: &[u8] = b"bob";
pub const CAROL: &[u8] = b"carol";
pub const TREASURY: &[u8] = b"treasury";

pub const GENERAL_LOAN_TYPE: u16 = 1;
pub const SECONDARY_LOAN_TYPE: u16 = 2;
pub const TARGET_HEALTH: u64 = 12_500;

pub const USDC_POOL: u8 = 1;
pub const USDC_DECIMALS: usize = 6;
pub const USDC_PRICE: u64 = 1;

pub const EGLD_POOL: u8 = 2;
pub const EGLD_DECIMALS: usize = 18;
pub const EGLD_PRICE: u64 = 40;

// USDC settled by the hub itself, from its own balance or over a bridge
pub const WRAPPED_USDC_POOL: u8 = 5;
pub const WRAPPED_USDC_TOKEN: TestTokenIdentifier = TestTokenIdentifier::new("WUSDC-abcdef");
pub const BRIDGED_USDC_POOL: u8 = 6;
pub const BRIDGED_USDC_TOKEN: TestTokenIdentifier = TestTokenIdentifier::new("BUSDC-abcdef");
pub const BRIDGE_CHAIN_ID: u16 = 6;

pub const SECONDS_PER_YEAR: u64 = 31_536_000;

// Rate curve, 6 decimals
pub const VR0: u64 = 0;
pub const VR1: u64 = 40_000;
pub const VR2: u64 = 1_000_000;
pub const SR0: u64 = 10_000;
pub const SR1: u64 = 40_000;
pub const SR2: u64 = 1_000_000;
pub const SR3: u64 = 200_000;

// Ratios, 4 decimals
pub const OPTIMAL_UTILISATION: u64 = 8_000;
pub const OPTIMAL_STABLE_RATIO: u64 = 2_000;
pub const REBALANCE_UP_UTILISATION: u64 = 9_500;
pub const REBALANCE_UP_DEPOSIT_RATE: u64 = 4_000;
pub const REBALANCE_DOWN_DELTA: u64 = 2_000;

pub const RETENTION_RATE: u64 = 100_000;
pub const FLASH_LOAN_FEE: u64 = 1_000;

pub const USDC_COLLATERAL_FACTOR: u64 = 8_000;
pub const EGLD_COLLATERAL_FACTOR: u64 = 7_500;
pub const BORROW_FACTOR: u64 = 10_000;
pub const LIQUIDATION_BONUS: u64 = 500;
pub const LIQUIDATION_FEE: u64 = 1_000;
