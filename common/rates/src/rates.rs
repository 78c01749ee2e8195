#![no_std]

use common_constants::{SECONDS_PER_YEAR, SIX_DP_PRECISION, WAD_PRECISION};
use common_math::Rounding;
use common_structs::InterestRateParams;

multiversx_sc::imports!();

/// Double the rate precision, wide enough to hold `amount * rate` exactly.
const PRODUCT_PRECISION: usize = 2 * WAD_PRECISION;

/// The InterestRates module holds the pure interest model of a pool:
/// utilisation, the kinked variable and stable curves, deposit yield, index
/// growth and per-position balance rebasing.
///
/// **Scope**: every function is side effect free and works on 18 decimal rates
/// and indices, 6 decimal curve parameters and 4 decimal ratios.
///
/// **Goal**: keep the ledger at least as solvent as it reports. Debt growth and
/// debt valuation round up, deposit growth and share minting round down.
#[multiversx_sc::module]
pub trait InterestRates: common_math::SharedMathModule {
    /// `total_debt / total_deposits`, zero for an empty pool.
    fn calc_utilisation_ratio(
        &self,
        total_debt: &ManagedDecimal<Self::Api, NumDecimals>,
        total_deposits: &ManagedDecimal<Self::Api, NumDecimals>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        if total_deposits.into_raw_units() == &BigUint::zero() {
            return self.wad_zero();
        }

        self.div_floor(total_debt, total_deposits, WAD_PRECISION)
    }

    /// Fraction of the pool debt that is stable, zero without debt.
    fn calc_stable_debt_to_total_debt_ratio(
        &self,
        stable_borrow_total: &ManagedDecimal<Self::Api, NumDecimals>,
        total_debt: &ManagedDecimal<Self::Api, NumDecimals>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        if total_debt.into_raw_units() == &BigUint::zero() {
            return self.wad_zero();
        }

        self.div_floor(stable_borrow_total, total_debt, WAD_PRECISION)
    }

    /// Shared kink of both curves.
    ///
    /// **Formula**:
    /// - `u < optimal`: `slope1 * u / optimal`
    /// - `u >= optimal`: `slope1 + slope2 * (u - optimal) / (1 - optimal)`
    fn calc_kinked_slope(
        &self,
        ratio: &ManagedDecimal<Self::Api, NumDecimals>,
        optimal: &ManagedDecimal<Self::Api, NumDecimals>,
        slope1: &ManagedDecimal<Self::Api, NumDecimals>,
        slope2: &ManagedDecimal<Self::Api, NumDecimals>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let optimal = optimal.rescale(WAD_PRECISION);
        let slope1 = slope1.rescale(WAD_PRECISION);
        let slope2 = slope2.rescale(WAD_PRECISION);

        if ratio < &optimal {
            return self.mul_div_floor(&slope1, ratio, &optimal, WAD_PRECISION);
        }

        let excess = ratio.clone() - optimal.clone();
        let remaining = self.wad() - optimal;
        slope1 + self.mul_div_floor(&slope2, &excess, &remaining, WAD_PRECISION)
    }

    /// Variable borrow rate: `vr0 + kink(u, vr1, vr2)`.
    ///
    /// # Arguments
    /// - `params`: curve of the pool.
    /// - `utilisation`: 18 decimals.
    ///
    /// # Returns
    /// - Annual variable rate, 18 decimals.
    fn calc_variable_borrow_interest_rate(
        &self,
        params: &InterestRateParams<Self::Api>,
        utilisation: &ManagedDecimal<Self::Api, NumDecimals>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let slope = self.calc_kinked_slope(
            utilisation,
            &params.optimal_utilisation_ratio,
            &params.vr1,
            &params.vr2,
        );

        params.vr0.rescale(WAD_PRECISION) + slope
    }

    /// Stable borrow rate offered to new stable borrows.
    ///
    /// **Formula**: `vr1 + sr0 + kink(u, sr1, sr2) + premium`, where the premium is
    /// `sr3 * (s - s_opt) / (1 - s_opt)` once the stable share `s` of the debt
    /// exceeds its optimum, zero otherwise.
    fn calc_stable_borrow_interest_rate(
        &self,
        params: &InterestRateParams<Self::Api>,
        utilisation: &ManagedDecimal<Self::Api, NumDecimals>,
        stable_to_total_debt_ratio: &ManagedDecimal<Self::Api, NumDecimals>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let slope = self.calc_kinked_slope(
            utilisation,
            &params.optimal_utilisation_ratio,
            &params.sr1,
            &params.sr2,
        );

        let optimal_stable = params.optimal_stable_to_total_debt_ratio.rescale(WAD_PRECISION);
        let premium = if stable_to_total_debt_ratio > &optimal_stable {
            let excess = stable_to_total_debt_ratio.clone() - optimal_stable.clone();
            let remaining = self.wad() - optimal_stable;
            self.mul_div_floor(
                &params.sr3.rescale(WAD_PRECISION),
                &excess,
                &remaining,
                WAD_PRECISION,
            )
        } else {
            self.wad_zero()
        };

        params.vr1.rescale(WAD_PRECISION) + params.sr0.rescale(WAD_PRECISION) + slope + premium
    }

    /// Debt weighted average of the variable rate and the pool average stable rate.
    fn calc_overall_borrow_interest_rate(
        &self,
        variable_borrow_total: &ManagedDecimal<Self::Api, NumDecimals>,
        stable_borrow_total: &ManagedDecimal<Self::Api, NumDecimals>,
        variable_borrow_interest_rate: &ManagedDecimal<Self::Api, NumDecimals>,
        stable_borrow_average_rate: &ManagedDecimal<Self::Api, NumDecimals>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let total_debt = variable_borrow_total.clone() + stable_borrow_total.clone();
        if total_debt.into_raw_units() == &BigUint::zero() {
            return self.wad_zero();
        }

        let weighted = self.mul_floor(
            variable_borrow_total,
            variable_borrow_interest_rate,
            PRODUCT_PRECISION,
        ) + self.mul_floor(stable_borrow_total, stable_borrow_average_rate, PRODUCT_PRECISION);

        self.div_floor(&weighted, &total_debt, WAD_PRECISION)
    }

    /// `u * overall * (1 - retention)`; retention is a 6 decimal fraction.
    fn calc_deposit_interest_rate(
        &self,
        utilisation: &ManagedDecimal<Self::Api, NumDecimals>,
        overall_borrow_interest_rate: &ManagedDecimal<Self::Api, NumDecimals>,
        retention_rate: &ManagedDecimal<Self::Api, NumDecimals>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let gross = self.mul_floor(utilisation, overall_borrow_interest_rate, WAD_PRECISION);
        let kept = self.six_dp() - retention_rate.rescale(SIX_DP_PRECISION);

        self.mul_floor(&gross, &kept, WAD_PRECISION)
    }

    /// Annual rate converted to its per-second counterpart, rounded up.
    fn calc_per_second_rate(
        &self,
        annual_rate: &ManagedDecimal<Self::Api, NumDecimals>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        self.div_ceil(
            annual_rate,
            &self.to_decimal(BigUint::from(SECONDS_PER_YEAR), 0),
            WAD_PRECISION,
        )
    }

    /// Compounds the variable borrow index over `elapsed` seconds.
    ///
    /// **Formula**: `index * (1 + rate / SECONDS_PER_YEAR) ^ elapsed`, evaluated by
    /// repeated squaring with every step rounded up.
    fn calc_borrow_interest_index(
        &self,
        rate: &ManagedDecimal<Self::Api, NumDecimals>,
        index: &ManagedDecimal<Self::Api, NumDecimals>,
        elapsed: u64,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        if elapsed == 0 {
            return index.clone();
        }

        let per_second = self.wad() + self.calc_per_second_rate(rate);
        let growth = self.pow_ceil(&per_second, elapsed);

        self.mul_ceil(index, &growth, WAD_PRECISION)
    }

    /// Grows the deposit index linearly: `index * (1 + rate * elapsed / SECONDS_PER_YEAR)`.
    fn calc_deposit_interest_index(
        &self,
        rate: &ManagedDecimal<Self::Api, NumDecimals>,
        index: &ManagedDecimal<Self::Api, NumDecimals>,
        elapsed: u64,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        if elapsed == 0 {
            return index.clone();
        }

        let accrued = self.mul_div_floor(
            rate,
            &self.to_decimal(BigUint::from(elapsed), 0),
            &self.to_decimal(BigUint::from(SECONDS_PER_YEAR), 0),
            WAD_PRECISION,
        );

        self.mul_floor(index, &(self.wad() + accrued), WAD_PRECISION)
    }

    /// Rebases a variable borrow balance: `ceil(balance * new_index / old_index)`.
    fn calc_borrow_balance(
        &self,
        balance: &ManagedDecimal<Self::Api, NumDecimals>,
        new_index: &ManagedDecimal<Self::Api, NumDecimals>,
        old_index: &ManagedDecimal<Self::Api, NumDecimals>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        self.mul_div_ceil(balance, new_index, old_index, balance.scale())
    }

    /// Compounds a stable borrow on its own clock with its locked rate.
    fn calc_stable_borrow_balance(
        &self,
        balance: &ManagedDecimal<Self::Api, NumDecimals>,
        stable_rate: &ManagedDecimal<Self::Api, NumDecimals>,
        elapsed: u64,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        if elapsed == 0 {
            return balance.clone();
        }

        let per_second = self.wad() + self.calc_per_second_rate(stable_rate);
        let growth = self.pow_ceil(&per_second, elapsed);

        self.mul_ceil(balance, &growth, balance.scale())
    }

    /// `(w1 * r1 + w2 * r2) / (w1 + w2)`, zero when both weights are zero.
    fn calc_weighted_rate(
        &self,
        weight_a: &ManagedDecimal<Self::Api, NumDecimals>,
        rate_a: &ManagedDecimal<Self::Api, NumDecimals>,
        weight_b: &ManagedDecimal<Self::Api, NumDecimals>,
        rate_b: &ManagedDecimal<Self::Api, NumDecimals>,
        rounding: Rounding,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let total_weight = weight_a.clone() + weight_b.clone();
        if total_weight.into_raw_units() == &BigUint::zero() {
            return self.wad_zero();
        }

        let weighted = self.mul_floor(weight_a, rate_a, PRODUCT_PRECISION)
            + self.mul_floor(weight_b, rate_b, PRODUCT_PRECISION);

        self.div_round(&weighted, &total_weight, WAD_PRECISION, rounding)
    }

    /// Pool average stable rate after `amount` is borrowed at `rate`.
    fn calc_increasing_average_stable_rate(
        &self,
        stable_borrow_total: &ManagedDecimal<Self::Api, NumDecimals>,
        average_rate: &ManagedDecimal<Self::Api, NumDecimals>,
        amount: &ManagedDecimal<Self::Api, NumDecimals>,
        rate: &ManagedDecimal<Self::Api, NumDecimals>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        self.calc_weighted_rate(stable_borrow_total, average_rate, amount, rate, Rounding::Floor)
    }

    /// Pool average stable rate after `amount` borrowed at `rate` leaves the pool.
    /// Zero once no stable debt remains, never negative.
    fn calc_decreasing_average_stable_rate(
        &self,
        stable_borrow_total: &ManagedDecimal<Self::Api, NumDecimals>,
        average_rate: &ManagedDecimal<Self::Api, NumDecimals>,
        amount: &ManagedDecimal<Self::Api, NumDecimals>,
        rate: &ManagedDecimal<Self::Api, NumDecimals>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        if stable_borrow_total <= amount {
            return self.wad_zero();
        }

        let remaining = stable_borrow_total.clone() - amount.clone();
        let weighted = self.sub_or_zero(
            &self.mul_floor(stable_borrow_total, average_rate, PRODUCT_PRECISION),
            &self.mul_floor(amount, rate, PRODUCT_PRECISION),
        );

        self.div_floor(&weighted, &remaining, WAD_PRECISION)
    }

    /// Rate of a stable entry after absorbing `amount` at `new_rate`, weighted by
    /// balance and rounded up.
    fn calc_stable_interest_rate(
        &self,
        existing_balance: &ManagedDecimal<Self::Api, NumDecimals>,
        existing_rate: &ManagedDecimal<Self::Api, NumDecimals>,
        amount: &ManagedDecimal<Self::Api, NumDecimals>,
        new_rate: &ManagedDecimal<Self::Api, NumDecimals>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        self.calc_weighted_rate(existing_balance, existing_rate, amount, new_rate, Rounding::Ceil)
    }

    /// Utilisation a pool must reach before stable loans may be re-priced upward.
    fn calc_rebalance_up_utilisation_threshold(
        &self,
        params: &InterestRateParams<Self::Api>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        params.rebalance_up_utilisation_ratio.rescale(WAD_PRECISION)
    }

    /// Deposit rate at or below which stable loans may be re-priced upward:
    /// `rebalance_up_deposit_interest_rate * (vr0 + vr1 + vr2)`.
    fn calc_rebalance_up_deposit_rate_threshold(
        &self,
        params: &InterestRateParams<Self::Api>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let max_variable_rate = params.vr0.rescale(WAD_PRECISION)
            + params.vr1.rescale(WAD_PRECISION)
            + params.vr2.rescale(WAD_PRECISION);

        self.mul_floor(
            &params.rebalance_up_deposit_interest_rate,
            &max_variable_rate,
            WAD_PRECISION,
        )
    }

    /// Loan stable rate above which the loan may be re-priced downward:
    /// `stable_rate * (1 + rebalance_down_delta)`.
    fn calc_rebalance_down_rate_threshold(
        &self,
        params: &InterestRateParams<Self::Api>,
        stable_borrow_interest_rate: &ManagedDecimal<Self::Api, NumDecimals>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let factor = self.wad() + params.rebalance_down_delta.rescale(WAD_PRECISION);

        self.mul_floor(stable_borrow_interest_rate, &factor, WAD_PRECISION)
    }

    /// Protocol share of the interest accrued by `total_debt` over `elapsed`
    /// seconds at the overall rate, in asset units.
    fn calc_retained_amount(
        &self,
        total_debt: &ManagedDecimal<Self::Api, NumDecimals>,
        overall_borrow_interest_rate: &ManagedDecimal<Self::Api, NumDecimals>,
        retention_rate: &ManagedDecimal<Self::Api, NumDecimals>,
        elapsed: u64,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let period_rate = self.mul_div_floor(
            overall_borrow_interest_rate,
            &self.to_decimal(BigUint::from(elapsed), 0),
            &self.to_decimal(BigUint::from(SECONDS_PER_YEAR), 0),
            WAD_PRECISION,
        );
        let interest = self.mul_floor(total_debt, &period_rate, total_debt.scale());

        self.mul_floor(&interest, retention_rate, total_debt.scale())
    }

    /// Flash loan fee, `ceil(amount * fee)` with a 6 decimal fee.
    fn calc_flash_loan_fee(
        &self,
        amount: &ManagedDecimal<Self::Api, NumDecimals>,
        flash_loan_fee: &ManagedDecimal<Self::Api, NumDecimals>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        self.mul_ceil(amount, flash_loan_fee, amount.scale())
    }

    /// Growth of a reward index: `speed * elapsed / used`, only while `used`
    /// exceeds `minimum_amount`.
    fn calc_reward_index_delta(
        &self,
        used: &ManagedDecimal<Self::Api, NumDecimals>,
        minimum_amount: &ManagedDecimal<Self::Api, NumDecimals>,
        speed: &ManagedDecimal<Self::Api, NumDecimals>,
        elapsed: u64,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        if elapsed == 0 || used <= minimum_amount || used.into_raw_units() == &BigUint::zero() {
            return self.wad_zero();
        }

        self.mul_div_floor(
            speed,
            &self.to_decimal(BigUint::from(elapsed), 0),
            used,
            WAD_PRECISION,
        )
    }

    /// Reward earned by `amount` between two index readings.
    fn calc_accrued_rewards(
        &self,
        amount: &ManagedDecimal<Self::Api, NumDecimals>,
        reward_index: &ManagedDecimal<Self::Api, NumDecimals>,
        last_reward_index: &ManagedDecimal<Self::Api, NumDecimals>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let delta = self.sub_or_zero(reward_index, last_reward_index);

        self.mul_floor(amount, &delta, WAD_PRECISION)
    }
}
