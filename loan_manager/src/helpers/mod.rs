use common_constants::WAD_PRECISION;
use common_math::Rounding;
use common_structs::PriceFeed;

multiversx_sc::imports!();

/// # Loan Manager Math Helpers
///
/// Dollar conversions, f-token conversions and the liquidation solver. Every
/// function is pure so it can be exercised without a deployed contract.
///
/// ## Precision
/// - Amounts and f-token amounts: asset decimals of their pool.
/// - Prices, dollar values, indices: WAD (10^18).
/// - Factors, bonus, fee and target health: BPS (10^4).
///
/// ## Liquidation Model
/// Repaying a dollar value `V` of debt lowers the effective borrow value by
/// `V * bf` and, once the bonus is paid out of the collateral, the effective
/// collateral value by `V * cf * (1 + bonus)`. The value that restores the
/// target health `th` is
///
/// `V = (th * B - C) / (th * bf - cf * (1 + bonus))`
///
/// and no finite `V` exists when the denominator is not positive.
#[multiversx_sc::module]
pub trait MathsModule: common_math::SharedMathModule {
    /// Dollar value of `amount`, WAD precision.
    fn get_token_value(
        &self,
        amount: &ManagedDecimal<Self::Api, NumDecimals>,
        feed: &PriceFeed<Self::Api>,
        rounding: Rounding,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        self.mul_round(amount, &feed.price, WAD_PRECISION, rounding)
    }

    /// Token amount worth `value` dollars, at the asset decimals of the feed.
    fn get_token_amount(
        &self,
        value: &ManagedDecimal<Self::Api, NumDecimals>,
        feed: &PriceFeed<Self::Api>,
        rounding: Rounding,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        self.div_round(value, &feed.price, feed.decimals, rounding)
    }

    /// Underlying claimed by `f_amount` f-tokens, rounded down.
    fn to_underlying_amount(
        &self,
        f_amount: &ManagedDecimal<Self::Api, NumDecimals>,
        deposit_interest_index: &ManagedDecimal<Self::Api, NumDecimals>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        self.mul_floor(f_amount, deposit_interest_index, f_amount.scale())
    }

    /// f-tokens matching `amount` underlying. Minting rounds down, burning for
    /// an exact underlying amount rounds up.
    fn to_f_amount(
        &self,
        amount: &ManagedDecimal<Self::Api, NumDecimals>,
        deposit_interest_index: &ManagedDecimal<Self::Api, NumDecimals>,
        rounding: Rounding,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        self.div_round(amount, deposit_interest_index, amount.scale(), rounding)
    }

    /// `value * collateral_factor`, rounded down.
    fn calc_effective_collateral_value(
        &self,
        value: &ManagedDecimal<Self::Api, NumDecimals>,
        collateral_factor: &ManagedDecimal<Self::Api, NumDecimals>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        self.mul_floor(value, collateral_factor, WAD_PRECISION)
    }

    /// `value * borrow_factor`, rounded up.
    fn calc_effective_borrow_value(
        &self,
        value: &ManagedDecimal<Self::Api, NumDecimals>,
        borrow_factor: &ManagedDecimal<Self::Api, NumDecimals>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        self.mul_ceil(value, borrow_factor, WAD_PRECISION)
    }

    /// Largest debt value a liquidator may repay before the violator is back
    /// at the target health.
    ///
    /// # Arguments
    /// - `loan_target_health`: BPS.
    /// - `effective_collateral_value`, `effective_borrow_value`: WAD, factor weighted.
    /// - `collateral_factor`, `borrow_factor`, `liquidation_bonus`: BPS.
    ///
    /// # Returns
    /// - `None` when the denominator is not positive: repaying never restores
    ///   the target health, so the repay is bounded only by the other limits.
    fn calc_max_repay_borrow_value(
        &self,
        loan_target_health: &ManagedDecimal<Self::Api, NumDecimals>,
        effective_collateral_value: &ManagedDecimal<Self::Api, NumDecimals>,
        effective_borrow_value: &ManagedDecimal<Self::Api, NumDecimals>,
        collateral_factor: &ManagedDecimal<Self::Api, NumDecimals>,
        borrow_factor: &ManagedDecimal<Self::Api, NumDecimals>,
        liquidation_bonus: &ManagedDecimal<Self::Api, NumDecimals>,
    ) -> Option<ManagedDecimal<Self::Api, NumDecimals>> {
        let target_borrow = self.mul_floor(loan_target_health, effective_borrow_value, WAD_PRECISION);
        let numerator = self.sub_or_zero(&target_borrow, effective_collateral_value);

        let weighted_borrow = self.mul_floor(loan_target_health, borrow_factor, WAD_PRECISION);
        let bonus_multiplier = self.bps() + liquidation_bonus.clone();
        let weighted_collateral = self.mul_ceil(collateral_factor, &bonus_multiplier, WAD_PRECISION);

        if weighted_borrow <= weighted_collateral {
            return None;
        }

        let denominator = weighted_borrow - weighted_collateral;
        Some(self.div_floor(&numerator, &denominator, WAD_PRECISION))
    }

    /// Collateral underlying paid out for repaying `repay_amount` of the borrow
    /// asset, bonus included, rounded down.
    fn calc_seize_collateral_amount(
        &self,
        repay_amount: &ManagedDecimal<Self::Api, NumDecimals>,
        borrow_feed: &PriceFeed<Self::Api>,
        collateral_feed: &PriceFeed<Self::Api>,
        liquidation_bonus: &ManagedDecimal<Self::Api, NumDecimals>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let repay_value = self.get_token_value(repay_amount, borrow_feed, Rounding::Floor);
        let bonus_multiplier = self.bps() + liquidation_bonus.clone();
        let seize_value = self.mul_floor(&repay_value, &bonus_multiplier, WAD_PRECISION);

        self.get_token_amount(&seize_value, collateral_feed, Rounding::Floor)
    }

    /// Inverse of `calc_seize_collateral_amount`, used once the seize is
    /// clamped to what the violator holds. Rounded up so the liquidator never
    /// pays less than the collateral it receives is worth.
    fn calc_repay_amount_from_seize(
        &self,
        seize_amount: &ManagedDecimal<Self::Api, NumDecimals>,
        borrow_feed: &PriceFeed<Self::Api>,
        collateral_feed: &PriceFeed<Self::Api>,
        liquidation_bonus: &ManagedDecimal<Self::Api, NumDecimals>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let seize_value = self.get_token_value(seize_amount, collateral_feed, Rounding::Floor);
        let bonus_multiplier = self.bps() + liquidation_bonus.clone();
        let repay_value = self.div_floor(&seize_value, &bonus_multiplier, WAD_PRECISION);

        self.get_token_amount(&repay_value, borrow_feed, Rounding::Ceil)
    }

    /// Protocol share of a seize: the bonus portion times the liquidation fee,
    /// `seize * bonus * fee / (1 + bonus)`, rounded down.
    fn calc_liquidation_reserve(
        &self,
        seize_f_amount: &ManagedDecimal<Self::Api, NumDecimals>,
        liquidation_bonus: &ManagedDecimal<Self::Api, NumDecimals>,
        liquidation_fee: &ManagedDecimal<Self::Api, NumDecimals>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let bonus_fee = self.mul_floor(liquidation_bonus, liquidation_fee, WAD_PRECISION);
        let bonus_multiplier = (self.bps() + liquidation_bonus.clone()).rescale(WAD_PRECISION);

        self.mul_div_floor(
            seize_f_amount,
            &bonus_fee,
            &bonus_multiplier,
            seize_f_amount.scale(),
        )
    }
}
