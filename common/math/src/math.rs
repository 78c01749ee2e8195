#![no_std]

use common_constants::{BPS, BPS_PRECISION, SIX_DP, SIX_DP_PRECISION, WAD, WAD_PRECISION};

multiversx_sc::imports!();

/// Direction applied when a fixed-point result does not fit the target precision.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Rounding {
    Floor,
    Ceil,
}

#[multiversx_sc::module]
pub trait SharedMathModule {
    /// Divides two raw integers with the requested rounding.
    fn div_raw(
        &self,
        numerator: BigUint,
        denominator: &BigUint,
        rounding: Rounding,
    ) -> BigUint {
        match rounding {
            Rounding::Floor => numerator / denominator,
            Rounding::Ceil => {
                let quotient = &numerator / denominator;
                if &quotient * denominator == numerator {
                    quotient
                } else {
                    quotient + BigUint::from(1u64)
                }
            },
        }
    }

    /// `a * b` expressed at `precision`, rounded once.
    fn mul_round(
        &self,
        a: &ManagedDecimal<Self::Api, NumDecimals>,
        b: &ManagedDecimal<Self::Api, NumDecimals>,
        precision: NumDecimals,
        rounding: Rounding,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let numerator = a.into_raw_units() * b.into_raw_units() * self.pow10(precision);
        let denominator = self.pow10(a.scale() + b.scale());

        self.to_decimal(self.div_raw(numerator, &denominator, rounding), precision)
    }

    /// `a / b` expressed at `precision`, rounded once.
    fn div_round(
        &self,
        a: &ManagedDecimal<Self::Api, NumDecimals>,
        b: &ManagedDecimal<Self::Api, NumDecimals>,
        precision: NumDecimals,
        rounding: Rounding,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let numerator = a.into_raw_units() * &self.pow10(b.scale() + precision);
        let denominator = b.into_raw_units() * &self.pow10(a.scale());

        self.to_decimal(self.div_raw(numerator, &denominator, rounding), precision)
    }

    /// `a * b / c` expressed at `precision`, with a single rounding step.
    fn mul_div_round(
        &self,
        a: &ManagedDecimal<Self::Api, NumDecimals>,
        b: &ManagedDecimal<Self::Api, NumDecimals>,
        c: &ManagedDecimal<Self::Api, NumDecimals>,
        precision: NumDecimals,
        rounding: Rounding,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let numerator = a.into_raw_units()
            * b.into_raw_units()
            * self.pow10(c.scale() + precision);
        let denominator = c.into_raw_units() * &self.pow10(a.scale() + b.scale());

        self.to_decimal(self.div_raw(numerator, &denominator, rounding), precision)
    }

    fn mul_floor(
        &self,
        a: &ManagedDecimal<Self::Api, NumDecimals>,
        b: &ManagedDecimal<Self::Api, NumDecimals>,
        precision: NumDecimals,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        self.mul_round(a, b, precision, Rounding::Floor)
    }

    fn mul_ceil(
        &self,
        a: &ManagedDecimal<Self::Api, NumDecimals>,
        b: &ManagedDecimal<Self::Api, NumDecimals>,
        precision: NumDecimals,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        self.mul_round(a, b, precision, Rounding::Ceil)
    }

    fn div_floor(
        &self,
        a: &ManagedDecimal<Self::Api, NumDecimals>,
        b: &ManagedDecimal<Self::Api, NumDecimals>,
        precision: NumDecimals,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        self.div_round(a, b, precision, Rounding::Floor)
    }

    fn div_ceil(
        &self,
        a: &ManagedDecimal<Self::Api, NumDecimals>,
        b: &ManagedDecimal<Self::Api, NumDecimals>,
        precision: NumDecimals,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        self.div_round(a, b, precision, Rounding::Ceil)
    }

    fn mul_div_floor(
        &self,
        a: &ManagedDecimal<Self::Api, NumDecimals>,
        b: &ManagedDecimal<Self::Api, NumDecimals>,
        c: &ManagedDecimal<Self::Api, NumDecimals>,
        precision: NumDecimals,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        self.mul_div_round(a, b, c, precision, Rounding::Floor)
    }

    fn mul_div_ceil(
        &self,
        a: &ManagedDecimal<Self::Api, NumDecimals>,
        b: &ManagedDecimal<Self::Api, NumDecimals>,
        c: &ManagedDecimal<Self::Api, NumDecimals>,
        precision: NumDecimals,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        self.mul_div_round(a, b, c, precision, Rounding::Ceil)
    }

    /// Exponentiation by squaring at `base`'s precision. Every intermediate
    /// product is rounded up, so the result never understates `base^exponent`.
    fn pow_ceil(
        &self,
        base: &ManagedDecimal<Self::Api, NumDecimals>,
        exponent: u64,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let precision = base.scale();
        let mut result = self.to_decimal(self.pow10(precision), precision);
        let mut factor = base.clone();
        let mut remaining = exponent;

        while remaining > 0 {
            if remaining & 1 == 1 {
                result = self.mul_ceil(&result, &factor, precision);
            }
            remaining >>= 1;
            if remaining > 0 {
                factor = self.mul_ceil(&factor, &factor, precision);
            }
        }

        result
    }

    /// `a - b`, clamped at zero.
    fn sub_or_zero(
        &self,
        a: &ManagedDecimal<Self::Api, NumDecimals>,
        b: &ManagedDecimal<Self::Api, NumDecimals>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        if a > b {
            a.clone() - b.clone()
        } else {
            self.to_decimal(BigUint::zero(), a.scale())
        }
    }

    fn pow10(&self, exponent: NumDecimals) -> BigUint {
        BigUint::from(10u64).pow(exponent as u32)
    }

    fn to_decimal_wad(&self, value: BigUint) -> ManagedDecimal<Self::Api, NumDecimals> {
        self.to_decimal(value, WAD_PRECISION)
    }

    fn to_decimal_bps(&self, value: BigUint) -> ManagedDecimal<Self::Api, NumDecimals> {
        self.to_decimal(value, BPS_PRECISION)
    }

    fn to_decimal_six_dp(&self, value: BigUint) -> ManagedDecimal<Self::Api, NumDecimals> {
        self.to_decimal(value, SIX_DP_PRECISION)
    }

    fn wad_zero(&self) -> ManagedDecimal<Self::Api, NumDecimals> {
        self.to_decimal_wad(BigUint::zero())
    }

    fn zero_at(&self, precision: NumDecimals) -> ManagedDecimal<Self::Api, NumDecimals> {
        self.to_decimal(BigUint::zero(), precision)
    }

    fn wad(&self) -> ManagedDecimal<Self::Api, NumDecimals> {
        self.to_decimal(BigUint::from(WAD), WAD_PRECISION)
    }

    fn bps(&self) -> ManagedDecimal<Self::Api, NumDecimals> {
        self.to_decimal(BigUint::from(BPS), BPS_PRECISION)
    }

    fn six_dp(&self) -> ManagedDecimal<Self::Api, NumDecimals> {
        self.to_decimal(BigUint::from(SIX_DP), SIX_DP_PRECISION)
    }

    fn to_decimal(
        &self,
        value: BigUint,
        precision: NumDecimals,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        ManagedDecimal::from_raw_units(value, precision)
    }

    fn get_min(
        &self,
        a: ManagedDecimal<Self::Api, NumDecimals>,
        b: ManagedDecimal<Self::Api, NumDecimals>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        if a < b {
            a
        } else {
            b
        }
    }
}
