//! Decimal column rules and price derivation.
//!
//! Amounts are `Decimal` in the API and integer hundredths ("minor units") in
//! storage, so range filters compare exactly.

use crate::model::validation::{ValidationError, ValidationResult};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

const MINOR_UNIT_SCALE: u32 = 2;

/// Precision limits of one decimal column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalSpec {
    pub max_digits: u32,
    pub decimal_places: u32,
    pub allow_negative: bool,
}

impl DecimalSpec {
    const fn unsigned(max_digits: u32) -> Self {
        Self {
            max_digits,
            decimal_places: MINOR_UNIT_SCALE,
            allow_negative: false,
        }
    }
}

pub const PRICE_PER_GRAM: DecimalSpec = DecimalSpec::unsigned(10);
pub const WEIGHT_GRAMS: DecimalSpec = DecimalSpec::unsigned(8);
pub const PRODUCT_PRICE: DecimalSpec = DecimalSpec::unsigned(12);
pub const PRICE_MODIFIER: DecimalSpec = DecimalSpec {
    max_digits: 10,
    decimal_places: MINOR_UNIT_SCALE,
    allow_negative: true,
};

/// The price a customer pays: the discount when one is set, else the base.
///
/// A zero discount counts as a discount. No ordering between the two is
/// assumed.
pub fn current_price(base_price: Decimal, discount_price: Option<Decimal>) -> Decimal {
    discount_price.unwrap_or(base_price)
}

/// Validates `value` against `spec` and converts it to minor units.
pub fn to_minor_units(
    field: &'static str,
    spec: DecimalSpec,
    value: Decimal,
) -> ValidationResult<i64> {
    if value.is_sign_negative() && !value.is_zero() && !spec.allow_negative {
        return Err(ValidationError::Negative { field });
    }

    let invalid = || ValidationError::InvalidDecimal {
        field,
        max_digits: spec.max_digits,
        decimal_places: spec.decimal_places,
    };

    let normalized = value.normalize();
    if normalized.scale() > spec.decimal_places {
        return Err(invalid());
    }

    let integer_digits = spec.max_digits - spec.decimal_places;
    let bound = Decimal::from(10_i64.pow(integer_digits));
    if normalized.abs() >= bound {
        return Err(invalid());
    }

    (normalized * Decimal::ONE_HUNDRED)
        .trunc()
        .to_i64()
        .ok_or_else(invalid)
}

/// A range-filter bound in minor units, clamped to what a column can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeBound {
    /// Every stored value satisfies the bound.
    Unbounded,
    At(i64),
    /// No stored value can satisfy the bound.
    Unsatisfiable,
}

impl RangeBound {
    /// `None` when nothing can match, otherwise the optional SQL bound.
    pub fn minor_units(self) -> Option<Option<i64>> {
        match self {
            Self::Unbounded => Some(None),
            Self::At(minor) => Some(Some(minor)),
            Self::Unsatisfiable => None,
        }
    }
}

/// Converts an inclusive lower bound (`gte`), rounding up to whole minor units.
pub fn lower_bound(spec: DecimalSpec, value: Decimal) -> RangeBound {
    let (min, max) = minor_unit_range(spec);
    if value > from_minor_units(max) {
        return RangeBound::Unsatisfiable;
    }
    if value <= from_minor_units(min) {
        return RangeBound::Unbounded;
    }
    scaled(value, Decimal::ceil).map_or(RangeBound::Unsatisfiable, RangeBound::At)
}

/// Converts an inclusive upper bound (`lte`), rounding down to whole minor units.
pub fn upper_bound(spec: DecimalSpec, value: Decimal) -> RangeBound {
    let (min, max) = minor_unit_range(spec);
    if value < from_minor_units(min) {
        return RangeBound::Unsatisfiable;
    }
    if value >= from_minor_units(max) {
        return RangeBound::Unbounded;
    }
    scaled(value, Decimal::floor).map_or(RangeBound::Unbounded, RangeBound::At)
}

fn minor_unit_range(spec: DecimalSpec) -> (i64, i64) {
    let max = 10_i64.pow(spec.max_digits) - 1;
    let min = if spec.allow_negative { -max } else { 0 };
    (min, max)
}

fn scaled(value: Decimal, round: fn(&Decimal) -> Decimal) -> Option<i64> {
    value
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|minor| round(&minor))
        .and_then(|minor| minor.to_i64())
}

/// Converts stored minor units back to a two-place decimal.
pub fn from_minor_units(minor: i64) -> Decimal {
    Decimal::new(minor, MINOR_UNIT_SCALE)
}
