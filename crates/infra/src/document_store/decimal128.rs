//! IEEE 754-2008 decimal128 (BID encoding), the store's native decimal type.
//!
//! Prices are persisted in this fixed-point representation rather than as
//! binary floats. Encoding from `rust_decimal::Decimal` is exact; decoding is
//! the explicit step that turns stored bytes back into a `Decimal` and fails
//! for values `Decimal` cannot hold.
//!
//! Layout (little-endian, low 64 bits first):
//! `sign (1) | biased exponent (14) | coefficient (113)`, with the
//! large-coefficient form and NaN/Infinity signalled by the combination bits.

use std::cmp::Ordering;

use rust_decimal::Decimal;
use thiserror::Error;

const EXPONENT_BIAS: i32 = 6176;
/// 10^34 - 1: largest canonical decimal128 coefficient.
const MAX_COEFFICIENT: u128 = 9_999_999_999_999_999_999_999_999_999_999_999;
const MAX_DECIMAL_SCALE: i32 = 28;

const COEFFICIENT_HIGH_MASK: u64 = (1 << 49) - 1;
const EXPONENT_MASK: u64 = 0x3fff;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Decimal128Error {
    #[error("decimal128 value is NaN")]
    NaN,

    #[error("decimal128 value is infinite")]
    Infinite,

    #[error("decimal128 value is out of range for a 96-bit decimal")]
    OutOfRange,
}

/// A decimal128 value as stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decimal128([u8; 16]);

impl Decimal128 {
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    pub fn bytes(&self) -> [u8; 16] {
        self.0
    }

    /// Exact encoding of a `Decimal` (coefficient and scale are preserved).
    pub fn from_decimal(value: &Decimal) -> Self {
        let coefficient = value.mantissa().unsigned_abs();
        let exponent = -(value.scale() as i32);
        Self::from_parts(value.is_sign_negative(), exponent, coefficient)
    }

    /// Decode into a `Decimal`.
    ///
    /// Positive exponents are expanded into the coefficient, and trailing zeros
    /// past `Decimal`'s 28-digit scale are trimmed when that loses nothing.
    pub fn to_decimal(&self) -> Result<Decimal, Decimal128Error> {
        let (negative, mut exponent, mut coefficient) = self.parts()?;

        if coefficient == 0 {
            let scale = (-exponent).clamp(0, MAX_DECIMAL_SCALE) as u32;
            let mut zero = Decimal::try_from_i128_with_scale(0, scale)
                .map_err(|_| Decimal128Error::OutOfRange)?;
            zero.set_sign_negative(negative);
            return Ok(zero);
        }

        while exponent < -MAX_DECIMAL_SCALE && coefficient % 10 == 0 {
            coefficient /= 10;
            exponent += 1;
        }
        if exponent < -MAX_DECIMAL_SCALE {
            return Err(Decimal128Error::OutOfRange);
        }
        while exponent > 0 {
            coefficient = coefficient
                .checked_mul(10)
                .ok_or(Decimal128Error::OutOfRange)?;
            exponent -= 1;
        }

        let mantissa = i128::try_from(coefficient).map_err(|_| Decimal128Error::OutOfRange)?;
        let mut value = Decimal::try_from_i128_with_scale(mantissa, (-exponent) as u32)
            .map_err(|_| Decimal128Error::OutOfRange)?;
        value.set_sign_negative(negative);
        Ok(value)
    }

    /// Numeric comparison; `None` when either side does not decode.
    pub fn compare(&self, other: &Decimal128) -> Option<Ordering> {
        Some(self.to_decimal().ok()?.cmp(&other.to_decimal().ok()?))
    }

    fn from_parts(negative: bool, exponent: i32, coefficient: u128) -> Self {
        let biased = (exponent + EXPONENT_BIAS) as u64;
        let high = ((negative as u64) << 63)
            | ((biased & EXPONENT_MASK) << 49)
            | ((coefficient >> 64) as u64 & COEFFICIENT_HIGH_MASK);
        let low = coefficient as u64;

        let mut bytes = [0u8; 16];
        bytes[..8].copy_from_slice(&low.to_le_bytes());
        bytes[8..].copy_from_slice(&high.to_le_bytes());
        Self(bytes)
    }

    fn parts(&self) -> Result<(bool, i32, u128), Decimal128Error> {
        let mut low = [0u8; 8];
        let mut high = [0u8; 8];
        low.copy_from_slice(&self.0[..8]);
        high.copy_from_slice(&self.0[8..]);
        let low = u64::from_le_bytes(low);
        let high = u64::from_le_bytes(high);

        let negative = high >> 63 == 1;
        match (high >> 58) & 0x1f {
            0x1f => return Err(Decimal128Error::NaN),
            0x1e => return Err(Decimal128Error::Infinite),
            _ => {}
        }

        // Large-coefficient form: the implied coefficient always exceeds
        // MAX_COEFFICIENT, which the standard reads as zero.
        if (high >> 61) & 0b11 == 0b11 {
            let exponent = ((high >> 47) & EXPONENT_MASK) as i32 - EXPONENT_BIAS;
            return Ok((negative, exponent, 0));
        }

        let exponent = ((high >> 49) & EXPONENT_MASK) as i32 - EXPONENT_BIAS;
        let coefficient = (((high & COEFFICIENT_HIGH_MASK) as u128) << 64) | low as u128;
        let coefficient = if coefficient > MAX_COEFFICIENT { 0 } else { coefficient };

        Ok((negative, exponent, coefficient))
    }
}
