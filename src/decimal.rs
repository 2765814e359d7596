use core::fmt;
use core::str::FromStr;

use crate::error::BsonError;

/// Largest canonical coefficient: 34 decimal digits.
const MAX_COEFFICIENT: u128 = 9_999_999_999_999_999_999_999_999_999_999_999;

/// Exponent bias; unbiased range is -6176..=6111.
const EXPONENT_BIAS: i32 = 6176;

/// Smallest unbiased exponent.
const EXPONENT_MIN: i32 = -6176;

/// Largest unbiased exponent.
const EXPONENT_MAX: i32 = 6111;

const SIGN_BIT: u64 = 1 << 63;
const SPECIAL_MASK: u64 = 0x7C00_0000_0000_0000;
const INFINITY_BITS: u64 = 0x7800_0000_0000_0000;
const NAN_BITS: u64 = 0x7C00_0000_0000_0000;
/// Bits 62-61 set: the combination form with an implicit coefficient
/// prefix. Any such coefficient exceeds 34 digits and reads as zero.
const COMBINATION_11: u64 = 0x6000_0000_0000_0000;
const COEFF_HIGH_MASK: u64 = 0x0001_FFFF_FFFF_FFFF;

fn pow10_u128(exp: u32) -> Option<u128> {
    let mut out: u128 = 1;
    for _ in 0..exp {
        out = out.checked_mul(10)?;
    }
    Some(out)
}

/// A 128-bit IEEE 754-2008 decimal floating point value in the binary
/// integer (BID) layout, the encoding BSON carries on the wire.
///
/// Equality is bit equality: two members of the same cohort with
/// different exponents compare unequal, matching wire-level identity.
/// This type supports classification, exact conversions, and text
/// formatting; it does not implement decimal arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decimal128 {
    high: u64,
    low: u64,
}

impl Decimal128 {
    /// Positive zero.
    pub const ZERO: Self = Self::pack(false, EXPONENT_BIAS as u32, 0);

    /// Not-a-number.
    pub const NAN: Self = Self {
        high: NAN_BITS,
        low: 0,
    };

    /// Positive infinity.
    pub const INFINITY: Self = Self {
        high: INFINITY_BITS,
        low: 0,
    };

    /// Negative infinity.
    pub const NEG_INFINITY: Self = Self {
        high: SIGN_BIT | INFINITY_BITS,
        low: 0,
    };

    /// Assemble from the two raw 64-bit halves of the wire layout.
    #[must_use]
    pub const fn from_raw(high: u64, low: u64) -> Self {
        Self { high, low }
    }

    /// The high 64 raw bits.
    #[must_use]
    pub const fn high(&self) -> u64 {
        self.high
    }

    /// The low 64 raw bits.
    #[must_use]
    pub const fn low(&self) -> u64 {
        self.low
    }

    /// Encode validated parts. `biased` must be 14 bits and `coefficient`
    /// canonical; both invariants are upheld by the public constructors.
    const fn pack(negative: bool, biased: u32, coefficient: u128) -> Self {
        let sign = if negative { SIGN_BIT } else { 0 };
        Self {
            high: sign | ((biased as u64) << 49) | (coefficient >> 64) as u64,
            low: coefficient as u64,
        }
    }

    /// Construct from sign, unbiased exponent, and coefficient.
    ///
    /// # Errors
    ///
    /// Returns [`BsonError::Decode`] when the coefficient exceeds 34
    /// digits or the exponent is outside -6176..=6111.
    #[allow(clippy::cast_sign_loss)]
    pub fn from_parts(
        negative: bool,
        exponent: i32,
        coefficient: u128,
    ) -> Result<Self, BsonError> {
        if coefficient > MAX_COEFFICIENT {
            return Err(BsonError::decode(
                "Decimal128 coefficient exceeds 34 digits",
            ));
        }
        if !(EXPONENT_MIN..=EXPONENT_MAX).contains(&exponent) {
            return Err(BsonError::decode(format!(
                "Decimal128 exponent {exponent} out of range"
            )));
        }
        Ok(Self::pack(
            negative,
            (exponent + EXPONENT_BIAS) as u32,
            coefficient,
        ))
    }

    /// Exact conversion from a 32-bit integer.
    #[must_use]
    pub const fn from_i32(value: i32) -> Self {
        Self::from_i64(value as i64)
    }

    /// Exact conversion from a 64-bit integer.
    #[must_use]
    pub const fn from_i64(value: i64) -> Self {
        Self::pack(
            value < 0,
            EXPONENT_BIAS as u32,
            value.unsigned_abs() as u128,
        )
    }

    /// Exact conversion from an unsigned 64-bit integer.
    #[must_use]
    pub const fn from_u64(value: u64) -> Self {
        Self::pack(false, EXPONENT_BIAS as u32, value as u128)
    }

    /// Returns `true` for NaN.
    #[must_use]
    pub const fn is_nan(&self) -> bool {
        self.high & SPECIAL_MASK == NAN_BITS
    }

    /// Returns `true` for positive or negative infinity.
    #[must_use]
    pub const fn is_infinite(&self) -> bool {
        self.high & SPECIAL_MASK == INFINITY_BITS
    }

    /// Returns `true` when the sign bit is set.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.high & SIGN_BIT != 0
    }

    /// Decompose a finite value into (negative, unbiased exponent,
    /// coefficient). `None` for NaN and infinities. Non-canonical
    /// encodings read as a zero coefficient.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn finite_parts(&self) -> Option<(bool, i32, u128)> {
        if self.is_nan() || self.is_infinite() {
            return None;
        }
        let negative = self.is_negative();
        let (biased, coefficient) = if self.high & COMBINATION_11 == COMBINATION_11 {
            // Implicit-prefix form: the coefficient would start at 2^113,
            // which is always past 34 digits.
            (((self.high >> 47) & 0x3FFF) as u32, 0u128)
        } else {
            let coeff =
                (u128::from(self.high & COEFF_HIGH_MASK) << 64) | u128::from(self.low);
            let coeff = if coeff > MAX_COEFFICIENT { 0 } else { coeff };
            (((self.high >> 49) & 0x3FFF) as u32, coeff)
        };
        Some((negative, biased as i32 - EXPONENT_BIAS, coefficient))
    }

    /// Exact conversion to a 64-bit integer.
    ///
    /// # Errors
    ///
    /// Returns [`BsonError::Decode`] when the value is not finite, not
    /// whole, or outside the `i64` range.
    #[allow(clippy::cast_sign_loss)]
    pub fn to_i64(&self) -> Result<i64, BsonError> {
        let (negative, exponent, coefficient) = self
            .finite_parts()
            .ok_or_else(|| BsonError::decode("Decimal128 value is not finite"))?;
        let whole = if exponent >= 0 {
            pow10_u128(exponent as u32)
                .and_then(|p| coefficient.checked_mul(p))
                .ok_or_else(|| BsonError::decode("Decimal128 value out of i64 range"))?
        } else {
            let scale = pow10_u128(exponent.unsigned_abs());
            match scale {
                Some(p) if coefficient % p == 0 => coefficient / p,
                _ if coefficient == 0 => 0,
                _ => {
                    return Err(BsonError::decode("Decimal128 value is not a whole number"))
                }
            }
        };
        let signed = if negative {
            i128::try_from(whole).map(|w| -w)
        } else {
            i128::try_from(whole)
        }
        .map_err(|_| BsonError::decode("Decimal128 value out of i64 range"))?;
        i64::try_from(signed).map_err(|_| BsonError::decode("Decimal128 value out of i64 range"))
    }

    /// Exact conversion to a 32-bit integer.
    ///
    /// # Errors
    ///
    /// Returns [`BsonError::Decode`] when the value is not finite, not
    /// whole, or outside the `i32` range.
    pub fn to_i32(&self) -> Result<i32, BsonError> {
        let wide = self.to_i64()?;
        i32::try_from(wide).map_err(|_| BsonError::decode("Decimal128 value out of i32 range"))
    }

    /// Conversion from a binary double via its shortest decimal
    /// representation, so `0.1f64` becomes the decimal `0.1`. NaN,
    /// infinities, and zeros convert directly.
    #[must_use]
    pub fn from_f64(value: f64) -> Self {
        if value.is_nan() {
            return Self::NAN;
        }
        if value.is_infinite() {
            return if value.is_sign_negative() {
                Self::NEG_INFINITY
            } else {
                Self::INFINITY
            };
        }
        if value == 0.0 {
            return Self::pack(value.is_sign_negative(), EXPONENT_BIAS as u32, 0);
        }
        // Shortest decimal form of a finite double: at most 17
        // significant digits, exponent within the decimal128 range.
        format!("{value:e}").parse().unwrap_or(Self::NAN)
    }

    /// Conversion to a binary double, succeeding when the decimal value
    /// survives the round trip through the double's shortest decimal
    /// representation.
    ///
    /// # Errors
    ///
    /// Returns [`BsonError::Decode`] when the value is not representable
    /// as a double.
    pub fn to_f64(&self) -> Result<f64, BsonError> {
        if self.is_nan() {
            return Ok(f64::NAN);
        }
        if self.is_infinite() {
            return Ok(if self.is_negative() {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            });
        }
        let inexact = || BsonError::decode("Decimal128 value is not representable as a double");
        let candidate: f64 = self.to_string().parse().map_err(|_| inexact())?;
        if !candidate.is_finite() {
            return Err(inexact());
        }
        if numerically_equal(*self, Self::from_f64(candidate)) {
            Ok(candidate)
        } else {
            Err(inexact())
        }
    }
}

/// Numeric (cohort-insensitive) equality of two finite decimals.
fn numerically_equal(a: Decimal128, b: Decimal128) -> bool {
    let (Some((neg_a, exp_a, coeff_a)), Some((neg_b, exp_b, coeff_b))) =
        (a.finite_parts(), b.finite_parts())
    else {
        return false;
    };
    if coeff_a == 0 && coeff_b == 0 {
        return true;
    }
    if neg_a != neg_b {
        return false;
    }
    // Scale the higher-exponent coefficient down to the common scale.
    let (low_coeff, high_coeff, shift) = if exp_a >= exp_b {
        (coeff_b, coeff_a, exp_a - exp_b)
    } else {
        (coeff_a, coeff_b, exp_b - exp_a)
    };
    pow10_u128(shift.unsigned_abs())
        .and_then(|p| high_coeff.checked_mul(p))
        .is_some_and(|scaled| scaled == low_coeff)
}

/// IEEE 754-2008 decimal toString: plain notation when the exponent is
/// at most zero and the adjusted exponent at least -6, scientific
/// notation otherwise.
impl fmt::Display for Decimal128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nan() {
            return f.write_str("NaN");
        }
        if self.is_infinite() {
            return f.write_str(if self.is_negative() {
                "-Infinity"
            } else {
                "Infinity"
            });
        }
        let Some((negative, exponent, coefficient)) = self.finite_parts() else {
            return f.write_str("NaN");
        };
        if negative {
            f.write_str("-")?;
        }
        let digits = coefficient.to_string();
        #[allow(clippy::cast_possible_wrap)]
        let adjusted = exponent + digits.len() as i32 - 1;
        if exponent <= 0 && adjusted >= -6 {
            if exponent == 0 {
                return f.write_str(&digits);
            }
            #[allow(clippy::cast_possible_wrap)]
            let point = digits.len() as i32 + exponent;
            if point <= 0 {
                f.write_str("0.")?;
                for _ in 0..-point {
                    f.write_str("0")?;
                }
                f.write_str(&digits)
            } else {
                #[allow(clippy::cast_sign_loss)]
                let split = point as usize;
                write!(f, "{}.{}", &digits[..split], &digits[split..])
            }
        } else {
            f.write_str(&digits[..1])?;
            if digits.len() > 1 {
                write!(f, ".{}", &digits[1..])?;
            }
            write!(f, "E{adjusted:+}")
        }
    }
}

impl FromStr for Decimal128 {
    type Err = BsonError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = || BsonError::decode(format!("invalid Decimal128 string '{input}'"));
        let (negative, rest) = match input.as_bytes().first() {
            Some(b'-') => (true, &input[1..]),
            Some(b'+') => (false, &input[1..]),
            _ => (false, input),
        };
        if rest.eq_ignore_ascii_case("nan") {
            return Ok(Self::NAN);
        }
        if rest.eq_ignore_ascii_case("inf") || rest.eq_ignore_ascii_case("infinity") {
            return Ok(if negative {
                Self::NEG_INFINITY
            } else {
                Self::INFINITY
            });
        }

        let (mantissa, exp_extra) = match rest.find(['e', 'E']) {
            Some(pos) => {
                let exp: i32 = rest[pos + 1..].parse().map_err(|_| invalid())?;
                (&rest[..pos], exp)
            }
            None => (rest, 0),
        };
        if mantissa.is_empty() {
            return Err(invalid());
        }

        let mut digits = String::with_capacity(mantissa.len());
        let mut fraction_len: i32 = 0;
        let mut seen_point = false;
        for ch in mantissa.chars() {
            match ch {
                '0'..='9' => {
                    digits.push(ch);
                    if seen_point {
                        fraction_len += 1;
                    }
                }
                '.' if !seen_point => seen_point = true,
                _ => return Err(invalid()),
            }
        }
        if digits.is_empty() {
            return Err(invalid());
        }

        let significant = digits.trim_start_matches('0');
        if significant.len() > 34 {
            return Err(BsonError::decode(format!(
                "Decimal128 string '{input}' has more than 34 significant digits"
            )));
        }
        let coefficient: u128 = if significant.is_empty() {
            0
        } else {
            significant.parse().map_err(|_| invalid())?
        };

        let mut exponent = exp_extra
            .checked_sub(fraction_len)
            .ok_or_else(invalid)?;
        if coefficient == 0 {
            exponent = exponent.clamp(EXPONENT_MIN, EXPONENT_MAX);
        }
        Self::from_parts(negative, exponent, coefficient)
    }
}
