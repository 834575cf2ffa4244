use std::fmt;
use std::str::FromStr;

use crate::error::CoerceError;

/// Maximum number of fractional digits.
pub const MAX_SCALE: u8 = 28;

/// Largest magnitude representable by the mantissa (96 bits).
pub const MAX_MANTISSA: i128 = (1 << 96) - 1;

const TARGET: &str = "Decimal";

/// Fixed-precision decimal: `mantissa / 10^scale`.
///
/// Same layout as the `(value, scale)` pair carried by numeric records:
/// a 96-bit signed mantissa and up to 28 fractional digits. Trailing zeros
/// are kept (`1.50` prints as `1.50`) but do not affect equality.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decimal {
    mantissa: i128,
    scale: u8,
}

impl Decimal {
    pub const ZERO: Decimal = Decimal { mantissa: 0, scale: 0 };

    /// `None` when the mantissa exceeds 96 bits or the scale exceeds 28.
    pub fn try_new(mantissa: i128, scale: u8) -> Option<Self> {
        if scale > MAX_SCALE || mantissa.unsigned_abs() > MAX_MANTISSA as u128 {
            return None;
        }
        Some(Self { mantissa, scale })
    }

    pub fn from_i128(value: i128) -> Option<Self> {
        Self::try_new(value, 0)
    }

    pub fn mantissa(&self) -> i128 {
        self.mantissa
    }

    pub fn scale(&self) -> u8 {
        self.scale
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa == 0
    }

    /// Integral value, rounding half to even.
    pub fn round_ties_even(&self) -> i128 {
        if self.scale == 0 {
            return self.mantissa;
        }
        let divisor = 10i128.pow(u32::from(self.scale));
        let quotient = self.mantissa / divisor;
        let twice_rem = (self.mantissa % divisor).abs() * 2;
        if twice_rem > divisor || (twice_rem == divisor && quotient % 2 != 0) {
            quotient + self.mantissa.signum()
        } else {
            quotient
        }
    }

    pub fn to_f64(&self) -> f64 {
        // Parsing the exact text gives a correctly rounded result.
        match self.to_string().parse::<f64>() {
            Ok(v) => v,
            Err(_) => self.mantissa as f64 / 10f64.powi(i32::from(self.scale)),
        }
    }

    pub fn try_from_f64(value: f64) -> Result<Self, CoerceError> {
        if !value.is_finite() {
            return Err(CoerceError::overflow(TARGET));
        }
        value.to_string().parse()
    }

    /// Uses the shortest `f32` text, so `0.1f32` becomes `0.1`, not `0.100000001...`.
    pub fn try_from_f32(value: f32) -> Result<Self, CoerceError> {
        if !value.is_finite() {
            return Err(CoerceError::overflow(TARGET));
        }
        value.to_string().parse()
    }

    /// Strip trailing fractional zeros.
    fn normalized(&self) -> (i128, u8) {
        let (mut mantissa, mut scale) = (self.mantissa, self.scale);
        while scale > 0 && mantissa % 10 == 0 {
            mantissa /= 10;
            scale -= 1;
        }
        (mantissa, scale)
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.normalized() == other.normalized()
    }
}

impl Eq for Decimal {}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.mantissa.unsigned_abs().to_string();
        let sign = if self.mantissa < 0 { "-" } else { "" };
        let scale = usize::from(self.scale);
        if scale == 0 {
            return write!(f, "{sign}{digits}");
        }
        let padded = if digits.len() <= scale {
            format!("{}{digits}", "0".repeat(scale - digits.len() + 1))
        } else {
            digits
        };
        let (int_part, frac_part) = padded.split_at(padded.len() - scale);
        write!(f, "{sign}{int_part}.{frac_part}")
    }
}

/// Parses `[+|-]digits[.digits]`. Fractional digits beyond what fits are
/// rounded half to even; an integral part that does not fit is an overflow.
impl FromStr for Decimal {
    type Err = CoerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (negative, body) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };
        let (int_part, frac_part) = match body.split_once('.') {
            Some((i, f)) => (i, f),
            None => (body, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(CoerceError::format(s, TARGET));
        }
        if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(CoerceError::format(s, TARGET));
        }

        let mut mantissa: i128 = 0;
        for b in int_part.bytes() {
            mantissa = mantissa * 10 + i128::from(b - b'0');
            if mantissa > MAX_MANTISSA {
                return Err(CoerceError::overflow(TARGET));
            }
        }

        let mut scale = 0u8;
        let mut round_digit: Option<u8> = None;
        let mut sticky = false;
        for b in frac_part.bytes() {
            let digit = b - b'0';
            if round_digit.is_none() && scale < MAX_SCALE {
                let next = mantissa * 10 + i128::from(digit);
                if next <= MAX_MANTISSA {
                    mantissa = next;
                    scale += 1;
                    continue;
                }
            }
            match round_digit {
                None => round_digit = Some(digit),
                Some(_) => sticky |= digit != 0,
            }
        }

        if let Some(digit) = round_digit {
            let round_up = digit > 5 || (digit == 5 && (sticky || mantissa % 2 != 0));
            if round_up {
                mantissa += 1;
                if mantissa > MAX_MANTISSA {
                    return Err(CoerceError::overflow(TARGET));
                }
            }
        }

        if negative {
            mantissa = -mantissa;
        }
        Ok(Self { mantissa, scale })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn display_keeps_scale() {
        assert_eq!(dec("1.50").to_string(), "1.50");
        assert_eq!(dec("-0.05").to_string(), "-0.05");
        assert_eq!(dec("42").to_string(), "42");
        assert_eq!(dec(".5").to_string(), "0.5");
    }

    #[test]
    fn equality_ignores_trailing_zeros() {
        assert_eq!(dec("1.5"), dec("1.500"));
        assert_ne!(dec("1.5"), dec("1.05"));
        assert_eq!(dec("-0"), Decimal::ZERO);
    }

    #[test]
    fn rejects_malformed_text() {
        for text in ["", "-", ".", "1.2.3", "1e5", "abc", " 1"] {
            assert!(text.parse::<Decimal>().is_err(), "{text:?} should not parse");
        }
    }

    #[test]
    fn excess_fraction_rounds_half_even() {
        let d = dec("0.00000000000000000000000000025");
        assert_eq!(d, dec("0.0000000000000000000000000002"));
        let d = dec("0.00000000000000000000000000035");
        assert_eq!(d, dec("0.0000000000000000000000000004"));
        let d = dec("0.000000000000000000000000000251");
        assert_eq!(d, dec("0.0000000000000000000000000003"));
    }

    #[test]
    fn overflow_on_large_integral_part() {
        assert_eq!(
            "79228162514264337593543950336".parse::<Decimal>(),
            Err(CoerceError::overflow(TARGET))
        );
        assert!("79228162514264337593543950335".parse::<Decimal>().is_ok());
    }

    #[test]
    fn integer_rounding() {
        assert_eq!(dec("2.5").round_ties_even(), 2);
        assert_eq!(dec("3.5").round_ties_even(), 4);
        assert_eq!(dec("-2.5").round_ties_even(), -2);
        assert_eq!(dec("-2.51").round_ties_even(), -3);
        assert_eq!(dec("7").round_ties_even(), 7);
    }

    #[test]
    fn float_conversions() {
        assert_eq!(Decimal::try_from_f64(0.1).unwrap(), dec("0.1"));
        assert_eq!(Decimal::try_from_f32(0.1).unwrap(), dec("0.1"));
        assert!(Decimal::try_from_f64(f64::NAN).is_err());
        assert!(Decimal::try_from_f64(1e30).is_err());
        assert_eq!(dec("12.25").to_f64(), 12.25);
    }
}
