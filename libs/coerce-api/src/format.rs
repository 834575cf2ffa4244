use std::sync::LazyLock;

use serde::Deserialize;

/// Culture-style number formatting rules.
///
/// Consulted only on the primitive conversion path: when text is parsed into
/// a number and when a number is rendered as text. Loaded from config
/// (see [`crate::config`]) or built in code.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FormatContext {
    #[serde(default = "default_decimal_separator")]
    pub decimal_separator: char,

    /// Accepted (and skipped) inside floating-point and decimal text.
    /// Never emitted when formatting.
    #[serde(default = "default_group_separator")]
    pub group_separator: Option<char>,

    #[serde(default = "default_negative_sign")]
    pub negative_sign: String,

    #[serde(default = "default_positive_sign")]
    pub positive_sign: String,

    #[serde(default = "default_nan_symbol")]
    pub nan_symbol: String,

    #[serde(default = "default_positive_infinity_symbol")]
    pub positive_infinity_symbol: String,

    #[serde(default = "default_negative_infinity_symbol")]
    pub negative_infinity_symbol: String,
}

fn default_decimal_separator() -> char {
    '.'
}

fn default_group_separator() -> Option<char> {
    Some(',')
}

fn default_negative_sign() -> String {
    "-".to_string()
}

fn default_positive_sign() -> String {
    "+".to_string()
}

fn default_nan_symbol() -> String {
    "NaN".to_string()
}

fn default_positive_infinity_symbol() -> String {
    "Infinity".to_string()
}

fn default_negative_infinity_symbol() -> String {
    "-Infinity".to_string()
}

static INVARIANT: LazyLock<FormatContext> = LazyLock::new(FormatContext::default);

impl Default for FormatContext {
    fn default() -> Self {
        Self {
            decimal_separator: default_decimal_separator(),
            group_separator: default_group_separator(),
            negative_sign: default_negative_sign(),
            positive_sign: default_positive_sign(),
            nan_symbol: default_nan_symbol(),
            positive_infinity_symbol: default_positive_infinity_symbol(),
            negative_infinity_symbol: default_negative_infinity_symbol(),
        }
    }
}

/// Which parts of a numeric literal are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberStyle {
    /// Sign and digits.
    Integer,
    /// Sign, digits, group separators, decimal separator, exponent.
    Float,
    /// Sign, digits, group separators, decimal separator.
    Number,
}

impl NumberStyle {
    fn allows_fraction(self) -> bool {
        !matches!(self, NumberStyle::Integer)
    }

    fn allows_groups(self) -> bool {
        !matches!(self, NumberStyle::Integer)
    }

    fn allows_exponent(self) -> bool {
        matches!(self, NumberStyle::Float)
    }
}

impl FormatContext {
    /// Culture-independent rules: `.` decimal, `,` groups, `-`/`+` signs.
    pub fn invariant() -> &'static FormatContext {
        &INVARIANT
    }

    pub fn with_decimal_separator(mut self, separator: char) -> Self {
        self.decimal_separator = separator;
        self
    }

    pub fn with_group_separator(mut self, separator: Option<char>) -> Self {
        self.group_separator = separator;
        self
    }

    pub fn with_negative_sign(mut self, sign: impl Into<String>) -> Self {
        self.negative_sign = sign.into();
        self
    }

    /// Rewrite culture-formatted numeric text into the form Rust's `FromStr`
    /// impls accept. `None` when the text contains anything the style
    /// does not allow.
    pub fn normalize(&self, text: &str, style: NumberStyle) -> Option<String> {
        let trimmed = text.trim();
        let (negative, body) = self.split_sign(trimmed);
        if body.is_empty() {
            return None;
        }

        let mut out = String::with_capacity(body.len() + 1);
        if negative {
            out.push('-');
        }
        let mut in_exponent = false;
        for c in body.chars() {
            if c.is_ascii_digit() {
                out.push(c);
            } else if !in_exponent && style.allows_fraction() && c == self.decimal_separator {
                out.push('.');
            } else if !in_exponent && style.allows_groups() && Some(c) == self.group_separator {
                continue;
            } else if style.allows_exponent() && !in_exponent && (c == 'e' || c == 'E') {
                in_exponent = true;
                out.push('e');
            } else if in_exponent && (c == '-' || c == '+') && out.ends_with('e') {
                out.push(c);
            } else {
                return None;
            }
        }
        Some(out)
    }

    /// NaN and infinity literals, either in this context's symbols or in
    /// the form Rust prints them (`NaN`, `inf`, `-inf`).
    pub fn float_special(&self, text: &str) -> Option<f32> {
        let text = text.trim();
        if text == self.nan_symbol || text.eq_ignore_ascii_case("nan") {
            Some(f32::NAN)
        } else if text == self.positive_infinity_symbol
            || text.eq_ignore_ascii_case("inf")
            || text.eq_ignore_ascii_case("+inf")
            || text.eq_ignore_ascii_case("infinity")
        {
            Some(f32::INFINITY)
        } else if text == self.negative_infinity_symbol
            || text.eq_ignore_ascii_case("-inf")
            || text.eq_ignore_ascii_case("-infinity")
        {
            Some(f32::NEG_INFINITY)
        } else {
            None
        }
    }

    /// Render Rust-formatted numeric text (`-1234.5`) with this context's
    /// sign and decimal separator.
    pub fn format_number(&self, plain: &str) -> String {
        let (negative, digits) = match plain.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, plain),
        };
        let mut out = String::with_capacity(plain.len() + self.negative_sign.len());
        if negative {
            out.push_str(&self.negative_sign);
        }
        for c in digits.chars() {
            if c == '.' {
                out.push(self.decimal_separator);
            } else {
                out.push(c);
            }
        }
        out
    }

    pub fn format_float(&self, value: f64, plain: &str) -> String {
        if value.is_nan() {
            self.nan_symbol.clone()
        } else if value == f64::INFINITY {
            self.positive_infinity_symbol.clone()
        } else if value == f64::NEG_INFINITY {
            self.negative_infinity_symbol.clone()
        } else {
            self.format_number(plain)
        }
    }

    fn split_sign<'t>(&self, text: &'t str) -> (bool, &'t str) {
        if !self.negative_sign.is_empty() {
            if let Some(rest) = text.strip_prefix(self.negative_sign.as_str()) {
                return (true, rest);
            }
        }
        if !self.positive_sign.is_empty() {
            if let Some(rest) = text.strip_prefix(self.positive_sign.as_str()) {
                return (false, rest);
            }
        }
        (false, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn german() -> FormatContext {
        FormatContext::default()
            .with_decimal_separator(',')
            .with_group_separator(Some('.'))
    }

    #[test]
    fn normalize_integer_rejects_separators() {
        let ctx = FormatContext::invariant();
        assert_eq!(ctx.normalize(" -42 ", NumberStyle::Integer).as_deref(), Some("-42"));
        assert_eq!(ctx.normalize("+7", NumberStyle::Integer).as_deref(), Some("7"));
        assert_eq!(ctx.normalize("1,000", NumberStyle::Integer), None);
        assert_eq!(ctx.normalize("1.0", NumberStyle::Integer), None);
        assert_eq!(ctx.normalize("", NumberStyle::Integer), None);
        assert_eq!(ctx.normalize("-", NumberStyle::Integer), None);
    }

    #[test]
    fn normalize_float_with_culture() {
        let ctx = german();
        assert_eq!(ctx.normalize("1.234,5", NumberStyle::Float).as_deref(), Some("1234.5"));
        assert_eq!(ctx.normalize("-2,5e-3", NumberStyle::Float).as_deref(), Some("-2.5e-3"));
        assert_eq!(ctx.normalize("2,5e3", NumberStyle::Number), None);
        assert_eq!(ctx.normalize("1,2x", NumberStyle::Float), None);
    }

    #[test]
    fn custom_negative_sign() {
        let ctx = FormatContext::default().with_negative_sign("\u{2212}");
        assert_eq!(ctx.normalize("\u{2212}5", NumberStyle::Integer).as_deref(), Some("-5"));
        assert_eq!(ctx.format_number("-5.5"), "\u{2212}5.5");
    }

    #[test]
    fn specials_accept_both_spellings() {
        let ctx = FormatContext::invariant();
        assert!(ctx.float_special("NaN").is_some_and(f32::is_nan));
        assert_eq!(ctx.float_special("Infinity"), Some(f32::INFINITY));
        assert_eq!(ctx.float_special("inf"), Some(f32::INFINITY));
        assert_eq!(ctx.float_special("-Infinity"), Some(f32::NEG_INFINITY));
        assert_eq!(ctx.float_special("-inf"), Some(f32::NEG_INFINITY));
        assert_eq!(ctx.float_special("1.0"), None);
    }

    #[test]
    fn format_uses_context_symbols() {
        let ctx = german();
        assert_eq!(ctx.format_number("-1234.5"), "-1234,5");
        assert_eq!(ctx.format_float(f64::NAN, "NaN"), "NaN");
        assert_eq!(ctx.format_float(f64::NEG_INFINITY, "-inf"), "-Infinity");
    }
}
