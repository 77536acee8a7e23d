//! Attribute scalar codec.
//!
//! Formats and parses unsigned integers carried in attributes or element text.
//! Absence is modelled with `Option` at the call sites: `None` never produces
//! an attribute and an absent attribute never produces a value.

use std::fmt;

/// Output format for an unsigned scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UintFormat {
    /// Plain decimal (`%d`).
    Decimal,
    /// Hex with a `0x` prefix, zero-padded to `width` digits (`0x%0Nx`).
    Hex { width: usize },
    /// Hex without prefix, zero-padded to `width` digits (`%0Nx`).
    HexBare { width: usize },
    /// Decimal zero-padded to `width` digits (`%0Nd`).
    Fixed { width: usize },
}

impl UintFormat {
    /// `0x%x`
    pub const HEX: UintFormat = UintFormat::Hex { width: 0 };
    /// `0x%02x`
    pub const HEX2: UintFormat = UintFormat::Hex { width: 2 };
    /// `0x%04x`
    pub const HEX4: UintFormat = UintFormat::Hex { width: 4 };
    /// `0x%08x`
    pub const HEX8: UintFormat = UintFormat::Hex { width: 8 };

    /// Returns the radix a value written in this format is read back with.
    pub fn radix(&self) -> Radix {
        match self {
            UintFormat::Decimal | UintFormat::Fixed { .. } => Radix::Decimal,
            UintFormat::Hex { .. } | UintFormat::HexBare { .. } => Radix::Hex,
        }
    }
}

/// Input base for parsing an unsigned scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Radix {
    /// Base 10 only.
    Decimal,
    /// Base 16, with an optional `0x`/`0X` prefix.
    Hex,
    /// Detected from the prefix: `0x` hex, `0o` or a leading `0` octal,
    /// `0b` binary, otherwise decimal.
    Auto,
}

/// Reason a scalar failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarError {
    Empty,
    InvalidDigit,
    Overflow,
}

impl fmt::Display for ScalarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarError::Empty => f.write_str("empty value"),
            ScalarError::InvalidDigit => f.write_str("invalid digit"),
            ScalarError::Overflow => f.write_str("value out of range"),
        }
    }
}

/// Formats a value according to `format`.
pub fn format_uint(value: u64, format: UintFormat) -> String {
    match format {
        UintFormat::Decimal => value.to_string(),
        UintFormat::Hex { width } => format!("0x{:0width$x}", value, width = width),
        UintFormat::HexBare { width } => format!("{:0width$x}", value, width = width),
        UintFormat::Fixed { width } => format!("{:0width$}", value, width = width),
    }
}

/// Parses an unsigned value in the given radix.
pub fn parse_uint(text: &str, radix: Radix) -> Result<u64, ScalarError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ScalarError::Empty);
    }
    let (digits, base) = match radix {
        Radix::Decimal => (text, 10),
        Radix::Hex => (strip_hex_prefix(text).unwrap_or(text), 16),
        Radix::Auto => split_auto(text),
    };
    if digits.is_empty() {
        return Err(ScalarError::InvalidDigit);
    }
    // from_str_radix accepts a leading '+', the wire format does not
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ScalarError::InvalidDigit);
    }
    u64::from_str_radix(digits, base).map_err(|err| match err.kind() {
        std::num::IntErrorKind::PosOverflow => ScalarError::Overflow,
        _ => ScalarError::InvalidDigit,
    })
}

/// Parses a signed decimal value.
pub fn parse_int(text: &str) -> Result<i64, ScalarError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ScalarError::Empty);
    }
    text.parse::<i64>().map_err(|err| match err.kind() {
        std::num::IntErrorKind::PosOverflow | std::num::IntErrorKind::NegOverflow => {
            ScalarError::Overflow
        }
        _ => ScalarError::InvalidDigit,
    })
}

fn strip_hex_prefix(text: &str) -> Option<&str> {
    text.strip_prefix("0x").or_else(|| text.strip_prefix("0X"))
}

fn split_auto(text: &str) -> (&str, u32) {
    if let Some(rest) = strip_hex_prefix(text) {
        (rest, 16)
    } else if let Some(rest) = text.strip_prefix("0o").or_else(|| text.strip_prefix("0O")) {
        (rest, 8)
    } else if let Some(rest) = text.strip_prefix("0b").or_else(|| text.strip_prefix("0B")) {
        (rest, 2)
    } else if text.len() > 1 && text.starts_with('0') {
        (&text[1..], 8)
    } else {
        (text, 10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_formats() {
        assert_eq!(format_uint(0, UintFormat::Decimal), "0");
        assert_eq!(format_uint(0, UintFormat::HEX4), "0x0000");
        assert_eq!(format_uint(1, UintFormat::HEX2), "0x01");
        assert_eq!(format_uint(0, UintFormat::HEX), "0x0");
        assert_eq!(format_uint(0x1f, UintFormat::HEX), "0x1f");
        assert_eq!(format_uint(0xbeef, UintFormat::HexBare { width: 6 }), "00beef");
        assert_eq!(format_uint(7, UintFormat::Fixed { width: 3 }), "007");
        assert_eq!(format_uint(0x1234, UintFormat::HEX2), "0x1234");
    }

    #[test]
    fn test_auto_radix() {
        assert_eq!(parse_uint("0x10", Radix::Auto), Ok(16));
        assert_eq!(parse_uint("10", Radix::Auto), Ok(10));
        assert_eq!(parse_uint("010", Radix::Auto), Ok(8));
        assert_eq!(parse_uint("0", Radix::Auto), Ok(0));
        assert_eq!(parse_uint("0b101", Radix::Auto), Ok(5));
        assert_eq!(parse_uint("08", Radix::Auto), Err(ScalarError::InvalidDigit));
    }

    #[test]
    fn test_hex_prefix_optional() {
        assert_eq!(parse_uint("0x1f", Radix::Hex), Ok(31));
        assert_eq!(parse_uint("1f", Radix::Hex), Ok(31));
        assert_eq!(parse_uint("0x", Radix::Hex), Err(ScalarError::InvalidDigit));
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(parse_uint("", Radix::Decimal), Err(ScalarError::Empty));
        assert_eq!(parse_uint("abc", Radix::Decimal), Err(ScalarError::InvalidDigit));
        assert_eq!(parse_uint("+5", Radix::Decimal), Err(ScalarError::InvalidDigit));
        assert_eq!(parse_uint("-1", Radix::Auto), Err(ScalarError::InvalidDigit));
        assert_eq!(
            parse_uint("18446744073709551616", Radix::Decimal),
            Err(ScalarError::Overflow)
        );
        assert_eq!(parse_int("-1"), Ok(-1));
        assert_eq!(parse_int("x"), Err(ScalarError::InvalidDigit));
    }

    fn any_format() -> impl Strategy<Value = UintFormat> {
        prop_oneof![
            Just(UintFormat::Decimal),
            (0usize..12).prop_map(|width| UintFormat::Hex { width }),
            (0usize..12).prop_map(|width| UintFormat::HexBare { width }),
            (0usize..12).prop_map(|width| UintFormat::Fixed { width }),
        ]
    }

    proptest! {
        #[test]
        fn prop_format_parse_roundtrip(value in any::<u64>(), format in any_format()) {
            let text = format_uint(value, format);
            prop_assert_eq!(parse_uint(&text, format.radix()), Ok(value));
        }

        #[test]
        fn prop_prefixed_hex_reads_back_with_auto(value in any::<u64>(), width in 0usize..10) {
            let text = format_uint(value, UintFormat::Hex { width });
            prop_assert_eq!(parse_uint(&text, Radix::Auto), Ok(value));
        }

        #[test]
        fn prop_padding_is_at_least_width(value in 0u64..0x10000, width in 0usize..10) {
            let text = format_uint(value, UintFormat::Hex { width });
            prop_assert!(text.len() >= width + 2);
        }
    }
}
