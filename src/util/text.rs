use std::{collections::HashSet, str::FromStr};

use anyhow::{anyhow, Result};
use rust_decimal::Decimal;

const NUMBER_ESCAPE_CHAR: &[char] = &['%', ',', ' ', '"', '\n', '+'];

/// Parses a decimal value from a given string.
///
/// Thousands separators, percent signs, a leading plus sign and blanks are
/// removed before parsing.
///
/// # Arguments
///
/// * `s`: The text scraped from a web page, e.g. `"7,123.45"` or `"+0.52%"`.
/// * `escape_chars`: Optional characters to be removed in addition to the defaults.
///
/// # Example
///
/// ```
/// let decimal_value = parse_decimal("1,234.56", None).unwrap();
/// ```
pub fn parse_decimal(s: &str, escape_chars: Option<Vec<char>>) -> Result<Decimal> {
    let cleaned = clean_escape_chars(s, escape_chars);
    Decimal::from_str(&cleaned)
        .map_err(|why| anyhow!("Failed to parse '{}' as Decimal because {:?}", cleaned, why))
}

/// Removes a set of escape characters from a given string.
pub(crate) fn clean_escape_chars(s: &str, escape_chars: Option<Vec<char>>) -> String {
    let mut combined: Vec<char> = NUMBER_ESCAPE_CHAR.to_vec();
    if let Some(ec) = escape_chars {
        combined.extend(ec);
    }

    let filters = combined.iter().collect::<HashSet<_>>();
    s.chars().filter(|c| !filters.contains(c)).collect()
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    // 注意這個慣用法：在 tests 模組中，從外部範疇匯入所有名字。
    use super::*;

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("7,123.45", None).unwrap(), dec!(7123.45));
        assert_eq!(parse_decimal("+0.52%", None).unwrap(), dec!(0.52));
        assert_eq!(parse_decimal("-1.25%", None).unwrap(), dec!(-1.25));
        assert_eq!(parse_decimal(" 101 ", None).unwrap(), dec!(101));
        assert!(parse_decimal("", None).is_err());
        assert!(parse_decimal("N/A", None).is_err());
    }

    #[test]
    fn test_clean_escape_chars() {
        let result = clean_escape_chars("+12.34 (0.21%)", Some(vec!['(', ')']));
        assert_eq!(result, "12.340.21");
    }
}
