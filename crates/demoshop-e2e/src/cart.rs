//! Cart arithmetic: price parsing, summation and total formatting.
//!
//! Prices are read off the page as text (`"$15"`, `"$ 4.50"`, `"-$5"`).
//! Parsing removes the first `$` wherever it sits, then takes the longest
//! leading decimal prefix, so `"$12.50 each"` is 12.5, `"-$5"` is -5 and
//! `"free"` is skipped.

/// Parse a displayed price. Returns `None` when no number leads the text.
#[must_use]
pub fn parse_price(text: &str) -> Option<f64> {
    let body = text.replacen('$', "", 1);
    leading_number(body.trim_start())?.parse().ok()
}

/// Longest prefix of `s` that reads as a decimal number
fn leading_number(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;
    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        if frac_end > frac_start || digits > 0 {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }
    // optional exponent, only if followed by digits
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }
    Some(&s[..end])
}

/// Sum every parseable price, skipping the rest
pub fn sum_prices<I, S>(prices: I) -> f64
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    prices
        .into_iter()
        .filter_map(|p| {
            let parsed = parse_price(p.as_ref());
            if parsed.is_none() {
                tracing::debug!(price = p.as_ref(), "skipping unparsable price");
            }
            parsed
        })
        .sum()
}

/// Format a total as the page displays it: `"$30"`, `"$12.5"`.
///
/// Uses the shortest representation that round-trips, so whole amounts
/// print without decimals.
#[must_use]
pub fn format_total(total: f64) -> String {
    if total == 0.0 {
        // -0.0 would otherwise print as "$-0"
        return "$0".to_string();
    }
    format!("${total}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    mod parse_tests {
        use super::*;

        #[test]
        fn test_parse_plain_and_dollar() {
            assert_eq!(parse_price("$15"), Some(15.0));
            assert_eq!(parse_price("8"), Some(8.0));
            assert_eq!(parse_price(" $ 4.50"), Some(4.5));
        }

        #[test]
        fn test_parse_takes_leading_prefix() {
            assert_eq!(parse_price("$12.50 each"), Some(12.5));
            assert_eq!(parse_price("$3.5.1"), Some(3.5));
            assert_eq!(parse_price("$.5"), Some(0.5));
            assert_eq!(parse_price("$7."), Some(7.0));
            assert_eq!(parse_price("$1e2"), Some(100.0));
            assert_eq!(parse_price("$2e"), Some(2.0));
        }

        #[test]
        fn test_dollar_sign_after_minus() {
            assert_eq!(parse_price("-$5"), Some(-5.0));
            assert_eq!(parse_price("  -$2.25 credit"), Some(-2.25));
            // only the first `$` is removed
            assert_eq!(parse_price("$$5"), None);
        }

        #[test]
        fn test_parse_rejects_garbage() {
            assert_eq!(parse_price(""), None);
            assert_eq!(parse_price("$"), None);
            assert_eq!(parse_price("free"), None);
            assert_eq!(parse_price("$."), None);
            assert_eq!(parse_price("USD 5"), None);
        }
    }

    mod total_tests {
        use super::*;

        #[test]
        fn test_seeded_cart_total() {
            let total = sum_prices(["$15", "$5", "$8", "$2"]);
            assert_eq!(format_total(total), "$30");
        }

        #[test]
        fn test_unparsable_prices_are_skipped() {
            let total = sum_prices(["$10", "n/a", "$2.5"]);
            assert_eq!(format_total(total), "$12.5");
        }

        #[test]
        fn test_credit_line_reduces_total() {
            assert_eq!(format_total(sum_prices(["$15", "-$5"])), "$10");
        }

        #[test]
        fn test_empty_cart() {
            assert_eq!(format_total(sum_prices(Vec::<String>::new())), "$0");
            assert_eq!(format_total(-0.0), "$0");
        }
    }

    proptest! {
        #[test]
        fn prop_integer_prices_render_without_decimals(prices in prop::collection::vec(0u32..10_000, 0..20)) {
            let texts: Vec<String> = prices.iter().map(|p| format!("${p}")).collect();
            let expected: u64 = prices.iter().map(|&p| u64::from(p)).sum();
            prop_assert_eq!(format_total(sum_prices(&texts)), format!("${expected}"));
        }

        #[test]
        fn prop_garbage_never_contributes(noise in "[a-zA-Z ]{0,12}", price in 0u32..1000) {
            let texts = vec![format!("${price}"), noise];
            prop_assert_eq!(sum_prices(&texts), f64::from(price));
        }
    }
}
