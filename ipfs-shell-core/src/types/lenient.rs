//! Lenient decoding of numeric fields the daemon sends as strings.
//!
//! `add` reports `"Size": "1234"`. A value that does not parse as `u64`
//! (negative, overflowing, empty, or not a string at all) decodes to `0`
//! instead of failing the whole call. Callers that need to tell "zero"
//! from "unparsable" must re-query with `object_stat`.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Number(u64),
    Text(String),
    Other(IgnoredAny),
}

/// Deserializes a `u64` from a number or a decimal string, yielding `0` on
/// any parse failure.
pub fn u64_or_zero<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawNumber::deserialize(deserializer)? {
        RawNumber::Number(n) => n,
        RawNumber::Text(s) => parse_u64_or_zero(&s),
        RawNumber::Other(_) => 0,
    })
}

/// Parses a decimal `u64`, yielding `0` on failure.
pub fn parse_u64_or_zero(s: &str) -> u64 {
    s.trim().parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    #[derive(Deserialize)]
    struct Sizes {
        #[serde(default, deserialize_with = "u64_or_zero")]
        size: u64,
    }

    fn decode(json: &str) -> u64 {
        serde_json::from_str::<Sizes>(json).unwrap().size
    }

    #[test_case(r#"{"size":"1677"}"#, 1677 ; "string")]
    #[test_case(r#"{"size":1677}"#, 1677 ; "number")]
    #[test_case(r#"{"size":""}"#, 0 ; "empty string")]
    #[test_case(r#"{"size":"-1"}"#, 0 ; "negative")]
    #[test_case(r#"{"size":"18446744073709551616"}"#, 0 ; "overflow")]
    #[test_case(r#"{"size":"12kb"}"#, 0 ; "garbage")]
    #[test_case(r#"{"size":null}"#, 0 ; "null")]
    #[test_case(r#"{"size":1.5}"#, 0 ; "float")]
    #[test_case(r#"{}"#, 0 ; "missing")]
    fn test_lenient_size(json: &str, expected: u64) {
        assert_eq!(decode(json), expected);
    }

    proptest! {
        #[test]
        fn prop_decimal_strings_round_trip(n in any::<u64>()) {
            prop_assert_eq!(decode(&format!(r#"{{"size":"{}"}}"#, n)), n);
        }

        #[test]
        fn prop_never_fails_on_strings(s in "\\PC*") {
            let json = serde_json::json!({ "size": s }).to_string();
            prop_assert!(serde_json::from_str::<Sizes>(&json).is_ok());
        }
    }
}
