//! # Decimal Amount Encoding
//!
//! Serde helpers that render [`Amount`] fields as base-10 strings.
//!
//! JSON numbers lose precision above 2^53 in most indexer runtimes, and
//! serde buffers internally tagged and flattened enums through a value type
//! that has no 128-bit integers. Every amount that leaves the workspace as
//! JSON therefore travels as a string: `"100000000"`.
//!
//! ```ignore
//! #[serde(with = "ebr_core::decimal")]
//! amount: Amount,
//! #[serde(with = "ebr_core::decimal::vec")]
//! amounts: Vec<Amount>,
//! ```

use serde::{de, Deserialize, Deserializer, Serializer};

use crate::identity::Amount;

/// Serialize one amount as a decimal string.
pub fn serialize<S: Serializer>(amount: &Amount, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(amount)
}

/// Parse one amount from a decimal string.
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Amount, D::Error> {
    let s = String::deserialize(deserializer)?;
    parse(&s).map_err(de::Error::custom)
}

fn parse(s: &str) -> Result<Amount, String> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("invalid decimal amount {s:?}"));
    }
    s.parse::<Amount>()
        .map_err(|e| format!("invalid decimal amount {s:?}: {e}"))
}

/// The same encoding for `Vec<Amount>` fields.
pub mod vec {
    use serde::ser::SerializeSeq;
    use serde::{de, Deserialize, Deserializer, Serializer};

    use crate::identity::Amount;

    /// Serialize each amount as a decimal string.
    pub fn serialize<S: Serializer>(amounts: &[Amount], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(amounts.len()))?;
        for amount in amounts {
            seq.serialize_element(&amount.to_string())?;
        }
        seq.end()
    }

    /// Parse a list of decimal strings.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Amount>, D::Error> {
        Vec::<String>::deserialize(deserializer)?
            .iter()
            .map(|s| super::parse(s).map_err(de::Error::custom))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Holder {
        #[serde(with = "crate::decimal")]
        one: Amount,
        #[serde(with = "crate::decimal::vec")]
        many: Vec<Amount>,
    }

    #[test]
    fn amounts_render_as_strings() {
        let h = Holder {
            one: Amount::MAX,
            many: vec![0, 100_000_000],
        };
        let value = serde_json::to_value(&h).unwrap();
        assert_eq!(value["one"], "340282366920938463463374607431768211455");
        assert_eq!(value["many"], serde_json::json!(["0", "100000000"]));
        let back: Holder = serde_json::from_value(value).unwrap();
        assert_eq!(back, h);
    }

    #[test]
    fn malformed_amounts_rejected() {
        for bad in ["", "-1", "+1", "1e3", "0x10", "340282366920938463463374607431768211456"] {
            let json = serde_json::json!({ "one": bad, "many": [] });
            assert!(serde_json::from_value::<Holder>(json).is_err(), "{bad:?}");
        }
        let numeric = serde_json::json!({ "one": 5, "many": [] });
        assert!(serde_json::from_value::<Holder>(numeric).is_err());
    }
}
