//! Lenient deserializers for backend payloads.
//!
//! The backend is not consistent about JSON types: identifiers arrive as
//! numbers or strings, amounts and status codes sometimes as numeric strings.

use serde::de::{Deserializer, Error as DeError};
use serde::Deserialize;
use serde_json::Value;

fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Whole numbers only: `2`, `2.0` and `"2"` qualify, `1.5` and `"0.4"` do not.
fn value_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral))
        }
        _ => None,
    }
}

fn integral(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// Accepts a string or a number and yields a string.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_to_string(value).ok_or_else(|| D::Error::custom("expected a string or a number"))
}

/// Optional variant of [`string_or_number`]; null and empty strings become `None`.
pub fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(value_to_string)
        .filter(|s| !s.trim().is_empty()))
}

/// Optional whole number given as a number or a numeric string; anything
/// else, fractions included, becomes `None`.
pub fn opt_lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_i64))
}

/// Optional non-negative amount; anything unparseable becomes `None`.
pub fn opt_lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(value_to_i64)
        .and_then(|n| u64::try_from(n).ok()))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Payload {
        #[serde(deserialize_with = "super::string_or_number")]
        id: String,
        #[serde(default, deserialize_with = "super::opt_lenient_u64")]
        amount: Option<u64>,
        #[serde(default, deserialize_with = "super::opt_lenient_i64")]
        status: Option<i64>,
    }

    #[test]
    fn test_accepts_numeric_id_and_string_amount() {
        let payload: Payload =
            serde_json::from_str(r#"{"id": 42, "amount": "50000.00", "status": "1"}"#).unwrap();
        assert_eq!(payload.id, "42");
        assert_eq!(payload.amount, Some(50000));
        assert_eq!(payload.status, Some(1));
    }

    #[test]
    fn test_missing_amount_is_none() {
        let payload: Payload = serde_json::from_str(r#"{"id": "don_1", "status": 0}"#).unwrap();
        assert_eq!(payload.id, "don_1");
        assert_eq!(payload.amount, None);
        assert_eq!(payload.status, Some(0));
    }

    #[test]
    fn test_fractional_numbers_are_not_codes() {
        for raw in [r#"1.5"#, r#""2.9""#, r#""0.4""#, r#"true"#] {
            let json = format!(r#"{{"id": "don_1", "status": {}, "amount": {}}}"#, raw, raw);
            let payload: Payload = serde_json::from_str(&json).unwrap();
            assert_eq!(payload.status, None, "status {}", raw);
            assert_eq!(payload.amount, None, "amount {}", raw);
        }

        let payload: Payload =
            serde_json::from_str(r#"{"id": "don_1", "status": 2.0, "amount": " 7 "}"#).unwrap();
        assert_eq!(payload.status, Some(2));
        assert_eq!(payload.amount, Some(7));
    }

    #[test]
    fn test_rejects_object_id() {
        let result = serde_json::from_str::<Payload>(r#"{"id": {}, "status": 0}"#);
        assert!(result.is_err());
    }
}
