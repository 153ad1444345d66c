use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

/// Deserializes an optional string, treating "" the same as null.
/// Useful for API fields that return "" instead of omitting the key.
pub fn opt_nonempty_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

/// Deserializes an optional identifier that may arrive as a string or as a
/// bare number depending on the API version.
pub fn opt_id_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdValue {
        String(String),
        Unsigned(u64),
        Signed(i64),
    }

    Ok(match Option::<IdValue>::deserialize(deserializer)? {
        None => None,
        Some(IdValue::String(s)) if s.is_empty() => None,
        Some(IdValue::String(s)) => Some(s),
        Some(IdValue::Unsigned(n)) => Some(n.to_string()),
        Some(IdValue::Signed(n)) => Some(n.to_string()),
    })
}

/// Deserializes an optional decimal that may arrive as a JSON number or as a
/// numeric string.
pub fn opt_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(Decimal),
        String(String),
    }

    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(n)) => Ok(Some(n)),
        Some(NumberOrString::String(s)) if s.trim().is_empty() => Ok(None),
        Some(NumberOrString::String(s)) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
