// Lenient deserializers for BloodHound property bags
//
// Graph properties are loosely typed: booleans arrive as `null`, timestamps
// as Unix seconds (integer or float) or RFC 3339 strings.

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Treat `null` as the type's default.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Unix seconds or RFC 3339 text to `DateTime<Utc>`; `null` and `""` to `None`.
pub(crate) fn timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => {
            let secs = match n.as_i64() {
                Some(secs) => secs,
                #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
                None => n
                    .as_f64()
                    .map(|f| f.trunc() as i64)
                    .ok_or_else(|| D::Error::custom(format!("unrepresentable timestamp {n}")))?,
            };
            DateTime::from_timestamp(secs, 0)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("timestamp out of range: {secs}")))
        }
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(&s)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|e| D::Error::custom(format!("invalid timestamp '{s}': {e}"))),
        Some(other) => Err(D::Error::custom(format!(
            "expected timestamp, got {other}"
        ))),
    }
}

/// A single string or a list of strings (Cypher `labels(n)`) to `Vec<String>`.
pub(crate) fn labels<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(label)) => vec![label],
        Some(OneOrMany::Many(labels)) => labels,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "timestamp")]
        at: Option<DateTime<Utc>>,
        #[serde(default, deserialize_with = "nullable")]
        flag: bool,
        #[serde(default, deserialize_with = "labels")]
        kinds: Vec<String>,
    }

    fn probe(json: &str) -> Probe {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn timestamps_accept_seconds_and_rfc3339() {
        let secs = probe(r#"{"at": 1700000000}"#).at.unwrap();
        let text = probe(r#"{"at": "2023-11-14T22:13:20Z"}"#).at.unwrap();
        assert_eq!(secs, text);

        let float = probe(r#"{"at": 1700000000.75}"#).at.unwrap();
        assert_eq!(float, secs);
    }

    #[test]
    fn missing_null_and_empty_timestamps_are_none() {
        assert!(probe("{}").at.is_none());
        assert!(probe(r#"{"at": null}"#).at.is_none());
        assert!(probe(r#"{"at": ""}"#).at.is_none());
    }

    #[test]
    fn garbage_timestamp_is_rejected() {
        assert!(serde_json::from_str::<Probe>(r#"{"at": "yesterday"}"#).is_err());
        assert!(serde_json::from_str::<Probe>(r#"{"at": true}"#).is_err());
    }

    #[test]
    fn null_bool_is_false() {
        assert!(!probe(r#"{"flag": null}"#).flag);
        assert!(probe(r#"{"flag": true}"#).flag);
    }

    #[test]
    fn labels_accept_one_or_many() {
        assert_eq!(probe(r#"{"kinds": "User"}"#).kinds, ["User"]);
        assert_eq!(probe(r#"{"kinds": ["Base", "User"]}"#).kinds, ["Base", "User"]);
        assert!(probe(r#"{"kinds": null}"#).kinds.is_empty());
    }
}
