// List envelope normalization
//
// BloodHound list endpoints wrap their payload in
// `{"count", "limit", "skip", "data"}`, but `data` is not stable: it is
// usually an array, sometimes a bare integer (a count-only summary, seen
// when a relationship list is empty), sometimes null or absent. This module
// turns all of those into a plain `Vec<T>`.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Error;
use crate::v2::client::decode_error;

/// `{"data": T}` wrapper used by single-object endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct DataEnvelope<T> {
    pub(crate) data: T,
}

/// Either `{"data": T}` or a bare `T`; some write endpoints answer with one,
/// some with the other.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum MaybeEnveloped<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> MaybeEnveloped<T> {
    pub(crate) fn into_inner(self) -> T {
        match self {
            Self::Wrapped { data } | Self::Bare(data) => data,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListEnvelope {
    #[serde(default)]
    count: Option<i64>,
    #[serde(default)]
    limit: Option<i64>,
    #[serde(default)]
    skip: Option<i64>,
    #[serde(default)]
    data: Value,
}

/// The shape the `data` field actually took.
#[derive(Debug, Clone, PartialEq)]
pub enum ListPayload<T> {
    /// A JSON array whose elements decoded as `T`.
    Items(Vec<T>),
    /// A bare integer where a list was expected.
    CountOnly(i64),
    /// Null, missing, or a shape that does not decode as `Vec<T>`.
    Empty,
}

impl<T: DeserializeOwned> ListPayload<T> {
    /// Classify a raw `data` value. Never fails: anything unrecognized
    /// becomes [`ListPayload::Empty`].
    pub fn probe(data: Value) -> Self {
        match data {
            Value::Null => Self::Empty,
            Value::Number(n) => n.as_i64().map_or(Self::Empty, Self::CountOnly),
            other => match serde_json::from_value::<Vec<T>>(other) {
                Ok(items) => Self::Items(items),
                Err(e) => {
                    warn!(error = %e, "list payload did not decode as expected element type; treating as empty");
                    Self::Empty
                }
            },
        }
    }
}

impl<T> ListPayload<T> {
    /// Collapse to a list; count-only and empty payloads yield `vec![]`.
    pub fn into_items(self) -> Vec<T> {
        match self {
            Self::Items(items) => items,
            Self::CountOnly(_) | Self::Empty => Vec::new(),
        }
    }
}

/// A normalized list response with its paging metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub count: Option<i64>,
    pub limit: Option<i64>,
    pub skip: Option<i64>,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Decode a list response body into a [`Page`].
///
/// Accepts the standard envelope or a bare top-level array. Only a body that
/// is not JSON, or is JSON of neither shape, is an error; a `data` field that
/// does not match `T` yields an empty page.
pub fn normalize_list<T: DeserializeOwned>(body: &[u8]) -> Result<Page<T>, Error> {
    let body_text = || String::from_utf8_lossy(body).into_owned();

    let root: Value = serde_json::from_slice(body).map_err(|e| decode_error(&e, body_text()))?;

    let envelope = match root {
        Value::Array(_) => ListEnvelope {
            count: None,
            limit: None,
            skip: None,
            data: root,
        },
        Value::Object(_) => {
            serde_json::from_value(root).map_err(|e| decode_error(&e, body_text()))?
        }
        _ => {
            return Err(Error::Deserialization {
                message: "list response is neither an object nor an array".into(),
                body: body_text(),
            });
        }
    };

    let payload = ListPayload::<T>::probe(envelope.data);
    let count = match &payload {
        ListPayload::CountOnly(n) => {
            debug!(count = n, "list payload is a bare count");
            envelope.count.or(Some(*n))
        }
        _ => envelope.count,
    };

    Ok(Page {
        count,
        limit: envelope.limit,
        skip: envelope.skip,
        items: payload.into_items(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Member {
        name: String,
        object_type: String,
    }

    #[test]
    fn array_payload_keeps_order() {
        let body = br#"{"count":2,"limit":10,"skip":0,"data":[
            {"name":"ALICE@CORP.LOCAL","object_type":"User"},
            {"name":"HELPDESK@CORP.LOCAL","object_type":"Group"}
        ]}"#;
        let page: Page<Member> = normalize_list(body).unwrap();
        assert_eq!(page.count, Some(2));
        assert_eq!(page.limit, Some(10));
        assert_eq!(page.skip, Some(0));
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].name, "ALICE@CORP.LOCAL");
        assert_eq!(page.items[1].object_type, "Group");
    }

    #[test]
    fn bare_integer_payload_is_empty_list() {
        let page: Page<Member> = normalize_list(br#"{"data":0}"#).unwrap();
        assert!(page.is_empty());
        assert_eq!(page.count, Some(0));

        let page: Page<Member> = normalize_list(br#"{"count":7,"data":7}"#).unwrap();
        assert!(page.is_empty());
        assert_eq!(page.count, Some(7));
    }

    #[test]
    fn null_missing_and_empty_payloads_are_empty() {
        for body in [
            &br#"{"data":null}"#[..],
            br#"{"count":0}"#,
            br#"{"data":[]}"#,
            br#"[]"#,
        ] {
            let page: Page<Member> = normalize_list(body).unwrap();
            assert!(page.items.is_empty());
        }
    }

    #[test]
    fn mismatched_elements_degrade_to_empty() {
        let page: Page<Member> = normalize_list(br#"{"data":{"unexpected":true}}"#).unwrap();
        assert!(page.items.is_empty());

        let page: Page<Member> = normalize_list(br#"{"data":[1,2,3]}"#).unwrap();
        assert!(page.items.is_empty());
    }

    #[test]
    fn bare_top_level_array_is_accepted() {
        let page: Page<Member> =
            normalize_list(br#"[{"name":"A","object_type":"User"}]"#).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.count, None);
    }

    #[test]
    fn malformed_envelope_is_an_error() {
        let err = normalize_list::<Member>(b"<html>gateway timeout</html>").unwrap_err();
        match err {
            Error::Deserialization { body, .. } => assert!(body.contains("gateway")),
            other => panic!("expected Deserialization, got {other:?}"),
        }

        assert!(normalize_list::<Member>(b"\"just a string\"").is_err());
        assert!(normalize_list::<Member>(br#"{"count":"many"}"#).is_err());
    }

    #[test]
    fn probe_classifies_shapes() {
        assert_eq!(
            ListPayload::<Member>::probe(serde_json::json!(3)),
            ListPayload::CountOnly(3)
        );
        assert_eq!(
            ListPayload::<Member>::probe(Value::Null),
            ListPayload::Empty
        );
    }
}
