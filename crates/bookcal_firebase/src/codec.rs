//! Firestore typed-value codec
//!
//! Firestore's REST API wraps every field in a one-key object naming its type,
//! e.g. `{"stringValue": "03/06/2024 10:00"}` or `{"integerValue": "42"}`
//! (64-bit integers travel as strings). This module converts between that
//! representation and plain `serde_json` values.
//!
//! Timestamps, bytes and references decode to their string form; geo points
//! decode to `{"latitude": .., "longitude": ..}`. Encoding never produces
//! those types, so re-encoding them yields plain strings/maps.

use crate::client::FirebaseError;
use bookcal_common::Document;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

/// A Firestore `Value` as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FirestoreValue {
    NullValue(()),
    BooleanValue(bool),
    IntegerValue(String),
    DoubleValue(f64),
    TimestampValue(String),
    StringValue(String),
    BytesValue(String),
    ReferenceValue(String),
    GeoPointValue(GeoPoint),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArrayValue {
    #[serde(default)]
    pub values: Vec<FirestoreValue>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MapValue {
    #[serde(default)]
    pub fields: BTreeMap<String, FirestoreValue>,
}

/// Encode a JSON value.
pub fn encode_value(value: &Value) -> FirestoreValue {
    match value {
        Value::Null => FirestoreValue::NullValue(()),
        Value::Bool(b) => FirestoreValue::BooleanValue(*b),
        Value::Number(n) => {
            if n.is_f64() {
                FirestoreValue::DoubleValue(n.as_f64().unwrap_or_default())
            } else {
                FirestoreValue::IntegerValue(n.to_string())
            }
        }
        Value::String(s) => FirestoreValue::StringValue(s.clone()),
        Value::Array(items) => FirestoreValue::ArrayValue(ArrayValue {
            values: items.iter().map(encode_value).collect(),
        }),
        Value::Object(map) => FirestoreValue::MapValue(MapValue {
            fields: encode_fields(map),
        }),
    }
}

/// Encode a whole record into Firestore `fields`.
pub fn encode_fields(fields: &Document) -> BTreeMap<String, FirestoreValue> {
    fields
        .iter()
        .map(|(key, value)| (key.clone(), encode_value(value)))
        .collect()
}

/// Decode a Firestore value.
///
/// # Errors
///
/// `DecodeError` for an `integerValue` that is not a 64-bit integer.
pub fn decode_value(value: &FirestoreValue) -> Result<Value, FirebaseError> {
    Ok(match value {
        FirestoreValue::NullValue(()) => Value::Null,
        FirestoreValue::BooleanValue(b) => Value::Bool(*b),
        FirestoreValue::IntegerValue(s) => {
            let n: i64 = s
                .parse()
                .map_err(|_| FirebaseError::DecodeError(format!("invalid integerValue {s:?}")))?;
            Value::Number(n.into())
        }
        // NaN and infinities have no JSON representation.
        FirestoreValue::DoubleValue(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
        FirestoreValue::TimestampValue(s)
        | FirestoreValue::StringValue(s)
        | FirestoreValue::BytesValue(s)
        | FirestoreValue::ReferenceValue(s) => Value::String(s.clone()),
        FirestoreValue::GeoPointValue(point) => {
            let mut map = Map::new();
            map.insert("latitude".to_string(), Number::from_f64(point.latitude).map_or(Value::Null, Value::Number));
            map.insert("longitude".to_string(), Number::from_f64(point.longitude).map_or(Value::Null, Value::Number));
            Value::Object(map)
        }
        FirestoreValue::ArrayValue(array) => Value::Array(
            array
                .values
                .iter()
                .map(decode_value)
                .collect::<Result<_, _>>()?,
        ),
        FirestoreValue::MapValue(map) => Value::Object(decode_fields(&map.fields)?),
    })
}

/// Decode Firestore `fields` into a record.
pub fn decode_fields(fields: &BTreeMap<String, FirestoreValue>) -> Result<Document, FirebaseError> {
    fields
        .iter()
        .map(|(key, value)| Ok((key.clone(), decode_value(value)?)))
        .collect()
}
