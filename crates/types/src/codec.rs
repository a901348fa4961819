//! Canonical JSON codec for relay records
//!
//! Every record describes its wire shape as a table of [`FieldSpec`]s in
//! declaration order. Decoding and encoding are both driven from that table:
//!
//! 1. the envelope must be a JSON object, and every scalar field that is
//!    present must be a JSON string (checked for the whole object first);
//! 2. fields are then decoded one by one in declaration order, and the first
//!    failure aborts the decode;
//! 3. encoding writes the fields back in the same order, so canonical input
//!    round-trips byte for byte.

use crate::error::{CodecError, ValueError};
use alloy::primitives::{Address, FixedBytes};
use num_bigint::BigUint;
use serde::de::{Error as _, Unexpected};
use serde_json::{Map, Value};
use std::any::Any;
use std::fmt;

/// Decoder for a nested record, type-erased so it can live in a schema table
pub type RecordDecoder = fn(&Value) -> Result<Box<dyn Any + Send>, CodecError>;

/// Wire kind of a single field
#[derive(Clone, Copy)]
pub enum FieldKind {
    /// Unsigned 64-bit integer as a decimal string
    Uint,
    /// Unsigned 256-bit integer as a decimal string
    BigUint,
    /// `0x`-prefixed lowercase hex of exactly this many bytes
    Bytes(usize),
    /// 20-byte execution address in EIP-55 mixed case
    ChecksumAddress,
    /// Nested record with its own schema
    Record(RecordDecoder),
}

impl FieldKind {
    fn is_scalar(&self) -> bool {
        !matches!(self, FieldKind::Record(_))
    }
}

impl fmt::Debug for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Uint => f.write_str("Uint"),
            FieldKind::BigUint => f.write_str("BigUint"),
            FieldKind::Bytes(len) => f.debug_tuple("Bytes").field(len).finish(),
            FieldKind::ChecksumAddress => f.write_str("ChecksumAddress"),
            FieldKind::Record(_) => f.write_str("Record"),
        }
    }
}

/// One entry of a record's wire schema
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// JSON key
    pub key: &'static str,
    /// Human name used in error messages
    pub name: &'static str,
    /// Wire kind
    pub kind: FieldKind,
    /// Whether absence is an error
    pub required: bool,
}

impl FieldSpec {
    /// A field that must be present and non-empty
    pub const fn required(key: &'static str, name: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            name,
            kind,
            required: true,
        }
    }

    /// A field that may be absent
    pub const fn optional(key: &'static str, name: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            name,
            kind,
            required: false,
        }
    }
}

/// A field value after decoding
pub enum FieldValue {
    Uint(u64),
    BigUint(BigUint),
    Bytes(Vec<u8>),
    Record(Box<dyn Any + Send>),
}

/// A field value ready for encoding
pub enum WireValue<'a> {
    Uint(u64),
    BigUint(&'a BigUint),
    Bytes(&'a [u8]),
    Record(Value),
    /// Optional field with no value; omitted from the output
    Absent,
}

impl WireValue<'_> {
    /// Encode an optional integer, omitting it when unset
    pub fn opt_uint(value: Option<u64>) -> Self {
        value.map_or(WireValue::Absent, WireValue::Uint)
    }
}

struct DecodedField {
    spec: &'static FieldSpec,
    value: Option<FieldValue>,
}

/// Validated fields of one record, handed to [`JsonCodec::from_fields`]
///
/// Every required field is guaranteed present and well-formed; the typed
/// accessors only move the values out.
pub struct DecodedFields {
    fields: Vec<DecodedField>,
}

impl DecodedFields {
    fn take(&mut self, key: &'static str) -> Result<(&'static FieldSpec, Option<FieldValue>), CodecError> {
        self.fields
            .iter_mut()
            .find(|field| field.spec.key == key)
            .map(|field| (field.spec, field.value.take()))
            .ok_or(CodecError::FieldMissing { field: key })
    }

    fn take_required(&mut self, key: &'static str) -> Result<(&'static FieldSpec, FieldValue), CodecError> {
        match self.take(key)? {
            (spec, Some(value)) => Ok((spec, value)),
            (spec, None) => Err(CodecError::FieldMissing { field: spec.name }),
        }
    }

    /// Required 64-bit integer
    pub fn uint(&mut self, key: &'static str) -> Result<u64, CodecError> {
        match self.take_required(key)? {
            (_, FieldValue::Uint(value)) => Ok(value),
            (spec, _) => Err(CodecError::FieldMissing { field: spec.name }),
        }
    }

    /// Optional 64-bit integer
    pub fn opt_uint(&mut self, key: &'static str) -> Result<Option<u64>, CodecError> {
        match self.take(key)? {
            (_, None) => Ok(None),
            (_, Some(FieldValue::Uint(value))) => Ok(Some(value)),
            (spec, Some(_)) => Err(CodecError::FieldMissing { field: spec.name }),
        }
    }

    /// Required 256-bit integer
    pub fn big_uint(&mut self, key: &'static str) -> Result<BigUint, CodecError> {
        match self.take_required(key)? {
            (_, FieldValue::BigUint(value)) => Ok(value),
            (spec, _) => Err(CodecError::FieldMissing { field: spec.name }),
        }
    }

    /// Required fixed-length byte array
    pub fn fixed<const N: usize>(&mut self, key: &'static str) -> Result<FixedBytes<N>, CodecError> {
        match self.take_required(key)? {
            (spec, FieldValue::Bytes(bytes)) => FixedBytes::<N>::try_from(bytes.as_slice())
                .map_err(|_| CodecError::IncorrectLength { field: spec.name }),
            (spec, _) => Err(CodecError::FieldMissing { field: spec.name }),
        }
    }

    /// Required 20-byte execution address
    pub fn address(&mut self, key: &'static str) -> Result<Address, CodecError> {
        self.fixed::<20>(key).map(Address::from)
    }

    /// Required nested record
    pub fn record<T: 'static>(&mut self, key: &'static str) -> Result<T, CodecError> {
        match self.take_required(key)? {
            (spec, FieldValue::Record(record)) => record
                .downcast::<T>()
                .map(|record| *record)
                .map_err(|_| CodecError::FieldMissing { field: spec.name }),
            (spec, _) => Err(CodecError::FieldMissing { field: spec.name }),
        }
    }
}

/// A record with a canonical JSON representation
pub trait JsonCodec: Sized + Send + 'static {
    /// Wire fields in declaration order
    const SCHEMA: &'static [FieldSpec];

    /// Build the record from validated fields
    fn from_fields(fields: DecodedFields) -> Result<Self, CodecError>;

    /// Field values in schema order
    fn wire_values(&self) -> Vec<WireValue<'_>>;

    /// Decode from an already parsed JSON value
    fn from_value(value: &Value) -> Result<Self, CodecError> {
        let fields = decode_fields(value, Self::SCHEMA)?;
        Self::from_fields(fields)
    }

    /// Decode from raw JSON bytes
    fn from_json(input: &[u8]) -> Result<Self, CodecError> {
        let value: Value = serde_json::from_slice(input).map_err(CodecError::MalformedEnvelope)?;
        Self::from_value(&value)
    }

    /// Encode to a JSON value with fields in schema order
    fn to_value(&self) -> Value {
        encode_fields(Self::SCHEMA, self.wire_values())
    }

    /// Encode to canonical JSON text
    fn to_json(&self) -> String {
        self.to_value().to_string()
    }
}

/// Type-erased decoder for use in [`FieldKind::Record`]
pub fn decode_record<T: JsonCodec>(value: &Value) -> Result<Box<dyn Any + Send>, CodecError> {
    T::from_value(value).map(|record| Box::new(record) as Box<dyn Any + Send>)
}

/// Decode a JSON array of records; the first bad element fails the whole list
pub fn decode_list<T: JsonCodec>(input: &[u8]) -> Result<Vec<T>, CodecError> {
    let value: Value = serde_json::from_slice(input).map_err(CodecError::MalformedEnvelope)?;
    let items = value
        .as_array()
        .ok_or_else(|| envelope_mismatch(&value, "a JSON array"))?;
    items.iter().map(T::from_value).collect()
}

/// Validate an object against a schema
pub fn decode_fields(value: &Value, schema: &'static [FieldSpec]) -> Result<DecodedFields, CodecError> {
    let object = value
        .as_object()
        .ok_or_else(|| envelope_mismatch(value, "a JSON object"))?;

    // Shape errors take precedence over any semantic error.
    for spec in schema.iter().filter(|spec| spec.kind.is_scalar()) {
        match object.get(spec.key) {
            None | Some(Value::Null) | Some(Value::String(_)) => {}
            Some(other) => return Err(field_type_mismatch(spec, other)),
        }
    }

    let mut fields = Vec::with_capacity(schema.len());
    for spec in schema {
        let value = decode_field(spec, object.get(spec.key))?;
        fields.push(DecodedField { spec, value });
    }

    Ok(DecodedFields { fields })
}

fn decode_field(spec: &FieldSpec, raw: Option<&Value>) -> Result<Option<FieldValue>, CodecError> {
    let raw = match raw {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) if text.is_empty() && spec.kind.is_scalar() => None,
        Some(value) => Some(value),
    };
    let Some(raw) = raw else {
        return if spec.required {
            Err(CodecError::FieldMissing { field: spec.name })
        } else {
            Ok(None)
        };
    };

    let value = match spec.kind {
        FieldKind::Record(decode) => {
            FieldValue::Record(decode(raw).map_err(|err| CodecError::Nested(Box::new(err)))?)
        }
        FieldKind::Uint => {
            let text = field_text(spec, raw)?;
            FieldValue::Uint(parse_uint(text).map_err(|source| invalid(spec, source))?)
        }
        FieldKind::BigUint => {
            let text = field_text(spec, raw)?;
            FieldValue::BigUint(parse_big_uint(text).map_err(|source| invalid(spec, source))?)
        }
        FieldKind::Bytes(len) => FieldValue::Bytes(parse_bytes(spec, field_text(spec, raw)?, len)?),
        FieldKind::ChecksumAddress => FieldValue::Bytes(parse_bytes(spec, field_text(spec, raw)?, 20)?),
    };

    Ok(Some(value))
}

/// Encode field values against a schema
pub fn encode_fields(schema: &[FieldSpec], values: Vec<WireValue<'_>>) -> Value {
    let mut object = Map::with_capacity(schema.len());
    for (spec, value) in schema.iter().zip(values) {
        let encoded = match (spec.kind, value) {
            (_, WireValue::Absent) => continue,
            (FieldKind::ChecksumAddress, WireValue::Bytes(bytes)) if bytes.len() == 20 => {
                Value::String(Address::from_slice(bytes).to_checksum(None))
            }
            (_, WireValue::Uint(value)) => Value::String(value.to_string()),
            (_, WireValue::BigUint(value)) => Value::String(value.to_string()),
            (_, WireValue::Bytes(bytes)) => Value::String(format!("0x{}", hex::encode(bytes))),
            (_, WireValue::Record(value)) => value,
        };
        object.insert(spec.key.to_string(), encoded);
    }
    Value::Object(object)
}

fn field_text<'a>(spec: &FieldSpec, raw: &'a Value) -> Result<&'a str, CodecError> {
    raw.as_str().ok_or_else(|| field_type_mismatch(spec, raw))
}

fn invalid(spec: &FieldSpec, source: ValueError) -> CodecError {
    CodecError::InvalidValue {
        field: spec.name,
        source,
    }
}

fn check_decimal(text: &str) -> Result<(), ValueError> {
    match text.char_indices().find(|(_, c)| !c.is_ascii_digit()) {
        Some((index, digit)) => Err(ValueError::NotDecimal { digit, index }),
        None => Ok(()),
    }
}

/// Parse a base-10 u64 with no sign, prefix or separators
pub fn parse_uint(text: &str) -> Result<u64, ValueError> {
    check_decimal(text)?;
    Ok(text.parse::<u64>()?)
}

/// Parse an unbounded base-10 integer with no sign, prefix or separators
pub fn parse_big_uint(text: &str) -> Result<BigUint, ValueError> {
    check_decimal(text)?;
    BigUint::parse_bytes(text.as_bytes(), 10).ok_or(ValueError::Empty)
}

fn parse_bytes(spec: &FieldSpec, text: &str, len: usize) -> Result<Vec<u8>, CodecError> {
    let digits = text.strip_prefix("0x").unwrap_or(text);
    let bytes = hex::decode(digits).map_err(|source| invalid(spec, source.into()))?;
    if bytes.len() != len {
        return Err(CodecError::IncorrectLength { field: spec.name });
    }
    Ok(bytes)
}

fn envelope_mismatch(value: &Value, expected: &'static str) -> CodecError {
    CodecError::MalformedEnvelope(serde_json::Error::invalid_type(unexpected(value), &expected))
}

fn field_type_mismatch(spec: &FieldSpec, value: &Value) -> CodecError {
    CodecError::MalformedEnvelope(serde_json::Error::custom(format_args!(
        "invalid type for field `{}`: {}, expected a string",
        spec.key,
        unexpected(value)
    )))
}

fn unexpected(value: &Value) -> Unexpected<'_> {
    match value {
        Value::Null => Unexpected::Unit,
        Value::Bool(b) => Unexpected::Bool(*b),
        Value::Number(n) => match (n.as_u64(), n.as_i64()) {
            (Some(u), _) => Unexpected::Unsigned(u),
            (None, Some(i)) => Unexpected::Signed(i),
            (None, None) => Unexpected::Float(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => Unexpected::Str(s),
        Value::Array(_) => Unexpected::Seq,
        Value::Object(_) => Unexpected::Map,
    }
}

/// Implement `Serialize`, `Deserialize` and `Display` on top of [`JsonCodec`]
macro_rules! serde_via_codec {
    ($($record:ty),+ $(,)?) => {$(
        impl serde::Serialize for $record {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serde::Serialize::serialize(&$crate::codec::JsonCodec::to_value(self), serializer)
            }
        }

        impl<'de> serde::Deserialize<'de> for $record {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                let value = <serde_json::Value as serde::Deserialize>::deserialize(deserializer)?;
                <$record as $crate::codec::JsonCodec>::from_value(&value).map_err(serde::de::Error::custom)
            }
        }

        impl std::fmt::Display for $record {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", $crate::codec::JsonCodec::to_value(self))
            }
        }
    )+};
}

pub(crate) use serde_via_codec;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    const SCHEMA: &[FieldSpec] = &[
        FieldSpec::required("count", "count", FieldKind::Uint),
        FieldSpec::required("root", "root", FieldKind::Bytes(4)),
        FieldSpec::optional("extra", "extra", FieldKind::Uint),
    ];

    #[test]
    fn test_parse_uint_rejects_signs_and_junk() {
        assert_eq!(parse_uint("30000000").unwrap(), 30_000_000);
        assert!(matches!(parse_uint("-1"), Err(ValueError::NotDecimal { digit: '-', index: 0 })));
        assert!(matches!(parse_uint("+1"), Err(ValueError::NotDecimal { digit: '+', index: 0 })));
        assert!(matches!(parse_uint("true"), Err(ValueError::NotDecimal { digit: 't', index: 0 })));
        assert!(matches!(parse_uint("1_000"), Err(ValueError::NotDecimal { digit: '_', index: 1 })));
        assert!(matches!(parse_uint("18446744073709551616"), Err(ValueError::Integer(_))));
    }

    #[test]
    fn test_parse_big_uint_is_unbounded() {
        assert_eq!(parse_big_uint("34682404831419603").unwrap(), BigUint::from(34682404831419603u64));
        assert!(matches!(parse_big_uint("0x10"), Err(ValueError::NotDecimal { digit: 'x', index: 1 })));
        assert!(matches!(parse_big_uint("1_000"), Err(ValueError::NotDecimal { digit: '_', index: 1 })));
        assert!(matches!(parse_big_uint(""), Err(ValueError::Empty)));

        let past_u256 = format!("1{}", "0".repeat(78));
        assert_eq!(parse_big_uint(&past_u256).unwrap().to_string(), past_u256);
    }

    #[test]
    fn test_envelope_must_be_object() {
        let err = decode_fields(&json!([]), SCHEMA).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::MalformedEnvelope);
        assert_eq!(err.to_string(), "invalid JSON: invalid type: sequence, expected a JSON object");
    }

    #[test]
    fn test_type_errors_precede_missing_fields() {
        let err = decode_fields(&json!({"root": true}), SCHEMA).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::MalformedEnvelope);
        assert!(err.to_string().contains("`root`"));
    }

    #[test]
    fn test_optional_and_required_fields() {
        let mut fields = decode_fields(&json!({"count": "7", "root": "0x01020304"}), SCHEMA).unwrap();
        assert_eq!(fields.uint("count").unwrap(), 7);
        assert_eq!(fields.fixed::<4>("root").unwrap(), FixedBytes::<4>::from([1, 2, 3, 4]));
        assert_eq!(fields.opt_uint("extra").unwrap(), None);

        let err = decode_fields(&json!({"count": "", "root": "0x01020304"}), SCHEMA).err().unwrap();
        assert_eq!(err.to_string(), "count missing");
    }

    #[test]
    fn test_hex_errors() {
        let err = decode_fields(&json!({"count": "1", "root": "0xzz020304"}), SCHEMA).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
        assert_eq!(err.to_string(), "invalid value for root: Invalid character 'z' at position 0");

        let err = decode_fields(&json!({"count": "1", "root": "0x0102030"}), SCHEMA).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);

        let err = decode_fields(&json!({"count": "1", "root": "010203"}), SCHEMA).err().unwrap();
        assert_eq!(err.to_string(), "incorrect length for root");
    }

    #[test]
    fn test_encode_skips_absent_and_keeps_order() {
        let root = [0xab_u8, 0, 0, 1];
        let value = encode_fields(
            SCHEMA,
            vec![WireValue::Uint(9), WireValue::Bytes(&root), WireValue::opt_uint(None)],
        );
        assert_eq!(value.to_string(), r#"{"count":"9","root":"0xab000001"}"#);
    }
}
