//! Bid trace records served by the relay data API

use crate::codec::{serde_via_codec, DecodedFields, FieldKind, FieldSpec, JsonCodec, WireValue};
use crate::error::CodecError;
use crate::primitives::{BlsPublicKey, Hash32, Slot};
use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use num_bigint::BigUint;

const BID_TRACE_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("slot", "slot", FieldKind::Uint),
    FieldSpec::required("parent_hash", "parent hash", FieldKind::Bytes(32)),
    FieldSpec::required("block_hash", "block hash", FieldKind::Bytes(32)),
    FieldSpec::required("builder_pubkey", "builder pubkey", FieldKind::Bytes(48)),
    FieldSpec::required("proposer_pubkey", "proposer pubkey", FieldKind::Bytes(48)),
    FieldSpec::required("proposer_fee_recipient", "proposer fee recipient", FieldKind::Bytes(20)),
    FieldSpec::required("gas_limit", "gas limit", FieldKind::Uint),
    FieldSpec::required("gas_used", "gas used", FieldKind::Uint),
    FieldSpec::required("value", "value", FieldKind::BigUint),
];

const BID_TRACE_WITH_TIMESTAMP_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("slot", "slot", FieldKind::Uint),
    FieldSpec::required("parent_hash", "parent hash", FieldKind::Bytes(32)),
    FieldSpec::required("block_hash", "block hash", FieldKind::Bytes(32)),
    FieldSpec::required("builder_pubkey", "builder pubkey", FieldKind::Bytes(48)),
    FieldSpec::required("proposer_pubkey", "proposer pubkey", FieldKind::Bytes(48)),
    FieldSpec::required("proposer_fee_recipient", "proposer fee recipient", FieldKind::Bytes(20)),
    FieldSpec::required("gas_limit", "gas limit", FieldKind::Uint),
    FieldSpec::required("gas_used", "gas used", FieldKind::Uint),
    FieldSpec::required("value", "value", FieldKind::BigUint),
    FieldSpec::optional("block_number", "block number", FieldKind::Uint),
    FieldSpec::optional("num_tx", "number of transactions", FieldKind::Uint),
    FieldSpec::required("timestamp", "timestamp", FieldKind::Uint),
    FieldSpec::optional("timestamp_ms", "timestamp ms", FieldKind::Uint),
];

/// A builder's bid for a slot as traced by the relay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BidTrace {
    /// Slot the bid was made for
    pub slot: Slot,
    /// Hash of the parent block
    pub parent_hash: Hash32,
    /// Hash of the bid block
    pub block_hash: Hash32,
    /// Public key of the builder
    pub builder_pubkey: BlsPublicKey,
    /// Public key of the proposer
    pub proposer_pubkey: BlsPublicKey,
    /// Execution address receiving the proposer payment
    pub proposer_fee_recipient: Address,
    /// Gas limit of the block
    pub gas_limit: u64,
    /// Gas used by the block
    pub gas_used: u64,
    /// Bid value in wei
    pub value: BigUint,
}

impl BidTrace {
    fn take_from(fields: &mut DecodedFields) -> Result<Self, CodecError> {
        Ok(Self {
            slot: fields.uint("slot")?,
            parent_hash: fields.fixed("parent_hash")?,
            block_hash: fields.fixed("block_hash")?,
            builder_pubkey: fields.fixed("builder_pubkey")?,
            proposer_pubkey: fields.fixed("proposer_pubkey")?,
            proposer_fee_recipient: fields.address("proposer_fee_recipient")?,
            gas_limit: fields.uint("gas_limit")?,
            gas_used: fields.uint("gas_used")?,
            value: fields.big_uint("value")?,
        })
    }
}

impl JsonCodec for BidTrace {
    const SCHEMA: &'static [FieldSpec] = BID_TRACE_FIELDS;

    fn from_fields(mut fields: DecodedFields) -> Result<Self, CodecError> {
        Self::take_from(&mut fields)
    }

    fn wire_values(&self) -> Vec<WireValue<'_>> {
        vec![
            WireValue::Uint(self.slot),
            WireValue::Bytes(self.parent_hash.as_slice()),
            WireValue::Bytes(self.block_hash.as_slice()),
            WireValue::Bytes(self.builder_pubkey.as_slice()),
            WireValue::Bytes(self.proposer_pubkey.as_slice()),
            WireValue::Bytes(self.proposer_fee_recipient.as_slice()),
            WireValue::Uint(self.gas_limit),
            WireValue::Uint(self.gas_used),
            WireValue::BigUint(&self.value),
        ]
    }
}

/// A bid trace together with the time the relay received it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BidTraceWithTimestamp {
    pub trace: BidTrace,
    pub block_number: Option<u64>,
    pub num_tx: Option<u64>,
    /// Receive time, seconds since the Unix epoch
    pub timestamp: u64,
    /// Receive time, milliseconds since the Unix epoch
    pub timestamp_ms: Option<u64>,
}

impl BidTraceWithTimestamp {
    /// Receive time, at millisecond precision when the relay supplied it
    pub fn received_at(&self) -> Option<DateTime<Utc>> {
        match self.timestamp_ms {
            Some(ms) => DateTime::from_timestamp_millis(i64::try_from(ms).ok()?),
            None => DateTime::from_timestamp(i64::try_from(self.timestamp).ok()?, 0),
        }
    }
}

impl JsonCodec for BidTraceWithTimestamp {
    const SCHEMA: &'static [FieldSpec] = BID_TRACE_WITH_TIMESTAMP_FIELDS;

    fn from_fields(mut fields: DecodedFields) -> Result<Self, CodecError> {
        Ok(Self {
            trace: BidTrace::take_from(&mut fields)?,
            block_number: fields.opt_uint("block_number")?,
            num_tx: fields.opt_uint("num_tx")?,
            timestamp: fields.uint("timestamp")?,
            timestamp_ms: fields.opt_uint("timestamp_ms")?,
        })
    }

    fn wire_values(&self) -> Vec<WireValue<'_>> {
        let mut values = self.trace.wire_values();
        values.extend([
            WireValue::opt_uint(self.block_number),
            WireValue::opt_uint(self.num_tx),
            WireValue::Uint(self.timestamp),
            WireValue::opt_uint(self.timestamp_ms),
        ]);
        values
    }
}

serde_via_codec!(BidTrace, BidTraceWithTimestamp);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode_list;
    use crate::error::ErrorKind;
    use serde_json::Value;

    const GOOD: &str = r#"{"slot":"3939006","parent_hash":"0x6cd0618e3e13b751506264263b09979e461e35dec0dfbac20d81ece99a43b9dc","block_hash":"0x4c4f7e0a46a4f8b010bc7f899c949b5b9c0c58d510b6a5b46eda48d796a469ed","builder_pubkey":"0xa1dead01e65f0a0eee7b5170223f20c8f0cbf122eac3324d61afbdb33a8885ff8cab2ef514ac2c7698ae0d6289ef27fc","proposer_pubkey":"0x897d53adc5f6993166720dd365f924c0400a61be59cb53589009b8c3ba571032ca319de34e0459f6fcc8734e35a84fd0","proposer_fee_recipient":"0x32a6bcae2dd28f85555467d85600f4ecc8172808","gas_limit":"30000000","gas_used":"12077817","value":"34682404831419603"}"#;

    const BYTE_FIELDS: &[(&str, &str)] = &[
        ("parent_hash", "parent hash"),
        ("block_hash", "block hash"),
        ("builder_pubkey", "builder pubkey"),
        ("proposer_pubkey", "proposer pubkey"),
        ("proposer_fee_recipient", "proposer fee recipient"),
    ];

    fn good_object() -> serde_json::Map<String, Value> {
        match serde_json::from_str(GOOD).unwrap() {
            Value::Object(object) => object,
            _ => unreachable!(),
        }
    }

    fn with_field(key: &str, value: Value) -> Vec<u8> {
        let mut object = good_object();
        object.insert(key.to_string(), value);
        serde_json::to_vec(&Value::Object(object)).unwrap()
    }

    fn decode_err(input: &[u8]) -> CodecError {
        BidTrace::from_json(input).unwrap_err()
    }

    #[test]
    fn test_round_trip() {
        let trace = BidTrace::from_json(GOOD.as_bytes()).unwrap();
        assert_eq!(trace.slot, 3939006);
        assert_eq!(trace.gas_limit, 30_000_000);
        assert_eq!(trace.gas_used, 12_077_817);
        assert_eq!(trace.value, BigUint::from(34682404831419603u64));
        assert_eq!(trace.to_json(), GOOD);
        assert_eq!(serde_json::to_string(&trace).unwrap(), GOOD);
        assert_eq!(trace.to_string(), GOOD);
    }

    #[test]
    fn test_value_beyond_256_bits() {
        let two_pow_256 = "115792089237316195423570985008687907853269984665640564039457584007913129639936";
        let input = with_field("value", Value::String(two_pow_256.to_string()));
        let trace = BidTrace::from_json(&input).unwrap();
        assert_eq!(trace.value, BigUint::from(1u8) << 256);
        assert_eq!(trace.value.to_string(), two_pow_256);

        let encoded = trace.to_json();
        assert!(encoded.ends_with(&format!(r#""value":"{two_pow_256}"}}"#)));
        assert_eq!(BidTrace::from_json(encoded.as_bytes()).unwrap(), trace);
    }

    #[test]
    fn test_empty_and_bad_envelope() {
        assert_eq!(decode_err(b"").kind(), ErrorKind::MalformedEnvelope);
        let err = decode_err(b"[]");
        assert_eq!(err.kind(), ErrorKind::MalformedEnvelope);
        assert!(err.to_string().starts_with("invalid JSON: "));
    }

    #[test]
    fn test_missing_field_is_reported_in_declaration_order() {
        for (index, spec) in BID_TRACE_FIELDS.iter().enumerate() {
            // Only the fields declared before this one are present.
            let mut object = good_object();
            for later in &BID_TRACE_FIELDS[index..] {
                object.remove(later.key);
            }
            let input = serde_json::to_vec(&Value::Object(object)).unwrap();
            assert_eq!(decode_err(&input).to_string(), format!("{} missing", spec.name));

            // Empty strings count as missing too.
            let input = with_field(spec.key, Value::String(String::new()));
            assert_eq!(decode_err(&input).to_string(), format!("{} missing", spec.name));
        }
    }

    #[test]
    fn test_slot_missing_exact_message() {
        let mut object = good_object();
        object.remove("slot");
        let input = serde_json::to_vec(&Value::Object(object)).unwrap();
        assert_eq!(decode_err(&input).to_string(), "slot missing");
    }

    #[test]
    fn test_wrong_json_type_is_malformed_envelope() {
        for spec in BID_TRACE_FIELDS {
            let err = decode_err(&with_field(spec.key, Value::Bool(true)));
            assert_eq!(err.kind(), ErrorKind::MalformedEnvelope, "field {}", spec.key);
            assert!(err.to_string().contains(spec.key));
        }
    }

    #[test]
    fn test_numeric_fields_reject_negative_and_non_numeric() {
        for (key, name) in [("slot", "slot"), ("gas_limit", "gas limit"), ("gas_used", "gas used"), ("value", "value")] {
            for bad in ["-1", "true"] {
                let err = decode_err(&with_field(key, Value::String(bad.to_string())));
                assert_eq!(err.kind(), ErrorKind::InvalidValue, "{key}={bad}");
                assert!(err.to_string().starts_with(&format!("invalid value for {name}: ")));
            }
        }
    }

    #[test]
    fn test_byte_fields_reject_wrong_length() {
        let object = good_object();
        for (key, name) in BYTE_FIELDS {
            let good = object[*key].as_str().unwrap();
            let short = &good[..good.len() - 2];
            let long = format!("{good}00");
            for bad in [short.to_string(), long] {
                let err = decode_err(&with_field(key, Value::String(bad)));
                assert_eq!(err.to_string(), format!("incorrect length for {name}"));
            }
        }
    }

    #[test]
    fn test_fee_recipient_19_bytes() {
        let input = with_field(
            "proposer_fee_recipient",
            Value::String("0x32a6bcae2dd28f85555467d85600f4ecc81728".to_string()),
        );
        assert_eq!(decode_err(&input).to_string(), "incorrect length for proposer fee recipient");
    }

    #[test]
    fn test_byte_fields_reject_non_hex() {
        for (key, name) in BYTE_FIELDS {
            let err = decode_err(&with_field(key, Value::String("invalid!".to_string())));
            assert_eq!(err.kind(), ErrorKind::InvalidValue);
            assert_eq!(
                err.to_string(),
                format!("invalid value for {name}: Invalid character 'i' at position 0")
            );
        }
    }

    #[test]
    fn test_hex_prefix_is_optional_on_decode() {
        let unprefixed = GOOD.replace("\"0x6cd0", "\"6cd0");
        let trace = BidTrace::from_json(unprefixed.as_bytes()).unwrap();
        assert_eq!(trace.to_json(), GOOD);
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let input = with_field("optimistic_submission", Value::Bool(false));
        assert!(BidTrace::from_json(&input).is_ok());
    }

    #[test]
    fn test_list_decoding() {
        let traces: Vec<BidTrace> = decode_list(format!("[{GOOD},{GOOD}]").as_bytes()).unwrap();
        assert_eq!(traces.len(), 2);
        assert!(decode_list::<BidTrace>(b"[]").unwrap().is_empty());
        assert_eq!(decode_list::<BidTrace>(b"{}").unwrap_err().kind(), ErrorKind::MalformedEnvelope);
        assert_eq!(
            decode_list::<BidTrace>(b"[{}]").unwrap_err().to_string(),
            "slot missing"
        );
        let via_serde: Vec<BidTrace> = serde_json::from_str(&format!("[{GOOD}]")).unwrap();
        assert_eq!(via_serde[0], traces[0]);
    }

    #[test]
    fn test_with_timestamp_round_trip() {
        let input = format!(
            "{},\"block_number\":\"17000000\",\"num_tx\":\"120\",\"timestamp\":\"1666000000\",\"timestamp_ms\":\"1666000000123\"}}",
            &GOOD[..GOOD.len() - 1]
        );
        let received = BidTraceWithTimestamp::from_json(input.as_bytes()).unwrap();
        assert_eq!(received.trace.slot, 3939006);
        assert_eq!(received.num_tx, Some(120));
        assert_eq!(received.to_json(), input);
        assert_eq!(received.received_at().unwrap().timestamp_millis(), 1_666_000_000_123);
    }

    #[test]
    fn test_with_timestamp_optional_fields() {
        let input = format!("{},\"timestamp\":\"1666000000\"}}", &GOOD[..GOOD.len() - 1]);
        let received = BidTraceWithTimestamp::from_json(input.as_bytes()).unwrap();
        assert_eq!(received.block_number, None);
        assert_eq!(received.timestamp_ms, None);
        assert_eq!(received.to_json(), input);
        assert_eq!(received.received_at().unwrap().timestamp(), 1_666_000_000);

        let err = BidTraceWithTimestamp::from_json(GOOD.as_bytes()).unwrap_err();
        assert_eq!(err.to_string(), "timestamp missing");
    }
}
