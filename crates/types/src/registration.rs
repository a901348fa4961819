//! Validator registrations as published by the builder API

use crate::codec::{decode_record, serde_via_codec, DecodedFields, FieldKind, FieldSpec, JsonCodec, WireValue};
use crate::error::CodecError;
use crate::primitives::{BlsPublicKey, BlsSignature};
use alloy::primitives::Address;

/// A validator's preferences for blocks built on its behalf
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorRegistration {
    pub fee_recipient: Address,
    pub gas_limit: u64,
    pub timestamp: u64,
    pub pubkey: BlsPublicKey,
}

impl JsonCodec for ValidatorRegistration {
    const SCHEMA: &'static [FieldSpec] = &[
        FieldSpec::required("fee_recipient", "fee recipient", FieldKind::ChecksumAddress),
        FieldSpec::required("gas_limit", "gas limit", FieldKind::Uint),
        FieldSpec::required("timestamp", "timestamp", FieldKind::Uint),
        FieldSpec::required("pubkey", "public key", FieldKind::Bytes(48)),
    ];

    fn from_fields(mut fields: DecodedFields) -> Result<Self, CodecError> {
        Ok(Self {
            fee_recipient: fields.address("fee_recipient")?,
            gas_limit: fields.uint("gas_limit")?,
            timestamp: fields.uint("timestamp")?,
            pubkey: fields.fixed("pubkey")?,
        })
    }

    fn wire_values(&self) -> Vec<WireValue<'_>> {
        vec![
            WireValue::Bytes(self.fee_recipient.as_slice()),
            WireValue::Uint(self.gas_limit),
            WireValue::Uint(self.timestamp),
            WireValue::Bytes(self.pubkey.as_slice()),
        ]
    }
}

/// A validator registration with the validator's BLS signature over it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedValidatorRegistration {
    pub message: ValidatorRegistration,
    pub signature: BlsSignature,
}

impl JsonCodec for SignedValidatorRegistration {
    const SCHEMA: &'static [FieldSpec] = &[
        FieldSpec::required("message", "message", FieldKind::Record(decode_record::<ValidatorRegistration>)),
        FieldSpec::required("signature", "signature", FieldKind::Bytes(96)),
    ];

    fn from_fields(mut fields: DecodedFields) -> Result<Self, CodecError> {
        Ok(Self {
            message: fields.record("message")?,
            signature: fields.fixed("signature")?,
        })
    }

    fn wire_values(&self) -> Vec<WireValue<'_>> {
        vec![
            WireValue::Record(self.message.to_value()),
            WireValue::Bytes(self.signature.as_slice()),
        ]
    }
}

serde_via_codec!(ValidatorRegistration, SignedValidatorRegistration);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const GOOD: &str = r#"{"message":{"fee_recipient":"0x388Ea662EF2c223eC0B047D41Bf3c0f362142ad5","gas_limit":"30000000","timestamp":"1663144444","pubkey":"0xa35e34e6aff03a0e37e0aeeeb2629ba3b503b285ddc75ff2ef8dc854653d833af289f0458cd614e3906ec5e9627b31db"},"signature":"0xb735529068b64c24c7650b08ddb09d543b79030888801176d2708f0e0c863a965fc1ba03f8fb14e5b3b486386e1f147b13848c218e143b513886a0f210c096bd03077fcac658c39402f2ca9075422a6df6b54f17f4141334239f9f9ff8137be0"}"#;

    #[test]
    fn test_round_trip_keeps_checksum_case() {
        let registration = SignedValidatorRegistration::from_json(GOOD.as_bytes()).unwrap();
        assert_eq!(registration.message.gas_limit, 30_000_000);
        assert_eq!(registration.message.timestamp, 1_663_144_444);
        assert_eq!(registration.to_json(), GOOD);
    }

    #[test]
    fn test_fee_recipient_case_insensitive_on_decode() {
        let lower = GOOD.replace(
            "0x388Ea662EF2c223eC0B047D41Bf3c0f362142ad5",
            "0x388ea662ef2c223ec0b047d41bf3c0f362142ad5",
        );
        let registration = SignedValidatorRegistration::from_json(lower.as_bytes()).unwrap();
        assert_eq!(registration.to_json(), GOOD);
    }

    #[test]
    fn test_message_errors_are_nested() {
        let err = SignedValidatorRegistration::from_json(br#"{"message":{}}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Nested);
        assert_eq!(err.to_string(), "invalid JSON: fee recipient missing");

        let err = SignedValidatorRegistration::from_json(br#"{}"#).unwrap_err();
        assert_eq!(err.to_string(), "message missing");
    }

    #[test]
    fn test_signature_length() {
        let short = GOOD.replace("7be0\"}", "7b\"}");
        let err = SignedValidatorRegistration::from_json(short.as_bytes()).unwrap_err();
        assert_eq!(err.to_string(), "incorrect length for signature");
    }
}
