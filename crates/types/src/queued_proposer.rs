//! Proposers queued to obtain a blinded block from the relay

use crate::codec::{decode_record, serde_via_codec, DecodedFields, FieldKind, FieldSpec, JsonCodec, WireValue};
use crate::error::CodecError;
use crate::primitives::Slot;
use crate::registration::SignedValidatorRegistration;

/// A proposer scheduled for an upcoming slot and its registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedProposer {
    pub slot: Slot,
    pub entry: SignedValidatorRegistration,
}

impl JsonCodec for QueuedProposer {
    const SCHEMA: &'static [FieldSpec] = &[
        FieldSpec::required("slot", "slot", FieldKind::Uint),
        FieldSpec::required("entry", "entry", FieldKind::Record(decode_record::<SignedValidatorRegistration>)),
    ];

    fn from_fields(mut fields: DecodedFields) -> Result<Self, CodecError> {
        Ok(Self {
            slot: fields.uint("slot")?,
            entry: fields.record("entry")?,
        })
    }

    fn wire_values(&self) -> Vec<WireValue<'_>> {
        vec![WireValue::Uint(self.slot), WireValue::Record(self.entry.to_value())]
    }
}

serde_via_codec!(QueuedProposer);
