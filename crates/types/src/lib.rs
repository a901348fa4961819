//! Shared types for the relay data client
//!
//! This crate contains the relay records, their canonical JSON codec and the
//! error types shared by the client components.

pub mod bid_trace;
pub mod codec;
pub mod content_type;
pub mod error;
pub mod primitives;
pub mod queued_proposer;
pub mod registration;
pub mod relay;
pub mod utils;

// Re-export commonly used types
pub use bid_trace::{BidTrace, BidTraceWithTimestamp};
pub use codec::{decode_list, FieldKind, FieldSpec, JsonCodec};
pub use content_type::ContentType;
pub use error::{CodecError, ConfigError, ContentTypeError, ErrorKind, RelayError, Result, ValueError};
pub use primitives::{BlsPublicKey, BlsSignature, Hash32, Slot};
pub use queued_proposer::QueuedProposer;
pub use registration::{SignedValidatorRegistration, ValidatorRegistration};
pub use relay::RelayEndpoint;
