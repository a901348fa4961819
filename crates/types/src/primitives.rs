//! Fixed-size primitives used by relay records

use alloy::primitives::{FixedBytes, B256};

/// Sequential block-proposal slot number
pub type Slot = u64;

/// 32-byte block or parent hash
pub type Hash32 = B256;

/// Compressed 48-byte BLS public key
pub type BlsPublicKey = FixedBytes<48>;

/// Compressed 96-byte BLS signature
pub type BlsSignature = FixedBytes<96>;
