//! Capabilities a relay data source can provide

use async_trait::async_trait;
use types::{BidTrace, BidTraceWithTimestamp, BlsPublicKey, QueuedProposer, Result, Slot};

/// Identity of a relay connection
pub trait RelayService: Send + Sync {
    /// Configured name of the relay
    fn name(&self) -> &str;

    /// Address of the relay as configured
    fn address(&self) -> &str;

    /// Public key of the relay, if the address carries one
    fn pubkey(&self) -> Option<&BlsPublicKey>;
}

/// Provides the bid trace of the payload delivered for a slot
#[async_trait]
pub trait DeliveredBidTraceProvider: RelayService {
    /// `None` when the relay delivered no payload for the slot
    async fn delivered_bid_trace(&self, slot: Slot) -> Result<Option<BidTrace>>;
}

/// Provides the bids a relay received for a slot
#[async_trait]
pub trait ReceivedBidTracesProvider: RelayService {
    async fn received_bid_traces(&self, slot: Slot) -> Result<Vec<BidTraceWithTimestamp>>;
}

/// Provides the proposers queued to obtain a blinded block
#[async_trait]
pub trait QueuedProposersProvider: RelayService {
    async fn queued_proposers(&self) -> Result<Vec<QueuedProposer>>;
}
