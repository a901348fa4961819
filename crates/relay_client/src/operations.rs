//! Relay data API operations

use crate::client::RelayClient;
use crate::traits::{DeliveredBidTraceProvider, QueuedProposersProvider, ReceivedBidTracesProvider, RelayService};
use async_trait::async_trait;
use std::time::Instant;
use tracing::{info, trace};
use types::error::RelayError;
use types::{
    decode_list, BidTrace, BidTraceWithTimestamp, BlsPublicKey, ContentType, JsonCodec, QueuedProposer, Result, Slot,
};

pub const DELIVERED_BID_TRACE: &str = "delivered bid trace";
pub const RECEIVED_BID_TRACES: &str = "received bid traces";
pub const QUEUED_PROPOSERS: &str = "queued proposers";

impl RelayClient {
    /// Bid trace of the payload delivered for `slot`, `None` if there was none
    pub async fn delivered_bid_trace(&self, slot: Slot) -> Result<Option<BidTrace>> {
        let endpoint = format!("/relay/v1/data/bidtraces/proposer_payload_delivered?slot={slot}");
        let traces: Vec<BidTrace> = self.observe(DELIVERED_BID_TRACE, &endpoint).await?;

        let trace = traces.into_iter().next();
        info!(relay = %self.name(), slot, delivered = trace.is_some(), "Obtained delivered bid trace");
        Ok(trace)
    }

    /// Every bid the relay received for `slot`
    pub async fn received_bid_traces(&self, slot: Slot) -> Result<Vec<BidTraceWithTimestamp>> {
        let endpoint = format!("/relay/v1/data/bidtraces/builder_blocks_received?slot={slot}");
        let traces: Vec<BidTraceWithTimestamp> = self.observe(RECEIVED_BID_TRACES, &endpoint).await?;

        info!(relay = %self.name(), slot, count = traces.len(), "Obtained received bid traces");
        Ok(traces)
    }

    /// Proposers currently queued to obtain a blinded block
    pub async fn queued_proposers(&self) -> Result<Vec<QueuedProposer>> {
        let proposers: Vec<QueuedProposer> = self.observe(QUEUED_PROPOSERS, "/relay/v1/builder/validators").await?;

        info!(relay = %self.name(), count = proposers.len(), "Obtained queued proposers");
        Ok(proposers)
    }

    /// Fetch a list and report the outcome to the monitor exactly once
    async fn observe<T: JsonCodec>(&self, operation: &'static str, endpoint: &str) -> Result<Vec<T>> {
        let started = Instant::now();
        let result = self.fetch_list(operation, endpoint).await;
        self.monitor
            .operation_completed(self.address(), operation, result.is_ok(), started.elapsed());
        result
    }

    async fn fetch_list<T: JsonCodec>(&self, operation: &'static str, endpoint: &str) -> Result<Vec<T>> {
        let response = match self.get(endpoint).await {
            Ok(Some(response)) => response,
            Ok(None) => {
                return Err(RelayError::NoResponse {
                    relay: self.name().to_string(),
                    operation,
                })
            }
            Err(err) => {
                trace!(url = endpoint, error = %err, "Request failed");
                return Err(RelayError::Request {
                    operation,
                    source: Box::new(err),
                });
            }
        };

        match response.content_type {
            ContentType::Json => decode_list(&response.body).map_err(|source| RelayError::Decode {
                relay: self.name().to_string(),
                operation,
                source,
            }),
            content_type => Err(RelayError::UnsupportedContentType {
                relay: self.name().to_string(),
                content_type,
            }),
        }
    }
}

impl RelayService for RelayClient {
    fn name(&self) -> &str {
        RelayClient::name(self)
    }

    fn address(&self) -> &str {
        RelayClient::address(self)
    }

    fn pubkey(&self) -> Option<&BlsPublicKey> {
        RelayClient::pubkey(self)
    }
}

#[async_trait]
impl DeliveredBidTraceProvider for RelayClient {
    async fn delivered_bid_trace(&self, slot: Slot) -> Result<Option<BidTrace>> {
        RelayClient::delivered_bid_trace(self, slot).await
    }
}

#[async_trait]
impl ReceivedBidTracesProvider for RelayClient {
    async fn received_bid_traces(&self, slot: Slot) -> Result<Vec<BidTraceWithTimestamp>> {
        RelayClient::received_bid_traces(self, slot).await
    }
}

#[async_trait]
impl QueuedProposersProvider for RelayClient {
    async fn queued_proposers(&self) -> Result<Vec<QueuedProposer>> {
        RelayClient::queued_proposers(self).await
    }
}
