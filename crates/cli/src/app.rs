//! Relay queries driven from the command line

use anyhow::{Context, Result};
use config::Config;
use relay_client::{OperationMonitor, RelayClient, TracingMonitor};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::info;
use types::{JsonCodec, RelayEndpoint, Slot};

/// A single data API query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    DeliveredBidTrace(Slot),
    ReceivedBidTraces(Slot),
    QueuedProposers,
}

/// Result of one query against one relay
#[derive(Debug)]
pub struct RelayOutcome {
    pub relay: String,
    pub result: types::Result<Value>,
}

impl RelayOutcome {
    pub fn to_json(&self) -> Value {
        match &self.result {
            Ok(value) => json!({ "relay": self.relay, "result": value }),
            Err(err) => json!({ "relay": self.relay, "error": err.to_string() }),
        }
    }
}

/// Clients for the relays selected on the command line
pub struct Application {
    clients: Vec<RelayClient>,
}

impl Application {
    /// Build clients for one named relay, or every enabled relay
    pub fn new(config: &Config, relay: Option<&str>) -> Result<Self> {
        let endpoints: Vec<RelayEndpoint> = match relay {
            Some(name) => vec![config
                .relay_endpoint(name)
                .with_context(|| format!("No enabled relay named {name}"))?],
            None => config
                .to_relay_endpoints()
                .into_iter()
                .filter(|endpoint| endpoint.enabled)
                .collect(),
        };

        let monitor: Arc<dyn OperationMonitor> = Arc::new(TracingMonitor);
        let clients = endpoints
            .into_iter()
            .map(|endpoint| RelayClient::new(endpoint).map(|client| client.with_monitor(monitor.clone())))
            .collect::<types::Result<Vec<_>>>()
            .context("Failed to create relay client")?;

        info!(relays = clients.len(), "Relay clients initialized");
        Ok(Self { clients })
    }

    /// Run the query against every relay concurrently, in configuration order
    pub async fn run(&self, query: Query) -> Result<Vec<RelayOutcome>> {
        let mut tasks = JoinSet::new();
        for (index, client) in self.clients.iter().cloned().enumerate() {
            tasks.spawn(async move {
                let outcome = RelayOutcome {
                    relay: client.name().to_string(),
                    result: execute(&client, query).await,
                };
                (index, outcome)
            });
        }

        let mut outcomes = Vec::with_capacity(self.clients.len());
        while let Some(joined) = tasks.join_next().await {
            outcomes.push(joined.context("Relay query task failed")?);
        }
        outcomes.sort_by_key(|(index, _)| *index);

        Ok(outcomes.into_iter().map(|(_, outcome)| outcome).collect())
    }
}

async fn execute(client: &RelayClient, query: Query) -> types::Result<Value> {
    let value = match query {
        Query::DeliveredBidTrace(slot) => client
            .delivered_bid_trace(slot)
            .await?
            .map_or(Value::Null, |trace| trace.to_value()),
        Query::ReceivedBidTraces(slot) => {
            Value::Array(client.received_bid_traces(slot).await?.iter().map(JsonCodec::to_value).collect())
        }
        Query::QueuedProposers => {
            Value::Array(client.queued_proposers().await?.iter().map(JsonCodec::to_value).collect())
        }
    };
    Ok(value)
}
