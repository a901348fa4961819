//! Operation monitoring hooks

use std::fmt::Debug;
use std::time::Duration;

/// Receives one callback per completed relay operation
///
/// Implementations are called inline on the request path and must not block.
pub trait OperationMonitor: Debug + Send + Sync {
    /// Record the outcome of an operation against a relay address
    fn operation_completed(&self, relay: &str, operation: &str, succeeded: bool, elapsed: Duration);
}

/// Monitor that discards every observation
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMonitor;

impl OperationMonitor for NoopMonitor {
    fn operation_completed(&self, _relay: &str, _operation: &str, _succeeded: bool, _elapsed: Duration) {}
}

/// Monitor that emits a structured `tracing` event per operation
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMonitor;

impl OperationMonitor for TracingMonitor {
    fn operation_completed(&self, relay: &str, operation: &str, succeeded: bool, elapsed: Duration) {
        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        if succeeded {
            tracing::info!(relay, operation, elapsed_ms, "Relay operation succeeded");
        } else {
            tracing::warn!(relay, operation, elapsed_ms, "Relay operation failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_monitor_handles_extreme_durations() {
        let monitor = TracingMonitor;
        monitor.operation_completed("https://relay.example.com", "queued proposers", true, Duration::ZERO);
        monitor.operation_completed("https://relay.example.com", "queued proposers", false, Duration::MAX);
    }
}
