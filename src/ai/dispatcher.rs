//! Dispatcher
//!
//! Resolves the adapter for a [`ProviderDefinition`] and runs one vendor call
//! on its own task, bounded by the snapshot timeout. No retries here: a
//! failed call is reported to the caller, which decides about fallback.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use super::provider::{AdapterRegistry, AdapterRequest, SharedAdapter};
use super::timeout::spawn_with_timeout;
use crate::config::ConfigSnapshot;
use crate::routing::ProviderDefinition;
use crate::types::{ResponsePayload, Result, VendorError, VoxError};

#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: AdapterRegistry,
}

impl Dispatcher {
    pub fn new(registry: AdapterRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    /// Adapter registered under the definition's name
    pub fn adapter_for(&self, definition: &ProviderDefinition) -> Result<SharedAdapter> {
        self.registry.get(&definition.name).ok_or_else(|| {
            VoxError::DispatchFailure(VendorError::misconfigured(
                format!("no adapter registered for '{}'", definition.name),
                definition.name.as_str(),
            ))
        })
    }

    /// Run one vendor call under `snapshot.selection.timeout`
    #[instrument(skip(self, question, definition, snapshot), fields(provider = %definition.name))]
    pub async fn dispatch(
        &self,
        question: &str,
        definition: ProviderDefinition,
        snapshot: Arc<ConfigSnapshot>,
    ) -> Result<ResponsePayload> {
        let timeout = snapshot.selection.timeout;
        self.dispatch_within(question, definition, snapshot, timeout)
            .await
    }

    /// Run one vendor call under an explicit budget
    pub async fn dispatch_within(
        &self,
        question: &str,
        definition: ProviderDefinition,
        snapshot: Arc<ConfigSnapshot>,
        timeout: Duration,
    ) -> Result<ResponsePayload> {
        let adapter = self.adapter_for(&definition)?;
        let provider = definition.name.clone();
        let token = CancellationToken::new();

        let mut request = AdapterRequest::new(question, definition, snapshot);
        request.cancel = token.clone();

        debug!(adapter = adapter.name(), timeout_ms = timeout.as_millis() as u64, "Dispatching");
        spawn_with_timeout(
            timeout,
            token,
            async move {
                adapter
                    .complete(&request)
                    .await
                    .map_err(VoxError::DispatchFailure)
            },
            &provider,
        )
        .await
    }
}
