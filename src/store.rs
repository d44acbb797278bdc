// Copyright 2025 Cowboy AI, LLC.

//! Flow store trait and in-memory implementation
//!
//! The remote platform is an opaque collaborator: it accepts a descriptor
//! and returns an assigned identifier, and returns a previously stored
//! descriptor by identifier. The only guarantee the composer relies on is
//! that round-tripping through the store preserves the descriptor's
//! canonical text exactly.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::flow::Flow;

/// Errors that can occur when talking to a flow store
#[derive(Debug, thiserror::Error)]
pub enum FlowStoreError {
    /// No flow is stored under the identifier
    #[error("Flow not found: {0}")]
    NotFound(FlowId),

    /// A flow with the same name is already stored
    #[error("Flow name already taken: {0}")]
    DuplicateName(String),

    /// The descriptor could not be serialized for transport
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The backing service failed
    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Identifier assigned to an uploaded flow
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub struct FlowId(u64);

impl FlowId {
    /// Wrap a raw identifier
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw identifier
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for FlowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Receipt returned by a successful upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct UploadReceipt {
    /// Identifier assigned by the store
    pub flow_id: FlowId,
    /// Unique receipt identifier for this upload
    pub receipt_id: Uuid,
    /// When the store accepted the descriptor
    pub uploaded_at: DateTime<Utc>,
}

/// Remote flow store seam
///
/// Implementations are expected to be opaque synchronous-looking network
/// calls with their own retry and timeout policy; the composer never calls
/// the store itself.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FlowStore: Send + Sync {
    /// Store a descriptor and return the assigned identifier
    async fn upload(&self, flow: &Flow) -> Result<UploadReceipt, FlowStoreError>;

    /// Fetch a previously stored descriptor
    async fn get(&self, id: FlowId) -> Result<Flow, FlowStoreError>;

    /// Look up a stored flow by exact name
    async fn find_by_name(&self, name: &str) -> Result<Option<FlowId>, FlowStoreError>;
}

/// Upload a descriptor unless one with the same name is already stored
///
/// Returns the existing identifier on a name hit, mirroring the duplicate
/// avoidance the remote platform applies server-side.
pub async fn upload_or_reuse(
    store: &dyn FlowStore,
    flow: &Flow,
) -> Result<FlowId, FlowStoreError> {
    if let Some(existing) = store.find_by_name(&flow.name).await? {
        debug!(name = %flow.name, id = %existing, "reusing stored flow");
        return Ok(existing);
    }
    let receipt = store.upload(flow).await?;
    Ok(receipt.flow_id)
}

/// In-memory flow store
///
/// Stores descriptors by value under sequential identifiers. Optionally
/// rejects duplicate names the way the remote platform does.
#[derive(Debug, Default)]
pub struct InMemoryFlowStore {
    flows: RwLock<BTreeMap<u64, Flow>>,
    next_id: AtomicU64,
    reject_duplicate_names: bool,
}

impl InMemoryFlowStore {
    /// Create an empty store accepting duplicate names
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store that rejects duplicate flow names
    pub fn rejecting_duplicates() -> Self {
        Self {
            reject_duplicate_names: true,
            ..Self::default()
        }
    }

    /// Number of stored flows
    pub async fn len(&self) -> usize {
        self.flows.read().await.len()
    }

    /// True when nothing is stored
    pub async fn is_empty(&self) -> bool {
        self.flows.read().await.is_empty()
    }
}

#[async_trait]
impl FlowStore for InMemoryFlowStore {
    async fn upload(&self, flow: &Flow) -> Result<UploadReceipt, FlowStoreError> {
        let mut flows = self.flows.write().await;
        if self.reject_duplicate_names && flows.values().any(|f| f.name == flow.name) {
            return Err(FlowStoreError::DuplicateName(flow.name.clone()));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        flows.insert(id, flow.clone());
        debug!(name = %flow.name, id, "stored flow");
        Ok(UploadReceipt {
            flow_id: FlowId(id),
            receipt_id: Uuid::new_v4(),
            uploaded_at: Utc::now(),
        })
    }

    async fn get(&self, id: FlowId) -> Result<Flow, FlowStoreError> {
        self.flows
            .read()
            .await
            .get(&id.0)
            .cloned()
            .ok_or(FlowStoreError::NotFound(id))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<FlowId>, FlowStoreError> {
        Ok(self
            .flows
            .read()
            .await
            .iter()
            .find(|(_, f)| f.name == name)
            .map(|(id, _)| FlowId(*id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::compose;
    use crate::registry::AlgorithmRegistry;
    use pretty_assertions::assert_eq;

    fn sample_flow() -> Flow {
        let registry = AlgorithmRegistry::with_catalog();
        let instance = registry.instantiate("learn.meta.Bagging").unwrap();
        compose(&instance, &["cim-flow".to_string()]).unwrap()
    }

    /// Test upload then get preserves the canonical text exactly
    #[tokio::test]
    async fn test_round_trip_preserves_canonical_text() {
        let store = InMemoryFlowStore::new();
        let flow = sample_flow();

        let receipt = store.upload(&flow).await.unwrap();
        let downloaded = store.get(receipt.flow_id).await.unwrap();

        assert_eq!(
            downloaded.canonical_text().unwrap(),
            flow.canonical_text().unwrap()
        );
    }

    /// Test identifiers are assigned sequentially
    #[tokio::test]
    async fn test_sequential_ids() {
        let store = InMemoryFlowStore::new();
        let flow = sample_flow();

        let first = store.upload(&flow).await.unwrap();
        let second = store.upload(&flow).await.unwrap();
        assert_eq!(first.flow_id.value() + 1, second.flow_id.value());
        assert_ne!(first.receipt_id, second.receipt_id);
        assert_eq!(store.len().await, 2);
    }

    /// Test missing identifiers are reported
    #[tokio::test]
    async fn test_get_missing() {
        let store = InMemoryFlowStore::new();
        let err = store.get(FlowId::new(42)).await.unwrap_err();
        assert!(matches!(err, FlowStoreError::NotFound(id) if id.value() == 42));
    }

    /// Test duplicate names are rejected when configured
    #[tokio::test]
    async fn test_duplicate_names_rejected() {
        let store = InMemoryFlowStore::rejecting_duplicates();
        let flow = sample_flow();

        store.upload(&flow).await.unwrap();
        let err = store.upload(&flow).await.unwrap_err();
        assert!(matches!(err, FlowStoreError::DuplicateName(_)));
    }

    /// Test find_by_name hits and misses
    #[tokio::test]
    async fn test_find_by_name() {
        let store = InMemoryFlowStore::new();
        let flow = sample_flow();

        assert!(store.find_by_name(&flow.name).await.unwrap().is_none());
        let receipt = store.upload(&flow).await.unwrap();
        assert_eq!(
            store.find_by_name(&flow.name).await.unwrap(),
            Some(receipt.flow_id)
        );
    }

    /// Test upload_or_reuse short-circuits on a name hit
    #[tokio::test]
    async fn test_upload_or_reuse_with_mock() {
        let flow = sample_flow();

        let mut mock = MockFlowStore::new();
        let existing = FlowId::new(7);
        mock.expect_find_by_name()
            .returning(move |_| Ok(Some(existing)));
        mock.expect_upload().times(0);

        let id = upload_or_reuse(&mock, &flow).await.unwrap();
        assert_eq!(id, existing);
    }

    /// Test upload_or_reuse uploads on a name miss and surfaces errors
    #[tokio::test]
    async fn test_upload_or_reuse_uploads_on_miss() {
        let flow = sample_flow();

        let mut mock = MockFlowStore::new();
        mock.expect_find_by_name().returning(|_| Ok(None));
        mock.expect_upload()
            .returning(|_| Err(FlowStoreError::Backend("connection reset".to_string())));

        let err = upload_or_reuse(&mock, &flow).await.unwrap_err();
        assert!(matches!(err, FlowStoreError::Backend(_)));
    }
}
