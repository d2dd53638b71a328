use serde_json::Value;
use tokio::sync::mpsc;
use tracing::instrument;

use super::{DocKey, Hit, IndexRequest, SearchQuery};
use crate::error::StoreError;
use crate::transport::{RemoteChannel, RetryPolicy};

/// Handle to an [`IndexActor`](super::IndexActor). Every operation is
/// idempotent, so all of them go through the bounded retry path.
#[derive(Clone)]
pub struct IndexClient {
    channel: RemoteChannel<IndexRequest>,
}

impl IndexClient {
    pub fn new(sender: mpsc::Sender<IndexRequest>, policy: RetryPolicy) -> Self {
        Self {
            channel: RemoteChannel::new(sender, policy),
        }
    }

    #[instrument(skip(self, source), fields(doc_type = %key.doc_type, id = %key.id))]
    pub async fn index(&self, key: DocKey, source: Value) -> Result<(), StoreError> {
        self.channel
            .call_idempotent(|respond_to| IndexRequest::Index {
                key: key.clone(),
                source: source.clone(),
                respond_to,
            })
            .await
    }

    #[instrument(skip(self), fields(doc_type = %key.doc_type, id = %key.id))]
    pub async fn get(&self, key: DocKey) -> Result<Option<Value>, StoreError> {
        self.channel
            .call_idempotent(|respond_to| IndexRequest::Get {
                key: key.clone(),
                respond_to,
            })
            .await
    }

    /// Fetches many documents in one round trip. Unknown keys are omitted.
    #[instrument(skip(self, keys), fields(keys = keys.len()))]
    pub async fn multi_get(&self, keys: Vec<DocKey>) -> Result<Vec<Hit>, StoreError> {
        self.channel
            .call_idempotent(|respond_to| IndexRequest::MultiGet {
                keys: keys.clone(),
                respond_to,
            })
            .await
    }

    #[instrument(skip(self))]
    pub async fn search(
        &self,
        doc_type: &str,
        query: SearchQuery,
        from: usize,
        size: usize,
    ) -> Result<Vec<Hit>, StoreError> {
        self.channel
            .call_idempotent(|respond_to| IndexRequest::Search {
                doc_type: doc_type.to_string(),
                query: query.clone(),
                from,
                size,
                respond_to,
            })
            .await
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        self.channel
            .call(|respond_to| IndexRequest::Ping { respond_to })
            .await
    }
}
