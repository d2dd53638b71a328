use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument};

use super::scoring::{score, tokenize};
use super::{DocKey, Hit, IndexClient, SearchQuery};
use crate::error::StoreError;
use crate::transport::{Reply, RetryPolicy};

#[derive(Debug)]
pub enum IndexRequest {
    Index {
        key: DocKey,
        source: Value,
        respond_to: Reply<(), StoreError>,
    },
    Get {
        key: DocKey,
        respond_to: Reply<Option<Value>, StoreError>,
    },
    MultiGet {
        keys: Vec<DocKey>,
        respond_to: Reply<Vec<Hit>, StoreError>,
    },
    Search {
        doc_type: String,
        query: SearchQuery,
        from: usize,
        size: usize,
        respond_to: Reply<Vec<Hit>, StoreError>,
    },
    Ping {
        respond_to: Reply<(), StoreError>,
    },
}

/// Owns the documents of one index and answers requests serially.
pub struct IndexActor {
    name: &'static str,
    receiver: mpsc::Receiver<IndexRequest>,
    documents: BTreeMap<DocKey, Value>,
}

impl IndexActor {
    pub fn new(name: &'static str, buffer_size: usize, policy: RetryPolicy) -> (Self, IndexClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            name,
            receiver,
            documents: BTreeMap::new(),
        };
        (actor, IndexClient::new(sender, policy))
    }

    #[instrument(name = "index_actor", fields(index = self.name), skip(self))]
    pub async fn run(mut self) {
        info!("IndexActor starting");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                IndexRequest::Index { key, source, respond_to } => {
                    let _ = respond_to.send(self.handle_index(key, source));
                }
                IndexRequest::Get { key, respond_to } => {
                    let _ = respond_to.send(Ok(self.documents.get(&key).cloned()));
                }
                IndexRequest::MultiGet { keys, respond_to } => {
                    let _ = respond_to.send(Ok(self.handle_multi_get(keys)));
                }
                IndexRequest::Search { doc_type, query, from, size, respond_to } => {
                    let _ = respond_to.send(Ok(self.handle_search(&doc_type, &query, from, size)));
                }
                IndexRequest::Ping { respond_to } => {
                    let _ = respond_to.send(Ok(()));
                }
            }
        }
        info!("IndexActor stopped");
    }

    fn handle_index(&mut self, key: DocKey, source: Value) -> Result<(), StoreError> {
        if !source.is_object() {
            return Err(StoreError::Encoding(format!(
                "document {} must be a JSON object",
                key.id
            )));
        }
        debug!(doc_type = %key.doc_type, id = %key.id, "Indexing document");
        self.documents.insert(key, source);
        Ok(())
    }

    fn handle_multi_get(&self, keys: Vec<DocKey>) -> Vec<Hit> {
        let mut seen = BTreeSet::new();
        keys.into_iter()
            .filter(|key| seen.insert(key.clone()))
            .filter_map(|key| {
                self.documents.get(&key).map(|source| Hit {
                    id: key.id,
                    score: 0,
                    source: source.clone(),
                })
            })
            .collect()
    }

    /// Ranked page of `doc_type` documents. Ties keep key order.
    fn handle_search(&self, doc_type: &str, query: &SearchQuery, from: usize, size: usize) -> Vec<Hit> {
        let of_type = self
            .documents
            .iter()
            .filter(|(key, _)| key.doc_type == doc_type);

        let mut hits: Vec<Hit> = match query {
            SearchQuery::MultiMatch { text, fields } if !tokenize(text).is_empty() => {
                let terms = tokenize(text);
                of_type
                    .filter_map(|(key, source)| {
                        let score = score(source, &terms, fields);
                        (score > 0).then(|| Hit {
                            id: key.id.clone(),
                            score,
                            source: source.clone(),
                        })
                    })
                    .collect()
            }
            _ => of_type
                .map(|(key, source)| Hit {
                    id: key.id.clone(),
                    score: 1,
                    source: source.clone(),
                })
                .collect(),
        };

        // Stable sort: equal scores stay in key order.
        hits.sort_by(|a, b| b.score.cmp(&a.score));
        hits.into_iter().skip(from).take(size).collect()
    }
}
