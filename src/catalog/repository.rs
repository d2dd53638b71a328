use std::collections::HashSet;
use std::future::Future;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{instrument, warn};

use crate::domain::Product;
use crate::error::StoreError;
use crate::index::{DocKey, Hit, IndexClient, SearchQuery};

/// Discriminator stored with every product document.
pub const PRODUCT_DOC_TYPE: &str = "product";

const SEARCH_FIELDS: [&str; 2] = ["name", "description"];

/// Storage contract for catalog products.
///
/// Implementations must serve [`list_products_with_ids`](Self::list_products_with_ids)
/// in a single round trip; callers rely on it to avoid one fetch per product.
pub trait ProductRepository: Send + Sync + 'static {
    /// Upserts the full document for `product.id`.
    fn put_product(&self, product: Product) -> impl Future<Output = Result<(), StoreError>> + Send + '_;

    fn get_product_by_id(&self, id: String) -> impl Future<Output = Result<Product, StoreError>> + Send + '_;

    /// A page of all products. Order is implementation-defined.
    fn list_products(
        &self,
        skip: u64,
        take: u64,
    ) -> impl Future<Output = Result<Vec<Product>, StoreError>> + Send + '_;

    /// The subset of `ids` that exist. Unknown IDs are silently omitted.
    fn list_products_with_ids(
        &self,
        ids: Vec<String>,
    ) -> impl Future<Output = Result<Vec<Product>, StoreError>> + Send + '_;

    /// A ranked page of products matching `query` in name or description.
    fn search_products(
        &self,
        query: String,
        skip: u64,
        take: u64,
    ) -> impl Future<Output = Result<Vec<Product>, StoreError>> + Send + '_;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ProductDocument {
    name: String,
    description: String,
    #[serde(with = "rust_decimal::serde::str")]
    price: Decimal,
    doc_type: String,
}

impl ProductDocument {
    fn encode(product: &Product) -> Result<Value, StoreError> {
        let document = ProductDocument {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            doc_type: PRODUCT_DOC_TYPE.to_string(),
        };
        serde_json::to_value(document).map_err(|e| StoreError::Encoding(e.to_string()))
    }

    fn decode(id: String, source: Value) -> Result<Product, StoreError> {
        let document: ProductDocument = serde_json::from_value(source)
            .map_err(|e| StoreError::Encoding(format!("product {id}: {e}")))?;
        Ok(Product {
            id,
            name: document.name,
            description: document.description,
            price: document.price,
        })
    }
}

fn product_key(id: impl Into<String>) -> DocKey {
    DocKey::new(PRODUCT_DOC_TYPE, id)
}

fn page_bound(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

/// Decodes list results. One undecodable document fails the whole read.
fn decode_hits(hits: Vec<Hit>) -> Result<Vec<Product>, StoreError> {
    hits.into_iter()
        .map(|hit| ProductDocument::decode(hit.id, hit.source))
        .collect::<Result<Vec<_>, _>>()
        .inspect_err(|e| warn!(error = %e, "Undecodable product document"))
}

/// [`ProductRepository`] over the `catalog` document index.
#[derive(Clone)]
pub struct IndexedProductRepository {
    index: IndexClient,
}

impl IndexedProductRepository {
    pub fn new(index: IndexClient) -> Self {
        Self { index }
    }
}

impl ProductRepository for IndexedProductRepository {
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    async fn put_product(&self, product: Product) -> Result<(), StoreError> {
        let source = ProductDocument::encode(&product)?;
        self.index.index(product_key(product.id), source).await
    }

    #[instrument(skip(self))]
    async fn get_product_by_id(&self, id: String) -> Result<Product, StoreError> {
        match self.index.get(product_key(id.clone())).await? {
            Some(source) => ProductDocument::decode(id, source),
            None => Err(StoreError::NotFound(id)),
        }
    }

    #[instrument(skip(self))]
    async fn list_products(&self, skip: u64, take: u64) -> Result<Vec<Product>, StoreError> {
        let hits = self
            .index
            .search(PRODUCT_DOC_TYPE, SearchQuery::MatchAll, page_bound(skip), page_bound(take))
            .await?;
        decode_hits(hits)
    }

    #[instrument(skip(self, ids), fields(requested = ids.len()))]
    async fn list_products_with_ids(&self, ids: Vec<String>) -> Result<Vec<Product>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let requested: HashSet<&String> = ids.iter().collect();
        let keys = ids.iter().map(product_key).collect();
        let hits = self.index.multi_get(keys).await?;
        Ok(decode_hits(hits)?
            .into_iter()
            .filter(|product| requested.contains(&product.id))
            .collect())
    }

    #[instrument(skip(self))]
    async fn search_products(&self, query: String, skip: u64, take: u64) -> Result<Vec<Product>, StoreError> {
        let query = SearchQuery::MultiMatch {
            text: query,
            fields: SEARCH_FIELDS.iter().map(|f| f.to_string()).collect(),
        };
        let hits = self
            .index
            .search(PRODUCT_DOC_TYPE, query, page_bound(skip), page_bound(take))
            .await?;
        decode_hits(hits)
    }
}
