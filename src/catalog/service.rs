use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

use super::ProductRepository;
use crate::domain::{NewProduct, Product};
use crate::error::CatalogError;
use crate::ids::IdGenerator;

/// Largest page a caller can request, and the page served when none is given.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Effective page size for a list or search request.
///
/// Oversized requests are cut to `max`. `skip = 0, take = 0` means "no
/// pagination given" and also yields `max`, never an empty page.
pub fn clamp_take(skip: u64, take: u64, max: u64) -> u64 {
    if take > max || (skip == 0 && take == 0) {
        max
    } else {
        take
    }
}

/// Catalog business rules on top of a [`ProductRepository`].
pub struct CatalogService<R> {
    repository: R,
    ids: IdGenerator,
    max_page_size: u64,
}

impl<R: ProductRepository> CatalogService<R> {
    pub fn new(repository: R) -> Self {
        Self::with_page_size(repository, MAX_PAGE_SIZE)
    }

    pub fn with_page_size(repository: R, max_page_size: u64) -> Self {
        Self {
            repository,
            ids: IdGenerator::new(),
            max_page_size,
        }
    }

    /// Assigns a fresh ID and stores the full record.
    #[instrument(skip(self, product), fields(product_name = %product.name))]
    pub async fn post_product(&self, product: NewProduct) -> Result<Product, CatalogError> {
        if product.name.trim().is_empty() {
            warn!("Rejected product without a name");
            return Err(CatalogError::InvalidProduct("name must not be empty".to_string()));
        }
        if product.price < Decimal::ZERO {
            warn!(price = %product.price, "Rejected product with negative price");
            return Err(CatalogError::InvalidProduct(format!(
                "price must not be negative, got {}",
                product.price
            )));
        }

        let product = Product {
            id: self.ids.next_id(),
            name: product.name,
            description: product.description,
            price: product.price,
        };
        self.repository.put_product(product.clone()).await?;
        info!(product_id = %product.id, "Product created");
        Ok(product)
    }

    pub async fn get_product(&self, id: String) -> Result<Product, CatalogError> {
        Ok(self.repository.get_product_by_id(id).await?)
    }

    pub async fn get_products(&self, skip: u64, take: u64) -> Result<Vec<Product>, CatalogError> {
        let take = clamp_take(skip, take, self.max_page_size);
        Ok(self.repository.list_products(skip, take).await?)
    }

    pub async fn get_products_with_ids(&self, ids: Vec<String>) -> Result<Vec<Product>, CatalogError> {
        Ok(self.repository.list_products_with_ids(ids).await?)
    }

    pub async fn search_products(
        &self,
        query: String,
        skip: u64,
        take: u64,
    ) -> Result<Vec<Product>, CatalogError> {
        let take = clamp_take(skip, take, self.max_page_size);
        Ok(self.repository.search_products(query, skip, take).await?)
    }
}
