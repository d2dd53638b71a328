use crate::domain::{NewProduct, Product};
use crate::error::CatalogError;
use crate::messages::CatalogRequest;
use crate::transport::RemoteChannel;

/// Client for the catalog service.
#[derive(Clone)]
pub struct CatalogClient {
    channel: RemoteChannel<CatalogRequest>,
}

remote_client_new!(CatalogClient, CatalogRequest);

remote_method!(CatalogClient => fn create_product(product: NewProduct) -> Product as CatalogRequest::CreateProduct, Error = CatalogError);
remote_method!(read CatalogClient => fn get_product(id: String) -> Product as CatalogRequest::GetProduct, Error = CatalogError);
remote_method!(read CatalogClient => fn list_products(skip: u64, take: u64) -> Vec<Product> as CatalogRequest::ListProducts, Error = CatalogError);
remote_method!(read CatalogClient => fn search_products(query: String, skip: u64, take: u64) -> Vec<Product> as CatalogRequest::SearchProducts, Error = CatalogError);

// Batched multi-key fetch: one round trip for the whole ID set.
remote_method!(read CatalogClient => fn get_products_by_ids(ids: Vec<String>) -> Vec<Product> as CatalogRequest::GetProductsByIds, Error = CatalogError);
