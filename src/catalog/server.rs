use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, instrument, Instrument};

use super::{CatalogService, ProductRepository};
use crate::clients::CatalogClient;
use crate::messages::CatalogRequest;
use crate::transport::RetryPolicy;

/// Catalog service actor. Each request is handled on its own task so slow
/// index calls do not hold up other callers.
pub struct CatalogServer<R> {
    receiver: mpsc::Receiver<CatalogRequest>,
    service: Arc<CatalogService<R>>,
}

impl<R: ProductRepository> CatalogServer<R> {
    pub fn new(
        buffer_size: usize,
        service: CatalogService<R>,
        policy: RetryPolicy,
    ) -> (Self, CatalogClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let server = Self {
            receiver,
            service: Arc::new(service),
        };
        (server, CatalogClient::new(sender, policy))
    }

    #[instrument(name = "catalog_service", skip(self))]
    pub async fn run(mut self) {
        info!("CatalogService starting");
        while let Some(msg) = self.receiver.recv().await {
            let service = Arc::clone(&self.service);
            tokio::spawn(Self::dispatch(service, msg).in_current_span());
        }
        info!("CatalogService stopped");
    }

    async fn dispatch(service: Arc<CatalogService<R>>, msg: CatalogRequest) {
        match msg {
            CatalogRequest::CreateProduct { product, respond_to } => {
                let _ = respond_to.send(service.post_product(product).await);
            }
            CatalogRequest::GetProduct { id, respond_to } => {
                debug!(product_id = %id, "Processing get_product request");
                let _ = respond_to.send(service.get_product(id).await);
            }
            CatalogRequest::ListProducts { skip, take, respond_to } => {
                debug!(skip, take, "Processing list_products request");
                let _ = respond_to.send(service.get_products(skip, take).await);
            }
            CatalogRequest::GetProductsByIds { ids, respond_to } => {
                debug!(requested = ids.len(), "Processing get_products_by_ids request");
                let _ = respond_to.send(service.get_products_with_ids(ids).await);
            }
            CatalogRequest::SearchProducts { query, skip, take, respond_to } => {
                debug!(query = %query, skip, take, "Processing search_products request");
                let _ = respond_to.send(service.search_products(query, skip, take).await);
            }
        }
    }
}
