use tokio::task::JoinHandle;
use tracing::{error, info};

use super::wait_forever;
use crate::accounts::{AccountServer, AccountService};
use crate::actor_framework::ResourceActor;
use crate::catalog::{CatalogServer, CatalogService, IndexedProductRepository};
use crate::clients::{AccountClient, CatalogClient, OrderClient};
use crate::config::Settings;
use crate::domain::Account;
use crate::gateway::Gateway;
use crate::ids::IdGenerator;
use crate::index::{IndexActor, CATALOG_INDEX};
use crate::orders::{OrderServer, OrderService, StoredOrder};

/// The running system: document index, storage actors, the three services
/// and the gateway in front of them.
///
/// Responsible for starting up actors, wiring them together, and handling shutdown.
pub struct Storefront {
    pub gateway: Gateway,
    pub catalog: CatalogClient,
    pub accounts: AccountClient,
    pub orders: OrderClient,
    handles: Vec<JoinHandle<()>>,
}

impl Storefront {
    /// Starts every actor, waiting for each store to answer before starting
    /// the service that owns it.
    pub async fn start(settings: &Settings) -> Self {
        let buffer = settings.actors.buffer_size;
        let policy = settings.remote_policy();
        let backoff = settings.startup_backoff();
        let mut handles = Vec::new();

        // 1. Catalog: document index, repository and service
        let (index_actor, index) = IndexActor::new(CATALOG_INDEX, buffer, policy);
        handles.push(tokio::spawn(index_actor.run()));
        wait_forever("catalog index", backoff, || index.ping()).await;

        let repository = IndexedProductRepository::new(index);
        let catalog_service = CatalogService::with_page_size(repository, settings.catalog.max_page_size);
        let (catalog_server, catalog) = CatalogServer::new(buffer, catalog_service, policy);
        handles.push(tokio::spawn(catalog_server.run()));

        // 2. Accounts
        let account_ids = IdGenerator::new();
        let (account_store, account_storage) =
            ResourceActor::<Account>::new("accounts", buffer, move || account_ids.next_id());
        handles.push(tokio::spawn(account_store.run()));
        wait_forever("account store", backoff, || account_storage.ping()).await;

        let account_service = AccountService::with_page_size(account_storage, settings.catalog.max_page_size);
        let (account_server, accounts) = AccountServer::new(buffer, account_service, policy);
        handles.push(tokio::spawn(account_server.run()));

        // 3. Orders, composed from accounts and catalog
        let order_ids = IdGenerator::new();
        let (order_store, order_storage) =
            ResourceActor::<StoredOrder>::new("orders", buffer, move || order_ids.next_id());
        handles.push(tokio::spawn(order_store.run()));
        wait_forever("order store", backoff, || order_storage.ping()).await;

        let order_service = OrderService::new(accounts.clone(), catalog.clone(), order_storage);
        let (order_server, orders) = OrderServer::new(buffer, order_service, policy);
        handles.push(tokio::spawn(order_server.run()));

        let gateway = Gateway::new(catalog.clone(), accounts.clone(), orders.clone());
        info!(actors = handles.len(), "Storefront started");

        Self {
            gateway,
            catalog,
            accounts,
            orders,
            handles,
        }
    }

    /// Drops every client so the actors see their channels close, then waits
    /// for each of them to finish.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down storefront...");
        drop(self.gateway);
        drop(self.orders);
        drop(self.accounts);
        drop(self.catalog);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("Storefront shutdown complete.");
        Ok(())
    }
}
