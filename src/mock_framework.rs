//! # Mock Framework
//!
//! Utilities for testing services and clients in isolation.
//!
//! Use [`create_mock_client`] to get a storage client and a receiver, then
//! helpers like [`expect_create`] to answer it by hand. For the remote
//! services, [`start_fake_services`] runs in-memory catalog and account
//! services that record every call and can be switched off to simulate an
//! unreachable host.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rust_decimal::Decimal;
use tokio::sync::{mpsc, oneshot};

use crate::actor_framework::{Entity, FrameworkError, ResourceClient, ResourceRequest};
use crate::catalog::clamp_take;
use crate::clients::{AccountClient, CatalogClient};
use crate::domain::{Account, Product};
use crate::error::{AccountError, CatalogError};
use crate::index::IndexRequest;
use crate::messages::{AccountRequest, CatalogRequest};
use crate::transport::RetryPolicy;

const EXPECT_TIMEOUT: Duration = Duration::from_secs(1);

/// Two attempts with a negligible backoff, so retry paths stay fast.
pub fn test_policy() -> RetryPolicy {
    RetryPolicy::new(2, Duration::from_millis(1), Duration::from_secs(1))
}

/// Creates a mock client and a receiver for asserting requests.
///
/// Tests that only care about how a service drives its storage answer the
/// requests arriving on `receiver` themselves instead of running a
/// `ResourceActor`.
pub fn create_mock_client<T: Entity>(buffer_size: usize) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Helper to verify that the next message is a Create request
pub async fn expect_create<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::CreateParams, oneshot::Sender<Result<T, FrameworkError>>)> {
    match next(receiver).await {
        Some(ResourceRequest::Create { params, respond_to }) => Some((params, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Get request
pub async fn expect_get<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, oneshot::Sender<Result<Option<T>, FrameworkError>>)> {
    match next(receiver).await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

pub async fn expect_index_request(receiver: &mut mpsc::Receiver<IndexRequest>) -> Option<IndexRequest> {
    next(receiver).await
}

pub async fn expect_catalog_request(receiver: &mut mpsc::Receiver<CatalogRequest>) -> Option<CatalogRequest> {
    next(receiver).await
}

pub async fn expect_account_request(receiver: &mut mpsc::Receiver<AccountRequest>) -> Option<AccountRequest> {
    next(receiver).await
}

/// Next message, or `None` if nothing arrives in time.
async fn next<R>(receiver: &mut mpsc::Receiver<R>) -> Option<R> {
    tokio::time::timeout(EXPECT_TIMEOUT, receiver.recv())
        .await
        .ok()
        .flatten()
}

// =============================================================================
// FAKE REMOTE SERVICES
// =============================================================================

/// One request seen by a fake service.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: &'static str,
    pub ids: Vec<String>,
}

/// Records, availability switch and call log shared between a fake service
/// and the test driving it.
pub struct FakeState<T> {
    available: AtomicBool,
    records: Mutex<BTreeMap<String, T>>,
    calls: Mutex<Vec<Call>>,
    next_id: AtomicU64,
}

impl<T: Clone> FakeState<T> {
    fn new(records: BTreeMap<String, T>) -> Arc<Self> {
        Arc::new(Self {
            available: AtomicBool::new(true),
            records: Mutex::new(records),
            calls: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        })
    }

    /// While unavailable every request fails with a transient error.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.calls().iter().filter(|c| c.method == method).count()
    }

    pub fn upsert(&self, id: &str, record: T) {
        self.records.lock().unwrap().insert(id.to_string(), record);
    }

    fn record(&self, method: &'static str, ids: Vec<String>) -> bool {
        self.calls.lock().unwrap().push(Call { method, ids });
        self.available.load(Ordering::SeqCst)
    }

    fn get(&self, id: &str) -> Option<T> {
        self.records.lock().unwrap().get(id).cloned()
    }

    fn get_many(&self, ids: &[String]) -> Vec<T> {
        let records = self.records.lock().unwrap();
        ids.iter().filter_map(|id| records.get(id).cloned()).collect()
    }

    fn page(&self, skip: u64, take: u64) -> Vec<T> {
        let take = clamp_take(skip, take, 100);
        self.records
            .lock()
            .unwrap()
            .values()
            .skip(skip as usize)
            .take(take as usize)
            .cloned()
            .collect()
    }

    fn fresh_id(&self, prefix: &str) -> String {
        format!("{prefix}{}", self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

/// Catalog fixture builder.
#[derive(Default)]
pub struct FakeCatalog {
    products: BTreeMap<String, Product>,
}

impl FakeCatalog {
    pub fn with_product(mut self, id: &str, name: &str, price: &str) -> Self {
        let price = Decimal::from_str(price).unwrap();
        self.products
            .insert(id.to_string(), Product::new(id, name, format!("{name} description"), price));
        self
    }
}

/// Clients wired to the running fakes, plus handles to inspect them.
pub struct FakeServices {
    pub catalog: CatalogClient,
    pub accounts: AccountClient,
    pub catalog_state: Arc<FakeState<Product>>,
    pub account_state: Arc<FakeState<Account>>,
}

/// Starts fake catalog and account services. Each account ID in `accounts` is
/// named after itself.
pub fn start_fake_services(catalog: FakeCatalog, accounts: &[&str]) -> FakeServices {
    let catalog_state = FakeState::new(catalog.products);
    let account_state = FakeState::new(
        accounts
            .iter()
            .map(|id| (id.to_string(), Account::new(*id, *id)))
            .collect(),
    );

    let (catalog_tx, catalog_rx) = mpsc::channel(64);
    let (account_tx, account_rx) = mpsc::channel(64);
    tokio::spawn(run_fake_catalog(catalog_rx, catalog_state.clone()));
    tokio::spawn(run_fake_accounts(account_rx, account_state.clone()));

    FakeServices {
        catalog: CatalogClient::new(catalog_tx, test_policy()),
        accounts: AccountClient::new(account_tx, test_policy()),
        catalog_state,
        account_state,
    }
}

async fn run_fake_catalog(mut receiver: mpsc::Receiver<CatalogRequest>, state: Arc<FakeState<Product>>) {
    let outage = || CatalogError::Unavailable("fake catalog offline".to_string());
    while let Some(msg) = receiver.recv().await {
        match msg {
            CatalogRequest::CreateProduct { product, respond_to } => {
                let reply = if state.record("create_product", Vec::new()) {
                    let created = Product::new(state.fresh_id("new-p"), product.name, product.description, product.price);
                    state.upsert(&created.id.clone(), created.clone());
                    Ok(created)
                } else {
                    Err(outage())
                };
                let _ = respond_to.send(reply);
            }
            CatalogRequest::GetProduct { id, respond_to } => {
                let reply = if state.record("get_product", vec![id.clone()]) {
                    state.get(&id).ok_or(CatalogError::NotFound(id))
                } else {
                    Err(outage())
                };
                let _ = respond_to.send(reply);
            }
            CatalogRequest::ListProducts { skip, take, respond_to } => {
                let reply = if state.record("list_products", Vec::new()) {
                    Ok(state.page(skip, take))
                } else {
                    Err(outage())
                };
                let _ = respond_to.send(reply);
            }
            CatalogRequest::GetProductsByIds { ids, respond_to } => {
                let reply = if state.record("get_products_by_ids", ids.clone()) {
                    Ok(state.get_many(&ids))
                } else {
                    Err(outage())
                };
                let _ = respond_to.send(reply);
            }
            CatalogRequest::SearchProducts { query, skip, take, respond_to } => {
                let reply = if state.record("search_products", Vec::new()) {
                    let query = query.to_lowercase();
                    Ok(state
                        .page(skip, take)
                        .into_iter()
                        .filter(|p| p.name.to_lowercase().contains(&query))
                        .collect())
                } else {
                    Err(outage())
                };
                let _ = respond_to.send(reply);
            }
        }
    }
}

async fn run_fake_accounts(mut receiver: mpsc::Receiver<AccountRequest>, state: Arc<FakeState<Account>>) {
    let outage = || AccountError::Unavailable("fake account service offline".to_string());
    while let Some(msg) = receiver.recv().await {
        match msg {
            AccountRequest::CreateAccount { name, respond_to } => {
                let reply = if state.record("create_account", Vec::new()) {
                    let created = Account::new(state.fresh_id("new-a"), name);
                    state.upsert(&created.id.clone(), created.clone());
                    Ok(created)
                } else {
                    Err(outage())
                };
                let _ = respond_to.send(reply);
            }
            AccountRequest::GetAccount { id, respond_to } => {
                let reply = if state.record("get_account", vec![id.clone()]) {
                    state.get(&id).ok_or(AccountError::NotFound(id))
                } else {
                    Err(outage())
                };
                let _ = respond_to.send(reply);
            }
            AccountRequest::ListAccounts { skip, take, respond_to } => {
                let reply = if state.record("list_accounts", Vec::new()) {
                    Ok(state.page(skip, take))
                } else {
                    Err(outage())
                };
                let _ = respond_to.send(reply);
            }
            AccountRequest::GetAccountsByIds { ids, respond_to } => {
                let reply = if state.record("get_accounts_by_ids", ids.clone()) {
                    Ok(state.get_many(&ids))
                } else {
                    Err(outage())
                };
                let _ = respond_to.send(reply);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewAccount;

    #[tokio::test]
    async fn test_mock_client() {
        let (client, mut receiver) = create_mock_client::<Account>(10);

        let create_task = tokio::spawn(async move { client.create(NewAccount { name: "Test".to_string() }).await });

        let (payload, responder) = expect_create(&mut receiver).await.expect("Expected Create request");
        assert_eq!(payload.name, "Test");
        responder.send(Ok(Account::new("a_1", "Test"))).unwrap();

        let result = create_task.await.unwrap();
        assert_eq!(result, Ok(Account::new("a_1", "Test")));
    }

    #[tokio::test]
    async fn test_fake_catalog_records_calls_and_goes_offline() {
        let fakes = start_fake_services(FakeCatalog::default().with_product("p1", "Mug", "9.99"), &[]);

        let found = fakes.catalog.get_products_by_ids(vec!["p1".into(), "nope".into()]).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(fakes.catalog_state.count("get_products_by_ids"), 1);

        fakes.catalog_state.set_available(false);
        assert!(fakes.catalog.get_product("p1".into()).await.is_err());
        // Reads are retried once under the test policy.
        assert_eq!(fakes.catalog_state.count("get_product"), 2);
    }
}
