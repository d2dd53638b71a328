use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, instrument, Instrument};

use crate::actor_framework::ResourceClient;
use crate::catalog::{clamp_take, MAX_PAGE_SIZE};
use crate::clients::AccountClient;
use crate::domain::{Account, NewAccount};
use crate::error::AccountError;
use crate::messages::AccountRequest;
use crate::transport::RetryPolicy;

/// Account rules over the account storage actor.
pub struct AccountService {
    storage: ResourceClient<Account>,
    max_page_size: u64,
}

impl AccountService {
    pub fn new(storage: ResourceClient<Account>) -> Self {
        Self::with_page_size(storage, MAX_PAGE_SIZE)
    }

    pub fn with_page_size(storage: ResourceClient<Account>, max_page_size: u64) -> Self {
        Self { storage, max_page_size }
    }

    #[instrument(skip(self))]
    pub async fn create_account(&self, name: String) -> Result<Account, AccountError> {
        let account = self.storage.create(NewAccount { name }).await?;
        info!(account_id = %account.id, "Account created");
        Ok(account)
    }

    #[instrument(skip(self))]
    pub async fn get_account(&self, id: String) -> Result<Account, AccountError> {
        match self.storage.get(id.clone()).await? {
            Some(account) => Ok(account),
            None => {
                debug!("Account not found");
                Err(AccountError::NotFound(id))
            }
        }
    }

    pub async fn list_accounts(&self, skip: u64, take: u64) -> Result<Vec<Account>, AccountError> {
        let take = clamp_take(skip, take, self.max_page_size);
        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let take = usize::try_from(take).unwrap_or(usize::MAX);
        Ok(self.storage.list(skip, take).await?)
    }

    /// The subset of `ids` that exist, in one storage round trip.
    pub async fn get_accounts_by_ids(&self, ids: Vec<String>) -> Result<Vec<Account>, AccountError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.storage.get_many(ids).await?)
    }
}

/// Account service actor.
pub struct AccountServer {
    receiver: mpsc::Receiver<AccountRequest>,
    service: Arc<AccountService>,
}

impl AccountServer {
    pub fn new(buffer_size: usize, service: AccountService, policy: RetryPolicy) -> (Self, AccountClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let server = Self {
            receiver,
            service: Arc::new(service),
        };
        (server, AccountClient::new(sender, policy))
    }

    #[instrument(name = "account_service", skip(self))]
    pub async fn run(mut self) {
        info!("AccountService starting");
        while let Some(msg) = self.receiver.recv().await {
            let service = Arc::clone(&self.service);
            tokio::spawn(Self::dispatch(service, msg).in_current_span());
        }
        info!("AccountService stopped");
    }

    async fn dispatch(service: Arc<AccountService>, msg: AccountRequest) {
        match msg {
            AccountRequest::CreateAccount { name, respond_to } => {
                let _ = respond_to.send(service.create_account(name).await);
            }
            AccountRequest::GetAccount { id, respond_to } => {
                let _ = respond_to.send(service.get_account(id).await);
            }
            AccountRequest::ListAccounts { skip, take, respond_to } => {
                let _ = respond_to.send(service.list_accounts(skip, take).await);
            }
            AccountRequest::GetAccountsByIds { ids, respond_to } => {
                let _ = respond_to.send(service.get_accounts_by_ids(ids).await);
            }
        }
    }
}
