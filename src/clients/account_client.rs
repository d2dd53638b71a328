use crate::domain::Account;
use crate::error::AccountError;
use crate::messages::AccountRequest;
use crate::transport::RemoteChannel;

/// Client for the account service.
#[derive(Clone)]
pub struct AccountClient {
    channel: RemoteChannel<AccountRequest>,
}

remote_client_new!(AccountClient, AccountRequest);

remote_method!(AccountClient => fn create_account(name: String) -> Account as AccountRequest::CreateAccount, Error = AccountError);
remote_method!(read AccountClient => fn get_account(id: String) -> Account as AccountRequest::GetAccount, Error = AccountError);
remote_method!(read AccountClient => fn list_accounts(skip: u64, take: u64) -> Vec<Account> as AccountRequest::ListAccounts, Error = AccountError);
remote_method!(read AccountClient => fn get_accounts_by_ids(ids: Vec<String>) -> Vec<Account> as AccountRequest::GetAccountsByIds, Error = AccountError);
