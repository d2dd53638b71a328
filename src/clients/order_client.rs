use crate::domain::{NewOrder, Order};
use crate::error::OrderError;
use crate::messages::OrderRequest;
use crate::transport::RemoteChannel;

/// Client for the order service.
///
/// `create_order` is never retried here: without an idempotency key a repeated
/// create would persist a duplicate order.
#[derive(Clone)]
pub struct OrderClient {
    channel: RemoteChannel<OrderRequest>,
}

remote_client_new!(OrderClient, OrderRequest);

remote_method!(OrderClient => fn create_order(order: NewOrder) -> Order as OrderRequest::CreateOrder, Error = OrderError);
remote_method!(read OrderClient => fn get_orders_for_account(account_id: String) -> Vec<Order> as OrderRequest::GetOrdersForAccount, Error = OrderError);
