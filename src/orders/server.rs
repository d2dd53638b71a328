use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, instrument, Instrument};

use super::OrderService;
use crate::clients::OrderClient;
use crate::messages::OrderRequest;
use crate::transport::RetryPolicy;

/// Order service actor. Each request runs on its own task so a slow upstream
/// call does not hold up unrelated orders.
pub struct OrderServer {
    receiver: mpsc::Receiver<OrderRequest>,
    service: Arc<OrderService>,
}

impl OrderServer {
    pub fn new(buffer_size: usize, service: OrderService, policy: RetryPolicy) -> (Self, OrderClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let server = Self {
            receiver,
            service: Arc::new(service),
        };
        (server, OrderClient::new(sender, policy))
    }

    #[instrument(name = "order_service", skip(self))]
    pub async fn run(mut self) {
        info!("OrderService starting");
        while let Some(msg) = self.receiver.recv().await {
            let service = Arc::clone(&self.service);
            tokio::spawn(Self::dispatch(service, msg).in_current_span());
        }
        info!("OrderService stopped");
    }

    async fn dispatch(service: Arc<OrderService>, msg: OrderRequest) {
        match msg {
            OrderRequest::CreateOrder { order, respond_to } => {
                let _ = respond_to.send(service.create_order(order).await);
            }
            OrderRequest::GetOrdersForAccount { account_id, respond_to } => {
                let _ = respond_to.send(service.get_orders_for_account(account_id).await);
            }
        }
    }
}
