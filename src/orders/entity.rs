use chrono::{DateTime, Utc};

use crate::actor_framework::Entity;
use crate::domain::LineItem;

/// The persisted order aggregate. Totals are derived, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredOrder {
    pub id: String,
    pub account_id: String,
    pub created_at: DateTime<Utc>,
    pub line_items: Vec<LineItem>,
    pub idempotency_key: Option<String>,
}

/// Payload for persisting a composed order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    pub account_id: String,
    pub created_at: DateTime<Utc>,
    pub line_items: Vec<LineItem>,
    pub idempotency_key: Option<String>,
}

impl Entity for StoredOrder {
    type Id = String;
    type CreateParams = OrderDraft;

    fn id(&self) -> &String {
        &self.id
    }

    fn from_create_params(id: String, params: OrderDraft) -> Result<Self, String> {
        if params.line_items.is_empty() {
            return Err("order has no line items".to_string());
        }
        Ok(Self {
            id,
            account_id: params.account_id,
            created_at: params.created_at,
            line_items: params.line_items,
            idempotency_key: params.idempotency_key,
        })
    }

    /// Idempotency keys are scoped to the owning account.
    fn dedup_key(&self) -> Option<String> {
        self.idempotency_key
            .as_ref()
            .map(|key| format!("{}/{}", self.account_id, key))
    }
}
