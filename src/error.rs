use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::transport::{Transient, TransportError};

/// Errors from the document index adapter.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("Document not found: {0}")]
    NotFound(String),
    #[error("Document store unavailable: {0}")]
    Unavailable(String),
    #[error("Document encoding error: {0}")]
    Encoding(String),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    #[error("Product not found: {0}")]
    NotFound(String),
    #[error("Invalid product: {0}")]
    InvalidProduct(String),
    #[error("Catalog store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Catalog encoding error: {0}")]
    Encoding(String),
    #[error("Catalog service unavailable: {0}")]
    Unavailable(String),
}

/// Errors that can occur during account operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AccountError {
    #[error("Account not found: {0}")]
    NotFound(String),
    #[error("Invalid account: {0}")]
    InvalidAccount(String),
    #[error("Account service unavailable: {0}")]
    Unavailable(String),
}

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Account not found: {0}")]
    AccountNotFound(String),
    #[error("Products not found: {}", .0.join(", "))]
    ProductNotFound(Vec<String>),
    #[error("Invalid quantity {quantity} for product {product_id}")]
    InvalidQuantity { product_id: String, quantity: u32 },
    #[error("Invalid order: {0}")]
    InvalidOrder(String),
    #[error("Upstream {service} unavailable: {reason}")]
    UpstreamUnavailable { service: &'static str, reason: String },
    #[error("Upstream {service} failed: {reason}")]
    Upstream { service: &'static str, reason: String },
    #[error("Order persistence error: {0}")]
    Persistence(String),
    #[error("Order service unavailable: {0}")]
    Unavailable(String),
}

/// Raised only when the request graph itself cannot be parsed or validated.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GatewayError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

impl From<StoreError> for CatalogError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => CatalogError::NotFound(id),
            StoreError::Unavailable(msg) => CatalogError::StoreUnavailable(msg),
            StoreError::Encoding(msg) => CatalogError::Encoding(msg),
        }
    }
}

impl From<TransportError> for StoreError {
    fn from(e: TransportError) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

impl From<TransportError> for CatalogError {
    fn from(e: TransportError) -> Self {
        CatalogError::Unavailable(e.to_string())
    }
}

impl From<TransportError> for AccountError {
    fn from(e: TransportError) -> Self {
        AccountError::Unavailable(e.to_string())
    }
}

impl From<TransportError> for OrderError {
    fn from(e: TransportError) -> Self {
        OrderError::Unavailable(e.to_string())
    }
}

impl From<FrameworkError> for AccountError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::Rejected(msg) => AccountError::InvalidAccount(msg),
            other => AccountError::Unavailable(other.to_string()),
        }
    }
}

impl Transient for StoreError {
    fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

impl Transient for CatalogError {
    fn is_transient(&self) -> bool {
        matches!(
            self,
            CatalogError::StoreUnavailable(_) | CatalogError::Unavailable(_)
        )
    }
}

impl Transient for AccountError {
    fn is_transient(&self) -> bool {
        matches!(self, AccountError::Unavailable(_))
    }
}

impl Transient for OrderError {
    fn is_transient(&self) -> bool {
        matches!(
            self,
            OrderError::UpstreamUnavailable { .. } | OrderError::Unavailable(_)
        )
    }
}
