use std::collections::{BTreeSet, HashMap};

use chrono::Utc;
use tracing::{debug, error, info, instrument};

use super::{OrderDraft, StoredOrder};
use crate::actor_framework::ResourceClient;
use crate::clients::{AccountClient, CatalogClient};
use crate::domain::{checked_total, LineItem, NewOrder, Order, OrderLine, OrderedProduct, Product};
use crate::error::{AccountError, CatalogError, OrderError};
use crate::transport::Transient;

const ACCOUNT_SERVICE: &str = "account";
const CATALOG_SERVICE: &str = "catalog";

/// Composes orders from the account and catalog services.
///
/// Creation runs `validate account → fetch products → compute line items →
/// persist`; a failure at any step aborts before anything is written.
pub struct OrderService {
    accounts: AccountClient,
    catalog: CatalogClient,
    storage: ResourceClient<StoredOrder>,
}

impl OrderService {
    pub fn new(accounts: AccountClient, catalog: CatalogClient, storage: ResourceClient<StoredOrder>) -> Self {
        Self {
            accounts,
            catalog,
            storage,
        }
    }

    #[instrument(
        fields(account_id = %order.account_id, lines = order.lines.len()),
        skip(self, order)
    )]
    pub async fn create_order(&self, order: NewOrder) -> Result<Order, OrderError> {
        info!("Processing create_order request");
        if order.lines.is_empty() {
            return Err(OrderError::InvalidOrder("order has no line items".to_string()));
        }

        // Step 1: Validate account
        self.validate_account(&order.account_id).await?;

        // Step 2: Fetch every referenced product in one batched call
        let ids = distinct_product_ids(order.lines.iter().map(|line| &line.product_id));
        let products = self.fetch_products(ids.clone()).await?;
        let missing: Vec<String> = ids.into_iter().filter(|id| !products.contains_key(id)).collect();
        if !missing.is_empty() {
            error!(missing = ?missing, "Order references unknown products");
            return Err(OrderError::ProductNotFound(missing));
        }

        // Step 3: Capture current prices into line items
        let line_items = price_lines(&order.lines, &products)?;

        // Step 4: Persist the aggregate
        let draft = OrderDraft {
            account_id: order.account_id,
            created_at: Utc::now(),
            line_items,
            idempotency_key: order.idempotency_key,
        };
        let stored = self.storage.create(draft).await.map_err(|e| {
            error!(error = %e, "Order persistence failed");
            OrderError::Persistence(e.to_string())
        })?;

        info!(order_id = %stored.id, "Order created successfully");
        Ok(attach_products(stored, &products))
    }

    /// Orders of an account, re-joined with current product names and
    /// descriptions. Captured prices are left untouched.
    #[instrument(skip(self))]
    pub async fn get_orders_for_account(&self, account_id: String) -> Result<Vec<Order>, OrderError> {
        debug!("Processing get_orders_for_account request");
        let owner = account_id.clone();
        let stored = self
            .storage
            .find(move |order: &StoredOrder| order.account_id == owner)
            .await
            .map_err(|e| OrderError::Persistence(e.to_string()))?;

        let ids = distinct_product_ids(
            stored
                .iter()
                .flat_map(|order| order.line_items.iter().map(|item| &item.product_id)),
        );
        let products = self.fetch_products(ids).await?;

        info!(orders = stored.len(), "Orders loaded");
        Ok(stored
            .into_iter()
            .map(|order| attach_products(order, &products))
            .collect())
    }

    async fn validate_account(&self, account_id: &str) -> Result<(), OrderError> {
        match self.accounts.get_account(account_id.to_string()).await {
            Ok(account) => {
                info!(account_name = %account.name, "Account validation successful");
                Ok(())
            }
            Err(AccountError::NotFound(id)) => {
                error!("Account not found");
                Err(OrderError::AccountNotFound(id))
            }
            Err(e) => {
                error!(error = %e, "Account validation failed");
                Err(upstream(ACCOUNT_SERVICE, e.is_transient(), e.to_string()))
            }
        }
    }

    async fn fetch_products(&self, ids: Vec<String>) -> Result<HashMap<String, Product>, OrderError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        match self.catalog.get_products_by_ids(ids).await {
            Ok(products) => Ok(products.into_iter().map(|p| (p.id.clone(), p)).collect()),
            Err(e) => {
                error!(error = %e, "Product lookup failed");
                Err(catalog_failure(e))
            }
        }
    }
}

fn upstream(service: &'static str, transient: bool, reason: String) -> OrderError {
    if transient {
        OrderError::UpstreamUnavailable { service, reason }
    } else {
        OrderError::Upstream { service, reason }
    }
}

fn catalog_failure(e: CatalogError) -> OrderError {
    upstream(CATALOG_SERVICE, e.is_transient(), e.to_string())
}

/// Sorted, de-duplicated product IDs.
fn distinct_product_ids<'a>(ids: impl Iterator<Item = &'a String>) -> Vec<String> {
    ids.cloned().collect::<BTreeSet<_>>().into_iter().collect()
}

/// One line item per requested pair, priced from the catalog snapshot. Fails
/// if any amount or the order total would not fit in a `Decimal`.
fn price_lines(lines: &[OrderLine], products: &HashMap<String, Product>) -> Result<Vec<LineItem>, OrderError> {
    let items = lines
        .iter()
        .map(|line| {
            if line.quantity == 0 {
                return Err(OrderError::InvalidQuantity {
                    product_id: line.product_id.clone(),
                    quantity: line.quantity,
                });
            }
            let product = products
                .get(&line.product_id)
                .ok_or_else(|| OrderError::ProductNotFound(vec![line.product_id.clone()]))?;
            Ok(LineItem {
                product_id: line.product_id.clone(),
                quantity: line.quantity,
                price: product.price,
            })
        })
        .collect::<Result<Vec<_>, OrderError>>()?;

    if checked_total(items.iter().map(LineItem::amount)).is_none() {
        error!("Order total overflows");
        return Err(OrderError::InvalidOrder("order total overflows".to_string()));
    }
    Ok(items)
}

/// Presents a stored order with current product metadata. A product that no
/// longer resolves keeps its captured price with empty name and description.
fn attach_products(order: StoredOrder, products: &HashMap<String, Product>) -> Order {
    let products = order
        .line_items
        .into_iter()
        .map(|item| {
            let (name, description) = products
                .get(&item.product_id)
                .map(|p| (p.name.clone(), p.description.clone()))
                .unwrap_or_default();
            OrderedProduct {
                id: item.product_id,
                name,
                description,
                price: item.price,
                quantity: item.quantity,
            }
        })
        .collect();

    Order {
        id: order.id,
        account_id: order.account_id,
        created_at: order.created_at,
        products,
    }
}
