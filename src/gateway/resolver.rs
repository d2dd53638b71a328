use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;

use futures::future::{join_all, BoxFuture, FutureExt};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{json, Map, Value};
use tracing::{debug, info, instrument, warn};

use super::collector::{BatchCollector, Lookup};
use super::request::Request;
use super::response::{FieldError, PathSegment, Response};
use super::schema::{
    self, AccountField, AccountSelection, OrderField, OrderSelection, OrderedProductField,
    OrderedProductSelection, PlannedRoot, ProductField, ProductSelection, RootKind,
};
use crate::clients::{AccountClient, CatalogClient, OrderClient};
use crate::domain::{Account, Order, OrderedProduct, Product};
use crate::error::GatewayError;

/// Result of a root field that is resolved by a direct call rather than
/// through a collector.
enum Outcome {
    Account(Result<Account, String>),
    Accounts(Result<Vec<Account>, String>),
    Product(Result<Product, String>),
    Products(Result<Vec<Product>, String>),
    Order(Result<Order, String>),
}

type OrdersByAccount = HashMap<String, Result<Vec<Order>, String>>;

/// Single entry point composing accounts, products and orders into one
/// response graph.
///
/// A request resolves in phases over its own [`BatchCollector`]:
/// 1. validate and plan the whole request;
/// 2. run mutations in request order, then list/search roots concurrently
///    with the account batch;
/// 3. fetch orders for every distinct account that selects them;
/// 4. flush the product batch once, covering root lookups and every nested
///    `OrderedProduct.product`;
/// 5. assemble the response.
#[derive(Clone)]
pub struct Gateway {
    catalog: CatalogClient,
    accounts: AccountClient,
    orders: OrderClient,
}

impl Gateway {
    pub fn new(catalog: CatalogClient, accounts: AccountClient, orders: OrderClient) -> Self {
        Self {
            catalog,
            accounts,
            orders,
        }
    }

    /// Fails only if the request itself is invalid. Downstream failures null
    /// the affected fields and are reported in `errors`.
    #[instrument(skip_all, fields(operation = ?request.operation, roots = request.fields.len()))]
    pub async fn execute(&self, request: Request) -> Result<Response, GatewayError> {
        let plan = schema::plan(&request).inspect_err(|e| warn!(error = %e, "Rejected request"))?;
        let mut collector = BatchCollector::default();

        let mut outcomes = HashMap::new();
        for (index, root) in plan.roots.iter().enumerate() {
            if let Some(outcome) = self.run_mutation(&root.kind).await {
                outcomes.insert(index, outcome);
            }
        }

        for root in &plan.roots {
            match &root.kind {
                RootKind::AccountById { id, .. } => collector.accounts.request(id),
                RootKind::ProductById { id, .. } => collector.products.request(id),
                _ => {}
            }
        }

        let lists = plan
            .roots
            .iter()
            .enumerate()
            .filter_map(|(index, root)| self.list_call(&root.kind).map(|call| call.map(move |o| (index, o))));
        let accounts = &self.accounts;
        let (listed, ()) = futures::join!(
            join_all(lists),
            collector.accounts.flush(|ids| accounts.get_accounts_by_ids(ids))
        );
        outcomes.extend(listed);

        let orders = self.fetch_orders(&plan.roots, &outcomes, &collector).await;
        register_live_products(&plan.roots, &outcomes, &orders, &mut collector);

        let catalog = &self.catalog;
        collector
            .products
            .flush(|ids| catalog.get_products_by_ids(ids))
            .await;

        let mut assembler = Assembler {
            collector: &collector,
            orders: &orders,
            errors: Vec::new(),
        };
        let mut data = Map::new();
        for (index, root) in plan.roots.iter().enumerate() {
            let value = assembler.root(root, outcomes.get(&index));
            data.insert(root.key.clone(), value);
        }

        info!(
            account_batches = collector.accounts.calls(),
            product_batches = collector.products.calls(),
            errors = assembler.errors.len(),
            "Request resolved"
        );
        Ok(Response {
            data: Value::Object(data),
            errors: assembler.errors,
        })
    }

    /// JSON in, JSON out. A request that cannot be parsed or validated yields
    /// `data: null` and a single error.
    pub async fn execute_json(&self, request: Value) -> Value {
        let response = match Request::from_json(request) {
            Ok(request) => self.execute(request).await,
            Err(e) => Err(e),
        };
        response.unwrap_or_else(|e| Response::rejected(&e)).to_json()
    }

    async fn run_mutation(&self, kind: &RootKind) -> Option<Outcome> {
        let outcome = match kind {
            RootKind::CreateAccount { name, .. } => {
                Outcome::Account(self.accounts.create_account(name.clone()).await.map_err(|e| e.to_string()))
            }
            RootKind::CreateProduct { product, .. } => {
                Outcome::Product(self.catalog.create_product(product.clone()).await.map_err(|e| e.to_string()))
            }
            RootKind::CreateOrder { order, .. } => {
                Outcome::Order(self.orders.create_order(order.clone()).await.map_err(|e| e.to_string()))
            }
            _ => return None,
        };
        Some(outcome)
    }

    /// Paging and search roots are forwarded as-is; the owning service clamps.
    fn list_call(&self, kind: &RootKind) -> Option<BoxFuture<'_, Outcome>> {
        match kind {
            RootKind::AccountPage { skip, take, .. } => {
                let (skip, take) = (*skip, *take);
                Some(
                    async move { Outcome::Accounts(self.accounts.list_accounts(skip, take).await.map_err(|e| e.to_string())) }
                        .boxed(),
                )
            }
            RootKind::ProductPage { skip, take, .. } => {
                let (skip, take) = (*skip, *take);
                Some(
                    async move { Outcome::Products(self.catalog.list_products(skip, take).await.map_err(|e| e.to_string())) }
                        .boxed(),
                )
            }
            RootKind::ProductSearch { query, skip, take, .. } => {
                let (query, skip, take) = (query.clone(), *skip, *take);
                Some(
                    async move {
                        Outcome::Products(
                            self.catalog
                                .search_products(query, skip, take)
                                .await
                                .map_err(|e| e.to_string()),
                        )
                    }
                    .boxed(),
                )
            }
            _ => None,
        }
    }

    /// One order fetch per distinct account whose `orders` field is selected.
    async fn fetch_orders(
        &self,
        roots: &[PlannedRoot],
        outcomes: &HashMap<usize, Outcome>,
        collector: &BatchCollector,
    ) -> OrdersByAccount {
        let mut wanted = BTreeSet::new();
        for (index, root) in roots.iter().enumerate() {
            let Some(selection) = root.kind.account_selection() else {
                continue;
            };
            if order_selections(selection).next().is_none() {
                continue;
            }
            for account in root_accounts(&root.kind, outcomes.get(&index), collector) {
                wanted.insert(account.id.clone());
            }
        }
        if wanted.is_empty() {
            return HashMap::new();
        }

        debug!(accounts = wanted.len(), "Fetching orders");
        let fetches = wanted.into_iter().map(|account_id| async move {
            let orders = self
                .orders
                .get_orders_for_account(account_id.clone())
                .await
                .map_err(|e| e.to_string());
            (account_id, orders)
        });
        join_all(fetches).await.into_iter().collect()
    }
}

/// Accounts produced by an account-typed root, as far as they resolved.
fn root_accounts<'a>(kind: &RootKind, outcome: Option<&'a Outcome>, collector: &'a BatchCollector) -> Vec<&'a Account> {
    match (kind, outcome) {
        (RootKind::AccountById { id, .. }, _) => match collector.accounts.lookup(id) {
            Lookup::Found(account) => vec![account],
            _ => Vec::new(),
        },
        (_, Some(Outcome::Accounts(Ok(accounts)))) => accounts.iter().collect(),
        (_, Some(Outcome::Account(Ok(account)))) => vec![account],
        _ => Vec::new(),
    }
}

fn order_selections(selection: &AccountSelection) -> impl Iterator<Item = &OrderSelection> {
    selection.iter().filter_map(|s| match &s.field {
        AccountField::Orders(orders) => Some(orders),
        _ => None,
    })
}

fn wants_live_product(selection: &OrderSelection) -> bool {
    selection.iter().any(|s| match &s.field {
        OrderField::Products(products) => products
            .iter()
            .any(|p| matches!(p.field, OrderedProductField::Product(_))),
        _ => false,
    })
}

/// Queues the product of every line item whose live `product` is selected.
fn register_live_products(
    roots: &[PlannedRoot],
    outcomes: &HashMap<usize, Outcome>,
    orders: &OrdersByAccount,
    collector: &mut BatchCollector,
) {
    let mut ids = BTreeSet::new();
    for (index, root) in roots.iter().enumerate() {
        if let RootKind::CreateOrder { selection, .. } = &root.kind {
            if let (true, Some(Outcome::Order(Ok(order)))) = (wants_live_product(selection), outcomes.get(&index)) {
                ids.extend(order.products.iter().map(|p| p.id.clone()));
            }
            continue;
        }
        let Some(selection) = root.kind.account_selection() else {
            continue;
        };
        if !order_selections(selection).any(wants_live_product) {
            continue;
        }
        for account in root_accounts(&root.kind, outcomes.get(&index), collector) {
            if let Some(Ok(account_orders)) = orders.get(&account.id) {
                for order in account_orders {
                    ids.extend(order.products.iter().map(|p| p.id.clone()));
                }
            }
        }
    }
    for id in &ids {
        collector.products.request(id);
    }
}

struct Assembler<'a> {
    collector: &'a BatchCollector,
    orders: &'a OrdersByAccount,
    errors: Vec<FieldError>,
}

impl<'a> Assembler<'a> {
    fn root(&mut self, root: &PlannedRoot, outcome: Option<&Outcome>) -> Value {
        let path = vec![PathSegment::Key(root.key.clone())];
        let collector = self.collector;
        match (&root.kind, outcome) {
            (RootKind::AccountById { id, list, selection }, _) => match collector.accounts.lookup(id) {
                Lookup::Found(account) if *list => json!([self.account(account, selection, &child(&path, 0usize))]),
                Lookup::Found(account) => self.account(account, selection, &path),
                Lookup::Missing if *list => json!([]),
                Lookup::Missing => Value::Null,
                Lookup::Failed(reason) => self.fail(path, reason),
            },
            (RootKind::ProductById { id, list, selection }, _) => match collector.products.lookup(id) {
                Lookup::Found(product) if *list => json!([self.product(product, selection)]),
                Lookup::Found(product) => self.product(product, selection),
                Lookup::Missing if *list => json!([]),
                Lookup::Missing => Value::Null,
                Lookup::Failed(reason) => self.fail(path, reason),
            },
            (RootKind::AccountPage { selection, .. }, Some(Outcome::Accounts(result))) => match result {
                Ok(accounts) => Value::Array(
                    accounts
                        .iter()
                        .enumerate()
                        .map(|(i, account)| self.account(account, selection, &child(&path, i)))
                        .collect(),
                ),
                Err(reason) => self.fail(path, reason),
            },
            (
                RootKind::ProductPage { selection, .. } | RootKind::ProductSearch { selection, .. },
                Some(Outcome::Products(result)),
            ) => match result {
                Ok(products) => Value::Array(products.iter().map(|p| self.product(p, selection)).collect()),
                Err(reason) => self.fail(path, reason),
            },
            (RootKind::CreateAccount { selection, .. }, Some(Outcome::Account(result))) => match result {
                Ok(account) => self.account(account, selection, &path),
                Err(reason) => self.fail(path, reason),
            },
            (RootKind::CreateProduct { selection, .. }, Some(Outcome::Product(result))) => match result {
                Ok(product) => self.product(product, selection),
                Err(reason) => self.fail(path, reason),
            },
            (RootKind::CreateOrder { selection, .. }, Some(Outcome::Order(result))) => match result {
                Ok(order) => self.order(order, selection, &path),
                Err(reason) => self.fail(path, reason),
            },
            _ => self.fail(path, "field was not resolved"),
        }
    }

    fn account(&mut self, account: &Account, selection: &AccountSelection, path: &[PathSegment]) -> Value {
        let orders = self.orders;
        let mut object = Map::new();
        for selected in selection {
            let value = match &selected.field {
                AccountField::Id => json!(account.id),
                AccountField::Name => json!(account.name),
                AccountField::Orders(order_selection) => {
                    let path = child(path, selected.key.as_str());
                    match orders.get(&account.id) {
                        Some(Ok(account_orders)) => Value::Array(
                            account_orders
                                .iter()
                                .enumerate()
                                .map(|(i, order)| self.order(order, order_selection, &child(&path, i)))
                                .collect(),
                        ),
                        Some(Err(reason)) => self.fail(path, reason),
                        None => json!([]),
                    }
                }
            };
            object.insert(selected.key.clone(), value);
        }
        Value::Object(object)
    }

    fn order(&mut self, order: &Order, selection: &OrderSelection, path: &[PathSegment]) -> Value {
        let mut object = Map::new();
        for selected in selection {
            let value = match &selected.field {
                OrderField::Id => json!(order.id),
                OrderField::CreatedAt => json!(order.created_at.to_rfc3339()),
                OrderField::TotalPrice => match order.total_price() {
                    Some(total) => decimal(total),
                    None => self.fail(child(path, selected.key.as_str()), "order total overflows"),
                },
                OrderField::Products(product_selection) => {
                    let path = child(path, selected.key.as_str());
                    Value::Array(
                        order
                            .products
                            .iter()
                            .enumerate()
                            .map(|(i, line)| self.ordered_product(line, product_selection, &child(&path, i)))
                            .collect(),
                    )
                }
            };
            object.insert(selected.key.clone(), value);
        }
        Value::Object(object)
    }

    fn ordered_product(
        &mut self,
        line: &OrderedProduct,
        selection: &OrderedProductSelection,
        path: &[PathSegment],
    ) -> Value {
        let collector = self.collector;
        let mut object = Map::new();
        for selected in selection {
            let value = match &selected.field {
                OrderedProductField::Id => json!(line.id),
                OrderedProductField::Name => json!(line.name),
                OrderedProductField::Description => json!(line.description),
                OrderedProductField::Price => decimal(line.price),
                OrderedProductField::Quantity => json!(line.quantity),
                OrderedProductField::Product(product_selection) => match collector.products.lookup(&line.id) {
                    Lookup::Found(product) => self.product(product, product_selection),
                    Lookup::Missing => Value::Null,
                    Lookup::Failed(reason) => self.fail(child(path, selected.key.as_str()), reason),
                },
            };
            object.insert(selected.key.clone(), value);
        }
        Value::Object(object)
    }

    fn product(&self, product: &Product, selection: &ProductSelection) -> Value {
        let object = selection
            .iter()
            .map(|selected| {
                let value = match selected.field {
                    ProductField::Id => json!(product.id),
                    ProductField::Name => json!(product.name),
                    ProductField::Description => json!(product.description),
                    ProductField::Price => decimal(product.price),
                };
                (selected.key.clone(), value)
            })
            .collect();
        Value::Object(object)
    }

    fn fail(&mut self, path: Vec<PathSegment>, message: &str) -> Value {
        self.errors.push(FieldError {
            message: message.to_string(),
            path,
        });
        Value::Null
    }
}

fn child(path: &[PathSegment], segment: impl Into<PathSegment>) -> Vec<PathSegment> {
    let mut path = path.to_vec();
    path.push(segment.into());
    path
}

/// A JSON number when the `f64` reads back as the same decimal, otherwise the
/// exact decimal string.
fn decimal(value: Decimal) -> Value {
    value
        .to_f64()
        .filter(|v| Decimal::from_str(&v.to_string()).is_ok_and(|back| back == value))
        .map_or_else(|| Value::String(value.normalize().to_string()), |v| json!(v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor_framework::ResourceActor;
    use crate::domain::{NewOrder, OrderLine};
    use crate::gateway::request::{leaves, Field};
    use crate::ids::IdGenerator;
    use crate::mock_framework::{start_fake_services, test_policy, FakeCatalog, FakeServices};
    use crate::orders::{OrderServer, OrderService, StoredOrder};
    use serde_json::json;

    fn fixtures() -> FakeCatalog {
        FakeCatalog::default()
            .with_product("p1", "Mug", "9.99")
            .with_product("p2", "Tea", "4.50")
    }

    fn start(fakes: &FakeServices) -> Gateway {
        let ids = IdGenerator::new();
        let (storage_actor, storage) = ResourceActor::<StoredOrder>::new("orders", 16, move || ids.next_id());
        tokio::spawn(storage_actor.run());
        let service = OrderService::new(fakes.accounts.clone(), fakes.catalog.clone(), storage);
        let (server, orders) = OrderServer::new(16, service, test_policy());
        tokio::spawn(server.run());
        Gateway::new(fakes.catalog.clone(), fakes.accounts.clone(), orders)
    }

    async fn place_order(gateway: &Gateway, account: &str, lines: Vec<OrderLine>) {
        gateway.orders.create_order(NewOrder::new(account, lines)).await.unwrap();
    }

    fn live_product_orders() -> Field {
        Field::new("orders").select(vec![Field::new("products").select(vec![
            Field::new("quantity"),
            Field::new("product").select(leaves(&["id", "name"])),
        ])])
    }

    #[tokio::test]
    async fn test_same_product_in_three_places_is_fetched_once() {
        let fakes = start_fake_services(fixtures(), &["a1"]);
        let gateway = start(&fakes);
        place_order(&gateway, "a1", vec![OrderLine::new("p1", 1)]).await;
        let before = fakes.catalog_state.count("get_products_by_ids");

        let request = Request::query(vec![
            Field::new("product").alias("first").arg("id", "p1").select(leaves(&["name"])),
            Field::new("product").alias("second").arg("id", "p1").select(leaves(&["price"])),
            Field::new("account")
                .arg("id", "a1")
                .select(vec![Field::new("name"), live_product_orders()]),
        ]);
        let response = gateway.execute(request).await.unwrap();

        assert!(response.errors.is_empty(), "{:?}", response.errors);
        assert_eq!(response.data["first"]["name"], "Mug");
        assert_eq!(response.data["second"]["price"], 9.99);
        assert_eq!(response.data["account"]["orders"][0]["products"][0]["product"]["id"], "p1");

        // The order service's own read counts once; the gateway adds exactly one.
        let calls = fakes.catalog_state.calls();
        let gateway_batches: Vec<_> = calls
            .iter()
            .skip(before)
            .filter(|c| c.method == "get_products_by_ids")
            .collect();
        assert_eq!(gateway_batches.len(), 2);
        assert_eq!(gateway_batches[1].ids, vec!["p1"]);
        assert_eq!(fakes.catalog_state.count("get_product"), 0);
    }

    #[tokio::test]
    async fn test_account_outage_nulls_only_account_fields() {
        let fakes = start_fake_services(fixtures(), &["a1"]);
        let gateway = start(&fakes);
        fakes.account_state.set_available(false);

        let request = Request::query(vec![
            Field::new("account").arg("id", "a1").select(leaves(&["id", "name"])),
            Field::new("product").arg("id", "p2").select(leaves(&["id", "name", "price"])),
            Field::new("products").select(leaves(&["id"])),
        ]);
        let response = gateway.execute(request).await.unwrap();

        assert_eq!(response.data["account"], Value::Null);
        assert_eq!(response.data["product"], json!({ "id": "p2", "name": "Tea", "price": 4.5 }));
        assert_eq!(response.data["products"], json!([{ "id": "p1" }, { "id": "p2" }]));
        assert_eq!(response.errors.len(), 1);
        assert_eq!(response.errors[0].path_string(), "account");
    }

    #[tokio::test]
    async fn test_accounts_by_id_share_one_batch() {
        let fakes = start_fake_services(fixtures(), &["a1", "a2"]);
        let gateway = start(&fakes);

        let request = Request::query(vec![
            Field::new("account").alias("x").arg("id", "a1").select(leaves(&["name"])),
            Field::new("accounts").arg("id", "a2").select(leaves(&["id"])),
            Field::new("account").alias("ghost").arg("id", "nobody").select(leaves(&["id"])),
        ]);
        let response = gateway.execute(request).await.unwrap();

        assert_eq!(response.data["x"]["name"], "a1");
        assert_eq!(response.data["accounts"], json!([{ "id": "a2" }]));
        assert_eq!(response.data["ghost"], Value::Null);
        assert!(response.errors.is_empty());
        assert_eq!(fakes.account_state.count("get_accounts_by_ids"), 1);
        assert_eq!(fakes.account_state.calls()[0].ids, vec!["a1", "a2", "nobody"]);
    }

    #[tokio::test]
    async fn test_catalog_outage_during_nested_resolution_keeps_order_data() {
        let fakes = start_fake_services(fixtures(), &["a1"]);
        let gateway = start(&fakes);
        place_order(&gateway, "a1", vec![OrderLine::new("p1", 2)]).await;
        fakes.catalog_state.set_available(false);

        let request = Request::query(vec![
            Field::new("account").arg("id", "a1").select(vec![Field::new("name"), live_product_orders()]),
        ]);
        let response = gateway.execute(request).await.unwrap();

        // Orders cannot be re-joined without the catalog, so the list fails.
        assert_eq!(response.data["account"]["name"], "a1");
        assert_eq!(response.data["account"]["orders"], Value::Null);
        assert_eq!(response.errors.len(), 1);
        assert_eq!(response.errors[0].path_string(), "account.orders");
    }

    #[tokio::test]
    async fn test_mutations_run_in_order_and_fail_independently() {
        let fakes = start_fake_services(fixtures(), &["a1"]);
        let gateway = start(&fakes);

        let request = Request::mutation(vec![
            Field::new("createProduct")
                .arg("name", "Kettle")
                .arg("price", "20.00")
                .select(leaves(&["id", "price"])),
            Field::new("createOrder")
                .alias("bad")
                .arg("accountId", "a1")
                .arg("products", json!([{ "id": "missing", "quantity": 1 }]))
                .select(leaves(&["id"])),
            Field::new("createOrder")
                .alias("good")
                .arg("accountId", "a1")
                .arg("products", json!([{ "id": "p1", "quantity": 2 }, { "id": "p2", "quantity": 1 }]))
                .select(vec![
                    Field::new("totalPrice"),
                    Field::new("products").select(vec![
                        Field::new("id"),
                        Field::new("product").select(leaves(&["name"])),
                    ]),
                ]),
        ]);
        let response = gateway.execute(request).await.unwrap();

        assert_eq!(response.data["createProduct"]["price"], 20.0);
        assert_eq!(response.data["bad"], Value::Null);
        assert_eq!(response.errors.len(), 1);
        assert_eq!(response.errors[0].path_string(), "bad");
        assert!(response.errors[0].message.contains("missing"));
        assert_eq!(response.data["good"]["totalPrice"], 24.48);
        assert_eq!(response.data["good"]["products"][1]["product"]["name"], "Tea");
    }

    #[tokio::test]
    async fn test_overflowing_order_total_fails_only_that_mutation() {
        let catalog = fixtures().with_product("p9", "Yacht", "50000000000000000000000000000");
        let fakes = start_fake_services(catalog, &["a1"]);
        let gateway = start(&fakes);

        let request = Request::mutation(vec![
            Field::new("createOrder")
                .alias("huge")
                .arg("accountId", "a1")
                .arg("products", json!([{ "id": "p9", "quantity": 2 }]))
                .select(leaves(&["totalPrice"])),
            Field::new("createOrder")
                .alias("fine")
                .arg("accountId", "a1")
                .arg("products", json!([{ "id": "p9", "quantity": 1 }]))
                .select(leaves(&["totalPrice"])),
        ]);
        let response = gateway.execute(request).await.unwrap();

        assert_eq!(response.data["huge"], Value::Null);
        assert_eq!(response.errors.len(), 1);
        assert_eq!(response.errors[0].path_string(), "huge");
        assert!(response.errors[0].message.contains("overflows"));
        assert_eq!(response.data["fine"]["totalPrice"], 5e28);
        let orders = gateway.orders.get_orders_for_account("a1".into()).await.unwrap();
        assert_eq!(orders.len(), 1);
    }

    #[tokio::test]
    async fn test_prices_without_exact_float_are_rendered_as_strings() {
        let catalog = fixtures().with_product("p9", "Rare", "12345678901234567.89");
        let fakes = start_fake_services(catalog, &[]);
        let gateway = start(&fakes);

        let request = Request::query(vec![
            Field::new("product").alias("rare").arg("id", "p9").select(leaves(&["price"])),
            Field::new("product").alias("mug").arg("id", "p1").select(leaves(&["price"])),
        ]);
        let response = gateway.execute(request).await.unwrap();

        assert_eq!(response.data["rare"]["price"], "12345678901234567.89");
        assert_eq!(response.data["mug"]["price"], 9.99);
    }

    #[test]
    fn test_decimal_encoding_keeps_exact_values() {
        assert_eq!(decimal(Decimal::new(1998, 2)), json!(19.98));
        assert_eq!(decimal(Decimal::new(2000, 2)), json!(20.0));
        assert_eq!(decimal(Decimal::MAX), json!("79228162514264337593543950335"));
        assert_eq!(decimal(Decimal::from_str("0.1000000000000000000000000001").unwrap()), json!("0.1000000000000000000000000001"));
    }

    #[tokio::test]
    async fn test_invalid_json_request_is_total_failure() {
        let fakes = start_fake_services(fixtures(), &[]);
        let gateway = start(&fakes);

        let response = gateway
            .execute_json(json!({ "fields": [{ "name": "nope", "fields": [{ "name": "id" }] }] }))
            .await;

        assert_eq!(response["data"], Value::Null);
        assert_eq!(response["errors"][0]["message"], "Invalid query: unknown query field `nope`");
        assert!(fakes.catalog_state.calls().is_empty());
    }

    #[tokio::test]
    async fn test_list_pagination_is_forwarded_unchanged() {
        let fakes = start_fake_services(fixtures(), &["a1"]);
        let gateway = start(&fakes);

        let request = Request::query(vec![
            Field::new("products").arg("skip", 1).arg("take", 5).select(leaves(&["id"])),
            Field::new("accounts").select(leaves(&["id"])),
        ]);
        let response = gateway.execute(request).await.unwrap();

        assert_eq!(response.data["products"], json!([{ "id": "p2" }]));
        assert_eq!(response.data["accounts"], json!([{ "id": "a1" }]));
    }
}
