//! Validation of a request graph against the gateway's object graph, and its
//! translation into a plan of typed root fields.
//!
//! Root fields:
//! - query: `accounts(id?, skip?, take?)`, `account(id)`,
//!   `products(id?, query?, skip?, take?)`, `product(id)`
//! - mutation: `createAccount(name)`, `createProduct(name, description, price)`,
//!   `createOrder(accountId, products: [{id, quantity}], idempotencyKey?)`
//!
//! Types: `Account { id name orders }`, `Product { id name description price }`,
//! `Order { id createdAt totalPrice products }` and
//! `OrderedProduct { id name description price quantity product }`.

use std::collections::HashSet;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;

use super::request::{Field, Operation, Request};
use crate::domain::{NewOrder, NewProduct, OrderLine};
use crate::error::GatewayError;

/// A selected field together with its response key.
#[derive(Debug, Clone, PartialEq)]
pub struct Selected<F> {
    pub key: String,
    pub field: F,
}

pub type AccountSelection = Vec<Selected<AccountField>>;
pub type ProductSelection = Vec<Selected<ProductField>>;
pub type OrderSelection = Vec<Selected<OrderField>>;
pub type OrderedProductSelection = Vec<Selected<OrderedProductField>>;

#[derive(Debug, Clone, PartialEq)]
pub enum AccountField {
    Id,
    Name,
    Orders(OrderSelection),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProductField {
    Id,
    Name,
    Description,
    Price,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OrderField {
    Id,
    CreatedAt,
    TotalPrice,
    Products(OrderedProductSelection),
}

#[derive(Debug, Clone, PartialEq)]
pub enum OrderedProductField {
    Id,
    Name,
    Description,
    Price,
    Quantity,
    /// The live catalog product behind the line item.
    Product(ProductSelection),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RootKind {
    /// `account(id)`, or `accounts(id)` when `list` is set.
    AccountById {
        id: String,
        list: bool,
        selection: AccountSelection,
    },
    AccountPage {
        skip: u64,
        take: u64,
        selection: AccountSelection,
    },
    ProductById {
        id: String,
        list: bool,
        selection: ProductSelection,
    },
    ProductPage {
        skip: u64,
        take: u64,
        selection: ProductSelection,
    },
    ProductSearch {
        query: String,
        skip: u64,
        take: u64,
        selection: ProductSelection,
    },
    CreateAccount {
        name: String,
        selection: AccountSelection,
    },
    CreateProduct {
        product: NewProduct,
        selection: ProductSelection,
    },
    CreateOrder {
        order: NewOrder,
        selection: OrderSelection,
    },
}

impl RootKind {
    pub fn account_selection(&self) -> Option<&AccountSelection> {
        match self {
            RootKind::AccountById { selection, .. }
            | RootKind::AccountPage { selection, .. }
            | RootKind::CreateAccount { selection, .. } => Some(selection),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedRoot {
    pub key: String,
    pub kind: RootKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub roots: Vec<PlannedRoot>,
}

/// Validates the whole request up front. Any unknown field, unknown argument
/// or malformed argument rejects the request as a whole.
pub fn plan(request: &Request) -> Result<Plan, GatewayError> {
    if request.fields.is_empty() {
        return Err(invalid("request selects no fields"));
    }
    unique_keys(&request.fields)?;

    let roots = request
        .fields
        .iter()
        .map(|field| {
            let kind = match request.operation {
                Operation::Query => plan_query(field)?,
                Operation::Mutation => plan_mutation(field)?,
            };
            Ok(PlannedRoot {
                key: field.response_key().to_string(),
                kind,
            })
        })
        .collect::<Result<Vec<_>, GatewayError>>()?;

    Ok(Plan { roots })
}

fn plan_query(field: &Field) -> Result<RootKind, GatewayError> {
    match field.name.as_str() {
        "account" => {
            allow_args(field, &["id"])?;
            Ok(RootKind::AccountById {
                id: required_string(field, "id")?,
                list: false,
                selection: selection(field)?,
            })
        }
        "accounts" => {
            allow_args(field, &["id", "skip", "take"])?;
            let selection = selection(field)?;
            Ok(match optional_string(field, "id")? {
                Some(id) => RootKind::AccountById { id, list: true, selection },
                None => RootKind::AccountPage {
                    skip: page_arg(field, "skip")?,
                    take: page_arg(field, "take")?,
                    selection,
                },
            })
        }
        "product" => {
            allow_args(field, &["id"])?;
            Ok(RootKind::ProductById {
                id: required_string(field, "id")?,
                list: false,
                selection: selection(field)?,
            })
        }
        "products" => {
            allow_args(field, &["id", "query", "skip", "take"])?;
            let selection = selection(field)?;
            let skip = page_arg(field, "skip")?;
            let take = page_arg(field, "take")?;
            if let Some(id) = optional_string(field, "id")? {
                return Ok(RootKind::ProductById { id, list: true, selection });
            }
            Ok(match optional_string(field, "query")? {
                Some(query) => RootKind::ProductSearch { query, skip, take, selection },
                None => RootKind::ProductPage { skip, take, selection },
            })
        }
        other if is_mutation(other) => Err(invalid(format!("`{other}` is a mutation field"))),
        other => Err(invalid(format!("unknown query field `{other}`"))),
    }
}

fn plan_mutation(field: &Field) -> Result<RootKind, GatewayError> {
    match field.name.as_str() {
        "createAccount" => {
            allow_args(field, &["name"])?;
            Ok(RootKind::CreateAccount {
                name: required_string(field, "name")?,
                selection: selection(field)?,
            })
        }
        "createProduct" => {
            allow_args(field, &["name", "description", "price"])?;
            let product = NewProduct::new(
                required_string(field, "name")?,
                optional_string(field, "description")?.unwrap_or_default(),
                decimal_arg(field, "price")?,
            );
            Ok(RootKind::CreateProduct {
                product,
                selection: selection(field)?,
            })
        }
        "createOrder" => {
            allow_args(field, &["accountId", "products", "idempotencyKey"])?;
            let mut order = NewOrder::new(required_string(field, "accountId")?, order_lines(field)?);
            if let Some(key) = optional_string(field, "idempotencyKey")? {
                order = order.with_idempotency_key(key);
            }
            Ok(RootKind::CreateOrder {
                order,
                selection: selection(field)?,
            })
        }
        other => Err(invalid(format!("unknown mutation field `{other}`"))),
    }
}

fn is_mutation(name: &str) -> bool {
    matches!(name, "createAccount" | "createProduct" | "createOrder")
}

// =============================================================================
// SELECTIONS
// =============================================================================

trait ObjectType: Sized {
    const NAME: &'static str;

    fn field(field: &Field) -> Result<Self, GatewayError>;
}

impl ObjectType for AccountField {
    const NAME: &'static str = "Account";

    fn field(field: &Field) -> Result<Self, GatewayError> {
        match field.name.as_str() {
            "id" => leaf::<Self>(field).map(|_| AccountField::Id),
            "name" => leaf::<Self>(field).map(|_| AccountField::Name),
            "orders" => selection(field).map(AccountField::Orders),
            other => Err(unknown_field::<Self>(other)),
        }
    }
}

impl ObjectType for ProductField {
    const NAME: &'static str = "Product";

    fn field(field: &Field) -> Result<Self, GatewayError> {
        let kind = match field.name.as_str() {
            "id" => ProductField::Id,
            "name" => ProductField::Name,
            "description" => ProductField::Description,
            "price" => ProductField::Price,
            other => return Err(unknown_field::<Self>(other)),
        };
        leaf::<Self>(field).map(|_| kind)
    }
}

impl ObjectType for OrderField {
    const NAME: &'static str = "Order";

    fn field(field: &Field) -> Result<Self, GatewayError> {
        match field.name.as_str() {
            "id" => leaf::<Self>(field).map(|_| OrderField::Id),
            "createdAt" => leaf::<Self>(field).map(|_| OrderField::CreatedAt),
            "totalPrice" => leaf::<Self>(field).map(|_| OrderField::TotalPrice),
            "products" => selection(field).map(OrderField::Products),
            other => Err(unknown_field::<Self>(other)),
        }
    }
}

impl ObjectType for OrderedProductField {
    const NAME: &'static str = "OrderedProduct";

    fn field(field: &Field) -> Result<Self, GatewayError> {
        match field.name.as_str() {
            "id" => leaf::<Self>(field).map(|_| OrderedProductField::Id),
            "name" => leaf::<Self>(field).map(|_| OrderedProductField::Name),
            "description" => leaf::<Self>(field).map(|_| OrderedProductField::Description),
            "price" => leaf::<Self>(field).map(|_| OrderedProductField::Price),
            "quantity" => leaf::<Self>(field).map(|_| OrderedProductField::Quantity),
            "product" => selection(field).map(OrderedProductField::Product),
            other => Err(unknown_field::<Self>(other)),
        }
    }
}

fn selection<F: ObjectType>(field: &Field) -> Result<Vec<Selected<F>>, GatewayError> {
    if field.fields.is_empty() {
        return Err(invalid(format!(
            "field `{}` of type {} needs a selection",
            field.response_key(),
            F::NAME
        )));
    }
    unique_keys(&field.fields)?;
    field
        .fields
        .iter()
        .map(|nested| {
            if !nested.args.is_empty() {
                return Err(invalid(format!("field `{}.{}` takes no arguments", F::NAME, nested.name)));
            }
            Ok(Selected {
                key: nested.response_key().to_string(),
                field: F::field(nested)?,
            })
        })
        .collect()
}

fn leaf<F: ObjectType>(field: &Field) -> Result<(), GatewayError> {
    if field.fields.is_empty() {
        Ok(())
    } else {
        Err(invalid(format!("scalar field `{}.{}` cannot have a selection", F::NAME, field.name)))
    }
}

fn unknown_field<F: ObjectType>(name: &str) -> GatewayError {
    invalid(format!("unknown field `{name}` on type {}", F::NAME))
}

fn unique_keys(fields: &[Field]) -> Result<(), GatewayError> {
    let mut seen = HashSet::new();
    match fields.iter().find(|f| !seen.insert(f.response_key())) {
        Some(dup) => Err(invalid(format!("duplicate response key `{}`", dup.response_key()))),
        None => Ok(()),
    }
}

// =============================================================================
// ARGUMENTS
// =============================================================================

fn allow_args(field: &Field, allowed: &[&str]) -> Result<(), GatewayError> {
    match field.args.keys().find(|name| !allowed.contains(&name.as_str())) {
        Some(name) => Err(invalid(format!("unknown argument `{name}` on `{}`", field.name))),
        None => Ok(()),
    }
}

fn optional_string(field: &Field, name: &str) -> Result<Option<String>, GatewayError> {
    match field.args.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(invalid(format!("argument `{name}` on `{}` must be a string", field.name))),
    }
}

fn required_string(field: &Field, name: &str) -> Result<String, GatewayError> {
    optional_string(field, name)?
        .ok_or_else(|| invalid(format!("missing argument `{name}` on `{}`", field.name)))
}

/// `skip`/`take` default to 0; the owning service applies its page clamp.
fn page_arg(field: &Field, name: &str) -> Result<u64, GatewayError> {
    match field.args.get(name) {
        None | Some(Value::Null) => Ok(0),
        Some(value) => value.as_u64().ok_or_else(|| {
            invalid(format!(
                "argument `{name}` on `{}` must be a non-negative integer",
                field.name
            ))
        }),
    }
}

/// Accepts a JSON number or a decimal string.
fn decimal_arg(field: &Field, name: &str) -> Result<Decimal, GatewayError> {
    let text = match field.args.get(name) {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        None | Some(Value::Null) => {
            return Err(invalid(format!("missing argument `{name}` on `{}`", field.name)))
        }
        Some(_) => return Err(invalid(format!("argument `{name}` must be a decimal"))),
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| invalid(format!("argument `{name}` is not a decimal: {text}")))
}

fn order_lines(field: &Field) -> Result<Vec<OrderLine>, GatewayError> {
    let Some(Value::Array(items)) = field.args.get("products") else {
        return Err(invalid("argument `products` on `createOrder` must be a list"));
    };
    items
        .iter()
        .map(|item| {
            let id = item
                .get("id")
                .and_then(Value::as_str)
                .ok_or_else(|| invalid("every ordered product needs a string `id`"))?;
            let quantity = item
                .get("quantity")
                .and_then(Value::as_u64)
                .and_then(|q| u32::try_from(q).ok())
                .ok_or_else(|| invalid(format!("quantity for product `{id}` must be a non-negative integer")))?;
            Ok(OrderLine::new(id, quantity))
        })
        .collect()
}

fn invalid(message: impl Into<String>) -> GatewayError {
    GatewayError::InvalidQuery(message.into())
}
