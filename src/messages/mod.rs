use crate::domain::{Account, NewOrder, NewProduct, Order, Product};
use crate::error::{AccountError, CatalogError, OrderError};
use crate::transport::Reply;

/// Typed message enums for service communication. Each variant includes its
/// parameters and a oneshot channel for the response.

#[derive(Debug)]
pub enum CatalogRequest {
    CreateProduct {
        product: NewProduct,
        respond_to: Reply<Product, CatalogError>,
    },
    GetProduct {
        id: String,
        respond_to: Reply<Product, CatalogError>,
    },
    ListProducts {
        skip: u64,
        take: u64,
        respond_to: Reply<Vec<Product>, CatalogError>,
    },
    GetProductsByIds {
        ids: Vec<String>,
        respond_to: Reply<Vec<Product>, CatalogError>,
    },
    SearchProducts {
        query: String,
        skip: u64,
        take: u64,
        respond_to: Reply<Vec<Product>, CatalogError>,
    },
}

#[derive(Debug)]
pub enum AccountRequest {
    CreateAccount {
        name: String,
        respond_to: Reply<Account, AccountError>,
    },
    GetAccount {
        id: String,
        respond_to: Reply<Account, AccountError>,
    },
    ListAccounts {
        skip: u64,
        take: u64,
        respond_to: Reply<Vec<Account>, AccountError>,
    },
    GetAccountsByIds {
        ids: Vec<String>,
        respond_to: Reply<Vec<Account>, AccountError>,
    },
}

#[derive(Debug)]
pub enum OrderRequest {
    CreateOrder {
        order: NewOrder,
        respond_to: Reply<Order, OrderError>,
    },
    GetOrdersForAccount {
        account_id: String,
        respond_to: Reply<Vec<Order>, OrderError>,
    },
}
