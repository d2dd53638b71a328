//! Storefront: catalog, account and order services behind a batching query
//! gateway, each service an actor reachable only through its typed client.

pub mod accounts;
pub mod actor_framework;
pub mod app_system;
pub mod catalog;
pub mod clients;
pub mod config;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod ids;
pub mod index;
pub mod messages;
pub mod orders;
pub mod transport;

#[cfg(test)]
mod mock_framework;
