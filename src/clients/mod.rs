//! Typed remote clients for the catalog, account and order services.
//!
//! Reads are retried on transient failures; creates are sent exactly once.

#[macro_use]
mod macros;

mod account_client;
mod catalog_client;
mod order_client;

pub use account_client::*;
pub use catalog_client::*;
pub use order_client::*;
