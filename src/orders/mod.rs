//! Order aggregation: composes orders from account checks, batched catalog
//! lookups and order storage, and re-joins stored orders with live catalog data
//! on read.

mod entity;
mod server;
mod service;

pub use entity::*;
pub use server::*;
pub use service::*;
