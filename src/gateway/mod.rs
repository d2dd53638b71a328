//! Query gateway: one request graph in, one response graph out, composed from
//! the catalog, account and order services.
//!
//! Repeated references to products or accounts within one request are batched
//! through a request-scoped collector. A failing downstream service nulls only
//! the fields that depend on it.

mod collector;
mod request;
mod resolver;
mod response;
mod schema;

pub use collector::{Batch, BatchCollector, Keyed, Lookup};
pub use request::{leaves, Field, Operation, Request};
pub use resolver::Gateway;
pub use response::{FieldError, PathSegment, Response};
