//! Product catalog: document repository, business rules and the service actor
//! that exposes them to remote callers.

mod repository;
mod server;
mod service;

pub use repository::*;
pub use server::*;
pub use service::*;
