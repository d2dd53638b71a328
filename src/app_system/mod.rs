//! System orchestration, startup, and shutdown logic.

mod logging;
mod startup;
mod storefront;

pub use logging::setup_tracing;
pub use startup::wait_forever;
pub use storefront::Storefront;
