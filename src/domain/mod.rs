pub mod account;
pub mod product;
pub mod order;

pub use account::*;
pub use product::*;
pub use order::*;
