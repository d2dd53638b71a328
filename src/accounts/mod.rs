//! Account service. Account storage is a [`ResourceActor`](crate::actor_framework::ResourceActor);
//! other services reach accounts only through [`AccountClient`](crate::clients::AccountClient).

mod entity;
mod server;

pub use server::*;
