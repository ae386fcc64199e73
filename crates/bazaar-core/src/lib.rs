//! bazaar-core - Core library for Bazaar
//!
//! This crate holds the product model, the remote store contract, and the
//! client-side catalog synchronization used by every Bazaar front end.

pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod search;
pub mod store;
pub mod util;

pub use catalog::{
    CatalogStatus, CatalogSynchronizer, CatalogView, DeleteOutcome, OptimisticMutationController,
};
pub use error::{Error, Result};
pub use models::{NewProduct, Product, ProductId, ProductRecord};
pub use store::{ChangeEvent, RemoteStore};
