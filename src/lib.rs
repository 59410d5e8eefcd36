pub mod api;
pub mod checkout;
pub mod config;
pub mod dto;
pub mod error;
pub mod models;
pub mod notify;
pub mod storage;
pub mod stores;

pub use config::StorefrontConfig;
pub use error::{ApiError, CapacityError, CheckoutError, StoreError, StoreResult};
pub use stores::Storefront;
