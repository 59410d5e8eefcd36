use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use uuid::Uuid;

use crate::dto::auth::{LoginRequest, RegisterRequest, UpdateProfileRequest};
use crate::dto::cart::{AddToCartRequest, UpdateCartItemRequest};
use crate::dto::orders::{CreateOrderRequest, OrderStats, UpdateOrderStatusRequest};
use crate::dto::products::{CreateProductRequest, ProductQuery, UpdateProductRequest};
use crate::error::ApiError;
use crate::models::{AuthUser, Cart, Order, Product};

pub mod http;

pub use http::HttpApi;

/// Bearer token shared between the session store (which sets it on login and
/// clears it on logout) and the HTTP client (which attaches it to requests).
#[derive(Debug, Clone, Default)]
pub struct SessionToken(Arc<RwLock<Option<String>>>);

impl SessionToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<String> {
        match self.0.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn set(&self, token: impl Into<String>) {
        let mut guard = match self.0.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(token.into());
    }

    pub fn clear(&self) {
        let mut guard = match self.0.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = None;
    }
}

/// Remote cart endpoints. Every mutation returns the full updated cart.
#[async_trait]
pub trait CartApi: Send + Sync {
    async fn fetch_cart(&self) -> Result<Cart, ApiError>;
    async fn add_item(&self, request: &AddToCartRequest) -> Result<Cart, ApiError>;
    async fn update_item(
        &self,
        item_id: Uuid,
        request: &UpdateCartItemRequest,
    ) -> Result<Cart, ApiError>;
    async fn remove_item(&self, item_id: Uuid) -> Result<Cart, ApiError>;
    async fn clear_cart(&self) -> Result<Cart, ApiError>;
}

/// Remote wishlist endpoints. The fetch returns populated products; add and
/// remove treat any non-error response as success.
#[async_trait]
pub trait WishlistApi: Send + Sync {
    async fn fetch_wishlist(&self) -> Result<Vec<Product>, ApiError>;
    async fn add_to_wishlist(&self, product_id: Uuid) -> Result<(), ApiError>;
    async fn remove_from_wishlist(&self, product_id: Uuid) -> Result<(), ApiError>;
    async fn clear_wishlist(&self) -> Result<(), ApiError>;
}

#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> Result<AuthUser, ApiError>;
    async fn register(&self, request: &RegisterRequest) -> Result<AuthUser, ApiError>;
    async fn profile(&self) -> Result<AuthUser, ApiError>;
    async fn update_profile(&self, request: &UpdateProfileRequest) -> Result<AuthUser, ApiError>;
}

#[async_trait]
pub trait OrdersApi: Send + Sync {
    async fn create_order(&self, request: &CreateOrderRequest) -> Result<Order, ApiError>;
    async fn create_guest_order(&self, request: &CreateOrderRequest) -> Result<Order, ApiError>;
    async fn my_orders(&self) -> Result<Vec<Order>, ApiError>;
    async fn order(&self, id: Uuid) -> Result<Order, ApiError>;
    async fn all_orders(&self) -> Result<Vec<Order>, ApiError>;
    async fn update_order_status(
        &self,
        id: Uuid,
        request: &UpdateOrderStatusRequest,
    ) -> Result<Order, ApiError>;
    async fn order_stats(&self) -> Result<OrderStats, ApiError>;
    async fn delete_order(&self, id: Uuid) -> Result<(), ApiError>;
}

#[async_trait]
pub trait ProductsApi: Send + Sync {
    async fn list_products(&self, query: &ProductQuery) -> Result<Vec<Product>, ApiError>;
    async fn featured_products(&self) -> Result<Vec<Product>, ApiError>;
    async fn product(&self, id: Uuid) -> Result<Product, ApiError>;
    async fn create_product(&self, request: &CreateProductRequest) -> Result<Product, ApiError>;
    async fn update_product(
        &self,
        id: Uuid,
        request: &UpdateProductRequest,
    ) -> Result<Product, ApiError>;
    async fn delete_product(&self, id: Uuid) -> Result<(), ApiError>;
}
