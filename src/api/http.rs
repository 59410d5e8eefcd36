use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::dto::auth::{LoginRequest, RegisterRequest, UpdateProfileRequest};
use crate::dto::cart::{AddToCartRequest, UpdateCartItemRequest};
use crate::dto::orders::{
    CreateOrderRequest, OrderStats, StockConflictLine, UpdateOrderStatusRequest,
};
use crate::dto::products::{CreateProductRequest, ProductQuery, UpdateProductRequest};
use crate::error::ApiError;
use crate::models::{AuthUser, Cart, Order, Product};

use super::{AuthApi, CartApi, OrdersApi, ProductsApi, SessionToken, WishlistApi};

/// HTTP client for the storefront backend. Attaches the shared session token
/// as a bearer header when one is set.
pub struct HttpApi {
    base_url: String,
    http: reqwest::Client,
    token: SessionToken,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>, token: SessionToken) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.token.get() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = self.authorize(builder).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::error_from(status.as_u16(), &body));
        }
        response.json().await.map_err(ApiError::Decode)
    }

    /// For endpoints whose success body carries nothing the client needs.
    async fn send_unit(&self, builder: RequestBuilder) -> Result<(), ApiError> {
        let response = self.authorize(builder).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::error_from(status.as_u16(), &body));
        }
        Ok(())
    }

    /// Decodes an error body: a stock-conflict list first, then a `{message}`
    /// object, then the raw text.
    fn error_from(status: u16, body: &str) -> ApiError {
        if let Ok(lines) = serde_json::from_str::<Vec<StockConflictLine>>(body) {
            if !lines.is_empty() {
                return ApiError::Status {
                    status,
                    message: "stock conflict".to_string(),
                    conflicts: lines.into_iter().map(|line| line.error).collect(),
                };
            }
        }
        let message = serde_json::from_str::<ErrorBody>(body)
            .map(|parsed| parsed.message)
            .unwrap_or_else(|_| {
                if body.is_empty() {
                    "request failed".to_string()
                } else {
                    body.to_string()
                }
            });
        ApiError::status(status, message)
    }
}

#[async_trait]
impl CartApi for HttpApi {
    async fn fetch_cart(&self) -> Result<Cart, ApiError> {
        self.send(self.http.get(self.url("/cart"))).await
    }

    async fn add_item(&self, request: &AddToCartRequest) -> Result<Cart, ApiError> {
        self.send(self.http.post(self.url("/cart")).json(request))
            .await
    }

    async fn update_item(
        &self,
        item_id: Uuid,
        request: &UpdateCartItemRequest,
    ) -> Result<Cart, ApiError> {
        self.send(
            self.http
                .put(self.url(&format!("/cart/{item_id}")))
                .json(request),
        )
        .await
    }

    async fn remove_item(&self, item_id: Uuid) -> Result<Cart, ApiError> {
        self.send(self.http.delete(self.url(&format!("/cart/{item_id}"))))
            .await
    }

    async fn clear_cart(&self) -> Result<Cart, ApiError> {
        self.send(self.http.delete(self.url("/cart"))).await
    }
}

#[async_trait]
impl WishlistApi for HttpApi {
    async fn fetch_wishlist(&self) -> Result<Vec<Product>, ApiError> {
        self.send(self.http.get(self.url("/wishlist"))).await
    }

    async fn add_to_wishlist(&self, product_id: Uuid) -> Result<(), ApiError> {
        self.send_unit(self.http.post(self.url(&format!("/wishlist/{product_id}"))))
            .await
    }

    async fn remove_from_wishlist(&self, product_id: Uuid) -> Result<(), ApiError> {
        self.send_unit(
            self.http
                .delete(self.url(&format!("/wishlist/{product_id}"))),
        )
        .await
    }

    async fn clear_wishlist(&self) -> Result<(), ApiError> {
        self.send_unit(self.http.delete(self.url("/wishlist"))).await
    }
}

#[async_trait]
impl AuthApi for HttpApi {
    async fn login(&self, request: &LoginRequest) -> Result<AuthUser, ApiError> {
        self.send(self.http.post(self.url("/auth/login")).json(request))
            .await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthUser, ApiError> {
        self.send(self.http.post(self.url("/auth/register")).json(request))
            .await
    }

    async fn profile(&self) -> Result<AuthUser, ApiError> {
        self.send(self.http.get(self.url("/auth/profile"))).await
    }

    async fn update_profile(&self, request: &UpdateProfileRequest) -> Result<AuthUser, ApiError> {
        self.send(self.http.put(self.url("/auth/profile")).json(request))
            .await
    }
}

#[async_trait]
impl OrdersApi for HttpApi {
    async fn create_order(&self, request: &CreateOrderRequest) -> Result<Order, ApiError> {
        self.send(self.http.post(self.url("/orders")).json(request))
            .await
    }

    async fn create_guest_order(&self, request: &CreateOrderRequest) -> Result<Order, ApiError> {
        self.send(self.http.post(self.url("/orders/guest")).json(request))
            .await
    }

    async fn my_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.send(self.http.get(self.url("/orders"))).await
    }

    async fn order(&self, id: Uuid) -> Result<Order, ApiError> {
        self.send(self.http.get(self.url(&format!("/orders/{id}"))))
            .await
    }

    async fn all_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.send(self.http.get(self.url("/orders/all"))).await
    }

    async fn update_order_status(
        &self,
        id: Uuid,
        request: &UpdateOrderStatusRequest,
    ) -> Result<Order, ApiError> {
        self.send(
            self.http
                .put(self.url(&format!("/orders/{id}/status")))
                .json(request),
        )
        .await
    }

    async fn order_stats(&self) -> Result<OrderStats, ApiError> {
        self.send(self.http.get(self.url("/orders/stats"))).await
    }

    async fn delete_order(&self, id: Uuid) -> Result<(), ApiError> {
        self.send_unit(self.http.delete(self.url(&format!("/orders/{id}"))))
            .await
    }
}

#[async_trait]
impl ProductsApi for HttpApi {
    async fn list_products(&self, query: &ProductQuery) -> Result<Vec<Product>, ApiError> {
        self.send(self.http.get(self.url("/products")).query(query))
            .await
    }

    async fn featured_products(&self) -> Result<Vec<Product>, ApiError> {
        self.send(self.http.get(self.url("/products/featured"))).await
    }

    async fn product(&self, id: Uuid) -> Result<Product, ApiError> {
        self.send(self.http.get(self.url(&format!("/products/{id}"))))
            .await
    }

    async fn create_product(&self, request: &CreateProductRequest) -> Result<Product, ApiError> {
        self.send(self.http.post(self.url("/products")).json(request))
            .await
    }

    async fn update_product(
        &self,
        id: Uuid,
        request: &UpdateProductRequest,
    ) -> Result<Product, ApiError> {
        self.send(
            self.http
                .put(self.url(&format!("/products/{id}")))
                .json(request),
        )
        .await
    }

    async fn delete_product(&self, id: Uuid) -> Result<(), ApiError> {
        self.send_unit(self.http.delete(self.url(&format!("/products/{id}"))))
            .await
    }
}
