#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use storefront_client::api::{
    AuthApi, CartApi, OrdersApi, ProductsApi, SessionToken, WishlistApi,
};
use storefront_client::dto::auth::{LoginRequest, RegisterRequest, UpdateProfileRequest};
use storefront_client::dto::cart::{AddToCartRequest, UpdateCartItemRequest};
use storefront_client::dto::orders::{CreateOrderRequest, OrderStats, UpdateOrderStatusRequest};
use storefront_client::dto::products::{CreateProductRequest, ProductQuery, UpdateProductRequest};
use storefront_client::error::ApiError;
use storefront_client::models::{
    AuthUser, Cart, CartItem, Color, Order, Product, StockLevels,
};
use storefront_client::notify::Notifier;
use storefront_client::storage::GuestStorage;
use storefront_client::stores::Storefront;

// ---------------------------------------------------------------------------
// In-memory guest storage

#[derive(Default)]
pub struct MemoryStorage {
    data: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn raw(&self, key: &str) -> Option<String> {
        self.data.lock().unwrap().get(key).cloned()
    }

    pub fn set_raw(&self, key: &str, value: &str) {
        self.data
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }
}

impl GuestStorage for MemoryStorage {
    fn read(&self, key: &str) -> storefront_client::StoreResult<Option<String>> {
        Ok(self.data.lock().unwrap().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> storefront_client::StoreResult<()> {
        self.data
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> storefront_client::StoreResult<()> {
        self.data.lock().unwrap().remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Recording notifier

#[derive(Default)]
pub struct RecordingNotifier {
    successes: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn successes(&self) -> Vec<String> {
        self.successes.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.successes.lock().unwrap().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}

// ---------------------------------------------------------------------------
// Mock storefront backend

#[derive(Default)]
pub struct MockState {
    pub products: HashMap<Uuid, Product>,
    pub cart: Cart,
    pub wishlist: Vec<Product>,
    pub orders: Vec<Order>,
    pub user: Option<AuthUser>,

    // Call recording, in arrival order.
    pub cart_add_calls: Vec<AddToCartRequest>,
    pub wishlist_add_calls: Vec<Uuid>,
    pub order_calls: usize,
    pub guest_order_calls: usize,

    // Failure injection.
    pub fail_cart_add_once: bool,
    pub fail_cart_update: bool,
    pub fail_wishlist_add: bool,
    pub order_conflicts: Option<Vec<String>>,
}

/// In-memory stand-in for the remote REST API: merges cart lines by
/// (product, size, color) and recomputes totals the way the backend does.
#[derive(Default)]
pub struct MockApi {
    state: Mutex<MockState>,
    latency: Mutex<Option<Duration>>,
}

impl MockApi {
    pub fn with_products(products: Vec<Product>) -> Self {
        let api = Self::default();
        {
            let mut state = api.state.lock().unwrap();
            for product in products {
                state.products.insert(product.id, product);
            }
        }
        api
    }

    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = Some(latency);
    }

    async fn delay(&self) {
        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl CartApi for MockApi {
    async fn fetch_cart(&self) -> Result<Cart, ApiError> {
        self.delay().await;
        Ok(self.state().cart.clone())
    }

    async fn add_item(&self, request: &AddToCartRequest) -> Result<Cart, ApiError> {
        self.delay().await;
        let mut state = self.state();
        state.cart_add_calls.push(request.clone());
        if state.fail_cart_add_once {
            state.fail_cart_add_once = false;
            return Err(ApiError::status(500, "injected cart add failure"));
        }
        let product = state
            .products
            .get(&request.product_id)
            .cloned()
            .ok_or_else(|| ApiError::status(404, "product not found"))?;
        let color_name = request.color.as_ref().map(|c| c.name.clone());
        match state.cart.items.iter_mut().find(|item| {
            item.matches(request.product_id, &request.size, color_name.as_deref())
        }) {
            Some(line) => line.quantity += request.quantity,
            None => {
                let price = product.price;
                state.cart.items.push(CartItem {
                    id: Uuid::new_v4(),
                    product,
                    quantity: request.quantity,
                    size: request.size.clone(),
                    color: request.color.clone(),
                    price,
                });
            }
        }
        state.cart.recompute_total();
        Ok(state.cart.clone())
    }

    async fn update_item(
        &self,
        item_id: Uuid,
        request: &UpdateCartItemRequest,
    ) -> Result<Cart, ApiError> {
        self.delay().await;
        let mut state = self.state();
        if state.fail_cart_update {
            return Err(ApiError::status(500, "injected cart update failure"));
        }
        if request.quantity == 0 {
            state.cart.items.retain(|item| item.id != item_id);
        } else if let Some(line) = state.cart.items.iter_mut().find(|item| item.id == item_id) {
            line.quantity = request.quantity;
        }
        state.cart.recompute_total();
        Ok(state.cart.clone())
    }

    async fn remove_item(&self, item_id: Uuid) -> Result<Cart, ApiError> {
        self.delay().await;
        let mut state = self.state();
        state.cart.items.retain(|item| item.id != item_id);
        state.cart.recompute_total();
        Ok(state.cart.clone())
    }

    async fn clear_cart(&self) -> Result<Cart, ApiError> {
        self.delay().await;
        let mut state = self.state();
        state.cart = Cart::default();
        Ok(state.cart.clone())
    }
}

#[async_trait]
impl WishlistApi for MockApi {
    async fn fetch_wishlist(&self) -> Result<Vec<Product>, ApiError> {
        self.delay().await;
        Ok(self.state().wishlist.clone())
    }

    async fn add_to_wishlist(&self, product_id: Uuid) -> Result<(), ApiError> {
        self.delay().await;
        let mut state = self.state();
        state.wishlist_add_calls.push(product_id);
        if state.fail_wishlist_add {
            return Err(ApiError::status(500, "injected wishlist add failure"));
        }
        let product = state
            .products
            .get(&product_id)
            .cloned()
            .ok_or_else(|| ApiError::status(404, "product not found"))?;
        if !state.wishlist.iter().any(|p| p.id == product_id) {
            state.wishlist.push(product);
        }
        Ok(())
    }

    async fn remove_from_wishlist(&self, product_id: Uuid) -> Result<(), ApiError> {
        self.delay().await;
        self.state().wishlist.retain(|p| p.id != product_id);
        Ok(())
    }

    async fn clear_wishlist(&self) -> Result<(), ApiError> {
        self.delay().await;
        self.state().wishlist.clear();
        Ok(())
    }
}

#[async_trait]
impl AuthApi for MockApi {
    async fn login(&self, request: &LoginRequest) -> Result<AuthUser, ApiError> {
        self.delay().await;
        let user = AuthUser {
            id: Uuid::new_v4(),
            name: "Test Shopper".to_string(),
            email: request.email.clone(),
            role: "user".to_string(),
            token: "test-token".to_string(),
            phone: None,
            address: None,
        };
        self.state().user = Some(user.clone());
        Ok(user)
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthUser, ApiError> {
        self.delay().await;
        let user = AuthUser {
            id: Uuid::new_v4(),
            name: request.name.clone(),
            email: request.email.clone(),
            role: "user".to_string(),
            token: "test-token".to_string(),
            phone: None,
            address: None,
        };
        self.state().user = Some(user.clone());
        Ok(user)
    }

    async fn profile(&self) -> Result<AuthUser, ApiError> {
        self.delay().await;
        self.state()
            .user
            .clone()
            .ok_or_else(|| ApiError::status(401, "not authenticated"))
    }

    async fn update_profile(&self, request: &UpdateProfileRequest) -> Result<AuthUser, ApiError> {
        self.delay().await;
        let mut state = self.state();
        let user = state
            .user
            .as_mut()
            .ok_or_else(|| ApiError::status(401, "not authenticated"))?;
        if let Some(name) = &request.name {
            user.name = name.clone();
        }
        if let Some(phone) = &request.phone {
            user.phone = Some(phone.clone());
        }
        if let Some(address) = &request.address {
            user.address = Some(address.clone());
        }
        let mut updated = user.clone();
        updated.token = String::new();
        Ok(updated)
    }
}

#[async_trait]
impl OrdersApi for MockApi {
    async fn create_order(&self, request: &CreateOrderRequest) -> Result<Order, ApiError> {
        self.delay().await;
        let mut state = self.state();
        state.order_calls += 1;
        if let Some(conflicts) = state.order_conflicts.take() {
            return Err(ApiError::Status {
                status: 409,
                message: "stock conflict".to_string(),
                conflicts,
            });
        }
        let order = Order {
            id: Uuid::new_v4(),
            items: request.items.clone(),
            total_amount: request.total_amount,
            status: "pending".to_string(),
            created_at: None,
        };
        state.orders.push(order.clone());
        Ok(order)
    }

    async fn create_guest_order(&self, request: &CreateOrderRequest) -> Result<Order, ApiError> {
        {
            let mut state = self.state();
            state.guest_order_calls += 1;
            if request.guest_email.is_none() {
                return Err(ApiError::status(400, "guest email required"));
            }
            if let Some(conflicts) = state.order_conflicts.take() {
                return Err(ApiError::Status {
                    status: 409,
                    message: "stock conflict".to_string(),
                    conflicts,
                });
            }
        }
        self.delay().await;
        let order = Order {
            id: Uuid::new_v4(),
            items: request.items.clone(),
            total_amount: request.total_amount,
            status: "pending".to_string(),
            created_at: None,
        };
        self.state().orders.push(order.clone());
        Ok(order)
    }

    async fn my_orders(&self) -> Result<Vec<Order>, ApiError> {
        Ok(self.state().orders.clone())
    }

    async fn order(&self, id: Uuid) -> Result<Order, ApiError> {
        self.state()
            .orders
            .iter()
            .find(|order| order.id == id)
            .cloned()
            .ok_or_else(|| ApiError::status(404, "order not found"))
    }

    async fn all_orders(&self) -> Result<Vec<Order>, ApiError> {
        Ok(self.state().orders.clone())
    }

    async fn update_order_status(
        &self,
        id: Uuid,
        request: &UpdateOrderStatusRequest,
    ) -> Result<Order, ApiError> {
        let mut state = self.state();
        let order = state
            .orders
            .iter_mut()
            .find(|order| order.id == id)
            .ok_or_else(|| ApiError::status(404, "order not found"))?;
        order.status = request.status.clone();
        Ok(order.clone())
    }

    async fn order_stats(&self) -> Result<OrderStats, ApiError> {
        let state = self.state();
        Ok(OrderStats {
            total_orders: state.orders.len() as i64,
            total_revenue: state.orders.iter().map(|order| order.total_amount).sum(),
            pending_orders: state
                .orders
                .iter()
                .filter(|order| order.status == "pending")
                .count() as i64,
        })
    }

    async fn delete_order(&self, id: Uuid) -> Result<(), ApiError> {
        self.state().orders.retain(|order| order.id != id);
        Ok(())
    }
}

#[async_trait]
impl ProductsApi for MockApi {
    async fn list_products(&self, _query: &ProductQuery) -> Result<Vec<Product>, ApiError> {
        Ok(self.state().products.values().cloned().collect())
    }

    async fn featured_products(&self) -> Result<Vec<Product>, ApiError> {
        Ok(self
            .state()
            .products
            .values()
            .filter(|product| product.featured)
            .cloned()
            .collect())
    }

    async fn product(&self, id: Uuid) -> Result<Product, ApiError> {
        self.state()
            .products
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::status(404, "product not found"))
    }

    async fn create_product(&self, request: &CreateProductRequest) -> Result<Product, ApiError> {
        let product = Product {
            id: Uuid::new_v4(),
            name: request.name.clone(),
            description: request.description.clone(),
            price: request.price,
            original_price: request.original_price,
            images: request.images.clone(),
            category: request.category.clone(),
            sizes: request.sizes.clone(),
            colors: request.colors.clone(),
            stock: StockLevels::PerSize(request.stock_by_size.clone()),
            featured: request.featured,
            created_at: None,
        };
        self.state().products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update_product(
        &self,
        id: Uuid,
        request: &UpdateProductRequest,
    ) -> Result<Product, ApiError> {
        let mut state = self.state();
        let product = state
            .products
            .get_mut(&id)
            .ok_or_else(|| ApiError::status(404, "product not found"))?;
        if let Some(name) = &request.name {
            product.name = name.clone();
        }
        if let Some(price) = request.price {
            product.price = price;
        }
        if let Some(stock_by_size) = &request.stock_by_size {
            product.stock = StockLevels::PerSize(stock_by_size.clone());
        }
        if let Some(featured) = request.featured {
            product.featured = featured;
        }
        Ok(product.clone())
    }

    async fn delete_product(&self, id: Uuid) -> Result<(), ApiError> {
        self.state().products.remove(&id);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Harness

pub struct Harness {
    pub storefront: Storefront,
    pub api: Arc<MockApi>,
    pub storage: Arc<MemoryStorage>,
    pub notifier: Arc<RecordingNotifier>,
}

pub fn harness_with(api: MockApi) -> Harness {
    harness_on(api, Arc::new(MemoryStorage::default()))
}

pub fn harness_on(api: MockApi, storage: Arc<MemoryStorage>) -> Harness {
    let api = Arc::new(api);
    let notifier = Arc::new(RecordingNotifier::default());
    let storefront = Storefront::new(
        api.clone(),
        storage.clone(),
        notifier.clone(),
        SessionToken::new(),
    );
    Harness {
        storefront,
        api,
        storage,
        notifier,
    }
}

pub fn sized_product(name: &str, price: i64, stock: &[(&str, u32)]) -> Product {
    Product {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description: None,
        price,
        original_price: None,
        images: vec![format!("{name}.jpg")],
        category: "tops".to_string(),
        sizes: stock.iter().map(|(size, _)| size.to_string()).collect(),
        colors: vec![Color {
            name: "Black".to_string(),
            hex: "#000000".to_string(),
        }],
        stock: StockLevels::PerSize(
            stock
                .iter()
                .map(|(size, count)| (size.to_string(), *count))
                .collect(),
        ),
        featured: false,
        created_at: None,
    }
}

pub fn flat_product(name: &str, price: i64, stock: u32) -> Product {
    Product {
        stock: StockLevels::Flat(stock),
        sizes: Vec::new(),
        ..sized_product(name, price, &[])
    }
}
