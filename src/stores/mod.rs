use std::sync::Arc;

use crate::api::{
    AuthApi, CartApi, HttpApi, OrdersApi, ProductsApi, SessionToken, WishlistApi,
};
use crate::checkout::{self, OrderDetails};
use crate::config::StorefrontConfig;
use crate::error::{CheckoutError, StoreResult};
use crate::models::{AuthUser, Order};
use crate::notify::{LogNotifier, Notifier};
use crate::storage::{FileStorage, GuestStorage};

pub mod cart;
pub mod session;
pub mod wishlist;

pub use cart::CartStore;
pub use session::SessionStore;
pub use wishlist::WishlistStore;

/// The client-side state containers wired together: auth transitions on the
/// session drive the merge-on-login and clear-on-logout protocols of the
/// cart and wishlist. Construct one per app, or one per test case; nothing
/// here is global.
pub struct Storefront {
    pub session: SessionStore,
    pub cart: CartStore,
    pub wishlist: WishlistStore,
    pub orders: Arc<dyn OrdersApi>,
    pub products: Arc<dyn ProductsApi>,
    notifier: Arc<dyn Notifier>,
}

impl Storefront {
    pub fn new<A>(
        api: Arc<A>,
        storage: Arc<dyn GuestStorage>,
        notifier: Arc<dyn Notifier>,
        token: SessionToken,
    ) -> Self
    where
        A: CartApi + WishlistApi + AuthApi + OrdersApi + ProductsApi + 'static,
    {
        let auth: Arc<dyn AuthApi> = api.clone();
        let cart_api: Arc<dyn CartApi> = api.clone();
        let wishlist_api: Arc<dyn WishlistApi> = api.clone();
        let orders: Arc<dyn OrdersApi> = api.clone();
        let products: Arc<dyn ProductsApi> = api;
        Self {
            session: SessionStore::new(auth, storage.clone(), token),
            cart: CartStore::new(cart_api, storage.clone(), notifier.clone()),
            wishlist: WishlistStore::new(wishlist_api, storage, notifier.clone()),
            orders,
            products,
            notifier,
        }
    }

    /// Production wiring: HTTP client plus file-backed guest storage.
    pub fn from_config(config: &StorefrontConfig) -> StoreResult<Self> {
        let token = SessionToken::new();
        let api = Arc::new(HttpApi::new(&config.api_base_url, token.clone()));
        let storage: Arc<dyn GuestStorage> = Arc::new(FileStorage::new(&config.data_dir)?);
        let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);
        Ok(Self::new(api, storage, notifier, token))
    }

    /// Startup with a restored session: revalidate it against the server,
    /// then switch the stores to authenticated mode and pull server state.
    /// No guest merge happens here; that ran when the session was first
    /// established.
    pub async fn hydrate(&self) {
        if self.session.is_authenticated() && self.session.refresh_profile().await {
            self.cart.resume_session().await;
            self.wishlist.resume_session().await;
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> StoreResult<AuthUser> {
        let user = self.session.login(email, password).await?;
        self.cart.handle_login().await;
        self.wishlist.handle_login().await;
        Ok(user)
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> StoreResult<AuthUser> {
        let user = self.session.register(name, email, password).await?;
        self.cart.handle_login().await;
        self.wishlist.handle_login().await;
        Ok(user)
    }

    pub fn logout(&self) {
        self.session.logout();
        self.cart.handle_logout();
        self.wishlist.handle_logout();
    }

    pub async fn place_order(&self, details: &OrderDetails) -> Result<Order, CheckoutError> {
        checkout::place_order(
            self.orders.as_ref(),
            &self.session,
            &self.cart,
            self.notifier.as_ref(),
            details,
        )
        .await
    }
}
