use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

use crate::api::CartApi;
use crate::dto::cart::{AddToCartRequest, UpdateCartItemRequest};
use crate::error::CapacityError;
use crate::models::{Cart, CartItem, Color, Product};
use crate::notify::Notifier;
use crate::storage::{CART_KEY, GuestStorage};

/// Validates a requested quantity against the stock ceiling for a line,
/// given what is already in the cart. Rejections mutate nothing.
pub fn check_capacity(max: u32, current: u32, requested: u32) -> Result<(), CapacityError> {
    if current >= max {
        return Err(CapacityError::AlreadyAtMax);
    }
    let remaining = max - current;
    if requested > remaining {
        return Err(CapacityError::OnlyAvailable(remaining));
    }
    Ok(())
}

struct CartState {
    authenticated: bool,
    cart: Cart,
}

/// The single authoritative in-memory cart for the active session.
///
/// In guest mode the cart lives here and in local storage; once authenticated
/// the remote cart is the source of truth and the local copy is a
/// read-through cache. Operations take `&self` and only hold the state lock
/// across synchronous sections, so calls may interleave at network awaits the
/// way they do on a cooperative UI loop.
pub struct CartStore {
    api: Arc<dyn CartApi>,
    storage: Arc<dyn GuestStorage>,
    notifier: Arc<dyn Notifier>,
    state: Mutex<CartState>,
}

impl CartStore {
    /// Builds the store in guest mode, hydrated from persisted guest state.
    pub fn new(
        api: Arc<dyn CartApi>,
        storage: Arc<dyn GuestStorage>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let cart: Cart = storage.read_json(CART_KEY).unwrap_or_default();
        Self {
            api,
            storage,
            notifier,
            state: Mutex::new(CartState {
                authenticated: false,
                cart,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CartState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn persist(&self, cart: &Cart) {
        if let Err(err) = self.storage.write_json(CART_KEY, cart) {
            tracing::warn!(error = %err, "failed to persist guest cart");
        }
    }

    /// Snapshot of the current cart for rendering.
    pub fn cart(&self) -> Cart {
        self.lock().cart.clone()
    }

    /// Total number of units across all lines, re-derived on every call.
    pub fn cart_count(&self) -> u32 {
        self.lock().cart.count()
    }

    /// Adds a product to the cart after a client-side stock check. Returns
    /// whether the line was added, so callers can decide whether to open a
    /// confirmation UI.
    pub async fn add_to_cart(
        &self,
        product: &Product,
        quantity: u32,
        size: &str,
        color: Option<Color>,
    ) -> bool {
        if quantity == 0 {
            return false;
        }
        let max = product.stock.for_size(size);
        let color_name = color.as_ref().map(|c| c.name.clone());

        let authenticated = {
            let mut state = self.lock();
            let current = state.cart.quantity_for(product.id, size, color_name.as_deref());
            if let Err(err) = check_capacity(max, current, quantity) {
                drop(state);
                self.notifier.error(&err.to_string());
                return false;
            }
            if !state.authenticated {
                // Guest: merge into the matching line or append, under the
                // same lock as the capacity check.
                match state
                    .cart
                    .items
                    .iter_mut()
                    .find(|item| item.matches(product.id, size, color_name.as_deref()))
                {
                    Some(line) => line.quantity += quantity,
                    None => state.cart.items.push(CartItem {
                        id: Uuid::new_v4(),
                        product: product.clone(),
                        quantity,
                        size: size.to_string(),
                        color,
                        price: product.price,
                    }),
                }
                state.cart.recompute_total();
                self.persist(&state.cart);
                drop(state);
                self.notifier.success("Added to cart!");
                return true;
            }
            state.authenticated
        };
        debug_assert!(authenticated);

        let request = AddToCartRequest {
            product_id: product.id,
            quantity,
            size: size.to_string(),
            color,
        };
        match self.api.add_item(&request).await {
            Ok(cart) => {
                self.lock().cart = cart;
                self.notifier.success("Added to cart!");
                true
            }
            Err(err) => {
                tracing::error!(error = %err, product = %product.id, "add to cart failed");
                self.notifier.error("Failed to add to cart");
                false
            }
        }
    }

    /// Sets a line's quantity. The local state updates optimistically before
    /// the remote confirmation; a remote failure triggers a refetch of the
    /// authoritative cart rather than any inverse patching. Quantity zero
    /// removes the line.
    pub async fn update_quantity(
        &self,
        item_id: Uuid,
        quantity: u32,
        max_stock: Option<u32>,
        suppress_toast: bool,
    ) -> bool {
        if let Some(max) = max_stock {
            if quantity > max {
                if !suppress_toast {
                    self.notifier
                        .error(&format!("Only {max} available in this size"));
                }
                return false;
            }
        }

        let authenticated = {
            let mut state = self.lock();
            if quantity == 0 {
                state.cart.items.retain(|item| item.id != item_id);
            } else if let Some(line) = state.cart.items.iter_mut().find(|item| item.id == item_id)
            {
                line.quantity = quantity;
            }
            state.cart.recompute_total();
            if !state.authenticated {
                self.persist(&state.cart);
            }
            state.authenticated
        };

        if authenticated {
            let request = UpdateCartItemRequest { quantity };
            if let Err(err) = self.api.update_item(item_id, &request).await {
                tracing::error!(error = %err, item = %item_id, "cart update failed");
                if !suppress_toast {
                    self.notifier.error("Failed to update cart");
                }
                // Undo the optimistic write by re-deriving from the server.
                self.fetch_cart().await;
                return false;
            }
        }
        true
    }

    pub async fn remove_from_cart(&self, item_id: Uuid, suppress_toast: bool) -> bool {
        let authenticated = self.lock().authenticated;
        if authenticated {
            match self.api.remove_item(item_id).await {
                Ok(cart) => {
                    self.lock().cart = cart;
                }
                Err(err) => {
                    tracing::error!(error = %err, item = %item_id, "cart remove failed");
                    if !suppress_toast {
                        self.notifier.error("Failed to remove from cart");
                    }
                    return false;
                }
            }
        } else {
            let mut state = self.lock();
            state.cart.items.retain(|item| item.id != item_id);
            state.cart.recompute_total();
            self.persist(&state.cart);
        }
        if !suppress_toast {
            self.notifier.success("Removed from cart");
        }
        true
    }

    /// Empties the cart. The local reset happens regardless of the remote
    /// call's outcome.
    pub async fn clear_cart(&self) {
        let authenticated = self.lock().authenticated;
        if authenticated {
            if let Err(err) = self.api.clear_cart().await {
                tracing::warn!(error = %err, "remote cart clear failed");
            }
        }
        self.lock().cart = Cart::default();
        if let Err(err) = self.storage.remove(CART_KEY) {
            tracing::warn!(error = %err, "failed to drop persisted guest cart");
        }
    }

    /// Replaces the local cart with the server's. Fetch failures are
    /// non-fatal: the cart falls back to empty rather than keeping a stale
    /// partial state.
    pub async fn fetch_cart(&self) {
        if !self.lock().authenticated {
            return;
        }
        match self.api.fetch_cart().await {
            Ok(cart) => self.lock().cart = cart,
            Err(err) => {
                tracing::warn!(error = %err, "cart fetch failed, resetting to empty");
                self.lock().cart = Cart::default();
            }
        }
    }

    /// Login transition: replay the persisted guest cart into the remote
    /// cart one line at a time, in insertion order, so each add faces the
    /// server's stock check in sequence. The guest blob is discarded whether
    /// or not every line made it, and the authoritative cart is refetched so
    /// local state reflects any rejections.
    pub async fn handle_login(&self) {
        self.lock().authenticated = true;

        let guest: Option<Cart> = self.storage.read_json(CART_KEY);
        if let Some(guest) = guest {
            if !guest.is_empty() {
                for item in &guest.items {
                    let request = AddToCartRequest {
                        product_id: item.product.id,
                        quantity: item.quantity,
                        size: item.size.clone(),
                        color: item.color.clone(),
                    };
                    if let Err(err) = self.api.add_item(&request).await {
                        tracing::warn!(
                            error = %err,
                            product = %item.product.id,
                            "failed to merge guest cart line"
                        );
                    }
                }
                self.notifier
                    .success("Your cart has been saved to your account");
            }
        }
        if let Err(err) = self.storage.remove(CART_KEY) {
            tracing::warn!(error = %err, "failed to drop persisted guest cart");
        }
        self.fetch_cart().await;
    }

    /// Logout transition: authenticated cart contents are not carried back
    /// into guest mode.
    pub fn handle_logout(&self) {
        let mut state = self.lock();
        state.authenticated = false;
        state.cart = Cart::default();
        drop(state);
        if let Err(err) = self.storage.remove(CART_KEY) {
            tracing::warn!(error = %err, "failed to drop persisted guest cart");
        }
    }

    /// Restored-session startup: no guest state to merge, just refetch.
    pub async fn resume_session(&self) {
        self.lock().authenticated = true;
        self.fetch_cart().await;
    }
}
