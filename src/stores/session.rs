use std::sync::{Arc, Mutex, MutexGuard};

use crate::api::{AuthApi, SessionToken};
use crate::dto::auth::{LoginRequest, RegisterRequest, UpdateProfileRequest};
use crate::error::StoreResult;
use crate::models::AuthUser;
use crate::storage::{GuestStorage, USER_KEY};

/// Holds the current session and the `is_authenticated` signal the cart and
/// wishlist stores react to. The session (profile + bearer token) persists to
/// local storage and is restored on construction.
pub struct SessionStore {
    api: Arc<dyn AuthApi>,
    storage: Arc<dyn GuestStorage>,
    token: SessionToken,
    user: Mutex<Option<AuthUser>>,
}

impl SessionStore {
    pub fn new(api: Arc<dyn AuthApi>, storage: Arc<dyn GuestStorage>, token: SessionToken) -> Self {
        let user: Option<AuthUser> = storage.read_json(USER_KEY);
        if let Some(restored) = &user {
            if !restored.token.is_empty() {
                token.set(&restored.token);
            }
        }
        Self {
            api,
            storage,
            token,
            user: Mutex::new(user),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<AuthUser>> {
        match self.user.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn user(&self) -> Option<AuthUser> {
        self.lock().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.lock().as_ref().is_some_and(AuthUser::is_admin)
    }

    pub async fn login(&self, email: &str, password: &str) -> StoreResult<AuthUser> {
        let user = self
            .api
            .login(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;
        self.install(user.clone());
        Ok(user)
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> StoreResult<AuthUser> {
        let user = self
            .api
            .register(&RegisterRequest {
                name: name.to_string(),
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;
        self.install(user.clone());
        Ok(user)
    }

    pub async fn update_profile(&self, request: &UpdateProfileRequest) -> StoreResult<AuthUser> {
        let mut updated = self.api.update_profile(request).await?;
        // Profile responses do not carry a token; keep the one we hold.
        if updated.token.is_empty() {
            if let Some(token) = self.token.get() {
                updated.token = token;
            }
        }
        self.install(updated.clone());
        Ok(updated)
    }

    /// Revalidates a restored session against the server. A rejected token
    /// drops the session rather than leaving a half-authenticated state.
    pub async fn refresh_profile(&self) -> bool {
        if !self.is_authenticated() {
            return false;
        }
        match self.api.profile().await {
            Ok(mut user) => {
                if user.token.is_empty() {
                    if let Some(token) = self.token.get() {
                        user.token = token;
                    }
                }
                self.install(user);
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "restored session rejected by server");
                self.logout();
                false
            }
        }
    }

    pub fn logout(&self) {
        *self.lock() = None;
        self.token.clear();
        if let Err(err) = self.storage.remove(USER_KEY) {
            tracing::warn!(error = %err, "failed to remove persisted session");
        }
    }

    fn install(&self, user: AuthUser) {
        self.token.set(&user.token);
        if let Err(err) = self.storage.write_json(USER_KEY, &user) {
            tracing::warn!(error = %err, "failed to persist session");
        }
        *self.lock() = Some(user);
    }
}
