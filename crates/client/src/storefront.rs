//! Storefront facade tying the clients, session, and cart together.

use std::sync::Arc;

use secrecy::SecretString;

use verdant_core::Email;

use crate::api::{AuthApi, CartApi, Http, ProductsApi};
use crate::cart::{CartStore, CartSynchronizer};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::session::SessionHolder;
use crate::types::{RegisterRequest, UserProfile};

/// One storefront client: catalog, account, session, and cart.
///
/// Cheaply cloneable via `Arc`; all clones share the session and cart state.
/// Session transitions initiated through this facade (login, registration,
/// logout, restore) also drive the cart's merge/load/reset reactions inline,
/// so no session watcher is needed - or wanted - alongside it.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: ClientConfig,
    session: SessionHolder,
    products: ProductsApi,
    auth: AuthApi,
    cart: CartSynchronizer,
}

impl Storefront {
    /// Build a storefront client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let session = SessionHolder::new(&config.data_dir);
        let http = Http::new(&config, session.clone())?;

        let products = ProductsApi::new(http.clone());
        let auth = AuthApi::new(http.clone());
        let cart = CartSynchronizer::new(
            CartApi::new(http),
            CartStore::new(&config.data_dir),
            session.clone(),
        );

        Ok(Self {
            inner: Arc::new(StorefrontInner {
                config,
                session,
                products,
                auth,
                cart,
            }),
        })
    }

    /// Get a reference to the client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Get a reference to the session holder.
    #[must_use]
    pub fn session(&self) -> &SessionHolder {
        &self.inner.session
    }

    /// Get a reference to the catalog client.
    #[must_use]
    pub fn products(&self) -> &ProductsApi {
        &self.inner.products
    }

    /// Get a reference to the account client.
    #[must_use]
    pub fn auth(&self) -> &AuthApi {
        &self.inner.auth
    }

    /// Get a reference to the cart synchronizer.
    #[must_use]
    pub fn cart(&self) -> &CartSynchronizer {
        &self.inner.cart
    }

    /// Sign in, merge any guest cart into the account's cart, and load it.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] on bad credentials, or another
    /// error if the request fails. The session stays as it was on failure.
    pub async fn login(&self, email: &Email, password: &str) -> Result<UserProfile, ApiError> {
        let response = self.inner.auth.login(email, password).await?;
        self.inner
            .session
            .set_session(SecretString::from(response.access), response.user.clone());

        self.inner.cart.merge_on_login().await;
        self.inner.cart.load().await;

        Ok(response.user)
    }

    /// Create an account and start its session, merging any guest cart.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] if the backend refuses the payload, or
    /// another error if the request fails.
    pub async fn register(&self, request: &RegisterRequest) -> Result<UserProfile, ApiError> {
        let response = self.inner.auth.register(request).await?;
        self.inner
            .session
            .set_session(SecretString::from(response.access), response.user.clone());

        self.inner.cart.merge_on_login().await;
        self.inner.cart.load().await;

        Ok(response.user)
    }

    /// Sign out: drop the credential and the remote-backed cart snapshot.
    ///
    /// The abandoned server cart is not copied into guest storage.
    pub fn logout(&self) {
        self.inner.session.clear();
        self.inner.cart.reset();
    }

    /// Revalidate a token persisted by an earlier run.
    ///
    /// Returns whether the session ended up authenticated. A rejected or
    /// unusable token is discarded and the client continues as a guest; that
    /// outcome is logged, not surfaced, since a fresh login fixes it.
    pub async fn restore_session(&self) -> bool {
        if !self.inner.session.has_stored_token() {
            return false;
        }

        match self.inner.auth.profile().await {
            Ok(profile) => {
                self.inner.session.set_profile(profile);
                self.inner.cart.merge_on_login().await;
                self.inner.cart.load().await;
                true
            }
            Err(e) => {
                tracing::warn!("stored session token rejected, continuing as guest: {e}");
                self.inner.session.clear();
                false
            }
        }
    }
}
