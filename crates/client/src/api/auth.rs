//! Account endpoints: authentication, profile, and saved addresses.

use reqwest::Method;
use serde::Serialize;
use tracing::instrument;

use verdant_core::{AddressId, Email};

use crate::error::ApiError;
use crate::types::{Address, AddressInput, AuthResponse, ProfileUpdate, RegisterRequest, UserProfile};

use super::Http;

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a Email,
    password: &'a str,
}

/// Client for the account endpoints.
#[derive(Clone)]
pub struct AuthApi {
    http: Http,
}

impl AuthApi {
    pub(crate) const fn new(http: Http) -> Self {
        Self { http }
    }

    /// Exchange credentials for a bearer token and profile.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] on bad credentials, or another
    /// error if the request fails.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &Email, password: &str) -> Result<AuthResponse, ApiError> {
        let body = LoginRequest { email, password };
        self.http
            .send(self.http.request(Method::POST, "auth/login/").json(&body))
            .await
    }

    /// Create an account; returns a live session like [`Self::login`].
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] if the backend refuses the payload
    /// (duplicate email, weak password), or another error if the request
    /// fails.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        self.http
            .send(
                self.http
                    .request(Method::POST, "auth/register/")
                    .json(request),
            )
            .await
    }

    /// Fetch the profile for the current bearer credential.
    ///
    /// Also serves as token validation: an [`ApiError::Unauthorized`] means
    /// the stored token is no longer good.
    ///
    /// # Errors
    ///
    /// Returns an error if the credential is rejected or the request fails.
    #[instrument(skip(self))]
    pub async fn profile(&self) -> Result<UserProfile, ApiError> {
        self.http
            .send(self.http.request(Method::GET, "auth/profile/"))
            .await
    }

    /// Update profile fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, ApiError> {
        self.http
            .send(
                self.http
                    .request(Method::PATCH, "auth/profile/")
                    .json(update),
            )
            .await
    }

    /// List saved addresses.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn addresses(&self) -> Result<Vec<Address>, ApiError> {
        self.http
            .send(self.http.request(Method::GET, "auth/addresses/"))
            .await
    }

    /// Save a new address.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, address))]
    pub async fn add_address(&self, address: &AddressInput) -> Result<Address, ApiError> {
        self.http
            .send(
                self.http
                    .request(Method::POST, "auth/addresses/")
                    .json(address),
            )
            .await
    }

    /// Replace an existing address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address does not exist or the request fails.
    #[instrument(skip(self, address), fields(id = %id))]
    pub async fn update_address(
        &self,
        id: AddressId,
        address: &AddressInput,
    ) -> Result<Address, ApiError> {
        let path = format!("auth/addresses/{id}/");
        self.http
            .send(self.http.request(Method::PUT, &path).json(address))
            .await
    }

    /// Delete an address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address does not exist or the request fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete_address(&self, id: AddressId) -> Result<(), ApiError> {
        let path = format!("auth/addresses/{id}/");
        self.http
            .send_ack(self.http.request(Method::DELETE, &path))
            .await
    }
}
