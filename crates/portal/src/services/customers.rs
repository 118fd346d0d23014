//! Customer service: registration, self-service profile and admin operations.
//!
//! This is where the record lifecycle rules live:
//! - the plaintext password is hashed before anything is stored;
//! - updates validate the merged record before a single all-or-nothing write;
//! - only [`CustomerService::change_password`] ever re-hashes, and only the
//!   new plaintext it was given.

use thiserror::Error;

use broker_portal_core::{CustomerId, Password};

use crate::db::{CustomerStore, RepositoryError};
use crate::models::{Customer, CustomerPatch, NewCustomer, PatchPayloadError, Registration};
use crate::services::auth::{AuthError, AuthService, hash_password};

/// Errors returned by customer operations.
#[derive(Debug, Error)]
pub enum CustomerError {
    /// One or more field constraints failed.
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Another customer already uses this email.
    #[error("email already registered")]
    DuplicateEmail,

    /// No customer with this ID.
    #[error("customer not found")]
    NotFound,

    /// An admin update tried to set the password.
    #[error("password cannot be updated through this route")]
    PasswordUpdateForbidden,

    /// The request body has the wrong shape.
    #[error("malformed request: {0}")]
    Malformed(String),

    /// Authentication failed (e.g. wrong current password).
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for CustomerError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(_) => Self::DuplicateEmail,
            other => Self::Repository(other),
        }
    }
}

impl From<PatchPayloadError> for CustomerError {
    fn from(err: PatchPayloadError) -> Self {
        match err {
            PatchPayloadError::PasswordNotAllowed => Self::PasswordUpdateForbidden,
            PatchPayloadError::Malformed(msg) => Self::Malformed(msg),
        }
    }
}

/// Customer operations over a [`CustomerStore`].
pub struct CustomerService<'a> {
    store: &'a dyn CustomerStore,
}

impl<'a> CustomerService<'a> {
    /// Create a new customer service.
    #[must_use]
    pub const fn new(store: &'a dyn CustomerStore) -> Self {
        Self { store }
    }

    // =========================================================================
    // Self-service
    // =========================================================================

    /// Register a new customer.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::Validation` if any field is invalid and
    /// `CustomerError::DuplicateEmail` if the email is taken.
    pub async fn register(&self, registration: &Registration) -> Result<Customer, CustomerError> {
        let (fields, password) = registration
            .validate()
            .map_err(CustomerError::Validation)?;

        // Skip the hash for an email that is already taken. The unique
        // constraint on create still settles concurrent registrations.
        if self.store.get_by_email(&fields.email).await?.is_some() {
            tracing::info!("Registration rejected: email already registered");
            return Err(CustomerError::DuplicateEmail);
        }

        let password_hash = hash_password(&password).await?;

        let customer = self
            .store
            .create(&NewCustomer {
                fields,
                password_hash,
            })
            .await
            .inspect_err(|e| {
                if matches!(e, RepositoryError::Conflict(_)) {
                    tracing::info!("Registration rejected: email already registered");
                }
            })?;

        tracing::info!(customer_id = %customer.id, "Customer registered");
        Ok(customer)
    }

    /// Read a customer's own profile.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::NotFound` if the customer does not exist.
    pub async fn get_profile(&self, id: CustomerId) -> Result<Customer, CustomerError> {
        self.get_by_id(id).await
    }

    /// Apply a self-service update.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::NotFound` if the customer does not exist and
    /// `CustomerError::Validation` if the merged record is invalid.
    pub async fn update_profile(
        &self,
        id: CustomerId,
        patch: &CustomerPatch,
    ) -> Result<Customer, CustomerError> {
        let customer = self.apply_patch(id, patch).await?;
        tracing::info!(customer_id = %id, "Profile updated");
        Ok(customer)
    }

    /// Change a customer's password after checking the current one.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::Validation` if the new password is too short,
    /// `CustomerError::Auth(InvalidCredentials)` if the current password is
    /// wrong, and `CustomerError::NotFound` if the customer vanished.
    pub async fn change_password(
        &self,
        id: CustomerId,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), CustomerError> {
        let new_password = Password::parse(new_password)
            .map_err(|e| CustomerError::Validation(vec![capitalize(&e.to_string())]))?;

        AuthService::new(self.store)
            .verify_customer_password(id, current_password)
            .await?;

        let password_hash = hash_password(&new_password).await?;
        if !self.store.set_password_hash(id, &password_hash).await? {
            return Err(CustomerError::NotFound);
        }

        tracing::info!(customer_id = %id, "Password changed");
        Ok(())
    }

    // =========================================================================
    // Admin
    // =========================================================================

    /// List every customer.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::Repository` if the store fails.
    pub async fn list_all(&self) -> Result<Vec<Customer>, CustomerError> {
        Ok(self.store.list().await?)
    }

    /// Get a customer by ID.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::NotFound` if the customer does not exist.
    pub async fn get_by_id(&self, id: CustomerId) -> Result<Customer, CustomerError> {
        self.store
            .get_by_id(id)
            .await?
            .ok_or(CustomerError::NotFound)
    }

    /// Apply an admin update from a raw JSON payload.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::PasswordUpdateForbidden` if the payload has a
    /// `password` key (nothing is written), `CustomerError::NotFound`,
    /// `CustomerError::Validation` or `CustomerError::DuplicateEmail`.
    pub async fn update_by_id(
        &self,
        id: CustomerId,
        payload: serde_json::Map<String, serde_json::Value>,
    ) -> Result<Customer, CustomerError> {
        let patch = CustomerPatch::from_admin_payload(payload).inspect_err(|e| {
            if matches!(e, PatchPayloadError::PasswordNotAllowed) {
                tracing::warn!(customer_id = %id, "Admin update tried to set password");
            }
        })?;

        let customer = self.apply_patch(id, &patch).await?;
        tracing::info!(customer_id = %id, "Customer updated by admin");
        Ok(customer)
    }

    /// Permanently delete a customer.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::NotFound` if the customer does not exist.
    pub async fn delete_by_id(&self, id: CustomerId) -> Result<(), CustomerError> {
        if !self.store.delete(id).await? {
            return Err(CustomerError::NotFound);
        }
        tracing::info!(customer_id = %id, "Customer deleted");
        Ok(())
    }

    async fn apply_patch(
        &self,
        id: CustomerId,
        patch: &CustomerPatch,
    ) -> Result<Customer, CustomerError> {
        let current = self.get_by_id(id).await?;
        let fields = patch
            .apply_to(&current.fields())
            .map_err(CustomerError::Validation)?;

        self.store
            .update(id, &fields)
            .await?
            .ok_or(CustomerError::NotFound)
    }
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
