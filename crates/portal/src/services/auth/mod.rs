//! Authentication service.
//!
//! Password hashing (Argon2id) and email + password login. Hashing and
//! verification are CPU-bound, so they run on the blocking thread pool.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use tokio::sync::OnceCell;

use broker_portal_core::{CustomerId, Email, Password};

use crate::db::CustomerStore;
use crate::models::Customer;

/// Hash verified when the email is malformed or unknown, so every failure
/// mode costs one Argon2 verification.
static DUMMY_HASH: OnceCell<Option<String>> = OnceCell::const_new();

/// Authentication service.
///
/// Resolves a customer from email and password.
pub struct AuthService<'a> {
    store: &'a dyn CustomerStore,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(store: &'a dyn CustomerStore) -> Self {
        Self { store }
    }

    /// Login with email and password.
    ///
    /// A malformed email, an unknown email and a wrong password all produce
    /// the same error.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<Customer, AuthError> {
        let Ok(email) = Email::parse(email) else {
            verify_dummy(password).await;
            tracing::info!("Login failed: malformed email");
            return Err(AuthError::InvalidCredentials);
        };

        let Some((customer, password_hash)) = self.store.get_credentials(&email).await? else {
            verify_dummy(password).await;
            tracing::info!("Login failed: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password, &password_hash).await? {
            tracing::info!(customer_id = %customer.id, "Login failed: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!(customer_id = %customer.id, "Customer logged in");
        Ok(customer)
    }

    /// Check a customer's current password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the password does not match
    /// or the customer no longer exists.
    pub async fn verify_customer_password(
        &self,
        id: CustomerId,
        password: &str,
    ) -> Result<(), AuthError> {
        let password_hash = self
            .store
            .get_password_hash(id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if verify_password(password, &password_hash).await? {
            Ok(())
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }
}

/// Hash a password using Argon2id with a fresh random salt.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub async fn hash_password(password: &Password) -> Result<String, AuthError> {
    let password = password.clone();
    tokio::task::spawn_blocking(move || hash_blocking(password.expose())).await?
}

/// Verify a password against a PHC-format hash.
///
/// Returns `Ok(false)` on mismatch or if the stored hash cannot be parsed.
///
/// # Errors
///
/// Returns `AuthError::HashTask` if the blocking task fails.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let password = password.to_owned();
    let hash = hash.to_owned();
    let matches = tokio::task::spawn_blocking(move || {
        PasswordHash::new(&hash).is_ok_and(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
    })
    .await?;

    Ok(matches)
}

/// Get the dummy hash, building it on the blocking pool on first use.
async fn dummy_hash() -> Option<&'static str> {
    DUMMY_HASH
        .get_or_init(|| async {
            tokio::task::spawn_blocking(|| hash_blocking("portal-dummy-password").ok())
                .await
                .ok()
                .flatten()
        })
        .await
        .as_deref()
}

/// Burn one verification against the dummy hash. The result is discarded.
async fn verify_dummy(password: &str) {
    if let Some(dummy) = dummy_hash().await {
        let _ = verify_password(password, dummy).await;
    }
}

/// Build the dummy hash ahead of the first failed login.
pub async fn warm_up() {
    if dummy_hash().await.is_none() {
        tracing::warn!("Failed to build dummy password hash");
    }
}

fn hash_blocking(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_is_salted_and_verifies() {
        let password = Password::parse("secret1").unwrap();
        let first = hash_password(&password).await.unwrap();
        let second = hash_password(&password).await.unwrap();

        assert_ne!(first, "secret1");
        assert!(first.starts_with("$argon2id$"));
        assert_ne!(first, second);
        assert!(verify_password("secret1", &first).await.unwrap());
        assert!(!verify_password("secret2", &first).await.unwrap());
    }

    #[tokio::test]
    async fn test_dummy_hash_is_built_once_and_never_matches() {
        warm_up().await;
        let first = dummy_hash().await.unwrap();
        let second = dummy_hash().await.unwrap();

        assert!(std::ptr::eq(first, second));
        assert!(first.starts_with("$argon2id$"));
        assert!(!verify_password("secret1", first).await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_and_unknown_email_fail_alike() {
        let store = crate::db::MemoryCustomerStore::new();
        let service = AuthService::new(&store);

        let malformed = service.login("not-an-email", "secret1").await;
        let unknown = service.login("nobody@example.com", "secret1").await;

        assert!(matches!(malformed, Err(AuthError::InvalidCredentials)));
        assert!(matches!(unknown, Err(AuthError::InvalidCredentials)));
        assert!(DUMMY_HASH.initialized());
    }

    #[tokio::test]
    async fn test_verify_against_garbage_hash_is_false() {
        assert!(!verify_password("secret1", "not-a-hash").await.unwrap());
    }
}
