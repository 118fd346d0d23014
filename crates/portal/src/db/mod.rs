//! Database operations for the portal.
//!
//! # Database: `broker_portal`
//!
//! ## Tables
//!
//! - `portal.customer` - Customer records (unique lower-cased email)
//! - `tower_sessions.session` - Tower-sessions storage
//!
//! # Stores
//!
//! Services talk to a [`CustomerStore`]. Production uses the `PostgreSQL`
//! [`CustomerRepository`]; tests and local experiments use the in-memory
//! [`MemoryCustomerStore`]. Both enforce email uniqueness atomically.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/portal/migrations/` and run via:
//! ```bash
//! cargo run -p broker-portal-cli -- migrate
//! ```

pub mod customers;
pub mod memory;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use broker_portal_core::{CustomerId, Email};

use crate::models::{Customer, CustomerFields, NewCustomer};

pub use customers::CustomerRepository;
pub use memory::MemoryCustomerStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Persistence contract for customer records.
///
/// No method other than [`CustomerStore::get_credentials`] and
/// [`CustomerStore::get_password_hash`] exposes the password hash, and only
/// [`CustomerStore::create`] and [`CustomerStore::set_password_hash`] write it.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Insert a new customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    async fn create(&self, customer: &NewCustomer) -> Result<Customer, RepositoryError>;

    /// Get a customer by ID.
    async fn get_by_id(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError>;

    /// Get a customer by (normalised) email.
    async fn get_by_email(&self, email: &Email) -> Result<Option<Customer>, RepositoryError>;

    /// Get a customer together with their password hash, for login.
    async fn get_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(Customer, String)>, RepositoryError>;

    /// Get the password hash of a customer.
    async fn get_password_hash(&self, id: CustomerId) -> Result<Option<String>, RepositoryError>;

    /// List every customer, ordered by ID.
    async fn list(&self) -> Result<Vec<Customer>, RepositoryError>;

    /// Replace the mutable fields of a customer in one write.
    ///
    /// Returns `None` if the customer does not exist. Never touches the
    /// password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the new email belongs to
    /// another customer; nothing is written in that case.
    async fn update(
        &self,
        id: CustomerId,
        fields: &CustomerFields,
    ) -> Result<Option<Customer>, RepositoryError>;

    /// Store a new password hash. Returns `false` if the customer does not exist.
    async fn set_password_hash(
        &self,
        id: CustomerId,
        password_hash: &str,
    ) -> Result<bool, RepositoryError>;

    /// Permanently delete a customer. Returns `false` if it did not exist.
    async fn delete(&self, id: CustomerId) -> Result<bool, RepositoryError>;

    /// Check that the backing store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map a unique-constraint violation to `RepositoryError::Conflict`.
pub(crate) fn map_unique_violation(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict("email already exists".to_owned());
    }
    RepositoryError::Database(err)
}
