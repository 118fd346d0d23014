//! Customer management commands.
//!
//! # Usage
//!
//! ```bash
//! PORTAL_NEW_CUSTOMER_PASSWORD='...' \
//!     portal-cli customer create -e jane@example.com -f Jane -l Doe -t Business
//! ```
//!
//! The password comes from the environment so it never appears in shell
//! history or the process list.
//!
//! # Environment Variables
//!
//! - `PORTAL_DATABASE_URL` - `PostgreSQL` connection string
//! - `PORTAL_NEW_CUSTOMER_PASSWORD` - Password for the new customer

use thiserror::Error;

use broker_portal::db::CustomerRepository;
use broker_portal::models::Registration;
use broker_portal::services::{CustomerError, CustomerService};
use broker_portal_core::CustomerId;

use super::{ConnectError, connect};

/// Environment variable holding the new customer's password.
pub const PASSWORD_ENV: &str = "PORTAL_NEW_CUSTOMER_PASSWORD";

/// Errors that can occur during customer operations.
#[derive(Debug, Error)]
pub enum CustomerCommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// Registration rejected.
    #[error("{}", describe(.0))]
    Customer(#[from] CustomerError),
}

fn describe(err: &CustomerError) -> String {
    match err {
        CustomerError::Validation(messages) => format!("Invalid customer: {}", messages.join("; ")),
        CustomerError::DuplicateEmail => "A customer with this email already exists".to_string(),
        other => other.to_string(),
    }
}

/// Create a customer through the same service as the HTTP registration.
///
/// # Errors
///
/// Returns an error if the password variable is unset, the database is
/// unreachable, or the registration is rejected.
pub async fn create(
    email: &str,
    first_name: &str,
    last_name: &str,
    customer_type: &str,
) -> Result<CustomerId, CustomerCommandError> {
    let password =
        std::env::var(PASSWORD_ENV).map_err(|_| CustomerCommandError::MissingEnvVar(PASSWORD_ENV))?;

    let registration = Registration {
        first_name: Some(first_name.to_owned()),
        last_name: Some(last_name.to_owned()),
        email: Some(email.to_owned()),
        password: Some(password),
        customer_type: Some(customer_type.to_owned()),
        ..Registration::default()
    };

    let repo = CustomerRepository::new(connect().await?);
    let customer = CustomerService::new(&repo).register(&registration).await?;

    tracing::info!(
        customer_id = %customer.id,
        email = %customer.email,
        customer_type = %customer.customer_type,
        "Customer created"
    );
    Ok(customer.id)
}
