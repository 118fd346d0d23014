//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use broker_portal_core::{CustomerId, Email};

use super::Customer;

/// Session-stored customer identity.
///
/// Written only after a successful password check, so holding one means the
/// caller has proven who they are for the lifetime of the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentCustomer {
    /// Customer's database ID.
    pub id: CustomerId,
    /// Customer's email address at login time.
    pub email: Email,
}

impl From<&Customer> for CurrentCustomer {
    fn from(customer: &Customer) -> Self {
        Self {
            id: customer.id,
            email: customer.email.clone(),
        }
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in customer.
    pub const CURRENT_CUSTOMER: &str = "current_customer";
}
