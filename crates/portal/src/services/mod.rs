//! Business logic services for the portal.
//!
//! # Services
//!
//! - `auth` - Password hashing and email + password login
//! - `customers` - Registration, self-service profile and admin management
//!
//! Services borrow a `&dyn CustomerStore` for the length of one request and
//! return domain errors; handlers map those onto HTTP responses.

pub mod auth;
pub mod customers;

pub use auth::{AuthError, AuthService};
pub use customers::{CustomerError, CustomerService};
