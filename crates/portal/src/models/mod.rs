//! Domain models for the portal.
//!
//! - [`customer`] - Customer read model, validated field sets and request inputs
//! - [`session`] - Identity stored in the server-side session

pub mod customer;
pub mod session;

pub use customer::{
    Address, Customer, CustomerFields, CustomerPatch, NewCustomer, PatchPayloadError,
    ProfileUpdate, Registration,
};
pub use session::{CurrentCustomer, keys as session_keys};
