//! Core types for the broker portal.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod password;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use password::{Password, PasswordError};
pub use status::*;
