//! Broker Portal Core - Shared domain types.
//!
//! This crate provides the validated types used across the portal:
//! - `portal` - JSON API server for customers and admins
//! - `cli` - Command-line tools for migrations and customer management
//!
//! # Architecture
//!
//! The core crate contains only types and validation rules - no I/O, no
//! database access, no HTTP. Parsing a value through one of these types is the
//! single place where its normalisation (trimming, lower-casing) happens.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for customer IDs, emails, passwords and
//!   customer types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
