//! Broker customer portal library.
//!
//! JSON API for insurance broker customers: registration, session login,
//! self-service profile management and token-guarded admin management of
//! customer records. Exposed as a library so the binary, the CLI and the
//! integration tests share one router and one service layer.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;

pub use routes::app;
pub use state::AppState;
