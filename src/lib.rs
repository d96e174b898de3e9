//! # Ampay Checkout Client
//!
//! Client-side implementation of the "scan - pay - charge" flow for public
//! EV charging: resolve a scanned charge point into everything the user
//! must see before paying, create a payment checkout, follow the charging
//! session while it runs and derive the receipt afterwards.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: Wire models, derived views and the backend port
//! - **application**: Flow logic (location resolution, checkout, session polling, receipts)
//! - **infrastructure**: External concerns (HTTP client for the charging backend)
//! - **shared**: Cross-cutting helpers (errors, formatting, locale, time)

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod shared;

pub use config::{default_config_path, AppConfig};

// Re-export the backend port and its HTTP implementation for easy wiring
pub use domain::ports::{CheckoutApi, SharedCheckoutApi};
pub use infrastructure::http::ApiClient;
