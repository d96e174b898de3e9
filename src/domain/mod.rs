//! Core wire models, derived views and the backend port

pub mod charge_point;
pub mod location;
pub mod ocmf;
pub mod ports;
pub mod pricing;
pub mod receipt;
pub mod session;
pub mod tariff;

// Re-export commonly used types
pub use charge_point::{power_kw, Connector, Evse, EvseStatus, PowerType};
pub use location::{Location, LocationBundle, Operator};
pub use ports::{CheckoutApi, SharedCheckoutApi};
pub use receipt::{ReceiptData, ReceiptSummary};
pub use session::{CheckoutCreated, CheckoutRequest, Pricing, RemoteRequestStatus, Session};
pub use tariff::Tariff;
