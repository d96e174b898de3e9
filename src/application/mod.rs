//! Flow logic built on the domain port

pub mod checkout;
pub mod poller;
pub mod receipt;
pub mod resolver;

// Re-export key types for convenience
pub use checkout::CheckoutService;
pub use poller::{
    PollAction, PollerConfig, PollerHandle, SessionPoller, SessionStatus, SessionTracker,
    SessionView,
};
pub use receipt::ReceiptService;
pub use resolver::LocationResolver;
